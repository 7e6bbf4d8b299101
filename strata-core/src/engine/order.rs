//! Strict ordering capability shared by both engines
//!
//! Engines never call `Ord` directly. They are parameterized at construction
//! with an [`Order`], a strict less-than relation from which equality and the
//! other comparisons are derived.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A strict weak ordering over `T`
///
/// `less(a, b)` must return true iff `a` strictly precedes `b`. Two values are
/// considered equal when neither precedes the other.
pub trait Order<T: ?Sized> {
    fn less(&self, a: &T, b: &T) -> bool;

    fn equal(&self, a: &T, b: &T) -> bool {
        !self.less(a, b) && !self.less(b, a)
    }

    fn less_or_equal(&self, a: &T, b: &T) -> bool {
        !self.less(b, a)
    }

    fn greater(&self, a: &T, b: &T) -> bool {
        self.less(b, a)
    }
}

/// Natural ordering through `Ord`
pub struct Natural<T: ?Sized>(PhantomData<fn(&T)>);

impl<T: ?Sized> Natural<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: ?Sized> Default for Natural<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for Natural<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Natural<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Natural")
    }
}

impl<T: Ord + ?Sized> Order<T> for Natural<T> {
    fn less(&self, a: &T, b: &T) -> bool {
        a < b
    }
}

/// Ordering backed by a shared less-than closure
pub struct LessFn<T: ?Sized>(Arc<dyn Fn(&T, &T) -> bool + Send + Sync>);

impl<T: ?Sized> LessFn<T> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn from_arc(f: Arc<dyn Fn(&T, &T) -> bool + Send + Sync>) -> Self {
        Self(f)
    }
}

impl<T: ?Sized> Clone for LessFn<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> fmt::Debug for LessFn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LessFn")
    }
}

impl<T: ?Sized> Order<T> for LessFn<T> {
    fn less(&self, a: &T, b: &T) -> bool {
        (self.0)(a, b)
    }
}
