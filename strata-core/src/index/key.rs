//! Index key type
//!
//! Field values are converted into a closed, totally ordered [`IndexValue`]
//! before they reach an engine. Type classes sort as
//! null < bool < number < string < binary < datetime; integers and floats
//! share the number class and compare numerically.

use super::{IndexError, Transform};
use crate::record::Value;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone)]
pub enum IndexValue {
    /// Null value (lowest sort order)
    Null,
    Bool(bool),
    Int(i64),
    /// Float value, ordered with `f64::total_cmp`
    Float(f64),
    String(String),
    Binary(Vec<u8>),
    DateTime(DateTime<Utc>),
}

impl IndexValue {
    /// Convert from a record value
    pub fn from_value(value: &Value) -> Result<Self, IndexError> {
        match value {
            Value::Null => Ok(IndexValue::Null),
            Value::Bool(b) => Ok(IndexValue::Bool(*b)),
            Value::Int(i) => Ok(IndexValue::Int(*i)),
            Value::Float(f) => Ok(IndexValue::Float(*f)),
            Value::String(s) => Ok(IndexValue::String(s.clone())),
            Value::Binary(b) => Ok(IndexValue::Binary(b.clone())),
            Value::DateTime(dt) => Ok(IndexValue::DateTime(*dt)),
            Value::Array(_) | Value::Object(_) => {
                Err(IndexError::UnsupportedValueType(value.type_name().to_string()))
            }
        }
    }

    /// Apply an optional transform to `raw` and convert the result
    pub fn project(raw: &Value, transform: Option<&Transform>) -> Result<Self, IndexError> {
        match transform {
            Some(f) => Self::from_value(&f(raw)),
            None => Self::from_value(raw),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, IndexValue::Null)
    }

    fn class(&self) -> u8 {
        match self {
            IndexValue::Null => 0,
            IndexValue::Bool(_) => 1,
            IndexValue::Int(_) | IndexValue::Float(_) => 2,
            IndexValue::String(_) => 3,
            IndexValue::Binary(_) => 4,
            IndexValue::DateTime(_) => 5,
        }
    }
}

impl Ord for IndexValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use IndexValue::*;

        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            // Numerically equal mixed pairs put the integer first.
            (Int(a), Float(b)) => int_float_cmp(*a, *b).then(Ordering::Less),
            (Float(a), Int(b)) => int_float_cmp(*b, *a).reverse().then(Ordering::Greater),
            (String(a), String(b)) => a.cmp(b),
            (Binary(a), Binary(b)) => a.cmp(b),
            (DateTime(a), DateTime(b)) => a.cmp(b),
            _ => self.class().cmp(&other.class()),
        }
    }
}

/// Exact comparison of an integer with a float, without rounding the integer
///
/// NaNs sit where `f64::total_cmp` puts them: above every integer when
/// positive, below when negative.
fn int_float_cmp(i: i64, f: f64) -> Ordering {
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;

    if f.is_nan() {
        return if f.is_sign_negative() { Ordering::Greater } else { Ordering::Less };
    }
    if f >= TWO_POW_63 {
        return Ordering::Less;
    }
    if f < -TWO_POW_63 {
        return Ordering::Greater;
    }

    let whole = f.trunc();
    i.cmp(&(whole as i64)).then_with(|| {
        if f > whole {
            Ordering::Less
        } else if f < whole {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    })
}

impl PartialOrd for IndexValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for IndexValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for IndexValue {}

impl fmt::Display for IndexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexValue::Null => write!(f, "null"),
            IndexValue::Bool(b) => write!(f, "{}", b),
            IndexValue::Int(i) => write!(f, "{}", i),
            IndexValue::Float(x) => write!(f, "{}", x),
            IndexValue::String(s) => write!(f, "{:?}", s),
            IndexValue::Binary(b) => write!(f, "<{} bytes>", b.len()),
            IndexValue::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
        }
    }
}

impl From<&str> for IndexValue {
    fn from(s: &str) -> Self {
        IndexValue::String(s.to_string())
    }
}

impl From<i64> for IndexValue {
    fn from(i: i64) -> Self {
        IndexValue::Int(i)
    }
}
