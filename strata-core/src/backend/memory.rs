//! Shared in-memory backend

use super::{Backend, BackendError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
struct Inner {
    entries: Vec<(String, Vec<u8>)>,
    positions: HashMap<String, usize>,
}

/// In-memory backend with O(1) ordinal access
///
/// Clones share the same data, so several stores with different prefixes
/// can live on one backend.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every key in every namespace
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.entries.clear();
        inner.positions.clear();
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("len", &self.inner.read().entries.len())
            .finish()
    }
}

impl Backend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        let inner = self.inner.read();
        Ok(inner
            .positions
            .get(key)
            .map(|&pos| inner.entries[pos].1.clone()))
    }

    fn set(&self, key: &str, value: Vec<u8>) -> Result<(), BackendError> {
        let mut inner = self.inner.write();
        match inner.positions.get(key).copied() {
            Some(pos) => inner.entries[pos].1 = value,
            None => {
                let pos = inner.entries.len();
                inner.entries.push((key.to_string(), value));
                inner.positions.insert(key.to_string(), pos);
            }
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, BackendError> {
        let mut inner = self.inner.write();
        let Some(pos) = inner.positions.remove(key) else {
            return Ok(false);
        };

        inner.entries.swap_remove(pos);
        if pos < inner.entries.len() {
            let moved = inner.entries[pos].0.clone();
            inner.positions.insert(moved, pos);
        }
        Ok(true)
    }

    fn len(&self) -> Result<usize, BackendError> {
        Ok(self.inner.read().entries.len())
    }

    fn key(&self, ordinal: usize) -> Result<Option<String>, BackendError> {
        Ok(self
            .inner
            .read()
            .entries
            .get(ordinal)
            .map(|(key, _)| key.clone()))
    }
}
