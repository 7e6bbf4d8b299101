//! Byte-oriented key/value backends
//!
//! The store persists encoded records through a [`Backend`]. Keys are
//! enumerable by ordinal so a store can scan its namespace without the
//! backend knowing about prefixes.

pub mod memory;

pub use memory::MemoryBackend;

/// Key/value storage used by a store
///
/// Methods take `&self`; implementations handle their own synchronization.
/// Ordinals are dense (`0..len()`) but may be reassigned by any `set` or
/// `remove`.
pub trait Backend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError>;

    fn set(&self, key: &str, value: Vec<u8>) -> Result<(), BackendError>;

    /// Remove `key`, returning whether it existed
    fn remove(&self, key: &str) -> Result<bool, BackendError>;

    /// Number of keys across all namespaces
    fn len(&self) -> Result<usize, BackendError>;

    /// Key at `ordinal`, `None` past the end
    fn key(&self, ordinal: usize) -> Result<Option<String>, BackendError>;

    fn is_empty(&self) -> Result<bool, BackendError> {
        Ok(self.len()? == 0)
    }

    /// Snapshot of every key starting with `prefix`
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, BackendError> {
        let mut keys = Vec::new();
        for ordinal in 0..self.len()? {
            match self.key(ordinal)? {
                Some(key) if key.starts_with(prefix) => keys.push(key),
                Some(_) => {}
                None => break,
            }
        }
        Ok(keys)
    }
}

/// Backend errors
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Backend operation failed: {0}")]
    OperationFailed(String),
}
