//! Secondary indexes
//!
//! This module provides ordered secondary indexes over record fields:
//! - Tree-backed indexes (AVL engine, duplicates ordered by storage key)
//! - Skip-list-backed indexes (duplicates kept as separate nodes)
//! - Optional key transforms and custom comparators
//! - Index backfill and usage statistics

pub mod builder;
pub mod definition;
pub mod key;
pub mod skiplist;
pub mod statistics;
pub mod tree;

pub use builder::{BuildReport, IndexBuilder};
pub use definition::{IndexDefinition, IndexKind};
pub use key::IndexValue;
pub use skiplist::SkipListIndex;
pub use statistics::IndexStatistics;
pub use tree::{IndexEntry, TreeIndex};

use crate::record::Value;
use std::sync::Arc;

/// Pure function applied to a raw field value before it becomes an index key
pub type Transform = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Strict less-than over index keys
pub type Comparator = Arc<dyn Fn(&IndexValue, &IndexValue) -> bool + Send + Sync>;

/// Common contract of both index flavors
///
/// Field values passed in are raw record values; the index applies its
/// transform before touching the engine. Lookups return storage keys.
pub trait SecondaryIndex: Send + Sync {
    fn name(&self) -> &str;

    /// Record field (dotted path) this index projects
    fn field(&self) -> &str;

    fn kind(&self) -> IndexKind;

    /// Project a raw field value into this index's key space
    fn key_of(&self, field_value: &Value) -> Result<IndexValue, IndexError>;

    /// Insert an entry mapping `field_value` to `storage_key`
    fn insert(&mut self, field_value: &Value, storage_key: &str) -> Result<(), IndexError>;

    /// Remove the first entry under `field_value` whose storage key satisfies
    /// `predicate`
    fn remove_where(
        &mut self,
        field_value: &Value,
        predicate: &mut dyn FnMut(&str) -> bool,
    ) -> Result<bool, IndexError>;

    /// First storage key stored under `field_value`
    fn find(&self, field_value: &Value) -> Result<Option<&str>, IndexError>;

    /// Storage keys whose index keys lie in `[start, end]`, in index order
    fn get_range(&self, start: &Value, end: &Value) -> Result<Vec<&str>, IndexError>;

    /// Visit every entry in index order
    fn for_each(&self, visit: &mut dyn FnMut(&IndexValue, &str));

    fn clear(&mut self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Project `field_value`, rejecting a null key
    fn checked_key(&self, field_value: &Value) -> Result<IndexValue, IndexError> {
        let key = self.key_of(field_value)?;
        if key.is_null() {
            return Err(IndexError::NullKey {
                index: self.name().to_string(),
            });
        }
        Ok(key)
    }

    /// Remove the entry mapping `field_value` to exactly `storage_key`
    fn remove(&mut self, field_value: &Value, storage_key: &str) -> Result<bool, IndexError> {
        check_storage_key(self.name(), storage_key)?;
        self.remove_where(field_value, &mut |candidate| candidate == storage_key)
    }

    /// Every storage key stored under `field_value`
    fn find_all(&self, field_value: &Value) -> Result<Vec<&str>, IndexError> {
        self.get_range(field_value, field_value)
    }
}

pub(crate) fn check_storage_key(index: &str, storage_key: &str) -> Result<(), IndexError> {
    if storage_key.is_empty() {
        return Err(IndexError::EmptyStorageKey {
            index: index.to_string(),
        });
    }
    Ok(())
}

/// Index errors
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("Index '{index}' cannot store a null key")]
    NullKey { index: String },

    #[error("Index '{index}' cannot store an empty storage key")]
    EmptyStorageKey { index: String },

    #[error("Unsupported value type for indexing: {0}")]
    UnsupportedValueType(String),

    #[error("Invalid index definition: {0}")]
    InvalidDefinition(String),
}
