//! Skip-list-backed secondary index

use super::key::IndexValue;
use super::{check_storage_key, Comparator, IndexError, IndexKind, SecondaryIndex, Transform};
use crate::engine::{LessFn, SkipList};
use crate::record::Value;
use std::fmt;
use tracing::trace;

/// Index mapping keys to storage keys through a [`SkipList`]
///
/// Entries sharing a key are separate nodes; removal picks among them with
/// a predicate over the storage key.
pub struct SkipListIndex {
    name: String,
    field: String,
    transform: Option<Transform>,
    list: SkipList<IndexValue, String, LessFn<IndexValue>>,
}

impl SkipListIndex {
    pub fn new(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::with_options(name, field, None, None)
    }

    pub fn with_options(
        name: impl Into<String>,
        field: impl Into<String>,
        transform: Option<Transform>,
        comparator: Option<Comparator>,
    ) -> Self {
        let order = match comparator {
            Some(less) => LessFn::from_arc(less),
            None => LessFn::new(|a: &IndexValue, b: &IndexValue| a < b),
        };

        Self {
            name: name.into(),
            field: field.into(),
            transform,
            list: SkipList::with_order(order),
        }
    }

    /// Seed the level generator for reproducible layouts
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.list = self.list.with_seed(seed);
        self
    }

    /// Highest level currently in use by the underlying list
    pub fn level(&self) -> usize {
        self.list.level()
    }
}

impl fmt::Debug for SkipListIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkipListIndex")
            .field("name", &self.name)
            .field("field", &self.field)
            .field("len", &self.list.len())
            .finish()
    }
}

impl SecondaryIndex for SkipListIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn field(&self) -> &str {
        &self.field
    }

    fn kind(&self) -> IndexKind {
        IndexKind::SkipList
    }

    fn key_of(&self, field_value: &Value) -> Result<IndexValue, IndexError> {
        IndexValue::project(field_value, self.transform.as_ref())
    }

    fn insert(&mut self, field_value: &Value, storage_key: &str) -> Result<(), IndexError> {
        check_storage_key(&self.name, storage_key)?;
        let key = self.checked_key(field_value)?;
        trace!(index = %self.name, %key, storage_key, "skip list index insert");
        self.list.add(key, storage_key.to_string());
        Ok(())
    }

    fn remove_where(
        &mut self,
        field_value: &Value,
        predicate: &mut dyn FnMut(&str) -> bool,
    ) -> Result<bool, IndexError> {
        let key = self.checked_key(field_value)?;
        Ok(self.list.remove_if(&key, |storage_key| predicate(storage_key.as_str())))
    }

    fn find(&self, field_value: &Value) -> Result<Option<&str>, IndexError> {
        let key = self.key_of(field_value)?;
        Ok(self.list.get_first(&key).map(String::as_str))
    }

    fn get_range(&self, start: &Value, end: &Value) -> Result<Vec<&str>, IndexError> {
        let start = self.key_of(start)?;
        let end = self.key_of(end)?;
        Ok(self
            .list
            .get_range(&start, &end)
            .into_iter()
            .map(String::as_str)
            .collect())
    }

    fn for_each(&self, visit: &mut dyn FnMut(&IndexValue, &str)) {
        self.list.for_each(|key, storage_key| visit(key, storage_key.as_str()));
    }

    fn clear(&mut self) {
        self.list.clear();
    }

    fn len(&self) -> usize {
        self.list.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn seeded(name: &str, field: &str) -> SkipListIndex {
        SkipListIndex::new(name, field).with_seed(11)
    }

    #[test]
    fn test_insert_and_find() {
        let mut index = seeded("by_age", "age");
        index.insert(&Value::Int(30), "p:a").unwrap();
        index.insert(&Value::Int(20), "p:b").unwrap();

        assert_eq!(index.kind(), IndexKind::SkipList);
        assert_eq!(index.find(&Value::Int(30)).unwrap(), Some("p:a"));
        assert_eq!(index.find(&Value::Int(31)).unwrap(), None);
    }

    #[test]
    fn test_remove_by_storage_key_among_duplicates() {
        let mut index = seeded("by_team", "team");
        for key in ["p:1", "p:2", "p:3"] {
            index.insert(&Value::from("red"), key).unwrap();
        }

        assert!(index.remove(&Value::from("red"), "p:2").unwrap());
        assert!(!index.remove(&Value::from("red"), "p:2").unwrap());

        let mut left = index.find_all(&Value::from("red")).unwrap();
        left.sort_unstable();
        assert_eq!(left, vec!["p:1", "p:3"]);
    }

    #[test]
    fn test_remove_where_takes_one_entry() {
        let mut index = seeded("by_team", "team");
        for key in ["p:1", "p:2"] {
            index.insert(&Value::from("blue"), key).unwrap();
        }
        assert!(index.remove_where(&Value::from("blue"), &mut |_| true).unwrap());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_range_with_float_keys() {
        let mut index = seeded("by_score", "score");
        for (score, key) in [(1.5, "p:a"), (2.5, "p:b"), (3.5, "p:c")] {
            index.insert(&Value::Float(score), key).unwrap();
        }

        let hits = index.get_range(&Value::Int(2), &Value::Int(4)).unwrap();
        assert_eq!(hits, vec!["p:b", "p:c"]);
    }

    #[test]
    fn test_rejects_invalid_entries() {
        let mut index = seeded("by_age", "age");
        assert!(matches!(
            index.insert(&Value::Null, "p:a"),
            Err(IndexError::NullKey { .. })
        ));
        assert!(matches!(
            index.insert(&Value::Int(3), ""),
            Err(IndexError::EmptyStorageKey { .. })
        ));
        assert!(index.is_empty());
    }

    #[test]
    fn test_transform_applies_to_lookups() {
        let truncate: Transform = Arc::new(|v: &Value| match v {
            Value::Float(f) => Value::Int(f.floor() as i64),
            other => other.clone(),
        });
        let mut index =
            SkipListIndex::with_options("by_bucket", "score", Some(truncate), None).with_seed(3);
        index.insert(&Value::Float(4.2), "p:x").unwrap();
        index.insert(&Value::Float(4.9), "p:y").unwrap();

        assert_eq!(index.find_all(&Value::Float(4.5)).unwrap().len(), 2);
        assert!(index.find(&Value::Float(5.0)).unwrap().is_none());
    }
}
