//! Tree-backed secondary index
//!
//! Entries are `(index key, storage key)` pairs kept in an AVL tree. The
//! configured comparator is widened with a storage-key tie break, so entries
//! sharing an index key are totally ordered and an exact entry can be found
//! in logarithmic time.

use super::key::IndexValue;
use super::{check_storage_key, Comparator, IndexError, IndexKind, SecondaryIndex, Transform};
use crate::engine::{AvlTree, LessFn};
use crate::record::Value;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Value stored in the tree
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub key: IndexValue,
    pub storage_key: String,
}

impl IndexEntry {
    pub fn new(key: IndexValue, storage_key: impl Into<String>) -> Self {
        Self {
            key,
            storage_key: storage_key.into(),
        }
    }

    /// Entry sorting before every real entry with key `key`
    ///
    /// Real entries never carry an empty storage key.
    fn needle(key: IndexValue) -> Self {
        Self {
            key,
            storage_key: String::new(),
        }
    }
}

pub struct TreeIndex {
    name: String,
    field: String,
    transform: Option<Transform>,
    less: Comparator,
    tree: AvlTree<IndexEntry, LessFn<IndexEntry>>,
}

impl TreeIndex {
    /// Create an index ordered by the natural order of [`IndexValue`]
    pub fn new(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::with_options(name, field, None, None)
    }

    pub fn with_options(
        name: impl Into<String>,
        field: impl Into<String>,
        transform: Option<Transform>,
        comparator: Option<Comparator>,
    ) -> Self {
        let less: Comparator =
            comparator.unwrap_or_else(|| Arc::new(|a: &IndexValue, b: &IndexValue| a < b));
        let key_less = Arc::clone(&less);
        let order = LessFn::new(move |a: &IndexEntry, b: &IndexEntry| {
            key_less(&a.key, &b.key)
                || (!key_less(&b.key, &a.key) && a.storage_key < b.storage_key)
        });

        Self {
            name: name.into(),
            field: field.into(),
            transform,
            less,
            tree: AvlTree::with_order(order),
        }
    }

    /// Height of the underlying tree
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Entry at 1-based `rank` in index order
    pub fn entry_by_rank(&self, rank: usize) -> Option<&IndexEntry> {
        self.tree.find_by_rank(rank)
    }

    fn same_key(&self, a: &IndexValue, b: &IndexValue) -> bool {
        !(self.less)(a, b) && !(self.less)(b, a)
    }
}

impl fmt::Debug for TreeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeIndex")
            .field("name", &self.name)
            .field("field", &self.field)
            .field("len", &self.tree.len())
            .finish()
    }
}

impl SecondaryIndex for TreeIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn field(&self) -> &str {
        &self.field
    }

    fn kind(&self) -> IndexKind {
        IndexKind::Tree
    }

    fn key_of(&self, field_value: &Value) -> Result<IndexValue, IndexError> {
        IndexValue::project(field_value, self.transform.as_ref())
    }

    fn insert(&mut self, field_value: &Value, storage_key: &str) -> Result<(), IndexError> {
        check_storage_key(&self.name, storage_key)?;
        let key = self.checked_key(field_value)?;
        trace!(index = %self.name, %key, storage_key, "tree index insert");
        self.tree.insert(IndexEntry::new(key, storage_key));
        Ok(())
    }

    fn remove(&mut self, field_value: &Value, storage_key: &str) -> Result<bool, IndexError> {
        check_storage_key(&self.name, storage_key)?;
        let entry = IndexEntry::new(self.checked_key(field_value)?, storage_key);
        Ok(self.tree.remove(&entry))
    }

    fn remove_where(
        &mut self,
        field_value: &Value,
        predicate: &mut dyn FnMut(&str) -> bool,
    ) -> Result<bool, IndexError> {
        let needle = IndexEntry::needle(self.checked_key(field_value)?);

        let mut cur = self.tree.lower_bound(&needle);
        while let Some(id) = cur {
            let entry = self.tree.value(id);
            if !self.same_key(&entry.key, &needle.key) {
                break;
            }
            if predicate(&entry.storage_key) {
                self.tree.remove_node(id);
                return Ok(true);
            }
            cur = self.tree.successor(id);
        }
        Ok(false)
    }

    fn find(&self, field_value: &Value) -> Result<Option<&str>, IndexError> {
        let needle = IndexEntry::needle(self.key_of(field_value)?);
        Ok(self
            .tree
            .lower_bound(&needle)
            .map(|id| self.tree.value(id))
            .filter(|entry| self.same_key(&entry.key, &needle.key))
            .map(|entry| entry.storage_key.as_str()))
    }

    fn get_range(&self, start: &Value, end: &Value) -> Result<Vec<&str>, IndexError> {
        let needle = IndexEntry::needle(self.key_of(start)?);
        let end = self.key_of(end)?;

        let mut out = Vec::new();
        let mut cur = self.tree.lower_bound(&needle);
        while let Some(id) = cur {
            let entry = self.tree.value(id);
            if (self.less)(&end, &entry.key) {
                break;
            }
            out.push(entry.storage_key.as_str());
            cur = self.tree.successor(id);
        }
        Ok(out)
    }

    fn for_each(&self, visit: &mut dyn FnMut(&IndexValue, &str)) {
        self.tree
            .for_each(|entry| visit(&entry.key, &entry.storage_key));
    }

    fn clear(&mut self) {
        self.tree.clear();
    }

    fn len(&self) -> usize {
        self.tree.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(index: &TreeIndex) -> Vec<(IndexValue, String)> {
        let mut out = vec![];
        index.for_each(&mut |k, s| out.push((k.clone(), s.to_string())));
        out
    }

    #[test]
    fn test_tree_index_creation() {
        let index = TreeIndex::new("by_age", "age");
        assert_eq!(index.name(), "by_age");
        assert_eq!(index.field(), "age");
        assert_eq!(index.kind(), IndexKind::Tree);
        assert!(index.is_empty());
    }

    #[test]
    fn test_insert_and_find() {
        let mut index = TreeIndex::new("by_age", "age");
        index.insert(&Value::Int(30), "p:a").unwrap();
        index.insert(&Value::Int(20), "p:b").unwrap();

        assert_eq!(index.find(&Value::Int(20)).unwrap(), Some("p:b"));
        assert_eq!(index.find(&Value::Int(25)).unwrap(), None);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_duplicates_ordered_by_storage_key() {
        let mut index = TreeIndex::new("by_city", "city");
        for key in ["p:c", "p:a", "p:b"] {
            index.insert(&Value::from("Oslo"), key).unwrap();
        }
        index.insert(&Value::from("Bergen"), "p:z").unwrap();

        assert_eq!(index.find_all(&Value::from("Oslo")).unwrap(), vec!["p:a", "p:b", "p:c"]);
        assert_eq!(index.find(&Value::from("Oslo")).unwrap(), Some("p:a"));
        assert_eq!(index.entry_by_rank(1).map(|e| e.storage_key.as_str()), Some("p:z"));
    }

    #[test]
    fn test_remove_exact_and_by_predicate() {
        let mut index = TreeIndex::new("by_city", "city");
        for key in ["p:1", "p:2", "p:3"] {
            index.insert(&Value::from("Oslo"), key).unwrap();
        }

        assert!(index.remove(&Value::from("Oslo"), "p:2").unwrap());
        assert!(!index.remove(&Value::from("Oslo"), "p:2").unwrap());
        assert!(index.remove_where(&Value::from("Oslo"), &mut |k| k.ends_with('3')).unwrap());
        assert!(!index.remove_where(&Value::from("Oslo"), &mut |k| k.ends_with('3')).unwrap());
        assert!(!index.remove_where(&Value::from("Rome"), &mut |_| true).unwrap());

        assert_eq!(keys(&index), vec![(IndexValue::from("Oslo"), "p:1".to_string())]);
    }

    #[test]
    fn test_range_is_inclusive() {
        let mut index = TreeIndex::new("by_age", "age");
        for (age, key) in [(20, "p:a"), (25, "p:b"), (30, "p:c"), (35, "p:d"), (40, "p:e")] {
            index.insert(&Value::Int(age), key).unwrap();
        }

        let hits = index.get_range(&Value::Int(25), &Value::Int(35)).unwrap();
        assert_eq!(hits, vec!["p:b", "p:c", "p:d"]);
        assert!(index.get_range(&Value::Int(41), &Value::Int(50)).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_null_and_empty_storage_key() {
        let mut index = TreeIndex::new("by_age", "age");
        assert!(matches!(
            index.insert(&Value::Null, "p:a"),
            Err(IndexError::NullKey { .. })
        ));
        assert!(matches!(
            index.insert(&Value::Int(1), ""),
            Err(IndexError::EmptyStorageKey { .. })
        ));
        assert!(matches!(
            index.insert(&Value::Array(vec![]), "p:a"),
            Err(IndexError::UnsupportedValueType(_))
        ));
        assert!(index.is_empty());

        assert!(matches!(
            index.remove(&Value::Null, "p:a"),
            Err(IndexError::NullKey { .. })
        ));
        assert!(matches!(
            index.remove(&Value::Int(1), ""),
            Err(IndexError::EmptyStorageKey { .. })
        ));
    }

    #[test]
    fn test_transform_and_comparator() {
        let transform: Transform = Arc::new(|v: &Value| match v {
            Value::String(s) => Value::String(s.to_lowercase()),
            other => other.clone(),
        });
        let descending: Comparator = Arc::new(|a: &IndexValue, b: &IndexValue| a > b);
        let mut index = TreeIndex::with_options("by_name", "name", Some(transform), Some(descending));

        index.insert(&Value::from("alice"), "p:1").unwrap();
        index.insert(&Value::from("Carol"), "p:3").unwrap();
        index.insert(&Value::from("BOB"), "p:2").unwrap();

        let order: Vec<String> = keys(&index).into_iter().map(|(_, s)| s).collect();
        assert_eq!(order, vec!["p:3", "p:2", "p:1"]);

        assert_eq!(index.find(&Value::from("CAROL")).unwrap(), Some("p:3"));
        // Bounds are given in comparator order.
        assert_eq!(
            index.get_range(&Value::from("Carol"), &Value::from("bob")).unwrap(),
            vec!["p:3", "p:2"]
        );
    }

    #[test]
    fn test_clear() {
        let mut index = TreeIndex::new("by_age", "age");
        for age in 0..10 {
            index.insert(&Value::Int(age), &format!("p:{age}")).unwrap();
        }
        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.find(&Value::Int(3)).unwrap(), None);
    }
}
