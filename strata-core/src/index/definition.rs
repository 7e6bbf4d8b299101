//! Declarative index definitions

use super::{Comparator, IndexError, SecondaryIndex, SkipListIndex, Transform, TreeIndex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Engine backing an index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    /// AVL tree; duplicates ordered by storage key
    #[default]
    Tree,
    /// Skip list; duplicates kept as separate nodes
    SkipList,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::Tree => write!(f, "tree"),
            IndexKind::SkipList => write!(f, "skip_list"),
        }
    }
}

/// Index definition
///
/// Transforms and comparators are code, so they are attached with the
/// builder methods and never serialized.
#[derive(Clone, Serialize, Deserialize)]
pub struct IndexDefinition {
    /// Index name, unique per store
    pub name: String,
    /// Record field (dotted path) to index
    pub field: String,
    /// Engine; the store default applies when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<IndexKind>,
    #[serde(skip)]
    pub transform: Option<Transform>,
    #[serde(skip)]
    pub comparator: Option<Comparator>,
}

impl IndexDefinition {
    pub fn new(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
            kind: None,
            transform: None,
            comparator: None,
        }
    }

    /// Create a definition named `idx_<field>`
    pub fn single(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(format!("idx_{}", field), field)
    }

    pub fn kind(mut self, kind: IndexKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Use a tree-backed index
    pub fn tree(self) -> Self {
        self.kind(IndexKind::Tree)
    }

    /// Use a skip-list-backed index
    pub fn skip_list(self) -> Self {
        self.kind(IndexKind::SkipList)
    }

    pub fn transform<F>(mut self, f: F) -> Self
    where
        F: Fn(&crate::record::Value) -> crate::record::Value + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(f));
        self
    }

    pub fn comparator<F>(mut self, less: F) -> Self
    where
        F: Fn(&super::IndexValue, &super::IndexValue) -> bool + Send + Sync + 'static,
    {
        self.comparator = Some(Arc::new(less));
        self
    }

    pub fn validate(&self) -> Result<(), IndexError> {
        if self.name.trim().is_empty() {
            return Err(IndexError::InvalidDefinition("index name is empty".to_string()));
        }
        if self.field.trim().is_empty() {
            return Err(IndexError::InvalidDefinition(format!(
                "index '{}' has an empty field",
                self.name
            )));
        }
        Ok(())
    }

    /// Build an empty index for this definition
    pub fn create(
        &self,
        default_kind: IndexKind,
        seed: Option<u64>,
    ) -> Result<Box<dyn SecondaryIndex>, IndexError> {
        self.validate()?;

        let index: Box<dyn SecondaryIndex> = match self.kind.unwrap_or(default_kind) {
            IndexKind::Tree => Box::new(TreeIndex::with_options(
                self.name.clone(),
                self.field.clone(),
                self.transform.clone(),
                self.comparator.clone(),
            )),
            IndexKind::SkipList => {
                let index = SkipListIndex::with_options(
                    self.name.clone(),
                    self.field.clone(),
                    self.transform.clone(),
                    self.comparator.clone(),
                );
                match seed {
                    Some(seed) => Box::new(index.with_seed(seed)),
                    None => Box::new(index),
                }
            }
        };
        Ok(index)
    }
}

impl fmt::Debug for IndexDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexDefinition")
            .field("name", &self.name)
            .field("field", &self.field)
            .field("kind", &self.kind)
            .field("transform", &self.transform.is_some())
            .field("comparator", &self.comparator.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Value;

    #[test]
    fn test_single_field_naming() {
        let def = IndexDefinition::single("age");
        assert_eq!(def.name, "idx_age");
        assert_eq!(def.field, "age");
        assert!(def.kind.is_none());
    }

    #[test]
    fn test_create_uses_default_kind() {
        let def = IndexDefinition::new("by_age", "age");
        let index = def.create(IndexKind::SkipList, Some(1)).unwrap();
        assert_eq!(index.kind(), IndexKind::SkipList);

        let index = def.clone().tree().create(IndexKind::SkipList, None).unwrap();
        assert_eq!(index.kind(), IndexKind::Tree);
    }

    #[test]
    fn test_validation() {
        assert!(IndexDefinition::new("", "age").validate().is_err());
        assert!(matches!(
            IndexDefinition::new("by_age", " ").create(IndexKind::Tree, None),
            Err(IndexError::InvalidDefinition(_))
        ));
    }

    #[test]
    fn test_builder_attaches_transform() {
        let def = IndexDefinition::new("by_name", "name")
            .skip_list()
            .transform(|v| match v {
                Value::String(s) => Value::String(s.to_uppercase()),
                other => other.clone(),
            });

        let mut index = def.create(IndexKind::Tree, Some(5)).unwrap();
        index.insert(&Value::from("ada"), "p:1").unwrap();
        assert_eq!(index.find(&Value::from("ADA")).unwrap(), Some("p:1"));
    }

    #[test]
    fn test_toml_round_trip_skips_functions() {
        let def = IndexDefinition::new("by_age", "age").skip_list().comparator(|a, b| a > b);
        let text = toml::to_string(&def).unwrap();
        assert!(text.contains("kind = \"skip_list\""));

        let parsed: IndexDefinition = toml::from_str(&text).unwrap();
        assert_eq!(parsed.kind, Some(IndexKind::SkipList));
        assert!(parsed.comparator.is_none());
    }
}
