//! Store configuration
//!
//! Loaded from TOML. A missing file yields the defaults.

use crate::index::{IndexDefinition, IndexKind};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Settings for one [`Store`](crate::store::Store)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend key namespace
    pub prefix: String,
    /// Record field holding the unique id
    pub id_field: String,
    /// Engine for index definitions that do not pick one
    pub default_index_kind: IndexKind,
    /// Fixed seed for skip-list level generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skiplist_seed: Option<u64>,
    /// Indexes created with the store
    pub indexes: Vec<IndexDefinition>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            prefix: "records".to_string(),
            id_field: "id".to_string(),
            default_index_kind: IndexKind::Tree,
            skiplist_seed: None,
            indexes: Vec::new(),
        }
    }
}

impl StoreConfig {
    /// Load configuration from `path`, or the defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: StoreConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.prefix.is_empty() {
            return Err(anyhow::anyhow!("Store prefix cannot be empty"));
        }

        if self.id_field.is_empty() {
            return Err(anyhow::anyhow!("Id field cannot be empty"));
        }

        let mut seen = HashSet::new();
        for definition in &self.indexes {
            definition
                .validate()
                .with_context(|| format!("Invalid index definition '{}'", definition.name))?;
            if !seen.insert(definition.name.as_str()) {
                return Err(anyhow::anyhow!("Duplicate index name: {}", definition.name));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.prefix, "records");
        assert_eq!(config.id_field, "id");
        assert_eq!(config.default_index_kind, IndexKind::Tree);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = StoreConfig::default();
        config.prefix.clear();
        assert!(config.validate().is_err());

        let mut config = StoreConfig::default();
        config.id_field.clear();
        assert!(config.validate().is_err());

        let mut config = StoreConfig::default();
        config.indexes = vec![
            IndexDefinition::new("by_age", "age"),
            IndexDefinition::new("by_age", "years"),
        ];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = StoreConfig::load(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.prefix, "records");
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("strata.toml");

        let config = StoreConfig {
            prefix: "people".to_string(),
            id_field: "uid".to_string(),
            default_index_kind: IndexKind::SkipList,
            skiplist_seed: Some(7),
            indexes: vec![IndexDefinition::new("by_age", "age").tree()],
        };
        config.save(&config_path).unwrap();

        let loaded = StoreConfig::load(&config_path).unwrap();
        assert_eq!(loaded.prefix, "people");
        assert_eq!(loaded.id_field, "uid");
        assert_eq!(loaded.default_index_kind, IndexKind::SkipList);
        assert_eq!(loaded.skiplist_seed, Some(7));
        assert_eq!(loaded.indexes.len(), 1);
        assert_eq!(loaded.indexes[0].kind, Some(IndexKind::Tree));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("strata.toml");
        std::fs::write(
            &config_path,
            "prefix = \"teams\"\n\n[[indexes]]\nname = \"by_city\"\nfield = \"address.city\"\n",
        )
        .unwrap();

        let config = StoreConfig::load(&config_path).unwrap();
        assert_eq!(config.prefix, "teams");
        assert_eq!(config.id_field, "id");
        assert_eq!(config.indexes[0].field, "address.city");
        assert!(config.indexes[0].kind.is_none());
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("strata.toml");
        std::fs::write(&config_path, "prefix = \"\"\n").unwrap();

        assert!(StoreConfig::load(&config_path).is_err());
    }
}
