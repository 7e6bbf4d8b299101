pub mod config;
pub mod import;
pub mod sync;

pub use config::*;
pub use import::*;
pub use sync::*;

use anyhow::{Context, Result};
use std::path::Path;
use strata_core::{Record, Value};

/// Read a JSON array of objects
pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read records file: {}", path.display()))?;

    let json: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse records file: {}", path.display()))?;

    let serde_json::Value::Array(items) = json else {
        anyhow::bail!("{} must contain a JSON array of records", path.display());
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            Record::from_json(item)
                .with_context(|| format!("Invalid record #{} in {}", i, path.display()))
        })
        .collect()
}

/// Parse a command line bound as JSON, falling back to a plain string
pub fn parse_bound(raw: &str) -> Value {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json) => Value::from(json),
        Err(_) => Value::String(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_bound() {
        assert_eq!(parse_bound("42"), Value::Int(42));
        assert_eq!(parse_bound("2.5"), Value::Float(2.5));
        assert_eq!(parse_bound("\"42\""), Value::from("42"));
        assert_eq!(parse_bound("london"), Value::from("london"));
    }

    #[test]
    fn test_read_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("people.json");
        std::fs::write(&path, r#"[{"id": "a", "age": 3}, {"id": "b"}]"#).unwrap();

        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("age"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_read_records_rejects_non_arrays() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("one.json");
        std::fs::write(&path, r#"{"id": "a"}"#).unwrap();
        assert!(read_records(&path).is_err());

        std::fs::write(&path, r#"[1, 2]"#).unwrap();
        assert!(read_records(&path).is_err());
    }
}
