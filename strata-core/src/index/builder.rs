//! Index backfill
//!
//! Populates a freshly created index from existing records. The index is
//! only registered with the store once the build succeeded, so a failed
//! build leaves the store untouched.

use super::{IndexError, SecondaryIndex};
use crate::record::Record;
use tracing::{debug, info};

/// Outcome of a backfill
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Records scanned
    pub scanned: usize,
    /// Entries inserted into the index
    pub indexed: usize,
    /// Records lacking the field (or holding null)
    pub skipped: usize,
}

/// Index builder
pub struct IndexBuilder {
    /// Records between progress log lines
    progress_interval: usize,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self {
            progress_interval: 10_000,
        }
    }

    pub fn with_progress_interval(progress_interval: usize) -> Self {
        Self {
            progress_interval: progress_interval.max(1),
        }
    }

    /// Insert every `(storage_key, record)` pair into `index`
    ///
    /// Records without the indexed field are skipped. An unindexable field
    /// value aborts the build.
    pub fn build<'a, I>(
        &self,
        index: &mut dyn SecondaryIndex,
        records: I,
    ) -> Result<BuildReport, IndexError>
    where
        I: IntoIterator<Item = (&'a str, &'a Record)>,
    {
        let mut report = BuildReport::default();

        info!(index = index.name(), field = index.field(), "Starting index build");

        for (storage_key, record) in records {
            report.scanned += 1;

            match record.get_by_path(index.field()) {
                Some(value) if !value.is_null() => {
                    index.insert(value, storage_key)?;
                    report.indexed += 1;
                }
                _ => {
                    debug!(index = index.name(), storage_key, "Record lacks indexed field");
                    report.skipped += 1;
                }
            }

            if report.scanned % self.progress_interval == 0 {
                info!(
                    "Index build progress for '{}': {} records scanned, {} indexed",
                    index.name(),
                    report.scanned,
                    report.indexed
                );
            }
        }

        info!(
            "Completed index build for '{}': {} indexed, {} skipped",
            index.name(),
            report.indexed,
            report.skipped
        );

        Ok(report)
    }

    /// Clear `index` and build it again from `records`
    pub fn rebuild<'a, I>(
        &self,
        index: &mut dyn SecondaryIndex,
        records: I,
    ) -> Result<BuildReport, IndexError>
    where
        I: IntoIterator<Item = (&'a str, &'a Record)>,
    {
        info!("Rebuilding index '{}'", index.name());
        index.clear();
        self.build(index, records)
    }
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::TreeIndex;
    use crate::record::Value;

    fn create_test_records(count: usize) -> Vec<(String, Record)> {
        (0..count)
            .map(|i| {
                let rec = Record::new()
                    .with("id", i as i64)
                    .with("name", format!("User{}", i))
                    .with("age", 20 + (i as i64 % 50));
                (format!("users:{}", i), rec)
            })
            .collect()
    }

    fn pairs(records: &[(String, Record)]) -> impl Iterator<Item = (&str, &Record)> {
        records.iter().map(|(k, r)| (k.as_str(), r))
    }

    #[test]
    fn test_build_index() {
        let builder = IndexBuilder::with_progress_interval(10);
        let mut index = TreeIndex::new("by_name", "name");

        let records = create_test_records(25);
        let report = builder.build(&mut index, pairs(&records)).unwrap();

        assert_eq!(report.scanned, 25);
        assert_eq!(report.indexed, 25);
        assert_eq!(index.len(), 25);
    }

    #[test]
    fn test_missing_and_null_fields_are_skipped() {
        let builder = IndexBuilder::new();
        let mut index = TreeIndex::new("by_email", "email");

        let records = vec![
            ("users:1".to_string(), Record::new().with("id", 1i64).with("email", "a@x")),
            ("users:2".to_string(), Record::new().with("id", 2i64)),
            ("users:3".to_string(), Record::new().with("id", 3i64).with("email", Value::Null)),
        ];
        let report = builder.build(&mut index, pairs(&records)).unwrap();

        assert_eq!(report, BuildReport { scanned: 3, indexed: 1, skipped: 2 });
        assert_eq!(index.find(&Value::from("a@x")).unwrap(), Some("users:1"));
    }

    #[test]
    fn test_unindexable_value_aborts() {
        let builder = IndexBuilder::new();
        let mut index = TreeIndex::new("by_tags", "tags");
        let records = vec![(
            "users:1".to_string(),
            Record::new().with("tags", vec![Value::from("a")]),
        )];

        let err = builder.build(&mut index, pairs(&records)).unwrap_err();
        assert!(matches!(err, IndexError::UnsupportedValueType(_)));
    }

    #[test]
    fn test_rebuild_index() {
        let builder = IndexBuilder::new();
        let mut index = TreeIndex::new("by_age", "age");

        let records = create_test_records(10);
        builder.build(&mut index, pairs(&records)).unwrap();
        assert_eq!(index.len(), 10);

        let more = create_test_records(20);
        builder.rebuild(&mut index, pairs(&more)).unwrap();
        assert_eq!(index.len(), 20);
    }
}
