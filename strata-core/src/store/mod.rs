//! Record store with secondary indexes
//!
//! A [`Store`] persists encoded records into a [`Backend`] under the key
//! `<prefix>:<id>` and keeps every registered index consistent with the
//! stored records. Only keys inside the store's namespace are visible to
//! scans, `clear` and index builds, so several stores can share a backend.

pub mod sync;

pub use sync::{SyncPlan, SyncSummary};

use crate::backend::{Backend, BackendError};
use crate::config::StoreConfig;
use crate::index::{
    BuildReport, IndexBuilder, IndexDefinition, IndexError, IndexKind, IndexStatistics,
    SecondaryIndex,
};
use crate::record::{Record, RecordError, Value};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Separator between the namespace prefix and the record id
pub const KEY_SEPARATOR: char = ':';

pub type StoreResult<T> = Result<T, StoreError>;

pub struct Store<B: Backend> {
    backend: B,
    prefix: String,
    /// `prefix` followed by the separator
    namespace: String,
    id_field: String,
    default_kind: IndexKind,
    skiplist_seed: Option<u64>,
    indexes: BTreeMap<String, Box<dyn SecondaryIndex>>,
    builder: IndexBuilder,
    statistics: Mutex<IndexStatistics>,
}

impl<B: Backend> Store<B> {
    /// Create a store over `backend`
    ///
    /// Fails when `prefix` or `id_field` is empty, or when the prefix contains
    /// the key separator.
    pub fn new(backend: B, prefix: impl Into<String>, id_field: impl Into<String>) -> StoreResult<Self> {
        let prefix = prefix.into();
        let id_field = id_field.into();

        if prefix.is_empty() {
            return Err(StoreError::InvalidConfig("prefix must not be empty".to_string()));
        }
        if prefix.contains(KEY_SEPARATOR) {
            return Err(StoreError::InvalidConfig(format!(
                "prefix '{}' must not contain '{}'",
                prefix, KEY_SEPARATOR
            )));
        }
        if id_field.is_empty() {
            return Err(StoreError::InvalidConfig("id field must not be empty".to_string()));
        }

        Ok(Self {
            backend,
            namespace: format!("{}{}", prefix, KEY_SEPARATOR),
            prefix,
            id_field,
            default_kind: IndexKind::default(),
            skiplist_seed: None,
            indexes: BTreeMap::new(),
            builder: IndexBuilder::new(),
            statistics: Mutex::new(IndexStatistics::new()),
        })
    }

    /// Create a store and its declared indexes from configuration
    pub fn from_config(backend: B, config: &StoreConfig) -> StoreResult<Self> {
        let mut store = Self::new(backend, config.prefix.clone(), config.id_field.clone())?
            .with_default_index_kind(config.default_index_kind);
        if let Some(seed) = config.skiplist_seed {
            store = store.with_skiplist_seed(seed);
        }

        for definition in &config.indexes {
            store.add_index(definition.clone())?;
        }
        Ok(store)
    }

    /// Engine used by definitions that leave the kind unset
    pub fn with_default_index_kind(mut self, kind: IndexKind) -> Self {
        self.default_kind = kind;
        self
    }

    /// Seed skip-list indexes created from now on
    pub fn with_skiplist_seed(mut self, seed: u64) -> Self {
        self.skiplist_seed = Some(seed);
        self
    }

    /// Progress logging interval of index backfills
    pub fn with_builder(mut self, builder: IndexBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Backend key of the record with id `id`
    pub fn storage_key(&self, id: &str) -> String {
        format!("{}{}", self.namespace, id)
    }

    /// Insert `record`, replacing any stored record with the same id
    ///
    /// Every check (id, encoding, index keys) runs before the backend or any
    /// index is touched.
    pub fn add_or_update(&mut self, record: &Record) -> StoreResult<()> {
        let (id, bytes) = self.prepare_write(record)?;
        let key = self.storage_key(&id);

        let previous = self.read(&key)?;
        if let Some(old) = &previous {
            self.unindex(old, &key)?;
        }

        self.backend.set(&key, bytes)?;
        for index in self.indexes.values_mut() {
            if let Some(value) = indexed_value(record, index.field()) {
                index.insert(value, &key)?;
            }
        }

        let mut stats = self.statistics.lock();
        if previous.is_some() {
            stats.record_update();
        } else {
            stats.record_insert();
        }

        debug!(store = %self.prefix, %id, updated = previous.is_some(), "Record written");
        Ok(())
    }

    /// Remove the stored version of `record`
    pub fn remove(&mut self, record: &Record) -> StoreResult<bool> {
        let id = record.id(&self.id_field)?;
        self.remove_by_key(&id)
    }

    /// Remove the record with id `id`
    pub fn remove_by_key(&mut self, id: &str) -> StoreResult<bool> {
        let key = self.storage_key(id);
        Ok(self.remove_stored(&key)?.is_some())
    }

    pub fn get(&self, id: &str) -> StoreResult<Option<Record>> {
        self.read(&self.storage_key(id))
    }

    pub fn contains(&self, id: &str) -> StoreResult<bool> {
        Ok(self.backend.get(&self.storage_key(id))?.is_some())
    }

    /// Number of records in this store's namespace
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.backend.keys_with_prefix(&self.namespace)?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Remove every record in the namespace and empty every index
    pub fn clear(&mut self) -> StoreResult<()> {
        let keys = self.backend.keys_with_prefix(&self.namespace)?;
        for key in &keys {
            self.backend.remove(key)?;
        }
        for index in self.indexes.values_mut() {
            index.clear();
        }

        info!(store = %self.prefix, removed = keys.len(), "Store cleared");
        Ok(())
    }

    /// Register an index and backfill it from the stored records
    ///
    /// Records lacking the field are skipped. The index only becomes visible
    /// once the backfill succeeded.
    pub fn add_index(&mut self, definition: IndexDefinition) -> StoreResult<BuildReport> {
        if self.indexes.contains_key(&definition.name) {
            return Err(StoreError::DuplicateIndex(definition.name));
        }

        let mut index = definition.create(self.default_kind, self.skiplist_seed)?;
        let records = self.scan()?;
        let report = self.builder.build(
            index.as_mut(),
            records.iter().map(|(key, record)| (key.as_str(), record)),
        )?;

        info!(
            store = %self.prefix,
            index = %definition.name,
            field = %definition.field,
            kind = %index.kind(),
            indexed = report.indexed,
            "Index created"
        );

        self.statistics.lock().track(&definition.name);
        self.indexes.insert(definition.name, index);
        Ok(report)
    }

    pub fn remove_index(&mut self, name: &str) -> StoreResult<()> {
        if self.indexes.remove(name).is_none() {
            return Err(StoreError::IndexNotFound(name.to_string()));
        }
        self.statistics.lock().untrack(name);
        info!(store = %self.prefix, index = name, "Index removed");
        Ok(())
    }

    pub fn has_index(&self, name: &str) -> bool {
        self.indexes.contains_key(name)
    }

    /// Registered index names in ascending order
    pub fn index_names(&self) -> Vec<&str> {
        self.indexes.keys().map(String::as_str).collect()
    }

    pub fn index(&self, name: &str) -> StoreResult<&dyn SecondaryIndex> {
        self.indexes
            .get(name)
            .map(|index| index.as_ref())
            .ok_or_else(|| StoreError::IndexNotFound(name.to_string()))
    }

    /// Snapshot of the usage counters
    pub fn index_statistics(&self) -> IndexStatistics {
        self.statistics.lock().clone()
    }

    /// Record stored under the first index entry equal to `value`
    pub fn get_first_by_index(&self, name: &str, value: &Value) -> StoreResult<Option<Record>> {
        let started = Instant::now();
        let record = match self.index(name)?.find(value)? {
            Some(key) => self.read(key)?,
            None => None,
        };
        self.record_lookup(name, usize::from(record.is_some()), started);
        Ok(record)
    }

    /// Records whose index keys lie in `[start, end]`, in index order
    pub fn get_range_by_index(&self, name: &str, start: &Value, end: &Value) -> StoreResult<Vec<Record>> {
        let started = Instant::now();
        let keys = self.index(name)?.get_range(start, end)?;
        let records = self.read_all(&keys)?;
        self.record_lookup(name, records.len(), started);
        Ok(records)
    }

    /// Every record whose index key equals `value`
    pub fn find_all_by_index(&self, name: &str, value: &Value) -> StoreResult<Vec<Record>> {
        self.get_range_by_index(name, value, value)
    }

    /// Every indexed record, in index order
    pub fn get_all_by_index(&self, name: &str) -> StoreResult<Vec<Record>> {
        let started = Instant::now();
        let mut records = Vec::new();
        self.for_each_by_index(name, |record| records.push(record.clone()))?;
        self.record_lookup(name, records.len(), started);
        Ok(records)
    }

    /// Remove the record of the first index entry equal to `value`
    pub fn remove_first_by_index(&mut self, name: &str, value: &Value) -> StoreResult<Option<Record>> {
        let key = self.index(name)?.find(value)?.map(str::to_string);
        match key {
            Some(key) => self.remove_stored(&key),
            None => Ok(None),
        }
    }

    /// Remove every record whose index key lies in `[start, end]`
    pub fn remove_range_by_index(
        &mut self,
        name: &str,
        start: &Value,
        end: &Value,
    ) -> StoreResult<Vec<Record>> {
        let keys: Vec<String> = self
            .index(name)?
            .get_range(start, end)?
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut removed = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(record) = self.remove_stored(&key)? {
                removed.push(record);
            }
        }
        Ok(removed)
    }

    /// Visit every record in backend order
    pub fn for_each<F>(&self, mut visit: F) -> StoreResult<()>
    where
        F: FnMut(&Record),
    {
        for (_, record) in self.scan()? {
            visit(&record);
        }
        Ok(())
    }

    /// Visit every indexed record in index order
    pub fn for_each_by_index<F>(&self, name: &str, mut visit: F) -> StoreResult<()>
    where
        F: FnMut(&Record),
    {
        for key in self.index_keys(name)? {
            if let Some(record) = self.read(&key)? {
                visit(&record);
            }
        }
        Ok(())
    }

    pub fn map<R, F>(&self, mut f: F) -> StoreResult<Vec<R>>
    where
        F: FnMut(&Record) -> R,
    {
        let mut out = Vec::new();
        self.for_each(|record| out.push(f(record)))?;
        Ok(out)
    }

    pub fn map_by_index<R, F>(&self, name: &str, mut f: F) -> StoreResult<Vec<R>>
    where
        F: FnMut(&Record) -> R,
    {
        let mut out = Vec::new();
        self.for_each_by_index(name, |record| out.push(f(record)))?;
        Ok(out)
    }

    /// Every stored record
    pub fn records(&self) -> StoreResult<Vec<Record>> {
        Ok(self.scan()?.into_iter().map(|(_, record)| record).collect())
    }

    /// Run every check of a write and return the id and encoded bytes
    fn prepare_write(&self, record: &Record) -> StoreResult<(String, Vec<u8>)> {
        record.validate()?;
        let id = record.id(&self.id_field)?;
        let bytes = record.encode()?;
        for index in self.indexes.values() {
            if let Some(value) = indexed_value(record, index.field()) {
                index.checked_key(value)?;
            }
        }
        Ok((id, bytes))
    }

    fn read(&self, key: &str) -> StoreResult<Option<Record>> {
        match self.backend.get(key)? {
            Some(bytes) => Ok(Some(Record::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn read_all(&self, keys: &[&str]) -> StoreResult<Vec<Record>> {
        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            match self.read(key)? {
                Some(record) => records.push(record),
                None => warn!(store = %self.prefix, key, "Index entry points at a missing record"),
            }
        }
        Ok(records)
    }

    fn scan(&self) -> StoreResult<Vec<(String, Record)>> {
        let keys = self.backend.keys_with_prefix(&self.namespace)?;
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(record) = self.read(&key)? {
                out.push((key, record));
            }
        }
        Ok(out)
    }

    fn index_keys(&self, name: &str) -> StoreResult<Vec<String>> {
        let index = self.index(name)?;
        let mut keys = Vec::with_capacity(index.len());
        index.for_each(&mut |_, key| keys.push(key.to_string()));
        Ok(keys)
    }

    /// Delete a stored record and its index entries
    fn remove_stored(&mut self, key: &str) -> StoreResult<Option<Record>> {
        let Some(record) = self.read(key)? else {
            return Ok(None);
        };

        self.unindex(&record, key)?;
        self.backend.remove(key)?;
        self.statistics.lock().record_delete();

        debug!(store = %self.prefix, key, "Record removed");
        Ok(Some(record))
    }

    fn unindex(&mut self, record: &Record, key: &str) -> StoreResult<()> {
        for index in self.indexes.values_mut() {
            if let Some(value) = indexed_value(record, index.field()) {
                if !index.remove(value, key)? {
                    warn!(index = index.name(), key, "Stored record was missing from index");
                }
            }
        }
        Ok(())
    }

    fn record_lookup(&self, name: &str, results: usize, started: Instant) {
        self.statistics
            .lock()
            .record_lookup(name, results, started.elapsed());
    }
}

impl<B: Backend> std::fmt::Debug for Store<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("prefix", &self.prefix)
            .field("id_field", &self.id_field)
            .field("indexes", &self.index_names())
            .finish()
    }
}

/// Field value an index should see, with null treated as absent
fn indexed_value<'a>(record: &'a Record, field: &str) -> Option<&'a Value> {
    record.get_by_path(field).filter(|value| !value.is_null())
}

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),

    #[error("Index '{0}' already exists")]
    DuplicateIndex(String),

    #[error("Index '{0}' not found")]
    IndexNotFound(String),

    #[error("Sync keyed on '{found}' but the store id field is '{expected}'")]
    IdFieldMismatch { expected: String, found: String },

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}
