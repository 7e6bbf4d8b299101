//! Store usage counters
//!
//! Writes are counted for the whole store, lookups per index.

use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Counters kept by a [`Store`](crate::store::Store)
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexStatistics {
    pub writes: WriteCounts,
    /// Lookup counters keyed by index name
    pub lookups: BTreeMap<String, LookupStats>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriteCounts {
    pub inserts: u64,
    pub updates: u64,
    pub deletes: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LookupStats {
    pub lookups: u64,
    /// Lookups that returned at least one record
    pub hits: u64,
    /// Records returned across all lookups
    pub records: u64,
    pub total_micros: u64,
    pub max_micros: u64,
}

impl LookupStats {
    pub fn misses(&self) -> u64 {
        self.lookups - self.hits
    }

    pub fn hit_rate(&self) -> f64 {
        if self.lookups == 0 {
            0.0
        } else {
            self.hits as f64 / self.lookups as f64
        }
    }

    pub fn average(&self) -> Duration {
        if self.lookups == 0 {
            Duration::ZERO
        } else {
            Duration::from_micros(self.total_micros / self.lookups)
        }
    }
}

impl IndexStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting lookups on `index`; existing counters are kept
    pub fn track(&mut self, index: &str) {
        self.lookups.entry(index.to_string()).or_default();
    }

    pub fn untrack(&mut self, index: &str) {
        self.lookups.remove(index);
    }

    pub fn record_insert(&mut self) {
        self.writes.inserts += 1;
    }

    pub fn record_update(&mut self) {
        self.writes.updates += 1;
    }

    pub fn record_delete(&mut self) {
        self.writes.deletes += 1;
    }

    /// Count a lookup on a tracked index that returned `records` records
    pub fn record_lookup(&mut self, index: &str, records: usize, elapsed: Duration) {
        let Some(stats) = self.lookups.get_mut(index) else {
            return;
        };
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);

        stats.lookups += 1;
        stats.hits += u64::from(records > 0);
        stats.records += records as u64;
        stats.total_micros = stats.total_micros.saturating_add(micros);
        stats.max_micros = stats.max_micros.max(micros);
    }

    pub fn lookups(&self, index: &str) -> Option<&LookupStats> {
        self.lookups.get(index)
    }

    pub fn total_lookups(&self) -> u64 {
        self.lookups.values().map(|s| s.lookups).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_counters() {
        let mut stats = IndexStatistics::new();
        stats.record_insert();
        stats.record_insert();
        stats.record_update();
        stats.record_delete();

        assert_eq!(stats.writes, WriteCounts { inserts: 2, updates: 1, deletes: 1 });
    }

    #[test]
    fn test_lookup_counters() {
        let mut stats = IndexStatistics::new();
        stats.track("by_age");

        stats.record_lookup("by_age", 4, Duration::from_micros(30));
        stats.record_lookup("by_age", 0, Duration::from_micros(10));

        let by_age = stats.lookups("by_age").unwrap();
        assert_eq!(by_age.lookups, 2);
        assert_eq!(by_age.hits, 1);
        assert_eq!(by_age.misses(), 1);
        assert_eq!(by_age.records, 4);
        assert_eq!(by_age.max_micros, 30);
        assert_eq!(by_age.hit_rate(), 0.5);
        assert_eq!(by_age.average(), Duration::from_micros(20));
    }

    #[test]
    fn test_untracked_index_is_ignored() {
        let mut stats = IndexStatistics::new();
        stats.record_lookup("missing", 1, Duration::ZERO);
        assert_eq!(stats.total_lookups(), 0);

        stats.track("by_name");
        stats.record_lookup("by_name", 1, Duration::ZERO);
        stats.track("by_name");
        assert_eq!(stats.total_lookups(), 1);

        stats.untrack("by_name");
        assert!(stats.lookups("by_name").is_none());
    }

    #[test]
    fn test_serializes_to_json() {
        let mut stats = IndexStatistics::new();
        stats.track("by_age");
        stats.record_insert();

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["writes"]["inserts"], 1);
        assert_eq!(json["lookups"]["by_age"]["lookups"], 0);
    }
}
