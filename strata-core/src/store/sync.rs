//! Reconciliation of a store against an incoming record set

use super::{Store, StoreError, StoreResult};
use crate::backend::Backend;
use crate::record::{Record, RecordError};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Three-way diff between stored and incoming records, keyed by id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncPlan {
    /// Incoming records whose id is not stored
    pub to_create: BTreeMap<String, Record>,
    /// Incoming versions of stored records that differ
    pub to_update: BTreeMap<String, Record>,
    /// Stored records absent from the incoming set and accepted for deletion
    pub to_delete: BTreeMap<String, Record>,
    /// Shared ids left alone
    pub unchanged: usize,
}

impl SyncPlan {
    /// Diff `existing` against `incoming`, both keyed by `id_field`
    ///
    /// When `incoming` repeats an id the last occurrence wins.
    pub fn compute<D, S>(
        existing: &[Record],
        incoming: &[Record],
        id_field: &str,
        mut is_different: D,
        mut should_delete: S,
    ) -> Result<Self, RecordError>
    where
        D: FnMut(&Record, &Record) -> bool,
        S: FnMut(&Record) -> bool,
    {
        let mut current = BTreeMap::new();
        for record in existing {
            current.insert(record.id(id_field)?, record);
        }

        let mut wanted = BTreeMap::new();
        for record in incoming {
            wanted.insert(record.id(id_field)?, record);
        }

        let mut plan = SyncPlan::default();
        for (id, stored) in &current {
            match wanted.get(id) {
                Some(next) if is_different(stored, next) => {
                    plan.to_update.insert(id.clone(), (*next).clone());
                }
                Some(_) => plan.unchanged += 1,
                None if should_delete(stored) => {
                    plan.to_delete.insert(id.clone(), (*stored).clone());
                }
                None => {}
            }
        }
        for (id, next) in wanted {
            if !current.contains_key(&id) {
                plan.to_create.insert(id, next.clone());
            }
        }

        Ok(plan)
    }

    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }

    /// Plain JSON view of the pending changes
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "to_create": group_json(&self.to_create),
            "to_update": group_json(&self.to_update),
            "to_delete": group_json(&self.to_delete),
            "unchanged": self.unchanged,
        })
    }
}

/// Records affected by a completed sync, grouped by id
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncSummary {
    pub created: BTreeMap<String, Record>,
    pub updated: BTreeMap<String, Record>,
    pub deleted: BTreeMap<String, Record>,
}

impl SyncSummary {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    /// Plain JSON view with untagged field values
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "created": group_json(&self.created),
            "updated": group_json(&self.updated),
            "deleted": group_json(&self.deleted),
        })
    }
}

/// `{ id: record }` object with untagged field values
fn group_json(records: &BTreeMap<String, Record>) -> serde_json::Value {
    records
        .iter()
        .map(|(id, record)| (id.clone(), record.to_json()))
        .collect::<serde_json::Map<_, _>>()
        .into()
}

impl<B: Backend> Store<B> {
    /// Compute what [`Store::sync`] would do without applying it
    pub fn plan_sync<D, S>(
        &self,
        incoming: &[Record],
        id_field: &str,
        is_different: D,
        should_delete: S,
    ) -> StoreResult<SyncPlan>
    where
        D: FnMut(&Record, &Record) -> bool,
        S: FnMut(&Record) -> bool,
    {
        if id_field != self.id_field {
            return Err(StoreError::IdFieldMismatch {
                expected: self.id_field.clone(),
                found: id_field.to_string(),
            });
        }

        let existing = self.records()?;
        Ok(SyncPlan::compute(
            &existing,
            incoming,
            id_field,
            is_different,
            should_delete,
        )?)
    }

    /// Make the store match `incoming`
    ///
    /// Stored ids missing from `incoming` are deleted when `should_delete`
    /// accepts them, shared ids are rewritten when `is_different` reports a
    /// change and new ids are created. Phases run delete, update, create, each
    /// in ascending id order. Every incoming write is checked before the first
    /// phase starts, so a rejected record leaves the store untouched.
    pub fn sync<D, S>(
        &mut self,
        incoming: &[Record],
        id_field: &str,
        is_different: D,
        should_delete: S,
    ) -> StoreResult<SyncSummary>
    where
        D: FnMut(&Record, &Record) -> bool,
        S: FnMut(&Record) -> bool,
    {
        let plan = self.plan_sync(incoming, id_field, is_different, should_delete)?;
        debug!(
            store = %self.prefix,
            create = plan.to_create.len(),
            update = plan.to_update.len(),
            delete = plan.to_delete.len(),
            "Sync plan computed"
        );

        for record in plan.to_update.values().chain(plan.to_create.values()) {
            self.prepare_write(record)?;
        }

        for record in plan.to_delete.values() {
            self.remove(record)?;
        }
        for record in plan.to_update.values() {
            self.add_or_update(record)?;
        }
        for record in plan.to_create.values() {
            self.add_or_update(record)?;
        }

        info!(
            "Sync of '{}' complete: {} created, {} updated, {} deleted, {} unchanged",
            self.prefix,
            plan.to_create.len(),
            plan.to_update.len(),
            plan.to_delete.len(),
            plan.unchanged
        );

        Ok(SyncSummary {
            created: plan.to_create,
            updated: plan.to_update,
            deleted: plan.to_delete,
        })
    }
}
