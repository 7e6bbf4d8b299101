//! Strata Core - Ordered indexes over a pluggable key-value backend
//!
//! This crate provides:
//! - Ordered engines (AVL tree and skip list) over arena-allocated nodes
//! - Secondary indexes on record fields
//! - A namespaced record store that keeps its indexes consistent
//! - Reconciliation of a store against an incoming record set

pub mod backend;
pub mod config;
pub mod engine;
pub mod index;
pub mod record;
pub mod store;

pub use backend::{Backend, BackendError, MemoryBackend};
pub use config::StoreConfig;
pub use engine::{AvlTree, LessFn, Natural, NodeId, Order, SkipList, SkipNodeId};
pub use index::{
    BuildReport, IndexBuilder, IndexDefinition, IndexError, IndexKind, IndexStatistics,
    IndexValue, SecondaryIndex, SkipListIndex, TreeIndex,
};
pub use record::{Record, RecordError, Value};
pub use store::{Store, StoreError, StoreResult, SyncPlan, SyncSummary};
