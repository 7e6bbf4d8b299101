//! Ordered map engines backing the secondary indexes

pub mod avl;
pub mod order;
pub mod skiplist;

pub use avl::{AvlTree, Hook, NodeId};
pub use order::{LessFn, Natural, Order};
pub use skiplist::{SkipList, SkipNodeId, MAX_LEVEL};
