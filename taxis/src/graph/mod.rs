//! Dependency graph leveling
//!
//! This module turns a set of items that declare their dependencies into an
//! ordered sequence of levels. It provides:
//!
//! - Item construction and map helpers
//! - Level assignment with cycle detection
//! - Reachability queries (subgraph, ancestors, descendants)
//! - Text and Graphviz rendering
//!
//! # Design Principles
//!
//! Leveling is a pure function of the item map. Callers hand their items in
//! and receive immutable [`LeveledNode`]s back; nothing is mutated behind
//! their back, and the executor relies only on the ordering invariant of
//! [`LeveledGraph`].
//!
//! # Algorithm References
//!
//! - Kahn's algorithm for topological sort, emitting whole frontiers as levels

mod error;
mod leveled;
mod node;
mod node_id;
mod render;
mod traversal;

pub use error::{GraphError, GraphResult};
pub use leveled::{assign_levels, flatten, GraphSummary, LeveledGraph};
pub use node::{make_item, to_map, Item, ItemMap, LeveledNode};
pub use node_id::NodeId;
pub use render::{render, to_dot};
pub use traversal::{ancestors_of, descendants_of, reachable_from};
