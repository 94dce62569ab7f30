//! Taxis: leveled dependency-graph execution for Rust
//!
//! `taxis` (τάξις, Greek for "arrangement" or "order") takes a set of named
//! items that declare what they depend on, arranges them into levels, and runs
//! async work for each item, level by level, with bounded concurrency inside
//! every level.
//!
//! # Features
//!
//! - **Level assignment**: Kahn's algorithm producing whole frontiers, with
//!   cycle detection that names every blocked item
//! - **Bounded concurrency**: at most `concurrency` work invocations in flight
//!   per level, levels strictly sequential
//! - **Failure policy**: fail-fast (stop dispatching after the first failure)
//!   or continue-on-error
//! - **Lifecycle hooks**: synchronous start/complete callbacks
//! - **Graph utilities**: reachability, ancestors, descendants, text and
//!   Graphviz rendering
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use taxis::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let items = to_map([
//!     make_item("fetch", Vec::<NodeId>::new(), ()),
//!     make_item("compile", ["fetch"], ()),
//!     make_item("lint", ["fetch"], ()),
//!     make_item("package", ["compile", "lint"], ()),
//! ]);
//!
//! let graph = assign_levels(items)?;
//! println!("{}", graph.render());
//!
//! let work = wrap_simple_work(|node: Arc<LeveledNode>| async move {
//!     // do the actual work for `node` here
//!     Ok::<_, String>(node.level())
//! });
//!
//! let result = execute(&graph, work, ExecuteOptions::default()).await?;
//! assert!(result.success);
//! assert_eq!(result.get("package").and_then(|r| r.output), Some(2));
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! Each module hides one design decision that is likely to change:
//!
//! - [`graph`]: leveling and traversal (hides the graph representation)
//! - [`executor`]: running work (hides the scheduling strategy)

pub mod executor;
pub mod graph;

pub use executor::{
    execute, execute_sequential, wrap_simple_work, BoxError, CompleteHook, DagResult,
    ExecuteOptions, ExecutionError, ExecutorConfig, LevelExecutor, NodeFailure, NodeResult,
    Result as ExecutionResult, StartHook, WorkFuture, DEFAULT_CONCURRENCY,
};

pub use graph::{
    ancestors_of, assign_levels, descendants_of, flatten, make_item, reachable_from, render,
    to_dot, to_map, GraphError, GraphResult, GraphSummary, Item, ItemMap, LeveledGraph,
    LeveledNode, NodeId,
};

/// Prelude module for convenient glob imports
///
/// # Example
///
/// ```
/// use taxis::prelude::*;
/// ```
pub mod prelude {
    pub use crate::executor::{
        execute, execute_sequential, wrap_simple_work, BoxError, DagResult, ExecuteOptions,
        ExecutionError, ExecutorConfig, LevelExecutor, NodeFailure, NodeResult,
    };

    pub use crate::graph::{
        assign_levels, make_item, to_map, GraphError, Item, ItemMap, LeveledGraph, LeveledNode,
        NodeId,
    };
}
