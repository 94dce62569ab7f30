//! Level executor
//!
//! Drives user-supplied async work over a [`LeveledGraph`](crate::graph::LeveledGraph):
//! levels run one after another, items within a level run concurrently up
//! to a configurable limit, and results are aggregated into a [`DagResult`].
//!
//! # Module Organization
//!
//! - `config`: hides scheduling knobs and lifecycle hooks
//! - `level`: hides the execution strategy (semaphore-gated, single task)
//! - `result`: per-node and per-run outcomes
//! - `work`: adapters turning plain async functions into node work
//! - `error`: the execution layer error type

mod config;
mod error;
mod level;
mod result;
mod work;

pub use config::{CompleteHook, ExecuteOptions, ExecutorConfig, StartHook, DEFAULT_CONCURRENCY};
pub use error::{BoxError, ExecutionError, Result};
pub use level::{execute, execute_sequential, LevelExecutor};
pub use result::{DagResult, NodeFailure, NodeResult};
pub use work::{wrap_simple_work, WorkFuture};
