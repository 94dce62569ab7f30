use crate::graph::{GraphError, NodeId};
use thiserror::Error;

/// A boxed error that can be sent across threads.
///
/// Work functions may reject with any error convertible into this type.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Execution layer error type.
///
/// Per-item failures are not errors at this level: they are reported as
/// failed [`NodeResult`](super::NodeResult)s inside the
/// [`DagResult`](super::DagResult). An `ExecutionError` means the run itself
/// could not proceed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExecutionError {
    /// A graph operation failed (cycle detection).
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    /// The executor configuration is unusable.
    #[error("invalid executor configuration: {0}")]
    InvalidConfig(String),

    /// A work function rejected instead of returning a failed result.
    ///
    /// This aborts the whole run. Wrap work with
    /// [`wrap_simple_work`](super::wrap_simple_work) to turn errors into
    /// failed results instead.
    #[error("work for node '{node}' rejected: {source}")]
    Work {
        node: NodeId,
        #[source]
        source: BoxError,
    },

    /// Execution failed with the given reason.
    #[error("execution failed: {0}")]
    Failed(String),
}

impl ExecutionError {
    /// Creates a work rejection error for the given node
    pub fn work(node: NodeId, source: impl Into<BoxError>) -> Self {
        Self::Work {
            node,
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExecutionError>;
