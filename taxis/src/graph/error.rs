//! Error types for graph operations

use super::NodeId;
use thiserror::Error;

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors that can occur during graph operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GraphError {
    /// One or more items could never be leveled because they sit on, or
    /// downstream of, a dependency cycle
    #[error("Cycle detected in dependency graph involving: {}", join_ids(.nodes))]
    CycleDetected {
        /// The unleveled identifiers, in item map order
        nodes: Vec<NodeId>,
    },
}

impl GraphError {
    /// Creates a cycle detected error for the given identifiers
    pub fn cycle(nodes: impl IntoIterator<Item = NodeId>) -> Self {
        Self::CycleDetected {
            nodes: nodes.into_iter().collect(),
        }
    }

    /// Returns the identifiers involved in a cycle, if this is a cycle error
    pub fn cycle_nodes(&self) -> Option<&[NodeId]> {
        match self {
            Self::CycleDetected { nodes } => Some(nodes),
        }
    }
}

fn join_ids(ids: &[NodeId]) -> String {
    ids.iter()
        .map(NodeId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
