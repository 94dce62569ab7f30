//! Per-node and per-run results

use crate::graph::{LeveledNode, NodeId};
use indexmap::IndexMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Why a node did not succeed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NodeFailure {
    /// The node was never started because an earlier failure stopped the run.
    #[error("Skipped due to earlier failure")]
    Skipped,

    /// The node's work reported a failure.
    #[error("{message}")]
    Failed { message: String },
}

impl NodeFailure {
    /// Creates a failure carrying the given message
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// Outcome of processing a single node.
#[derive(Debug, Clone)]
pub struct NodeResult<D = (), O = ()> {
    /// The node this result belongs to
    pub node: Arc<LeveledNode<D>>,
    pub success: bool,
    pub error: Option<NodeFailure>,
    /// Time spent in the work function
    pub duration: Duration,
    /// Log lines in the order they were produced
    pub logs: Vec<String>,
    pub output: Option<O>,
}

impl<D, O> NodeResult<D, O> {
    /// Creates a successful result
    pub fn succeeded(node: Arc<LeveledNode<D>>, duration: Duration) -> Self {
        Self {
            node,
            success: true,
            error: None,
            duration,
            logs: Vec::new(),
            output: None,
        }
    }

    /// Creates a failed result
    pub fn failed(node: Arc<LeveledNode<D>>, error: NodeFailure, duration: Duration) -> Self {
        Self {
            node,
            success: false,
            error: Some(error),
            duration,
            logs: Vec::new(),
            output: None,
        }
    }

    /// Creates the synthetic result for a node that was never started
    pub fn skipped(node: Arc<LeveledNode<D>>) -> Self {
        let failure = NodeFailure::Skipped;
        let logs = vec![failure.to_string()];
        Self {
            logs,
            ..Self::failed(node, failure, Duration::ZERO)
        }
    }

    /// Attaches an output payload
    pub fn with_output(mut self, output: O) -> Self {
        self.output = Some(output);
        self
    }

    /// Appends a log line
    pub fn with_log(mut self, line: impl Into<String>) -> Self {
        self.logs.push(line.into());
        self
    }

    /// Returns the node identifier
    pub fn id(&self) -> &NodeId {
        self.node.id()
    }

    /// Returns true for the synthetic result of a node that never started
    pub fn is_skipped(&self) -> bool {
        matches!(self.error, Some(NodeFailure::Skipped))
    }
}

/// Aggregate outcome of one execution.
#[derive(Debug, Clone)]
pub struct DagResult<D = (), O = ()> {
    /// True iff no node failed
    pub success: bool,
    /// One entry per node that was reached, in recording order
    pub results: IndexMap<NodeId, NodeResult<D, O>>,
    /// Failed identifiers, level by level in per-level batch order
    pub failed_nodes: Vec<NodeId>,
    /// Wall-clock time of the whole run
    pub total_duration: Duration,
}

impl<D, O> DagResult<D, O> {
    /// Returns the result for a node, if it was reached
    pub fn get(&self, id: &str) -> Option<&NodeResult<D, O>> {
        self.results.get(id)
    }

    /// Returns identifiers of nodes that were skipped after a failure
    pub fn skipped_nodes(&self) -> Vec<&NodeId> {
        self.results
            .values()
            .filter(|result| result.is_skipped())
            .map(NodeResult::id)
            .collect()
    }

    /// Returns the number of nodes whose work was actually invoked
    pub fn executed_count(&self) -> usize {
        self.results
            .values()
            .filter(|result| !result.is_skipped())
            .count()
    }
}
