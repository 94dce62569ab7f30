//! Level-by-level execution with bounded concurrency
//!
//! Runs a [`LeveledGraph`] one level at a time. Items inside a level are
//! independent, so they run concurrently, gated by a counting semaphore so
//! that at most `concurrency` work invocations are ever in flight.
//!
//! # How It Works
//!
//! 1. Levels run strictly in order; level `k + 1` starts only after every
//!    item of level `k` has produced a result
//! 2. Within a level, one future per item is created in level order and all
//!    of them are polled from the calling task (no `tokio::spawn`), so work
//!    functions need not be `Send`
//! 3. Each future first waits for a semaphore permit. Tokio's semaphore is
//!    fair, so items acquire slots in level order
//! 4. Holding a permit, the future checks the stop flag. If a fail-fast
//!    failure has happened it produces a skipped result without calling the
//!    work function; otherwise it runs the work
//! 5. Once the level is done its results are recorded in level order
//!
//! # Failure Policy
//!
//! - **Fail-fast** (default): the first failed result sets the stop flag.
//!   Work already running finishes and is recorded, items of the same level
//!   still waiting for a slot are skipped, later levels never start
//! - **Continue on error**: every item runs; failures are only collected
//!
//! A work function that *rejects* (returns `Err`) aborts the whole run with
//! [`ExecutionError::Work`]. Use [`wrap_simple_work`](super::wrap_simple_work)
//! to report errors as failed results instead.

use super::config::{ExecuteOptions, ExecutorConfig};
use super::error::{BoxError, ExecutionError, Result};
use super::result::{DagResult, NodeResult};
use crate::graph::{LeveledGraph, LeveledNode};
use futures::future::try_join_all;
use indexmap::IndexMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{debug, debug_span, info, info_span, warn, Instrument};

/// Executes leveled graphs with a fixed set of options
///
/// Holds no state between runs; one executor can drive any number of graphs.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use taxis::{
///     assign_levels, make_item, to_map, BoxError, LevelExecutor, LeveledNode, NodeId, NodeResult,
/// };
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let graph = assign_levels(to_map([
///     make_item("a", Vec::<NodeId>::new(), ()),
///     make_item("b", ["a"], ()),
/// ]))
/// .unwrap();
///
/// let executor = LevelExecutor::new(taxis::ExecutorConfig::SEQUENTIAL);
/// let result = executor
///     .execute(&graph, |node: Arc<LeveledNode>| async move {
///         Ok::<_, BoxError>(NodeResult::<(), ()>::succeeded(node, Duration::ZERO))
///     })
///     .await
///     .unwrap();
///
/// assert!(result.success);
/// assert_eq!(result.results.len(), 2);
/// # }
/// ```
pub struct LevelExecutor<D = (), O = ()> {
    options: ExecuteOptions<D, O>,
}

impl<D, O> fmt::Debug for LevelExecutor<D, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LevelExecutor")
            .field("options", &self.options)
            .finish()
    }
}

impl<D, O> Clone for LevelExecutor<D, O> {
    fn clone(&self) -> Self {
        Self {
            options: self.options.clone(),
        }
    }
}

impl<D, O> Default for LevelExecutor<D, O> {
    fn default() -> Self {
        Self::new(ExecuteOptions::default())
    }
}

impl<D, O> LevelExecutor<D, O> {
    /// Creates an executor from options or a bare [`ExecutorConfig`]
    pub fn new(options: impl Into<ExecuteOptions<D, O>>) -> Self {
        Self {
            options: options.into(),
        }
    }

    /// Creates an executor that runs one item at a time
    ///
    /// The concurrency in `options` is ignored; everything else, including the
    /// failure policy, is kept.
    pub fn sequential(options: impl Into<ExecuteOptions<D, O>>) -> Self {
        Self::new(options.into().with_concurrency(1))
    }

    /// Returns the options this executor runs with
    pub fn options(&self) -> &ExecuteOptions<D, O> {
        &self.options
    }

    /// Returns the scheduling configuration
    pub fn config(&self) -> ExecutorConfig {
        self.options.config
    }

    /// Runs `work` for every node of `graph`, level by level
    ///
    /// Per-node failures are reported inside the returned [`DagResult`].
    ///
    /// # Errors
    ///
    /// - [`ExecutionError::InvalidConfig`] if the concurrency is zero; no work
    ///   runs in that case
    /// - [`ExecutionError::Work`] if a work function rejects; the run is
    ///   abandoned and its partial results are dropped
    pub async fn execute<W, Fut, E>(
        &self,
        graph: &LeveledGraph<D>,
        work: W,
    ) -> Result<DagResult<D, O>>
    where
        W: Fn(Arc<LeveledNode<D>>) -> Fut,
        Fut: Future<Output = std::result::Result<NodeResult<D, O>, E>>,
        E: Into<BoxError>,
    {
        let config = self.options.config;
        config.validate()?;

        let span = info_span!(
            "execute",
            nodes = graph.len(),
            levels = graph.depth(),
            concurrency = config.concurrency,
            fail_fast = config.fail_fast,
        );

        self.run_levels(graph, &work).instrument(span).await
    }

    async fn run_levels<W, Fut, E>(
        &self,
        graph: &LeveledGraph<D>,
        work: &W,
    ) -> Result<DagResult<D, O>>
    where
        W: Fn(Arc<LeveledNode<D>>) -> Fut,
        Fut: Future<Output = std::result::Result<NodeResult<D, O>, E>>,
        E: Into<BoxError>,
    {
        let started = Instant::now();
        let fail_fast = self.options.config.fail_fast;
        let permits = self.options.config.concurrency.min(Semaphore::MAX_PERMITS);

        let stopped = AtomicBool::new(false);
        let mut results = IndexMap::with_capacity(graph.len());
        let mut failed_nodes = Vec::new();

        for (index, level) in graph.levels().iter().enumerate() {
            if stopped.load(Ordering::SeqCst) {
                debug!(
                    remaining_levels = graph.depth() - index,
                    "Run stopped; remaining levels not started"
                );
                break;
            }

            let span = debug_span!("level", index, nodes = level.len());
            let level_results = self
                .run_level(level, work, permits, &stopped)
                .instrument(span)
                .await?;

            for result in level_results {
                if !result.success {
                    failed_nodes.push(result.id().clone());
                    if fail_fast {
                        stopped.store(true, Ordering::SeqCst);
                    }
                }
                results.insert(result.id().clone(), result);
            }
        }

        let dag = DagResult {
            success: failed_nodes.is_empty(),
            results,
            failed_nodes,
            total_duration: started.elapsed(),
        };

        info!(
            success = dag.success,
            completed = dag.results.len(),
            failed = dag.failed_nodes.len(),
            duration = ?dag.total_duration,
            "Execution finished"
        );

        Ok(dag)
    }

    /// Runs every node of one level, returning results in level order
    async fn run_level<W, Fut, E>(
        &self,
        level: &[Arc<LeveledNode<D>>],
        work: &W,
        permits: usize,
        stopped: &AtomicBool,
    ) -> Result<Vec<NodeResult<D, O>>>
    where
        W: Fn(Arc<LeveledNode<D>>) -> Fut,
        Fut: Future<Output = std::result::Result<NodeResult<D, O>, E>>,
        E: Into<BoxError>,
    {
        let limiter = Semaphore::new(permits);
        let tasks = level
            .iter()
            .map(|node| self.run_node(node, work, &limiter, stopped));

        // Same task, no spawn: a rejection drops the rest of the level
        try_join_all(tasks).await
    }

    async fn run_node<W, Fut, E>(
        &self,
        node: &Arc<LeveledNode<D>>,
        work: &W,
        limiter: &Semaphore,
        stopped: &AtomicBool,
    ) -> Result<NodeResult<D, O>>
    where
        W: Fn(Arc<LeveledNode<D>>) -> Fut,
        Fut: Future<Output = std::result::Result<NodeResult<D, O>, E>>,
        E: Into<BoxError>,
    {
        let _permit = limiter
            .acquire()
            .await
            .map_err(|_| ExecutionError::Failed("concurrency limiter closed".to_string()))?;

        if stopped.load(Ordering::SeqCst) {
            debug!(node = %node.id(), "Skipping node after earlier failure");
            return Ok(NodeResult::skipped(Arc::clone(node)));
        }

        if let Some(hook) = &self.options.on_node_start {
            hook(node.as_ref());
        }
        debug!(node = %node.id(), level = node.level(), "Starting node");

        let result = work(Arc::clone(node))
            .await
            .map_err(|e| ExecutionError::work(node.id().clone(), e))?;

        if !result.success {
            warn!(node = %node.id(), error = ?result.error, "Node failed");
            if self.options.config.fail_fast && !stopped.swap(true, Ordering::SeqCst) {
                warn!(node = %node.id(), "Fail-fast: no further work will be dispatched");
            }
        }

        if let Some(hook) = &self.options.on_node_complete {
            hook(&result);
        }

        Ok(result)
    }
}

/// Runs `work` for every node of `graph` with the given options
///
/// Shorthand for `LevelExecutor::new(options).execute(graph, work)`.
pub async fn execute<D, O, W, Fut, E>(
    graph: &LeveledGraph<D>,
    work: W,
    options: ExecuteOptions<D, O>,
) -> Result<DagResult<D, O>>
where
    W: Fn(Arc<LeveledNode<D>>) -> Fut,
    Fut: Future<Output = std::result::Result<NodeResult<D, O>, E>>,
    E: Into<BoxError>,
{
    LevelExecutor::new(options).execute(graph, work).await
}

/// Runs `work` for every node of `graph`, one node at a time
///
/// Identical to [`execute`] with the concurrency pinned to 1. The failure
/// policy of `options` still applies.
pub async fn execute_sequential<D, O, W, Fut, E>(
    graph: &LeveledGraph<D>,
    work: W,
    options: ExecuteOptions<D, O>,
) -> Result<DagResult<D, O>>
where
    W: Fn(Arc<LeveledNode<D>>) -> Fut,
    Fut: Future<Output = std::result::Result<NodeResult<D, O>, E>>,
    E: Into<BoxError>,
{
    LevelExecutor::sequential(options).execute(graph, work).await
}
