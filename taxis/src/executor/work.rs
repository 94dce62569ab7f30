//! Adapters for per-node work functions
//!
//! The executor expects work that resolves to a [`NodeResult`] and treats a
//! rejected future as a defect that aborts the run. [`wrap_simple_work`]
//! bridges the common case: plain async functions that return `Ok(output)` or
//! an error, which should fail only their own node.

use super::result::{NodeFailure, NodeResult};
use crate::graph::LeveledNode;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::any::Any;
use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::debug;

/// Future returned by wrapped work. It never rejects.
pub type WorkFuture<D, O> = BoxFuture<'static, Result<NodeResult<D, O>, Infallible>>;

/// Wraps a plain async function into executor-ready work
///
/// The returned work function:
/// - times the invocation
/// - logs `Starting <id>`, then `Completed <id> in <n>ms` or `Failed <id>: <message>`
/// - turns `Err(e)` into a failed result whose message is `e.to_string()`
/// - turns a panic into a failed result carrying the panic message
/// - stores `Ok(output)` in [`NodeResult::output`]
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taxis::{
///     assign_levels, execute, make_item, to_map, wrap_simple_work, ExecuteOptions, LeveledNode,
///     NodeId,
/// };
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let graph = assign_levels(to_map([
///     make_item("fetch", Vec::<NodeId>::new(), ()),
///     make_item("build", ["fetch"], ()),
/// ]))
/// .unwrap();
///
/// let work = wrap_simple_work(|node: Arc<LeveledNode>| async move {
///     if node.id() == "build" {
///         return Err(format!("no compiler for {}", node.id()));
///     }
///     Ok(())
/// });
///
/// let result = execute(&graph, work, ExecuteOptions::default()).await.unwrap();
/// assert!(!result.success);
/// assert_eq!(result.failed_nodes, vec![NodeId::new("build")]);
/// # }
/// ```
pub fn wrap_simple_work<D, O, E, F, Fut>(
    work: F,
) -> impl Fn(Arc<LeveledNode<D>>) -> WorkFuture<D, O> + Clone + Send + Sync + 'static
where
    D: Send + Sync + 'static,
    O: Send + 'static,
    E: fmt::Display,
    F: Fn(Arc<LeveledNode<D>>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, E>> + Send + 'static,
{
    let work = Arc::new(work);
    move |node: Arc<LeveledNode<D>>| {
        let work = Arc::clone(&work);
        async move {
            let started = Instant::now();
            let mut logs = vec![format!("Starting {}", node.id())];

            let outcome = AssertUnwindSafe(async { work(Arc::clone(&node)).await })
                .catch_unwind()
                .await;

            let duration = started.elapsed();
            let result = match outcome {
                Ok(Ok(output)) => {
                    logs.push(format!(
                        "Completed {} in {}ms",
                        node.id(),
                        duration.as_millis()
                    ));
                    NodeResult::succeeded(node, duration).with_output(output)
                }
                Ok(Err(e)) => failed(node, e.to_string(), duration, &mut logs),
                Err(payload) => failed(node, panic_message(payload), duration, &mut logs),
            };

            Ok(NodeResult { logs, ..result })
        }
        .boxed()
    }
}

fn failed<D, O>(
    node: Arc<LeveledNode<D>>,
    message: String,
    duration: std::time::Duration,
    logs: &mut Vec<String>,
) -> NodeResult<D, O> {
    debug!(node = %node.id(), error = %message, "Work returned an error");
    logs.push(format!("Failed {}: {}", node.id(), message));
    NodeResult::failed(node, NodeFailure::failed(message), duration)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "work panicked".to_string()
    }
}
