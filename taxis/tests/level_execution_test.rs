//! Level executor behaviour
//!
//! This test verifies that:
//! 1. The concurrency limit bounds in-flight work within a level
//! 2. Sequential execution never overlaps work
//! 3. Fail-fast stops dispatching and never runs later levels
//! 4. Continue-on-error runs every item and collects failures
//! 5. Run duration covers the work performed

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use taxis::prelude::*;
use taxis::{WorkFuture, DEFAULT_CONCURRENCY};

/// Counts simultaneous work invocations and remembers the peak.
#[derive(Default)]
struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl InFlight {
    fn enter(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

fn independent(count: usize) -> LeveledGraph {
    let items = to_map((0..count).map(|i| make_item(format!("n{i}"), Vec::<NodeId>::new(), ())));
    assign_levels(items).unwrap()
}

fn instrumented(
    tracker: Arc<InFlight>,
) -> impl Fn(Arc<LeveledNode>) -> WorkFuture<(), ()> + Clone {
    wrap_simple_work(move |_node: Arc<LeveledNode>| {
        let tracker = Arc::clone(&tracker);
        async move {
            tracker.enter();
            tokio::time::sleep(Duration::from_millis(10)).await;
            tracker.exit();
            Ok::<_, String>(())
        }
    })
}

#[tokio::test(start_paused = true)]
async fn test_concurrency_limit_bounds_in_flight_work() {
    let graph = independent(12);
    let tracker = Arc::new(InFlight::default());

    let result = execute(
        &graph,
        instrumented(Arc::clone(&tracker)),
        ExecuteOptions::default().with_concurrency(3),
    )
    .await
    .unwrap();

    assert!(result.success);
    assert_eq!(result.results.len(), 12);
    assert_eq!(tracker.calls.load(Ordering::SeqCst), 12);
    assert_eq!(tracker.peak.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_default_concurrency_is_four() {
    let graph = independent(10);
    let tracker = Arc::new(InFlight::default());

    execute(&graph, instrumented(Arc::clone(&tracker)), ExecuteOptions::default())
        .await
        .unwrap();

    assert_eq!(tracker.peak.load(Ordering::SeqCst), DEFAULT_CONCURRENCY);
}

#[tokio::test(start_paused = true)]
async fn test_sequential_never_overlaps() {
    let graph = assign_levels(to_map([
        make_item("a", Vec::<NodeId>::new(), ()),
        make_item("b", Vec::<NodeId>::new(), ()),
        make_item("c", ["a", "b"], ()),
        make_item("d", ["a"], ()),
    ]))
    .unwrap();
    let tracker = Arc::new(InFlight::default());

    let result = execute_sequential(
        &graph,
        instrumented(Arc::clone(&tracker)),
        ExecuteOptions::default().with_concurrency(16),
    )
    .await
    .unwrap();

    assert!(result.success);
    assert_eq!(tracker.calls.load(Ordering::SeqCst), 4);
    assert_eq!(tracker.peak.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_sequential_continue_on_error_runs_everything() {
    let graph = independent(3);
    let invoked = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&invoked);

    let work = wrap_simple_work(move |node: Arc<LeveledNode>| {
        counter.fetch_add(1, Ordering::SeqCst);
        async move {
            if node.id() == "n0" {
                return Err("first one breaks".to_string());
            }
            Ok(())
        }
    });

    let result = execute_sequential(&graph, work, ExecuteOptions::default().with_fail_fast(false))
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(invoked.load(Ordering::SeqCst), 3);
    assert_eq!(result.failed_nodes, vec![NodeId::new("n0")]);
}

#[tokio::test]
async fn test_fail_fast_chain_never_runs_dependent() {
    // c depends on b depends on a; b fails
    let graph = assign_levels(to_map([
        make_item("a", Vec::<NodeId>::new(), ()),
        make_item("b", ["a"], ()),
        make_item("c", ["b"], ()),
    ]))
    .unwrap();

    let invoked = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&invoked);
    let work = wrap_simple_work(move |node: Arc<LeveledNode>| {
        seen.lock().unwrap().push(node.id().to_string());
        async move {
            if node.id() == "b" {
                return Err("b is broken".to_string());
            }
            Ok(())
        }
    });

    let result = execute(&graph, work, ExecuteOptions::default()).await.unwrap();

    assert!(!result.success);
    assert!(result.failed_nodes.contains(&NodeId::new("b")));
    assert!(!invoked.lock().unwrap().contains(&"c".to_string()));
    match result.get("c") {
        None => {}
        Some(c) => assert!(c.is_skipped()),
    }

    let b = result.get("b").unwrap();
    assert_eq!(b.error, Some(NodeFailure::failed("b is broken")));
    assert_eq!(b.logs.last().unwrap(), "Failed b: b is broken");
}

#[tokio::test]
async fn test_continue_on_error_runs_dependents() {
    // a and b are independent, c depends on both; a fails
    let graph = assign_levels(to_map([
        make_item("a", Vec::<NodeId>::new(), ()),
        make_item("b", Vec::<NodeId>::new(), ()),
        make_item("c", ["a", "b"], ()),
    ]))
    .unwrap();

    let c_ran = Arc::new(AtomicUsize::new(0));
    let flag = Arc::clone(&c_ran);
    let work = wrap_simple_work(move |node: Arc<LeveledNode>| {
        let flag = Arc::clone(&flag);
        async move {
            match node.id().as_str() {
                "a" => Err("a failed".to_string()),
                "c" => {
                    flag.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
                _ => Ok(()),
            }
        }
    });

    let result = execute(
        &graph,
        work,
        ExecuteOptions::new(ExecutorConfig::KEEP_GOING),
    )
    .await
    .unwrap();

    assert!(!result.success);
    assert_eq!(result.results.len(), 3);
    assert_eq!(result.failed_nodes, vec![NodeId::new("a")]);
    assert_eq!(c_ran.load(Ordering::SeqCst), 1);
    assert!(result.get("c").unwrap().success);
}

#[tokio::test(start_paused = true)]
async fn test_fail_fast_lets_in_flight_siblings_finish() {
    // two slots: "slow" and "quick" start together, "quick" fails while "slow"
    // is still running; "slow" is kept, "queued" never starts
    let graph = assign_levels(to_map([
        make_item("slow", Vec::<NodeId>::new(), ()),
        make_item("quick", Vec::<NodeId>::new(), ()),
        make_item("queued", Vec::<NodeId>::new(), ()),
        make_item("next_level", ["quick"], ()),
    ]))
    .unwrap();

    let work = wrap_simple_work(|node: Arc<LeveledNode>| async move {
        match node.id().as_str() {
            "quick" => {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Err("quick failure".to_string())
            }
            "slow" => {
                tokio::time::sleep(Duration::from_millis(40)).await;
                Ok(())
            }
            _ => Ok(()),
        }
    });

    let result = execute(&graph, work, ExecuteOptions::default().with_concurrency(2))
        .await
        .unwrap();

    assert!(!result.success);
    assert!(result.get("slow").unwrap().success);
    assert!(result.get("queued").unwrap().is_skipped());
    assert!(result.get("next_level").is_none());
    assert_eq!(
        result.failed_nodes,
        vec![NodeId::new("quick"), NodeId::new("queued")]
    );
}

#[tokio::test(start_paused = true)]
async fn test_total_duration_covers_longest_path() {
    let graph = assign_levels(to_map([
        make_item("first", Vec::<NodeId>::new(), ()),
        make_item("second", ["first"], ()),
    ]))
    .unwrap();

    let work = wrap_simple_work(|_node: Arc<LeveledNode>| async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok::<_, String>(())
    });

    let result = execute(&graph, work, ExecuteOptions::default()).await.unwrap();

    assert!(result.success);
    assert!(result.total_duration >= Duration::from_millis(100));
    assert!(result.get("first").unwrap().duration >= Duration::from_millis(50));
}

#[tokio::test]
async fn test_results_carry_outputs_and_shared_nodes() {
    let graph = assign_levels(to_map([
        Item::new("two", Vec::<NodeId>::new(), 2_u64),
        Item::new("three", Vec::<NodeId>::new(), 3_u64),
        Item::new("product", ["two", "three"], 0_u64),
    ]))
    .unwrap();

    let work = wrap_simple_work(|node: Arc<LeveledNode<u64>>| async move {
        Ok::<_, String>(node.data() * 10)
    });

    let result = execute(&graph, work, ExecuteOptions::default()).await.unwrap();

    assert_eq!(result.get("two").and_then(|r| r.output), Some(20));
    assert_eq!(result.get("three").and_then(|r| r.output), Some(30));
    let product = result.get("product").unwrap();
    assert_eq!(product.node.level(), 1);
    assert!(Arc::ptr_eq(&product.node, graph.get("product").unwrap()));
}

#[tokio::test]
async fn test_complete_hook_sees_every_result_in_sequence() {
    let graph = assign_levels(to_map([
        make_item("a", Vec::<NodeId>::new(), ()),
        make_item("b", ["a"], ()),
        make_item("c", ["b"], ()),
    ]))
    .unwrap();

    let completed = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&completed);
    let options = ExecuteOptions::default().on_node_complete(move |result: &NodeResult| {
        sink.lock().unwrap().push(result.id().to_string());
    });

    let work = wrap_simple_work(|_node: Arc<LeveledNode>| async { Ok::<_, String>(()) });
    let result = execute(&graph, work, options).await.unwrap();

    assert!(result.success);
    assert_eq!(*completed.lock().unwrap(), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_executor_is_reusable() {
    let executor = LevelExecutor::new(ExecutorConfig::default().with_concurrency(2));
    let work = wrap_simple_work(|_node: Arc<LeveledNode>| async { Ok::<_, String>(()) });

    for size in [1, 5] {
        let graph = independent(size);
        let result = executor.execute(&graph, work.clone()).await.unwrap();
        assert!(result.success);
        assert_eq!(result.results.len(), size);
    }
}
