//! Build Pipeline: Leveling, Hooks and Fail-Fast
//!
//! A small build pipeline expressed as a dependency graph.
//!
//! ```text
//!          ┌── compile ──┐
//! fetch ───┤             ├── package ── publish
//!          └── lint ─────┘
//!                  docs ─┘
//! ```
//!
//! The example:
//! - prints the leveled graph and its Graphviz form
//! - runs it with the default options (fail-fast, 4 slots)
//! - runs it again with `lint` broken, once fail-fast and once keep-going
//!
//! ## Run with
//! ```bash
//! cargo run --example build_pipeline
//! RUST_LOG=taxis=debug cargo run --example build_pipeline
//! ```

use std::sync::Arc;
use std::time::Duration;
use taxis::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct Stage {
    /// Simulated run time
    millis: u64,
}

fn pipeline() -> ItemMap<Stage> {
    to_map([
        Item::new("fetch", Vec::<NodeId>::new(), Stage { millis: 40 }),
        Item::new("compile", ["fetch"], Stage { millis: 120 }),
        Item::new("lint", ["fetch"], Stage { millis: 30 }),
        Item::new("docs", Vec::<NodeId>::new(), Stage { millis: 60 }),
        Item::new("package", ["compile", "lint", "docs"], Stage { millis: 50 }),
        Item::new("publish", ["package"], Stage { millis: 20 }),
    ])
}

async fn run(
    graph: &LeveledGraph<Stage>,
    broken: Option<&'static str>,
    config: ExecutorConfig,
) -> Result<DagResult<Stage, u64>, ExecutionError> {
    let work = wrap_simple_work(move |node: Arc<LeveledNode<Stage>>| async move {
        tokio::time::sleep(Duration::from_millis(node.data().millis)).await;
        if broken.is_some_and(|id| node.id() == id) {
            return Err(format!("{} exited with status 1", node.id()));
        }
        Ok(node.data().millis)
    });

    let options = ExecuteOptions::new(config)
        .on_node_start(|node: &LeveledNode<Stage>| {
            println!("  -> {} (level {})", node.id(), node.level());
        })
        .on_node_complete(|result: &NodeResult<Stage, u64>| {
            let status = if result.success { "ok" } else { "FAILED" };
            println!("  <- {} {}", result.id(), status);
        });

    execute(graph, work, options).await
}

fn report(result: &DagResult<Stage, u64>) {
    println!(
        "  success={} executed={} failed={:?} skipped={:?} in {:?}",
        result.success,
        result.executed_count(),
        result.failed_nodes,
        result.skipped_nodes(),
        result.total_duration
    );
    for node_result in result.results.values() {
        for line in &node_result.logs {
            println!("    [{}] {}", node_result.id(), line);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("taxis=info")),
        )
        .init();

    let graph = assign_levels(pipeline())?;
    println!("{}", graph.render());
    println!("{:#?}\n", graph.summary());
    println!("{}", graph.to_dot());

    println!("\n=== Healthy pipeline ===");
    let result = run(&graph, None, ExecutorConfig::DEFAULT).await?;
    report(&result);

    println!("\n=== Broken lint, fail-fast ===");
    let result = run(&graph, Some("lint"), ExecutorConfig::DEFAULT).await?;
    report(&result);

    println!("\n=== Broken lint, keep going ===");
    let result = run(&graph, Some("lint"), ExecutorConfig::KEEP_GOING).await?;
    report(&result);

    Ok(())
}
