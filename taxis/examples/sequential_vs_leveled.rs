//! Sequential vs Leveled Execution
//!
//! The same ETL-style graph run three ways:
//! - Scenario 1: sequential (one item at a time)
//! - Scenario 2: leveled with 2 slots
//! - Scenario 3: leveled with 8 slots
//!
//! Every item sleeps 50ms, so the wall-clock time shows how much of each level
//! actually ran in parallel.
//!
//! ```text
//! extract_a ── clean_a ──┐
//! extract_b ── clean_b ──┼── join ── load
//! extract_c ── clean_c ──┘
//! ```

use std::sync::Arc;
use std::time::Duration;
use taxis::prelude::*;

fn etl() -> ItemMap {
    let mut items = Vec::new();
    for source in ["a", "b", "c"] {
        items.push(make_item(format!("extract_{source}"), Vec::<NodeId>::new(), ()));
        items.push(make_item(
            format!("clean_{source}"),
            [format!("extract_{source}")],
            (),
        ));
    }
    items.push(make_item("join", ["clean_a", "clean_b", "clean_c"], ()));
    items.push(make_item("load", ["join"], ()));
    to_map(items)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .init();

    let graph = assign_levels(etl())?;
    println!("{}", graph.render());

    let work = wrap_simple_work(|_node: Arc<LeveledNode>| async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok::<_, String>(())
    });

    let sequential = execute_sequential(&graph, work.clone(), ExecuteOptions::default()).await?;
    println!(
        "Scenario 1 (sequential):  {:>4}ms",
        sequential.total_duration.as_millis()
    );

    for (scenario, slots) in [(2, 2), (3, 8)] {
        let result = execute(
            &graph,
            work.clone(),
            ExecuteOptions::default().with_concurrency(slots),
        )
        .await?;
        println!(
            "Scenario {scenario} ({slots} slots):  {:>4}ms",
            result.total_duration.as_millis()
        );
    }

    println!("\nExpected: ~400ms sequential, ~300ms with 2 slots, ~200ms with 8 slots");
    Ok(())
}
