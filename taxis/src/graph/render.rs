//! Human-readable and Graphviz views of a leveled graph

use super::LeveledGraph;
use petgraph::dot::{Config, Dot};
use petgraph::graph::DiGraph;
use std::collections::HashMap;

/// Renders the graph level by level
///
/// Example output:
/// ```text
/// DAG (3 nodes, 2 levels):
/// Level 0:
///   fetch (leaf)
///   lint (leaf)
/// Level 1:
///   compile -> [fetch]
/// ```
///
/// Only dependencies that are part of the graph are listed.
pub fn render<D>(graph: &LeveledGraph<D>) -> String {
    let mut lines = vec![format!(
        "DAG ({} nodes, {} levels):",
        graph.len(),
        graph.depth()
    )];

    for (index, level) in graph.levels().iter().enumerate() {
        lines.push(format!("Level {index}:"));
        lines.extend(level.iter().map(|node| {
            let deps: Vec<&str> = graph
                .in_graph_dependencies(node)
                .map(|dep| dep.as_str())
                .collect();
            if deps.is_empty() {
                format!("  {} (leaf)", node.id())
            } else {
                format!("  {} -> [{}]", node.id(), deps.join(", "))
            }
        }));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Generates a DOT representation for Graphviz
///
/// Edges point from a dependency to its dependent. The output can be rendered
/// with `dot -Tpng graph.dot -o graph.png`.
pub fn to_dot<D>(graph: &LeveledGraph<D>) -> String {
    let mut dag = DiGraph::<String, ()>::new();
    let mut indices = HashMap::with_capacity(graph.len());

    for node in graph.flatten() {
        let index = dag.add_node(node.id().to_string());
        indices.insert(node.id().clone(), index);
    }

    for node in graph.nodes().values() {
        let Some(&target) = indices.get(node.id()) else {
            continue;
        };
        for dep in graph.in_graph_dependencies(node) {
            if let Some(&source) = indices.get(dep) {
                dag.update_edge(source, target, ());
            }
        }
    }

    format!("{:?}", Dot::with_config(&dag, &[Config::EdgeNoLabel]))
}

impl<D> LeveledGraph<D> {
    /// See [`render`]
    pub fn render(&self) -> String {
        render(self)
    }

    /// See [`to_dot`]
    pub fn to_dot(&self) -> String {
        to_dot(self)
    }
}
