//! Level assignment
//!
//! Partitions a set of items into ordered levels so that every in-graph
//! dependency of an item sits in a strictly earlier level. Items within one
//! level are independent of each other and may run concurrently.
//!
//! # Algorithm
//!
//! Kahn's algorithm, producing whole frontiers instead of a flat order:
//!
//! 1. Compute the in-degree of every item, counting only dependencies that
//!    exist in the map
//! 2. Build reverse edges (dependency -> dependents)
//! 3. Seed the frontier with every zero in-degree item
//! 4. While the frontier is not empty, it becomes the next level; each
//!    dependent of a frontier item has its in-degree decremented and joins
//!    the next frontier when it reaches zero
//! 5. Items never leveled are on, or downstream of, a cycle

use super::error::{GraphError, GraphResult};
use super::node::{ItemMap, LeveledNode};
use super::NodeId;
use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Items partitioned into dependency levels
///
/// Produced by [`assign_levels`]. Level `k` holds every node whose in-graph
/// dependencies all lie in levels `0..k`. Concatenating the levels yields
/// each node exactly once.
///
/// # Example
///
/// ```
/// use taxis::{assign_levels, make_item, to_map, NodeId};
///
/// let items = to_map([
///     make_item("fetch", Vec::<NodeId>::new(), ()),
///     make_item("compile", ["fetch"], ()),
///     make_item("test", ["compile"], ()),
///     make_item("lint", ["fetch"], ()),
/// ]);
///
/// let graph = assign_levels(items).unwrap();
/// assert_eq!(graph.depth(), 3);
/// assert_eq!(graph.level_of("lint"), Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct LeveledGraph<D = ()> {
    nodes: IndexMap<NodeId, Arc<LeveledNode<D>>>,
    levels: Vec<Vec<Arc<LeveledNode<D>>>>,
    roots: IndexSet<NodeId>,
    leaves: IndexSet<NodeId>,
}

impl<D> LeveledGraph<D> {
    /// Returns the number of nodes in the graph
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the number of levels
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Returns all nodes keyed by identifier, in input order
    pub fn nodes(&self) -> &IndexMap<NodeId, Arc<LeveledNode<D>>> {
        &self.nodes
    }

    /// Returns a node by identifier
    pub fn get(&self, id: &str) -> Option<&Arc<LeveledNode<D>>> {
        self.nodes.get(id)
    }

    /// Returns the level assigned to a node
    pub fn level_of(&self, id: &str) -> Option<usize> {
        self.nodes.get(id).map(|node| node.level())
    }

    /// Returns the levels in execution order
    pub fn levels(&self) -> &[Vec<Arc<LeveledNode<D>>>] {
        &self.levels
    }

    /// Returns identifiers nothing in the graph depends on
    pub fn roots(&self) -> &IndexSet<NodeId> {
        &self.roots
    }

    /// Returns identifiers with no in-graph dependencies (exactly level 0)
    pub fn leaves(&self) -> &IndexSet<NodeId> {
        &self.leaves
    }

    /// Returns the dependencies of `node` that are part of this graph
    pub fn in_graph_dependencies<'a>(
        &'a self,
        node: &'a LeveledNode<D>,
    ) -> impl Iterator<Item = &'a NodeId> + 'a {
        node.dependencies()
            .iter()
            .filter(move |dep| self.nodes.contains_key(*dep))
    }

    /// Returns every node, level by level
    pub fn flatten(&self) -> Vec<Arc<LeveledNode<D>>> {
        self.levels.iter().flatten().cloned().collect()
    }

    /// Returns structural statistics about the graph
    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            total_nodes: self.nodes.len(),
            depth: self.levels.len(),
            widest_level: self.levels.iter().map(Vec::len).max().unwrap_or(0),
            root_count: self.roots.len(),
            leaf_count: self.leaves.len(),
            roots: self.roots.iter().cloned().collect(),
            leaves: self.leaves.iter().cloned().collect(),
        }
    }
}

/// Summary information about a leveled graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphSummary {
    pub total_nodes: usize,
    pub depth: usize,
    /// Size of the largest level, the most work that can ever run at once
    pub widest_level: usize,
    pub root_count: usize,
    pub leaf_count: usize,
    pub roots: Vec<NodeId>,
    pub leaves: Vec<NodeId>,
}

/// Assigns every item a level
///
/// Dependencies naming identifiers outside `items` are ignored. The caller's
/// items are consumed and returned as [`LeveledNode`]s; nothing is mutated in
/// place.
///
/// # Errors
///
/// Returns [`GraphError::CycleDetected`] listing every item that could not be
/// leveled, in map order, when the graph is not acyclic. A self-dependency
/// counts as a cycle.
pub fn assign_levels<D>(items: ItemMap<D>) -> GraphResult<LeveledGraph<D>> {
    let mut in_degrees: IndexMap<NodeId, usize> = IndexMap::with_capacity(items.len());
    let mut dependents: IndexMap<NodeId, Vec<NodeId>> = IndexMap::new();

    for (id, item) in &items {
        // Repeated declarations of one dependency count once
        let mut seen: IndexSet<&NodeId> = IndexSet::new();
        for dep in item.dependencies() {
            if items.contains_key(dep) && seen.insert(dep) {
                dependents.entry(dep.clone()).or_default().push(id.clone());
            }
        }
        in_degrees.insert(id.clone(), seen.len());
    }

    let mut frontier: Vec<NodeId> = in_degrees
        .iter()
        .filter(|(_, &degree)| degree == 0)
        .map(|(id, _)| id.clone())
        .collect();

    let mut assigned: IndexMap<NodeId, usize> = IndexMap::with_capacity(items.len());
    let mut level_ids: Vec<Vec<NodeId>> = Vec::new();

    while !frontier.is_empty() {
        let level = level_ids.len();
        let mut next = Vec::new();

        for id in &frontier {
            assigned.insert(id.clone(), level);

            let Some(waiting) = dependents.get(id) else {
                continue;
            };
            for dependent in waiting {
                if let Some(degree) = in_degrees.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        next.push(dependent.clone());
                    }
                }
            }
        }

        level_ids.push(std::mem::replace(&mut frontier, next));
    }

    if assigned.len() < items.len() {
        let blocked: Vec<NodeId> = items
            .keys()
            .filter(|id| !assigned.contains_key(*id))
            .cloned()
            .collect();
        warn!(
            blocked = blocked.len(),
            total = items.len(),
            "Dependency cycle prevents leveling"
        );
        return Err(GraphError::cycle(blocked));
    }

    let mut nodes: IndexMap<NodeId, Arc<LeveledNode<D>>> = IndexMap::with_capacity(items.len());
    for (id, item) in items {
        let (_, dependencies, data) = item.into_parts();
        let level = assigned.get(&id).copied().unwrap_or_default();
        let node = LeveledNode::new(id.clone(), dependencies, level, data);
        nodes.insert(id, Arc::new(node));
    }

    let levels: Vec<Vec<Arc<LeveledNode<D>>>> = level_ids
        .iter()
        .map(|ids| {
            ids.iter()
                .filter_map(|id| nodes.get(id).cloned())
                .collect()
        })
        .collect();

    let roots: IndexSet<NodeId> = nodes
        .keys()
        .filter(|id| dependents.get(*id).map_or(true, Vec::is_empty))
        .cloned()
        .collect();

    let leaves: IndexSet<NodeId> = level_ids
        .first()
        .map(|ids| ids.iter().cloned().collect())
        .unwrap_or_default();

    debug!(
        nodes = nodes.len(),
        levels = levels.len(),
        "Assigned dependency levels"
    );

    Ok(LeveledGraph {
        nodes,
        levels,
        roots,
        leaves,
    })
}

/// Returns every node of `graph`, level by level
///
/// Every in-graph dependency precedes its dependents in the returned order.
pub fn flatten<D>(graph: &LeveledGraph<D>) -> Vec<Arc<LeveledNode<D>>> {
    graph.flatten()
}
