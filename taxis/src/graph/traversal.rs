//! Reachability queries over an item map
//!
//! These work on the raw [`ItemMap`] and do not require the graph to be
//! leveled (or even acyclic): every walk tracks visited identifiers, so
//! cycles terminate and diamonds are reported once.

use super::node::ItemMap;
use super::NodeId;
use indexmap::{IndexMap, IndexSet};

/// Returns the subgraph reachable from `root` through declared dependencies
///
/// The root is included. Dependencies outside `items` are skipped. An unknown
/// root yields an empty map. Items keep the depth-first visiting order.
pub fn reachable_from<D: Clone>(items: &ItemMap<D>, root: &str) -> ItemMap<D> {
    let mut subgraph = IndexMap::new();
    let mut stack: Vec<&NodeId> = Vec::new();

    if let Some((id, _)) = items.get_key_value(root) {
        stack.push(id);
    }

    while let Some(id) = stack.pop() {
        if subgraph.contains_key(id) {
            continue;
        }
        let Some(item) = items.get(id) else {
            continue;
        };
        subgraph.insert(id.clone(), item.clone());

        // Reverse so the first declared dependency is visited first
        for dep in item.dependencies().iter().rev() {
            if items.contains_key(dep) && !subgraph.contains_key(dep) {
                stack.push(dep);
            }
        }
    }

    subgraph
}

/// Returns every in-graph item `id` transitively depends on
///
/// `id` itself is never part of the result, even when it sits on a cycle.
pub fn ancestors_of<D>(items: &ItemMap<D>, id: &str) -> IndexSet<NodeId> {
    let mut found = IndexSet::new();
    let mut stack: Vec<&NodeId> = match items.get(id) {
        Some(item) => item.dependencies().iter().collect(),
        None => return found,
    };

    while let Some(current) = stack.pop() {
        if current == id {
            continue;
        }
        let Some(item) = items.get(current) else {
            continue;
        };
        if found.insert(current.clone()) {
            stack.extend(item.dependencies().iter());
        }
    }

    found
}

/// Returns every item that transitively depends on `id`
///
/// Walks reverse edges built from the declared dependencies. `id` itself is
/// excluded.
pub fn descendants_of<D>(items: &ItemMap<D>, id: &str) -> IndexSet<NodeId> {
    let mut dependents: IndexMap<&str, Vec<&NodeId>> = IndexMap::new();
    for (item_id, item) in items {
        for dep in item.dependencies() {
            dependents.entry(dep.as_str()).or_default().push(item_id);
        }
    }

    let mut found = IndexSet::new();
    let mut stack: Vec<&NodeId> = dependents.get(id).cloned().unwrap_or_default();

    while let Some(current) = stack.pop() {
        if current == id {
            continue;
        }
        if found.insert(current.clone()) {
            if let Some(next) = dependents.get(current.as_str()) {
                stack.extend(next.iter().copied());
            }
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{make_item, to_map};

    fn diamond() -> ItemMap<u32> {
        // a <- b, a <- c, (b, c) <- d, plus an unrelated e
        to_map([
            make_item("a", Vec::<NodeId>::new(), 1),
            make_item("b", ["a"], 2),
            make_item("c", ["a"], 3),
            make_item("d", ["b", "c"], 4),
            make_item("e", Vec::<NodeId>::new(), 5),
        ])
    }

    fn sorted(set: IndexSet<NodeId>) -> Vec<String> {
        let mut ids: Vec<String> = set.into_iter().map(|id| id.to_string()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_reachable_from_includes_root_and_dependencies() {
        let sub = reachable_from(&diamond(), "d");
        let keys: Vec<&str> = sub.keys().map(NodeId::as_str).collect();
        assert_eq!(keys, vec!["d", "b", "a", "c"]);
        assert_eq!(*sub["c"].data(), 3);
    }

    #[test]
    fn test_reachable_from_unknown_root_is_empty() {
        assert!(reachable_from(&diamond(), "missing").is_empty());
    }

    #[test]
    fn test_reachable_from_skips_unknown_dependencies() {
        let items = to_map([
            make_item("a", ["outside"], ()),
            make_item("b", ["a"], ()),
        ]);
        let sub = reachable_from(&items, "b");
        assert_eq!(sub.len(), 2);
        assert!(!sub.contains_key("outside"));
    }

    #[test]
    fn test_ancestors_of_diamond_has_no_duplicates() {
        let ancestors = ancestors_of(&diamond(), "d");
        assert_eq!(ancestors.len(), 3);
        assert_eq!(sorted(ancestors), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_ancestors_of_root_level_item_is_empty() {
        assert!(ancestors_of(&diamond(), "a").is_empty());
        assert!(ancestors_of(&diamond(), "missing").is_empty());
    }

    #[test]
    fn test_descendants_of_diamond_has_no_duplicates() {
        let descendants = descendants_of(&diamond(), "a");
        assert_eq!(descendants.len(), 3);
        assert_eq!(sorted(descendants), vec!["b", "c", "d"]);
        assert!(descendants_of(&diamond(), "d").is_empty());
    }

    #[test]
    fn test_queries_terminate_on_cycles_and_exclude_self() {
        let items = to_map([
            make_item("x", ["y"], ()),
            make_item("y", ["x"], ()),
        ]);
        assert_eq!(sorted(ancestors_of(&items, "x")), vec!["y"]);
        assert_eq!(sorted(descendants_of(&items, "x")), vec!["y"]);
        assert_eq!(reachable_from(&items, "x").len(), 2);
    }
}
