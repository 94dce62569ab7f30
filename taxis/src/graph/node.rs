//! Items and leveled nodes
//!
//! An [`Item`] is what callers hand in: an identifier, the identifiers it
//! depends on, and a caller-defined payload. Leveling never touches the
//! caller's items; it produces [`LeveledNode`] values that additionally carry
//! the computed level and are shared by `Arc` with the executor and results.

use super::NodeId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Insertion-ordered map of items keyed by identifier
pub type ItemMap<D = ()> = IndexMap<NodeId, Item<D>>;

/// A unit of work declared by the caller
///
/// Dependencies may name identifiers that are not part of the graph; those
/// are ignored by leveling and traversal rather than treated as errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item<D = ()> {
    id: NodeId,
    dependencies: Vec<NodeId>,
    data: D,
}

impl<D> Item<D> {
    /// Creates an item with the given dependencies and payload
    pub fn new(
        id: impl Into<NodeId>,
        dependencies: impl IntoIterator<Item = impl Into<NodeId>>,
        data: D,
    ) -> Self {
        Self {
            id: id.into(),
            dependencies: dependencies.into_iter().map(Into::into).collect(),
            data,
        }
    }

    /// Returns the item identifier
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Returns the declared dependencies, including ones outside the graph
    pub fn dependencies(&self) -> &[NodeId] {
        &self.dependencies
    }

    /// Returns the payload
    pub fn data(&self) -> &D {
        &self.data
    }

    /// Consumes the item, returning its payload
    pub fn into_data(self) -> D {
        self.data
    }

    pub(crate) fn into_parts(self) -> (NodeId, Vec<NodeId>, D) {
        (self.id, self.dependencies, self.data)
    }
}

/// An item after level assignment
///
/// Immutable: the level is fixed at construction by
/// [`assign_levels`](super::assign_levels).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeveledNode<D = ()> {
    id: NodeId,
    dependencies: Vec<NodeId>,
    level: usize,
    data: D,
}

impl<D> LeveledNode<D> {
    pub(crate) fn new(id: NodeId, dependencies: Vec<NodeId>, level: usize, data: D) -> Self {
        Self {
            id,
            dependencies,
            level,
            data,
        }
    }

    /// Returns the node identifier
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Returns the declared dependencies, including ones outside the graph
    pub fn dependencies(&self) -> &[NodeId] {
        &self.dependencies
    }

    /// Returns the level this node was assigned (0 for nodes without
    /// in-graph dependencies)
    pub fn level(&self) -> usize {
        self.level
    }

    /// Returns the payload
    pub fn data(&self) -> &D {
        &self.data
    }
}

/// Builds an item; shorthand for [`Item::new`]
///
/// ```
/// let item = taxis::make_item("link", ["compile"], ());
/// assert_eq!(item.dependencies().len(), 1);
/// ```
pub fn make_item<D>(
    id: impl Into<NodeId>,
    dependencies: impl IntoIterator<Item = impl Into<NodeId>>,
    data: D,
) -> Item<D> {
    Item::new(id, dependencies, data)
}

/// Collects items into an [`ItemMap`]
///
/// When an identifier occurs more than once the last occurrence wins. The key
/// keeps the position of its first occurrence.
pub fn to_map<D>(items: impl IntoIterator<Item = Item<D>>) -> ItemMap<D> {
    let mut map = IndexMap::new();
    for item in items {
        map.insert(item.id.clone(), item);
    }
    map
}
