//! Core identifier types for the reference graph.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Ordered map with the Fx hasher, used for the id-keyed indices.
pub(crate) type FxIndexMap<K, V> = indexmap::IndexMap<K, V, rustc_hash::FxBuildHasher>;

/// Ordered set with the Fx hasher.
pub(crate) type FxIndexSet<T> = indexmap::IndexSet<T, rustc_hash::FxBuildHasher>;

/// Unique identifier for a [`Graph`](crate::Graph) instance.
///
/// Node handles carry the id of the graph that issued them, which is how
/// cross-graph linkage is detected without a global registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GraphId(Uuid);

impl GraphId {
    pub(crate) fn new() -> Self {
        GraphId(Uuid::new_v4())
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a node.
///
/// A node id is only meaningful on the graph that issued it; passing it to
/// another graph fails with [`GraphError::CrossGraph`](crate::GraphError).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    graph: GraphId,
    index: u64,
}

impl NodeId {
    pub(crate) fn new(graph: GraphId, index: u64) -> Self {
        NodeId { graph, index }
    }

    /// Id of the graph that issued this handle.
    pub fn graph_id(&self) -> GraphId {
        self.graph
    }

    pub fn as_u64(&self) -> u64 {
        self.index
    }

    /// True when both handles were issued by the same graph.
    pub fn same_graph(&self, other: NodeId) -> bool {
        self.graph == other.graph
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.index)
    }
}

/// Unique identifier for an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(u64);

impl EdgeId {
    pub(crate) fn new(id: u64) -> Self {
        EdgeId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EdgeId({})", self.0)
    }
}

/// Node type name (e.g. "Material", "Texture").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Label(String);

impl Label {
    pub fn new(label: impl Into<String>) -> Self {
        Label(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Label(s)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label(s.to_string())
    }
}
