//! Directed, named, attributed edges.
//!
//! An edge is one directed relationship from an owner node to a resource
//! node. The name identifies which attribute slot on the owner the edge
//! belongs to. Owner and name are fixed for the life of the edge; replacing
//! the resource is realized by disposing the edge and creating a new one
//! (see [`Graph::swap`](crate::Graph::swap)), which keeps the graph indices
//! consistent at every step.

use crate::types::{EdgeId, NodeId};
use crate::value::{AttributeMap, Value};
use std::fmt;

/// Attribute key under which map-slot edges carry their map key, so the key
/// can be recovered from the edge alone.
pub const KEY_ATTRIBUTE: &str = "key";

/// A directed relationship from an owner node to a resource node.
pub struct Edge {
    id: EdgeId,
    name: String,
    owner: NodeId,
    resource: NodeId,
    attributes: AttributeMap,
    owned: bool,
    dispose_listeners: Vec<Box<dyn FnOnce()>>,
}

impl Edge {
    pub(crate) fn new(
        id: EdgeId,
        name: impl Into<String>,
        owner: NodeId,
        resource: NodeId,
        attributes: AttributeMap,
        owned: bool,
    ) -> Self {
        Edge {
            id,
            name: name.into(),
            owner,
            resource,
            attributes,
            owned,
            dispose_listeners: Vec::new(),
        }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    /// Name of the attribute slot this edge belongs to on its owner.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The node this edge goes FROM.
    pub fn owner(&self) -> NodeId {
        self.owner
    }

    /// The node this edge goes TO.
    pub fn resource(&self) -> NodeId {
        self.resource
    }

    /// Auxiliary attributes (e.g. a display label, a map key).
    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// True for composed (owned) relationships: disposing the owner
    /// disposes the resource as well.
    pub fn is_owned(&self) -> bool {
        self.owned
    }

    pub(crate) fn push_dispose_listener(&mut self, listener: Box<dyn FnOnce()>) {
        self.dispose_listeners.push(listener);
    }

    /// Called exactly once, at disposal.
    pub(crate) fn take_dispose_listeners(&mut self) -> Vec<Box<dyn FnOnce()>> {
        std::mem::take(&mut self.dispose_listeners)
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Edge {}

impl std::hash::Hash for Edge {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Edge")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("resource", &self.resource)
            .field("attributes", &self.attributes)
            .field("owned", &self.owned)
            .field("dispose_listeners", &self.dispose_listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GraphId;

    fn ids() -> (NodeId, NodeId) {
        let graph = GraphId::new();
        (NodeId::new(graph, 1), NodeId::new(graph, 2))
    }

    #[test]
    fn test_accessors() {
        let (owner, resource) = ids();
        let mut attributes = AttributeMap::new();
        attributes.insert("label".to_string(), "x".into());

        let edge = Edge::new(EdgeId::new(1), "children", owner, resource, attributes, false);
        assert_eq!(edge.id(), EdgeId::new(1));
        assert_eq!(edge.name(), "children");
        assert_eq!(edge.owner(), owner);
        assert_eq!(edge.resource(), resource);
        assert_eq!(edge.attribute("label").and_then(Value::as_str), Some("x"));
        assert!(!edge.is_owned());
    }

    #[test]
    fn test_edge_identity_is_the_id() {
        let (owner, resource) = ids();
        let a = Edge::new(EdgeId::new(1), "a", owner, resource, AttributeMap::new(), false);
        let b = Edge::new(EdgeId::new(1), "b", resource, owner, AttributeMap::new(), true);
        let c = Edge::new(EdgeId::new(2), "a", owner, resource, AttributeMap::new(), false);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_dispose_listeners_taken_once() {
        let (owner, resource) = ids();
        let mut edge = Edge::new(EdgeId::new(1), "a", owner, resource, AttributeMap::new(), false);
        edge.push_dispose_listener(Box::new(|| {}));
        edge.push_dispose_listener(Box::new(|| {}));

        assert_eq!(edge.take_dispose_listeners().len(), 2);
        assert!(edge.take_dispose_listeners().is_empty());
    }
}
