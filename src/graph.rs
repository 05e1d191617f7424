//! The graph: authoritative index of all live edges among a closed set of
//! nodes.
//!
//! The graph owns every node and edge record plus three index structures:
//! the live-edge map, an owner-to-outgoing-edges bucket, and a
//! resource-to-incoming-edges bucket. Every mutation leaves the three
//! structures consistent with each other, and with the owning node's
//! attribute slot, before returning to the caller. Disposal of a node walks
//! the indices to tear down every edge touching it; nothing else in the
//! system holds back-pointers.

use crate::collection::{RefEntry, RefList, RefMap, RefSet};
use crate::edge::{Edge, KEY_ATTRIBUTE};
use crate::event::{EventDispatcher, GraphEvent, ListenerId, NodeEvent};
use crate::node::{wrong_slot, AttributeDefault, Defaults, Node, Slot};
use crate::types::{EdgeId, FxIndexMap, FxIndexSet, GraphId, Label, NodeId};
use crate::value::{AttributeMap, Value};
use thiserror::Error;
use tracing::{debug, trace};

/// Errors surfaced by graph operations. Every variant is a programming
/// contract violation, reported synchronously and never retried.
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("node {0} does not belong to this graph")]
    CrossGraph(NodeId),

    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("edge {0} not found")]
    EdgeNotFound(EdgeId),

    #[error("node {0} is disposed")]
    Disposed(NodeId),

    #[error("attribute \"{0}\" is not declared")]
    UnknownAttribute(String),

    #[error("attribute \"{attribute}\" is backed by a {found} slot, expected {expected}")]
    WrongSlotKind {
        attribute: String,
        expected: &'static str,
        found: crate::node::SlotKind,
    },

    #[error("reference \"{0}\" was populated from defaults and cannot be reassigned")]
    ImmutableReference(String),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Where a replaced edge sits on its owner, for [`Graph::swap`].
enum SlotPosition {
    Single,
    List,
    Set,
    Map(String),
}

struct Replacement {
    attribute: String,
    position: SlotPosition,
    old_edge: EdgeId,
    attributes: AttributeMap,
    owned: bool,
}

/// A labeled, directed multigraph of typed, disposable nodes.
#[derive(Debug)]
pub struct Graph {
    id: GraphId,
    nodes: FxIndexMap<NodeId, Node>,
    edges: FxIndexMap<EdgeId, Edge>,
    outgoing: FxIndexMap<NodeId, FxIndexSet<EdgeId>>,
    incoming: FxIndexMap<NodeId, FxIndexSet<EdgeId>>,
    next_node: u64,
    next_edge: u64,
    events: EventDispatcher<GraphEvent>,
}

impl Graph {
    pub fn new() -> Self {
        Graph {
            id: GraphId::new(),
            nodes: FxIndexMap::default(),
            edges: FxIndexMap::default(),
            outgoing: FxIndexMap::default(),
            incoming: FxIndexMap::default(),
            next_node: 1,
            next_edge: 1,
            events: EventDispatcher::new(),
        }
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    // ============================================================
    // Nodes
    // ============================================================

    /// Create a node, applying `defaults` once, in declaration order.
    ///
    /// A [`Defaults::child`] entry wires an immutable owned edge to the
    /// given node; all such targets are validated before any state is
    /// touched, so a failing call creates nothing.
    pub fn create_node(
        &mut self,
        label: impl Into<Label>,
        defaults: Defaults,
    ) -> GraphResult<NodeId> {
        let attributes = defaults.into_attributes();
        for default in attributes.values() {
            if let AttributeDefault::Ref(Some(child)) = default {
                self.live(*child)?;
            }
        }

        let id = NodeId::new(self.id, self.next_node);
        self.next_node += 1;
        let label = label.into();
        let mut node = Node::new(id, label.clone());

        let mut children: Vec<(String, NodeId)> = Vec::new();
        for (name, default) in attributes {
            let slot = match default {
                AttributeDefault::Literal(value) => Slot::Literal(value),
                AttributeDefault::Ref(None) => Slot::Single {
                    entry: None,
                    immutable: false,
                },
                AttributeDefault::Ref(Some(child)) => {
                    children.push((name.clone(), child));
                    Slot::Single {
                        entry: None,
                        immutable: true,
                    }
                }
                AttributeDefault::RefList => Slot::List(RefList::new()),
                AttributeDefault::RefSet => Slot::Set(RefSet::new()),
                AttributeDefault::RefMap => Slot::Map(RefMap::new()),
            };
            node.insert_slot(name, slot);
        }
        self.nodes.insert(id, node);

        for (name, child) in children {
            let edge = self.register_edge(&name, id, child, AttributeMap::new(), true)?;
            if let Some(record) = self.nodes.get_mut(&id) {
                if let Ok(Slot::Single { entry, .. }) = record.slot_mut(&name) {
                    *entry = Some(RefEntry {
                        edge,
                        resource: child,
                    });
                }
            }
        }

        debug!(node = %id, label = %label, "created node");
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// True iff this graph issued the handle and still holds its record.
    pub fn contains(&self, node: NodeId) -> bool {
        node.graph_id() == self.id && self.nodes.contains_key(&node)
    }

    /// True for nodes this graph has disposed; false for live or unknown.
    pub fn is_disposed(&self, node: NodeId) -> bool {
        self.nodes.get(&node).is_some_and(Node::is_disposed)
    }

    // ============================================================
    // Edge layer
    // ============================================================

    /// Construct an edge and register it in all three indices.
    ///
    /// Fails with [`GraphError::CrossGraph`] unless both endpoints belong to
    /// this graph. Low-level surface: edges created here are not stored in
    /// any attribute slot; the node reference API is the normal entry point.
    pub fn create_edge(
        &mut self,
        name: impl Into<String>,
        owner: NodeId,
        resource: NodeId,
    ) -> GraphResult<EdgeId> {
        self.create_edge_with(name, owner, resource, AttributeMap::new())
    }

    /// [`create_edge`](Self::create_edge) with auxiliary attributes.
    pub fn create_edge_with(
        &mut self,
        name: impl Into<String>,
        owner: NodeId,
        resource: NodeId,
        attributes: AttributeMap,
    ) -> GraphResult<EdgeId> {
        self.register_edge(&name.into(), owner, resource, attributes, false)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// All live edges, in registration order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Register a one-shot callback invoked exactly once, at disposal.
    pub fn on_edge_dispose(
        &mut self,
        edge: EdgeId,
        listener: impl FnOnce() + 'static,
    ) -> GraphResult<()> {
        let record = self
            .edges
            .get_mut(&edge)
            .ok_or(GraphError::EdgeNotFound(edge))?;
        record.push_dispose_listener(Box::new(listener));
        Ok(())
    }

    /// Dispose an edge. Idempotent; disposing an unknown or already-disposed
    /// edge is a no-op.
    ///
    /// Disposal removes the edge from all three indices, fires its one-shot
    /// listeners, clears whichever attribute slot holds it on the owner
    /// (dispatching a `change` event there), and — for owned edges —
    /// disposes the resource node as well.
    pub fn dispose_edge(&mut self, id: EdgeId) {
        let Some(mut edge) = self.edges.shift_remove(&id) else {
            return;
        };
        trace!(edge = %id, owner = %edge.owner(), resource = %edge.resource(), "disposing edge");

        if let Some(bucket) = self.outgoing.get_mut(&edge.owner()) {
            bucket.shift_remove(&id);
        }
        if let Some(bucket) = self.incoming.get_mut(&edge.resource()) {
            bucket.shift_remove(&id);
        }

        for listener in edge.take_dispose_listeners() {
            listener();
        }

        self.clear_occupancy(&edge);

        if edge.is_owned() {
            self.dispose_node(edge.resource());
        }
    }

    // ============================================================
    // Queries
    // ============================================================

    /// Edges where `node` is the resource, i.e. whose owners are parents.
    pub fn parent_edges(&self, node: NodeId) -> Vec<&Edge> {
        self.incoming
            .get(&node)
            .map(|bucket| bucket.iter().filter_map(|id| self.edges.get(id)).collect())
            .unwrap_or_default()
    }

    /// Edges where `node` is the owner.
    pub fn child_edges(&self, node: NodeId) -> Vec<&Edge> {
        self.outgoing
            .get(&node)
            .map(|bucket| bucket.iter().filter_map(|id| self.edges.get(id)).collect())
            .unwrap_or_default()
    }

    /// De-duplicated owners of `node`'s parent edges, in edge order.
    pub fn parents(&self, node: NodeId) -> Vec<NodeId> {
        let mut seen: FxIndexSet<NodeId> = FxIndexSet::default();
        for edge in self.parent_edges(node) {
            seen.insert(edge.owner());
        }
        seen.into_iter().collect()
    }

    /// De-duplicated resources of `node`'s child edges, in edge order.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        let mut seen: FxIndexSet<NodeId> = FxIndexSet::default();
        for edge in self.child_edges(node) {
            seen.insert(edge.resource());
        }
        seen.into_iter().collect()
    }

    /// Dispose every parent edge of `node`.
    pub fn disconnect_parents(&mut self, node: NodeId) -> GraphResult<()> {
        self.disconnect_parents_where(node, |_| true)
    }

    /// Dispose every parent edge of `node` whose owner passes `filter`.
    pub fn disconnect_parents_where(
        &mut self,
        node: NodeId,
        mut filter: impl FnMut(NodeId) -> bool,
    ) -> GraphResult<()> {
        self.member(node)?;
        let parents: Vec<EdgeId> = self
            .incoming
            .get(&node)
            .map(|bucket| bucket.iter().copied().collect())
            .unwrap_or_default();
        for id in parents {
            let Some(edge) = self.edges.get(&id) else {
                continue;
            };
            if filter(edge.owner()) {
                self.dispose_edge(id);
            }
        }
        Ok(())
    }

    // ============================================================
    // Literal attributes
    // ============================================================

    pub fn get(&self, node: NodeId, attribute: &str) -> GraphResult<&Value> {
        self.member(node)?.literal(attribute)
    }

    pub fn set(
        &mut self,
        node: NodeId,
        attribute: &str,
        value: impl Into<Value>,
    ) -> GraphResult<()> {
        let record = self.live_mut(node)?;
        match record.slot_mut(attribute)? {
            Slot::Literal(slot_value) => *slot_value = value.into(),
            slot => return Err(wrong_slot(attribute, "a literal", slot.kind())),
        }
        self.emit_node_event(
            node,
            NodeEvent::Change {
                node,
                attribute: attribute.to_string(),
                key: None,
            },
        );
        Ok(())
    }

    // ============================================================
    // Single references
    // ============================================================

    pub fn get_ref(&self, node: NodeId, attribute: &str) -> GraphResult<Option<NodeId>> {
        self.member(node)?.single_ref(attribute)
    }

    /// Point a single-reference slot at `target`, or clear it with `None`.
    ///
    /// Fails with [`GraphError::ImmutableReference`] when the slot was
    /// populated from defaults. Replacing disposes the previous edge first,
    /// which detaches the old target.
    pub fn set_ref(
        &mut self,
        node: NodeId,
        attribute: &str,
        target: Option<NodeId>,
    ) -> GraphResult<()> {
        self.set_ref_with(node, attribute, target, AttributeMap::new())
    }

    /// [`set_ref`](Self::set_ref) with auxiliary edge attributes.
    pub fn set_ref_with(
        &mut self,
        node: NodeId,
        attribute: &str,
        target: Option<NodeId>,
        attributes: AttributeMap,
    ) -> GraphResult<()> {
        let record = self.live(node)?;
        let (old_edge, immutable) = match record.slot(attribute)? {
            Slot::Single { entry, immutable } => (entry.map(|e| e.edge), *immutable),
            slot => return Err(wrong_slot(attribute, "a single reference", slot.kind())),
        };
        if immutable {
            return Err(GraphError::ImmutableReference(attribute.to_string()));
        }
        // Validate the new target before any state changes.
        if let Some(target) = target {
            self.live(target)?;
        }

        if let Some(old) = old_edge {
            self.dispose_edge(old);
        }
        if let Some(target) = target {
            let edge = self.register_edge(attribute, node, target, attributes, false)?;
            if let Some(record) = self.nodes.get_mut(&node) {
                if let Ok(Slot::Single { entry, .. }) = record.slot_mut(attribute) {
                    *entry = Some(RefEntry {
                        edge,
                        resource: target,
                    });
                }
            }
            self.emit_node_event(
                node,
                NodeEvent::Change {
                    node,
                    attribute: attribute.to_string(),
                    key: None,
                },
            );
        }
        Ok(())
    }

    // ============================================================
    // Reference lists and sets
    // ============================================================

    pub fn list_refs(&self, node: NodeId, attribute: &str) -> GraphResult<Vec<NodeId>> {
        self.member(node)?.list_refs(attribute)
    }

    /// Create a new edge to `target` and insert it into a list or set slot.
    ///
    /// On a set slot this replaces (and disposes) any prior edge to the same
    /// resource; on a list slot duplicates accumulate.
    pub fn add_ref(
        &mut self,
        node: NodeId,
        attribute: &str,
        target: NodeId,
    ) -> GraphResult<EdgeId> {
        self.add_ref_with(node, attribute, target, AttributeMap::new())
    }

    /// [`add_ref`](Self::add_ref) with auxiliary edge attributes.
    pub fn add_ref_with(
        &mut self,
        node: NodeId,
        attribute: &str,
        target: NodeId,
        attributes: AttributeMap,
    ) -> GraphResult<EdgeId> {
        let record = self.live(node)?;
        let evicted = match record.slot(attribute)? {
            Slot::List(_) => None,
            Slot::Set(set) => set.get(target),
            slot => {
                return Err(wrong_slot(attribute, "a reference list or set", slot.kind()));
            }
        };
        self.live(target)?;

        if let Some(old) = evicted {
            self.dispose_edge(old);
        }
        let edge = self.register_edge(attribute, node, target, attributes, false)?;
        if let Some(record) = self.nodes.get_mut(&node) {
            match record.slot_mut(attribute) {
                Ok(Slot::List(list)) => list.add(RefEntry {
                    edge,
                    resource: target,
                }),
                Ok(Slot::Set(set)) => {
                    set.add(target, edge);
                }
                _ => {}
            }
        }
        self.emit_node_event(
            node,
            NodeEvent::Change {
                node,
                attribute: attribute.to_string(),
                key: None,
            },
        );
        Ok(edge)
    }

    /// Dispose the edge(s) to `target` in a list or set slot.
    ///
    /// A list slot drops *every* matching edge in one call; a set slot drops
    /// its single edge. Removing an absent resource is a no-op.
    pub fn remove_ref(&mut self, node: NodeId, attribute: &str, target: NodeId) -> GraphResult<()> {
        let record = self.member(node)?;
        let doomed: Vec<EdgeId> = match record.slot(attribute)? {
            Slot::List(list) => list.list_by_resource(target),
            Slot::Set(set) => set.get(target).into_iter().collect(),
            slot => {
                return Err(wrong_slot(attribute, "a reference list or set", slot.kind()));
            }
        };
        for edge in doomed {
            self.dispose_edge(edge);
        }
        Ok(())
    }

    // ============================================================
    // Reference maps
    // ============================================================

    pub fn ref_map_keys(&self, node: NodeId, attribute: &str) -> GraphResult<Vec<String>> {
        self.member(node)?.ref_map_keys(attribute)
    }

    pub fn ref_map_values(&self, node: NodeId, attribute: &str) -> GraphResult<Vec<NodeId>> {
        self.member(node)?.ref_map_values(attribute)
    }

    pub fn get_ref_map(
        &self,
        node: NodeId,
        attribute: &str,
        key: &str,
    ) -> GraphResult<Option<NodeId>> {
        self.member(node)?.ref_map(attribute, key)
    }

    /// Point the map slot's `key` at `target`, or clear the key with `None`.
    ///
    /// The created edge's attributes always include the key under
    /// [`KEY_ATTRIBUTE`], so it can be recovered from the edge alone.
    pub fn set_ref_map(
        &mut self,
        node: NodeId,
        attribute: &str,
        key: &str,
        target: Option<NodeId>,
    ) -> GraphResult<()> {
        self.set_ref_map_with(node, attribute, key, target, AttributeMap::new())
    }

    /// [`set_ref_map`](Self::set_ref_map) with auxiliary edge attributes.
    pub fn set_ref_map_with(
        &mut self,
        node: NodeId,
        attribute: &str,
        key: &str,
        target: Option<NodeId>,
        mut attributes: AttributeMap,
    ) -> GraphResult<()> {
        let record = self.live(node)?;
        let existing = match record.slot(attribute)? {
            Slot::Map(map) => map.get(key).map(|e| e.edge),
            slot => return Err(wrong_slot(attribute, "a reference map", slot.kind())),
        };
        if let Some(target) = target {
            self.live(target)?;
        }

        if let Some(old) = existing {
            self.dispose_edge(old);
        }
        if let Some(target) = target {
            attributes.insert(KEY_ATTRIBUTE.to_string(), Value::from(key));
            let edge = self.register_edge(attribute, node, target, attributes, false)?;
            if let Some(record) = self.nodes.get_mut(&node) {
                if let Ok(Slot::Map(map)) = record.slot_mut(attribute) {
                    map.set(
                        key,
                        RefEntry {
                            edge,
                            resource: target,
                        },
                    );
                }
            }
            self.emit_node_event(
                node,
                NodeEvent::Change {
                    node,
                    attribute: attribute.to_string(),
                    key: Some(key.to_string()),
                },
            );
        }
        Ok(())
    }

    // ============================================================
    // Lifecycle
    // ============================================================

    /// Dispose every incoming edge of `node`, leaving outgoing edges (and
    /// therefore its children) intact. A detached node may be re-attached by
    /// later `set_ref`/`add_ref` calls from other nodes.
    pub fn detach(&mut self, node: NodeId) -> GraphResult<()> {
        self.disconnect_parents(node)
    }

    /// Dispose a node: every outgoing edge is disposed (cascading to owned
    /// children), every incoming edge is disposed, the node is marked
    /// disposed and a `dispose` event is dispatched. Idempotent; a disposed
    /// node is terminal and never reused.
    pub fn dispose_node(&mut self, node: NodeId) {
        let Some(record) = self.nodes.get(&node) else {
            return;
        };
        if record.is_disposed() {
            return;
        }
        debug!(node = %node, label = %record.label(), "disposing node");

        let child_edges: Vec<EdgeId> = self
            .outgoing
            .get(&node)
            .map(|bucket| bucket.iter().copied().collect())
            .unwrap_or_default();
        for edge in child_edges {
            self.dispose_edge(edge);
        }

        let parent_edges: Vec<EdgeId> = self
            .incoming
            .get(&node)
            .map(|bucket| bucket.iter().copied().collect())
            .unwrap_or_default();
        for edge in parent_edges {
            self.dispose_edge(edge);
        }

        // A cycle of owned edges can re-enter disposal for this node while
        // the cascade above runs; the second entry wins.
        let Some(record) = self.nodes.get_mut(&node) else {
            return;
        };
        if record.is_disposed() {
            return;
        }
        record.mark_disposed();

        self.emit_node_event(node, NodeEvent::Dispose { node });
        if let Some(record) = self.nodes.get_mut(&node) {
            record.events.clear();
        }
    }

    /// Replace every reference `node` holds to `old` with an equivalent one
    /// to `new`, carrying over each edge's auxiliary attributes and
    /// ownership. List and map duplicates are replaced individually, in
    /// place. Returns the number of edges replaced.
    pub fn swap(&mut self, node: NodeId, old: NodeId, new: NodeId) -> GraphResult<usize> {
        let record = self.member(node)?;
        self.member(old)?;
        self.live(new)?;

        let mut plan: Vec<Replacement> = Vec::new();
        for (attribute, slot) in record.slots() {
            match slot {
                Slot::Single { entry, .. } => {
                    if let Some(entry) = entry {
                        if entry.resource == old {
                            plan.push(Replacement {
                                attribute: attribute.to_string(),
                                position: SlotPosition::Single,
                                old_edge: entry.edge,
                                attributes: AttributeMap::new(),
                                owned: false,
                            });
                        }
                    }
                }
                Slot::List(list) => {
                    for edge in list.list_by_resource(old) {
                        plan.push(Replacement {
                            attribute: attribute.to_string(),
                            position: SlotPosition::List,
                            old_edge: edge,
                            attributes: AttributeMap::new(),
                            owned: false,
                        });
                    }
                }
                Slot::Set(set) => {
                    if let Some(edge) = set.get(old) {
                        plan.push(Replacement {
                            attribute: attribute.to_string(),
                            position: SlotPosition::Set,
                            old_edge: edge,
                            attributes: AttributeMap::new(),
                            owned: false,
                        });
                    }
                }
                Slot::Map(map) => {
                    for (key, entry) in map.entries() {
                        if entry.resource == old {
                            plan.push(Replacement {
                                attribute: attribute.to_string(),
                                position: SlotPosition::Map(key.to_string()),
                                old_edge: entry.edge,
                                attributes: AttributeMap::new(),
                                owned: false,
                            });
                        }
                    }
                }
                Slot::Literal(_) => {}
            }
        }
        for replacement in &mut plan {
            if let Some(edge) = self.edges.get(&replacement.old_edge) {
                replacement.attributes = edge.attributes().clone();
                replacement.owned = edge.is_owned();
            }
        }

        let count = plan.len();
        for replacement in plan {
            let edge = self.register_edge(
                &replacement.attribute,
                node,
                new,
                replacement.attributes,
                replacement.owned,
            )?;
            let entry = RefEntry {
                edge,
                resource: new,
            };
            let mut evicted: Option<EdgeId> = None;
            let mut key = None;
            if let Some(record) = self.nodes.get_mut(&node) {
                match (record.slot_mut(&replacement.attribute), &replacement.position) {
                    (Ok(Slot::Single { entry: slot, .. }), SlotPosition::Single) => {
                        *slot = Some(entry);
                    }
                    (Ok(Slot::List(list)), SlotPosition::List) => {
                        list.replace(replacement.old_edge, entry);
                    }
                    (Ok(Slot::Set(set)), SlotPosition::Set) => {
                        set.remove(old, replacement.old_edge);
                        evicted = set.add(new, edge);
                    }
                    (Ok(Slot::Map(map)), SlotPosition::Map(map_key)) => {
                        map.set(map_key.clone(), entry);
                        key = Some(map_key.clone());
                    }
                    _ => {}
                }
            }
            self.dispose_edge(replacement.old_edge);
            if let Some(evicted) = evicted {
                // The set already held an edge to `new`; one edge per
                // resource wins.
                self.dispose_edge(evicted);
            }
            self.emit_node_event(
                node,
                NodeEvent::Change {
                    node,
                    attribute: replacement.attribute,
                    key,
                },
            );
        }

        if count > 0 {
            debug!(node = %node, old = %old, new = %new, count, "swapped references");
        }
        Ok(count)
    }

    // ============================================================
    // Events
    // ============================================================

    /// Register a graph-level listener. Node events arrive here under
    /// `node:`-prefixed kinds, immediately after the node-local dispatch.
    pub fn on(&mut self, listener: impl FnMut(&GraphEvent) + 'static) -> ListenerId {
        self.events.on(listener)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.events.off(id)
    }

    /// Register a listener on one node.
    pub fn on_node(
        &mut self,
        node: NodeId,
        listener: impl FnMut(&NodeEvent) + 'static,
    ) -> GraphResult<ListenerId> {
        let record = self.live_mut(node)?;
        Ok(record.events.on(listener))
    }

    pub fn off_node(&mut self, node: NodeId, id: ListenerId) -> GraphResult<bool> {
        let record = self.member_mut(node)?;
        Ok(record.events.off(id))
    }

    // ============================================================
    // Diagnostics
    // ============================================================

    /// Verify that the three index structures and every attribute slot agree:
    /// each live edge sits in exactly its owner's outgoing bucket, its
    /// resource's incoming bucket, and at most one attribute slot (with
    /// matching owner, name, and resource); each bucket entry refers to a
    /// live edge with the matching endpoint.
    pub fn is_index_consistent(&self) -> bool {
        for (id, edge) in &self.edges {
            let in_outgoing = self
                .outgoing
                .get(&edge.owner())
                .is_some_and(|bucket| bucket.contains(id));
            let in_incoming = self
                .incoming
                .get(&edge.resource())
                .is_some_and(|bucket| bucket.contains(id));
            if !in_outgoing || !in_incoming {
                return false;
            }
        }
        for (owner, bucket) in &self.outgoing {
            for id in bucket {
                match self.edges.get(id) {
                    Some(edge) if edge.owner() == *owner => {}
                    _ => return false,
                }
            }
        }
        for (resource, bucket) in &self.incoming {
            for id in bucket {
                match self.edges.get(id) {
                    Some(edge) if edge.resource() == *resource => {}
                    _ => return false,
                }
            }
        }

        let mut seen: FxIndexSet<EdgeId> = FxIndexSet::default();
        for node in self.nodes.values() {
            for (name, slot) in node.slots() {
                let occupants: Vec<RefEntry> = match slot {
                    Slot::Literal(_) => continue,
                    Slot::Single { entry, .. } => entry.iter().copied().collect(),
                    Slot::List(list) => list.entries().copied().collect(),
                    Slot::Set(set) => set.entries().collect(),
                    Slot::Map(map) => map.entries().map(|(_, entry)| *entry).collect(),
                };
                for entry in occupants {
                    let Some(edge) = self.edges.get(&entry.edge) else {
                        return false;
                    };
                    if edge.owner() != node.id()
                        || edge.name() != name
                        || edge.resource() != entry.resource
                    {
                        return false;
                    }
                    if !seen.insert(entry.edge) {
                        return false;
                    }
                }
            }
        }
        true
    }

    // ============================================================
    // Internals
    // ============================================================

    fn member(&self, node: NodeId) -> GraphResult<&Node> {
        if node.graph_id() != self.id {
            return Err(GraphError::CrossGraph(node));
        }
        self.nodes.get(&node).ok_or(GraphError::NodeNotFound(node))
    }

    fn member_mut(&mut self, node: NodeId) -> GraphResult<&mut Node> {
        if node.graph_id() != self.id {
            return Err(GraphError::CrossGraph(node));
        }
        self.nodes
            .get_mut(&node)
            .ok_or(GraphError::NodeNotFound(node))
    }

    fn live(&self, node: NodeId) -> GraphResult<&Node> {
        let record = self.member(node)?;
        if record.is_disposed() {
            return Err(GraphError::Disposed(node));
        }
        Ok(record)
    }

    fn live_mut(&mut self, node: NodeId) -> GraphResult<&mut Node> {
        let record = self.member_mut(node)?;
        if record.is_disposed() {
            return Err(GraphError::Disposed(node));
        }
        Ok(record)
    }

    fn register_edge(
        &mut self,
        name: &str,
        owner: NodeId,
        resource: NodeId,
        attributes: AttributeMap,
        owned: bool,
    ) -> GraphResult<EdgeId> {
        self.live(owner)?;
        self.live(resource)?;

        let id = EdgeId::new(self.next_edge);
        self.next_edge += 1;
        let edge = Edge::new(id, name, owner, resource, attributes, owned);
        self.edges.insert(id, edge);
        self.outgoing.entry(owner).or_default().insert(id);
        self.incoming.entry(resource).or_default().insert(id);
        trace!(edge = %id, owner = %owner, resource = %resource, name, "registered edge");
        Ok(id)
    }

    /// Reciprocal hook: clear whichever slot holds `edge` on its owner and
    /// dispatch a `change` event there. Tolerates edges that occupy no slot
    /// (raw [`create_edge`](Self::create_edge) edges, or slots already
    /// repopulated by swap).
    fn clear_occupancy(&mut self, edge: &Edge) {
        let owner = edge.owner();
        let mut change: Option<Option<String>> = None;
        if let Some(record) = self.nodes.get_mut(&owner) {
            if let Ok(slot) = record.slot_mut(edge.name()) {
                match slot {
                    Slot::Single { entry, .. } => {
                        if (*entry).map(|e| e.edge) == Some(edge.id()) {
                            *entry = None;
                            change = Some(None);
                        }
                    }
                    Slot::List(list) => {
                        if list.remove(edge.id()) {
                            change = Some(None);
                        }
                    }
                    Slot::Set(set) => {
                        if set.remove(edge.resource(), edge.id()) {
                            change = Some(None);
                        }
                    }
                    Slot::Map(map) => {
                        if let Some(key) = map.remove_edge(edge.id()) {
                            change = Some(Some(key));
                        }
                    }
                    Slot::Literal(_) => {}
                }
            }
        }
        if let Some(key) = change {
            self.emit_node_event(
                owner,
                NodeEvent::Change {
                    node: owner,
                    attribute: edge.name().to_string(),
                    key,
                },
            );
        }
    }

    /// Dispatch on the node's listeners, then re-dispatch on the graph under
    /// the `node:`-prefixed kind.
    fn emit_node_event(&mut self, node: NodeId, event: NodeEvent) {
        if let Some(record) = self.nodes.get_mut(&node) {
            record.events.emit(&event);
        }
        let forwarded = GraphEvent::from(&event);
        self.events.emit(&forwarded);
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
