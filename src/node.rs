//! Nodes and their attribute slots.
//!
//! A node is the unit of identity. Its attributes live in tagged slots:
//! literal values, a single reference, or one of the three reference
//! collections. Slots are private to the node; external code goes through
//! the typed accessors here (reads) and on [`Graph`](crate::Graph)
//! (mutations).

use crate::collection::{RefEntry, RefList, RefMap, RefSet};
use crate::event::{EventDispatcher, NodeEvent};
use crate::graph::{GraphError, GraphResult};
use crate::types::{EdgeId, Label, NodeId};
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of an attribute slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotKind {
    Literal,
    Single,
    List,
    Set,
    Map,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SlotKind::Literal => "literal",
            SlotKind::Single => "single-reference",
            SlotKind::List => "reference-list",
            SlotKind::Set => "reference-set",
            SlotKind::Map => "reference-map",
        };
        write!(f, "{}", name)
    }
}

/// Declared initial value for one attribute.
#[derive(Debug, Clone)]
pub enum AttributeDefault {
    /// Literal slot with an initial value.
    Literal(Value),
    /// Single-reference slot. `Some(node)` wires an immutable owned edge at
    /// construction; `None` declares an empty, reassignable slot.
    Ref(Option<NodeId>),
    /// Empty ordered list collection (duplicates allowed).
    RefList,
    /// Empty ordered set collection (one edge per resource).
    RefSet,
    /// Empty string-keyed map collection (one edge per key).
    RefMap,
}

/// Declared initial attributes for a node, applied once at construction in
/// declaration order.
#[derive(Debug, Clone, Default)]
pub struct Defaults {
    attributes: IndexMap<String, AttributeDefault>,
}

impl Defaults {
    pub fn new() -> Self {
        Defaults {
            attributes: IndexMap::new(),
        }
    }

    /// Declare a literal attribute.
    pub fn literal(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes
            .insert(name.into(), AttributeDefault::Literal(value.into()));
        self
    }

    /// Declare an empty, reassignable single-reference attribute.
    pub fn reference(mut self, name: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), AttributeDefault::Ref(None));
        self
    }

    /// Declare a composed child: an immutable single reference wired at
    /// construction and disposed together with its owner.
    pub fn child(mut self, name: impl Into<String>, node: NodeId) -> Self {
        self.attributes
            .insert(name.into(), AttributeDefault::Ref(Some(node)));
        self
    }

    /// Declare an empty reference-list attribute.
    pub fn ref_list(mut self, name: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), AttributeDefault::RefList);
        self
    }

    /// Declare an empty reference-set attribute.
    pub fn ref_set(mut self, name: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), AttributeDefault::RefSet);
        self
    }

    /// Declare an empty reference-map attribute.
    pub fn ref_map(mut self, name: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), AttributeDefault::RefMap);
        self
    }

    pub(crate) fn into_attributes(self) -> IndexMap<String, AttributeDefault> {
        self.attributes
    }
}

/// Storage behind one attribute slot.
#[derive(Debug)]
pub(crate) enum Slot {
    Literal(Value),
    Single {
        entry: Option<RefEntry>,
        immutable: bool,
    },
    List(RefList),
    Set(RefSet),
    Map(RefMap),
}

impl Slot {
    pub(crate) fn kind(&self) -> SlotKind {
        match self {
            Slot::Literal(_) => SlotKind::Literal,
            Slot::Single { .. } => SlotKind::Single,
            Slot::List(_) => SlotKind::List,
            Slot::Set(_) => SlotKind::Set,
            Slot::Map(_) => SlotKind::Map,
        }
    }
}

pub(crate) fn wrong_slot(attribute: &str, expected: &'static str, found: SlotKind) -> GraphError {
    GraphError::WrongSlotKind {
        attribute: attribute.to_string(),
        expected,
        found,
    }
}

/// A typed node and its attribute slots.
///
/// Nodes are created and mutated exclusively through their owning graph;
/// the accessors here are read-only.
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    label: Label,
    slots: IndexMap<String, Slot>,
    disposed: bool,
    pub(crate) events: EventDispatcher<NodeEvent>,
}

impl Node {
    pub(crate) fn new(id: NodeId, label: Label) -> Self {
        Node {
            id,
            label,
            slots: IndexMap::new(),
            disposed: false,
            events: EventDispatcher::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    /// A disposed node is terminal and never reused.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Declared attribute names, in declaration order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    /// Kind of the named slot, or None if undeclared.
    pub fn slot_kind(&self, attribute: &str) -> Option<SlotKind> {
        self.slots.get(attribute).map(Slot::kind)
    }

    /// Value of a literal slot.
    pub fn literal(&self, attribute: &str) -> GraphResult<&Value> {
        match self.slot(attribute)? {
            Slot::Literal(value) => Ok(value),
            slot => Err(wrong_slot(attribute, "a literal", slot.kind())),
        }
    }

    /// Target of a single-reference slot.
    pub fn single_ref(&self, attribute: &str) -> GraphResult<Option<NodeId>> {
        match self.slot(attribute)? {
            Slot::Single { entry, .. } => Ok(entry.map(|e| e.resource)),
            slot => Err(wrong_slot(attribute, "a single reference", slot.kind())),
        }
    }

    /// Edge behind a single-reference slot.
    pub fn ref_edge(&self, attribute: &str) -> GraphResult<Option<EdgeId>> {
        match self.slot(attribute)? {
            Slot::Single { entry, .. } => Ok(entry.map(|e| e.edge)),
            slot => Err(wrong_slot(attribute, "a single reference", slot.kind())),
        }
    }

    /// Targets of a list or set slot, in collection order. List duplicates
    /// appear once per edge.
    pub fn list_refs(&self, attribute: &str) -> GraphResult<Vec<NodeId>> {
        match self.slot(attribute)? {
            Slot::List(list) => Ok(list.resources().collect()),
            Slot::Set(set) => Ok(set.resources().collect()),
            slot => Err(wrong_slot(attribute, "a reference list or set", slot.kind())),
        }
    }

    /// Edges of a list or set slot, in collection order.
    pub fn ref_edges(&self, attribute: &str) -> GraphResult<Vec<EdgeId>> {
        match self.slot(attribute)? {
            Slot::List(list) => Ok(list.entries().map(|e| e.edge).collect()),
            Slot::Set(set) => Ok(set.edges().collect()),
            slot => Err(wrong_slot(attribute, "a reference list or set", slot.kind())),
        }
    }

    /// Keys of a map slot, in insertion order.
    pub fn ref_map_keys(&self, attribute: &str) -> GraphResult<Vec<String>> {
        match self.slot(attribute)? {
            Slot::Map(map) => Ok(map.keys().map(str::to_string).collect()),
            slot => Err(wrong_slot(attribute, "a reference map", slot.kind())),
        }
    }

    /// Targets of a map slot, in key order.
    pub fn ref_map_values(&self, attribute: &str) -> GraphResult<Vec<NodeId>> {
        match self.slot(attribute)? {
            Slot::Map(map) => Ok(map.entries().map(|(_, e)| e.resource).collect()),
            slot => Err(wrong_slot(attribute, "a reference map", slot.kind())),
        }
    }

    /// Target under `key` in a map slot.
    pub fn ref_map(&self, attribute: &str, key: &str) -> GraphResult<Option<NodeId>> {
        match self.slot(attribute)? {
            Slot::Map(map) => Ok(map.get(key).map(|e| e.resource)),
            slot => Err(wrong_slot(attribute, "a reference map", slot.kind())),
        }
    }

    /// Edge under `key` in a map slot.
    pub fn ref_map_edge(&self, attribute: &str, key: &str) -> GraphResult<Option<EdgeId>> {
        match self.slot(attribute)? {
            Slot::Map(map) => Ok(map.get(key).map(|e| e.edge)),
            slot => Err(wrong_slot(attribute, "a reference map", slot.kind())),
        }
    }

    pub(crate) fn slot(&self, attribute: &str) -> GraphResult<&Slot> {
        self.slots
            .get(attribute)
            .ok_or_else(|| GraphError::UnknownAttribute(attribute.to_string()))
    }

    pub(crate) fn slot_mut(&mut self, attribute: &str) -> GraphResult<&mut Slot> {
        self.slots
            .get_mut(attribute)
            .ok_or_else(|| GraphError::UnknownAttribute(attribute.to_string()))
    }

    pub(crate) fn slots(&self) -> impl Iterator<Item = (&str, &Slot)> {
        self.slots.iter().map(|(name, slot)| (name.as_str(), slot))
    }

    pub(crate) fn insert_slot(&mut self, name: String, slot: Slot) {
        self.slots.insert(name, slot);
    }

    pub(crate) fn mark_disposed(&mut self) {
        self.disposed = true;
    }
}
