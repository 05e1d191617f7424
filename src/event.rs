//! Event dispatch for nodes and graphs.
//!
//! Both [`Graph`](crate::Graph) and every node embed an [`EventDispatcher`];
//! listeners run synchronously, in registration order, at the moment of the
//! triggering mutation. Every node-local event is re-dispatched on the
//! owning graph under a `node:`-prefixed kind, immediately after the
//! node-local dispatch.

use crate::types::NodeId;
use std::fmt;

/// Handle returned by [`EventDispatcher::on`], used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Ordered, synchronous publish/subscribe component.
pub struct EventDispatcher<E> {
    listeners: Vec<(ListenerId, Box<dyn FnMut(&E)>)>,
    next: u64,
}

impl<E> EventDispatcher<E> {
    pub fn new() -> Self {
        EventDispatcher {
            listeners: Vec::new(),
            next: 1,
        }
    }

    /// Register a listener; it is invoked for every subsequent emit, after
    /// all listeners registered before it.
    pub fn on(&mut self, listener: impl FnMut(&E) + 'static) -> ListenerId {
        let id = ListenerId(self.next);
        self.next += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Unregister a listener. Returns false if the id is unknown.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Invoke every registered listener, in registration order.
    pub fn emit(&mut self, event: &E) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Drop every registered listener.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

impl<E> Default for EventDispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventDispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Events dispatched by a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeEvent {
    /// An attribute on the node changed. `key` is set for map-slot changes.
    Change {
        node: NodeId,
        attribute: String,
        key: Option<String>,
    },
    /// The node was disposed.
    Dispose { node: NodeId },
}

impl NodeEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            NodeEvent::Change { .. } => "change",
            NodeEvent::Dispose { .. } => "dispose",
        }
    }

    pub fn node(&self) -> NodeId {
        match self {
            NodeEvent::Change { node, .. } | NodeEvent::Dispose { node } => *node,
        }
    }
}

/// Node events as observed from the owning graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphEvent {
    NodeChange {
        node: NodeId,
        attribute: String,
        key: Option<String>,
    },
    NodeDispose { node: NodeId },
}

impl GraphEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            GraphEvent::NodeChange { .. } => "node:change",
            GraphEvent::NodeDispose { .. } => "node:dispose",
        }
    }

    pub fn node(&self) -> NodeId {
        match self {
            GraphEvent::NodeChange { node, .. } | GraphEvent::NodeDispose { node } => *node,
        }
    }
}

impl From<&NodeEvent> for GraphEvent {
    fn from(event: &NodeEvent) -> Self {
        match event {
            NodeEvent::Change {
                node,
                attribute,
                key,
            } => GraphEvent::NodeChange {
                node: *node,
                attribute: attribute.clone(),
                key: key.clone(),
            },
            NodeEvent::Dispose { node } => GraphEvent::NodeDispose { node: *node },
        }
    }
}
