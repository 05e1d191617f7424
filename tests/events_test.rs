//! Event propagation coverage: ordering, graph-level namespacing,
//! unsubscription, and the consumer-facing wrapper pattern.

use refgraph::{Defaults, EdgeId, Graph, GraphError, GraphEvent, GraphResult, NodeEvent, NodeId};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn test_graph_observes_dispose_order() {
    let mut graph = Graph::new();
    let n1 = graph.create_node("Node", Defaults::new()).unwrap();
    let n2 = graph.create_node("Node", Defaults::new()).unwrap();

    let seen: Rc<RefCell<Vec<NodeId>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    graph.on(move |event| {
        if let GraphEvent::NodeDispose { node } = event {
            sink.borrow_mut().push(*node);
        }
    });

    graph.dispose_node(n1);
    graph.dispose_node(n2);

    assert_eq!(*seen.borrow(), [n1, n2]);
}

#[test]
fn test_node_events_are_renamed_on_the_graph() {
    let mut graph = Graph::new();
    let node = graph
        .create_node("Node", Defaults::new().literal("name", ""))
        .unwrap();

    let kinds: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&kinds);
    graph.on(move |event| sink.borrow_mut().push(event.kind()));

    graph.set(node, "name", "n0").unwrap();
    graph.dispose_node(node);

    assert_eq!(*kinds.borrow(), ["node:change", "node:dispose"]);
}

#[test]
fn test_node_local_dispatch_precedes_graph_dispatch() {
    let mut graph = Graph::new();
    let node = graph
        .create_node("Node", Defaults::new().literal("name", ""))
        .unwrap();

    let order: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&order);
    graph
        .on_node(node, move |event| {
            sink.borrow_mut().push(format!("node:{}", event.kind()));
        })
        .unwrap();
    let sink = Rc::clone(&order);
    graph.on(move |event| {
        sink.borrow_mut().push(format!("graph:{}", event.kind()));
    });

    graph.set(node, "name", "n0").unwrap();

    assert_eq!(*order.borrow(), ["node:change", "graph:node:change"]);
}

#[test]
fn test_change_payload_carries_attribute_and_key() {
    let mut graph = Graph::new();
    let node = graph
        .create_node("Node", Defaults::new().literal("name", "").ref_map("slots"))
        .unwrap();
    let target = graph.create_node("Node", Defaults::new()).unwrap();

    let changes: Rc<RefCell<Vec<(String, Option<String>)>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&changes);
    graph
        .on_node(node, move |event| {
            if let NodeEvent::Change { attribute, key, .. } = event {
                sink.borrow_mut().push((attribute.clone(), key.clone()));
            }
        })
        .unwrap();

    graph.set(node, "name", "n0").unwrap();
    graph.set_ref_map(node, "slots", "base", Some(target)).unwrap();
    graph.set_ref_map(node, "slots", "base", None).unwrap();

    assert_eq!(
        *changes.borrow(),
        [
            ("name".to_string(), None),
            ("slots".to_string(), Some("base".to_string())),
            ("slots".to_string(), Some("base".to_string())),
        ]
    );
}

#[test]
fn test_slot_cleanup_notifies_owner_wherever_disposal_starts() {
    let mut graph = Graph::new();
    let owner = graph
        .create_node("Node", Defaults::new().ref_list("items"))
        .unwrap();
    let item = graph.create_node("Node", Defaults::new()).unwrap();
    graph.add_ref(owner, "items", item).unwrap();

    let changes = Rc::new(RefCell::new(0u32));
    let sink = Rc::clone(&changes);
    graph
        .on_node(owner, move |event| {
            if matches!(event, NodeEvent::Change { .. }) {
                *sink.borrow_mut() += 1;
            }
        })
        .unwrap();

    // Disposal initiated from the far side of the edge still clears the
    // owner's slot and notifies it.
    graph.dispose_node(item);
    assert_eq!(*changes.borrow(), 1);
    assert!(graph.list_refs(owner, "items").unwrap().is_empty());
}

#[test]
fn test_unsubscribe_stops_delivery() {
    let mut graph = Graph::new();
    let node = graph
        .create_node("Node", Defaults::new().literal("name", ""))
        .unwrap();

    let node_hits = Rc::new(RefCell::new(0u32));
    let graph_hits = Rc::new(RefCell::new(0u32));

    let sink = Rc::clone(&node_hits);
    let node_listener = graph
        .on_node(node, move |_| *sink.borrow_mut() += 1)
        .unwrap();
    let sink = Rc::clone(&graph_hits);
    let graph_listener = graph.on(move |_| *sink.borrow_mut() += 1);

    graph.set(node, "name", "a").unwrap();
    assert!(graph.off_node(node, node_listener).unwrap());
    assert!(graph.off(graph_listener));
    graph.set(node, "name", "b").unwrap();

    assert_eq!(*node_hits.borrow(), 1);
    assert_eq!(*graph_hits.borrow(), 1);
}

#[test]
fn test_disposed_node_emits_no_further_events() {
    let mut graph = Graph::new();
    let node = graph.create_node("Node", Defaults::new()).unwrap();

    let disposals = Rc::new(RefCell::new(0u32));
    let sink = Rc::clone(&disposals);
    graph.on(move |event| {
        if matches!(event, GraphEvent::NodeDispose { .. }) {
            *sink.borrow_mut() += 1;
        }
    });

    graph.dispose_node(node);
    graph.dispose_node(node);
    assert_eq!(*disposals.borrow(), 1);

    // A disposed node is terminal: its listeners are gone and new ones are
    // refused.
    assert_eq!(
        graph.on_node(node, |_| {}).unwrap_err(),
        GraphError::Disposed(node)
    );
}

/// The consumer-facing pattern: a domain type wraps a node handle and
/// exposes named methods over the generic attribute API.
struct Scene {
    node: NodeId,
}

impl Scene {
    const CHILDREN: &'static str = "children";

    fn create(graph: &mut Graph) -> GraphResult<Self> {
        let node = graph.create_node(
            "Scene",
            Defaults::new().literal("name", "").ref_list(Self::CHILDREN),
        )?;
        Ok(Scene { node })
    }

    fn set_name(&self, graph: &mut Graph, name: &str) -> GraphResult<()> {
        graph.set(self.node, "name", name)
    }

    fn add_child(&self, graph: &mut Graph, child: NodeId) -> GraphResult<EdgeId> {
        graph.add_ref(self.node, Self::CHILDREN, child)
    }

    fn remove_child(&self, graph: &mut Graph, child: NodeId) -> GraphResult<()> {
        graph.remove_ref(self.node, Self::CHILDREN, child)
    }

    fn children(&self, graph: &Graph) -> GraphResult<Vec<NodeId>> {
        graph.list_refs(self.node, Self::CHILDREN)
    }
}

#[test]
fn test_domain_wrapper_over_generic_attribute_api() {
    let mut graph = Graph::new();
    let scene = Scene::create(&mut graph).unwrap();
    scene.set_name(&mut graph, "root").unwrap();

    let mesh = graph.create_node("Mesh", Defaults::new()).unwrap();
    let light = graph.create_node("Light", Defaults::new()).unwrap();

    scene.add_child(&mut graph, mesh).unwrap();
    scene.add_child(&mut graph, light).unwrap();
    assert_eq!(scene.children(&graph).unwrap(), vec![mesh, light]);

    scene.remove_child(&mut graph, mesh).unwrap();
    assert_eq!(scene.children(&graph).unwrap(), vec![light]);

    graph.dispose_node(scene.node);
    assert!(graph.is_disposed(scene.node));
    assert!(!graph.is_disposed(light));
    assert!(graph.is_index_consistent());
}
