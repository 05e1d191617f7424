//! refgraph — an in-memory engine for labeled, directed multigraphs of
//! typed, disposable nodes.
//!
//! A base layer for applications that model resources as richly
//! interconnected objects (scene graphs, shader graphs, dependency graphs):
//! nodes reference each other through named, attributed edges, and removing
//! a node safely removes every relationship touching it.
//!
//! # Architecture
//!
//! - [`Graph`] owns every node and edge record plus the index of live edges
//!   (edge map, owner→outgoing bucket, resource→incoming bucket). All
//!   mutation goes through it, and every mutation leaves the indices and the
//!   owning attribute slot consistent before returning.
//! - Nodes hold literal attributes and reference attributes. Reference slots
//!   come in four shapes: single reference, ordered list (duplicates
//!   allowed), ordered set (one edge per resource), and string-keyed map
//!   (one edge per key).
//! - A reference populated from a node's declared [`Defaults`] is a
//!   composed child: immutable, and disposed together with its owner. Every
//!   other reference is an association — disposing the target detaches it
//!   from owners without disposing them.
//! - Nodes and the graph both dispatch events ([`NodeEvent`],
//!   [`GraphEvent`]); node-local events are re-dispatched on the graph under
//!   a `node:`-prefixed kind, synchronously and in registration order.
//!
//! The engine is single-threaded and synchronous: no operation suspends,
//! blocks, or runs in the background.
//!
//! # Example
//!
//! ```
//! use refgraph::{Defaults, Graph};
//!
//! let mut graph = Graph::new();
//!
//! let texture = graph.create_node("Texture", Defaults::new().literal("uri", "wood.png"))?;
//! let material = graph.create_node(
//!     "Material",
//!     Defaults::new().literal("name", "table").ref_list("textures"),
//! )?;
//!
//! graph.add_ref(material, "textures", texture)?;
//! assert_eq!(graph.list_refs(material, "textures")?, vec![texture]);
//!
//! // Disposing the texture tears down every edge touching it.
//! graph.dispose_node(texture);
//! assert!(graph.list_refs(material, "textures")?.is_empty());
//! # Ok::<(), refgraph::GraphError>(())
//! ```

pub mod edge;
pub mod event;
pub mod graph;
pub mod node;
pub mod types;
pub mod value;

mod collection;

// Re-export main types
pub use edge::{Edge, KEY_ATTRIBUTE};
pub use event::{EventDispatcher, GraphEvent, ListenerId, NodeEvent};
pub use graph::{Graph, GraphError, GraphResult};
pub use node::{AttributeDefault, Defaults, Node, SlotKind};
pub use types::{EdgeId, GraphId, Label, NodeId};
pub use value::{AttributeMap, Value};
