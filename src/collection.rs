//! Reference collections backing multi-valued attribute slots.
//!
//! Three policies over the same element type: [`RefList`] (ordered,
//! duplicates allowed), [`RefSet`] (ordered, at most one edge per distinct
//! resource), [`RefMap`] (string-keyed, one edge per key). Collections store
//! `(edge, resource)` pairs so reads never need a graph round-trip, and they
//! never validate graph membership — that responsibility belongs to edge
//! construction.

use crate::types::{EdgeId, FxIndexMap, NodeId};
use indexmap::IndexMap;

/// One occupant of a reference slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RefEntry {
    pub edge: EdgeId,
    pub resource: NodeId,
}

/// Ordered sequence of edges; the same resource may appear multiple times.
#[derive(Debug, Default)]
pub(crate) struct RefList {
    entries: Vec<RefEntry>,
}

impl RefList {
    pub fn new() -> Self {
        RefList { entries: Vec::new() }
    }

    /// Append an entry.
    pub fn add(&mut self, entry: RefEntry) {
        self.entries.push(entry);
    }

    /// Remove the first exact edge match. Returns false if absent.
    pub fn remove(&mut self, edge: EdgeId) -> bool {
        match self.entries.iter().position(|e| e.edge == edge) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove and return every edge whose resource is `node`. Duplicates are
    /// counted and removed individually, not collapsed.
    pub fn remove_by_resource(&mut self, node: NodeId) -> Vec<EdgeId> {
        let mut removed = Vec::new();
        self.entries.retain(|entry| {
            if entry.resource == node {
                removed.push(entry.edge);
                false
            } else {
                true
            }
        });
        removed
    }

    /// Every edge whose resource is `node`, in list order. O(n).
    pub fn list_by_resource(&self, node: NodeId) -> Vec<EdgeId> {
        self.entries
            .iter()
            .filter(|entry| entry.resource == node)
            .map(|entry| entry.edge)
            .collect()
    }

    /// Replace the first occurrence of `old_edge` in place. Returns false if
    /// absent.
    pub fn replace(&mut self, old_edge: EdgeId, entry: RefEntry) -> bool {
        match self.entries.iter().position(|e| e.edge == old_edge) {
            Some(index) => {
                self.entries[index] = entry;
                true
            }
            None => false,
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &RefEntry> {
        self.entries.iter()
    }

    pub fn resources(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.iter().map(|entry| entry.resource)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Ordered collection enforcing at most one edge per distinct resource.
///
/// Backed by a resource-keyed ordered map for O(1) membership and removal.
#[derive(Debug, Default)]
pub(crate) struct RefSet {
    by_resource: FxIndexMap<NodeId, EdgeId>,
}

impl RefSet {
    pub fn new() -> Self {
        RefSet {
            by_resource: FxIndexMap::default(),
        }
    }

    /// Insert an edge for `resource`, evicting and returning any prior edge
    /// for the same resource. Disposing the evicted edge is the caller's
    /// responsibility.
    pub fn add(&mut self, resource: NodeId, edge: EdgeId) -> Option<EdgeId> {
        self.by_resource.insert(resource, edge)
    }

    /// Remove the mapping for `resource`, but only if it maps to `edge`.
    pub fn remove(&mut self, resource: NodeId, edge: EdgeId) -> bool {
        if self.by_resource.get(&resource) == Some(&edge) {
            self.by_resource.shift_remove(&resource);
            true
        } else {
            false
        }
    }

    pub fn get(&self, resource: NodeId) -> Option<EdgeId> {
        self.by_resource.get(&resource).copied()
    }

    pub fn contains(&self, resource: NodeId) -> bool {
        self.by_resource.contains_key(&resource)
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.by_resource.values().copied()
    }

    pub fn resources(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.by_resource.keys().copied()
    }

    pub fn entries(&self) -> impl Iterator<Item = RefEntry> + '_ {
        self.by_resource.iter().map(|(resource, edge)| RefEntry {
            edge: *edge,
            resource: *resource,
        })
    }

    pub fn len(&self) -> usize {
        self.by_resource.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_resource.is_empty()
    }
}

/// String-keyed collection with one edge per key. The same resource may
/// appear under multiple keys.
#[derive(Debug, Default)]
pub(crate) struct RefMap {
    by_key: IndexMap<String, RefEntry>,
}

impl RefMap {
    pub fn new() -> Self {
        RefMap {
            by_key: IndexMap::new(),
        }
    }

    /// Insert an entry under `key`, overwriting in place. Returns the
    /// evicted entry, if any; disposal is the caller's responsibility.
    pub fn set(&mut self, key: impl Into<String>, entry: RefEntry) -> Option<RefEntry> {
        self.by_key.insert(key.into(), entry)
    }

    /// Remove the entry under `key`, preserving the order of the rest.
    pub fn delete(&mut self, key: &str) -> Option<RefEntry> {
        self.by_key.shift_remove(key)
    }

    pub fn get(&self, key: &str) -> Option<RefEntry> {
        self.by_key.get(key).copied()
    }

    /// Remove whichever entry holds `edge`, returning its key. Used by the
    /// reciprocal cleanup at edge disposal.
    pub fn remove_edge(&mut self, edge: EdgeId) -> Option<String> {
        let key = self
            .by_key
            .iter()
            .find(|(_, entry)| entry.edge == edge)
            .map(|(key, _)| key.clone())?;
        self.by_key.shift_remove(&key);
        Some(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.by_key.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &RefEntry)> {
        self.by_key.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GraphId;

    fn entry(graph: GraphId, edge: u64, node: u64) -> RefEntry {
        RefEntry {
            edge: EdgeId::new(edge),
            resource: NodeId::new(graph, node),
        }
    }

    #[test]
    fn test_list_counts_duplicates() {
        let graph = GraphId::new();
        let mut list = RefList::new();
        list.add(entry(graph, 1, 10));
        list.add(entry(graph, 2, 20));
        list.add(entry(graph, 3, 10));
        list.add(entry(graph, 4, 10));

        assert_eq!(list.len(), 4);
        assert_eq!(
            list.list_by_resource(NodeId::new(graph, 10)),
            [EdgeId::new(1), EdgeId::new(3), EdgeId::new(4)]
        );

        // One call removes every occurrence.
        let removed = list.remove_by_resource(NodeId::new(graph, 10));
        assert_eq!(removed, [EdgeId::new(1), EdgeId::new(3), EdgeId::new(4)]);
        assert_eq!(list.len(), 1);
        assert!(list.remove_by_resource(NodeId::new(graph, 10)).is_empty());
    }

    #[test]
    fn test_list_remove_first_exact_match() {
        let graph = GraphId::new();
        let mut list = RefList::new();
        list.add(entry(graph, 1, 10));
        list.add(entry(graph, 2, 10));

        assert!(list.remove(EdgeId::new(1)));
        assert!(!list.remove(EdgeId::new(1)));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_list_replace_in_place() {
        let graph = GraphId::new();
        let mut list = RefList::new();
        list.add(entry(graph, 1, 10));
        list.add(entry(graph, 2, 20));

        assert!(list.replace(EdgeId::new(1), entry(graph, 9, 30)));
        let edges: Vec<EdgeId> = list.entries().map(|e| e.edge).collect();
        assert_eq!(edges, [EdgeId::new(9), EdgeId::new(2)]);
    }

    #[test]
    fn test_set_evicts_prior_edge_for_resource() {
        let graph = GraphId::new();
        let resource = NodeId::new(graph, 10);
        let mut set = RefSet::new();

        assert_eq!(set.add(resource, EdgeId::new(1)), None);
        assert_eq!(set.add(resource, EdgeId::new(2)), Some(EdgeId::new(1)));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(resource), Some(EdgeId::new(2)));

        // Stale removal is refused.
        assert!(!set.remove(resource, EdgeId::new(1)));
        assert!(set.remove(resource, EdgeId::new(2)));
        assert!(set.is_empty());
    }

    #[test]
    fn test_map_overwrites_in_place_and_recovers_keys() {
        let graph = GraphId::new();
        let mut map = RefMap::new();
        map.set("base", entry(graph, 1, 10));
        map.set("detail", entry(graph, 2, 20));
        map.set("base", entry(graph, 3, 30));

        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, ["base", "detail"]);
        assert_eq!(map.get("base").map(|e| e.edge), Some(EdgeId::new(3)));

        assert_eq!(map.remove_edge(EdgeId::new(2)), Some("detail".to_string()));
        assert_eq!(map.remove_edge(EdgeId::new(2)), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_map_same_resource_under_two_keys() {
        let graph = GraphId::new();
        let mut map = RefMap::new();
        map.set("a", entry(graph, 1, 10));
        map.set("b", entry(graph, 2, 10));

        assert_eq!(map.len(), 2);
        assert!(map.delete("a").is_some());
        assert_eq!(map.get("b").map(|e| e.resource), Some(NodeId::new(graph, 10)));
    }
}
