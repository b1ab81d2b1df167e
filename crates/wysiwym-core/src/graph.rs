//! # Graph Core
//!
//! The generic labeled graph shared by the content and syntax layers.
//!
//! A [`Graph`] owns its nodes, its edges, one optional root and the
//! identifier allocator that names them. Nodes index their edges under an
//! [`EdgeKey`]: the edge identifier once it has one, its label before that.
//! All data structures use `BTreeMap` for deterministic ordering.
//!
//! Every mutation validates first and mutates second, so a failed operation
//! leaves the graph exactly as it was, and no edge ever references a node
//! that is absent from the node map.

use crate::types::{EdgeIndex, EdgeKey, Id, IdAllocator, WysiwymError};
use std::collections::BTreeMap;

// =============================================================================
// NODE
// =============================================================================

/// A labeled node carrying a payload of type `N`.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<N> {
    label: String,
    id: Option<Id>,
    outgoing: BTreeMap<EdgeKey, EdgeIndex>,
    incoming: BTreeMap<EdgeKey, EdgeIndex>,
    data: N,
}

impl<N> Node<N> {
    /// Create a detached node without an identifier.
    #[must_use]
    pub fn new(label: impl Into<String>, data: N) -> Self {
        Self {
            label: label.into(),
            id: None,
            outgoing: BTreeMap::new(),
            incoming: BTreeMap::new(),
            data,
        }
    }

    /// Create a detached node that asks for a specific identifier.
    #[must_use]
    pub fn with_id(id: Id, label: impl Into<String>, data: N) -> Self {
        let mut node = Self::new(label, data);
        node.id = Some(id);
        node
    }

    /// The node label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Replace the node label.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// The identifier, present once the node belongs to a graph.
    #[must_use]
    pub fn id(&self) -> Option<Id> {
        self.id
    }

    /// The node payload.
    #[must_use]
    pub fn data(&self) -> &N {
        &self.data
    }

    /// Mutable access to the node payload.
    pub fn data_mut(&mut self) -> &mut N {
        &mut self.data
    }

    /// Consume the node and return its payload.
    #[must_use]
    pub fn into_data(self) -> N {
        self.data
    }

    /// Outgoing edges as (key, index) pairs.
    pub fn outgoing_keys(&self) -> impl Iterator<Item = (&EdgeKey, EdgeIndex)> + '_ {
        self.outgoing.iter().map(|(k, v)| (k, *v))
    }

    /// Incoming edges as (key, index) pairs.
    pub fn incoming_keys(&self) -> impl Iterator<Item = (&EdgeKey, EdgeIndex)> + '_ {
        self.incoming.iter().map(|(k, v)| (k, *v))
    }

    /// Number of outgoing edges.
    #[must_use]
    pub fn out_degree(&self) -> usize {
        self.outgoing.len()
    }

    /// Number of incoming edges.
    #[must_use]
    pub fn in_degree(&self) -> usize {
        self.incoming.len()
    }

    /// True when no edge references this node.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.outgoing.is_empty() && self.incoming.is_empty()
    }
}

// =============================================================================
// EDGE
// =============================================================================

/// A directed, labeled edge carrying a payload of type `E`.
///
/// Label, identifier and endpoints can only change through the owning graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge<E> {
    label: String,
    id: Option<Id>,
    source: Id,
    target: Id,
    data: E,
}

impl<E> Edge<E> {
    /// The relation label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The permanent identifier, if assigned.
    #[must_use]
    pub fn id(&self) -> Option<Id> {
        self.id
    }

    /// Source node.
    #[must_use]
    pub fn source(&self) -> Id {
        self.source
    }

    /// Target node.
    #[must_use]
    pub fn target(&self) -> Id {
        self.target
    }

    /// The key under which the endpoints index this edge.
    #[must_use]
    pub fn key(&self) -> EdgeKey {
        EdgeKey::for_edge(self.id, &self.label)
    }

    /// The edge payload.
    #[must_use]
    pub fn data(&self) -> &E {
        &self.data
    }

    /// Mutable access to the edge payload.
    pub fn data_mut(&mut self) -> &mut E {
        &mut self.data
    }

    /// Consume the edge and return its payload.
    #[must_use]
    pub fn into_data(self) -> E {
        self.data
    }
}

// =============================================================================
// GRAPH IMPLEMENTATION
// =============================================================================

/// The main Graph structure.
///
/// Deliberately not `Clone`: copies go through the versioning protocol so
/// that the copy receives fresh identifiers.
#[derive(Debug)]
pub struct Graph<N, E> {
    /// Node storage: Id -> Node
    nodes: BTreeMap<Id, Node<N>>,

    /// Edge storage: EdgeIndex -> Edge
    edges: BTreeMap<EdgeIndex, Edge<E>>,

    /// Identified edges: Id -> EdgeIndex
    edge_ids: BTreeMap<Id, EdgeIndex>,

    /// Designated root node
    root: Option<Id>,

    /// Identifier cursor owned by this graph
    ids: IdAllocator,

    /// Next available EdgeIndex
    next_edge_index: u64,
}

impl<N, E> Default for Graph<N, E> {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            edge_ids: BTreeMap::new(),
            root: None,
            ids: IdAllocator::new(),
            next_edge_index: 0,
        }
    }
}

impl<N, E> Graph<N, E> {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The identifier allocator of this graph.
    #[must_use]
    pub fn allocator(&self) -> &IdAllocator {
        &self.ids
    }

    /// Issue an identifier that no node or edge of this graph uses.
    pub fn allocate_id(&mut self) -> Result<Id, WysiwymError> {
        let nodes = &self.nodes;
        let edge_ids = &self.edge_ids;
        self.ids
            .next_free(|id| nodes.contains_key(&id) || edge_ids.contains_key(&id))
    }

    /// Issue an identifier unused here and rejected by `taken` elsewhere.
    pub fn allocate_id_avoiding(
        &mut self,
        taken: impl Fn(Id) -> bool,
    ) -> Result<Id, WysiwymError> {
        let nodes = &self.nodes;
        let edge_ids = &self.edge_ids;
        self.ids.next_free(|id| {
            nodes.contains_key(&id) || edge_ids.contains_key(&id) || taken(id)
        })
    }

    /// Check whether a node or an edge uses the identifier.
    #[must_use]
    pub fn has_component(&self, id: Id) -> bool {
        self.nodes.contains_key(&id) || self.edge_ids.contains_key(&id)
    }

    // =========================================================================
    // NODES
    // =========================================================================

    /// Insert a detached node, allocating an identifier when it has none.
    pub fn add_node(&mut self, mut node: Node<N>) -> Result<Id, WysiwymError> {
        let id = match node.id {
            Some(id) if self.has_component(id) => return Err(WysiwymError::IdInUse(id)),
            Some(id) => id,
            None => self.allocate_id()?,
        };
        node.id = Some(id);
        node.outgoing.clear();
        node.incoming.clear();
        tracing::trace!(node = %id, label = %node.label, "add node");
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Remove a node. All of its edges must have been removed first.
    pub fn remove_node(&mut self, id: Id) -> Result<Node<N>, WysiwymError> {
        let node = self.nodes.get(&id).ok_or(WysiwymError::NodeNotFound(id))?;
        if !node.is_detached() {
            return Err(WysiwymError::NodeStillReferenced(id));
        }
        if self.root == Some(id) {
            self.root = None;
        }
        tracing::trace!(node = %id, "remove node");
        self.nodes.remove(&id).ok_or(WysiwymError::NodeNotFound(id))
    }

    /// Lookup a node by identifier.
    #[must_use]
    pub fn node(&self, id: Id) -> Option<&Node<N>> {
        self.nodes.get(&id)
    }

    /// Mutable lookup of a node by identifier.
    pub fn node_mut(&mut self, id: Id) -> Option<&mut Node<N>> {
        self.nodes.get_mut(&id)
    }

    /// Lookup a node or fail with `NodeNotFound`.
    pub fn require_node(&self, id: Id) -> Result<&Node<N>, WysiwymError> {
        self.nodes.get(&id).ok_or(WysiwymError::NodeNotFound(id))
    }

    /// Check if the graph contains a node.
    #[must_use]
    pub fn contains_node(&self, id: Id) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Insert `node` and make it the root.
    pub fn set_root(&mut self, node: Node<N>) -> Result<Id, WysiwymError> {
        let id = self.add_node(node)?;
        self.root = Some(id);
        Ok(id)
    }

    /// Make an existing node the root.
    pub fn set_root_id(&mut self, id: Id) -> Result<(), WysiwymError> {
        if !self.contains_node(id) {
            return Err(WysiwymError::NodeNotFound(id));
        }
        self.root = Some(id);
        Ok(())
    }

    /// The designated root node.
    #[must_use]
    pub fn root(&self) -> Option<Id> {
        self.root
    }

    /// Get all nodes in deterministic order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node<N>> {
        self.nodes.values()
    }

    /// Get all node identifiers in deterministic order.
    pub fn node_ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the total number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // =========================================================================
    // EDGES
    // =========================================================================

    /// Attach an anonymous edge, indexed on its endpoints by label.
    pub fn add_edge(
        &mut self,
        source: Id,
        target: Id,
        label: impl Into<String>,
        data: E,
    ) -> Result<EdgeIndex, WysiwymError> {
        self.insert_edge(source, target, label.into(), None, data)
    }

    /// Attach an edge with a freshly allocated identifier.
    pub fn connect(
        &mut self,
        source: Id,
        target: Id,
        label: impl Into<String>,
        data: E,
    ) -> Result<EdgeIndex, WysiwymError> {
        self.check_endpoints(source, target)?;
        let id = self.allocate_id()?;
        self.insert_edge(source, target, label.into(), Some(id), data)
    }

    /// Attach an edge under an explicit identifier.
    pub fn connect_with_id(
        &mut self,
        id: Id,
        source: Id,
        target: Id,
        label: impl Into<String>,
        data: E,
    ) -> Result<EdgeIndex, WysiwymError> {
        if self.has_component(id) {
            return Err(WysiwymError::IdInUse(id));
        }
        self.insert_edge(source, target, label.into(), Some(id), data)
    }

    fn check_endpoints(&self, source: Id, target: Id) -> Result<(), WysiwymError> {
        if !self.nodes.contains_key(&source) {
            return Err(WysiwymError::NodeNotFound(source));
        }
        if !self.nodes.contains_key(&target) {
            return Err(WysiwymError::NodeNotFound(target));
        }
        Ok(())
    }

    fn insert_edge(
        &mut self,
        source: Id,
        target: Id,
        label: String,
        id: Option<Id>,
        data: E,
    ) -> Result<EdgeIndex, WysiwymError> {
        self.check_endpoints(source, target)?;
        let key = EdgeKey::for_edge(id, &label);
        self.check_key_free(source, target, &key, &label)?;

        let index = EdgeIndex(self.next_edge_index);
        self.next_edge_index = self.next_edge_index.saturating_add(1);

        if let Some(node) = self.nodes.get_mut(&source) {
            node.outgoing.insert(key.clone(), index);
        }
        if let Some(node) = self.nodes.get_mut(&target) {
            node.incoming.insert(key, index);
        }
        if let Some(id) = id {
            self.edge_ids.insert(id, index);
        }
        tracing::trace!(%source, %target, label = %label, "add edge");
        self.edges.insert(
            index,
            Edge {
                label,
                id,
                source,
                target,
                data,
            },
        );
        Ok(index)
    }

    fn check_key_free(
        &self,
        source: Id,
        target: Id,
        key: &EdgeKey,
        label: &str,
    ) -> Result<(), WysiwymError> {
        let taken_at_source = self
            .nodes
            .get(&source)
            .is_some_and(|n| n.outgoing.contains_key(key));
        let taken_at_target = self
            .nodes
            .get(&target)
            .is_some_and(|n| n.incoming.contains_key(key));
        match key {
            EdgeKey::Id(id) if taken_at_source || taken_at_target => {
                Err(WysiwymError::IdInUse(*id))
            }
            EdgeKey::Label(_) if taken_at_source => Err(WysiwymError::DuplicateRelationBinding {
                node: source,
                label: label.to_string(),
            }),
            EdgeKey::Label(_) if taken_at_target => Err(WysiwymError::DuplicateRelationBinding {
                node: target,
                label: label.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Give an edge a new identifier (or none), re-keying it on both endpoints.
    pub fn set_edge_id(&mut self, edge: EdgeIndex, id: Option<Id>) -> Result<(), WysiwymError> {
        let current = self
            .edges
            .get(&edge)
            .ok_or_else(|| WysiwymError::EdgeNotFound(format!("{edge:?}")))?;
        if current.id == id {
            return Ok(());
        }
        let old_key = current.key();
        let new_key = EdgeKey::for_edge(id, &current.label);
        let (source, target, old_id) = (current.source, current.target, current.id);
        let label = current.label.clone();

        if let Some(id) = id.filter(|id| self.has_component(*id)) {
            return Err(WysiwymError::IdInUse(id));
        }
        self.check_key_free(source, target, &new_key, &label)?;

        if let Some(node) = self.nodes.get_mut(&source) {
            node.outgoing.remove(&old_key);
            node.outgoing.insert(new_key.clone(), edge);
        }
        if let Some(node) = self.nodes.get_mut(&target) {
            node.incoming.remove(&old_key);
            node.incoming.insert(new_key, edge);
        }
        if let Some(old) = old_id {
            self.edge_ids.remove(&old);
        }
        if let Some(new) = id {
            self.edge_ids.insert(new, edge);
        }
        if let Some(e) = self.edges.get_mut(&edge) {
            e.id = id;
        }
        Ok(())
    }

    /// Give an anonymous edge a freshly allocated identifier.
    pub fn identify_edge(&mut self, edge: EdgeIndex) -> Result<Id, WysiwymError> {
        let existing = self
            .edges
            .get(&edge)
            .ok_or_else(|| WysiwymError::EdgeNotFound(format!("{edge:?}")))?
            .id;
        if let Some(id) = existing {
            return Ok(id);
        }
        let id = self.allocate_id()?;
        self.set_edge_id(edge, Some(id))?;
        Ok(id)
    }

    /// Detach an edge from both endpoints and remove it.
    pub fn remove_edge(&mut self, edge: EdgeIndex) -> Result<Edge<E>, WysiwymError> {
        let removed = self
            .edges
            .remove(&edge)
            .ok_or_else(|| WysiwymError::EdgeNotFound(format!("{edge:?}")))?;
        let key = removed.key();
        if let Some(node) = self.nodes.get_mut(&removed.source) {
            node.outgoing.remove(&key);
        }
        if let Some(node) = self.nodes.get_mut(&removed.target) {
            node.incoming.remove(&key);
        }
        if let Some(id) = removed.id {
            self.edge_ids.remove(&id);
        }
        tracing::trace!(source = %removed.source, target = %removed.target, label = %removed.label, "remove edge");
        Ok(removed)
    }

    /// Lookup an edge by index.
    #[must_use]
    pub fn edge(&self, edge: EdgeIndex) -> Option<&Edge<E>> {
        self.edges.get(&edge)
    }

    /// Mutable lookup of an edge payload by index.
    pub fn edge_mut(&mut self, edge: EdgeIndex) -> Option<&mut Edge<E>> {
        self.edges.get_mut(&edge)
    }

    /// Find the index of an identified edge.
    #[must_use]
    pub fn edge_by_id(&self, id: Id) -> Option<EdgeIndex> {
        self.edge_ids.get(&id).copied()
    }

    /// Get all edges in deterministic order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeIndex, &Edge<E>)> + '_ {
        self.edges.iter().map(|(k, v)| (*k, v))
    }

    /// Get the total number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Outgoing edges of a node, in key order.
    pub fn outgoing(&self, node: Id) -> impl Iterator<Item = (EdgeIndex, &Edge<E>)> + '_ {
        self.nodes
            .get(&node)
            .into_iter()
            .flat_map(|n| n.outgoing.values())
            .filter_map(|idx| self.edges.get(idx).map(|e| (*idx, e)))
    }

    /// Incoming edges of a node, in key order.
    pub fn incoming(&self, node: Id) -> impl Iterator<Item = (EdgeIndex, &Edge<E>)> + '_ {
        self.nodes
            .get(&node)
            .into_iter()
            .flat_map(|n| n.incoming.values())
            .filter_map(|idx| self.edges.get(idx).map(|e| (*idx, e)))
    }

    /// Number of outgoing edges of a node with the given label.
    #[must_use]
    pub fn count_outgoing(&self, node: Id, label: &str) -> usize {
        self.outgoing(node).filter(|(_, e)| e.label == label).count()
    }

    /// Number of incoming edges of a node with the given label.
    #[must_use]
    pub fn count_incoming(&self, node: Id, label: &str) -> usize {
        self.incoming(node).filter(|(_, e)| e.label == label).count()
    }

    /// Nodes reachable from `start` along outgoing edges, in visiting order.
    ///
    /// Uses an explicit stack, so arbitrary cycles are fine.
    #[must_use]
    pub fn reachable_from(&self, start: Id) -> Vec<Id> {
        let mut order = Vec::new();
        if !self.contains_node(start) {
            return order;
        }
        let mut seen = std::collections::BTreeSet::new();
        let mut stack = vec![start];
        seen.insert(start);
        while let Some(current) = stack.pop() {
            order.push(current);
            let targets: Vec<Id> = self.outgoing(current).map(|(_, e)| e.target).collect();
            for target in targets.into_iter().rev() {
                if seen.insert(target) {
                    stack.push(target);
                }
            }
        }
        order
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    type TestGraph = Graph<(), ()>;

    fn id(s: &str) -> Id {
        s.parse().expect("id")
    }

    #[test]
    fn add_node_allocates_identifier() {
        let mut graph = TestGraph::new();
        let a = graph.add_node(Node::new("Project", ())).expect("add");
        let b = graph.add_node(Node::new("Person", ())).expect("add");

        assert_ne!(a, b);
        assert_eq!(graph.node(a).map(Node::label), Some("Project"));
        assert_eq!(graph.node(a).and_then(Node::id), Some(a));
        assert!(graph.has_component(a));
    }

    #[test]
    fn add_node_rejects_identifier_in_use() {
        let mut graph = TestGraph::new();
        graph
            .add_node(Node::with_id(id("abc"), "A", ()))
            .expect("add");
        let result = graph.add_node(Node::with_id(id("abc"), "B", ()));
        assert_eq!(result, Err(WysiwymError::IdInUse(id("abc"))));
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn allocation_skips_explicit_identifiers() {
        let mut graph = TestGraph::new();
        graph
            .add_node(Node::with_id(id("aab"), "A", ()))
            .expect("add");
        let next = graph.add_node(Node::new("B", ())).expect("add");
        assert_eq!(next, id("aac"));
    }

    #[test]
    fn set_root_allocates_identifier() {
        let mut graph = TestGraph::new();
        let root = graph.set_root(Node::new("Project", ())).expect("root");
        assert_eq!(graph.root(), Some(root));
        assert!(graph.set_root_id(id("zzz")).is_err());
    }

    #[test]
    fn connect_indexes_both_endpoints() {
        let mut graph = TestGraph::new();
        let a = graph.add_node(Node::new("A", ())).expect("add");
        let b = graph.add_node(Node::new("B", ())).expect("add");

        let edge = graph.connect(a, b, "knows", ()).expect("connect");
        let edge_id = graph.edge(edge).and_then(Edge::id).expect("edge id");

        assert_eq!(graph.edge_by_id(edge_id), Some(edge));
        assert_eq!(graph.count_outgoing(a, "knows"), 1);
        assert_eq!(graph.count_incoming(b, "knows"), 1);
        assert!(graph.has_component(edge_id));
    }

    #[test]
    fn duplicate_anonymous_edge_is_rejected() {
        let mut graph = TestGraph::new();
        let a = graph.add_node(Node::new("A", ())).expect("add");
        let b = graph.add_node(Node::new("B", ())).expect("add");
        let c = graph.add_node(Node::new("C", ())).expect("add");

        graph.add_edge(a, b, "hasName", ()).expect("first");
        let result = graph.add_edge(a, c, "hasName", ());

        assert_eq!(
            result,
            Err(WysiwymError::DuplicateRelationBinding {
                node: a,
                label: "hasName".into()
            })
        );
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn identified_edges_may_share_a_label() {
        let mut graph = TestGraph::new();
        let a = graph.add_node(Node::new("A", ())).expect("add");
        let b = graph.add_node(Node::new("B", ())).expect("add");
        let c = graph.add_node(Node::new("C", ())).expect("add");

        graph.connect(a, b, "hasMember", ()).expect("first");
        graph.connect(a, c, "hasMember", ()).expect("second");

        assert_eq!(graph.count_outgoing(a, "hasMember"), 2);
    }

    #[test]
    fn set_edge_id_rekeys_atomically() {
        let mut graph = TestGraph::new();
        let a = graph.add_node(Node::new("A", ())).expect("add");
        let b = graph.add_node(Node::new("B", ())).expect("add");
        let edge = graph.add_edge(a, b, "hasName", ()).expect("edge");

        graph.set_edge_id(edge, Some(id("xyz"))).expect("set id");

        let keys: Vec<EdgeKey> = graph
            .node(a)
            .map(|n| n.outgoing_keys().map(|(k, _)| k.clone()).collect())
            .unwrap_or_default();
        assert_eq!(keys, vec![EdgeKey::Id(id("xyz"))]);
        let keys: Vec<EdgeKey> = graph
            .node(b)
            .map(|n| n.incoming_keys().map(|(k, _)| k.clone()).collect())
            .unwrap_or_default();
        assert_eq!(keys, vec![EdgeKey::Id(id("xyz"))]);

        // The freed label slot accepts another anonymous edge.
        graph.add_edge(a, b, "hasName", ()).expect("again");
    }

    #[test]
    fn set_edge_id_failure_leaves_edge_untouched() {
        let mut graph = TestGraph::new();
        let a = graph.add_node(Node::new("A", ())).expect("add");
        let b = graph.add_node(Node::new("B", ())).expect("add");
        let edge = graph.add_edge(a, b, "hasName", ()).expect("edge");

        let result = graph.set_edge_id(edge, Some(a));
        assert_eq!(result, Err(WysiwymError::IdInUse(a)));
        assert_eq!(graph.edge(edge).and_then(Edge::id), None);
        assert_eq!(graph.count_outgoing(a, "hasName"), 1);
    }

    #[test]
    fn remove_node_requires_detached_node() {
        let mut graph = TestGraph::new();
        let a = graph.add_node(Node::new("A", ())).expect("add");
        let b = graph.add_node(Node::new("B", ())).expect("add");
        let edge = graph.connect(a, b, "knows", ()).expect("connect");

        assert_eq!(
            graph.remove_node(b),
            Err(WysiwymError::NodeStillReferenced(b))
        );

        let removed = graph.remove_edge(edge).expect("remove edge");
        assert_eq!(removed.label(), "knows");
        let edge_id = removed.id().expect("had id");
        assert!(!graph.has_component(edge_id));

        graph.remove_node(b).expect("remove node");
        assert!(!graph.contains_node(b));
    }

    #[test]
    fn connect_to_missing_node_fails_without_allocating() {
        let mut graph = TestGraph::new();
        let a = graph.add_node(Node::new("A", ())).expect("add");
        let cursor = graph.allocator().cursor();

        let result = graph.connect(a, id("qqq"), "knows", ());
        assert_eq!(result, Err(WysiwymError::NodeNotFound(id("qqq"))));
        assert_eq!(graph.allocator().cursor(), cursor);
    }

    #[test]
    fn reachable_from_handles_cycles() {
        let mut graph = TestGraph::new();
        let a = graph.add_node(Node::new("A", ())).expect("add");
        let b = graph.add_node(Node::new("B", ())).expect("add");
        let c = graph.add_node(Node::new("C", ())).expect("add");
        graph.connect(a, b, "next", ()).expect("edge");
        graph.connect(b, c, "next", ()).expect("edge");
        graph.connect(c, a, "next", ()).expect("edge");

        assert_eq!(graph.reachable_from(a), vec![a, b, c]);
        assert!(graph.reachable_from(id("qqq")).is_empty());
    }
}
