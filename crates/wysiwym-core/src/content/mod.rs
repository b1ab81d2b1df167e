//! # Content Graph
//!
//! The semantic graph the user edits. Each node carries one
//! [`ContentValue`] variant plus the bookkeeping the editor needs:
//! - realize state and removability
//! - the sequence number of the user action that created it
//! - an optional natural-language label, which can be locked
//! - a discourse identifier that survives cloning
//! - at most one [`Anchor`]
//!
//! Anchor ownership is only changed through [`ContentGraph::set_anchor`],
//! [`ContentGraph::take_anchor`] and [`ContentGraph::transfer_anchor`], so a
//! node and the anchor it holds always agree on the owner.

pub mod address;
pub mod date;
pub mod query;
pub mod value;

pub use address::Address;
pub use date::{DateKind, DateParts, DateValue};
pub use query::{Combinator, QueryValue, TypedValue};
pub use value::{ContentValue, RealizeState, ValueKind, Versioned};

use crate::anchor::{self, Anchor};
use crate::graph::{Edge, Graph, Node};
use crate::ontology::Ontology;
use crate::types::{EdgeIndex, Id, WysiwymError};

// =============================================================================
// NODE AND EDGE PAYLOADS
// =============================================================================

/// Payload of a content node.
#[derive(Debug, PartialEq)]
pub struct ContentNode {
    value: ContentValue,
    realize_state: RealizeState,
    removable: bool,
    sequence: u64,
    text_label: Option<String>,
    label_locked: bool,
    discourse_id: String,
    anchor: Option<Anchor>,
}

impl ContentNode {
    fn new(value: ContentValue, sequence: u64) -> Self {
        Self {
            value,
            realize_state: RealizeState::New,
            removable: true,
            sequence,
            text_label: None,
            label_locked: false,
            discourse_id: String::new(),
            anchor: None,
        }
    }

    /// The value this node carries.
    #[must_use]
    pub fn value(&self) -> &ContentValue {
        &self.value
    }

    /// How far the node has been realised or fetched.
    #[must_use]
    pub fn realize_state(&self) -> RealizeState {
        self.realize_state
    }

    /// Whether the user may remove the node.
    #[must_use]
    pub fn is_removable(&self) -> bool {
        self.removable
    }

    /// Sequence number of the action that created the node.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// The natural-language label, if one was given.
    #[must_use]
    pub fn text_label(&self) -> Option<&str> {
        self.text_label.as_deref()
    }

    /// The label once it has been locked.
    #[must_use]
    pub fn final_label(&self) -> Option<&str> {
        if self.label_locked {
            self.text_label.as_deref()
        } else {
            None
        }
    }

    /// True once the label can no longer change.
    #[must_use]
    pub fn is_label_locked(&self) -> bool {
        self.label_locked
    }

    /// Identity of the individual across clones and sentences.
    #[must_use]
    pub fn discourse_id(&self) -> &str {
        &self.discourse_id
    }

    /// The anchor held by this node, if any.
    #[must_use]
    pub fn anchor(&self) -> Option<&Anchor> {
        self.anchor.as_ref()
    }

    /// Same-kind copy of everything except the anchor.
    pub(crate) fn duplicate(&self) -> Self {
        Self {
            value: self.value.duplicate(),
            realize_state: self.realize_state,
            removable: self.removable,
            sequence: self.sequence,
            text_label: self.text_label.clone(),
            label_locked: self.label_locked,
            discourse_id: self.discourse_id.clone(),
            anchor: None,
        }
    }
}

/// Kind-specific fields of a content edge.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeKind {
    Plain,
    /// Member of an ordered relation.
    Ordered { rank: u32 },
    /// Constraint edge of a query graph.
    ///
    /// `siblings` are the identifiers of edges whose `optional` flag must
    /// always equal this one's.
    Query {
        combinator: Combinator,
        optional: bool,
        siblings: Vec<Id>,
    },
}

/// Payload of a content edge.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentEdge {
    sequence: u64,
    removable: bool,
    kind: EdgeKind,
}

impl ContentEdge {
    /// Sequence number of the action that created the edge.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Whether the user may remove the edge.
    #[must_use]
    pub fn is_removable(&self) -> bool {
        self.removable
    }

    /// Kind-specific fields.
    #[must_use]
    pub fn kind(&self) -> &EdgeKind {
        &self.kind
    }

    /// The optional flag of a query edge; false for other kinds.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        matches!(self.kind, EdgeKind::Query { optional: true, .. })
    }

    pub(crate) fn kind_mut(&mut self) -> &mut EdgeKind {
        &mut self.kind
    }
}

/// Nodes and edges created by one user action.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionMembers {
    pub nodes: Vec<Id>,
    pub edges: Vec<Id>,
}

// =============================================================================
// CONTENT GRAPH
// =============================================================================

/// A graph of content nodes with an action counter.
#[derive(Debug, Default)]
pub struct ContentGraph {
    graph: Graph<ContentNode, ContentEdge>,
    sequence: u64,
}

impl ContentGraph {
    /// Create a new empty content graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the underlying graph.
    #[must_use]
    pub fn graph(&self) -> &Graph<ContentNode, ContentEdge> {
        &self.graph
    }

    pub(crate) fn graph_mut(&mut self) -> &mut Graph<ContentNode, ContentEdge> {
        &mut self.graph
    }

    /// Sequence number of the current action.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub(crate) fn set_sequence(&mut self, sequence: u64) {
        self.sequence = sequence;
    }

    /// Open a new user action. Elements created until the next call share
    /// the returned sequence number.
    pub fn begin_action(&mut self) -> u64 {
        self.sequence = self.sequence.saturating_add(1);
        self.sequence
    }

    pub(crate) fn abort_action(&mut self) {
        self.sequence = self.sequence.saturating_sub(1);
    }

    /// The root node, if one was set.
    #[must_use]
    pub fn root(&self) -> Option<Id> {
        self.graph.root()
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    // =========================================================================
    // NODES
    // =========================================================================

    /// Create a node of `class` in the current action.
    pub fn create_node(
        &mut self,
        class: impl Into<String>,
        value: ContentValue,
    ) -> Result<Id, WysiwymError> {
        let node = ContentNode::new(value, self.sequence);
        self.insert(Node::new(class, node))
    }

    /// Create a node and make it the root.
    pub fn create_root(
        &mut self,
        class: impl Into<String>,
        value: ContentValue,
    ) -> Result<Id, WysiwymError> {
        let id = self.create_node(class, value)?;
        self.graph.set_root_id(id)?;
        Ok(id)
    }

    /// Create a node that was loaded from storage.
    ///
    /// Retrieved nodes are never removable. `discourse_id` names the stored
    /// individual; it defaults to the new node's identifier.
    pub fn create_retrieved(
        &mut self,
        class: impl Into<String>,
        value: ContentValue,
        state: RealizeState,
        discourse_id: Option<String>,
    ) -> Result<Id, WysiwymError> {
        let mut node = ContentNode::new(value, self.sequence);
        node.realize_state = state;
        node.removable = !state.is_retrieved();
        node.discourse_id = discourse_id.unwrap_or_default();
        self.insert(Node::new(class, node))
    }

    /// Insert a prepared node. Clones pass the identifier they want.
    pub(crate) fn insert(&mut self, node: Node<ContentNode>) -> Result<Id, WysiwymError> {
        let id = self.graph.add_node(node)?;
        if let Some(node) = self.graph.node_mut(id) {
            let data = node.data_mut();
            if data.discourse_id.is_empty() {
                data.discourse_id = id.to_string();
            }
        }
        Ok(id)
    }

    /// Remove a detached, removable node.
    pub fn remove_node(&mut self, id: Id) -> Result<ContentNode, WysiwymError> {
        if !self.content(id)?.removable {
            return Err(WysiwymError::NotRemovable(id.to_string()));
        }
        Ok(self.graph.remove_node(id)?.into_data())
    }

    /// The content payload of a node.
    pub fn content(&self, id: Id) -> Result<&ContentNode, WysiwymError> {
        self.graph.require_node(id).map(Node::data)
    }

    fn content_mut(&mut self, id: Id) -> Result<&mut ContentNode, WysiwymError> {
        self.graph
            .node_mut(id)
            .map(Node::data_mut)
            .ok_or(WysiwymError::NodeNotFound(id))
    }

    /// The ontology class of a node (its graph label).
    pub fn class(&self, id: Id) -> Result<&str, WysiwymError> {
        self.graph.require_node(id).map(Node::label)
    }

    /// Text shown for a node: its label, else its value, else its class.
    pub fn display_label<O: Ontology + ?Sized>(
        &self,
        id: Id,
        ontology: &O,
    ) -> Result<String, WysiwymError> {
        let node = self.graph.require_node(id)?;
        let data = node.data();
        Ok(data
            .text_label
            .clone()
            .or_else(|| data.value.describe())
            .unwrap_or_else(|| ontology.natural_language(node.label())))
    }

    /// Change the natural-language label. Returns false if it is locked.
    pub fn relabel(&mut self, id: Id, label: impl Into<String>) -> Result<bool, WysiwymError> {
        let node = self.content_mut(id)?;
        if node.label_locked {
            return Ok(false);
        }
        node.text_label = Some(label.into());
        Ok(true)
    }

    /// Fix the natural-language label for good. Returns false if it was
    /// already locked, in which case the existing label stays.
    pub fn lock_label(&mut self, id: Id, label: impl Into<String>) -> Result<bool, WysiwymError> {
        let node = self.content_mut(id)?;
        if node.label_locked {
            return Ok(false);
        }
        node.text_label = Some(label.into());
        node.label_locked = true;
        Ok(true)
    }

    /// Change the realize state. A retrieved state clears removability.
    pub fn set_realize_state(&mut self, id: Id, state: RealizeState) -> Result<(), WysiwymError> {
        let node = self.content_mut(id)?;
        node.realize_state = state;
        if state.is_retrieved() {
            node.removable = false;
        }
        Ok(())
    }

    /// Mark a node removable or protected. Retrieved nodes stay protected.
    pub fn set_removable(&mut self, id: Id, removable: bool) -> Result<(), WysiwymError> {
        let node = self.content_mut(id)?;
        if removable && node.realize_state.is_retrieved() {
            return Err(WysiwymError::NotRemovable(id.to_string()));
        }
        node.removable = removable;
        Ok(())
    }

    /// Find the node standing for a discourse individual.
    #[must_use]
    pub fn find_by_discourse_id(&self, discourse_id: &str) -> Option<Id> {
        self.graph
            .nodes()
            .find(|n| n.data().discourse_id == discourse_id)
            .and_then(Node::id)
    }

    /// Nodes and edges created in action `sequence`, in identifier order.
    #[must_use]
    pub fn action_members(&self, sequence: u64) -> ActionMembers {
        let nodes = self
            .graph
            .nodes()
            .filter(|n| n.data().sequence == sequence)
            .filter_map(Node::id)
            .collect();
        let mut edges: Vec<Id> = self
            .graph
            .edges()
            .filter(|(_, e)| e.data().sequence == sequence)
            .filter_map(|(_, e)| e.id())
            .collect();
        edges.sort();
        ActionMembers { nodes, edges }
    }

    // =========================================================================
    // VALUES
    // =========================================================================

    /// Overwrite a String leaf, keeping the previous value for revert.
    pub fn set_string(&mut self, id: Id, value: impl Into<String>) -> Result<(), WysiwymError> {
        match &mut self.content_mut(id)?.value {
            ContentValue::String(v) => {
                v.set(value.into());
                Ok(())
            }
            _ => Err(mismatch(id, ValueKind::String)),
        }
    }

    /// Overwrite an Int leaf, keeping the previous value for revert.
    pub fn set_int(&mut self, id: Id, value: i64) -> Result<(), WysiwymError> {
        match &mut self.content_mut(id)?.value {
            ContentValue::Int(v) => {
                v.set(value);
                Ok(())
            }
            _ => Err(mismatch(id, ValueKind::Int)),
        }
    }

    /// Overwrite a Double leaf, keeping the previous value for revert.
    pub fn set_double(&mut self, id: Id, value: f64) -> Result<(), WysiwymError> {
        match &mut self.content_mut(id)?.value {
            ContentValue::Double(v) => {
                v.set(value);
                Ok(())
            }
            _ => Err(mismatch(id, ValueKind::Double)),
        }
    }

    /// Overwrite a Boolean leaf, keeping the previous value for revert.
    pub fn set_boolean(&mut self, id: Id, value: bool) -> Result<(), WysiwymError> {
        match &mut self.content_mut(id)?.value {
            ContentValue::Boolean(v) => {
                v.set(value);
                Ok(())
            }
            _ => Err(mismatch(id, ValueKind::Boolean)),
        }
    }

    /// Replace the value of a Date node after validating it.
    pub fn set_date(&mut self, id: Id, value: DateValue) -> Result<(), WysiwymError> {
        let value = value.validated()?;
        match &mut self.content_mut(id)?.value {
            ContentValue::Date(d) => {
                *d = value;
                Ok(())
            }
            _ => Err(mismatch(id, ValueKind::Date)),
        }
    }

    /// Replace the value of an Address node.
    pub fn set_address(&mut self, id: Id, value: Address) -> Result<(), WysiwymError> {
        match &mut self.content_mut(id)?.value {
            ContentValue::Address(a) => {
                *a = value;
                Ok(())
            }
            _ => Err(mismatch(id, ValueKind::Address)),
        }
    }

    /// Replace the value of a Query node.
    pub fn set_query(&mut self, id: Id, value: QueryValue) -> Result<(), WysiwymError> {
        match &mut self.content_mut(id)?.value {
            ContentValue::Query(q) => {
                *q = value;
                Ok(())
            }
            _ => Err(mismatch(id, ValueKind::Query)),
        }
    }

    /// Undo the last edit of a single-valued leaf.
    pub fn revert_value(&mut self, id: Id) -> Result<bool, WysiwymError> {
        Ok(self.content_mut(id)?.value.revert())
    }

    // =========================================================================
    // RELATIONS
    // =========================================================================

    /// Bind `relation` from `source` to `target` after a cardinality check.
    pub fn bind<O: Ontology + ?Sized>(
        &mut self,
        source: Id,
        relation: &str,
        target: Id,
        ontology: &O,
    ) -> Result<Id, WysiwymError> {
        anchor::check_addition(self, source, relation, target, ontology)?;
        self.attach(source, relation, target, EdgeKind::Plain)
    }

    /// Create a leaf node of `class` and bind it under `relation`.
    ///
    /// On failure the new node is removed again.
    pub fn add_value<O: Ontology + ?Sized>(
        &mut self,
        source: Id,
        relation: &str,
        class: impl Into<String>,
        value: ContentValue,
        ontology: &O,
    ) -> Result<Id, WysiwymError> {
        self.graph.require_node(source)?;
        let leaf = self.create_node(class, value)?;
        match self.bind(source, relation, leaf, ontology) {
            Ok(_) => Ok(leaf),
            Err(e) => {
                self.graph.remove_node(leaf)?;
                Err(e)
            }
        }
    }

    /// Attach an edge without consulting the ontology.
    pub fn attach(
        &mut self,
        source: Id,
        relation: &str,
        target: Id,
        kind: EdgeKind,
    ) -> Result<Id, WysiwymError> {
        let data = ContentEdge {
            sequence: self.sequence,
            removable: true,
            kind,
        };
        let index = self.graph.connect(source, target, relation, data)?;
        let edge = self
            .graph
            .edge(index)
            .and_then(Edge::id)
            .ok_or_else(|| WysiwymError::EdgeNotFound(format!("{index:?}")))?;
        tracing::debug!(%source, %target, relation, %edge, "bind");
        Ok(edge)
    }

    /// Remove a removable edge; a value leaf left without edges goes too.
    pub fn unbind(&mut self, edge: Id) -> Result<String, WysiwymError> {
        let index = self.edge_index(edge)?;
        let (removable, target) = {
            let e = self
                .graph
                .edge(index)
                .ok_or_else(|| WysiwymError::EdgeNotFound(edge.to_string()))?;
            let target_removable = self.content(e.target())?.removable;
            (e.data().removable && target_removable, e.target())
        };
        if !removable {
            return Err(WysiwymError::NotRemovable(edge.to_string()));
        }
        let removed = self.graph.remove_edge(index)?;
        if let EdgeKind::Query { siblings, .. } = removed.data().kind() {
            self.forget_sibling(edge, siblings);
        }
        let orphan = self
            .graph
            .node(target)
            .is_some_and(|n| n.is_detached() && n.data().value.is_leaf());
        if orphan {
            self.graph.remove_node(target)?;
        }
        tracing::debug!(%edge, relation = removed.label(), "unbind");
        Ok(removed.label().to_string())
    }

    /// Drop `edge` from the sibling lists of `siblings`.
    fn forget_sibling(&mut self, edge: Id, siblings: &[Id]) {
        for sibling in siblings {
            let Some(index) = self.graph.edge_by_id(*sibling) else {
                continue;
            };
            if let Some(EdgeKind::Query { siblings, .. }) =
                self.graph.edge_mut(index).map(|e| e.data_mut().kind_mut())
            {
                siblings.retain(|s| *s != edge);
            }
        }
    }

    /// Mark an edge as not removable by the user.
    pub fn protect_edge(&mut self, edge: Id) -> Result<(), WysiwymError> {
        let index = self.edge_index(edge)?;
        if let Some(e) = self.graph.edge_mut(index) {
            e.data_mut().removable = false;
        }
        Ok(())
    }

    fn edge_index(&self, edge: Id) -> Result<EdgeIndex, WysiwymError> {
        self.graph
            .edge_by_id(edge)
            .ok_or_else(|| WysiwymError::EdgeNotFound(edge.to_string()))
    }

    /// Lookup an edge by identifier.
    pub fn edge(&self, edge: Id) -> Result<&Edge<ContentEdge>, WysiwymError> {
        let index = self.edge_index(edge)?;
        self.graph
            .edge(index)
            .ok_or_else(|| WysiwymError::EdgeNotFound(edge.to_string()))
    }

    /// Make every listed query edge a sibling of the others.
    pub fn link_siblings(&mut self, edges: &[Id]) -> Result<(), WysiwymError> {
        let mut indexes = Vec::with_capacity(edges.len());
        for &edge in edges {
            let index = self.edge_index(edge)?;
            if !matches!(self.edge(edge)?.data().kind, EdgeKind::Query { .. }) {
                return Err(WysiwymError::InvalidValue(format!("{edge} is not a query edge")));
            }
            indexes.push((edge, index));
        }
        for &(edge, index) in &indexes {
            if let Some(EdgeKind::Query { siblings, .. }) =
                self.graph.edge_mut(index).map(|e| e.data_mut().kind_mut())
            {
                *siblings = edges.iter().copied().filter(|s| *s != edge).collect();
            }
        }
        Ok(())
    }

    /// Set the optional flag on a query edge and all of its siblings.
    ///
    /// Every sibling is checked before any flag changes.
    pub fn set_optional(&mut self, edge: Id, optional: bool) -> Result<(), WysiwymError> {
        let siblings = match &self.edge(edge)?.data().kind {
            EdgeKind::Query { siblings, .. } => siblings.clone(),
            _ => {
                return Err(WysiwymError::InvalidValue(format!("{edge} is not a query edge")));
            }
        };
        let mut group = vec![self.edge_index(edge)?];
        for sibling in siblings {
            group.push(self.edge_index(sibling)?);
        }
        for index in group {
            if let Some(EdgeKind::Query { optional: flag, .. }) =
                self.graph.edge_mut(index).map(|e| e.data_mut().kind_mut())
            {
                *flag = optional;
            }
        }
        Ok(())
    }

    // =========================================================================
    // ANCHORS
    // =========================================================================

    /// The anchor held by a node.
    #[must_use]
    pub fn anchor(&self, id: Id) -> Option<&Anchor> {
        self.graph.node(id).and_then(|n| n.data().anchor.as_ref())
    }

    /// Give `anchor` to `owner`, returning the anchor it replaces.
    pub fn set_anchor(&mut self, owner: Id, mut anchor: Anchor) -> Result<Option<Anchor>, WysiwymError> {
        let node = self.content_mut(owner)?;
        anchor.set_owner(Some(owner));
        let previous = node.anchor.replace(anchor);
        Ok(previous.map(|mut a| {
            a.set_owner(None);
            a
        }))
    }

    /// Detach and return the anchor of a node.
    pub fn take_anchor(&mut self, owner: Id) -> Result<Option<Anchor>, WysiwymError> {
        let node = self.content_mut(owner)?;
        Ok(node.anchor.take().map(|mut a| {
            a.set_owner(None);
            a
        }))
    }

    /// Move the anchor of `from` to `to`.
    pub fn transfer_anchor(&mut self, from: Id, to: Id) -> Result<(), WysiwymError> {
        self.graph.require_node(to)?;
        let Some(anchor) = self.take_anchor(from)? else {
            return Ok(());
        };
        self.set_anchor(to, anchor)?;
        Ok(())
    }

    /// Recompute the anchor of one node.
    ///
    /// When the node needs nothing further its old anchor is dropped and
    /// `NotAnAnchor` is returned.
    pub fn refresh_anchor<O: Ontology + ?Sized>(
        &mut self,
        id: Id,
        ontology: &O,
    ) -> Result<&Anchor, WysiwymError> {
        match Anchor::build(self, id, ontology) {
            Ok(anchor) => {
                self.set_anchor(id, anchor)?;
                self.anchor(id).ok_or(WysiwymError::NotAnAnchor(id))
            }
            Err(WysiwymError::NotAnAnchor(node)) => {
                self.take_anchor(id)?;
                Err(WysiwymError::NotAnAnchor(node))
            }
            Err(e) => Err(e),
        }
    }

    /// Recompute anchors of every resource node.
    ///
    /// Returns the nodes that hold an anchor afterwards, red ones first.
    pub fn refresh_anchors<O: Ontology + ?Sized>(
        &mut self,
        ontology: &O,
    ) -> Result<Vec<Id>, WysiwymError> {
        let resources: Vec<Id> = self
            .graph
            .nodes()
            .filter(|n| !n.data().value.is_leaf())
            .filter_map(Node::id)
            .collect();
        let mut red = Vec::new();
        let mut blue = Vec::new();
        for id in resources {
            match self.refresh_anchor(id, ontology) {
                Ok(anchor) if anchor.is_red() => red.push(id),
                Ok(_) => blue.push(id),
                Err(WysiwymError::NotAnAnchor(_)) => {}
                Err(e) => return Err(e),
            }
        }
        tracing::debug!(red = red.len(), blue = blue.len(), "anchors refreshed");
        red.extend(blue);
        Ok(red)
    }
}

fn mismatch(node: Id, expected: ValueKind) -> WysiwymError {
    WysiwymError::ValueKindMismatch {
        node,
        expected: expected.as_str(),
    }
}

// =============================================================================
// TESTS
// =============================================================================
