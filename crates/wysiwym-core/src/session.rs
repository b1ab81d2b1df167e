//! # Session Management
//!
//! A session owns one content graph and its undo history. Every edit
//! snapshots the graph first and opens a new action, so all elements an
//! edit creates share one sequence number.
//!
//! Query and browse sessions are branched from a template node of an
//! editing session. The branch owns a copy; nothing it does reaches the
//! graph it came from.

use crate::anchor::Anchor;
use crate::content::{ActionMembers, ContentGraph, ContentValue, RealizeState};
use crate::ontology::Ontology;
use crate::primitives::DEFAULT_HISTORY_DEPTH;
use crate::types::{Id, WysiwymError};
use crate::versioning::{self, History};
use serde::{Deserialize, Serialize};

/// What a session is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    #[default]
    Edit,
    Query,
    Browse,
}

/// One editing, query or browse session.
#[derive(Debug)]
pub struct Session {
    kind: SessionKind,
    graph: ContentGraph,
    history: History,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionKind::Edit, DEFAULT_HISTORY_DEPTH)
    }
}

impl Session {
    /// Create a session with an empty graph.
    #[must_use]
    pub fn new(kind: SessionKind, history_depth: usize) -> Self {
        Self::with_graph(kind, ContentGraph::new(), history_depth)
    }

    /// Create a session around an existing graph.
    #[must_use]
    pub fn with_graph(kind: SessionKind, graph: ContentGraph, history_depth: usize) -> Self {
        Self {
            kind,
            graph,
            history: History::new(history_depth),
        }
    }

    #[must_use]
    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    #[must_use]
    pub fn graph(&self) -> &ContentGraph {
        &self.graph
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Run one undoable edit.
    ///
    /// On failure the snapshot is discarded and the action counter restored.
    fn edit<T>(
        &mut self,
        f: impl FnOnce(&mut ContentGraph) -> Result<T, WysiwymError>,
    ) -> Result<T, WysiwymError> {
        let snap = versioning::snapshot(&self.graph)?;
        self.graph.begin_action();
        match f(&mut self.graph) {
            Ok(value) => {
                self.history.push(snap);
                Ok(value)
            }
            Err(e) => {
                self.graph.abort_action();
                Err(e)
            }
        }
    }

    /// Create the root node of the session graph.
    pub fn create_root(&mut self, class: &str, value: ContentValue) -> Result<Id, WysiwymError> {
        self.edit(|g| g.create_root(class, value))
    }

    pub fn create_node(&mut self, class: &str, value: ContentValue) -> Result<Id, WysiwymError> {
        self.edit(|g| g.create_node(class, value))
    }

    /// Bind an existing node under a cardinality check.
    pub fn bind<O: Ontology + ?Sized>(
        &mut self,
        source: Id,
        relation: &str,
        target: Id,
        ontology: &O,
    ) -> Result<Id, WysiwymError> {
        self.edit(|g| g.bind(source, relation, target, ontology))
    }

    /// Create a value leaf and bind it in one action.
    pub fn add_value<O: Ontology + ?Sized>(
        &mut self,
        source: Id,
        relation: &str,
        class: &str,
        value: ContentValue,
        ontology: &O,
    ) -> Result<Id, WysiwymError> {
        self.edit(|g| g.add_value(source, relation, class, value, ontology))
    }

    pub fn unbind(&mut self, edge: Id) -> Result<String, WysiwymError> {
        self.edit(|g| g.unbind(edge))
    }

    pub fn remove_node(&mut self, id: Id) -> Result<(), WysiwymError> {
        self.edit(|g| g.remove_node(id).map(|_| ()))
    }

    pub fn set_string(&mut self, id: Id, value: &str) -> Result<(), WysiwymError> {
        self.edit(|g| g.set_string(id, value))
    }

    pub fn set_int(&mut self, id: Id, value: i64) -> Result<(), WysiwymError> {
        self.edit(|g| g.set_int(id, value))
    }

    pub fn set_double(&mut self, id: Id, value: f64) -> Result<(), WysiwymError> {
        self.edit(|g| g.set_double(id, value))
    }

    pub fn set_boolean(&mut self, id: Id, value: bool) -> Result<(), WysiwymError> {
        self.edit(|g| g.set_boolean(id, value))
    }

    /// Single-level revert of a leaf value.
    pub fn revert_value(&mut self, id: Id) -> Result<bool, WysiwymError> {
        self.edit(|g| g.revert_value(id))
    }

    pub fn lock_label(&mut self, id: Id, label: &str) -> Result<bool, WysiwymError> {
        self.edit(|g| g.lock_label(id, label))
    }

    pub fn set_realize_state(&mut self, id: Id, state: RealizeState) -> Result<(), WysiwymError> {
        self.edit(|g| g.set_realize_state(id, state))
    }

    /// Recompute every anchor; red nodes are listed first.
    ///
    /// Not recorded in the history: anchors are derived data.
    pub fn refresh_anchors<O: Ontology + ?Sized>(
        &mut self,
        ontology: &O,
    ) -> Result<Vec<Id>, WysiwymError> {
        self.graph.refresh_anchors(ontology)
    }

    #[must_use]
    pub fn anchor(&self, id: Id) -> Option<&Anchor> {
        self.graph.anchor(id)
    }

    /// Elements created by the most recent action.
    #[must_use]
    pub fn last_action(&self) -> ActionMembers {
        self.graph.action_members(self.graph.sequence())
    }

    pub fn undo(&mut self) -> Result<(), WysiwymError> {
        self.history.undo(&mut self.graph)
    }

    pub fn redo(&mut self) -> Result<(), WysiwymError> {
        self.history.redo(&mut self.graph)
    }

    /// Spawn an independent session over a copy of `template` and
    /// everything reachable from it.
    pub fn branch(&self, kind: SessionKind, template: Id) -> Result<Session, WysiwymError> {
        let graph = versioning::clone_subgraph(&self.graph, template)?;
        tracing::debug!(?kind, %template, nodes = graph.node_count(), "session branched");
        Ok(Session::with_graph(kind, graph, self.history.depth()))
    }
}

// =============================================================================
// TESTS
// =============================================================================
