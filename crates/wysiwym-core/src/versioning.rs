//! # Clone Protocol and History
//!
//! Structural copies of content graphs for undo, redo and branching.
//!
//! A copy is built into a fresh graph whose allocator starts over and skips
//! every identifier the source uses, so the two graphs never share a node or
//! edge identifier and the copy takes the lowest free codes. Traversal uses an
//! explicit stack and an existing-copies map, which makes cycles safe.
//! The copy is only returned once every node and edge has been copied.

use crate::anchor::Anchor;
use crate::content::{ContentGraph, EdgeKind};
use crate::graph::Node;
use crate::primitives::MAX_HISTORY_DEPTH;
use crate::types::{Id, WysiwymError};
use std::collections::{BTreeMap, VecDeque};

// =============================================================================
// CLONE PROTOCOL
// =============================================================================

struct CloneJob<'a> {
    source: &'a ContentGraph,
    target: ContentGraph,
    /// Original node id -> copied node id.
    copies: BTreeMap<Id, Id>,
    /// Original edge id -> copied edge id.
    edge_copies: BTreeMap<Id, Id>,
}

impl<'a> CloneJob<'a> {
    fn new(source: &'a ContentGraph) -> Self {
        let mut target = ContentGraph::new();
        target.set_sequence(source.sequence());
        Self {
            source,
            target,
            copies: BTreeMap::new(),
            edge_copies: BTreeMap::new(),
        }
    }

    fn fresh_id(&mut self) -> Result<Id, WysiwymError> {
        let source = self.source;
        self.target
            .graph_mut()
            .allocate_id_avoiding(|id| source.graph().has_component(id))
    }

    fn copy_node(&mut self, original: Id) -> Result<Id, WysiwymError> {
        let node = self.source.graph().require_node(original)?;
        let data = node.data().duplicate();
        let label = node.label().to_string();
        let id = self.fresh_id()?;
        let copy = self.target.insert(Node::with_id(id, label, data))?;
        self.copies.insert(original, copy);
        Ok(copy)
    }

    /// Copy `root` and everything reachable from it.
    fn copy_from(&mut self, root: Id) -> Result<(), WysiwymError> {
        if self.copies.contains_key(&root) {
            return Ok(());
        }
        let source = self.source;
        self.copy_node(root)?;
        let mut stack = vec![root];

        while let Some(original) = stack.pop() {
            let from = self
                .copies
                .get(&original)
                .copied()
                .ok_or(WysiwymError::NodeNotFound(original))?;
            for (_, edge) in source.graph().outgoing(original) {
                let to = match self.copies.get(&edge.target()) {
                    Some(&copy) => copy,
                    None => {
                        stack.push(edge.target());
                        self.copy_node(edge.target())?
                    }
                };
                let id = self.fresh_id()?;
                self.target.graph_mut().connect_with_id(
                    id,
                    from,
                    to,
                    edge.label(),
                    edge.data().clone(),
                )?;
                if let Some(original_edge) = edge.id() {
                    self.edge_copies.insert(original_edge, id);
                }
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<ContentGraph, WysiwymError> {
        let edge_copies = &self.edge_copies;
        let indexes: Vec<_> = self.target.graph().edges().map(|(i, _)| i).collect();
        for index in indexes {
            if let Some(EdgeKind::Query { siblings, .. }) = self
                .target
                .graph_mut()
                .edge_mut(index)
                .map(|e| e.data_mut().kind_mut())
            {
                *siblings = siblings
                    .iter()
                    .filter_map(|s| edge_copies.get(s).copied())
                    .collect();
            }
        }

        for (&original, &copy) in &self.copies {
            if let Some(anchor) = self.source.anchor(original) {
                self.target
                    .set_anchor(copy, Anchor::merged(Some(copy), [anchor]))?;
            }
        }

        if let Some(root) = self.source.root().and_then(|r| self.copies.get(&r).copied()) {
            self.target.graph_mut().set_root_id(root)?;
        }
        tracing::debug!(
            nodes = self.target.node_count(),
            edges = self.target.edge_count(),
            "graph cloned"
        );
        Ok(self.target)
    }
}

/// Copy `root` and the subgraph reachable from it into a new graph.
///
/// The copy of `root` becomes the root of the new graph.
pub fn clone_subgraph(source: &ContentGraph, root: Id) -> Result<ContentGraph, WysiwymError> {
    let mut job = CloneJob::new(source);
    job.copy_from(root)?;
    let copy_root = job
        .copies
        .get(&root)
        .copied()
        .ok_or(WysiwymError::NodeNotFound(root))?;
    let mut graph = job.finish()?;
    graph.graph_mut().set_root_id(copy_root)?;
    Ok(graph)
}

/// Copy the whole graph, root first, then every remaining node.
pub fn snapshot(source: &ContentGraph) -> Result<ContentGraph, WysiwymError> {
    snapshot_with_map(source).map(|(graph, _)| graph)
}

/// Like [`snapshot`], also returning the original id -> copy id map.
pub fn snapshot_with_map(
    source: &ContentGraph,
) -> Result<(ContentGraph, BTreeMap<Id, Id>), WysiwymError> {
    let mut job = CloneJob::new(source);
    if let Some(root) = source.root() {
        job.copy_from(root)?;
    }
    for id in source.graph().node_ids() {
        job.copy_from(id)?;
    }
    let map = job.copies.clone();
    Ok((job.finish()?, map))
}

// =============================================================================
// HISTORY
// =============================================================================

/// Bounded undo and redo stacks of graph snapshots.
#[derive(Debug)]
pub struct History {
    undo: VecDeque<ContentGraph>,
    redo: Vec<ContentGraph>,
    depth: usize,
}

impl History {
    /// Create a history keeping at most `depth` undo steps.
    ///
    /// The depth is clamped to `1..=MAX_HISTORY_DEPTH`.
    #[must_use]
    pub fn new(depth: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            depth: depth.clamp(1, MAX_HISTORY_DEPTH),
        }
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Snapshot `current` before it is edited. Clears the redo stack.
    pub fn record(&mut self, current: &ContentGraph) -> Result<(), WysiwymError> {
        let snap = snapshot(current)?;
        self.push(snap);
        Ok(())
    }

    /// Push an already taken snapshot. Clears the redo stack.
    pub fn push(&mut self, snap: ContentGraph) {
        self.undo.push_back(snap);
        while self.undo.len() > self.depth {
            self.undo.pop_front();
        }
        self.redo.clear();
    }

    /// Replace `current` with the most recent snapshot.
    pub fn undo(&mut self, current: &mut ContentGraph) -> Result<(), WysiwymError> {
        let previous = self.undo.pop_back().ok_or(WysiwymError::NothingToUndo)?;
        let replaced = std::mem::replace(current, previous);
        self.redo.push(replaced);
        tracing::debug!(undo = self.undo.len(), redo = self.redo.len(), "undo");
        Ok(())
    }

    /// Reapply the most recently undone state.
    pub fn redo(&mut self, current: &mut ContentGraph) -> Result<(), WysiwymError> {
        let next = self.redo.pop().ok_or(WysiwymError::NothingToRedo)?;
        let replaced = std::mem::replace(current, next);
        self.undo.push_back(replaced);
        while self.undo.len() > self.depth {
            self.undo.pop_front();
        }
        tracing::debug!(undo = self.undo.len(), redo = self.redo.len(), "redo");
        Ok(())
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(crate::primitives::DEFAULT_HISTORY_DEPTH)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Combinator, ContentValue, RealizeState};
    use crate::schema::{ClassProperty, ClassSpec, Schema};
    use std::collections::BTreeSet;

    fn project_schema() -> Schema {
        Schema::new().with_class(
            "Project",
            ClassSpec::new()
                .property(ClassProperty::new("hasName").min(1).max(1))
                .property(ClassProperty::new("hasMember")),
        )
    }

    fn identifiers(graph: &ContentGraph) -> BTreeSet<Id> {
        graph
            .graph()
            .node_ids()
            .chain(graph.graph().edges().filter_map(|(_, e)| e.id()))
            .collect()
    }

    fn sample() -> (ContentGraph, Id, Id, Id) {
        let mut graph = ContentGraph::new();
        graph.begin_action();
        let project = graph.create_root("Project", ContentValue::Resource).expect("root");
        graph.begin_action();
        let name = graph
            .create_node("String", ContentValue::string("Apollo"))
            .expect("name");
        graph.set_string(name, "Gemini").expect("edit");
        graph.attach(project, "hasName", name, EdgeKind::Plain).expect("bind");
        let person = graph
            .create_retrieved("Person", ContentValue::Resource, RealizeState::Shown, None)
            .expect("person");
        graph.lock_label(person, "Ada").expect("lock");
        graph
            .attach(project, "hasMember", person, EdgeKind::Plain)
            .expect("member");
        (graph, project, name, person)
    }

    #[test]
    fn snapshot_preserves_metadata() {
        let (graph, project, name, person) = sample();
        let (copy, map) = snapshot_with_map(&graph).expect("snapshot");

        assert_eq!(copy.node_count(), graph.node_count());
        assert_eq!(copy.edge_count(), graph.edge_count());
        assert_eq!(copy.sequence(), graph.sequence());
        assert_eq!(copy.root(), map.get(&project).copied());

        for (original, cloned) in &map {
            let a = graph.content(*original).expect("original");
            let b = copy.content(*cloned).expect("copy");
            assert_eq!(a.value(), b.value());
            assert_eq!(a.realize_state(), b.realize_state());
            assert_eq!(a.sequence(), b.sequence());
            assert_eq!(a.is_removable(), b.is_removable());
            assert_eq!(a.final_label(), b.final_label());
            assert_eq!(a.discourse_id(), b.discourse_id());
            assert_eq!(graph.class(*original), copy.class(*cloned));
        }

        let name_copy = map[&name];
        let value = copy.content(name_copy).expect("name").value();
        match value {
            ContentValue::String(v) => {
                assert_eq!(v.old_value().map(String::as_str), Some("Apollo"));
            }
            other => assert_eq!(other.kind(), crate::content::ValueKind::String),
        }
        assert_eq!(copy.find_by_discourse_id(&person.to_string()), Some(map[&person]));
    }

    #[test]
    fn copies_share_no_identifiers() {
        let (graph, _, _, _) = sample();
        let copy = snapshot(&graph).expect("snapshot");
        assert!(identifiers(&graph).is_disjoint(&identifiers(&copy)));

        let again = snapshot(&copy).expect("snapshot of snapshot");
        assert!(identifiers(&copy).is_disjoint(&identifiers(&again)));
    }

    #[test]
    fn mutating_copy_leaves_original_alone() {
        let (graph, _, name, _) = sample();
        let (mut copy, map) = snapshot_with_map(&graph).expect("snapshot");
        copy.set_string(map[&name], "Mercury").expect("edit copy");
        assert_eq!(
            graph.content(name).expect("name").value().describe().as_deref(),
            Some("Gemini")
        );
    }

    #[test]
    fn copy_takes_lowest_free_codes() {
        let mut graph = ContentGraph::new();
        let root = graph.create_root("Project", ContentValue::Resource).expect("root");
        for _ in 0..500 {
            let scratch = graph.create_node("Person", ContentValue::Resource).expect("scratch");
            graph.remove_node(scratch).expect("remove");
        }
        assert!(graph.graph().allocator().cursor() > 500);

        let (copy, map) = snapshot_with_map(&graph).expect("snapshot");
        assert_eq!(map[&root].to_string(), "aac");
        assert!(copy.graph().allocator().cursor() < 5);
    }

    #[test]
    fn cycles_are_copied_once() {
        let mut graph = ContentGraph::new();
        let a = graph.create_root("Person", ContentValue::Resource).expect("a");
        let b = graph.create_node("Person", ContentValue::Resource).expect("b");
        graph.attach(a, "knows", b, EdgeKind::Plain).expect("ab");
        graph.attach(b, "knows", a, EdgeKind::Plain).expect("ba");
        graph.attach(a, "knows", a, EdgeKind::Plain).expect("aa");

        let copy = clone_subgraph(&graph, a).expect("clone");
        assert_eq!(copy.node_count(), 2);
        assert_eq!(copy.edge_count(), 3);
    }

    #[test]
    fn subgraph_clone_only_takes_reachable_nodes() {
        let (graph, _, _, person) = sample();
        let copy = clone_subgraph(&graph, person).expect("clone");
        assert_eq!(copy.node_count(), 1);
        assert_eq!(copy.edge_count(), 0);
        let root = copy.root().expect("root");
        assert_eq!(copy.class(root), Ok("Person"));
    }

    #[test]
    fn clone_of_missing_root_fails() {
        let (graph, _, _, _) = sample();
        let missing: Id = "zzz".parse().expect("id");
        assert_eq!(
            clone_subgraph(&graph, missing).map(|g| g.node_count()),
            Err(WysiwymError::NodeNotFound(missing))
        );
    }

    #[test]
    fn query_siblings_are_remapped() {
        let mut graph = ContentGraph::new();
        let q = graph.create_root("Project", ContentValue::Resource).expect("q");
        let a = graph.create_node("Person", ContentValue::Resource).expect("a");
        let b = graph.create_node("Person", ContentValue::Resource).expect("b");
        let kind = || EdgeKind::Query {
            combinator: Combinator::Or,
            optional: true,
            siblings: Vec::new(),
        };
        let e1 = graph.attach(q, "hasMember", a, kind()).expect("e1");
        let e2 = graph.attach(q, "hasMember", b, kind()).expect("e2");
        graph.link_siblings(&[e1, e2]).expect("link");

        let mut copy = snapshot(&graph).expect("snapshot");
        let copied: Vec<(Id, Vec<Id>)> = copy
            .graph()
            .edges()
            .filter_map(|(_, e)| match e.data().kind() {
                EdgeKind::Query { siblings, .. } => e.id().map(|id| (id, siblings.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(copied.len(), 2);
        assert_eq!(copied[0].1, vec![copied[1].0]);
        assert_eq!(copied[1].1, vec![copied[0].0]);

        copy.set_optional(copied[0].0, false).expect("co-update");
        assert!(!copy.edge(copied[1].0).expect("sibling").data().is_optional());
        assert!(graph.edge(e2).expect("original").data().is_optional());
    }

    #[test]
    fn anchors_are_rebuilt_for_the_copy() {
        let ontology = project_schema();
        let mut graph = ContentGraph::new();
        let project = graph.create_root("Project", ContentValue::Resource).expect("root");
        graph.refresh_anchor(project, &ontology).expect("anchor");

        let (copy, map) = snapshot_with_map(&graph).expect("snapshot");
        let copied = copy.anchor(map[&project]).expect("copied anchor");
        assert_eq!(copied.owner(), Some(map[&project]));
        assert!(copied.is_red());
        assert_eq!(copied.compulsory_names(), vec!["hasName"]);
        assert_eq!(graph.anchor(project).and_then(Anchor::owner), Some(project));
    }

    #[test]
    fn history_undo_redo_roundtrip() {
        let mut history = History::new(8);
        let mut graph = ContentGraph::new();
        graph.create_root("Project", ContentValue::Resource).expect("root");

        history.record(&graph).expect("record");
        graph.create_node("Person", ContentValue::Resource).expect("person");
        assert_eq!(graph.node_count(), 2);

        history.undo(&mut graph).expect("undo");
        assert_eq!(graph.node_count(), 1);
        assert!(history.can_redo());

        history.redo(&mut graph).expect("redo");
        assert_eq!(graph.node_count(), 2);
        assert_eq!(history.redo(&mut graph), Err(WysiwymError::NothingToRedo));
    }

    #[test]
    fn history_is_bounded_and_record_clears_redo() {
        let mut history = History::new(2);
        let mut graph = ContentGraph::new();
        for _ in 0..5 {
            history.record(&graph).expect("record");
            graph.create_node("Person", ContentValue::Resource).expect("node");
        }
        assert_eq!(history.undo_len(), 2);

        history.undo(&mut graph).expect("undo");
        assert_eq!(history.redo_len(), 1);
        history.record(&graph).expect("record");
        assert_eq!(history.redo_len(), 0);

        let mut empty = History::new(0);
        assert_eq!(empty.depth(), 1);
        assert_eq!(empty.undo(&mut graph), Err(WysiwymError::NothingToUndo));
    }
}
