//! # Syntax Graph
//!
//! Dependency trees built from the content graph, one per sentence. The
//! edge label from a parent to a child is the child's dependency relation.
//!
//! An [`SyntaxKind::Undetermined`] node stands for an entity mention whose
//! wording is decided later by the referring-expression resolver.

use crate::content::ContentGraph;
use crate::graph::{Graph, Node};
use crate::primitives::CONJUNCT_RELATION;
use crate::types::{EdgeIndex, Id, WysiwymError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// MORPHOLOGY
// =============================================================================

/// Syntactic category of a syntax node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Sentence,
    Clause,
    NounPhrase,
    VerbPhrase,
    AdjectivePhrase,
    PrepositionalPhrase,
    Coordination,
    Noun,
    Verb,
    Adjective,
    Adverb,
    Preposition,
    Determiner,
    Pronoun,
    Conjunction,
    Punctuation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Number {
    #[default]
    Singular,
    Plural,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Person {
    First,
    Second,
    #[default]
    Third,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tense {
    #[default]
    Present,
    Past,
    Future,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Voice {
    #[default]
    Active,
    Passive,
}

/// Morphological features handed to the realiser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Morphology {
    #[serde(default)]
    pub number: Number,
    #[serde(default)]
    pub person: Person,
    #[serde(default)]
    pub tense: Tense,
    #[serde(default)]
    pub voice: Voice,
    #[serde(default)]
    pub genitive: bool,
    #[serde(default)]
    pub quoted: bool,
    #[serde(default)]
    pub negated: bool,
    /// Realise as an ordinal rank.
    #[serde(default)]
    pub rank: bool,
}

impl Morphology {
    #[must_use]
    pub fn plural() -> Self {
        Self {
            number: Number::Plural,
            ..Self::default()
        }
    }
}

// =============================================================================
// NODES
// =============================================================================

/// Discourse information of a mention awaiting resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Referent {
    /// Type name used in descriptions ("a Paper").
    pub discourse_type: String,
    /// Identity of the individual across sentences.
    pub discourse_id: String,
    #[serde(default)]
    pub proper_name: Option<String>,
    #[serde(default)]
    pub pronoun: Option<String>,
    #[serde(default)]
    pub topic: bool,
    /// Written by the resolver; 0 when not a conjunct.
    #[serde(default)]
    pub conjunct_rank: u32,
    /// Written by the resolver for topics.
    #[serde(default)]
    pub anchor_suppressed: bool,
    /// Content node this mention realises.
    #[serde(skip)]
    pub content: Option<Id>,
}

impl Referent {
    #[must_use]
    pub fn new(discourse_type: impl Into<String>, discourse_id: impl Into<String>) -> Self {
        Self {
            discourse_type: discourse_type.into(),
            discourse_id: discourse_id.into(),
            ..Self::default()
        }
    }

    /// Mention of a content node: its class, discourse id and locked label.
    pub fn for_content(graph: &ContentGraph, node: Id) -> Result<Self, WysiwymError> {
        let content = graph.content(node)?;
        Ok(Self {
            discourse_type: graph.class(node)?.to_string(),
            discourse_id: content.discourse_id().to_string(),
            proper_name: content.final_label().map(str::to_string),
            content: Some(node),
            ..Self::default()
        })
    }

    #[must_use]
    pub fn proper_name(mut self, name: impl Into<String>) -> Self {
        self.proper_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn pronoun(mut self, pronoun: impl Into<String>) -> Self {
        self.pronoun = Some(pronoun.into());
        self
    }

    #[must_use]
    pub fn topic(mut self) -> Self {
        self.topic = true;
        self
    }
}

/// Ordinary or undetermined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxKind {
    Plain,
    Undetermined(Referent),
}

/// Payload of a syntax node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub category: Category,
    /// Literal word, if fixed.
    pub root: Option<String>,
    pub morphology: Morphology,
    pub kind: SyntaxKind,
}

impl SyntaxNode {
    #[must_use]
    pub fn plain(category: Category) -> Self {
        Self {
            category,
            root: None,
            morphology: Morphology::default(),
            kind: SyntaxKind::Plain,
        }
    }

    #[must_use]
    pub fn word(category: Category, root: impl Into<String>) -> Self {
        Self {
            root: Some(root.into()),
            ..Self::plain(category)
        }
    }

    /// A noun phrase awaiting a referring expression.
    #[must_use]
    pub fn undetermined(referent: Referent) -> Self {
        Self {
            kind: SyntaxKind::Undetermined(referent),
            ..Self::plain(Category::NounPhrase)
        }
    }

    #[must_use]
    pub fn with_morphology(mut self, morphology: Morphology) -> Self {
        self.morphology = morphology;
        self
    }

    #[must_use]
    pub fn referent(&self) -> Option<&Referent> {
        match &self.kind {
            SyntaxKind::Undetermined(r) => Some(r),
            SyntaxKind::Plain => None,
        }
    }
}

/// Payload of a dependency edge: position among siblings of one relation,
/// starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxEdge {
    pub order: u32,
}

// =============================================================================
// SYNTAX GRAPH
// =============================================================================

/// One dependency tree.
#[derive(Debug, Default)]
pub struct SyntaxGraph {
    graph: Graph<SyntaxNode, SyntaxEdge>,
}

impl SyntaxGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn graph(&self) -> &Graph<SyntaxNode, SyntaxEdge> {
        &self.graph
    }

    /// Insert the root node of the tree.
    pub fn set_root(&mut self, node: SyntaxNode) -> Result<Id, WysiwymError> {
        let label = format!("{:?}", node.category);
        self.graph.set_root(Node::new(label, node))
    }

    #[must_use]
    pub fn root(&self) -> Option<Id> {
        self.graph.root()
    }

    /// Attach `node` below `parent` under dependency `relation`.
    pub fn add_child(
        &mut self,
        parent: Id,
        relation: &str,
        node: SyntaxNode,
    ) -> Result<Id, WysiwymError> {
        self.graph.require_node(parent)?;
        let order = self.graph.count_outgoing(parent, relation) as u32 + 1;
        let label = format!("{:?}", node.category);
        let child = self.graph.add_node(Node::new(label, node))?;
        if let Err(e) = self.graph.connect(parent, child, relation, SyntaxEdge { order }) {
            self.graph.remove_node(child)?;
            return Err(e);
        }
        Ok(child)
    }

    /// A node's payload.
    pub fn node(&self, id: Id) -> Result<&SyntaxNode, WysiwymError> {
        self.graph.require_node(id).map(Node::data)
    }

    pub fn node_mut(&mut self, id: Id) -> Result<&mut SyntaxNode, WysiwymError> {
        self.graph
            .node_mut(id)
            .map(Node::data_mut)
            .ok_or(WysiwymError::NodeNotFound(id))
    }

    /// Discourse data of an undetermined node.
    pub fn referent(&self, id: Id) -> Result<&Referent, WysiwymError> {
        self.node(id)?
            .referent()
            .ok_or(WysiwymError::NotUndetermined(id))
    }

    pub fn referent_mut(&mut self, id: Id) -> Result<&mut Referent, WysiwymError> {
        match &mut self.node_mut(id)?.kind {
            SyntaxKind::Undetermined(r) => Ok(r),
            SyntaxKind::Plain => Err(WysiwymError::NotUndetermined(id)),
        }
    }

    fn parent_edge(&self, id: Id) -> Option<(Id, &str, u32)> {
        self.graph
            .incoming(id)
            .next()
            .map(|(_, e)| (e.source(), e.label(), e.data().order))
    }

    /// Parent node and the child's dependency relation.
    #[must_use]
    pub fn parent(&self, id: Id) -> Option<(Id, &str)> {
        self.parent_edge(id).map(|(p, r, _)| (p, r))
    }

    /// Dependency relation of a node to its parent.
    #[must_use]
    pub fn relation(&self, id: Id) -> Option<&str> {
        self.parent_edge(id).map(|(_, r, _)| r)
    }

    /// Children in attachment order.
    #[must_use]
    pub fn children(&self, id: Id) -> Vec<Id> {
        let mut edges: Vec<(EdgeIndex, Id)> = self
            .graph
            .outgoing(id)
            .map(|(index, e)| (index, e.target()))
            .collect();
        edges.sort();
        edges.into_iter().map(|(_, child)| child).collect()
    }

    /// Nodes in depth-first order from the root, children in attachment order.
    #[must_use]
    pub fn preorder(&self) -> Vec<Id> {
        let mut order = Vec::new();
        let Some(root) = self.root() else {
            return order;
        };
        let mut seen = BTreeSet::new();
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            order.push(current);
            for child in self.children(current).into_iter().rev() {
                stack.push(child);
            }
        }
        order
    }

    /// Undetermined nodes in reading order.
    #[must_use]
    pub fn undetermined(&self) -> Vec<Id> {
        self.preorder()
            .into_iter()
            .filter(|id| {
                self.graph
                    .node(*id)
                    .is_some_and(|n| n.data().referent().is_some())
            })
            .collect()
    }

    /// Position of a node among coordinated mentions.
    ///
    /// Walks up to the nearest conjunct edge and returns its order; 0 when
    /// there is none or the node is a topic.
    #[must_use]
    pub fn conjunct_rank(&self, id: Id) -> u32 {
        if self.referent(id).is_ok_and(|r| r.topic) {
            return 0;
        }
        let mut visited = BTreeSet::new();
        let mut current = id;
        while visited.insert(current) {
            match self.parent_edge(current) {
                Some((_, relation, order)) if relation == CONJUNCT_RELATION => return order,
                Some((parent, _, _)) => current = parent,
                None => return 0,
            }
        }
        0
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentValue;

    fn coordination() -> (SyntaxGraph, Id, Id, Id) {
        let mut tree = SyntaxGraph::new();
        let s = tree.set_root(SyntaxNode::plain(Category::Sentence)).expect("root");
        let coord = tree
            .add_child(s, "subject", SyntaxNode::plain(Category::Coordination))
            .expect("coord");
        let first = tree
            .add_child(coord, CONJUNCT_RELATION, SyntaxNode::undetermined(Referent::new("Paper", "p1")))
            .expect("first");
        let second_np = tree
            .add_child(coord, CONJUNCT_RELATION, SyntaxNode::plain(Category::NounPhrase))
            .expect("np");
        let second = tree
            .add_child(second_np, "head", SyntaxNode::undetermined(Referent::new("Paper", "p2")))
            .expect("second");
        (tree, s, first, second)
    }

    #[test]
    fn children_keep_attachment_order() {
        let (tree, s, first, _) = coordination();
        let coord = tree.children(s)[0];
        assert_eq!(tree.children(coord).len(), 2);
        assert_eq!(tree.children(coord)[0], first);
        assert_eq!(tree.relation(first), Some(CONJUNCT_RELATION));
        assert_eq!(tree.parent(coord).map(|(p, _)| p), Some(s));
    }

    #[test]
    fn conjunct_rank_walks_up() {
        let (tree, s, first, second) = coordination();
        assert_eq!(tree.conjunct_rank(first), 1);
        assert_eq!(tree.conjunct_rank(second), 2);
        assert_eq!(tree.conjunct_rank(s), 0);
    }

    #[test]
    fn topic_has_no_conjunct_rank() {
        let mut tree = SyntaxGraph::new();
        let s = tree.set_root(SyntaxNode::plain(Category::Sentence)).expect("root");
        let coord = tree
            .add_child(s, "subject", SyntaxNode::plain(Category::Coordination))
            .expect("coord");
        let topic = tree
            .add_child(
                coord,
                CONJUNCT_RELATION,
                SyntaxNode::undetermined(Referent::new("Paper", "p1").topic()),
            )
            .expect("topic");
        assert_eq!(tree.conjunct_rank(topic), 0);
    }

    #[test]
    fn undetermined_in_reading_order() {
        let (tree, _, first, second) = coordination();
        assert_eq!(tree.undetermined(), vec![first, second]);
    }

    #[test]
    fn referent_of_plain_node_fails() {
        let (tree, s, _, _) = coordination();
        assert_eq!(tree.referent(s).map(|_| ()), Err(WysiwymError::NotUndetermined(s)));
    }

    #[test]
    fn add_child_to_missing_parent_fails_cleanly() {
        let mut tree = SyntaxGraph::new();
        let missing: Id = "qqq".parse().expect("id");
        assert!(tree
            .add_child(missing, "head", SyntaxNode::plain(Category::Noun))
            .is_err());
        assert_eq!(tree.graph().node_count(), 0);
    }

    #[test]
    fn referent_from_content_node() {
        let mut content = ContentGraph::new();
        let paper = content.create_node("Paper", ContentValue::Resource).expect("create");
        content.lock_label(paper, "Attention Is All You Need").expect("lock");

        let referent = Referent::for_content(&content, paper).expect("referent");
        assert_eq!(referent.discourse_type, "Paper");
        assert_eq!(referent.discourse_id, paper.to_string());
        assert_eq!(referent.proper_name.as_deref(), Some("Attention Is All You Need"));
        assert_eq!(referent.content, Some(paper));
    }
}
