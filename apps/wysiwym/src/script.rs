//! # Scripts
//!
//! Two TOML script formats drive the engine from the command line.
//!
//! An edit script is a list of steps run against one editing session:
//!
//! ```toml
//! [[step]]
//! op = "create_root"
//! name = "apollo"
//! class = "Project"
//!
//! [[step]]
//! op = "add_value"
//! name = "apollo-name"
//! source = "apollo"
//! relation = "hasName"
//! class = "String"
//! value = { string = "Apollo" }
//!
//! [[step]]
//! op = "undo"
//! ```
//!
//! Script names are bound to discourse identifiers, which survive the
//! snapshots behind undo and redo; node identifiers do not.
//!
//! A discourse script lists the mentions of each sentence:
//!
//! ```toml
//! [[sentence]]
//! mention = [
//!     { type = "Paper", id = "p1", group = "subject" },
//!     { type = "Paper", id = "p2", group = "subject" },
//!     { type = "Project", id = "topic", topic = true },
//! ]
//! ```

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use wysiwym_core::primitives::CONJUNCT_RELATION;
use wysiwym_core::{
    Address, AnchorMenus, Category, ContentValue, DateValue, Id, Morphology, Ontology, QueryValue,
    RealizeState, Referent, ReferringExpressionResolver, Session, SessionKind, SyntaxGraph,
    SyntaxNode, WysiwymError,
};

// =============================================================================
// EDIT SCRIPTS
// =============================================================================

/// Initial value of a node created by a script.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSpec {
    #[default]
    Resource,
    String(String),
    Int(i64),
    Double(f64),
    Boolean(bool),
    Date(DateValue),
    Address(Address),
    Query(QueryValue),
}

impl ValueSpec {
    fn into_value(self) -> Result<ContentValue, WysiwymError> {
        Ok(match self {
            ValueSpec::Resource => ContentValue::Resource,
            ValueSpec::String(s) => ContentValue::string(s),
            ValueSpec::Int(i) => ContentValue::int(i),
            ValueSpec::Double(d) => ContentValue::double(d),
            ValueSpec::Boolean(b) => ContentValue::boolean(b),
            ValueSpec::Date(d) => ContentValue::Date(d.validated()?),
            ValueSpec::Address(a) => ContentValue::Address(a),
            ValueSpec::Query(q) => ContentValue::Query(q),
        })
    }
}

/// One step of an edit script.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    CreateRoot {
        name: String,
        class: String,
        #[serde(default)]
        value: ValueSpec,
    },
    CreateNode {
        name: String,
        class: String,
        #[serde(default)]
        value: ValueSpec,
    },
    Bind {
        source: String,
        relation: String,
        target: String,
    },
    AddValue {
        name: String,
        source: String,
        relation: String,
        class: String,
        value: ValueSpec,
    },
    Unbind {
        source: String,
        relation: String,
        target: String,
    },
    Remove {
        node: String,
    },
    SetString {
        node: String,
        value: String,
    },
    SetInt {
        node: String,
        value: i64,
    },
    SetDouble {
        node: String,
        value: f64,
    },
    SetBoolean {
        node: String,
        value: bool,
    },
    Revert {
        node: String,
    },
    LockLabel {
        node: String,
        label: String,
    },
    SetState {
        node: String,
        state: RealizeState,
    },
    Undo,
    Redo,
    Branch {
        kind: SessionKind,
        template: String,
    },
}

impl Step {
    fn op(&self) -> &'static str {
        match self {
            Step::CreateRoot { .. } => "create_root",
            Step::CreateNode { .. } => "create_node",
            Step::Bind { .. } => "bind",
            Step::AddValue { .. } => "add_value",
            Step::Unbind { .. } => "unbind",
            Step::Remove { .. } => "remove",
            Step::SetString { .. } => "set_string",
            Step::SetInt { .. } => "set_int",
            Step::SetDouble { .. } => "set_double",
            Step::SetBoolean { .. } => "set_boolean",
            Step::Revert { .. } => "revert",
            Step::LockLabel { .. } => "lock_label",
            Step::SetState { .. } => "set_state",
            Step::Undo => "undo",
            Step::Redo => "redo",
            Step::Branch { .. } => "branch",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct EditScript {
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl EditScript {
    pub fn parse(text: &str) -> Result<Self, AppError> {
        Ok(toml::from_str(text)?)
    }
}

// =============================================================================
// REPLAY REPORT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub op: &'static str,
    /// Engine error when the edit was refused.
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeReport {
    pub id: String,
    pub discourse_id: String,
    pub class: String,
    pub label: String,
    pub realize_state: &'static str,
    pub sequence: u64,
    pub anchor: Option<AnchorMenus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchReport {
    pub step: usize,
    pub kind: SessionKind,
    pub template: String,
    pub root: Option<String>,
    pub nodes: Vec<NodeReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    pub steps: Vec<StepOutcome>,
    pub nodes: Vec<NodeReport>,
    pub branches: Vec<BranchReport>,
    pub undo_depth: usize,
    pub redo_depth: usize,
}

impl ReplayReport {
    /// Number of steps the engine refused.
    #[must_use]
    pub fn refused(&self) -> usize {
        self.steps.iter().filter(|s| s.error.is_some()).count()
    }
}

// =============================================================================
// REPLAY
// =============================================================================

struct Replay<'a, O: Ontology + ?Sized> {
    session: Session,
    ontology: &'a O,
    /// Script name -> discourse identifier.
    names: BTreeMap<String, String>,
    branches: Vec<BranchReport>,
}

impl<'a, O: Ontology + ?Sized> Replay<'a, O> {
    fn node(&self, step: usize, name: &str) -> Result<Id, AppError> {
        let discourse_id = self
            .names
            .get(name)
            .ok_or_else(|| AppError::script(step, format!("unknown name '{name}'")))?;
        self.session
            .graph()
            .find_by_discourse_id(discourse_id)
            .ok_or_else(|| AppError::script(step, format!("'{name}' is not in the graph")))
    }

    fn edge(&self, step: usize, source: &str, relation: &str, target: &str) -> Result<Id, AppError> {
        let from = self.node(step, source)?;
        let to = self.node(step, target)?;
        self.session
            .graph()
            .graph()
            .outgoing(from)
            .find(|(_, e)| e.label() == relation && e.target() == to)
            .and_then(|(_, e)| e.id())
            .ok_or_else(|| {
                AppError::script(step, format!("no {relation} edge from '{source}' to '{target}'"))
            })
    }

    fn remember(&mut self, name: &str, id: Id) -> Result<(), WysiwymError> {
        let discourse_id = self.session.graph().content(id)?.discourse_id().to_string();
        self.names.insert(name.to_string(), discourse_id);
        Ok(())
    }

    /// Run one step. Outer errors are script faults; inner ones are edits
    /// the engine refused.
    fn run(&mut self, index: usize, step: Step) -> Result<Result<(), WysiwymError>, AppError> {
        let ontology = self.ontology;
        Ok(match step {
            Step::CreateRoot { name, class, value } => value
                .into_value()
                .and_then(|v| self.session.create_root(&class, v))
                .and_then(|id| self.remember(&name, id)),
            Step::CreateNode { name, class, value } => value
                .into_value()
                .and_then(|v| self.session.create_node(&class, v))
                .and_then(|id| self.remember(&name, id)),
            Step::Bind {
                source,
                relation,
                target,
            } => {
                let from = self.node(index, &source)?;
                let to = self.node(index, &target)?;
                self.session.bind(from, &relation, to, ontology).map(|_| ())
            }
            Step::AddValue {
                name,
                source,
                relation,
                class,
                value,
            } => {
                let from = self.node(index, &source)?;
                value
                    .into_value()
                    .and_then(|v| self.session.add_value(from, &relation, &class, v, ontology))
                    .and_then(|id| self.remember(&name, id))
            }
            Step::Unbind {
                source,
                relation,
                target,
            } => {
                let edge = self.edge(index, &source, &relation, &target)?;
                self.session.unbind(edge).map(|_| ())
            }
            Step::Remove { node } => {
                let id = self.node(index, &node)?;
                self.session.remove_node(id)
            }
            Step::SetString { node, value } => {
                let id = self.node(index, &node)?;
                self.session.set_string(id, &value)
            }
            Step::SetInt { node, value } => {
                let id = self.node(index, &node)?;
                self.session.set_int(id, value)
            }
            Step::SetDouble { node, value } => {
                let id = self.node(index, &node)?;
                self.session.set_double(id, value)
            }
            Step::SetBoolean { node, value } => {
                let id = self.node(index, &node)?;
                self.session.set_boolean(id, value)
            }
            Step::Revert { node } => {
                let id = self.node(index, &node)?;
                self.session.revert_value(id).map(|_| ())
            }
            Step::LockLabel { node, label } => {
                let id = self.node(index, &node)?;
                self.session.lock_label(id, &label).map(|_| ())
            }
            Step::SetState { node, state } => {
                let id = self.node(index, &node)?;
                self.session.set_realize_state(id, state)
            }
            Step::Undo => self.session.undo(),
            Step::Redo => self.session.redo(),
            Step::Branch { kind, template } => {
                let id = self.node(index, &template)?;
                match self.session.branch(kind, id) {
                    Ok(mut branch) => {
                        let nodes = describe_session(&mut branch, ontology)?;
                        self.branches.push(BranchReport {
                            step: index,
                            kind,
                            template,
                            root: branch.graph().root().map(|r| r.to_string()),
                            nodes,
                        });
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            }
        })
    }
}

/// Refresh every anchor of a session and describe its nodes.
pub fn describe_session<O: Ontology + ?Sized>(
    session: &mut Session,
    ontology: &O,
) -> Result<Vec<NodeReport>, AppError> {
    session.refresh_anchors(ontology)?;
    let graph = session.graph();
    let mut out = Vec::new();
    for id in graph.graph().node_ids() {
        let content = graph.content(id)?;
        out.push(NodeReport {
            id: id.to_string(),
            discourse_id: content.discourse_id().to_string(),
            class: graph.class(id)?.to_string(),
            label: graph.display_label(id, ontology)?,
            realize_state: content.realize_state().as_str(),
            sequence: content.sequence(),
            anchor: content.anchor().map(|a| a.menus()),
        });
    }
    Ok(out)
}

/// Run an edit script against a fresh editing session.
///
/// Edits the engine refuses are recorded in the report and the replay
/// continues; references to unknown names abort it.
pub fn replay<O: Ontology + ?Sized>(
    script: EditScript,
    ontology: &O,
    history_depth: usize,
) -> Result<ReplayReport, AppError> {
    let mut replay = Replay {
        session: Session::new(SessionKind::Edit, history_depth),
        ontology,
        names: BTreeMap::new(),
        branches: Vec::new(),
    };
    let mut steps = Vec::new();

    for (index, step) in script.steps.into_iter().enumerate() {
        let op = step.op();
        let error = replay.run(index, step)?.err().map(|e| {
            tracing::warn!(step = index, op, error = %e, "edit refused");
            e.to_string()
        });
        steps.push(StepOutcome { index, op, error });
    }

    let nodes = describe_session(&mut replay.session, ontology)?;
    let history = replay.session.history();
    Ok(ReplayReport {
        steps,
        nodes,
        undo_depth: history.undo_len(),
        redo_depth: history.redo_len(),
        branches: replay.branches,
    })
}

// =============================================================================
// DISCOURSE SCRIPTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MentionSpec {
    #[serde(rename = "type")]
    pub discourse_type: String,
    pub id: String,
    /// Mentions of one sentence sharing a group are coordinated.
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub topic: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub pronoun: Option<String>,
    #[serde(default)]
    pub plural: bool,
}

impl MentionSpec {
    fn node(&self) -> SyntaxNode {
        let mut referent = Referent::new(&self.discourse_type, &self.id);
        if let Some(name) = &self.name {
            referent = referent.proper_name(name);
        }
        if let Some(pronoun) = &self.pronoun {
            referent = referent.pronoun(pronoun);
        }
        if self.topic {
            referent = referent.topic();
        }
        let node = SyntaxNode::undetermined(referent);
        if self.plural {
            node.with_morphology(Morphology::plural())
        } else {
            node
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct SentenceSpec {
    #[serde(default)]
    pub mention: Vec<MentionSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct DiscourseScript {
    #[serde(default)]
    pub sentence: Vec<SentenceSpec>,
}

impl DiscourseScript {
    pub fn parse(text: &str) -> Result<Self, AppError> {
        Ok(toml::from_str(text)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MentionReport {
    pub id: String,
    pub text: String,
    pub anchor: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentenceReport {
    pub mentions: Vec<MentionReport>,
}

/// Build one dependency tree per sentence and resolve its mentions in
/// order.
pub fn resolve_discourse(script: &DiscourseScript) -> Result<Vec<SentenceReport>, AppError> {
    let mut resolver = ReferringExpressionResolver::new();
    let mut out = Vec::new();

    for sentence in &script.sentence {
        let mut tree = SyntaxGraph::new();
        let root = tree.set_root(SyntaxNode::plain(Category::Sentence))?;
        let mut groups: BTreeMap<&str, Id> = BTreeMap::new();
        let mut order = Vec::new();

        for mention in &sentence.mention {
            let id = match mention.group.as_deref() {
                Some(group) => {
                    let coordination = match groups.get(group) {
                        Some(&c) => c,
                        None => {
                            let c = tree.add_child(
                                root,
                                group,
                                SyntaxNode::plain(Category::Coordination),
                            )?;
                            groups.insert(group, c);
                            c
                        }
                    };
                    tree.add_child(coordination, CONJUNCT_RELATION, mention.node())?
                }
                None => tree.add_child(root, "argument", mention.node())?,
            };
            order.push((id, mention.id.clone()));
        }

        let resolved: BTreeMap<Id, _> = resolver.realize_sentence(&mut tree)?.into_iter().collect();
        let mut mentions = Vec::new();
        for (id, discourse_id) in order {
            let designation = resolved
                .get(&id)
                .ok_or(WysiwymError::NotUndetermined(id))?;
            mentions.push(MentionReport {
                id: discourse_id,
                text: designation.to_string(),
                anchor: !designation.suppresses_anchor(),
            });
        }
        out.push(SentenceReport { mentions });
    }
    Ok(out)
}
