//! # Referring-Expression Resolver
//!
//! Decides how each entity mention in a sentence is worded, given which
//! individuals of the same type were mentioned in the previous sentence
//! and earlier in the current one.
//!
//! | Situation                                      | Wording            |
//! |------------------------------------------------|--------------------|
//! | paragraph topic                                | pronoun            |
//! | type not in previous sentence                  | name, `a T`, `another T` |
//! | same individual in previous sentence           | name, `the (second) T` |
//! | other individual of the type in previous one   | name, `yet another T` |

use crate::content::date::numeric_ordinal;
use crate::primitives::{DEFAULT_PLURAL_PRONOUN, DEFAULT_SINGULAR_PRONOUN};
use crate::syntax::{Number, SyntaxGraph, SyntaxNode};
use crate::types::{Id, WysiwymError};
use std::collections::BTreeMap;
use std::fmt;

const ORDINALS: [&str; 10] = [
    "first", "second", "third", "fourth", "fifth", "sixth", "seventh", "eighth", "ninth", "tenth",
];

/// The chosen wording of a mention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Designation {
    Pronoun(String),
    ProperName(String),
    /// `a T`
    Indefinite(String),
    /// `another T`
    Another(String),
    /// `the T`, or `the second T` with a nonzero ordinal.
    Definite { noun: String, ordinal: u32 },
    /// `yet another T`
    YetAnother(String),
}

impl Designation {
    /// Topics are assumed maximally salient and get no anchor.
    #[must_use]
    pub fn suppresses_anchor(&self) -> bool {
        matches!(self, Designation::Pronoun(_))
    }
}

impl fmt::Display for Designation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Designation::Pronoun(p) => f.write_str(p),
            Designation::ProperName(n) => f.write_str(n),
            Designation::Indefinite(noun) => write!(f, "{} {noun}", article(noun)),
            Designation::Another(noun) => write!(f, "another {noun}"),
            Designation::Definite { noun, ordinal: 0 } => write!(f, "the {noun}"),
            Designation::Definite { noun, ordinal } => {
                write!(f, "the {} {noun}", ordinal_word(*ordinal))
            }
            Designation::YetAnother(noun) => write!(f, "yet another {noun}"),
        }
    }
}

fn article(noun: &str) -> &'static str {
    match noun.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}

fn ordinal_word(n: u32) -> String {
    usize::try_from(n)
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| ORDINALS.get(i))
        .map(|w| (*w).to_string())
        .unwrap_or_else(|| numeric_ordinal(i64::from(n)))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Mention {
    discourse_id: String,
    conjunct_rank: u32,
}

/// Discourse memory of one rendering pass.
#[derive(Debug, Clone, Default)]
pub struct ReferringExpressionResolver {
    previous: BTreeMap<String, Vec<Mention>>,
    current: BTreeMap<String, Vec<Mention>>,
}

impl ReferringExpressionResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose the wording for `node` with the given conjunct rank.
    ///
    /// Does not record the mention.
    pub fn decide(&self, node: &SyntaxNode, conjunct_rank: u32) -> Option<Designation> {
        let referent = node.referent()?;
        let noun = referent.discourse_type.clone();

        if referent.topic {
            let pronoun = referent.pronoun.clone().unwrap_or_else(|| {
                match node.morphology.number {
                    Number::Singular => DEFAULT_SINGULAR_PRONOUN,
                    Number::Plural => DEFAULT_PLURAL_PRONOUN,
                }
                .to_string()
            });
            return Some(Designation::Pronoun(pronoun));
        }
        let named = referent.proper_name.clone().map(Designation::ProperName);

        let previous = self
            .previous
            .get(&referent.discourse_type)
            .filter(|m| !m.is_empty());
        let designation = match previous {
            None => {
                let current = self
                    .current
                    .get(&referent.discourse_type)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                if current.iter().any(|m| m.discourse_id == referent.discourse_id) {
                    named.unwrap_or(Designation::Definite { noun, ordinal: 0 })
                } else if current.is_empty() {
                    named.unwrap_or(Designation::Indefinite(noun))
                } else {
                    named.unwrap_or(Designation::Another(noun))
                }
            }
            Some(mentions) => match mentions
                .iter()
                .find(|m| m.discourse_id == referent.discourse_id)
            {
                Some(earlier) => named.unwrap_or(Designation::Definite {
                    noun,
                    ordinal: earlier.conjunct_rank,
                }),
                None => named.unwrap_or(Designation::YetAnother(noun)),
            },
        };
        tracing::trace!(conjunct_rank, designation = %designation, "referring expression");
        Some(designation)
    }

    /// Decide the wording of an undetermined node and record the mention.
    pub fn resolve(&mut self, tree: &SyntaxGraph, node: Id) -> Result<Designation, WysiwymError> {
        let payload = tree.node(node)?;
        let rank = tree.conjunct_rank(node);
        let designation = self
            .decide(payload, rank)
            .ok_or(WysiwymError::NotUndetermined(node))?;
        let referent = tree.referent(node)?;
        self.current
            .entry(referent.discourse_type.clone())
            .or_default()
            .push(Mention {
                discourse_id: referent.discourse_id.clone(),
                conjunct_rank: rank,
            });
        Ok(designation)
    }

    /// Resolve a node and write the result into the tree.
    pub fn realize(&mut self, tree: &mut SyntaxGraph, node: Id) -> Result<Designation, WysiwymError> {
        let designation = self.resolve(tree, node)?;
        let rank = tree.conjunct_rank(node);
        let payload = tree.node_mut(node)?;
        payload.root = Some(designation.to_string());
        let referent = tree.referent_mut(node)?;
        referent.conjunct_rank = rank;
        referent.anchor_suppressed = designation.suppresses_anchor();
        Ok(designation)
    }

    /// Realise every undetermined node of a sentence, then close it.
    pub fn realize_sentence(
        &mut self,
        tree: &mut SyntaxGraph,
    ) -> Result<Vec<(Id, Designation)>, WysiwymError> {
        let mut out = Vec::new();
        for node in tree.undetermined() {
            let designation = self.realize(tree, node)?;
            out.push((node, designation));
        }
        self.finish_sentence();
        Ok(out)
    }

    /// The current sentence becomes the previous one.
    pub fn finish_sentence(&mut self) {
        self.previous = std::mem::take(&mut self.current);
    }

    /// Forget everything; a new paragraph starts.
    pub fn reset(&mut self) {
        self.previous.clear();
        self.current.clear();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::CONJUNCT_RELATION;
    use crate::syntax::{Category, Morphology, Referent};

    fn sentence(mentions: Vec<Referent>) -> (SyntaxGraph, Vec<Id>) {
        let mut tree = SyntaxGraph::new();
        let s = tree.set_root(SyntaxNode::plain(Category::Sentence)).expect("root");
        let mut ids = Vec::new();
        for referent in mentions {
            let id = tree
                .add_child(s, "argument", SyntaxNode::undetermined(referent))
                .expect("child");
            ids.push(id);
        }
        (tree, ids)
    }

    fn coordinated(mentions: Vec<Referent>) -> (SyntaxGraph, Vec<Id>) {
        let mut tree = SyntaxGraph::new();
        let s = tree.set_root(SyntaxNode::plain(Category::Sentence)).expect("root");
        let coord = tree
            .add_child(s, "subject", SyntaxNode::plain(Category::Coordination))
            .expect("coord");
        let mut ids = Vec::new();
        for referent in mentions {
            let id = tree
                .add_child(coord, CONJUNCT_RELATION, SyntaxNode::undetermined(referent))
                .expect("conjunct");
            ids.push(id);
        }
        (tree, ids)
    }

    fn texts(resolved: &[(Id, Designation)]) -> Vec<String> {
        resolved.iter().map(|(_, d)| d.to_string()).collect()
    }

    #[test]
    fn topic_is_a_pronoun_and_suppresses_anchor() {
        let mut resolver = ReferringExpressionResolver::new();
        let (mut tree, ids) = sentence(vec![Referent::new("Project", "p").topic()]);
        let d = resolver.realize(&mut tree, ids[0]).expect("realize");
        assert_eq!(d, Designation::Pronoun("it".into()));
        assert!(tree.referent(ids[0]).expect("referent").anchor_suppressed);
        assert_eq!(tree.node(ids[0]).expect("node").root.as_deref(), Some("it"));
    }

    #[test]
    fn plural_topic_defaults_to_they() {
        let resolver = ReferringExpressionResolver::new();
        let node = SyntaxNode::undetermined(Referent::new("Project", "p").topic())
            .with_morphology(Morphology::plural());
        assert_eq!(resolver.decide(&node, 0), Some(Designation::Pronoun("they".into())));
        let named = SyntaxNode::undetermined(Referent::new("Person", "x").topic().pronoun("she"));
        assert_eq!(resolver.decide(&named, 0), Some(Designation::Pronoun("she".into())));
    }

    #[test]
    fn first_mentions_are_indefinite_then_another() {
        let mut resolver = ReferringExpressionResolver::new();
        let (mut tree, _) = sentence(vec![
            Referent::new("Paper", "p1"),
            Referent::new("Paper", "p2"),
            Referent::new("Author", "a1"),
        ]);
        let resolved = resolver.realize_sentence(&mut tree).expect("sentence");
        assert_eq!(texts(&resolved), vec!["a Paper", "another Paper", "an Author"]);
    }

    #[test]
    fn proper_name_wins_when_known() {
        let mut resolver = ReferringExpressionResolver::new();
        let (mut tree, _) = sentence(vec![Referent::new("Person", "x").proper_name("Ada")]);
        let resolved = resolver.realize_sentence(&mut tree).expect("sentence");
        assert_eq!(texts(&resolved), vec!["Ada"]);
    }

    #[test]
    fn ordinal_from_previous_conjunct_rank() {
        let mut resolver = ReferringExpressionResolver::new();
        let (mut first, _) =
            coordinated(vec![Referent::new("Paper", "p1"), Referent::new("Paper", "p2")]);
        resolver.realize_sentence(&mut first).expect("first");

        let (mut second, _) = sentence(vec![Referent::new("Paper", "p2")]);
        let resolved = resolver.realize_sentence(&mut second).expect("second");
        assert_eq!(texts(&resolved), vec!["the second Paper"]);
    }

    #[test]
    fn plain_previous_mention_is_the() {
        let mut resolver = ReferringExpressionResolver::new();
        let (mut first, _) = sentence(vec![Referent::new("Paper", "p1")]);
        resolver.realize_sentence(&mut first).expect("first");

        let (mut second, _) =
            sentence(vec![Referent::new("Paper", "p1"), Referent::new("Paper", "p9")]);
        let resolved = resolver.realize_sentence(&mut second).expect("second");
        assert_eq!(texts(&resolved), vec!["the Paper", "yet another Paper"]);
    }

    #[test]
    fn memory_only_spans_one_sentence() {
        let mut resolver = ReferringExpressionResolver::new();
        for _ in 0..2 {
            let (mut tree, _) = sentence(vec![Referent::new("Paper", "p1")]);
            resolver.realize_sentence(&mut tree).expect("sentence");
        }
        let (mut empty, _) = sentence(Vec::new());
        resolver.realize_sentence(&mut empty).expect("empty");

        let (mut tree, _) = sentence(vec![Referent::new("Paper", "p1")]);
        let resolved = resolver.realize_sentence(&mut tree).expect("sentence");
        assert_eq!(texts(&resolved), vec!["a Paper"]);
    }

    #[test]
    fn reset_forgets_previous_sentence() {
        let mut resolver = ReferringExpressionResolver::new();
        let (mut tree, _) = sentence(vec![Referent::new("Paper", "p1")]);
        resolver.realize_sentence(&mut tree).expect("sentence");
        resolver.reset();
        let (mut tree, _) = sentence(vec![Referent::new("Paper", "p1")]);
        let resolved = resolver.realize_sentence(&mut tree).expect("sentence");
        assert_eq!(texts(&resolved), vec!["a Paper"]);
    }

    #[test]
    fn plain_node_is_not_undetermined() {
        let mut resolver = ReferringExpressionResolver::new();
        let mut tree = SyntaxGraph::new();
        let s = tree.set_root(SyntaxNode::plain(Category::Sentence)).expect("root");
        assert_eq!(resolver.resolve(&tree, s), Err(WysiwymError::NotUndetermined(s)));
    }

    #[test]
    fn ordinal_words() {
        assert_eq!(ordinal_word(2), "second");
        assert_eq!(ordinal_word(10), "tenth");
        assert_eq!(ordinal_word(11), "11th");
        assert_eq!(ordinal_word(22), "22nd");
    }
}
