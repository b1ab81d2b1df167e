//! # Anchor Engine
//!
//! Computes, for one content node, the relations it can still gain and the
//! relations the user may remove.
//!
//! ## Classification
//!
//! | Compulsory | Optional | Result        |
//! |------------|----------|---------------|
//! | non-empty  | any      | red           |
//! | empty      | non-empty| blue          |
//! | empty      | empty    | `NotAnAnchor` |
//!
//! Menus are exposed as parallel name/label arrays, optional ones grouped
//! by submenu with ungrouped relations first.

use crate::content::{ContentGraph, RealizeState};
use crate::ontology::{Ontology, submenu_group};
use crate::types::{Id, WysiwymError};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// MENU TYPES
// =============================================================================

/// A relation offered by an anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    /// Ontology name of the relation.
    pub name: String,
    /// Natural-language label.
    pub label: String,
    /// Optional submenu group; always `None` for compulsory relations.
    pub submenu: Option<String>,
}

/// An attached relation the user may remove, with its current values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovableItem {
    pub name: String,
    pub label: String,
    pub values: Vec<String>,
}

/// One group of a menu as parallel arrays.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Menu {
    pub submenu: Option<String>,
    pub names: Vec<String>,
    pub labels: Vec<String>,
}

/// The removable menu as parallel arrays.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RemovableMenu {
    pub names: Vec<String>,
    pub labels: Vec<String>,
    pub values: Vec<Vec<String>>,
}

/// Red anchors still miss compulsory relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorColour {
    Red,
    Blue,
}

/// Every menu of an anchor, ready to hand to a renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnchorMenus {
    pub owner: Option<Id>,
    pub colour: AnchorColour,
    pub compulsory: Menu,
    pub optional: Vec<Menu>,
    pub removable: RemovableMenu,
}

// =============================================================================
// ANCHOR
// =============================================================================

/// The relation menu of one content node.
///
/// Anchors are not `Clone`: a copy for another node is made with
/// [`Anchor::merged`].
#[derive(Debug, PartialEq, Eq)]
pub struct Anchor {
    owner: Option<Id>,
    compulsory: Vec<MenuItem>,
    optional: Vec<MenuItem>,
    removable: Vec<RemovableItem>,
    red: bool,
}

impl Anchor {
    /// Compute the anchor of `node`.
    ///
    /// The result is unowned until it is installed with
    /// [`ContentGraph::set_anchor`].
    pub fn build<O: Ontology + ?Sized>(
        graph: &ContentGraph,
        node: Id,
        ontology: &O,
    ) -> Result<Self, WysiwymError> {
        let class = graph.class(node)?;
        let cardinalities = ontology.cardinalities(class);
        let mut seen = BTreeSet::new();
        let mut compulsory = Vec::new();
        let mut optional = Vec::new();

        for property in ontology.domain_properties(class) {
            if !seen.insert(property.name.clone()) {
                continue;
            }
            let name = property.name;
            let count = relation_count(graph, node, &name, ontology);
            let cardinality = cardinalities.get(&name).copied().unwrap_or_default();
            if cardinality.requires_more(count) {
                compulsory.push(MenuItem {
                    label: ontology.natural_language(&name),
                    name,
                    submenu: None,
                });
            } else if cardinality.admits_more(count) {
                optional.push(MenuItem {
                    label: ontology.natural_language(&name),
                    submenu: submenu_group(ontology.submenu(&name, class)),
                    name,
                });
            }
        }

        if compulsory.is_empty() && optional.is_empty() {
            return Err(WysiwymError::NotAnAnchor(node));
        }

        let mut anchor = Self {
            owner: None,
            red: !compulsory.is_empty(),
            compulsory,
            optional,
            removable: removable_relations(graph, node, ontology)?,
        };
        anchor.sort();
        tracing::trace!(%node, red = anchor.red, "anchor built");
        Ok(anchor)
    }

    /// Union of several anchors, owned by `owner`.
    ///
    /// Relations are deduplicated by name; one that is compulsory anywhere
    /// stays compulsory. Removable values are unioned per relation.
    pub fn merged<'a>(
        owner: Option<Id>,
        anchors: impl IntoIterator<Item = &'a Anchor>,
    ) -> Self {
        let mut compulsory: BTreeMap<String, MenuItem> = BTreeMap::new();
        let mut optional: BTreeMap<String, MenuItem> = BTreeMap::new();
        let mut removable: BTreeMap<String, RemovableItem> = BTreeMap::new();

        for anchor in anchors {
            for item in &anchor.compulsory {
                compulsory
                    .entry(item.name.clone())
                    .or_insert_with(|| item.clone());
            }
            for item in &anchor.optional {
                optional
                    .entry(item.name.clone())
                    .or_insert_with(|| item.clone());
            }
            for item in &anchor.removable {
                let entry = removable
                    .entry(item.name.clone())
                    .or_insert_with(|| RemovableItem {
                        name: item.name.clone(),
                        label: item.label.clone(),
                        values: Vec::new(),
                    });
                for value in &item.values {
                    if !entry.values.contains(value) {
                        entry.values.push(value.clone());
                    }
                }
            }
        }
        optional.retain(|name, _| !compulsory.contains_key(name));

        let mut anchor = Self {
            owner,
            red: !compulsory.is_empty(),
            compulsory: compulsory.into_values().collect(),
            optional: optional.into_values().collect(),
            removable: removable.into_values().collect(),
        };
        anchor.sort();
        anchor
    }

    /// Merge with another anchor, keeping this anchor's owner.
    #[must_use]
    pub fn merge(&self, other: &Anchor) -> Self {
        Self::merged(self.owner, [self, other])
    }

    fn sort(&mut self) {
        self.compulsory.sort_by_key(item_key);
        self.optional.sort_by_key(item_key);
        self.removable
            .sort_by_key(|r| (r.label.to_lowercase(), r.name.clone()));
    }

    #[must_use]
    pub fn owner(&self) -> Option<Id> {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: Option<Id>) {
        self.owner = owner;
    }

    #[must_use]
    pub fn is_red(&self) -> bool {
        self.red
    }

    #[must_use]
    pub fn colour(&self) -> AnchorColour {
        if self.red {
            AnchorColour::Red
        } else {
            AnchorColour::Blue
        }
    }

    #[must_use]
    pub fn compulsory(&self) -> &[MenuItem] {
        &self.compulsory
    }

    #[must_use]
    pub fn optional(&self) -> &[MenuItem] {
        &self.optional
    }

    #[must_use]
    pub fn removable(&self) -> &[RemovableItem] {
        &self.removable
    }

    /// Names of the compulsory relations in menu order.
    #[must_use]
    pub fn compulsory_names(&self) -> Vec<&str> {
        self.compulsory.iter().map(|i| i.name.as_str()).collect()
    }

    /// Names of the optional relations in menu order.
    #[must_use]
    pub fn optional_names(&self) -> Vec<&str> {
        self.optional.iter().map(|i| i.name.as_str()).collect()
    }

    /// Names of the removable relations in menu order.
    #[must_use]
    pub fn removable_names(&self) -> Vec<&str> {
        self.removable.iter().map(|i| i.name.as_str()).collect()
    }

    /// Whether `relation` is compulsory or optional here.
    #[must_use]
    pub fn offers(&self, relation: &str) -> bool {
        self.compulsory
            .iter()
            .chain(&self.optional)
            .any(|i| i.name == relation)
    }

    #[must_use]
    pub fn compulsory_menu(&self) -> Menu {
        let mut menu = Menu::default();
        for item in &self.compulsory {
            menu.names.push(item.name.clone());
            menu.labels.push(item.label.clone());
        }
        menu
    }

    /// Optional relations per submenu; the ungrouped menu comes first.
    #[must_use]
    pub fn optional_menus(&self) -> Vec<Menu> {
        let mut menus: Vec<Menu> = Vec::new();
        for item in &self.optional {
            let start_new = menus.last().is_none_or(|m| m.submenu != item.submenu);
            if start_new {
                menus.push(Menu {
                    submenu: item.submenu.clone(),
                    ..Menu::default()
                });
            }
            if let Some(menu) = menus.last_mut() {
                menu.names.push(item.name.clone());
                menu.labels.push(item.label.clone());
            }
        }
        menus
    }

    #[must_use]
    pub fn removable_menu(&self) -> RemovableMenu {
        let mut menu = RemovableMenu::default();
        for item in &self.removable {
            menu.names.push(item.name.clone());
            menu.labels.push(item.label.clone());
            menu.values.push(item.values.clone());
        }
        menu
    }

    #[must_use]
    pub fn menus(&self) -> AnchorMenus {
        AnchorMenus {
            owner: self.owner,
            colour: self.colour(),
            compulsory: self.compulsory_menu(),
            optional: self.optional_menus(),
            removable: self.removable_menu(),
        }
    }
}

fn item_key(item: &MenuItem) -> (Option<String>, String, String) {
    (
        item.submenu.as_ref().map(|s| s.to_lowercase()),
        item.label.to_lowercase(),
        item.name.clone(),
    )
}

// =============================================================================
// COUNTING AND CARDINALITY
// =============================================================================

/// Outgoing `relation` edges plus incoming edges of its inverse.
#[must_use]
pub fn relation_count<O: Ontology + ?Sized>(
    graph: &ContentGraph,
    node: Id,
    relation: &str,
    ontology: &O,
) -> usize {
    let g = graph.graph();
    let forward = g.count_outgoing(node, relation);
    let backward = ontology
        .inverse(relation)
        .map(|inverse| g.count_incoming(node, &inverse))
        .unwrap_or(0);
    forward + backward
}

fn removable_relations<O: Ontology + ?Sized>(
    graph: &ContentGraph,
    node: Id,
    ontology: &O,
) -> Result<Vec<RemovableItem>, WysiwymError> {
    let mut grouped: BTreeMap<String, RemovableItem> = BTreeMap::new();
    for (_, edge) in graph.graph().outgoing(node) {
        if !edge.data().is_removable() {
            continue;
        }
        let target = graph.content(edge.target())?;
        if !target.is_removable() {
            continue;
        }
        let mut values = target.value().member_labels();
        if values.is_empty() {
            values.push(graph.display_label(edge.target(), ontology)?);
        }
        grouped
            .entry(edge.label().to_string())
            .or_insert_with(|| RemovableItem {
                name: edge.label().to_string(),
                label: ontology.natural_language(edge.label()),
                values: Vec::new(),
            })
            .values
            .extend(values);
    }
    Ok(grouped.into_values().collect())
}

/// Check that binding `relation` from `source` to `target` respects
/// cardinality.
///
/// Fails when the source already holds the maximum number of `relation`
/// bindings, when the target already holds the maximum of the inverse, or
/// when `relation` is inverse-functional, the target already has an incoming
/// `relation` edge and the target's anchor does not offer the inverse. An
/// incomplete node is never rejected on its own side, since its bindings
/// have not all been fetched.
pub fn check_addition<O: Ontology + ?Sized>(
    graph: &ContentGraph,
    source: Id,
    relation: &str,
    target: Id,
    ontology: &O,
) -> Result<(), WysiwymError> {
    let source_node = graph.content(source)?;
    let target_node = graph.content(target)?;

    if source_node.realize_state() != RealizeState::Incomplete {
        let class = graph.class(source)?;
        let cardinality = ontology
            .cardinalities(class)
            .get(relation)
            .copied()
            .unwrap_or_default();
        if !cardinality.admits_more(relation_count(graph, source, relation, ontology)) {
            return Err(WysiwymError::CardinalityViolation {
                node: source,
                relation: relation.to_string(),
            });
        }
    }

    if target_node.realize_state() == RealizeState::Incomplete {
        return Ok(());
    }

    let inverse = ontology.inverse(relation);
    if let Some(inverse) = &inverse {
        let class = graph.class(target)?;
        let cardinality = ontology
            .cardinalities(class)
            .get(inverse)
            .copied()
            .unwrap_or_default();
        if !cardinality.admits_more(relation_count(graph, target, inverse, ontology)) {
            return Err(WysiwymError::CardinalityViolation {
                node: target,
                relation: relation.to_string(),
            });
        }
    }

    if !ontology.is_inverse_functional(relation)
        || graph.graph().count_incoming(target, relation) == 0
    {
        return Ok(());
    }

    let inverse_offered = match inverse {
        Some(inverse) => match Anchor::build(graph, target, ontology) {
            Ok(anchor) => anchor.offers(&inverse),
            Err(WysiwymError::NotAnAnchor(_)) => false,
            Err(e) => return Err(e),
        },
        None => false,
    };
    if inverse_offered {
        Ok(())
    } else {
        Err(WysiwymError::CardinalityViolation {
            node: target,
            relation: relation.to_string(),
        })
    }
}

/// The candidates that may be offered as targets of `relation`.
pub fn candidate_targets<O: Ontology + ?Sized>(
    graph: &ContentGraph,
    source: Id,
    relation: &str,
    candidates: impl IntoIterator<Item = Id>,
    ontology: &O,
) -> Result<Vec<Id>, WysiwymError> {
    let mut offered = Vec::new();
    for candidate in candidates {
        match check_addition(graph, source, relation, candidate, ontology) {
            Ok(()) => offered.push(candidate),
            Err(WysiwymError::CardinalityViolation { .. }) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(offered)
}

// =============================================================================
// TESTS
// =============================================================================
