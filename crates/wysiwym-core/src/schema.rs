//! # Static Schema
//!
//! A small in-memory ontology, deserializable from TOML by the app layer:
//!
//! ```toml
//! [classes.Project]
//! properties = [
//!     { name = "hasName", min = 1, max = 1 },
//!     { name = "startDate", max = 1, submenu = "Dates" },
//! ]
//!
//! [properties.hasMember]
//! inverse = "memberOf"
//! ```
//!
//! Classes may name a `parent`; its properties are inherited unless the
//! child declares a property of the same name.

use crate::ontology::{Cardinality, Ontology, PropertyDescriptor, split_camel_case};
use crate::types::WysiwymError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A property as declared on one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassProperty {
    pub name: String,
    #[serde(default)]
    pub min: u32,
    /// 0 means unbounded.
    #[serde(default)]
    pub max: u32,
    #[serde(default)]
    pub submenu: Option<String>,
    #[serde(default)]
    pub range: Option<String>,
}

impl ClassProperty {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min: 0,
            max: 0,
            submenu: None,
            range: None,
        }
    }

    #[must_use]
    pub fn min(mut self, min: u32) -> Self {
        self.min = min;
        self
    }

    #[must_use]
    pub fn max(mut self, max: u32) -> Self {
        self.max = max;
        self
    }

    #[must_use]
    pub fn submenu(mut self, submenu: impl Into<String>) -> Self {
        self.submenu = Some(submenu.into());
        self
    }

    #[must_use]
    pub fn range(mut self, range: impl Into<String>) -> Self {
        self.range = Some(range.into());
        self
    }
}

/// A class and the properties declared on it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassSpec {
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub properties: Vec<ClassProperty>,
}

impl ClassSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn property(mut self, property: ClassProperty) -> Self {
        self.properties.push(property);
        self
    }
}

/// Class-independent facts about a property.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PropertySpec {
    #[serde(default)]
    pub inverse: Option<String>,
    #[serde(default)]
    pub inverse_functional: bool,
    #[serde(default)]
    pub label: Option<String>,
}

impl PropertySpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn inverse(mut self, inverse: impl Into<String>) -> Self {
        self.inverse = Some(inverse.into());
        self
    }

    #[must_use]
    pub fn inverse_functional(mut self) -> Self {
        self.inverse_functional = true;
        self
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// The static ontology.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub classes: BTreeMap<String, ClassSpec>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertySpec>,
    /// Natural-language labels for individual resources.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_class(mut self, name: impl Into<String>, class: ClassSpec) -> Self {
        self.classes.insert(name.into(), class);
        self
    }

    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, property: PropertySpec) -> Self {
        self.properties.insert(name.into(), property);
        self
    }

    #[must_use]
    pub fn with_label(mut self, resource: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(resource.into(), label.into());
        self
    }

    /// `class` followed by its ancestors, stopping at unknown or repeated
    /// classes.
    fn lineage(&self, class: &str) -> Vec<&ClassSpec> {
        let mut chain = Vec::new();
        let mut visited = BTreeSet::new();
        let mut current = Some(class);
        while let Some(name) = current {
            if !visited.insert(name) {
                break;
            }
            let Some(spec) = self.classes.get(name) else {
                break;
            };
            chain.push(spec);
            current = spec.parent.as_deref();
        }
        chain
    }

    /// Declarations applying to `class`, nearest declaration winning.
    fn effective_properties(&self, class: &str) -> Vec<&ClassProperty> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for spec in self.lineage(class) {
            for property in &spec.properties {
                if seen.insert(property.name.as_str()) {
                    out.push(property);
                }
            }
        }
        out
    }

    /// Every property name mentioned anywhere in the schema.
    fn known_properties(&self) -> BTreeSet<&str> {
        self.classes
            .values()
            .flat_map(|c| c.properties.iter().map(|p| p.name.as_str()))
            .chain(self.properties.keys().map(String::as_str))
            .collect()
    }

    /// Check the schema for dangling references and impossible bounds.
    pub fn validate(&self) -> Result<(), WysiwymError> {
        let known = self.known_properties();
        for (name, class) in &self.classes {
            if let Some(parent) = &class.parent {
                if !self.classes.contains_key(parent) {
                    return Err(WysiwymError::InvalidSchema(format!(
                        "class {name} has unknown parent {parent}"
                    )));
                }
                if self.lineage(name).len() <= self.lineage(parent).len() {
                    return Err(WysiwymError::InvalidSchema(format!(
                        "class {name} inherits from itself"
                    )));
                }
            }
            for property in &class.properties {
                if property.max > 0 && property.min > property.max {
                    return Err(WysiwymError::InvalidSchema(format!(
                        "{name}.{}: min {} exceeds max {}",
                        property.name, property.min, property.max
                    )));
                }
            }
        }
        for (name, property) in &self.properties {
            if let Some(inverse) = &property.inverse {
                if !known.contains(inverse.as_str()) {
                    return Err(WysiwymError::InvalidSchema(format!(
                        "property {name} has unknown inverse {inverse}"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Ontology for Schema {
    fn domain_properties(&self, class: &str) -> Vec<PropertyDescriptor> {
        self.effective_properties(class)
            .into_iter()
            .map(|p| PropertyDescriptor {
                name: p.name.clone(),
                range: p.range.clone(),
            })
            .collect()
    }

    fn cardinalities(&self, class: &str) -> BTreeMap<String, Cardinality> {
        self.effective_properties(class)
            .into_iter()
            .map(|p| (p.name.clone(), Cardinality::from_bounds(p.min, p.max)))
            .collect()
    }

    fn submenu(&self, property: &str, class: &str) -> Option<String> {
        self.effective_properties(class)
            .into_iter()
            .find(|p| p.name == property)
            .and_then(|p| p.submenu.clone())
    }

    fn inverse(&self, property: &str) -> Option<String> {
        if let Some(inverse) = self.properties.get(property).and_then(|p| p.inverse.clone()) {
            return Some(inverse);
        }
        self.properties
            .iter()
            .find(|(_, p)| p.inverse.as_deref() == Some(property))
            .map(|(name, _)| name.clone())
    }

    fn is_inverse_functional(&self, property: &str) -> bool {
        self.properties
            .get(property)
            .is_some_and(|p| p.inverse_functional)
    }

    fn natural_language(&self, resource: &str) -> String {
        if let Some(label) = self.labels.get(resource) {
            return label.clone();
        }
        if let Some(label) = self.classes.get(resource).and_then(|c| c.label.clone()) {
            return label;
        }
        if let Some(label) = self.properties.get(resource).and_then(|p| p.label.clone()) {
            return label;
        }
        split_camel_case(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family() -> Schema {
        Schema::new()
            .with_class(
                "Agent",
                ClassSpec::new()
                    .property(ClassProperty::new("hasName").min(1).max(1))
                    .property(ClassProperty::new("hasEmail")),
            )
            .with_class(
                "Person",
                ClassSpec::new()
                    .parent("Agent")
                    .label("person")
                    .property(ClassProperty::new("hasEmail").max(2).submenu("Contact")),
            )
            .with_property("hasChild", PropertySpec::new().inverse("hasParent"))
            .with_property("hasParent", PropertySpec::new().label("is a child of"))
    }

    #[test]
    fn inherits_parent_properties() {
        let schema = family();
        let names: Vec<String> = schema
            .domain_properties("Person")
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["hasEmail", "hasName"]);
        let cards = schema.cardinalities("Person");
        assert_eq!(cards.get("hasEmail"), Some(&Cardinality::from_bounds(0, 2)));
        assert_eq!(schema.submenu("hasEmail", "Person").as_deref(), Some("Contact"));
        assert_eq!(schema.submenu("hasEmail", "Agent"), None);
    }

    #[test]
    fn inverse_is_symmetric() {
        let schema = family();
        assert_eq!(schema.inverse("hasChild").as_deref(), Some("hasParent"));
        assert_eq!(schema.inverse("hasParent").as_deref(), Some("hasChild"));
        assert_eq!(schema.inverse("hasName"), None);
    }

    #[test]
    fn natural_language_prefers_explicit_labels() {
        let schema = family().with_label("ada", "Ada Lovelace");
        assert_eq!(schema.natural_language("ada"), "Ada Lovelace");
        assert_eq!(schema.natural_language("Person"), "person");
        assert_eq!(schema.natural_language("hasParent"), "is a child of");
        assert_eq!(schema.natural_language("hasChild"), "has child");
    }

    #[test]
    fn validate_accepts_consistent_schema() {
        assert_eq!(family().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_bad_bounds_and_references() {
        let bounds = Schema::new().with_class(
            "A",
            ClassSpec::new().property(ClassProperty::new("p").min(3).max(1)),
        );
        assert!(matches!(bounds.validate(), Err(WysiwymError::InvalidSchema(_))));

        let inverse = Schema::new().with_property("p", PropertySpec::new().inverse("q"));
        assert!(matches!(inverse.validate(), Err(WysiwymError::InvalidSchema(_))));

        let parent = Schema::new().with_class("A", ClassSpec::new().parent("B"));
        assert!(matches!(parent.validate(), Err(WysiwymError::InvalidSchema(_))));

        let cycle = Schema::new()
            .with_class("A", ClassSpec::new().parent("B"))
            .with_class("B", ClassSpec::new().parent("A"));
        assert!(matches!(cycle.validate(), Err(WysiwymError::InvalidSchema(_))));
    }

    #[test]
    fn unknown_class_has_no_properties() {
        let schema = family();
        assert!(schema.domain_properties("Spaceship").is_empty());
        assert!(schema.cardinalities("Spaceship").is_empty());
    }
}
