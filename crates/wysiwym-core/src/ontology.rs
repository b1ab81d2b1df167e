//! # Ontology Queries
//!
//! The engine never owns class or property metadata. It asks an
//! [`Ontology`] implementation, one class at a time.

use crate::primitives::NO_SUBMENU;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A property applicable to a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    /// Class or datatype of the property's values.
    #[serde(default)]
    pub range: Option<String>,
}

impl PropertyDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            range: None,
        }
    }
}

/// Minimum and maximum number of bindings of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cardinality {
    pub min: u32,
    /// `None` means unbounded.
    pub max: Option<u32>,
}

impl Cardinality {
    /// Build from raw bounds where a maximum of 0 means unbounded.
    #[must_use]
    pub fn from_bounds(min: u32, max: u32) -> Self {
        Self {
            min,
            max: (max > 0).then_some(max),
        }
    }

    /// True while `count` has not reached the minimum.
    #[must_use]
    pub fn requires_more(&self, count: usize) -> bool {
        (count as u64) < u64::from(self.min)
    }

    /// True while another binding is allowed.
    #[must_use]
    pub fn admits_more(&self, count: usize) -> bool {
        self.max.is_none_or(|max| (count as u64) < u64::from(max))
    }
}

/// Query capability over class and property metadata.
pub trait Ontology {
    /// Properties applicable to `class`, in schema order.
    fn domain_properties(&self, class: &str) -> Vec<PropertyDescriptor>;

    /// Cardinality of each property of `class`. Missing entries are `0..`.
    fn cardinalities(&self, class: &str) -> BTreeMap<String, Cardinality>;

    /// Submenu grouping `property` on `class`; `"none"` or `None` for ungrouped.
    fn submenu(&self, property: &str, class: &str) -> Option<String>;

    /// The inverse of `property`, if it has one.
    fn inverse(&self, property: &str) -> Option<String>;

    /// Whether each value of `property` may have at most one subject.
    fn is_inverse_functional(&self, property: &str) -> bool;

    /// Natural-language expression of a class, property or individual.
    fn natural_language(&self, resource: &str) -> String;
}

/// Normalise a submenu answer: `"none"` and empty names mean ungrouped.
#[must_use]
pub fn submenu_group(name: Option<String>) -> Option<String> {
    name.filter(|s| !s.is_empty() && s != NO_SUBMENU)
}

/// Split a camelCase resource name into lowercase words.
///
/// `hasName` becomes `has name`; `URLAddress` becomes `url address`.
#[must_use]
pub fn split_camel_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' {
            if !out.ends_with(' ') && !out.is_empty() {
                out.push(' ');
            }
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_lower);
            if boundary && !out.ends_with(' ') {
                out.push(' ');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}
