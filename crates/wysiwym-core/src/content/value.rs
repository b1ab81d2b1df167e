//! Value kinds carried by content nodes.

use super::address::Address;
use super::date::DateValue;
use super::query::QueryValue;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// SINGLE-LEVEL UNDO
// =============================================================================

/// A leaf value that remembers the value it replaced.
///
/// Only one previous value is kept. Reverting swaps current and previous,
/// so a second revert restores the edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versioned<T> {
    current: Option<T>,
    previous: Option<T>,
}

impl<T> Default for Versioned<T> {
    fn default() -> Self {
        Self {
            current: None,
            previous: None,
        }
    }
}

impl<T> Versioned<T> {
    /// A value with no history.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            current: Some(value),
            previous: None,
        }
    }

    /// A slot that has not been filled yet.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Replace the value, keeping the old one as previous.
    pub fn set(&mut self, value: T) {
        self.previous = self.current.replace(value);
    }

    /// The current value.
    #[must_use]
    pub fn new_value(&self) -> Option<&T> {
        self.current.as_ref()
    }

    /// The value replaced by the last `set`.
    #[must_use]
    pub fn old_value(&self) -> Option<&T> {
        self.previous.as_ref()
    }

    /// Swap current and previous. Returns false when there is nothing to revert.
    pub fn revert(&mut self) -> bool {
        if self.previous.is_none() {
            return false;
        }
        std::mem::swap(&mut self.current, &mut self.previous);
        true
    }
}

impl<T: Clone> Versioned<T> {
    pub(crate) fn duplicate(&self) -> Self {
        Self {
            current: self.current.clone(),
            previous: self.previous.clone(),
        }
    }
}

// =============================================================================
// VALUE KINDS
// =============================================================================

/// Tag of a [`ContentValue`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Resource,
    String,
    Int,
    Double,
    Boolean,
    Date,
    Address,
    Query,
}

impl ValueKind {
    /// Lowercase name of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Resource => "resource",
            ValueKind::String => "string",
            ValueKind::Int => "int",
            ValueKind::Double => "double",
            ValueKind::Boolean => "boolean",
            ValueKind::Date => "date",
            ValueKind::Address => "address",
            ValueKind::Query => "query",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of content node kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentValue {
    /// An ontology resource; its class is the node label.
    Resource,
    String(Versioned<String>),
    Int(Versioned<i64>),
    Double(Versioned<f64>),
    Boolean(Versioned<bool>),
    Date(DateValue),
    Address(Address),
    /// Aggregate of typed values under a boolean combinator.
    Query(QueryValue),
}

impl ContentValue {
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(Versioned::new(value.into()))
    }

    #[must_use]
    pub fn int(value: i64) -> Self {
        Self::Int(Versioned::new(value))
    }

    #[must_use]
    pub fn double(value: f64) -> Self {
        Self::Double(Versioned::new(value))
    }

    #[must_use]
    pub fn boolean(value: bool) -> Self {
        Self::Boolean(Versioned::new(value))
    }

    /// The variant tag.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            ContentValue::Resource => ValueKind::Resource,
            ContentValue::String(_) => ValueKind::String,
            ContentValue::Int(_) => ValueKind::Int,
            ContentValue::Double(_) => ValueKind::Double,
            ContentValue::Boolean(_) => ValueKind::Boolean,
            ContentValue::Date(_) => ValueKind::Date,
            ContentValue::Address(_) => ValueKind::Address,
            ContentValue::Query(_) => ValueKind::Query,
        }
    }

    /// True for every kind except resources.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        !matches!(self, ContentValue::Resource)
    }

    /// Text form of the value, `None` for resources and empty slots.
    #[must_use]
    pub fn describe(&self) -> Option<String> {
        match self {
            ContentValue::Resource => None,
            ContentValue::String(v) => v.new_value().cloned(),
            ContentValue::Int(v) => v.new_value().map(i64::to_string),
            ContentValue::Double(v) => v.new_value().map(f64::to_string),
            ContentValue::Boolean(v) => v
                .new_value()
                .map(|b| if *b { "yes" } else { "no" }.to_string()),
            ContentValue::Date(d) => d.describe(),
            ContentValue::Address(a) => a.describe(),
            ContentValue::Query(q) => q.describe(),
        }
    }

    /// Labels this value contributes to a removable-relation menu.
    ///
    /// An aggregate contributes every member; other leaves their description.
    #[must_use]
    pub fn member_labels(&self) -> Vec<String> {
        match self {
            ContentValue::Query(q) => q.labels(),
            other => other.describe().into_iter().collect(),
        }
    }

    /// Undo the last edit of a single-valued leaf.
    pub fn revert(&mut self) -> bool {
        match self {
            ContentValue::String(v) => v.revert(),
            ContentValue::Int(v) => v.revert(),
            ContentValue::Double(v) => v.revert(),
            ContentValue::Boolean(v) => v.revert(),
            ContentValue::Resource
            | ContentValue::Date(_)
            | ContentValue::Address(_)
            | ContentValue::Query(_) => false,
        }
    }

    /// Same-kind copy of the value, including the previous value of leaves.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        match self {
            ContentValue::Resource => ContentValue::Resource,
            ContentValue::String(v) => ContentValue::String(v.duplicate()),
            ContentValue::Int(v) => ContentValue::Int(v.duplicate()),
            ContentValue::Double(v) => ContentValue::Double(v.duplicate()),
            ContentValue::Boolean(v) => ContentValue::Boolean(v.duplicate()),
            ContentValue::Date(d) => ContentValue::Date(*d),
            ContentValue::Address(a) => ContentValue::Address(a.clone()),
            ContentValue::Query(q) => ContentValue::Query(q.clone()),
        }
    }
}

// =============================================================================
// REALIZE STATE
// =============================================================================

/// How a content node entered the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RealizeState {
    /// Created by the user in this session.
    #[default]
    New,
    /// Retrieved from storage and shown.
    Shown,
    /// Retrieved, nothing further known about it.
    NoInfo,
    /// Retrieved and hidden from the text.
    Hidden,
    /// Retrieved, but not all of its data has been fetched.
    Incomplete,
}

impl RealizeState {
    /// True for every state that means "came from storage".
    #[must_use]
    pub fn is_retrieved(&self) -> bool {
        !matches!(self, RealizeState::New)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RealizeState::New => "new",
            RealizeState::Shown => "shown",
            RealizeState::NoInfo => "no_info",
            RealizeState::Hidden => "hidden",
            RealizeState::Incomplete => "incomplete",
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versioned_keeps_one_previous_value() {
        let mut v = Versioned::new(1);
        v.set(2);
        v.set(3);
        assert_eq!(v.new_value(), Some(&3));
        assert_eq!(v.old_value(), Some(&2));

        assert!(v.revert());
        assert_eq!(v.new_value(), Some(&2));
        assert_eq!(v.old_value(), Some(&3));
    }

    #[test]
    fn revert_without_history_is_noop() {
        let mut v = ContentValue::string("Apollo");
        assert!(!v.revert());
        assert_eq!(v.describe().as_deref(), Some("Apollo"));
        assert!(!ContentValue::Resource.revert());
    }

    #[test]
    fn describe_leaves() {
        assert_eq!(ContentValue::int(42).describe().as_deref(), Some("42"));
        assert_eq!(ContentValue::boolean(true).describe().as_deref(), Some("yes"));
        assert_eq!(ContentValue::Resource.describe(), None);
    }

    #[test]
    fn duplicate_preserves_kind_and_history() {
        let mut original = ContentValue::string("first");
        if let ContentValue::String(v) = &mut original {
            v.set("second".into());
        }
        let copy = original.duplicate();
        assert_eq!(copy, original);
        assert_eq!(copy.kind(), ValueKind::String);
    }

    #[test]
    fn retrieved_states() {
        assert!(!RealizeState::New.is_retrieved());
        assert!(RealizeState::Incomplete.is_retrieved());
        assert!(RealizeState::Hidden.is_retrieved());
    }
}
