//! # Core Type Definitions
//!
//! This module contains the types shared by every layer of the engine:
//! - Graph identifiers (`Id`, `EdgeIndex`, `EdgeKey`)
//! - The per-graph identifier allocator (`IdAllocator`)
//! - Error types (`WysiwymError`)
//!
//! ## Identifier Space
//!
//! Identifiers are three-letter base-26 codes (`aaa` .. `zzz`). The space is
//! deliberately small and bounded: running out of codes is an error, never a
//! reason to wrap around and reuse a code.

use crate::primitives::{ALPHABET_SIZE, ID_LENGTH, ID_SPACE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// A three-letter graph identifier, shared by nodes and edges of one graph.
///
/// Stored as its base-26 index so ordering is the same as the alphabetical
/// ordering of the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Id(u16);

impl Id {
    /// Build an identifier from its index in the code space.
    ///
    /// Returns `None` when `index >= ID_SPACE`.
    #[must_use]
    pub const fn from_index(index: u32) -> Option<Self> {
        if index < ID_SPACE {
            Some(Self(index as u16))
        } else {
            None
        }
    }

    /// Position of this identifier in the code space.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// The three letters of the code.
    #[must_use]
    pub fn letters(self) -> [char; ID_LENGTH] {
        let mut rest = self.index();
        let mut out = ['a'; ID_LENGTH];
        for slot in out.iter_mut().rev() {
            let digit = (rest % ALPHABET_SIZE) as u8;
            *slot = char::from(b'a' + digit);
            rest /= ALPHABET_SIZE;
        }
        out
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.letters() {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl FromStr for Id {
    type Err = WysiwymError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != ID_LENGTH {
            return Err(WysiwymError::InvalidId(s.to_string()));
        }
        let mut index = 0u32;
        for &b in bytes {
            if !b.is_ascii_lowercase() {
                return Err(WysiwymError::InvalidId(s.to_string()));
            }
            index = index * ALPHABET_SIZE + u32::from(b - b'a');
        }
        Self::from_index(index).ok_or_else(|| WysiwymError::InvalidId(s.to_string()))
    }
}

impl TryFrom<String> for Id {
    type Error = WysiwymError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Id> for String {
    fn from(id: Id) -> Self {
        id.to_string()
    }
}

/// Stable handle of an edge inside one graph.
///
/// Unlike [`Id`], every edge has an index from the moment it is attached,
/// even before it is given a permanent identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeIndex(pub u64);

/// Key under which an edge is indexed on its endpoints.
///
/// Edges are keyed by identifier once they have one, and by label until then.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EdgeKey {
    /// The edge has a permanent identifier.
    Id(Id),
    /// The edge is still anonymous; its label is the key.
    Label(String),
}

impl EdgeKey {
    /// Key for an edge with the given (optional) identifier and label.
    #[must_use]
    pub fn for_edge(id: Option<Id>, label: &str) -> Self {
        match id {
            Some(id) => Self::Id(id),
            None => Self::Label(label.to_string()),
        }
    }
}

// =============================================================================
// IDENTIFIER ALLOCATOR
// =============================================================================

/// Cursor over the identifier space, owned by exactly one graph.
///
/// The cursor advances before each code is issued, so index 0 (`aaa`) is
/// never produced by allocation. Once the cursor has passed the last code
/// the allocator stays exhausted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdAllocator {
    cursor: u32,
}

impl IdAllocator {
    /// Create an allocator positioned at the start of the space.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the last code considered by this allocator.
    #[must_use]
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    /// Number of codes this allocator can still consider.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        ID_SPACE.saturating_sub(self.cursor.saturating_add(1))
    }

    /// Issue the next identifier for which `in_use` returns false.
    pub fn next_free(&mut self, in_use: impl Fn(Id) -> bool) -> Result<Id, WysiwymError> {
        loop {
            let next = self.cursor.saturating_add(1);
            let Some(id) = Id::from_index(next) else {
                self.cursor = ID_SPACE;
                return Err(WysiwymError::IdSpaceExhausted);
            };
            self.cursor = next;
            if !in_use(id) {
                return Ok(id);
            }
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the WYSIWYM engine.
///
/// - No silent failures
/// - Use `Result<T, WysiwymError>` for fallible operations
/// - Failed mutations leave the graph unchanged
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WysiwymError {
    /// The identifier allocator of a graph has used up the code space.
    #[error("Identifier space exhausted")]
    IdSpaceExhausted,

    /// The node has no compulsory and no optional relations left.
    #[error("Node {0} needs no further relations")]
    NotAnAnchor(Id),

    /// A second anonymous edge with an already present label was attached.
    #[error("Node {node} already has an unidentified '{label}' edge")]
    DuplicateRelationBinding { node: Id, label: String },

    /// Adding the relation would exceed a maximum or an inverse-functional binding.
    #[error("Adding '{relation}' to node {node} violates its cardinality")]
    CardinalityViolation { node: Id, relation: String },

    /// The requested node was not found in the graph.
    #[error("Node not found: {0}")]
    NodeNotFound(Id),

    /// The requested edge was not found in the graph.
    #[error("Edge not found: {0}")]
    EdgeNotFound(String),

    /// An explicit identifier is already taken by another node or edge.
    #[error("Identifier already in use: {0}")]
    IdInUse(Id),

    /// A node cannot be removed while edges still reference it.
    #[error("Node {0} still has attached edges")]
    NodeStillReferenced(Id),

    /// A string could not be parsed as an identifier.
    #[error("Invalid identifier: {0:?}")]
    InvalidId(String),

    /// The syntax node is not awaiting referring-expression resolution.
    #[error("Syntax node {0} is not undetermined")]
    NotUndetermined(Id),

    /// The element came from storage or is otherwise protected from removal.
    #[error("Not removable: {0}")]
    NotRemovable(String),

    /// A value of the wrong kind was written to a content node.
    #[error("Node {node} holds a {expected} value")]
    ValueKindMismatch { node: Id, expected: &'static str },

    /// A value is outside the range its field accepts.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// The static schema is internally inconsistent.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// The undo history is empty.
    #[error("Nothing to undo")]
    NothingToUndo,

    /// The redo history is empty.
    #[error("Nothing to redo")]
    NothingToRedo,
}

// =============================================================================
// TESTS
// =============================================================================
