//! # wysiwym-core
//!
//! The graph and anchor engine for WYSIWYM authoring - THE LOGIC.
//!
//! A user builds a knowledge graph one relation at a time while the text
//! generated from it shows clickable anchors. This crate holds everything
//! below the text:
//! - a labeled graph with per-graph identifier allocation
//! - content nodes (the semantic graph) and syntax nodes (dependency trees)
//! - anchors: compulsory, optional and removable relation menus
//! - the clone protocol behind undo, redo and session branching
//! - the referring-expression resolver
//!
//! ## Architectural Constraints
//!
//! - Has NO async, NO I/O (pure Rust)
//! - Deterministic: BTreeMap only, no randomness
//! - Ontology access goes through the [`Ontology`] trait; [`Schema`] is
//!   the in-memory implementation the app loads from TOML

// =============================================================================
// MODULES
// =============================================================================

pub mod anchor;
pub mod content;
pub mod graph;
pub mod ontology;
pub mod primitives;
pub mod refer;
pub mod schema;
pub mod session;
pub mod syntax;
pub mod types;
pub mod versioning;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{EdgeIndex, EdgeKey, Id, IdAllocator, WysiwymError};

// =============================================================================
// RE-EXPORTS: Graph Layers
// =============================================================================

pub use content::{
    ActionMembers, Address, Combinator, ContentEdge, ContentGraph, ContentNode, ContentValue,
    DateKind, DateParts, DateValue, EdgeKind, QueryValue, RealizeState, TypedValue, ValueKind,
    Versioned,
};
pub use graph::{Edge, Graph, Node};
pub use syntax::{
    Category, Morphology, Number, Person, Referent, SyntaxEdge, SyntaxGraph, SyntaxKind,
    SyntaxNode, Tense, Voice,
};

// =============================================================================
// RE-EXPORTS: Anchor Engine
// =============================================================================

pub use anchor::{
    Anchor, AnchorColour, AnchorMenus, Menu, MenuItem, RemovableItem, RemovableMenu,
    candidate_targets, check_addition, relation_count,
};
pub use ontology::{Cardinality, Ontology, PropertyDescriptor};
pub use schema::{ClassProperty, ClassSpec, PropertySpec, Schema};

// =============================================================================
// RE-EXPORTS: Versioning, Sessions, Discourse
// =============================================================================

pub use refer::{Designation, ReferringExpressionResolver};
pub use session::{Session, SessionKind};
pub use versioning::{History, clone_subgraph, snapshot, snapshot_with_map};
