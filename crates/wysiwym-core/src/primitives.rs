//! # Innate Primitives
//!
//! Hardcoded constants shared across the engine.
//!
//! These values are compiled into the binary and are immutable at runtime.

/// Number of letters available for each identifier position.
pub const ALPHABET_SIZE: u32 = 26;

/// Number of letters in an identifier.
pub const ID_LENGTH: usize = 3;

/// Size of the identifier space (26³ codes, `aaa` .. `zzz`).
pub const ID_SPACE: u32 = ALPHABET_SIZE * ALPHABET_SIZE * ALPHABET_SIZE;

/// Submenu name the ontology uses for "no submenu".
pub const NO_SUBMENU: &str = "none";

/// Dependency label of an edge from a coordination to one of its members.
pub const CONJUNCT_RELATION: &str = "conjunct";

/// Default number of snapshots kept on each of the undo and redo stacks.
pub const DEFAULT_HISTORY_DEPTH: usize = 64;

/// Upper bound on the history depth accepted from configuration.
pub const MAX_HISTORY_DEPTH: usize = 1024;

/// Pronoun used for a singular topic without an explicit pronoun.
pub const DEFAULT_SINGULAR_PRONOUN: &str = "it";

/// Pronoun used for a plural topic without an explicit pronoun.
pub const DEFAULT_PLURAL_PRONOUN: &str = "they";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_space_is_alphabet_cubed() {
        assert_eq!(ID_SPACE, 17_576);
    }

    #[test]
    fn history_default_within_bound() {
        assert!(DEFAULT_HISTORY_DEPTH <= MAX_HISTORY_DEPTH);
    }
}
