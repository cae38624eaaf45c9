//! Error types for sync-core.

use thiserror::Error;

use crate::ValueKind;

/// Errors that can occur when parsing a [`crate::RowValue`] from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The text is not a valid literal of the requested kind.
    #[error("Invalid {kind} literal: '{text}'")]
    InvalidLiteral { kind: ValueKind, text: String },

    /// The kind name is not one of the known value kinds.
    #[error("Unknown value kind: {0}")]
    UnknownKind(String),

    /// The kind has no textual literal form (e.g. bytes).
    #[error("Value kind {0} cannot be parsed from text")]
    Unparseable(ValueKind),
}

/// Result type alias for sync-core operations.
pub type Result<T> = std::result::Result<T, ValueError>;
