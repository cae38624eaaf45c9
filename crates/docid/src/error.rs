//! Error types for the docid crate.

use thiserror::Error;

/// Errors that can occur while encoding or decoding row identities.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocIdError {
    /// The primary-key list or the row is empty.
    #[error("Primary key list and row must both be non-empty")]
    EmptyInput,

    /// A primary-key name matched no row column.
    #[error("Primary key column '{0}' not found in row")]
    MissingKey(String),

    /// A token or legacy identifier could not be decoded.
    #[error("Failed to decode identifier '{token}': {reason}")]
    Decode { token: String, reason: String },
}

impl DocIdError {
    pub(crate) fn decode(token: &str, reason: impl Into<String>) -> Self {
        Self::Decode {
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for docid operations.
pub type Result<T> = std::result::Result<T, DocIdError>;
