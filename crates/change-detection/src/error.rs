//! Error types for change detection.

use docid::{DocId, DocIdError};
use thiserror::Error;

/// Errors that can occur while comparing, persisting or materializing
/// snapshots.
#[derive(Error, Debug)]
pub enum ChangeDetectionError {
    /// A persisted snapshot string is not in the canonical format.
    #[error("Malformed snapshot '{text}': {reason}")]
    MalformedSnapshot { text: String, reason: String },

    /// The identity inside a persisted snapshot does not decode.
    #[error("Invalid snapshot identity: {0}")]
    Identity(#[from] DocIdError),

    /// A reference snapshot for a different row was supplied.
    #[error("Reference snapshot '{reference}' does not belong to row '{live}'")]
    IdentityMismatch { live: DocId, reference: DocId },

    /// A historical snapshot was asked to produce a document.
    #[error("Historical snapshot '{0}' cannot materialize a document")]
    HistoricalMaterialize(DocId),

    /// The baseline store failed.
    #[error("Baseline store error: {0}")]
    Baseline(String),
}

/// Result type alias for change-detection operations.
pub type Result<T> = std::result::Result<T, ChangeDetectionError>;
