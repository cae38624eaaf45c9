//! Error types for table traversal.

use change_detection::ChangeDetectionError;
use sync_core::ValueError;
use thiserror::Error;

/// Errors surfaced by the cursor, the iterator and the poll driver.
#[derive(Error, Debug)]
pub enum TraversalError {
    /// The source could not be reached. The cursor has already been reset
    /// to the start of its cycle.
    #[error("Repository unreachable: {0}")]
    RepositoryUnreachable(String),

    /// The source reached the repository but the query failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// `next()` was called with nothing buffered.
    #[error("End of batch")]
    EndOfBatch,

    /// A key-continuation batch had no usable value in the key column.
    #[error("No row in the batch has a value for key column '{0}'")]
    MissingContinuationKey(String),

    /// A checkpoint cannot be applied to this cursor.
    #[error("Cannot restore {checkpoint} checkpoint into {pagination} cursor")]
    CheckpointMismatch {
        checkpoint: &'static str,
        pagination: &'static str,
    },

    /// Comparing or recording a snapshot failed.
    #[error("Change detection error: {0}")]
    ChangeDetection(#[from] ChangeDetectionError),

    /// The change sink refused a change.
    #[error("Change sink error: {0}")]
    Sink(String),

    /// Saving or loading the cursor checkpoint failed.
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),
}

/// Errors reported by a [`crate::RowSource`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowSourceError {
    /// Connection lost, refused or timed out.
    #[error("Connectivity failure: {0}")]
    Connectivity(String),

    /// Any other query failure.
    #[error("Query failure: {0}")]
    Query(String),
}

/// Errors raised while turning one row into a snapshot. These only ever
/// cost the row they happened on.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Cannot identify row: {0}")]
    Snapshot(#[from] ChangeDetectionError),

    #[error("Failed to fetch content from '{url}': {reason}")]
    Fetch { url: String, reason: String },

    #[error("{0}")]
    Invalid(String),
}

/// Errors in traversal configuration, reported before any row is read.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("At least one primary key column is required")]
    NoPrimaryKeys,

    #[error("Primary key names must not be blank")]
    BlankPrimaryKey,

    #[error("Page size must be greater than zero")]
    ZeroPageSize,

    #[error("Key-continuation pagination requires a key column")]
    MissingKeyColumn,

    #[error("Invalid minimum key: {0}")]
    InvalidMinKey(#[from] ValueError),

    #[error("Only one of large_object_column and url_column may be set")]
    ConflictingContentColumns,
}

/// Result type alias for traversal operations.
pub type Result<T> = std::result::Result<T, TraversalError>;
