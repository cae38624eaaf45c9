//! Checkpoint storage trait and types
//!
//! This module defines the CheckpointStore trait for backend-agnostic
//! checkpoint storage operations, plus shared types.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::CheckpointFile;

/// Checkpoint identifier for storage
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckpointID {
    /// Checkpoint type (e.g., "cursor")
    pub checkpoint_type: String,
    /// Connector instance the checkpoint belongs to
    pub instance: String,
}

impl CheckpointID {
    pub fn new(checkpoint_type: impl Into<String>, instance: impl Into<String>) -> Self {
        Self {
            checkpoint_type: checkpoint_type.into(),
            instance: instance.into(),
        }
    }

    /// Storage key, safe to use as a file name stem.
    pub fn key(&self) -> String {
        let sanitize = |s: &str| {
            s.chars()
                .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
                .collect::<String>()
        };
        format!(
            "{}_{}",
            sanitize(&self.checkpoint_type),
            sanitize(&self.instance)
        )
    }
}

/// Trait for checkpoint storage operations.
///
/// This trait abstracts the storage backend for checkpoint operations,
/// allowing the same checkpoint logic to work with:
/// - Filesystem storage (`FilesystemStore`)
/// - In-memory storage (`MemoryStore`)
/// - No storage at all (`NullStore`)
///
/// Only the latest checkpoint per id is kept.
pub trait CheckpointStore: Send + Sync {
    /// Store a checkpoint, replacing any earlier one with the same id.
    fn store_checkpoint(&self, id: &CheckpointID, file: &CheckpointFile) -> Result<()>;

    /// Read a checkpoint from the storage backend.
    ///
    /// Returns None if the checkpoint doesn't exist.
    fn read_checkpoint(&self, id: &CheckpointID) -> Result<Option<CheckpointFile>>;
}

impl<T: CheckpointStore + ?Sized> CheckpointStore for &T {
    fn store_checkpoint(&self, id: &CheckpointID, file: &CheckpointFile) -> Result<()> {
        (**self).store_checkpoint(id, file)
    }

    fn read_checkpoint(&self, id: &CheckpointID) -> Result<Option<CheckpointFile>> {
        (**self).read_checkpoint(id)
    }
}

impl<T: CheckpointStore + ?Sized> CheckpointStore for Box<T> {
    fn store_checkpoint(&self, id: &CheckpointID, file: &CheckpointFile) -> Result<()> {
        (**self).store_checkpoint(id, file)
    }

    fn read_checkpoint(&self, id: &CheckpointID) -> Result<Option<CheckpointFile>> {
        (**self).read_checkpoint(id)
    }
}
