//! In-process checkpoint stores.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::store::{CheckpointID, CheckpointStore};
use crate::CheckpointFile;

/// Keeps checkpoints in a map for the lifetime of the process.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<CheckpointID, CheckpointFile>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CheckpointStore for MemoryStore {
    fn store_checkpoint(&self, id: &CheckpointID, file: &CheckpointFile) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Checkpoint store lock poisoned"))?;
        entries.insert(id.clone(), file.clone());
        Ok(())
    }

    fn read_checkpoint(&self, id: &CheckpointID) -> Result<Option<CheckpointFile>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Checkpoint store lock poisoned"))?;
        Ok(entries.get(id).cloned())
    }
}

/// A store that discards every checkpoint.
///
/// Used when checkpointing is disabled so callers need no `Option` juggling.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

impl CheckpointStore for NullStore {
    fn store_checkpoint(&self, _id: &CheckpointID, _file: &CheckpointFile) -> Result<()> {
        Ok(())
    }

    fn read_checkpoint(&self, _id: &CheckpointID) -> Result<Option<CheckpointFile>> {
        Ok(None)
    }
}
