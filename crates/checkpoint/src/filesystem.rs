//! Filesystem-based checkpoint storage implementation.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::store::{CheckpointID, CheckpointStore};
use crate::CheckpointFile;

/// Filesystem implementation of CheckpointStore trait.
///
/// Stores one `checkpoint_{key}.json` file per id in a directory. Writes go
/// to a temporary file first and are renamed into place, so a crash never
/// leaves a half-written checkpoint behind.
pub struct FilesystemStore {
    dir: PathBuf,
}

impl FilesystemStore {
    /// Create a new FilesystemStore with the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Get the directory path.
    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    fn path_for(&self, id: &CheckpointID) -> PathBuf {
        self.dir.join(format!("checkpoint_{}.json", id.key()))
    }
}

impl CheckpointStore for FilesystemStore {
    fn store_checkpoint(&self, id: &CheckpointID, file: &CheckpointFile) -> Result<()> {
        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!(
                "Failed to create checkpoint directory {}",
                self.dir.display()
            )
        })?;

        let path = self.path_for(id);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(file)?)?;
        std::fs::rename(&tmp, &path)?;

        tracing::debug!("Stored checkpoint to {}", path.display());
        Ok(())
    }

    fn read_checkpoint(&self, id: &CheckpointID) -> Result<Option<CheckpointFile>> {
        let path = self.path_for(id);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read checkpoint {}", path.display()))?;
        let file = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse checkpoint {}", path.display()))?;
        Ok(Some(file))
    }
}
