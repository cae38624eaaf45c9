//! Generic manager for checkpoint operations.

use crate::{
    store::CheckpointStore, Checkpoint, CheckpointConfig, CheckpointFile, CheckpointID,
    CheckpointStorage, FilesystemStore, NullStore,
};

/// Manager for saving and loading checkpoints of one connector instance.
///
/// # Example
///
/// ```rust,ignore
/// use checkpoint::{CheckpointConfig, CheckpointManager};
///
/// let manager = CheckpointManager::from_config(&CheckpointConfig::filesystem("employees", "/tmp/cp"));
///
/// // Save a checkpoint
/// manager.emit_checkpoint(&cursor.checkpoint())?;
///
/// // Load a checkpoint
/// let loaded: Option<CursorCheckpoint> = manager.read_checkpoint()?;
/// ```
pub struct CheckpointManager<S: CheckpointStore = Box<dyn CheckpointStore>> {
    instance: String,
    store: S,
}

impl CheckpointManager {
    /// Build a manager with the store selected by `config`.
    pub fn from_config(config: &CheckpointConfig) -> Self {
        let store: Box<dyn CheckpointStore> = match &config.storage {
            CheckpointStorage::Disabled => Box::new(NullStore),
            CheckpointStorage::Filesystem { dir } => Box::new(FilesystemStore::new(dir)),
        };
        Self::new(config.instance.clone(), store)
    }
}

impl<S: CheckpointStore> CheckpointManager<S> {
    /// Create a new manager over an explicit store.
    pub fn new(instance: impl Into<String>, store: S) -> Self {
        Self {
            instance: instance.into(),
            store,
        }
    }

    /// Get the connector instance name.
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Get a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Save a checkpoint, replacing the previous one for this instance.
    pub fn emit_checkpoint<C: Checkpoint>(&self, checkpoint: &C) -> anyhow::Result<()> {
        let id = CheckpointID::new(C::CHECKPOINT_TYPE, &self.instance);
        let file = CheckpointFile::new(checkpoint, &self.instance)?;
        self.store.store_checkpoint(&id, &file)?;

        tracing::debug!(
            "Emitted {} checkpoint for '{}': {}",
            C::CHECKPOINT_TYPE,
            self.instance,
            checkpoint.to_cli_string()
        );
        Ok(())
    }

    /// Load the latest checkpoint for this instance, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The store fails to read
    /// - The stored checkpoint type doesn't match `C::CHECKPOINT_TYPE`
    /// - Failed to deserialize checkpoint data
    pub fn read_checkpoint<C: Checkpoint>(&self) -> anyhow::Result<Option<C>> {
        let id = CheckpointID::new(C::CHECKPOINT_TYPE, &self.instance);
        match self.store.read_checkpoint(&id)? {
            Some(file) => Ok(Some(file.parse()?)),
            None => Ok(None),
        }
    }
}
