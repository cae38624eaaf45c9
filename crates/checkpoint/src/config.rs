//! Checkpoint configuration.

use serde::Deserialize;

/// Where checkpoints are kept.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckpointStorage {
    /// No checkpoints are written or read.
    Disabled,

    /// JSON files in a directory.
    Filesystem { dir: String },
}

/// Configuration for checkpoint operations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckpointConfig {
    /// Connector instance name, used to key checkpoints.
    pub instance: String,

    /// Storage backend.
    #[serde(default = "default_storage")]
    pub storage: CheckpointStorage,
}

fn default_storage() -> CheckpointStorage {
    CheckpointStorage::Filesystem {
        dir: ".table-sync-checkpoints".to_string(),
    }
}

impl CheckpointConfig {
    /// Create a config with the default filesystem storage.
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            storage: default_storage(),
        }
    }

    /// Create a config that writes checkpoints to `dir`.
    pub fn filesystem(instance: impl Into<String>, dir: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            storage: CheckpointStorage::Filesystem { dir: dir.into() },
        }
    }

    /// Create a config with checkpointing disabled.
    pub fn disabled(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            storage: CheckpointStorage::Disabled,
        }
    }

    /// Check if checkpoints will be written anywhere.
    pub fn is_enabled(&self) -> bool {
        self.storage != CheckpointStorage::Disabled
    }
}
