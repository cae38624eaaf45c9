//! On-disk envelope around a position.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Checkpoint;

/// A position plus the metadata needed to find and check it again. The
/// position itself is kept as an opaque JSON value, so any store can hold
/// any position type.
///
/// # File Format
///
/// ```json
/// {
///     "checkpoint_type": "cursor",
///     "checkpoint": {
///         "mode": "offset",
///         "skip": 200,
///         "page_size": 100
///     },
///     "instance": "employees",
///     "created_at": "2024-01-01T00:00:00Z"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointFile {
    /// [`Checkpoint::CHECKPOINT_TYPE`] of the wrapped position
    pub checkpoint_type: String,
    pub checkpoint: serde_json::Value,
    pub instance: String,
    pub created_at: DateTime<Utc>,
}

impl CheckpointFile {
    /// Wrap `checkpoint` for `instance`, stamped with the current time.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let file = CheckpointFile::new(&cursor.checkpoint(), "employees")?;
    /// ```
    pub fn new<C: Checkpoint>(checkpoint: &C, instance: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self {
            checkpoint_type: C::CHECKPOINT_TYPE.to_string(),
            checkpoint: serde_json::to_value(checkpoint)?,
            instance: instance.into(),
            created_at: Utc::now(),
        })
    }

    /// Unwrap the position as `C`.
    ///
    /// Fails when the file was written for another position type or the
    /// stored value does not deserialize as `C`.
    pub fn parse<C: Checkpoint>(&self) -> anyhow::Result<C> {
        if self.checkpoint_type != C::CHECKPOINT_TYPE {
            anyhow::bail!(
                "Checkpoint type mismatch: expected '{}', found '{}'",
                C::CHECKPOINT_TYPE,
                self.checkpoint_type
            );
        }
        Ok(serde_json::from_value(self.checkpoint.clone())?)
    }

    pub fn checkpoint_type(&self) -> &str {
        &self.checkpoint_type
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
