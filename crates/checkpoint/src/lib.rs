//! Checkpoint management for table-sync
//!
//! Provides storage-agnostic checkpoint handling so a traversal can resume
//! where it left off after the host process restarts.
//!
//! A position type implements [`Checkpoint`]. [`CheckpointManager`] wraps
//! it in a [`CheckpointFile`] tagged with the position type and the
//! connector instance, and hands it to a [`CheckpointStore`]. Reading back
//! checks the tag, so a file written for another position type is refused.
//!
//! ## Stores
//!
//! - `FilesystemStore` - One JSON file per connector instance
//! - `MemoryStore` - In-process map, for tests and ephemeral hosts
//! - `NullStore` - Discards writes, never has a checkpoint

mod config;
mod file;
mod filesystem;
mod manager;
mod memory;
pub mod store;


pub use config::{CheckpointConfig, CheckpointStorage};
pub use file::CheckpointFile;
pub use filesystem::FilesystemStore;
pub use manager::CheckpointManager;
pub use memory::{MemoryStore, NullStore};
pub use store::{CheckpointID, CheckpointStore};

/// A resumable position.
///
/// The position keeps its own serde layout inside the checkpoint file and
/// has a compact text form for flags and log lines.
///
/// # Example
///
/// ```rust
/// use checkpoint::Checkpoint;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct RowOffset {
///     pub skip: u64,
/// }
///
/// impl Checkpoint for RowOffset {
///     const CHECKPOINT_TYPE: &'static str = "row-offset";
///
///     fn to_cli_string(&self) -> String {
///         self.skip.to_string()
///     }
///
///     fn from_cli_string(s: &str) -> anyhow::Result<Self> {
///         Ok(Self { skip: s.parse()? })
///     }
/// }
/// ```
pub trait Checkpoint: serde::Serialize + for<'de> serde::Deserialize<'de> + Clone {
    /// Tag stored in checkpoint files and checked on load (e.g. "cursor").
    const CHECKPOINT_TYPE: &'static str;

    /// Text form, e.g. for a `--resume-from` flag. Must round-trip through
    /// [`Checkpoint::from_cli_string`].
    fn to_cli_string(&self) -> String;

    /// Parse the text form produced by [`Checkpoint::to_cli_string`].
    fn from_cli_string(s: &str) -> anyhow::Result<Self>
    where
        Self: Sized;
}
