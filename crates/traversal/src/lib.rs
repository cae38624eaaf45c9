//! Table traversal for table-sync.
//!
//! The source table has no change log, so it is re-read from start to end
//! over and over. Each full pass is a *cycle*:
//!
//! ```text
//! RowSource ──page──▶ Cursor ──snapshots──▶ TraversalIterator ──▶ Synchronizer ──▶ ChangeSink
//!                       │                                           │
//!                  Pagination                               BaselineStore
//!           (offset or key continuation)                 (NONE / ADD / UPDATE,
//!                                                         deletions at cycle end)
//! ```
//!
//! An empty page ends the cycle and rewinds the cursor. A connectivity
//! failure rewinds it too, then surfaces as
//! [`TraversalError::RepositoryUnreachable`]; retrying is up to the caller.
//!
//! Everything here is synchronous. One cursor serves one polling loop.

mod builder;
pub mod config;
pub mod cursor;
pub mod cursor_checkpoint;
mod error;
mod iterator;
mod mode;
mod source;
pub mod sync;

pub use builder::SnapshotBuilder;
pub use config::{PaginationConfig, TraversalConfig, DEFAULT_PAGE_SIZE};
pub use cursor::{Batch, Cursor, Pagination};
pub use cursor_checkpoint::CursorCheckpoint;
pub use error::{BuildError, ConfigError, Result, RowSourceError, TraversalError};
pub use iterator::TraversalIterator;
pub use mode::ExecutionMode;
pub use source::{ContentFetcher, DocumentBuilder, PagePosition, PageRequest, RowSource};
pub use sync::{Change, ChangeSink, CycleStats, PollOutcome, Synchronizer};
