//! table-sync
//!
//! Incrementally mirrors the rows of a relational table into a search index
//! when the source offers no change log. The table is re-read in pages,
//! every row is reduced to an identity and a checksum, and comparing those
//! against the previous read yields adds, updates and deletions.
//!
//! # Crates
//!
//! - [`docid`] - composite primary-key identity encoding
//! - [`change_detection`] - snapshots, NONE/ADD/UPDATE decisions, deletion sweep
//! - [`traversal`] - pagination cursor, iterator and the poll-cycle driver
//! - [`checkpoint`] - cursor positions persisted across restarts
//!
//! # Embedding
//!
//! A host supplies the query side ([`RowSource`]), the index side
//! ([`ChangeSink`]) and MIME detection, then polls:
//!
//! ```rust
//! use table_sync::{
//!     build_synchronizer, Change, ChangeSink, Deletion, MemoryBaseline, PagePosition,
//!     PageRequest, PollOutcome, Row, RowSourceError, RowValue, TraversalConfig,
//! };
//!
//! struct Print;
//!
//! impl ChangeSink for Print {
//!     fn apply(&mut self, change: Change) -> anyhow::Result<()> {
//!         println!("{} {}", change.kind, change.document.docid);
//!         Ok(())
//!     }
//!     fn delete(&mut self, deletion: &Deletion) -> anyhow::Result<()> {
//!         println!("DELETE {}", deletion.docid);
//!         Ok(())
//!     }
//! }
//!
//! let rows = vec![Row::new().with("id", RowValue::Int32(1)).with("name", "a")];
//! let source = move |request: &PageRequest| -> Result<Vec<Row>, RowSourceError> {
//!     let skip = match request.position {
//!         PagePosition::Offset(skip) => skip as usize,
//!         PagePosition::After { .. } => 0,
//!     };
//!     Ok(rows.iter().skip(skip).take(request.page_size).cloned().collect())
//! };
//!
//! let config = TraversalConfig::new(["id"]);
//! let mut sync = build_synchronizer(&config, source, MemoryBaseline::new(), |_: &[u8]| {
//!     "text/plain".to_string()
//! })
//! .unwrap();
//!
//! while let PollOutcome::Batch { .. } = sync.poll(&mut Print).unwrap() {}
//! ```

use anyhow::{Context, Result};
use checkpoint::CheckpointManager;
use tracing::info;

pub mod opts;

pub use change_detection::{
    decide, AnySnapshot, BaselineStore, ChangeKind, ContentOutcome, ContentPolicy, Decision,
    Deletion, DeletionSweep, Document, Historical, Live, MemoryBaseline, MimeDetector,
    RowChecksum, Sha256Checksummer, Snapshot,
};
pub use docid::{decode, encode, legacy_adapt, DocId, DocIdError};
pub use opts::TraversalOpts;
pub use sync_core::{Row, RowValue, ValueKind};
pub use traversal::{
    Batch, BuildError, Change, ChangeSink, ConfigError, Cursor, CursorCheckpoint, CycleStats,
    DocumentBuilder, ExecutionMode, PagePosition, PageRequest, Pagination, PollOutcome,
    RowSource, RowSourceError, SnapshotBuilder, Synchronizer, TraversalConfig, TraversalError,
    TraversalIterator,
};

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing if a global subscriber is already set.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Wire a [`Synchronizer`] from configuration.
///
/// Checkpoints are enabled when the configuration names a checkpoint
/// directory, and the last saved position is restored. URL mode needs a
/// content fetcher; hosts using it assemble the [`SnapshotBuilder`] with
/// [`SnapshotBuilder::with_fetcher`] and the synchronizer by hand.
pub fn build_synchronizer<R, S>(
    config: &TraversalConfig,
    source: R,
    baseline: S,
    detector: impl MimeDetector + 'static,
) -> Result<Synchronizer<R, SnapshotBuilder, S>>
where
    R: RowSource,
    S: BaselineStore,
{
    config.validate().context("Invalid traversal configuration")?;
    let pagination = config.initial_pagination()?;
    let builder = SnapshotBuilder::from_config(config);
    info!(
        "Traversing in {} mode with {} pagination, {} rows per batch",
        builder.mode(),
        pagination.kind(),
        pagination.page_size()
    );

    let cursor = Cursor::new(source, builder, pagination);
    let mut sync = Synchronizer::new(
        TraversalIterator::new(cursor),
        baseline,
        config.content.clone(),
        detector,
    );

    let checkpoints = config.checkpoint_config();
    if checkpoints.is_enabled() {
        sync = sync.with_checkpoints(CheckpointManager::from_config(&checkpoints));
        if sync.resume().context("Failed to restore cursor checkpoint")? {
            info!("Restored cursor from checkpoint");
        }
    }
    Ok(sync)
}
