//! Resumable pagination over the source table.
//!
//! A cursor reads the table one page at a time, forever. An empty page ends
//! the current cycle and sends the cursor back to the start of the table, so
//! the next fetch begins a fresh cycle. A connectivity failure does the
//! same before the error is handed to the caller: after an outage the
//! traversal never resumes at a position that may have gone stale.

use std::cmp::Ordering;

use change_detection::{DocId, Live, Snapshot};
use sync_core::{Row, RowValue};
use tracing::{debug, info, warn};

use crate::cursor_checkpoint::CursorCheckpoint;
use crate::error::{Result, RowSourceError, TraversalError};
use crate::source::{DocumentBuilder, PagePosition, PageRequest, RowSource};

/// Pagination state. The variant is fixed when the cursor is configured.
#[derive(Debug, Clone, PartialEq)]
pub enum Pagination {
    /// `skip` rows already read this cycle.
    Offset { skip: u64, page_size: usize },

    /// Rows up to and including `last_key` already read this cycle.
    /// `min_key` sorts before every row of the table.
    KeyContinuation {
        key_column: String,
        last_key: RowValue,
        min_key: RowValue,
        page_size: usize,
    },
}

impl Pagination {
    pub fn offset(page_size: usize) -> Self {
        Self::Offset { skip: 0, page_size }
    }

    pub fn key_continuation(
        key_column: impl Into<String>,
        min_key: RowValue,
        page_size: usize,
    ) -> Self {
        Self::KeyContinuation {
            key_column: key_column.into(),
            last_key: min_key.clone(),
            min_key,
            page_size,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Offset { .. } => "offset",
            Self::KeyContinuation { .. } => "key-continuation",
        }
    }

    pub fn page_size(&self) -> usize {
        match self {
            Self::Offset { page_size, .. } | Self::KeyContinuation { page_size, .. } => *page_size,
        }
    }

    /// The query for the next page.
    pub fn request(&self) -> PageRequest {
        match self {
            Self::Offset { skip, page_size } => PageRequest {
                position: PagePosition::Offset(*skip),
                page_size: *page_size,
            },
            Self::KeyContinuation {
                key_column,
                last_key,
                page_size,
                ..
            } => PageRequest {
                position: PagePosition::After {
                    column: key_column.clone(),
                    key: last_key.clone(),
                },
                page_size: *page_size,
            },
        }
    }

    /// Move past a non-empty batch.
    fn advance(&mut self, rows: &[Row]) -> Result<()> {
        match self {
            Self::Offset { skip, .. } => {
                *skip += rows.len() as u64;
            }
            Self::KeyContinuation {
                key_column,
                last_key,
                ..
            } => {
                let max = rows
                    .iter()
                    .filter_map(|row| row.get(key_column.as_str()))
                    .filter(|key| !key.is_null())
                    .max_by(|a, b| a.total_cmp(b))
                    .ok_or_else(|| TraversalError::MissingContinuationKey(key_column.clone()))?;
                if max.total_cmp(last_key) == Ordering::Greater {
                    *last_key = max.clone();
                }
            }
        }
        Ok(())
    }

    /// Return to the start of the cycle.
    pub fn reset(&mut self) {
        match self {
            Self::Offset { skip, .. } => *skip = 0,
            Self::KeyContinuation {
                last_key, min_key, ..
            } => *last_key = min_key.clone(),
        }
    }

    /// Check if the next fetch starts a new cycle.
    pub fn is_at_cycle_start(&self) -> bool {
        match self {
            Self::Offset { skip, .. } => *skip == 0,
            Self::KeyContinuation {
                last_key, min_key, ..
            } => last_key == min_key,
        }
    }
}

/// Snapshots built from one page.
#[derive(Debug)]
pub struct Batch {
    /// Rows the source returned. Zero marks the end of a cycle.
    pub rows_read: usize,
    /// Rows the builder declined or failed on.
    pub rows_skipped: usize,
    pub snapshots: Vec<Snapshot<Live>>,
    /// One entry per row the builder failed on: its identity, or `None`
    /// when even that could not be derived.
    pub failed: Vec<Option<DocId>>,
}

impl Batch {
    fn cycle_end() -> Self {
        Self {
            rows_read: 0,
            rows_skipped: 0,
            snapshots: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Check if this batch marks the end of a traversal cycle.
    pub fn is_cycle_end(&self) -> bool {
        self.rows_read == 0
    }
}

/// Pages through a [`RowSource`] and converts rows with a
/// [`DocumentBuilder`].
pub struct Cursor<R, B> {
    source: R,
    builder: B,
    pagination: Pagination,
    cycle: u64,
}

impl<R: RowSource, B: DocumentBuilder> Cursor<R, B> {
    pub fn new(source: R, builder: B, pagination: Pagination) -> Self {
        Self {
            source,
            builder,
            pagination,
            cycle: 0,
        }
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// Number of completed cycles.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn source_mut(&mut self) -> &mut R {
        &mut self.source
    }

    /// Fetch and convert the next page.
    ///
    /// An empty page resets the cursor and is returned as a cycle-end batch.
    ///
    /// # Errors
    ///
    /// - [`TraversalError::RepositoryUnreachable`] on a connectivity failure,
    ///   after resetting the cursor
    /// - [`TraversalError::Query`] on any other source failure, leaving the
    ///   position unchanged
    pub fn fetch_next_batch(&mut self) -> Result<Batch> {
        let request = self.pagination.request();
        let rows = match self.source.fetch(&request) {
            Ok(rows) => rows,
            Err(RowSourceError::Connectivity(reason)) => {
                warn!(
                    "Source unreachable at {:?}, restarting cycle: {}",
                    request.position, reason
                );
                self.reset();
                return Err(TraversalError::RepositoryUnreachable(reason));
            }
            Err(RowSourceError::Query(reason)) => return Err(TraversalError::Query(reason)),
        };

        if rows.is_empty() {
            self.cycle += 1;
            info!("Traversal cycle {} complete", self.cycle);
            self.reset();
            return Ok(Batch::cycle_end());
        }

        self.pagination.advance(&rows)?;

        let rows_read = rows.len();
        let mut snapshots = Vec::with_capacity(rows_read);
        let mut failed = Vec::new();
        for row in &rows {
            match self.builder.build(row) {
                Ok(Some(snapshot)) => snapshots.push(snapshot),
                Ok(None) => {}
                Err(e) => {
                    warn!("Skipping row that failed to convert: {}", e);
                    failed.push(self.builder.identify(row));
                }
            }
        }
        let rows_skipped = rows_read - snapshots.len();
        debug!(
            "Fetched {} rows ({} skipped), next position {:?}",
            rows_read,
            rows_skipped,
            self.pagination.request().position
        );

        Ok(Batch {
            rows_read,
            rows_skipped,
            snapshots,
            failed,
        })
    }

    /// Return to the start of the cycle.
    pub fn reset(&mut self) {
        self.pagination.reset();
    }

    /// Current position, for persisting across restarts.
    pub fn checkpoint(&self) -> CursorCheckpoint {
        CursorCheckpoint::from(&self.pagination)
    }

    /// Resume from a persisted position. The page size stays as
    /// configured.
    ///
    /// # Errors
    ///
    /// [`TraversalError::CheckpointMismatch`] if the checkpoint was taken by
    /// a cursor of the other pagination kind.
    pub fn restore(&mut self, checkpoint: &CursorCheckpoint) -> Result<()> {
        match (&mut self.pagination, checkpoint) {
            (Pagination::Offset { skip, .. }, CursorCheckpoint::Offset { skip: saved, .. }) => {
                *skip = *saved;
            }
            (
                Pagination::KeyContinuation { last_key, .. },
                CursorCheckpoint::Key { last_key: saved, .. },
            ) => {
                *last_key = saved.clone();
            }
            (pagination, checkpoint) => {
                return Err(TraversalError::CheckpointMismatch {
                    checkpoint: checkpoint.kind(),
                    pagination: pagination.kind(),
                })
            }
        }
        info!("Cursor restored to {:?}", self.pagination.request().position);
        Ok(())
    }
}
