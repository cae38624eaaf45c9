//! Row-at-a-time view over a [`Cursor`].

use std::collections::VecDeque;

use change_detection::{DocId, Live, Snapshot};
use tracing::trace;

use crate::cursor::Cursor;
use crate::error::{Result, TraversalError};
use crate::source::{DocumentBuilder, RowSource};

/// Buffers one batch and pulls the next from the cursor when it runs out.
///
/// [`has_next`](Self::has_next) returning `false` marks a cycle boundary,
/// not the end of the data: the following call starts a new cycle.
pub struct TraversalIterator<R, B> {
    cursor: Cursor<R, B>,
    buffer: VecDeque<Snapshot<Live>>,
    failed: Vec<Option<DocId>>,
}

impl<R: RowSource, B: DocumentBuilder> TraversalIterator<R, B> {
    pub fn new(cursor: Cursor<R, B>) -> Self {
        Self {
            cursor,
            buffer: VecDeque::new(),
            failed: Vec::new(),
        }
    }

    pub fn cursor(&self) -> &Cursor<R, B> {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut Cursor<R, B> {
        &mut self.cursor
    }

    /// Check if another snapshot is available in the current cycle,
    /// fetching batches as needed.
    ///
    /// Batches in which every row was skipped are passed over. Only an
    /// empty batch from the source yields `false`.
    ///
    /// # Errors
    ///
    /// Cursor errors propagate unchanged.
    pub fn has_next(&mut self) -> Result<bool> {
        while self.buffer.is_empty() {
            let batch = self.cursor.fetch_next_batch()?;
            if batch.is_cycle_end() {
                trace!("Cycle boundary reached");
                return Ok(false);
            }
            self.buffer.extend(batch.snapshots);
            self.failed.extend(batch.failed);
        }
        Ok(true)
    }

    /// Drain the rows that failed to convert since the last call, as
    /// reported in [`Batch::failed`](crate::Batch::failed).
    pub fn take_failed(&mut self) -> Vec<Option<DocId>> {
        std::mem::take(&mut self.failed)
    }

    /// Take the next buffered snapshot.
    ///
    /// # Errors
    ///
    /// [`TraversalError::EndOfBatch`] if nothing is buffered; call
    /// [`has_next`](Self::has_next) first.
    pub fn next(&mut self) -> Result<Snapshot<Live>> {
        self.buffer.pop_front().ok_or(TraversalError::EndOfBatch)
    }

    /// Number of snapshots buffered from the current batch.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn into_cursor(self) -> Cursor<R, B> {
        self.cursor
    }
}
