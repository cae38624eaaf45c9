//! Poll-cycle driver: traversal, change detection and delivery in one loop.

use change_detection::{
    decide, BaselineStore, ChangeKind, ContentPolicy, Decision, Deletion, DeletionSweep,
    Document, Live, MimeDetector, Snapshot,
};
use checkpoint::{Checkpoint, CheckpointManager};
use tracing::{debug, info, warn};

use crate::cursor_checkpoint::CursorCheckpoint;
use crate::error::{Result, TraversalError};
use crate::iterator::TraversalIterator;
use crate::source::{DocumentBuilder, RowSource};

/// A document to add to or replace in the index.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub kind: ChangeKind,
    pub document: Document,
}

/// Receives the changes a poll produces.
pub trait ChangeSink {
    /// Deliver an added or updated document.
    fn apply(&mut self, change: Change) -> anyhow::Result<()>;

    /// Remove a row from the index.
    fn delete(&mut self, deletion: &Deletion) -> anyhow::Result<()>;
}

/// Counters for one traversal cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub added: u64,
    pub updated: u64,
    pub unchanged: u64,
    pub rejected: u64,
    /// Rows the builder failed on. They keep their baseline entry.
    pub failed: u64,
    pub deleted: u64,
}

/// What one call to [`Synchronizer::poll`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// A batch was processed; the cycle continues.
    Batch { rows: usize },
    /// The cycle ended. Deletions have been delivered.
    CycleComplete(CycleStats),
}

/// Drives a [`TraversalIterator`] against a [`BaselineStore`].
///
/// A baseline entry is committed only after the sink accepted the change
/// for it, so a failed delivery is retried on the next cycle.
pub struct Synchronizer<R, B, S> {
    iterator: TraversalIterator<R, B>,
    baseline: S,
    policy: ContentPolicy,
    detector: Box<dyn MimeDetector>,
    sweep: DeletionSweep,
    stats: CycleStats,
    checkpoints: Option<CheckpointManager>,
    // Set while the cycle cannot vouch for every row of the table: it was
    // resumed mid-table, or a row failed to convert without an identity.
    // Its deletion sweep is skipped.
    partial_cycle: bool,
}

impl<R, B, S> Synchronizer<R, B, S>
where
    R: RowSource,
    B: DocumentBuilder,
    S: BaselineStore,
{
    pub fn new(
        iterator: TraversalIterator<R, B>,
        baseline: S,
        policy: ContentPolicy,
        detector: impl MimeDetector + 'static,
    ) -> Self {
        Self {
            iterator,
            baseline,
            policy,
            detector: Box::new(detector),
            sweep: DeletionSweep::new(),
            stats: CycleStats::default(),
            checkpoints: None,
            partial_cycle: false,
        }
    }

    /// Persist the cursor position after every batch.
    pub fn with_checkpoints(mut self, manager: CheckpointManager) -> Self {
        self.checkpoints = Some(manager);
        self
    }

    pub fn baseline(&self) -> &S {
        &self.baseline
    }

    pub fn iterator(&self) -> &TraversalIterator<R, B> {
        &self.iterator
    }

    pub fn source_mut(&mut self) -> &mut R {
        self.iterator.cursor_mut().source_mut()
    }

    /// Counters of the cycle in progress.
    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    /// Restore the cursor from the last saved checkpoint, if there is one.
    ///
    /// Returns whether a checkpoint was applied. The deletion sweep is
    /// skipped for a cycle resumed mid-table.
    pub fn resume(&mut self) -> Result<bool> {
        let Some(manager) = &self.checkpoints else {
            return Ok(false);
        };
        let checkpoint: Option<CursorCheckpoint> = manager
            .read_checkpoint()
            .map_err(|e| TraversalError::Checkpoint(format!("{e:#}")))?;
        let Some(checkpoint) = checkpoint else {
            return Ok(false);
        };
        self.resume_at(&checkpoint)?;
        Ok(true)
    }

    /// Move the cursor to an explicit position, such as one given on the
    /// command line.
    pub fn resume_at(&mut self, checkpoint: &CursorCheckpoint) -> Result<()> {
        let cursor = self.iterator.cursor_mut();
        cursor.restore(checkpoint)?;
        self.partial_cycle = !cursor.pagination().is_at_cycle_start();
        info!("Resuming traversal at {}", checkpoint.to_cli_string());
        Ok(())
    }

    /// Process one batch, or finish the cycle if the source is exhausted.
    ///
    /// # Errors
    ///
    /// - [`TraversalError::RepositoryUnreachable`]: the cycle restarts with
    ///   fresh counters on the next poll
    /// - [`TraversalError::Sink`]: the row's baseline entry is left as it
    ///   was
    pub fn poll(&mut self, sink: &mut dyn ChangeSink) -> Result<PollOutcome> {
        let has_next = match self.iterator.has_next() {
            Ok(has_next) => has_next,
            Err(e @ TraversalError::RepositoryUnreachable(_)) => {
                self.restart_cycle();
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        self.observe_failed_rows();

        if !has_next {
            return self.finish_cycle(sink).map(PollOutcome::CycleComplete);
        }

        let mut rows = 0;
        while self.iterator.buffered() > 0 {
            let snapshot = self.iterator.next()?;
            self.process(snapshot, sink)?;
            rows += 1;
        }
        self.save_checkpoint()?;
        debug!("Processed batch of {} rows", rows);
        Ok(PollOutcome::Batch { rows })
    }

    fn process(&mut self, live: Snapshot<Live>, sink: &mut dyn ChangeSink) -> Result<()> {
        self.sweep.observe(live.docid());
        let reference = self.baseline.lookup(live.docid())?;
        let decision = decide(live, reference.as_ref())?;
        let kind = decision.kind();

        let live = match decision {
            Decision::None(_) => {
                self.stats.unchanged += 1;
                return Ok(());
            }
            Decision::Add(live) | Decision::Update(live) => live,
        };

        let historical = live.to_historical();
        let document = live.materialize(&self.policy, self.detector.as_ref());

        if document.content.is_rejected() {
            info!(
                "Rejecting {} because of its content type: {:?}",
                document.docid, document.content
            );
            self.stats.rejected += 1;
            if kind == ChangeKind::Update {
                let deletion = Deletion {
                    docid: document.docid,
                };
                sink.delete(&deletion)
                    .map_err(|e| TraversalError::Sink(format!("{e:#}")))?;
                self.baseline.remove(&deletion.docid)?;
            }
            return Ok(());
        }

        sink.apply(Change { kind, document })
            .map_err(|e| TraversalError::Sink(format!("{e:#}")))?;
        self.baseline.commit(&historical)?;
        match kind {
            ChangeKind::Add => self.stats.added += 1,
            ChangeKind::Update => self.stats.updated += 1,
            ChangeKind::None => {}
        }
        Ok(())
    }

    /// Keep rows the builder failed on out of the deletion sweep.
    fn observe_failed_rows(&mut self) {
        for docid in self.iterator.take_failed() {
            self.stats.failed += 1;
            match docid {
                Some(docid) => self.sweep.observe(&docid),
                None => {
                    if !self.partial_cycle {
                        warn!(
                            "A row without identity failed to convert, skipping this cycle's deletion sweep"
                        );
                    }
                    self.partial_cycle = true;
                }
            }
        }
    }

    fn finish_cycle(&mut self, sink: &mut dyn ChangeSink) -> Result<CycleStats> {
        // Counters belong to this cycle even if delivering a deletion fails.
        let mut stats = std::mem::take(&mut self.stats);
        if self.partial_cycle {
            info!("Skipping deletion sweep for a partially traversed cycle");
            self.sweep = DeletionSweep::new();
            self.partial_cycle = false;
        } else {
            for deletion in self.sweep.sweep(&self.baseline)? {
                sink.delete(&deletion)
                    .map_err(|e| TraversalError::Sink(format!("{e:#}")))?;
                self.baseline.remove(&deletion.docid)?;
                stats.deleted += 1;
            }
        }
        self.save_checkpoint()?;

        info!(
            "Cycle complete: {} added, {} updated, {} unchanged, {} rejected, {} failed, {} deleted",
            stats.added,
            stats.updated,
            stats.unchanged,
            stats.rejected,
            stats.failed,
            stats.deleted
        );
        Ok(stats)
    }

    fn restart_cycle(&mut self) {
        warn!("Discarding progress of the interrupted cycle");
        self.iterator.take_failed();
        self.sweep = DeletionSweep::new();
        self.stats = CycleStats::default();
        self.partial_cycle = false;
    }

    fn save_checkpoint(&self) -> Result<()> {
        if let Some(manager) = &self.checkpoints {
            manager
                .emit_checkpoint(&self.iterator.cursor().checkpoint())
                .map_err(|e| TraversalError::Checkpoint(format!("{e:#}")))?;
        }
        Ok(())
    }
}
