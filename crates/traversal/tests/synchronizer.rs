//! Poll cycles through the synchronizer: delivery, deletions, rejection,
//! sink failures and checkpoint resume.

mod common;

use std::cell::Cell;
use std::rc::Rc;

use anyhow::bail;
use change_detection::{ChangeKind, ContentOutcome, ContentPolicy, Deletion, MemoryBaseline};
use checkpoint::{CheckpointConfig, CheckpointManager};
use common::{init_logging, Table};
use sync_core::RowValue;
use tempfile::TempDir;
use traversal::{
    BuildError, Change, ChangeSink, Cursor, CycleStats, ExecutionMode, Pagination, PollOutcome,
    SnapshotBuilder, Synchronizer, TraversalError, TraversalIterator,
};

#[derive(Default)]
struct RecordingSink {
    applied: Vec<(ChangeKind, String)>,
    deleted: Vec<String>,
    documents: Vec<Change>,
    fail_for: Option<String>,
    fail_delete: bool,
}

impl ChangeSink for RecordingSink {
    fn apply(&mut self, change: Change) -> anyhow::Result<()> {
        if self.fail_for.as_deref() == Some(change.document.docid.as_str()) {
            bail!("index rejected {}", change.document.docid);
        }
        self.applied
            .push((change.kind, change.document.docid.to_string()));
        self.documents.push(change);
        Ok(())
    }

    fn delete(&mut self, deletion: &Deletion) -> anyhow::Result<()> {
        if self.fail_delete {
            bail!("index refused to delete {}", deletion.docid);
        }
        self.deleted.push(deletion.docid.to_string());
        Ok(())
    }
}

type TableSync = Synchronizer<Table, SnapshotBuilder, MemoryBaseline>;

fn synchronizer(table: Table, pagination: Pagination) -> TableSync {
    let builder = SnapshotBuilder::new(
        vec!["id".to_string(), "lastName".to_string()],
        ExecutionMode::Metadata,
    );
    Synchronizer::new(
        TraversalIterator::new(Cursor::new(table, builder, pagination)),
        MemoryBaseline::new(),
        ContentPolicy::default(),
        |_: &[u8]| "text/plain".to_string(),
    )
}

/// Poll until the cycle completes.
fn run_cycle(sync: &mut TableSync, sink: &mut RecordingSink) -> CycleStats {
    loop {
        if let PollOutcome::CycleComplete(stats) = sync.poll(sink).unwrap() {
            return stats;
        }
    }
}

#[test]
fn test_add_none_update_delete_over_cycles() {
    init_logging();
    let mut sync = synchronizer(Table::with_ids(1..=3), Pagination::offset(2));
    let mut sink = RecordingSink::default();

    let stats = run_cycle(&mut sync, &mut sink);
    assert_eq!(
        stats,
        CycleStats {
            added: 3,
            ..CycleStats::default()
        }
    );
    assert_eq!(sync.baseline().len(), 3);

    let stats = run_cycle(&mut sync, &mut sink);
    assert_eq!(stats.unchanged, 3);
    assert_eq!(sink.applied.len(), 3);

    let table = sync.source_mut();
    table.set_email(2, "changed@example.com");
    table.delete(3);
    let stats = run_cycle(&mut sync, &mut sink);
    assert_eq!(
        stats,
        CycleStats {
            updated: 1,
            unchanged: 1,
            deleted: 1,
            ..CycleStats::default()
        }
    );
    assert_eq!(sink.applied.last(), Some(&(ChangeKind::Update, "2/last_02".to_string())));
    assert_eq!(sink.deleted, vec!["3/last_03"]);
    assert_eq!(sync.baseline().len(), 2);
}

#[test]
fn test_sink_failure_leaves_baseline_untouched() {
    init_logging();
    let mut sync = synchronizer(Table::with_ids(1..=2), Pagination::offset(10));
    let mut sink = RecordingSink {
        fail_for: Some("2/last_02".to_string()),
        ..RecordingSink::default()
    };

    let err = sync.poll(&mut sink).unwrap_err();
    assert!(matches!(err, TraversalError::Sink(_)));
    assert_eq!(sync.baseline().len(), 1);

    sink.fail_for = None;
    let stats = run_cycle(&mut sync, &mut sink);
    assert_eq!(stats.added, 1);
    assert!(sink.deleted.is_empty());

    // Retried on the next cycle.
    let stats = run_cycle(&mut sync, &mut sink);
    assert_eq!(stats.added, 1);
    assert_eq!(stats.unchanged, 1);
    assert_eq!(sync.baseline().len(), 2);
}

#[test]
fn test_connectivity_failure_discards_partial_cycle() {
    init_logging();
    let mut table = Table::with_ids(1..=4);
    table.unreachable_on = vec![5];
    let mut sync = synchronizer(table, Pagination::offset(2));
    let mut sink = RecordingSink::default();
    run_cycle(&mut sync, &mut sink);

    // Second cycle: one batch, then the connection drops.
    assert_eq!(sync.poll(&mut sink).unwrap(), PollOutcome::Batch { rows: 2 });
    assert!(matches!(
        sync.poll(&mut sink),
        Err(TraversalError::RepositoryUnreachable(_))
    ));
    assert_eq!(sync.stats(), CycleStats::default());

    let stats = run_cycle(&mut sync, &mut sink);
    assert_eq!(stats.unchanged, 4);
    assert_eq!(stats.deleted, 0);
}

#[test]
fn test_rejected_content_is_never_delivered() {
    init_logging();
    let mut table = Table::with_ids(1..=2);
    table.rows[0].insert("body", RowValue::Bytes(b"MZ\x90\x00".to_vec()));
    table.rows[1].insert("body", RowValue::Bytes(b"%PDF-1.7".to_vec()));

    let builder = SnapshotBuilder::new(
        vec!["id".to_string()],
        ExecutionMode::LargeObject {
            column: "body".to_string(),
        },
    );
    let detector = |bytes: &[u8]| {
        if bytes.starts_with(b"MZ") {
            "application/x-msdownload".to_string()
        } else {
            "application/pdf".to_string()
        }
    };
    let mut sync = Synchronizer::new(
        TraversalIterator::new(Cursor::new(table, builder, Pagination::offset(5))),
        MemoryBaseline::new(),
        ContentPolicy::new(["application/pdf"], ["application/x-msdownload"]),
        detector,
    );
    let mut sink = RecordingSink::default();

    let stats = loop {
        if let PollOutcome::CycleComplete(stats) = sync.poll(&mut sink).unwrap() {
            break stats;
        }
    };
    assert_eq!(stats.rejected, 1);
    assert_eq!(stats.added, 1);
    assert_eq!(sink.applied, vec![(ChangeKind::Add, "2".to_string())]);
    assert!(matches!(
        sink.documents[0].document.content,
        ContentOutcome::Accepted { .. }
    ));
    assert_eq!(sync.baseline().len(), 1);
}

#[test]
fn test_resume_from_checkpoint_skips_partial_sweep() {
    init_logging();
    let tmp = TempDir::new().unwrap();
    let config = CheckpointConfig::filesystem("people", tmp.path().to_string_lossy().to_string());

    let mut sink = RecordingSink::default();
    let mut first = synchronizer(Table::with_ids(1..=6), Pagination::offset(2))
        .with_checkpoints(CheckpointManager::from_config(&config));
    first.poll(&mut sink).unwrap();
    first.poll(&mut sink).unwrap();

    // Restart: new process, same checkpoint directory, empty in-memory baseline.
    let mut second = synchronizer(Table::with_ids(1..=6), Pagination::offset(2))
        .with_checkpoints(CheckpointManager::from_config(&config));
    assert!(second.resume().unwrap());
    assert_eq!(
        second.iterator().cursor().pagination(),
        &Pagination::Offset {
            skip: 4,
            page_size: 2
        }
    );

    let mut resumed_sink = RecordingSink::default();
    let stats = run_cycle(&mut second, &mut resumed_sink);
    assert_eq!(stats.added, 2);
    assert_eq!(stats.deleted, 0);
    assert!(resumed_sink.deleted.is_empty());

    // The next cycle is complete again and sees every row.
    let stats = run_cycle(&mut second, &mut resumed_sink);
    assert_eq!(stats.added, 4);
    assert_eq!(stats.unchanged, 2);
}

#[test]
fn test_resume_without_checkpoint() {
    let tmp = TempDir::new().unwrap();
    let config = CheckpointConfig::filesystem("fresh", tmp.path().to_string_lossy().to_string());
    let mut sync = synchronizer(Table::with_ids(1..=2), Pagination::offset(2))
        .with_checkpoints(CheckpointManager::from_config(&config));
    assert!(!sync.resume().unwrap());

    let mut plain = synchronizer(Table::with_ids(1..=2), Pagination::offset(2));
    assert!(!plain.resume().unwrap());
}

#[test]
fn test_resume_at_explicit_position() {
    init_logging();
    let mut sync = synchronizer(Table::with_ids(1..=4), Pagination::offset(2));
    sync.resume_at(&traversal::CursorCheckpoint::Offset {
        skip: 2,
        page_size: 2,
    })
    .unwrap();

    let mut sink = RecordingSink::default();
    let stats = run_cycle(&mut sync, &mut sink);
    assert_eq!(stats.added, 2);
    assert_eq!(sink.applied[0].1, "3/last_03");

    // Rewinding to the start is not a partial cycle.
    sync.resume_at(&traversal::CursorCheckpoint::Offset {
        skip: 0,
        page_size: 2,
    })
    .unwrap();
    let stats = run_cycle(&mut sync, &mut sink);
    assert_eq!(stats.added, 2);
    assert_eq!(stats.unchanged, 2);
}

#[test]
fn test_failed_conversion_keeps_indexed_row() {
    init_logging();
    let mut table = Table::with_ids(1..=3);
    for (id, row) in (1..=3).zip(table.rows.iter_mut()) {
        row.insert("url", format!("http://example.com/{id}").as_str());
    }

    let unreachable = Rc::new(Cell::new(false));
    let fetch_fails = Rc::clone(&unreachable);
    let builder = SnapshotBuilder::new(
        vec!["id".to_string()],
        ExecutionMode::Url {
            column: "url".to_string(),
        },
    )
    .with_fetcher(move |url: &str| {
        if fetch_fails.get() && url.ends_with("/2") {
            return Err(BuildError::Fetch {
                url: url.to_string(),
                reason: "timed out".to_string(),
            });
        }
        Ok(url.as_bytes().to_vec())
    });
    let mut sync: TableSync = Synchronizer::new(
        TraversalIterator::new(Cursor::new(table, builder, Pagination::offset(5))),
        MemoryBaseline::new(),
        ContentPolicy::default(),
        |_: &[u8]| "text/plain".to_string(),
    );
    let mut sink = RecordingSink::default();
    assert_eq!(run_cycle(&mut sync, &mut sink).added, 3);

    unreachable.set(true);
    let stats = run_cycle(&mut sync, &mut sink);
    assert_eq!(
        stats,
        CycleStats {
            unchanged: 2,
            failed: 1,
            ..CycleStats::default()
        }
    );
    assert!(sink.deleted.is_empty());
    assert_eq!(sync.baseline().len(), 3);

    unreachable.set(false);
    assert_eq!(run_cycle(&mut sync, &mut sink).unchanged, 3);
}

#[test]
fn test_unidentifiable_failure_skips_deletion_sweep() {
    init_logging();
    let mut sync = synchronizer(Table::with_ids(1..=3), Pagination::offset(2));
    let mut sink = RecordingSink::default();
    run_cycle(&mut sync, &mut sink);

    let table = sync.source_mut();
    table.rows[1].remove("lastName");
    table.delete(3);
    let stats = run_cycle(&mut sync, &mut sink);
    assert_eq!(
        stats,
        CycleStats {
            unchanged: 1,
            failed: 1,
            ..CycleStats::default()
        }
    );
    assert!(sink.deleted.is_empty());
    assert_eq!(sync.baseline().len(), 3);

    // Once every row converts again, the deletion goes through.
    sync.source_mut().rows[1].insert("lastName", "last_02");
    let stats = run_cycle(&mut sync, &mut sink);
    assert_eq!(stats.unchanged, 2);
    assert_eq!(stats.deleted, 1);
    assert_eq!(sink.deleted, vec!["3/last_03"]);
}

#[test]
fn test_failed_deletion_does_not_carry_counts_over() {
    init_logging();
    let mut sync = synchronizer(Table::with_ids(1..=3), Pagination::offset(2));
    let mut sink = RecordingSink::default();
    run_cycle(&mut sync, &mut sink);

    sync.source_mut().delete(3);
    sink.fail_delete = true;
    let err = loop {
        match sync.poll(&mut sink) {
            Ok(PollOutcome::Batch { .. }) => continue,
            Ok(PollOutcome::CycleComplete(stats)) => panic!("cycle completed: {stats:?}"),
            Err(e) => break e,
        }
    };
    assert!(matches!(err, TraversalError::Sink(_)));
    assert_eq!(sync.stats(), CycleStats::default());
    assert_eq!(sync.baseline().len(), 3);

    sink.fail_delete = false;
    let stats = run_cycle(&mut sync, &mut sink);
    assert_eq!(
        stats,
        CycleStats {
            unchanged: 2,
            deleted: 1,
            ..CycleStats::default()
        }
    );
    assert_eq!(sink.deleted, vec!["3/last_03"]);
}
