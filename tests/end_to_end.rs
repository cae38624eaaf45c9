//! Whole-pipeline scenarios through the public crate surface.

use std::collections::HashSet;

use table_sync::{
    build_synchronizer, decide, legacy_adapt, BaselineStore, Change, ChangeKind, ChangeSink,
    Deletion, MemoryBaseline, PagePosition, PageRequest, PollOutcome, Row, RowSourceError,
    RowValue, Sha256Checksummer, Snapshot, TraversalConfig,
};

const KEYS: [&str; 2] = ["id", "lastName"];

fn employee(email: &str) -> Row {
    Row::new()
        .with("id", RowValue::Int32(1))
        .with("lastName", "last_01")
        .with("email", email)
}

fn capture(row: Row) -> Snapshot<table_sync::Live> {
    Snapshot::capture(&KEYS, row, None, &Sha256Checksummer).unwrap()
}

#[test]
fn test_add_then_none_then_update() {
    table_sync::init_tracing();
    let mut baseline = MemoryBaseline::new();

    let first = capture(employee("a@example.com"));
    let reference = baseline.lookup(first.docid()).unwrap();
    let decision = decide(first, reference.as_ref()).unwrap();
    assert_eq!(decision.kind(), ChangeKind::Add);
    assert_eq!(decision.docid().as_str(), "1/last_01");
    let delivered = decision.into_live().unwrap().into_historical();
    baseline.commit(&delivered).unwrap();

    let again = capture(employee("a@example.com"));
    let reference = baseline.lookup(again.docid()).unwrap();
    assert_eq!(
        decide(again, reference.as_ref()).unwrap().kind(),
        ChangeKind::None
    );

    let changed = capture(employee("b@example.com"));
    let reference = baseline.lookup(changed.docid()).unwrap().unwrap();
    let decision = decide(changed, Some(&reference)).unwrap();
    assert_eq!(decision.kind(), ChangeKind::Update);
    let updated = decision.into_live().unwrap();
    assert_eq!(updated.docid(), reference.docid());
    assert_ne!(updated.checksum(), reference.checksum());
}

#[test]
fn test_legacy_and_current_identifiers_in_one_batch() {
    let existing: HashSet<String> = ["1,last_01", "3,last_03"]
        .iter()
        .map(|k| k.to_string())
        .collect();
    let identifiers = ["1%2Clast_01", "2/last_02", "3/last_03", "4/%ZZ"];

    let found = legacy_adapt(&identifiers, |keys| {
        assert_eq!(keys.len(), 3);
        Ok::<_, RowSourceError>(existing.clone())
    })
    .unwrap();
    assert_eq!(found, vec!["1%2Clast_01", "3/last_03"]);
}

#[derive(Default)]
struct Index {
    changes: Vec<(ChangeKind, String)>,
    deleted: Vec<String>,
}

impl ChangeSink for Index {
    fn apply(&mut self, change: Change) -> anyhow::Result<()> {
        self.changes
            .push((change.kind, change.document.docid.to_string()));
        Ok(())
    }

    fn delete(&mut self, deletion: &Deletion) -> anyhow::Result<()> {
        self.deleted.push(deletion.docid.to_string());
        Ok(())
    }
}

fn run_cycle<R, S>(
    sync: &mut table_sync::Synchronizer<R, table_sync::SnapshotBuilder, S>,
    index: &mut Index,
) where
    R: table_sync::RowSource,
    S: BaselineStore,
{
    loop {
        if let PollOutcome::CycleComplete(_) = sync.poll(index).unwrap() {
            return;
        }
    }
}

#[test]
fn test_configured_synchronizer_resumes_from_checkpoint() {
    table_sync::init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let config = TraversalConfig::from_toml_str(&format!(
        r#"
        instance = "people"
        primary_keys = ["id", "lastName"]
        checkpoint_dir = "{}"

        [pagination]
        mode = "key_continuation"
        key_column = "id"
        key_type = "big_int"
        min_key = "0"
        page_size = 2
        "#,
        dir.path().display()
    ))
    .unwrap();

    let rows: Vec<Row> = (1..=5)
        .map(|id| {
            Row::new()
                .with("id", RowValue::Int64(id))
                .with("lastName", format!("last_{id:02}"))
        })
        .collect();
    let table = move |request: &PageRequest| -> Result<Vec<Row>, RowSourceError> {
        let PagePosition::After { key, .. } = &request.position else {
            return Err(RowSourceError::Query("offset query".to_string()));
        };
        let after = key.as_i64().unwrap_or(0);
        Ok(rows
            .iter()
            .filter(|row| row.get("id").and_then(RowValue::as_i64) > Some(after))
            .take(request.page_size)
            .cloned()
            .collect())
    };
    let detector = |_: &[u8]| "text/plain".to_string();

    let mut index = Index::default();
    let mut first =
        build_synchronizer(&config, table.clone(), MemoryBaseline::new(), detector).unwrap();
    assert_eq!(first.poll(&mut index).unwrap(), PollOutcome::Batch { rows: 2 });

    let mut second = build_synchronizer(&config, table, MemoryBaseline::new(), detector).unwrap();
    let mut resumed = Index::default();
    run_cycle(&mut second, &mut resumed);
    let ids: Vec<&str> = resumed.changes.iter().map(|(_, id)| id.as_str()).collect();
    assert_eq!(ids, vec!["3/last_03", "4/last_04", "5/last_05"]);
    assert!(resumed.deleted.is_empty());
}
