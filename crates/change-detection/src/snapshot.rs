//! Live and historical row snapshots.
//!
//! A snapshot pairs a row identity with the checksum of its content. A
//! [`Snapshot<Live>`] was just read from the source and still carries the
//! row, so it can produce a [`Document`]. A [`Snapshot<Historical>`] was
//! parsed back from the baseline and carries nothing but identity and
//! checksum; there is no way to materialize one.

use docid::DocId;
use serde::Deserialize;
use serde_json::json;
use sync_core::Row;

use crate::checksum::{non_key_content, Checksummer, RowChecksum};
use crate::content::{ContentOutcome, ContentPolicy, LazyContent, MimeDetector};
use crate::{ChangeDetectionError, Result};

/// Identity of `row` under `key_names`, without checksumming it.
pub fn identify<K: AsRef<str>>(key_names: &[K], row: &Row) -> Result<DocId> {
    Ok(docid::encode(key_names, row)?)
}

/// State of a snapshot read from the source in the current cycle.
#[derive(Debug, Clone)]
pub struct Live {
    fields: Row,
    large_object: Option<LazyContent>,
}

/// State of a snapshot recovered from the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Historical;

/// Identity and checksum of one row, in state `S`.
#[derive(Debug, Clone)]
pub struct Snapshot<S> {
    docid: DocId,
    checksum: RowChecksum,
    state: S,
}

impl<S> Snapshot<S> {
    pub fn docid(&self) -> &DocId {
        &self.docid
    }

    pub fn checksum(&self) -> &RowChecksum {
        &self.checksum
    }

    /// Canonical text form: compact JSON with sorted keys, e.g.
    /// `{"checksum":"…","docid":"1/last_01"}`.
    ///
    /// Equal identity and checksum always give byte-identical text.
    pub fn serialize(&self) -> String {
        json!({
            "checksum": self.checksum.as_str(),
            "docid": self.docid.as_str(),
        })
        .to_string()
    }
}

impl PartialEq for Snapshot<Historical> {
    fn eq(&self, other: &Self) -> bool {
        self.docid == other.docid && self.checksum == other.checksum
    }
}

impl Eq for Snapshot<Historical> {}

impl Snapshot<Live> {
    /// Build a live snapshot from parts already computed by the caller.
    pub fn new(
        docid: DocId,
        checksum: RowChecksum,
        fields: Row,
        large_object: Option<LazyContent>,
    ) -> Self {
        Self {
            docid,
            checksum,
            state: Live {
                fields,
                large_object,
            },
        }
    }

    /// Encode the row identity and checksum the non-key content plus any
    /// large-object payload.
    pub fn capture<K: AsRef<str>>(
        key_names: &[K],
        row: Row,
        large_object: Option<Vec<u8>>,
        checksummer: &dyn Checksummer,
    ) -> Result<Self> {
        let docid = identify(key_names, &row)?;
        let content = non_key_content(&row, key_names);
        let checksum = checksummer.checksum(&content, large_object.as_deref());
        Ok(Self::new(
            docid,
            checksum,
            row,
            large_object.map(LazyContent::new),
        ))
    }

    /// The row this snapshot was read from.
    pub fn fields(&self) -> &Row {
        &self.state.fields
    }

    pub fn large_object(&self) -> Option<&LazyContent> {
        self.state.large_object.as_ref()
    }

    /// Drop any cached content classification.
    pub(crate) fn reset_content(&mut self) {
        if let Some(content) = self.state.large_object.as_mut() {
            content.invalidate();
        }
    }

    /// The identity/checksum pair to persist once this row is delivered.
    pub fn to_historical(&self) -> Snapshot<Historical> {
        Snapshot {
            docid: self.docid.clone(),
            checksum: self.checksum.clone(),
            state: Historical,
        }
    }

    pub fn into_historical(self) -> Snapshot<Historical> {
        Snapshot {
            docid: self.docid,
            checksum: self.checksum,
            state: Historical,
        }
    }

    /// Produce the document for this row, classifying any large-object
    /// payload now.
    pub fn materialize(self, policy: &ContentPolicy, detector: &dyn MimeDetector) -> Document {
        let content = match self.state.large_object {
            Some(lazy) => lazy.resolve(policy, detector),
            None => ContentOutcome::Empty,
        };
        Document {
            docid: self.docid,
            checksum: self.checksum,
            fields: self.state.fields,
            content,
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StoredSnapshot {
    checksum: String,
    docid: String,
}

impl Snapshot<Historical> {
    pub fn new(docid: DocId, checksum: RowChecksum) -> Self {
        Self {
            docid,
            checksum,
            state: Historical,
        }
    }

    /// Parse text produced by [`Snapshot::serialize`].
    pub fn parse(text: &str) -> Result<Self> {
        let stored: StoredSnapshot =
            serde_json::from_str(text).map_err(|e| ChangeDetectionError::MalformedSnapshot {
                text: text.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self::new(
            DocId::parse(&stored.docid)?,
            RowChecksum::new(stored.checksum),
        ))
    }
}

/// A snapshot whose state is only known at runtime.
#[derive(Debug, Clone)]
pub enum AnySnapshot {
    Live(Snapshot<Live>),
    Historical(Snapshot<Historical>),
}

impl AnySnapshot {
    pub fn docid(&self) -> &DocId {
        match self {
            Self::Live(s) => s.docid(),
            Self::Historical(s) => s.docid(),
        }
    }

    pub fn serialize(&self) -> String {
        match self {
            Self::Live(s) => s.serialize(),
            Self::Historical(s) => s.serialize(),
        }
    }

    /// Materialize a live snapshot.
    ///
    /// # Errors
    ///
    /// [`ChangeDetectionError::HistoricalMaterialize`] for a historical one.
    pub fn materialize(
        self,
        policy: &ContentPolicy,
        detector: &dyn MimeDetector,
    ) -> Result<Document> {
        match self {
            Self::Live(s) => Ok(s.materialize(policy, detector)),
            Self::Historical(s) => Err(ChangeDetectionError::HistoricalMaterialize(s.docid)),
        }
    }
}

impl From<Snapshot<Live>> for AnySnapshot {
    fn from(s: Snapshot<Live>) -> Self {
        Self::Live(s)
    }
}

impl From<Snapshot<Historical>> for AnySnapshot {
    fn from(s: Snapshot<Historical>) -> Self {
        Self::Historical(s)
    }
}

/// A row rendered for the index.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub docid: DocId,
    pub checksum: RowChecksum,
    pub fields: Row,
    pub content: ContentOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::Sha256Checksummer;
    use sync_core::RowValue;

    fn row() -> Row {
        Row::new()
            .with("id", RowValue::Int32(1))
            .with("lastName", "last_01")
            .with("email", "a@example.com")
    }

    fn live(row: Row) -> Snapshot<Live> {
        Snapshot::capture(&["id", "lastName"], row, None, &Sha256Checksummer).unwrap()
    }

    #[test]
    fn test_identify_matches_captured_identity() {
        let id = identify(&["id", "lastName"], &row()).unwrap();
        assert_eq!(&id, live(row()).docid());
        assert!(matches!(
            identify(&["id", "firstName"], &row()),
            Err(ChangeDetectionError::Identity(_))
        ));
    }

    #[test]
    fn test_serialized_form_is_sorted_compact_json() {
        let snapshot = Snapshot::<Historical>::new(
            DocId::parse("1/last_01").unwrap(),
            RowChecksum::new("abc"),
        );
        assert_eq!(
            snapshot.serialize(),
            r#"{"checksum":"abc","docid":"1/last_01"}"#
        );
    }

    #[test]
    fn test_parse_roundtrip_and_equal_bytes() {
        let a = live(row());
        let b = live(row());
        assert_eq!(a.serialize(), b.serialize());

        let parsed = Snapshot::<Historical>::parse(&a.serialize()).unwrap();
        assert_eq!(parsed, a.to_historical());
        assert_eq!(parsed.serialize(), a.serialize());
    }

    #[test]
    fn test_parse_rejects_malformed_text() {
        assert!(matches!(
            Snapshot::<Historical>::parse("not json"),
            Err(ChangeDetectionError::MalformedSnapshot { .. })
        ));
        assert!(matches!(
            Snapshot::<Historical>::parse(r#"{"checksum":"x"}"#),
            Err(ChangeDetectionError::MalformedSnapshot { .. })
        ));
        assert!(matches!(
            Snapshot::<Historical>::parse(r#"{"checksum":"x","docid":"a%zz"}"#),
            Err(ChangeDetectionError::Identity(_))
        ));
    }

    #[test]
    fn test_checksum_excludes_key_columns() {
        let a = live(row());
        let renamed = live(row().with("lastName", "last_02"));
        assert_ne!(a.docid(), renamed.docid());
        assert_eq!(a.checksum(), renamed.checksum());
    }

    #[test]
    fn test_erased_historical_snapshot_cannot_materialize() {
        let detector = |_: &[u8]| "text/plain".to_string();
        let policy = ContentPolicy::default();

        let historical: AnySnapshot = live(row()).into_historical().into();
        let err = historical.materialize(&policy, &detector).unwrap_err();
        assert!(matches!(err, ChangeDetectionError::HistoricalMaterialize(_)));

        let current: AnySnapshot = live(row()).into();
        let doc = current.materialize(&policy, &detector).unwrap();
        assert_eq!(doc.docid.as_str(), "1/last_01");
        assert_eq!(doc.content, ContentOutcome::Empty);
    }

    #[test]
    fn test_large_object_changes_checksum() {
        let plain = live(row());
        let with_blob = Snapshot::capture(
            &["id", "lastName"],
            row(),
            Some(b"%PDF-1.4".to_vec()),
            &Sha256Checksummer,
        )
        .unwrap();
        assert_ne!(plain.checksum(), with_blob.checksum());
        assert!(!with_blob.large_object().unwrap().is_classified());
    }
}
