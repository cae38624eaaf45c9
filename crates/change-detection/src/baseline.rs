//! Persisted baseline of delivered snapshots.

use std::collections::HashMap;

use docid::DocId;

use crate::snapshot::{Historical, Snapshot};
use crate::Result;

/// Stores the last delivered snapshot of every row.
///
/// Entries are looked up one identity at a time while traversing and only
/// change after a row's decision has been fully handled.
pub trait BaselineStore {
    /// Reference snapshot for `docid`, if the row was delivered before.
    fn lookup(&self, docid: &DocId) -> Result<Option<Snapshot<Historical>>>;

    /// Record `snapshot` as the delivered state of its row.
    fn commit(&mut self, snapshot: &Snapshot<Historical>) -> Result<()>;

    /// Forget a row, e.g. after its deletion was delivered.
    fn remove(&mut self, docid: &DocId) -> Result<()>;

    /// Every identity in the baseline, in identity order.
    fn identities(&self) -> Result<Vec<DocId>>;
}

impl<T: BaselineStore + ?Sized> BaselineStore for Box<T> {
    fn lookup(&self, docid: &DocId) -> Result<Option<Snapshot<Historical>>> {
        (**self).lookup(docid)
    }

    fn commit(&mut self, snapshot: &Snapshot<Historical>) -> Result<()> {
        (**self).commit(snapshot)
    }

    fn remove(&mut self, docid: &DocId) -> Result<()> {
        (**self).remove(docid)
    }

    fn identities(&self) -> Result<Vec<DocId>> {
        (**self).identities()
    }
}

/// In-memory baseline holding serialized snapshots keyed by identity.
#[derive(Debug, Default, Clone)]
pub struct MemoryBaseline {
    entries: HashMap<DocId, String>,
}

impl MemoryBaseline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The raw serialized entry for `docid`.
    pub fn get_raw(&self, docid: &DocId) -> Option<&str> {
        self.entries.get(docid).map(String::as_str)
    }
}

impl BaselineStore for MemoryBaseline {
    fn lookup(&self, docid: &DocId) -> Result<Option<Snapshot<Historical>>> {
        self.entries
            .get(docid)
            .map(|text| Snapshot::<Historical>::parse(text))
            .transpose()
    }

    fn commit(&mut self, snapshot: &Snapshot<Historical>) -> Result<()> {
        self.entries
            .insert(snapshot.docid().clone(), snapshot.serialize());
        Ok(())
    }

    fn remove(&mut self, docid: &DocId) -> Result<()> {
        self.entries.remove(docid);
        Ok(())
    }

    fn identities(&self) -> Result<Vec<DocId>> {
        let mut ids: Vec<DocId> = self.entries.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
