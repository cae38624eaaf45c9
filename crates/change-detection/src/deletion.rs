//! End-of-cycle detection of rows that disappeared from the source.

use std::collections::HashSet;

use docid::DocId;
use tracing::debug;

use crate::baseline::BaselineStore;
use crate::Result;

/// A row present in the baseline but not seen during a full cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deletion {
    pub docid: DocId,
}

/// Collects identities seen during one traversal cycle.
#[derive(Debug, Default, Clone)]
pub struct DeletionSweep {
    seen: HashSet<DocId>,
}

impl DeletionSweep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a row was read in this cycle.
    pub fn observe(&mut self, docid: &DocId) {
        if !self.seen.contains(docid) {
            self.seen.insert(docid.clone());
        }
    }

    pub fn seen(&self) -> usize {
        self.seen.len()
    }

    /// Identities in `baseline` that were not observed, in identity order.
    pub fn finish<I>(&mut self, baseline: I) -> Vec<Deletion>
    where
        I: IntoIterator<Item = DocId>,
    {
        let mut deletions: Vec<Deletion> = baseline
            .into_iter()
            .filter(|docid| !self.seen.contains(docid))
            .map(|docid| Deletion { docid })
            .collect();
        deletions.sort_by(|a, b| a.docid.cmp(&b.docid));
        debug!(
            "Deletion sweep: {} seen, {} missing",
            self.seen.len(),
            deletions.len()
        );
        self.seen.clear();
        deletions
    }

    /// Finish the cycle against a baseline store.
    pub fn sweep(&mut self, store: &dyn BaselineStore) -> Result<Vec<Deletion>> {
        Ok(self.finish(store.identities()?))
    }
}
