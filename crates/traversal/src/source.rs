//! Collaborators the cursor reads rows through.

use change_detection::{DocId, Live, Snapshot};
use sync_core::{Row, RowValue};

use crate::error::{BuildError, RowSourceError};

/// Where the next page starts.
#[derive(Debug, Clone, PartialEq)]
pub enum PagePosition {
    /// Skip this many rows of the ordered table.
    Offset(u64),
    /// Rows whose `column` is strictly greater than `key`, in key order.
    After { column: String, key: RowValue },
}

/// One page query.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub position: PagePosition,
    pub page_size: usize,
}

/// Executes page queries against the source table.
///
/// Implementations own connection handling. A lost or refused connection
/// must be reported as [`RowSourceError::Connectivity`] so the cursor can
/// restart its cycle.
pub trait RowSource {
    fn fetch(&mut self, request: &PageRequest) -> Result<Vec<Row>, RowSourceError>;
}

impl<F> RowSource for F
where
    F: FnMut(&PageRequest) -> Result<Vec<Row>, RowSourceError>,
{
    fn fetch(&mut self, request: &PageRequest) -> Result<Vec<Row>, RowSourceError> {
        self(request)
    }
}

/// Turns a row into a live snapshot.
///
/// `Ok(None)` means the row deliberately produces no document.
pub trait DocumentBuilder {
    fn build(&self, row: &Row) -> Result<Option<Snapshot<Live>>, BuildError>;

    /// Identity of a row that [`build`](Self::build) failed on, if it can
    /// still be worked out. Such rows are kept out of the deletion sweep.
    fn identify(&self, _row: &Row) -> Option<DocId> {
        None
    }
}

impl<F> DocumentBuilder for F
where
    F: Fn(&Row) -> Result<Option<Snapshot<Live>>, BuildError>,
{
    fn build(&self, row: &Row) -> Result<Option<Snapshot<Live>>, BuildError> {
        self(row)
    }
}

/// Retrieves the body behind a URL column.
pub trait ContentFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, BuildError>;
}

impl<F> ContentFetcher for F
where
    F: Fn(&str) -> Result<Vec<u8>, BuildError>,
{
    fn fetch(&self, url: &str) -> Result<Vec<u8>, BuildError> {
        self(url)
    }
}
