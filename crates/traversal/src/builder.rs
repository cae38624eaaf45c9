//! Default row-to-snapshot conversion.

use change_detection::{Checksummer, DocId, Live, Sha256Checksummer, Snapshot};
use sync_core::{Row, RowValue};
use tracing::trace;

use crate::config::TraversalConfig;
use crate::error::BuildError;
use crate::mode::ExecutionMode;
use crate::source::{ContentFetcher, DocumentBuilder};

/// Builds snapshots keyed on the configured primary keys, taking the
/// payload from wherever the [`ExecutionMode`] says.
pub struct SnapshotBuilder {
    key_names: Vec<String>,
    mode: ExecutionMode,
    checksummer: Box<dyn Checksummer>,
    fetcher: Option<Box<dyn ContentFetcher>>,
}

impl SnapshotBuilder {
    pub fn new(key_names: Vec<String>, mode: ExecutionMode) -> Self {
        Self {
            key_names,
            mode,
            checksummer: Box::new(Sha256Checksummer),
            fetcher: None,
        }
    }

    /// Builder for a configuration, with the mode classified from it.
    pub fn from_config(config: &TraversalConfig) -> Self {
        Self::new(config.primary_keys.clone(), ExecutionMode::classify(config))
    }

    pub fn with_checksummer(mut self, checksummer: impl Checksummer + 'static) -> Self {
        self.checksummer = Box::new(checksummer);
        self
    }

    /// Set the fetcher used in URL mode.
    pub fn with_fetcher(mut self, fetcher: impl ContentFetcher + 'static) -> Self {
        self.fetcher = Some(Box::new(fetcher));
        self
    }

    pub fn mode(&self) -> &ExecutionMode {
        &self.mode
    }

    fn capture(&self, row: Row, payload: Option<Vec<u8>>) -> Result<Snapshot<Live>, BuildError> {
        Ok(Snapshot::capture(
            self.key_names.as_slice(),
            row,
            payload,
            self.checksummer.as_ref(),
        )?)
    }
}

impl DocumentBuilder for SnapshotBuilder {
    fn build(&self, row: &Row) -> Result<Option<Snapshot<Live>>, BuildError> {
        match &self.mode {
            ExecutionMode::Metadata => self.capture(row.clone(), None).map(Some),
            ExecutionMode::LargeObject { column } => {
                let mut fields = row.clone();
                let payload = match fields.remove(column) {
                    None | Some(RowValue::Null) => None,
                    Some(RowValue::Bytes(bytes)) => Some(bytes),
                    Some(RowValue::Text(text)) => Some(text.into_bytes()),
                    Some(other) => {
                        return Err(BuildError::Invalid(format!(
                            "Large-object column '{column}' holds a {} value",
                            other.kind()
                        )))
                    }
                };
                self.capture(fields, payload).map(Some)
            }
            ExecutionMode::Url { column } => {
                let url = match row.get(column) {
                    None | Some(RowValue::Null) => {
                        trace!("Row has no URL in column '{}', skipping", column);
                        return Ok(None);
                    }
                    Some(RowValue::Text(url)) => url,
                    Some(other) => {
                        return Err(BuildError::Invalid(format!(
                            "URL column '{column}' holds a {} value",
                            other.kind()
                        )))
                    }
                };
                let fetcher = self.fetcher.as_ref().ok_or_else(|| {
                    BuildError::Invalid("URL mode requires a content fetcher".to_string())
                })?;
                let payload = fetcher.fetch(url)?;
                self.capture(row.clone(), Some(payload)).map(Some)
            }
        }
    }

    fn identify(&self, row: &Row) -> Option<DocId> {
        change_detection::identify(self.key_names.as_slice(), row).ok()
    }
}
