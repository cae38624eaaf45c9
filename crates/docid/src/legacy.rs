//! Reconciliation of legacy and current identifier formats.
//!
//! Two identifier formats are in circulation:
//!
//! - **current**: the delimiter-joined token produced by [`crate::encode`],
//!   e.g. `1/last_01`
//! - **legacy**: the comma-joined raw key values escaped as one opaque
//!   value, e.g. `1%2Clast_01`
//!
//! Batch lookups (such as authorization checks) receive a mix of both and
//! answer with the set of comma-joined raw key values that exist. This
//! module maps those answers back to the identifiers the caller supplied.

use std::collections::HashSet;

use tracing::debug;

use crate::codec::{decode, unescape, DELIMITER};
use crate::{DocIdError, Result};

/// One identifier of a lookup batch, paired with its comma-joined key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupKey {
    /// The identifier exactly as the caller supplied it.
    pub original: String,
    /// Comma-joined raw key values.
    pub key: String,
}

/// Convert one identifier of either format into its comma-joined key.
pub fn to_lookup_key(identifier: &str) -> Result<String> {
    if identifier.contains(DELIMITER) {
        return Ok(decode(identifier)?.join(","));
    }
    unescape(identifier).map_err(|reason| DocIdError::decode(identifier, reason))
}

/// Compute lookup keys for a batch, dropping identifiers that fail to
/// decode. Dropped identifiers are treated downstream as absent.
pub fn lookup_keys<S: AsRef<str>>(identifiers: &[S]) -> Vec<LookupKey> {
    identifiers
        .iter()
        .filter_map(|identifier| {
            let identifier = identifier.as_ref();
            match to_lookup_key(identifier) {
                Ok(key) => Some(LookupKey {
                    original: identifier.to_string(),
                    key,
                }),
                Err(e) => {
                    debug!("Dropping identifier from lookup batch: {}", e);
                    None
                }
            }
        })
        .collect()
}

/// Resolve a mixed batch of legacy and current identifiers.
///
/// `query` receives the comma-joined keys of every identifier that decoded
/// and returns the subset that exists. The result holds the original
/// identifier of each match, in input order. A decode failure drops only
/// that identifier; an error from `query` aborts the batch.
pub fn legacy_adapt<S, F, E>(identifiers: &[S], query: F) -> std::result::Result<Vec<String>, E>
where
    S: AsRef<str>,
    F: FnOnce(&[String]) -> std::result::Result<HashSet<String>, E>,
{
    let keys = lookup_keys(identifiers);
    let raw: Vec<String> = keys.iter().map(|k| k.key.clone()).collect();
    let found = query(&raw)?;

    Ok(keys
        .into_iter()
        .filter(|k| found.contains(&k.key))
        .map(|k| k.original)
        .collect())
}
