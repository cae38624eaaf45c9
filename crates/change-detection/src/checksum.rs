//! Row checksums.
//!
//! A checksum is an opaque digest over a row's non-key content (and any
//! large-object payload). It is compared for equality only.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sync_core::Row;

/// Separates fields in the canonical checksum input.
const UNIT_SEPARATOR: u8 = 0x1f;

/// Separates the row content from the large-object payload.
const RECORD_SEPARATOR: u8 = 0x1e;

/// Opaque row digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowChecksum(String);

impl RowChecksum {
    pub fn new(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RowChecksum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computes checksums over row content.
pub trait Checksummer {
    /// Digest `content` (the row without its key columns) and the optional
    /// large-object payload.
    fn checksum(&self, content: &Row, large_object: Option<&[u8]>) -> RowChecksum;
}

impl<F> Checksummer for F
where
    F: Fn(&Row, Option<&[u8]>) -> RowChecksum,
{
    fn checksum(&self, content: &Row, large_object: Option<&[u8]>) -> RowChecksum {
        self(content, large_object)
    }
}

/// SHA-256 over a canonical rendering of the row.
///
/// Columns are visited in lowercase-name order and rendered as
/// `name=kind:value`, so neither result-set column order nor column-name
/// case changes the digest, while a type change with the same text does.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Checksummer;

impl Checksummer for Sha256Checksummer {
    fn checksum(&self, content: &Row, large_object: Option<&[u8]>) -> RowChecksum {
        let mut hasher = Sha256::new();
        for (name, value) in content.iter() {
            hasher.update(name.to_lowercase().as_bytes());
            hasher.update(b"=");
            hasher.update(value.kind().as_str().as_bytes());
            hasher.update(b":");
            match value.as_bytes() {
                Some(bytes) => hasher.update(bytes),
                None => hasher.update(value.to_string().as_bytes()),
            }
            hasher.update([UNIT_SEPARATOR]);
        }
        if let Some(payload) = large_object {
            hasher.update([RECORD_SEPARATOR]);
            hasher.update(payload);
        }
        RowChecksum(hex::encode(hasher.finalize()))
    }
}

/// The row without the named key columns (matched case-insensitively).
pub fn non_key_content<S: AsRef<str>>(row: &Row, key_names: &[S]) -> Row {
    let keys: Vec<String> = key_names.iter().map(|k| k.as_ref().to_lowercase()).collect();
    row.iter()
        .filter(|(name, _)| !keys.contains(&name.to_lowercase()))
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}
