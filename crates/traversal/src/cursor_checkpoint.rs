//! Cursor positions persisted through the checkpoint crate.

use anyhow::{anyhow, bail, Context};
use checkpoint::Checkpoint;
use serde::{Deserialize, Serialize};
use sync_core::{RowValue, ValueKind};

use crate::cursor::Pagination;

/// A cursor position.
///
/// CLI form is `offset:<skip>:<page_size>` or
/// `key:<page_size>:<key_type>:<last_key>`, e.g. `offset:200:50` or
/// `key:50:big_int:1042`. The key text comes last so it may contain `:`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CursorCheckpoint {
    Offset { skip: u64, page_size: usize },
    Key { last_key: RowValue, page_size: usize },
}

impl CursorCheckpoint {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Offset { .. } => "offset",
            Self::Key { .. } => "key",
        }
    }
}

impl From<&Pagination> for CursorCheckpoint {
    fn from(pagination: &Pagination) -> Self {
        match pagination {
            Pagination::Offset { skip, page_size } => Self::Offset {
                skip: *skip,
                page_size: *page_size,
            },
            Pagination::KeyContinuation {
                last_key,
                page_size,
                ..
            } => Self::Key {
                last_key: last_key.clone(),
                page_size: *page_size,
            },
        }
    }
}

impl Checkpoint for CursorCheckpoint {
    const CHECKPOINT_TYPE: &'static str = "cursor";

    fn to_cli_string(&self) -> String {
        match self {
            Self::Offset { skip, page_size } => format!("offset:{skip}:{page_size}"),
            Self::Key {
                last_key,
                page_size,
            } => format!("key:{page_size}:{}:{last_key}", last_key.kind()),
        }
    }

    fn from_cli_string(s: &str) -> anyhow::Result<Self> {
        let (mode, rest) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("Invalid cursor checkpoint '{s}': missing mode"))?;
        match mode {
            "offset" => {
                let (skip, page_size) = rest.split_once(':').ok_or_else(|| {
                    anyhow!("Invalid cursor checkpoint '{s}': expected offset:<skip>:<page_size>")
                })?;
                Ok(Self::Offset {
                    skip: skip
                        .parse()
                        .with_context(|| format!("Invalid skip in cursor checkpoint '{s}'"))?,
                    page_size: page_size
                        .parse()
                        .with_context(|| format!("Invalid page size in cursor checkpoint '{s}'"))?,
                })
            }
            "key" => {
                let mut parts = rest.splitn(3, ':');
                let (Some(page_size), Some(kind), Some(key)) =
                    (parts.next(), parts.next(), parts.next())
                else {
                    bail!("Invalid cursor checkpoint '{s}': expected key:<page_size>:<key_type>:<last_key>");
                };
                let kind: ValueKind = kind
                    .parse()
                    .with_context(|| format!("Invalid key type in cursor checkpoint '{s}'"))?;
                Ok(Self::Key {
                    last_key: RowValue::parse(kind, key)
                        .with_context(|| format!("Invalid key in cursor checkpoint '{s}'"))?,
                    page_size: page_size
                        .parse()
                        .with_context(|| format!("Invalid page size in cursor checkpoint '{s}'"))?,
                })
            }
            other => bail!("Unknown cursor checkpoint mode '{other}' in '{s}'"),
        }
    }
}
