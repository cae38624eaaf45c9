//! Traversal configuration.
//!
//! ```toml
//! instance = "employees"
//! primary_keys = ["id", "lastName"]
//! large_object_column = "resume"
//! checkpoint_dir = "/var/lib/table-sync"
//!
//! [pagination]
//! mode = "key_continuation"
//! key_column = "id"
//! key_type = "big_int"
//! min_key = "0"
//! page_size = 500
//!
//! [content]
//! supported = ["application/pdf", "text/*"]
//! excluded = ["application/x-msdownload"]
//! ```

use std::path::Path;

use change_detection::ContentPolicy;
use checkpoint::CheckpointConfig;
use serde::Deserialize;
use sync_core::{RowValue, ValueKind};

use crate::cursor::Pagination;
use crate::error::ConfigError;

/// Rows fetched per batch when no page size is configured.
pub const DEFAULT_PAGE_SIZE: usize = 100;

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_instance() -> String {
    "default".to_string()
}

/// How the source table is paginated. Fixed for the lifetime of a cursor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PaginationConfig {
    /// `LIMIT page_size OFFSET skip`.
    Offset {
        #[serde(default = "default_page_size")]
        page_size: usize,
    },

    /// `WHERE key_column > last_key ORDER BY key_column LIMIT page_size`.
    KeyContinuation {
        key_column: String,
        key_type: ValueKind,
        min_key: String,
        #[serde(default = "default_page_size")]
        page_size: usize,
    },
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self::Offset {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationConfig {
    pub fn page_size(&self) -> usize {
        match self {
            Self::Offset { page_size } | Self::KeyContinuation { page_size, .. } => *page_size,
        }
    }
}

/// Configuration of one connector instance.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TraversalConfig {
    /// Connector instance name, used to key checkpoints.
    #[serde(default = "default_instance")]
    pub instance: String,

    /// Primary key column names, in identity order.
    #[serde(default)]
    pub primary_keys: Vec<String>,

    #[serde(default)]
    pub pagination: PaginationConfig,

    /// MIME types served with documents and MIME types that reject a row.
    #[serde(default)]
    pub content: ContentPolicy,

    /// Column holding a BLOB/CLOB payload.
    #[serde(default)]
    pub large_object_column: Option<String>,

    /// Column holding a URL whose body is the payload.
    #[serde(default)]
    pub url_column: Option<String>,

    /// Directory for cursor checkpoints. Checkpointing is disabled when
    /// unset.
    #[serde(default)]
    pub checkpoint_dir: Option<String>,
}

impl TraversalConfig {
    /// Offset-paginated configuration with default settings.
    pub fn new<S: Into<String>>(primary_keys: impl IntoIterator<Item = S>) -> Self {
        Self {
            instance: default_instance(),
            primary_keys: primary_keys.into_iter().map(Into::into).collect(),
            pagination: PaginationConfig::default(),
            content: ContentPolicy::default(),
            large_object_column: None,
            url_column: None,
            checkpoint_dir: None,
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file without validating it, for callers that
    /// complete the configuration from other sources first.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Check the configuration for mistakes that would otherwise only show
    /// up once rows are read.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.primary_keys.is_empty() {
            return Err(ConfigError::NoPrimaryKeys);
        }
        if self.primary_keys.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::BlankPrimaryKey);
        }
        if self.pagination.page_size() == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if let PaginationConfig::KeyContinuation { key_column, .. } = &self.pagination {
            if key_column.trim().is_empty() {
                return Err(ConfigError::MissingKeyColumn);
            }
        }
        if self.large_object_column.is_some() && self.url_column.is_some() {
            return Err(ConfigError::ConflictingContentColumns);
        }
        self.initial_pagination()?;
        Ok(())
    }

    /// Cursor state at the start of a cycle.
    pub fn initial_pagination(&self) -> Result<Pagination, ConfigError> {
        Ok(match &self.pagination {
            PaginationConfig::Offset { page_size } => Pagination::offset(*page_size),
            PaginationConfig::KeyContinuation {
                key_column,
                key_type,
                min_key,
                page_size,
            } => Pagination::key_continuation(
                key_column.clone(),
                RowValue::parse(*key_type, min_key)?,
                *page_size,
            ),
        })
    }

    /// Checkpoint settings for this instance.
    pub fn checkpoint_config(&self) -> CheckpointConfig {
        match &self.checkpoint_dir {
            Some(dir) => CheckpointConfig::filesystem(&self.instance, dir),
            None => CheckpointConfig::disabled(&self.instance),
        }
    }
}
