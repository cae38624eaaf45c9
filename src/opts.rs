//! Command-line options a host can flatten into its own CLI.

use std::path::PathBuf;

use anyhow::{Context, Result};
use checkpoint::Checkpoint;
use clap::Parser;
use sync_core::ValueKind;
use traversal::{CursorCheckpoint, PaginationConfig, TraversalConfig, DEFAULT_PAGE_SIZE};

#[derive(Parser, Clone, Debug)]
pub struct TraversalOpts {
    /// TOML configuration file. Flags given alongside it override its values
    #[arg(long, env = "TABLE_SYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Connector instance name, used to key checkpoints
    #[arg(long, env = "TABLE_SYNC_INSTANCE")]
    pub instance: Option<String>,

    /// Primary key columns, in identity order (comma-separated)
    #[arg(long, value_delimiter = ',', env = "TABLE_SYNC_PRIMARY_KEYS")]
    pub primary_keys: Vec<String>,

    /// Rows per batch
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Paginate with `key > last_key` over this column instead of offsets
    #[arg(long)]
    pub key_column: Option<String>,

    /// Type of the key column (e.g. int, big_int, text, timestamp)
    #[arg(long, default_value = "big_int")]
    pub key_type: ValueKind,

    /// Value sorting before every key in the table
    #[arg(long, default_value = "0")]
    pub min_key: String,

    /// Column holding a BLOB/CLOB payload
    #[arg(long)]
    pub large_object_column: Option<String>,

    /// Column holding a URL to fetch the payload from
    #[arg(long)]
    pub url_column: Option<String>,

    /// Directory for cursor checkpoints
    #[arg(long, env = "TABLE_SYNC_CHECKPOINT_DIR")]
    pub checkpoint_dir: Option<String>,

    /// Start from this cursor position (e.g. `offset:200:50`)
    #[arg(long)]
    pub resume_from: Option<String>,
}

impl TraversalOpts {
    /// Build the traversal configuration: the config file if one is given,
    /// with flags layered on top, then validated.
    pub fn to_config(&self) -> Result<TraversalConfig> {
        let mut config = match &self.config {
            Some(path) => TraversalConfig::read(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => TraversalConfig::new(Vec::<String>::new()),
        };

        if let Some(instance) = &self.instance {
            config.instance = instance.clone();
        }
        if !self.primary_keys.is_empty() {
            config.primary_keys = self.primary_keys.clone();
        }
        if let Some(key_column) = &self.key_column {
            config.pagination = PaginationConfig::KeyContinuation {
                key_column: key_column.clone(),
                key_type: self.key_type,
                min_key: self.min_key.clone(),
                page_size: config.pagination.page_size(),
            };
        }
        if let Some(page_size) = self.page_size {
            match &mut config.pagination {
                PaginationConfig::Offset { page_size: p }
                | PaginationConfig::KeyContinuation { page_size: p, .. } => *p = page_size,
            }
        }
        if self.large_object_column.is_some() {
            config.large_object_column = self.large_object_column.clone();
        }
        if self.url_column.is_some() {
            config.url_column = self.url_column.clone();
        }
        if self.checkpoint_dir.is_some() {
            config.checkpoint_dir = self.checkpoint_dir.clone();
        }

        config.validate().context("Invalid traversal configuration")?;
        Ok(config)
    }

    /// Parse `--resume-from`, if given.
    pub fn resume_from(&self) -> Result<Option<CursorCheckpoint>> {
        self.resume_from
            .as_deref()
            .map(CursorCheckpoint::from_cli_string)
            .transpose()
    }
}

impl Default for TraversalOpts {
    fn default() -> Self {
        Self {
            config: None,
            instance: None,
            primary_keys: Vec::new(),
            page_size: None,
            key_column: None,
            key_type: ValueKind::Int64,
            min_key: "0".to_string(),
            large_object_column: None,
            url_column: None,
            checkpoint_dir: None,
            resume_from: None,
        }
    }
}
