//! Row-to-document strategy selection.

use crate::config::TraversalConfig;

/// Where a row's indexable payload comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionMode {
    /// The row's columns are the whole document.
    Metadata,
    /// A BLOB/CLOB column carries the payload.
    LargeObject { column: String },
    /// A column carries a URL whose body is the payload.
    Url { column: String },
}

impl ExecutionMode {
    /// Pick the mode a configuration asks for. A large-object column wins
    /// over a URL column; [`TraversalConfig::validate`] rejects setting both.
    pub fn classify(config: &TraversalConfig) -> Self {
        match (&config.large_object_column, &config.url_column) {
            (Some(column), _) => Self::LargeObject {
                column: column.clone(),
            },
            (None, Some(column)) => Self::Url {
                column: column.clone(),
            },
            (None, None) => Self::Metadata,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Metadata => "metadata",
            Self::LargeObject { .. } => "large_object",
            Self::Url { .. } => "url",
        }
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Metadata => write!(f, "metadata"),
            Self::LargeObject { column } | Self::Url { column } => {
                write!(f, "{}({column})", self.as_str())
            }
        }
    }
}
