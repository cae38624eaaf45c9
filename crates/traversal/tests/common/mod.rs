//! In-memory table standing in for a database connection.

#![allow(dead_code)]

use std::cmp::Ordering;

use sync_core::{Row, RowValue};
use traversal::{PagePosition, PageRequest, RowSource, RowSourceError};

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Rows ordered by `id`, served a page at a time.
#[derive(Debug, Default)]
pub struct Table {
    pub rows: Vec<Row>,
    pub requests: Vec<PageRequest>,
    /// Fail these (1-based) fetch calls with a connectivity error.
    pub unreachable_on: Vec<usize>,
}

impl Table {
    pub fn with_ids(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            rows: ids.into_iter().map(person).collect(),
            ..Self::default()
        }
    }

    pub fn set_email(&mut self, id: i64, email: &str) {
        for row in &mut self.rows {
            if row.get("id") == Some(&RowValue::Int64(id)) {
                row.insert("email", email);
            }
        }
    }

    pub fn delete(&mut self, id: i64) {
        self.rows.retain(|row| row.get("id") != Some(&RowValue::Int64(id)));
    }

    pub fn positions(&self) -> Vec<PagePosition> {
        self.requests.iter().map(|r| r.position.clone()).collect()
    }
}

pub fn person(id: i64) -> Row {
    Row::new()
        .with("id", id)
        .with("lastName", format!("last_{id:02}"))
        .with("email", format!("user{id}@example.com"))
}

impl RowSource for Table {
    fn fetch(&mut self, request: &PageRequest) -> Result<Vec<Row>, RowSourceError> {
        self.requests.push(request.clone());
        if self.unreachable_on.contains(&self.requests.len()) {
            return Err(RowSourceError::Connectivity("connection refused".to_string()));
        }
        let rows: Vec<Row> = match &request.position {
            PagePosition::Offset(skip) => self
                .rows
                .iter()
                .skip(*skip as usize)
                .take(request.page_size)
                .cloned()
                .collect(),
            PagePosition::After { column, key } => self
                .rows
                .iter()
                .filter(|row| {
                    row.get(column)
                        .is_some_and(|v| v.total_cmp(key) == Ordering::Greater)
                })
                .take(request.page_size)
                .cloned()
                .collect(),
        };
        Ok(rows)
    }
}
