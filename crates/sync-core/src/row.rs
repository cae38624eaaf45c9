//! Case-insensitive row representation.

use std::collections::BTreeMap;

use crate::RowValue;

/// One column of a [`Row`], keeping the spelling the source reported.
#[derive(Debug, Clone, PartialEq)]
struct Column {
    name: String,
    value: RowValue,
}

/// A single row read from the source table.
///
/// Column lookups are case-insensitive: `get("ID")` and `get("id")` find the
/// same column. Iteration is in lowercase-name order, which gives checksums
/// a stable column order regardless of how the driver ordered the result
/// set. Inserting a column whose name differs only by case replaces the
/// earlier one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: BTreeMap<String, Column>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column to the row (builder style).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<RowValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a column.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<RowValue>) {
        let name = name.into();
        self.columns.insert(
            name.to_lowercase(),
            Column {
                name,
                value: value.into(),
            },
        );
    }

    /// Remove a column by case-insensitive name, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<RowValue> {
        self.columns.remove(&name.to_lowercase()).map(|c| c.value)
    }

    /// Get a column value by case-insensitive name.
    pub fn get(&self, name: &str) -> Option<&RowValue> {
        self.columns.get(&name.to_lowercase()).map(|c| &c.value)
    }

    /// Get a column by case-insensitive name, returning the name as the
    /// source spelled it.
    pub fn get_entry(&self, name: &str) -> Option<(&str, &RowValue)> {
        self.columns
            .get(&name.to_lowercase())
            .map(|c| (c.name.as_str(), &c.value))
    }

    /// Check if the row has a column with this name (case-insensitive).
    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(&name.to_lowercase())
    }

    /// Iterate over `(name, value)` pairs in lowercase-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValue)> {
        self.columns.values().map(|c| (c.name.as_str(), &c.value))
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<N: Into<String>, V: Into<RowValue>> FromIterator<(N, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (name, value) in iter {
            row.insert(name, value);
        }
        row
    }
}
