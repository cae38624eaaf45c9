//! Core types for the table-sync framework.
//!
//! This crate provides the foundational types shared by every other crate
//! in the workspace:
//!
//! - [`ValueKind`] - The closed set of column value types the sync understands
//! - [`RowValue`] - A typed column value as read from the source table
//! - [`Row`] - A case-insensitively keyed column name to value mapping
//! - [`ValueError`] - Errors raised while parsing values from text
//!
//! # Architecture
//!
//! ```text
//! sync-core (this crate)
//!    │
//!    ├─── docid             (encodes primary-key values into row identities)
//!    ├─── change-detection  (checksums rows and decides NONE/ADD/UPDATE)
//!    └─── traversal         (paginates the source table batch by batch)
//! ```
//!
//! # Example
//!
//! ```rust
//! use sync_core::{Row, RowValue};
//!
//! let row = Row::new()
//!     .with("ID", RowValue::Int32(1))
//!     .with("lastName", RowValue::Text("last_01".to_string()));
//!
//! assert_eq!(row.get("id"), Some(&RowValue::Int32(1)));
//! assert_eq!(row.get("LASTNAME"), Some(&RowValue::Text("last_01".to_string())));
//! ```

pub mod error;
pub mod row;
pub mod types;
pub mod values;

pub use error::ValueError;
pub use row::Row;
pub use types::ValueKind;
pub use values::RowValue;
