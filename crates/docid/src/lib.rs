//! Row identity encoding for table-sync.
//!
//! A row's identity ("docid") is its ordered primary-key values rendered as
//! text and joined into one token. The token is deterministic, survives a
//! round trip through [`decode`], and orders meaningfully (see
//! [`compare_components`]).
//!
//! ```rust
//! use docid::{decode, encode};
//! use sync_core::{Row, RowValue};
//!
//! let row = Row::new()
//!     .with("id", RowValue::Int32(1))
//!     .with("lastName", "last_01");
//!
//! let id = encode(&["id", "lastName"], &row).unwrap();
//! assert_eq!(id.as_str(), "1/last_01");
//! assert_eq!(decode(id.as_str()).unwrap(), vec!["1", "last_01"]);
//! ```

mod codec;
mod error;
mod id;
pub mod legacy;

pub use codec::{decode, encode, escape, render_component, unescape, DELIMITER};
pub use error::{DocIdError, Result};
pub use id::{compare_components, DocId};
pub use legacy::{legacy_adapt, lookup_keys, to_lookup_key, LookupKey};
