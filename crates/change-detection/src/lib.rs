//! Change detection for table-sync.
//!
//! Every read of a row produces a live [`Snapshot`]: the row identity plus a
//! checksum of its non-key content. Comparing it with the snapshot recorded
//! in the [`BaselineStore`] when the row was last delivered yields a
//! [`Decision`]:
//!
//! - **ADD**: the baseline has no entry for the identity
//! - **NONE**: the serialized snapshots are byte-identical
//! - **UPDATE**: anything else
//!
//! Rows in the baseline that a full traversal cycle never produced are
//! reported by the [`DeletionSweep`].
//!
//! ```rust
//! use change_detection::{decide, ChangeKind, Sha256Checksummer, Snapshot};
//! use sync_core::{Row, RowValue};
//!
//! let row = Row::new()
//!     .with("id", RowValue::Int32(1))
//!     .with("lastName", "last_01");
//! let keys = ["id", "lastName"];
//!
//! let first = Snapshot::capture(&keys, row.clone(), None, &Sha256Checksummer).unwrap();
//! let reference = first.to_historical();
//! assert_eq!(decide(first, None).unwrap().kind(), ChangeKind::Add);
//!
//! let again = Snapshot::capture(&keys, row, None, &Sha256Checksummer).unwrap();
//! assert_eq!(decide(again, Some(&reference)).unwrap().kind(), ChangeKind::None);
//! ```

pub mod baseline;
pub mod checksum;
pub mod content;
mod decision;
pub mod deletion;
mod error;
pub mod snapshot;

pub use baseline::{BaselineStore, MemoryBaseline};
pub use checksum::{non_key_content, Checksummer, RowChecksum, Sha256Checksummer};
pub use content::{Classification, ContentOutcome, ContentPolicy, LazyContent, MimeDetector};
pub use decision::{decide, ChangeKind, Decision};
pub use deletion::{Deletion, DeletionSweep};
pub use error::{ChangeDetectionError, Result};
pub use docid::DocId;
pub use snapshot::{identify, AnySnapshot, Document, Historical, Live, Snapshot};
