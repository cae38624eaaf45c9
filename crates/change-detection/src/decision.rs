//! NONE / ADD / UPDATE decisions.

use docid::DocId;
use tracing::trace;

use crate::snapshot::{Historical, Live, Snapshot};
use crate::{ChangeDetectionError, Result};

/// Kind of change a row represents relative to the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    None,
    Add,
    Update,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "NONE"),
            Self::Add => write!(f, "ADD"),
            Self::Update => write!(f, "UPDATE"),
        }
    }
}

/// Outcome of comparing a live snapshot against its reference.
///
/// `Add` and `Update` hand the live snapshot back so the caller can
/// materialize it. `None` keeps only the historical form; the live content
/// is discarded unread.
#[derive(Debug, Clone)]
pub enum Decision {
    None(Snapshot<Historical>),
    Add(Snapshot<Live>),
    Update(Snapshot<Live>),
}

impl Decision {
    pub fn kind(&self) -> ChangeKind {
        match self {
            Self::None(_) => ChangeKind::None,
            Self::Add(_) => ChangeKind::Add,
            Self::Update(_) => ChangeKind::Update,
        }
    }

    /// Check if the row needs to be (re)delivered.
    pub fn is_changed(&self) -> bool {
        !matches!(self, Self::None(_))
    }

    pub fn docid(&self) -> &DocId {
        match self {
            Self::None(s) => s.docid(),
            Self::Add(s) | Self::Update(s) => s.docid(),
        }
    }

    /// The live snapshot to deliver, if any.
    pub fn into_live(self) -> Option<Snapshot<Live>> {
        match self {
            Self::None(_) => None,
            Self::Add(s) | Self::Update(s) => Some(s),
        }
    }
}

/// Compare a live snapshot with the baseline's snapshot of the same row.
///
/// - no reference: `Add`
/// - byte-equal serialized forms: `None`
/// - otherwise: `Update`, with any cached content classification dropped
///
/// Pure: calling it twice with equal inputs gives the same decision.
///
/// # Errors
///
/// [`ChangeDetectionError::IdentityMismatch`] if the reference belongs to a
/// different row.
pub fn decide(mut live: Snapshot<Live>, reference: Option<&Snapshot<Historical>>) -> Result<Decision> {
    let Some(reference) = reference else {
        trace!("No reference for {}: ADD", live.docid());
        return Ok(Decision::Add(live));
    };

    if reference.docid() != live.docid() {
        return Err(ChangeDetectionError::IdentityMismatch {
            live: live.docid().clone(),
            reference: reference.docid().clone(),
        });
    }

    if live.serialize() == reference.serialize() {
        trace!("Unchanged {}: NONE", live.docid());
        return Ok(Decision::None(live.into_historical()));
    }

    trace!(
        "Checksum of {} changed from {} to {}: UPDATE",
        live.docid(),
        reference.checksum(),
        live.checksum()
    );
    live.reset_content();
    Ok(Decision::Update(live))
}
