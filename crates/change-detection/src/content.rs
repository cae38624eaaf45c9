//! Lazy classification of large-object content.
//!
//! Some payloads (BLOB/CLOB columns, fetched URLs) cannot be typed without
//! looking at their bytes. Sniffing is left to a [`MimeDetector`]; this
//! module decides, once per snapshot and only when the content is actually
//! requested, whether the content is served, omitted, or the whole row is
//! rejected.

use std::cell::OnceCell;
use std::collections::BTreeSet;

use serde::Deserialize;

/// Determines the MIME type of a payload from its bytes.
pub trait MimeDetector {
    fn detect(&self, bytes: &[u8]) -> String;
}

impl<F> MimeDetector for F
where
    F: Fn(&[u8]) -> String,
{
    fn detect(&self, bytes: &[u8]) -> String {
        self(bytes)
    }
}

/// Which MIME types are indexed, and which reject the row outright.
///
/// Entries are matched case-insensitively, ignore parameters such as
/// `; charset=utf-8`, and may use a `type/*` wildcard. An empty `supported`
/// set accepts every type that is not excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContentPolicy {
    #[serde(default)]
    pub supported: BTreeSet<String>,
    #[serde(default)]
    pub excluded: BTreeSet<String>,
}

impl ContentPolicy {
    pub fn new<I, J, S, T>(supported: I, excluded: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            supported: supported
                .into_iter()
                .map(|s| normalize(&Into::<String>::into(s)))
                .collect(),
            excluded: excluded
                .into_iter()
                .map(|t| normalize(&Into::<String>::into(t)))
                .collect(),
        }
    }

    /// Classify a detected MIME type.
    pub fn classify(&self, mime: &str) -> Classification {
        let mime = normalize(mime);
        if matches_any(&self.excluded, &mime) {
            Classification::HardSkip(mime)
        } else if !self.supported.is_empty() && !matches_any(&self.supported, &mime) {
            Classification::SoftSkip(mime)
        } else {
            Classification::Accepted(mime)
        }
    }
}

fn normalize(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn matches_any(patterns: &BTreeSet<String>, mime: &str) -> bool {
    patterns.iter().any(|pattern| {
        let pattern = normalize(pattern);
        match pattern.strip_suffix("/*") {
            Some(major) => mime.split('/').next() == Some(major),
            None => pattern == mime,
        }
    })
}

/// Outcome of classifying a payload's MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Content is served with the document.
    Accepted(String),
    /// Type is outside the supported set: the document is delivered
    /// without content.
    SoftSkip(String),
    /// Type is on the exclusion list: the row is rejected.
    HardSkip(String),
}

/// Content resolved for a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentOutcome {
    /// The row carries no large-object payload.
    Empty,
    /// Payload accepted.
    Accepted { mime: String, bytes: Vec<u8> },
    /// Payload omitted from an otherwise delivered document.
    Omitted { mime: String },
    /// Row deliberately rejected because of its payload type.
    Rejected { mime: String },
}

impl ContentOutcome {
    /// Check if the row should be dropped rather than delivered.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// A payload whose classification is computed on first request.
#[derive(Debug, Clone)]
pub struct LazyContent {
    bytes: Vec<u8>,
    classification: OnceCell<Classification>,
}

impl LazyContent {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            classification: OnceCell::new(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Check if the payload has been classified yet.
    pub fn is_classified(&self) -> bool {
        self.classification.get().is_some()
    }

    /// Classify the payload, sniffing it on the first call only.
    pub fn classify(&self, policy: &ContentPolicy, detector: &dyn MimeDetector) -> &Classification {
        self.classification
            .get_or_init(|| policy.classify(&detector.detect(&self.bytes)))
    }

    /// Forget any cached classification so the next request recomputes it.
    pub fn invalidate(&mut self) {
        self.classification = OnceCell::new();
    }

    /// Resolve into the content delivered with a document.
    pub fn resolve(self, policy: &ContentPolicy, detector: &dyn MimeDetector) -> ContentOutcome {
        let classification = self.classify(policy, detector).clone();
        match classification {
            Classification::Accepted(mime) => ContentOutcome::Accepted {
                mime,
                bytes: self.bytes,
            },
            Classification::SoftSkip(mime) => ContentOutcome::Omitted { mime },
            Classification::HardSkip(mime) => ContentOutcome::Rejected { mime },
        }
    }
}
