//! The encoded row identity and its ordering.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sync_core::values::{DATE_FORMAT, TIMESTAMP_FORMAT, TIME_FORMAT};

use crate::codec::decode;
use crate::{DocIdError, Result};

/// An encoded composite primary key ("docid").
///
/// Equality and hashing are on the token bytes. Ordering is component-wise
/// over the decoded components, see [`compare_components`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(String);

impl DocId {
    /// Wrap a token produced by the encoder.
    pub(crate) fn from_encoded(token: String) -> Self {
        Self(token)
    }

    /// Parse a token received from outside (e.g. a persisted baseline),
    /// validating that every component decodes.
    pub fn parse(token: &str) -> Result<Self> {
        decode(token)?;
        Ok(Self(token.to_string()))
    }

    /// The token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decoded component texts, in key order.
    pub fn components(&self) -> Result<Vec<String>> {
        decode(&self.0)
    }

    /// Comma-joined decoded components, the form secondary lookups key on.
    pub fn lookup_key(&self) -> Result<String> {
        Ok(self.components()?.join(","))
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for DocId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DocId {
    type Err = DocIdError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Ord for DocId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.components(), other.components()) {
            (Ok(a), Ok(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    let ord = compare_components(x, y);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len()).then_with(|| self.0.cmp(&other.0))
            }
            // Tokens are validated on construction; fall back to raw bytes.
            _ => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for DocId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// What a decoded component looks like, recovered from its rendering.
///
/// Variant order is the cross-type precedence.
#[derive(Debug, Clone)]
enum Component {
    Null,
    Number(Number),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<chrono::FixedOffset>),
    Text,
}

#[derive(Debug, Clone, Copy)]
enum Number {
    Exact(Decimal),
    Approx(f64),
}

impl Component {
    fn classify(text: &str) -> Self {
        if text.is_empty() {
            return Self::Null;
        }
        if let Some(number) = parse_number(text) {
            return Self::Number(number);
        }
        if let Ok(d) = NaiveDate::parse_from_str(text, DATE_FORMAT) {
            return Self::Date(d);
        }
        if let Ok(t) = NaiveTime::parse_from_str(text, TIME_FORMAT) {
            return Self::Time(t);
        }
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT) {
            return Self::Timestamp(ts);
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
            return Self::TimestampTz(ts);
        }
        Self::Text
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Number(_) => 1,
            Self::Date(_) => 2,
            Self::Time(_) => 3,
            Self::Timestamp(_) => 4,
            Self::TimestampTz(_) => 5,
            Self::Text => 6,
        }
    }
}

fn parse_number(text: &str) -> Option<Number> {
    let first = text.as_bytes()[0];
    if !(first.is_ascii_digit() || first == b'-' || first == b'.') {
        return None;
    }
    if let Ok(d) = Decimal::from_str_exact(text) {
        return Some(Number::Exact(d));
    }
    if text.contains(['e', 'E']) {
        if let Ok(d) = Decimal::from_scientific(text) {
            return Some(Number::Exact(d));
        }
    }
    text.parse::<f64>().ok().map(Number::Approx)
}

fn compare_numbers(a: Number, b: Number) -> Ordering {
    match (a, b) {
        (Number::Exact(x), Number::Exact(y)) => x.cmp(&y),
        _ => to_f64(a).total_cmp(&to_f64(b)),
    }
}

fn to_f64(n: Number) -> f64 {
    match n {
        Number::Exact(d) => d.to_string().parse().unwrap_or(f64::NAN),
        Number::Approx(f) => f,
    }
}

/// Compare two decoded key components.
///
/// Each component is classified by its rendering: empty (null) first, then
/// numbers compared by value, dates, times, timestamps and zoned timestamps
/// in calendar order, and finally any other text by byte order.
pub fn compare_components(a: &str, b: &str) -> Ordering {
    let (ca, cb) = (Component::classify(a), Component::classify(b));
    let by_rank = ca.rank().cmp(&cb.rank());
    if by_rank != Ordering::Equal {
        return by_rank;
    }
    let ord = match (&ca, &cb) {
        (Component::Number(x), Component::Number(y)) => compare_numbers(*x, *y),
        (Component::Date(x), Component::Date(y)) => x.cmp(y),
        (Component::Time(x), Component::Time(y)) => x.cmp(y),
        (Component::Timestamp(x), Component::Timestamp(y)) => x.cmp(y),
        (Component::TimestampTz(x), Component::TimestampTz(y)) => x.cmp(y),
        _ => Ordering::Equal,
    };
    ord.then_with(|| a.as_bytes().cmp(b.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(token: &str) -> DocId {
        DocId::parse(token).unwrap()
    }

    #[test]
    fn test_parse_validates_escapes() {
        assert!(DocId::parse("1/last_01").is_ok());
        assert!(DocId::parse("1/bad%G1").is_err());
    }

    #[test]
    fn test_lookup_key_joins_decoded_components() {
        assert_eq!(id("1/a%2Cb+c").lookup_key().unwrap(), "1,a,b c");
    }

    #[test]
    fn test_numbers_order_by_value() {
        assert!(id("9") < id("10"));
        assert!(id("-10") < id("-9"));
        assert!(id("2.5") < id("3"));
        assert!(id("1e21") > id("99999"));
        assert_eq!(compare_components("1.50", "1.5"), Ordering::Greater);
    }

    #[test]
    fn test_temporal_order_is_calendar_order() {
        assert!(id("2023-12-31") < id("2024-01-01"));
        assert!(id("09:00:00") < id("10:00:00"));
        assert!(id("2024-01-01 09:00:00") < id("2024-01-01 10:00:00"));
        assert!(id("2024-01-01T09:00:00Z") < id("2024-01-02T00:00:00Z"));
    }

    #[test]
    fn test_text_orders_by_decoded_bytes() {
        assert!(id("B") < id("a"));
        assert!(id("a+b") < id("a%2Fb"));
    }

    #[test]
    fn test_composite_compares_component_wise() {
        assert!(id("1/z") < id("2/a"));
        assert!(id("2/a") < id("2/b"));
        assert!(id("2") < id("2/a"));
    }

    #[test]
    fn test_json_is_plain_string() {
        let json = serde_json::to_string(&id("1/x")).unwrap();
        assert_eq!(json, "\"1/x\"");
    }
}
