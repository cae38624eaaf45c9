//! Value representations for rows read from the source table.
//!
//! `RowValue` is what a `RowSource` hands back for each column. The identity
//! codec, the checksum, and the key-continuation cursor all work on these
//! values without knowing which database driver produced them.

use crate::types::ValueKind;
use crate::ValueError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

/// Format used for `Time` literals.
pub const TIME_FORMAT: &str = "%H:%M:%S%.f";

/// Format used for `Timestamp` literals.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Format used for `Date` literals.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A typed column value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RowValue {
    /// SQL NULL
    Null,

    /// Boolean value
    Bool(bool),

    /// 8-bit signed integer
    Int8(i8),

    /// 16-bit signed integer
    Int16(i16),

    /// 32-bit signed integer
    Int32(i32),

    /// 64-bit signed integer
    Int64(i64),

    /// 32-bit floating point
    Float32(f32),

    /// 64-bit floating point
    Float64(f64),

    /// Exact decimal
    Decimal(Decimal),

    /// String value
    Text(String),

    /// Binary data
    Bytes(Vec<u8>),

    /// Calendar date
    Date(NaiveDate),

    /// Time of day
    Time(NaiveTime),

    /// Timestamp without timezone
    Timestamp(NaiveDateTime),

    /// Timestamp with timezone
    TimestampTz(DateTime<Utc>),

    /// UUID value
    Uuid(Uuid),
}

impl RowValue {
    /// Get the kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int8(_) => ValueKind::Int8,
            Self::Int16(_) => ValueKind::Int16,
            Self::Int32(_) => ValueKind::Int32,
            Self::Int64(_) => ValueKind::Int64,
            Self::Float32(_) => ValueKind::Float32,
            Self::Float64(_) => ValueKind::Float64,
            Self::Decimal(_) => ValueKind::Decimal,
            Self::Text(_) => ValueKind::Text,
            Self::Bytes(_) => ValueKind::Bytes,
            Self::Date(_) => ValueKind::Date,
            Self::Time(_) => ValueKind::Time,
            Self::Timestamp(_) => ValueKind::Timestamp,
            Self::TimestampTz(_) => ValueKind::TimestampTz,
            Self::Uuid(_) => ValueKind::Uuid,
        }
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as an i64, widening smaller integers.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int8(i) => Some(i64::from(*i)),
            Self::Int16(i) => Some(i64::from(*i)),
            Self::Int32(i) => Some(i64::from(*i)),
            Self::Int64(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as a byte slice.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Exact decimal view of an integral or decimal value.
    fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Decimal(d) => Some(*d),
            other => other.as_i64().map(Decimal::from),
        }
    }

    /// Approximate view of any numeric value.
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float32(f) => Some(f64::from(*f)),
            Self::Float64(f) => Some(*f),
            Self::Decimal(d) => d.to_string().parse().ok(),
            other => other.as_i64().map(|i| i as f64),
        }
    }

    /// Parse a value of the given kind from its literal text.
    ///
    /// This is the inverse of `Display` for every kind except `Bytes`, which
    /// has no literal form.
    pub fn parse(kind: ValueKind, text: &str) -> Result<Self, ValueError> {
        let invalid = || ValueError::InvalidLiteral {
            kind,
            text: text.to_string(),
        };
        let value = match kind {
            ValueKind::Null => Self::Null,
            ValueKind::Bool => Self::Bool(text.parse().map_err(|_| invalid())?),
            ValueKind::Int8 => Self::Int8(text.parse().map_err(|_| invalid())?),
            ValueKind::Int16 => Self::Int16(text.parse().map_err(|_| invalid())?),
            ValueKind::Int32 => Self::Int32(text.parse().map_err(|_| invalid())?),
            ValueKind::Int64 => Self::Int64(text.parse().map_err(|_| invalid())?),
            ValueKind::Float32 => Self::Float32(text.parse().map_err(|_| invalid())?),
            ValueKind::Float64 => Self::Float64(text.parse().map_err(|_| invalid())?),
            ValueKind::Decimal => Self::Decimal(text.parse().map_err(|_| invalid())?),
            ValueKind::Text => Self::Text(text.to_string()),
            ValueKind::Date => {
                Self::Date(NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| invalid())?)
            }
            ValueKind::Time => {
                Self::Time(NaiveTime::parse_from_str(text, TIME_FORMAT).map_err(|_| invalid())?)
            }
            ValueKind::Timestamp => Self::Timestamp(
                NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).map_err(|_| invalid())?,
            ),
            ValueKind::TimestampTz => Self::TimestampTz(
                DateTime::parse_from_rfc3339(text)
                    .map_err(|_| invalid())?
                    .with_timezone(&Utc),
            ),
            ValueKind::Uuid => Self::Uuid(text.parse().map_err(|_| invalid())?),
            ValueKind::Bytes => return Err(ValueError::Unparseable(kind)),
        };
        Ok(value)
    }

    /// Total order over values.
    ///
    /// Values of different kinds order by [`ValueKind::precedence`]. Within a
    /// kind: numbers by value (across all numeric kinds), temporal values in
    /// calendar order, text and bytes by byte order. NaN sorts after every
    /// other number.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        let (lk, rk) = (self.kind(), other.kind());
        if lk.precedence() != rk.precedence() {
            return lk.precedence().cmp(&rk.precedence());
        }
        match (self, other) {
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.as_bytes().cmp(b.as_bytes()),
            (Self::Bytes(a), Self::Bytes(b)) => a.cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Time(a), Self::Time(b)) => a.cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.cmp(b),
            (Self::TimestampTz(a), Self::TimestampTz(b)) => a.cmp(b),
            (Self::Uuid(a), Self::Uuid(b)) => a.cmp(b),
            (a, b) => match (a.as_decimal(), b.as_decimal()) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => {
                    let x = a.as_f64().unwrap_or(f64::NAN);
                    let y = b.as_f64().unwrap_or(f64::NAN);
                    x.total_cmp(&y)
                }
            },
        }
    }
}

impl std::fmt::Display for RowValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int8(i) => write!(f, "{i}"),
            Self::Int16(i) => write!(f, "{i}"),
            Self::Int32(i) => write!(f, "{i}"),
            Self::Int64(i) => write!(f, "{i}"),
            Self::Float32(x) => write!(f, "{x}"),
            Self::Float64(x) => write!(f, "{x}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Text(s) => f.write_str(s),
            Self::Bytes(b) => {
                for byte in b {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            Self::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Self::Time(t) => write!(f, "{}", t.format(TIME_FORMAT)),
            Self::Timestamp(ts) => write!(f, "{}", ts.format(TIMESTAMP_FORMAT)),
            Self::TimestampTz(ts) => {
                write!(
                    f,
                    "{}",
                    ts.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true)
                )
            }
            Self::Uuid(u) => write!(f, "{u}"),
        }
    }
}

impl From<&str> for RowValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RowValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i32> for RowValue {
    fn from(i: i32) -> Self {
        Self::Int32(i)
    }
}

impl From<i64> for RowValue {
    fn from(i: i64) -> Self {
        Self::Int64(i)
    }
}

impl<T: Into<RowValue>> From<Option<T>> for RowValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accessors() {
        assert_eq!(RowValue::Int8(-3).as_i64(), Some(-3));
        assert_eq!(RowValue::Int32(42).as_i64(), Some(42));
        assert_eq!(RowValue::from("abc").as_str(), Some("abc"));
        assert_eq!(RowValue::Bool(true).as_i64(), None);
        assert!(RowValue::from(None::<i32>).is_null());
    }

    #[test]
    fn test_parse_display_roundtrip_for_keys() {
        let values = vec![
            RowValue::Int64(-17),
            RowValue::Decimal("12.50".parse().unwrap()),
            RowValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()),
            RowValue::Time(NaiveTime::from_hms_micro_opt(13, 5, 9, 250).unwrap()),
            RowValue::Timestamp(
                NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 1)
                    .unwrap(),
            ),
            RowValue::Text("a b/c".to_string()),
        ];
        for value in values {
            let text = value.to_string();
            assert_eq!(RowValue::parse(value.kind(), &text).unwrap(), value);
        }
    }

    #[test]
    fn test_parse_rejects_bad_literal() {
        let err = RowValue::parse(ValueKind::Int32, "twelve").unwrap_err();
        assert!(matches!(err, ValueError::InvalidLiteral { .. }));
        assert_eq!(
            RowValue::parse(ValueKind::Bytes, "00").unwrap_err(),
            ValueError::Unparseable(ValueKind::Bytes)
        );
    }

    #[test]
    fn test_numeric_order_across_kinds() {
        assert_eq!(
            RowValue::Int8(2).total_cmp(&RowValue::Int64(10)),
            Ordering::Less
        );
        assert_eq!(
            RowValue::Decimal("2.5".parse().unwrap()).total_cmp(&RowValue::Int32(2)),
            Ordering::Greater
        );
        assert_eq!(
            RowValue::Float64(1.5).total_cmp(&RowValue::Int16(1)),
            Ordering::Greater
        );
        assert_eq!(
            RowValue::Int64(-5).total_cmp(&RowValue::Int8(-5)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_cross_kind_order() {
        let date = RowValue::Date(NaiveDate::from_ymd_opt(1999, 1, 1).unwrap());
        assert_eq!(RowValue::Null.total_cmp(&RowValue::Bool(false)), Ordering::Less);
        assert_eq!(RowValue::Int64(i64::MAX).total_cmp(&date), Ordering::Less);
        assert_eq!(date.total_cmp(&RowValue::from("0")), Ordering::Less);
        assert_eq!(
            RowValue::from("zzz").total_cmp(&RowValue::Bytes(vec![0])),
            Ordering::Less
        );
    }

    #[test]
    fn test_serde_tagged_format() {
        let json = serde_json::to_string(&RowValue::Int64(7)).unwrap();
        assert_eq!(json, r#"{"type":"int64","value":7}"#);
        let parsed: RowValue = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, RowValue::Int64(7));
    }
}
