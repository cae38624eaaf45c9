//! Value kinds understood by the sync.
//!
//! `ValueKind` is the closed type universe of column values read from the
//! source table. It drives literal parsing (configured minimum keys, cursor
//! checkpoints) and the cross-type precedence used when ordering row
//! identities.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

use crate::ValueError;

/// The type of a [`crate::RowValue`].
///
/// Variants are declared in cross-type precedence order: when two values of
/// different kinds are compared, the one whose kind is declared first sorts
/// first. All numeric kinds share one precedence slot and compare by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// SQL NULL
    Null,

    /// Boolean value
    Bool,

    // Integer types (sized)
    /// 8-bit signed integer (e.g. TINYINT)
    Int8,

    /// 16-bit signed integer
    Int16,

    /// 32-bit signed integer
    Int32,

    /// 64-bit signed integer
    Int64,

    // Floating point
    /// 32-bit IEEE 754 floating point
    Float32,

    /// 64-bit IEEE 754 floating point
    Float64,

    /// Exact decimal
    Decimal,

    // Temporal types
    /// Date only (YYYY-MM-DD)
    Date,

    /// Time only (HH:MM:SS)
    Time,

    /// Timestamp without timezone
    Timestamp,

    /// Timestamp with timezone, normalized to UTC
    TimestampTz,

    /// UUID (128-bit)
    Uuid,

    /// Unlimited text
    Text,

    /// Binary data
    Bytes,
}

impl ValueKind {
    /// Get the string representation of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int8 => "tiny_int",
            Self::Int16 => "small_int",
            Self::Int32 => "int",
            Self::Int64 => "big_int",
            Self::Float32 => "float",
            Self::Float64 => "double",
            Self::Decimal => "decimal",
            Self::Date => "date",
            Self::Time => "time",
            Self::Timestamp => "timestamp",
            Self::TimestampTz => "timestamp_tz",
            Self::Uuid => "uuid",
            Self::Text => "text",
            Self::Bytes => "bytes",
        }
    }

    /// Check if this kind is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::Float32
                | Self::Float64
                | Self::Decimal
        )
    }

    /// Check if this kind is temporal.
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            Self::Date | Self::Time | Self::Timestamp | Self::TimestampTz
        )
    }

    /// Rank of this kind in the cross-type precedence table.
    ///
    /// `Null < Bool < numeric < Date < Time < Timestamp < TimestampTz < Uuid < Text < Bytes`
    pub fn precedence(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool => 1,
            Self::Int8
            | Self::Int16
            | Self::Int32
            | Self::Int64
            | Self::Float32
            | Self::Float64
            | Self::Decimal => 2,
            Self::Date => 3,
            Self::Time => 4,
            Self::Timestamp => 5,
            Self::TimestampTz => 6,
            Self::Uuid => 7,
            Self::Text => 8,
            Self::Bytes => 9,
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueKind {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "null" => Self::Null,
            "bool" => Self::Bool,
            "tiny_int" => Self::Int8,
            "small_int" => Self::Int16,
            "int" => Self::Int32,
            "big_int" => Self::Int64,
            "float" => Self::Float32,
            "double" => Self::Float64,
            "decimal" => Self::Decimal,
            "date" => Self::Date,
            "time" => Self::Time,
            "timestamp" => Self::Timestamp,
            "timestamp_tz" => Self::TimestampTz,
            "uuid" => Self::Uuid,
            "text" => Self::Text,
            "bytes" => Self::Bytes,
            other => return Err(ValueError::UnknownKind(other.to_string())),
        };
        Ok(kind)
    }
}

// Kinds serialize as their `as_str()` name so checkpoint files stay readable.

impl Serialize for ValueKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ValueKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
