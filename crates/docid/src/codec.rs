//! Encoding of primary-key values into docid tokens.
//!
//! A token is the ordered list of rendered key components joined with
//! [`DELIMITER`]. Rendering rules per value kind:
//!
//! | kind | rendering |
//! |---|---|
//! | null | empty component |
//! | integers, decimal | canonical decimal text, sign preserved |
//! | floats | shortest round-trip text, exponent form without `+` |
//! | date / time / timestamp | `YYYY-MM-DD` / `HH:MM:SS[.f]` / `YYYY-MM-DD HH:MM:SS[.f]` |
//! | timestamp with zone | RFC 3339 in UTC with a `Z` suffix |
//! | everything else | percent-escaped text, space as `+` |
//!
//! Numeric and temporal renderings never contain the delimiter, `%` or `+`,
//! so `decode` leaves them untouched.

use sync_core::values::{DATE_FORMAT, TIMESTAMP_FORMAT, TIME_FORMAT};
use sync_core::{Row, RowValue};

use crate::{DocId, DocIdError, Result};

/// Separator between rendered key components.
pub const DELIMITER: char = '/';

/// Floats with a magnitude outside this range render in exponent form.
const PLAIN_FLOAT_RANGE: std::ops::Range<f64> = 1e-5..1e16;

/// Encode the values of `key_names` found in `row` into a docid.
///
/// Names match row columns case-insensitively. The result is a pure function
/// of the ordered names and the row: equal inputs always produce
/// byte-identical tokens.
///
/// # Errors
///
/// - [`DocIdError::EmptyInput`] if `key_names` or `row` is empty
/// - [`DocIdError::MissingKey`] if a name matches no column
pub fn encode<S: AsRef<str>>(key_names: &[S], row: &Row) -> Result<DocId> {
    if key_names.is_empty() || row.is_empty() {
        return Err(DocIdError::EmptyInput);
    }

    let mut components = Vec::with_capacity(key_names.len());
    for name in key_names {
        let name = name.as_ref();
        let value = row
            .get(name)
            .ok_or_else(|| DocIdError::MissingKey(name.to_string()))?;
        components.push(render_component(value));
    }

    let delimiter = DELIMITER.to_string();
    Ok(DocId::from_encoded(components.join(&delimiter)))
}

/// Split a token into its raw component texts.
///
/// Trailing empty components are preserved, so a trailing null key still
/// counts as a component. Components containing `%` or `+` are
/// percent-decoded. Original value types are not recovered.
pub fn decode(token: &str) -> Result<Vec<String>> {
    token
        .split(DELIMITER)
        .map(|component| {
            if component.contains(['%', '+']) {
                unescape(component).map_err(|reason| DocIdError::decode(token, reason))
            } else {
                Ok(component.to_string())
            }
        })
        .collect()
}

/// Render a single key value as token text.
pub fn render_component(value: &RowValue) -> String {
    match value {
        RowValue::Null => String::new(),
        // Widened one size class so a single signed byte never renders
        // differently from the same value read as SMALLINT.
        RowValue::Int8(i) => i16::from(*i).to_string(),
        RowValue::Int16(i) => i.to_string(),
        RowValue::Int32(i) => i.to_string(),
        RowValue::Int64(i) => i.to_string(),
        RowValue::Float32(f) => render_float(f64::from(*f), &f.to_string(), &format!("{f:e}")),
        RowValue::Float64(f) => render_float(*f, &f.to_string(), &format!("{f:e}")),
        RowValue::Decimal(d) => d.normalize().to_string(),
        RowValue::Date(d) => d.format(DATE_FORMAT).to_string(),
        RowValue::Time(t) => t.format(TIME_FORMAT).to_string(),
        RowValue::Timestamp(ts) => ts.format(TIMESTAMP_FORMAT).to_string(),
        RowValue::TimestampTz(ts) => ts
            .to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true),
        RowValue::Bool(_) | RowValue::Text(_) | RowValue::Bytes(_) | RowValue::Uuid(_) => {
            escape(&value.to_string())
        }
    }
}

/// Pick the plain or exponent rendering of a float.
///
/// Non-finite values have no numeric literal and are escaped like text.
fn render_float(magnitude: f64, plain: &str, exponent: &str) -> String {
    if !magnitude.is_finite() {
        return escape(plain);
    }
    let abs = magnitude.abs();
    if abs == 0.0 || PLAIN_FLOAT_RANGE.contains(&abs) {
        plain.to_string()
    } else {
        // A '+' here would decode to a space.
        exponent.replace("e+", "e")
    }
}

/// Percent-escape text so the delimiter, `%` and `+` survive a round trip.
///
/// ASCII alphanumerics and `-_.*~` pass through, space becomes `+`, every
/// other byte becomes `%XX`.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'*' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

/// Reverse [`escape`].
pub fn unescape(text: &str) -> std::result::Result<String, String> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .and_then(|h| std::str::from_utf8(h).ok())
                    .ok_or_else(|| format!("truncated escape at byte {i}"))?;
                let byte = u8::from_str_radix(hex, 16)
                    .map_err(|_| format!("invalid escape '%{hex}' at byte {i}"))?;
                out.push(byte);
                i += 3;
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }
    String::from_utf8(out).map_err(|e| format!("decoded bytes are not UTF-8: {e}"))
}
