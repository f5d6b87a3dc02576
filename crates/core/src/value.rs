//! Value types for extracted rows
//!
//! [`SqlValue`] is the scalar model every adapter maps its driver values
//! into. The serializer turns each variant into a SQL literal; the variants
//! are exactly the cases the literal rules distinguish:
//!
//! - `Null` → `NULL`
//! - `Text` → quoted, embedded quotes doubled
//! - `RawText` → dialect cast of a hex literal to text
//! - `Timestamp` → quoted `YYYY-MM-DD HH:MM:SS`
//! - `Bytes` → dialect hex literal
//! - `Bool`, `Int`, `Float` → unquoted literal
//!
//! ## Type Equality
//!
//! Different variants are never equal: `Int(1) != Float(1.0)` and
//! `Bytes(b"a") != Text("a")`. Floats follow IEEE-754 (`NaN != NaN`).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Timestamp format used for both parsing and rendering
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One scalar value read from a source row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SqlValue {
    /// SQL NULL
    Null,
    /// Boolean
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point (IEEE-754)
    Float(f64),
    /// Character data
    Text(String),
    /// Character data that is not valid UTF-8, kept byte for byte
    RawText(Vec<u8>),
    /// Binary data
    Bytes(Vec<u8>),
    /// Date and time without zone, second resolution when rendered
    Timestamp(NaiveDateTime),
}

impl PartialEq for SqlValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SqlValue::Null, SqlValue::Null) => true,
            (SqlValue::Bool(a), SqlValue::Bool(b)) => a == b,
            (SqlValue::Int(a), SqlValue::Int(b)) => a == b,
            (SqlValue::Float(a), SqlValue::Float(b)) => a == b,
            (SqlValue::Text(a), SqlValue::Text(b)) => a == b,
            (SqlValue::RawText(a), SqlValue::RawText(b)) => a == b,
            (SqlValue::Bytes(a), SqlValue::Bytes(b)) => a == b,
            (SqlValue::Timestamp(a), SqlValue::Timestamp(b)) => a == b,
            _ => false,
        }
    }
}

impl SqlValue {
    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            SqlValue::Null => "Null",
            SqlValue::Bool(_) => "Bool",
            SqlValue::Int(_) => "Int",
            SqlValue::Float(_) => "Float",
            SqlValue::Text(_) => "Text",
            SqlValue::RawText(_) => "RawText",
            SqlValue::Bytes(_) => "Bytes",
            SqlValue::Timestamp(_) => "Timestamp",
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Parse a timestamp in `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DDTHH:MM:SS` form
    pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S"))
            .ok()
    }

    /// Parse a timestamp only if `text` is already in [`TIMESTAMP_FORMAT`]
    ///
    /// Text that would render differently (a `T` separator, unpadded
    /// fields) is rejected so that replay writes it back unchanged.
    pub fn parse_canonical_timestamp(text: &str) -> Option<NaiveDateTime> {
        let ts = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).ok()?;
        (ts.format(TIMESTAMP_FORMAT).to_string() == text).then_some(ts)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        SqlValue::Bytes(v)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(v: NaiveDateTime) -> Self {
        SqlValue::Timestamp(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}
