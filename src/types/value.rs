//! Normalized values stored in result rows and bound into statements.

use super::lob::LobValue;
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use std::fmt;

/// A coerced scalar value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value.
    Null,
    /// Boolean value, stored by Oracle as `NUMBER(1)`.
    Boolean(bool),
    /// Integral number.
    Integer(i64),
    /// Fractional number.
    Float(f64),
    /// String value.
    String(String),
    /// Date with no significant time of day.
    Date(NaiveDate),
    /// Full date and time.
    DateTime(NaiveDateTime),
    /// Binary data (BLOB contents, RAW).
    Binary(Vec<u8>),
    /// Writable LOB handle, returned only for the writable-LOB query hint.
    Lob(LobValue),
    /// Structured value with no native column type; quoted as serialized JSON.
    Json(serde_json::Value),
}

impl Value {
    /// Check if the value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get the value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to convert to i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Boolean(b) => Some(*b as i64),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Try to convert to f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to get the value as a date, truncating a date-time.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            Value::DateTime(dt) => Some(dt.date()),
            _ => None,
        }
    }

    /// Try to get the value as a date-time; a date is taken at midnight.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            Value::Date(d) => d.and_hms_opt(0, 0, 0),
            _ => None,
        }
    }

    /// Try to get the value as bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(b) => Some(b),
            Value::Lob(lob) => lob.as_bytes(),
            _ => None,
        }
    }

    /// Try to get the value as a LOB handle.
    pub fn as_lob(&self) -> Option<&LobValue> {
        match self {
            Value::Lob(lob) => Some(lob),
            _ => None,
        }
    }

    /// Downgrade a date-time to a plain date when its time part is midnight.
    pub fn date_or_datetime(dt: NaiveDateTime) -> Self {
        if dt.hour() == 0 && dt.minute() == 0 && dt.second() == 0 {
            Value::Date(dt.date())
        } else {
            Value::DateTime(dt)
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{}", s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Value::Binary(bytes) => write!(f, "<BINARY: {} bytes>", bytes.len()),
            Value::Lob(lob) => write!(f, "<{:?}: {} bytes>", lob.kind(), lob.size()),
            Value::Json(json) => write!(f, "{}", json),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n as i64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Binary(bytes)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::Json(json)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
