//! Raw column values as handed over by the native driver.

use super::lob::LobValue;
use chrono::NaiveDateTime;

/// A column value before the result mapper has normalized it.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    /// NULL value.
    Null,
    /// Character data (VARCHAR2, CHAR, LONG).
    Text(String),
    /// NUMBER rendered as text, preserving precision.
    Number(String),
    /// DATE container. Always carries a time part, possibly midnight.
    Date(NaiveDateTime),
    /// TIMESTAMP container.
    Timestamp(NaiveDateTime),
    /// RAW bytes.
    Raw(Vec<u8>),
    /// CLOB/BLOB locator, possibly with prefetched data.
    Lob(LobValue),
}

impl NativeValue {
    /// Check if the value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, NativeValue::Null)
    }

    /// Text or number content, when the value is textual.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            NativeValue::Text(s) | NativeValue::Number(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for NativeValue {
    fn from(s: &str) -> Self {
        NativeValue::Text(s.to_string())
    }
}

impl From<i64> for NativeValue {
    fn from(n: i64) -> Self {
        NativeValue::Number(n.to_string())
    }
}

impl<T: Into<NativeValue>> From<Option<T>> for NativeValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(NativeValue::Null)
    }
}
