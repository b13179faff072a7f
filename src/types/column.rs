//! Table column descriptors built from catalog introspection.

use crate::error::Result;
use crate::mapper::{coerce_scalar, infer_logical_type};

use super::lob::LobKind;
use super::value::Value;

/// Logical type a column's values are coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalType {
    String,
    Integer,
    Float,
    /// Date or date-time; midnight values come back as plain dates.
    Datetime,
    /// Date-time whose time of day is always significant (`*_at` columns).
    Time,
    Binary,
}

/// A table column as described by the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    /// Column name, case-normalized.
    pub name: String,
    /// Declared vendor type (`VARCHAR2`, `NUMBER`, `CLOB`, ...).
    pub sql_type: String,
    /// Declared length (character length or numeric precision).
    pub length: Option<u32>,
    /// Numeric scale.
    pub scale: Option<i32>,
    /// Whether NULL values are allowed.
    pub nullable: bool,
    /// Default value, coerced to the column's logical type.
    pub default: Value,
    /// Derived logical type; `None` for unrecognized vendor types.
    pub logical_type: Option<LogicalType>,
}

impl ColumnDescriptor {
    /// Build a descriptor, deriving the logical type and coercing the
    /// catalog's textual default.
    ///
    /// A default that does not coerce (an expression such as
    /// `ROUND(1.5, 1)` or `seq.nextval`) is kept as its text.
    pub fn new(
        name: impl Into<String>,
        sql_type: impl Into<String>,
        length: Option<u32>,
        scale: Option<i32>,
        nullable: bool,
        default: Option<&str>,
    ) -> Self {
        let name = name.into();
        let sql_type = sql_type.into();
        let logical_type = infer_logical_type(&sql_type, scale, &name);
        let default = match (default, logical_type) {
            (Some(text), Some(ty)) => coerce_scalar(text.trim(), ty)
                .unwrap_or_else(|_| Value::String(text.trim().to_string())),
            (Some(text), None) => Value::String(text.trim().to_string()),
            (None, _) => Value::Null,
        };
        Self {
            name,
            sql_type,
            length,
            scale,
            nullable,
            default,
            logical_type,
        }
    }

    /// Coerce a textual value into this column's logical type.
    pub fn coerce(&self, text: &str) -> Result<Value> {
        match self.logical_type {
            Some(ty) => coerce_scalar(text, ty),
            None => Ok(Value::String(text.to_string())),
        }
    }

    /// LOB kind when this is a CLOB/BLOB column.
    pub fn lob_kind(&self) -> Option<LobKind> {
        LobKind::from_type_name(&self.sql_type)
    }

    /// Whether inserts must write this column in a second LOB phase.
    pub fn is_lob(&self) -> bool {
        self.lob_kind().is_some()
    }
}
