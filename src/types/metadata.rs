//! Column metadata reported by the driver for an open cursor.

use crate::driver::constants::type_name;

/// Column metadata of a cursor, as described by the driver.
///
/// Names arrive in the database's own casing (upper case for unquoted
/// identifiers); [`crate::mapper::normalize_column_name`] turns them into
/// row keys.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMetadata {
    /// Column name.
    pub name: String,
    /// Oracle data type number.
    pub oracle_type: u16,
    /// Numeric precision.
    pub precision: i16,
    /// Numeric scale.
    pub scale: i16,
    /// Maximum size in bytes.
    pub max_size: u32,
    /// Whether NULL values are allowed.
    pub nullable: bool,
}

impl ColumnMetadata {
    /// Create new column metadata with minimal info.
    pub fn new(name: impl Into<String>, oracle_type: u16) -> Self {
        Self {
            name: name.into(),
            oracle_type,
            precision: 0,
            scale: 0,
            max_size: 0,
            nullable: true,
        }
    }

    /// Set precision and scale.
    pub fn with_numeric(mut self, precision: i16, scale: i16) -> Self {
        self.precision = precision;
        self.scale = scale;
        self
    }

    /// Set the maximum size.
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Declared type name (`NUMBER`, `VARCHAR2`, ...), or `UNKNOWN`.
    pub fn type_name(&self) -> &'static str {
        type_name(self.oracle_type).unwrap_or("UNKNOWN")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::constants::{ORA_TYPE_NUM_NUMBER, ORA_TYPE_NUM_TIMESTAMP};

    #[test]
    fn test_type_name() {
        let col = ColumnMetadata::new("ID", ORA_TYPE_NUM_NUMBER).with_numeric(10, 0);
        assert_eq!(col.type_name(), "NUMBER");
        assert_eq!(col.precision, 10);

        let col = ColumnMetadata::new("CREATED_AT", ORA_TYPE_NUM_TIMESTAMP);
        assert_eq!(col.type_name(), "TIMESTAMP");

        assert_eq!(ColumnMetadata::new("X", 250).type_name(), "UNKNOWN");
    }
}
