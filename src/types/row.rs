//! Row type for query results.

use std::sync::Arc;

use crate::error::{Error, Result};

use super::value::Value;

/// Normalized column names shared by every row of a result set.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    /// Row keys, in projection order.
    pub names: Vec<String>,
}

impl ColumnInfo {
    /// Create new column info from normalized names.
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Get the number of columns.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Find column index by name; exact match first, then case-insensitive.
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name).or_else(|| {
            self.names
                .iter()
                .position(|n| n.eq_ignore_ascii_case(name))
        })
    }
}

/// A row of query results: column name to coerced value.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Column values.
    values: Vec<Value>,
    /// Shared column information (reference counted).
    column_info: Arc<ColumnInfo>,
}

impl Row {
    /// Create a new row with values and shared column info.
    pub fn new(values: Vec<Value>, column_info: Arc<ColumnInfo>) -> Self {
        Self {
            values,
            column_info,
        }
    }

    /// Get value by column index (0-based).
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Get value by column name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.column_info
            .find_by_name(name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get value by column name, failing when the column is absent.
    pub fn try_get(&self, name: &str) -> Result<&Value> {
        self.get(name).ok_or_else(|| Error::ColumnNotFound {
            name: name.to_string(),
        })
    }

    /// Get the number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get all values.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Get column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.column_info.names.iter().map(|s| s.as_str()).collect()
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.column_info
            .names
            .iter()
            .map(|s| s.as_str())
            .zip(self.values.iter())
    }

    /// Take the first value out of the row.
    pub fn into_first(self) -> Option<Value> {
        self.values.into_iter().next()
    }
}

impl IntoIterator for Row {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_row() -> Row {
        let info = Arc::new(ColumnInfo::new(vec!["name".into(), "MixedCase".into()]));
        Row::new(
            vec![Value::String("test".into()), Value::Integer(42)],
            info,
        )
    }

    #[test]
    fn test_row_access() {
        let row = make_row();
        assert_eq!(row.len(), 2);
        assert_eq!(row.get_index(0), Some(&Value::String("test".into())));
        assert_eq!(row.get("MixedCase"), Some(&Value::Integer(42)));
        assert_eq!(row.get("mixedcase"), Some(&Value::Integer(42)));
        assert_eq!(row.get("NAME"), row.get("name"));
    }

    #[test]
    fn test_row_try_get_missing() {
        let row = make_row();
        assert!(matches!(
            row.try_get("missing"),
            Err(Error::ColumnNotFound { name }) if name == "missing"
        ));
    }

    #[test]
    fn test_row_iter() {
        let row = make_row();
        let pairs: Vec<_> = row.iter().collect();
        assert_eq!(pairs[0].0, "name");
        assert_eq!(pairs[1], ("MixedCase", &Value::Integer(42)));
        assert_eq!(row.into_first(), Some(Value::String("test".into())));
    }
}
