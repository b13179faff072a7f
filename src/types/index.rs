//! Index descriptors built from catalog introspection.

/// An index on a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDescriptor {
    /// Table the index belongs to.
    pub table: String,
    /// Index name.
    pub name: String,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
    /// Indexed columns, in index position order.
    pub columns: Vec<String>,
}

impl IndexDescriptor {
    /// Create an index descriptor with no columns yet.
    pub fn new(table: impl Into<String>, name: impl Into<String>, unique: bool) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
            unique,
            columns: Vec::new(),
        }
    }
}
