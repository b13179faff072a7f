//! Record serialization for inserts.
//!
//! A record is turned into a [`FieldMap`] of column name to SQL fragment by a
//! base serializer, then by a chain of decorators that patch in
//! adapter-specific fragments. [`SerializationPipeline::oracle`] defers LOB
//! columns to a second write phase and turns a missing primary key into the
//! `:id` bind placeholder.

use std::fmt;
use std::sync::Arc;

use crate::connection::ID_PLACEHOLDER;
use crate::dialect::{quote_identifier, quote_literal, quote_table_name};
use crate::types::{ColumnDescriptor, Value};

/// A row to be saved.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Target table.
    pub table: String,
    /// Primary key column, if the table has one.
    pub primary_key: Option<String>,
    /// Sequence feeding the primary key; defaults to `<table>_seq`.
    pub sequence_name: Option<String>,
    /// Column descriptors of the table (as returned by `columns_of`).
    pub columns: Vec<ColumnDescriptor>,
    /// Attribute values in column order.
    pub attributes: Vec<(String, Value)>,
}

impl Record {
    /// A record for a table with an `id` primary key.
    pub fn new(table: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            table: table.into(),
            primary_key: Some("id".to_string()),
            sequence_name: None,
            columns,
            attributes: Vec::new(),
        }
    }

    /// Use a different primary key column, or none.
    pub fn primary_key(mut self, column: Option<&str>) -> Self {
        self.primary_key = column.map(str::to_string);
        self
    }

    /// Use an explicit sequence.
    pub fn sequence_name(mut self, name: impl Into<String>) -> Self {
        self.sequence_name = Some(name.into());
        self
    }

    /// Set an attribute, replacing an earlier value for the same column.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        let column = column.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(c, _)| *c == column) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((column, value)),
        }
        self
    }

    /// Attribute value for a column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    /// Descriptor of a column.
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Preset primary key value, if any.
    pub fn primary_key_value(&self) -> Option<&Value> {
        self.primary_key
            .as_deref()
            .and_then(|pk| self.get(pk))
            .filter(|v| !v.is_null())
    }
}

/// Ordered column name to SQL fragment map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    fields: Vec<(String, String)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, keeping its position when it already exists.
    pub fn insert(&mut self, column: impl Into<String>, fragment: impl Into<String>) {
        let column = column.into();
        let fragment = fragment.into();
        match self.fields.iter_mut().find(|(c, _)| *c == column) {
            Some((_, f)) => *f = fragment,
            None => self.fields.push((column, fragment)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, f)| f.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(c, f)| (c.as_str(), f.as_str()))
    }
}

/// Base serializer: every attribute as a plain SQL literal.
pub fn base_fields(record: &Record) -> FieldMap {
    let mut fields = FieldMap::new();
    for (column, value) in &record.attributes {
        fields.insert(column.clone(), quote_literal(value, None));
    }
    fields
}

/// Replace non-null values of LOB columns with `EMPTY_BLOB()` /
/// `EMPTY_CLOB()`; the contents are written after the insert.
///
/// A record without a primary key cannot be selected back for the LOB
/// phase, so its LOB values stay inline.
pub fn defer_lobs(record: &Record, mut fields: FieldMap) -> FieldMap {
    if record.primary_key.is_none() {
        return fields;
    }
    for (column, value) in &record.attributes {
        if let Some(descriptor) = record.column(column).filter(|d| d.is_lob()) {
            fields.insert(column.clone(), quote_literal(value, Some(descriptor)));
        }
    }
    fields
}

/// Bind the primary key to `:id` when the record carries no id.
pub fn id_placeholder(record: &Record, mut fields: FieldMap) -> FieldMap {
    if let Some(pk) = &record.primary_key {
        if record.primary_key_value().is_none() {
            fields.insert(pk.clone(), format!(":{}", ID_PLACEHOLDER));
        }
    }
    fields
}

/// A decorator stage of the pipeline.
pub type Decorator = Arc<dyn Fn(&Record, FieldMap) -> FieldMap + Send + Sync>;

/// Base serializer followed by decorators, applied in order.
#[derive(Clone, Default)]
pub struct SerializationPipeline {
    decorators: Vec<Decorator>,
}

impl SerializationPipeline {
    /// The base serializer alone.
    pub fn new() -> Self {
        Self::default()
    }

    /// LOB deferral, then `:id` injection.
    pub fn oracle() -> Self {
        Self::new().then(defer_lobs).then(id_placeholder)
    }

    /// Append a decorator.
    pub fn then<F>(mut self, decorator: F) -> Self
    where
        F: Fn(&Record, FieldMap) -> FieldMap + Send + Sync + 'static,
    {
        self.decorators.push(Arc::new(decorator));
        self
    }

    /// Serialize a record.
    pub fn serialize(&self, record: &Record) -> FieldMap {
        self.decorators
            .iter()
            .fold(base_fields(record), |fields, decorate| decorate(record, fields))
    }
}

impl fmt::Debug for SerializationPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializationPipeline")
            .field("decorators", &self.decorators.len())
            .finish()
    }
}

/// `INSERT INTO table (cols) VALUES (fragments)`.
pub fn insert_sql(table: &str, fields: &FieldMap) -> String {
    let (columns, values): (Vec<String>, Vec<&str>) = fields
        .iter()
        .map(|(c, f)| (quote_identifier(c), f))
        .unzip();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_table_name(table),
        columns.join(", "),
        values.join(", ")
    )
}
