//! DDL text generation.

use super::literal::{quote_identifier, quote_literal, quote_table_name};
use crate::types::Value;

/// Longest identifier Oracle accepts for tables, indexes and sequences.
pub const IDENTIFIER_MAX_LENGTH: usize = 30;
/// First value handed out by sequences created with a table.
pub const SEQUENCE_START_VALUE: u64 = 10000;

/// Portable column type used in table definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    String { limit: Option<u32> },
    Text,
    Integer,
    Float,
    Decimal { precision: u8, scale: u8 },
    Datetime,
    Timestamp,
    Time,
    Date,
    Binary,
    Boolean,
}

/// Oracle type used to store a portable column type.
pub fn native_type(column_type: ColumnType) -> String {
    match column_type {
        ColumnType::String { limit } => format!("VARCHAR2({})", limit.unwrap_or(255)),
        ColumnType::Text => "CLOB".to_string(),
        ColumnType::Integer => "NUMBER(38)".to_string(),
        ColumnType::Float => "NUMBER".to_string(),
        ColumnType::Decimal { precision, scale } => format!("NUMBER({},{})", precision, scale),
        ColumnType::Datetime | ColumnType::Timestamp | ColumnType::Time | ColumnType::Date => {
            "DATE".to_string()
        }
        ColumnType::Binary => "BLOB".to_string(),
        ColumnType::Boolean => "NUMBER(1)".to_string(),
    }
}

/// A column in a table definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub default: Option<Value>,
}

impl ColumnDef {
    /// A nullable column without default.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
            default: None,
        }
    }

    /// Mark the column `NOT NULL`.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Set a default value.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// `name TYPE [DEFAULT x] [NOT NULL]`.
    pub fn to_sql(&self) -> String {
        let mut sql = format!(
            "{} {}",
            quote_identifier(&self.name),
            native_type(self.column_type)
        );
        push_column_options(&mut sql, self.default.as_ref(), self.nullable);
        sql
    }
}

fn push_column_options(sql: &mut String, default: Option<&Value>, nullable: bool) {
    if let Some(default) = default {
        sql.push_str(" DEFAULT ");
        sql.push_str(&quote_literal(default, None));
    }
    if !nullable {
        sql.push_str(" NOT NULL");
    }
}

/// A table definition. The primary key column is numeric and fed by the
/// table's sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDef {
    pub name: String,
    /// Primary key column; `None` creates a table without one.
    pub primary_key: Option<String>,
    /// Sequence name; defaults to `<table>_seq`.
    pub sequence_name: Option<String>,
    pub columns: Vec<ColumnDef>,
}

impl TableDef {
    /// A table with an `id` primary key.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_key: Some("id".to_string()),
            sequence_name: None,
            columns: Vec::new(),
        }
    }

    /// Use a different primary key column, or none.
    pub fn primary_key(mut self, column: Option<&str>) -> Self {
        self.primary_key = column.map(str::to_string);
        self
    }

    /// Use an explicit sequence name.
    pub fn sequence_name(mut self, name: impl Into<String>) -> Self {
        self.sequence_name = Some(name.into());
        self
    }

    /// Add a column.
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// The sequence feeding this table's primary key.
    pub fn resolved_sequence_name(&self) -> String {
        self.sequence_name
            .clone()
            .unwrap_or_else(|| default_sequence_name(&self.name))
    }
}

/// Default sequence for a table: `<table>_seq`.
pub fn default_sequence_name(table: &str) -> String {
    format!("{}_seq", table)
}

/// `CREATE TABLE` statement for a definition.
pub fn create_table(table: &TableDef) -> String {
    let mut columns = Vec::with_capacity(table.columns.len() + 1);
    if let Some(pk) = &table.primary_key {
        columns.push(format!(
            "{} {} NOT NULL PRIMARY KEY",
            quote_identifier(pk),
            native_type(ColumnType::Integer)
        ));
    }
    columns.extend(table.columns.iter().map(ColumnDef::to_sql));
    format!(
        "CREATE TABLE {} ({})",
        quote_table_name(&table.name),
        columns.join(", ")
    )
}

/// `DROP TABLE ... CASCADE CONSTRAINTS`.
pub fn drop_table(table: &str) -> String {
    format!("DROP TABLE {} CASCADE CONSTRAINTS", quote_table_name(table))
}

/// `RENAME old TO new`.
pub fn rename_table(from: &str, to: &str) -> String {
    format!("RENAME {} TO {}", quote_table_name(from), quote_table_name(to))
}

/// `CREATE SEQUENCE` starting at [`SEQUENCE_START_VALUE`].
pub fn create_sequence(name: &str) -> String {
    format!(
        "CREATE SEQUENCE {} START WITH {}",
        quote_table_name(name),
        SEQUENCE_START_VALUE
    )
}

/// `DROP SEQUENCE`.
pub fn drop_sequence(name: &str) -> String {
    format!("DROP SEQUENCE {}", quote_table_name(name))
}

/// `ALTER TABLE ... ADD (...)`.
pub fn add_column(table: &str, column: &ColumnDef) -> String {
    format!(
        "ALTER TABLE {} ADD ({})",
        quote_table_name(table),
        column.to_sql()
    )
}

/// `ALTER TABLE ... MODIFY (...)` changing a column's type and options.
pub fn change_column(table: &str, column: &ColumnDef) -> String {
    format!(
        "ALTER TABLE {} MODIFY ({})",
        quote_table_name(table),
        column.to_sql()
    )
}

/// `ALTER TABLE ... MODIFY (col DEFAULT x)`.
pub fn change_column_default(table: &str, column: &str, default: &Value) -> String {
    format!(
        "ALTER TABLE {} MODIFY ({} DEFAULT {})",
        quote_table_name(table),
        quote_identifier(column),
        quote_literal(default, None)
    )
}

/// `ALTER TABLE ... RENAME COLUMN a TO b`.
pub fn rename_column(table: &str, from: &str, to: &str) -> String {
    format!(
        "ALTER TABLE {} RENAME COLUMN {} TO {}",
        quote_table_name(table),
        quote_identifier(from),
        quote_identifier(to)
    )
}

/// `ALTER TABLE ... DROP COLUMN c`.
pub fn remove_column(table: &str, column: &str) -> String {
    format!(
        "ALTER TABLE {} DROP COLUMN {}",
        quote_table_name(table),
        quote_identifier(column)
    )
}

/// Default index name: `index_<table>_on_<col>_and_<col>`, cut to the
/// identifier limit.
pub fn default_index_name(table: &str, columns: &[&str]) -> String {
    let mut name = format!("index_{}_on_{}", table, columns.join("_and_"));
    if name.len() > IDENTIFIER_MAX_LENGTH {
        let mut cut = IDENTIFIER_MAX_LENGTH;
        while !name.is_char_boundary(cut) {
            cut -= 1;
        }
        name.truncate(cut);
    }
    name
}

/// `CREATE [UNIQUE] INDEX`.
pub fn add_index(table: &str, columns: &[&str], name: Option<&str>, unique: bool) -> String {
    let name = name
        .map(str::to_string)
        .unwrap_or_else(|| default_index_name(table, columns));
    let columns: Vec<String> = columns.iter().map(|c| quote_identifier(c)).collect();
    format!(
        "CREATE {}INDEX {} ON {} ({})",
        if unique { "UNIQUE " } else { "" },
        quote_identifier(&name),
        quote_table_name(table),
        columns.join(", ")
    )
}

/// `DROP INDEX`.
pub fn remove_index(name: &str) -> String {
    format!("DROP INDEX {}", quote_identifier(name))
}
