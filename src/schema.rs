//! Catalog introspection and schema DDL.
//!
//! Everything here reads the `user_*` dictionary views of the connected
//! schema. Multi-statement operations stop at the first failing statement.

use tracing::debug;

use crate::connection::Connection;
use crate::dialect::{
    ddl, quote_identifier, quote_literal, quote_table_name, unquote_literal, ColumnDef, TableDef,
};
use crate::driver::Session;
use crate::error::{Error, Result};
use crate::mapper::normalize_column_name;
use crate::types::{ColumnDescriptor, IndexDescriptor, Row, Value};

/// `ORA-02289: sequence does not exist`.
pub const ORA_SEQUENCE_NOT_FOUND: u32 = 2289;
/// `ORA-04043: object does not exist`.
pub const ORA_OBJECT_NOT_FOUND: u32 = 4043;

/// Catalog row of `user_tab_columns`, before coercion.
#[derive(Debug, Clone, PartialEq)]
struct CatalogColumn {
    name: String,
    data_type: String,
    data_length: Option<u32>,
    precision: Option<u32>,
    scale: Option<i32>,
    nullable: bool,
    default: Option<String>,
}

impl CatalogColumn {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            name: required_text(row, "column_name")?,
            data_type: required_text(row, "data_type")?,
            data_length: optional_u32(row, "data_length"),
            precision: optional_u32(row, "data_precision"),
            scale: row
                .get("data_scale")
                .and_then(Value::as_i64)
                .and_then(|s| i32::try_from(s).ok()),
            nullable: row.get("nullable").and_then(Value::as_str) != Some("N"),
            default: row
                .get("data_default")
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        })
    }

    /// Declared length: numeric precision for numbers, byte/char length otherwise.
    fn length(&self) -> Option<u32> {
        if self.data_type.eq_ignore_ascii_case("NUMBER") {
            self.precision
        } else {
            self.data_length
        }
    }

    /// `TYPE[(len)]` as it appears in a dumped `CREATE TABLE`.
    fn type_sql(&self) -> String {
        let ty = self.data_type.as_str();
        match ty {
            "VARCHAR2" | "NVARCHAR2" | "CHAR" | "NCHAR" | "RAW" => match self.data_length {
                Some(len) => format!("{}({})", ty, len),
                None => ty.to_string(),
            },
            "NUMBER" => match (self.precision, self.scale) {
                (Some(p), Some(s)) if s != 0 => format!("{}({},{})", ty, p, s),
                (Some(p), _) => format!("{}({})", ty, p),
                _ => ty.to_string(),
            },
            _ => ty.to_string(),
        }
    }

    fn to_dump_sql(&self) -> String {
        let mut sql = format!(
            "{} {}",
            quote_identifier(&normalize_column_name(&self.name)),
            self.type_sql()
        );
        if let Some(default) = &self.default {
            sql.push_str(" default ");
            sql.push_str(default);
        }
        if !self.nullable {
            sql.push_str(" not null");
        }
        sql
    }

    /// Descriptor with the default read back from its literal form.
    fn into_descriptor(self) -> ColumnDescriptor {
        let length = self.length();
        let default = self
            .default
            .as_deref()
            .map(|text| unquote_literal(text).unwrap_or_else(|| text.to_string()));
        ColumnDescriptor::new(
            normalize_column_name(&self.name),
            self.data_type,
            length,
            self.scale,
            self.nullable,
            default.as_deref(),
        )
    }
}

fn required_text(row: &Row, column: &str) -> Result<String> {
    row.try_get(column)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::unexpected(format!("catalog column {} is not text", column)))
}

fn optional_u32(row: &Row, column: &str) -> Option<u32> {
    row.get(column)
        .and_then(Value::as_i64)
        .and_then(|n| u32::try_from(n).ok())
}

/// Name as stored in the dictionary: unquoted names are upper case.
fn catalog_name(name: &str) -> String {
    if name.chars().any(|c| c.is_ascii_uppercase()) {
        name.to_string()
    } else {
        name.to_ascii_uppercase()
    }
}

fn catalog_literal(name: &str) -> String {
    quote_literal(&Value::String(catalog_name(name)), None)
}

/// Group index metadata rows into descriptors.
///
/// `rows` must be ordered by index name, then column position, and carry
/// `index_name`, `uniqueness`, `column_name` and `constraint_type` columns.
/// Indexes backing the primary key (`constraint_type = 'P'`) are skipped.
pub fn group_indexes(table: &str, rows: &[Row]) -> Result<Vec<IndexDescriptor>> {
    let mut indexes: Vec<IndexDescriptor> = Vec::new();
    for row in rows {
        if row.get("constraint_type").and_then(Value::as_str) == Some("P") {
            continue;
        }
        let name = normalize_column_name(&required_text(row, "index_name")?);
        let column = normalize_column_name(&required_text(row, "column_name")?);

        match indexes.last_mut() {
            Some(index) if index.name == name => index.columns.push(column),
            _ => {
                let unique = row.get("uniqueness").and_then(Value::as_str) == Some("UNIQUE");
                let mut index = IndexDescriptor::new(table, name, unique);
                index.columns.push(column);
                indexes.push(index);
            }
        }
    }
    Ok(indexes)
}

fn ignore_missing(result: Result<u64>, code: u32) -> Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(Error::Statement { code: c, .. }) if c == code => Ok(()),
        Err(e) => Err(e),
    }
}

impl<S: Session> Connection<S> {
    /// Tables owned by the connected user, case-normalized.
    pub async fn list_tables(&mut self) -> Result<Vec<String>> {
        self.list_names("SELECT table_name FROM user_tables ORDER BY table_name")
            .await
    }

    /// Sequences owned by the connected user, case-normalized.
    pub async fn list_sequences(&mut self) -> Result<Vec<String>> {
        self.list_names("SELECT sequence_name FROM user_sequences ORDER BY sequence_name")
            .await
    }

    async fn list_names(&mut self, sql: &str) -> Result<Vec<String>> {
        let result = self.query(sql, None).await?;
        result
            .into_iter()
            .map(|row| match row.into_first() {
                Some(Value::String(name)) => Ok(normalize_column_name(&name)),
                other => Err(Error::unexpected(format!("expected a name, got {:?}", other))),
            })
            .collect()
    }

    async fn catalog_columns(&mut self, table: &str) -> Result<Vec<CatalogColumn>> {
        let sql = format!(
            "SELECT column_name, data_type, data_length, data_precision, data_scale, nullable, data_default \
             FROM user_tab_columns WHERE table_name = {} ORDER BY column_id",
            catalog_literal(table)
        );
        let result = self.query(&sql, None).await?;
        result.iter().map(CatalogColumn::from_row).collect()
    }

    /// Columns of a table, in declaration order.
    pub async fn columns_of(&mut self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        Ok(self
            .catalog_columns(table)
            .await?
            .into_iter()
            .map(CatalogColumn::into_descriptor)
            .collect())
    }

    /// Indexes of a table, excluding the primary key's index.
    pub async fn indexes_of(&mut self, table: &str) -> Result<Vec<IndexDescriptor>> {
        let sql = format!(
            "SELECT i.index_name, i.uniqueness, c.column_name, k.constraint_type \
             FROM user_indexes i \
             JOIN user_ind_columns c ON c.index_name = i.index_name \
             LEFT JOIN user_constraints k ON k.index_name = i.index_name AND k.constraint_type = 'P' \
             WHERE i.table_name = {} \
             ORDER BY i.index_name, c.column_position",
            catalog_literal(table)
        );
        let result = self.query(&sql, None).await?;
        group_indexes(table, &result.rows)
    }

    /// DDL recreating every sequence and table of the schema.
    pub async fn dump_schema_ddl(&mut self) -> Result<String> {
        let mut ddl = String::new();
        for sequence in self.list_sequences().await? {
            ddl.push_str(&format!("create sequence {};\n\n", quote_table_name(&sequence)));
        }
        for table in self.list_tables().await? {
            let columns: Vec<String> = self
                .catalog_columns(&table)
                .await?
                .iter()
                .map(|c| format!("  {}", c.to_dump_sql()))
                .collect();
            ddl.push_str(&format!(
                "create table {} (\n{}\n);\n\n",
                quote_table_name(&table),
                columns.join(",\n")
            ));
        }
        Ok(ddl)
    }

    /// DDL dropping every sequence and table of the schema.
    pub async fn drop_schema_ddl(&mut self) -> Result<String> {
        let mut ddl = String::new();
        for sequence in self.list_sequences().await? {
            ddl.push_str(&format!("drop sequence {};\n\n", quote_table_name(&sequence)));
        }
        for table in self.list_tables().await? {
            ddl.push_str(&format!(
                "drop table {} cascade constraints;\n\n",
                quote_table_name(&table)
            ));
        }
        Ok(ddl)
    }

    /// Name of the connected database.
    pub async fn current_database(&mut self) -> Result<String> {
        match self
            .select_value("SELECT sys_context('userenv', 'db_name') FROM dual")
            .await?
        {
            Some(Value::String(name)) => Ok(name),
            other => Err(Error::unexpected(format!("expected a database name, got {:?}", other))),
        }
    }

    /// Create a table and, when it has a primary key, its id sequence.
    pub async fn create_table(&mut self, table: &TableDef) -> Result<()> {
        self.execute(&ddl::create_table(table)).await?;
        if table.primary_key.is_some() {
            self.execute(&ddl::create_sequence(&table.resolved_sequence_name()))
                .await?;
        }
        debug!(table = %table.name, "table created");
        Ok(())
    }

    /// Drop a table and its id sequence. A missing sequence is not an error.
    pub async fn drop_table(&mut self, table: &str, sequence_name: Option<&str>) -> Result<()> {
        self.execute(&ddl::drop_table(table)).await?;
        let sequence = sequence_name
            .map(str::to_string)
            .unwrap_or_else(|| ddl::default_sequence_name(table));
        let dropped = self.execute(&ddl::drop_sequence(&sequence)).await;
        ignore_missing(dropped, ORA_SEQUENCE_NOT_FOUND)
    }

    /// Rename a table along with its default sequence, when there is one.
    pub async fn rename_table(&mut self, from: &str, to: &str) -> Result<()> {
        self.execute(&ddl::rename_table(from, to)).await?;
        let renamed = self
            .execute(&ddl::rename_table(
                &ddl::default_sequence_name(from),
                &ddl::default_sequence_name(to),
            ))
            .await;
        ignore_missing(renamed, ORA_OBJECT_NOT_FOUND)
    }

    /// Add a column.
    pub async fn add_column(&mut self, table: &str, column: &ColumnDef) -> Result<()> {
        self.execute(&ddl::add_column(table, column)).await.map(drop)
    }

    /// Change a column's type, default and nullability.
    pub async fn change_column(&mut self, table: &str, column: &ColumnDef) -> Result<()> {
        self.execute(&ddl::change_column(table, column)).await.map(drop)
    }

    /// Change a column's default.
    pub async fn change_column_default(
        &mut self,
        table: &str,
        column: &str,
        default: &Value,
    ) -> Result<()> {
        self.execute(&ddl::change_column_default(table, column, default))
            .await
            .map(drop)
    }

    /// Rename a column.
    pub async fn rename_column(&mut self, table: &str, from: &str, to: &str) -> Result<()> {
        self.execute(&ddl::rename_column(table, from, to)).await.map(drop)
    }

    /// Drop a column.
    pub async fn remove_column(&mut self, table: &str, column: &str) -> Result<()> {
        self.execute(&ddl::remove_column(table, column)).await.map(drop)
    }

    /// Create an index, named `index_<table>_on_<columns>` unless `name` is given.
    pub async fn add_index(
        &mut self,
        table: &str,
        columns: &[&str],
        name: Option<&str>,
        unique: bool,
    ) -> Result<()> {
        self.execute(&ddl::add_index(table, columns, name, unique))
            .await
            .map(drop)
    }

    /// Drop an index.
    pub async fn remove_index(&mut self, name: &str) -> Result<()> {
        self.execute(&ddl::remove_index(name)).await.map(drop)
    }
}
