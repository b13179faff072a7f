//! Oracle SQL dialect: quoting, pagination rewrite and DDL generation.
//!
//! Everything here is a pure function of its inputs.

pub mod ddl;
mod literal;
mod pagination;

pub use ddl::{default_sequence_name, native_type, ColumnDef, ColumnType, TableDef};
pub use literal::{quote_identifier, quote_literal, quote_string, quote_table_name, unquote_literal};
pub use pagination::{rewrite_pagination, Pagination, ROW_NUMBER_COLUMN};
