//! Oracle adapter for Rust
//!
//! The vendor layer between a generic persistence layer and an Oracle
//! driver: it rewrites portable SQL into Oracle's dialect, maps native
//! driver rows into normalized [`Row`]s and manages one session's
//! autocommit and transaction state.
//!
//! The driver itself is pluggable through the [`driver::Driver`] and
//! [`driver::Session`] traits.
//!
//! # Example
//!
//! ```no_run
//! use oracle_adapter::driver::Driver;
//! use oracle_adapter::{ConnectConfig, Connection, InsertOptions, Result};
//!
//! async fn run<D: Driver>(driver: &D) -> Result<()> {
//!     let config = ConnectConfig::parse("scott/tiger@localhost:1521/FREEPDB1")?;
//!     let mut conn = Connection::connect(driver, &config).await?;
//!
//!     // Portable LIMIT/OFFSET is rewritten into ROWNUM filtering
//!     let page = conn
//!         .query("SELECT id, name FROM users ORDER BY id LIMIT 10 OFFSET 20", None)
//!         .await?;
//!     for row in &page {
//!         println!("{:?}", row.get("name"));
//!     }
//!
//!     // The id comes from users_seq and is bound to :id
//!     conn.begin_transaction().await?;
//!     let id = conn
//!         .insert(
//!             "INSERT INTO users (id, name) VALUES (:id, 'scott')",
//!             InsertOptions::primary_key("id"),
//!         )
//!         .await?;
//!     conn.commit().await?;
//!     println!("inserted {:?}", id);
//!
//!     conn.close().await
//! }
//! ```

pub mod config;
pub mod connection;
mod cursor;
pub mod dialect;
pub mod driver;
pub mod error;
pub mod hooks;
pub mod mapper;
pub mod schema;
pub mod serialize;
pub mod types;

// Re-export main types
pub use config::ConnectConfig;
pub use connection::{Connection, InsertOptions, QueryResult};
pub use error::{Error, Result};
pub use hooks::{AfterSaveAction, HookRegistry, LobWrite};
pub use mapper::WRITABLE_LOB_QUERY;
pub use serialize::{FieldMap, Record, SerializationPipeline};
pub use types::{ColumnDescriptor, IndexDescriptor, LogicalType, Row, Value};
