//! The native driver seam.
//!
//! The adapter never speaks a wire protocol itself. A [`Driver`] opens
//! [`Session`]s, and a session executes SQL text, hands out cursors, toggles
//! autocommit and reads/writes LOB locators. Everything else in this crate is
//! written against these two traits.

pub mod binder;
pub mod constants;

use std::future::Future;

use crate::config::ConnectConfig;
use crate::error::Result;
use crate::types::{ColumnMetadata, LobLocator, NativeValue, Value};

pub use binder::{BinderSet, ColumnBinder, DefineAs};

/// A named bind parameter (`:name` in SQL text).
#[derive(Debug, Clone, PartialEq)]
pub struct Bind {
    /// Placeholder name, without the leading colon.
    pub name: String,
    /// Bound value.
    pub value: Value,
}

impl Bind {
    /// Create a named bind.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A server-side cursor opened by a session.
pub trait NativeCursor: Send {
    /// Column metadata for this cursor.
    fn columns(&self) -> &[ColumnMetadata];
}

/// Opens native sessions.
pub trait Driver: Send + Sync {
    /// Session type produced by this driver.
    type Session: Session;

    /// Open a session with the given credentials.
    fn open(&self, config: &ConnectConfig) -> impl Future<Output = Result<Self::Session>> + Send;
}

/// One live native session.
///
/// Implementations report rejected SQL as `Error::Statement` and cursor or
/// LOB failures as `Error::Resource`; the adapter passes them through.
pub trait Session: Send {
    /// Cursor type handed out by [`Session::open_cursor`].
    type Cursor: NativeCursor;

    /// Execute a statement, returning the affected row count.
    fn execute(
        &mut self,
        sql: &str,
        binds: &[Bind],
    ) -> impl Future<Output = Result<u64>> + Send;

    /// Parse and execute a query, defining fetch buffers through `binders`.
    fn open_cursor(
        &mut self,
        sql: &str,
        binds: &[Bind],
        binders: &BinderSet,
    ) -> impl Future<Output = Result<Self::Cursor>> + Send;

    /// Fetch the next raw row, `None` once exhausted.
    fn fetch(
        &mut self,
        cursor: &mut Self::Cursor,
    ) -> impl Future<Output = Result<Option<Vec<NativeValue>>>> + Send;

    /// Close the cursor and release its server resources.
    fn close_cursor(&mut self, cursor: Self::Cursor) -> impl Future<Output = Result<()>> + Send;

    /// Turn autocommit on or off.
    fn set_autocommit(&mut self, autocommit: bool) -> impl Future<Output = Result<()>> + Send;

    /// Commit the current transaction.
    fn commit(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Roll back the current transaction.
    fn rollback(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Read the full contents of a LOB.
    fn read_lob(&mut self, locator: &LobLocator) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Replace the contents of a LOB. The locator must come from a row
    /// selected `FOR UPDATE`.
    fn write_lob(
        &mut self,
        locator: &LobLocator,
        data: &[u8],
    ) -> impl Future<Output = Result<()>> + Send;

    /// Log off.
    fn close(self) -> impl Future<Output = Result<()>> + Send;
}
