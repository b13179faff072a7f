//! High-level Connection API: statements, queries, inserts and transactions.

use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::ConnectConfig;
use crate::cursor::RowCursor;
use crate::dialect::{default_sequence_name, quote_identifier, quote_literal, quote_table_name, Pagination};
use crate::driver::{BinderSet, Bind, Driver, Session};
use crate::error::{Error, Result};
use crate::hooks::{AfterSaveAction, HookRegistry, LobWrite};
use crate::mapper::{normalize_column_name, LobMode, WRITABLE_LOB_QUERY};
use crate::serialize::{insert_sql, Record, SerializationPipeline};
use crate::types::{ColumnMetadata, Row, Value};

/// Date/time format every session is switched to on connect.
pub const SESSION_DATE_FORMAT: &str = "YYYY-MM-DD HH24:MI:SS";

/// Bind placeholder receiving a sequence-generated primary key (`:id`).
pub const ID_PLACEHOLDER: &str = "id";

/// Result of a query execution.
#[derive(Debug)]
pub struct QueryResult {
    /// Column metadata, as reported by the driver.
    pub columns: Vec<ColumnMetadata>,
    /// Mapped rows.
    pub rows: Vec<Row>,
}

impl QueryResult {
    /// Get the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the result is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Normalized column names, as used for row keys.
    pub fn column_names(&self) -> Vec<String> {
        match self.rows.first() {
            Some(row) => row.column_names().into_iter().map(String::from).collect(),
            None => self
                .columns
                .iter()
                .filter(|c| !c.name.eq_ignore_ascii_case(crate::dialect::ROW_NUMBER_COLUMN))
                .map(|c| normalize_column_name(&c.name))
                .collect(),
        }
    }

    /// Iterate over rows.
    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }
}

impl IntoIterator for QueryResult {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a QueryResult {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// How an insert obtains its primary key.
///
/// * no primary key: the statement runs as-is and no id comes back
/// * preset id: the statement runs as-is and the preset id comes back
/// * otherwise: the next sequence value is fetched and bound to `:id`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertOptions {
    /// Primary key column of the target table.
    pub primary_key: Option<String>,
    /// Id assigned by the caller.
    pub id: Option<Value>,
    /// Sequence to draw ids from; defaults to `<table>_seq`.
    pub sequence_name: Option<String>,
}

impl InsertOptions {
    /// Options for a table with the given primary key column.
    pub fn primary_key(column: impl Into<String>) -> Self {
        Self {
            primary_key: Some(column.into()),
            ..Self::default()
        }
    }

    /// Use a caller-assigned id.
    pub fn with_id(mut self, id: impl Into<Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Draw ids from a specific sequence.
    pub fn with_sequence(mut self, sequence_name: impl Into<String>) -> Self {
        self.sequence_name = Some(sequence_name.into());
        self
    }
}

#[derive(Debug, Clone, Copy)]
enum TransactionEnd {
    Commit,
    Rollback,
}

/// An adapter connection over one native session.
///
/// All operations take `&mut self`: one caller, one statement at a time.
pub struct Connection<S: Session> {
    /// Native session.
    session: S,
    /// Whether auto-commit is enabled.
    autocommit: bool,
    /// Whether `begin_transaction` is in effect.
    in_transaction: bool,
    /// Column binders handed to every cursor.
    binders: BinderSet,
}

impl<S: Session> Connection<S> {
    /// Open a session through `driver` and prepare it.
    ///
    /// Any failure to open or prepare the session is reported as
    /// `Error::Connection` (or `Error::ConnectionTimeout`).
    pub async fn connect<D>(driver: &D, config: &ConnectConfig) -> Result<Self>
    where
        D: Driver<Session = S>,
    {
        let session = timeout(config.connect_timeout, driver.open(config))
            .await
            .map_err(|_| Error::ConnectionTimeout {
                host: config.connect_string(),
                timeout: config.connect_timeout,
            })?
            .map_err(into_connection_error)?;

        let conn = Self::from_session(session)
            .await
            .map_err(into_connection_error)?;
        info!(addr = %config.connect_string(), user = %config.username, "connected");
        Ok(conn)
    }

    /// Wrap an already open session: fix the session date formats and
    /// enable autocommit.
    pub async fn from_session(mut session: S) -> Result<Self> {
        for parameter in ["NLS_DATE_FORMAT", "NLS_TIMESTAMP_FORMAT"] {
            let sql = format!("ALTER SESSION SET {} = '{}'", parameter, SESSION_DATE_FORMAT);
            session.execute(&sql, &[]).await?;
        }
        session.set_autocommit(true).await?;
        Ok(Self {
            session,
            autocommit: true,
            in_transaction: false,
            binders: BinderSet::oracle_defaults(),
        })
    }

    /// Replace the column binders used for every cursor.
    pub fn with_binders(mut self, binders: BinderSet) -> Self {
        self.binders = binders;
        self
    }

    /// Get auto-commit mode.
    pub fn autocommit(&self) -> bool {
        self.autocommit
    }

    /// Whether a transaction is open.
    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    /// Get the native session.
    pub fn session(&self) -> &S {
        &self.session
    }

    /// Get the native session mutably (for driver-specific calls).
    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    /// Execute a statement, returning the affected row count.
    pub async fn execute(&mut self, sql: &str) -> Result<u64> {
        self.execute_with(sql, &[]).await
    }

    /// Execute a statement with named binds.
    pub async fn execute_with(&mut self, sql: &str, binds: &[Bind]) -> Result<u64> {
        debug!(%sql, binds = binds.len(), "execute");
        self.session.execute(sql, binds).await
    }

    /// Run a query and return all of its rows.
    ///
    /// A trailing `LIMIT n [OFFSET m]` is rewritten into `ROWNUM` filtering.
    /// `name_hint` set to [`WRITABLE_LOB_QUERY`] returns LOB locators
    /// instead of LOB contents.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let result = conn.query("SELECT id, name FROM users LIMIT 10 OFFSET 20", None).await?;
    /// for row in &result {
    ///     println!("{:?}", row.get("name"));
    /// }
    /// ```
    pub async fn query(&mut self, sql: &str, name_hint: Option<&str>) -> Result<QueryResult> {
        self.query_with(sql, &[], name_hint).await
    }

    /// Run a query with named binds.
    pub async fn query_with(
        &mut self,
        sql: &str,
        binds: &[Bind],
        name_hint: Option<&str>,
    ) -> Result<QueryResult> {
        let (body, pagination) = Pagination::extract(sql);
        let sql = pagination.apply(&body);
        debug!(%sql, hint = ?name_hint, "query");

        let cursor = RowCursor::open(
            &mut self.session,
            &sql,
            binds,
            &self.binders,
            LobMode::from_hint(name_hint),
        )
        .await?;
        let (columns, rows) = cursor.drain().await?;
        Ok(QueryResult { columns, rows })
    }

    /// Run a query with an explicit limit/offset.
    pub async fn query_paginated(
        &mut self,
        sql: &str,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<QueryResult> {
        let sql = Pagination::new(limit, offset).apply(sql);
        self.query(&sql, None).await
    }

    /// Run a query and return its first row, if any.
    pub async fn query_one(&mut self, sql: &str) -> Result<Option<Row>> {
        Ok(self.query(sql, None).await?.rows.into_iter().next())
    }

    /// Run a query and return the first column of its first row.
    pub async fn select_value(&mut self, sql: &str) -> Result<Option<Value>> {
        Ok(self.query_one(sql).await?.and_then(Row::into_first))
    }

    /// Draw the next value from a sequence.
    pub async fn next_sequence_value(&mut self, sequence_name: &str) -> Result<Value> {
        let sql = format!(
            "SELECT {}.NEXTVAL id FROM DUAL",
            quote_table_name(sequence_name)
        );
        match self.select_value(&sql).await? {
            Some(value) if !value.is_null() => Ok(value),
            _ => Err(Error::unexpected(format!(
                "sequence {} returned no value",
                sequence_name
            ))),
        }
    }

    /// Run an INSERT and resolve the primary key of the new row.
    ///
    /// Without a primary key column the statement runs as an opaque
    /// statement and `None` is returned. With a preset id the statement
    /// runs as-is and the id is returned. Otherwise the next value of the
    /// sequence is fetched first and bound to the `:id` placeholder the
    /// statement is expected to contain.
    pub async fn insert(&mut self, sql: &str, options: InsertOptions) -> Result<Option<Value>> {
        if options.primary_key.is_none() {
            self.execute(sql).await?;
            return Ok(None);
        }

        if let Some(id) = options.id.filter(|id| !id.is_null()) {
            self.execute(sql).await?;
            return Ok(Some(id));
        }

        let sequence_name = match options.sequence_name {
            Some(name) => name,
            None => insert_target(sql)
                .map(|table| default_sequence_name(&table))
                .ok_or_else(|| {
                    Error::unexpected(format!("cannot find the target table of {:?}", sql))
                })?,
        };
        let id = self.next_sequence_value(&sequence_name).await?;
        self.execute_with(sql, &[Bind::new(ID_PLACEHOLDER, id.clone())])
            .await?;
        Ok(Some(id))
    }

    /// Serialize a record, insert it and run the post-save hooks.
    ///
    /// Hooks only run when the insert resolved an id; their actions (LOB
    /// writes, follow-up statements) run in registration order and the
    /// first failure aborts the rest.
    ///
    /// Outside a transaction the whole save runs in one, committed on
    /// success and rolled back on failure. Inside one, the caller decides.
    pub async fn insert_record(
        &mut self,
        record: &Record,
        pipeline: &SerializationPipeline,
        hooks: &HookRegistry,
    ) -> Result<Option<Value>> {
        let owned = self.begin_owned_transaction().await?;
        let saved = self.save_record(record, pipeline, hooks).await;
        self.end_owned_transaction(owned, saved).await
    }

    async fn save_record(
        &mut self,
        record: &Record,
        pipeline: &SerializationPipeline,
        hooks: &HookRegistry,
    ) -> Result<Option<Value>> {
        let fields = pipeline.serialize(record);
        let sql = insert_sql(&record.table, &fields);
        let options = InsertOptions {
            primary_key: record.primary_key.clone(),
            id: record.primary_key_value().cloned(),
            sequence_name: record.sequence_name.clone(),
        };
        let id = self.insert(&sql, options).await?;

        match (&id, &record.primary_key) {
            (Some(id), Some(primary_key)) => {
                let actions = hooks.after_save(record, id);
                self.run_after_save(&record.table, primary_key, id, actions)
                    .await?;
            }
            _ => debug!(table = %record.table, "no id resolved; skipping post-save hooks"),
        }
        Ok(id)
    }

    async fn run_after_save(
        &mut self,
        table: &str,
        primary_key: &str,
        id: &Value,
        actions: Vec<AfterSaveAction>,
    ) -> Result<()> {
        let mut lob_writes = Vec::new();
        for action in actions {
            match action {
                AfterSaveAction::WriteLob(write) => lob_writes.push(write),
                AfterSaveAction::Execute(sql) => {
                    self.execute(&sql).await?;
                }
            }
        }
        if !lob_writes.is_empty() {
            self.write_lobs(table, primary_key, id, &lob_writes).await?;
        }
        Ok(())
    }

    /// Write LOB contents for a saved row.
    ///
    /// The row is selected `FOR UPDATE` with writable locators, then each
    /// column's locator receives its bytes. The columns must hold an empty
    /// LOB (as inserted by `EMPTY_BLOB()` / `EMPTY_CLOB()`), not NULL.
    ///
    /// Locators are only valid inside the transaction that selected them,
    /// so outside a transaction the writes run in one of their own.
    pub async fn write_lobs(
        &mut self,
        table: &str,
        primary_key: &str,
        id: &Value,
        writes: &[LobWrite],
    ) -> Result<()> {
        if writes.is_empty() {
            return Ok(());
        }
        let owned = self.begin_owned_transaction().await?;
        let written = self.write_locked_lobs(table, primary_key, id, writes).await;
        self.end_owned_transaction(owned, written).await
    }

    async fn write_locked_lobs(
        &mut self,
        table: &str,
        primary_key: &str,
        id: &Value,
        writes: &[LobWrite],
    ) -> Result<()> {
        let columns: Vec<String> = writes.iter().map(|w| quote_identifier(&w.column)).collect();
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = {} FOR UPDATE",
            columns.join(", "),
            quote_table_name(table),
            quote_identifier(primary_key),
            quote_literal(id, None)
        );
        let row = self
            .query(&sql, Some(WRITABLE_LOB_QUERY))
            .await?
            .rows
            .into_iter()
            .next()
            .ok_or_else(|| {
                Error::resource(format!("no row in {} with {} = {}", table, primary_key, id))
            })?;

        for write in writes {
            let locator = match row.get(&write.column) {
                Some(Value::Lob(lob)) => &lob.locator,
                _ => {
                    return Err(Error::resource(format!(
                        "column {} holds no LOB locator",
                        write.column
                    )))
                }
            };
            debug!(column = %write.column, bytes = write.data.len(), "write LOB");
            self.session
                .write_lob(locator, &write.data)
                .await
                .map_err(Error::into_resource)?;
        }
        Ok(())
    }

    /// Open a transaction unless one is already open; returns whether it did.
    async fn begin_owned_transaction(&mut self) -> Result<bool> {
        if self.in_transaction {
            return Ok(false);
        }
        self.begin_transaction().await?;
        Ok(true)
    }

    /// Finish a transaction opened by [`Self::begin_owned_transaction`]:
    /// commit after success, roll back after failure. The work's error wins
    /// over a failed rollback.
    async fn end_owned_transaction<T>(&mut self, owned: bool, outcome: Result<T>) -> Result<T> {
        if !owned {
            return outcome;
        }
        match outcome {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.rollback().await {
                    warn!(error = %rollback_err, "rollback after failed save failed");
                }
                Err(err)
            }
        }
    }

    /// Start a transaction: autocommit is turned off until commit/rollback.
    pub async fn begin_transaction(&mut self) -> Result<()> {
        if self.in_transaction {
            return Err(Error::transaction_state("transaction already open"));
        }
        self.session.set_autocommit(false).await?;
        self.autocommit = false;
        self.in_transaction = true;
        debug!("transaction started");
        Ok(())
    }

    /// Commit the open transaction. Autocommit is restored even when the
    /// commit itself fails.
    pub async fn commit(&mut self) -> Result<()> {
        self.end_transaction(TransactionEnd::Commit).await
    }

    /// Roll back the open transaction. Autocommit is restored even when the
    /// rollback itself fails.
    pub async fn rollback(&mut self) -> Result<()> {
        self.end_transaction(TransactionEnd::Rollback).await
    }

    async fn end_transaction(&mut self, end: TransactionEnd) -> Result<()> {
        if !self.in_transaction {
            return Err(Error::transaction_state(format!(
                "{:?} without begin_transaction",
                end
            )));
        }

        let outcome = match end {
            TransactionEnd::Commit => self.session.commit().await,
            TransactionEnd::Rollback => self.session.rollback().await,
        };

        self.in_transaction = false;
        let restored = self.session.set_autocommit(true).await;
        if restored.is_ok() {
            self.autocommit = true;
        }

        match (outcome, restored) {
            (Ok(()), Ok(())) => {
                debug!(?end, "transaction finished");
                Ok(())
            }
            (Ok(()), Err(restore_err)) => Err(restore_err),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(restore_err)) => {
                warn!(?end, error = %restore_err, "restoring autocommit failed after failed transaction end");
                Err(err)
            }
        }
    }

    /// Close the connection.
    pub async fn close(self) -> Result<()> {
        if self.in_transaction {
            warn!("closing connection with an open transaction");
        }
        self.session.close().await
    }
}

fn into_connection_error(err: Error) -> Error {
    if err.is_connection() {
        err
    } else {
        Error::connection(err.to_string())
    }
}

/// Table named by `INSERT INTO <table>`, without quotes.
pub(crate) fn insert_target(sql: &str) -> Option<String> {
    let mut words = sql.split_whitespace();
    words.find(|w| w.eq_ignore_ascii_case("into"))?;
    let target = words.next()?;
    let table = target.split('(').next()?.trim_matches('"');
    (!table.is_empty()).then(|| table.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_target() {
        assert_eq!(
            insert_target("INSERT INTO users (id, name) VALUES (:id, 'a')"),
            Some("users".to_string())
        );
        assert_eq!(
            insert_target("insert into posts(id) values (:id)"),
            Some("posts".to_string())
        );
        assert_eq!(
            insert_target("INSERT INTO \"Events\" VALUES (:id)"),
            Some("Events".to_string())
        );
        assert_eq!(insert_target("UPDATE users SET a = 1"), None);
    }

    #[test]
    fn test_insert_options_builder() {
        let options = InsertOptions::primary_key("id")
            .with_id(7)
            .with_sequence("s");
        assert_eq!(options.primary_key.as_deref(), Some("id"));
        assert_eq!(options.id, Some(Value::Integer(7)));
        assert_eq!(options.sequence_name.as_deref(), Some("s"));
        assert_eq!(InsertOptions::default().primary_key, None);
    }
}
