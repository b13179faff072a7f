//! Cursor draining with guaranteed release.
//!
//! Queries are read eagerly: a [`RowCursor`] is opened, every row is fetched
//! and mapped, and the server-side cursor is closed whether or not fetching
//! succeeded. The cursor borrows the session mutably, so only one cursor can
//! be open per session at a time.

use tracing::{debug, warn};

use crate::driver::{BinderSet, Bind, NativeCursor, Session};
use crate::error::Result;
use crate::mapper::{LobMode, RowMapper};
use crate::types::{ColumnMetadata, Row};

/// Row-by-row reader over one native cursor.
///
/// # Lifecycle
///
/// 1. Opened by [`RowCursor::open`]
/// 2. Iterated via `next()` or `fetch_all()`
/// 3. Closed via `close()`; [`RowCursor::drain`] does all three
pub(crate) struct RowCursor<'s, S: Session> {
    /// Session the cursor was opened on.
    session: &'s mut S,
    /// Native cursor (`None` once closed).
    cursor: Option<S::Cursor>,
    /// Column metadata as reported by the driver.
    columns: Vec<ColumnMetadata>,
    /// Mapper for this cursor's rows.
    mapper: RowMapper,
    /// Total rows fetched so far.
    rows_fetched: u64,
}

impl<'s, S: Session> RowCursor<'s, S> {
    /// Parse and execute `sql`, opening a cursor over its rows.
    pub(crate) async fn open(
        session: &'s mut S,
        sql: &str,
        binds: &[Bind],
        binders: &BinderSet,
        lob_mode: LobMode,
    ) -> Result<Self> {
        let cursor = session.open_cursor(sql, binds, binders).await?;
        let columns = cursor.columns().to_vec();
        let mapper = RowMapper::new(&columns, lob_mode);
        Ok(Self {
            session,
            cursor: Some(cursor),
            columns,
            mapper,
            rows_fetched: 0,
        })
    }

    /// Get the next mapped row. Returns `Ok(None)` when exhausted.
    pub(crate) async fn next(&mut self) -> Result<Option<Row>> {
        let Some(cursor) = self.cursor.as_mut() else {
            return Ok(None);
        };
        let Some(raw) = self.session.fetch(cursor).await? else {
            return Ok(None);
        };
        self.rows_fetched += 1;
        self.mapper.map_row(raw, &mut *self.session).await.map(Some)
    }

    /// Fetch all remaining rows.
    pub(crate) async fn fetch_all(&mut self) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        while let Some(row) = self.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Close the cursor and release server resources.
    pub(crate) async fn close(mut self) -> Result<()> {
        match self.cursor.take() {
            Some(cursor) => self.session.close_cursor(cursor).await,
            None => Ok(()),
        }
    }

    /// Fetch every row, then close the cursor regardless of the outcome.
    ///
    /// A fetch error wins over a close error; both are logged.
    pub(crate) async fn drain(mut self) -> Result<(Vec<ColumnMetadata>, Vec<Row>)> {
        let fetched = self.fetch_all().await;
        let rows_fetched = self.rows_fetched;
        let columns = std::mem::take(&mut self.columns);
        let closed = self.close().await;

        match (fetched, closed) {
            (Ok(rows), Ok(())) => {
                debug!(rows = rows_fetched, "cursor drained");
                Ok((columns, rows))
            }
            (Ok(_), Err(close_err)) => Err(close_err),
            (Err(fetch_err), Ok(())) => Err(fetch_err),
            (Err(fetch_err), Err(close_err)) => {
                warn!(error = %close_err, "closing cursor after failed fetch also failed");
                Err(fetch_err)
            }
        }
    }
}

impl<S: Session> Drop for RowCursor<'_, S> {
    fn drop(&mut self) {
        if self.cursor.is_some() {
            warn!("row cursor dropped while open; server cursor not released");
        }
    }
}
