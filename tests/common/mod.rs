//! Scripted driver double shared by the integration tests.
//!
//! Queries are answered from result sets registered against a SQL substring
//! (case-insensitive, first match wins). `<seq>.NEXTVAL` queries are answered
//! from per-sequence counters starting at 10000, and `ROWNUM` pagination
//! wrappers are evaluated over the inner result the way the server would.
//! Every call is recorded and most calls can be made to fail.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use oracle_adapter::config::ConnectConfig;
use oracle_adapter::driver::constants::ORA_TYPE_NUM_NUMBER;
use oracle_adapter::driver::{Bind, BinderSet, DefineAs, Driver, NativeCursor, Session};
use oracle_adapter::types::{ColumnMetadata, LobKind, LobLocator, LobValue, NativeValue};
use oracle_adapter::{Connection, Error, Result};

/// Route adapter logs to the test harness' captured output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// A scripted result set.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub columns: Vec<ColumnMetadata>,
    pub rows: Vec<Vec<NativeValue>>,
}

impl ResultSet {
    pub fn new(columns: &[(&str, u16)]) -> Self {
        Self {
            columns: columns
                .iter()
                .map(|(name, ty)| ColumnMetadata::new(*name, *ty))
                .collect(),
            rows: Vec::new(),
        }
    }

    pub fn row(mut self, values: Vec<NativeValue>) -> Self {
        self.rows.push(values);
        self
    }
}

/// Calls that can be made to fail.
#[derive(Debug, Default)]
pub struct Faults {
    /// `Driver::open` fails with this message.
    pub open: Option<String>,
    /// `Driver::open` sleeps this long first.
    pub open_delay: Option<Duration>,
    pub commit: bool,
    pub rollback: bool,
    /// `set_autocommit(true)` fails.
    pub restore_autocommit: bool,
    /// `fetch` fails once this many rows were returned by the cursor.
    pub fetch_after: Option<usize>,
    pub close_cursor: bool,
    pub read_lob: bool,
    pub write_lob: bool,
    /// Statements containing the pattern fail with the ORA code.
    pub statements: Vec<(String, u32)>,
}

/// Everything the double has seen and been told.
#[derive(Debug, Default)]
pub struct State {
    pub responses: Vec<(String, ResultSet)>,
    pub faults: Faults,
    /// Every statement and query, in order.
    pub statements: Vec<String>,
    /// Session autocommit mode when each of `statements` ran.
    pub statement_autocommit: Vec<bool>,
    /// Binds passed to `execute`, keyed by statement.
    pub binds: Vec<(String, Vec<Bind>)>,
    /// Fetch definitions chosen by the binders, per opened cursor.
    pub defines: Vec<Vec<Option<DefineAs>>>,
    pub autocommit: bool,
    pub autocommit_log: Vec<bool>,
    pub sequences: HashMap<String, i64>,
    /// LOB contents keyed by locator bytes.
    pub lobs: HashMap<Vec<u8>, Vec<u8>>,
    pub lob_reads: usize,
    pub lob_writes: Vec<(Vec<u8>, Vec<u8>)>,
    /// Session autocommit mode when each LOB write ran.
    pub lob_write_autocommit: Vec<bool>,
    pub cursors_opened: usize,
    pub cursors_closed: usize,
    pub commits: usize,
    pub rollbacks: usize,
    pub closed: bool,
}

impl State {
    /// Statements containing `pattern` (case-insensitive).
    pub fn statements_matching(&self, pattern: &str) -> Vec<&str> {
        self.statements
            .iter()
            .filter(|s| contains_ci(s, pattern))
            .map(String::as_str)
            .collect()
    }

    /// Position of the first statement containing `pattern`.
    pub fn position(&self, pattern: &str) -> Option<usize> {
        self.statements.iter().position(|s| contains_ci(s, pattern))
    }

    /// Autocommit mode of the first statement containing `pattern`.
    pub fn autocommit_during(&self, pattern: &str) -> Option<bool> {
        self.position(pattern)
            .map(|i| self.statement_autocommit[i])
    }

    fn record(&mut self, sql: &str) {
        let autocommit = self.autocommit;
        self.statements.push(sql.to_string());
        self.statement_autocommit.push(autocommit);
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}

/// Driver handing out [`FakeSession`]s over one shared [`State`].
#[derive(Debug, Clone, Default)]
pub struct FakeDriver {
    state: Arc<Mutex<State>>,
}

impl FakeDriver {
    pub fn new() -> Self {
        init_tracing();
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Answer queries containing `pattern` with `result`.
    pub fn respond(&self, pattern: &str, result: ResultSet) -> &Self {
        self.state().responses.push((pattern.to_string(), result));
        self
    }

    /// Fail statements containing `pattern` with `ORA-<code>`.
    pub fn fail_statement(&self, pattern: &str, code: u32) -> &Self {
        self.state()
            .faults
            .statements
            .push((pattern.to_string(), code));
        self
    }

    /// Store LOB contents behind a locator.
    pub fn store_lob(&self, locator: &[u8], data: &[u8]) {
        self.state().lobs.insert(locator.to_vec(), data.to_vec());
    }

    /// Connect with the default configuration.
    pub async fn connect(&self) -> Connection<FakeSession> {
        Connection::connect(self, &ConnectConfig::default())
            .await
            .unwrap()
    }
}

impl Driver for FakeDriver {
    type Session = FakeSession;

    async fn open(&self, _config: &ConnectConfig) -> Result<FakeSession> {
        let (delay, failure) = {
            let state = self.state();
            (state.faults.open_delay, state.faults.open.clone())
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = failure {
            return Err(Error::statement(12514, message));
        }
        Ok(FakeSession {
            state: Arc::clone(&self.state),
        })
    }
}

/// A LOB column value referring to `locator`.
pub fn lob(kind: LobKind, locator: &[u8]) -> NativeValue {
    NativeValue::Lob(LobValue::locator_only(LobLocator::new(
        kind,
        locator.to_vec(),
        0,
        8132,
    )))
}

#[derive(Debug)]
pub struct FakeCursor {
    columns: Vec<ColumnMetadata>,
    rows: VecDeque<Vec<NativeValue>>,
    fetched: usize,
}

impl NativeCursor for FakeCursor {
    fn columns(&self) -> &[ColumnMetadata] {
        &self.columns
    }
}

#[derive(Debug)]
pub struct FakeSession {
    state: Arc<Mutex<State>>,
}

impl FakeSession {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }
}

fn scripted_failure(state: &State, sql: &str) -> Option<Error> {
    state
        .faults
        .statements
        .iter()
        .find(|(pattern, _)| contains_ci(sql, pattern))
        .map(|(_, code)| Error::statement(*code, format!("scripted failure: {}", sql)))
}

/// Sequence named in `<seq>.NEXTVAL`, lowercased.
fn nextval_sequence(sql: &str) -> Option<String> {
    let idx = sql.to_ascii_uppercase().find(".NEXTVAL")?;
    let name = sql[..idx].split_whitespace().last()?;
    Some(name.trim_matches('"').to_ascii_lowercase())
}

fn number_after(sql: &str, marker: &str) -> Option<usize> {
    let lower = sql.to_ascii_lowercase();
    let start = lower.find(&marker.to_ascii_lowercase())? + marker.len();
    let digits: String = sql[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Evaluate the ROWNUM wrapper: number rows from 1, cut at the ceiling,
/// then drop rows at or below the floor.
fn paginate(sql: &str, mut result: ResultSet) -> ResultSet {
    if !contains_ci(sql, "raw_rnum_") {
        return result;
    }
    let ceiling = number_after(sql, "ROWNUM <= ");
    let floor = number_after(sql, "raw_rnum_ > ").unwrap_or(0);

    result
        .columns
        .push(ColumnMetadata::new("RAW_RNUM_", ORA_TYPE_NUM_NUMBER));
    result.rows = result
        .rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| (i + 1, row))
        .take_while(|(rnum, _)| ceiling.map_or(true, |c| *rnum <= c))
        .filter(|(rnum, _)| *rnum > floor)
        .map(|(rnum, mut row)| {
            row.push(NativeValue::Number(rnum.to_string()));
            row
        })
        .collect();
    result
}

impl Session for FakeSession {
    type Cursor = FakeCursor;

    async fn execute(&mut self, sql: &str, binds: &[Bind]) -> Result<u64> {
        let mut state = self.state();
        state.record(sql);
        state.binds.push((sql.to_string(), binds.to_vec()));
        match scripted_failure(&state, sql) {
            Some(err) => Err(err),
            None => Ok(1),
        }
    }

    async fn open_cursor(
        &mut self,
        sql: &str,
        _binds: &[Bind],
        binders: &BinderSet,
    ) -> Result<FakeCursor> {
        let mut state = self.state();
        state.record(sql);
        if let Some(err) = scripted_failure(&state, sql) {
            return Err(err);
        }

        let result = match nextval_sequence(sql) {
            Some(sequence) => {
                let counter = state.sequences.entry(sequence).or_insert(10000);
                let value = *counter;
                *counter += 1;
                ResultSet::new(&[("ID", ORA_TYPE_NUM_NUMBER)])
                    .row(vec![NativeValue::Number(value.to_string())])
            }
            None => {
                let scripted = state
                    .responses
                    .iter()
                    .find(|(pattern, _)| contains_ci(sql, pattern))
                    .map(|(_, result)| result.clone())
                    .ok_or_else(|| Error::statement(942, "table or view does not exist"))?;
                paginate(sql, scripted)
            }
        };

        let defines = binders.define_all(&result.columns);
        state.defines.push(defines);
        state.cursors_opened += 1;
        Ok(FakeCursor {
            columns: result.columns,
            rows: result.rows.into(),
            fetched: 0,
        })
    }

    async fn fetch(&mut self, cursor: &mut FakeCursor) -> Result<Option<Vec<NativeValue>>> {
        if let Some(limit) = self.state().faults.fetch_after {
            if cursor.fetched >= limit {
                return Err(Error::resource("fetch across network failed"));
            }
        }
        let row = cursor.rows.pop_front();
        if row.is_some() {
            cursor.fetched += 1;
        }
        Ok(row)
    }

    async fn close_cursor(&mut self, _cursor: FakeCursor) -> Result<()> {
        let mut state = self.state();
        state.cursors_closed += 1;
        if state.faults.close_cursor {
            return Err(Error::resource("cursor close failed"));
        }
        Ok(())
    }

    async fn set_autocommit(&mut self, autocommit: bool) -> Result<()> {
        let mut state = self.state();
        state.autocommit_log.push(autocommit);
        if autocommit && state.faults.restore_autocommit {
            return Err(Error::statement(3113, "end-of-file on communication channel"));
        }
        state.autocommit = autocommit;
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        let mut state = self.state();
        state.commits += 1;
        if state.faults.commit {
            return Err(Error::statement(2091, "transaction rolled back"));
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        let mut state = self.state();
        state.rollbacks += 1;
        if state.faults.rollback {
            return Err(Error::statement(3113, "end-of-file on communication channel"));
        }
        Ok(())
    }

    async fn read_lob(&mut self, locator: &LobLocator) -> Result<Vec<u8>> {
        let mut state = self.state();
        state.lob_reads += 1;
        if state.faults.read_lob {
            return Err(Error::statement(22275, "invalid LOB locator specified"));
        }
        Ok(state.lobs.get(&locator.locator).cloned().unwrap_or_default())
    }

    async fn write_lob(&mut self, locator: &LobLocator, data: &[u8]) -> Result<()> {
        let mut state = self.state();
        let autocommit = state.autocommit;
        state.lob_write_autocommit.push(autocommit);
        if state.faults.write_lob {
            return Err(Error::statement(22990, "LOB locators cannot span transactions"));
        }
        state.lobs.insert(locator.locator.clone(), data.to_vec());
        state
            .lob_writes
            .push((locator.locator.clone(), data.to_vec()));
        Ok(())
    }

    async fn close(self) -> Result<()> {
        self.state().closed = true;
        Ok(())
    }
}
