//! In-memory backend and recording logger.
//!
//! The mock backend advertises exactly the [`Capabilities`] it is built
//! with, records every backend call by name, and can be told to fail any
//! call. [`MockLogger`] keeps owned copies of every entry and times every
//! call at a fixed 42ns.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sqltee_core::mock::{MockDriver, MockLogger};
//! use sqltee_core::{Capabilities, Context, Op, TeeDriver};
//!
//! let backend = MockDriver::new(Capabilities::EXEC);
//! let logger = Arc::new(MockLogger::new());
//! let driver = TeeDriver::new(backend.clone(), logger.clone());
//!
//! let mut conn = driver.open("mock").unwrap();
//! conn.exec_context(&Context::background(), "DELETE FROM t", &[]).unwrap();
//!
//! assert_eq!(backend.calls(), vec!["open", "exec"]);
//! assert_eq!(logger.ops(), vec![Op::DriverOpen, Op::ConnExec, Op::ConnExecContext]);
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use sqltee_scan::{NamedValue, Value};

use crate::capability::Capabilities;
use crate::context::Context;
use crate::driver::{
    Conn, ConnBeginTx, ConnPrepareContext, Driver, ExecResult, Execer, ExecerContext, Pinger,
    Queryer, QueryerContext, Rows, SessionResetter, Stmt, StmtExecContext, StmtQueryContext, Tx,
    TxOptions,
};
use crate::error::{DriverResult, Error};
use crate::logger::{Entry, FixedTimer, Logger, Op, Timer};

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<String>,
    failures: HashMap<String, String>,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    last_insert_id: i64,
    rows_affected: i64,
}

#[derive(Debug, Clone, Default)]
struct Shared {
    caps: Capabilities,
    state: Arc<Mutex<MockState>>,
}

impl Shared {
    /// Record a backend call, failing it if a failure was scripted.
    fn enter(&self, call: &str) -> DriverResult<()> {
        let mut state = self.state.lock();
        state.calls.push(call.to_string());
        match state.failures.get(call) {
            Some(message) => Err(Error::backend(message.clone())),
            None => Ok(()),
        }
    }

    fn result(&self) -> Box<dyn ExecResult> {
        let state = self.state.lock();
        Box::new(MockResult {
            last_insert_id: state.last_insert_id,
            rows_affected: state.rows_affected,
        })
    }

    fn rows(&self) -> Box<dyn Rows> {
        let state = self.state.lock();
        Box::new(MockRows {
            shared: self.clone(),
            columns: state.columns.clone(),
            rows: state.rows.clone().into_iter(),
        })
    }
}

/// A scripted in-memory driver.
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    shared: Shared,
}

impl MockDriver {
    /// A backend advertising `caps` on its connections and statements.
    pub fn new(caps: Capabilities) -> Self {
        Self {
            shared: Shared {
                caps,
                state: Arc::default(),
            },
        }
    }

    /// A backend advertising every capability.
    pub fn full() -> Self {
        Self::new(Capabilities::all())
    }

    /// Make every call named `call` fail with a backend error.
    pub fn fail(self, call: &str, message: &str) -> Self {
        self.shared
            .state
            .lock()
            .failures
            .insert(call.to_string(), message.to_string());
        self
    }

    /// Rows returned by every query.
    pub fn with_rows(self, columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        {
            let mut state = self.shared.state.lock();
            state.columns = columns.iter().map(|c| c.to_string()).collect();
            state.rows = rows;
        }
        self
    }

    /// Result metadata returned by every exec.
    pub fn with_result(self, last_insert_id: i64, rows_affected: i64) -> Self {
        {
            let mut state = self.shared.state.lock();
            state.last_insert_id = last_insert_id;
            state.rows_affected = rows_affected;
        }
        self
    }

    /// Names of the backend calls made so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.shared.state.lock().calls.clone()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.shared.state.lock().calls.clear();
    }
}

impl Driver for MockDriver {
    fn open(&self, _name: &str) -> DriverResult<Box<dyn Conn>> {
        self.shared.enter("open")?;
        Ok(Box::new(MockConn {
            shared: self.shared.clone(),
        }))
    }
}

/// Connection of a [`MockDriver`].
#[derive(Debug)]
pub struct MockConn {
    shared: Shared,
}

impl MockConn {
    fn has(&self, cap: Capabilities) -> bool {
        self.shared.caps.contains(cap)
    }
}

impl Conn for MockConn {
    fn prepare(&mut self, query: &str) -> DriverResult<Box<dyn Stmt>> {
        self.shared.enter("prepare")?;
        Ok(Box::new(MockStmt::new(self.shared.clone(), query)))
    }

    fn close(self: Box<Self>) -> DriverResult<()> {
        self.shared.enter("close")
    }

    fn begin(&mut self) -> DriverResult<Box<dyn Tx>> {
        self.shared.enter("begin")?;
        Ok(Box::new(MockTx {
            shared: self.shared.clone(),
        }))
    }

    fn as_begin_tx(&mut self) -> Option<&mut dyn ConnBeginTx> {
        if self.has(Capabilities::BEGIN_TX) {
            Some(self)
        } else {
            None
        }
    }

    fn as_prepare_context(&mut self) -> Option<&mut dyn ConnPrepareContext> {
        if self.has(Capabilities::PREPARE_CONTEXT) {
            Some(self)
        } else {
            None
        }
    }

    fn as_execer(&mut self) -> Option<&mut dyn Execer> {
        if self.has(Capabilities::EXEC) {
            Some(self)
        } else {
            None
        }
    }

    fn as_execer_context(&mut self) -> Option<&mut dyn ExecerContext> {
        if self.has(Capabilities::EXEC_CONTEXT) {
            Some(self)
        } else {
            None
        }
    }

    fn as_queryer(&mut self) -> Option<&mut dyn Queryer> {
        if self.has(Capabilities::QUERY) {
            Some(self)
        } else {
            None
        }
    }

    fn as_queryer_context(&mut self) -> Option<&mut dyn QueryerContext> {
        if self.has(Capabilities::QUERY_CONTEXT) {
            Some(self)
        } else {
            None
        }
    }

    fn as_pinger(&mut self) -> Option<&mut dyn Pinger> {
        if self.has(Capabilities::PING) {
            Some(self)
        } else {
            None
        }
    }

    fn as_session_resetter(&mut self) -> Option<&mut dyn SessionResetter> {
        if self.has(Capabilities::RESET_SESSION) {
            Some(self)
        } else {
            None
        }
    }
}

impl ConnBeginTx for MockConn {
    fn begin_tx(&mut self, _ctx: &Context, _opts: &TxOptions) -> DriverResult<Box<dyn Tx>> {
        self.shared.enter("begin_tx")?;
        Ok(Box::new(MockTx {
            shared: self.shared.clone(),
        }))
    }
}

impl ConnPrepareContext for MockConn {
    fn prepare_context(&mut self, _ctx: &Context, query: &str) -> DriverResult<Box<dyn Stmt>> {
        self.shared.enter("prepare_context")?;
        Ok(Box::new(MockStmt::new(self.shared.clone(), query)))
    }
}

impl Execer for MockConn {
    fn exec(&mut self, _query: &str, _args: &[Value]) -> DriverResult<Box<dyn ExecResult>> {
        self.shared.enter("exec")?;
        Ok(self.shared.result())
    }
}

impl ExecerContext for MockConn {
    fn exec_context(
        &mut self,
        _ctx: &Context,
        _query: &str,
        _args: &[NamedValue],
    ) -> DriverResult<Box<dyn ExecResult>> {
        self.shared.enter("exec_context")?;
        Ok(self.shared.result())
    }
}

impl Queryer for MockConn {
    fn query(&mut self, _query: &str, _args: &[Value]) -> DriverResult<Box<dyn Rows>> {
        self.shared.enter("query")?;
        Ok(self.shared.rows())
    }
}

impl QueryerContext for MockConn {
    fn query_context(
        &mut self,
        _ctx: &Context,
        _query: &str,
        _args: &[NamedValue],
    ) -> DriverResult<Box<dyn Rows>> {
        self.shared.enter("query_context")?;
        Ok(self.shared.rows())
    }
}

impl Pinger for MockConn {
    fn ping(&mut self, _ctx: &Context) -> DriverResult<()> {
        self.shared.enter("ping")
    }
}

impl SessionResetter for MockConn {
    fn reset_session(&mut self, _ctx: &Context) -> DriverResult<()> {
        self.shared.enter("reset_session")
    }
}

/// Prepared statement of a [`MockConn`].
#[derive(Debug)]
pub struct MockStmt {
    shared: Shared,
    num_input: usize,
}

impl MockStmt {
    fn new(shared: Shared, query: &str) -> Self {
        let num_input = query.matches('?').count() + query.matches('$').count();
        Self { shared, num_input }
    }
}

impl Stmt for MockStmt {
    fn close(self: Box<Self>) -> DriverResult<()> {
        self.shared.enter("stmt_close")
    }

    fn num_input(&self) -> Option<usize> {
        Some(self.num_input)
    }

    fn exec(&mut self, _args: &[Value]) -> DriverResult<Box<dyn ExecResult>> {
        self.shared.enter("stmt_exec")?;
        Ok(self.shared.result())
    }

    fn query(&mut self, _args: &[Value]) -> DriverResult<Box<dyn Rows>> {
        self.shared.enter("stmt_query")?;
        Ok(self.shared.rows())
    }

    fn as_exec_context(&mut self) -> Option<&mut dyn StmtExecContext> {
        if self.shared.caps.contains(Capabilities::STMT_EXEC_CONTEXT) {
            Some(self)
        } else {
            None
        }
    }

    fn as_query_context(&mut self) -> Option<&mut dyn StmtQueryContext> {
        if self.shared.caps.contains(Capabilities::STMT_QUERY_CONTEXT) {
            Some(self)
        } else {
            None
        }
    }
}

impl StmtExecContext for MockStmt {
    fn exec_context(
        &mut self,
        _ctx: &Context,
        _args: &[NamedValue],
    ) -> DriverResult<Box<dyn ExecResult>> {
        self.shared.enter("stmt_exec_context")?;
        Ok(self.shared.result())
    }
}

impl StmtQueryContext for MockStmt {
    fn query_context(&mut self, _ctx: &Context, _args: &[NamedValue]) -> DriverResult<Box<dyn Rows>> {
        self.shared.enter("stmt_query_context")?;
        Ok(self.shared.rows())
    }
}

/// Fixed exec result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockResult {
    pub last_insert_id: i64,
    pub rows_affected: i64,
}

impl ExecResult for MockResult {
    fn last_insert_id(&self) -> DriverResult<i64> {
        Ok(self.last_insert_id)
    }

    fn rows_affected(&self) -> DriverResult<i64> {
        Ok(self.rows_affected)
    }
}

/// Cursor over scripted rows.
#[derive(Debug)]
pub struct MockRows {
    shared: Shared,
    columns: Vec<String>,
    rows: std::vec::IntoIter<Vec<Value>>,
}

impl Rows for MockRows {
    fn columns(&self) -> Vec<String> {
        self.columns.clone()
    }

    fn close(self: Box<Self>) -> DriverResult<()> {
        self.shared.enter("rows_close")
    }

    fn next(&mut self, dest: &mut [Value]) -> DriverResult<()> {
        self.shared.enter("rows_next")?;
        let row = self.rows.next().ok_or(Error::EndOfRows)?;
        for (slot, value) in dest.iter_mut().zip(row) {
            *slot = value;
        }
        Ok(())
    }
}

/// Transaction of a [`MockConn`].
#[derive(Debug)]
pub struct MockTx {
    shared: Shared,
}

impl Tx for MockTx {
    fn commit(self: Box<Self>) -> DriverResult<()> {
        self.shared.enter("commit")
    }

    fn rollback(self: Box<Self>) -> DriverResult<()> {
        self.shared.enter("rollback")
    }
}

/// Owned copy of an [`Entry`].
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedEntry {
    pub op: Op,
    pub duration: Duration,
    pub error: Option<String>,
    pub query: Option<String>,
    /// Bound parameters, rendered with their `Display` form.
    pub args: String,
    pub tx_options: Option<TxOptions>,
    pub last_insert_id: Option<i64>,
    pub rows_affected: Option<i64>,
    pub has_context: bool,
    pub dest: Option<Vec<Value>>,
}

impl From<&Entry<'_>> for CapturedEntry {
    fn from(entry: &Entry<'_>) -> Self {
        Self {
            op: entry.op,
            duration: entry.duration,
            error: entry.error.map(|err| err.to_string()),
            query: entry.query.map(str::to_string),
            args: entry.args.to_string(),
            tx_options: entry.tx_options.copied(),
            last_insert_id: entry.last_insert_id(),
            rows_affected: entry.rows_affected(),
            has_context: entry.context.is_some(),
            dest: entry.dest.map(<[Value]>::to_vec),
        }
    }
}

/// A logger that keeps every entry and reports a fixed duration.
#[derive(Debug, Default)]
pub struct MockLogger {
    entries: Mutex<Vec<CapturedEntry>>,
}

impl MockLogger {
    /// Duration reported by every timer.
    pub const DURATION: Duration = Duration::from_nanos(42);

    /// Create an empty logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every entry logged so far.
    pub fn entries(&self) -> Vec<CapturedEntry> {
        self.entries.lock().clone()
    }

    /// Operations logged so far, in order.
    pub fn ops(&self) -> Vec<Op> {
        self.entries.lock().iter().map(|e| e.op).collect()
    }

    /// The most recent entry.
    pub fn last(&self) -> Option<CapturedEntry> {
        self.entries.lock().last().cloned()
    }

    /// Forget logged entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Logger for MockLogger {
    fn log(&self, entry: &Entry<'_>) {
        self.entries.lock().push(CapturedEntry::from(entry));
    }

    fn timer(&self) -> Box<dyn Timer> {
        Box::new(FixedTimer(Self::DURATION))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probes_follow_capabilities() {
        let driver = MockDriver::new(Capabilities::EXEC | Capabilities::STMT_QUERY_CONTEXT);
        let mut conn = driver.open("mock").unwrap();
        assert_eq!(
            Capabilities::of_conn(conn.as_mut()),
            Capabilities::EXEC
        );

        let mut stmt = conn.prepare("SELECT $1").unwrap();
        assert_eq!(
            Capabilities::of_stmt(stmt.as_mut()),
            Capabilities::STMT_QUERY_CONTEXT
        );
        assert_eq!(stmt.num_input(), Some(1));
    }

    #[test]
    fn test_scripted_failure() {
        let driver = MockDriver::full().fail("ping", "connection reset");
        let mut conn = driver.open("mock").unwrap();
        let err = conn
            .as_pinger()
            .unwrap()
            .ping(&Context::background())
            .unwrap_err();
        assert_eq!(err.to_string(), "connection reset");
        assert_eq!(driver.calls(), vec!["open", "ping"]);
    }

    #[test]
    fn test_rows_end() {
        let driver = MockDriver::full().with_rows(&["n"], vec![vec![Value::from(1)]]);
        let mut conn = driver.open("mock").unwrap();
        let mut rows = conn.as_queryer().unwrap().query("SELECT n", &[]).unwrap();

        let mut dest = [Value::Null];
        rows.next(&mut dest).unwrap();
        assert_eq!(dest[0], Value::from(1));
        assert!(rows.next(&mut dest).unwrap_err().is_end_of_rows());
    }
}
