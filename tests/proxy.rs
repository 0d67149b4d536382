//! Integration tests for the instrumenting proxy.
//!
//! These tests drive the proxy against the in-memory backend and check both
//! what reaches the backend and what reaches the logger.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use sqltee::proxy::{
    Capabilities, Context, ContextError, Error, NamedValue, Op, TeeDriver, TxOptions, Value,
};
use sqltee_core::IsolationLevel;
use sqltee_core::mock::{MockDriver, MockLogger};

fn setup(backend: &MockDriver) -> (TeeDriver, Arc<MockLogger>) {
    let logger = Arc::new(MockLogger::new());
    let driver = TeeDriver::new(backend.clone(), logger.clone());
    (driver, logger)
}

/// Exec under a context degrades to the plain exec path.
#[test]
fn test_exec_context_degrades_to_exec() {
    let backend = MockDriver::new(Capabilities::EXEC).with_result(0, 3);
    let (driver, logger) = setup(&backend);

    let mut conn = driver.open("mock").unwrap();
    let args = [NamedValue::positional(1, 42)];
    let res = conn
        .exec_context(&Context::background(), "DELETE FROM t WHERE a = $1", &args)
        .unwrap();

    assert_eq!(res.rows_affected().unwrap(), 3);
    assert_eq!(backend.calls(), vec!["open", "exec"]);
    assert_eq!(
        logger.ops(),
        vec![Op::DriverOpen, Op::ConnExec, Op::ConnExecContext]
    );

    let entries = logger.entries();
    let nested = &entries[1];
    assert_eq!(nested.args, "[42]");
    assert!(!nested.has_context);

    let outer = logger.last().unwrap();
    assert_eq!(outer.query.as_deref(), Some("DELETE FROM t WHERE a = $1"));
    assert_eq!(outer.args, "[$1=42]");
    assert_eq!(outer.rows_affected, Some(3));
    assert!(outer.has_context);
    assert_eq!(outer.duration, MockLogger::DURATION);
}

/// Without any exec path the skip signal is logged twice and returned.
#[test]
fn test_exec_context_without_backend_support_skips() {
    let backend = MockDriver::new(Capabilities::NONE);
    let (driver, logger) = setup(&backend);

    let mut conn = driver.open("mock").unwrap();
    let err = conn
        .exec_context(&Context::background(), "DELETE FROM t", &[])
        .unwrap_err();

    assert!(err.is_skip());
    assert_eq!(backend.calls(), vec!["open"]);
    let entries = logger.entries();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[1].op, Op::ConnExec);
    assert_eq!(entries[1].error, Some(Error::Skip.to_string()));
    assert_eq!(entries[2].op, Op::ConnExecContext);
    assert_eq!(entries[2].error, Some(Error::Skip.to_string()));
}

/// A canceled context stops a degraded call before the backend sees it.
#[test]
fn test_canceled_context_never_reaches_backend() {
    let backend = MockDriver::new(Capabilities::QUERY);
    let (driver, logger) = setup(&backend);

    let mut conn = driver.open("mock").unwrap();
    let (ctx, cancel) = Context::background().with_cancel();
    cancel.cancel();

    let err = conn.query_context(&ctx, "SELECT 1", &[]).unwrap_err();

    assert!(matches!(err, Error::Context(ContextError::Canceled)));
    assert_eq!(backend.calls(), vec!["open"]);
    assert_eq!(logger.ops(), vec![Op::DriverOpen, Op::ConnQueryContext]);
    assert_eq!(logger.last().unwrap().error.as_deref(), Some("context canceled"));
}

/// An expired deadline is reported the same way.
#[test]
fn test_expired_deadline() {
    let backend = MockDriver::new(Capabilities::EXEC);
    let (driver, _logger) = setup(&backend);

    let mut conn = driver.open("mock").unwrap();
    let ctx = Context::background().with_timeout(Duration::ZERO);

    let err = conn.exec_context(&ctx, "SELECT 1", &[]).unwrap_err();
    assert!(matches!(err, Error::Context(ContextError::DeadlineExceeded)));
}

/// Named parameters cannot be degraded to positional values.
#[test]
fn test_named_parameter_rejected_on_degrade() {
    let backend = MockDriver::new(Capabilities::EXEC);
    let (driver, logger) = setup(&backend);

    let mut conn = driver.open("mock").unwrap();
    let args = [NamedValue::named("id", 1, 7)];
    let err = conn
        .exec_context(&Context::background(), "DELETE FROM t WHERE id = :id", &args)
        .unwrap_err();

    assert!(matches!(err, Error::UnsupportedParameterKind { ref name } if name == "id"));
    assert_eq!(backend.calls(), vec!["open"]);
    assert_eq!(logger.ops(), vec![Op::DriverOpen, Op::ConnExecContext]);
}

/// Backend errors pass through unchanged and are logged.
#[test]
fn test_backend_error_passes_through() {
    let backend = MockDriver::full().fail("exec_context", "relation \"t\" does not exist");
    let (driver, logger) = setup(&backend);

    let mut conn = driver.open("mock").unwrap();
    let err = conn
        .exec_context(&Context::background(), "DELETE FROM t", &[])
        .unwrap_err();

    assert_eq!(err.to_string(), "relation \"t\" does not exist");
    assert_eq!(
        logger.last().unwrap().error.as_deref(),
        Some("relation \"t\" does not exist")
    );
}

/// A full prepared-statement round trip, in call order.
#[test]
fn test_prepared_statement_lifecycle() {
    let backend = MockDriver::full().with_rows(
        &["id", "name"],
        vec![vec![Value::from(1), Value::from("ada")]],
    );
    let (driver, logger) = setup(&backend);
    let ctx = Context::background();

    let mut conn = driver.open("mock").unwrap();
    let mut stmt = conn
        .prepare_context(&ctx, "SELECT id, name FROM users WHERE id = $1")
        .unwrap();
    assert_eq!(stmt.query_text(), "SELECT id, name FROM users WHERE id = $1");
    assert_eq!(stmt.num_input(), Some(1));

    let mut rows = stmt.query_context(&ctx, &[NamedValue::positional(1, 1)]).unwrap();
    assert_eq!(rows.columns(), vec!["id", "name"]);

    let mut dest = vec![Value::Null, Value::Null];
    rows.next(&mut dest).unwrap();
    assert_eq!(dest, vec![Value::from(1), Value::from("ada")]);
    assert!(rows.next(&mut dest).unwrap_err().is_end_of_rows());
    rows.close().unwrap();
    stmt.close().unwrap();
    conn.close().unwrap();

    assert_eq!(
        logger.ops(),
        vec![
            Op::DriverOpen,
            Op::ConnPrepareContext,
            Op::StmtQueryContext,
            Op::RowsNext,
            Op::RowsNext,
            Op::StmtClose,
            Op::ConnClose,
        ]
    );
    assert_eq!(
        backend.calls(),
        vec![
            "open",
            "prepare_context",
            "stmt_query_context",
            "rows_next",
            "rows_next",
            "rows_close",
            "stmt_close",
            "close",
        ]
    );

    let entries = logger.entries();
    let query = &entries[2];
    assert_eq!(
        query.query.as_deref(),
        Some("SELECT id, name FROM users WHERE id = $1")
    );
}

/// Transactions started with options keep them in the record.
#[test]
fn test_transaction_with_options() {
    let backend = MockDriver::new(Capabilities::NONE);
    let (driver, logger) = setup(&backend);

    let mut conn = driver.open("mock").unwrap();
    let opts = TxOptions::new().isolation(IsolationLevel::Serializable);
    let tx = conn.begin_tx(&Context::background(), &opts).unwrap();
    tx.rollback().unwrap();

    assert_eq!(backend.calls(), vec!["open", "begin", "rollback"]);
    assert_eq!(
        logger.ops(),
        vec![Op::DriverOpen, Op::ConnBeginTx, Op::TxRollback]
    );
    assert_eq!(logger.entries()[1].tx_options, Some(opts));
}

/// An instrumented driver can wrap another instrumented driver.
#[test]
fn test_proxies_stack() {
    let backend = MockDriver::new(Capabilities::EXEC);
    let inner_logger = Arc::new(MockLogger::new());
    let outer_logger = Arc::new(MockLogger::new());
    let inner = TeeDriver::new(backend.clone(), inner_logger.clone());
    let outer = TeeDriver::new(inner, outer_logger.clone());

    let mut conn = outer.open("mock").unwrap();
    assert_eq!(conn.capabilities(), Capabilities::CONN);

    let mut stmt = conn.prepare("DELETE FROM t").unwrap();
    assert_eq!(stmt.capabilities(), Capabilities::STMT);
    stmt.close().unwrap();
    backend.clear_calls();
    outer_logger.clear();
    inner_logger.clear();

    conn.exec_context(&Context::background(), "DELETE FROM t", &[])
        .unwrap();

    assert_eq!(backend.calls(), vec!["exec"]);
    assert_eq!(outer_logger.ops(), vec![Op::ConnExecContext]);
    assert_eq!(
        inner_logger.ops(),
        vec![Op::ConnExec, Op::ConnExecContext]
    );
}

/// Connectors open connections lazily through the driver.
#[test]
fn test_connector() {
    let backend = MockDriver::full();
    let (driver, logger) = setup(&backend);
    let connector = Arc::new(driver).open_connector("postgres://localhost/app");

    assert_eq!(connector.name(), "postgres://localhost/app");
    assert!(logger.ops().is_empty());

    let mut conn = connector.connect(&Context::background()).unwrap();
    conn.ping(&Context::background()).unwrap();
    assert_eq!(logger.ops(), vec![Op::DriverOpen, Op::ConnPing]);
}
