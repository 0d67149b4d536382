//! The logging contract between the proxies and a log sink.
//!
//! Every instrumented call ends in exactly one [`Logger::log`] call carrying
//! an [`Entry`]. The entry borrows everything from the call, so a logger that
//! needs to keep anything must copy it out.
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use sqltee_core::{Entry, LogFn, Logger, Op};
//!
//! let logger = LogFn::new(|entry: &Entry<'_>| {
//!     println!("{} took {:?}", entry.op, entry.duration);
//! });
//!
//! logger.log(&Entry::new(Op::TxCommit, Duration::from_micros(12)));
//! ```

use std::fmt;
use std::time::{Duration, Instant};

use sqltee_scan::{Args, Value};

use crate::context::Context;
use crate::driver::{ExecResult, TxOptions};
use crate::error::Error;

/// Instrumented operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    DriverOpen,
    ConnPrepare,
    ConnPrepareContext,
    ConnClose,
    ConnBegin,
    ConnBeginTx,
    ConnExec,
    ConnExecContext,
    ConnPing,
    ConnQuery,
    ConnQueryContext,
    StmtClose,
    StmtExec,
    StmtExecContext,
    StmtQuery,
    StmtQueryContext,
    RowsNext,
    TxCommit,
    TxRollback,
}

impl Op {
    /// Every operation, in declaration order.
    pub const ALL: [Op; 19] = [
        Op::DriverOpen,
        Op::ConnPrepare,
        Op::ConnPrepareContext,
        Op::ConnClose,
        Op::ConnBegin,
        Op::ConnBeginTx,
        Op::ConnExec,
        Op::ConnExecContext,
        Op::ConnPing,
        Op::ConnQuery,
        Op::ConnQueryContext,
        Op::StmtClose,
        Op::StmtExec,
        Op::StmtExecContext,
        Op::StmtQuery,
        Op::StmtQueryContext,
        Op::RowsNext,
        Op::TxCommit,
        Op::TxRollback,
    ];

    /// Stable name used in log records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DriverOpen => "driver-open",
            Self::ConnPrepare => "conn-prepare",
            Self::ConnPrepareContext => "conn-prepare-context",
            Self::ConnClose => "conn-close",
            Self::ConnBegin => "conn-begin",
            Self::ConnBeginTx => "conn-begin-tx",
            Self::ConnExec => "conn-exec",
            Self::ConnExecContext => "conn-exec-context",
            Self::ConnPing => "conn-ping",
            Self::ConnQuery => "conn-query",
            Self::ConnQueryContext => "conn-query-context",
            Self::StmtClose => "stmt-close",
            Self::StmtExec => "stmt-exec",
            Self::StmtExecContext => "stmt-exec-context",
            Self::StmtQuery => "stmt-query",
            Self::StmtQueryContext => "stmt-query-context",
            Self::RowsNext => "rows-next",
            Self::TxCommit => "tx-commit",
            Self::TxRollback => "tx-rollback",
        }
    }

    /// Whether the operation binds parameters to a query.
    pub fn binds_parameters(&self) -> bool {
        matches!(
            self,
            Self::ConnExec
                | Self::ConnExecContext
                | Self::ConnQuery
                | Self::ConnQueryContext
                | Self::StmtExec
                | Self::StmtExecContext
                | Self::StmtQuery
                | Self::StmtQueryContext
        )
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One instrumented call, handed to the logger once.
#[derive(Clone, Copy)]
pub struct Entry<'a> {
    /// The operation.
    pub op: Op,
    /// Time spent in the call.
    pub duration: Duration,
    /// The error returned to the caller, if any.
    pub error: Option<&'a Error>,
    /// Query text.
    pub query: Option<&'a str>,
    /// Bound parameters.
    pub args: Args<'a>,
    /// Transaction options for `conn-begin-tx`.
    pub tx_options: Option<&'a TxOptions>,
    /// Result of an exec call.
    pub result: Option<&'a dyn ExecResult>,
    /// Context of a context-aware call.
    pub context: Option<&'a Context>,
    /// Row buffer of a `rows-next` call.
    pub dest: Option<&'a [Value]>,
}

impl<'a> Entry<'a> {
    /// Create an entry with nothing but the operation and its duration.
    pub fn new(op: Op, duration: Duration) -> Self {
        Self {
            op,
            duration,
            error: None,
            query: None,
            args: Args::None,
            tx_options: None,
            result: None,
            context: None,
            dest: None,
        }
    }

    /// Attach the call's error.
    pub fn error(mut self, error: Option<&'a Error>) -> Self {
        self.error = error;
        self
    }

    /// Attach query text.
    pub fn query(mut self, query: &'a str) -> Self {
        self.query = Some(query);
        self
    }

    /// Attach bound parameters.
    pub fn args(mut self, args: impl Into<Args<'a>>) -> Self {
        self.args = args.into();
        self
    }

    /// Attach transaction options.
    pub fn tx_options(mut self, opts: &'a TxOptions) -> Self {
        self.tx_options = Some(opts);
        self
    }

    /// Attach an exec result.
    pub fn result(mut self, result: Option<&'a dyn ExecResult>) -> Self {
        self.result = result;
        self
    }

    /// Attach the call's context.
    pub fn context(mut self, ctx: &'a Context) -> Self {
        self.context = Some(ctx);
        self
    }

    /// Attach a row buffer.
    pub fn dest(mut self, dest: &'a [Value]) -> Self {
        self.dest = Some(dest);
        self
    }

    /// Whether the call failed, ignoring the skip and end-of-rows signals.
    pub fn is_failure(&self) -> bool {
        self.error.is_some_and(|err| !err.is_signal())
    }

    /// Last insert id of the result, when retrievable and non-zero.
    pub fn last_insert_id(&self) -> Option<i64> {
        self.result
            .and_then(|res| res.last_insert_id().ok())
            .filter(|id| *id != 0)
    }

    /// Rows affected by the result, when retrievable and non-zero.
    pub fn rows_affected(&self) -> Option<i64> {
        self.result
            .and_then(|res| res.rows_affected().ok())
            .filter(|n| *n != 0)
    }
}

impl fmt::Debug for Entry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("op", &self.op)
            .field("duration", &self.duration)
            .field("error", &self.error)
            .field("query", &self.query)
            .field("args", &self.args)
            .field("tx_options", &self.tx_options)
            .field("result", &self.result.map(|_| ".."))
            .field("context", &self.context)
            .field("dest", &self.dest)
            .finish()
    }
}

/// Measures one call.
pub trait Timer {
    /// Time elapsed since the timer was created.
    fn stop(&self) -> Duration;
}

/// Wall-clock timer.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    /// Start timing now.
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Timer for Stopwatch {
    fn stop(&self) -> Duration {
        self.started.elapsed()
    }
}

/// A timer that always reports the same duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedTimer(pub Duration);

impl Timer for FixedTimer {
    fn stop(&self) -> Duration {
        self.0
    }
}

/// Receives one entry per instrumented call.
///
/// Logging cannot fail from the caller's point of view: a logger that hits
/// an error deals with it itself.
pub trait Logger: Send + Sync {
    /// Record a finished call.
    fn log(&self, entry: &Entry<'_>);

    /// Create the timer for the next call.
    fn timer(&self) -> Box<dyn Timer> {
        Box::new(Stopwatch::start())
    }
}

/// A logger that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopLogger;

impl Logger for NopLogger {
    fn log(&self, _entry: &Entry<'_>) {}
}

/// Adapts a closure into a [`Logger`].
pub struct LogFn<F> {
    f: F,
}

impl<F> LogFn<F>
where
    F: Fn(&Entry<'_>) + Send + Sync,
{
    /// Wrap `f`.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Logger for LogFn<F>
where
    F: Fn(&Entry<'_>) + Send + Sync,
{
    fn log(&self, entry: &Entry<'_>) {
        (self.f)(entry)
    }
}

impl<F> fmt::Debug for LogFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogFn").finish_non_exhaustive()
    }
}
