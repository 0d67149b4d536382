//! Backend driver interface.
//!
//! A backend implements [`Driver`], [`Conn`], [`Stmt`], [`ExecResult`],
//! [`Rows`] and [`Tx`]. Everything else is optional: each extension is its
//! own trait, and the backend advertises it by overriding the matching
//! `as_*` accessor to return `Some(self)`.
//!
//! ```rust,ignore
//! impl Conn for PgConn {
//!     // ...
//!     fn as_execer_context(&mut self) -> Option<&mut dyn ExecerContext> {
//!         Some(self)
//!     }
//! }
//!
//! impl ExecerContext for PgConn {
//!     fn exec_context(&mut self, ctx: &Context, query: &str, args: &[NamedValue])
//!         -> DriverResult<Box<dyn ExecResult>> { /* ... */ }
//! }
//! ```
//!
//! The proxy checks on every call, so capabilities are always those of the
//! backend object at hand.

use std::fmt;

use sqltee_scan::{NamedValue, Value};

use crate::context::Context;
use crate::error::DriverResult;

/// A database driver able to open connections.
pub trait Driver: Send + Sync {
    /// Open a new connection described by `name`.
    fn open(&self, name: &str) -> DriverResult<Box<dyn Conn>>;
}

/// A connection to the database. Used by one caller at a time.
pub trait Conn: Send {
    /// Prepare a statement.
    fn prepare(&mut self, query: &str) -> DriverResult<Box<dyn Stmt>>;

    /// Close the connection.
    fn close(self: Box<Self>) -> DriverResult<()>;

    /// Begin a transaction with default options.
    fn begin(&mut self) -> DriverResult<Box<dyn Tx>>;

    /// Capability accessor for [`ConnBeginTx`].
    fn as_begin_tx(&mut self) -> Option<&mut dyn ConnBeginTx> {
        None
    }

    /// Capability accessor for [`ConnPrepareContext`].
    fn as_prepare_context(&mut self) -> Option<&mut dyn ConnPrepareContext> {
        None
    }

    /// Capability accessor for [`Execer`].
    fn as_execer(&mut self) -> Option<&mut dyn Execer> {
        None
    }

    /// Capability accessor for [`ExecerContext`].
    fn as_execer_context(&mut self) -> Option<&mut dyn ExecerContext> {
        None
    }

    /// Capability accessor for [`Queryer`].
    fn as_queryer(&mut self) -> Option<&mut dyn Queryer> {
        None
    }

    /// Capability accessor for [`QueryerContext`].
    fn as_queryer_context(&mut self) -> Option<&mut dyn QueryerContext> {
        None
    }

    /// Capability accessor for [`Pinger`].
    fn as_pinger(&mut self) -> Option<&mut dyn Pinger> {
        None
    }

    /// Capability accessor for [`SessionResetter`].
    fn as_session_resetter(&mut self) -> Option<&mut dyn SessionResetter> {
        None
    }
}

/// Begin a transaction with options and a context.
pub trait ConnBeginTx {
    fn begin_tx(&mut self, ctx: &Context, opts: &TxOptions) -> DriverResult<Box<dyn Tx>>;
}

/// Prepare a statement with a context.
pub trait ConnPrepareContext {
    fn prepare_context(&mut self, ctx: &Context, query: &str) -> DriverResult<Box<dyn Stmt>>;
}

/// Execute a query directly on the connection without preparing it.
pub trait Execer {
    fn exec(&mut self, query: &str, args: &[Value]) -> DriverResult<Box<dyn ExecResult>>;
}

/// Execute a query directly on the connection with a context and named parameters.
pub trait ExecerContext {
    fn exec_context(
        &mut self,
        ctx: &Context,
        query: &str,
        args: &[NamedValue],
    ) -> DriverResult<Box<dyn ExecResult>>;
}

/// Run a query directly on the connection without preparing it.
pub trait Queryer {
    fn query(&mut self, query: &str, args: &[Value]) -> DriverResult<Box<dyn Rows>>;
}

/// Run a query directly on the connection with a context and named parameters.
pub trait QueryerContext {
    fn query_context(
        &mut self,
        ctx: &Context,
        query: &str,
        args: &[NamedValue],
    ) -> DriverResult<Box<dyn Rows>>;
}

/// Check that the connection is alive.
pub trait Pinger {
    fn ping(&mut self, ctx: &Context) -> DriverResult<()>;
}

/// Reset session state before the connection is reused.
pub trait SessionResetter {
    fn reset_session(&mut self, ctx: &Context) -> DriverResult<()>;
}

/// A prepared statement.
pub trait Stmt: Send {
    /// Close the statement.
    fn close(self: Box<Self>) -> DriverResult<()>;

    /// Number of placeholders, or `None` if the backend does not know.
    fn num_input(&self) -> Option<usize>;

    /// Execute the statement.
    fn exec(&mut self, args: &[Value]) -> DriverResult<Box<dyn ExecResult>>;

    /// Run the statement as a query.
    fn query(&mut self, args: &[Value]) -> DriverResult<Box<dyn Rows>>;

    /// Capability accessor for [`StmtExecContext`].
    fn as_exec_context(&mut self) -> Option<&mut dyn StmtExecContext> {
        None
    }

    /// Capability accessor for [`StmtQueryContext`].
    fn as_query_context(&mut self) -> Option<&mut dyn StmtQueryContext> {
        None
    }
}

/// Execute a prepared statement with a context and named parameters.
pub trait StmtExecContext {
    fn exec_context(&mut self, ctx: &Context, args: &[NamedValue])
    -> DriverResult<Box<dyn ExecResult>>;
}

/// Run a prepared statement as a query with a context and named parameters.
pub trait StmtQueryContext {
    fn query_context(&mut self, ctx: &Context, args: &[NamedValue]) -> DriverResult<Box<dyn Rows>>;
}

/// Outcome of an executed statement.
pub trait ExecResult: Send + Sync {
    /// Id generated by the last insert.
    fn last_insert_id(&self) -> DriverResult<i64>;

    /// Number of rows changed.
    fn rows_affected(&self) -> DriverResult<i64>;
}

/// A cursor over query results.
pub trait Rows: Send {
    /// Column names.
    fn columns(&self) -> Vec<String>;

    /// Close the cursor.
    fn close(self: Box<Self>) -> DriverResult<()>;

    /// Read the next row into `dest`.
    ///
    /// Returns [`Error::EndOfRows`](crate::Error::EndOfRows) once exhausted.
    fn next(&mut self, dest: &mut [Value]) -> DriverResult<()>;
}

/// An open transaction.
pub trait Tx: Send {
    /// Commit the transaction.
    fn commit(self: Box<Self>) -> DriverResult<()>;

    /// Roll the transaction back.
    fn rollback(self: Box<Self>) -> DriverResult<()>;
}

/// Transaction isolation levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IsolationLevel {
    /// Whatever the backend defaults to.
    #[default]
    Default,
    /// Read uncommitted - allows dirty reads.
    ReadUncommitted,
    /// Read committed - prevents dirty reads.
    ReadCommitted,
    /// Write committed.
    WriteCommitted,
    /// Repeatable read - prevents non-repeatable reads.
    RepeatableRead,
    /// Snapshot isolation.
    Snapshot,
    /// Serializable.
    Serializable,
    /// Linearizable - highest isolation level.
    Linearizable,
}

impl IsolationLevel {
    /// Get the SQL name of this isolation level.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Default => "DEFAULT",
            Self::ReadUncommitted => "READ UNCOMMITTED",
            Self::ReadCommitted => "READ COMMITTED",
            Self::WriteCommitted => "WRITE COMMITTED",
            Self::RepeatableRead => "REPEATABLE READ",
            Self::Snapshot => "SNAPSHOT",
            Self::Serializable => "SERIALIZABLE",
            Self::Linearizable => "LINEARIZABLE",
        }
    }
}

/// Access mode for transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AccessMode {
    /// Read-write access (default).
    #[default]
    ReadWrite,
    /// Read-only access.
    ReadOnly,
}

impl AccessMode {
    /// Get the SQL clause for this access mode.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::ReadWrite => "READ WRITE",
            Self::ReadOnly => "READ ONLY",
        }
    }
}

/// Options for beginning a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TxOptions {
    /// Isolation level.
    pub isolation: IsolationLevel,
    /// Access mode.
    pub access_mode: AccessMode,
}

impl TxOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the isolation level.
    pub fn isolation(mut self, level: IsolationLevel) -> Self {
        self.isolation = level;
        self
    }

    /// Make the transaction read-only.
    pub fn read_only(mut self) -> Self {
        self.access_mode = AccessMode::ReadOnly;
        self
    }

    /// Whether these are the default options.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for TxOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{isolation: {}, access: {}}}",
            self.isolation.as_sql(),
            self.access_mode.as_sql()
        )
    }
}
