//! # sqltee-core
//!
//! Capability-forwarding proxies that time and log every database driver call.
//!
//! A backend implements the traits in [`driver`]. Wrapping it in a
//! [`TeeDriver`] yields connections, statements, rows and transactions that
//! forward every call to the backend, measure it, and hand one [`Entry`] per
//! call to a [`Logger`].
//!
//! Optional backend extensions (direct exec, context-aware calls, ping, ...)
//! are probed on every call. When the backend lacks one, the proxy degrades
//! to the closest plain operation instead of failing.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sqltee_core::{Context, NamedValue, TeeDriver};
//!
//! let driver = TeeDriver::new(backend, Arc::new(logger));
//! let mut conn = driver.open("postgres://localhost/app")?;
//!
//! let args = [NamedValue::positional(1, 42)];
//! let rows_affected = conn
//!     .exec_context(&Context::background(), "DELETE FROM users WHERE id = $1", &args)?
//!     .rows_affected()?;
//! ```

pub mod capability;
pub mod context;
pub mod driver;
pub mod error;
pub mod logger;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod tee;

pub use capability::Capabilities;
pub use context::{CancelHandle, Context};
pub use driver::{
    AccessMode, Conn, ConnBeginTx, ConnPrepareContext, Driver, ExecResult, Execer, ExecerContext,
    IsolationLevel, Pinger, Queryer, QueryerContext, Rows, SessionResetter, Stmt,
    StmtExecContext, StmtQueryContext, Tx, TxOptions,
};
pub use error::{ContextError, DriverResult, Error};
pub use logger::{Entry, FixedTimer, LogFn, Logger, NopLogger, Op, Stopwatch, Timer};
pub use tee::{Connector, TeeConn, TeeDriver, TeeResult, TeeRows, TeeStmt, TeeTx, named_to_values};

pub use sqltee_scan::{Args, NamedValue, Value, ValueKind};
