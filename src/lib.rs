//! # sqltee
//!
//! An instrumentation shim for SQL drivers: every call an application makes
//! through the driver is forwarded to the real backend, timed, and handed to
//! a logger.
//!
//! sqltee provides:
//! - A capability-forwarding proxy ([`TeeDriver`] and friends) that never
//!   hides or fakes what the backend supports
//! - SQL literal rendering for bound parameter values
//! - Reference loggers that interpolate parameters into the logged query
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sqltee::prelude::*;
//!
//! let logger = TracingLogger::new(TeeConfig::from_env()?);
//! let driver = TeeDriver::new(backend, Arc::new(logger));
//!
//! let mut conn = driver.open("postgres://localhost/app")?;
//! let args = [NamedValue::positional(1, 42)];
//! conn.exec_context(&Context::background(), "DELETE FROM users WHERE id = $1", &args)?;
//! // sqltee conn-exec-context 310µs query interpolation: DELETE FROM users WHERE id = 42
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Parameter values, literal rendering and scanning.
pub mod scan {
    pub use sqltee_scan::*;
}

/// The driver traits and the logging proxy.
pub mod proxy {
    pub use sqltee_core::*;
}

/// Reference loggers and their configuration.
pub mod log {
    pub use sqltee_log::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use sqltee_core::{
        Conn, Context, Driver, Entry, Error, Logger, NamedValue, Op, Rows, Stmt, TeeDriver, Tx,
        TxOptions, Value,
    };
    pub use sqltee_log::{TeeConfig, TracingLogger, WriterLogger};
}

// Re-export key types at the crate root
pub use sqltee_core::{Entry, Error, Logger, Op, TeeDriver};
pub use sqltee_log::{TeeConfig, TracingLogger, WriterLogger};
