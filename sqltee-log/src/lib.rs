//! # sqltee-log
//!
//! Reference [`Logger`](sqltee_core::Logger) implementations for sqltee.
//!
//! Both loggers render each call as a single description line, with bound
//! parameters interpolated into the query text when possible:
//!
//! ```text
//! sqltee conn-exec 1.2ms query interpolation: UPDATE t SET b = 'foo' WHERE a = 42 rows-affected: 1
//! ```
//!
//! - [`TracingLogger`] emits the line as a `tracing` event
//! - [`WriterLogger`] writes it as a JSON object per line to any `io::Write`
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sqltee_core::TeeDriver;
//! use sqltee_log::{TeeConfig, TracingLogger, logging};
//!
//! logging::init();
//! let config = TeeConfig::from_file("sqltee.toml")?.merge_env()?;
//! let driver = TeeDriver::new(backend, Arc::new(TracingLogger::new(config)));
//! ```

mod buffer;
pub mod config;
pub mod describe;
pub mod error;
pub mod interpolate;
pub mod logging;
pub mod tracing_logger;
pub mod writer;

pub use config::TeeConfig;
pub use describe::{describe, describe_into};
pub use error::{ConfigError, ConfigResult};
pub use interpolate::{Placeholder, interpolate};
pub use tracing_logger::TracingLogger;
pub use writer::{LogRecord, WriterLogger};
