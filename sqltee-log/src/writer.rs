//! A [`Logger`] writing one JSON object per line to any `io::Write`.
//!
//! ```text
//! {"topic":"sqltee","op":"conn-exec","duration_ns":42,"description":"sqltee conn-exec 42ns query interpolation: DELETE FROM t WHERE id = 7"}
//! ```

use std::io::Write;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sqltee_core::{Entry, Logger};

use crate::config::TeeConfig;
use crate::describe::describe;

/// One line written by a [`WriterLogger`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// The configured topic.
    pub topic: String,
    /// Operation name, e.g. `conn-exec`.
    pub op: String,
    /// Call duration in nanoseconds.
    pub duration_ns: u64,
    /// Rendered description.
    pub description: String,
}

/// Writes records as JSON lines.
///
/// Write failures never reach the caller; they are reported as `warn`
/// events with target `sqltee`.
#[derive(Debug)]
pub struct WriterLogger<W> {
    writer: Mutex<W>,
    config: TeeConfig,
}

impl<W: Write + Send> WriterLogger<W> {
    /// Create a logger writing to `writer`.
    pub fn new(writer: W, config: TeeConfig) -> Self {
        Self {
            writer: Mutex::new(writer),
            config,
        }
    }

    /// The logger's configuration.
    pub fn config(&self) -> &TeeConfig {
        &self.config
    }

    /// Run `f` with exclusive access to the writer.
    pub fn with_writer<R>(&self, f: impl FnOnce(&mut W) -> R) -> R {
        f(&mut self.writer.lock())
    }

    /// Consume the logger, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn write_record(&self, record: &LogRecord) -> std::io::Result<()> {
        let mut writer = self.writer.lock();
        serde_json::to_writer(&mut *writer, record)?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}

impl<W: Write + Send> Logger for WriterLogger<W> {
    fn log(&self, entry: &Entry<'_>) {
        if !self.config.logs(entry.op) {
            return;
        }

        let record = LogRecord {
            topic: self.config.topic.clone(),
            op: entry.op.as_str().to_string(),
            duration_ns: entry.duration.as_nanos() as u64,
            description: describe(entry, &self.config),
        };

        if let Err(e) = self.write_record(&record) {
            tracing::warn!(target: "sqltee", op = %entry.op, error = %e, "failed to write log record");
        }
    }
}
