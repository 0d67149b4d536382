//! A [`Logger`] that emits one `tracing` event per driver call.

use sqltee_core::{Entry, Logger};

use crate::buffer::DESCRIPTIONS;
use crate::config::TeeConfig;

/// Emits records as `tracing` events with target `sqltee`.
///
/// Failed calls are logged at `error`; everything else, including the skip
/// and end-of-rows signals, at `info`.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use sqltee_core::TeeDriver;
/// use sqltee_log::{TeeConfig, TracingLogger};
///
/// let logger = TracingLogger::new(TeeConfig::from_env()?);
/// let driver = TeeDriver::new(backend, Arc::new(logger));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TracingLogger {
    config: TeeConfig,
}

impl TracingLogger {
    /// Create a logger with the given configuration.
    pub fn new(config: TeeConfig) -> Self {
        Self { config }
    }

    /// The logger's configuration.
    pub fn config(&self) -> &TeeConfig {
        &self.config
    }
}

impl Logger for TracingLogger {
    fn log(&self, entry: &Entry<'_>) {
        if !self.config.logs(entry.op) {
            return;
        }

        let duration_us = entry.duration.as_micros() as u64;
        let failed = entry.is_failure();

        DESCRIPTIONS.render(entry, &self.config, |description| {
            if failed {
                tracing::error!(
                    target: "sqltee",
                    topic = %self.config.topic,
                    op = %entry.op,
                    duration_us = duration_us,
                    "{}",
                    description
                );
            } else {
                tracing::info!(
                    target: "sqltee",
                    topic = %self.config.topic,
                    op = %entry.op,
                    duration_us = duration_us,
                    "{}",
                    description
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use sqltee_core::{Error, Op};
    use std::io;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(logger: &TracingLogger, entry: &Entry<'_>) -> String {
        let out = Capture::default();
        let writer = out.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || logger.log(entry));
        let bytes = out.0.lock().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_failure_logged_at_error() {
        let logger = TracingLogger::new(TeeConfig::new().with_topic("app"));
        let err = Error::backend("disk full");
        let entry = Entry::new(Op::ConnClose, Duration::from_nanos(42)).error(Some(&err));

        let out = capture(&logger, &entry);
        assert!(out.contains("ERROR"));
        assert!(out.contains("app conn-close 42ns error: disk full"));
        assert!(out.contains("op=conn-close"));
    }

    #[test]
    fn test_end_of_rows_logged_at_info() {
        let logger = TracingLogger::default();
        let eof = Error::EndOfRows;
        let entry = Entry::new(Op::RowsNext, Duration::ZERO).error(Some(&eof));

        let out = capture(&logger, &entry);
        assert!(out.contains("INFO"));
        assert!(out.contains("sqltee rows-next 0ns error: end of rows"));
    }

    #[test]
    fn test_silenced_ping_emits_nothing() {
        let logger = TracingLogger::new(TeeConfig::new().with_log_ping(false));
        let out = capture(&logger, &Entry::new(Op::ConnPing, Duration::ZERO));
        assert!(out.is_empty());
    }
}
