//! Reusable scratch space for descriptions that are emitted and discarded.
//!
//! [`TracingLogger`](crate::TracingLogger) only needs a description for the
//! length of one `tracing` event, so it renders into a recycled string
//! instead of allocating per call.

use std::sync::LazyLock;

use parking_lot::Mutex;
use sqltee_core::Entry;

use crate::config::TeeConfig;
use crate::describe::describe_into;

/// Fresh buffers start with room for a typical record.
const INITIAL_CAPACITY: usize = 256;

/// Buffers that grew past this (long queries, wide rows) are not kept.
const MAX_RETAINED_CAPACITY: usize = 4096;

/// At most this many idle buffers are kept.
const MAX_IDLE: usize = 64;

/// Idle description buffers.
#[derive(Debug, Default)]
pub(crate) struct DescriptionPool {
    idle: Mutex<Vec<String>>,
}

impl DescriptionPool {
    /// Describe `entry` into a recycled buffer and pass the text to `emit`.
    pub(crate) fn render<R>(
        &self,
        entry: &Entry<'_>,
        config: &TeeConfig,
        emit: impl FnOnce(&str) -> R,
    ) -> R {
        let mut buf = self
            .idle
            .lock()
            .pop()
            .unwrap_or_else(|| String::with_capacity(INITIAL_CAPACITY));
        describe_into(&mut buf, entry, config);
        let out = emit(&buf);
        self.recycle(buf);
        out
    }

    fn recycle(&self, mut buf: String) {
        if buf.capacity() > MAX_RETAINED_CAPACITY {
            return;
        }
        buf.clear();
        let mut idle = self.idle.lock();
        if idle.len() < MAX_IDLE {
            idle.push(buf);
        }
    }
}

/// Pool shared by every [`TracingLogger`](crate::TracingLogger).
pub(crate) static DESCRIPTIONS: LazyLock<DescriptionPool> = LazyLock::new(DescriptionPool::default);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sqltee_core::{Op, Value};
    use std::time::Duration;

    const D: Duration = Duration::from_nanos(42);

    #[test]
    fn test_buffer_reused_without_stale_text() {
        let pool = DescriptionPool::default();
        let config = TeeConfig::default();

        let first = pool.render(&Entry::new(Op::ConnExec, D).query("SELECT 1"), &config, str::len);
        assert_eq!(pool.idle.lock().len(), 1);

        let second = pool.render(&Entry::new(Op::ConnPing, D), &config, str::to_owned);
        assert_eq!(second, "sqltee conn-ping 42ns");
        assert!(first > second.len());
        assert_eq!(pool.idle.lock().len(), 1);
    }

    #[test]
    fn test_long_description_not_retained() {
        let pool = DescriptionPool::default();
        let config = TeeConfig {
            max_query_length: 0,
            ..TeeConfig::default()
        };
        let query = "x".repeat(MAX_RETAINED_CAPACITY + 1);

        let len = pool.render(&Entry::new(Op::ConnQuery, D).query(&query), &config, str::len);
        assert!(len > MAX_RETAINED_CAPACITY);
        assert_eq!(pool.idle.lock().len(), 0);
    }

    #[test]
    fn test_nested_render_uses_distinct_buffers() {
        let pool = DescriptionPool::default();
        let config = TeeConfig::default();
        let args = [Value::from(7)];
        let outer = Entry::new(Op::StmtExec, D).query("SELECT $1").args(&args[..]);
        let inner = Entry::new(Op::StmtClose, D);

        let (a, b) = pool.render(&outer, &config, |a| {
            let b = pool.render(&inner, &config, str::to_owned);
            (a.to_owned(), b)
        });
        assert_eq!(a, "sqltee stmt-exec 42ns query interpolation: SELECT 7");
        assert_eq!(b, "sqltee stmt-close 42ns");
        assert_eq!(pool.idle.lock().len(), 2);
    }
}
