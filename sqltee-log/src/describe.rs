//! Human-readable rendering of log entries.
//!
//! A description starts with `<topic> <op> <duration>` and appends, in
//! order, whichever of these apply:
//!
//! ```text
//!  error: <error>
//!  opts: <transaction options>            (non-default only)
//!  parameters scan error: <error>
//!  query interpolation: <query> | query: <query>
//!  args: [<args>]                         (only when not interpolated)
//!  last-insert-id: <n>                    (only if non-zero)
//!  rows-affected: <n>                     (only if non-zero)
//!  dest: [<row>]
//! ```

use std::fmt::Write;

use sqltee_core::Entry;
use sqltee_scan::Args;

use crate::config::TeeConfig;
use crate::interpolate::interpolate;

/// Render `entry` into a new string.
pub fn describe(entry: &Entry<'_>, config: &TeeConfig) -> String {
    let mut buf = String::new();
    describe_into(&mut buf, entry, config);
    buf
}

/// Append the description of `entry` to `buf`.
pub fn describe_into(buf: &mut String, entry: &Entry<'_>, config: &TeeConfig) {
    let _ = write!(buf, "{} {} {:?}", config.topic, entry.op, entry.duration);

    if let Some(err) = entry.error {
        let _ = write!(buf, " error: {}", err);
    }

    if let Some(opts) = entry.tx_options.filter(|opts| !opts.is_default()) {
        let _ = write!(buf, " opts: {}", opts);
    }

    if entry.op.binds_parameters() {
        describe_parameters(buf, entry, config);
    } else if let Some(query) = entry.query.filter(|q| !q.is_empty()) {
        buf.push_str(" query: ");
        push_truncated(buf, query, config.max_query_length);
    }

    if let Some(id) = entry.last_insert_id() {
        let _ = write!(buf, " last-insert-id: {}", id);
    }
    if let Some(n) = entry.rows_affected() {
        let _ = write!(buf, " rows-affected: {}", n);
    }

    if let Some(dest) = entry.dest.filter(|dest| !dest.is_empty()) {
        let _ = write!(buf, " dest: {}", Args::Values(dest));
    }
}

fn describe_parameters(buf: &mut String, entry: &Entry<'_>, config: &TeeConfig) {
    let query = entry.query.unwrap_or_default();

    let interpolation = match interpolate(query, entry.args, config.placeholder()) {
        Ok(text) => text,
        Err(err) => {
            let _ = write!(buf, " parameters scan error: {}", err);
            None
        }
    };

    match &interpolation {
        Some(text) => {
            buf.push_str(" query interpolation: ");
            push_truncated(buf, text, config.max_query_length);
        }
        None if !query.is_empty() => {
            buf.push_str(" query: ");
            push_truncated(buf, query, config.max_query_length);
        }
        None => {}
    }

    if interpolation.is_none() && !entry.args.is_empty() {
        let _ = write!(buf, " args: {}", entry.args);
    }
}

/// Append `text`, cut to `max` bytes on a char boundary (0 = unlimited).
fn push_truncated(buf: &mut String, text: &str, max: usize) {
    if max == 0 || text.len() <= max {
        buf.push_str(text);
        return;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    buf.push_str(&text[..end]);
    buf.push_str("...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sqltee_core::{DriverResult, Error, ExecResult, Op, TxOptions};
    use sqltee_scan::{NamedValue, Value};
    use std::time::Duration;

    const D: Duration = Duration::from_nanos(42);

    struct Res(i64, i64);

    impl ExecResult for Res {
        fn last_insert_id(&self) -> DriverResult<i64> {
            Ok(self.0)
        }

        fn rows_affected(&self) -> DriverResult<i64> {
            Ok(self.1)
        }
    }

    fn render(entry: Entry<'_>) -> String {
        describe(&entry, &TeeConfig::default())
    }

    #[test]
    fn test_plain_operation() {
        assert_eq!(render(Entry::new(Op::TxCommit, D)), "sqltee tx-commit 42ns");
    }

    #[test]
    fn test_error() {
        let err = Error::backend("deadlock detected");
        assert_eq!(
            render(Entry::new(Op::ConnClose, D).error(Some(&err))),
            "sqltee conn-close 42ns error: deadlock detected"
        );
    }

    #[test]
    fn test_prepare_query() {
        assert_eq!(
            render(Entry::new(Op::ConnPrepare, D).query("SELECT 1")),
            "sqltee conn-prepare 42ns query: SELECT 1"
        );
    }

    #[test]
    fn test_interpolation_with_result() {
        let args = [Value::from(42), Value::from("foo")];
        let res = Res(0, 1);
        let entry = Entry::new(Op::ConnExec, D)
            .query("UPDATE t SET b = $2 WHERE a = $1")
            .args(&args[..])
            .result(Some(&res));
        assert_eq!(
            render(entry),
            "sqltee conn-exec 42ns query interpolation: UPDATE t SET b = 'foo' WHERE a = 42 rows-affected: 1"
        );
    }

    #[test]
    fn test_scan_error_falls_back_to_raw() {
        let args = [NamedValue::positional(1, Value::Json(serde_json::json!({"a": 1})))];
        let entry = Entry::new(Op::StmtQueryContext, D)
            .query("SELECT $1")
            .args(&args[..]);
        assert_eq!(
            render(entry),
            "sqltee stmt-query-context 42ns parameters scan error: unsupported type: json query: SELECT $1 args: [$1={\"a\":1}]"
        );
    }

    #[test]
    fn test_missing_placeholder_shows_args() {
        let args = [Value::from(1)];
        let entry = Entry::new(Op::ConnQuery, D).query("SELECT ?").args(&args[..]);
        assert_eq!(
            render(entry),
            "sqltee conn-query 42ns query: SELECT ? args: [1]"
        );
    }

    #[test]
    fn test_marker_style() {
        let args = [Value::from(1), Value::from(2)];
        let entry = Entry::new(Op::StmtExec, D)
            .query("INSERT INTO t VALUES (?, ?)")
            .args(&args[..]);
        let config = TeeConfig::new().with_topic("db").with_placeholder("?");
        assert_eq!(
            describe(&entry, &config),
            "db stmt-exec 42ns query interpolation: INSERT INTO t VALUES (1, 2)"
        );
    }

    #[test]
    fn test_empty_marker_shows_raw_query() {
        let args = [Value::from(1), Value::from(2)];
        let entry = Entry::new(Op::ConnExec, D).query("SELECT 1").args(&args[..]);
        let config = TeeConfig {
            placeholder: Some(String::new()),
            ..TeeConfig::default()
        };
        assert_eq!(
            describe(&entry, &config),
            "sqltee conn-exec 42ns query: SELECT 1 args: [1 2]"
        );
    }

    #[test]
    fn test_tx_options_only_when_set() {
        let default = TxOptions::default();
        assert_eq!(
            render(Entry::new(Op::ConnBeginTx, D).tx_options(&default)),
            "sqltee conn-begin-tx 42ns"
        );

        let read_only = TxOptions::new().read_only();
        assert_eq!(
            render(Entry::new(Op::ConnBeginTx, D).tx_options(&read_only)),
            "sqltee conn-begin-tx 42ns opts: {isolation: DEFAULT, access: READ ONLY}"
        );
    }

    #[test]
    fn test_rows_next() {
        let dest = [Value::from(1), Value::from(b"ab".to_vec())];
        let eof = Error::EndOfRows;
        let entry = Entry::new(Op::RowsNext, D).dest(&dest).error(Some(&eof));
        assert_eq!(
            render(entry),
            "sqltee rows-next 42ns error: end of rows dest: [1 \\x6162]"
        );
    }

    #[test]
    fn test_truncation_on_char_boundary() {
        let config = TeeConfig::new().with_max_query_length(8);
        let entry = Entry::new(Op::ConnPrepare, D).query("SELECT 'héllo'");
        assert_eq!(
            describe(&entry, &config),
            "sqltee conn-prepare 42ns query: SELECT '..."
        );

        let mut buf = String::new();
        push_truncated(&mut buf, "aé", 2);
        assert_eq!(buf, "a...");
    }
}
