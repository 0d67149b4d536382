//! SQL literal rendering for bound values.
//!
//! The rendering targets PostgreSQL syntax:
//!
//! | Value | Literal |
//! |-------|---------|
//! | integers | `42` |
//! | floats | `4.1` (shortest text that reads back to the same value) |
//! | booleans | `TRUE` / `FALSE` |
//! | bytes | `E'\\x666f6f'` |
//! | strings | `'foo'` (not escaped) |
//! | timestamps | `'2020-11-21T13:56:42Z'` |
//! | null | `NULL` |
//!
//! ```rust
//! use sqltee_scan::{literal, Value};
//!
//! assert_eq!(literal(&Value::from(7i32)).unwrap(), "7");
//! assert_eq!(literal(&Value::from(None::<String>)).unwrap(), "NULL");
//! assert_eq!(literal(&Value::from(b"foo".to_vec())).unwrap(), r"E'\\x666f6f'");
//! ```

use std::fmt::Write;

use chrono::SecondsFormat;

use crate::error::{ScanError, ScanResult};
use crate::value::Value;

/// Render a value as a SQL literal.
pub fn literal(value: &Value) -> ScanResult<String> {
    let mut out = String::new();
    push_literal(&mut out, value)?;
    Ok(out)
}

/// Append the SQL literal of a value to `out`.
///
/// On error nothing is appended.
pub fn push_literal(out: &mut String, value: &Value) -> ScanResult<()> {
    // writes into a String cannot fail
    match value {
        Value::Null => out.push_str("NULL"),
        Value::Bool(true) => out.push_str("TRUE"),
        Value::Bool(false) => out.push_str("FALSE"),
        Value::Int(v) => {
            let _ = write!(out, "{}", v);
        }
        Value::UInt(v) => {
            let _ = write!(out, "{}", v);
        }
        Value::Float32(v) => push_float(out, *v as f64, |out| {
            let _ = write!(out, "{}", v);
        }),
        Value::Float(v) => push_float(out, *v, |out| {
            let _ = write!(out, "{}", v);
        }),
        Value::Bytes(v) => {
            out.push_str("E'\\\\x");
            out.push_str(&hex::encode(v));
            out.push('\'');
        }
        Value::String(v) => {
            out.push('\'');
            out.push_str(v);
            out.push('\'');
        }
        Value::Timestamp(v) => {
            out.push('\'');
            out.push_str(&v.to_rfc3339_opts(SecondsFormat::Secs, true));
            out.push('\'');
        }
        Value::Json(_) | Value::List(_) => return Err(ScanError::unsupported(value.kind())),
    }
    Ok(())
}

fn push_float(out: &mut String, v: f64, finite: impl FnOnce(&mut String)) {
    if v.is_nan() {
        out.push_str("'NaN'");
    } else if v.is_infinite() {
        out.push_str(if v > 0.0 { "'Infinity'" } else { "'-Infinity'" });
    } else {
        finite(out);
    }
}
