//! Best-effort query interpolation for diagnostics.
//!
//! Substitutes the SQL literal of every bound parameter for its placeholder
//! so a logged query reads as it would have been run. The result is for
//! humans only: literals are not escaped and a literal that itself contains
//! a placeholder may be substituted again by a later step.
//!
//! ```rust
//! use sqltee_log::interpolate::{Placeholder, interpolate};
//! use sqltee_scan::{Args, Value};
//!
//! let args = [Value::from(42), Value::from("foo")];
//! let text = interpolate("SELECT * FROM t WHERE a = $1 AND b = $2", Args::Values(&args), Placeholder::Ordinal)
//!     .unwrap();
//!
//! assert_eq!(text.as_deref(), Some("SELECT * FROM t WHERE a = 42 AND b = 'foo'"));
//! ```

use sqltee_scan::{Args, ScanResult, Scanner};

/// How parameters are marked in query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder<'a> {
    /// `$1`, `$2`, ... for positional parameters and `:name` for named ones.
    Ordinal,
    /// One fixed marker for every parameter, e.g. `?`.
    Marker(&'a str),
}

/// Interpolate `args` into `query`.
///
/// Parameters are substituted from the highest ordinal down, so `$10` is
/// replaced before `$1` can match inside it. Under [`Placeholder::Ordinal`]
/// every occurrence of a placeholder is replaced; under
/// [`Placeholder::Marker`] each parameter replaces the rightmost marker left.
///
/// Returns `Ok(None)` when there is nothing to interpolate, the marker is
/// empty, or a placeholder cannot be found, and the scan error when a value
/// has no literal form.
pub fn interpolate(
    query: &str,
    args: Args<'_>,
    placeholder: Placeholder<'_>,
) -> ScanResult<Option<String>> {
    if args.is_empty() || placeholder == Placeholder::Marker("") {
        return Ok(None);
    }

    let mut text = query.to_string();
    for param in Scanner::new(args).reversed() {
        let param = param?;
        match placeholder {
            Placeholder::Ordinal => {
                let target = param.placeholder();
                if !text.contains(&target) {
                    return Ok(None);
                }
                text = text.replace(&target, &param.literal);
            }
            Placeholder::Marker(marker) => match text.rfind(marker) {
                Some(at) => text.replace_range(at..at + marker.len(), &param.literal),
                None => return Ok(None),
            },
        }
    }

    Ok(Some(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sqltee_scan::{NamedValue, ScanError, Value, ValueKind};

    fn values(n: i64) -> Vec<Value> {
        (1..=n).map(Value::from).collect()
    }

    #[test]
    fn test_ordinal_ten_before_one() {
        let args = values(10);
        let query = "SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, $10";
        let text = interpolate(query, Args::Values(&args), Placeholder::Ordinal)
            .unwrap()
            .unwrap();
        assert_eq!(text, "SELECT 1, 2, 3, 4, 5, 6, 7, 8, 9, 10");
        assert!(!text.contains('$'));
    }

    #[test]
    fn test_ordinal_replaces_every_occurrence() {
        let args = [Value::from("x")];
        let text = interpolate("SELECT $1 WHERE a = $1", Args::Values(&args), Placeholder::Ordinal)
            .unwrap();
        assert_eq!(text.as_deref(), Some("SELECT 'x' WHERE a = 'x'"));
    }

    #[test]
    fn test_named_parameters() {
        let args = [
            NamedValue::named("id", 1, 7),
            NamedValue::positional(2, true),
        ];
        let text = interpolate(
            "UPDATE t SET flag = $2 WHERE id = :id",
            Args::Named(&args),
            Placeholder::Ordinal,
        )
        .unwrap();
        assert_eq!(text.as_deref(), Some("UPDATE t SET flag = TRUE WHERE id = 7"));
    }

    #[test]
    fn test_marker_rightmost_first() {
        let args = [Value::from(1), Value::from("b")];
        let text = interpolate(
            "INSERT INTO t VALUES (?, ?)",
            Args::Values(&args),
            Placeholder::Marker("?"),
        )
        .unwrap();
        assert_eq!(text.as_deref(), Some("INSERT INTO t VALUES (1, 'b')"));
    }

    #[test]
    fn test_multi_char_marker() {
        let args = [Value::from(1), Value::from(2)];
        let text = interpolate("SELECT @p, @p", Args::Values(&args), Placeholder::Marker("@p"))
            .unwrap();
        assert_eq!(text.as_deref(), Some("SELECT 1, 2"));
    }

    #[test]
    fn test_missing_placeholder_abandons() {
        let args = values(2);
        assert_eq!(
            interpolate("SELECT $1", Args::Values(&args), Placeholder::Ordinal).unwrap(),
            None
        );
        assert_eq!(
            interpolate("SELECT ?", Args::Values(&args), Placeholder::Marker("?")).unwrap(),
            None
        );
    }

    #[test]
    fn test_empty_marker_abandons() {
        let args = values(2);
        assert_eq!(
            interpolate("SELECT 1", Args::Values(&args), Placeholder::Marker("")).unwrap(),
            None
        );
    }

    #[test]
    fn test_no_args() {
        assert_eq!(
            interpolate("SELECT 1", Args::None, Placeholder::Ordinal).unwrap(),
            None
        );
    }

    #[test]
    fn test_unsupported_value_fails() {
        let args = [Value::from(1), Value::list([1, 2])];
        let err = interpolate("SELECT $1, $2", Args::Values(&args), Placeholder::Ordinal)
            .unwrap_err();
        assert_eq!(err, ScanError::unsupported(ValueKind::List));
    }
}
