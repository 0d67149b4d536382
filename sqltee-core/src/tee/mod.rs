//! Instrumenting proxies around backend objects.
//!
//! Each wrapper owns one backend object and shares the [`Logger`] of the
//! driver it came from. Every forwarding method starts a timer, calls the
//! backend (or degrades when the backend lacks the capability), and hands
//! one [`Entry`](crate::Entry) to the logger with the final outcome.
//!
//! Context-aware calls degrade in a fixed order when the backend does not
//! implement them:
//!
//! 1. named parameters are converted to positional values, failing on the
//!    first parameter that has a name;
//! 2. the context is checked once, without blocking;
//! 3. the plain proxy method runs and logs its own entry.
//!
//! The wrappers also implement the backend traits themselves, advertising
//! every capability, so an instrumented driver can stand in for any other.
//!
//! [`Logger`]: crate::Logger

mod conn;
mod driver;
mod result;
mod rows;
mod stmt;
mod tx;

pub use conn::TeeConn;
pub use driver::{Connector, TeeDriver};
pub use result::TeeResult;
pub use rows::TeeRows;
pub use stmt::TeeStmt;
pub use tx::TeeTx;

use sqltee_scan::{NamedValue, Value};

use crate::context::Context;
use crate::error::{DriverResult, Error};
use crate::logger::Op;

pub(crate) const TARGET: &str = "sqltee::proxy";

/// Convert named parameters to positional values.
///
/// Fails on the first parameter bound by name.
pub fn named_to_values(named: &[NamedValue]) -> DriverResult<Vec<Value>> {
    named
        .iter()
        .map(|nv| match nv.name() {
            Some(name) => Err(Error::unsupported_parameter(name)),
            None => Ok(nv.value.clone()),
        })
        .collect()
}

/// Steps 1 and 2 of degrading a context-aware call.
pub(crate) fn degrade(op: Op, ctx: &Context, args: &[NamedValue]) -> DriverResult<Vec<Value>> {
    tracing::trace!(target: TARGET, op = %op, "backend lacks capability, degrading");
    let values = named_to_values(args)?;
    if let Some(err) = ctx.err() {
        return Err(err.into());
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContextError;

    #[test]
    fn test_named_to_values() {
        let args = [NamedValue::positional(1, 42), NamedValue::positional(2, "foo")];
        let values = named_to_values(&args).unwrap();
        assert_eq!(values, vec![Value::from(42), Value::from("foo")]);
    }

    #[test]
    fn test_named_to_values_rejects_names() {
        let args = [NamedValue::positional(1, 42), NamedValue::named("id", 2, 7)];
        let err = named_to_values(&args).unwrap_err();
        assert!(matches!(err, Error::UnsupportedParameterKind { ref name } if name == "id"));
    }

    #[test]
    fn test_degrade_checks_names_before_context() {
        let (ctx, cancel) = Context::background().with_cancel();
        cancel.cancel();

        let named = [NamedValue::named("id", 1, 7)];
        let err = degrade(Op::ConnExecContext, &ctx, &named).unwrap_err();
        assert!(matches!(err, Error::UnsupportedParameterKind { .. }));

        let positional = [NamedValue::positional(1, 7)];
        let err = degrade(Op::ConnExecContext, &ctx, &positional).unwrap_err();
        assert!(matches!(err, Error::Context(ContextError::Canceled)));
    }
}
