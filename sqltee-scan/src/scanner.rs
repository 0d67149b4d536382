//! Scanning bound parameters into placeholder/literal pairs.
//!
//! A [`Scanner`] walks the parameters of one call and yields a [`Param`] for
//! each: the placeholder the parameter names (if any), its ordinal and its
//! SQL literal. Interpolation substitutes these into the query text.
//!
//! Ordinal placeholders are prefixes of one another (`$1` is a prefix of
//! `$10`), so interpolation scans in reverse: the highest ordinal is
//! substituted first and `$1` can no longer match inside `$10`.
//!
//! ```rust
//! use sqltee_scan::{Args, Scanner, Value};
//!
//! let values = [Value::from(1), Value::from("a")];
//! let mut scanner = Scanner::new(Args::Values(&values)).reversed();
//!
//! let first = scanner.next().unwrap().unwrap();
//! assert_eq!(first.ordinal, 2);
//! assert_eq!(first.literal, "'a'");
//! ```

use crate::error::ScanError;
use crate::literal::literal;
use crate::value::{Args, Value};

/// One scanned parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param<'a> {
    /// Parameter name, for parameters bound by name.
    pub name: Option<&'a str>,
    /// 1-based position of the parameter.
    pub ordinal: usize,
    /// SQL literal of the bound value.
    pub literal: String,
}

impl Param<'_> {
    /// The placeholder this parameter answers to under ordinal style:
    /// `:name` for named parameters, `$N` otherwise.
    pub fn placeholder(&self) -> String {
        match self.name {
            Some(name) => format!(":{}", name),
            None => format!("${}", self.ordinal),
        }
    }
}

/// A restartable iterator over the parameters of one call.
///
/// Yields `Err` once if a value has no literal form, then stops.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    args: Args<'a>,
    reverse: bool,
    consumed: usize,
    failed: bool,
}

impl<'a> Scanner<'a> {
    /// Create a scanner in ordinal order.
    pub fn new(args: Args<'a>) -> Self {
        Self {
            args,
            reverse: false,
            consumed: 0,
            failed: false,
        }
    }

    /// Scan from the highest ordinal down.
    pub fn reversed(mut self) -> Self {
        self.reverse = true;
        self
    }

    /// Set the scan direction.
    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Whether the scan runs from the highest ordinal down.
    pub fn is_reversed(&self) -> bool {
        self.reverse
    }

    /// Restart the scan over the same parameters.
    pub fn reset(&mut self) {
        self.consumed = 0;
        self.failed = false;
    }

    /// Number of parameters not yet scanned.
    pub fn remaining(&self) -> usize {
        if self.failed {
            0
        } else {
            self.args.len() - self.consumed
        }
    }

    fn param_at(&self, index: usize) -> (Option<&'a str>, usize, &'a Value) {
        match self.args {
            Args::None => unreachable!("empty args have no parameter at {}", index),
            Args::Values(values) => (None, index + 1, &values[index]),
            Args::Named(named) => {
                let nv = &named[index];
                (nv.name(), nv.ordinal, &nv.value)
            }
        }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Param<'a>, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining() == 0 {
            return None;
        }

        let index = if self.reverse {
            self.args.len() - 1 - self.consumed
        } else {
            self.consumed
        };
        self.consumed += 1;

        let (name, ordinal, value) = self.param_at(index);
        match literal(value) {
            Ok(literal) => Some(Ok(Param {
                name,
                ordinal,
                literal,
            })),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining()))
    }
}
