//! # sqltee-scan
//!
//! Bound parameter values and their rendering as SQL literals.
//!
//! This crate provides:
//! - [`Value`] and [`NamedValue`], the values bound to query parameters
//! - [`literal`], rendering a single value as PostgreSQL literal text
//! - [`Scanner`], pairing every bound parameter with its placeholder and literal
//!
//! ## Example
//!
//! ```rust
//! use sqltee_scan::{Args, NamedValue, Scanner};
//!
//! let named = [NamedValue::named("id", 1, 42), NamedValue::positional(2, "foo")];
//!
//! let pairs: Vec<_> = Scanner::new(Args::Named(&named))
//!     .map(|p| p.map(|p| (p.placeholder(), p.literal)))
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//!
//! assert_eq!(pairs[0], (":id".to_string(), "42".to_string()));
//! assert_eq!(pairs[1], ("$2".to_string(), "'foo'".to_string()));
//! ```

pub mod error;
pub mod literal;
pub mod scanner;
pub mod value;

pub use error::{ScanError, ScanResult};
pub use literal::{literal, push_literal};
pub use scanner::{Param, Scanner};
pub use value::{Args, NamedValue, Value, ValueKind};
