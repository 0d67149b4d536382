//! Error types for literal rendering and parameter scanning.

use thiserror::Error;

use crate::value::ValueKind;

/// Result type for scanning operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors that can occur while rendering bound parameters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// The value has no SQL literal representation.
    #[error("unsupported type: {kind}")]
    UnsupportedType {
        /// Kind of the offending value.
        kind: ValueKind,
    },
}

impl ScanError {
    /// Create an unsupported type error.
    pub fn unsupported(kind: ValueKind) -> Self {
        Self::UnsupportedType { kind }
    }
}
