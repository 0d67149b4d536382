//! Error types for instrumented driver calls.
//!
//! Errors returned by a backend pass through the proxy unchanged. The proxy
//! only produces errors of its own when it has to degrade a call:
//!
//! - [`Error::Skip`] when the backend lacks a capability and there is no fallback
//! - [`Error::UnsupportedParameterKind`] when named parameters would reach a
//!   backend that only accepts positional values
//! - [`Error::Context`] when the call's context was already done

use thiserror::Error;

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, Error>;

/// Errors returned by driver operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Error reported by the backend driver.
    #[error(transparent)]
    Backend(Box<dyn std::error::Error + Send + Sync>),

    /// The backend does not implement the requested operation.
    #[error("driver: skip fast-path; continue as if unimplemented")]
    Skip,

    /// Named parameters cannot be passed to a backend without named parameter support.
    #[error("driver does not support the use of named parameters (got :{name})")]
    UnsupportedParameterKind {
        /// Name of the first named parameter.
        name: String,
    },

    /// The call's context was canceled or its deadline passed.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// The row iterator is exhausted.
    #[error("end of rows")]
    EndOfRows,
}

/// Reasons a [`Context`](crate::Context) is done.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextError {
    /// The context was canceled.
    #[error("context canceled")]
    Canceled,

    /// The context's deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

impl Error {
    /// Wrap an error reported by a backend.
    pub fn backend(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Backend(err.into())
    }

    /// Create an unsupported parameter kind error.
    pub fn unsupported_parameter(name: impl Into<String>) -> Self {
        Self::UnsupportedParameterKind { name: name.into() }
    }

    /// Check if this is the backend's "not implemented" signal.
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip)
    }

    /// Check if this marks the end of a row iterator.
    pub fn is_end_of_rows(&self) -> bool {
        matches!(self, Self::EndOfRows)
    }

    /// Check if this came from the call's context.
    pub fn is_context(&self) -> bool {
        matches!(self, Self::Context(_))
    }

    /// Check if this is a control signal rather than a failure.
    pub fn is_signal(&self) -> bool {
        self.is_skip() || self.is_end_of_rows()
    }
}
