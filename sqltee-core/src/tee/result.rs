use std::fmt;

use crate::context::Context;
use crate::driver::ExecResult;
use crate::error::DriverResult;

/// Result of an instrumented exec call. Accessors pass through unlogged.
pub struct TeeResult {
    result: Box<dyn ExecResult>,
    context: Option<Context>,
}

impl TeeResult {
    pub(crate) fn new(result: Box<dyn ExecResult>, context: Option<Context>) -> Self {
        Self { result, context }
    }

    /// The context of the call that produced this result, if any.
    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    /// Id generated by the last insert.
    pub fn last_insert_id(&self) -> DriverResult<i64> {
        self.result.last_insert_id()
    }

    /// Number of rows changed.
    pub fn rows_affected(&self) -> DriverResult<i64> {
        self.result.rows_affected()
    }
}

impl ExecResult for TeeResult {
    fn last_insert_id(&self) -> DriverResult<i64> {
        self.result.last_insert_id()
    }

    fn rows_affected(&self) -> DriverResult<i64> {
        self.result.rows_affected()
    }
}

impl fmt::Debug for TeeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TeeResult")
            .field("last_insert_id", &self.result.last_insert_id().ok())
            .field("rows_affected", &self.result.rows_affected().ok())
            .finish()
    }
}
