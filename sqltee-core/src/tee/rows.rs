use std::fmt;
use std::sync::Arc;

use sqltee_scan::Value;

use crate::context::Context;
use crate::driver::Rows;
use crate::error::DriverResult;
use crate::logger::{Entry, Logger, Op};

/// An instrumented row cursor. Only [`next`](Self::next) is logged.
pub struct TeeRows {
    rows: Box<dyn Rows>,
    context: Option<Context>,
    logger: Arc<dyn Logger>,
}

impl TeeRows {
    pub(crate) fn new(rows: Box<dyn Rows>, context: Option<Context>, logger: Arc<dyn Logger>) -> Self {
        Self {
            rows,
            context,
            logger,
        }
    }

    /// The context of the query that opened the cursor, if any.
    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    /// Column names.
    pub fn columns(&self) -> Vec<String> {
        self.rows.columns()
    }

    /// Close the cursor.
    pub fn close(self) -> DriverResult<()> {
        self.rows.close()
    }

    /// Read the next row into `dest`. Logged as `rows-next`, including the
    /// end-of-rows signal.
    pub fn next(&mut self, dest: &mut [Value]) -> DriverResult<()> {
        let timer = self.logger.timer();
        let outcome = self.rows.next(dest);
        self.logger.log(
            &Entry::new(Op::RowsNext, timer.stop())
                .dest(dest)
                .error(outcome.as_ref().err()),
        );
        outcome
    }
}

impl fmt::Debug for TeeRows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TeeRows")
            .field("columns", &self.rows.columns())
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl Rows for TeeRows {
    fn columns(&self) -> Vec<String> {
        TeeRows::columns(self)
    }

    fn close(self: Box<Self>) -> DriverResult<()> {
        TeeRows::close(*self)
    }

    fn next(&mut self, dest: &mut [Value]) -> DriverResult<()> {
        TeeRows::next(self, dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::mock::{MockDriver, MockLogger};
    use crate::tee::TeeDriver;

    #[test]
    fn test_next_logs_rows_and_end() {
        let backend = MockDriver::full().with_rows(
            &["id", "name"],
            vec![vec![Value::from(1), Value::from("ann")]],
        );
        let logger = Arc::new(MockLogger::new());
        let driver = TeeDriver::new(backend.clone(), logger.clone());
        let mut conn = driver.open("mock").unwrap();
        let mut rows = conn
            .query_context(&Context::background(), "SELECT id, name FROM users", &[])
            .unwrap();
        logger.clear();

        assert_eq!(rows.columns(), vec!["id", "name"]);
        assert!(rows.context().is_some());

        let mut dest = vec![Value::Null; 2];
        rows.next(&mut dest).unwrap();
        assert!(rows.next(&mut dest).unwrap_err().is_end_of_rows());
        rows.close().unwrap();

        let entries = logger.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0].dest,
            Some(vec![Value::from(1), Value::from("ann")])
        );
        assert_eq!(entries[1].error.as_deref(), Some("end of rows"));
    }
}
