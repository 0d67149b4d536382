use std::fmt;
use std::sync::Arc;

use sqltee_scan::{NamedValue, Value};

use crate::capability::Capabilities;
use crate::context::Context;
use crate::driver::{ExecResult, Rows, Stmt, StmtExecContext, StmtQueryContext};
use crate::error::DriverResult;
use crate::logger::{Entry, Logger, Op};

use super::{TeeResult, TeeRows, degrade};

/// An instrumented prepared statement.
///
/// Keeps the query text it was prepared from so every execution can be
/// logged with it.
pub struct TeeStmt {
    stmt: Box<dyn Stmt>,
    query: String,
    context: Option<Context>,
    logger: Arc<dyn Logger>,
}

impl TeeStmt {
    pub(crate) fn new(
        stmt: Box<dyn Stmt>,
        query: &str,
        context: Option<Context>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            stmt,
            query: query.to_string(),
            context,
            logger,
        }
    }

    /// The query the statement was prepared from.
    pub fn query_text(&self) -> &str {
        &self.query
    }

    /// The context the statement was prepared under, if any.
    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    /// Capabilities of the backend statement.
    pub fn capabilities(&mut self) -> Capabilities {
        Capabilities::of_stmt(self.stmt.as_mut())
    }

    /// Close the statement. Logged as `stmt-close`.
    pub fn close(self) -> DriverResult<()> {
        let timer = self.logger.timer();
        let outcome = self.stmt.close();
        self.logger
            .log(&Entry::new(Op::StmtClose, timer.stop()).error(outcome.as_ref().err()));
        outcome
    }

    /// Number of placeholders, as reported by the backend.
    pub fn num_input(&self) -> Option<usize> {
        self.stmt.num_input()
    }

    /// Execute the statement. Logged as `stmt-exec`.
    pub fn exec(&mut self, args: &[Value]) -> DriverResult<TeeResult> {
        let timer = self.logger.timer();
        let outcome = self
            .stmt
            .exec(args)
            .map(|res| TeeResult::new(res, self.context.clone()));
        self.logger.log(
            &Entry::new(Op::StmtExec, timer.stop())
                .query(&self.query)
                .args(args)
                .result(outcome.as_ref().ok().map(|res| res as &dyn ExecResult))
                .error(outcome.as_ref().err()),
        );
        outcome
    }

    /// Execute the statement under a context. Logged as `stmt-exec-context`.
    pub fn exec_context(&mut self, ctx: &Context, args: &[NamedValue]) -> DriverResult<TeeResult> {
        let timer = self.logger.timer();
        let outcome = match self.stmt.as_exec_context() {
            Some(stmt) => stmt
                .exec_context(ctx, args)
                .map(|res| TeeResult::new(res, Some(ctx.clone()))),
            None => degrade(Op::StmtExecContext, ctx, args).and_then(|values| self.exec(&values)),
        };
        self.logger.log(
            &Entry::new(Op::StmtExecContext, timer.stop())
                .query(&self.query)
                .args(args)
                .result(outcome.as_ref().ok().map(|res| res as &dyn ExecResult))
                .context(ctx)
                .error(outcome.as_ref().err()),
        );
        outcome
    }

    /// Run the statement as a query. Logged as `stmt-query`.
    pub fn query(&mut self, args: &[Value]) -> DriverResult<TeeRows> {
        let timer = self.logger.timer();
        let outcome = self
            .stmt
            .query(args)
            .map(|rows| TeeRows::new(rows, self.context.clone(), Arc::clone(&self.logger)));
        self.logger.log(
            &Entry::new(Op::StmtQuery, timer.stop())
                .query(&self.query)
                .args(args)
                .error(outcome.as_ref().err()),
        );
        outcome
    }

    /// Run the statement as a query under a context. Logged as `stmt-query-context`.
    pub fn query_context(&mut self, ctx: &Context, args: &[NamedValue]) -> DriverResult<TeeRows> {
        let timer = self.logger.timer();
        let outcome = match self.stmt.as_query_context() {
            Some(stmt) => stmt
                .query_context(ctx, args)
                .map(|rows| TeeRows::new(rows, Some(ctx.clone()), Arc::clone(&self.logger))),
            None => degrade(Op::StmtQueryContext, ctx, args).and_then(|values| self.query(&values)),
        };
        self.logger.log(
            &Entry::new(Op::StmtQueryContext, timer.stop())
                .query(&self.query)
                .args(args)
                .context(ctx)
                .error(outcome.as_ref().err()),
        );
        outcome
    }
}

impl fmt::Debug for TeeStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TeeStmt")
            .field("query", &self.query)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl Stmt for TeeStmt {
    fn close(self: Box<Self>) -> DriverResult<()> {
        TeeStmt::close(*self)
    }

    fn num_input(&self) -> Option<usize> {
        TeeStmt::num_input(self)
    }

    fn exec(&mut self, args: &[Value]) -> DriverResult<Box<dyn ExecResult>> {
        TeeStmt::exec(self, args).map(|res| Box::new(res) as Box<dyn ExecResult>)
    }

    fn query(&mut self, args: &[Value]) -> DriverResult<Box<dyn Rows>> {
        TeeStmt::query(self, args).map(|rows| Box::new(rows) as Box<dyn Rows>)
    }

    fn as_exec_context(&mut self) -> Option<&mut dyn StmtExecContext> {
        Some(self)
    }

    fn as_query_context(&mut self) -> Option<&mut dyn StmtQueryContext> {
        Some(self)
    }
}

impl StmtExecContext for TeeStmt {
    fn exec_context(
        &mut self,
        ctx: &Context,
        args: &[NamedValue],
    ) -> DriverResult<Box<dyn ExecResult>> {
        TeeStmt::exec_context(self, ctx, args).map(|res| Box::new(res) as Box<dyn ExecResult>)
    }
}

impl StmtQueryContext for TeeStmt {
    fn query_context(&mut self, ctx: &Context, args: &[NamedValue]) -> DriverResult<Box<dyn Rows>> {
        TeeStmt::query_context(self, ctx, args).map(|rows| Box::new(rows) as Box<dyn Rows>)
    }
}
