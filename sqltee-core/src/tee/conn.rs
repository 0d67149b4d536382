use std::fmt;
use std::sync::Arc;

use sqltee_scan::{NamedValue, Value};

use crate::capability::Capabilities;
use crate::context::Context;
use crate::driver::{
    Conn, ConnBeginTx, ConnPrepareContext, ExecResult, Execer, ExecerContext, Pinger, Queryer,
    QueryerContext, Rows, SessionResetter, Stmt, Tx, TxOptions,
};
use crate::error::{DriverResult, Error};
use crate::logger::{Entry, Logger, Op};

use super::{TeeResult, TeeRows, TeeStmt, TeeTx, degrade};

/// An instrumented connection.
pub struct TeeConn {
    conn: Box<dyn Conn>,
    logger: Arc<dyn Logger>,
}

impl TeeConn {
    pub(crate) fn new(conn: Box<dyn Conn>, logger: Arc<dyn Logger>) -> Self {
        Self { conn, logger }
    }

    /// Capabilities of the backend connection.
    pub fn capabilities(&mut self) -> Capabilities {
        Capabilities::of_conn(self.conn.as_mut())
    }

    /// Prepare a statement. Logged as `conn-prepare`.
    pub fn prepare(&mut self, query: &str) -> DriverResult<TeeStmt> {
        let timer = self.logger.timer();
        let outcome = self
            .conn
            .prepare(query)
            .map(|stmt| TeeStmt::new(stmt, query, None, Arc::clone(&self.logger)));
        self.logger.log(
            &Entry::new(Op::ConnPrepare, timer.stop())
                .query(query)
                .error(outcome.as_ref().err()),
        );
        outcome
    }

    /// Prepare a statement under a context. Logged as `conn-prepare-context`.
    ///
    /// Falls back to [`prepare`](Self::prepare), which logs its own record.
    pub fn prepare_context(&mut self, ctx: &Context, query: &str) -> DriverResult<TeeStmt> {
        let timer = self.logger.timer();
        let outcome = match self.conn.as_prepare_context() {
            Some(conn) => conn.prepare_context(ctx, query).map(|stmt| {
                TeeStmt::new(stmt, query, Some(ctx.clone()), Arc::clone(&self.logger))
            }),
            None => self.prepare(query),
        };
        self.logger.log(
            &Entry::new(Op::ConnPrepareContext, timer.stop())
                .query(query)
                .context(ctx)
                .error(outcome.as_ref().err()),
        );
        outcome
    }

    /// Close the connection. Logged as `conn-close`.
    pub fn close(self) -> DriverResult<()> {
        let timer = self.logger.timer();
        let outcome = self.conn.close();
        self.logger
            .log(&Entry::new(Op::ConnClose, timer.stop()).error(outcome.as_ref().err()));
        outcome
    }

    /// Begin a transaction. Logged as `conn-begin`.
    pub fn begin(&mut self) -> DriverResult<TeeTx> {
        let timer = self.logger.timer();
        let outcome = self
            .conn
            .begin()
            .map(|tx| TeeTx::new(tx, None, Arc::clone(&self.logger)));
        self.logger
            .log(&Entry::new(Op::ConnBegin, timer.stop()).error(outcome.as_ref().err()));
        outcome
    }

    /// Begin a transaction with options. Logged as `conn-begin-tx`.
    ///
    /// A backend without option support gets a plain `begin`; the options are
    /// still logged.
    pub fn begin_tx(&mut self, ctx: &Context, opts: &TxOptions) -> DriverResult<TeeTx> {
        let timer = self.logger.timer();
        let tx = match self.conn.as_begin_tx() {
            Some(conn) => conn.begin_tx(ctx, opts),
            None => {
                tracing::trace!(
                    target: super::TARGET,
                    op = %Op::ConnBeginTx,
                    "backend lacks capability, degrading"
                );
                self.conn.begin()
            }
        };
        let outcome = tx.map(|tx| TeeTx::new(tx, Some(ctx.clone()), Arc::clone(&self.logger)));
        self.logger.log(
            &Entry::new(Op::ConnBeginTx, timer.stop())
                .tx_options(opts)
                .context(ctx)
                .error(outcome.as_ref().err()),
        );
        outcome
    }

    /// Execute without preparing. Logged as `conn-exec`.
    ///
    /// Returns [`Error::Skip`] when the backend has no direct exec path.
    pub fn exec(&mut self, query: &str, args: &[Value]) -> DriverResult<TeeResult> {
        let timer = self.logger.timer();
        let outcome = match self.conn.as_execer() {
            Some(execer) => execer
                .exec(query, args)
                .map(|res| TeeResult::new(res, None)),
            None => Err(Error::Skip),
        };
        self.logger.log(
            &Entry::new(Op::ConnExec, timer.stop())
                .query(query)
                .args(args)
                .result(outcome.as_ref().ok().map(|res| res as &dyn ExecResult))
                .error(outcome.as_ref().err()),
        );
        outcome
    }

    /// Execute under a context without preparing. Logged as `conn-exec-context`.
    pub fn exec_context(
        &mut self,
        ctx: &Context,
        query: &str,
        args: &[NamedValue],
    ) -> DriverResult<TeeResult> {
        let timer = self.logger.timer();
        let outcome = match self.conn.as_execer_context() {
            Some(execer) => execer
                .exec_context(ctx, query, args)
                .map(|res| TeeResult::new(res, Some(ctx.clone()))),
            None => degrade(Op::ConnExecContext, ctx, args)
                .and_then(|values| self.exec(query, &values)),
        };
        self.logger.log(
            &Entry::new(Op::ConnExecContext, timer.stop())
                .query(query)
                .args(args)
                .result(outcome.as_ref().ok().map(|res| res as &dyn ExecResult))
                .context(ctx)
                .error(outcome.as_ref().err()),
        );
        outcome
    }

    /// Check the connection. Logged as `conn-ping`.
    ///
    /// A backend that cannot ping is assumed alive.
    pub fn ping(&mut self, ctx: &Context) -> DriverResult<()> {
        let timer = self.logger.timer();
        let outcome = match self.conn.as_pinger() {
            Some(pinger) => pinger.ping(ctx),
            None => Ok(()),
        };
        self.logger.log(
            &Entry::new(Op::ConnPing, timer.stop())
                .context(ctx)
                .error(outcome.as_ref().err()),
        );
        outcome
    }

    /// Query without preparing. Logged as `conn-query`.
    ///
    /// Returns [`Error::Skip`] when the backend has no direct query path.
    pub fn query(&mut self, query: &str, args: &[Value]) -> DriverResult<TeeRows> {
        let timer = self.logger.timer();
        let outcome = match self.conn.as_queryer() {
            Some(queryer) => queryer
                .query(query, args)
                .map(|rows| TeeRows::new(rows, None, Arc::clone(&self.logger))),
            None => Err(Error::Skip),
        };
        self.logger.log(
            &Entry::new(Op::ConnQuery, timer.stop())
                .query(query)
                .args(args)
                .error(outcome.as_ref().err()),
        );
        outcome
    }

    /// Query under a context without preparing. Logged as `conn-query-context`.
    pub fn query_context(
        &mut self,
        ctx: &Context,
        query: &str,
        args: &[NamedValue],
    ) -> DriverResult<TeeRows> {
        let timer = self.logger.timer();
        let outcome = match self.conn.as_queryer_context() {
            Some(queryer) => queryer
                .query_context(ctx, query, args)
                .map(|rows| TeeRows::new(rows, Some(ctx.clone()), Arc::clone(&self.logger))),
            None => degrade(Op::ConnQueryContext, ctx, args)
                .and_then(|values| self.query(query, &values)),
        };
        self.logger.log(
            &Entry::new(Op::ConnQueryContext, timer.stop())
                .query(query)
                .args(args)
                .context(ctx)
                .error(outcome.as_ref().err()),
        );
        outcome
    }

    /// Reset session state. Not logged.
    ///
    /// Returns [`Error::Skip`] when the backend cannot reset sessions.
    pub fn reset_session(&mut self, ctx: &Context) -> DriverResult<()> {
        match self.conn.as_session_resetter() {
            Some(resetter) => resetter.reset_session(ctx),
            None => Err(Error::Skip),
        }
    }
}

impl fmt::Debug for TeeConn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TeeConn").finish_non_exhaustive()
    }
}

impl Conn for TeeConn {
    fn prepare(&mut self, query: &str) -> DriverResult<Box<dyn Stmt>> {
        TeeConn::prepare(self, query).map(|stmt| Box::new(stmt) as Box<dyn Stmt>)
    }

    fn close(self: Box<Self>) -> DriverResult<()> {
        TeeConn::close(*self)
    }

    fn begin(&mut self) -> DriverResult<Box<dyn Tx>> {
        TeeConn::begin(self).map(|tx| Box::new(tx) as Box<dyn Tx>)
    }

    fn as_begin_tx(&mut self) -> Option<&mut dyn ConnBeginTx> {
        Some(self)
    }

    fn as_prepare_context(&mut self) -> Option<&mut dyn ConnPrepareContext> {
        Some(self)
    }

    fn as_execer(&mut self) -> Option<&mut dyn Execer> {
        Some(self)
    }

    fn as_execer_context(&mut self) -> Option<&mut dyn ExecerContext> {
        Some(self)
    }

    fn as_queryer(&mut self) -> Option<&mut dyn Queryer> {
        Some(self)
    }

    fn as_queryer_context(&mut self) -> Option<&mut dyn QueryerContext> {
        Some(self)
    }

    fn as_pinger(&mut self) -> Option<&mut dyn Pinger> {
        Some(self)
    }

    fn as_session_resetter(&mut self) -> Option<&mut dyn SessionResetter> {
        Some(self)
    }
}

impl ConnBeginTx for TeeConn {
    fn begin_tx(&mut self, ctx: &Context, opts: &TxOptions) -> DriverResult<Box<dyn Tx>> {
        TeeConn::begin_tx(self, ctx, opts).map(|tx| Box::new(tx) as Box<dyn Tx>)
    }
}

impl ConnPrepareContext for TeeConn {
    fn prepare_context(&mut self, ctx: &Context, query: &str) -> DriverResult<Box<dyn Stmt>> {
        TeeConn::prepare_context(self, ctx, query).map(|stmt| Box::new(stmt) as Box<dyn Stmt>)
    }
}

impl Execer for TeeConn {
    fn exec(&mut self, query: &str, args: &[Value]) -> DriverResult<Box<dyn ExecResult>> {
        TeeConn::exec(self, query, args).map(|res| Box::new(res) as Box<dyn ExecResult>)
    }
}

impl ExecerContext for TeeConn {
    fn exec_context(
        &mut self,
        ctx: &Context,
        query: &str,
        args: &[NamedValue],
    ) -> DriverResult<Box<dyn ExecResult>> {
        TeeConn::exec_context(self, ctx, query, args)
            .map(|res| Box::new(res) as Box<dyn ExecResult>)
    }
}

impl Queryer for TeeConn {
    fn query(&mut self, query: &str, args: &[Value]) -> DriverResult<Box<dyn Rows>> {
        TeeConn::query(self, query, args).map(|rows| Box::new(rows) as Box<dyn Rows>)
    }
}

impl QueryerContext for TeeConn {
    fn query_context(
        &mut self,
        ctx: &Context,
        query: &str,
        args: &[NamedValue],
    ) -> DriverResult<Box<dyn Rows>> {
        TeeConn::query_context(self, ctx, query, args).map(|rows| Box::new(rows) as Box<dyn Rows>)
    }
}

impl Pinger for TeeConn {
    fn ping(&mut self, ctx: &Context) -> DriverResult<()> {
        TeeConn::ping(self, ctx)
    }
}

impl SessionResetter for TeeConn {
    fn reset_session(&mut self, ctx: &Context) -> DriverResult<()> {
        TeeConn::reset_session(self, ctx)
    }
}
