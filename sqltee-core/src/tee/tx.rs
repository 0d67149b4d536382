use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::driver::Tx;
use crate::error::DriverResult;
use crate::logger::{Entry, Logger, Op};

/// An instrumented transaction.
pub struct TeeTx {
    tx: Box<dyn Tx>,
    context: Option<Context>,
    logger: Arc<dyn Logger>,
}

impl TeeTx {
    pub(crate) fn new(tx: Box<dyn Tx>, context: Option<Context>, logger: Arc<dyn Logger>) -> Self {
        Self {
            tx,
            context,
            logger,
        }
    }

    /// The context the transaction was begun under, if any.
    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    /// Commit. Logged as `tx-commit`.
    pub fn commit(self) -> DriverResult<()> {
        let timer = self.logger.timer();
        let outcome = self.tx.commit();
        self.logger
            .log(&Entry::new(Op::TxCommit, timer.stop()).error(outcome.as_ref().err()));
        outcome
    }

    /// Roll back. Logged as `tx-rollback`.
    pub fn rollback(self) -> DriverResult<()> {
        let timer = self.logger.timer();
        let outcome = self.tx.rollback();
        self.logger
            .log(&Entry::new(Op::TxRollback, timer.stop()).error(outcome.as_ref().err()));
        outcome
    }
}

impl fmt::Debug for TeeTx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TeeTx")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl Tx for TeeTx {
    fn commit(self: Box<Self>) -> DriverResult<()> {
        TeeTx::commit(*self)
    }

    fn rollback(self: Box<Self>) -> DriverResult<()> {
        TeeTx::rollback(*self)
    }
}
