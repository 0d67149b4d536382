use std::fmt;
use std::sync::Arc;

use crate::capability::Capabilities;
use crate::context::Context;
use crate::driver::{Conn, Driver};
use crate::error::DriverResult;
use crate::logger::{Entry, Logger, Op};

use super::{TARGET, TeeConn};

/// A driver that instruments every connection it opens.
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use sqltee_core::{Context, TeeDriver};
///
/// let driver = TeeDriver::new(PgDriver::default(), Arc::new(logger));
/// let mut conn = driver.open("postgres://localhost/app")?;
/// conn.exec_context(&Context::background(), "DELETE FROM sessions", &[])?;
/// ```
pub struct TeeDriver {
    driver: Box<dyn Driver>,
    logger: Arc<dyn Logger>,
}

impl TeeDriver {
    /// Wrap `driver`, sending records to `logger`.
    pub fn new(driver: impl Driver + 'static, logger: Arc<dyn Logger>) -> Self {
        Self::from_boxed(Box::new(driver), logger)
    }

    /// Wrap an already boxed driver.
    pub fn from_boxed(driver: Box<dyn Driver>, logger: Arc<dyn Logger>) -> Self {
        Self { driver, logger }
    }

    /// The logger records are sent to.
    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    /// Open an instrumented connection. Logged as `driver-open`.
    pub fn open(&self, name: &str) -> DriverResult<TeeConn> {
        let timer = self.logger.timer();
        let outcome = self.driver.open(name).map(|mut conn| {
            tracing::debug!(
                target: TARGET,
                capabilities = %Capabilities::of_conn(conn.as_mut()),
                "connection opened"
            );
            TeeConn::new(conn, Arc::clone(&self.logger))
        });
        self.logger
            .log(&Entry::new(Op::DriverOpen, timer.stop()).error(outcome.as_ref().err()));
        outcome
    }

    /// Bind the driver to a data source name.
    pub fn open_connector(self: &Arc<Self>, name: impl Into<String>) -> Connector {
        Connector {
            driver: Arc::clone(self),
            name: name.into(),
        }
    }
}

impl Driver for TeeDriver {
    fn open(&self, name: &str) -> DriverResult<Box<dyn Conn>> {
        TeeDriver::open(self, name).map(|conn| Box::new(conn) as Box<dyn Conn>)
    }
}

impl fmt::Debug for TeeDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TeeDriver").finish_non_exhaustive()
    }
}

/// An instrumented driver paired with a fixed data source name.
#[derive(Clone)]
pub struct Connector {
    driver: Arc<TeeDriver>,
    name: String,
}

impl Connector {
    /// Open a connection to the bound data source.
    ///
    /// The context is not consulted.
    pub fn connect(&self, _ctx: &Context) -> DriverResult<TeeConn> {
        self.driver.open(&self.name)
    }

    /// The instrumented driver.
    pub fn driver(&self) -> &Arc<TeeDriver> {
        &self.driver
    }

    /// The bound data source name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
