//! Capability report for backend objects.

use std::fmt;

use bitflags::bitflags;

use crate::driver::{Conn, Stmt};

bitflags! {
    /// Optional extensions a backend object advertises through its `as_*` accessors.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        const NONE = 0;
        const BEGIN_TX = 1 << 0;
        const PREPARE_CONTEXT = 1 << 1;
        const EXEC = 1 << 2;
        const EXEC_CONTEXT = 1 << 3;
        const QUERY = 1 << 4;
        const QUERY_CONTEXT = 1 << 5;
        const PING = 1 << 6;
        const RESET_SESSION = 1 << 7;
        const STMT_EXEC_CONTEXT = 1 << 8;
        const STMT_QUERY_CONTEXT = 1 << 9;

        /// Every capability a connection can advertise.
        const CONN = Self::BEGIN_TX.bits()
            | Self::PREPARE_CONTEXT.bits()
            | Self::EXEC.bits()
            | Self::EXEC_CONTEXT.bits()
            | Self::QUERY.bits()
            | Self::QUERY_CONTEXT.bits()
            | Self::PING.bits()
            | Self::RESET_SESSION.bits();
        /// Every capability a statement can advertise.
        const STMT = Self::STMT_EXEC_CONTEXT.bits() | Self::STMT_QUERY_CONTEXT.bits();
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::empty()
    }
}

impl Capabilities {
    /// Capabilities of a connection. Only [`Capabilities::CONN`] flags are set.
    pub fn of_conn(conn: &mut dyn Conn) -> Self {
        let mut caps = Self::NONE;
        if conn.as_begin_tx().is_some() {
            caps |= Self::BEGIN_TX;
        }
        if conn.as_prepare_context().is_some() {
            caps |= Self::PREPARE_CONTEXT;
        }
        if conn.as_execer().is_some() {
            caps |= Self::EXEC;
        }
        if conn.as_execer_context().is_some() {
            caps |= Self::EXEC_CONTEXT;
        }
        if conn.as_queryer().is_some() {
            caps |= Self::QUERY;
        }
        if conn.as_queryer_context().is_some() {
            caps |= Self::QUERY_CONTEXT;
        }
        if conn.as_pinger().is_some() {
            caps |= Self::PING;
        }
        if conn.as_session_resetter().is_some() {
            caps |= Self::RESET_SESSION;
        }
        caps
    }

    /// Capabilities of a statement. Only [`Capabilities::STMT`] flags are set.
    pub fn of_stmt(stmt: &mut dyn Stmt) -> Self {
        let mut caps = Self::NONE;
        if stmt.as_exec_context().is_some() {
            caps |= Self::STMT_EXEC_CONTEXT;
        }
        if stmt.as_query_context().is_some() {
            caps |= Self::STMT_QUERY_CONTEXT;
        }
        caps
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let mut first = true;
        for (name, _) in self.iter_names() {
            if !first {
                f.write_str("|")?;
            }
            f.write_str(&name.to_ascii_lowercase())?;
            first = false;
        }
        Ok(())
    }
}
