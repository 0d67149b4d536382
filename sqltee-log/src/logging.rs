//! Subscriber setup for the `tracing` events sqltee emits.
//!
//! Installing a subscriber is optional: applications that already have one
//! receive [`TracingLogger`](crate::TracingLogger) records and the proxy's
//! diagnostics through it.
//!
//! # Environment Variables
//!
//! - `SQLTEE_DEBUG=true|1|yes` - Enable debug logging
//! - `SQLTEE_LOG_LEVEL=trace|debug|info|warn|error` - Set a specific level
//! - `SQLTEE_LOG_FORMAT=json|pretty|compact` - Output format (default: json)
//!
//! ```rust,no_run
//! use sqltee_log::logging;
//!
//! logging::init();
//! ```

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Check if debug logging is enabled via `SQLTEE_DEBUG`.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("SQLTEE_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// The level from `SQLTEE_LOG_LEVEL`.
///
/// Defaults to "debug" if `SQLTEE_DEBUG` is enabled, otherwise "info" so
/// that call records are visible once a subscriber is installed.
pub fn get_log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "info" };
    match env::var("SQLTEE_LOG_LEVEL") {
        Ok(level) => match level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

/// The output format from `SQLTEE_LOG_FORMAT`, "json" by default.
pub fn get_log_format() -> &'static str {
    env::var("SQLTEE_LOG_FORMAT")
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "compact" => "compact",
            _ => "json",
        })
        .unwrap_or("json")
}

/// Install a global subscriber for sqltee's targets.
///
/// Does nothing unless `SQLTEE_DEBUG` or `SQLTEE_LOG_LEVEL` is set, or when
/// built without the `tracing-subscriber` feature. Subsequent calls are
/// no-ops.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var("SQLTEE_LOG_LEVEL").is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = get_log_level();
            let filter = EnvFilter::try_new(format!(
                "sqltee={},sqltee_core={},sqltee_log={}",
                level, level, level
            ))
            .unwrap_or_else(|_| EnvFilter::new("info"));

            let installed = match get_log_format() {
                "json" => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().json())
                    .try_init(),
                "compact" => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().compact())
                    .try_init(),
                _ => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().pretty())
                    .try_init(),
            };

            if installed.is_ok() {
                tracing::info!(
                    level = level,
                    format = get_log_format(),
                    "sqltee logging initialized"
                );
            }
        }
    });
}

/// Initialize logging at a specific level.
///
/// # Safety
///
/// This function modifies environment variables, which is unsafe in
/// multi-threaded programs. Call it at startup before spawning threads.
pub fn init_with_level(level: &str) {
    // SAFETY: only called at program startup before threads are spawned.
    unsafe {
        env::set_var("SQLTEE_LOG_LEVEL", level);
    }
    init();
}

/// Initialize debug logging; equivalent to `SQLTEE_DEBUG=true` plus [`init`].
///
/// # Safety
///
/// Same constraints as [`init_with_level`].
pub fn init_debug() {
    // SAFETY: only called at program startup before threads are spawned.
    unsafe {
        env::set_var("SQLTEE_DEBUG", "true");
    }
    init();
}
