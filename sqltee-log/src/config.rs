//! Logger configuration, usually loaded from `sqltee.toml`.
//!
//! ```toml
//! topic = "billing-db"
//! placeholder = "?"
//! max_query_length = 2000
//! log_ping = false
//! ```
//!
//! Every key is optional. Without `placeholder` the ordinal style is used:
//! `$1`, `$2`, ... and `:name` for named parameters.

use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sqltee_core::Op;

use crate::error::{ConfigError, ConfigResult};
use crate::interpolate::Placeholder;

/// Configuration shared by the reference loggers.
///
/// Fixed for the lifetime of a logger.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TeeConfig {
    /// Label prefixed to every record.
    #[serde(default = "default_topic")]
    pub topic: String,

    /// Explicit placeholder marker, e.g. `?`. Absent for the ordinal style.
    #[serde(default)]
    pub placeholder: Option<String>,

    /// Maximum length of logged query text (0 = unlimited).
    #[serde(default)]
    pub max_query_length: usize,

    /// Whether `conn-ping` calls are logged.
    #[serde(default = "default_log_ping")]
    pub log_ping: bool,
}

fn default_topic() -> String {
    "sqltee".to_string()
}

fn default_log_ping() -> bool {
    true
}

impl Default for TeeConfig {
    fn default() -> Self {
        Self {
            topic: default_topic(),
            placeholder: None,
            max_query_length: 0,
            log_ping: default_log_ping(),
        }
    }
}

impl TeeConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> ConfigResult<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::Toml { source: e })?;
        config.validate()
    }

    /// Default configuration overridden by `SQLTEE_*` environment variables.
    ///
    /// - `SQLTEE_TOPIC`
    /// - `SQLTEE_PLACEHOLDER`
    /// - `SQLTEE_MAX_QUERY_LENGTH`
    /// - `SQLTEE_LOG_PING`
    pub fn from_env() -> ConfigResult<Self> {
        Self::default().merge_env()
    }

    /// Apply `SQLTEE_*` environment overrides on top of this configuration.
    pub fn merge_env(mut self) -> ConfigResult<Self> {
        if let Ok(topic) = env::var("SQLTEE_TOPIC") {
            self.topic = topic;
        }
        if let Ok(placeholder) = env::var("SQLTEE_PLACEHOLDER") {
            self.placeholder = Some(placeholder);
        }
        if let Ok(value) = env::var("SQLTEE_MAX_QUERY_LENGTH") {
            self.max_query_length = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: "SQLTEE_MAX_QUERY_LENGTH",
                value: value.clone(),
            })?;
        }
        if let Ok(value) = env::var("SQLTEE_LOG_PING") {
            self.log_ping = match value.to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        var: "SQLTEE_LOG_PING",
                        value,
                    });
                }
            };
        }
        self.validate()
    }

    /// Set the topic.
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Use an explicit placeholder marker. An empty marker keeps the ordinal style.
    pub fn with_placeholder(mut self, marker: impl Into<String>) -> Self {
        let marker = marker.into();
        self.placeholder = (!marker.is_empty()).then_some(marker);
        self
    }

    /// Set the maximum logged query length.
    pub fn with_max_query_length(mut self, max: usize) -> Self {
        self.max_query_length = max;
        self
    }

    /// Enable or disable ping logging.
    pub fn with_log_ping(mut self, enabled: bool) -> Self {
        self.log_ping = enabled;
        self
    }

    /// The placeholder style to interpolate with.
    pub fn placeholder(&self) -> Placeholder<'_> {
        match self.placeholder.as_deref() {
            Some(marker) => Placeholder::Marker(marker),
            None => Placeholder::Ordinal,
        }
    }

    /// Whether records for `op` are emitted.
    pub fn logs(&self, op: Op) -> bool {
        op != Op::ConnPing || self.log_ping
    }

    /// Check the configuration for values no logger can work with.
    pub fn validate(self) -> ConfigResult<Self> {
        if self.placeholder.as_deref() == Some("") {
            return Err(ConfigError::EmptyPlaceholder);
        }
        Ok(self)
    }
}
