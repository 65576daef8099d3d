//! Shared configuration for KQML dispatch engines.
//!
//! The dispatcher itself performs no configuration discovery: embedders build
//! a [`DispatcherConfig`] however they like (deserialising it from their own
//! configuration files, or starting from [`DispatcherConfig::default`]) and
//! hand it to the engine. The types here only describe the knobs and their
//! defaults.

mod defaults;
mod logging;
mod policy;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_SHUTDOWN_TIMEOUT_MS, default_duplicate_reply_policy,
    default_log_filter_string, default_log_format, default_malformed_policy,
    default_shutdown_timeout_ms,
};
pub use logging::{LogFormat, LogFormatParseError, LoggingConfig};
pub use policy::{DuplicateReplyPolicy, MalformedPolicy};

/// Tunables for a single dispatch engine.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct DispatcherConfig {
    /// How long `shutdown` waits for the listener thread, in milliseconds.
    pub shutdown_timeout_ms: u64,
    /// Handling of units the reader could not parse.
    pub malformed_policy: MalformedPolicy,
    /// Handling of a reply id registered twice.
    pub duplicate_reply_policy: DuplicateReplyPolicy,
    /// Logging settings used by the telemetry initialiser.
    pub logging: LoggingConfig,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
            malformed_policy: default_malformed_policy(),
            duplicate_reply_policy: default_duplicate_reply_policy(),
            logging: LoggingConfig::default(),
        }
    }
}

impl DispatcherConfig {
    /// Returns the shutdown budget as a [`Duration`].
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    /// Sets the shutdown budget.
    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Sets the malformed-input policy.
    #[must_use]
    pub fn with_malformed_policy(mut self, policy: MalformedPolicy) -> Self {
        self.malformed_policy = policy;
        self
    }

    /// Sets the duplicate reply registration policy.
    #[must_use]
    pub fn with_duplicate_reply_policy(mut self, policy: DuplicateReplyPolicy) -> Self {
        self.duplicate_reply_policy = policy;
        self
    }

    /// Checks that the configuration can drive an engine.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroShutdownTimeout`] when the shutdown budget is
    /// zero and [`ConfigError::EmptyLogFilter`] when the log filter is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shutdown_timeout_ms == 0 {
            return Err(ConfigError::ZeroShutdownTimeout);
        }
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::EmptyLogFilter);
        }
        Ok(())
    }
}

/// Errors raised when a configuration cannot be used.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `shutdown` would never wait for the listener.
    #[error("shutdown timeout must be greater than zero")]
    ZeroShutdownTimeout,
    /// The log filter expression is blank.
    #[error("log filter must not be empty")]
    EmptyLogFilter,
}
