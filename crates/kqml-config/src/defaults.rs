use crate::logging::LogFormat;
use crate::policy::{DuplicateReplyPolicy, MalformedPolicy};

/// Default time `shutdown` waits for the listener thread, in milliseconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 5_000;

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default shutdown budget in milliseconds.
#[must_use]
pub const fn default_shutdown_timeout_ms() -> u64 {
    DEFAULT_SHUTDOWN_TIMEOUT_MS
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default handling of malformed input.
#[must_use]
pub fn default_malformed_policy() -> MalformedPolicy {
    MalformedPolicy::Log
}

/// Default handling of duplicate reply registrations.
#[must_use]
pub fn default_duplicate_reply_policy() -> DuplicateReplyPolicy {
    DuplicateReplyPolicy::Overwrite
}
