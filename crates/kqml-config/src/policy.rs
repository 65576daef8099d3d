//! Policies governing how the dispatcher treats questionable input.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// What the read loop does with a unit the reader failed to parse.
///
/// Every variant keeps the loop running; they differ only in how loudly the
/// failure is surfaced.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum MalformedPolicy {
    /// Drop the unit with a `debug` event only.
    Discard,
    /// Drop the unit and emit a `warn` event.
    #[default]
    Log,
    /// Forward the parse failure to the receiver's exception handler.
    Report,
}

/// What happens when a reply id is registered while an earlier registration
/// for the same id is still pending.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DuplicateReplyPolicy {
    /// Replace the pending continuation and emit a `warn` event.
    #[default]
    Overwrite,
    /// Keep the pending continuation and report an error to the caller.
    Reject,
}
