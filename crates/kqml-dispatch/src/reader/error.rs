//! Error conditions a reader can raise.

use std::io;

use thiserror::Error;

/// Outcome of a failed read, as classified by the reader.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The input is exhausted.
    #[error("end of input")]
    EndOfStream,

    /// A blocked read was woken before a performative arrived.
    #[error("read interrupted")]
    Interrupted,

    /// The underlying resource failed.
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    /// The next unit could not be parsed as a performative.
    #[error("malformed performative: {message}")]
    Malformed {
        /// Description of the parse failure.
        message: String,
    },
}

impl ReadError {
    /// Builds a malformed-input error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Whether the error ends the stream without being a failure.
    ///
    /// Both exhaustion and an interrupted read count as end of stream.
    #[must_use]
    pub const fn is_stream_end(&self) -> bool {
        matches!(self, Self::EndOfStream | Self::Interrupted)
    }
}
