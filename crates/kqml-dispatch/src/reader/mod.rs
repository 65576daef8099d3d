//! Sources of parsed performatives.
//!
//! A [`Reader`] is owned by the dispatcher once the engine is constructed.
//! Only the listener thread reads from it and only
//! [`Dispatcher::shutdown`](crate::Dispatcher::shutdown) closes it, after the
//! listener has stopped. Readers that can wake a blocked read from another
//! thread expose a [`ReadInterrupt`] so shutdown does not have to wait for the
//! next performative to arrive.

mod channel;
mod error;

use std::sync::Arc;

pub use channel::{ChannelReader, PerformativeSender};
pub use error::ReadError;

use crate::message::Performative;

/// Log target for reader operations.
pub(crate) const READER_TARGET: &str = "kqml_dispatch::reader";

/// Blocking source of parsed performatives.
pub trait Reader: Send + 'static {
    /// Blocks until the next performative is available.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::EndOfStream`] or [`ReadError::Interrupted`] when
    /// the stream ends, [`ReadError::Transport`] when the resource fails, and
    /// [`ReadError::Malformed`] when the next unit cannot be parsed.
    fn read_performative(&mut self) -> Result<Performative, ReadError>;

    /// Releases the underlying resource.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::Transport`] when the resource fails to close.
    fn close(&mut self) -> Result<(), ReadError>;

    /// Returns a handle able to wake a blocked [`Reader::read_performative`]
    /// from another thread.
    ///
    /// Readers over resources that cannot be interrupted return `None`; the
    /// dispatcher then relies on its bounded shutdown wait.
    fn interrupter(&self) -> Option<Arc<dyn ReadInterrupt>> {
        None
    }
}

/// Wakes a reader blocked in [`Reader::read_performative`].
///
/// After `interrupt` the blocked read, and every later one, returns
/// [`ReadError::Interrupted`].
pub trait ReadInterrupt: Send + Sync {
    /// Wakes the reader.
    fn interrupt(&self);
}
