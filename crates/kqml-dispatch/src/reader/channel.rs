//! In-memory reader fed from other threads.
//!
//! Useful for agents that live in the same process as their peers and for
//! driving the dispatcher deterministically in tests. The reader blocks on a
//! condition variable until a performative is queued, the input is finished,
//! or the reader is interrupted.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use tracing::trace;

use super::{READER_TARGET, ReadError, ReadInterrupt, Reader};
use crate::message::Performative;

#[derive(Debug, Default)]
struct ChannelState {
    queue: VecDeque<Result<Performative, ReadError>>,
    finished: bool,
    interrupted: bool,
    closed: bool,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<ChannelState>,
    available: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ChannelState> {
        self.state
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    fn update(&self, action: impl FnOnce(&mut ChannelState)) {
        action(&mut self.lock());
        self.available.notify_all();
    }
}

/// Reader side of an in-memory performative queue.
#[derive(Debug)]
pub struct ChannelReader {
    shared: Arc<Shared>,
}

/// Writer side of an in-memory performative queue.
///
/// Senders are cheap to clone; every clone feeds the same reader.
#[derive(Debug, Clone)]
pub struct PerformativeSender {
    shared: Arc<Shared>,
}

impl ChannelReader {
    /// Opens an empty queue and returns both of its ends.
    #[must_use]
    pub fn open() -> (Self, PerformativeSender) {
        let shared = Arc::new(Shared::default());
        (
            Self {
                shared: Arc::clone(&shared),
            },
            PerformativeSender { shared },
        )
    }
}

impl Reader for ChannelReader {
    fn read_performative(&mut self) -> Result<Performative, ReadError> {
        let mut state = self.shared.lock();
        loop {
            if state.interrupted {
                return Err(ReadError::Interrupted);
            }
            if let Some(next) = state.queue.pop_front() {
                return next;
            }
            if state.finished || state.closed {
                return Err(ReadError::EndOfStream);
            }
            state = self
                .shared
                .available
                .wait(state)
                .unwrap_or_else(|poison| poison.into_inner());
        }
    }

    fn close(&mut self) -> Result<(), ReadError> {
        self.shared.update(|state| {
            state.closed = true;
            state.queue.clear();
        });
        trace!(target: READER_TARGET, "channel reader closed");
        Ok(())
    }

    fn interrupter(&self) -> Option<Arc<dyn ReadInterrupt>> {
        Some(Arc::new(ChannelInterrupt {
            shared: Arc::clone(&self.shared),
        }))
    }
}

struct ChannelInterrupt {
    shared: Arc<Shared>,
}

impl ReadInterrupt for ChannelInterrupt {
    fn interrupt(&self) {
        self.shared.update(|state| state.interrupted = true);
    }
}

impl PerformativeSender {
    /// Queues a performative for the reader.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::Transport`] with [`io::ErrorKind::BrokenPipe`] once
    /// the input has been finished or the reader closed.
    pub fn send(&self, performative: Performative) -> Result<(), ReadError> {
        self.push(Ok(performative))
    }

    /// Queues a unit the reader will report as malformed.
    ///
    /// # Errors
    ///
    /// Fails like [`PerformativeSender::send`].
    pub fn send_malformed(&self, message: impl Into<String>) -> Result<(), ReadError> {
        self.push(Err(ReadError::malformed(message)))
    }

    /// Queues a transport failure for the reader to report.
    ///
    /// # Errors
    ///
    /// Fails like [`PerformativeSender::send`].
    pub fn send_transport_error(&self, error: io::Error) -> Result<(), ReadError> {
        self.push(Err(ReadError::Transport(error)))
    }

    /// Marks the end of input; the reader drains the queue and then reports
    /// [`ReadError::EndOfStream`].
    pub fn finish(&self) {
        self.shared.update(|state| state.finished = true);
    }

    /// Whether the reader side has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }

    fn push(&self, item: Result<Performative, ReadError>) -> Result<(), ReadError> {
        let mut state = self.shared.lock();
        if state.closed || state.finished {
            return Err(ReadError::Transport(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "performative channel no longer accepts input",
            )));
        }
        state.queue.push_back(item);
        drop(state);
        self.shared.available.notify_all();
        trace!(target: READER_TARGET, "queued performative");
        Ok(())
    }
}
