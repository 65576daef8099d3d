//! Lifecycle state shared between the dispatcher handle and its listener.

use std::fmt;
use std::io;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

use thiserror::Error;

/// Observable lifecycle of a dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Constructed; no listener thread exists yet.
    NotStarted,
    /// The listener thread is reading.
    Running,
    /// Shutdown was requested and the listener has not exited yet.
    ShutdownRequested,
    /// The listener has exited, or was never started and shutdown ran.
    Stopped,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotStarted => "not started",
            Self::Running => "running",
            Self::ShutdownRequested => "shutdown requested",
            Self::Stopped => "stopped",
        };
        formatter.write_str(label)
    }
}

/// Errors raised synchronously by `start` and `shutdown`.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// `start` was called while a listener is active.
    #[error("dispatcher '{name}' is already running")]
    AlreadyRunning {
        /// Dispatcher name.
        name: String,
    },

    /// `start` was called after the dispatcher stopped or began stopping.
    #[error("dispatcher '{name}' has already been stopped")]
    AlreadyStopped {
        /// Dispatcher name.
        name: String,
    },

    /// The listener did not stop within the shutdown budget.
    #[error("dispatcher '{name}' did not stop within {timeout:?}")]
    ShutdownTimeout {
        /// Dispatcher name.
        name: String,
        /// Budget that elapsed.
        timeout: Duration,
    },

    /// The operating system refused to create the listener thread.
    #[error("failed to spawn listener thread for dispatcher '{name}': {source}")]
    Spawn {
        /// Dispatcher name.
        name: String,
        /// Underlying spawn failure.
        #[source]
        source: io::Error,
    },

    /// A handler panicked on the listener thread.
    #[error("listener thread for dispatcher '{name}' panicked")]
    ListenerPanicked {
        /// Dispatcher name.
        name: String,
    },
}

/// State cell guarded by a mutex, with a condition variable signalled on
/// every transition.
#[derive(Debug)]
pub(super) struct Lifecycle {
    state: Mutex<LifecycleState>,
    changed: Condvar,
}

impl Lifecycle {
    pub(super) const fn new() -> Self {
        Self {
            state: Mutex::new(LifecycleState::NotStarted),
            changed: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LifecycleState> {
        self.state
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    pub(super) fn current(&self) -> LifecycleState {
        *self.lock()
    }

    /// Moves `NotStarted` to `Running`, reporting the blocking state otherwise.
    pub(super) fn begin_start(&self) -> Result<(), LifecycleState> {
        let mut state = self.lock();
        match *state {
            LifecycleState::NotStarted => {
                *state = LifecycleState::Running;
                Ok(())
            }
            other => Err(other),
        }
    }

    /// Records a shutdown request and returns the state it replaced.
    ///
    /// Only `Running` moves to `ShutdownRequested`; a never-started dispatcher
    /// moves straight to `Stopped`, and the other states are left alone.
    pub(super) fn request_shutdown(&self) -> LifecycleState {
        let mut state = self.lock();
        let previous = *state;
        match previous {
            LifecycleState::Running => *state = LifecycleState::ShutdownRequested,
            LifecycleState::NotStarted => *state = LifecycleState::Stopped,
            LifecycleState::ShutdownRequested | LifecycleState::Stopped => {}
        }
        drop(state);
        self.changed.notify_all();
        previous
    }

    pub(super) fn mark_stopped(&self) {
        *self.lock() = LifecycleState::Stopped;
        self.changed.notify_all();
    }

    /// Blocks until the state is `Stopped` or the timeout elapses.
    ///
    /// Returns `true` when the dispatcher stopped in time.
    pub(super) fn wait_until_stopped(&self, timeout: Duration) -> bool {
        let guard = self.lock();
        let (state, _) = self
            .changed
            .wait_timeout_while(guard, timeout, |state| *state != LifecycleState::Stopped)
            .unwrap_or_else(|poison| poison.into_inner());
        *state == LifecycleState::Stopped
    }
}

/// Marks the lifecycle stopped when dropped, including during unwinding.
pub(super) struct StoppedOnDrop<'a>(pub(super) &'a Lifecycle);

impl Drop for StoppedOnDrop<'_> {
    fn drop(&mut self) {
        self.0.mark_stopped();
    }
}
