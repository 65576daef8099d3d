//! The dispatch engine.
//!
//! A [`Dispatcher`] pairs a [`Reader`] with a [`Receiver`]. Once started, a
//! single listener thread pulls performatives off the reader in delivery
//! order and routes each one synchronously: replies to pending
//! [`Continuation`]s first, everything else by verb. Continuations may be
//! registered from any thread while the listener runs.
//!
//! Shutdown is cooperative. [`Dispatcher::shutdown`] raises a flag that the
//! listener checks between reads, wakes a blocked read when the reader
//! supports it, and waits a bounded time for the listener to exit before
//! closing the reader.

mod lifecycle;
mod listener;
mod registry;
mod routing;

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use kqml_config::{ConfigError, DispatcherConfig, MalformedPolicy};
use tracing::{debug, info, warn};

pub use self::lifecycle::{LifecycleError, LifecycleState};
pub use self::registry::{ReplyError, canonical_reply_id};

use self::lifecycle::Lifecycle;
use self::registry::ReplyRegistry;
use crate::message::Performative;
use crate::reader::{ReadInterrupt, Reader};
use crate::receiver::{Continuation, Receiver};

/// Log target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = "kqml_dispatch::dispatcher";

static NEXT_ORDINAL: AtomicUsize = AtomicUsize::new(0);

/// State shared between the dispatcher handle and its listener thread.
struct DispatchCore {
    agent: String,
    receiver: Arc<dyn Receiver>,
    replies: ReplyRegistry,
    lifecycle: Lifecycle,
    shutdown: AtomicBool,
    malformed_policy: MalformedPolicy,
}

impl DispatchCore {
    fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    fn dispatch(&self, msg: &Performative) {
        routing::route(&self.agent, self.receiver.as_ref(), &self.replies, msg);
    }
}

/// Routes performatives from a reader to a receiver and correlates replies.
pub struct Dispatcher<R: Reader> {
    core: Arc<DispatchCore>,
    ordinal: usize,
    shutdown_timeout: Duration,
    reader: Mutex<Option<R>>,
    interrupter: Option<Arc<dyn ReadInterrupt>>,
    listener: Mutex<Option<JoinHandle<R>>>,
}

impl<R: Reader> Dispatcher<R> {
    /// Builds a dispatcher with the default configuration.
    ///
    /// No I/O happens until [`Dispatcher::start`].
    #[must_use]
    pub fn new(reader: R, receiver: Arc<dyn Receiver>, name: impl Into<String>) -> Self {
        Self::build(reader, receiver, name.into(), &DispatcherConfig::default())
    }

    /// Builds a dispatcher with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] reported by [`DispatcherConfig::validate`],
    /// for example when the shutdown budget is zero and every shutdown of a
    /// running listener would time out.
    pub fn with_config(
        reader: R,
        receiver: Arc<dyn Receiver>,
        name: impl Into<String>,
        config: &DispatcherConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(reader, receiver, name.into(), config))
    }

    fn build(
        reader: R,
        receiver: Arc<dyn Receiver>,
        agent: String,
        config: &DispatcherConfig,
    ) -> Self {
        let interrupter = reader.interrupter();
        Self {
            core: Arc::new(DispatchCore {
                agent,
                receiver,
                replies: ReplyRegistry::new(config.duplicate_reply_policy),
                lifecycle: Lifecycle::new(),
                shutdown: AtomicBool::new(false),
                malformed_policy: config.malformed_policy,
            }),
            ordinal: NEXT_ORDINAL.fetch_add(1, Ordering::Relaxed),
            shutdown_timeout: config.shutdown_timeout(),
            reader: Mutex::new(Some(reader)),
            interrupter,
            listener: Mutex::new(None),
        }
    }

    /// Name given at construction.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.core.agent
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.core.lifecycle.current()
    }

    /// Number of continuations awaiting a reply.
    #[must_use]
    pub fn pending_replies(&self) -> usize {
        self.core.replies.len()
    }

    /// Whether a continuation is pending for the reply id (case-insensitive).
    #[must_use]
    pub fn has_reply_continuation(&self, reply_id: &str) -> bool {
        self.core.replies.contains(reply_id)
    }

    /// Spawns the listener thread.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::AlreadyRunning`] if a listener is active,
    /// [`LifecycleError::AlreadyStopped`] once shutdown has been requested,
    /// and [`LifecycleError::Spawn`] if the thread cannot be created.
    pub fn start(&self) -> Result<(), LifecycleError> {
        // Held until the handle is stored so `shutdown` never finds a stopped
        // listener without its handle.
        let mut slot = lock(&self.listener);
        if let Err(state) = self.core.lifecycle.begin_start() {
            return Err(match state {
                LifecycleState::Running => LifecycleError::AlreadyRunning {
                    name: self.core.agent.clone(),
                },
                LifecycleState::NotStarted
                | LifecycleState::ShutdownRequested
                | LifecycleState::Stopped => LifecycleError::AlreadyStopped {
                    name: self.core.agent.clone(),
                },
            });
        }

        let Some(reader) = lock(&self.reader).take() else {
            self.core.lifecycle.mark_stopped();
            return Err(LifecycleError::AlreadyStopped {
                name: self.core.agent.clone(),
            });
        };

        let core = Arc::clone(&self.core);
        let thread_name = self.thread_name();
        let spawned = thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || listener::run_read_loop(&core, reader));

        match spawned {
            Ok(handle) => {
                *slot = Some(handle);
                info!(
                    target: DISPATCH_TARGET,
                    agent = %self.core.agent,
                    thread = %thread_name,
                    "dispatcher started"
                );
                Ok(())
            }
            Err(source) => {
                self.core.lifecycle.mark_stopped();
                Err(LifecycleError::Spawn {
                    name: self.core.agent.clone(),
                    source,
                })
            }
        }
    }

    /// Stops the listener and closes the reader.
    ///
    /// Raises the shutdown flag, wakes a blocked read if the reader supports
    /// interruption, then waits up to the configured timeout for the listener
    /// to exit. The reader is closed only once the listener has stopped;
    /// failures while closing are logged and suppressed. Calling `shutdown`
    /// on a dispatcher that was never started closes the reader immediately.
    /// Calling it again after a successful shutdown does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::ShutdownTimeout`] if the listener is still
    /// running when the timeout elapses; the reader is left open and the
    /// caller may retry. Returns [`LifecycleError::ListenerPanicked`] if a
    /// handler panicked on the listener thread.
    pub fn shutdown(&self) -> Result<(), LifecycleError> {
        self.core.shutdown.store(true, Ordering::SeqCst);
        let previous = self.core.lifecycle.request_shutdown();
        debug!(
            target: DISPATCH_TARGET,
            agent = %self.core.agent,
            %previous,
            "dispatcher shutdown requested"
        );

        if previous == LifecycleState::NotStarted {
            if let Some(reader) = lock(&self.reader).take() {
                self.close_reader(reader);
            }
            return Ok(());
        }

        if let Some(interrupter) = &self.interrupter {
            interrupter.interrupt();
        }

        if !self.core.lifecycle.wait_until_stopped(self.shutdown_timeout) {
            warn!(
                target: DISPATCH_TARGET,
                agent = %self.core.agent,
                timeout_ms = self.shutdown_timeout.as_millis(),
                "listener did not stop in time"
            );
            return Err(LifecycleError::ShutdownTimeout {
                name: self.core.agent.clone(),
                timeout: self.shutdown_timeout,
            });
        }

        let Some(handle) = lock(&self.listener).take() else {
            return Ok(());
        };
        let reader = handle.join().map_err(|_| LifecycleError::ListenerPanicked {
            name: self.core.agent.clone(),
        })?;
        self.close_reader(reader);
        info!(target: DISPATCH_TARGET, agent = %self.core.agent, "dispatcher shut down");
        Ok(())
    }

    /// Routes one performative synchronously on the calling thread.
    ///
    /// This is the same routing the listener applies to every performative it
    /// reads, and it can be used without starting the listener.
    pub fn dispatch_message(&self, msg: &Performative) {
        self.core.dispatch(msg);
    }

    /// Registers a one-shot continuation for replies carrying
    /// `:in-reply-to <reply_id>`.
    ///
    /// The id is matched case-insensitively. Safe to call from any thread,
    /// including while the listener is running.
    ///
    /// # Errors
    ///
    /// Returns [`ReplyError::Duplicate`] when a continuation is already
    /// pending for the id and the configuration rejects duplicates. Under the
    /// default policy the pending continuation is replaced instead.
    pub fn add_reply_continuation<C>(
        &self,
        reply_id: &str,
        continuation: C,
    ) -> Result<(), ReplyError>
    where
        C: Continuation + 'static,
    {
        self.core.replies.insert(reply_id, Box::new(continuation))
    }

    fn thread_name(&self) -> String {
        format!("{}-dispatcher-{}", self.core.agent, self.ordinal)
    }

    fn close_reader(&self, mut reader: R) {
        match reader.close() {
            Ok(()) => debug!(target: DISPATCH_TARGET, agent = %self.core.agent, "reader closed"),
            Err(error) => warn!(
                target: DISPATCH_TARGET,
                agent = %self.core.agent,
                %error,
                "failed to close reader"
            ),
        }
    }
}

impl<R: Reader> fmt::Debug for Dispatcher<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("name", &self.core.agent)
            .field("ordinal", &self.ordinal)
            .field("state", &self.state())
            .field("pending_replies", &self.pending_replies())
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poison| poison.into_inner())
}
