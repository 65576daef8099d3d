//! Readers that block until the test lets them go.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::message::Performative;
use crate::reader::{ReadError, ReadInterrupt, Reader};

/// What a blocked read returns once it is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// The read reports the end of the stream.
    EndOfStream,
    /// The read fails as if the socket were torn down underneath it.
    Severed,
}

#[derive(Debug, Default)]
struct Gate {
    open: Mutex<Option<Sender<()>>>,
}

impl Gate {
    fn release(&self) {
        drop(
            self.open
                .lock()
                .unwrap_or_else(|poison| poison.into_inner())
                .take(),
        );
    }
}

impl ReadInterrupt for Gate {
    fn interrupt(&self) {
        self.release();
    }
}

/// Reader whose first read blocks until its [`ReaderProbe`] releases it.
pub struct BlockingReader {
    blocked: Receiver<()>,
    entered: Sender<()>,
    release: Release,
    gate: Arc<Gate>,
    interruptible: bool,
    closes: Arc<AtomicUsize>,
}

/// Test-side handle observing and releasing a [`BlockingReader`].
pub struct ReaderProbe {
    gate: Arc<Gate>,
    entered: Receiver<()>,
    closes: Arc<AtomicUsize>,
}

impl BlockingReader {
    /// Reader that ignores interruption; only [`ReaderProbe::release`] wakes it.
    #[must_use]
    pub fn uninterruptible() -> (Self, ReaderProbe) {
        Self::build(Release::EndOfStream, false)
    }

    /// Reader whose interrupter wakes it with a transport failure.
    #[must_use]
    pub fn severed_on_interrupt() -> (Self, ReaderProbe) {
        Self::build(Release::Severed, true)
    }

    fn build(release: Release, interruptible: bool) -> (Self, ReaderProbe) {
        let (open, blocked) = mpsc::channel();
        let (entered_tx, entered_rx) = mpsc::channel();
        let gate = Arc::new(Gate {
            open: Mutex::new(Some(open)),
        });
        let closes = Arc::new(AtomicUsize::new(0));
        let reader = Self {
            blocked,
            entered: entered_tx,
            release,
            gate: Arc::clone(&gate),
            interruptible,
            closes: Arc::clone(&closes),
        };
        let probe = ReaderProbe {
            gate,
            entered: entered_rx,
            closes,
        };
        (reader, probe)
    }
}

impl Reader for BlockingReader {
    fn read_performative(&mut self) -> Result<Performative, ReadError> {
        self.entered.send(()).ok();
        // Nothing is ever sent; the read wakes when the gate drops its sender.
        self.blocked.recv().ok();
        match self.release {
            Release::EndOfStream => Err(ReadError::EndOfStream),
            Release::Severed => Err(ReadError::Transport(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "socket closed",
            ))),
        }
    }

    fn close(&mut self) -> Result<(), ReadError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn interrupter(&self) -> Option<Arc<dyn ReadInterrupt>> {
        self.interruptible
            .then(|| Arc::clone(&self.gate) as Arc<dyn ReadInterrupt>)
    }
}

impl ReaderProbe {
    /// Waits until the listener is blocked inside a read.
    #[must_use]
    pub fn wait_until_reading(&self, timeout: Duration) -> bool {
        self.entered.recv_timeout(timeout).is_ok()
    }

    /// Wakes the blocked read.
    pub fn release(&self) {
        self.gate.release();
    }

    /// Number of times the reader was closed.
    #[must_use]
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl Drop for ReaderProbe {
    fn drop(&mut self) {
        self.release();
    }
}
