//! Shared fixtures and helpers for dispatcher tests.

mod blocking_reader;
mod recording_receiver;

use std::sync::Arc;
use std::time::Duration;

use kqml_config::DispatcherConfig;
use mockall::mock;
use rstest::fixture;

pub use blocking_reader::BlockingReader;
pub use recording_receiver::{Call, RecordingReceiver};

use crate::dispatcher::Dispatcher;
use crate::message::Performative;
use crate::reader::{ChannelReader, PerformativeSender, ReadError, Reader};

/// Upper bound on how long a test waits for the listener thread.
pub const WAIT: Duration = Duration::from_secs(5);

// Scripted reader for asserting read and close interactions.
mock! {
    pub Source {}

    impl Reader for Source {
        fn read_performative(&mut self) -> Result<Performative, ReadError>;
        fn close(&mut self) -> Result<(), ReadError>;
    }
}

/// Fresh recording receiver.
#[fixture]
pub fn receiver() -> RecordingReceiver {
    RecordingReceiver::new()
}

/// Dispatcher over an in-memory channel together with its feeding end.
#[must_use]
pub fn channel_dispatcher(
    receiver: &RecordingReceiver,
    config: &DispatcherConfig,
) -> (Dispatcher<ChannelReader>, PerformativeSender) {
    let (reader, sender) = ChannelReader::open();
    let dispatcher = Dispatcher::with_config(
        reader,
        Arc::new(receiver.clone()),
        "test-agent",
        config,
    )
    .expect("test configuration is valid");
    (dispatcher, sender)
}

/// Builds a content-bearing performative.
#[must_use]
pub fn with_content(verb: &str, content: &str) -> Performative {
    Performative::new(verb).with_field(":content", content)
}
