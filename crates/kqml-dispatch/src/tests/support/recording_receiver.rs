//! Recording receiver used in dispatcher tests.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

use crate::message::{KqmlValue, Performative};
use crate::reader::ReadError;
use crate::receiver::{Continuation, Receiver};

/// One observed routing outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// Handler or continuation that ran, e.g. `receive_tell`.
    pub handler: String,
    /// Verb of the routed performative, when there was one.
    pub verb: Option<String>,
    /// Rendered content argument for content handlers.
    pub content: Option<String>,
}

impl Call {
    /// Call with no performative attached.
    #[must_use]
    pub fn bare(handler: &str) -> Self {
        Self {
            handler: String::from(handler),
            verb: None,
            content: None,
        }
    }

    fn for_message(handler: &str, msg: &Performative, content: Option<&KqmlValue>) -> Self {
        Self {
            handler: String::from(handler),
            verb: msg.head().map(String::from),
            content: content.map(ToString::to_string),
        }
    }
}

#[derive(Debug, Default)]
struct Log {
    calls: Mutex<Vec<Call>>,
    grew: Condvar,
}

impl Log {
    fn lock(&self) -> MutexGuard<'_, Vec<Call>> {
        self.calls
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    fn push(&self, call: Call) {
        self.lock().push(call);
        self.grew.notify_all();
    }
}

/// Test double that records every handler invocation in arrival order.
#[derive(Debug, Clone, Default)]
pub struct RecordingReceiver {
    log: Arc<Log>,
}

impl RecordingReceiver {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the calls recorded so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.log.lock().clone()
    }

    /// Handler names recorded so far.
    #[must_use]
    pub fn handlers(&self) -> Vec<String> {
        self.log.lock().iter().map(|call| call.handler.clone()).collect()
    }

    /// Blocks until at least `count` calls are recorded.
    ///
    /// Returns `false` if the timeout elapses first.
    #[must_use]
    pub fn wait_for_calls(&self, count: usize, timeout: Duration) -> bool {
        let calls = self.log.lock();
        let (calls, _) = self
            .log
            .grew
            .wait_timeout_while(calls, timeout, |calls| calls.len() < count)
            .unwrap_or_else(|poison| poison.into_inner());
        calls.len() >= count
    }

    /// Continuation that records itself under `continuation:<label>`.
    #[must_use]
    pub fn continuation(&self, label: &str) -> impl Continuation + 'static {
        let log = Arc::clone(&self.log);
        let handler = format!("continuation:{label}");
        move |msg: &Performative| log.push(Call::for_message(&handler, msg, None))
    }

    fn record(&self, handler: &str, msg: &Performative, content: Option<&KqmlValue>) {
        self.log.push(Call::for_message(handler, msg, content));
    }
}

macro_rules! content_handlers {
    ($($method:ident),* $(,)?) => {
        $(
            fn $method(&self, msg: &Performative, content: &KqmlValue) {
                self.record(stringify!($method), msg, Some(content));
            }
        )*
    };
}

macro_rules! message_handlers {
    ($($method:ident),* $(,)?) => {
        $(
            fn $method(&self, msg: &Performative) {
                self.record(stringify!($method), msg, None);
            }
        )*
    };
}

impl Receiver for RecordingReceiver {
    fn receive_end_of_stream(&self) {
        self.log.push(Call::bare("receive_end_of_stream"));
    }

    fn handle_exception(&self, error: &ReadError) {
        self.log.push(Call {
            handler: String::from("handle_exception"),
            verb: None,
            content: Some(error.to_string()),
        });
    }

    message_handlers!(
        receive_message_missing_verb,
        receive_message_missing_content,
        receive_other_performative,
    );

    content_handlers!(
        receive_ask_if,
        receive_ask_all,
        receive_ask_one,
        receive_stream_all,
        receive_tell,
        receive_untell,
        receive_deny,
        receive_insert,
        receive_uninsert,
        receive_delete_one,
        receive_delete_all,
        receive_undelete,
        receive_achieve,
        receive_unachieve,
        receive_advertise,
        receive_subscribe,
        receive_standby,
        receive_register,
        receive_forward,
        receive_broadcast,
        receive_transport_address,
        receive_broker_one,
        receive_broker_all,
        receive_recommend_one,
        receive_recommend_all,
        receive_recruit_one,
        receive_recruit_all,
        receive_reply,
        receive_request,
    );

    message_handlers!(
        receive_eos,
        receive_error,
        receive_sorry,
        receive_ready,
        receive_next,
        receive_rest,
        receive_discard,
        receive_unregister,
    );
}
