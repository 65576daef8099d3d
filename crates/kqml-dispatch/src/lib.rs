//! KQML performative dispatch engine.
//!
//! The crate connects a blocking source of parsed performatives to a set of
//! verb-specific handlers. A [`Dispatcher`] owns a [`Reader`], runs a single
//! listener thread that routes each performative to a [`Receiver`], and keeps
//! a registry of one-shot [`Continuation`]s so a reply carrying
//! `:in-reply-to` reaches the code that asked the question instead of the
//! generic handler for its verb.
//!
//! Wire parsing stays behind the [`Reader`] trait. The in-memory
//! [`ChannelReader`] lets embedders and tests feed performatives from another
//! thread without a socket.

mod dispatcher;
mod message;
mod reader;
mod receiver;
pub mod telemetry;
mod verb;

#[cfg(test)]
mod tests;

pub use dispatcher::{
    Dispatcher, LifecycleError, LifecycleState, ReplyError, canonical_reply_id,
};
pub use kqml_config::{
    ConfigError, DispatcherConfig, DuplicateReplyPolicy, LogFormat, LoggingConfig,
    MalformedPolicy,
};
pub use message::{KqmlValue, Performative};
pub use reader::{ChannelReader, PerformativeSender, ReadError, ReadInterrupt, Reader};
pub use receiver::{Continuation, Receiver};
pub use verb::{ContentVerb, MessageVerb, Verb};
