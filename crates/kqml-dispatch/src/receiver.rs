//! Handler capabilities the dispatcher routes performatives into.
//!
//! A [`Receiver`] owns the business logic for every verb in the closed
//! vocabulary. The dispatcher resolves the verb to one of these methods with
//! a `match`, so a receiver that compiles handles the whole vocabulary.
//!
//! Handlers run synchronously on the listener thread. A handler that blocks
//! stalls every later performative from the same stream.

use crate::message::{KqmlValue, Performative};
use crate::reader::ReadError;

/// Sink exposing one handler per routing outcome.
pub trait Receiver: Send + Sync {
    /// The stream ended or a blocked read was interrupted.
    fn receive_end_of_stream(&self);

    /// The reader failed while no shutdown was in progress.
    fn handle_exception(&self, error: &ReadError);

    /// The performative had no verb.
    fn receive_message_missing_verb(&self, msg: &Performative);

    /// A content-bearing verb arrived without `:content`.
    fn receive_message_missing_content(&self, msg: &Performative);

    /// The verb is outside the known vocabulary.
    fn receive_other_performative(&self, msg: &Performative);

    /// `ask-if`
    fn receive_ask_if(&self, msg: &Performative, content: &KqmlValue);
    /// `ask-all`
    fn receive_ask_all(&self, msg: &Performative, content: &KqmlValue);
    /// `ask-one`
    fn receive_ask_one(&self, msg: &Performative, content: &KqmlValue);
    /// `stream-all`
    fn receive_stream_all(&self, msg: &Performative, content: &KqmlValue);
    /// `tell`
    fn receive_tell(&self, msg: &Performative, content: &KqmlValue);
    /// `untell`
    fn receive_untell(&self, msg: &Performative, content: &KqmlValue);
    /// `deny`
    fn receive_deny(&self, msg: &Performative, content: &KqmlValue);
    /// `insert`
    fn receive_insert(&self, msg: &Performative, content: &KqmlValue);
    /// `uninsert`
    fn receive_uninsert(&self, msg: &Performative, content: &KqmlValue);
    /// `delete-one`
    fn receive_delete_one(&self, msg: &Performative, content: &KqmlValue);
    /// `delete-all`
    fn receive_delete_all(&self, msg: &Performative, content: &KqmlValue);
    /// `undelete`
    fn receive_undelete(&self, msg: &Performative, content: &KqmlValue);
    /// `achieve`
    fn receive_achieve(&self, msg: &Performative, content: &KqmlValue);
    /// `unachieve`
    fn receive_unachieve(&self, msg: &Performative, content: &KqmlValue);
    /// `advertise`
    fn receive_advertise(&self, msg: &Performative, content: &KqmlValue);
    /// `subscribe`
    fn receive_subscribe(&self, msg: &Performative, content: &KqmlValue);
    /// `standby`
    fn receive_standby(&self, msg: &Performative, content: &KqmlValue);
    /// `register`
    fn receive_register(&self, msg: &Performative, content: &KqmlValue);
    /// `forward`
    fn receive_forward(&self, msg: &Performative, content: &KqmlValue);
    /// `broadcast`
    fn receive_broadcast(&self, msg: &Performative, content: &KqmlValue);
    /// `transport-address`
    fn receive_transport_address(&self, msg: &Performative, content: &KqmlValue);
    /// `broker-one`
    fn receive_broker_one(&self, msg: &Performative, content: &KqmlValue);
    /// `broker-all`
    fn receive_broker_all(&self, msg: &Performative, content: &KqmlValue);
    /// `recommend-one`
    fn receive_recommend_one(&self, msg: &Performative, content: &KqmlValue);
    /// `recommend-all`
    fn receive_recommend_all(&self, msg: &Performative, content: &KqmlValue);
    /// `recruit-one`
    fn receive_recruit_one(&self, msg: &Performative, content: &KqmlValue);
    /// `recruit-all`
    fn receive_recruit_all(&self, msg: &Performative, content: &KqmlValue);
    /// `reply` that matched no pending continuation.
    fn receive_reply(&self, msg: &Performative, content: &KqmlValue);
    /// `request`
    fn receive_request(&self, msg: &Performative, content: &KqmlValue);

    /// `eos`
    fn receive_eos(&self, msg: &Performative);
    /// `error`
    fn receive_error(&self, msg: &Performative);
    /// `sorry`
    fn receive_sorry(&self, msg: &Performative);
    /// `ready`
    fn receive_ready(&self, msg: &Performative);
    /// `next`
    fn receive_next(&self, msg: &Performative);
    /// `rest`
    fn receive_rest(&self, msg: &Performative);
    /// `discard`
    fn receive_discard(&self, msg: &Performative);
    /// `unregister`
    fn receive_unregister(&self, msg: &Performative);
}

/// One-shot handler awaiting the reply to a single request.
///
/// Any `FnOnce(&Performative) + Send + 'static` closure is a continuation.
pub trait Continuation: Send {
    /// Consumes the continuation with the correlated reply.
    fn receive(self: Box<Self>, msg: &Performative);
}

impl<F> Continuation for F
where
    F: FnOnce(&Performative) + Send + 'static,
{
    fn receive(self: Box<Self>, msg: &Performative) {
        (*self)(msg);
    }
}
