//! Routing of a single performative to a continuation or receiver handler.
//!
//! Precedence, highest first:
//!
//! 1. no verb: `receive_message_missing_verb`
//! 2. `:in-reply-to` matching a pending continuation: the continuation
//! 3. content-bearing verb: its handler, or `receive_message_missing_content`
//! 4. message-only verb: its handler
//! 5. anything else: `receive_other_performative`

use tracing::{debug, trace};

use super::DISPATCH_TARGET;
use super::registry::{ReplyRegistry, canonical_reply_id};
use crate::message::{KqmlValue, Performative};
use crate::receiver::Receiver;
use crate::verb::{ContentVerb, MessageVerb, Verb};

pub(super) fn route(
    agent: &str,
    receiver: &dyn Receiver,
    replies: &ReplyRegistry,
    msg: &Performative,
) {
    let Some(verb) = msg.head() else {
        debug!(target: DISPATCH_TARGET, agent, "performative has no verb");
        receiver.receive_message_missing_verb(msg);
        return;
    };

    if let Some(reply_to) = msg.in_reply_to() {
        let reply_id = canonical_reply_id(&reply_to.string_value());
        // Removed before invocation so the continuation may register new ones.
        if let Some(continuation) = replies.take(&reply_id) {
            debug!(
                target: DISPATCH_TARGET,
                agent,
                verb,
                reply_id = %reply_id,
                "delivering reply to continuation"
            );
            continuation.receive(msg);
            return;
        }
        trace!(
            target: DISPATCH_TARGET,
            agent,
            verb,
            reply_id = %reply_id,
            "no pending continuation; dispatching by verb"
        );
    }

    match Verb::classify(verb) {
        Verb::Content(content_verb) => match msg.content() {
            Some(content) => {
                trace!(target: DISPATCH_TARGET, agent, verb, "dispatching content verb");
                route_content(receiver, content_verb, msg, content);
            }
            None => {
                debug!(target: DISPATCH_TARGET, agent, verb, "performative missing content");
                receiver.receive_message_missing_content(msg);
            }
        },
        Verb::Message(message_verb) => {
            trace!(target: DISPATCH_TARGET, agent, verb, "dispatching message verb");
            route_message(receiver, message_verb, msg);
        }
        Verb::Other => {
            debug!(target: DISPATCH_TARGET, agent, verb, "unrecognised verb");
            receiver.receive_other_performative(msg);
        }
    }
}

fn route_content(
    receiver: &dyn Receiver,
    verb: ContentVerb,
    msg: &Performative,
    content: &KqmlValue,
) {
    match verb {
        ContentVerb::AskIf => receiver.receive_ask_if(msg, content),
        ContentVerb::AskAll => receiver.receive_ask_all(msg, content),
        ContentVerb::AskOne => receiver.receive_ask_one(msg, content),
        ContentVerb::StreamAll => receiver.receive_stream_all(msg, content),
        ContentVerb::Tell => receiver.receive_tell(msg, content),
        ContentVerb::Untell => receiver.receive_untell(msg, content),
        ContentVerb::Deny => receiver.receive_deny(msg, content),
        ContentVerb::Insert => receiver.receive_insert(msg, content),
        ContentVerb::Uninsert => receiver.receive_uninsert(msg, content),
        ContentVerb::DeleteOne => receiver.receive_delete_one(msg, content),
        ContentVerb::DeleteAll => receiver.receive_delete_all(msg, content),
        ContentVerb::Undelete => receiver.receive_undelete(msg, content),
        ContentVerb::Achieve => receiver.receive_achieve(msg, content),
        ContentVerb::Unachieve => receiver.receive_unachieve(msg, content),
        ContentVerb::Advertise => receiver.receive_advertise(msg, content),
        ContentVerb::Subscribe => receiver.receive_subscribe(msg, content),
        ContentVerb::Standby => receiver.receive_standby(msg, content),
        ContentVerb::Register => receiver.receive_register(msg, content),
        ContentVerb::Forward => receiver.receive_forward(msg, content),
        ContentVerb::Broadcast => receiver.receive_broadcast(msg, content),
        ContentVerb::TransportAddress => receiver.receive_transport_address(msg, content),
        ContentVerb::BrokerOne => receiver.receive_broker_one(msg, content),
        ContentVerb::BrokerAll => receiver.receive_broker_all(msg, content),
        ContentVerb::RecommendOne => receiver.receive_recommend_one(msg, content),
        ContentVerb::RecommendAll => receiver.receive_recommend_all(msg, content),
        ContentVerb::RecruitOne => receiver.receive_recruit_one(msg, content),
        ContentVerb::RecruitAll => receiver.receive_recruit_all(msg, content),
        ContentVerb::Reply => receiver.receive_reply(msg, content),
        ContentVerb::Request => receiver.receive_request(msg, content),
    }
}

fn route_message(receiver: &dyn Receiver, verb: MessageVerb, msg: &Performative) {
    match verb {
        MessageVerb::Eos => receiver.receive_eos(msg),
        MessageVerb::Error => receiver.receive_error(msg),
        MessageVerb::Sorry => receiver.receive_sorry(msg),
        MessageVerb::Ready => receiver.receive_ready(msg),
        MessageVerb::Next => receiver.receive_next(msg),
        MessageVerb::Rest => receiver.receive_rest(msg),
        MessageVerb::Discard => receiver.receive_discard(msg),
        MessageVerb::Unregister => receiver.receive_unregister(msg),
    }
}
