//! Closed verb vocabulary used for routing.
//!
//! Verbs fall into exactly one of three categories: content-bearing verbs,
//! message-only verbs, and everything else. Membership is fixed at compile
//! time so routing never depends on building handler names at runtime.

use std::str::FromStr;

use strum::{AsRefStr, Display, EnumCount, EnumIter, EnumString, IntoStaticStr};

/// Verbs whose performatives must carry a `:content` parameter.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    Display,
    EnumCount,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ContentVerb {
    /// `ask-if`
    AskIf,
    /// `ask-all`
    AskAll,
    /// `ask-one`
    AskOne,
    /// `stream-all`
    StreamAll,
    /// `tell`
    Tell,
    /// `untell`
    Untell,
    /// `deny`
    Deny,
    /// `insert`
    Insert,
    /// `uninsert`
    Uninsert,
    /// `delete-one`
    DeleteOne,
    /// `delete-all`
    DeleteAll,
    /// `undelete`
    Undelete,
    /// `achieve`
    Achieve,
    /// `unachieve`
    Unachieve,
    /// `advertise`
    Advertise,
    /// `subscribe`
    Subscribe,
    /// `standby`
    Standby,
    /// `register`
    Register,
    /// `forward`
    Forward,
    /// `broadcast`
    Broadcast,
    /// `transport-address`
    TransportAddress,
    /// `broker-one`
    BrokerOne,
    /// `broker-all`
    BrokerAll,
    /// `recommend-one`
    RecommendOne,
    /// `recommend-all`
    RecommendAll,
    /// `recruit-one`
    RecruitOne,
    /// `recruit-all`
    RecruitAll,
    /// `reply`
    Reply,
    /// `request`
    Request,
}

/// Verbs dispatched without a content argument.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    Display,
    EnumCount,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum MessageVerb {
    /// `eos`
    Eos,
    /// `error`
    Error,
    /// `sorry`
    Sorry,
    /// `ready`
    Ready,
    /// `next`
    Next,
    /// `rest`
    Rest,
    /// `discard`
    Discard,
    /// `unregister`
    Unregister,
}

/// Routing category of a performative's verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// A content-bearing verb.
    Content(ContentVerb),
    /// A message-only verb.
    Message(MessageVerb),
    /// Any verb outside the closed vocabulary.
    Other,
}

impl Verb {
    /// Classifies a verb, ignoring ASCII case and surrounding whitespace.
    #[must_use]
    pub fn classify(verb: &str) -> Self {
        let verb = verb.trim();
        if let Ok(content) = ContentVerb::from_str(verb) {
            return Self::Content(content);
        }
        MessageVerb::from_str(verb).map_or(Self::Other, Self::Message)
    }

    /// Returns the canonical lower-case spelling, if the verb is recognised.
    #[must_use]
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            Self::Content(verb) => Some((*verb).into()),
            Self::Message(verb) => Some((*verb).into()),
            Self::Other => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;

    #[rstest]
    #[case("tell", Verb::Content(ContentVerb::Tell))]
    #[case("TELL", Verb::Content(ContentVerb::Tell))]
    #[case("Ask-If", Verb::Content(ContentVerb::AskIf))]
    #[case("transport-address", Verb::Content(ContentVerb::TransportAddress))]
    #[case(" reply ", Verb::Content(ContentVerb::Reply))]
    #[case("ready", Verb::Message(MessageVerb::Ready))]
    #[case("EOS", Verb::Message(MessageVerb::Eos))]
    #[case("unregister", Verb::Message(MessageVerb::Unregister))]
    #[case("frobnicate", Verb::Other)]
    #[case("ask_if", Verb::Other)]
    #[case("", Verb::Other)]
    fn classifies_verbs(#[case] input: &str, #[case] expected: Verb) {
        assert_eq!(Verb::classify(input), expected);
    }

    #[rstest]
    fn vocabulary_sizes_match_the_protocol() {
        assert_eq!(ContentVerb::COUNT, 29);
        assert_eq!(MessageVerb::COUNT, 8);
    }

    #[rstest]
    fn categories_are_disjoint_sets() {
        let content: HashSet<String> = ContentVerb::iter().map(|verb| verb.to_string()).collect();
        let message: HashSet<String> = MessageVerb::iter().map(|verb| verb.to_string()).collect();

        assert_eq!(content.len(), ContentVerb::COUNT);
        assert_eq!(message.len(), MessageVerb::COUNT);
        assert!(content.is_disjoint(&message));
    }

    #[rstest]
    fn every_spelling_classifies_back_to_itself() {
        for verb in ContentVerb::iter() {
            assert_eq!(Verb::classify(verb.as_ref()), Verb::Content(verb));
        }
        for verb in MessageVerb::iter() {
            assert_eq!(Verb::classify(verb.as_ref()), Verb::Message(verb));
        }
    }

    #[rstest]
    fn canonical_spelling_is_kebab_case() {
        assert_eq!(
            Verb::Content(ContentVerb::RecommendOne).as_str(),
            Some("recommend-one")
        );
        assert_eq!(Verb::Other.as_str(), None);
    }
}
