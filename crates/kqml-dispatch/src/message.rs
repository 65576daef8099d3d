//! Parsed performatives as handed over by a [`Reader`](crate::Reader).
//!
//! A performative is a verb followed by keyword parameters, for example
//! `(tell :sender planner :in-reply-to q1 :content (on a b))`. The engine only
//! inspects the verb, `:content`, and `:in-reply-to`; every other parameter is
//! carried through untouched for the receiver.

use std::fmt;

/// A KQML expression appearing as a parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KqmlValue {
    /// A bare word such as `q1` or `planner`.
    Token(String),
    /// A double-quoted string literal, stored without the quotes.
    Text(String),
    /// A parenthesised list of expressions.
    List(Vec<KqmlValue>),
}

impl KqmlValue {
    /// Builds a bare token.
    #[must_use]
    pub fn token(value: impl Into<String>) -> Self {
        Self::Token(value.into())
    }

    /// Builds a string literal.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Builds a list from its elements.
    #[must_use]
    pub fn list(items: impl IntoIterator<Item = Self>) -> Self {
        Self::List(items.into_iter().collect())
    }

    /// Returns the textual payload of the value.
    ///
    /// Tokens and strings yield their contents without quoting; lists yield
    /// their rendered KQML form.
    #[must_use]
    pub fn string_value(&self) -> String {
        match self {
            Self::Token(value) | Self::Text(value) => value.clone(),
            Self::List(_) => self.to_string(),
        }
    }

    /// Returns the elements when the value is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            Self::Token(_) | Self::Text(_) => None,
        }
    }
}

impl fmt::Display for KqmlValue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(value) => formatter.write_str(value),
            Self::Text(value) => {
                formatter.write_str("\"")?;
                for ch in value.chars() {
                    if matches!(ch, '"' | '\\') {
                        formatter.write_str("\\")?;
                    }
                    write!(formatter, "{ch}")?;
                }
                formatter.write_str("\"")
            }
            Self::List(items) => {
                formatter.write_str("(")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        formatter.write_str(" ")?;
                    }
                    write!(formatter, "{item}")?;
                }
                formatter.write_str(")")
            }
        }
    }
}

impl From<&str> for KqmlValue {
    fn from(value: &str) -> Self {
        Self::token(value)
    }
}

/// One structured communicative unit read from the stream.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Performative {
    verb: Option<String>,
    fields: Vec<(String, KqmlValue)>,
}

impl Performative {
    /// Starts a performative with the given verb.
    #[must_use]
    pub fn new(verb: impl Into<String>) -> Self {
        Self {
            verb: Some(verb.into()),
            fields: Vec::new(),
        }
    }

    /// Starts a performative that carries no verb.
    #[must_use]
    pub fn without_verb() -> Self {
        Self::default()
    }

    /// Adds a keyword parameter, replacing any earlier value for the key.
    #[must_use]
    pub fn with_field(mut self, key: &str, value: impl Into<KqmlValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets a keyword parameter, replacing any earlier value for the key.
    ///
    /// Keys are matched case-insensitively and the leading `:` is optional.
    pub fn set(&mut self, key: &str, value: impl Into<KqmlValue>) {
        let key = normalise_key(key);
        let value = value.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Returns the verb, if the performative has one.
    #[must_use]
    pub fn head(&self) -> Option<&str> {
        self.verb.as_deref()
    }

    /// Looks up a keyword parameter.
    ///
    /// Keys are matched case-insensitively and the leading `:` is optional, so
    /// `get("content")`, `get(":CONTENT")` and `get(":content")` agree.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&KqmlValue> {
        let key = normalise_key(key);
        self.fields
            .iter()
            .find(|(existing, _)| *existing == key)
            .map(|(_, value)| value)
    }

    /// Shortcut for the `:content` parameter.
    #[must_use]
    pub fn content(&self) -> Option<&KqmlValue> {
        self.get("content")
    }

    /// Shortcut for the `:in-reply-to` parameter.
    #[must_use]
    pub fn in_reply_to(&self) -> Option<&KqmlValue> {
        self.get("in-reply-to")
    }

    /// Iterates over the keyword parameters in insertion order.
    ///
    /// Keys are yielded in their normalised form: lower-case, without `:`.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &KqmlValue)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl fmt::Display for Performative {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("(")?;
        let mut needs_space = false;
        if let Some(verb) = &self.verb {
            formatter.write_str(verb)?;
            needs_space = true;
        }
        for (key, value) in &self.fields {
            if needs_space {
                formatter.write_str(" ")?;
            }
            write!(formatter, ":{key} {value}")?;
            needs_space = true;
        }
        formatter.write_str(")")
    }
}

fn normalise_key(key: &str) -> String {
    let trimmed = key.trim();
    trimmed
        .strip_prefix(':')
        .unwrap_or(trimmed)
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("content")]
    #[case(":content")]
    #[case(":CONTENT")]
    #[case("Content")]
    fn field_lookup_ignores_case_and_colon(#[case] key: &str) {
        let msg = Performative::new("tell").with_field(":content", KqmlValue::token("x"));

        assert_eq!(msg.get(key), Some(&KqmlValue::token("x")));
    }

    #[rstest]
    fn later_values_replace_earlier_ones() {
        let msg = Performative::new("tell")
            .with_field("content", "first")
            .with_field(":Content", "second");

        assert_eq!(msg.content(), Some(&KqmlValue::token("second")));
        assert_eq!(msg.fields().count(), 1);
    }

    #[rstest]
    fn missing_verb_reports_no_head() {
        let msg = Performative::without_verb().with_field("content", "x");

        assert_eq!(msg.head(), None);
    }

    #[rstest]
    fn string_value_unwraps_tokens_and_strings() {
        assert_eq!(KqmlValue::token("q1").string_value(), "q1");
        assert_eq!(KqmlValue::text("hello world").string_value(), "hello world");
    }

    #[rstest]
    fn lists_render_as_kqml() {
        let value = KqmlValue::list([
            KqmlValue::token("foo"),
            KqmlValue::text("say \"hi\""),
            KqmlValue::list([KqmlValue::token("bar")]),
        ]);

        assert_eq!(value.to_string(), r#"(foo "say \"hi\"" (bar))"#);
        assert_eq!(value.string_value(), value.to_string());
        assert_eq!(value.as_list().map(<[KqmlValue]>::len), Some(3));
    }

    #[rstest]
    fn performative_renders_verb_and_fields() {
        let msg = Performative::new("tell")
            .with_field(":in-reply-to", "q1")
            .with_field(":content", KqmlValue::list([KqmlValue::token("foo")]));

        assert_eq!(msg.to_string(), "(tell :in-reply-to q1 :content (foo))");
    }
}
