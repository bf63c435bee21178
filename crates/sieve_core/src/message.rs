//! Message sources and per-language message catalogs.

use crate::Issue;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Signature of a computed message.
pub type MessageFn = dyn Fn(&Issue) -> String + Send + Sync;

/// Where the text of an issue comes from.
///
/// An absent message is modelled as `Option<MessageSource>::None` at the
/// places that accept one.
#[derive(Clone)]
pub enum MessageSource {
    /// Fixed text
    Static(String),
    /// Text computed from the issue being reported
    Computed(Arc<MessageFn>),
}

impl MessageSource {
    /// Wraps a closure as a computed message.
    pub fn computed(f: impl Fn(&Issue) -> String + Send + Sync + 'static) -> Self {
        MessageSource::Computed(Arc::new(f))
    }

    /// Produces the text for `issue`.
    pub fn resolve(&self, issue: &Issue) -> String {
        match self {
            MessageSource::Static(text) => text.clone(),
            MessageSource::Computed(f) => f(issue),
        }
    }
}

impl fmt::Debug for MessageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageSource::Static(text) => f.debug_tuple("Static").field(text).finish(),
            MessageSource::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<&str> for MessageSource {
    fn from(text: &str) -> Self {
        MessageSource::Static(text.to_string())
    }
}

impl From<String> for MessageSource {
    fn from(text: String) -> Self {
        MessageSource::Static(text)
    }
}

/// Host-registered messages, keyed by language.
///
/// Lookups try the requested language first and then the entry registered
/// without a language. A catalog is carried by the [`RunConfig`](crate::RunConfig)
/// of a call; nothing is stored globally.
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    global: HashMap<Option<String>, MessageSource>,
    schema: HashMap<Option<String>, MessageSource>,
    specific: HashMap<(String, Option<String>), MessageSource>,
}

impl MessageCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the message used by every step without a better match.
    pub fn global(mut self, message: impl Into<MessageSource>, lang: Option<&str>) -> Self {
        self.global.insert(lang.map(String::from), message.into());
        self
    }

    /// Registers the message used by schema-kind steps.
    pub fn schema(mut self, message: impl Into<MessageSource>, lang: Option<&str>) -> Self {
        self.schema.insert(lang.map(String::from), message.into());
        self
    }

    /// Registers the message used by steps with the given reference.
    pub fn specific(
        mut self,
        reference: impl Into<String>,
        message: impl Into<MessageSource>,
        lang: Option<&str>,
    ) -> Self {
        self.specific
            .insert((reference.into(), lang.map(String::from)), message.into());
        self
    }

    pub fn global_message(&self, lang: Option<&str>) -> Option<&MessageSource> {
        lookup(&self.global, lang)
    }

    pub fn schema_message(&self, lang: Option<&str>) -> Option<&MessageSource> {
        lookup(&self.schema, lang)
    }

    pub fn specific_message(
        &self,
        reference: &str,
        lang: Option<&str>,
    ) -> Option<&MessageSource> {
        let reference = reference.to_string();
        lang.and_then(|lang| self.specific.get(&(reference.clone(), Some(lang.to_string()))))
            .or_else(|| self.specific.get(&(reference, None)))
    }
}

fn lookup<'a>(
    map: &'a HashMap<Option<String>, MessageSource>,
    lang: Option<&str>,
) -> Option<&'a MessageSource> {
    lang.and_then(|lang| map.get(&Some(lang.to_string())))
        .or_else(|| map.get(&None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IssueKind, Value};

    fn issue() -> Issue {
        Issue {
            kind: IssueKind::Schema,
            issue_type: "string".to_string(),
            input: Value::Null,
            expected: Some("string".to_string()),
            received: "null".to_string(),
            message: String::new(),
            requirement: None,
            path: Vec::new(),
            issues: None,
        }
    }

    #[test]
    fn test_static_and_computed_sources() {
        assert_eq!(MessageSource::from("fixed").resolve(&issue()), "fixed");

        let computed = MessageSource::computed(|issue| format!("got {}", issue.received));
        assert_eq!(computed.resolve(&issue()), "got null");
    }

    #[test]
    fn test_catalog_prefers_language_then_neutral() {
        let catalog = MessageCatalog::new()
            .global("neutral", None)
            .global("allgemein", Some("de"));

        let de = catalog.global_message(Some("de")).unwrap();
        assert_eq!(de.resolve(&issue()), "allgemein");

        let fr = catalog.global_message(Some("fr")).unwrap();
        assert_eq!(fr.resolve(&issue()), "neutral");

        assert!(catalog.schema_message(None).is_none());
    }

    #[test]
    fn test_specific_messages_by_reference() {
        let catalog = MessageCatalog::new().specific("isrc", "bad code", Some("en"));

        assert!(catalog.specific_message("isrc", Some("en")).is_some());
        assert!(catalog.specific_message("isrc", None).is_none());
        assert!(catalog.specific_message("ksuid", Some("en")).is_none());
    }
}
