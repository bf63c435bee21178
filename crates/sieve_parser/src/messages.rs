//! Message catalog definitions.
//!
//! A messages file maps a language tag to the texts registered for it. The
//! `default` entry holds the language-neutral texts used when the run's
//! language has no match:
//!
//! ```yaml
//! default:
//!   global: Invalid input
//! fr:
//!   schema: Type invalide
//!   specific:
//!     min_length: Trop court
//! ```

use serde::Deserialize;
use sieve_core::MessageCatalog;
use std::collections::BTreeMap;

/// Key of the language-neutral entry.
pub const DEFAULT_LANG: &str = "default";

/// Texts registered for one language.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LangMessages {
    /// Used by every step without a better match
    #[serde(default)]
    pub global: Option<String>,

    /// Used by schema steps
    #[serde(default)]
    pub schema: Option<String>,

    /// Keyed by step reference, e.g. `min_length` or `email`
    #[serde(default)]
    pub specific: BTreeMap<String, String>,
}

/// A parsed messages file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct MessagesDef {
    pub languages: BTreeMap<String, LangMessages>,
}

impl MessagesDef {
    /// Builds the catalog a run config carries.
    pub fn catalog(&self) -> MessageCatalog {
        self.languages
            .iter()
            .fold(MessageCatalog::new(), |catalog, (lang, messages)| {
                let lang = (lang != DEFAULT_LANG).then_some(lang.as_str());
                let catalog = match &messages.global {
                    Some(text) => catalog.global(text.as_str(), lang),
                    None => catalog,
                };
                let catalog = match &messages.schema {
                    Some(text) => catalog.schema(text.as_str(), lang),
                    None => catalog,
                };
                messages
                    .specific
                    .iter()
                    .fold(catalog, |catalog, (reference, text)| {
                        catalog.specific(reference.as_str(), text.as_str(), lang)
                    })
            })
    }
}

#[cfg(test)]
mod tests {
    use crate::parse_messages_yaml;
    use pretty_assertions::assert_eq;
    use sieve_core::{pipe, validate, RunConfig};
    use sieve_validator::{email, number, string};

    const MESSAGES: &str = r#"
default:
  global: Invalid input
  specific:
    email: Not an email
fr:
  schema: Type invalide
  specific:
    email: Adresse invalide
"#;

    fn config(lang: Option<&str>) -> RunConfig {
        let catalog = parse_messages_yaml(MESSAGES).unwrap().catalog();
        let config = RunConfig::new().with_messages(catalog);
        match lang {
            Some(lang) => config.with_lang(lang),
            None => config,
        }
    }

    fn first_message(dataset: sieve_core::Dataset) -> String {
        dataset.issues[0].message.clone()
    }

    #[test]
    fn test_specific_message_by_language() {
        let schema = pipe!(string(), email());

        let french = validate(&schema, "nope", &config(Some("fr"))).unwrap();
        let german = validate(&schema, "nope", &config(Some("de"))).unwrap();

        assert_eq!(first_message(french), "Adresse invalide");
        assert_eq!(first_message(german), "Not an email");
    }

    #[test]
    fn test_schema_and_global_messages() {
        let french = validate(&number(), "x", &config(Some("fr"))).unwrap();
        let neutral = validate(&number(), "x", &config(None)).unwrap();

        assert_eq!(first_message(french), "Type invalide");
        assert_eq!(first_message(neutral), "Invalid input");
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(parse_messages_yaml("fr:\n  globall: Oops\n").is_err());
    }
}
