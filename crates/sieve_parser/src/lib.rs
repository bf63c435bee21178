//! Parser for declarative Sieve schema definitions (YAML/TOML/JSON formats).
//!
//! This module reads schema definitions from text or files into the
//! strongly-typed [`SchemaDef`] structure, which [`SchemaDef::build`] turns
//! into a runnable step tree.
//!
//! # Example
//!
//! ```rust
//! use sieve_core::{validate, RunConfig};
//! use sieve_parser::parse_yaml;
//!
//! let yaml = r#"
//! type: object
//! entries:
//!   name:
//!     type: string
//!     pipe:
//!       - type: min_length
//!         requirement: 2
//! "#;
//!
//! let definition = parse_yaml(yaml).expect("Failed to parse definition");
//! let schema = definition.build().unwrap();
//!
//! let input = serde_json::json!({ "name": "A" });
//! let dataset = validate(&schema, input, &RunConfig::default()).unwrap();
//! assert_eq!(dataset.issues.len(), 1);
//! ```

mod definition;
mod messages;

pub use definition::{ActionDef, ActionKind, SchemaDef, SchemaKind, UnknownKeys};
pub use messages::{LangMessages, MessagesDef, DEFAULT_LANG};

use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while loading or building a definition.
#[derive(Debug, Error)]
pub enum ParserError {
    /// YAML parsing or deserialization failed
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    /// TOML parsing or deserialization failed
    #[error("Failed to parse TOML: {0}")]
    TomlError(String),

    /// JSON parsing or deserialization failed
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File I/O error
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Unsupported file format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Invalid file extension
    #[error("Invalid or missing file extension")]
    InvalidExtension,

    /// The definition parsed but cannot be built into steps
    #[error("Invalid definition: {0}")]
    InvalidDefinition(#[from] sieve_core::SieveError),
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;

/// Supported definition file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionFormat {
    /// YAML format (.yml, .yaml)
    Yaml,
    /// TOML format (.toml)
    Toml,
    /// JSON format (.json)
    Json,
}

/// Parse a definition from a YAML string.
///
/// # Arguments
///
/// * `content` - The YAML string to parse
///
/// # Example
///
/// ```rust
/// use sieve_parser::{parse_yaml, SchemaKind};
///
/// let definition = parse_yaml("type: string").unwrap();
/// assert!(matches!(definition.kind, SchemaKind::String));
/// ```
pub fn parse_yaml(content: &str) -> Result<SchemaDef> {
    let definition: SchemaDef = serde_yaml_ng::from_str(content)?;
    Ok(definition)
}

/// Parse a definition from a TOML string.
///
/// Dates inside TOML definitions must be quoted RFC 3339 strings.
///
/// # Arguments
///
/// * `content` - The TOML string to parse
///
/// # Example
///
/// ```rust
/// use sieve_parser::parse_toml;
///
/// let toml = r#"
/// type = "array"
///
/// [item]
/// type = "number"
/// "#;
///
/// let definition = parse_toml(toml).unwrap();
/// assert_eq!(definition.member_count(), 0);
/// ```
pub fn parse_toml(content: &str) -> Result<SchemaDef> {
    let definition: SchemaDef =
        toml::from_str(content).map_err(|e| ParserError::TomlError(e.to_string()))?;
    Ok(definition)
}

/// Parse a definition from a JSON string.
///
/// # Arguments
///
/// * `content` - The JSON string to parse
pub fn parse_json(content: &str) -> Result<SchemaDef> {
    let definition: SchemaDef = serde_json::from_str(content)?;
    Ok(definition)
}

/// Detect the definition format from a file path based on its extension.
///
/// # Supported Extensions
///
/// * `.yaml`, `.yml` → `DefinitionFormat::Yaml`
/// * `.toml` → `DefinitionFormat::Toml`
/// * `.json` → `DefinitionFormat::Json`
///
/// # Errors
///
/// Returns `ParserError::InvalidExtension` if the file has no extension.
/// Returns `ParserError::UnsupportedFormat` if the extension is not recognized.
pub fn detect_format(path: &Path) -> Result<DefinitionFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(ParserError::InvalidExtension)?;

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(DefinitionFormat::Yaml),
        "toml" => Ok(DefinitionFormat::Toml),
        "json" => Ok(DefinitionFormat::Json),
        other => Err(ParserError::UnsupportedFormat(other.to_string())),
    }
}

/// Parse a definition from a file with automatic format detection.
///
/// # Example
///
/// ```no_run
/// use sieve_parser::parse_file;
/// use std::path::Path;
///
/// let definition = parse_file(Path::new("schemas/signup.yml")).unwrap();
/// let schema = definition.build().unwrap();
/// ```
pub fn parse_file(path: &Path) -> Result<SchemaDef> {
    let content = std::fs::read_to_string(path)?;
    let format = detect_format(path)?;
    debug!(path = %path.display(), ?format, "Parsing schema definition");

    match format {
        DefinitionFormat::Yaml => parse_yaml(&content),
        DefinitionFormat::Toml => parse_toml(&content),
        DefinitionFormat::Json => parse_json(&content),
    }
}

/// Parse a messages file from a YAML string.
pub fn parse_messages_yaml(content: &str) -> Result<MessagesDef> {
    Ok(serde_yaml_ng::from_str(content)?)
}

/// Parse a messages file with automatic format detection.
///
/// # Example
///
/// ```no_run
/// use sieve_core::RunConfig;
/// use sieve_parser::parse_messages_file;
/// use std::path::Path;
///
/// let messages = parse_messages_file(Path::new("messages/fr.yml")).unwrap();
/// let config = RunConfig::new().with_lang("fr").with_messages(messages.catalog());
/// ```
pub fn parse_messages_file(path: &Path) -> Result<MessagesDef> {
    let content = std::fs::read_to_string(path)?;
    let format = detect_format(path)?;
    debug!(path = %path.display(), ?format, "Parsing messages");

    match format {
        DefinitionFormat::Yaml => parse_messages_yaml(&content),
        DefinitionFormat::Toml => {
            toml::from_str(&content).map_err(|e| ParserError::TomlError(e.to_string()))
        }
        DefinitionFormat::Json => Ok(serde_json::from_str(&content)?),
    }
}
