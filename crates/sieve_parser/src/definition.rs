//! Definition types and their translation into step trees.
//!
//! A definition mirrors the builder API of `sieve_validator`: every schema
//! is tagged by `type`, may carry a `pipe` of actions and a `message` that
//! replaces the default text of the issues it raises.
//!
//! Object entries are kept in a sorted map, so a built object checks its
//! members in key order.

use crate::Result;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sieve_core::{Pipe, Step, Value};
use sieve_validator::{
    any, array, bigint, boolean, cron, date, email, fallback, finite, gt_value, integer, isrc,
    ksuid, length, literal, lt_value, max_date, max_length, max_value, min_date, min_length,
    min_value, multiple_of, non_empty, null, nullable, number, object, optional, picklist, record,
    regex, string, to_bigint, to_date, to_number, to_string, trim, tuple, union, unknown, url,
    Extra,
};
use std::collections::BTreeMap;

/// A schema definition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SchemaDef {
    #[serde(flatten)]
    pub kind: SchemaKind,

    /// Actions run after the schema, in order
    #[serde(default)]
    pub pipe: Vec<ActionDef>,

    /// Replaces the default message of the schema's own issues
    #[serde(default)]
    pub message: Option<String>,
}

/// What a schema accepts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchemaKind {
    Unknown,
    Any,
    String,
    Number,
    Bigint,
    Boolean,
    Date,
    Null,
    Literal {
        value: serde_json::Value,
    },
    Picklist {
        options: Vec<serde_json::Value>,
    },
    Optional {
        wrapped: Box<SchemaDef>,
        #[serde(default)]
        default: Option<serde_json::Value>,
    },
    Nullable {
        wrapped: Box<SchemaDef>,
        #[serde(default)]
        default: Option<serde_json::Value>,
    },
    Fallback {
        wrapped: Box<SchemaDef>,
        value: serde_json::Value,
    },
    Object {
        entries: BTreeMap<String, SchemaDef>,
        #[serde(default)]
        unknown: UnknownKeys,
        /// Schema for undeclared members; takes precedence over `unknown`
        #[serde(default)]
        rest: Option<Box<SchemaDef>>,
    },
    Array {
        item: Box<SchemaDef>,
    },
    Tuple {
        items: Vec<SchemaDef>,
        #[serde(default)]
        unknown: UnknownKeys,
        #[serde(default)]
        rest: Option<Box<SchemaDef>>,
    },
    Record {
        key: Box<SchemaDef>,
        value: Box<SchemaDef>,
    },
    Union {
        options: Vec<SchemaDef>,
    },
}

/// Treatment of undeclared object members and extra tuple items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownKeys {
    #[default]
    Strip,
    Loose,
    Strict,
}

/// An action definition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActionDef {
    #[serde(flatten)]
    pub kind: ActionKind,

    #[serde(default)]
    pub message: Option<String>,
}

/// A validation, transformation or coercion inside a pipe.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    MinLength { requirement: usize },
    MaxLength { requirement: usize },
    Length { requirement: usize },
    NonEmpty,
    MinValue { requirement: serde_json::Value },
    MaxValue { requirement: serde_json::Value },
    GtValue { requirement: serde_json::Value },
    LtValue { requirement: serde_json::Value },
    MultipleOf { requirement: serde_json::Value },
    Integer,
    Finite,
    MinDate { requirement: DateTime<Utc> },
    MaxDate { requirement: DateTime<Utc> },
    Regex { pattern: String },
    Email,
    Url,
    Isrc,
    Ksuid,
    Cron,
    Trim,
    ToNumber,
    ToBigint,
    ToDate,
    ToString,
}

impl SchemaDef {
    /// Builds the step tree described by this definition.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::InvalidDefinition` if a `regex` pattern
    /// anywhere in the tree does not compile.
    pub fn build(&self) -> Result<Box<dyn Step>> {
        self.build_inheriting(None)
    }

    /// Builds with the message of an enclosing wrapper, which applies
    /// unless this definition carries its own.
    fn build_inheriting(&self, inherited: Option<&str>) -> Result<Box<dyn Step>> {
        let message = self.message.as_deref().or(inherited);
        let mut schema = self.kind.build(message)?;
        // Wrappers hand their message down to the wrapped schema
        if let Some(message) = message.filter(|_| !self.kind.is_wrapper()) {
            schema.info_mut().message = Some(message.into());
        }
        if self.pipe.is_empty() {
            return Ok(schema);
        }

        let mut pipe = Pipe::new(schema);
        for action in &self.pipe {
            pipe.push(action.build()?);
        }
        Ok(Box::new(pipe))
    }

    /// Number of declared members: object entries, tuple items or union
    /// options.
    pub fn member_count(&self) -> usize {
        match &self.kind {
            SchemaKind::Object { entries, .. } => entries.len(),
            SchemaKind::Tuple { items, .. } => items.len(),
            SchemaKind::Union { options } => options.len(),
            _ => 0,
        }
    }
}

fn build_all(definitions: &[SchemaDef]) -> Result<Vec<Box<dyn Step>>> {
    definitions.iter().map(SchemaDef::build).collect()
}

fn build_extra(unknown: UnknownKeys, rest: Option<&SchemaDef>) -> Result<Extra> {
    Ok(match (rest, unknown) {
        (Some(rest), _) => Extra::Rest(rest.build()?),
        (None, UnknownKeys::Strip) => Extra::Strip,
        (None, UnknownKeys::Loose) => Extra::Keep,
        (None, UnknownKeys::Strict) => Extra::Reject,
    })
}

impl SchemaKind {
    fn is_wrapper(&self) -> bool {
        matches!(
            self,
            SchemaKind::Optional { .. } | SchemaKind::Nullable { .. } | SchemaKind::Fallback { .. }
        )
    }

    fn build(&self, message: Option<&str>) -> Result<Box<dyn Step>> {
        let step = match self {
            SchemaKind::Unknown => unknown().boxed(),
            SchemaKind::Any => any().boxed(),
            SchemaKind::String => string().boxed(),
            SchemaKind::Number => number().boxed(),
            SchemaKind::Bigint => bigint().boxed(),
            SchemaKind::Boolean => boolean().boxed(),
            SchemaKind::Date => date().boxed(),
            SchemaKind::Null => null().boxed(),
            SchemaKind::Literal { value } => literal(value.clone()).boxed(),
            SchemaKind::Picklist { options } => picklist(options.iter().cloned()).boxed(),
            SchemaKind::Optional { wrapped, default } => {
                let schema = optional(wrapped.build_inheriting(message)?);
                match default {
                    Some(value) => schema.default(value.clone()).boxed(),
                    None => schema.boxed(),
                }
            }
            SchemaKind::Nullable { wrapped, default } => {
                let schema = nullable(wrapped.build_inheriting(message)?);
                match default {
                    Some(value) => schema.default(value.clone()).boxed(),
                    None => schema.boxed(),
                }
            }
            SchemaKind::Fallback { wrapped, value } => {
                fallback(wrapped.build_inheriting(message)?, value.clone()).boxed()
            }
            SchemaKind::Object { entries, unknown, rest } => {
                let mut schema = object().extra(build_extra(*unknown, rest.as_deref())?);
                for (key, definition) in entries {
                    schema = schema.entry_boxed(key.as_str(), definition.build()?);
                }
                schema.boxed()
            }
            SchemaKind::Array { item } => array(item.build()?).boxed(),
            SchemaKind::Tuple { items, unknown, rest } => tuple(build_all(items)?)
                .extra(build_extra(*unknown, rest.as_deref())?)
                .boxed(),
            SchemaKind::Record { key, value } => record(key.build()?, value.build()?).boxed(),
            SchemaKind::Union { options } => union(build_all(options)?).boxed(),
        };
        Ok(step)
    }
}

impl ActionDef {
    fn build(&self) -> Result<Box<dyn Step>> {
        let mut step = self.kind.build()?;
        if let Some(message) = &self.message {
            step.info_mut().message = Some(message.as_str().into());
        }
        Ok(step)
    }
}

impl ActionKind {
    fn build(&self) -> Result<Box<dyn Step>> {
        let bound = |json: &serde_json::Value| Value::from(json.clone());
        let step = match self {
            ActionKind::MinLength { requirement } => min_length(*requirement).boxed(),
            ActionKind::MaxLength { requirement } => max_length(*requirement).boxed(),
            ActionKind::Length { requirement } => length(*requirement).boxed(),
            ActionKind::NonEmpty => non_empty().boxed(),
            ActionKind::MinValue { requirement } => min_value(bound(requirement)).boxed(),
            ActionKind::MaxValue { requirement } => max_value(bound(requirement)).boxed(),
            ActionKind::GtValue { requirement } => gt_value(bound(requirement)).boxed(),
            ActionKind::LtValue { requirement } => lt_value(bound(requirement)).boxed(),
            ActionKind::MultipleOf { requirement } => multiple_of(bound(requirement)).boxed(),
            ActionKind::Integer => integer().boxed(),
            ActionKind::Finite => finite().boxed(),
            ActionKind::MinDate { requirement } => min_date(*requirement).boxed(),
            ActionKind::MaxDate { requirement } => max_date(*requirement).boxed(),
            ActionKind::Regex { pattern } => regex(pattern)?.boxed(),
            ActionKind::Email => email().boxed(),
            ActionKind::Url => url().boxed(),
            ActionKind::Isrc => isrc().boxed(),
            ActionKind::Ksuid => ksuid().boxed(),
            ActionKind::Cron => cron().boxed(),
            ActionKind::Trim => trim().boxed(),
            ActionKind::ToNumber => to_number().boxed(),
            ActionKind::ToBigint => to_bigint().boxed(),
            ActionKind::ToDate => to_date().boxed(),
            ActionKind::ToString => to_string().boxed(),
        };
        Ok(step)
    }
}
