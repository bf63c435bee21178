//! Primitive schemas.
//!
//! Each schema narrows an unknown value to one type. A value of the right
//! type marks the dataset typed; anything else adds a single schema issue.

use sieve_core::{
    add_issue, Dataset, IssueOverrides, Requirement, RunConfig, Step, StepInfo, Value,
};
use std::cmp::Ordering;

/// A schema accepting the values its predicate accepts.
#[derive(Debug, Clone)]
pub struct TypeSchema {
    info: StepInfo,
    accepts: fn(&Value) -> bool,
}

impl TypeSchema {
    fn new(step_type: &'static str, expects: &str, accepts: fn(&Value) -> bool) -> Self {
        Self {
            info: StepInfo::schema(step_type).expects(expects),
            accepts,
        }
    }
}

impl Step for TypeSchema {
    fn info(&self) -> &StepInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut StepInfo {
        &mut self.info
    }

    fn run(&self, mut dataset: Dataset, config: &RunConfig) -> Dataset {
        if (self.accepts)(&dataset.value) {
            dataset.typed = true;
        } else {
            add_issue(&self.info, "type", &mut dataset, config, IssueOverrides::default());
        }
        dataset
    }
}

/// Accepts any value; the usual base of a coercion pipe.
pub fn unknown() -> TypeSchema {
    TypeSchema::new("unknown", "unknown", |_| true)
}

/// Accepts any value.
pub fn any() -> TypeSchema {
    TypeSchema::new("any", "any", |_| true)
}

pub fn string() -> TypeSchema {
    TypeSchema::new("string", "string", |v| matches!(v, Value::String(_)))
}

/// Accepts integers and floats, but not NaN.
pub fn number() -> TypeSchema {
    TypeSchema::new("number", "number", |v| match v {
        Value::Int(_) => true,
        Value::Float(f) => !f.is_nan(),
        _ => false,
    })
}

pub fn bigint() -> TypeSchema {
    TypeSchema::new("bigint", "bigint", |v| matches!(v, Value::BigInt(_)))
}

pub fn boolean() -> TypeSchema {
    TypeSchema::new("boolean", "boolean", |v| matches!(v, Value::Bool(_)))
}

pub fn date() -> TypeSchema {
    TypeSchema::new("date", "Date", |v| matches!(v, Value::Date(_)))
}

pub fn null() -> TypeSchema {
    TypeSchema::new("null", "null", Value::is_null)
}

/// Accepts exactly one value.
#[derive(Debug, Clone)]
pub struct Literal {
    info: StepInfo,
    literal: Value,
}

/// Equality for literals and options: `Int` and `Float` holding the same
/// number are equal, `BigInt` stays its own kind.
fn same_value(value: &Value, expected: &Value) -> bool {
    match (value, expected) {
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            value.compare(expected) == Some(Ordering::Equal)
        }
        _ => value == expected,
    }
}

pub fn literal(literal: impl Into<Value>) -> Literal {
    let literal = literal.into();
    Literal {
        info: StepInfo::schema("literal")
            .expects(literal.stringify())
            .requirement(Requirement::Value(literal.clone())),
        literal,
    }
}

impl Step for Literal {
    fn info(&self) -> &StepInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut StepInfo {
        &mut self.info
    }

    fn run(&self, mut dataset: Dataset, config: &RunConfig) -> Dataset {
        if same_value(&dataset.value, &self.literal) {
            dataset.typed = true;
        } else {
            add_issue(&self.info, "type", &mut dataset, config, IssueOverrides::default());
        }
        dataset
    }
}

/// Accepts one of a fixed set of values.
#[derive(Debug, Clone)]
pub struct Picklist {
    info: StepInfo,
    options: Vec<Value>,
}

pub fn picklist<T: Into<Value>>(options: impl IntoIterator<Item = T>) -> Picklist {
    let options: Vec<Value> = options.into_iter().map(Into::into).collect();
    let expects = options
        .iter()
        .map(Value::stringify)
        .collect::<Vec<_>>()
        .join(" | ");
    Picklist {
        info: StepInfo::schema("picklist")
            .expects(if expects.is_empty() { "never".to_string() } else { expects })
            .requirement(Requirement::Options(options.clone())),
        options,
    }
}

impl Step for Picklist {
    fn info(&self) -> &StepInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut StepInfo {
        &mut self.info
    }

    fn run(&self, mut dataset: Dataset, config: &RunConfig) -> Dataset {
        if self.options.iter().any(|option| same_value(&dataset.value, option)) {
            dataset.typed = true;
        } else {
            add_issue(&self.info, "type", &mut dataset, config, IssueOverrides::default());
        }
        dataset
    }
}
