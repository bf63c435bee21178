//! Length checks for strings, lists and maps.

use super::validate_typed;
use sieve_core::{Dataset, IssueOverrides, Requirement, RunConfig, Step, StepInfo, Value};

#[derive(Debug, Clone, Copy)]
enum Rule {
    Min,
    Max,
    Exact,
}

/// Compares the length of the value with a bound.
///
/// Strings are measured in characters.
#[derive(Debug, Clone)]
pub struct Length {
    info: StepInfo,
    rule: Rule,
    bound: usize,
}

fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::List(items) => Some(items.len()),
        Value::Map(map) => Some(map.len()),
        _ => None,
    }
}

fn new(step_type: &'static str, rule: Rule, bound: usize, expects: String) -> Length {
    Length {
        info: StepInfo::validation(step_type)
            .expects(expects)
            .requirement(Requirement::Value(Value::Int(bound as i64))),
        rule,
        bound,
    }
}

pub fn min_length(bound: usize) -> Length {
    new("min_length", Rule::Min, bound, format!(">={bound}"))
}

pub fn max_length(bound: usize) -> Length {
    new("max_length", Rule::Max, bound, format!("<={bound}"))
}

pub fn length(bound: usize) -> Length {
    new("length", Rule::Exact, bound, bound.to_string())
}

/// Requires at least one character, item or entry.
pub fn non_empty() -> Length {
    let mut step = new("non_empty", Rule::Min, 1, "!0".to_string());
    step.info.requirement = None;
    step
}

impl Step for Length {
    fn info(&self) -> &StepInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut StepInfo {
        &mut self.info
    }

    fn run(&self, dataset: Dataset, config: &RunConfig) -> Dataset {
        validate_typed(&self.info, "length", dataset, config, |dataset| {
            let Some(len) = length_of(&dataset.value) else {
                return Some(IssueOverrides::default());
            };
            let passes = match self.rule {
                Rule::Min => len >= self.bound,
                Rule::Max => len <= self.bound,
                Rule::Exact => len == self.bound,
            };
            (!passes).then(|| IssueOverrides::default().received(len.to_string()))
        })
    }
}
