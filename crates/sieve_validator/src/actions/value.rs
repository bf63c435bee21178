//! Numeric and ordered-value checks.

use super::validate_typed;
use chrono::SecondsFormat;
use sieve_core::{Dataset, IssueOverrides, Requirement, RunConfig, Step, StepInfo, Value};
use std::cmp::Ordering;

#[derive(Debug, Clone)]
enum Rule {
    Min(Value),
    Max(Value),
    Gt(Value),
    Lt(Value),
    MultipleOf(Value),
    Integer,
    Finite,
}

/// Checks the value against a bound or a numeric property.
#[derive(Debug, Clone)]
pub struct Bound {
    info: StepInfo,
    label: &'static str,
    rule: Rule,
}

/// Describes a value in `expected`/`received` text; dates as RFC 3339.
fn describe(value: &Value) -> String {
    match value {
        Value::Date(date) => date.to_rfc3339_opts(SecondsFormat::Millis, true),
        other => other.stringify(),
    }
}

fn compared(step_type: &'static str, prefix: &str, bound: Value, rule: fn(Value) -> Rule) -> Bound {
    Bound {
        info: StepInfo::validation(step_type)
            .expects(format!("{prefix}{}", describe(&bound)))
            .requirement(Requirement::Value(bound.clone())),
        label: "value",
        rule: rule(bound),
    }
}

/// Requires the value to be at least `bound`.
pub fn min_value(bound: impl Into<Value>) -> Bound {
    compared("min_value", ">=", bound.into(), Rule::Min)
}

/// Requires the value to be at most `bound`.
pub fn max_value(bound: impl Into<Value>) -> Bound {
    compared("max_value", "<=", bound.into(), Rule::Max)
}

pub fn gt_value(bound: impl Into<Value>) -> Bound {
    compared("gt_value", ">", bound.into(), Rule::Gt)
}

pub fn lt_value(bound: impl Into<Value>) -> Bound {
    compared("lt_value", "<", bound.into(), Rule::Lt)
}

pub fn multiple_of(divisor: impl Into<Value>) -> Bound {
    let divisor = divisor.into();
    Bound {
        info: StepInfo::validation("multiple_of")
            .expects(format!("%{}", describe(&divisor)))
            .requirement(Requirement::Value(divisor.clone())),
        label: "multiple",
        rule: Rule::MultipleOf(divisor),
    }
}

/// Requires a whole number.
pub fn integer() -> Bound {
    Bound {
        info: StepInfo::validation("integer").requirement(Requirement::Predicate("integer".into())),
        label: "integer",
        rule: Rule::Integer,
    }
}

/// Rejects infinities and NaN.
pub fn finite() -> Bound {
    Bound {
        info: StepInfo::validation("finite").requirement(Requirement::Predicate("finite".into())),
        label: "finite",
        rule: Rule::Finite,
    }
}

fn is_multiple(value: &Value, divisor: &Value) -> bool {
    match (value, divisor) {
        // wrapping_rem gives 0 for MIN % -1 where % would overflow
        (Value::Int(a), Value::Int(b)) => *b != 0 && a.wrapping_rem(*b) == 0,
        (Value::BigInt(a), Value::BigInt(b)) => *b != 0 && a.wrapping_rem(*b) == 0,
        (Value::Int(a), Value::BigInt(b)) => *b != 0 && i128::from(*a).wrapping_rem(*b) == 0,
        (Value::BigInt(a), Value::Int(b)) => *b != 0 && a.wrapping_rem(i128::from(*b)) == 0,
        (a, b) => match (a.as_float(), b.as_float()) {
            (Some(a), Some(b)) => b != 0.0 && a % b == 0.0,
            _ => false,
        },
    }
}

impl Bound {
    fn passes(&self, value: &Value) -> bool {
        let ordered = |bound: &Value, accept: fn(Ordering) -> bool| {
            value.compare(bound).is_some_and(accept)
        };
        match &self.rule {
            Rule::Min(bound) => ordered(bound, Ordering::is_ge),
            Rule::Max(bound) => ordered(bound, Ordering::is_le),
            Rule::Gt(bound) => ordered(bound, Ordering::is_gt),
            Rule::Lt(bound) => ordered(bound, Ordering::is_lt),
            Rule::MultipleOf(divisor) => is_multiple(value, divisor),
            Rule::Integer => match value {
                Value::Int(_) | Value::BigInt(_) => true,
                Value::Float(f) => f.is_finite() && f.fract() == 0.0,
                _ => false,
            },
            Rule::Finite => match value {
                Value::Int(_) | Value::BigInt(_) => true,
                Value::Float(f) => f.is_finite(),
                _ => false,
            },
        }
    }
}

impl Step for Bound {
    fn info(&self) -> &StepInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut StepInfo {
        &mut self.info
    }

    fn run(&self, dataset: Dataset, config: &RunConfig) -> Dataset {
        validate_typed(&self.info, self.label, dataset, config, |dataset| {
            (!self.passes(&dataset.value))
                .then(|| IssueOverrides::default().received(describe(&dataset.value)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::{bigint, number};
    use pretty_assertions::assert_eq;
    use sieve_core::{pipe, validate};

    fn run(step: Bound, value: impl Into<Value>) -> Dataset {
        validate(&pipe!(number(), step), value, &RunConfig::default()).unwrap()
    }

    #[test]
    fn test_min_and_max() {
        assert!(run(min_value(18), 18).is_valid());
        assert!(run(max_value(1.5), 1).is_valid());

        let dataset = run(min_value(18), 17.5);
        let issue = &dataset.issues[0];
        assert_eq!(issue.issue_type, "min_value");
        assert_eq!(issue.message, "Invalid value: Expected >=18 but received 17.5");
    }

    #[test]
    fn test_exclusive_bounds() {
        assert!(!run(gt_value(0), 0).is_valid());
        assert!(run(gt_value(0), 1).is_valid());
        assert!(!run(lt_value(10), 10).is_valid());
        assert_eq!(run(lt_value(10), 10).issues[0].expected.as_deref(), Some("<10"));
    }

    #[test]
    fn test_multiple_of() {
        assert!(run(multiple_of(5), 25).is_valid());
        assert!(run(multiple_of(0.5), 2.5).is_valid());

        let dataset = run(multiple_of(5), 7);
        assert_eq!(dataset.issues[0].message, "Invalid multiple: Expected %5 but received 7");

        let schema = pipe!(bigint(), multiple_of(Value::BigInt(3)));
        assert!(validate(&schema, Value::BigInt(9), &RunConfig::default()).unwrap().is_valid());
    }

    #[test]
    fn test_multiple_of_integer_extremes() {
        assert!(run(multiple_of(-1), i64::MIN).is_valid());
        assert!(!run(multiple_of(0), 4).is_valid());

        let schema = pipe!(bigint(), multiple_of(Value::BigInt(-1)));
        let dataset = validate(&schema, Value::BigInt(i128::MIN), &RunConfig::default()).unwrap();
        assert!(dataset.is_valid());

        let schema = pipe!(bigint(), multiple_of(-1));
        let dataset = validate(&schema, Value::BigInt(i128::MIN), &RunConfig::default()).unwrap();
        assert!(dataset.is_valid());
    }

    #[test]
    fn test_integer_and_finite() {
        assert!(run(integer(), 4.0).is_valid());
        assert_eq!(run(integer(), 4.2).issues[0].message, "Invalid integer: Received 4.2");
        assert!(run(finite(), 1e300).is_valid());
        assert!(!run(finite(), f64::INFINITY).is_valid());
    }

    #[test]
    fn test_constraints_accumulate() {
        let schema = pipe!(number(), min_value(10), multiple_of(3), integer());
        let dataset = validate(&schema, 4.5, &RunConfig::default()).unwrap();

        assert!(dataset.typed);
        let types: Vec<_> = dataset.issues.iter().map(|i| i.issue_type.as_str()).collect();
        assert_eq!(types, vec!["min_value", "multiple_of", "integer"]);
    }
}
