//! Date range checks.

use super::validate_typed;
use chrono::{DateTime, SecondsFormat, Utc};
use sieve_core::{Dataset, IssueOverrides, Requirement, RunConfig, Step, StepInfo, Value};

/// Compares a date with an inclusive bound.
#[derive(Debug, Clone)]
pub struct DateBound {
    info: StepInfo,
    bound: DateTime<Utc>,
    at_least: bool,
}

fn json(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn new(step_type: &'static str, prefix: &str, bound: DateTime<Utc>, at_least: bool) -> DateBound {
    DateBound {
        info: StepInfo::validation(step_type)
            .expects(format!("{prefix}{}", json(&bound)))
            .requirement(Requirement::Value(Value::Date(bound))),
        bound,
        at_least,
    }
}

/// Requires a date on or after `bound`.
pub fn min_date(bound: DateTime<Utc>) -> DateBound {
    new("min_date", ">=", bound, true)
}

/// Requires a date on or before `bound`.
pub fn max_date(bound: DateTime<Utc>) -> DateBound {
    new("max_date", "<=", bound, false)
}

impl Step for DateBound {
    fn info(&self) -> &StepInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut StepInfo {
        &mut self.info
    }

    fn run(&self, dataset: Dataset, config: &RunConfig) -> Dataset {
        validate_typed(&self.info, "date", dataset, config, |dataset| {
            let Some(date) = dataset.value.as_date() else {
                return Some(IssueOverrides::default());
            };
            let passes = if self.at_least {
                *date >= self.bound
            } else {
                *date <= self.bound
            };
            (!passes).then(|| IssueOverrides::default().received(json(date)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::to_date;
    use crate::schemas::date;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use sieve_core::{pipe, validate};

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_min_date() {
        let schema = pipe!(date(), min_date(day(2024, 1, 1)));
        assert!(validate(&schema, day(2024, 1, 1), &RunConfig::default()).unwrap().is_valid());

        let dataset = validate(&schema, day(2023, 12, 31), &RunConfig::default()).unwrap();
        let issue = &dataset.issues[0];
        assert_eq!(issue.issue_type, "min_date");
        assert_eq!(issue.expected.as_deref(), Some(">=2024-01-01T00:00:00.000Z"));
        assert_eq!(issue.received, "2023-12-31T00:00:00.000Z");
        assert_eq!(
            issue.message,
            "Invalid date: Expected >=2024-01-01T00:00:00.000Z but received 2023-12-31T00:00:00.000Z"
        );
    }

    #[test]
    fn test_max_date_after_coercion() {
        let schema = pipe!(to_date(), max_date(day(2000, 1, 1)));
        assert!(validate(&schema, "1999-12-31", &RunConfig::default()).unwrap().is_valid());
        assert!(!validate(&schema, "2000-01-02", &RunConfig::default()).unwrap().is_valid());
    }
}
