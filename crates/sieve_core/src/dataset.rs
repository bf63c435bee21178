//! The value-in-flight of a validation run.

use crate::{Issue, PathSegment, RunConfig, Value};
use serde::Serialize;

/// Value plus validity state, threaded by value through every step.
///
/// A dataset handed to the root step is `Unknown`: untyped and without
/// issues. Every dataset a step returns is either typed, or carries at least
/// the issue that made it untyped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    /// Whether the value is known to have the expected shape
    pub typed: bool,
    /// The current value
    pub value: Value,
    /// Issues in detection order
    pub issues: Vec<Issue>,
}

/// Coarse state of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetStatus {
    /// Not yet inspected by any schema
    Unknown,
    /// Typed and free of issues
    Success,
    /// Correct shape, failed constraints
    Partial,
    /// Wrong shape
    Failure,
}

/// Result of splicing a member dataset into its container.
#[derive(Debug)]
pub struct Absorbed {
    /// The member's (possibly transformed) value
    pub value: Value,
    /// The run must stop now (`abort_early` and the member had issues)
    pub stop: bool,
}

impl Dataset {
    /// Wraps a raw input for the root step.
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            typed: false,
            value: value.into(),
            issues: Vec::new(),
        }
    }

    /// A dataset whose value already has the expected shape.
    pub fn typed(value: impl Into<Value>) -> Self {
        Self {
            typed: true,
            value: value.into(),
            issues: Vec::new(),
        }
    }

    /// Returns true if at least one issue was found.
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Returns true for the success case: typed and without issues.
    pub fn is_valid(&self) -> bool {
        self.typed && self.issues.is_empty()
    }

    /// Classifies the dataset.
    pub fn status(&self) -> DatasetStatus {
        match (self.typed, self.issues.is_empty()) {
            (true, true) => DatasetStatus::Success,
            (true, false) => DatasetStatus::Partial,
            (false, false) => DatasetStatus::Failure,
            (false, true) => DatasetStatus::Unknown,
        }
    }

    /// Appends issues found by a member run and returns the member value.
    ///
    /// Each issue's path gains `segment` as its new first element. The
    /// container becomes untyped when the member is untyped, or when the run
    /// stops because of `abort_early`.
    pub fn absorb(&mut self, segment: PathSegment, member: Dataset, config: &RunConfig) -> Absorbed {
        let mut stop = false;
        if member.has_issues() {
            self.issues.extend(member.issues.into_iter().map(|mut issue| {
                issue.prefix_path(segment.clone());
                issue
            }));
            if config.abort_early {
                self.typed = false;
                stop = true;
            }
        }
        if !member.typed {
            self.typed = false;
        }
        Absorbed {
            value: member.value,
            stop,
        }
    }

    /// Converts into the success value or the collected issues.
    pub fn into_result(self) -> Result<Value, Vec<Issue>> {
        if self.is_valid() {
            Ok(self.value)
        } else {
            Err(self.issues)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IssueKind, PathKey, Structure};
    use pretty_assertions::assert_eq;

    fn issue(issue_type: &str) -> Issue {
        Issue {
            kind: IssueKind::Validation,
            issue_type: issue_type.to_string(),
            input: Value::Null,
            expected: None,
            received: "null".to_string(),
            message: "m".to_string(),
            requirement: None,
            path: Vec::new(),
            issues: None,
        }
    }

    #[test]
    fn test_status() {
        assert_eq!(Dataset::new(1).status(), DatasetStatus::Unknown);
        assert_eq!(Dataset::typed(1).status(), DatasetStatus::Success);

        let mut partial = Dataset::typed(1);
        partial.issues.push(issue("min_value"));
        assert_eq!(partial.status(), DatasetStatus::Partial);

        let mut failure = Dataset::new(1);
        failure.issues.push(issue("string"));
        assert_eq!(failure.status(), DatasetStatus::Failure);
    }

    #[test]
    fn test_absorb_prefixes_paths() {
        let mut parent = Dataset::typed(Value::List(vec![]));
        let mut member = Dataset::typed("x");
        member.issues.push(issue("email"));

        let absorbed = parent.absorb(
            PathSegment::value(Structure::Array, 4usize),
            member,
            &RunConfig::default(),
        );

        assert!(!absorbed.stop);
        assert_eq!(absorbed.value, Value::from("x"));
        assert!(parent.typed);
        assert_eq!(parent.issues[0].keys(), vec![&PathKey::Index(4)]);
    }

    #[test]
    fn test_absorb_untyped_member_detypes_parent() {
        let mut parent = Dataset::typed(Value::List(vec![]));
        let mut member = Dataset::new(1);
        member.issues.push(issue("string"));

        parent.absorb(
            PathSegment::value(Structure::Array, 0usize),
            member,
            &RunConfig::default(),
        );

        assert!(!parent.typed);
    }

    #[test]
    fn test_absorb_stops_on_abort_early() {
        let mut parent = Dataset::typed(Value::List(vec![]));
        let mut member = Dataset::typed(1);
        member.issues.push(issue("min_value"));

        let absorbed = parent.absorb(
            PathSegment::value(Structure::Array, 0usize),
            member,
            &RunConfig::new().with_abort_early(true),
        );

        assert!(absorbed.stop);
        assert!(!parent.typed);
    }

    #[test]
    fn test_into_result() {
        assert_eq!(Dataset::typed(5).into_result(), Ok(Value::Int(5)));

        let mut failed = Dataset::new(5);
        failed.issues.push(issue("string"));
        assert_eq!(failed.into_result().unwrap_err().len(), 1);
    }
}
