//! Issue model.
//!
//! An [`Issue`] describes one validation failure. Issues are plain data: they
//! are accumulated into the dataset of a run and handed back to the caller.
//! After creation only the path changes, and only by gaining a prefix as the
//! issue travels outward through enclosing structural schemas.

use crate::Value;
use serde::Serialize;
use std::fmt;

/// The two families of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    /// The value's type or shape does not match what a schema requires
    Schema,
    /// The value has the right shape but violates a constraint
    Validation,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::Schema => write!(f, "schema"),
            IssueKind::Validation => write!(f, "validation"),
        }
    }
}

/// Which container a path segment points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Structure {
    Object,
    Array,
    Tuple,
    Record,
}

/// Whether a segment addresses the member's value or the member's key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Value,
    Key,
}

/// A key or index inside a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathKey {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKey::Key(key) => write!(f, "{key}"),
            PathKey::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for PathKey {
    fn from(key: &str) -> Self {
        PathKey::Key(key.to_string())
    }
}

impl From<usize> for PathKey {
    fn from(index: usize) -> Self {
        PathKey::Index(index)
    }
}

/// One step from a container down to one of its members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathSegment {
    /// Container kind
    pub structure: Structure,
    /// Value or key of the member
    pub origin: Origin,
    /// Member key or index
    pub key: PathKey,
}

impl PathSegment {
    /// Segment addressing the value stored under `key`.
    pub fn value(structure: Structure, key: impl Into<PathKey>) -> Self {
        Self {
            structure,
            origin: Origin::Value,
            key: key.into(),
        }
    }

    /// Segment addressing the key itself.
    pub fn key(structure: Structure, key: impl Into<PathKey>) -> Self {
        Self {
            structure,
            origin: Origin::Key,
            key: key.into(),
        }
    }
}

/// The concrete comparison value, pattern or predicate that was violated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Requirement {
    /// Regular expression source
    Pattern(String),
    /// Bound or reference value
    Value(Value),
    /// Named predicate (opaque functions and built-in format checks)
    Predicate(String),
    /// Set of allowed values
    Options(Vec<Value>),
}

/// One structured validation failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    /// Schema or validation failure
    pub kind: IssueKind,
    /// Identifier of the check or schema that failed (e.g. `string`, `min_date`)
    #[serde(rename = "type")]
    pub issue_type: String,
    /// The offending value at the point of failure
    pub input: Value,
    /// What was required, when expressible as a single token
    pub expected: Option<String>,
    /// What was actually present
    pub received: String,
    /// Resolved user-facing text
    pub message: String,
    /// The violated requirement, for diagnostics and tooling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirement: Option<Requirement>,
    /// Segments from the root value down to the offending sub-value
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<PathSegment>,
    /// Sibling issues folded under this one (unions)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<Issue>>,
}

impl Issue {
    /// Prefixes the path with the segment of an enclosing container.
    pub fn prefix_path(&mut self, segment: PathSegment) {
        self.path.insert(0, segment);
    }

    /// Raw keys of the path, root first.
    pub fn keys(&self) -> Vec<&PathKey> {
        self.path.iter().map(|segment| &segment.key).collect()
    }

    /// Dot-joined path (`items.2.name`), or `None` for root-level issues.
    pub fn dot_path(&self) -> Option<String> {
        if self.path.is_empty() {
            return None;
        }
        Some(
            self.path
                .iter()
                .map(|segment| segment.key.to_string())
                .collect::<Vec<_>>()
                .join("."),
        )
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dot_path() {
            Some(path) => write!(f, "{} (at {})", self.message, path),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Builds the message used when no message source applies.
pub fn default_message(label: &str, expected: Option<&str>, received: &str) -> String {
    match expected {
        Some(expected) => format!("Invalid {label}: Expected {expected} but received {received}"),
        None => format!("Invalid {label}: Received {received}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn issue() -> Issue {
        Issue {
            kind: IssueKind::Validation,
            issue_type: "min_length".to_string(),
            input: Value::from("ab"),
            expected: Some(">=3".to_string()),
            received: "2".to_string(),
            message: "too short".to_string(),
            requirement: Some(Requirement::Value(Value::Int(3))),
            path: Vec::new(),
            issues: None,
        }
    }

    #[test]
    fn test_prefix_path_builds_outward() {
        let mut issue = issue();
        issue.prefix_path(PathSegment::value(Structure::Object, "b"));
        issue.prefix_path(PathSegment::value(Structure::Array, 2usize));

        assert_eq!(
            issue.keys(),
            vec![&PathKey::Index(2), &PathKey::Key("b".to_string())]
        );
        assert_eq!(issue.dot_path().as_deref(), Some("2.b"));
        assert_eq!(issue.to_string(), "too short (at 2.b)");
    }

    #[test]
    fn test_root_issue_has_no_dot_path() {
        assert_eq!(issue().dot_path(), None);
        assert_eq!(issue().to_string(), "too short");
    }

    #[test]
    fn test_default_message() {
        assert_eq!(
            default_message("type", Some("string"), "null"),
            "Invalid type: Expected string but received null"
        );
        assert_eq!(
            default_message("ISRC", None, "\" DE\""),
            "Invalid ISRC: Received \" DE\""
        );
    }

    #[test]
    fn test_issue_serializes_type_field() {
        let json = serde_json::to_value(issue()).unwrap();
        assert_eq!(json["type"], "min_length");
        assert_eq!(json["kind"], "validation");
        assert!(json.get("path").is_none());
    }
}
