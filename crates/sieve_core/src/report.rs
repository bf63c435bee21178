//! Helpers for presenting issues.

use crate::Issue;
use serde::Serialize;
use std::collections::BTreeMap;

/// Issue messages grouped by where they occurred.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlatIssues {
    /// Messages of root-level issues
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub root: Vec<String>,
    /// Messages keyed by dot path
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub nested: BTreeMap<String, Vec<String>>,
}

/// Groups issue messages by dot path.
pub fn flatten(issues: &[Issue]) -> FlatIssues {
    let mut flat = FlatIssues::default();
    for issue in issues {
        match issue.dot_path() {
            Some(path) => flat
                .nested
                .entry(path)
                .or_default()
                .push(issue.message.clone()),
            None => flat.root.push(issue.message.clone()),
        }
    }
    flat
}

/// Renders issues as one `× message` line each, followed by `  → at path`
/// when the issue has a path.
pub fn summarize(issues: &[Issue]) -> String {
    let mut lines = Vec::with_capacity(issues.len() * 2);
    for issue in issues {
        lines.push(format!("× {}", issue.message));
        if let Some(path) = issue.dot_path() {
            lines.push(format!("  → at {path}"));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IssueKind, PathSegment, Structure, Value};
    use pretty_assertions::assert_eq;

    fn issue(message: &str, path: Vec<PathSegment>) -> Issue {
        Issue {
            kind: IssueKind::Validation,
            issue_type: "check".to_string(),
            input: Value::Null,
            expected: None,
            received: "null".to_string(),
            message: message.to_string(),
            requirement: None,
            path,
            issues: None,
        }
    }

    fn sample() -> Vec<Issue> {
        vec![
            issue("passwords differ", vec![]),
            issue(
                "too short",
                vec![
                    PathSegment::value(Structure::Object, "users"),
                    PathSegment::value(Structure::Array, 1usize),
                    PathSegment::value(Structure::Object, "name"),
                ],
            ),
            issue(
                "not an email",
                vec![
                    PathSegment::value(Structure::Object, "users"),
                    PathSegment::value(Structure::Array, 1usize),
                    PathSegment::value(Structure::Object, "name"),
                ],
            ),
        ]
    }

    #[test]
    fn test_flatten_groups_by_path() {
        let flat = flatten(&sample());
        assert_eq!(flat.root, vec!["passwords differ".to_string()]);
        assert_eq!(
            flat.nested.get("users.1.name"),
            Some(&vec!["too short".to_string(), "not an email".to_string()])
        );
    }

    #[test]
    fn test_summarize() {
        assert_eq!(
            summarize(&sample()),
            "× passwords differ\n× too short\n  → at users.1.name\n× not an email\n  → at users.1.name"
        );
    }
}
