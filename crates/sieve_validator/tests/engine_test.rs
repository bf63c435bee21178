//! Integration tests for the engine running realistic schemas.
//!
//! These cover accumulation, early aborts, nested paths, coercion and the
//! asynchronous entry points end to end.

use pretty_assertions::assert_eq;
use sieve_core::{
    flatten, is_valid, parse, parse_async, pipe, summarize, validate, validate_async,
    DatasetStatus, IssueKind, MessageCatalog, PathKey, RunConfig, SieveError, Step, Value,
};
use sieve_validator::{
    array, check_async, email, integer, isrc, max_length, min_length, min_value, number, object,
    optional, string, to_number, to_string, trim, tuple, union, unknown,
};
use std::collections::BTreeMap;
use std::time::Duration;

fn map(entries: Vec<(&str, Value)>) -> Value {
    Value::Map(
        entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect::<BTreeMap<_, _>>(),
    )
}

fn signup() -> impl Step {
    object()
        .entry("username", pipe!(string(), min_length(3), max_length(12)))
        .entry("email", pipe!(string(), email()))
        .entry("age", pipe!(to_number(), integer(), min_value(18)))
        .entry("tags", optional(array(pipe!(string(), min_length(2)))))
}

#[test]
fn test_valid_signup_is_normalized() {
    let input = map(vec![
        ("username", "ada".into()),
        ("email", "ada@example.com".into()),
        ("age", "36".into()),
        ("referrer", "newsletter".into()),
    ]);
    let value = parse(&signup(), input, &RunConfig::default()).unwrap();

    assert_eq!(
        value,
        map(vec![
            ("age", Value::Int(36)),
            ("email", "ada@example.com".into()),
            ("username", "ada".into()),
        ])
    );
}

#[test]
fn test_independent_violations_all_reported() {
    let input = map(vec![
        ("username", "ab".into()),
        ("email", "not-an-email".into()),
        ("age", 16.5.into()),
        ("tags", Value::List(vec!["ok".into(), "x".into()])),
    ]);
    let dataset = validate(&signup(), input, &RunConfig::default()).unwrap();

    assert_eq!(dataset.status(), DatasetStatus::Partial);
    let found: Vec<(String, &str)> = dataset
        .issues
        .iter()
        .map(|i| (i.dot_path().unwrap_or_default(), i.issue_type.as_str()))
        .collect();
    assert_eq!(
        found,
        vec![
            ("username".to_string(), "min_length"),
            ("email".to_string(), "email"),
            ("age".to_string(), "integer"),
            ("age".to_string(), "min_value"),
            ("tags.1".to_string(), "min_length"),
        ]
    );
}

#[test]
fn test_abort_early_reports_exactly_one_issue() {
    let input = map(vec![
        ("username", "ab".into()),
        ("email", "not-an-email".into()),
        ("age", 16.into()),
    ]);
    let config = RunConfig::new().with_abort_early(true);
    let dataset = validate(&signup(), input, &config).unwrap();

    assert!(!dataset.typed);
    assert_eq!(dataset.issues.len(), 1);
    assert_eq!(dataset.issues[0].dot_path().as_deref(), Some("username"));
}

#[test]
fn test_abort_pipe_early_untypes_regardless_of_skipped_checks() {
    let config = RunConfig::new().with_abort_pipe_early(true);
    let short = pipe!(string(), min_length(5), trim());
    let with_skipped = pipe!(string(), min_length(5), max_length(1), trim());

    let a = validate(&short, "abc", &config).unwrap();
    let b = validate(&with_skipped, "abc", &config).unwrap();

    assert!(!a.typed);
    assert!(!b.typed);
    assert_eq!(a.status(), b.status());
    assert_eq!(b.status(), DatasetStatus::Failure);
    assert_eq!(b.issues.len(), 1);
}

#[test]
fn test_nested_path_order() {
    let schema = array(object().entry("b", number()));
    let input = Value::List(vec![
        map(vec![("b", 1.into())]),
        map(vec![("b", 2.into())]),
        map(vec![("b", "three".into())]),
    ]);
    let dataset = validate(&schema, input, &RunConfig::default()).unwrap();

    assert_eq!(dataset.issues.len(), 1);
    assert_eq!(
        dataset.issues[0].keys(),
        vec![&PathKey::Index(2), &PathKey::Key("b".into())]
    );
    assert_eq!(flatten(&dataset.issues).nested.keys().collect::<Vec<_>>(), vec!["2.b"]);
}

#[test]
fn test_untyped_dataset_short_circuits_pipe() {
    let schema = pipe!(string(), min_length(3), email());
    let dataset = validate(&schema, 42, &RunConfig::default()).unwrap();

    assert!(!dataset.typed);
    assert_eq!(dataset.issues.len(), 1);
    assert_eq!(dataset.issues[0].kind, IssueKind::Schema);
}

#[test]
fn test_null_to_string_yields_one_schema_issue() {
    let schema = pipe!(unknown(), to_string(), email());
    let dataset = validate(&schema, Value::Null, &RunConfig::default()).unwrap();

    assert!(!dataset.typed);
    assert_eq!(dataset.issues.len(), 1);
    assert_eq!(dataset.issues[0].kind, IssueKind::Schema);
}

#[test]
fn test_isrc_with_leading_space() {
    let schema = pipe!(string(), isrc());
    let dataset = validate(&schema, " DE-U67-17-03268", &RunConfig::default()).unwrap();

    assert_eq!(dataset.issues.len(), 1);
    let issue = &dataset.issues[0];
    assert_eq!(issue.kind, IssueKind::Validation);
    assert_eq!(issue.issue_type, "isrc");
    assert_eq!(issue.expected, None);
    assert_eq!(issue.received, "\" DE-U67-17-03268\"");
}

#[test]
fn test_coercion_is_identity_on_typed_values() {
    for value in [Value::Int(3), Value::Float(2.5)] {
        let dataset = validate(&pipe!(to_number()), value.clone(), &RunConfig::default()).unwrap();
        assert!(dataset.is_valid());
        assert_eq!(dataset.value, value);
    }
}

#[test]
fn test_is_valid_and_parse_errors() {
    let schema = tuple(vec![string().boxed(), number().boxed()]);
    assert!(is_valid(&schema, Value::List(vec!["a".into(), 1.into()])).unwrap());
    assert!(!is_valid(&schema, Value::List(vec![])).unwrap());

    let err = parse(&schema, "nope", &RunConfig::default()).unwrap_err();
    assert!(matches!(err, SieveError::Invalid { ref issues } if issues.len() == 1));
}

#[test]
fn test_catalog_messages_by_language() {
    let catalog = MessageCatalog::new()
        .specific("min_length", "trop court", Some("fr"))
        .schema("type invalide", Some("fr"));
    let config = RunConfig::new().with_lang("fr").with_messages(catalog);

    let schema = object().entry("name", pipe!(string(), min_length(3)));
    let dataset = validate(&schema, map(vec![("name", "a".into())]), &config).unwrap();
    assert_eq!(dataset.issues[0].message, "trop court");

    let dataset = validate(&schema, map(vec![("name", 1.into())]), &config).unwrap();
    assert_eq!(dataset.issues[0].message, "type invalide");
}

#[test]
fn test_summary_lists_paths() {
    let input = map(vec![("username", "ab".into()), ("email", "x@example.com".into()), ("age", 20.into())]);
    let dataset = validate(&signup(), input, &RunConfig::default()).unwrap();
    assert_eq!(
        summarize(&dataset.issues),
        "× Invalid length: Expected >=3 but received 2\n  → at username"
    );
}

fn available_username() -> impl Step {
    pipe!(
        string(),
        min_length(3),
        check_async(|value: Value| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            value.as_str() != Some("admin")
        })
    )
}

#[tokio::test]
async fn test_async_members_merge_in_declaration_order() {
    let schema = object()
        .entry("owner", available_username())
        .entry("backup", available_username())
        .entry("email", pipe!(string(), email()));
    let input = map(vec![
        ("owner", "admin".into()),
        ("backup", "admin".into()),
        ("email", "bad".into()),
    ]);

    let dataset = validate_async(&schema, input, &RunConfig::default()).await;
    let paths: Vec<_> = dataset.issues.iter().filter_map(|i| i.dot_path()).collect();
    assert_eq!(paths, vec!["owner", "backup", "email"]);
}

#[tokio::test]
async fn test_async_union_and_parse() {
    let schema = union(vec![available_username().boxed(), number().boxed()]);
    assert!(schema.info().is_async);

    assert_eq!(
        parse_async(&schema, 7, &RunConfig::default()).await.unwrap(),
        Value::Int(7)
    );
    let err = parse_async(&schema, "admin", &RunConfig::default()).await.unwrap_err();
    assert_eq!(err.issues()[0].issue_type, "check");
    assert!(validate(&schema, 7, &RunConfig::default()).is_err());
}
