//! The step contract shared by schemas and actions.
//!
//! A step consumes a [`Dataset`] and returns a [`Dataset`]. Schemas narrow an
//! unknown value to a shape, validations check constraints on an already
//! typed value, and transformations replace the value.

use crate::issue::default_message;
use crate::{Dataset, Issue, IssueKind, MessageSource, PathSegment, Requirement, RunConfig, Value};
use async_trait::async_trait;
use std::fmt;

/// Category of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Checks the type or shape of a value
    Schema,
    /// Checks a constraint on a typed value
    Validation,
    /// Replaces the value
    Transformation,
}

impl StepKind {
    /// The kind of issue a failure of this step produces.
    ///
    /// A failed transformation leaves a value of the wrong shape behind, so
    /// it is reported like a schema mismatch.
    pub fn issue_kind(self) -> IssueKind {
        match self {
            StepKind::Schema | StepKind::Transformation => IssueKind::Schema,
            StepKind::Validation => IssueKind::Validation,
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::Schema => write!(f, "schema"),
            StepKind::Validation => write!(f, "validation"),
            StepKind::Transformation => write!(f, "transformation"),
        }
    }
}

/// Static metadata of a step.
#[derive(Debug, Clone)]
pub struct StepInfo {
    pub kind: StepKind,
    /// Identifier reported as the issue type (e.g. `string`, `min_length`)
    pub step_type: &'static str,
    /// Name of the constructor that produced the step
    pub reference: &'static str,
    /// Static description of the requirement
    pub expects: Option<String>,
    /// Message source for issues raised by this step
    pub message: Option<MessageSource>,
    /// The concrete requirement, copied into issues
    pub requirement: Option<Requirement>,
    /// Must be run through the awaiting entry point
    pub is_async: bool,
}

impl StepInfo {
    /// Metadata for a step whose reference equals its type.
    pub fn new(kind: StepKind, step_type: &'static str) -> Self {
        Self {
            kind,
            step_type,
            reference: step_type,
            expects: None,
            message: None,
            requirement: None,
            is_async: false,
        }
    }

    pub fn schema(step_type: &'static str) -> Self {
        Self::new(StepKind::Schema, step_type)
    }

    pub fn validation(step_type: &'static str) -> Self {
        Self::new(StepKind::Validation, step_type)
    }

    pub fn transformation(step_type: &'static str) -> Self {
        Self::new(StepKind::Transformation, step_type)
    }

    pub fn reference(mut self, reference: &'static str) -> Self {
        self.reference = reference;
        self
    }

    pub fn expects(mut self, expects: impl Into<String>) -> Self {
        self.expects = Some(expects.into());
        self
    }

    pub fn requirement(mut self, requirement: Requirement) -> Self {
        self.requirement = Some(requirement);
        self
    }

    pub fn asynchronous(mut self, is_async: bool) -> Self {
        self.is_async = is_async;
        self
    }
}

/// How a structural schema treats a member that is absent from its input.
#[derive(Debug, Clone, PartialEq)]
pub enum Missing {
    /// Absence is an issue
    Required,
    /// Absence is allowed, nothing is written
    Skip,
    /// Absence is allowed, the value is run through the step
    Default(Value),
}

/// The uniform unit of validation and transformation logic.
///
/// Steps are immutable: all state of a run lives in the dataset and the
/// config, so one step value can serve any number of concurrent runs.
#[async_trait]
pub trait Step: Send + Sync + fmt::Debug {
    /// Static metadata.
    fn info(&self) -> &StepInfo;

    /// Mutable metadata, used by the builder methods.
    fn info_mut(&mut self) -> &mut StepInfo;

    /// Runs the step synchronously.
    fn run(&self, dataset: Dataset, config: &RunConfig) -> Dataset;

    /// Runs the step, suspending where a member needs to.
    async fn run_async(&self, dataset: Dataset, config: &RunConfig) -> Dataset {
        self.run(dataset, config)
    }

    /// Treatment of this step's member when absent from a container.
    fn missing(&self) -> Missing {
        Missing::Required
    }

    /// Attaches a message source to the step.
    fn message(mut self, message: impl Into<MessageSource>) -> Self
    where
        Self: Sized,
    {
        self.info_mut().message = Some(message.into());
        self
    }

    /// Boxes the step for heterogeneous composition.
    fn boxed(self) -> Box<dyn Step>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
}

/// A boxed step.
pub type BoxedStep = Box<dyn Step>;

#[async_trait]
impl<S: Step + ?Sized> Step for Box<S> {
    fn info(&self) -> &StepInfo {
        (**self).info()
    }

    fn info_mut(&mut self) -> &mut StepInfo {
        (**self).info_mut()
    }

    fn run(&self, dataset: Dataset, config: &RunConfig) -> Dataset {
        (**self).run(dataset, config)
    }

    async fn run_async(&self, dataset: Dataset, config: &RunConfig) -> Dataset {
        (**self).run_async(dataset, config).await
    }

    fn missing(&self) -> Missing {
        (**self).missing()
    }
}

/// Per-call replacements for the values an issue would otherwise take from
/// the step and dataset.
#[derive(Debug, Default, Clone)]
pub struct IssueOverrides {
    pub input: Option<Value>,
    pub expected: Option<String>,
    pub received: Option<String>,
    pub path: Option<Vec<PathSegment>>,
    pub issues: Option<Vec<Issue>>,
}

impl IssueOverrides {
    pub fn input(mut self, input: impl Into<Value>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    pub fn received(mut self, received: impl Into<String>) -> Self {
        self.received = Some(received.into());
        self
    }

    pub fn path(mut self, path: Vec<PathSegment>) -> Self {
        self.path = Some(path);
        self
    }

    pub fn issues(mut self, issues: Vec<Issue>) -> Self {
        self.issues = Some(issues);
        self
    }
}

/// Builds an issue from step metadata, the dataset's current value and
/// per-call overrides, and resolves its message.
///
/// Message resolution order: the step's own message, the catalog message
/// registered for the step's reference, the catalog schema message (schema
/// kind only), the config message, the catalog global message, and finally
/// the default `Invalid <label>: ...` text.
pub fn create_issue(
    info: &StepInfo,
    label: &str,
    dataset: &Dataset,
    config: &RunConfig,
    overrides: IssueOverrides,
) -> Issue {
    let input = overrides.input.unwrap_or_else(|| dataset.value.clone());
    let received = overrides.received.unwrap_or_else(|| input.stringify());
    let expected = overrides.expected.or_else(|| info.expects.clone());
    let kind = info.kind.issue_kind();

    let mut issue = Issue {
        kind,
        issue_type: info.step_type.to_string(),
        input,
        expected,
        received,
        message: String::new(),
        requirement: info.requirement.clone(),
        path: overrides.path.unwrap_or_default(),
        issues: overrides.issues,
    };

    let lang = config.lang.as_deref();
    let catalog = config.messages.as_deref();
    let source = info
        .message
        .as_ref()
        .or_else(|| catalog.and_then(|c| c.specific_message(info.reference, lang)))
        .or_else(|| match kind {
            IssueKind::Schema => catalog.and_then(|c| c.schema_message(lang)),
            IssueKind::Validation => None,
        })
        .or(config.message.as_ref())
        .or_else(|| catalog.and_then(|c| c.global_message(lang)));

    issue.message = match source {
        Some(source) => source.resolve(&issue),
        None => default_message(label, issue.expected.as_deref(), &issue.received),
    };
    issue
}

/// Creates an issue and appends it to the dataset.
///
/// Schema-kind failures (including failed transformations) mark the dataset
/// untyped; validation-kind failures leave `typed` alone so later constraint
/// checks keep running against a value of the right shape.
pub fn add_issue(
    info: &StepInfo,
    label: &str,
    dataset: &mut Dataset,
    config: &RunConfig,
    overrides: IssueOverrides,
) {
    let issue = create_issue(info, label, dataset, config, overrides);
    if issue.kind == IssueKind::Schema {
        dataset.typed = false;
    }
    dataset.issues.push(issue);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MessageCatalog;
    use pretty_assertions::assert_eq;

    fn string_info() -> StepInfo {
        StepInfo::schema("string").expects("string")
    }

    #[test]
    fn test_schema_issue_detypes() {
        let mut dataset = Dataset::new(Value::Null);
        add_issue(
            &string_info(),
            "type",
            &mut dataset,
            &RunConfig::default(),
            IssueOverrides::default(),
        );

        assert!(!dataset.typed);
        let issue = &dataset.issues[0];
        assert_eq!(issue.kind, IssueKind::Schema);
        assert_eq!(issue.issue_type, "string");
        assert_eq!(issue.expected.as_deref(), Some("string"));
        assert_eq!(issue.received, "null");
        assert_eq!(issue.message, "Invalid type: Expected string but received null");
    }

    #[test]
    fn test_validation_issue_keeps_typed() {
        let info = StepInfo::validation("isrc").requirement(Requirement::Pattern("^x$".into()));
        let mut dataset = Dataset::typed("y");
        add_issue(&info, "ISRC", &mut dataset, &RunConfig::default(), IssueOverrides::default());

        assert!(dataset.typed);
        assert_eq!(dataset.issues[0].expected, None);
        assert_eq!(dataset.issues[0].received, "\"y\"");
        assert_eq!(dataset.issues[0].message, "Invalid ISRC: Received \"y\"");
        assert_eq!(
            dataset.issues[0].requirement,
            Some(Requirement::Pattern("^x$".into()))
        );
    }

    #[test]
    fn test_transformation_issue_is_schema_kind() {
        let info = StepInfo::transformation("to_number");
        let mut dataset = Dataset::typed("abc");
        add_issue(&info, "number", &mut dataset, &RunConfig::default(), IssueOverrides::default());

        assert!(!dataset.typed);
        assert_eq!(dataset.issues[0].kind, IssueKind::Schema);
    }

    #[test]
    fn test_overrides_replace_defaults() {
        let mut dataset = Dataset::typed("abc");
        let overrides = IssueOverrides::default()
            .input(Value::Int(3))
            .expected(">=5")
            .received("3");
        add_issue(
            &StepInfo::validation("min_length"),
            "length",
            &mut dataset,
            &RunConfig::default(),
            overrides,
        );

        let issue = &dataset.issues[0];
        assert_eq!(issue.input, Value::Int(3));
        assert_eq!(issue.message, "Invalid length: Expected >=5 but received 3");
    }

    #[test]
    fn test_message_resolution_order() {
        let catalog = MessageCatalog::new()
            .global("global", None)
            .schema("schema", None)
            .specific("string", "specific", Some("en"));
        let dataset = Dataset::new(Value::Null);

        let config = RunConfig::new()
            .with_lang("en")
            .with_message("config")
            .with_messages(catalog);

        let mut info = string_info();
        info.message = Some("own".into());
        let issue = create_issue(&info, "type", &dataset, &config, IssueOverrides::default());
        assert_eq!(issue.message, "own");

        let issue = create_issue(&string_info(), "type", &dataset, &config, IssueOverrides::default());
        assert_eq!(issue.message, "specific");

        let config = config.with_lang("fr");
        let issue = create_issue(&string_info(), "type", &dataset, &config, IssueOverrides::default());
        assert_eq!(issue.message, "schema");

        let info = StepInfo::validation("email");
        let issue = create_issue(&info, "email", &dataset, &config, IssueOverrides::default());
        assert_eq!(issue.message, "config");

        let config = RunConfig::new().with_messages(MessageCatalog::new().global("global", None));
        let issue = create_issue(&info, "email", &dataset, &config, IssueOverrides::default());
        assert_eq!(issue.message, "global");
    }

    #[test]
    fn test_computed_message_sees_issue() {
        let mut info = string_info();
        info.message = Some(MessageSource::computed(|issue| {
            format!("{} wanted, {} given", issue.expected.as_deref().unwrap_or("?"), issue.received)
        }));
        let issue = create_issue(
            &info,
            "type",
            &Dataset::new(5),
            &RunConfig::default(),
            IssueOverrides::default(),
        );
        assert_eq!(issue.message, "string wanted, 5 given");
    }
}
