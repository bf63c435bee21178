//! Host-supplied checks and transformations.

use super::validate_typed;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use sieve_core::{
    add_issue, Dataset, IssueOverrides, Requirement, RunConfig, RunContext, Step, StepInfo, Value,
};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

type Predicate = dyn Fn(&Value) -> bool + Send + Sync;
type AsyncPredicate = dyn Fn(Value) -> BoxFuture<'static, bool> + Send + Sync;
type Operation = dyn Fn(Value, &RunContext) -> Value + Send + Sync;

/// Validates the value with a predicate.
#[derive(Clone)]
pub struct Check {
    info: StepInfo,
    predicate: Arc<Predicate>,
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Check").field("info", &self.info).finish_non_exhaustive()
    }
}

/// Passes when `predicate` returns true.
pub fn check(predicate: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Check {
    Check {
        info: StepInfo::validation("check").requirement(Requirement::Predicate("check".into())),
        predicate: Arc::new(predicate),
    }
}

impl Step for Check {
    fn info(&self) -> &StepInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut StepInfo {
        &mut self.info
    }

    fn run(&self, dataset: Dataset, config: &RunConfig) -> Dataset {
        validate_typed(&self.info, "input", dataset, config, |dataset| {
            (!(self.predicate)(&dataset.value)).then(IssueOverrides::default)
        })
    }
}

/// Validates the value with a predicate that may suspend, such as a lookup
/// against an external service.
#[derive(Clone)]
pub struct CheckAsync {
    info: StepInfo,
    predicate: Arc<AsyncPredicate>,
}

impl fmt::Debug for CheckAsync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckAsync").field("info", &self.info).finish_non_exhaustive()
    }
}

/// Passes when the future returned by `predicate` resolves to true.
///
/// The step is asynchronous: any pipe or schema containing it must be run
/// with `validate_async` or `parse_async`.
pub fn check_async<F, Fut>(predicate: F) -> CheckAsync
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    CheckAsync {
        info: StepInfo::validation("check")
            .reference("check_async")
            .requirement(Requirement::Predicate("check".into()))
            .asynchronous(true),
        predicate: Arc::new(move |value| predicate(value).boxed()),
    }
}

#[async_trait]
impl Step for CheckAsync {
    fn info(&self) -> &StepInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut StepInfo {
        &mut self.info
    }

    /// # Panics
    ///
    /// Always: the predicate can only be awaited.
    fn run(&self, _dataset: Dataset, _config: &RunConfig) -> Dataset {
        panic!("check_async must be run through validate_async or parse_async");
    }

    async fn run_async(&self, mut dataset: Dataset, config: &RunConfig) -> Dataset {
        if dataset.typed && !(self.predicate)(dataset.value.clone()).await {
            add_issue(&self.info, "input", &mut dataset, config, IssueOverrides::default());
        }
        dataset
    }
}

/// Replaces the value with the result of an operation.
#[derive(Clone)]
pub struct Transform {
    info: StepInfo,
    operation: Arc<Operation>,
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform").field("info", &self.info).finish_non_exhaustive()
    }
}

pub fn transform(operation: impl Fn(Value) -> Value + Send + Sync + 'static) -> Transform {
    transform_with_context(move |value, _| operation(value))
}

/// Like [`transform`], with access to the run's shared context.
pub fn transform_with_context(
    operation: impl Fn(Value, &RunContext) -> Value + Send + Sync + 'static,
) -> Transform {
    Transform {
        info: StepInfo::transformation("transform"),
        operation: Arc::new(operation),
    }
}

/// Removes leading and trailing whitespace from strings.
pub fn trim() -> Transform {
    let mut step = transform(|value| match value {
        Value::String(s) => Value::String(s.trim().to_string()),
        other => other,
    });
    step.info.step_type = "trim";
    step.info.reference = "trim";
    step
}

impl Step for Transform {
    fn info(&self) -> &StepInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut StepInfo {
        &mut self.info
    }

    fn run(&self, mut dataset: Dataset, config: &RunConfig) -> Dataset {
        let value = std::mem::replace(&mut dataset.value, Value::Null);
        dataset.value = (self.operation)(value, &config.context);
        dataset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::min_length;
    use crate::schemas::{number, object, string};
    use pretty_assertions::assert_eq;
    use sieve_core::{pipe, validate, validate_async, SieveError};
    use std::collections::BTreeMap;

    #[test]
    fn test_check() {
        let even = pipe!(number(), check(|v| v.as_int().is_some_and(|i| i % 2 == 0)));
        assert!(validate(&even, 4, &RunConfig::default()).unwrap().is_valid());

        let dataset = validate(&even, 3, &RunConfig::default()).unwrap();
        assert!(dataset.typed);
        assert_eq!(dataset.issues[0].issue_type, "check");
        assert_eq!(dataset.issues[0].message, "Invalid input: Received 3");
    }

    #[test]
    fn test_check_with_message() {
        let schema = pipe!(string(), check(|v| v.as_str() != Some("root")).message("reserved name"));
        let dataset = validate(&schema, "root", &RunConfig::default()).unwrap();
        assert_eq!(dataset.issues[0].message, "reserved name");
    }

    #[test]
    fn test_transform_and_trim() {
        let schema = pipe!(string(), trim(), min_length(1), transform(|v| match v {
            Value::String(s) => Value::String(s.to_uppercase()),
            other => other,
        }));
        let dataset = validate(&schema, "  ada ", &RunConfig::default()).unwrap();
        assert!(dataset.is_valid());
        assert_eq!(dataset.value, Value::from("ADA"));

        let dataset = validate(&schema, "   ", &RunConfig::default()).unwrap();
        assert_eq!(dataset.issues.len(), 1);
        assert_eq!(dataset.value, Value::from(""));
    }

    #[test]
    fn test_transform_records_into_context() {
        let schema = pipe!(
            string(),
            transform_with_context(|value, context| {
                context.insert("seen", value.clone());
                value
            })
        );
        let config = RunConfig::new();
        validate(&schema, "x", &config).unwrap();
        assert_eq!(config.context.get("seen"), Some(Value::from("x")));
    }

    fn unique_name() -> CheckAsync {
        check_async(|value: Value| async move {
            tokio::task::yield_now().await;
            value.as_str() != Some("taken")
        })
    }

    #[tokio::test]
    async fn test_check_async() {
        let schema = pipe!(string(), unique_name());
        assert!(schema.info().is_async);

        let dataset = validate_async(&schema, "free", &RunConfig::default()).await;
        assert!(dataset.is_valid());

        let dataset = validate_async(&schema, "taken", &RunConfig::default()).await;
        assert_eq!(dataset.issues[0].issue_type, "check");
    }

    #[test]
    fn test_async_check_refused_by_sync_entry() {
        let schema = object().entry("name", pipe!(string(), unique_name()));
        let input = Value::Map(BTreeMap::from([("name".to_string(), Value::from("x"))]));
        let err = validate(&schema, input, &RunConfig::default()).unwrap_err();
        assert!(matches!(err, SieveError::AsyncInSync { .. }));
    }
}
