//! Wrapper schemas that relax or replace the result of another schema.

use async_trait::async_trait;
use sieve_core::{Dataset, Missing, RunConfig, Step, StepInfo, Value};

/// Allows the wrapped member to be absent from its container.
///
/// Run on a present value, the wrapped schema decides. Containers consult
/// [`Step::missing`] to skip an absent member or feed it the default.
#[derive(Debug)]
pub struct Optional {
    info: StepInfo,
    wrapped: Box<dyn Step>,
    default: Option<Value>,
}

pub fn optional(wrapped: impl Step + 'static) -> Optional {
    let wrapped: Box<dyn Step> = Box::new(wrapped);
    let info = StepInfo::schema("optional")
        .expects(format!("({} | missing)", expects_of(wrapped.as_ref())))
        .asynchronous(wrapped.info().is_async);
    Optional {
        info,
        wrapped,
        default: None,
    }
}

impl Optional {
    /// Value used in place of an absent member.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

#[async_trait]
impl Step for Optional {
    fn info(&self) -> &StepInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut StepInfo {
        &mut self.info
    }

    fn run(&self, dataset: Dataset, config: &RunConfig) -> Dataset {
        self.wrapped.run(dataset, config)
    }

    async fn run_async(&self, dataset: Dataset, config: &RunConfig) -> Dataset {
        self.wrapped.run_async(dataset, config).await
    }

    fn missing(&self) -> Missing {
        match &self.default {
            Some(value) => Missing::Default(value.clone()),
            None => Missing::Skip,
        }
    }
}

/// Lets `null` through, or replaces it with a default before the wrapped
/// schema runs.
#[derive(Debug)]
pub struct Nullable {
    info: StepInfo,
    wrapped: Box<dyn Step>,
    default: Option<Value>,
}

pub fn nullable(wrapped: impl Step + 'static) -> Nullable {
    let wrapped: Box<dyn Step> = Box::new(wrapped);
    let info = StepInfo::schema("nullable")
        .expects(format!("({} | null)", expects_of(wrapped.as_ref())))
        .asynchronous(wrapped.info().is_async);
    Nullable {
        info,
        wrapped,
        default: None,
    }
}

impl Nullable {
    /// Value used in place of `null`.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Replaces a null value with the default; returns true if the dataset
    /// is finished.
    fn settle_null(&self, dataset: &mut Dataset) -> bool {
        if !dataset.value.is_null() {
            return false;
        }
        if let Some(default) = &self.default {
            dataset.value = default.clone();
        }
        if dataset.value.is_null() {
            dataset.typed = true;
            return true;
        }
        false
    }
}

#[async_trait]
impl Step for Nullable {
    fn info(&self) -> &StepInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut StepInfo {
        &mut self.info
    }

    fn run(&self, mut dataset: Dataset, config: &RunConfig) -> Dataset {
        if self.settle_null(&mut dataset) {
            return dataset;
        }
        self.wrapped.run(dataset, config)
    }

    async fn run_async(&self, mut dataset: Dataset, config: &RunConfig) -> Dataset {
        if self.settle_null(&mut dataset) {
            return dataset;
        }
        self.wrapped.run_async(dataset, config).await
    }

    fn missing(&self) -> Missing {
        self.wrapped.missing()
    }
}

/// Replaces any failed result of the wrapped schema with a fixed value.
#[derive(Debug)]
pub struct Fallback {
    info: StepInfo,
    wrapped: Box<dyn Step>,
    fallback: Value,
}

pub fn fallback(wrapped: impl Step + 'static, value: impl Into<Value>) -> Fallback {
    let wrapped: Box<dyn Step> = Box::new(wrapped);
    Fallback {
        info: wrapped.info().clone(),
        wrapped,
        fallback: value.into(),
    }
}

impl Fallback {
    fn settle(&self, output: Dataset) -> Dataset {
        if output.has_issues() {
            Dataset::typed(self.fallback.clone())
        } else {
            output
        }
    }
}

#[async_trait]
impl Step for Fallback {
    fn info(&self) -> &StepInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut StepInfo {
        &mut self.info
    }

    fn run(&self, dataset: Dataset, config: &RunConfig) -> Dataset {
        self.settle(self.wrapped.run(dataset, config))
    }

    async fn run_async(&self, dataset: Dataset, config: &RunConfig) -> Dataset {
        self.settle(self.wrapped.run_async(dataset, config).await)
    }

    fn missing(&self) -> Missing {
        self.wrapped.missing()
    }
}

fn expects_of(step: &dyn Step) -> &str {
    step.info().expects.as_deref().unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::min_length;
    use crate::schemas::{number, string};
    use pretty_assertions::assert_eq;
    use sieve_core::{pipe, validate};

    #[test]
    fn test_optional_metadata() {
        let schema = optional(string());
        assert_eq!(schema.info().step_type, "optional");
        assert_eq!(schema.info().expects.as_deref(), Some("(string | missing)"));
        assert_eq!(schema.missing(), Missing::Skip);
        assert_eq!(
            optional(string()).default("x").missing(),
            Missing::Default(Value::from("x"))
        );
    }

    #[test]
    fn test_optional_present_value_is_checked() {
        let dataset = validate(&optional(string()), 1, &RunConfig::default()).unwrap();
        assert_eq!(dataset.issues[0].issue_type, "string");
    }

    #[test]
    fn test_pipe_exposes_base_missing() {
        let schema = pipe!(optional(string()), min_length(2));
        assert_eq!(schema.missing(), Missing::Skip);
    }

    #[test]
    fn test_nullable() {
        let schema = nullable(string());
        assert!(validate(&schema, Value::Null, &RunConfig::default()).unwrap().is_valid());
        assert!(validate(&schema, "a", &RunConfig::default()).unwrap().is_valid());
        assert!(!validate(&schema, 1, &RunConfig::default()).unwrap().is_valid());
        assert_eq!(schema.info().expects.as_deref(), Some("(string | null)"));
    }

    #[test]
    fn test_nullable_default_runs_through_wrapped() {
        let schema = nullable(string()).default("none");
        let dataset = validate(&schema, Value::Null, &RunConfig::default()).unwrap();
        assert!(dataset.is_valid());
        assert_eq!(dataset.value, Value::from("none"));

        let schema = nullable(string()).default(5);
        let dataset = validate(&schema, Value::Null, &RunConfig::default()).unwrap();
        assert!(!dataset.is_valid());
    }

    #[test]
    fn test_fallback_clears_issues() {
        let schema = fallback(number(), 0);
        let dataset = validate(&schema, "seven", &RunConfig::default()).unwrap();
        assert!(dataset.is_valid());
        assert_eq!(dataset.value, Value::Int(0));

        let dataset = validate(&schema, 7, &RunConfig::default()).unwrap();
        assert_eq!(dataset.value, Value::Int(7));
        assert_eq!(schema.info().step_type, "number");
    }
}
