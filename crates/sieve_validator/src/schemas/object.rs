//! Object schema.
//!
//! Declared entries are checked in declaration order, each against its own
//! schema, and every member's issues are spliced into the object's dataset
//! with the key as a path prefix. Members the object does not declare are
//! handled by its [`Extra`] mode.

use super::Extra;
use async_trait::async_trait;
use futures::future::{join_all, ready, BoxFuture, FutureExt};
use sieve_core::{
    add_issue, Dataset, IssueOverrides, Missing, PathSegment, RunConfig, Step, StepInfo,
    Structure, Value,
};
use std::collections::BTreeMap;
use tracing::trace;

type Entries = BTreeMap<String, Value>;

/// Schema for maps with a fixed set of keys.
#[derive(Debug)]
pub struct Object {
    info: StepInfo,
    entries: Vec<(String, Box<dyn Step>)>,
    extra: Extra,
}

/// Starts an object schema; unknown members are stripped.
pub fn object() -> Object {
    Object {
        info: StepInfo::schema("object").expects("Object"),
        entries: Vec::new(),
        extra: Extra::Strip,
    }
}

/// A declared member after its input has been looked up.
enum Resolved {
    Member(Dataset),
    Skip,
    Missing,
}

impl Object {
    /// Declares a member.
    pub fn entry(self, key: impl Into<String>, step: impl Step + 'static) -> Self {
        self.entry_boxed(key, Box::new(step))
    }

    /// Declares a member from a boxed step.
    pub fn entry_boxed(mut self, key: impl Into<String>, step: Box<dyn Step>) -> Self {
        self.info.is_async |= step.info().is_async;
        self.entries.push((key.into(), step));
        self
    }

    /// Reports the first unknown member.
    pub fn strict(self) -> Self {
        self.with_extra("strict_object", Extra::Reject)
    }

    /// Keeps unknown members unchecked.
    pub fn loose(self) -> Self {
        self.with_extra("loose_object", Extra::Keep)
    }

    /// Checks every unknown member against `step`.
    pub fn rest(self, step: impl Step + 'static) -> Self {
        self.with_extra("object_with_rest", Extra::Rest(Box::new(step)))
    }

    /// Sets the unknown-member mode directly.
    pub fn extra(self, extra: Extra) -> Self {
        let step_type = match extra {
            Extra::Strip => "object",
            Extra::Keep => "loose_object",
            Extra::Reject => "strict_object",
            Extra::Rest(_) => "object_with_rest",
        };
        self.with_extra(step_type, extra)
    }

    fn with_extra(mut self, step_type: &'static str, extra: Extra) -> Self {
        self.info.step_type = step_type;
        self.info.reference = step_type;
        self.info.is_async = self.entries.iter().any(|(_, step)| step.info().is_async)
            || extra.is_async();
        self.extra = extra;
        self
    }

    /// Takes the map out of the dataset, or reports a type issue.
    fn open(&self, dataset: &mut Dataset, config: &RunConfig) -> Option<Entries> {
        if let Value::Map(map) = &mut dataset.value {
            let entries = std::mem::take(map);
            dataset.typed = true;
            return Some(entries);
        }
        add_issue(&self.info, "type", dataset, config, IssueOverrides::default());
        None
    }

    /// Takes the input of a declared member, or reports how to treat its
    /// absence.
    fn lookup(step: &dyn Step, key: &str, input: &mut Entries) -> Result<Value, Missing> {
        match input.remove(key) {
            Some(value) => Ok(value),
            None => match step.missing() {
                Missing::Default(value) => Ok(value),
                missing => Err(missing),
            },
        }
    }

    /// Splices one resolved member into the output. Returns true when the
    /// run must stop.
    fn settle(
        &self,
        dataset: &mut Dataset,
        output: &mut Entries,
        key: &str,
        resolved: Resolved,
        config: &RunConfig,
    ) -> bool {
        match resolved {
            Resolved::Member(member) => {
                let absorbed = dataset.absorb(PathSegment::value(Structure::Object, key), member, config);
                output.insert(key.to_string(), absorbed.value);
                absorbed.stop
            }
            Resolved::Skip => false,
            Resolved::Missing => {
                let overrides = IssueOverrides::default()
                    .input(Value::Null)
                    .expected(format!("\"{key}\""))
                    .received("missing")
                    .path(vec![PathSegment::key(Structure::Object, key)]);
                add_issue(&self.info, "key", dataset, config, overrides);
                config.abort_early
            }
        }
    }

    /// Applies the strip, keep and reject modes. Rest members are run by the
    /// caller.
    fn settle_unknown(
        &self,
        dataset: &mut Dataset,
        output: &mut Entries,
        remaining: Entries,
        config: &RunConfig,
    ) {
        match &self.extra {
            Extra::Strip | Extra::Rest(_) => {}
            Extra::Keep => output.extend(remaining),
            Extra::Reject => {
                if let Some(key) = remaining.into_keys().next() {
                    let overrides = IssueOverrides::default()
                        .input(key.as_str())
                        .expected("never")
                        .path(vec![PathSegment::key(Structure::Object, key.as_str())]);
                    add_issue(&self.info, "key", dataset, config, overrides);
                }
            }
        }
    }
}

#[async_trait]
impl Step for Object {
    fn info(&self) -> &StepInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut StepInfo {
        &mut self.info
    }

    fn run(&self, mut dataset: Dataset, config: &RunConfig) -> Dataset {
        let Some(mut input) = self.open(&mut dataset, config) else {
            return dataset;
        };
        let mut output = Entries::new();

        let mut stop = false;
        for (key, step) in &self.entries {
            trace!(key = key.as_str(), "checking object member");
            let resolved = match Self::lookup(step.as_ref(), key, &mut input) {
                Ok(value) => Resolved::Member(step.run(Dataset::new(value), config)),
                Err(Missing::Required) => Resolved::Missing,
                Err(_) => Resolved::Skip,
            };
            stop = self.settle(&mut dataset, &mut output, key, resolved, config);
            if stop {
                break;
            }
        }

        if !stop {
            if let Extra::Rest(rest) = &self.extra {
                for (key, value) in input {
                    let member = rest.run(Dataset::new(value), config);
                    if self.settle(&mut dataset, &mut output, &key, Resolved::Member(member), config) {
                        break;
                    }
                }
            } else {
                self.settle_unknown(&mut dataset, &mut output, input, config);
            }
        }

        dataset.value = Value::Map(output);
        dataset
    }

    async fn run_async(&self, mut dataset: Dataset, config: &RunConfig) -> Dataset {
        let Some(mut input) = self.open(&mut dataset, config) else {
            return dataset;
        };
        let mut output = Entries::new();

        let pending: Vec<BoxFuture<'_, Resolved>> = self
            .entries
            .iter()
            .map(|(key, step)| match Self::lookup(step.as_ref(), key, &mut input) {
                Ok(value) => step
                    .run_async(Dataset::new(value), config)
                    .map(Resolved::Member)
                    .boxed(),
                Err(Missing::Required) => ready(Resolved::Missing).boxed(),
                Err(_) => ready(Resolved::Skip).boxed(),
            })
            .collect();

        let mut stop = false;
        for ((key, _), resolved) in self.entries.iter().zip(join_all(pending).await) {
            stop = self.settle(&mut dataset, &mut output, key, resolved, config);
            if stop {
                break;
            }
        }

        if !stop {
            if let Extra::Rest(rest) = &self.extra {
                let keys: Vec<String> = input.keys().cloned().collect();
                let members = join_all(
                    input
                        .into_values()
                        .map(|value| rest.run_async(Dataset::new(value), config)),
                )
                .await;
                for (key, member) in keys.iter().zip(members) {
                    if self.settle(&mut dataset, &mut output, key, Resolved::Member(member), config) {
                        break;
                    }
                }
            } else {
                self.settle_unknown(&mut dataset, &mut output, input, config);
            }
        }

        dataset.value = Value::Map(output);
        dataset
    }
}
