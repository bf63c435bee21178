//! Tuple schema.
//!
//! A list whose positions each have their own schema. Items past the
//! declared positions are handled by the tuple's [`Extra`] mode.

use super::Extra;
use async_trait::async_trait;
use futures::future::{join_all, ready, BoxFuture, FutureExt};
use sieve_core::{
    add_issue, Dataset, IssueOverrides, Missing, PathSegment, RunConfig, Step, StepInfo,
    Structure, Value,
};

#[derive(Debug)]
pub struct Tuple {
    info: StepInfo,
    items: Vec<Box<dyn Step>>,
    extra: Extra,
}

/// Creates a tuple schema; items past the declared positions are stripped.
pub fn tuple(items: Vec<Box<dyn Step>>) -> Tuple {
    Tuple {
        info: StepInfo::schema("tuple")
            .expects("Array")
            .asynchronous(items.iter().any(|item| item.info().is_async)),
        items,
        extra: Extra::Strip,
    }
}

enum Resolved {
    Member(Dataset),
    Skip,
    Missing,
}

impl Tuple {
    pub fn strict(self) -> Self {
        self.with_extra("strict_tuple", Extra::Reject)
    }

    pub fn loose(self) -> Self {
        self.with_extra("loose_tuple", Extra::Keep)
    }

    pub fn rest(self, step: impl Step + 'static) -> Self {
        self.with_extra("tuple_with_rest", Extra::Rest(Box::new(step)))
    }

    /// Sets the extra-item mode directly.
    pub fn extra(self, extra: Extra) -> Self {
        let step_type = match extra {
            Extra::Strip => "tuple",
            Extra::Keep => "loose_tuple",
            Extra::Reject => "strict_tuple",
            Extra::Rest(_) => "tuple_with_rest",
        };
        self.with_extra(step_type, extra)
    }

    fn with_extra(mut self, step_type: &'static str, extra: Extra) -> Self {
        self.info.step_type = step_type;
        self.info.reference = step_type;
        self.info.is_async =
            self.items.iter().any(|item| item.info().is_async) || extra.is_async();
        self.extra = extra;
        self
    }

    fn open(&self, dataset: &mut Dataset, config: &RunConfig) -> Option<Vec<Value>> {
        if let Value::List(items) = &mut dataset.value {
            let items = std::mem::take(items);
            dataset.typed = true;
            return Some(items);
        }
        add_issue(&self.info, "type", dataset, config, IssueOverrides::default());
        None
    }

    /// Input of the next item, or how to treat its absence.
    fn lookup(item: &dyn Step, input: &mut std::vec::IntoIter<Value>) -> Result<Value, Missing> {
        match input.next() {
            Some(value) => Ok(value),
            None => match item.missing() {
                Missing::Default(value) => Ok(value),
                missing => Err(missing),
            },
        }
    }

    fn settle(
        &self,
        dataset: &mut Dataset,
        output: &mut Vec<Value>,
        index: usize,
        resolved: Resolved,
        config: &RunConfig,
    ) -> bool {
        match resolved {
            Resolved::Member(member) => {
                let absorbed =
                    dataset.absorb(PathSegment::value(Structure::Tuple, index), member, config);
                output.push(absorbed.value);
                absorbed.stop
            }
            Resolved::Skip => false,
            Resolved::Missing => {
                // The item's own schema reports the absence.
                let overrides = IssueOverrides::default()
                    .input(Value::Null)
                    .received("missing")
                    .path(vec![PathSegment::value(Structure::Tuple, index)]);
                add_issue(self.items[index].info(), "type", dataset, config, overrides);
                dataset.typed = false;
                config.abort_early
            }
        }
    }

    fn settle_extra(
        &self,
        dataset: &mut Dataset,
        output: &mut Vec<Value>,
        remaining: Vec<Value>,
        config: &RunConfig,
    ) {
        match &self.extra {
            Extra::Strip | Extra::Rest(_) => {}
            Extra::Keep => output.extend(remaining),
            Extra::Reject => {
                if let Some(value) = remaining.into_iter().next() {
                    let overrides = IssueOverrides::default()
                        .input(value)
                        .expected("never")
                        .path(vec![PathSegment::value(Structure::Tuple, self.items.len())]);
                    add_issue(&self.info, "type", dataset, config, overrides);
                }
            }
        }
    }
}

#[async_trait]
impl Step for Tuple {
    fn info(&self) -> &StepInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut StepInfo {
        &mut self.info
    }

    fn run(&self, mut dataset: Dataset, config: &RunConfig) -> Dataset {
        let Some(items) = self.open(&mut dataset, config) else {
            return dataset;
        };
        let mut input = items.into_iter();
        let mut output = Vec::new();

        let mut stop = false;
        for (index, item) in self.items.iter().enumerate() {
            let resolved = match Self::lookup(item.as_ref(), &mut input) {
                Ok(value) => Resolved::Member(item.run(Dataset::new(value), config)),
                Err(Missing::Required) => Resolved::Missing,
                Err(_) => Resolved::Skip,
            };
            stop = self.settle(&mut dataset, &mut output, index, resolved, config);
            if stop {
                break;
            }
        }

        if !stop {
            if let Extra::Rest(rest) = &self.extra {
                for (offset, value) in input.enumerate() {
                    let member = rest.run(Dataset::new(value), config);
                    let index = self.items.len() + offset;
                    if self.settle(&mut dataset, &mut output, index, Resolved::Member(member), config) {
                        break;
                    }
                }
            } else {
                self.settle_extra(&mut dataset, &mut output, input.collect(), config);
            }
        }

        dataset.value = Value::List(output);
        dataset
    }

    async fn run_async(&self, mut dataset: Dataset, config: &RunConfig) -> Dataset {
        let Some(items) = self.open(&mut dataset, config) else {
            return dataset;
        };
        let mut input = items.into_iter();
        let mut output = Vec::new();

        let pending: Vec<BoxFuture<'_, Resolved>> = self
            .items
            .iter()
            .map(|item| match Self::lookup(item.as_ref(), &mut input) {
                Ok(value) => item
                    .run_async(Dataset::new(value), config)
                    .map(Resolved::Member)
                    .boxed(),
                Err(Missing::Required) => ready(Resolved::Missing).boxed(),
                Err(_) => ready(Resolved::Skip).boxed(),
            })
            .collect();

        let mut stop = false;
        for (index, resolved) in join_all(pending).await.into_iter().enumerate() {
            stop = self.settle(&mut dataset, &mut output, index, resolved, config);
            if stop {
                break;
            }
        }

        if !stop {
            if let Extra::Rest(rest) = &self.extra {
                let members =
                    join_all(input.map(|value| rest.run_async(Dataset::new(value), config))).await;
                for (offset, member) in members.into_iter().enumerate() {
                    let index = self.items.len() + offset;
                    if self.settle(&mut dataset, &mut output, index, Resolved::Member(member), config) {
                        break;
                    }
                }
            } else {
                self.settle_extra(&mut dataset, &mut output, input.collect(), config);
            }
        }

        dataset.value = Value::List(output);
        dataset
    }
}
