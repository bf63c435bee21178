//! Record schema: maps with arbitrary keys and uniform values.

use async_trait::async_trait;
use futures::future::join_all;
use sieve_core::{
    add_issue, Dataset, IssueOverrides, PathSegment, RunConfig, Step, StepInfo, Structure, Value,
};
use std::collections::BTreeMap;

#[derive(Debug)]
pub struct Record {
    info: StepInfo,
    key: Box<dyn Step>,
    value: Box<dyn Step>,
}

/// Checks every key against `key` and every value against `value`.
pub fn record(key: impl Step + 'static, value: impl Step + 'static) -> Record {
    let key: Box<dyn Step> = Box::new(key);
    let value: Box<dyn Step> = Box::new(value);
    Record {
        info: StepInfo::schema("record")
            .expects("Object")
            .asynchronous(key.info().is_async || value.info().is_async),
        key,
        value,
    }
}

impl Record {
    fn open(&self, dataset: &mut Dataset, config: &RunConfig) -> Option<BTreeMap<String, Value>> {
        if let Value::Map(map) = &mut dataset.value {
            let entries = std::mem::take(map);
            dataset.typed = true;
            return Some(entries);
        }
        add_issue(&self.info, "type", dataset, config, IssueOverrides::default());
        None
    }

    /// Splices one entry's key and value datasets. Returns true when the run
    /// must stop.
    fn settle(
        dataset: &mut Dataset,
        output: &mut BTreeMap<String, Value>,
        key: &str,
        key_dataset: Dataset,
        value_dataset: Dataset,
        config: &RunConfig,
    ) -> bool {
        let both_typed = key_dataset.typed && value_dataset.typed;

        let key_absorbed = dataset.absorb(PathSegment::key(Structure::Record, key), key_dataset, config);
        if key_absorbed.stop {
            return true;
        }
        let value_absorbed =
            dataset.absorb(PathSegment::value(Structure::Record, key), value_dataset, config);

        // Entries with an untyped key or value are left out of the output.
        if both_typed {
            let output_key = match key_absorbed.value {
                Value::String(key) => key,
                other => other.stringify(),
            };
            output.insert(output_key, value_absorbed.value);
        }
        value_absorbed.stop
    }
}

#[async_trait]
impl Step for Record {
    fn info(&self) -> &StepInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut StepInfo {
        &mut self.info
    }

    fn run(&self, mut dataset: Dataset, config: &RunConfig) -> Dataset {
        let Some(input) = self.open(&mut dataset, config) else {
            return dataset;
        };
        let mut output = BTreeMap::new();
        for (key, value) in input {
            let key_dataset = self.key.run(Dataset::new(key.as_str()), config);
            let value_dataset = self.value.run(Dataset::new(value), config);
            if Self::settle(&mut dataset, &mut output, &key, key_dataset, value_dataset, config) {
                break;
            }
        }
        dataset.value = Value::Map(output);
        dataset
    }

    async fn run_async(&self, mut dataset: Dataset, config: &RunConfig) -> Dataset {
        let Some(input) = self.open(&mut dataset, config) else {
            return dataset;
        };
        let entries = join_all(input.into_iter().map(|(key, value)| async move {
            let key_dataset = self.key.run_async(Dataset::new(key.as_str()), config).await;
            let value_dataset = self.value.run_async(Dataset::new(value), config).await;
            (key, key_dataset, value_dataset)
        }))
        .await;

        let mut output = BTreeMap::new();
        for (key, key_dataset, value_dataset) in entries {
            if Self::settle(&mut dataset, &mut output, &key, key_dataset, value_dataset, config) {
                break;
            }
        }
        dataset.value = Value::Map(output);
        dataset
    }
}
