//! Array schema.

use async_trait::async_trait;
use futures::future::join_all;
use sieve_core::{
    add_issue, Dataset, IssueOverrides, PathSegment, RunConfig, Step, StepInfo, Structure, Value,
};

/// Schema for lists whose items all match one schema.
#[derive(Debug)]
pub struct Array {
    info: StepInfo,
    item: Box<dyn Step>,
}

pub fn array(item: impl Step + 'static) -> Array {
    let item: Box<dyn Step> = Box::new(item);
    Array {
        info: StepInfo::schema("array")
            .expects("Array")
            .asynchronous(item.info().is_async),
        item,
    }
}

impl Array {
    fn open(&self, dataset: &mut Dataset, config: &RunConfig) -> Option<Vec<Value>> {
        if let Value::List(items) = &mut dataset.value {
            let items = std::mem::take(items);
            dataset.typed = true;
            return Some(items);
        }
        add_issue(&self.info, "type", dataset, config, IssueOverrides::default());
        None
    }
}

/// Splices item datasets into the array, in index order.
fn collect(
    dataset: &mut Dataset,
    members: impl IntoIterator<Item = Dataset>,
    config: &RunConfig,
) -> Vec<Value> {
    let mut output = Vec::new();
    for (index, member) in members.into_iter().enumerate() {
        let absorbed = dataset.absorb(PathSegment::value(Structure::Array, index), member, config);
        output.push(absorbed.value);
        if absorbed.stop {
            break;
        }
    }
    output
}

#[async_trait]
impl Step for Array {
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
        // Lazy, so abort_early leaves the remaining items unchecked.
        let members = items
            .into_iter()
            .map(|value| self.item.run(Dataset::new(value), config));
        let output = collect(&mut dataset, members, config);
        dataset.value = Value::List(output);
        dataset
    }

    async fn run_async(&self, mut dataset: Dataset, config: &RunConfig) -> Dataset {
        let Some(items) = self.open(&mut dataset, config) else {
            return dataset;
        };
        let members = join_all(
            items
                .into_iter()
                .map(|value| self.item.run_async(Dataset::new(value), config)),
        )
        .await;
        let output = collect(&mut dataset, members, config);
        dataset.value = Value::List(output);
        dataset
    }
}
