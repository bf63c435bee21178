//! Union schema.
//!
//! Options run in order against the same input until one is valid. When
//! none is, the closest options decide the result: typed datasets (right
//! shape, failed constraints) win over untyped ones.

use async_trait::async_trait;
use sieve_core::{add_issue, Dataset, Issue, IssueOverrides, RunConfig, Step, StepInfo};

#[derive(Debug)]
pub struct Union {
    info: StepInfo,
    options: Vec<Box<dyn Step>>,
}

pub fn union(options: Vec<Box<dyn Step>>) -> Union {
    let mut expects: Vec<&str> = Vec::new();
    for option in &options {
        if let Some(expected) = option.info().expects.as_deref() {
            if !expects.contains(&expected) {
                expects.push(expected);
            }
        }
    }
    let expects = if expects.is_empty() {
        "never".to_string()
    } else {
        expects.join(" | ")
    };
    Union {
        info: StepInfo::schema("union")
            .expects(expects)
            .asynchronous(options.iter().any(|option| option.info().is_async)),
        options,
    }
}

/// Option results gathered so far.
#[derive(Default)]
struct Outcomes {
    valid: Option<Dataset>,
    typed: Vec<Dataset>,
    untyped: Vec<Dataset>,
}

impl Outcomes {
    /// Records one option's result; returns true once an option is valid.
    fn record(&mut self, option: Dataset) -> bool {
        if option.typed {
            if option.has_issues() {
                self.typed.push(option);
            } else {
                self.valid = Some(option);
                return true;
            }
        } else {
            self.untyped.push(option);
        }
        false
    }
}

impl Union {
    fn resolve(&self, mut dataset: Dataset, mut outcomes: Outcomes, config: &RunConfig) -> Dataset {
        if let Some(valid) = outcomes.valid {
            return valid;
        }
        if !outcomes.typed.is_empty() {
            if outcomes.typed.len() == 1 {
                return outcomes.typed.remove(0);
            }
            let overrides = IssueOverrides::default().issues(sub_issues(outcomes.typed));
            add_issue(&self.info, "type", &mut dataset, config, overrides);
            dataset.typed = true;
            return dataset;
        }
        if outcomes.untyped.len() == 1 {
            return outcomes.untyped.remove(0);
        }
        let mut overrides = IssueOverrides::default();
        if !outcomes.untyped.is_empty() {
            overrides = overrides.issues(sub_issues(outcomes.untyped));
        }
        add_issue(&self.info, "type", &mut dataset, config, overrides);
        dataset
    }
}

fn sub_issues(datasets: Vec<Dataset>) -> Vec<Issue> {
    datasets.into_iter().flat_map(|dataset| dataset.issues).collect()
}

#[async_trait]
impl Step for Union {
    fn info(&self) -> &StepInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut StepInfo {
        &mut self.info
    }

    fn run(&self, dataset: Dataset, config: &RunConfig) -> Dataset {
        let mut outcomes = Outcomes::default();
        for option in &self.options {
            if outcomes.record(option.run(Dataset::new(dataset.value.clone()), config)) {
                break;
            }
        }
        self.resolve(dataset, outcomes, config)
    }

    async fn run_async(&self, dataset: Dataset, config: &RunConfig) -> Dataset {
        let mut outcomes = Outcomes::default();
        for option in &self.options {
            let option = option.run_async(Dataset::new(dataset.value.clone()), config).await;
            if outcomes.record(option) {
                break;
            }
        }
        self.resolve(dataset, outcomes, config)
    }
}
