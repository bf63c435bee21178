//! Pipe composition.
//!
//! [`Pipe`] is the only way to chain steps. Running a pipe feeds each step's
//! output dataset into the next step, left to right, under these rules:
//!
//! - once the dataset carries issues, a schema or transformation step is
//!   never reached: the dataset is marked untyped and the pipe ends;
//! - once the dataset carries issues and `abort_early` or
//!   `abort_pipe_early` is set, remaining validations are skipped, but a
//!   later schema or transformation still halts the pipe and untypes it;
//! - otherwise every step runs, so one pass surfaces as many issues as
//!   possible.

use crate::{Dataset, Missing, RunConfig, Step, StepInfo, StepKind};
use async_trait::async_trait;
use tracing::trace;

/// An ordered composition of steps that behaves as a single step.
///
/// The pipe's metadata is taken from its first (base) step, except that it
/// is asynchronous whenever any of its steps is.
#[derive(Debug)]
pub struct Pipe {
    info: StepInfo,
    steps: Vec<Box<dyn Step>>,
}

/// Starts a pipe from a base step.
pub fn pipe(base: impl Step + 'static) -> Pipe {
    Pipe::new(Box::new(base))
}

impl Pipe {
    /// Creates a pipe holding only its base step.
    pub fn new(base: Box<dyn Step>) -> Self {
        Self {
            info: base.info().clone(),
            steps: vec![base],
        }
    }

    /// Appends a step.
    pub fn then(mut self, step: impl Step + 'static) -> Self {
        self.push(Box::new(step));
        self
    }

    /// Appends a boxed step.
    pub fn push(&mut self, step: Box<dyn Step>) {
        self.info.is_async |= step.info().is_async;
        self.steps.push(step);
    }

    /// The steps in execution order.
    pub fn steps(&self) -> &[Box<dyn Step>] {
        &self.steps
    }
}

/// What the pipe does with the next step.
enum Gate {
    Run,
    Skip,
    Halt,
}

fn gate(kind: StepKind, dataset: &Dataset, config: &RunConfig) -> Gate {
    if dataset.has_issues() {
        if matches!(kind, StepKind::Schema | StepKind::Transformation) {
            return Gate::Halt;
        }
        if config.abort_early || config.abort_pipe_early {
            return Gate::Skip;
        }
    }
    Gate::Run
}

#[async_trait]
impl Step for Pipe {
    fn info(&self) -> &StepInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut StepInfo {
        &mut self.info
    }

    fn run(&self, mut dataset: Dataset, config: &RunConfig) -> Dataset {
        for step in &self.steps {
            match gate(step.info().kind, &dataset, config) {
                Gate::Run => {
                    trace!(step = step.info().step_type, "running pipe step");
                    dataset = step.run(dataset, config);
                }
                Gate::Skip => continue,
                Gate::Halt => {
                    dataset.typed = false;
                    break;
                }
            }
        }
        dataset
    }

    async fn run_async(&self, mut dataset: Dataset, config: &RunConfig) -> Dataset {
        for step in &self.steps {
            match gate(step.info().kind, &dataset, config) {
                Gate::Run => {
                    trace!(step = step.info().step_type, "running pipe step");
                    dataset = step.run_async(dataset, config).await;
                }
                Gate::Skip => continue,
                Gate::Halt => {
                    dataset.typed = false;
                    break;
                }
            }
        }
        dataset
    }

    fn missing(&self) -> Missing {
        self.steps[0].missing()
    }
}

/// Builds a [`Pipe`] from a base step and any number of further steps.
///
/// ```rust
/// use sieve_core::{pipe, Dataset, RunConfig, Step};
/// # use sieve_core::{StepInfo, Value};
/// # #[derive(Debug)]
/// # struct Identity(StepInfo);
/// # impl Step for Identity {
/// #     fn info(&self) -> &StepInfo { &self.0 }
/// #     fn info_mut(&mut self) -> &mut StepInfo { &mut self.0 }
/// #     fn run(&self, mut dataset: Dataset, _: &RunConfig) -> Dataset { dataset.typed = true; dataset }
/// # }
/// # let base = Identity(StepInfo::schema("unknown"));
/// # let check = Identity(StepInfo::validation("check"));
/// let schema = pipe!(base, check);
/// let dataset = schema.run(Dataset::new(Value::Null), &RunConfig::default());
/// assert!(dataset.is_valid());
/// ```
#[macro_export]
macro_rules! pipe {
    ($base:expr $(, $step:expr)* $(,)?) => {
        $crate::pipe($base)$(.then($step))*
    };
}
