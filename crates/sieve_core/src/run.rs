//! Entry points.
//!
//! A call wraps the raw value into a fresh [`Dataset`], runs the step and
//! returns the final dataset. Steps that may suspend must go through the
//! awaiting entry points; the synchronous ones refuse them before any step
//! runs.

use crate::{Dataset, Result, RunConfig, SieveError, Step, Value};
use tracing::debug;

/// Validates `value` synchronously.
///
/// # Errors
///
/// Returns [`SieveError::AsyncInSync`] if the step (or any step nested in it)
/// is asynchronous. Validation failures are reported in the dataset, never
/// as an error.
pub fn validate(step: &dyn Step, value: impl Into<Value>, config: &RunConfig) -> Result<Dataset> {
    let info = step.info();
    if info.is_async {
        return Err(SieveError::AsyncInSync {
            step: info.step_type.to_string(),
        });
    }
    debug!(
        step = info.step_type,
        abort_early = config.abort_early,
        abort_pipe_early = config.abort_pipe_early,
        "validating"
    );
    let dataset = step.run(Dataset::new(value), config);
    debug!(issues = dataset.issues.len(), typed = dataset.typed, "validation finished");
    Ok(dataset)
}

/// Validates `value`, awaiting asynchronous steps.
pub async fn validate_async(step: &dyn Step, value: impl Into<Value>, config: &RunConfig) -> Dataset {
    let info = step.info();
    debug!(
        step = info.step_type,
        is_async = info.is_async,
        abort_early = config.abort_early,
        abort_pipe_early = config.abort_pipe_early,
        "validating"
    );
    let dataset = step.run_async(Dataset::new(value), config).await;
    debug!(issues = dataset.issues.len(), typed = dataset.typed, "validation finished");
    dataset
}

/// Validates `value` and returns the output value.
///
/// # Errors
///
/// Returns [`SieveError::Invalid`] with every issue when the input does not
/// conform, or [`SieveError::AsyncInSync`] for asynchronous steps.
pub fn parse(step: &dyn Step, value: impl Into<Value>, config: &RunConfig) -> Result<Value> {
    validate(step, value, config)?
        .into_result()
        .map_err(|issues| SieveError::Invalid { issues })
}

/// Awaiting counterpart of [`parse`].
pub async fn parse_async(step: &dyn Step, value: impl Into<Value>, config: &RunConfig) -> Result<Value> {
    validate_async(step, value, config)
        .await
        .into_result()
        .map_err(|issues| SieveError::Invalid { issues })
}

/// Returns whether `value` conforms, stopping at the first issue.
///
/// # Errors
///
/// Returns [`SieveError::AsyncInSync`] for asynchronous steps.
pub fn is_valid(step: &dyn Step, value: impl Into<Value>) -> Result<bool> {
    let config = RunConfig::new().with_abort_early(true);
    Ok(validate(step, value, &config)?.is_valid())
}
