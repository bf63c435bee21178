//! Actions: validations and transformations that run inside a pipe after
//! a schema has typed the value.
//!
//! Every validation here is a no-op on an untyped dataset, so a failed
//! schema never produces follow-up noise from constraint checks.

mod custom;
mod date;
mod format;
mod length;
mod value;

pub use custom::{check, check_async, transform, transform_with_context, trim, Check, CheckAsync, Transform};
pub use date::{max_date, min_date, DateBound};
pub use format::{cron, email, isrc, ksuid, regex, url, Format};
pub use length::{length, max_length, min_length, non_empty, Length};
pub use value::{finite, gt_value, integer, lt_value, max_value, min_value, multiple_of, Bound};

use sieve_core::{add_issue, Dataset, IssueOverrides, RunConfig, StepInfo};

/// Adds a validation issue unless the dataset is untyped.
///
/// `test` receives the typed dataset and returns `None` when the value
/// passes, or the overrides describing the failure.
pub(crate) fn validate_typed(
    info: &StepInfo,
    label: &str,
    mut dataset: Dataset,
    config: &RunConfig,
    test: impl FnOnce(&Dataset) -> Option<IssueOverrides>,
) -> Dataset {
    if dataset.typed {
        if let Some(overrides) = test(&dataset) {
            add_issue(info, label, &mut dataset, config, overrides);
        }
    }
    dataset
}
