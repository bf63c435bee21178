//! # Sieve Core
//!
//! The validation execution engine behind Sieve. This crate defines:
//!
//! - **Value**: the dynamic value being validated
//! - **Dataset**: the value-in-flight plus its validity state and issues
//! - **Issue**: one structured validation failure, with a path that grows a
//!   prefix per enclosing container
//! - **Step**: the contract every schema and action satisfies
//! - **Pipe**: the single composition primitive, with short-circuit rules
//!   driven by [`RunConfig`]
//!
//! Concrete schemas and actions live in `sieve_validator`.
//!
//! ## Example
//!
//! ```rust
//! use sieve_core::{add_issue, validate, Dataset, IssueOverrides, RunConfig, Step, StepInfo};
//!
//! #[derive(Debug)]
//! struct Text(StepInfo);
//!
//! impl Step for Text {
//!     fn info(&self) -> &StepInfo { &self.0 }
//!     fn info_mut(&mut self) -> &mut StepInfo { &mut self.0 }
//!     fn run(&self, mut dataset: Dataset, config: &RunConfig) -> Dataset {
//!         if dataset.value.as_str().is_some() {
//!             dataset.typed = true;
//!         } else {
//!             add_issue(&self.0, "type", &mut dataset, config, IssueOverrides::default());
//!         }
//!         dataset
//!     }
//! }
//!
//! let schema = Text(StepInfo::schema("string").expects("string"));
//! let dataset = validate(&schema, 42, &RunConfig::default()).unwrap();
//!
//! assert!(!dataset.is_valid());
//! assert_eq!(dataset.issues[0].message, "Invalid type: Expected string but received 42");
//! ```

mod config;
mod dataset;
mod error;
mod issue;
mod message;
mod pipe;
mod report;
mod run;
mod step;
mod value;

pub use config::{RunConfig, RunContext};
pub use dataset::{Absorbed, Dataset, DatasetStatus};
pub use error::{Result, SieveError};
pub use issue::{
    default_message, Issue, IssueKind, Origin, PathKey, PathSegment, Requirement, Structure,
};
pub use message::{MessageCatalog, MessageFn, MessageSource};
pub use pipe::{pipe, Pipe};
pub use report::{flatten, summarize, FlatIssues};
pub use run::{is_valid, parse, parse_async, validate, validate_async};
pub use step::{
    add_issue, create_issue, BoxedStep, IssueOverrides, Missing, Step, StepInfo, StepKind,
};
pub use value::Value;
