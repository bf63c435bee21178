//! # Sieve Validator
//!
//! Concrete steps for the Sieve engine:
//!
//! - Schemas: primitives (`string`, `number`, ...), wrappers (`optional`,
//!   `nullable`, `fallback`), structures (`object`, `array`, `tuple`,
//!   `record`) and `union`
//! - Coercions (`to_number`, `to_bigint`, `to_date`, `to_string`)
//! - Actions: length, value, date and format checks, plus host-supplied
//!   `check`, `check_async` and `transform`
//!
//! ## Example
//!
//! ```rust
//! use sieve_core::{pipe, validate, RunConfig};
//! use sieve_validator::{email, min_length, object, string};
//! # use sieve_core::Value;
//! # use std::collections::BTreeMap;
//!
//! let schema = object()
//!     .entry("name", pipe!(string(), min_length(2)))
//!     .entry("email", pipe!(string(), email()));
//!
//! # let input = Value::Map(BTreeMap::from([
//! #     ("name".to_string(), Value::from("A")),
//! #     ("email".to_string(), Value::from("a@example.com")),
//! # ]));
//! let dataset = validate(&schema, input, &RunConfig::default()).unwrap();
//!
//! for issue in &dataset.issues {
//!     println!("{issue}");
//! }
//! assert_eq!(dataset.issues.len(), 1);
//! ```

mod actions;
mod coerce;
mod schemas;

pub use actions::*;
pub use coerce::*;
pub use schemas::*;
