//! Error types for Sieve.
//!
//! Validation failures are not errors: they are issues carried by the
//! returned dataset. The variants here cover misuse of the engine, the
//! `parse` entry points that turn issues into an `Err`, and invalid step
//! construction.

use crate::Issue;
use thiserror::Error;

/// Result type for Sieve operations.
pub type Result<T> = std::result::Result<T, SieveError>;

/// Main error type for Sieve.
#[derive(Debug, Error)]
pub enum SieveError {
    /// An asynchronous step tree was run through the synchronous entry point
    #[error("step '{step}' is asynchronous and must be run with validate_async or parse_async")]
    AsyncInSync {
        /// Type of the root step
        step: String,
    },

    /// The input did not conform
    #[error("validation failed with {} issue(s): {}", .issues.len(), first_message(.issues))]
    Invalid {
        /// Every issue found, in detection order
        issues: Vec<Issue>,
    },

    /// A pattern requirement did not compile
    #[error("Invalid regex pattern '{pattern}': {error}")]
    InvalidPattern {
        /// Pattern source
        pattern: String,
        /// Compiler message
        error: String,
    },
}

impl SieveError {
    /// Creates an invalid-pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, error: impl ToString) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            error: error.to_string(),
        }
    }

    /// Issues carried by an `Invalid` error.
    pub fn issues(&self) -> &[Issue] {
        match self {
            Self::Invalid { issues } => issues,
            _ => &[],
        }
    }
}

fn first_message(issues: &[Issue]) -> String {
    issues
        .first()
        .map(ToString::to_string)
        .unwrap_or_default()
}
