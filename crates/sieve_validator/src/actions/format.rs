//! String format checks.

use super::validate_typed;
use regex::Regex;
use sieve_core::{
    Dataset, IssueOverrides, Requirement, Result, RunConfig, SieveError, Step, StepInfo,
};
use std::sync::LazyLock;
use validator::{ValidateEmail, ValidateUrl};

const ISRC_PATTERN: &str =
    r"(?i)^(?:[A-Z]{2}[\dA-Z]{3}\d{2}\d{5}|[A-Z]{2}-[\dA-Z]{3}-\d{2}-\d{5})$";
const KSUID_PATTERN: &str = r"^[\dA-Za-z]{27}$";

static ISRC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ISRC_PATTERN).expect("ISRC pattern compiles"));
static KSUID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(KSUID_PATTERN).expect("KSUID pattern compiles"));

#[derive(Debug, Clone)]
enum Rule {
    Pattern(Regex),
    Email,
    Url,
    Cron,
}

/// Checks that a string has a given format.
#[derive(Debug, Clone)]
pub struct Format {
    info: StepInfo,
    label: &'static str,
    rule: Rule,
}

/// Requires the string to match `pattern`.
///
/// # Errors
///
/// Returns [`SieveError::InvalidPattern`] if the pattern does not compile.
pub fn regex(pattern: &str) -> Result<Format> {
    let compiled = Regex::new(pattern).map_err(|e| SieveError::invalid_pattern(pattern, e))?;
    Ok(Format {
        info: StepInfo::validation("regex")
            .expects(pattern)
            .requirement(Requirement::Pattern(pattern.to_string())),
        label: "format",
        rule: Rule::Pattern(compiled),
    })
}

pub fn email() -> Format {
    Format {
        info: StepInfo::validation("email").requirement(Requirement::Predicate("email".into())),
        label: "email",
        rule: Rule::Email,
    }
}

pub fn url() -> Format {
    Format {
        info: StepInfo::validation("url").requirement(Requirement::Predicate("url".into())),
        label: "URL",
        rule: Rule::Url,
    }
}

/// International Standard Recording Code, with or without hyphens.
pub fn isrc() -> Format {
    Format {
        info: StepInfo::validation("isrc").requirement(Requirement::Pattern(ISRC_PATTERN.into())),
        label: "ISRC",
        rule: Rule::Pattern(ISRC_REGEX.clone()),
    }
}

/// K-Sortable Unique Identifier: 27 base62 characters.
pub fn ksuid() -> Format {
    Format {
        info: StepInfo::validation("ksuid").requirement(Requirement::Pattern(KSUID_PATTERN.into())),
        label: "KSUID",
        rule: Rule::Pattern(KSUID_REGEX.clone()),
    }
}

/// Five-field cron expression separated by single spaces.
pub fn cron() -> Format {
    Format {
        info: StepInfo::validation("cron").requirement(Requirement::Predicate("cron".into())),
        label: "cron",
        rule: Rule::Cron,
    }
}

/// Inclusive bounds of minute, hour, day of month, month and day of week.
const CRON_FIELDS: [(u32, u32); 5] = [(0, 59), (0, 23), (1, 31), (1, 12), (0, 7)];

fn is_cron(expression: &str) -> bool {
    let fields: Vec<&str> = expression.split(' ').collect();
    fields.len() == CRON_FIELDS.len()
        && fields
            .iter()
            .zip(CRON_FIELDS)
            .all(|(field, (min, max))| field.split(',').all(|part| is_cron_part(part, min, max)))
}

/// One list element: `*`, `n`, `a-b`, `*/s` or `a-b/s`.
fn is_cron_part(part: &str, min: u32, max: u32) -> bool {
    let number = |s: &str| -> Option<u32> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        s.parse().ok()
    };
    let in_range = |n: u32| (min..=max).contains(&n);

    let (base, step) = match part.split_once('/') {
        Some((base, step)) => match number(step) {
            Some(step) if step > 0 => (base, true),
            _ => return false,
        },
        None => (part, false),
    };

    if base == "*" {
        return true;
    }
    if let Some((from, to)) = base.split_once('-') {
        return match (number(from), number(to)) {
            (Some(from), Some(to)) => in_range(from) && in_range(to) && from <= to,
            _ => false,
        };
    }
    !step && number(base).is_some_and(in_range)
}

impl Format {
    fn matches(&self, s: &str) -> bool {
        match &self.rule {
            Rule::Pattern(regex) => regex.is_match(s),
            Rule::Email => s.validate_email(),
            Rule::Url => s.validate_url(),
            Rule::Cron => is_cron(s),
        }
    }
}

impl Step for Format {
    fn info(&self) -> &StepInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut StepInfo {
        &mut self.info
    }

    fn run(&self, dataset: Dataset, config: &RunConfig) -> Dataset {
        validate_typed(&self.info, self.label, dataset, config, |dataset| {
            match dataset.value.as_str() {
                Some(s) if self.matches(s) => None,
                _ => Some(IssueOverrides::default()),
            }
        })
    }
}
