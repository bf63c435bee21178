//! Coercion steps.
//!
//! Coercions are transformations: they replace the value with its
//! conversion to the target type. A value that cannot be converted yields a
//! schema-kind issue (type `to_number` and so on), which ends the pipe.

use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use sieve_core::{add_issue, Dataset, IssueOverrides, RunConfig, Step, StepInfo, Value};

/// A transformation converting the value with a fallible function.
#[derive(Debug, Clone)]
pub struct Coerce {
    info: StepInfo,
    label: &'static str,
    convert: fn(&Value) -> Option<Value>,
}

impl Coerce {
    fn new(step_type: &'static str, label: &'static str, convert: fn(&Value) -> Option<Value>) -> Self {
        Self {
            info: StepInfo::transformation(step_type),
            label,
            convert,
        }
    }
}

impl Step for Coerce {
    fn info(&self) -> &StepInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut StepInfo {
        &mut self.info
    }

    fn run(&self, mut dataset: Dataset, config: &RunConfig) -> Dataset {
        match (self.convert)(&dataset.value) {
            Some(value) => {
                dataset.value = value;
                dataset.typed = true;
            }
            None => add_issue(&self.info, self.label, &mut dataset, config, IssueOverrides::default()),
        }
        dataset
    }
}

/// Converts to a number.
///
/// Numbers pass through. Strings are trimmed and parsed as an integer, then
/// as a float; empty strings and `NaN` are rejected. Booleans become 1 or 0,
/// dates their epoch milliseconds.
pub fn to_number() -> Coerce {
    Coerce::new("to_number", "number", number_of)
}

/// Converts to a big integer. Floats convert only when integral.
pub fn to_bigint() -> Coerce {
    Coerce::new("to_bigint", "bigint", bigint_of)
}

/// Converts to a date.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DD` dates (midnight UTC) and epoch
/// milliseconds.
pub fn to_date() -> Coerce {
    Coerce::new("to_date", "date", date_of)
}

/// Converts scalars and dates to their string form.
pub fn to_string() -> Coerce {
    Coerce::new("to_string", "string", string_of)
}

fn number_of(value: &Value) -> Option<Value> {
    match value {
        Value::Int(_) => Some(value.clone()),
        Value::Float(f) if !f.is_nan() => Some(value.clone()),
        Value::BigInt(i) => Some(i64::try_from(*i).map_or(Value::Float(*i as f64), Value::Int)),
        Value::Bool(b) => Some(Value::Int(i64::from(*b))),
        Value::Date(date) => Some(Value::Int(date.timestamp_millis())),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            if let Ok(i) = s.parse::<i64>() {
                return Some(Value::Int(i));
            }
            s.parse::<f64>()
                .ok()
                .filter(|f| !f.is_nan())
                .map(Value::Float)
        }
        _ => None,
    }
}

/// 2^127, the magnitude just past `i128::MAX`.
const I128_BOUND: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;

fn bigint_of(value: &Value) -> Option<Value> {
    match value {
        Value::BigInt(_) => Some(value.clone()),
        Value::Int(i) => Some(Value::BigInt(i128::from(*i))),
        // `as` saturates, so floats outside the i128 range are rejected first
        Value::Float(f) if f.fract() == 0.0 && (-I128_BOUND..I128_BOUND).contains(f) => {
            Some(Value::BigInt(*f as i128))
        }
        Value::Bool(b) => Some(Value::BigInt(i128::from(*b))),
        Value::String(s) => s.trim().parse::<i128>().ok().map(Value::BigInt),
        _ => None,
    }
}

fn date_of(value: &Value) -> Option<Value> {
    match value {
        Value::Date(_) => Some(value.clone()),
        Value::Int(millis) => Utc.timestamp_millis_opt(*millis).single().map(Value::Date),
        Value::Float(f) if f.is_finite() => {
            Utc.timestamp_millis_opt(*f as i64).single().map(Value::Date)
        }
        Value::String(s) => parse_date(s.trim()).map(Value::Date),
        _ => None,
    }
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(s) {
        return Some(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn string_of(value: &Value) -> Option<Value> {
    let text = match value {
        Value::String(_) => return Some(value.clone()),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::BigInt(i) => i.to_string(),
        Value::Float(_) => value.stringify(),
        Value::Date(date) => date.to_rfc3339_opts(SecondsFormat::Millis, true),
        Value::Null | Value::List(_) | Value::Map(_) => return None,
    };
    Some(Value::String(text))
}
