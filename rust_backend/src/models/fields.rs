//! Parse-or-default helpers for raw catalog records.
//!
//! Optional fields of a raw record never fail construction: a missing or
//! malformed value falls back to a documented default. Each helper returns a
//! [`Parsed`] so callers (and tests) can see whether the default was used.

use qtty::Seconds;
use serde_json::Value;

/// Raw record as produced by a catalog source: a JSON-like mapping.
pub type RawRecord = Value;

/// Strings accepted as a "true" token by [`is_truthy_token`].
pub const TRUTHY_TOKENS: [&str; 8] = ["True", "true", "Yes", "yes", "Y", "y", "T", "t"];

/// A parsed field value together with a flag telling whether it was defaulted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parsed<T> {
    pub value: T,
    pub defaulted: bool,
}

impl<T> Parsed<T> {
    /// Value read from the record.
    pub fn given(value: T) -> Self {
        Self {
            value,
            defaulted: false,
        }
    }

    /// Value substituted because the field was absent or malformed.
    pub fn fallback(value: T) -> Self {
        Self {
            value,
            defaulted: true,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Interpret a value as a finite float: numbers, booleans and numeric
/// strings. `"NaN"` and `"inf"` are malformed.
fn as_float(value: &Value) -> Option<f64> {
    let float = match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    float.filter(|f| f.is_finite())
}

/// Interpret a value as an integer: integers, finite floats (truncated toward
/// zero), booleans and integer strings.
fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Read `key` as a float, falling back to `default`.
pub fn float_or(record: &RawRecord, key: &str, default: f64) -> Parsed<f64> {
    record
        .get(key)
        .and_then(as_float)
        .map(Parsed::given)
        .unwrap_or_else(|| Parsed::fallback(default))
}

/// Read `key` as a duration in seconds, falling back to `default`.
///
/// Only numbers are durations; strings and booleans fall back.
pub fn seconds_or(record: &RawRecord, key: &str, default: Seconds) -> Parsed<Seconds> {
    record
        .get(key)
        .and_then(Value::as_f64)
        .filter(|s| s.is_finite())
        .map(|s| Parsed::given(Seconds::new(s)))
        .unwrap_or_else(|| Parsed::fallback(default))
}

/// Read `key` as an exposure count, falling back to `default`.
///
/// Negative values cannot be represented as a count and fall back as well.
pub fn count_or(record: &RawRecord, key: &str, default: u32) -> Parsed<u32> {
    record
        .get(key)
        .and_then(as_integer)
        .and_then(|i| u32::try_from(i).ok())
        .map(Parsed::given)
        .unwrap_or_else(|| Parsed::fallback(default))
}

/// Read `key` as an optional integer identifier; `None` when absent or malformed.
pub fn optional_integer(record: &RawRecord, key: &str) -> Parsed<Option<i64>> {
    match record.get(key).and_then(as_integer) {
        Some(i) => Parsed::given(Some(i)),
        None => Parsed::fallback(None),
    }
}

/// Read `key` as a string, falling back to `default`.
///
/// Numbers are accepted and rendered with their JSON representation, so an
/// equinox written as `2000` becomes `"2000"`.
pub fn string_or(record: &RawRecord, key: &str, default: &str) -> Parsed<String> {
    match record.get(key) {
        Some(Value::String(s)) => Parsed::given(s.clone()),
        Some(Value::Number(n)) => Parsed::given(n.to_string()),
        _ => Parsed::fallback(default.to_string()),
    }
}

/// `true` iff `value` is a string equal to one of [`TRUTHY_TOKENS`].
pub fn is_truthy_token(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::String(s)) if TRUTHY_TOKENS.contains(&s.as_str()))
}
