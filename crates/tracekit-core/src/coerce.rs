//! Numeric coercion for passport fields.
//!
//! Upstream feeds encode numbers as JSON numbers, dot-decimal strings and
//! comma-decimal strings interchangeably. Every passport number read in this
//! crate goes through [`coerce_number`].

use serde_json::Value;

/// Coerce an optional JSON value into a finite `f64`, substituting `0.0`
/// when the value is absent or unreadable.
#[must_use]
pub fn coerce_number(value: Option<&Value>) -> f64 {
    value.and_then(parse_number).unwrap_or(0.0)
}

/// Parse a JSON number or numeric string.
///
/// A comma is read as the decimal separator. Non-finite results are rejected.
#[must_use]
pub fn parse_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    };

    parsed.filter(|n| n.is_finite())
}

///
/// TESTS
///
