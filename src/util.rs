// Utility helpers for coercing messy JSON values.
//
// This module centralizes all the "dirty" number/text handling so the rest
// of the code can assume clean, typed values.
use num_format::{Locale, ToFormattedString};
use serde_json::Value;

/// Parse a string into `f64` while being forgiving about formatting issues
/// that are common in the source exports (units appended to numbers, comma
/// decimal separators, stray whitespace).
///
/// - Strips every character except digits, sign, `.` and `,`.
/// - Normalizes `,` to `.` before parsing.
/// - Returns `None` for anything that still cannot be parsed, or that
///   parses to a non-finite value.
pub fn parse_f64_loose(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | ','))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerce a JSON value (number or string) into a non-negative count.
/// Negative and fractional
/// inputs are clamped/truncated; parse failures become `default`.
pub fn coerce_count(value: Option<&Value>, default: u32) -> u32 {
    match value {
        Some(Value::Number(n)) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .map(|v| v.max(0.0) as u32)
            .unwrap_or(default),
        Some(Value::String(s)) => parse_f64_loose(s)
            .map(|v| v.max(0.0) as u32)
            .unwrap_or(default),
        _ => default,
    }
}

/// Extract a trimmed text value out of a JSON string or number.
///
/// NPSN columns in particular show up both as strings and as bare numbers
/// depending on the export generation, so numbers are rendered back to
/// their literal form.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Same as [`value_text`] but substitutes `default` when absent.
pub fn text_or(value: Option<&Value>, default: &str) -> String {
    value
        .and_then(value_text)
        .unwrap_or_else(|| default.to_string())
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values. This is used
    // for counts in console messages (e.g., `1,532 records loaded`).
    n.to_formatted_string(&Locale::en)
}
