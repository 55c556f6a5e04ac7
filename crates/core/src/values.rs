//! Metadata value coercion
//!
//! Catalog metadata arrives as bare strings. Coercion into structured JSON
//! is an explicit, exhaustively-cased parser: integer, then float, then a
//! bracketed list literal of scalars, else the string passes through
//! unchanged. No expression evaluation of any kind. Leading zeros keep a
//! value textual; catalog codes like `08221` are identifiers, not numbers.

use serde_json::{Number, Value};

/// Coerce a raw metadata string into a typed JSON value.
pub fn coerce_value(raw: &str) -> Value {
    if let Some(int) = parse_integer(raw) {
        return Value::Number(int.into());
    }
    if let Some(float) = parse_float(raw) {
        if let Some(number) = Number::from_f64(float) {
            return Value::Number(number);
        }
    }
    if let Some(list) = parse_list(raw) {
        return Value::Array(list);
    }
    Value::String(raw.to_string())
}

fn parse_integer(raw: &str) -> Option<i64> {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    raw.parse().ok()
}

fn parse_float(raw: &str) -> Option<f64> {
    let unsigned = raw.strip_prefix('-').unwrap_or(raw);
    let (integral, fractional) = unsigned.split_once('.')?;
    if integral.is_empty()
        || fractional.is_empty()
        || !integral.bytes().all(|b| b.is_ascii_digit())
        || !fractional.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    if integral.len() > 1 && integral.starts_with('0') {
        return None;
    }
    raw.parse().ok()
}

/// Parse a flat list literal: `[a, b, c]`. Elements are trimmed, optional
/// matching quotes are stripped, and each element is coerced as a scalar.
/// Nested brackets are not a list literal.
fn parse_list(raw: &str) -> Option<Vec<Value>> {
    let inner = raw.strip_prefix('[')?.strip_suffix(']')?;
    if inner.contains('[') || inner.contains(']') {
        return None;
    }
    if inner.trim().is_empty() {
        return Some(Vec::new());
    }
    Some(inner.split(',').map(|element| coerce_scalar(unquote(element.trim()))).collect())
}

fn coerce_scalar(raw: &str) -> Value {
    if let Some(int) = parse_integer(raw) {
        return Value::Number(int.into());
    }
    if let Some(float) = parse_float(raw) {
        if let Some(number) = Number::from_f64(float) {
            return Value::Number(number);
        }
    }
    Value::String(raw.to_string())
}

fn unquote(raw: &str) -> &str {
    for quote in ['\'', '"'] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return &raw[1..raw.len() - 1];
        }
    }
    raw
}
