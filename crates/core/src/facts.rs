//! Fact normalization and unpacking
//!
//! Raw facts come out of the record extractor keyed by catalog codes: a
//! region dimension, a temporal dimension (`STAG` cutoff date or `JAHR`
//! year) and one structured measure per indicator. Normalization rewrites
//! the bookkeeping coordinates into the flat shape sinks consume
//! (`id`/`nuts_level`, `date`/`year`, `cube`); unpacking splits
//! multi-measure facts into one fact per measure.

use chrono::{Datelike, NaiveDate};
use quader_domain::constants::{is_meta_key, GENESIS_REGIONS};
use quader_domain::types::is_measure;
use quader_domain::{Fact, QuaderError, Result};
use serde_json::Value;

/// Normalize one extracted fact for export.
///
/// - sets `cube` to the owning cube's name,
/// - maps the first populated region dimension to `id` and `nuts_level`
///   (the municipality level carries no NUTS index),
/// - maps `STAG` (`dd.mm.yyyy`) to ISO `date` plus `year`, and `JAHR` to
///   `year`,
/// - lower-cases bookkeeping keys, upper-cases dimension keys.
pub fn normalize_fact(fact: &Fact, cube_name: &str) -> Result<Fact> {
    let mut out = fact.clone();
    out.insert("cube", Value::String(cube_name.to_string()));

    for (nuts, region) in GENESIS_REGIONS.iter().enumerate() {
        let key = region.to_ascii_uppercase();
        let Some(id) = out.get(&key).and_then(scalar_of).filter(|id| !id.is_empty()) else {
            continue;
        };
        out.insert("id", Value::String(id));
        let level = if nuts < 4 { Value::from(nuts) } else { Value::Null };
        out.insert("nuts_level", level);
        out.remove(&key);
        break;
    }

    if let Some(value) = out.remove("STAG") {
        let raw = scalar_of(&value).ok_or_else(|| {
            QuaderError::Parse(format!("Cutoff date of cube `{cube_name}` is not a scalar"))
        })?;
        let date = NaiveDate::parse_from_str(raw.trim(), "%d.%m.%Y").map_err(|e| {
            QuaderError::Parse(format!("Invalid cutoff date `{raw}` in cube `{cube_name}`: {e}"))
        })?;
        out.insert("date", Value::String(date.format("%Y-%m-%d").to_string()));
        out.insert("year", Value::String(date.year().to_string()));
    }

    if let Some(value) = out.remove("JAHR") {
        let year = scalar_of(&value).ok_or_else(|| {
            QuaderError::Parse(format!("Year of cube `{cube_name}` is not a scalar"))
        })?;
        out.insert("year", Value::String(year));
    }

    Ok(out
        .iter()
        .map(|(key, value)| {
            let key = if is_meta_key(key) {
                key.to_ascii_lowercase()
            } else {
                key.to_ascii_uppercase()
            };
            (key, value.clone())
        })
        .collect())
}

/// Split a fact into one fact per structured measure.
///
/// Each clone keeps its own measure plus `fact_key` (the measure's code)
/// and `fact_value` (its scalar value) and drops the sibling measures. A
/// fact without any measure passes through unchanged.
pub fn unpack_fact(fact: &Fact) -> Vec<Fact> {
    let measure_keys = fact.measure_keys();
    if measure_keys.is_empty() {
        return vec![fact.clone()];
    }

    measure_keys
        .iter()
        .map(|key| {
            let mut unpacked = fact.clone();
            unpacked.insert("fact_key", Value::String(key.clone()));
            let value = unpacked
                .get(key)
                .and_then(|measure| measure.get("value"))
                .cloned()
                .unwrap_or(Value::Null);
            unpacked.insert("fact_value", value);
            for other in &measure_keys {
                if other != key {
                    unpacked.remove(other);
                }
            }
            unpacked
        })
        .collect()
}

/// The scalar carried by `value`: the inner `value` of a measure wrapper,
/// or the value itself. `None` for lists and non-measure objects.
fn scalar_of(value: &Value) -> Option<String> {
    let scalar = if is_measure(value) { value.get("value")? } else { value };
    match scalar {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
