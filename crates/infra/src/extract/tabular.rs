//! Semicolon-delimited tabular payloads
//!
//! One header row of catalog codes, one row per observation. Columns
//! listed in the extractor's measure set come back as structured measure
//! wrappers (`{"value": ...}`) so downstream unpacking and identity can
//! tell them apart from dimensions; everything else stays scalar. Empty
//! cells are omitted from the fact.

use std::collections::BTreeSet;

use quader_core::{coerce_value, FactExtractor};
use quader_domain::{Fact, LoadedCube, QuaderError, Result};
use serde_json::{json, Map, Value};

/// The metadata key listing a cube's measure codes.
const MEASURES_KEY: &str = "inhalte";

/// Extractor for flat semicolon-delimited cube payloads.
#[derive(Debug, Clone, Default)]
pub struct TabularExtractor {
    measures: BTreeSet<String>,
}

impl TabularExtractor {
    /// Extractor with an explicit measure column set.
    pub fn new(measures: impl IntoIterator<Item = String>) -> Self {
        Self { measures: measures.into_iter().collect() }
    }

    /// Derive the measure set from a revision's metadata.
    ///
    /// The webservice lists measure codes under `inhalte`, either as a
    /// semicolon-separated string or (after coercion) as a list.
    pub fn from_metadata(metadata: &Map<String, Value>) -> Self {
        let measures = match metadata.get(MEASURES_KEY) {
            Some(Value::String(raw)) => raw
                .split(';')
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .map(str::to_string)
                .collect(),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => BTreeSet::new(),
        };
        Self { measures }
    }

    fn cell_value(&self, column: &str, raw: &str) -> Value {
        if self.measures.contains(column) {
            json!({ "value": coerce_value(raw) })
        } else {
            Value::String(raw.to_string())
        }
    }
}

impl FactExtractor for TabularExtractor {
    fn extract(&self, cube: &LoadedCube) -> Result<Vec<Fact>> {
        if cube.raw_data.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .flexible(true)
            .from_reader(cube.raw_data.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| {
                QuaderError::Parse(format!("Cube `{}` has an invalid header row: {}", cube.name, e))
            })?
            .iter()
            .map(str::to_string)
            .collect();

        let mut facts = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| {
                QuaderError::Parse(format!("Cube `{}` has an invalid data row: {}", cube.name, e))
            })?;

            let mut fact = Fact::new();
            for (column, raw) in headers.iter().zip(record.iter()) {
                let raw = raw.trim();
                if raw.is_empty() {
                    continue;
                }
                fact.insert(column.clone(), self.cell_value(column, raw));
            }
            if !fact.is_empty() {
                facts.push(fact);
            }
        }
        Ok(facts)
    }
}
