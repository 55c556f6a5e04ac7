//! Common data types used throughout the application

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::STAND_KEY;
use crate::time;

/// One entry of the remote data catalog.
///
/// `stand` is kept verbatim as reported by the webservice (German date
/// notation); [`CatalogEntry::stand_date`] parses it on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Catalog key of the cube, e.g. `11111BJ001`
    pub code: String,
    /// Remote "last changed" timestamp, verbatim
    #[serde(default)]
    pub stand: Option<String>,
    /// Remote availability status, verbatim
    #[serde(default)]
    pub status: Option<String>,
}

impl CatalogEntry {
    /// Parsed remote "last changed" timestamp, if present and well-formed.
    pub fn stand_date(&self) -> Option<NaiveDateTime> {
        self.stand.as_deref().and_then(|raw| time::parse_stand(raw).ok())
    }
}

/// Everything the export webservice returns for one cube download.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CubePayload {
    /// Metadata about the download call itself (service, language, ...)
    pub download_metadata: Map<String, Value>,
    /// Remote cube metadata, including the `stand` marker
    pub metadata: Map<String, Value>,
    /// Raw tabular payload, persisted verbatim
    pub data: String,
}

impl CubePayload {
    /// The remote `stand` value from the cube metadata, as a string.
    pub fn stand(&self) -> Option<&str> {
        self.metadata.get(STAND_KEY).and_then(Value::as_str)
    }
}

/// A revision's persisted payload, deserialized for the record extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedCube {
    /// Owning cube's catalog key
    pub name: String,
    /// Revision metadata (`meta.json` contents)
    pub metadata: Map<String, Value>,
    /// Raw tabular payload (`data.csv` contents)
    pub raw_data: String,
}

/// One flat record extracted from a cube payload.
///
/// Keys are dimension codes and bookkeeping fields; values are scalars or
/// structured measure wrappers (`{"value": ...}`). Insertion order is not
/// significant; fact identity is computed over the sorted key set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fact(pub Map<String, Value>);

impl Fact {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keys whose value is a structured measure wrapper.
    pub fn measure_keys(&self) -> Vec<String> {
        self.0
            .iter()
            .filter(|(_, value)| is_measure(value))
            .map(|(key, _)| key.clone())
            .collect()
    }
}

impl FromIterator<(String, Value)> for Fact {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// True if `value` is structured (object or array) rather than a scalar.
pub fn is_structured(value: &Value) -> bool {
    value.is_object() || value.is_array()
}

/// True if `value` is a measure wrapper: an object carrying a `value` field.
pub fn is_measure(value: &Value) -> bool {
    value.as_object().is_some_and(|map| map.contains_key("value"))
}

/// Outcome counts of one batch update pass over the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateReport {
    /// Cubes for which a new revision was created
    pub updated: usize,
    /// Cubes already at the remote stand
    pub up_to_date: usize,
    /// Cubes skipped because of an entity-scoped failure
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_catalog_entry_stand_date() {
        let entry = CatalogEntry {
            code: "11111BJ001".to_string(),
            stand: Some("01.01.2020".to_string()),
            status: None,
        };
        let date = entry.stand_date().unwrap();
        assert_eq!(date.format("%Y-%m-%d").to_string(), "2020-01-01");

        let entry = CatalogEntry { code: "11111BJ001".to_string(), stand: None, status: None };
        assert!(entry.stand_date().is_none());
    }

    #[test]
    fn test_cube_payload_stand() {
        let mut payload = CubePayload::default();
        assert!(payload.stand().is_none());

        payload.metadata.insert("stand".to_string(), json!("01.01.2020"));
        assert_eq!(payload.stand(), Some("01.01.2020"));
    }

    #[test]
    fn test_fact_measure_keys() {
        let fact: Fact = [
            ("id".to_string(), json!("08221")),
            ("ALTX20".to_string(), json!({"value": "X"})),
            ("BEVZ01".to_string(), json!({"value": 42})),
            ("year".to_string(), json!("2015")),
        ]
        .into_iter()
        .collect();

        let mut measures = fact.measure_keys();
        measures.sort();
        assert_eq!(measures, vec!["ALTX20".to_string(), "BEVZ01".to_string()]);
    }

    #[test]
    fn test_value_classification() {
        assert!(is_structured(&json!({"value": 1})));
        assert!(is_structured(&json!([1, 2])));
        assert!(!is_structured(&json!("text")));
        assert!(!is_structured(&json!(42)));

        assert!(is_measure(&json!({"value": 1})));
        assert!(!is_measure(&json!({"other": 1})));
        assert!(!is_measure(&json!("value")));
    }
}
