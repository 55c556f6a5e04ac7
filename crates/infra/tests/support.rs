//! Shared test support: an in-memory catalog service fake.

use std::collections::HashMap;

use async_trait::async_trait;
use quader_core::CatalogService;
use quader_domain::{CatalogEntry, CubePayload, QuaderError, Result};
use serde_json::json;

/// In-memory `CatalogService` for store tests.
#[derive(Default)]
pub struct MockCatalog {
    entries: Vec<CatalogEntry>,
    payloads: HashMap<String, CubePayload>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a cube with a `stand`, measure list and raw payload. The
    /// catalog entry and the download metadata carry the same `stand`.
    pub fn with_cube(mut self, code: &str, stand: &str, measures: &str, data: &str) -> Self {
        self.entries.push(CatalogEntry {
            code: code.to_string(),
            stand: Some(stand.to_string()),
            status: Some("vollständig".to_string()),
        });

        let mut payload = CubePayload::default();
        payload.metadata.insert("stand".to_string(), json!(stand));
        if !measures.is_empty() {
            payload.metadata.insert("inhalte".to_string(), json!(measures));
        }
        payload.data = data.to_string();
        self.payloads.insert(code.to_string(), payload);
        self
    }

    /// Register a catalog entry without a `stand` of its own (forces the
    /// per-cube metadata lookup).
    pub fn with_entry_without_stand(mut self, code: &str) -> Self {
        self.entries.push(CatalogEntry { code: code.to_string(), stand: None, status: None });
        self
    }

    /// Move a cube's remote `stand` (entry and payload metadata).
    pub fn set_stand(&mut self, code: &str, stand: &str) {
        for entry in &mut self.entries {
            if entry.code == code {
                entry.stand = Some(stand.to_string());
            }
        }
        if let Some(payload) = self.payloads.get_mut(code) {
            payload.metadata.insert("stand".to_string(), json!(stand));
        }
    }

    /// Override a cube's payload metadata `stand` only (diverging from the
    /// catalog entry).
    pub fn set_payload_stand(&mut self, code: &str, stand: &str) {
        if let Some(payload) = self.payloads.get_mut(code) {
            payload.metadata.insert("stand".to_string(), json!(stand));
        }
    }

    /// Override a cube's raw payload.
    pub fn set_data(&mut self, code: &str, data: &str) {
        if let Some(payload) = self.payloads.get_mut(code) {
            payload.data = data.to_string();
        }
    }
}

#[async_trait]
impl CatalogService for MockCatalog {
    async fn entries(&self, prefix: Option<&str>) -> Result<Vec<CatalogEntry>> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| prefix.map_or(true, |p| entry.code.starts_with(p)))
            .cloned()
            .collect())
    }

    async fn cube_metadata(&self, name: &str) -> Result<CatalogEntry> {
        // metadata lookups resolve the stand from the payload, so entries
        // registered without one still get an answer
        let entry = self
            .entries
            .iter()
            .find(|entry| entry.code == name)
            .cloned()
            .ok_or_else(|| QuaderError::Catalog(format!("Cube `{name}` is not in the catalog")))?;
        if entry.stand.is_some() {
            return Ok(entry);
        }
        let stand = self
            .payloads
            .get(name)
            .and_then(|payload| payload.stand())
            .map(str::to_string);
        Ok(CatalogEntry { stand, ..entry })
    }

    async fn download_cube(&self, name: &str) -> Result<CubePayload> {
        self.payloads
            .get(name)
            .cloned()
            .ok_or_else(|| QuaderError::Catalog(format!("No payload for `{name}`")))
    }
}

/// A small two-measure payload: two rows, `BEVZ01` and `BEVZ02` measures.
pub const SAMPLE_DATA: &str = "DLAND;JAHR;BEVZ01;BEVZ02\n08;2015;1234;11\n09;2015;5678;22\n";
