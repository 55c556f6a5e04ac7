//! Export pipeline
//!
//! Turns a loaded revision payload into sink-ready facts: extract, unpack
//! per measure, normalize, stamp the fact identity. The pipeline owns no
//! state beyond the extractor it delegates payload parsing to, so fan-out
//! over cubes (or chunks of one cube's facts) can run in parallel workers
//! sharing nothing but read access to the loaded revision.

use quader_domain::{Fact, LoadedCube, Result};
use serde_json::Value;
use tracing::debug;

use crate::facts::{normalize_fact, unpack_fact};
use crate::identity::compute_fact_id;
use crate::ports::FactExtractor;

/// Stateless extract/unpack/normalize/identity pipeline.
pub struct ExportPipeline<'a> {
    extractor: &'a dyn FactExtractor,
}

impl<'a> ExportPipeline<'a> {
    pub fn new(extractor: &'a dyn FactExtractor) -> Self {
        Self { extractor }
    }

    /// All sink-ready facts of one loaded cube, each carrying a computed
    /// `fact_id`.
    pub fn facts(&self, cube: &LoadedCube) -> Result<Vec<Fact>> {
        let extracted = self.extractor.extract(cube)?;
        debug!(cube = %cube.name, extracted = extracted.len(), "Extracted raw facts");

        let mut out = Vec::with_capacity(extracted.len());
        for fact in &extracted {
            for unpacked in unpack_fact(fact) {
                let mut normalized = normalize_fact(&unpacked, &cube.name)?;
                let fact_id = compute_fact_id(&normalized);
                normalized.insert("fact_id", Value::String(fact_id));
                out.push(normalized);
            }
        }

        debug!(cube = %cube.name, facts = out.len(), "Export pipeline finished");
        Ok(out)
    }
}
