//! Port interfaces for sync and export collaborators

use async_trait::async_trait;
use quader_domain::{CatalogEntry, CubePayload, Fact, LoadedCube, Result};

/// Remote catalog webservice.
///
/// Injected into the store's update pass; tests substitute an in-memory
/// fake. Implementations do not retry; batch-level "log and continue" is
/// the caller's policy.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// List catalog entries, optionally restricted to cube names starting
    /// with `prefix`.
    async fn entries(&self, prefix: Option<&str>) -> Result<Vec<CatalogEntry>>;

    /// Look up the catalog entry for a single cube.
    async fn cube_metadata(&self, name: &str) -> Result<CatalogEntry>;

    /// Download the raw payload and metadata for a single cube.
    async fn download_cube(&self, name: &str) -> Result<CubePayload>;
}

/// Record extractor turning a loaded revision payload into flat facts.
///
/// The engine treats the payload as opaque; measure values must come back
/// as structured wrappers (`{"value": ...}`) so unpacking and identity can
/// tell them apart from dimensions.
pub trait FactExtractor: Send + Sync {
    fn extract(&self, cube: &LoadedCube) -> Result<Vec<Fact>>;
}
