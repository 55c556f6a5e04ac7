//! `quader init`: bootstrap a new storage root

use std::path::Path;

use quader_infra::CubeStore;
use tracing::info;

pub fn run(directory: &Path) -> anyhow::Result<()> {
    let store = CubeStore::create(directory)?;
    info!(storage = %store.directory().display(), "Storage initialized");
    Ok(())
}
