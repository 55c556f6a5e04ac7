//! `quader update`: fetch the catalog and download stale cubes

use quader_domain::Config;
use quader_infra::{CubeStore, GenesisClient, GenesisClientConfig, InstanceLock};
use tracing::info;

pub async fn run(config: &Config, prefix: Option<&str>, force: bool) -> anyhow::Result<()> {
    let store = CubeStore::open(&config.storage.root)?;
    let _lock = InstanceLock::acquire(store.directory())?;
    let client = GenesisClient::new(GenesisClientConfig::from(&config.catalog))?;

    let report = store.update(&client, prefix, force).await?;
    info!(
        updated = report.updated,
        up_to_date = report.up_to_date,
        failed = report.failed,
        "Update finished"
    );
    Ok(())
}
