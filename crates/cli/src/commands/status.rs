//! `quader status`: per-cube sync state as CSV on stdout

use std::io::{BufWriter, Write};

use chrono::NaiveDateTime;
use quader_domain::Config;
use quader_infra::CubeStore;
use serde_json::Value;
use tracing::info;

pub fn run(config: &Config) -> anyhow::Result<()> {
    let store = CubeStore::open(&config.storage.root)?;
    info!(storage = %store.directory().display(), "Obtaining storage status");

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    writeln!(out, "storage,name,last_updated,last_exported,remote_date,remote_status,revisions")?;

    for cube in store.cubes()? {
        let metadata = cube.metadata()?;
        let remote_status = metadata
            .as_ref()
            .and_then(|map| map.get("status"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        writeln!(
            out,
            "{},{},{},{},{},{},{}",
            store.directory().display(),
            cube.name(),
            render(cube.last_updated()?),
            render(cube.last_exported()?),
            render(cube.stand()?),
            remote_status,
            cube.revisions()?.len()
        )?;
    }
    out.flush()?;
    Ok(())
}

fn render(value: Option<NaiveDateTime>) -> String {
    value.map(|ts| ts.to_string()).unwrap_or_default()
}
