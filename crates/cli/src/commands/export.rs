//! `quader export`: serialize facts of all cubes due for export
//!
//! Streams one JSON document per fact to stdout, or with `--output` writes
//! one file per fact (named by its identity) into a per-cube directory.
//! A failure exporting one cube is logged and does not abort the rest.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use quader_core::ExportPipeline;
use quader_domain::{Config, Fact};
use quader_infra::{Cube, CubeStore, InstanceLock, TabularExtractor};
use serde_json::Value;
use tracing::{error, info};

pub fn run(
    config: &Config,
    prefix: Option<&str>,
    force: bool,
    output: Option<&Path>,
    pretty: bool,
) -> anyhow::Result<()> {
    let store = CubeStore::open(&config.storage.root)?;
    let _lock = InstanceLock::acquire(store.directory())?;

    let cubes = store.cubes_for_export(force, prefix)?;
    if cubes.is_empty() {
        info!("Everything seems up to date");
        return Ok(());
    }

    info!(count = cubes.len(), "Starting to serialize cubes");
    // claim the pass before the per-cube work
    store.touch_last_exported()?;

    let stdout = std::io::stdout();
    let mut sink = BufWriter::new(stdout.lock());
    let mut total = 0_usize;
    let mut failed = 0_usize;

    for cube in &cubes {
        match export_cube(cube, force, output, pretty, &mut sink) {
            Ok(count) => total += count,
            Err(err) => {
                error!(cube = %cube.name(), error = %err, "Skipping cube after failed export");
                failed += 1;
            }
        }
    }
    sink.flush()?;

    info!(cubes = cubes.len() - failed, failed = failed, facts = total, "Serialized facts");
    Ok(())
}

fn export_cube(
    cube: &Cube,
    force: bool,
    output: Option<&Path>,
    pretty: bool,
    sink: &mut impl Write,
) -> anyhow::Result<usize> {
    let Some(loaded) = cube.export(force)? else {
        return Ok(0);
    };

    let extractor = TabularExtractor::from_metadata(&loaded.metadata);
    let facts = ExportPipeline::new(&extractor).facts(&loaded)?;

    match output {
        Some(dir) => write_fact_files(dir, cube.name(), &facts, pretty)?,
        None => {
            for fact in &facts {
                let line = if pretty {
                    serde_json::to_string_pretty(fact)?
                } else {
                    serde_json::to_string(fact)?
                };
                writeln!(sink, "{line}")?;
            }
        }
    }
    Ok(facts.len())
}

/// One `<fact_id>.json` per fact under `<dir>/<cube>/`.
fn write_fact_files(dir: &Path, cube_name: &str, facts: &[Fact], pretty: bool) -> anyhow::Result<()> {
    let cube_dir = dir.join(cube_name);
    fs::create_dir_all(&cube_dir)?;

    for fact in facts {
        let Some(fact_id) = fact.get("fact_id").and_then(Value::as_str) else {
            continue;
        };
        let rendered =
            if pretty { serde_json::to_string_pretty(fact)? } else { serde_json::to_string(fact)? };
        fs::write(cube_dir.join(format!("{fact_id}.json")), rendered)?;
    }
    Ok(())
}
