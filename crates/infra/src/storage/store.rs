//! The cube store (registry)
//!
//! Enumerates cubes under a root directory, orchestrates catalog-driven
//! update passes, and selects cubes due for export. The store is the
//! arena handing out `Cube` values by name; cubes and revisions never
//! point back into it.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use quader_core::CatalogService;
use quader_domain::constants::{
    CUBE_NAME_RE, LAST_EXPORTED_MARKER, LAST_UPDATED_MARKER, LOGS_DIR,
};
use quader_domain::{QuaderError, Result, UpdateReport};
use tracing::{error, info};

use super::cube::Cube;
use super::marker;

/// Filesystem-backed registry of cubes.
#[derive(Debug, Clone)]
pub struct CubeStore {
    directory: PathBuf,
}

impl CubeStore {
    /// Open an existing store root.
    ///
    /// Never creates anything: a missing root is `StorageNotFound`; use
    /// [`CubeStore::create`] to bootstrap one.
    pub fn open(directory: impl AsRef<Path>) -> Result<Self> {
        let directory = directory.as_ref();
        if !directory.is_dir() {
            return Err(QuaderError::StorageNotFound(format!(
                "Storage does not exist at `{}`. If you want to create it, use `create`",
                directory.display()
            )));
        }
        Ok(Self { directory: directory.to_path_buf() })
    }

    /// Bootstrap a new store root with the expected layout.
    pub fn create(directory: impl AsRef<Path>) -> Result<Self> {
        let directory = directory.as_ref();
        fs::create_dir(directory).map_err(|e| {
            QuaderError::Io(format!("Failed to create `{}`: {}", directory.display(), e))
        })?;
        fs::create_dir(directory.join(LOGS_DIR)).map_err(|e| {
            QuaderError::Io(format!("Failed to create `{}/logs`: {}", directory.display(), e))
        })?;
        info!(storage = %directory.display(), "Created storage");
        Self::open(directory)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.directory.join(LOGS_DIR)
    }

    /// Every on-disk cube whose name matches the catalog key pattern,
    /// sorted by name. Non-matching files and directories are silently
    /// skipped.
    pub fn cubes(&self) -> Result<Vec<Cube>> {
        let entries = fs::read_dir(&self.directory).map_err(|e| {
            QuaderError::Io(format!("Failed to list `{}`: {}", self.directory.display(), e))
        })?;

        let mut cubes = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                QuaderError::Io(format!("Failed to list `{}`: {}", self.directory.display(), e))
            })?;
            if !entry.path().is_dir() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else { continue };
            if CUBE_NAME_RE.is_match(name) {
                cubes.push(Cube::new(name, &self.directory));
            }
        }
        cubes.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(cubes)
    }

    /// The cube for `name`, or `None` if the name is not a catalog key.
    pub fn cube(&self, name: &str) -> Option<Cube> {
        CUBE_NAME_RE.is_match(name).then(|| Cube::new(name, &self.directory))
    }

    pub fn last_updated(&self) -> Result<Option<NaiveDateTime>> {
        marker::read(&self.directory.join(LAST_UPDATED_MARKER))
    }

    pub fn last_exported(&self) -> Result<Option<NaiveDateTime>> {
        marker::read(&self.directory.join(LAST_EXPORTED_MARKER))
    }

    /// Mark the beginning of a store-wide export pass.
    pub fn touch_last_exported(&self) -> Result<()> {
        marker::touch(&self.directory.join(LAST_EXPORTED_MARKER))
    }

    /// Run one catalog-driven update pass.
    ///
    /// The store-level `last_updated` marker is touched before iterating:
    /// a concurrent second run must see the pass as already claimed. A
    /// failure updating one cube is logged and does not abort the rest;
    /// an unreachable catalog index aborts the pass.
    pub async fn update(
        &self,
        catalog: &dyn CatalogService,
        prefix: Option<&str>,
        force: bool,
    ) -> Result<UpdateReport> {
        marker::touch(&self.directory.join(LAST_UPDATED_MARKER))?;

        let entries = catalog.entries(prefix).await?;
        info!(count = entries.len(), prefix = prefix.unwrap_or("*"), "Updating cubes from catalog");

        let mut report = UpdateReport::default();
        for entry in entries {
            let cube = Cube::new(&entry.code, &self.directory);
            match cube.update(catalog, entry.stand_date(), force).await {
                Ok(true) => report.updated += 1,
                Ok(false) => report.up_to_date += 1,
                Err(err) => {
                    error!(cube = %entry.code, error = %err, "Skipping cube after failed update");
                    report.failed += 1;
                }
            }
        }

        info!(
            updated = report.updated,
            up_to_date = report.up_to_date,
            failed = report.failed,
            "Update pass finished"
        );
        Ok(report)
    }

    /// All cubes due for export.
    pub fn cubes_for_export(&self, force: bool, prefix: Option<&str>) -> Result<Vec<Cube>> {
        let mut due = Vec::new();
        for cube in self.cubes()? {
            if cube.should_export(force, prefix)? {
                due.push(cube);
            }
        }
        Ok(due)
    }
}
