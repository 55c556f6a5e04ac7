//! Cubes
//!
//! A cube is one named dataset tracked by the store. It owns an ordered
//! set of revisions; the newest one is the cube's `current` snapshot.
//! Revision lists are recomputed from disk on every access: one readdir,
//! never stale.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use quader_core::{export_due, matches_prefix, update_due, CatalogService};
use quader_domain::constants::{
    LAST_EXPORTED_MARKER, LAST_UPDATED_MARKER, STAND_KEY,
};
use quader_domain::{time, LoadedCube, QuaderError, Result};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::marker;
use super::revision::CubeRevision;

/// One cube inside a store root.
#[derive(Debug, Clone)]
pub struct Cube {
    name: String,
    directory: PathBuf,
}

impl Cube {
    pub(crate) fn new(name: &str, store_root: &Path) -> Self {
        Self { name: name.to_string(), directory: store_root.join(name) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn exists(&self) -> bool {
        self.directory.exists()
    }

    /// All revisions on disk, newest first.
    pub fn revisions(&self) -> Result<Vec<CubeRevision>> {
        if !self.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&self.directory).map_err(|e| {
            QuaderError::Io(format!("Failed to list `{}`: {}", self.directory.display(), e))
        })?;

        let mut revisions = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                QuaderError::Io(format!("Failed to list `{}`: {}", self.directory.display(), e))
            })?;
            if !entry.path().is_dir() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else { continue };
            if let Some(revision) = CubeRevision::from_entry(&self.name, &self.directory, name) {
                revisions.push(revision);
            }
        }
        revisions.sort_by_key(|revision| std::cmp::Reverse(revision.timestamp()));
        Ok(revisions)
    }

    /// The revision with the greatest timestamp, if any exists.
    pub fn current(&self) -> Result<Option<CubeRevision>> {
        Ok(self.revisions()?.into_iter().next())
    }

    /// The current revision's metadata, if the cube has a revision.
    pub fn metadata(&self) -> Result<Option<Map<String, Value>>> {
        match self.current()? {
            Some(revision) => revision.metadata().map(Some),
            None => Ok(None),
        }
    }

    pub fn last_updated(&self) -> Result<Option<NaiveDateTime>> {
        marker::read(&self.directory.join(LAST_UPDATED_MARKER))
    }

    pub fn last_exported(&self) -> Result<Option<NaiveDateTime>> {
        marker::read(&self.directory.join(LAST_EXPORTED_MARKER))
    }

    /// Whether a newer snapshot than the current revision is available.
    ///
    /// When `remote` is not supplied the catalog is asked for this cube's
    /// `stand`. A tie is not an update trigger; only strictly newer
    /// remote data is.
    pub async fn should_update(
        &self,
        catalog: &dyn CatalogService,
        remote: Option<NaiveDateTime>,
    ) -> Result<bool> {
        let current = match self.current()? {
            Some(revision) => revision,
            None => {
                info!(cube = %self.name, "Updating cube because it didn't exist yet");
                return Ok(true);
            }
        };

        let remote = match remote {
            Some(date) => date,
            None => {
                let entry = catalog.cube_metadata(&self.name).await?;
                entry.stand_date().ok_or_else(|| {
                    QuaderError::InvalidCube(format!(
                        "Catalog entry for `{}` carries no stand",
                        self.name
                    ))
                })?
            }
        };

        let due = update_due(Some(current.timestamp()), remote);
        if due {
            info!(cube = %self.name, "Updating cube because a newer version is available");
        } else {
            debug!(cube = %self.name, "Cube is up to date");
        }
        Ok(due)
    }

    /// Download a new revision if one is due (or `force`).
    ///
    /// The revision timestamp derives from the remote `stand`, not from
    /// the fetch time. Returns `true` when a revision was created.
    pub async fn update(
        &self,
        catalog: &dyn CatalogService,
        remote: Option<NaiveDateTime>,
        force: bool,
    ) -> Result<bool> {
        if !(force || self.should_update(catalog, remote).await?) {
            return Ok(false);
        }

        let payload = catalog.download_cube(&self.name).await?;
        let stand = payload
            .stand()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .ok_or_else(|| {
                QuaderError::InvalidCube(format!("Cube `{}` metadata carries no stand", self.name))
            })?;
        if payload.data.trim().is_empty() {
            return Err(QuaderError::InvalidCube(format!("Cube `{}` payload is empty", self.name)));
        }
        let timestamp = time::parse_stand(stand).map_err(|_| {
            QuaderError::InvalidCube(format!("Cube `{}` has invalid stand `{stand}`", self.name))
        })?;

        fs::create_dir_all(&self.directory).map_err(|e| {
            QuaderError::Io(format!("Failed to create `{}`: {}", self.directory.display(), e))
        })?;

        let revision = CubeRevision::at(&self.name, &self.directory, timestamp);
        revision.create(&payload.download_metadata, &payload.metadata, &payload.data, force)?;
        self.touch(LAST_UPDATED_MARKER)?;
        Ok(true)
    }

    /// Whether this cube's facts are due for export.
    pub fn should_export(&self, force: bool, prefix: Option<&str>) -> Result<bool> {
        if !matches_prefix(&self.name, prefix) {
            return Ok(false);
        }
        if force {
            return Ok(true);
        }
        Ok(export_due(self.last_updated()?, self.last_exported()?))
    }

    /// Load the current revision for export, if the cube is due.
    ///
    /// `last_exported` is touched before the data is read: a concurrent
    /// second run must see the export as already claimed, not still
    /// pending.
    pub fn export(&self, force: bool) -> Result<Option<LoadedCube>> {
        if !self.should_export(force, None)? {
            return Ok(None);
        }
        let Some(current) = self.current()? else {
            warn!(cube = %self.name, "Cube has no revision to export");
            return Ok(None);
        };
        self.touch(LAST_EXPORTED_MARKER)?;
        current.load().map(Some)
    }

    pub(crate) fn touch(&self, marker_name: &str) -> Result<()> {
        marker::touch(&self.directory.join(marker_name))
    }

    /// The remote `stand` recorded in the current revision's metadata.
    pub fn stand(&self) -> Result<Option<NaiveDateTime>> {
        let Some(metadata) = self.metadata()? else { return Ok(None) };
        Ok(metadata
            .get(STAND_KEY)
            .and_then(Value::as_str)
            .and_then(|raw| time::parse_stand(raw).ok()))
    }
}

impl std::fmt::Display for Cube {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
