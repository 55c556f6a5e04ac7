//! Cube revisions
//!
//! A revision is one immutable, timestamped snapshot of a cube's raw
//! payload and metadata. Its directory name is the revision timestamp in
//! isoformat, derived from the remote `stand` rather than the fetch
//! time, so revision identity tracks source freshness.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use quader_domain::constants::{
    CURRENT_LINK, DATA_FILE, DOWNLOADED_MARKER, DOWNLOAD_FILE, EXPORTED_MARKER, META_FILE,
};
use quader_domain::{time, LoadedCube, QuaderError, Result};
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::marker;

/// One revision of a cube, addressed by its timestamp.
///
/// Holds only the owning cube's name and its own directory, never a live
/// back-pointer into the store.
#[derive(Debug, Clone)]
pub struct CubeRevision {
    cube_name: String,
    name: String,
    timestamp: NaiveDateTime,
    directory: PathBuf,
}

impl CubeRevision {
    /// Address the revision of `cube_name` at `timestamp` inside
    /// `cube_dir`. The revision may or may not exist on disk yet.
    pub(crate) fn at(cube_name: &str, cube_dir: &Path, timestamp: NaiveDateTime) -> Self {
        let name = time::revision_name(timestamp);
        let directory = cube_dir.join(&name);
        Self { cube_name: cube_name.to_string(), name, timestamp, directory }
    }

    /// Interpret a directory entry as a revision. `None` if the name is
    /// not a revision timestamp (`current`, marker files, strays).
    pub(crate) fn from_entry(cube_name: &str, cube_dir: &Path, entry_name: &str) -> Option<Self> {
        let timestamp = time::parse_revision_name(entry_name)?;
        Some(Self {
            cube_name: cube_name.to_string(),
            name: entry_name.to_string(),
            timestamp,
            directory: cube_dir.join(entry_name),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn exists(&self) -> bool {
        self.directory.exists()
    }

    /// When this revision was downloaded (local clock).
    pub fn downloaded(&self) -> Result<Option<NaiveDateTime>> {
        marker::read(&self.directory.join(DOWNLOADED_MARKER))
    }

    /// When this revision was last exported, if ever.
    pub fn exported(&self) -> Result<Option<NaiveDateTime>> {
        marker::read(&self.directory.join(EXPORTED_MARKER))
    }

    /// The persisted remote metadata (`meta.json`).
    pub fn metadata(&self) -> Result<Map<String, Value>> {
        let path = self.directory.join(META_FILE);
        let raw = fs::read_to_string(&path).map_err(|e| {
            QuaderError::Io(format!("Failed to read `{}`: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            QuaderError::Parse(format!("Corrupt metadata `{}`: {}", path.display(), e))
        })
    }

    /// Persist a freshly downloaded snapshot and repoint the cube's
    /// `current` link to it.
    ///
    /// Fails with `RevisionConflict` if the revision directory already
    /// exists and `overwrite` is false. The only mutating entry point for
    /// revisions; partial writes are not retried.
    pub fn create(
        &self,
        download_metadata: &Map<String, Value>,
        metadata: &Map<String, Value>,
        data: &str,
        overwrite: bool,
    ) -> Result<()> {
        debug!(cube = %self.cube_name, revision = %self.name, "Creating new revision");
        if overwrite {
            debug!("(Force updating)");
        }
        if self.exists() && !overwrite {
            return Err(QuaderError::RevisionConflict(format!(
                "Revision `{}` for cube `{}` already exists",
                self.name, self.cube_name
            )));
        }

        fs::create_dir_all(&self.directory).map_err(|e| {
            QuaderError::Io(format!("Failed to create `{}`: {}", self.directory.display(), e))
        })?;
        self.write_json(DOWNLOAD_FILE, download_metadata)?;
        self.write_json(META_FILE, metadata)?;
        let data_path = self.directory.join(DATA_FILE);
        fs::write(&data_path, data).map_err(|e| {
            QuaderError::Io(format!("Failed to write `{}`: {}", data_path.display(), e))
        })?;
        // the marker comes last: `downloaded` means the snapshot is complete
        marker::touch(&self.directory.join(DOWNLOADED_MARKER))?;

        self.repoint_current()?;
        info!(cube = %self.cube_name, revision = %self.name, "Created new revision");
        Ok(())
    }

    /// Deserialize the persisted payload for the record extractor.
    ///
    /// Side-effect-free; re-reads from disk on every call.
    pub fn load(&self) -> Result<LoadedCube> {
        let data_path = self.directory.join(DATA_FILE);
        let raw_data = fs::read_to_string(&data_path).map_err(|e| {
            QuaderError::Io(format!("Failed to read `{}`: {}", data_path.display(), e))
        })?;
        Ok(LoadedCube {
            name: self.cube_name.clone(),
            metadata: self.metadata()?,
            raw_data: raw_data.trim().to_string(),
        })
    }

    fn write_json(&self, file: &str, value: &Map<String, Value>) -> Result<()> {
        let path = self.directory.join(file);
        let rendered = serde_json::to_string_pretty(value)
            .map_err(|e| QuaderError::Parse(format!("Failed to serialize `{file}`: {e}")))?;
        fs::write(&path, rendered).map_err(|e| {
            QuaderError::Io(format!("Failed to write `{}`: {}", path.display(), e))
        })
    }

    /// Repoint the cube's `current` link at this revision.
    ///
    /// Remove-then-recreate: a crash between the two steps leaves the cube
    /// without a `current` link until the next revision is created.
    fn repoint_current(&self) -> Result<()> {
        let link = match self.directory.parent() {
            Some(cube_dir) => cube_dir.join(CURRENT_LINK),
            None => {
                return Err(QuaderError::Io(format!(
                    "Revision `{}` has no parent directory",
                    self.directory.display()
                )))
            }
        };
        if fs::symlink_metadata(&link).is_ok() {
            fs::remove_file(&link).map_err(|e| {
                QuaderError::Io(format!("Failed to remove `{}`: {}", link.display(), e))
            })?;
        }
        symlink_dir(&self.name, &link).map_err(|e| {
            QuaderError::Io(format!("Failed to link `{}`: {}", link.display(), e))
        })
    }
}

#[cfg(unix)]
fn symlink_dir(target: &str, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_dir(target: &str, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}
