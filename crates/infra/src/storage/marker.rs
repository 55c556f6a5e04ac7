//! Timestamp marker files
//!
//! A marker is a plain text file holding one local-clock ISO-8601 instant.
//! All "last X happened at T" bookkeeping in the store goes through these
//! two operations. The parent directory must already exist; creating it
//! is the cube/store bootstrap's responsibility.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::NaiveDateTime;
use quader_domain::{time, QuaderError, Result};

/// Write the current instant into the marker at `path`, overwriting any
/// previous content.
pub fn touch(path: &Path) -> Result<()> {
    fs::write(path, time::now_string()).map_err(|e| {
        QuaderError::Io(format!("Failed to write marker `{}`: {}", path.display(), e))
    })
}

/// Read the marker at `path`. `None` if the file does not exist; a marker
/// that exists but does not parse is a corrupt store and surfaces as an
/// error.
pub fn read(path: &Path) -> Result<Option<NaiveDateTime>> {
    match fs::read_to_string(path) {
        Ok(raw) => time::parse_timestamp(&raw).map(Some).map_err(|_| {
            QuaderError::Parse(format!("Corrupt marker `{}`: `{}`", path.display(), raw.trim()))
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => {
            Err(QuaderError::Io(format!("Failed to read marker `{}`: {}", path.display(), e)))
        }
    }
}
