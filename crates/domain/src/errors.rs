//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Quader
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum QuaderError {
    /// The storage root directory does not exist. Fatal at construction;
    /// `CubeStore::create` bootstraps a new root explicitly.
    #[error("Storage not found: {0}")]
    StorageNotFound(String),

    /// A revision directory for the target timestamp already exists and
    /// overwrite was not requested.
    #[error("Revision conflict: {0}")]
    RevisionConflict(String),

    /// Remote metadata or payload for a cube is malformed (missing `stand`,
    /// empty data). Skips that cube, never aborts the batch.
    #[error("Invalid cube data: {0}")]
    InvalidCube(String),

    /// The catalog webservice is unreachable or returned a failure.
    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for Quader operations
pub type Result<T> = std::result::Result<T, QuaderError>;
