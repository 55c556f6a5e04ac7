//! Configuration structures

use serde::{Deserialize, Serialize};

/// Configuration for the application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub catalog: CatalogConfig,
}

/// Storage root settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory of the cube store
    pub root: String,
    /// Mirror log output into `<root>/logs/`
    #[serde(default)]
    pub file_logging: bool,
}

/// Remote catalog webservice settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the webservice, e.g. `https://www-genesis.destatis.de/genesisWS/rest/2020`
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Timeout for webservice requests
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Maximum number of catalog entries per listing request
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_page_size() -> u32 {
    500
}
