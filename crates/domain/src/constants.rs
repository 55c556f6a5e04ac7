//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

use once_cell::sync::Lazy;
use regex::Regex;

/// GENESIS regional dimension codes, ordered by NUTS level (0 = country,
/// 4 = municipality).
pub const GENESIS_REGIONS: [&str; 5] = ["dinsg", "dland", "regbez", "kreise", "gemein"];

/// Bookkeeping keys that carry fact metadata rather than statistical
/// dimensions. Lower-cased in normalized facts.
pub const META_KEYS: [&str; 15] = [
    "dinsg",
    "dland",
    "regbez",
    "kreise",
    "gemein",
    "stag",
    "date",
    "jahr",
    "year",
    "id",
    "fact_id",
    "nuts_level",
    "cube",
    "fact_key",
    "fact_value",
];

/// Metadata keys that are re-included in the fact identity: two facts
/// differing only in region, date, year or cube are distinct records.
pub const IDENTITY_META_KEYS: [&str; 4] = ["id", "date", "year", "cube"];

/// Metadata key holding the remote "last changed" timestamp of a cube.
pub const STAND_KEY: &str = "stand";

/// Pattern every catalog cube name matches (five digits followed by an
/// upper-case letter, e.g. `11111BJ001`).
pub static CUBE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{5}[A-Z]").expect("cube name pattern is valid"));

// On-disk layout
pub const LAST_UPDATED_MARKER: &str = "last_updated";
pub const LAST_EXPORTED_MARKER: &str = "last_exported";
pub const DOWNLOADED_MARKER: &str = "downloaded";
pub const EXPORTED_MARKER: &str = "exported";
pub const CURRENT_LINK: &str = "current";
pub const META_FILE: &str = "meta.json";
pub const DOWNLOAD_FILE: &str = "download.json";
pub const DATA_FILE: &str = "data.csv";
pub const LOGS_DIR: &str = "logs";

/// True if `key` (case-insensitive) is a fact metadata key.
pub fn is_meta_key(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    META_KEYS.contains(&lower.as_str())
}

/// True if `key` (case-insensitive) is a metadata key that still
/// discriminates fact identity.
pub fn is_identity_meta_key(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    IDENTITY_META_KEYS.contains(&lower.as_str())
}
