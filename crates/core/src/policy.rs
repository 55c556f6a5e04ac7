//! Sync decision policy
//!
//! Pure functions deciding, given local and remote timestamps, whether an
//! update or export is due. The store consults these before touching the
//! filesystem or the network; keeping them free of I/O makes every edge
//! case testable in isolation.

use chrono::NaiveDateTime;

/// True if a cube needs a new revision.
///
/// A cube with no revision at all is always due. Otherwise only a strictly
/// newer remote `stand` triggers a refresh; a tie means the local snapshot
/// already reflects the source.
pub fn update_due(current: Option<NaiveDateTime>, remote: NaiveDateTime) -> bool {
    match current {
        None => true,
        Some(local) => local < remote,
    }
}

/// True if a cube's facts should be exported.
///
/// A cube that was never exported is due. After the first export, only an
/// update newer than the last export makes it due again.
pub fn export_due(
    last_updated: Option<NaiveDateTime>,
    last_exported: Option<NaiveDateTime>,
) -> bool {
    match last_exported {
        None => true,
        Some(exported) => last_updated.is_some_and(|updated| updated > exported),
    }
}

/// True if `name` passes an optional prefix filter.
pub fn matches_prefix(name: &str, prefix: Option<&str>) -> bool {
    prefix.map_or(true, |p| name.starts_with(p))
}
