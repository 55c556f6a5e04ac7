//! Logging initialization
//!
//! Structured tracing to stderr, filtered via `RUST_LOG` (default `info`).
//! When a storage root has file logging enabled, output is mirrored into
//! its `logs/` directory with a daily-rolled file.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber.
///
/// Returns the appender guard when file logging is active; it must stay
/// alive for the duration of the process or buffered lines are lost.
pub fn init(file_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match file_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "quader.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::io::stderr.and(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}
