//! Single-writer lock using PID files
//!
//! The store assumes a single writer at a time over the shared filesystem
//! tree. The lock makes that assumption explicit: a second `update` or
//! `export` run against the same root refuses to start while the first
//! one is alive.

use std::fs;
use std::path::{Path, PathBuf};

use quader_domain::{QuaderError, Result};

/// Single-writer lock on a store root.
pub struct InstanceLock {
    pid_file: PathBuf,
}

impl InstanceLock {
    /// Acquire the writer lock for `root`.
    ///
    /// Returns an error if another live process holds it; a PID file left
    /// behind by a dead process is removed and re-acquired.
    pub fn acquire<P: AsRef<Path>>(root: P) -> Result<Self> {
        let pid_file = root.as_ref().join("quader.pid");

        if pid_file.exists() {
            if let Ok(content) = fs::read_to_string(&pid_file) {
                if let Ok(pid) = content.trim().parse::<u32>() {
                    if Self::is_process_running(pid) {
                        tracing::warn!(existing_pid = pid, "instance_lock.process_active");
                        return Err(QuaderError::Io(format!(
                            "Another writer is already running (PID: {pid}). Please stop it first."
                        )));
                    }
                    tracing::warn!(stale_pid = pid, "instance_lock.stale_pid_file_detected");
                }
            }
            if let Err(err) = fs::remove_file(&pid_file) {
                tracing::warn!(error = %err, path = %pid_file.display(), "instance_lock.remove_stale_pid_failed");
            }
        }

        let current_pid = std::process::id();
        fs::write(&pid_file, current_pid.to_string())
            .map_err(|e| QuaderError::Io(format!("Failed to create PID file: {e}")))?;

        tracing::info!(pid = current_pid, path = %pid_file.display(), "instance_lock.acquired");

        Ok(Self { pid_file })
    }

    #[cfg(target_os = "linux")]
    fn is_process_running(pid: u32) -> bool {
        Path::new("/proc").join(pid.to_string()).exists()
    }

    #[cfg(all(unix, not(target_os = "linux")))]
    fn is_process_running(pid: u32) -> bool {
        use std::process::Command;

        // `kill -0` checks for existence without sending a signal
        Command::new("kill")
            .arg("-0")
            .arg(pid.to_string())
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    fn is_process_running(pid: u32) -> bool {
        tracing::warn!(pid = pid, "instance_lock.process_check_unsupported");
        false
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.pid_file) {
            tracing::warn!(error = %e, path = %self.pid_file.display(), "instance_lock.remove_pid_failed");
        } else {
            tracing::info!(path = %self.pid_file.display(), "instance_lock.released");
        }
    }
}
