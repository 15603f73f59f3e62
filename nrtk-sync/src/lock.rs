//! Single-writer lock for an output tree.
//!
//! The lock is a file created with `create_new`; it holds the owner's PID and
//! is removed when the guard drops. A lock left behind by a process that is
//! no longer running is reclaimed.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{io_err, SyncError};

/// Guard for `<app_dir>/sync.lock`.
#[derive(Debug)]
pub struct SyncLock {
    path: PathBuf,
}

impl SyncLock {
    /// Take the lock, creating its parent directory if needed.
    ///
    /// Fails with [`SyncError::Locked`] if another live holder exists.
    pub fn acquire(path: &Path) -> Result<Self, SyncError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        let mut file = match create_lock_file(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if !remove_if_stale(path)? {
                    return Err(SyncError::Locked {
                        path: path.to_path_buf(),
                    });
                }
                create_lock_file(path).map_err(|e| contention_or_io(path, e))?
            }
            Err(e) => return Err(io_err(path, e)),
        };
        let lock = Self {
            path: path.to_path_buf(),
        };
        writeln!(file, "{}", std::process::id()).map_err(|e| io_err(path, e))?;
        tracing::debug!("acquired {}", path.display());
        Ok(lock)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn create_lock_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

fn contention_or_io(path: &Path, e: std::io::Error) -> SyncError {
    if e.kind() == ErrorKind::AlreadyExists {
        SyncError::Locked {
            path: path.to_path_buf(),
        }
    } else {
        io_err(path, e)
    }
}

/// Remove a lock whose recorded owner is no longer running.
///
/// A lock without a readable PID is treated as held.
fn remove_if_stale(path: &Path) -> Result<bool, SyncError> {
    let owner = match std::fs::read_to_string(path) {
        Ok(contents) => contents.trim().parse::<u32>().ok(),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(io_err(path, e)),
    };
    let Some(pid) = owner else {
        return Ok(false);
    };
    if process_alive(pid) {
        return Ok(false);
    }

    tracing::warn!(
        "removing stale lock {} left by pid {pid}",
        path.display()
    );
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(true),
        Err(e) => Err(io_err(path, e)),
    }
}

#[cfg(target_os = "linux")]
fn process_alive(pid: u32) -> bool {
    Path::new("/proc").join(pid.to_string()).exists()
}

#[cfg(all(unix, not(target_os = "linux")))]
fn process_alive(pid: u32) -> bool {
    std::process::Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stderr(std::process::Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(true)
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    true
}

impl Drop for SyncLock {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_file(&self.path) {
            tracing::warn!("failed to release {}: {err}", self.path.display());
        }
    }
}
