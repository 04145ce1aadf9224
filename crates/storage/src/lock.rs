// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The lock manager (C4): a crash-safe, single-owner lock over a workspace,
//! backed by a JSON record rather than an OS file lock so a reclaim
//! decision can be made from first principles (pid liveness plus boot
//! generation) instead of relying on `flock` semantics that don't survive
//! NFS-mounted workspaces.

use crate::store::{read_json_optional, write_json_atomic, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use sysinfo::{Pid, System};
use thiserror::Error;
use tracing::{info, warn};

/// The persisted lock record: who holds the workspace and since when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    pub pid: u32,
    pub started_at: DateTime<Utc>,
    pub boot_id: String,
}

#[derive(Debug, Error)]
pub enum LockError {
    #[error("lock held by pid {pid} since {started_at}")]
    Held {
        pid: u32,
        started_at: DateTime<Utc>,
    },
    #[error("lock store error: {0}")]
    Store(#[from] StoreError),
    #[error("failed to release lock: {0}")]
    Release(std::io::Error),
}

/// Acquires and, on drop, releases the workspace lock.
pub struct LockGuard {
    path: PathBuf,
    pid: u32,
    boot_id: String,
}

impl LockGuard {
    pub fn record(&self) -> Result<LockRecord, StoreError> {
        read_json_optional(&self.path)?.ok_or(StoreError::Missing {
            path: self.path.clone(),
        })
    }
}

impl Drop for LockGuard {
    /// Release only if the on-disk record still names this process: a tick
    /// that overran its timeout and was reclaimed by another holder must
    /// not delete that holder's lock out from under it.
    fn drop(&mut self) {
        match read_json_optional::<LockRecord>(&self.path) {
            Ok(Some(record)) if record.pid == self.pid && record.boot_id == self.boot_id => {
                if let Err(error) = fs::remove_file(&self.path) {
                    if error.kind() != std::io::ErrorKind::NotFound {
                        warn!(path = %self.path.display(), %error, "failed to remove lock file on release");
                    }
                }
            }
            Ok(Some(record)) => {
                warn!(
                    path = %self.path.display(),
                    held_by_pid = record.pid,
                    our_pid = self.pid,
                    "lock was reclaimed by another owner; skipping release"
                );
            }
            Ok(None) => {}
            Err(error) => {
                warn!(path = %self.path.display(), %error, "failed to read lock file on release");
            }
        }
    }
}

/// Decides whether an existing lock record is still live, and acquires a
/// fresh one when it is not.
pub struct LockManager {
    current_boot_id: String,
}

impl LockManager {
    pub fn new(current_boot_id: String) -> Self {
        Self { current_boot_id }
    }

    /// Attempt to acquire the lock at `path`.
    ///
    /// A record from a different boot generation is always considered
    /// stale: the process that wrote it cannot still be running. A record
    /// from the current boot is stale only if its `pid` is no longer alive.
    /// Otherwise the lock is genuinely held and acquisition fails with
    /// [`LockError::Held`].
    pub fn acquire(&self, path: &Path) -> Result<LockGuard, LockError> {
        if let Some(existing) = read_json_optional::<LockRecord>(path)? {
            if existing.boot_id == self.current_boot_id && Self::pid_is_alive(existing.pid) {
                return Err(LockError::Held {
                    pid: existing.pid,
                    started_at: existing.started_at,
                });
            }
            info!(
                pid = existing.pid,
                boot_id = %existing.boot_id,
                "reclaiming stale lock from crashed or rebooted owner"
            );
        }

        let record = LockRecord {
            pid: std::process::id(),
            started_at: Utc::now(),
            boot_id: self.current_boot_id.clone(),
        };
        write_json_atomic(path, &record)?;
        Ok(LockGuard {
            path: path.to_path_buf(),
            pid: record.pid,
            boot_id: record.boot_id,
        })
    }

    fn pid_is_alive(pid: u32) -> bool {
        let system = System::new_all();
        system.process(Pid::from_u32(pid)).is_some()
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
