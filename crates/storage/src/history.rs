// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The history directory: a per-run snapshot of debug artifacts
//! (`<workspace>/history/<run_id>/...`), capped by `history.max_mb` (§6,
//! §4.11). The store only measures and reports; deciding whether to block
//! on a full cap, and any cleanup, is the engine's call (§7: "prerequisites
//! unmet ... history cap").

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Tracks and enforces the configured disk budget for `history/`.
pub struct HistoryStore {
    root: PathBuf,
    max_mb: u64,
}

impl HistoryStore {
    pub fn new(root: impl Into<PathBuf>, max_mb: u64) -> Self {
        Self {
            root: root.into(),
            max_mb,
        }
    }

    pub fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root.join(run_id)
    }

    /// Write a debug artifact into `history/<run_id>/<name>`, creating the
    /// run directory (and, if `name` contains path separators, any
    /// intermediate subdirectories such as `planner/`) as needed. Not
    /// atomic: history is advisory, never replayed to recover state.
    pub fn write_artifact(&self, run_id: &str, name: &str, contents: &[u8]) -> Result<(), HistoryError> {
        let path = self.run_dir(run_id).join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| HistoryError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, contents).map_err(|source| HistoryError::Io { path, source })
    }

    /// Total size of everything under `history/`, in megabytes (base-1024).
    pub fn total_size_mb(&self) -> Result<u64, HistoryError> {
        Ok(self.total_size_bytes()? / (1024 * 1024))
    }

    fn total_size_bytes(&self) -> Result<u64, HistoryError> {
        if !self.root.exists() {
            return Ok(0);
        }
        let mut total = 0u64;
        let mut stack = vec![self.root.clone()];
        while let Some(dir) = stack.pop() {
            let entries = fs::read_dir(&dir).map_err(|source| HistoryError::Io {
                path: dir.clone(),
                source,
            })?;
            for entry in entries {
                let entry = entry.map_err(|source| HistoryError::Io {
                    path: dir.clone(),
                    source,
                })?;
                let path = entry.path();
                let metadata = entry.metadata().map_err(|source| HistoryError::Io {
                    path: path.clone(),
                    source,
                })?;
                if metadata.is_dir() {
                    stack.push(path);
                } else {
                    total += metadata.len();
                }
            }
        }
        Ok(total)
    }

    /// Whether the directory currently exceeds the configured `max_mb`.
    pub fn is_over_cap(&self) -> Result<bool, HistoryError> {
        Ok(self.total_size_mb()? > self.max_mb)
    }

    /// Per-run directories under `history/`, oldest modification time
    /// first, so a caller can decide which runs to prune when over cap.
    pub fn run_dirs_oldest_first(&self) -> Result<Vec<PathBuf>, HistoryError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut dirs: Vec<(SystemTime, PathBuf)> = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(|source| HistoryError::Io {
            path: self.root.clone(),
            source,
        })? {
            let entry = entry.map_err(|source| HistoryError::Io {
                path: self.root.clone(),
                source,
            })?;
            let path = entry.path();
            if path.is_dir() {
                let modified = entry
                    .metadata()
                    .and_then(|m| m.modified())
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                dirs.push((modified, path));
            }
        }
        dirs.sort_by_key(|(modified, _)| *modified);
        Ok(dirs.into_iter().map(|(_, path)| path).collect())
    }

    pub fn remove_run_dir(&self, path: &Path) -> Result<(), HistoryError> {
        fs::remove_dir_all(path).map_err(|source| HistoryError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
