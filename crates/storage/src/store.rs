// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The atomic file store (C1): every JSON file the runner owns is written
//! via a write-to-`.tmp`, `fsync`, then `rename` sequence so a crash mid-write
//! never leaves a half-written file in place of a good one.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Errors surfaced by the atomic file store, kept distinct so callers can
/// tell "file never existed" apart from "file exists but is broken" (§4.1).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{path}: not found")]
    Missing { path: PathBuf },
    #[error("{path}: unreadable: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: malformed JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read and deserialize a JSON file, distinguishing "missing" from
/// "present but broken" so callers can decide per-file whether absence is
/// benign (§7, "missing optional files treated as empty").
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    if !path.exists() {
        return Err(StoreError::Missing {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|source| StoreError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a JSON file, treating a missing file as `None` rather than an
/// error — for the optional mirror files (`TASK.json`, `STATE.json`, …)
/// that simply don't exist before the first tick.
pub fn read_json_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    match read_json(path) {
        Ok(value) => Ok(Some(value)),
        Err(StoreError::Missing { .. }) => Ok(None),
        Err(other) => Err(other),
    }
}

/// Serialize and write a JSON file atomically: write to `<path>.tmp`,
/// `sync_all`, then `rename` over the destination. The rename is atomic on
/// the same filesystem, so a reader never observes a partially written
/// file.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StoreError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
    }

    let tmp_path = tmp_path_for(path);
    let write_result = (|| -> Result<(), StoreError> {
        let file = File::create(&tmp_path).map_err(|source| StoreError::Unreadable {
            path: tmp_path.clone(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value).map_err(|source| StoreError::Parse {
            path: tmp_path.clone(),
            source,
        })?;
        let file = writer.into_inner().map_err(|e| StoreError::Unreadable {
            path: tmp_path.clone(),
            source: e.into_error(),
        })?;
        file.sync_all().map_err(|source| StoreError::Unreadable {
            path: tmp_path.clone(),
            source,
        })
    })();
    if let Err(error) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }
    if let Err(source) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Unreadable {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

/// Write a plain-text file atomically, the same way [`write_json_atomic`]
/// does for JSON: write to `<path>.tmp`, `sync_all`, then `rename`. Used for
/// `REPORT.md`, which is a deterministic projection of `REPORT.json` rather
/// than JSON itself.
pub fn write_text_atomic(path: &Path, contents: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StoreError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
    }

    let tmp_path = tmp_path_for(path);
    let write_result = (|| -> Result<(), StoreError> {
        let mut file = File::create(&tmp_path).map_err(|source| StoreError::Unreadable {
            path: tmp_path.clone(),
            source,
        })?;
        use std::io::Write;
        file.write_all(contents.as_bytes())
            .map_err(|source| StoreError::Unreadable {
                path: tmp_path.clone(),
                source,
            })?;
        file.sync_all().map_err(|source| StoreError::Unreadable {
            path: tmp_path.clone(),
            source,
        })
    })();
    if let Err(error) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }
    if let Err(source) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Unreadable {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push_str(".tmp");
    path.with_file_name(name)
}

/// Sweep leftover `*.tmp` files matching `glob` under `dir`, left behind by
/// a crash between `File::create` and `rename` (§4.5 preflight crash
/// cleanup). Best-effort: logs and skips files it cannot remove rather than
/// failing the tick.
pub fn sweep_tmp_files(dir: &Path, glob: &globset::GlobMatcher) -> std::io::Result<u32> {
    if !dir.exists() {
        return Ok(0);
    }
    let mut removed = 0;
    for entry in walk_files(dir)? {
        let relative = entry
            .strip_prefix(dir)
            .unwrap_or(&entry)
            .to_string_lossy()
            .replace('\\', "/");
        if glob.is_match(&relative) {
            match fs::remove_file(&entry) {
                Ok(()) => removed += 1,
                Err(error) => warn!(path = %entry.display(), %error, "failed to remove stale tmp file"),
            }
        }
    }
    Ok(removed)
}

fn walk_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        for entry in fs::read_dir(&current)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else {
                out.push(path);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
