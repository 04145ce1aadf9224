// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Patch builder mode (§4.7): `task.builder.patch` is a unified diff. Every
//! path it touches is validated *before* the diff is ever handed to git —
//! path shape, scope, and symlink checks all run against the parsed header
//! paths, never against whatever git itself would have done with them.

use super::{BuilderError, BuilderOutcome};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tick_argv::{Argv, CancelToken, Outcome};
use tick_core::task::Scope;
use tick_core::BuilderResult;

/// One path referenced by a unified diff's `---`/`+++` headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchPath {
    pub path: String,
}

/// Extract every non-`/dev/null` path named in `---`/`+++` headers, in the
/// order they appear. A pure parser, kept separate from validation so the
/// header-scraping logic can be tested without a repo on disk.
pub fn extract_patch_paths(patch: &str) -> Vec<PatchPath> {
    let mut paths = Vec::new();
    for line in patch.lines() {
        let rest = if let Some(r) = line.strip_prefix("--- ") {
            r
        } else if let Some(r) = line.strip_prefix("+++ ") {
            r
        } else {
            continue;
        };
        if rest == "/dev/null" {
            continue;
        }
        // Strip the conventional `a/`/`b/` diff prefix, and any trailing
        // tab-separated timestamp git sometimes appends.
        let rest = rest.split('\t').next().unwrap_or(rest);
        let stripped = rest.strip_prefix("a/").or_else(|| rest.strip_prefix("b/")).unwrap_or(rest);
        let path = PatchPath { path: stripped.to_string() };
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
    paths
}

fn reject_invalid_shape(path: &str) -> Result<(), BuilderError> {
    if Path::new(path).is_absolute() {
        return Err(BuilderError::PatchInvalidPath(format!("{path} is absolute")));
    }
    if path.contains('\0') {
        return Err(BuilderError::PatchInvalidPath(format!("{path} contains NUL")));
    }
    if Path::new(path).components().any(|c| c == Component::ParentDir) {
        return Err(BuilderError::PatchInvalidPath(format!("{path} contains ..")));
    }
    Ok(())
}

fn resolves_inside_repo(repo_root: &Path, path: &str) -> Result<PathBuf, BuilderError> {
    let joined = repo_root.join(path);
    if !joined.starts_with(repo_root) {
        return Err(BuilderError::PatchInvalidPath(format!(
            "{path} resolves outside the repository root"
        )));
    }
    Ok(joined)
}

fn reject_scope_violation(path: &str, scope: &Scope) -> Result<(), BuilderError> {
    if !scope.forbidden_globs.is_empty() {
        let forbidden = tick_core::compile_globs(&scope.forbidden_globs)
            .map_err(|e| BuilderError::PatchScopeViolation(e.to_string()))?;
        if tick_core::glob_matches_any(&forbidden, path) {
            return Err(BuilderError::PatchScopeViolation(format!("{path} matches a forbidden glob")));
        }
    }
    if !scope.allowed_globs.is_empty() {
        let allowed = tick_core::compile_globs(&scope.allowed_globs)
            .map_err(|e| BuilderError::PatchScopeViolation(e.to_string()))?;
        if !tick_core::glob_matches_any(&allowed, path) {
            return Err(BuilderError::PatchScopeViolation(format!(
                "{path} is outside the allowed globs"
            )));
        }
    }
    Ok(())
}

/// Reject if `full_path` or any ancestor up to `repo_root` is a symlink.
/// Ancestors are checked too since a legitimate-looking path can resolve
/// through a symlinked parent directory out of the repo entirely.
fn reject_symlink(repo_root: &Path, full_path: &Path) -> Result<(), BuilderError> {
    let mut current = full_path.to_path_buf();
    loop {
        if let Ok(meta) = current.symlink_metadata() {
            if meta.file_type().is_symlink() {
                return Err(BuilderError::PatchSymlink(current.display().to_string()));
            }
        }
        if current == repo_root {
            break;
        }
        match current.parent() {
            Some(parent) if parent.starts_with(repo_root) || parent == repo_root => {
                current = parent.to_path_buf();
            }
            _ => break,
        }
    }
    Ok(())
}

/// Validate every path a patch touches against the task's scope, in the
/// order §4.7 specifies: shape, then scope, then symlinks.
pub fn validate_patch_paths(patch: &str, repo_root: &Path, scope: &Scope) -> Result<Vec<PatchPath>, BuilderError> {
    let paths = extract_patch_paths(patch);
    for p in &paths {
        reject_invalid_shape(&p.path)?;
        let full = resolves_inside_repo(repo_root, &p.path)?;
        reject_scope_violation(&p.path, scope)?;
        reject_symlink(repo_root, &full)?;
    }
    Ok(paths)
}

/// Apply `patch` via `git apply` against a temp file (never a shell
/// string), deleting the temp file whether apply succeeded or not.
pub async fn apply_patch(
    repo_root: &Path,
    patch: &str,
    timeout: Duration,
    cancel: &CancelToken,
) -> Result<(), BuilderError> {
    let tmp_path = repo_root.join(format!(".tick-patch-{}.tmp", uuid::Uuid::new_v4()));
    std::fs::write(&tmp_path, patch).map_err(|e| BuilderError::PatchApplyFailed(e.to_string()))?;

    let argv = Argv::new("git", repo_root).args(["apply", "--whitespace=nowarn"]).arg(tmp_path.display().to_string());
    let result = tick_argv::run(&argv, timeout, cancel).await;
    let _ = std::fs::remove_file(&tmp_path);

    match result {
        Ok(Outcome::Completed(c)) if c.success() => Ok(()),
        Ok(Outcome::Completed(c)) => Err(BuilderError::PatchApplyFailed(c.stderr_string())),
        Ok(Outcome::TimedOut { .. }) => Err(BuilderError::Timeout),
        Ok(Outcome::Cancelled) => Err(BuilderError::Cancelled),
        Err(source) => Err(BuilderError::Exec(source)),
    }
}

/// Run the full patch dispatch: validate, apply, and synthesize an
/// advisory [`BuilderResult`] summarizing the paths the patch touched.
pub async fn dispatch_patch(
    repo_root: &Path,
    patch: &str,
    scope: &Scope,
    timeout: Duration,
    cancel: &CancelToken,
) -> Result<BuilderOutcome, BuilderError> {
    let paths = validate_patch_paths(patch, repo_root, scope)?;
    apply_patch(repo_root, patch, timeout, cancel).await?;
    Ok(BuilderOutcome::Ran {
        result: Some(BuilderResult {
            summary: "applied a unified diff patch".to_string(),
            files_intended: paths.into_iter().map(|p| p.path).collect(),
            ..Default::default()
        }),
    })
}

#[cfg(test)]
#[path = "patch_tests.rs"]
mod tests;
