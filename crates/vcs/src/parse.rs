// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure parsers for git's machine-readable output formats (§4.3). Kept
//! separate from the I/O in [`crate::adapter`] so the parsing rules —
//! rename arrows, tab-delimited name-status lines, `??` untracked markers —
//! can be exercised without spawning a subprocess.

/// One line of `git status --porcelain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PorcelainEntry {
    pub index_status: char,
    pub worktree_status: char,
    pub path: String,
    /// Present only for `R`/`C` entries, which porcelain renders as
    /// `"<from> -> <to>"` in the path field.
    pub renamed_from: Option<String>,
}

impl PorcelainEntry {
    pub fn is_untracked(&self) -> bool {
        self.index_status == '?' && self.worktree_status == '?'
    }
}

/// Parse the output of `git status --porcelain`. Tolerant of a trailing
/// newline and blank lines; a line shorter than the minimal `"XY path"`
/// shape is skipped rather than panicking, since this reads untrusted
/// subprocess output.
pub fn parse_porcelain_status(text: &str) -> Vec<PorcelainEntry> {
    text.lines()
        .filter(|line| !line.is_empty())
        .filter_map(parse_porcelain_line)
        .collect()
}

fn parse_porcelain_line(line: &str) -> Option<PorcelainEntry> {
    if line.len() < 4 {
        return None;
    }
    let mut chars = line.chars();
    let index_status = chars.next()?;
    let worktree_status = chars.next()?;
    let rest = &line[2..];
    let rest = rest.strip_prefix(' ').unwrap_or(rest);

    let (path, renamed_from) = match rest.split_once(" -> ") {
        Some((from, to)) => (to.to_string(), Some(from.to_string())),
        None => (rest.to_string(), None),
    };

    Some(PorcelainEntry {
        index_status,
        worktree_status,
        path,
        renamed_from,
    })
}

/// One line of `git diff --name-status <base>` against the working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameStatusEntry {
    Modified(String),
    Added(String),
    Deleted(String),
    /// `(from, to, similarity_score)`.
    Renamed(String, String, u8),
}

/// Parse `git diff --name-status` output. Each line is tab-delimited:
/// `M\tpath`, `A\tpath`, `D\tpath`, or `R<score>\t<from>\t<to>` (§4.3).
/// Copy (`C<score>`) lines and anything else unrecognized are skipped —
/// the spec's name-status alphabet is M/A/D/R only.
pub fn parse_name_status(text: &str) -> Vec<NameStatusEntry> {
    text.lines()
        .filter(|line| !line.is_empty())
        .filter_map(parse_name_status_line)
        .collect()
}

fn parse_name_status_line(line: &str) -> Option<NameStatusEntry> {
    let mut fields = line.split('\t');
    let code = fields.next()?;
    match code.chars().next()? {
        'M' => Some(NameStatusEntry::Modified(fields.next()?.to_string())),
        'A' => Some(NameStatusEntry::Added(fields.next()?.to_string())),
        'D' => Some(NameStatusEntry::Deleted(fields.next()?.to_string())),
        'R' => {
            let score: u8 = code[1..].parse().unwrap_or(0);
            let from = fields.next()?.to_string();
            let to = fields.next()?.to_string();
            Some(NameStatusEntry::Renamed(from, to, score))
        }
        _ => None,
    }
}

/// One line of `git diff --numstat <base>...HEAD`: `<added>\t<deleted>\t<path>`.
/// A binary file reports `-` for both counts, which we treat as zero lines
/// changed (the file is still counted in `files_touched` via the
/// name-status pass, not here).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumstatEntry {
    pub added: u32,
    pub deleted: u32,
    pub path: String,
}

pub fn parse_numstat(text: &str) -> Vec<NumstatEntry> {
    text.lines()
        .filter(|line| !line.is_empty())
        .filter_map(parse_numstat_line)
        .collect()
}

fn parse_numstat_line(line: &str) -> Option<NumstatEntry> {
    let mut fields = line.split('\t');
    let added = fields.next()?;
    let deleted = fields.next()?;
    let path = fields.next()?.to_string();
    Some(NumstatEntry {
        added: added.parse().unwrap_or(0),
        deleted: deleted.parse().unwrap_or(0),
        path,
    })
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
