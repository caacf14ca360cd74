// Copyright (c) The parse-test-reports Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolution of report globs into files.
//!
//! A path setting is a comma-separated list of globs, for example
//! `build/test-results/**/*.xml, ~/reports/*.xml`. Each glob is expanded independently, and a glob
//! that fails to expand is logged and skipped rather than failing the whole resolution.
//!
//! Glob syntax follows [`globset`], with `*`, `?`, `[...]` and `{a,b}` confined to a single path
//! component and `**` matching any number of components.

use crate::{
    errors::{DisplayErrorChain, GlobExpandError, InvalidPath},
    plural,
};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use globset::GlobBuilder;
use itertools::Itertools;
use std::path::Path;
use tracing::{debug, warn};

/// Splits a comma-separated path setting into individual globs.
///
/// Whitespace around each glob is trimmed, empty segments are dropped and repeated globs are
/// reported once, in order of first occurrence.
pub fn parse_path_spec(spec: &str) -> Vec<String> {
    spec.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .unique()
        .map(ToOwned::to_owned)
        .collect()
}

/// Expands a leading `~` to the current user's home directory.
///
/// A bare `~`, or `~` followed by a path separator, is expanded. `~user` is rejected. Any other
/// path, including the empty string, is returned unchanged.
pub fn expand_home(path: &str) -> Result<Utf8PathBuf, InvalidPath> {
    expand_home_with(path, home::home_dir)
}

fn expand_home_with(
    path: &str,
    home_dir: impl FnOnce() -> Option<std::path::PathBuf>,
) -> Result<Utf8PathBuf, InvalidPath> {
    let Some(rest) = path.strip_prefix('~') else {
        return Ok(Utf8PathBuf::from(path));
    };
    if rest.starts_with(|c: char| c != '/' && c != '\\') {
        return Err(InvalidPath::OtherUserHome {
            path: path.to_owned(),
        });
    }

    let home = home_dir().ok_or_else(|| InvalidPath::HomeDirUnavailable {
        path: path.to_owned(),
    })?;
    let home = Utf8PathBuf::try_from(home).map_err(|err| InvalidPath::NonUtf8HomeDir {
        path: path.to_owned(),
        home: err.into_path_buf(),
    })?;

    let rest = rest.trim_start_matches(['/', '\\']);
    if rest.is_empty() {
        Ok(home)
    } else {
        Ok(home.join(rest))
    }
}

/// Resolves globs into a deduplicated list of files.
///
/// Matches for each glob are sorted; the combined list keeps the first occurrence of every path.
/// Globs that fail to expand are logged and skipped. A glob that matches nothing is not an error.
pub fn resolve_files<S: AsRef<str>>(specs: &[S]) -> Vec<Utf8PathBuf> {
    let mut files = Vec::new();
    for spec in specs {
        let spec = spec.as_ref();
        match expand_glob(spec) {
            Ok(matches) => {
                debug!(
                    "glob `{spec}` matched {} {}",
                    matches.len(),
                    plural::files_str(matches.len()),
                );
                files.extend(matches);
            }
            Err(error) => {
                warn!(
                    "skipping report path `{spec}`: {}",
                    DisplayErrorChain::new(&error)
                );
            }
        }
    }

    files.into_iter().unique().collect()
}

/// Expands a single glob, after home expansion, against the filesystem.
///
/// The pattern is normalized lexically first: repeated separators and interior `.` components are
/// dropped, and `..` cancels the literal component before it. Matches are reported in that
/// normalized form, so different spellings of one path resolve to the same entry.
pub fn expand_glob(spec: &str) -> Result<Vec<Utf8PathBuf>, GlobExpandError> {
    let pattern = normalize_pattern(&expand_home(spec)?);

    // Split the pattern into the longest literal directory prefix and the part with glob
    // metacharacters. Only the prefix is walked.
    let mut base = Utf8PathBuf::new();
    let mut glob_components = 0;
    let mut recursive = false;
    for component in pattern.components() {
        if glob_components == 0 && !is_glob_component(component) {
            base.push(component);
        } else {
            glob_components += 1;
            recursive |= component.as_str() == "**";
        }
    }

    if glob_components == 0 {
        // No metacharacters: the path matches itself if it exists.
        return Ok(if pattern.exists() { vec![pattern] } else { vec![] });
    }

    let matcher = GlobBuilder::new(pattern.as_str())
        .literal_separator(true)
        .build()
        .map_err(|err| GlobExpandError::InvalidPattern {
            pattern: pattern.clone(),
            err,
        })?
        .compile_matcher();

    let walk_root = if base.as_str().is_empty() {
        Utf8Path::new(".")
    } else {
        base.as_path()
    };
    let mut walker = walkdir::WalkDir::new(walk_root).min_depth(1);
    if !recursive {
        walker = walker.max_depth(glob_components);
    }

    let mut matches = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                debug!("while expanding `{spec}`, skipping unreadable entry: {error}");
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }
        // Relative globs without a literal prefix are walked from `.`, but match without it.
        let path = if base.as_str().is_empty() {
            entry.path().strip_prefix(".").unwrap_or(entry.path())
        } else {
            entry.path()
        };
        let Some(path) = to_utf8(path, spec) else {
            continue;
        };
        if matcher.is_match(path.as_std_path()) {
            matches.push(path);
        }
    }

    matches.sort_unstable();
    Ok(matches)
}

// The walker yields paths without `//`, `/./` or `..`, so the matcher must see the same shape.
fn normalize_pattern(pattern: &Utf8Path) -> Utf8PathBuf {
    let mut components: Vec<Utf8Component<'_>> = Vec::new();
    for component in pattern.components() {
        if component != Utf8Component::ParentDir {
            components.push(component);
            continue;
        }
        match components.last() {
            Some(&last)
                if matches!(last, Utf8Component::Normal(_)) && !is_glob_component(last) =>
            {
                components.pop();
            }
            // `/..` is `/`.
            Some(Utf8Component::RootDir | Utf8Component::Prefix(_)) => {}
            Some(Utf8Component::CurDir) => {
                components.pop();
                components.push(component);
            }
            _ => components.push(component),
        }
    }
    components.into_iter().collect()
}

fn is_glob_component(component: Utf8Component<'_>) -> bool {
    match component {
        Utf8Component::Normal(s) => s.contains(['*', '?', '[', '{']),
        _ => false,
    }
}

fn to_utf8(path: &Path, spec: &str) -> Option<Utf8PathBuf> {
    match Utf8PathBuf::try_from(path.to_path_buf()) {
        Ok(path) => Some(path),
        Err(error) => {
            debug!(
                "while expanding `{spec}`, skipping non-UTF-8 path `{}`",
                error.as_path().display()
            );
            None
        }
    }
}
