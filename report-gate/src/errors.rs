// Copyright (c) The parse-test-reports Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by report-gate.

use camino::Utf8PathBuf;
use std::{error::Error, fmt, path::PathBuf};
use thiserror::Error;

/// A report path could not be expanded to a filesystem path.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InvalidPath {
    /// The path used the `~user` form, which is not supported.
    #[error("cannot expand `{path}`: expanding another user's home directory is not supported")]
    OtherUserHome {
        /// The path that was being expanded.
        path: String,
    },

    /// The current user's home directory could not be determined.
    #[error("cannot expand `{path}`: home directory could not be determined")]
    HomeDirUnavailable {
        /// The path that was being expanded.
        path: String,
    },

    /// The current user's home directory is not valid UTF-8.
    #[error("cannot expand `{path}`: home directory `{}` is not valid UTF-8", .home.display())]
    NonUtf8HomeDir {
        /// The path that was being expanded.
        path: String,
        /// The home directory.
        home: PathBuf,
    },
}

/// A single report glob could not be expanded.
///
/// These errors are recoverable: the glob is skipped and resolution continues with the rest.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GlobExpandError {
    /// The `~` prefix could not be expanded.
    #[error(transparent)]
    InvalidPath(#[from] InvalidPath),

    /// The glob is not a valid pattern.
    #[error("invalid glob pattern `{pattern}`")]
    InvalidPattern {
        /// The pattern after home expansion.
        pattern: Utf8PathBuf,
        /// The underlying error.
        #[source]
        err: globset::Error,
    },
}

/// A quarantine date could not be parsed.
#[derive(Clone, Debug, Error)]
#[error("invalid {field} `{value}` (expected YYYY-MM-DD)")]
pub struct DateParseError {
    field: &'static str,
    value: String,
    #[source]
    err: chrono::ParseError,
}

impl DateParseError {
    pub(crate) fn new(field: &'static str, value: impl Into<String>, err: chrono::ParseError) -> Self {
        Self {
            field,
            value: value.into(),
            err,
        }
    }

    /// Returns the name of the field that failed to parse: `start_date` or `end_date`.
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Returns the value that failed to parse.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// The quarantine document could not be loaded.
///
/// This is fatal: when quarantine mode is requested, no aggregation happens without a valid
/// quarantine list.
#[derive(Debug, Error)]
#[error("failed to load quarantine list from `{location}`")]
pub struct LoadError {
    location: String,
    #[source]
    kind: LoadErrorKind,
}

impl LoadError {
    pub(crate) fn new(location: impl Into<String>, kind: LoadErrorKind) -> Self {
        Self {
            location: location.into(),
            kind,
        }
    }

    /// Returns the path or URL the document was being loaded from.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Returns the kind of error that occurred.
    pub fn kind(&self) -> &LoadErrorKind {
        &self.kind
    }
}

/// The kind of error that occurred while loading the quarantine document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadErrorKind {
    /// The local file could not be read.
    #[error("failed to read file")]
    Read(#[source] std::io::Error),

    /// The URL could not be fetched, or returned a non-success status.
    #[error("failed to fetch URL")]
    Fetch(#[source] ureq::Error),

    /// The document is not valid YAML, or does not have the expected shape.
    #[error("failed to parse quarantine document")]
    Yaml(#[source] serde_yaml::Error),
}

/// The output signals could not be written.
#[derive(Debug, Error)]
#[error("failed to write outputs to `{path}`")]
pub struct OutputWriteError {
    path: Utf8PathBuf,
    #[source]
    err: std::io::Error,
}

impl OutputWriteError {
    pub(crate) fn new(path: impl Into<Utf8PathBuf>, err: std::io::Error) -> Self {
        Self {
            path: path.into(),
            err,
        }
    }
}

/// Displays an error along with its chain of causes on a single line.
///
/// Per-item errors are logged one line each, so that log scrapers can attribute each line to the
/// file or glob it concerns.
pub struct DisplayErrorChain<E> {
    error: E,
}

impl<E: Error> DisplayErrorChain<E> {
    /// Creates a new `DisplayErrorChain`.
    pub fn new(error: E) -> Self {
        Self { error }
    }
}

impl<E: Error> fmt::Display for DisplayErrorChain<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        let mut next = self.error.source();
        while let Some(cause) = next {
            write!(f, ": {cause}")?;
            next = cause.source();
        }
        Ok(())
    }
}
