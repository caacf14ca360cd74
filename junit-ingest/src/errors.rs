// Copyright (c) The parse-test-reports Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use thiserror::Error;

/// An error that occurs while reading a [`Report`](crate::Report).
///
/// Returned by [`Report::from_path`](crate::Report::from_path) and
/// [`Report::from_str`](crate::Report::from_str).
#[derive(Debug, Error)]
#[error("error parsing JUnit report{}", DisplayPath(.path.as_deref()))]
pub struct ParseError {
    path: Option<Utf8PathBuf>,
    #[source]
    kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind) -> Self {
        Self { path: None, kind }
    }

    pub(crate) fn with_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Returns the path of the report that failed to parse, if it was read from a file.
    pub fn path(&self) -> Option<&Utf8Path> {
        self.path.as_deref()
    }

    /// Returns the kind of error that occurred.
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }
}

impl From<ParseErrorKind> for ParseError {
    fn from(kind: ParseErrorKind) -> Self {
        Self::new(kind)
    }
}

/// The kind of error that occurred while reading a report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseErrorKind {
    /// The report could not be read from disk.
    #[error("failed to read report")]
    Read(#[source] std::io::Error),

    /// The report is not well-formed XML.
    #[error("malformed XML")]
    Xml(#[from] quick_xml::Error),

    /// The document ended before any `testsuites` or `testsuite` element was seen.
    #[error("document contains no testsuites")]
    NoRoot,

    /// The root element is not `testsuites` or `testsuite`.
    #[error("unexpected root element `{element}` (expected `testsuites` or `testsuite`)")]
    UnexpectedRoot {
        /// The name of the root element that was found.
        element: String,
    },

    /// An element is missing an attribute that is required to identify it.
    #[error("`{element}` element is missing required attribute `{attribute}`")]
    MissingAttribute {
        /// The element that was missing the attribute.
        element: &'static str,
        /// The missing attribute.
        attribute: &'static str,
    },

    /// The document ended while elements were still open.
    #[error("unexpected end of document inside `{element}`")]
    UnexpectedEof {
        /// The innermost element that was still open.
        element: &'static str,
    },
}

struct DisplayPath<'a>(Option<&'a Utf8Path>);

impl fmt::Display for DisplayPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(path) => write!(f, " at `{path}`"),
            None => Ok(()),
        }
    }
}
