// Copyright (c) The parse-test-reports Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::{ParseError, ParseErrorKind},
    reader::read_report,
};
use camino::Utf8Path;
use std::time::Duration;

/// A parsed JUnit report: every suite in the document, in the order it was opened.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Report {
    /// The `name` attribute of a `<testsuites>` root. `None` for a bare `<testsuite>` root.
    pub name: Option<String>,

    /// Suites in document order. Nested suites are hoisted to this level.
    pub testsuites: Vec<Testsuite>,
}

impl Report {
    /// Reads and parses the report at the given path.
    pub fn from_path(path: impl AsRef<Utf8Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let contents = fs_err::read_to_string(path)
            .map_err(|err| ParseError::new(ParseErrorKind::Read(err)).with_path(path))?;
        read_report(&contents).map_err(|err| err.with_path(path))
    }

    /// Parses a report from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &str) -> Result<Self, ParseError> {
        read_report(input)
    }

    /// Iterates over the testcases of every suite.
    ///
    /// Summary attributes such as `tests="..."` are never consulted: callers count these instead.
    pub fn testcases(&self) -> impl Iterator<Item = &Testcase> {
        self.testsuites
            .iter()
            .flat_map(|testsuite| testsuite.testcases.iter())
    }
}

/// A `<testsuite>` element and the testcases directly inside it.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct Testsuite {
    /// The `name` attribute, or empty for the synthetic suite holding loose testcases.
    pub name: String,

    /// The `time` attribute, if present and well-formed.
    pub time: Option<Duration>,

    pub testcases: Vec<Testcase>,
}

impl Testsuite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            time: None,
            testcases: vec![],
        }
    }

    pub fn set_time(&mut self, time: Duration) -> &mut Self {
        self.time = Some(time);
        self
    }
}

/// A single `<testcase>` element.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct Testcase {
    pub name: String,

    /// The `classname` attribute. Together with `name` it identifies the test across runs.
    pub classname: Option<String>,

    pub time: Option<Duration>,

    /// Derived from the first `failure`, `error` or `skipped` child, if any.
    pub status: TestcaseStatus,
}

impl Testcase {
    pub fn new(name: impl Into<String>, status: TestcaseStatus) -> Self {
        Self {
            name: name.into(),
            classname: None,
            time: None,
            status,
        }
    }

    pub fn set_classname(&mut self, classname: impl Into<String>) -> &mut Self {
        self.classname = Some(classname.into());
        self
    }

    pub fn set_time(&mut self, time: Duration) -> &mut Self {
        self.time = Some(time);
        self
    }
}

/// The outcome recorded for a testcase.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TestcaseStatus {
    /// No `failure`, `error` or `skipped` child.
    Success,

    /// A `failure` or `error` child.
    NonSuccess {
        kind: NonSuccessKind,
        /// The `message` attribute.
        message: Option<String>,
        /// The `type` attribute.
        ty: Option<String>,
        /// Text and CDATA content of the element, concatenated.
        description: Option<String>,
    },

    /// A `skipped` child.
    Skipped {
        message: Option<String>,
        ty: Option<String>,
        description: Option<String>,
    },
}

impl TestcaseStatus {
    pub fn success() -> Self {
        TestcaseStatus::Success
    }

    pub fn non_success(kind: NonSuccessKind) -> Self {
        TestcaseStatus::NonSuccess {
            kind,
            message: None,
            ty: None,
            description: None,
        }
    }

    pub fn skipped() -> Self {
        TestcaseStatus::Skipped {
            message: None,
            ty: None,
            description: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TestcaseStatus::Success)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            TestcaseStatus::Success => None,
            TestcaseStatus::NonSuccess { message, .. } | TestcaseStatus::Skipped { message, .. } => {
                message.as_deref()
            }
        }
    }

    /// Sets the `message` attribute. Ignored for [`TestcaseStatus::Success`].
    pub fn set_message(&mut self, message: impl Into<String>) -> &mut Self {
        if let TestcaseStatus::NonSuccess { message: slot, .. }
        | TestcaseStatus::Skipped { message: slot, .. } = self
        {
            *slot = Some(message.into());
        }
        self
    }

    /// Sets the `type` attribute. Ignored for [`TestcaseStatus::Success`].
    pub fn set_type(&mut self, ty: impl Into<String>) -> &mut Self {
        if let TestcaseStatus::NonSuccess { ty: slot, .. } | TestcaseStatus::Skipped { ty: slot, .. } =
            self
        {
            *slot = Some(ty.into());
        }
        self
    }

    /// Appends element text. Ignored for [`TestcaseStatus::Success`].
    pub fn push_description(&mut self, text: &str) -> &mut Self {
        if let TestcaseStatus::NonSuccess { description, .. }
        | TestcaseStatus::Skipped { description, .. } = self
        {
            description.get_or_insert_with(String::new).push_str(text);
        }
        self
    }
}

/// Which element marked a testcase as not passing.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NonSuccessKind {
    /// `<failure>`: an assertion did not hold.
    Failure,

    /// `<error>`: the test could not complete.
    Error,
}
