// Copyright (c) The parse-test-reports Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::DateParseError;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fmt;
use tracing::warn;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The identity of a single testcase: `classname + "." + name`.
///
/// A testcase without a classname is identified as `"." + name`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TestIdentifier(String);

impl TestIdentifier {
    /// Creates a new identifier from a classname and a testcase name.
    pub fn new(classname: &str, name: &str) -> Self {
        let mut id = String::with_capacity(classname.len() + name.len() + 1);
        id.push_str(classname);
        id.push('.');
        id.push_str(name);
        Self(id)
    }

    /// Returns the identifier as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this identifier is exactly `classname + "." + name`.
    pub fn matches(&self, classname: &str, name: &str) -> bool {
        self.0.len() == classname.len() + name.len() + 1
            && self.0.starts_with(classname)
            && self.0[classname.len()..].starts_with('.')
            && self.0.ends_with(name)
    }
}

impl fmt::Display for TestIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single entry in a quarantine document.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct QuarantineEntry {
    /// The classname of the quarantined testcase.
    pub classname: String,

    /// The name of the quarantined testcase.
    pub name: String,

    /// The first day on which the quarantine is in effect, as `YYYY-MM-DD`.
    #[serde(default)]
    pub start_date: Option<String>,

    /// The last day on which the quarantine is in effect, as `YYYY-MM-DD`.
    #[serde(default)]
    pub end_date: Option<String>,
}

/// The inclusive range of days over which a quarantine entry is in effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuarantineWindow {
    /// The first day of the window.
    pub start: NaiveDate,
    /// The last day of the window.
    pub end: NaiveDate,
}

impl QuarantineWindow {
    /// Returns true if `today` falls inside the window, boundaries included.
    pub fn contains(&self, today: NaiveDate) -> bool {
        self.start <= today && today <= self.end
    }
}

impl QuarantineEntry {
    /// Creates a new entry without a window.
    pub fn new(classname: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            classname: classname.into(),
            name: name.into(),
            start_date: None,
            end_date: None,
        }
    }

    /// Sets the start and end dates, both in `YYYY-MM-DD` form.
    pub fn with_window(mut self, start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        self.start_date = Some(start_date.into());
        self.end_date = Some(end_date.into());
        self
    }

    /// Returns true if this entry quarantines the test with the given identifier.
    pub fn matches(&self, id: &TestIdentifier) -> bool {
        id.matches(&self.classname, &self.name)
    }

    /// Returns the window over which this entry is in effect.
    ///
    /// Returns `Ok(None)` if either date is absent.
    pub fn window(&self) -> Result<Option<QuarantineWindow>, DateParseError> {
        let (Some(start), Some(end)) = (&self.start_date, &self.end_date) else {
            return Ok(None);
        };
        let start = parse_date("start_date", start)?;
        let end = parse_date("end_date", end)?;
        Ok(Some(QuarantineWindow { start, end }))
    }

    /// Returns true if `today` lies outside this entry's window.
    ///
    /// An entry without a window, or with a date that can't be parsed, never expires. Unparsable
    /// dates are logged as warnings.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        match self.window() {
            Ok(Some(window)) => !window.contains(today),
            Ok(None) => false,
            Err(error) => {
                warn!(
                    "quarantine entry `{}.{}` has {}, treating it as never expiring",
                    self.classname, self.name, error,
                );
                false
            }
        }
    }
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, DateParseError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|err| DateParseError::new(field, value, err))
}

/// How a single test relates to the quarantine list on a given day.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuarantineStatus {
    /// No entry matches the test.
    NotQuarantined,
    /// An entry matches and its window contains today.
    Active,
    /// An entry matches but today is outside its window.
    Expired,
}

/// A list of quarantined tests, in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuarantineList {
    entries: Vec<QuarantineEntry>,
}

#[derive(Deserialize)]
struct QuarantineDocument {
    #[serde(default)]
    quarantine_tests: Option<Vec<QuarantineEntry>>,
}

impl QuarantineList {
    /// Creates a new list from the given entries.
    pub fn new(entries: impl IntoIterator<Item = QuarantineEntry>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Parses a quarantine document.
    ///
    /// A document that is empty, or that has no `quarantine_tests` key, produces an empty list
    /// and a warning.
    pub fn from_yaml_str(input: &str) -> Result<Self, serde_yaml::Error> {
        if input.trim().is_empty() {
            warn!("quarantine document is empty, no tests are quarantined");
            return Ok(Self::default());
        }

        let document: Option<QuarantineDocument> = serde_yaml::from_str(input)?;
        match document.and_then(|document| document.quarantine_tests) {
            Some(entries) => Ok(Self::new(entries)),
            None => {
                warn!(
                    "quarantine document has no `quarantine_tests` key, no tests are quarantined"
                );
                Ok(Self::default())
            }
        }
    }

    /// Returns the first entry matching `id`, if any.
    pub fn find_entry(&self, id: &TestIdentifier) -> Option<&QuarantineEntry> {
        self.entries.iter().find(|entry| entry.matches(id))
    }

    /// Classifies `id` against this list as of `today`.
    pub fn classify(&self, id: &TestIdentifier, today: NaiveDate) -> QuarantineStatus {
        match self.find_entry(id) {
            None => QuarantineStatus::NotQuarantined,
            Some(entry) if entry.is_expired(today) => QuarantineStatus::Expired,
            Some(_) => QuarantineStatus::Active,
        }
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = &QuarantineEntry> + '_ {
        self.entries.iter()
    }
}
