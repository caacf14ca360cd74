// Copyright (c) The parse-test-reports Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Output signals consumed by later pipeline steps.
//!
//! Signals are written as `KEY=value` lines, appended to the file named by the pipeline.

use crate::{
    aggregate::{QuarantineBuckets, RunTotals},
    errors::OutputWriteError,
    quarantine::TestIdentifier,
};
use camino::Utf8Path;
use indexmap::IndexSet;
use itertools::Itertools;
use std::io::Write;
use swrite::{SWrite, swrite};
use tracing::debug;

/// The total number of testcases.
pub const TEST_COUNT: &str = "TEST_COUNT";
/// The number of passed testcases.
pub const PASS_COUNT: &str = "PASS_COUNT";
/// The number of failed testcases.
pub const FAIL_COUNT: &str = "FAIL_COUNT";
/// The number of skipped testcases.
pub const SKIPPED: &str = "SKIPPED";
/// The number of errored testcases.
pub const ERROR_COUNT: &str = "ERROR_COUNT";
/// Failed tests without a quarantine entry, comma-separated.
pub const NON_QUARANTINED_FAILURES: &str = "NON_QUARANTINED_FAILURES";
/// Failed tests with an active quarantine entry, comma-separated.
pub const QUARANTINED_FAILURES: &str = "QUARANTINED_FAILURES";
/// Failed tests with an expired quarantine entry, comma-separated.
pub const EXPIRED_TESTS: &str = "EXPIRED_TESTS";

/// An ordered set of `KEY=value` signals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputSignals {
    signals: Vec<(&'static str, String)>,
}

impl OutputSignals {
    /// Builds the signals for a run.
    ///
    /// The five count signals are always present. The quarantine bucket signals are present only
    /// if `totals` was aggregated against a quarantine list.
    pub fn from_totals(totals: &RunTotals) -> Self {
        let counts = &totals.counts;
        let mut signals = vec![
            (TEST_COUNT, counts.test_count.to_string()),
            (PASS_COUNT, counts.pass_count.to_string()),
            (FAIL_COUNT, counts.fail_count.to_string()),
            (SKIPPED, counts.skipped_count.to_string()),
            (ERROR_COUNT, counts.error_count.to_string()),
        ];

        if let Some(QuarantineBuckets {
            non_quarantined_failures,
            quarantined_failures,
            expired_tests,
        }) = &totals.quarantine
        {
            signals.push((NON_QUARANTINED_FAILURES, join(non_quarantined_failures)));
            signals.push((QUARANTINED_FAILURES, join(quarantined_failures)));
            signals.push((EXPIRED_TESTS, join(expired_tests)));
        }

        Self { signals }
    }

    /// Returns the value of a signal, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.signals
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over the signals in write order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.signals.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Renders the signals as `KEY=value` lines.
    pub fn to_env_string(&self) -> String {
        let mut out = String::new();
        for (key, value) in self.iter() {
            swrite!(out, "{key}={value}\n");
        }
        out
    }

    /// Appends the signals to the file at `path`, creating it if necessary.
    pub fn write_to(&self, path: &Utf8Path) -> Result<(), OutputWriteError> {
        let contents = self.to_env_string();
        let mut file = fs_err::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| OutputWriteError::new(path, err))?;
        file.write_all(contents.as_bytes())
            .map_err(|err| OutputWriteError::new(path, err))?;

        debug!("wrote {} output signals to `{path}`", self.signals.len());
        Ok(())
    }
}

fn join(ids: &IndexSet<TestIdentifier>) -> String {
    ids.iter().map(TestIdentifier::as_str).join(",")
}
