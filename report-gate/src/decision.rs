// Copyright (c) The parse-test-reports Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turning run totals into a pass or fail verdict.

use crate::{aggregate::RunTotals, plural};
use std::fmt;

/// The outcome of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Every relevant test passed.
    Pass,
    /// No report files matched. Callers treat this as a pass.
    NoReports,
    /// The run failed.
    Fail(GateFailure),
}

impl Verdict {
    /// Returns true unless this is [`Verdict::Fail`].
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Fail(_))
    }
}

/// Why a run failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateFailure {
    /// Without a quarantine list, at least one test failed or errored.
    TestsFailed {
        /// The number of failed tests.
        failed: usize,
        /// The number of errored tests.
        errors: usize,
    },

    /// With a quarantine list, at least one failed test was not quarantined or had an expired
    /// quarantine.
    QuarantineViolated {
        /// The number of distinct failed tests without a quarantine entry.
        non_quarantined: usize,
        /// The number of distinct failed tests whose quarantine has expired.
        expired: usize,
    },
}

impl fmt::Display for GateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TestsFailed { failed, errors } => write!(
                f,
                "found {failed} failed {} and {errors} {}",
                plural::tests_str(*failed),
                plural::errors_str(*errors),
            ),
            Self::QuarantineViolated {
                non_quarantined,
                expired,
            } => write!(
                f,
                "found {non_quarantined} non-quarantined failed {} and {expired} expired \
                 quarantined {}",
                plural::tests_str(*non_quarantined),
                plural::tests_str(*expired),
            ),
        }
    }
}

/// Decides the verdict for a run.
///
/// Without a quarantine list, any failure or error fails the run. With one, only failed tests
/// that are not quarantined, or whose quarantine has expired, fail the run; errored tests do
/// not.
pub fn decide(totals: &RunTotals) -> Verdict {
    if totals.files_matched == 0 {
        return Verdict::NoReports;
    }

    match &totals.quarantine {
        None => {
            let counts = &totals.counts;
            if counts.fail_count > 0 || counts.error_count > 0 {
                Verdict::Fail(GateFailure::TestsFailed {
                    failed: counts.fail_count,
                    errors: counts.error_count,
                })
            } else {
                Verdict::Pass
            }
        }
        Some(buckets) => {
            let non_quarantined = buckets.non_quarantined_failures.len();
            let expired = buckets.expired_tests.len();
            if non_quarantined > 0 || expired > 0 {
                Verdict::Fail(GateFailure::QuarantineViolated {
                    non_quarantined,
                    expired,
                })
            } else {
                Verdict::Pass
            }
        }
    }
}
