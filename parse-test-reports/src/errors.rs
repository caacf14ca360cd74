// Copyright (c) The parse-test-reports Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    exit_codes::ReportsExitCode,
    output::{NO_HEADING_TARGET, StderrStyles},
};
use owo_colors::OwoColorize;
use report_gate::{decision::GateFailure, errors::LoadError};
use std::error::Error;
use thiserror::Error;
use tracing::error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// The #[error()] strings are placeholders: errors are meant to be printed with display_to_stderr,
// which colorizes them and walks the source chain.

/// An expected failure of the step, as opposed to a bug.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("test globs not set")]
    MissingTestGlobs,
    #[error("quarantine file not set")]
    MissingQuarantineFile,
    #[error("failed to load quarantine list")]
    QuarantineLoad {
        #[source]
        err: LoadError,
    },
    #[error("reports failed")]
    ReportsFailed { failure: GateFailure },
}

impl ExpectedError {
    pub(crate) fn quarantine_load(err: LoadError) -> Self {
        Self::QuarantineLoad { err }
    }

    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::MissingTestGlobs
            | Self::MissingQuarantineFile
            | Self::QuarantineLoad { .. }
            | Self::ReportsFailed { .. } => ReportsExitCode::FAILED,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match self {
            Self::MissingTestGlobs => {
                error!(
                    "{} or {} must be set",
                    "--test-globs".style(styles.bold),
                    "PLUGIN_TEST_GLOBS".style(styles.bold),
                );
                None
            }
            Self::MissingQuarantineFile => {
                error!(
                    "fail-on-quarantine is set, but neither {} nor {} is set",
                    "--quarantine-file".style(styles.bold),
                    "PLUGIN_QUARANTINE_FILE".style(styles.bold),
                );
                None
            }
            Self::QuarantineLoad { err } => {
                error!("{err}");
                err.source()
            }
            Self::ReportsFailed { failure } => {
                error!("{}: {failure}", "tests failed".style(styles.fail));
                None
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
