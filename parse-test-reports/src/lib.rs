// Copyright (c) The parse-test-reports Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A CI step that aggregates JUnit XML test reports.
//!
//! Settings are read from command-line flags or, as is usual for pipeline plugins, from
//! `PLUGIN_*` environment variables. The step writes test counts to the file named by
//! `DRONE_OUTPUT` and exits non-zero if any test failed. With `--fail-on-quarantine`, failures
//! of tests listed in an active quarantine document are tolerated.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod exit_codes;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
pub use exit_codes::ReportsExitCode;
#[doc(hidden)]
pub use output::{OutputContext, StderrStyles};
