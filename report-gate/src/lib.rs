// Copyright (c) The parse-test-reports Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for `parse-test-reports`: resolving report globs, aggregating JUnit
//! results across files, and deciding whether a CI step passes, optionally exempting
//! quarantined tests.
//!
//! The basic flow is:
//!
//! 1. [`paths::parse_path_spec`] and [`paths::resolve_files`] turn a comma-separated glob
//!    setting into a deduplicated list of report files.
//! 2. [`aggregate::aggregate`] or [`aggregate::aggregate_with_quarantine`] fold every testcase in
//!    those files into [`aggregate::RunTotals`].
//! 3. [`decision::decide`] turns the totals into a [`decision::Verdict`].
//! 4. [`output::OutputSignals`] persists the totals for later pipeline steps.
//!
//! This crate only emits [`tracing`] events; installing a subscriber is up to the caller.

pub mod aggregate;
pub mod decision;
pub mod errors;
mod helpers;
pub mod output;
pub mod paths;
pub mod quarantine;

pub use helpers::plural;
