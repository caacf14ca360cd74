// Copyright (c) The parse-test-reports Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read JUnit reports in Rust.
//!
//! The entry points are [`Report::from_path`] and [`Report::from_str`]. Nested testsuites are
//! flattened into [`Report::testsuites`] in the order their start tags appear in the document.

mod errors;
mod reader;
mod report;

pub use errors::*;
pub use report::*;
