// Copyright (c) The parse-test-reports Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quarantine lists: tests whose failures are tolerated for a bounded window of time.
//!
//! A quarantine document is YAML of the form:
//!
//! ```yaml
//! quarantine_tests:
//!   - classname: com.example.FlakyTest
//!     name: testSometimesFails
//!     start_date: "2024-01-01"
//!     end_date: "2024-01-31"
//! ```
//!
//! Entries without both dates never expire.

mod imp;
mod loader;

pub use imp::*;
pub use loader::*;
