// Copyright (c) The parse-test-reports Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! General support code for report-gate.

/// Utilities for pluralizing various words based on count.
pub mod plural {
    /// Returns "test" if `count` is 1, otherwise "tests".
    pub fn tests_str(count: usize) -> &'static str {
        if count == 1 { "test" } else { "tests" }
    }

    /// Returns "error" if `count` is 1, otherwise "errors".
    pub fn errors_str(count: usize) -> &'static str {
        if count == 1 { "error" } else { "errors" }
    }

    /// Returns "file" if `count` is 1, otherwise "files".
    pub fn files_str(count: usize) -> &'static str {
        if count == 1 { "file" } else { "files" }
    }

    /// Returns "entry" if `count` is 1, otherwise "entries".
    pub fn entries_str(count: usize) -> &'static str {
        if count == 1 { "entry" } else { "entries" }
    }
}
