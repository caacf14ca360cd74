// Copyright (c) The parse-test-reports Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `parse-test-reports`.
///
/// Pipelines only distinguish success from failure, so every failure uses the same code.
pub enum ReportsExitCode {}

impl ReportsExitCode {
    /// All tests passed, or no reports were found.
    pub const OK: i32 = 0;

    /// Tests failed, or the step was misconfigured.
    pub const FAILED: i32 = 1;
}
