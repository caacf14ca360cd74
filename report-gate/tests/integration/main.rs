// Copyright (c) The parse-test-reports Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests: globs on disk through to output signals and verdicts.

mod aggregate;
mod fixtures;
mod quarantine;
