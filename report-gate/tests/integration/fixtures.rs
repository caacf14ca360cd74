// Copyright (c) The parse-test-reports Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::Utf8PathBuf;
use camino_tempfile::Utf8TempDir;
use chrono::NaiveDate;
use color_eyre::eyre::Result;
use indoc::indoc;

/// Two tests, one of which fails.
pub(crate) const TWO_TESTS_ONE_FAILURE: &str = indoc! {r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <testsuites name="unit" tests="2" failures="1">
      <testsuite name="com.example.MathTest" tests="2" failures="1" time="0.012">
        <testcase classname="com.example.MathTest" name="adds" time="0.003"/>
        <testcase classname="com.example.MathTest" name="subtracts" time="0.009">
          <failure message="expected:&lt;1&gt; but was:&lt;2&gt;" type="AssertionError">
            at com.example.MathTest.subtracts(MathTest.java:20)
          </failure>
        </testcase>
      </testsuite>
    </testsuites>
"#};

pub(crate) const ONE_TEST_PASSING: &str = indoc! {r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <testsuite name="com.example.StringTest" tests="1" failures="0">
      <testcase classname="com.example.StringTest" name="concatenates" time="0.001"/>
    </testsuite>
"#};

pub(crate) const QUARANTINED_FAILURE: &str = indoc! {r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <testsuites>
      <testsuite name="com.example.TestQuarantined" tests="2" failures="1">
        <testcase classname="com.example.TestQuarantined" name="TestQuarantined">
          <failure message="flaky"/>
        </testcase>
        <testcase classname="com.example.TestQuarantined" name="TestStable"/>
      </testsuite>
    </testsuites>
"#};

pub(crate) const MALFORMED: &str = "<testsuite name=\"broken\"><testcase name=\"x\">";

/// A temporary directory of report files.
pub(crate) struct ReportDir {
    dir: Utf8TempDir,
}

impl ReportDir {
    pub(crate) fn new() -> Result<Self> {
        Ok(Self {
            dir: Utf8TempDir::with_prefix("report-gate-")?,
        })
    }

    /// Writes `contents` to `rel_path` under the directory, creating parents as needed.
    pub(crate) fn write(&self, rel_path: &str, contents: &str) -> Result<Utf8PathBuf> {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent)?;
        }
        fs_err::write(&path, contents)?;
        Ok(path)
    }

    /// Returns a glob rooted at this directory.
    pub(crate) fn glob(&self, pattern: &str) -> String {
        format!("{}/{pattern}", self.dir.path())
    }
}

pub(crate) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date")
}

pub(crate) fn ymd(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
