// Copyright (c) The parse-test-reports Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Folding testcase outcomes across report files into run totals.

use crate::{
    errors::DisplayErrorChain,
    plural,
    quarantine::{QuarantineList, QuarantineStatus, TestIdentifier},
};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDate;
use indexmap::IndexSet;
use junit_ingest::{NonSuccessKind, ParseError, Report, Testcase, TestcaseStatus};
use std::ops::AddAssign;
use tracing::{debug, info, warn};

/// Reads a single report file into testsuites.
///
/// The aggregator is generic over this so that it can be driven by test doubles.
pub trait ReportParser {
    /// Parses the report at `path`.
    fn parse_file(&self, path: &Utf8Path) -> Result<Report, ParseError>;
}

/// A [`ReportParser`] that reads JUnit XML from disk.
#[derive(Clone, Copy, Debug, Default)]
pub struct JunitParser;

impl ReportParser for JunitParser {
    fn parse_file(&self, path: &Utf8Path) -> Result<Report, ParseError> {
        Report::from_path(path)
    }
}

/// The outcome of a single testcase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestOutcome {
    /// The test passed.
    Passed,
    /// The test reported a `failure`.
    Failed,
    /// The test was skipped.
    Skipped,
    /// The test reported an `error`.
    Error,
}

impl TestOutcome {
    /// Returns the outcome corresponding to a testcase status.
    pub fn from_status(status: &TestcaseStatus) -> Self {
        match status {
            TestcaseStatus::Success => Self::Passed,
            TestcaseStatus::NonSuccess {
                kind: NonSuccessKind::Failure,
                ..
            } => Self::Failed,
            TestcaseStatus::NonSuccess {
                kind: NonSuccessKind::Error,
                ..
            } => Self::Error,
            TestcaseStatus::Skipped { .. } => Self::Skipped,
        }
    }
}

/// Counts of testcases by outcome.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TestCounts {
    /// The total number of testcases seen.
    pub test_count: usize,
    /// The number of testcases that passed.
    pub pass_count: usize,
    /// The number of testcases that failed.
    pub fail_count: usize,
    /// The number of testcases that were skipped.
    pub skipped_count: usize,
    /// The number of testcases that errored.
    pub error_count: usize,
}

impl TestCounts {
    /// Records a single testcase outcome.
    pub fn record(&mut self, outcome: TestOutcome) {
        self.test_count += 1;
        match outcome {
            TestOutcome::Passed => self.pass_count += 1,
            TestOutcome::Failed => self.fail_count += 1,
            TestOutcome::Skipped => self.skipped_count += 1,
            TestOutcome::Error => self.error_count += 1,
        }
    }

    /// Returns true if `test_count` equals the sum of the per-outcome counts.
    pub fn is_consistent(&self) -> bool {
        self.test_count == self.pass_count + self.fail_count + self.skipped_count + self.error_count
    }
}

impl AddAssign for TestCounts {
    fn add_assign(&mut self, other: Self) {
        self.test_count += other.test_count;
        self.pass_count += other.pass_count;
        self.fail_count += other.fail_count;
        self.skipped_count += other.skipped_count;
        self.error_count += other.error_count;
    }
}

/// Failed tests partitioned by their quarantine status, in the order they were first seen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuarantineBuckets {
    /// Failed tests with no quarantine entry.
    pub non_quarantined_failures: IndexSet<TestIdentifier>,
    /// Failed tests with a quarantine entry in effect today.
    pub quarantined_failures: IndexSet<TestIdentifier>,
    /// Failed tests whose quarantine entry is not in effect today.
    pub expired_tests: IndexSet<TestIdentifier>,
}

impl QuarantineBuckets {
    fn record(&mut self, id: TestIdentifier, status: QuarantineStatus) {
        match status {
            QuarantineStatus::NotQuarantined => {
                info!("test failed and is not quarantined: {id}");
                self.non_quarantined_failures.insert(id);
            }
            QuarantineStatus::Active => {
                info!("test failed but is quarantined: {id}");
                self.quarantined_failures.insert(id);
            }
            QuarantineStatus::Expired => {
                info!("test failed and its quarantine has expired: {id}");
                self.expired_tests.insert(id);
            }
        }
    }

    fn merge(&mut self, other: Self) {
        self.non_quarantined_failures
            .extend(other.non_quarantined_failures);
        self.quarantined_failures.extend(other.quarantined_failures);
        self.expired_tests.extend(other.expired_tests);
    }
}

/// The result of aggregating a set of report files.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunTotals {
    /// Counts across every file that parsed successfully.
    pub counts: TestCounts,
    /// Quarantine buckets, present only when aggregating with a quarantine list.
    pub quarantine: Option<QuarantineBuckets>,
    /// The number of files that were handed to the aggregator.
    pub files_matched: usize,
    /// The number of files that parsed successfully and were folded in.
    pub files_parsed: usize,
}

impl RunTotals {
    /// Creates empty totals for the given mode.
    pub fn new(mode: &AggregationMode<'_>) -> Self {
        Self {
            quarantine: mode.is_quarantine().then(QuarantineBuckets::default),
            ..Self::default()
        }
    }
}

/// Whether failures are checked against a quarantine list.
#[derive(Clone, Copy, Debug)]
pub enum AggregationMode<'a> {
    /// Every failure and error counts against the run.
    Plain,
    /// Failures are partitioned by their status in `list` as of `today`.
    Quarantine {
        /// The quarantine list.
        list: &'a QuarantineList,
        /// The date that quarantine windows are checked against.
        today: NaiveDate,
    },
}

impl AggregationMode<'_> {
    /// Returns true if this is [`AggregationMode::Quarantine`].
    pub fn is_quarantine(&self) -> bool {
        matches!(self, Self::Quarantine { .. })
    }
}

/// Aggregates `files` without a quarantine list.
pub fn aggregate<P: ReportParser + ?Sized>(files: &[Utf8PathBuf], parser: &P) -> RunTotals {
    aggregate_in_mode(files, parser, AggregationMode::Plain)
}

/// Aggregates `files`, partitioning failed tests by their status in `list` as of `today`.
pub fn aggregate_with_quarantine<P: ReportParser + ?Sized>(
    files: &[Utf8PathBuf],
    parser: &P,
    list: &QuarantineList,
    today: NaiveDate,
) -> RunTotals {
    aggregate_in_mode(files, parser, AggregationMode::Quarantine { list, today })
}

/// Aggregates `files` in the given mode.
///
/// Files are processed in order. A file that fails to parse is logged and skipped; otherwise
/// all of its testcases are folded into the totals at once.
pub fn aggregate_in_mode<P: ReportParser + ?Sized>(
    files: &[Utf8PathBuf],
    parser: &P,
    mode: AggregationMode<'_>,
) -> RunTotals {
    let mut totals = RunTotals::new(&mode);
    totals.files_matched = files.len();

    if files.is_empty() {
        warn!("no report files matched the provided globs");
        return totals;
    }

    if mode.is_quarantine() {
        info!(
            "checking {} report {} against quarantine list",
            files.len(),
            plural::files_str(files.len()),
        );
    }

    for file in files {
        let report = match parser.parse_file(file) {
            Ok(report) => report,
            Err(error) => {
                warn!(
                    "skipping report `{file}`: {}",
                    DisplayErrorChain::new(&error)
                );
                continue;
            }
        };

        let file_totals = FileTotals::from_report(&report, &mode);
        let counts = file_totals.counts;
        info!(
            "file {file} processed. Stats: Total: {}, Passed: {}, Failed: {}, Skipped: {}, Errors: {}",
            counts.test_count,
            counts.pass_count,
            counts.fail_count,
            counts.skipped_count,
            counts.error_count,
        );
        file_totals.fold_into(&mut totals);
    }

    if totals.files_parsed == 0 {
        warn!(
            "none of the {} matched report {} could be parsed",
            totals.files_matched,
            plural::files_str(totals.files_matched),
        );
    }
    debug!(
        "aggregated {} {} from {} {}",
        totals.counts.test_count,
        plural::tests_str(totals.counts.test_count),
        totals.files_parsed,
        plural::files_str(totals.files_parsed),
    );

    totals
}

struct FileTotals {
    counts: TestCounts,
    buckets: Option<QuarantineBuckets>,
}

impl FileTotals {
    fn from_report(report: &Report, mode: &AggregationMode<'_>) -> Self {
        let mut counts = TestCounts::default();
        let mut buckets = mode.is_quarantine().then(QuarantineBuckets::default);

        for testcase in report.testcases() {
            let outcome = TestOutcome::from_status(&testcase.status);
            counts.record(outcome);

            if outcome == TestOutcome::Failed
                && let (AggregationMode::Quarantine { list, today }, Some(buckets)) =
                    (mode, buckets.as_mut())
            {
                let id = identifier(testcase);
                let status = list.classify(&id, *today);
                buckets.record(id, status);
            }
        }

        Self { counts, buckets }
    }

    fn fold_into(self, totals: &mut RunTotals) {
        totals.counts += self.counts;
        totals.files_parsed += 1;
        if let (Some(buckets), Some(total_buckets)) = (self.buckets, totals.quarantine.as_mut()) {
            total_buckets.merge(buckets);
        }
    }
}

fn identifier(testcase: &Testcase) -> TestIdentifier {
    TestIdentifier::new(testcase.classname.as_deref().unwrap_or(""), &testcase.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quarantine::QuarantineEntry;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::{
        collections::HashMap,
        io,
        sync::{Arc, Mutex},
    };

    /// Parses reports from in-memory XML, keyed by path.
    #[derive(Default)]
    struct FakeParser {
        reports: HashMap<Utf8PathBuf, &'static str>,
    }

    impl FakeParser {
        fn with(mut self, path: &str, xml: &'static str) -> Self {
            self.reports.insert(path.into(), xml);
            self
        }

        fn files(&self, paths: &[&str]) -> Vec<Utf8PathBuf> {
            paths.iter().map(Utf8PathBuf::from).collect()
        }
    }

    impl ReportParser for FakeParser {
        fn parse_file(&self, path: &Utf8Path) -> Result<Report, ParseError> {
            // Missing paths parse as an empty document, which is an error.
            Report::from_str(self.reports.get(path).copied().unwrap_or(""))
        }
    }

    const MIXED: &str = indoc! {r#"
        <testsuite name="mixed">
          <testcase classname="pkg.A" name="passes"/>
          <testcase classname="pkg.A" name="fails"><failure message="boom"/></testcase>
          <testcase classname="pkg.A" name="errors"><error message="panic"/></testcase>
          <testcase classname="pkg.A" name="skipped"><skipped/></testcase>
        </testsuite>
    "#};

    const ONE_PASS: &str = indoc! {r#"
        <testsuites>
          <testsuite name="ok">
            <testcase classname="pkg.B" name="passes"/>
          </testsuite>
        </testsuites>
    "#};

    const QUARANTINE_FAILURES: &str = indoc! {r#"
        <testsuite name="q">
          <testcase classname="pkg.Q" name="active"><failure/></testcase>
          <testcase classname="pkg.Q" name="expired"><failure/></testcase>
          <testcase classname="pkg.Q" name="plain"><failure/></testcase>
          <testcase classname="pkg.Q" name="errored"><error/></testcase>
          <testcase name="orphan"><failure/></testcase>
        </testsuite>
    "#};

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            let buf = self.0.lock().expect("lock is not poisoned");
            String::from_utf8_lossy(&buf).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            self.0
                .lock()
                .expect("lock is not poisoned")
                .extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
    }

    fn ids(names: &[&str]) -> IndexSet<TestIdentifier> {
        names
            .iter()
            .map(|name| {
                let (classname, name) = name.rsplit_once('.').expect("qualified name");
                TestIdentifier::new(classname, name)
            })
            .collect()
    }

    #[test]
    fn outcome_from_status() {
        assert_eq!(
            TestOutcome::from_status(&TestcaseStatus::success()),
            TestOutcome::Passed
        );
        assert_eq!(
            TestOutcome::from_status(&TestcaseStatus::non_success(NonSuccessKind::Failure)),
            TestOutcome::Failed
        );
        assert_eq!(
            TestOutcome::from_status(&TestcaseStatus::non_success(NonSuccessKind::Error)),
            TestOutcome::Error
        );
        assert_eq!(
            TestOutcome::from_status(&TestcaseStatus::skipped()),
            TestOutcome::Skipped
        );
    }

    #[test]
    fn counts_add() {
        let mut a = TestCounts::default();
        a.record(TestOutcome::Passed);
        a.record(TestOutcome::Failed);
        let mut b = TestCounts::default();
        b.record(TestOutcome::Error);
        b.record(TestOutcome::Skipped);
        a += b;
        assert_eq!(
            a,
            TestCounts {
                test_count: 4,
                pass_count: 1,
                fail_count: 1,
                skipped_count: 1,
                error_count: 1,
            }
        );
        assert!(a.is_consistent());
    }

    #[test]
    fn plain_mode() {
        let parser = FakeParser::default()
            .with("a.xml", MIXED)
            .with("b.xml", ONE_PASS);
        let totals = aggregate(&parser.files(&["a.xml", "b.xml"]), &parser);

        assert_eq!(
            totals,
            RunTotals {
                counts: TestCounts {
                    test_count: 5,
                    pass_count: 2,
                    fail_count: 1,
                    skipped_count: 1,
                    error_count: 1,
                },
                quarantine: None,
                files_matched: 2,
                files_parsed: 2,
            }
        );
        assert!(totals.counts.is_consistent());
    }

    #[test]
    fn bad_file_is_skipped() {
        let parser = FakeParser::default()
            .with("good.xml", ONE_PASS)
            .with("bad.xml", "<testsuite name=\"x\"><testcase name=\"y\">");
        let files = parser.files(&["bad.xml", "good.xml", "missing.xml"]);
        let totals = aggregate(&files, &parser);

        assert_eq!(totals.counts.test_count, 1);
        assert_eq!(totals.counts.pass_count, 1);
        assert_eq!(totals.files_matched, 3);
        assert_eq!(totals.files_parsed, 1);
    }

    #[test]
    fn logs_file_stats_and_skipped_files() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer({
                let logs = logs.clone();
                move || logs.clone()
            })
            .without_time()
            .finish();

        let parser = FakeParser::default()
            .with("a.xml", MIXED)
            .with("bad.xml", "<testsuite name=\"x\"><testcase name=\"y\">");
        let files = parser.files(&["a.xml", "bad.xml"]);
        tracing::subscriber::with_default(subscriber, || aggregate(&files, &parser));

        let output = logs.contents();
        assert!(
            output.contains(
                "file a.xml processed. Stats: Total: 4, Passed: 1, Failed: 1, Skipped: 1, Errors: 1"
            ),
            "output: {output}"
        );
        assert!(
            output.contains("skipping report `bad.xml`: error parsing JUnit report"),
            "output: {output}"
        );
    }

    #[test]
    fn no_files() {
        let parser = FakeParser::default();
        assert_eq!(aggregate(&[], &parser), RunTotals::default());

        let list = QuarantineList::default();
        let totals = aggregate_with_quarantine(&[], &parser, &list, date("2024-06-01"));
        assert_eq!(totals.counts, TestCounts::default());
        assert_eq!(totals.quarantine, Some(QuarantineBuckets::default()));
    }

    #[test]
    fn quarantine_mode() {
        let parser = FakeParser::default()
            .with("q.xml", QUARANTINE_FAILURES)
            .with("mixed.xml", MIXED);
        let list = QuarantineList::new([
            QuarantineEntry::new("pkg.Q", "active").with_window("2024-01-01", "2024-12-31"),
            QuarantineEntry::new("pkg.Q", "expired").with_window("2023-01-01", "2023-12-31"),
            QuarantineEntry::new("pkg.Q", "errored"),
        ]);
        let totals = aggregate_with_quarantine(
            &parser.files(&["q.xml", "mixed.xml"]),
            &parser,
            &list,
            date("2024-06-01"),
        );

        assert_eq!(
            totals.counts,
            TestCounts {
                test_count: 9,
                pass_count: 1,
                fail_count: 5,
                skipped_count: 1,
                error_count: 2,
            }
        );
        assert_eq!(
            totals.quarantine,
            Some(QuarantineBuckets {
                non_quarantined_failures: ids(&["pkg.Q.plain", ".orphan", "pkg.A.fails"]),
                quarantined_failures: ids(&["pkg.Q.active"]),
                expired_tests: ids(&["pkg.Q.expired"]),
            })
        );
    }

    #[test]
    fn repeated_failures_are_bucketed_once() {
        let parser = FakeParser::default()
            .with("1.xml", MIXED)
            .with("2.xml", MIXED);
        let list = QuarantineList::default();
        let totals = aggregate_with_quarantine(
            &parser.files(&["1.xml", "2.xml"]),
            &parser,
            &list,
            date("2024-06-01"),
        );

        assert_eq!(totals.counts.fail_count, 2);
        let buckets = totals.quarantine.expect("quarantine mode");
        assert_eq!(buckets.non_quarantined_failures, ids(&["pkg.A.fails"]));
    }

    #[test]
    fn aggregation_is_idempotent() {
        let parser = FakeParser::default()
            .with("a.xml", MIXED)
            .with("b.xml", ONE_PASS);
        let files = parser.files(&["a.xml", "b.xml"]);
        assert_eq!(aggregate(&files, &parser), aggregate(&files, &parser));
    }
}
