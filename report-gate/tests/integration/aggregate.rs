// Copyright (c) The parse-test-reports Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::*;
use color_eyre::eyre::Result;
use pretty_assertions::assert_eq;
use report_gate::{
    aggregate::{JunitParser, TestCounts, aggregate},
    decision::{GateFailure, Verdict, decide},
    output::{self, OutputSignals},
    paths::{parse_path_spec, resolve_files},
};

#[test]
fn two_files_one_failure() -> Result<()> {
    let dir = ReportDir::new()?;
    dir.write("unit/math.xml", TWO_TESTS_ONE_FAILURE)?;
    dir.write("unit/string.xml", ONE_TEST_PASSING)?;
    dir.write("unit/notes.txt", "not a report")?;

    let specs = parse_path_spec(&format!(" {} , ", dir.glob("**/*.xml")));
    let files = resolve_files(&specs);
    assert_eq!(files.len(), 2, "matched files: {files:?}");

    let totals = aggregate(&files, &JunitParser);
    assert_eq!(
        totals.counts,
        TestCounts {
            test_count: 3,
            pass_count: 2,
            fail_count: 1,
            skipped_count: 0,
            error_count: 0,
        }
    );
    assert_eq!(
        decide(&totals),
        Verdict::Fail(GateFailure::TestsFailed {
            failed: 1,
            errors: 0
        })
    );

    let signals = OutputSignals::from_totals(&totals);
    assert_eq!(signals.get(output::TEST_COUNT), Some("3"));
    assert_eq!(signals.get(output::PASS_COUNT), Some("2"));
    assert_eq!(signals.get(output::FAIL_COUNT), Some("1"));
    assert_eq!(signals.get(output::NON_QUARANTINED_FAILURES), None);

    Ok(())
}

#[test]
fn overlapping_globs_count_files_once() -> Result<()> {
    let dir = ReportDir::new()?;
    dir.write("a.xml", ONE_TEST_PASSING)?;
    dir.write("b.xml", ONE_TEST_PASSING)?;

    let setting = format!("{},{},{}", dir.glob("*.xml"), dir.glob("a.xml"), dir.glob("*.xml"));
    let files = resolve_files(&parse_path_spec(&setting));
    assert_eq!(files.len(), 2);

    let totals = aggregate(&files, &JunitParser);
    assert_eq!(totals.counts.test_count, 2);
    assert_eq!(decide(&totals), Verdict::Pass);

    Ok(())
}

#[test]
fn no_matching_files() -> Result<()> {
    let dir = ReportDir::new()?;
    let files = resolve_files(&parse_path_spec(&dir.glob("**/*.xml")));
    assert!(files.is_empty());

    let totals = aggregate(&files, &JunitParser);
    assert_eq!(totals.counts, TestCounts::default());
    assert_eq!(decide(&totals), Verdict::NoReports);

    Ok(())
}

#[test]
fn malformed_file_is_skipped() -> Result<()> {
    let dir = ReportDir::new()?;
    dir.write("a-good.xml", TWO_TESTS_ONE_FAILURE)?;
    dir.write("b-broken.xml", MALFORMED)?;
    dir.write("c-good.xml", ONE_TEST_PASSING)?;

    let files = resolve_files(&parse_path_spec(&dir.glob("*.xml")));
    assert_eq!(files.len(), 3);

    let totals = aggregate(&files, &JunitParser);
    assert_eq!(totals.files_matched, 3);
    assert_eq!(totals.files_parsed, 2);
    assert_eq!(totals.counts.test_count, 3);
    assert!(totals.counts.is_consistent());

    Ok(())
}

#[test]
fn aggregation_is_repeatable() -> Result<()> {
    let dir = ReportDir::new()?;
    dir.write("math.xml", TWO_TESTS_ONE_FAILURE)?;
    dir.write("string.xml", ONE_TEST_PASSING)?;

    let files = resolve_files(&parse_path_spec(&dir.glob("*.xml")));
    let first = aggregate(&files, &JunitParser);
    let second = aggregate(&files, &JunitParser);
    assert_eq!(first, second);
    assert_eq!(decide(&first), decide(&second));

    Ok(())
}
