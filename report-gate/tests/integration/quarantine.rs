// Copyright (c) The parse-test-reports Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::*;
use chrono::Days;
use color_eyre::eyre::Result;
use indoc::formatdoc;
use pretty_assertions::assert_eq;
use report_gate::{
    aggregate::{JunitParser, aggregate_with_quarantine},
    decision::{GateFailure, Verdict, decide},
    errors::LoadErrorKind,
    output::{self, OutputSignals},
    paths::{parse_path_spec, resolve_files},
    quarantine::{QuarantineSource, TestIdentifier, load_quarantine_list},
};

fn quarantine_document(start: &str, end: &str) -> String {
    formatdoc! {r#"
        quarantine_tests:
          - classname: com.example.TestQuarantined
            name: TestQuarantined
            start_date: "{start}"
            end_date: "{end}"
    "#}
}

#[test]
fn active_quarantine_passes() -> Result<()> {
    let dir = ReportDir::new()?;
    dir.write("reports/q.xml", QUARANTINED_FAILURE)?;
    let today = today();
    let quarantine = dir.write(
        "quarantine.yml",
        &quarantine_document(
            &ymd(today - Days::new(10)),
            &ymd(today + Days::new(10)),
        ),
    )?;

    let list = load_quarantine_list(&QuarantineSource::parse(quarantine.as_str()))?;
    let files = resolve_files(&parse_path_spec(&dir.glob("reports/*.xml")));
    let totals = aggregate_with_quarantine(&files, &JunitParser, &list, today);

    assert_eq!(totals.counts.fail_count, 1);
    let buckets = totals.quarantine.as_ref().expect("quarantine mode");
    assert_eq!(
        buckets.quarantined_failures.iter().collect::<Vec<_>>(),
        [&TestIdentifier::new("com.example.TestQuarantined", "TestQuarantined")]
    );
    assert!(buckets.non_quarantined_failures.is_empty());
    assert!(buckets.expired_tests.is_empty());
    assert_eq!(decide(&totals), Verdict::Pass);

    let signals = OutputSignals::from_totals(&totals);
    assert_eq!(
        signals.get(output::QUARANTINED_FAILURES),
        Some("com.example.TestQuarantined.TestQuarantined")
    );
    assert_eq!(signals.get(output::NON_QUARANTINED_FAILURES), Some(""));

    Ok(())
}

#[test]
fn expired_quarantine_fails() -> Result<()> {
    let dir = ReportDir::new()?;
    dir.write("reports/q.xml", QUARANTINED_FAILURE)?;
    let today = today();
    let yesterday = today - Days::new(1);
    let quarantine = dir.write(
        "quarantine.yml",
        &quarantine_document(&ymd(today - Days::new(30)), &ymd(yesterday)),
    )?;

    let list = load_quarantine_list(&QuarantineSource::parse(quarantine.as_str()))?;
    let files = resolve_files(&parse_path_spec(&dir.glob("reports/*.xml")));
    let totals = aggregate_with_quarantine(&files, &JunitParser, &list, today);

    let buckets = totals.quarantine.as_ref().expect("quarantine mode");
    assert_eq!(buckets.expired_tests.len(), 1);
    assert!(buckets.quarantined_failures.is_empty());

    let Verdict::Fail(failure) = decide(&totals) else {
        panic!("expired quarantine must fail the run");
    };
    assert_eq!(
        failure,
        GateFailure::QuarantineViolated {
            non_quarantined: 0,
            expired: 1,
        }
    );
    assert_eq!(
        failure.to_string(),
        "found 0 non-quarantined failed tests and 1 expired quarantined test"
    );

    Ok(())
}

#[test]
fn unquarantined_failure_fails() -> Result<()> {
    let dir = ReportDir::new()?;
    dir.write("reports/q.xml", QUARANTINED_FAILURE)?;
    dir.write("reports/math.xml", TWO_TESTS_ONE_FAILURE)?;
    let today = today();
    let quarantine = dir.write(
        "quarantine.yml",
        &quarantine_document(&ymd(today), &ymd(today)),
    )?;

    let list = load_quarantine_list(&QuarantineSource::parse(quarantine.as_str()))?;
    let files = resolve_files(&parse_path_spec(&dir.glob("reports/*.xml")));
    let totals = aggregate_with_quarantine(&files, &JunitParser, &list, today);

    assert_eq!(totals.counts.test_count, 4);
    assert_eq!(totals.counts.fail_count, 2);
    assert_eq!(
        decide(&totals),
        Verdict::Fail(GateFailure::QuarantineViolated {
            non_quarantined: 1,
            expired: 0,
        })
    );

    let signals = OutputSignals::from_totals(&totals);
    assert_eq!(
        signals.get(output::NON_QUARANTINED_FAILURES),
        Some("com.example.MathTest.subtracts")
    );
    assert_eq!(
        signals.get(output::QUARANTINED_FAILURES),
        Some("com.example.TestQuarantined.TestQuarantined")
    );

    Ok(())
}

#[test]
fn bad_document_shape_fails_to_load() -> Result<()> {
    let dir = ReportDir::new()?;
    let quarantine = dir.write(
        "quarantine.yml",
        "quarantine_tests:\n  classname: com.example.Foo\n  name: bar\n",
    )?;

    let err = load_quarantine_list(&QuarantineSource::parse(quarantine.as_str()))
        .expect_err("mapping is not a list of entries");
    assert!(
        matches!(err.kind(), LoadErrorKind::Yaml(_)),
        "unexpected error: {err:?}"
    );

    Ok(())
}
