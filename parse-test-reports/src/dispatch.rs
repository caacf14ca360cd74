// Copyright (c) The parse-test-reports Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ExpectedError, Result,
    exit_codes::ReportsExitCode,
    output::{OutputContext, OutputOpts},
};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{Local, NaiveDate};
use clap::{Args, builder::BoolishValueParser};
use owo_colors::OwoColorize;
use report_gate::{
    aggregate::{AggregationMode, JunitParser, RunTotals, aggregate_in_mode},
    decision::{Verdict, decide},
    errors::DisplayErrorChain,
    output::OutputSignals,
    paths::{parse_path_spec, resolve_files},
    plural,
    quarantine::{QuarantineList, QuarantineSource, load_quarantine_list},
};
use tracing::{debug, info, warn};

/// Aggregates JUnit XML test reports and fails if any test failed.
///
/// With --fail-on-quarantine, failures of tests listed in an active quarantine document are
/// tolerated, while failures of other tests, or of tests whose quarantine has expired, still
/// fail the step.
#[derive(Debug, clap::Parser)]
#[command(version, max_term_width = 100)]
pub struct ParseTestReportsApp {
    #[clap(flatten)]
    gate: GateOpts,

    #[clap(flatten)]
    output: OutputOpts,
}

impl ParseTestReportsApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app, returning the process exit code on success.
    pub fn exec(self, output: OutputContext) -> Result<i32> {
        self.gate.exec(Local::now().date_naive(), output)
    }
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Report options")]
struct GateOpts {
    /// Comma-separated globs matching JUnit XML report files.
    ///
    /// `*` and `?` match within a path component and `**` matches any number of components. A
    /// leading `~` expands to the home directory.
    #[arg(long, env = "PLUGIN_TEST_GLOBS", value_name = "GLOBS")]
    test_globs: Option<String>,

    /// Path or http(s) URL of the quarantine YAML document.
    #[arg(long, env = "PLUGIN_QUARANTINE_FILE", value_name = "PATH_OR_URL")]
    quarantine_file: Option<String>,

    /// Tolerate failures of tests with an active quarantine entry.
    #[arg(long, env = "PLUGIN_FAIL_ON_QUARANTINE", value_parser = BoolishValueParser::new())]
    fail_on_quarantine: bool,

    /// File to append output signals to, as `KEY=value` lines.
    #[arg(long, env = "DRONE_OUTPUT", value_name = "PATH")]
    output_file: Option<Utf8PathBuf>,
}

/// Validated settings for a run.
#[derive(Debug)]
struct GateSettings {
    specs: Vec<String>,
    quarantine: Option<QuarantineSource>,
    output_file: Option<Utf8PathBuf>,
}

impl GateOpts {
    fn settings(&self) -> Result<GateSettings> {
        let specs = parse_path_spec(self.test_globs.as_deref().unwrap_or_default());
        if specs.is_empty() {
            return Err(ExpectedError::MissingTestGlobs);
        }

        let quarantine_file = self
            .quarantine_file
            .as_deref()
            .map(str::trim)
            .filter(|file| !file.is_empty());
        let quarantine = if self.fail_on_quarantine {
            let file = quarantine_file.ok_or(ExpectedError::MissingQuarantineFile)?;
            Some(QuarantineSource::parse(file))
        } else {
            if let Some(file) = quarantine_file {
                debug!("fail-on-quarantine is not set, ignoring quarantine file `{file}`");
            }
            None
        };

        let output_file = self
            .output_file
            .clone()
            .filter(|path| !path.as_str().is_empty());

        Ok(GateSettings {
            specs,
            quarantine,
            output_file,
        })
    }

    fn exec(&self, today: NaiveDate, output: OutputContext) -> Result<i32> {
        let settings = self.settings()?;

        let list = settings
            .quarantine
            .as_ref()
            .map(load_quarantine_list)
            .transpose()
            .map_err(ExpectedError::quarantine_load)?;

        info!("parsing test cases in globs: {}", settings.specs.join(", "));
        let files = resolve_files(&settings.specs);
        let totals = aggregate_in_mode(&files, &JunitParser, aggregation_mode(list.as_ref(), today));

        write_signals(&totals, settings.output_file.as_deref());
        log_final_stats(&totals);

        let styles = output.stderr_styles();
        match decide(&totals) {
            Verdict::Pass => {
                info!("{}", "all tests passed".style(styles.pass));
                Ok(ReportsExitCode::OK)
            }
            Verdict::NoReports => {
                warn!("no test reports found, nothing to check");
                Ok(ReportsExitCode::OK)
            }
            Verdict::Fail(failure) => Err(ExpectedError::ReportsFailed { failure }),
        }
    }
}

fn aggregation_mode(list: Option<&QuarantineList>, today: NaiveDate) -> AggregationMode<'_> {
    match list {
        Some(list) => AggregationMode::Quarantine { list, today },
        None => AggregationMode::Plain,
    }
}

fn write_signals(totals: &RunTotals, output_file: Option<&Utf8Path>) {
    let Some(output_file) = output_file else {
        warn!("DRONE_OUTPUT is not set, not writing output signals");
        return;
    };

    let signals = OutputSignals::from_totals(totals);
    if let Err(error) = signals.write_to(output_file) {
        warn!("{}", DisplayErrorChain::new(&error));
    }
}

fn log_final_stats(totals: &RunTotals) {
    let counts = &totals.counts;
    info!(
        "final test statistics from {} {}: Total: {}, Passed: {}, Failed: {}, Skipped: {}, Errors: {}",
        totals.files_parsed,
        plural::files_str(totals.files_parsed),
        counts.test_count,
        counts.pass_count,
        counts.fail_count,
        counts.skipped_count,
        counts.error_count,
    );
    if let Some(buckets) = &totals.quarantine {
        info!(
            "quarantine: {} not quarantined, {} quarantined, {} expired",
            buckets.non_quarantined_failures.len(),
            buckets.quarantined_failures.len(),
            buckets.expired_tests.len(),
        );
    }
}
