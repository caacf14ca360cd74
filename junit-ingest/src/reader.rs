// Copyright (c) The parse-test-reports Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read a `Report`.

use crate::{
    NonSuccessKind, Report, Testcase, TestcaseStatus, Testsuite,
    errors::{ParseError, ParseErrorKind},
};
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use std::time::Duration;

static TESTSUITES_TAG: &[u8] = b"testsuites";
static TESTSUITE_TAG: &[u8] = b"testsuite";
static TESTCASE_TAG: &[u8] = b"testcase";
static FAILURE_TAG: &[u8] = b"failure";
static ERROR_TAG: &[u8] = b"error";
static SKIPPED_TAG: &[u8] = b"skipped";

pub(crate) fn read_report(input: &str) -> Result<Report, ParseError> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(true);

    let mut state = ReadState::default();
    loop {
        match reader.read_event().map_err(ParseErrorKind::Xml)? {
            Event::Start(tag) => state.start(&tag, false)?,
            Event::Empty(tag) => state.start(&tag, true)?,
            Event::End(tag) => state.end(tag.name().as_ref()),
            Event::Text(text) => {
                if state.capturing {
                    let text = text.unescape().map_err(ParseErrorKind::Xml)?;
                    state.push_text(&text);
                }
            }
            Event::CData(data) => {
                if state.capturing {
                    state.push_text(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes carry no results.
            _ => {}
        }
    }

    state.finish()
}

/// A testsuite that has been opened but not yet closed.
///
/// `slot` is the index the suite occupies in `ReadState::suites`, which keeps the flattened list in
/// start-tag order even though inner suites close before outer ones.
#[derive(Debug)]
struct OpenSuite {
    slot: usize,
    testsuite: Testsuite,
}

#[derive(Debug, Default)]
struct ReadState {
    root_seen: bool,
    report_name: Option<String>,
    open_suites: Vec<OpenSuite>,
    suites: Vec<Option<Testsuite>>,
    // Testcases that appear directly under `testsuites` are collected into an unnamed suite.
    orphan_suite: Option<usize>,
    current_testcase: Option<Testcase>,
    // Set while inside a `failure`, `error` or `skipped` element of the current testcase.
    capturing: bool,
}

impl ReadState {
    fn start(&mut self, tag: &BytesStart<'_>, is_empty: bool) -> Result<(), ParseError> {
        let name = tag.name();
        let name = name.as_ref();

        if !self.root_seen {
            if name == TESTSUITES_TAG {
                self.root_seen = true;
                self.report_name = attribute(tag, "name")?;
                return Ok(());
            } else if name == TESTSUITE_TAG {
                self.root_seen = true;
            } else {
                return Err(ParseErrorKind::UnexpectedRoot {
                    element: String::from_utf8_lossy(name).into_owned(),
                }
                .into());
            }
        }

        if name == TESTSUITE_TAG {
            let mut testsuite = Testsuite::new(attribute(tag, "name")?.unwrap_or_default());
            if let Some(time) = attribute(tag, "time")?.as_deref().and_then(parse_time) {
                testsuite.set_time(time);
            }
            let slot = self.suites.len();
            self.suites.push(None);
            self.open_suites.push(OpenSuite { slot, testsuite });
            if is_empty {
                self.close_suite();
            }
        } else if name == TESTCASE_TAG {
            let testcase_name =
                attribute(tag, "name")?.ok_or(ParseErrorKind::MissingAttribute {
                    element: "testcase",
                    attribute: "name",
                })?;
            let mut testcase = Testcase::new(testcase_name, TestcaseStatus::success());
            if let Some(classname) = attribute(tag, "classname")? {
                testcase.set_classname(classname);
            }
            if let Some(time) = attribute(tag, "time")?.as_deref().and_then(parse_time) {
                testcase.set_time(time);
            }
            self.current_testcase = Some(testcase);
            if is_empty {
                self.close_testcase();
            }
        } else if let Some(testcase) = &mut self.current_testcase {
            let status = if name == FAILURE_TAG {
                TestcaseStatus::non_success(NonSuccessKind::Failure)
            } else if name == ERROR_TAG {
                TestcaseStatus::non_success(NonSuccessKind::Error)
            } else if name == SKIPPED_TAG {
                TestcaseStatus::skipped()
            } else {
                // system-out, system-err, properties and friends.
                return Ok(());
            };

            // Only the first status element counts; later ones (e.g. a failure followed by an
            // error from teardown) keep the first result.
            if testcase.status.is_success() {
                let mut status = status;
                if let Some(message) = attribute(tag, "message")? {
                    status.set_message(message);
                }
                if let Some(ty) = attribute(tag, "type")? {
                    status.set_type(ty);
                }
                testcase.status = status;
                self.capturing = !is_empty;
            }
        }

        Ok(())
    }

    fn end(&mut self, name: &[u8]) {
        if name == TESTSUITE_TAG {
            self.close_suite();
        } else if name == TESTCASE_TAG {
            self.close_testcase();
        } else if name == FAILURE_TAG || name == ERROR_TAG || name == SKIPPED_TAG {
            self.capturing = false;
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(testcase) = &mut self.current_testcase {
            testcase.status.push_description(text);
        }
    }

    fn close_suite(&mut self) {
        if let Some(OpenSuite { slot, testsuite }) = self.open_suites.pop() {
            self.suites[slot] = Some(testsuite);
        }
    }

    fn close_testcase(&mut self) {
        self.capturing = false;
        let Some(testcase) = self.current_testcase.take() else {
            return;
        };
        match self.open_suites.last_mut() {
            Some(open) => {
                open.testsuite.testcases.push(testcase);
            }
            None => {
                let slot = *self.orphan_suite.get_or_insert_with(|| {
                    self.suites.push(Some(Testsuite::new("")));
                    self.suites.len() - 1
                });
                if let Some(testsuite) = &mut self.suites[slot] {
                    testsuite.testcases.push(testcase);
                }
            }
        }
    }

    fn finish(self) -> Result<Report, ParseError> {
        if !self.root_seen {
            return Err(ParseErrorKind::NoRoot.into());
        }
        if self.current_testcase.is_some() {
            return Err(ParseErrorKind::UnexpectedEof {
                element: "testcase",
            }
            .into());
        }
        if !self.open_suites.is_empty() {
            return Err(ParseErrorKind::UnexpectedEof {
                element: "testsuite",
            }
            .into());
        }

        Ok(Report {
            name: self.report_name,
            testsuites: self.suites.into_iter().flatten().collect(),
        })
    }
}

fn attribute(tag: &BytesStart<'_>, name: &str) -> Result<Option<String>, ParseError> {
    let attr = tag
        .try_get_attribute(name)
        .map_err(|err| ParseErrorKind::Xml(err.into()))?;
    match attr {
        Some(attr) => {
            let value = attr.unescape_value().map_err(ParseErrorKind::Xml)?;
            Ok(Some(value.into_owned()))
        }
        None => Ok(None),
    }
}

// Times are seconds with an arbitrary number of decimal places. Some tools emit thousands
// separators, which are dropped. Unparseable times are ignored rather than rejected.
fn parse_time(time: &str) -> Option<Duration> {
    let time = time.trim().replace(',', "");
    let secs = time.parse::<f64>().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}
