// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Line grammar of `xcodebuild test`
//!
//! ```text
//! Test Suite 'All tests' started at 2026-06-01 10:00:00.000
//! Test Suite 'AppTests.xctest' started at 2026-06-01 10:00:00.001
//! Test Suite 'Foo' started at 2026-06-01 10:00:00.002
//! Test Case '-[Foo bar]' started.
//! /src/FooTests.m:42: error: -[Foo bar] : 'XCTAssertEqual' [FAILED], 1 is not 2
//! Test Case '-[Foo bar]' failed (0.012 seconds).
//! Test Suite 'Foo' finished at 2026-06-01 10:00:00.020.
//! ** TEST FAILED **
//! ```

use std::sync::LazyLock;

use regex::Regex;
use testfeed_core::event::{BuildStatus, CaseStatus};

static SUITE_START_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Test Suite '(.+)' started at .+$").expect("valid regex"));

static SUITE_STOP_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Test Suite '(.+)' finished at .+$").expect("valid regex"));

static CASE_START_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Test Case '-\[(.+?)\]' started\.$").expect("valid regex"));

static CASE_STOP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Test Case '-\[(.+?)\]' (passed|failed) \((.+?) seconds\)\.$")
        .expect("valid regex")
});

static FAILURE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?):(\d+): error: -\[(.+?)\] : '(.+?)' \[FAILED\], (.+)$")
        .expect("valid regex")
});

static TERMINAL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\*\* (?:BUILD|TEST) (FAILED|SUCCEEDED) \*\*$").expect("valid regex")
});

/// A classified xcodebuild line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XcodeLine<'a> {
    /// `Test Suite 'name' started at ...`
    SuiteStarted {
        /// Suite name
        name: &'a str,
    },
    /// `Test Suite 'name' finished at ...`
    SuiteFinished {
        /// Suite name
        name: &'a str,
    },
    /// `Test Case '-[Class method]' started.`
    CaseStarted {
        /// Case identifier (`Class method`)
        case: &'a str,
    },
    /// `Test Case '-[Class method]' passed (0.012 seconds).`
    CaseFinished {
        /// Case identifier (`Class method`)
        case: &'a str,
        /// Reported status
        status: CaseStatus,
        /// Reported elapsed seconds, unparsed
        elapsed: &'a str,
    },
    /// `** BUILD SUCCEEDED **` and friends
    Terminal {
        /// Status the tool reported
        status: BuildStatus,
    },
    /// Anything else
    Unrecognized,
}

/// An assertion failure report, as printed just before a failed case's stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureDetail<'a> {
    /// Source file
    pub file: &'a str,
    /// Line number, as printed
    pub line: &'a str,
    /// Case identifier the failure belongs to
    pub case: &'a str,
    /// Assertion macro
    pub assertion: &'a str,
    /// Failure reason
    pub reason: &'a str,
}

impl FailureDetail<'_> {
    /// `file:line`
    #[must_use]
    pub fn location(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }
}

/// Classify one line. First match wins, in declaration order.
#[must_use]
pub fn classify(line: &str) -> XcodeLine<'_> {
    if let Some(caps) = SUITE_START_REGEX.captures(line) {
        let (_, [name]) = caps.extract();
        return XcodeLine::SuiteStarted { name };
    }
    if let Some(caps) = SUITE_STOP_REGEX.captures(line) {
        let (_, [name]) = caps.extract();
        return XcodeLine::SuiteFinished { name };
    }
    if let Some(caps) = CASE_START_REGEX.captures(line) {
        let (_, [case]) = caps.extract();
        return XcodeLine::CaseStarted { case };
    }
    if let Some(caps) = CASE_STOP_REGEX.captures(line) {
        let (_, [case, status, elapsed]) = caps.extract();
        if let Some(status) = CaseStatus::from_token(status) {
            return XcodeLine::CaseFinished {
                case,
                status,
                elapsed,
            };
        }
    }
    if let Some(caps) = TERMINAL_REGEX.captures(line) {
        let (_, [verdict]) = caps.extract();
        let status = if verdict == "FAILED" {
            BuildStatus::Failure
        } else {
            BuildStatus::Success
        };
        return XcodeLine::Terminal { status };
    }
    XcodeLine::Unrecognized
}

/// Parse a failure report line
///
/// Only consulted for the line directly before a failed case's stop line.
#[must_use]
pub fn failure_detail(line: &str) -> Option<FailureDetail<'_>> {
    let caps = FAILURE_REGEX.captures(line)?;
    let (_, [file, line, case, assertion, reason]) = caps.extract();
    Some(FailureDetail {
        file,
        line,
        case,
        assertion,
        reason,
    })
}
