// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Line grammar of the Android instrumentation test runner
//!
//! The runner logs through logcat, so every event line carries a
//! `MM-DD hh:mm:ss.fff` prefix and an `I/TestRunner` tag:
//!
//! ```text
//! 06-01 10:00:00.000 I/TestRunner( 1234): started: testLogin(com.example.LoginTest)
//! 06-01 10:00:00.250 I/TestRunner( 1234): failed: testLogin(com.example.LoginTest)
//! 06-01 10:00:00.251 I/TestRunner( 1234): junit.framework.AssertionFailedError: expected:<1> but was:<2>
//! 06-01 10:00:00.252 I/TestRunner( 1234):     at com.example.LoginTest.testLogin(LoginTest.java:42)
//! 06-01 10:00:00.260 I/TestRunner( 1234): finished: testLogin(com.example.LoginTest)
//! ```
//!
//! Stack frames are only meaningful for the case that is currently open, so
//! [`classify`] takes that case as context.

use std::sync::LazyLock;

use regex::Regex;
use testfeed_core::event::CaseStatus;

static CASE_START_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?) I/TestRunner.+? started: (.+?)\((.+?)\)$").expect("valid regex")
});

static CASE_STATUS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?) I/TestRunner.+? (passed|failed): (.+?)\((.+?)\)$").expect("valid regex")
});

static CASE_STOP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?) I/TestRunner.+? finished: (.+?)\((.+?)\)$").expect("valid regex")
});

static ASSERTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^.+?: ((?:junit\.framework\.(?:AssertionFailedError|ComparisonFailure)|java\.lang\.AssertionError)(?::.*)?)$",
    )
    .expect("valid regex")
});

static EXPECTED_ACTUAL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"expected:(.+?) but was:(.+)$").expect("valid regex"));

static STACK_FRAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*?\bat (\S+)\.([^.\s():]+)\(([^():]+):([0-9]+)\)$").expect("valid regex")
});

/// Identity of the case a stack frame must belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaseKey<'a> {
    /// Fully qualified test class
    pub suite: &'a str,
    /// Test method
    pub case: &'a str,
}

/// A classified runner line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AndroidLine<'a> {
    /// `started: case(suite)`
    CaseStarted {
        /// Logcat timestamp
        timestamp: &'a str,
        /// Fully qualified test class
        suite: &'a str,
        /// Test method
        case: &'a str,
    },
    /// `passed: case(suite)` or `failed: case(suite)`
    CaseStatus {
        /// Logcat timestamp
        timestamp: &'a str,
        /// Reported status
        status: CaseStatus,
        /// Fully qualified test class
        suite: &'a str,
        /// Test method
        case: &'a str,
    },
    /// `finished: case(suite)`
    CaseFinished {
        /// Logcat timestamp
        timestamp: &'a str,
        /// Fully qualified test class
        suite: &'a str,
        /// Test method
        case: &'a str,
    },
    /// First line of an exception dump
    Assertion {
        /// Exception class and message
        reason: &'a str,
        /// `expected:` part, when the message has one
        expected: Option<&'a str>,
        /// `but was:` part, when the message has one
        actual: Option<&'a str>,
    },
    /// A stack frame inside the open case's test method
    FailureLocation {
        /// Source file
        file: &'a str,
        /// Line number
        line: u32,
    },
    /// Anything else
    Unrecognized,
}

/// Classify one line
///
/// Categories are tried in a fixed order (start, status, stop, assertion,
/// stack frame); the first match wins. A stack frame is only recognized when
/// its class and method equal `open_case`.
#[must_use]
pub fn classify<'a>(line: &'a str, open_case: Option<CaseKey<'_>>) -> AndroidLine<'a> {
    if let Some(caps) = CASE_START_REGEX.captures(line) {
        let (_, [timestamp, case, suite]) = caps.extract();
        return AndroidLine::CaseStarted {
            timestamp,
            suite,
            case,
        };
    }

    if let Some(caps) = CASE_STATUS_REGEX.captures(line) {
        let (_, [timestamp, status, case, suite]) = caps.extract();
        if let Some(status) = CaseStatus::from_token(status) {
            return AndroidLine::CaseStatus {
                timestamp,
                status,
                suite,
                case,
            };
        }
    }

    if let Some(caps) = CASE_STOP_REGEX.captures(line) {
        let (_, [timestamp, case, suite]) = caps.extract();
        return AndroidLine::CaseFinished {
            timestamp,
            suite,
            case,
        };
    }

    if let Some(caps) = ASSERTION_REGEX.captures(line) {
        let reason = caps.get(1).map_or("", |m| m.as_str());
        let (expected, actual) = match EXPECTED_ACTUAL_REGEX.captures(reason) {
            Some(parts) => (
                parts.get(1).map(|m| m.as_str()),
                parts.get(2).map(|m| m.as_str()),
            ),
            None => (None, None),
        };
        return AndroidLine::Assertion {
            reason,
            expected,
            actual,
        };
    }

    if let Some(open) = open_case {
        if let Some(caps) = STACK_FRAME_REGEX.captures(line) {
            let (_, [class, method, file, line_number]) = caps.extract();
            if class == open.suite && method == open.case {
                if let Ok(line) = line_number.parse() {
                    return AndroidLine::FailureLocation { file, line };
                }
            }
        }
    }

    AndroidLine::Unrecognized
}
