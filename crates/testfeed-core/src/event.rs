// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Normalized test events
//!
//! Every grammar is reduced to this small vocabulary before rendering.

use serde::{Deserialize, Serialize};

/// Final status of a single test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    /// Case passed
    Passed,
    /// Case failed
    Failed,
}

impl CaseStatus {
    /// Parse the status token printed by the test tools
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "passed" => Some(Self::Passed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// The token as printed in plain output
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }
}

/// Aggregate status of the whole build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BuildStatus {
    /// No failure has been observed
    #[default]
    Success,
    /// At least one case or the build tool itself failed
    Failure,
}

/// An event ready to be rendered for the CI server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum Event {
    /// A suite was opened
    #[serde(rename = "testSuiteStarted")]
    SuiteStarted {
        /// Suite name
        name: String,
    },
    /// A suite was closed
    #[serde(rename = "testSuiteFinished")]
    SuiteFinished {
        /// Suite name
        name: String,
    },
    /// A case began
    TestStarted {
        /// Owning suite
        suite: String,
        /// Case name
        name: String,
    },
    /// A case's failure detail
    TestFailed {
        /// Owning suite
        suite: String,
        /// Case name
        name: String,
        /// Human readable reason
        message: String,
        /// Source location as `file:line`
        details: String,
    },
    /// A case ended
    TestFinished {
        /// Owning suite
        suite: String,
        /// Case name
        name: String,
        /// Final case status
        status: CaseStatus,
        /// Duration in milliseconds
        #[serde(rename = "durationMs")]
        duration_ms: u64,
    },
    /// Final verdict for the build
    BuildStatus {
        /// Aggregate status
        status: BuildStatus,
        /// Why the build failed (empty on success)
        reason: String,
    },
}

impl Event {
    /// Fully qualified `<suite>.<case>` name for case events
    #[must_use]
    pub fn qualified_name(&self) -> Option<String> {
        match self {
            Self::TestStarted { suite, name }
            | Self::TestFailed { suite, name, .. }
            | Self::TestFinished { suite, name, .. } => Some(format!("{suite}.{name}")),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_status_tokens() {
        assert_eq!(CaseStatus::from_token("passed"), Some(CaseStatus::Passed));
        assert_eq!(CaseStatus::from_token("failed"), Some(CaseStatus::Failed));
        assert_eq!(CaseStatus::from_token("skipped"), None);
        assert_eq!(CaseStatus::Failed.as_str(), "failed");
    }

    #[test]
    fn test_qualified_name() {
        let event = Event::TestStarted {
            suite: "com.example.FooTest".to_string(),
            name: "testBar".to_string(),
        };
        assert_eq!(
            event.qualified_name().as_deref(),
            Some("com.example.FooTest.testBar")
        );

        let suite = Event::SuiteStarted {
            name: "Foo".to_string(),
        };
        assert_eq!(suite.qualified_name(), None);
    }

    #[test]
    fn test_event_json_shape() {
        let event = Event::TestFinished {
            suite: "Foo".to_string(),
            name: "bar".to_string(),
            status: CaseStatus::Passed,
            duration_ms: 12,
        };
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["event"], "testFinished");
        assert_eq!(json["status"], "passed");
        assert_eq!(json["durationMs"], 12);

        let back: Event = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, event);
    }

    #[test]
    fn test_build_status_json_shape() {
        let event = Event::BuildStatus {
            status: BuildStatus::Failure,
            reason: "1 test(s) failed".to_string(),
        };
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["event"], "buildStatus");
        assert_eq!(json["status"], "FAILURE");
    }
}
