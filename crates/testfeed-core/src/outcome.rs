// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Aggregate build outcome

use serde::{Deserialize, Serialize};

use crate::event::BuildStatus;

/// Running verdict for one conversion run
///
/// Starts as success and only ever moves to failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOutcome {
    status: BuildStatus,
    failed_cases: usize,
}

impl BuildOutcome {
    /// A fresh, successful outcome
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one failed case
    pub fn record_case_failure(&mut self) {
        self.failed_cases += 1;
        self.status = BuildStatus::Failure;
    }

    /// Record a failure reported by the build tool itself
    pub fn mark_failed(&mut self) {
        self.status = BuildStatus::Failure;
    }

    /// Current status
    #[must_use]
    pub fn status(&self) -> BuildStatus {
        self.status
    }

    /// Whether anything has failed
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.status == BuildStatus::Failure
    }

    /// Number of failed cases seen so far
    #[must_use]
    pub fn failed_cases(&self) -> usize {
        self.failed_cases
    }

    /// The `"<n> test(s) failed"` summary used as a build-status reason
    #[must_use]
    pub fn failure_summary(&self) -> String {
        format!("{} test(s) failed", self.failed_cases)
    }

    /// Process exit code for this outcome
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self.status {
            BuildStatus::Success => 0,
            BuildStatus::Failure => 1,
        }
    }
}
