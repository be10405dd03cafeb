// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Event reconciliation for the instrumentation runner
//!
//! The runner prints a passing case as `started → finished → passed` and a
//! failing one as `started → failed → (exception dump) → finished`. The CI
//! server wants `started → [failure] → finished` in both cases, so:
//! - `passed` closes the case immediately
//! - `failed` only records the failure; the case closes on `finished`, after
//!   the exception dump has had a chance to produce the failure message

use chrono::{Datelike, Local};
use testfeed_core::duration::Timestamp;
use testfeed_core::emit::EventSink;
use testfeed_core::error::FeedError;
use testfeed_core::event::{CaseStatus, Event};
use testfeed_core::outcome::BuildOutcome;
use testfeed_core::reconcile::{Flow, Reconciler};
use tracing::{debug, info, trace, warn};

use crate::classify::{AndroidLine, CaseKey, classify};

/// Where the open case is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaseState {
    /// Started, no status yet
    Running,
    /// Reported failed; the stop is deferred until `finished`
    Failed {
        /// Duration computed from the status line
        duration_ms: u64,
    },
}

/// Everything known about the one open case
#[derive(Debug, Clone)]
struct CaseContext {
    suite: String,
    name: String,
    started_at: Timestamp,
    state: CaseState,
    /// Reason captured from the assertion line, awaiting its stack frame
    pending_reason: Option<String>,
    /// A failure message has already been emitted for this case
    detail_emitted: bool,
}

impl CaseContext {
    fn key(&self) -> CaseKey<'_> {
        CaseKey {
            suite: &self.suite,
            case: &self.name,
        }
    }

    fn is(&self, suite: &str, case: &str) -> bool {
        self.suite == suite && self.name == case
    }

    fn finished_event(&self, status: CaseStatus, duration_ms: u64) -> Event {
        Event::TestFinished {
            suite: self.suite.clone(),
            name: self.name.clone(),
            status,
            duration_ms,
        }
    }
}

/// State machine for instrumentation runner output
#[derive(Debug)]
pub struct AndroidReconciler {
    year: i32,
    suite: Option<String>,
    case: Option<CaseContext>,
    outcome: BuildOutcome,
}

impl AndroidReconciler {
    /// Create a reconciler that dates timestamps in the current year
    #[must_use]
    pub fn new() -> Self {
        Self::with_year(Local::now().year())
    }

    /// Create a reconciler that dates timestamps in `year`
    #[must_use]
    pub fn with_year(year: i32) -> Self {
        Self {
            year,
            suite: None,
            case: None,
            outcome: BuildOutcome::new(),
        }
    }

    /// Name of the currently open suite
    #[must_use]
    pub fn open_suite(&self) -> Option<&str> {
        self.suite.as_deref()
    }

    /// `(suite, case)` of the currently open case
    #[must_use]
    pub fn open_case(&self) -> Option<(&str, &str)> {
        self.case
            .as_ref()
            .map(|c| (c.suite.as_str(), c.name.as_str()))
    }

    fn on_case_started<S: EventSink>(
        &mut self,
        timestamp: &str,
        suite: &str,
        case: &str,
        sink: &mut S,
    ) -> Result<(), FeedError> {
        let started_at = Timestamp::parse_in_year(timestamp, self.year)?;
        self.close_interrupted_case(sink)?;

        if self.suite.as_deref() != Some(suite) {
            if let Some(previous) = self.suite.take() {
                debug!(suite = %previous, "Closing suite");
                sink.emit(Event::SuiteFinished { name: previous })?;
            }
            debug!(suite = %suite, "Opening suite");
            sink.emit(Event::SuiteStarted {
                name: suite.to_string(),
            })?;
            self.suite = Some(suite.to_string());
        }

        sink.emit(Event::TestStarted {
            suite: suite.to_string(),
            name: case.to_string(),
        })?;
        self.case = Some(CaseContext {
            suite: suite.to_string(),
            name: case.to_string(),
            started_at,
            state: CaseState::Running,
            pending_reason: None,
            detail_emitted: false,
        });
        Ok(())
    }

    fn on_case_status<S: EventSink>(
        &mut self,
        timestamp: &str,
        status: CaseStatus,
        suite: &str,
        case: &str,
        sink: &mut S,
    ) -> Result<(), FeedError> {
        let Some(open) = self.case.as_mut().filter(|c| c.is(suite, case)) else {
            debug!(suite = %suite, case = %case, "Status for a case that is not open, ignoring");
            return Ok(());
        };
        if open.state != CaseState::Running {
            debug!(suite = %suite, case = %case, "Case already has a status, ignoring");
            return Ok(());
        }

        let stopped_at = Timestamp::parse_in_year(timestamp, self.year)?;
        let duration_ms = open.started_at.millis_until(&stopped_at);

        match status {
            CaseStatus::Failed => {
                info!(suite = %suite, case = %case, "Case failed");
                open.state = CaseState::Failed { duration_ms };
                self.outcome.record_case_failure();
            }
            CaseStatus::Passed => {
                sink.emit(open.finished_event(CaseStatus::Passed, duration_ms))?;
                self.case = None;
            }
        }
        Ok(())
    }

    fn on_case_finished<S: EventSink>(
        &mut self,
        suite: &str,
        case: &str,
        sink: &mut S,
    ) -> Result<(), FeedError> {
        let deferred = match self.case.as_ref() {
            Some(open) if open.is(suite, case) => match open.state {
                CaseState::Failed { duration_ms } => {
                    Some(open.finished_event(CaseStatus::Failed, duration_ms))
                }
                CaseState::Running => None,
            },
            _ => {
                trace!(suite = %suite, case = %case, "Finished line for a closed case");
                None
            }
        };
        if let Some(event) = deferred {
            sink.emit(event)?;
            self.case = None;
        }
        Ok(())
    }

    fn on_assertion(&mut self, reason: &str) {
        match self.case.as_mut() {
            Some(open) => open.pending_reason = Some(reason.to_string()),
            None => debug!(reason = %reason, "Assertion outside any case, ignoring"),
        }
    }

    fn on_failure_location<S: EventSink>(
        &mut self,
        file: &str,
        line: u32,
        sink: &mut S,
    ) -> Result<(), FeedError> {
        let Some(open) = self.case.as_mut() else {
            return Ok(());
        };
        if open.detail_emitted {
            return Ok(());
        }
        let Some(message) = open.pending_reason.take() else {
            debug!(file = %file, line, "Stack frame without a captured assertion, ignoring");
            return Ok(());
        };

        sink.emit(Event::TestFailed {
            suite: open.suite.clone(),
            name: open.name.clone(),
            message,
            details: format!("{file}:{line}"),
        })?;
        open.detail_emitted = true;
        Ok(())
    }

    /// Close a case that is still open when the next case starts or input
    /// ends. A case that never reported a status counts as failed.
    fn close_interrupted_case<S: EventSink>(&mut self, sink: &mut S) -> Result<(), FeedError> {
        let Some(open) = self.case.take() else {
            return Ok(());
        };
        let duration_ms = match open.state {
            CaseState::Failed { duration_ms } => {
                warn!(suite = %open.suite, case = %open.name, "Failed case was never finished, closing it");
                duration_ms
            }
            CaseState::Running => {
                warn!(suite = %open.suite, case = %open.name, "Case ended without a status, closing it as failed");
                self.outcome.record_case_failure();
                0
            }
        };
        sink.emit(open.finished_event(CaseStatus::Failed, duration_ms))
    }
}

impl Default for AndroidReconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reconciler for AndroidReconciler {
    fn process_line<S: EventSink>(&mut self, line: &str, sink: &mut S) -> Result<Flow, FeedError> {
        let open_key = self.case.as_ref().map(CaseContext::key);
        match classify(line, open_key) {
            AndroidLine::CaseStarted {
                timestamp,
                suite,
                case,
            } => self.on_case_started(timestamp, suite, case, sink)?,
            AndroidLine::CaseStatus {
                timestamp,
                status,
                suite,
                case,
            } => self.on_case_status(timestamp, status, suite, case, sink)?,
            AndroidLine::CaseFinished { suite, case, .. } => {
                self.on_case_finished(suite, case, sink)?;
            }
            AndroidLine::Assertion { reason, .. } => self.on_assertion(reason),
            AndroidLine::FailureLocation { file, line } => {
                self.on_failure_location(file, line, sink)?;
            }
            AndroidLine::Unrecognized => {}
        }
        Ok(Flow::Continue)
    }

    fn finish<S: EventSink>(
        mut self,
        _trailing: &str,
        sink: &mut S,
    ) -> Result<BuildOutcome, FeedError> {
        self.close_interrupted_case(sink)?;
        if let Some(suite) = self.suite.take() {
            debug!(suite = %suite, "Closing last suite");
            sink.emit(Event::SuiteFinished { name: suite })?;
        }

        let reason = if self.outcome.is_failure() {
            self.outcome.failure_summary()
        } else {
            String::new()
        };
        sink.emit(Event::BuildStatus {
            status: self.outcome.status(),
            reason,
        })?;
        Ok(self.outcome)
    }

    fn outcome(&self) -> &BuildOutcome {
        &self.outcome
    }
}
