// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Event reconciliation for `xcodebuild test`
//!
//! xcodebuild already prints events in the order the CI server wants, so the
//! work here is filtering and attribution:
//! - the outermost suite levels are xcodebuild's own wrappers (`All tests`,
//!   the `.xctest` bundle) and are not reported
//! - a failed case's assertion report is the line right before its stop line
//! - the run ends at the `** BUILD ... **` line; whatever follows is the
//!   failure reason

use testfeed_core::duration::parse_elapsed;
use testfeed_core::emit::EventSink;
use testfeed_core::error::FeedError;
use testfeed_core::event::{BuildStatus, CaseStatus, Event};
use testfeed_core::outcome::BuildOutcome;
use testfeed_core::reconcile::{Flow, Reconciler};
use tracing::{debug, info, trace, warn};

use crate::classify::{XcodeLine, classify, failure_detail};

/// Suite levels xcodebuild wraps around the real test classes
pub const DEFAULT_WRAPPER_SUITES: usize = 2;

/// State machine for xcodebuild output
#[derive(Debug)]
pub struct XcodeReconciler {
    wrapper_suites: usize,
    /// Current suite nesting, wrappers included
    depth: usize,
    /// Name from the most recent suite line, reported or not
    suite: Option<String>,
    /// Reported suites that are still open, innermost last
    reported: Vec<String>,
    /// `(suite, case)` of a started case awaiting its stop line
    open_case: Option<(String, String)>,
    /// One line of lookback for failure reports
    previous_line: String,
    outcome: BuildOutcome,
}

impl XcodeReconciler {
    /// Create a reconciler that ignores the default two wrapper levels
    #[must_use]
    pub fn new() -> Self {
        Self::with_wrapper_suites(DEFAULT_WRAPPER_SUITES)
    }

    /// Create a reconciler that ignores `wrapper_suites` outer suite levels
    #[must_use]
    pub fn with_wrapper_suites(wrapper_suites: usize) -> Self {
        Self {
            wrapper_suites,
            depth: 0,
            suite: None,
            reported: Vec::new(),
            open_case: None,
            previous_line: String::new(),
            outcome: BuildOutcome::new(),
        }
    }

    /// Current suite nesting depth
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Name of the most recently seen suite
    #[must_use]
    pub fn current_suite(&self) -> Option<&str> {
        self.suite.as_deref()
    }

    /// Reported suites still awaiting their finish line
    #[must_use]
    pub fn open_suites(&self) -> &[String] {
        &self.reported
    }

    /// `(suite, case)` of the case awaiting its stop line
    #[must_use]
    pub fn open_case(&self) -> Option<(&str, &str)> {
        self.open_case
            .as_ref()
            .map(|(suite, case)| (suite.as_str(), case.as_str()))
    }

    /// Suite a case is attributed to. Falls back to the class half of the
    /// `Class method` identifier when no suite line has been seen.
    fn suite_for(&self, case: &str) -> String {
        match &self.suite {
            Some(suite) => suite.clone(),
            None => case
                .split_once(' ')
                .map_or(case, |(class, _)| class)
                .to_string(),
        }
    }

    fn on_suite_started<S: EventSink>(&mut self, name: &str, sink: &mut S) -> Result<(), FeedError> {
        self.depth += 1;
        self.suite = Some(name.to_string());
        if self.depth <= self.wrapper_suites {
            trace!(suite = %name, depth = self.depth, "Skipping wrapper suite");
            return Ok(());
        }
        debug!(suite = %name, depth = self.depth, "Opening suite");
        sink.emit(Event::SuiteStarted {
            name: name.to_string(),
        })?;
        self.reported.push(name.to_string());
        Ok(())
    }

    fn on_suite_finished<S: EventSink>(&mut self, name: &str, sink: &mut S) -> Result<(), FeedError> {
        self.close_interrupted_case(sink)?;
        let reported = self.depth > self.wrapper_suites;
        self.depth = self.depth.saturating_sub(1);
        self.suite = Some(name.to_string());
        if !reported {
            trace!(suite = %name, depth = self.depth, "Skipping wrapper suite");
            return Ok(());
        }
        debug!(suite = %name, "Closing suite");
        self.reported.pop();
        sink.emit(Event::SuiteFinished {
            name: name.to_string(),
        })
    }

    fn on_case_finished<S: EventSink>(
        &mut self,
        case: &str,
        status: CaseStatus,
        elapsed: &str,
        sink: &mut S,
    ) -> Result<(), FeedError> {
        let duration_ms = parse_elapsed(elapsed)?;
        if self.open_case.as_ref().is_some_and(|(_, open)| open != case) {
            self.close_interrupted_case(sink)?;
        }
        let suite = match self.open_case.take() {
            Some((suite, _)) => suite,
            None => self.suite_for(case),
        };

        if status == CaseStatus::Failed {
            info!(suite = %suite, case = %case, "Case failed");
            self.outcome.record_case_failure();
            match failure_detail(&self.previous_line).filter(|detail| detail.case == case) {
                Some(detail) => sink.emit(Event::TestFailed {
                    suite: suite.clone(),
                    name: case.to_string(),
                    message: detail.reason.to_string(),
                    details: detail.location(),
                })?,
                None => debug!(case = %case, "No failure report before the stop line"),
            }
        }

        sink.emit(Event::TestFinished {
            suite,
            name: case.to_string(),
            status,
            duration_ms,
        })
    }

    /// Close a started case that never printed its stop line, as failed
    fn close_interrupted_case<S: EventSink>(&mut self, sink: &mut S) -> Result<(), FeedError> {
        let Some((suite, case)) = self.open_case.take() else {
            return Ok(());
        };
        warn!(suite = %suite, case = %case, "Case ended without a result, closing it as failed");
        self.outcome.record_case_failure();
        sink.emit(Event::TestFinished {
            suite,
            name: case,
            status: CaseStatus::Failed,
            duration_ms: 0,
        })
    }

    fn handle<S: EventSink>(&mut self, line: &str, sink: &mut S) -> Result<Flow, FeedError> {
        match classify(line) {
            XcodeLine::SuiteStarted { name } => self.on_suite_started(name, sink)?,
            XcodeLine::SuiteFinished { name } => self.on_suite_finished(name, sink)?,
            XcodeLine::CaseStarted { case } => {
                self.close_interrupted_case(sink)?;
                let suite = self.suite_for(case);
                sink.emit(Event::TestStarted {
                    suite: suite.clone(),
                    name: case.to_string(),
                })?;
                self.open_case = Some((suite, case.to_string()));
            }
            XcodeLine::CaseFinished {
                case,
                status,
                elapsed,
            } => self.on_case_finished(case, status, elapsed, sink)?,
            XcodeLine::Terminal { status } => {
                info!(status = ?status, "Build finished");
                if status == BuildStatus::Failure {
                    self.outcome.mark_failed();
                }
                return Ok(Flow::Terminal);
            }
            XcodeLine::Unrecognized => {}
        }
        Ok(Flow::Continue)
    }
}

impl Default for XcodeReconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reconciler for XcodeReconciler {
    fn process_line<S: EventSink>(&mut self, line: &str, sink: &mut S) -> Result<Flow, FeedError> {
        let flow = self.handle(line, sink)?;
        self.previous_line.clear();
        self.previous_line.push_str(line);
        Ok(flow)
    }

    fn finish<S: EventSink>(
        mut self,
        trailing: &str,
        sink: &mut S,
    ) -> Result<BuildOutcome, FeedError> {
        self.close_interrupted_case(sink)?;
        if !self.reported.is_empty() {
            warn!(open = self.reported.len(), "Input ended inside reported suites, closing them");
        }
        while let Some(name) = self.reported.pop() {
            sink.emit(Event::SuiteFinished { name })?;
        }

        let reason = match (self.outcome.is_failure(), trailing.is_empty()) {
            (false, _) => String::new(),
            (true, false) => trailing.to_string(),
            (true, true) => self.outcome.failure_summary(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use similar_asserts::assert_eq;

    const ALL: &str = "Test Suite 'All tests' started at 2026-06-01 10:00:00.000";
    const ALL_DONE: &str = "Test Suite 'All tests' finished at 2026-06-01 10:00:01.000.";
    const BUNDLE: &str = "Test Suite 'AppTests.xctest' started at 2026-06-01 10:00:00.001";
    const BUNDLE_DONE: &str = "Test Suite 'AppTests.xctest' finished at 2026-06-01 10:00:00.999.";

    fn suite_start(name: &str) -> String {
        format!("Test Suite '{name}' started at 2026-06-01 10:00:00.002")
    }

    fn suite_stop(name: &str) -> String {
        format!("Test Suite '{name}' finished at 2026-06-01 10:00:00.500.")
    }

    /// Feed lines until a terminal one, then finish with the rest as trailing text
    fn feed(reconciler: XcodeReconciler, lines: &[&str]) -> (Vec<Event>, BuildOutcome) {
        let mut reconciler = reconciler;
        let mut events = Vec::new();
        let mut rest = lines.iter();
        for line in rest.by_ref() {
            if reconciler.process_line(line, &mut events).expect("process") == Flow::Terminal {
                break;
            }
        }
        let trailing: Vec<&str> = rest.copied().collect();
        let outcome = reconciler
            .finish(trailing.join("\n").trim(), &mut events)
            .expect("finish");
        (events, outcome)
    }

    fn success() -> Event {
        Event::BuildStatus {
            status: BuildStatus::Success,
            reason: String::new(),
        }
    }

    #[test]
    fn test_single_passing_case_without_wrappers() {
        let (events, outcome) = feed(
            XcodeReconciler::new(),
            &[
                "Test Suite 'Foo' started at t0",
                "Test Case '-[Foo bar]' started.",
                "Test Case '-[Foo bar]' passed (0.012 seconds).",
                "Test Suite 'Foo' finished at t1",
                "** BUILD SUCCEEDED **",
            ],
        );

        // One level deep, so `Foo` counts as a wrapper
        assert_eq!(
            events,
            vec![
                Event::TestStarted {
                    suite: "Foo".to_string(),
                    name: "Foo bar".to_string(),
                },
                Event::TestFinished {
                    suite: "Foo".to_string(),
                    name: "Foo bar".to_string(),
                    status: CaseStatus::Passed,
                    duration_ms: 12,
                },
                success(),
            ]
        );
        assert_eq!(outcome.exit_code(), 0);
    }

    #[test]
    fn test_wrapper_suites_are_not_reported() {
        let foo = suite_start("Foo");
        let foo_done = suite_stop("Foo");
        let (events, _) = feed(
            XcodeReconciler::new(),
            &[ALL, BUNDLE, &foo, &foo_done, BUNDLE_DONE, ALL_DONE, "** TEST SUCCEEDED **"],
        );
        assert_eq!(
            events,
            vec![
                Event::SuiteStarted {
                    name: "Foo".to_string()
                },
                Event::SuiteFinished {
                    name: "Foo".to_string()
                },
                success(),
            ]
        );
    }

    #[test]
    fn test_wrapper_level_is_configurable() {
        let (events, _) = feed(
            XcodeReconciler::with_wrapper_suites(0),
            &[ALL, ALL_DONE, "** BUILD SUCCEEDED **"],
        );
        assert_eq!(
            events[0],
            Event::SuiteStarted {
                name: "All tests".to_string()
            }
        );
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn test_failed_case_with_report() {
        let foo = suite_start("Foo");
        let foo_done = suite_stop("Foo");
        let (events, outcome) = feed(
            XcodeReconciler::new(),
            &[
                ALL,
                BUNDLE,
                &foo,
                "Test Case '-[Foo bar]' started.",
                "/src/FooTests.m:42: error: -[Foo bar] : 'XCTAssertEqual' [FAILED], 1 is not 2",
                "Test Case '-[Foo bar]' failed (0.250 seconds).",
                &foo_done,
                BUNDLE_DONE,
                ALL_DONE,
                "** TEST FAILED **",
            ],
        );

        assert_eq!(
            &events[1..4],
            &[
                Event::TestStarted {
                    suite: "Foo".to_string(),
                    name: "Foo bar".to_string(),
                },
                Event::TestFailed {
                    suite: "Foo".to_string(),
                    name: "Foo bar".to_string(),
                    message: "1 is not 2".to_string(),
                    details: "/src/FooTests.m:42".to_string(),
                },
                Event::TestFinished {
                    suite: "Foo".to_string(),
                    name: "Foo bar".to_string(),
                    status: CaseStatus::Failed,
                    duration_ms: 250,
                },
            ]
        );
        assert_eq!(
            events.last(),
            Some(&Event::BuildStatus {
                status: BuildStatus::Failure,
                reason: "1 test(s) failed".to_string(),
            })
        );
        assert_eq!(outcome.failed_cases(), 1);
    }

    #[test]
    fn test_failure_report_for_another_case_is_not_paired() {
        let (events, outcome) = feed(
            XcodeReconciler::new(),
            &[
                "Test Case '-[Foo bar]' started.",
                "/src/FooTests.m:42: error: -[Foo other] : 'XCTAssertTrue' [FAILED], nope",
                "Test Case '-[Foo bar]' failed (0.001 seconds).",
            ],
        );
        assert!(!events.iter().any(|e| matches!(e, Event::TestFailed { .. })));
        assert!(outcome.is_failure());
    }

    #[test]
    fn test_report_must_be_directly_before_stop() {
        let (events, _) = feed(
            XcodeReconciler::new(),
            &[
                "Test Case '-[Foo bar]' started.",
                "/src/FooTests.m:42: error: -[Foo bar] : 'XCTFail' [FAILED], boom",
                "some diagnostic output",
                "Test Case '-[Foo bar]' failed (0.001 seconds).",
            ],
        );
        assert!(!events.iter().any(|e| matches!(e, Event::TestFailed { .. })));
    }

    #[test]
    fn test_case_without_suite_uses_class_name() {
        let (events, _) = feed(XcodeReconciler::new(), &["Test Case '-[Foo bar]' started."]);
        assert_eq!(
            events[0],
            Event::TestStarted {
                suite: "Foo".to_string(),
                name: "Foo bar".to_string(),
            }
        );
    }

    #[test]
    fn test_case_without_result_is_closed_as_failed() {
        let (events, outcome) = feed(
            XcodeReconciler::new(),
            &[
                "Test Case '-[Foo a]' started.",
                "Test Case '-[Foo b]' started.",
                "Test Case '-[Foo b]' passed (0.004 seconds).",
                "Test Case '-[Foo c]' started.",
            ],
        );
        let finished = |name: &str, status, duration_ms| Event::TestFinished {
            suite: "Foo".to_string(),
            name: name.to_string(),
            status,
            duration_ms,
        };
        let started = |name: &str| Event::TestStarted {
            suite: "Foo".to_string(),
            name: name.to_string(),
        };
        assert_eq!(
            events,
            vec![
                started("Foo a"),
                finished("Foo a", CaseStatus::Failed, 0),
                started("Foo b"),
                finished("Foo b", CaseStatus::Passed, 4),
                started("Foo c"),
                finished("Foo c", CaseStatus::Failed, 0),
                Event::BuildStatus {
                    status: BuildStatus::Failure,
                    reason: "2 test(s) failed".to_string(),
                },
            ]
        );
        assert_eq!(outcome.failed_cases(), 2);
    }

    #[test]
    fn test_open_case_is_closed_before_its_suite() {
        let foo = suite_start("Foo");
        let foo_done = suite_stop("Foo");
        let (events, _) = feed(
            XcodeReconciler::new(),
            &[ALL, BUNDLE, &foo, "Test Case '-[Foo bar]' started.", &foo_done],
        );
        assert_eq!(
            &events[1..4],
            &[
                Event::TestStarted {
                    suite: "Foo".to_string(),
                    name: "Foo bar".to_string(),
                },
                Event::TestFinished {
                    suite: "Foo".to_string(),
                    name: "Foo bar".to_string(),
                    status: CaseStatus::Failed,
                    duration_ms: 0,
                },
                Event::SuiteFinished {
                    name: "Foo".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_build_failed_uses_trailing_text_as_reason() {
        let (events, outcome) = feed(
            XcodeReconciler::new(),
            &[
                "CompileC Foo.o",
                "** BUILD FAILED **",
                "",
                "The following build commands failed:",
                "\tCompileC Foo.o",
            ],
        );
        assert_eq!(
            events,
            vec![Event::BuildStatus {
                status: BuildStatus::Failure,
                reason: "The following build commands failed:\n\tCompileC Foo.o".to_string(),
            }]
        );
        assert_eq!(outcome.failed_cases(), 0);
        assert_eq!(outcome.exit_code(), 1);
    }

    #[test]
    fn test_trailing_text_ignored_on_success() {
        let (events, _) = feed(
            XcodeReconciler::new(),
            &["** BUILD SUCCEEDED **", "anything after"],
        );
        assert_eq!(events, vec![success()]);
    }

    #[test]
    fn test_empty_input_emits_only_build_status() {
        let (events, outcome) = feed(XcodeReconciler::new(), &[]);
        assert_eq!(events, vec![success()]);
        assert_eq!(outcome.exit_code(), 0);
    }

    #[test]
    fn test_premature_end_closes_reported_suites_innermost_first() {
        let outer = suite_start("Outer");
        let inner = suite_start("Inner");
        let (events, _) = feed(XcodeReconciler::new(), &[ALL, BUNDLE, &outer, &inner]);
        assert_eq!(
            events,
            vec![
                Event::SuiteStarted {
                    name: "Outer".to_string()
                },
                Event::SuiteStarted {
                    name: "Inner".to_string()
                },
                Event::SuiteFinished {
                    name: "Inner".to_string()
                },
                Event::SuiteFinished {
                    name: "Outer".to_string()
                },
                success(),
            ]
        );
    }

    #[test]
    fn test_unbalanced_stop_does_not_underflow() {
        let mut reconciler = XcodeReconciler::with_wrapper_suites(0);
        let mut events = Vec::new();
        reconciler
            .process_line(&suite_stop("Ghost"), &mut events)
            .expect("process");
        assert_eq!(reconciler.depth(), 0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_malformed_elapsed_is_fatal() {
        let mut reconciler = XcodeReconciler::new();
        let mut events = Vec::new();
        let err = reconciler
            .process_line("Test Case '-[Foo bar]' passed (fast seconds).", &mut events)
            .expect_err("should fail");
        assert!(matches!(err, FeedError::Parse(_)));
    }

    #[derive(Debug, Clone)]
    enum SuiteLine {
        Start(u8),
        Stop(u8),
        Noise,
    }

    fn suite_line() -> impl Strategy<Value = SuiteLine> {
        prop_oneof![
            (0u8..4).prop_map(SuiteLine::Start),
            (0u8..4).prop_map(SuiteLine::Stop),
            Just(SuiteLine::Noise),
        ]
    }

    proptest! {
        #[test]
        fn prop_reported_suites_stay_balanced(
            wrappers in 0usize..4,
            lines in prop::collection::vec(suite_line(), 0..40),
        ) {
            let mut reconciler = XcodeReconciler::with_wrapper_suites(wrappers);
            let mut events = Vec::new();
            let mut nesting: i64 = 0;
            for line in &lines {
                let text = match line {
                    SuiteLine::Start(n) => { nesting += 1; suite_start(&format!("S{n}")) }
                    SuiteLine::Stop(n) => { nesting = (nesting - 1).max(0); suite_stop(&format!("S{n}")) }
                    SuiteLine::Noise => "note: nothing to see".to_string(),
                };
                reconciler.process_line(&text, &mut events).expect("process");
                prop_assert_eq!(reconciler.depth() as i64, nesting);
                prop_assert!(reconciler.open_suites().len() <= reconciler.depth());
            }
            reconciler.finish("", &mut events).expect("finish");

            let opened = events.iter().filter(|e| matches!(e, Event::SuiteStarted { .. })).count();
            let closed = events.iter().filter(|e| matches!(e, Event::SuiteFinished { .. })).count();
            prop_assert_eq!(opened, closed);
        }
    }
}
