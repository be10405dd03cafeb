// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for well-formed xcodebuild lines in arbitrary order
//!
//! Reported suites must stay balanced and every started case must be
//! finished, whatever order the lines arrive in.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use testfeed_core::event::Event;
use testfeed_core::reconcile::{Flow, Reconciler};
use testfeed_xcode::XcodeReconciler;

#[derive(Debug, Arbitrary)]
enum Line {
    SuiteStart(u8),
    SuiteStop(u8),
    CaseStart(u8),
    CasePassed(u8, u16),
    CaseFailed(u8, u16),
    Report(u8, u16),
    Noise(String),
    Terminal(bool),
}

impl Line {
    fn render(&self) -> String {
        match self {
            Line::SuiteStart(s) => format!("Test Suite 'S{s}' started at t"),
            Line::SuiteStop(s) => format!("Test Suite 'S{s}' finished at t"),
            Line::CaseStart(c) => format!("Test Case '-[S c{c}]' started."),
            Line::CasePassed(c, ms) => format!("Test Case '-[S c{c}]' passed (0.{ms} seconds)."),
            Line::CaseFailed(c, ms) => format!("Test Case '-[S c{c}]' failed (0.{ms} seconds)."),
            Line::Report(c, line) => {
                format!("/f.m:{line}: error: -[S c{c}] : 'XCTFail' [FAILED], boom")
            }
            Line::Noise(text) => text.clone(),
            Line::Terminal(failed) => {
                if *failed {
                    "** BUILD FAILED **".to_string()
                } else {
                    "** BUILD SUCCEEDED **".to_string()
                }
            }
        }
    }
}

#[derive(Debug, Arbitrary)]
struct Input {
    wrappers: u8,
    lines: Vec<Line>,
}

fuzz_target!(|input: Input| {
    let mut reconciler = XcodeReconciler::with_wrapper_suites(usize::from(input.wrappers % 4));
    let mut events = Vec::new();

    for line in &input.lines {
        match reconciler.process_line(&line.render(), &mut events) {
            Ok(Flow::Terminal) | Err(_) => break,
            Ok(Flow::Continue) => {}
        }
    }
    if reconciler.finish("", &mut events).is_err() {
        return;
    }

    // Stop lines without a start still produce a finish, never the reverse
    let started = events
        .iter()
        .filter(|e| matches!(e, Event::TestStarted { .. }))
        .count();
    let finished = events
        .iter()
        .filter(|e| matches!(e, Event::TestFinished { .. }))
        .count();
    assert!(started <= finished);

    let opened = events
        .iter()
        .filter(|e| matches!(e, Event::SuiteStarted { .. }))
        .count();
    let closed = events
        .iter()
        .filter(|e| matches!(e, Event::SuiteFinished { .. }))
        .count();
    assert_eq!(opened, closed);
});
