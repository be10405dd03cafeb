// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for the instrumentation runner reconciler
//!
//! Arbitrary text is fed line by line; parse errors are acceptable, panics
//! are not, and every started case must be finished when the run completes.

#![no_main]

use libfuzzer_sys::fuzz_target;

use testfeed_android::AndroidReconciler;
use testfeed_core::event::Event;
use testfeed_core::reconcile::Reconciler;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let mut reconciler = AndroidReconciler::with_year(2024);
        let mut events = Vec::new();

        for line in input.lines() {
            if reconciler.process_line(line.trim_end(), &mut events).is_err() {
                return;
            }
        }

        if reconciler.finish("", &mut events).is_err() {
            return;
        }

        let started = events
            .iter()
            .filter(|e| matches!(e, Event::TestStarted { .. }))
            .count();
        let finished = events
            .iter()
            .filter(|e| matches!(e, Event::TestFinished { .. }))
            .count();
        assert_eq!(started, finished);

        let opened = events
            .iter()
            .filter(|e| matches!(e, Event::SuiteStarted { .. }))
            .count();
        let closed = events
            .iter()
            .filter(|e| matches!(e, Event::SuiteFinished { .. }))
            .count();
        assert_eq!(opened, closed);
    }
});
