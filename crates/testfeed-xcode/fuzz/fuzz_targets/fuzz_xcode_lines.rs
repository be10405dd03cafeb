// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for raw xcodebuild output
//!
//! Any byte stream must either convert or return an error, never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;

use testfeed_core::driver::{DriverOptions, EchoMode, run};
use testfeed_core::emit::Style;
use testfeed_xcode::XcodeReconciler;

fuzz_target!(|data: &[u8]| {
    let options = DriverOptions {
        style: Style::Protocol,
        echo: EchoMode::All,
    };
    let mut out = Vec::new();
    let _ = run(XcodeReconciler::new(), data, &mut out, &options);
});
