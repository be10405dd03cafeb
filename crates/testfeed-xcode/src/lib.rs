// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! testfeed-xcode: `xcodebuild test` output for testfeed
//!
//! Classifies XCTest suite and case lines, skips the wrapper suites
//! xcodebuild adds around real test classes, and pairs each failed case with
//! the assertion report printed just before it.
//!
//! # Example
//!
//! ```
//! use testfeed_core::driver::{run, DriverOptions, EchoMode};
//! use testfeed_core::emit::Style;
//! use testfeed_xcode::XcodeReconciler;
//!
//! let log = "\
//! Test Suite 'Foo' started at 2026-06-01 10:00:00.000
//! Test Case '-[Foo bar]' started.
//! Test Case '-[Foo bar]' passed (0.012 seconds).
//! Test Suite 'Foo' finished at 2026-06-01 10:00:00.013.
//! ** BUILD SUCCEEDED **
//! ";
//! let options = DriverOptions { style: Style::Protocol, echo: EchoMode::Filtered };
//! let mut out = Vec::new();
//! let summary = run(XcodeReconciler::new(), log.as_bytes(), &mut out, &options).unwrap();
//!
//! assert_eq!(summary.exit_code(), 0);
//! assert!(summary.reached_terminal);
//! assert!(String::from_utf8(out).unwrap()
//!     .ends_with("##teamcity[buildStatus status='SUCCESS' text='{build.status.text}']\n"));
//! ```

#![warn(missing_docs)]

pub mod classify;
pub mod reconcile;

pub use classify::{FailureDetail, XcodeLine, classify, failure_detail};
pub use reconcile::{DEFAULT_WRAPPER_SUITES, XcodeReconciler};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::classify::{XcodeLine, classify};
    pub use crate::reconcile::XcodeReconciler;
}
