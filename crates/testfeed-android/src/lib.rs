// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! testfeed-android: Android instrumentation runner logs for testfeed
//!
//! This library crate classifies `I/TestRunner` logcat lines and reconciles
//! them into the start / failure / finish order the CI server expects.
//!
//! # Example
//!
//! ```
//! use testfeed_android::AndroidReconciler;
//! use testfeed_core::driver::{run, DriverOptions, EchoMode};
//! use testfeed_core::emit::Style;
//!
//! let log = "\
//! 06-01 10:00:00.000 I/TestRunner( 1234): started: testLogin(com.example.LoginTest)
//! 06-01 10:00:01.400 I/TestRunner( 1234): finished: testLogin(com.example.LoginTest)
//! 06-01 10:00:01.500 I/TestRunner( 1234): passed: testLogin(com.example.LoginTest)
//! ";
//! let options = DriverOptions { style: Style::Protocol, echo: EchoMode::Filtered };
//! let mut out = Vec::new();
//! let summary = run(AndroidReconciler::new(), log.as_bytes(), &mut out, &options).unwrap();
//!
//! assert_eq!(summary.exit_code(), 0);
//! assert!(String::from_utf8(out).unwrap()
//!     .contains("##teamcity[testFinished name='com.example.LoginTest.testLogin' duration='1500']"));
//! ```

#![warn(missing_docs)]

pub mod classify;
pub mod reconcile;

pub use classify::{AndroidLine, CaseKey, classify};
pub use reconcile::AndroidReconciler;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::classify::{AndroidLine, classify};
    pub use crate::reconcile::AndroidReconciler;
}
