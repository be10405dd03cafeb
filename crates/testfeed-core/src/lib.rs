// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! testfeed-core: shared machinery for turning test tool logs into CI events
//!
//! This crate provides the pieces every grammar shares: the normalized
//! [`Event`] vocabulary, the monotonic [`BuildOutcome`], duration arithmetic,
//! the message renderer, the [`Reconciler`] trait each grammar implements and
//! the stream driver that ties them to an input and an output.
//!
//! # Example
//!
//! ```
//! use testfeed_core::duration::{duration_between, parse_elapsed};
//! use testfeed_core::emit::{render, Style};
//! use testfeed_core::event::{CaseStatus, Event};
//!
//! let duration_ms = duration_between("06-01 10:00:00.000", "06-01 10:00:01.500").unwrap();
//! assert_eq!(duration_ms, 1500);
//! assert_eq!(parse_elapsed("1.250").unwrap(), 1250);
//!
//! let event = Event::TestFinished {
//!     suite: "Foo".to_string(),
//!     name: "bar".to_string(),
//!     status: CaseStatus::Passed,
//!     duration_ms,
//! };
//! assert_eq!(
//!     render(&event, Style::Protocol).unwrap(),
//!     "##teamcity[testFinished name='Foo.bar' duration='1500']"
//! );
//! ```

#![warn(missing_docs)]

pub mod driver;
pub mod duration;
pub mod emit;
pub mod error;
pub mod event;
pub mod outcome;
pub mod reconcile;

pub use driver::{DriverOptions, EchoMode, RunSummary, run};
pub use emit::{Emitter, EventSink, Style};
pub use error::{FeedError, ParseError};
pub use event::{BuildStatus, CaseStatus, Event};
pub use outcome::BuildOutcome;
pub use reconcile::{Flow, Reconciler};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::driver::{DriverOptions, EchoMode, run};
    pub use crate::emit::{EventSink, Style};
    pub use crate::error::{FeedError, ParseError};
    pub use crate::event::{BuildStatus, CaseStatus, Event};
    pub use crate::outcome::BuildOutcome;
    pub use crate::reconcile::{Flow, Reconciler};
}
