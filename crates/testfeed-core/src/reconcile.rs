// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! The seam between a tool grammar and the stream driver

use crate::emit::EventSink;
use crate::error::FeedError;
use crate::outcome::BuildOutcome;

/// What the driver should do after a line has been processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading
    Continue,
    /// The tool printed its final line; drain the rest of the input
    Terminal,
}

/// A line-at-a-time state machine for one tool grammar
///
/// Implementations own all cross-line context (open suite, open case,
/// captured failure detail, build outcome). Lines that match nothing must
/// leave that context untouched.
pub trait Reconciler {
    /// Consume one input line (trailing whitespace already removed),
    /// emitting any events it completes
    ///
    /// # Errors
    ///
    /// Returns `FeedError` if a recognized line carries an unusable field or
    /// the sink rejects an event.
    fn process_line<S: EventSink>(&mut self, line: &str, sink: &mut S) -> Result<Flow, FeedError>;

    /// Close out the stream and emit the final events
    ///
    /// `trailing` holds whatever input followed a terminal line (empty when
    /// the input simply ended).
    ///
    /// # Errors
    ///
    /// Returns `FeedError` if the sink rejects an event.
    fn finish<S: EventSink>(self, trailing: &str, sink: &mut S) -> Result<BuildOutcome, FeedError>
    where
        Self: Sized;

    /// The outcome so far
    fn outcome(&self) -> &BuildOutcome;
}
