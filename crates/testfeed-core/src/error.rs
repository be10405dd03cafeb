// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for testfeed-core

use thiserror::Error;

/// Errors raised while interpreting fields of a recognized line
///
/// These are fatal: a run that hits one stops, since no duration can be
/// reported for the case that carried the bad field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Timestamp does not have the `MM-DD hh:mm:ss.fff` shape
    #[error("Malformed timestamp: {value:?}")]
    MalformedTimestamp {
        /// The offending timestamp text
        value: String,
    },

    /// Timestamp has the right shape but names no real calendar instant
    #[error("Invalid date in timestamp: {value:?}")]
    InvalidDate {
        /// The offending timestamp text
        value: String,
    },

    /// Elapsed value is not `<seconds>[.<millis>]`
    #[error("Malformed elapsed time: {value:?}")]
    MalformedElapsed {
        /// The offending elapsed text
        value: String,
    },

    /// Elapsed value does not fit in a millisecond counter
    #[error("Duration out of range: {value:?}")]
    DurationOverflow {
        /// The offending elapsed text
        value: String,
    },
}

/// Errors that terminate a conversion run
#[derive(Debug, Error)]
pub enum FeedError {
    /// A recognized line carried a field that could not be interpreted
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Reading input or writing output failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing an event in the JSON style failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
