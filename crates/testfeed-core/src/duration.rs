// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Duration arithmetic for test cases
//!
//! Test tools report timing in one of two ways:
//! - a wall-clock timestamp on the start and status lines (`06-01 10:00:01.500`),
//!   from which the duration is the difference
//! - an elapsed value on the stop line (`(0.012 seconds)`)
//!
//! In both forms the digits after the decimal point are read as a literal
//! millisecond count, so `1.5` is one second and five milliseconds.

use std::sync::LazyLock;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use tracing::debug;

use crate::error::ParseError;

static TIMESTAMP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+)-([0-9]+) ([0-9]+):([0-9]+):([0-9]+)\.([0-9]+)$").expect("valid regex")
});

/// A wall-clock instant as printed by the tool (month, day and time; no year)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Parse a `MM-DD hh:mm:ss.fff` timestamp, assuming the current year
    ///
    /// # Errors
    ///
    /// Returns `ParseError::MalformedTimestamp` if the text does not have six
    /// numeric fields, or `ParseError::InvalidDate` if the fields do not name
    /// a real instant.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Self::parse_in_year(text, Local::now().year())
    }

    /// Parse a `MM-DD hh:mm:ss.fff` timestamp in an explicit year
    ///
    /// # Errors
    ///
    /// See [`Timestamp::parse`].
    pub fn parse_in_year(text: &str, year: i32) -> Result<Self, ParseError> {
        let malformed = || ParseError::MalformedTimestamp {
            value: text.to_string(),
        };
        let invalid = || ParseError::InvalidDate {
            value: text.to_string(),
        };

        let caps = TIMESTAMP_REGEX.captures(text.trim()).ok_or_else(malformed)?;
        let mut fields = [0u32; 6];
        for (slot, idx) in fields.iter_mut().zip(1..=6) {
            *slot = caps[idx].parse().map_err(|_| malformed())?;
        }
        let [month, day, hour, minute, second, millis] = fields;

        // chrono accepts 1000..=1999 as a leap-second marker; the tool never does
        if millis > 999 {
            return Err(invalid());
        }

        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;
        let time = NaiveTime::from_hms_milli_opt(hour, minute, second, millis).ok_or_else(invalid)?;
        Ok(Self(NaiveDateTime::new(date, time)))
    }

    /// Whole milliseconds from `self` to `later`
    ///
    /// Timestamps carry no year, so a stop on an earlier calendar day than
    /// its start is taken to fall in the following year. Any other stop that
    /// precedes its start is reported as zero.
    #[must_use]
    pub fn millis_until(&self, later: &Timestamp) -> u64 {
        let start = self.0;
        let mut stop = later.0;
        if (stop.month(), stop.day()) < (start.month(), start.day()) {
            if let Some(next_year) = stop.with_year(stop.year() + 1) {
                stop = next_year;
            }
        }
        let millis = (stop - start).num_milliseconds();
        if millis < 0 {
            debug!(start = %start, stop = %later.0, "Stop precedes start, reporting zero duration");
        }
        u64::try_from(millis).unwrap_or(0)
    }
}

/// Duration between two tool timestamps, in whole milliseconds
///
/// # Errors
///
/// Returns a `ParseError` if either timestamp is malformed.
pub fn duration_between(start: &str, stop: &str) -> Result<u64, ParseError> {
    let start = Timestamp::parse(start)?;
    let stop = Timestamp::parse(stop)?;
    Ok(start.millis_until(&stop))
}

/// Convert a tool-reported elapsed value (`<seconds>.<millis>`) to milliseconds
///
/// The fractional digits are a literal millisecond count: `"0.5"` is 5 ms and
/// `"1.250"` is 1250 ms. A value without a fractional part is whole seconds.
///
/// # Errors
///
/// Returns `ParseError::MalformedElapsed` if either part is not a plain
/// decimal number, or `ParseError::DurationOverflow` if the result does not
/// fit in a `u64`.
pub fn parse_elapsed(text: &str) -> Result<u64, ParseError> {
    let text = text.trim();
    let malformed = || ParseError::MalformedElapsed {
        value: text.to_string(),
    };

    let (secs, millis) = match text.split_once('.') {
        Some((secs, millis)) => (secs, millis),
        None => (text, "0"),
    };
    let digits = |part: &str| -> Result<u64, ParseError> {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        part.parse().map_err(|_| ParseError::DurationOverflow {
            value: text.to_string(),
        })
    };

    let secs = digits(secs)?;
    let millis = digits(millis)?;
    secs.checked_mul(1000)
        .and_then(|ms| ms.checked_add(millis))
        .ok_or_else(|| ParseError::DurationOverflow {
            value: text.to_string(),
        })
}
