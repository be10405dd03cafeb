// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Rendering events for the CI server
//!
//! Three styles are supported:
//! - `Protocol`: TeamCity service messages (`##teamcity[testStarted name='...']`)
//! - `Plain`: indented human readable lines
//! - `Json`: one JSON object per event
//!
//! # Example
//!
//! ```
//! use testfeed_core::emit::{Emitter, EventSink, Style};
//! use testfeed_core::event::Event;
//!
//! let mut emitter = Emitter::new(Vec::new(), Style::Protocol);
//! emitter
//!     .emit(Event::SuiteStarted { name: "Foo".to_string() })
//!     .unwrap();
//! let out = String::from_utf8(emitter.into_inner()).unwrap();
//! assert_eq!(out, "##teamcity[testSuiteStarted name='Foo']\n");
//! ```

use std::borrow::Cow;
use std::io::Write;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FeedError;
use crate::event::{BuildStatus, Event};

/// Placeholder the CI server substitutes with its own status text
pub const BUILD_STATUS_TEXT: &str = "{build.status.text}";

/// Output style for rendered events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    /// CI service messages
    #[default]
    Protocol,
    /// Indented human readable text
    Plain,
    /// Newline-delimited JSON
    Json,
}

impl FromStr for Style {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "protocol" => Ok(Self::Protocol),
            "plain" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown style: {other}")),
        }
    }
}

/// Escape a value for use inside a `'...'` service message attribute
///
/// `|` is the escape character; quotes, brackets and line breaks are
/// prefixed with it so they cannot end the attribute or the message.
#[must_use]
pub fn escape_value(value: &str) -> Cow<'_, str> {
    if !value
        .chars()
        .any(|c| matches!(c, '|' | '\'' | '\n' | '\r' | '[' | ']'))
    {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '|' => escaped.push_str("||"),
            '\'' => escaped.push_str("|'"),
            '\n' => escaped.push_str("|n"),
            '\r' => escaped.push_str("|r"),
            '[' => escaped.push_str("|["),
            ']' => escaped.push_str("|]"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

/// Render one event as a complete message (without the trailing newline)
///
/// # Errors
///
/// Returns `FeedError::Json` if JSON serialization fails.
pub fn render(event: &Event, style: Style) -> Result<String, FeedError> {
    Ok(match style {
        Style::Protocol => render_protocol(event),
        Style::Plain => render_plain(event),
        Style::Json => serde_json::to_string(event)?,
    })
}

fn render_protocol(event: &Event) -> String {
    match event {
        Event::SuiteStarted { name } => {
            format!("##teamcity[testSuiteStarted name='{}']", escape_value(name))
        }
        Event::SuiteFinished { name } => {
            format!("##teamcity[testSuiteFinished name='{}']", escape_value(name))
        }
        Event::TestStarted { suite, name } => format!(
            "##teamcity[testStarted name='{}' captureStandardOutput='true']",
            escape_value(&format!("{suite}.{name}"))
        ),
        Event::TestFailed {
            suite,
            name,
            message,
            details,
        } => format!(
            "##teamcity[testFailed name='{}' message='{}' details='{}']",
            escape_value(&format!("{suite}.{name}")),
            escape_value(message),
            escape_value(details)
        ),
        Event::TestFinished {
            suite,
            name,
            duration_ms,
            ..
        } => format!(
            "##teamcity[testFinished name='{}' duration='{}']",
            escape_value(&format!("{suite}.{name}")),
            duration_ms
        ),
        Event::BuildStatus { status, .. } => {
            let status = match status {
                BuildStatus::Success => "SUCCESS",
                BuildStatus::Failure => "FAILURE",
            };
            format!("##teamcity[buildStatus status='{status}' text='{BUILD_STATUS_TEXT}']")
        }
    }
}

fn render_plain(event: &Event) -> String {
    match event {
        Event::SuiteStarted { name } => format!("Suite start: {name}"),
        Event::SuiteFinished { name } => format!("Suite stop: {name}"),
        Event::TestStarted { name, .. } => format!("\tCase start: {name}"),
        Event::TestFailed {
            message, details, ..
        } => format!("\t\tMessage: {message}\n\t\tDetails: {details}"),
        Event::TestFinished {
            name,
            status,
            duration_ms,
            ..
        } => format!(
            "\t\tCase status: {}\n\t\tCase duration: {duration_ms}ms\n\tCase stop: {name}",
            status.as_str()
        ),
        Event::BuildStatus { status, reason } => match status {
            BuildStatus::Success => "Build succeeded".to_string(),
            BuildStatus::Failure => format!("Build failed\nReason:\n{}", reason.replace('\t', "")),
        },
    }
}

/// Anything that accepts events in order
pub trait EventSink {
    /// Accept one event
    ///
    /// # Errors
    ///
    /// Returns `FeedError` if the event cannot be delivered.
    fn emit(&mut self, event: Event) -> Result<(), FeedError>;
}

impl EventSink for Vec<Event> {
    fn emit(&mut self, event: Event) -> Result<(), FeedError> {
        self.push(event);
        Ok(())
    }
}

/// Writes rendered events and echoed input lines to an output stream
pub struct Emitter<W: Write> {
    out: W,
    style: Style,
    emitted: usize,
}

impl<W: Write> Emitter<W> {
    /// Create an emitter writing to `out` in the given style
    pub fn new(out: W, style: Style) -> Self {
        Self {
            out,
            style,
            emitted: 0,
        }
    }

    /// The configured style
    #[must_use]
    pub fn style(&self) -> Style {
        self.style
    }

    /// Number of events written so far
    #[must_use]
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Write a raw input line through unchanged
    ///
    /// # Errors
    ///
    /// Returns `FeedError::Io` if writing fails.
    pub fn echo(&mut self, line: &str) -> Result<(), FeedError> {
        writeln!(self.out, "{line}")?;
        Ok(())
    }

    /// Flush the underlying stream
    ///
    /// # Errors
    ///
    /// Returns `FeedError::Io` if flushing fails.
    pub fn flush(&mut self) -> Result<(), FeedError> {
        self.out.flush()?;
        Ok(())
    }

    /// Consume the emitter, returning the output stream
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EventSink for Emitter<W> {
    fn emit(&mut self, event: Event) -> Result<(), FeedError> {
        let message = render(&event, self.style)?;
        writeln!(self.out, "{message}")?;
        self.emitted += 1;
        Ok(())
    }
}
