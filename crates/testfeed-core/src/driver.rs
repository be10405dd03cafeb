// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Stream driver
//!
//! Reads input one line at a time, optionally echoes it, and feeds each line
//! to a [`Reconciler`]. Nothing is buffered beyond the current line, except
//! the input that follows a terminal line, which becomes the build-status
//! reason.

use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::emit::{Emitter, Style};
use crate::error::FeedError;
use crate::outcome::BuildOutcome;
use crate::reconcile::{Flow, Reconciler};

/// Whether raw input lines are copied to the output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EchoMode {
    /// Copy every input line before the events it produces
    #[default]
    All,
    /// Only write rendered events
    Filtered,
}

/// Options for one conversion run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverOptions {
    /// Output style
    pub style: Style,
    /// Echo behaviour
    pub echo: EchoMode,
}

/// What happened during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Final build outcome
    pub outcome: BuildOutcome,
    /// Input lines consumed
    pub lines_read: usize,
    /// Events written
    pub events_emitted: usize,
    /// Whether the grammar's terminal line was seen
    pub reached_terminal: bool,
}

impl RunSummary {
    /// Process exit code for the run
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        self.outcome.exit_code()
    }
}

/// Read the next line, decoding invalid UTF-8 lossily and trimming trailing
/// whitespace. Returns `None` at end of input.
fn next_line<I: BufRead>(input: &mut I, buf: &mut Vec<u8>) -> std::io::Result<Option<String>> {
    buf.clear();
    if input.read_until(b'\n', buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(buf).trim_end().to_string()))
}

/// Drive `reconciler` over every line of `input`, writing to `output`
///
/// # Errors
///
/// Returns `FeedError` on IO failure or when a recognized line carries an
/// unparseable field. No final events are written in that case.
pub fn run<R, I, W>(
    reconciler: R,
    mut input: I,
    output: W,
    options: &DriverOptions,
) -> Result<RunSummary, FeedError>
where
    R: Reconciler,
    I: BufRead,
    W: Write,
{
    let mut reconciler = reconciler;
    let mut emitter = Emitter::new(output, options.style);
    let echo = options.echo == EchoMode::All;

    let mut buf = Vec::new();
    let mut lines_read = 0usize;
    let mut reached_terminal = false;
    let mut trailing = String::new();

    while let Some(line) = next_line(&mut input, &mut buf)? {
        lines_read += 1;
        if echo {
            emitter.echo(&line)?;
        }

        if reconciler.process_line(&line, &mut emitter)? == Flow::Terminal {
            reached_terminal = true;
            debug!(line = lines_read, "Terminal line reached, draining input");
            while let Some(rest) = next_line(&mut input, &mut buf)? {
                lines_read += 1;
                if echo {
                    emitter.echo(&rest)?;
                }
                trailing.push_str(&rest);
                trailing.push('\n');
            }
            break;
        }
    }

    let outcome = reconciler.finish(trailing.trim(), &mut emitter)?;
    emitter.flush()?;

    info!(
        lines = lines_read,
        events = emitter.emitted(),
        failed_cases = outcome.failed_cases(),
        status = ?outcome.status(),
        "Conversion finished"
    );

    Ok(RunSummary {
        outcome,
        lines_read,
        events_emitted: emitter.emitted(),
        reached_terminal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::EventSink;
    use crate::event::{BuildStatus, Event};
    use similar_asserts::assert_eq;

    /// Opens a suite per `suite <name>` line, fails on `fail`, stops on `end`
    #[derive(Default)]
    struct ToyReconciler {
        outcome: BuildOutcome,
    }

    impl Reconciler for ToyReconciler {
        fn process_line<S: EventSink>(
            &mut self,
            line: &str,
            sink: &mut S,
        ) -> Result<Flow, FeedError> {
            if let Some(name) = line.strip_prefix("suite ") {
                sink.emit(Event::SuiteStarted {
                    name: name.to_string(),
                })?;
            } else if line == "fail" {
                self.outcome.record_case_failure();
            } else if line == "end" {
                return Ok(Flow::Terminal);
            }
            Ok(Flow::Continue)
        }

        fn finish<S: EventSink>(
            self,
            trailing: &str,
            sink: &mut S,
        ) -> Result<BuildOutcome, FeedError> {
            sink.emit(Event::BuildStatus {
                status: self.outcome.status(),
                reason: trailing.to_string(),
            })?;
            Ok(self.outcome)
        }

        fn outcome(&self) -> &BuildOutcome {
            &self.outcome
        }
    }

    fn run_to_string(input: &str, options: DriverOptions) -> (RunSummary, String) {
        let mut out = Vec::new();
        let summary =
            run(ToyReconciler::default(), input.as_bytes(), &mut out, &options).expect("run");
        (summary, String::from_utf8(out).expect("utf8"))
    }

    #[test]
    fn test_echo_all_interleaves_input_and_events() {
        let (summary, out) = run_to_string("noise\nsuite A  \n", DriverOptions::default());
        assert_eq!(
            out,
            "noise\nsuite A\n##teamcity[testSuiteStarted name='A']\n##teamcity[buildStatus status='SUCCESS' text='{build.status.text}']\n"
        );
        assert_eq!(summary.lines_read, 2);
        assert_eq!(summary.events_emitted, 2);
        assert_eq!(summary.exit_code(), 0);
        assert!(!summary.reached_terminal);
    }

    #[test]
    fn test_filtered_echo_writes_only_events() {
        let options = DriverOptions {
            style: Style::Plain,
            echo: EchoMode::Filtered,
        };
        let (_, out) = run_to_string("noise\nsuite A\n", options);
        assert_eq!(out, "Suite start: A\nBuild succeeded\n");
    }

    #[test]
    fn test_terminal_line_drains_rest_as_reason() {
        let options = DriverOptions {
            style: Style::Plain,
            echo: EchoMode::Filtered,
        };
        let (summary, out) = run_to_string("fail\nend\n  first\nsecond\n\n", options);
        assert!(summary.reached_terminal);
        assert_eq!(summary.lines_read, 5);
        assert_eq!(summary.exit_code(), 1);
        assert_eq!(out, "Build failed\nReason:\nfirst\nsecond\n");
    }

    #[test]
    fn test_empty_input_still_reports_status() {
        let mut out = Vec::new();
        let summary = run(
            ToyReconciler::default(),
            &b""[..],
            &mut out,
            &DriverOptions::default(),
        )
        .expect("run");
        assert_eq!(summary.lines_read, 0);
        assert_eq!(summary.outcome.status(), BuildStatus::Success);
        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "##teamcity[buildStatus status='SUCCESS' text='{build.status.text}']\n"
        );
    }

    #[test]
    fn test_invalid_utf8_is_decoded_lossily() {
        let mut out = Vec::new();
        let input: &[u8] = b"suite \xffA\n";
        run(
            ToyReconciler::default(),
            input,
            &mut out,
            &DriverOptions {
                style: Style::Protocol,
                echo: EchoMode::Filtered,
            },
        )
        .expect("run");
        let out = String::from_utf8(out).expect("utf8");
        assert!(out.starts_with("##teamcity[testSuiteStarted name='\u{fffd}A']"));
    }

    #[test]
    fn test_crlf_line_endings_are_trimmed() {
        let (_, out) = run_to_string("suite A\r\n", DriverOptions::default());
        assert!(out.starts_with("suite A\n##teamcity[testSuiteStarted name='A']\n"));
    }
}
