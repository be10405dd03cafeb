// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! testfeed: convert test tool output into CI service messages
//!
//! Reads Android instrumentation runner or xcodebuild output, writes service
//! messages to stdout and exits 1 when the build failed. Fatal errors exit 2.

use std::process::ExitCode;

use clap::Parser;
use testfeed::config::Config;
use tracing::{error, info};

fn main() -> ExitCode {
    let config = Config::parse();

    // stdout carries the messages, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .init();

    match testfeed::execute(&config) {
        Ok(summary) => {
            info!(
                lines = summary.lines_read,
                events = summary.events_emitted,
                failed_cases = summary.outcome.failed_cases(),
                reached_terminal = summary.reached_terminal,
                "Run complete"
            );
            ExitCode::from(summary.exit_code())
        }
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(2)
        }
    }
}
