// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! testfeed library
//!
//! Wires the command line configuration to the grammar crates so the binary
//! stays a thin shell and integration tests can drive conversions in memory.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

use anyhow::Context;
use testfeed_android::AndroidReconciler;
use testfeed_core::driver::{RunSummary, run};
use testfeed_core::error::FeedError;
use testfeed_xcode::XcodeReconciler;
use tracing::debug;

pub mod config;

use config::{Command, Config};

/// Convert `input` to `output` with the grammar and options in `config`
///
/// # Errors
///
/// Returns `FeedError` on IO failure or an unparseable timestamp or elapsed
/// time in a recognized line.
pub fn convert<I, W>(config: &Config, input: I, output: W) -> Result<RunSummary, FeedError>
where
    I: BufRead,
    W: Write,
{
    let options = config.options();
    match config.command {
        Command::Android { year } => {
            let reconciler = year.map_or_else(AndroidReconciler::new, AndroidReconciler::with_year);
            run(reconciler, input, output, &options)
        }
        Command::Xcode { wrapper_suites } => run(
            XcodeReconciler::with_wrapper_suites(wrapper_suites),
            input,
            output,
            &options,
        ),
    }
}

/// Open the configured input, falling back to stdin
///
/// # Errors
///
/// Returns an error if the input file cannot be opened.
pub fn open_input(config: &Config) -> anyhow::Result<Box<dyn BufRead>> {
    match &config.input {
        Some(path) => {
            debug!(path = %path.display(), "Reading input file");
            let file = File::open(path)
                .with_context(|| format!("Failed to open input file {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

/// Run one conversion from the configured input to stdout
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the input cannot be
/// read, or a recognized line cannot be parsed.
pub fn execute(config: &Config) -> anyhow::Result<RunSummary> {
    config.validate()?;
    let input = open_input(config)?;
    let stdout = io::stdout().lock();
    let summary = convert(config, input, stdout).context("Conversion failed")?;
    Ok(summary)
}
