// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Command line configuration for testfeed
//!
//! Every option except the grammar subcommand has an environment fallback so
//! CI templates can set them once per agent.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use testfeed_core::driver::{DriverOptions, EchoMode};
use testfeed_core::emit::Style;
use testfeed_xcode::DEFAULT_WRAPPER_SUITES;

/// testfeed - turn test tool output into CI service messages
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "testfeed")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Which tool produced the input
    #[command(subcommand)]
    pub command: Command,

    /// Output style
    ///
    /// `protocol` writes CI service messages, `plain` a human readable
    /// outline and `json` one event object per line.
    #[arg(long, value_enum, default_value_t, env = "TESTFEED_STYLE", global = true)]
    pub style: OutputStyle,

    /// Whether raw input lines are copied to stdout
    #[arg(long, value_enum, default_value_t, env = "TESTFEED_ECHO", global = true)]
    pub echo: Echo,

    /// Read from a file instead of stdin
    #[arg(short, long, env = "TESTFEED_INPUT", global = true)]
    pub input: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    ///
    /// Logs always go to stderr; stdout carries the service messages.
    #[arg(short, long, default_value = "false", global = true)]
    pub verbose: bool,

    /// Quiet mode - only warnings and errors are logged
    #[arg(short, long, default_value = "false", global = true)]
    pub quiet: bool,
}

/// Supported input grammars
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Android instrumentation runner output (logcat `I/TestRunner` lines)
    ///
    /// Example:
    ///   adb logcat -v time | testfeed android
    Android {
        /// Year assumed for logcat timestamps, which carry none
        ///
        /// Defaults to the current local year.
        #[arg(long)]
        year: Option<i32>,
    },

    /// `xcodebuild test` output
    ///
    /// Example:
    ///   xcodebuild test -scheme App 2>&1 | testfeed xcode
    Xcode {
        /// Outer suite levels added by xcodebuild that are not reported
        #[arg(long, default_value_t = DEFAULT_WRAPPER_SUITES)]
        wrapper_suites: usize,
    },
}

impl Default for Command {
    fn default() -> Self {
        Self::Android { year: None }
    }
}

/// `--style` values
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputStyle {
    /// `##teamcity[...]` service messages
    #[default]
    Protocol,
    /// Indented human readable outline
    Plain,
    /// One JSON object per event
    Json,
}

impl From<OutputStyle> for Style {
    fn from(style: OutputStyle) -> Self {
        match style {
            OutputStyle::Protocol => Style::Protocol,
            OutputStyle::Plain => Style::Plain,
            OutputStyle::Json => Style::Json,
        }
    }
}

/// `--echo` values
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Echo {
    /// Copy every input line
    #[default]
    All,
    /// Only write events
    Filtered,
}

impl From<Echo> for EchoMode {
    fn from(echo: Echo) -> Self {
        match echo {
            Echo::All => EchoMode::All,
            Echo::Filtered => EchoMode::Filtered,
        }
    }
}

impl Config {
    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }

    /// Driver options for this configuration
    #[must_use]
    pub fn options(&self) -> DriverOptions {
        DriverOptions {
            style: self.style.into(),
            echo: self.echo.into(),
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if an input path is given that does not exist or is
    /// not a regular file.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref input) = self.input {
            if !input.exists() {
                return Err(ConfigError::InputNotFound(input.clone()));
            }
            if !input.is_file() {
                return Err(ConfigError::InputNotFile(input.clone()));
            }
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Input path not found
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    /// Input path is not a regular file
    #[error("Input path is not a file: {0}")]
    InputNotFile(PathBuf),
}
