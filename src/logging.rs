// src/logging.rs

//! Logging setup: a `tracing-subscriber` fmt layer on stderr.
//!
//! The level comes from `--log-level`, else `SUPERVISE_LOG`, else
//! [`DEFAULT_LEVEL`]. Stdout carries the command summaries only.

use std::io;

use tracing::Level;

use crate::cli::LogLevel;
use crate::errors::{Result, SuperviseError};

pub const LOG_ENV: &str = "SUPERVISE_LOG";

pub const DEFAULT_LEVEL: Level = Level::INFO;

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let level = resolve_level(cli_level, std::env::var(LOG_ENV).ok().as_deref());

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| SuperviseError::Other(anyhow::anyhow!(e)))
}

/// Flag first, then the environment value. An unparseable environment
/// value is ignored.
pub fn resolve_level(cli_level: Option<LogLevel>, env_value: Option<&str>) -> Level {
    cli_level
        .map(Level::from)
        .or_else(|| env_value.and_then(parse_level_str))
        .unwrap_or(DEFAULT_LEVEL)
}

/// Case-insensitive level name; `warning` is accepted for `warn`.
pub fn parse_level_str(s: &str) -> Option<Level> {
    match s.trim() {
        name if name.eq_ignore_ascii_case("warning") => Some(Level::WARN),
        name => name.parse().ok(),
    }
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}
