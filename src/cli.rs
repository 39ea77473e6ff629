// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::DEFAULT_CONFIG_FILE;

/// Command-line arguments for `supervise`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "supervise",
    version,
    about = "Compile worker definitions into Supervisor config files and link them.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML, or JSON with a `.json` extension).
    ///
    /// Default: `supervise.toml` in the current working directory.
    #[arg(long, global = true, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Application base path that relative paths resolve against.
    ///
    /// If omitted, the directory containing the config file is used.
    #[arg(long, global = true, value_name = "DIR")]
    pub base_path: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SUPERVISE_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Validate the config and write one `.conf` file per worker and group.
    Compile {
        /// Run `supervisorctl reread && supervisorctl update` afterwards.
        #[arg(long)]
        reload: bool,

        /// Validate and print the files, but don't write anything.
        #[arg(long, conflicts_with = "reload")]
        dry_run: bool,
    },

    /// Symlink the compiled files into the supervisor conf.d directory.
    Link,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
