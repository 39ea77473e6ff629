// src/lib.rs

pub mod cli;
pub mod commands;
pub mod compile;
pub mod config;
pub mod directives;
pub mod errors;
pub mod fs;
pub mod link;
pub mod logging;
pub mod reload;
pub mod render;
pub mod types;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::{CliArgs, Command};
use crate::commands::CompileOptions;
use crate::config::{apply_env_overrides, base_path_for, load_from_path, ConfigFile};
use crate::errors::Result;
use crate::fs::RealFileSystem;
use crate::reload::ShellReloader;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and environment overrides
/// - base path resolution
/// - the `compile` / `link` commands on the real filesystem
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let base_path = resolve_base_path(&config_path, args.base_path.as_deref())?;
    debug!(config = ?config_path, base_path = ?base_path, "resolved paths");

    let mut raw = load_from_path(&config_path)?;
    apply_env_overrides(&mut raw, |key| std::env::var(key).ok());

    let fs = RealFileSystem;
    let mut stdout = std::io::stdout();

    match args.command {
        Command::Compile { reload, dry_run } => {
            let config = ConfigFile::try_from(raw)?;
            let mut reloader = ShellReloader::new();
            commands::compile(
                &config,
                &base_path,
                &fs,
                CompileOptions { reload, dry_run },
                &mut reloader,
                &mut stdout,
            )
            .await?;
        }
        Command::Link => {
            // Linking only needs the two directories; worker definitions are
            // not validated here.
            commands::link(&raw.output_dir(&base_path), &raw.conf_dir(), &fs, &mut stdout)?;
        }
    }

    Ok(())
}

/// `--base-path` if given, else the directory holding the config file.
/// Always absolute.
pub fn resolve_base_path(config_path: &Path, explicit: Option<&str>) -> Result<PathBuf> {
    match explicit {
        Some(dir) => Ok(std::path::absolute(dir)?),
        None => base_path_for(config_path),
    }
}
