// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, SuperviseError};

/// Overrides `conf_path` when set.
pub const CONF_PATH_ENV: &str = "SUPERVISE_CONF_PATH";

/// Fills `queue_connection` when the config file leaves it unset.
pub const QUEUE_CONNECTION_ENV: &str = "QUEUE_CONNECTION";

/// On-disk config syntax, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// `.json` is JSON, everything else is TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }
}

/// Parse a config document without validating it.
pub fn parse_str(contents: &str, format: ConfigFormat) -> Result<RawConfigFile> {
    let config: RawConfigFile = match format {
        ConfigFormat::Toml => toml::from_str(contents)?,
        ConfigFormat::Json => serde_json::from_str(contents)?,
    };
    Ok(config)
}

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        SuperviseError::ConfigError(format!("reading config file at {:?}: {e}", path))
    })?;

    parse_str(&contents, ConfigFormat::from_path(path))
}

/// Apply environment overrides to a raw config.
///
/// `lookup` is the environment; production passes `std::env::var`.
pub fn apply_env_overrides<F>(config: &mut RawConfigFile, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(conf_path) = lookup(CONF_PATH_ENV).filter(|v| !v.is_empty()) {
        debug!(%conf_path, "conf_path overridden from {}", CONF_PATH_ENV);
        config.conf_path = Some(conf_path);
    }

    if config.queue_connection.is_none() {
        config.queue_connection = lookup(QUEUE_CONNECTION_ENV).filter(|v| !v.is_empty());
    }
}

/// Load a configuration file from path, apply environment overrides and
/// validate it.
///
/// This is the entry point for the commands:
///
/// - Reads TOML or JSON.
/// - Applies `SUPERVISE_CONF_PATH` / `QUEUE_CONNECTION`.
/// - Runs the two-pass validator and builds the typed [`ConfigFile`].
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let mut raw = load_from_path(&path)?;
    apply_env_overrides(&mut raw, |key| std::env::var(key).ok());
    ConfigFile::try_from(raw)
}

/// Config file read when `--config` is not given, relative to the working
/// directory.
pub const DEFAULT_CONFIG_FILE: &str = "supervise.toml";

/// The application base path implied by a config file location.
///
/// - "deploy/supervise.toml" → "deploy"
/// - "supervise.toml" (parent = "") → the current working directory
///
/// The result is made absolute so derived commands and symlink targets
/// never depend on the caller's working directory.
pub fn base_path_for(config_path: &Path) -> Result<PathBuf> {
    let base = match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir()?,
    };
    Ok(std::path::absolute(base)?)
}
