// src/errors.rs

//! Crate-wide error types.

use std::fmt;

use indexmap::IndexMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SuperviseError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("Link error: {0}")]
    Link(String),

    #[error("Supervisor reload failed ({}): {stderr}", exit_status(.code))]
    Reload { code: Option<i32>, stderr: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn exit_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SuperviseError>;

/// Field-path keyed collection of validation messages.
///
/// Keys are dotted paths into the configuration document (`workers`,
/// `workers.emails.queue`, `groups.all`, ...). Both keys and messages keep
/// the order in which they were reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: IndexMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of distinct field paths with at least one message.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    /// Every message, flattened in report order.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.errors.values().flatten().map(String::as_str)
    }

    pub fn as_map(&self) -> &IndexMap<String, Vec<String>> {
        &self.errors
    }

    pub fn into_result(self) -> std::result::Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Supervise configuration is invalid.")?;
        for message in self.messages() {
            write!(f, "\n  - {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
