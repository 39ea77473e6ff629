// src/reload.rs

//! Pluggable reload hook.
//!
//! After a compile, `compile --reload` asks the supervisor daemon to pick up
//! the new files. The command layer talks to a [`ReloadBackend`] so tests
//! can swap in a fake instead of spawning `supervisorctl`.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::Context;
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::Result;

/// Shell command that makes the supervisor daemon reread its config.
pub const RELOAD_COMMAND: &str = "supervisorctl reread && supervisorctl update";

/// Captured result of one reload invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code; `None` when the process was killed by a signal.
    pub code: Option<i32>,
}

impl ReloadOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Trait abstracting how the supervisor is told to reload.
pub trait ReloadBackend: Send {
    /// Run the reload and capture its output.
    ///
    /// `Err` means the reload could not be run at all; a reload that ran
    /// and failed is an `Ok` with a non-zero `code`.
    fn reload(&mut self) -> Pin<Box<dyn Future<Output = Result<ReloadOutput>> + Send + '_>>;
}

/// Runs the reload through `sh -c`.
///
/// Blocks until the command exits; no timeout is applied.
#[derive(Debug, Clone)]
pub struct ShellReloader {
    command: String,
}

impl ShellReloader {
    pub fn new() -> Self {
        Self::with_command(RELOAD_COMMAND)
    }

    /// Use a different shell command line.
    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl Default for ShellReloader {
    fn default() -> Self {
        Self::new()
    }
}

impl ReloadBackend for ShellReloader {
    fn reload(&mut self) -> Pin<Box<dyn Future<Output = Result<ReloadOutput>> + Send + '_>> {
        let command = self.command.clone();

        Box::pin(async move {
            info!(cmd = %command, "reloading supervisor");

            // Build a shell command appropriate for the platform.
            let mut cmd = if cfg!(windows) {
                let mut c = Command::new("cmd");
                c.arg("/C").arg(&command);
                c
            } else {
                let mut c = Command::new("sh");
                c.arg("-c").arg(&command);
                c
            };

            let output = cmd
                .stdin(Stdio::null())
                .output()
                .await
                .with_context(|| format!("running reload command '{command}'"))?;

            let result = ReloadOutput {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                code: output.status.code(),
            };
            debug!(exit_code = ?result.code, "reload command exited");
            Ok(result)
        })
    }
}
