// src/link.rs

//! Exposing compiled files to the live supervisor directory.
//!
//! [`discover_compiled`] finds the `*.conf` files of an output directory;
//! [`SymlinkManager::link`] points `<target_dir>/<file name>` at each of
//! them, replacing links left by an earlier run.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use tracing::{debug, info};

use crate::errors::{Result, SuperviseError};
use crate::fs::FileSystem;

/// Pattern compiled files are discovered by.
pub const COMPILED_FILE_PATTERN: &str = "*.conf";

pub const NO_COMPILED_FILES: &str = "No compiled files found. Run `supervise compile` first.";

fn compiled_file_matcher() -> Result<GlobMatcher> {
    let glob = Glob::new(COMPILED_FILE_PATTERN)
        .map_err(|e| SuperviseError::Other(anyhow::Error::from(e)))?;
    Ok(glob.compile_matcher())
}

/// Compiled files directly inside `dir`, sorted by file name.
///
/// Fails when `dir` is missing or holds no compiled file.
pub fn discover_compiled(fs: &dyn FileSystem, dir: &Path) -> Result<Vec<PathBuf>> {
    if !fs.is_dir(dir) {
        return Err(SuperviseError::Link(NO_COMPILED_FILES.to_string()));
    }

    let matcher = compiled_file_matcher()?;
    let mut files: Vec<PathBuf> = fs
        .read_dir(dir)?
        .into_iter()
        .filter(|path| {
            path.file_name().is_some_and(|name| matcher.is_match(name)) && fs.is_file(path)
        })
        .collect();

    if files.is_empty() {
        return Err(SuperviseError::Link(NO_COMPILED_FILES.to_string()));
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!(count = files.len(), dir = ?dir, "discovered compiled files");
    Ok(files)
}

/// Creates and replaces the symlinks of compiled files.
#[derive(Debug, Clone, Copy)]
pub struct SymlinkManager<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> SymlinkManager<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }

    /// Link every source file into `target_dir` under its own file name.
    ///
    /// Preconditions are checked for the whole batch before anything is
    /// touched:
    /// - `target_dir` is an existing, writable directory;
    /// - every source file exists;
    /// - no target name is taken by an entry that is not a symlink.
    ///
    /// Existing symlinks at a target name are removed and recreated. The
    /// returned link paths match `sources` in length and order. A failure
    /// while linking stops the batch; links made so far stay.
    pub fn link(&self, sources: &[PathBuf], target_dir: &Path) -> Result<Vec<PathBuf>> {
        if !self.fs.is_dir(target_dir) {
            return Err(SuperviseError::Link(format!(
                "Target directory '{}' does not exist or is not a directory.",
                target_dir.display()
            )));
        }
        if !self.fs.is_writable(target_dir) {
            return Err(SuperviseError::Link(format!(
                "Target directory '{}' is not writable.",
                target_dir.display()
            )));
        }

        let mut plan = Vec::with_capacity(sources.len());
        for source in sources {
            plan.push(self.plan_link(source, target_dir)?);
        }

        let mut linked = Vec::with_capacity(plan.len());
        for (source, link) in plan {
            if self.fs.is_symlink(&link) {
                debug!(link = ?link, "replacing existing symlink");
                self.fs.remove_file(&link).map_err(|e| {
                    SuperviseError::Link(format!(
                        "Failed to remove existing symlink '{}': {e:#}",
                        link.display()
                    ))
                })?;
            }

            self.fs.symlink(&source, &link).map_err(|e| {
                SuperviseError::Link(format!(
                    "Failed to create symlink '{}' → '{}': {e:#}",
                    link.display(),
                    source.display()
                ))
            })?;
            linked.push(link);
        }

        info!(count = linked.len(), target_dir = ?target_dir, "linked compiled files");
        Ok(linked)
    }

    /// Absolute source path and link path for one source file.
    fn plan_link(&self, source: &Path, target_dir: &Path) -> Result<(PathBuf, PathBuf)> {
        if !self.fs.exists(source) {
            return Err(SuperviseError::Link(format!(
                "Source file '{}' does not exist.",
                source.display()
            )));
        }

        let file_name = source.file_name().ok_or_else(|| {
            SuperviseError::Link(format!("Source path '{}' has no file name.", source.display()))
        })?;
        let link = target_dir.join(file_name);

        if !self.fs.is_symlink(&link) && self.fs.exists(&link) {
            return Err(SuperviseError::Link(format!(
                "Refusing to replace '{}': it exists and is not a symlink.",
                link.display()
            )));
        }

        Ok((std::path::absolute(source)?, link))
    }
}
