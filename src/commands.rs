// src/commands.rs

//! `compile` and `link` as run from the CLI.
//!
//! Both write their user-facing summary to `out` (stdout in production) and
//! return an error instead of printing one; `main` turns errors into
//! messages and a failing exit code.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::compile::Compiler;
use crate::config::ConfigFile;
use crate::errors::{Result, SuperviseError};
use crate::fs::FileSystem;
use crate::link::{discover_compiled, SymlinkManager};
use crate::reload::ReloadBackend;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub reload: bool,
    pub dry_run: bool,
}

/// What a compile run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileReport {
    /// Written paths (or, for a dry run, the paths that would be written).
    pub files: Vec<PathBuf>,
    pub workers: usize,
    pub groups: usize,
}

/// Compile a validated config and optionally reload the supervisor.
///
/// A failed reload is reported as [`SuperviseError::Reload`]; the compiled
/// files stay in place.
pub async fn compile(
    config: &ConfigFile,
    base_path: &Path,
    fs: &dyn FileSystem,
    options: CompileOptions,
    reloader: &mut dyn ReloadBackend,
    out: &mut dyn Write,
) -> Result<CompileReport> {
    let compiler = Compiler::new(config, base_path);
    let workers = config.workers.len();
    let groups = config.groups.len();

    if options.dry_run {
        let plan = compiler.plan();
        for file in &plan {
            writeln!(out, "# {}", file.path.display())?;
            write!(out, "{}", file.contents)?;
            writeln!(out)?;
        }
        writeln!(
            out,
            "Dry run: {workers} worker(s) and {groups} group(s) would be compiled to {}",
            compiler.output_dir().display()
        )?;
        return Ok(CompileReport {
            files: plan.into_iter().map(|f| f.path).collect(),
            workers,
            groups,
        });
    }

    let files = compiler.compile(fs)?;
    for file in &files {
        writeln!(out, "✓ Compiled: {}", display_name(file))?;
    }
    writeln!(out, "Compiled {workers} worker(s) and {groups} group(s)")?;

    if options.reload {
        writeln!(out, "Reloading Supervisor...")?;
        let output = reloader.reload().await?;
        if !output.stdout.trim().is_empty() {
            writeln!(out, "{}", output.stdout.trim_end())?;
        }
        if !output.success() {
            return Err(SuperviseError::Reload {
                code: output.code,
                stderr: output.stderr.trim_end().to_string(),
            });
        }
    }

    Ok(CompileReport {
        files,
        workers,
        groups,
    })
}

/// Link every compiled file of `output_dir` into `conf_dir`.
pub fn link(
    output_dir: &Path,
    conf_dir: &Path,
    fs: &dyn FileSystem,
    out: &mut dyn Write,
) -> Result<Vec<PathBuf>> {
    let files = discover_compiled(fs, output_dir)?;
    let linked = SymlinkManager::new(fs).link(&files, conf_dir)?;

    for (file, link) in files.iter().zip(&linked) {
        writeln!(out, "✓ Linked: {} → {}", display_name(file), link.display())?;
    }
    writeln!(out, "Linked {} file(s) to {}", linked.len(), conf_dir.display())?;

    info!(count = linked.len(), "link complete");
    Ok(linked)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
