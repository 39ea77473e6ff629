// src/compile.rs

//! The compile pipeline: merge → render → write.
//!
//! One file per worker (`[program:<name>]`) followed by one file per group
//! (`[group:<name>]`), each named `<name>.conf` and written flat into the
//! output directory. Every run rewrites every file.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::ConfigFile;
use crate::directives::{DirectiveMerger, DirectiveSet};
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::render::{render, Section};

/// Extension of every compiled file.
pub const CONF_EXTENSION: &str = "conf";

/// A rendered file that has not been written yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledFile {
    pub section: Section,
    pub name: String,
    pub path: PathBuf,
    pub contents: String,
}

impl CompiledFile {
    pub fn file_name(&self) -> String {
        format!("{}.{CONF_EXTENSION}", self.name)
    }
}

pub struct Compiler<'a> {
    config: &'a ConfigFile,
    merger: DirectiveMerger<'a>,
    output_dir: PathBuf,
}

impl<'a> Compiler<'a> {
    /// `base_path` should be absolute; relative `output_path`/`logs_path`
    /// and the `artisan` script resolve against it.
    pub fn new(config: &'a ConfigFile, base_path: &Path) -> Self {
        Self {
            config,
            merger: DirectiveMerger::new(config, base_path),
            output_dir: config.output_dir(base_path),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn merger(&self) -> &DirectiveMerger<'a> {
        &self.merger
    }

    /// Render every file without touching the filesystem.
    ///
    /// Workers come first in document order, then groups in document order.
    pub fn plan(&self) -> Vec<CompiledFile> {
        let workers = self.config.workers.iter().map(|(name, spec)| {
            self.compiled(Section::Program, name, self.merger.worker(name, spec))
        });
        let groups = self.config.groups.iter().map(|(name, members)| {
            self.compiled(Section::Group, name, self.merger.group(members))
        });
        workers.chain(groups).collect()
    }

    fn compiled(
        &self,
        section: Section,
        name: &str,
        directives: DirectiveSet,
    ) -> CompiledFile {
        CompiledFile {
            section,
            name: name.to_string(),
            path: self.output_dir.join(format!("{name}.{CONF_EXTENSION}")),
            contents: render(section, name, &directives),
        }
    }

    /// Write every planned file and return the written paths, in plan order.
    ///
    /// The output directory is created if missing. A failure part way leaves
    /// the files written so far in place; the next successful run replaces
    /// them.
    pub fn compile(&self, fs: &dyn FileSystem) -> Result<Vec<PathBuf>> {
        fs.create_dir_all(&self.output_dir)?;

        let mut written = Vec::new();
        for file in self.plan() {
            fs.write(&file.path, file.contents.as_bytes())?;
            debug!(section = %file.section, name = %file.name, path = ?file.path, "wrote compiled file");
            written.push(file.path);
        }

        info!(
            files = written.len(),
            output_dir = ?self.output_dir,
            "compile complete"
        );
        Ok(written)
    }
}
