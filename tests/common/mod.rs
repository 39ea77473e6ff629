#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub use supervise_test_utils::init_tracing;

/// Base path used by tests that never touch the real filesystem.
pub const APP: &str = "/srv/app";

pub fn app() -> PathBuf {
    PathBuf::from(APP)
}

/// Write `contents` to `dir/name` and return the path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// Lines of a rendered file, without the trailing empty line.
pub fn lines(contents: &str) -> Vec<&str> {
    contents.lines().collect()
}
