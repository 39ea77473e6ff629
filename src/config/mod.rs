// src/config/mod.rs

//! Configuration loading and validation for supervise.
//!
//! Responsibilities:
//! - Define the raw and validated data model (`model.rs`).
//! - Load a config file from disk and apply environment overrides
//!   (`loader.rs`).
//! - Validate structure, values and group references (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{
    apply_env_overrides, base_path_for, load_and_validate, load_from_path, parse_str, ConfigFormat,
    DEFAULT_CONFIG_FILE,
};
pub use model::{ConfigFile, QueueOptions, RawConfigFile, Value, WorkerKind, WorkerSpec};
pub use validate::validate;
