// src/config/model.rs

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::directives::{builtin_defaults, DirectiveSet, DirectiveValue};
use crate::errors::{Result, SuperviseError};
use crate::types::WorkerType;

pub const DEFAULT_CONF_PATH: &str = "/etc/supervisor/conf.d";
pub const DEFAULT_OUTPUT_PATH: &str = ".supervisor/conf.d";
pub const DEFAULT_LOGS_PATH: &str = "storage/logs";
pub const DEFAULT_PHP_BINARY: &str = "php";

/// Worker keys that select or configure the derived command. They never
/// become directives themselves.
pub const ROUTING_KEYS: [&str; 3] = ["type", "command", "log"];

/// Worker keys that only make sense for `type = "queue"`.
pub const QUEUE_KEYS: [&str; 11] = [
    "connection",
    "queue",
    "tries",
    "max_time",
    "sleep",
    "timeout",
    "memory",
    "backoff",
    "max_jobs",
    "rest",
    "force",
];

/// Loosely typed configuration value.
///
/// Worker definitions, defaults and groups are kept in this form until the
/// validator has looked at them, so that type mistakes surface as
/// field-level validation messages instead of a deserializer error.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Short human name of the value's type, for messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "mapping",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// The directive form of a scalar value; `None` for floats, lists and
    /// mappings.
    pub fn as_directive(&self) -> Option<DirectiveValue> {
        match self {
            Value::Null => Some(DirectiveValue::Null),
            Value::Bool(b) => Some(DirectiveValue::Bool(*b)),
            Value::Integer(i) => Some(DirectiveValue::Integer(*i)),
            Value::String(s) => Some(DirectiveValue::String(s.clone())),
            Value::Float(_) | Value::List(_) | Value::Map(_) => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(value: IndexMap<String, Value>) -> Self {
        Value::Map(value)
    }
}

/// Configuration document as read from disk, before validation.
///
/// ```toml
/// conf_path = "/etc/supervisor/conf.d"
/// output_path = ".supervisor/conf.d"
///
/// [defaults]
/// user = "www-data"
///
/// [workers.horizon]
/// type = "horizon"
///
/// [workers.emails]
/// type = "queue"
/// queue = ["emails", "notifications"]
/// tries = 5
/// numprocs = 3
///
/// [groups]
/// app = ["horizon", "emails"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// System supervisor conf.d directory that `link` writes into.
    #[serde(default)]
    pub conf_path: Option<String>,

    /// Directory compiled files are written to.
    #[serde(default)]
    pub output_path: Option<String>,

    /// Root of the application log directory used by `log = true`.
    #[serde(default)]
    pub logs_path: Option<String>,

    /// Interpreter used to run `artisan` in derived commands.
    #[serde(default)]
    pub php_binary: Option<String>,

    /// Default queue connection for queue workers without `connection`.
    #[serde(default)]
    pub queue_connection: Option<String>,

    #[serde(default)]
    pub defaults: Option<Value>,

    #[serde(default)]
    pub workers: Option<Value>,

    #[serde(default)]
    pub groups: Option<Value>,
}

impl RawConfigFile {
    /// Directory compiled files are written to, defaults applied.
    pub fn output_dir(&self, base_path: &Path) -> PathBuf {
        resolve_against(base_path, self.output_path.as_deref().unwrap_or(DEFAULT_OUTPUT_PATH))
    }

    /// The live supervisor conf.d directory, defaults applied.
    pub fn conf_dir(&self) -> PathBuf {
        PathBuf::from(self.conf_path.as_deref().unwrap_or(DEFAULT_CONF_PATH))
    }
}

/// Validated configuration.
///
/// Only obtainable through `ConfigFile::try_from(RawConfigFile)`, which runs
/// the validator first.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub conf_path: String,
    pub output_path: String,
    pub logs_path: String,
    pub php_binary: String,
    pub queue_connection: Option<String>,

    /// Built-in defaults with the user's `defaults` layered on top.
    pub defaults: DirectiveSet,

    /// Workers in document order.
    pub workers: IndexMap<String, WorkerSpec>,

    /// Groups in document order, each listing worker names in order.
    pub groups: IndexMap<String, Vec<String>>,
}

impl ConfigFile {
    /// Build the typed config from a raw document that already passed
    /// validation. Shape errors are still reported, never panicked on.
    pub(crate) fn from_validated(raw: RawConfigFile) -> Result<Self> {
        let mut defaults = builtin_defaults();
        if let Some(user_defaults) = raw.defaults.as_ref().and_then(Value::as_map) {
            defaults.layer(&scalar_directives(user_defaults, "defaults")?);
        }

        let mut workers = IndexMap::new();
        if let Some(map) = raw.workers.as_ref().and_then(Value::as_map) {
            for (name, value) in map {
                workers.insert(name.clone(), WorkerSpec::from_value(name, value)?);
            }
        }

        let mut groups = IndexMap::new();
        if let Some(map) = raw.groups.as_ref().and_then(Value::as_map) {
            for (name, value) in map {
                groups.insert(name.clone(), string_list(value, &format!("groups.{name}"))?);
            }
        }

        Ok(Self {
            conf_path: raw.conf_path.unwrap_or_else(|| DEFAULT_CONF_PATH.to_string()),
            output_path: raw.output_path.unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string()),
            logs_path: raw.logs_path.unwrap_or_else(|| DEFAULT_LOGS_PATH.to_string()),
            php_binary: raw.php_binary.unwrap_or_else(|| DEFAULT_PHP_BINARY.to_string()),
            queue_connection: raw.queue_connection,
            defaults,
            workers,
            groups,
        })
    }

    /// Directory compiled files are written to.
    pub fn output_dir(&self, base_path: &Path) -> PathBuf {
        resolve_against(base_path, &self.output_path)
    }

    /// Root of the application logs; `log = true` workers write to
    /// `<logs_dir>/supervisor/<name>.log`.
    pub fn logs_dir(&self, base_path: &Path) -> PathBuf {
        resolve_against(base_path, &self.logs_path)
    }

    /// The live supervisor conf.d directory.
    pub fn conf_dir(&self) -> PathBuf {
        PathBuf::from(&self.conf_path)
    }
}

/// A fully typed worker definition.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerSpec {
    pub kind: WorkerKind,

    /// Explicit directive overrides, in the order the worker lists them.
    pub overrides: DirectiveSet,

    /// Force `stdout_logfile` into the application log directory.
    pub log: bool,
}

impl WorkerSpec {
    pub fn new(kind: WorkerKind) -> Self {
        Self {
            kind,
            overrides: DirectiveSet::new(),
            log: false,
        }
    }

    fn from_value(name: &str, value: &Value) -> Result<Self> {
        let path = format!("workers.{name}");
        let map = value
            .as_map()
            .ok_or_else(|| shape_error(&path, "a mapping"))?;

        let kind = match map.get("type").filter(|v| !v.is_null()) {
            Some(ty) => {
                let ty = ty
                    .as_str()
                    .ok_or_else(|| shape_error(&format!("{path}.type"), "a string"))?;
                match ty.parse::<WorkerType>().map_err(SuperviseError::ConfigError)? {
                    WorkerType::Horizon => WorkerKind::Horizon,
                    WorkerType::Reverb => WorkerKind::Reverb,
                    WorkerType::Queue => WorkerKind::Queue(QueueOptions::from_map(map, &path)?),
                }
            }
            None => {
                let command = map
                    .get("command")
                    .and_then(Value::as_str)
                    .ok_or_else(|| shape_error(&format!("{path}.command"), "a string"))?;
                WorkerKind::Command(command.to_string())
            }
        };

        let log = map.get("log").and_then(Value::as_bool).unwrap_or(false);

        let mut overrides = DirectiveSet::new();
        for (key, value) in map {
            if ROUTING_KEYS.contains(&key.as_str()) || QUEUE_KEYS.contains(&key.as_str()) {
                continue;
            }
            let directive = value
                .as_directive()
                .ok_or_else(|| shape_error(&format!("{path}.{key}"), "a scalar"))?;
            overrides.set(key.clone(), directive);
        }

        Ok(Self {
            kind,
            overrides,
            log,
        })
    }
}

/// How a worker's `command` directive is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerKind {
    Horizon,
    Queue(QueueOptions),
    Reverb,
    /// Command-based dialect: used verbatim.
    Command(String),
}

/// Options of a `queue:work` worker.
///
/// Unset numeric options are left to the queue worker's own defaults
/// (tries 3, max_time 3600, sleep 3); they are never written as flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueOptions {
    pub connection: Option<String>,
    pub queues: Vec<String>,
    pub tries: Option<u64>,
    pub max_time: Option<u64>,
    pub sleep: Option<u64>,
    pub timeout: Option<u64>,
    pub memory: Option<u64>,
    pub backoff: Option<u64>,
    pub max_jobs: Option<u64>,
    pub rest: Option<u64>,
    pub force: bool,
}

impl QueueOptions {
    pub fn new<I, S>(queues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            queues: queues.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    fn from_map(map: &IndexMap<String, Value>, path: &str) -> Result<Self> {
        let queue_path = format!("{path}.queue");
        let queues = map
            .get("queue")
            .ok_or_else(|| shape_error(&queue_path, "a list of strings"))
            .and_then(|v| string_list(v, &queue_path))?;

        let unsigned = |key: &str| -> Result<Option<u64>> {
            match map.get(key) {
                None | Some(Value::Null) => Ok(None),
                Some(value) => value
                    .as_integer()
                    .and_then(|i| u64::try_from(i).ok())
                    .map(Some)
                    .ok_or_else(|| shape_error(&format!("{path}.{key}"), "a non-negative integer")),
            }
        };

        Ok(Self {
            connection: map.get("connection").and_then(Value::as_str).map(str::to_string),
            queues,
            tries: unsigned("tries")?,
            max_time: unsigned("max_time")?,
            sleep: unsigned("sleep")?,
            timeout: unsigned("timeout")?,
            memory: unsigned("memory")?,
            backoff: unsigned("backoff")?,
            max_jobs: unsigned("max_jobs")?,
            rest: unsigned("rest")?,
            force: map.get("force").and_then(Value::as_bool).unwrap_or(false),
        })
    }
}

fn scalar_directives(map: &IndexMap<String, Value>, path: &str) -> Result<DirectiveSet> {
    let mut set = DirectiveSet::new();
    for (key, value) in map {
        let directive = value
            .as_directive()
            .ok_or_else(|| shape_error(&format!("{path}.{key}"), "a scalar"))?;
        set.set(key.clone(), directive);
    }
    Ok(set)
}

fn string_list(value: &Value, path: &str) -> Result<Vec<String>> {
    let items = value
        .as_list()
        .ok_or_else(|| shape_error(path, "a list of strings"))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| shape_error(path, "a list of strings"))
        })
        .collect()
}

fn shape_error(path: &str, expected: &str) -> SuperviseError {
    SuperviseError::ConfigError(format!("{path} must be {expected}"))
}

fn resolve_against(base_path: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_path.join(path)
    }
}
