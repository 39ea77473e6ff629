#![allow(dead_code)]

use indexmap::IndexMap;
use supervise::config::{ConfigFile, RawConfigFile, Value};

/// Builder for `RawConfigFile` to simplify test setup.
pub struct RawConfigBuilder {
    config: RawConfigFile,
    workers: IndexMap<String, Value>,
    groups: IndexMap<String, Value>,
    defaults: IndexMap<String, Value>,
}

impl RawConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
            workers: IndexMap::new(),
            groups: IndexMap::new(),
            defaults: IndexMap::new(),
        }
    }

    pub fn with_worker(mut self, name: &str, worker: WorkerBuilder) -> Self {
        self.workers.insert(name.to_string(), worker.build());
        self
    }

    /// Insert an arbitrary value as a worker definition.
    pub fn with_raw_worker(mut self, name: &str, value: Value) -> Self {
        self.workers.insert(name.to_string(), value);
        self
    }

    pub fn with_group(mut self, name: &str, members: &[&str]) -> Self {
        let members = members.iter().map(|m| Value::from(*m)).collect::<Vec<_>>();
        self.groups.insert(name.to_string(), Value::List(members));
        self
    }

    pub fn with_default(mut self, key: &str, value: Value) -> Self {
        self.defaults.insert(key.to_string(), value);
        self
    }

    pub fn output_path(mut self, path: &str) -> Self {
        self.config.output_path = Some(path.to_string());
        self
    }

    pub fn conf_path(mut self, path: &str) -> Self {
        self.config.conf_path = Some(path.to_string());
        self
    }

    pub fn logs_path(mut self, path: &str) -> Self {
        self.config.logs_path = Some(path.to_string());
        self
    }

    pub fn php_binary(mut self, binary: &str) -> Self {
        self.config.php_binary = Some(binary.to_string());
        self
    }

    pub fn queue_connection(mut self, connection: &str) -> Self {
        self.config.queue_connection = Some(connection.to_string());
        self
    }

    /// The raw document; `workers` is left unset when no worker was added.
    pub fn raw(self) -> RawConfigFile {
        let mut config = self.config;
        if !self.workers.is_empty() {
            config.workers = Some(Value::Map(self.workers));
        }
        if !self.groups.is_empty() {
            config.groups = Some(Value::Map(self.groups));
        }
        if !self.defaults.is_empty() {
            config.defaults = Some(Value::Map(self.defaults));
        }
        config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.raw()).expect("Failed to build valid config from builder")
    }
}

impl Default for RawConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one worker definition.
pub struct WorkerBuilder {
    entries: IndexMap<String, Value>,
}

impl WorkerBuilder {
    pub fn empty() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn horizon() -> Self {
        Self::empty().set("type", Value::from("horizon"))
    }

    pub fn reverb() -> Self {
        Self::empty().set("type", Value::from("reverb"))
    }

    pub fn queue(queues: &[&str]) -> Self {
        let queues = queues.iter().map(|q| Value::from(*q)).collect::<Vec<_>>();
        Self::empty()
            .set("type", Value::from("queue"))
            .set("queue", Value::List(queues))
    }

    pub fn command(command: &str) -> Self {
        Self::empty().set("command", Value::from(command))
    }

    pub fn set(mut self, key: &str, value: Value) -> Self {
        self.entries.insert(key.to_string(), value);
        self
    }

    pub fn int(self, key: &str, value: i64) -> Self {
        self.set(key, Value::Integer(value))
    }

    pub fn string(self, key: &str, value: &str) -> Self {
        self.set(key, Value::from(value))
    }

    pub fn bool(self, key: &str, value: bool) -> Self {
        self.set(key, Value::Bool(value))
    }

    pub fn null(self, key: &str) -> Self {
        self.set(key, Value::Null)
    }

    pub fn log(self, value: bool) -> Self {
        self.bool("log", value)
    }

    pub fn build(self) -> Value {
        Value::Map(self.entries)
    }
}
