// src/directives/merge.rs

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, QueueOptions, WorkerKind, WorkerSpec};

use super::DirectiveSet;

/// What a derived command needs to know about the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEnv {
    /// Interpreter, e.g. `php`.
    pub php_binary: String,

    /// Absolute path of the application's `artisan` script.
    pub artisan: PathBuf,

    /// Queue connection used when a queue worker names none.
    pub default_connection: Option<String>,
}

impl CommandEnv {
    pub fn new(php_binary: impl Into<String>, base_path: &Path) -> Self {
        Self {
            php_binary: php_binary.into(),
            artisan: base_path.join("artisan"),
            default_connection: None,
        }
    }

    pub fn with_default_connection(mut self, connection: Option<String>) -> Self {
        self.default_connection = connection;
        self
    }

    fn artisan_command(&self, args: &str) -> String {
        format!("{} {} {}", self.php_binary, self.artisan.display(), args)
    }
}

/// Directives a worker gets from its kind alone.
///
/// Every kind yields exactly one directive, `command`:
///
/// - horizon → `php <base>/artisan horizon`
/// - reverb  → `php <base>/artisan reverb:start`
/// - queue   → `php <base>/artisan queue:work [connection] --queue=a,b [flags]`
/// - command → the command, verbatim
pub fn derive_directives(kind: &WorkerKind, env: &CommandEnv) -> DirectiveSet {
    let command = match kind {
        WorkerKind::Horizon => env.artisan_command("horizon"),
        WorkerKind::Reverb => env.artisan_command("reverb:start"),
        WorkerKind::Queue(options) => env.artisan_command(&queue_work_args(options, env)),
        WorkerKind::Command(command) => command.clone(),
    };

    let mut set = DirectiveSet::new();
    set.set("command", command);
    set
}

fn queue_work_args(options: &QueueOptions, env: &CommandEnv) -> String {
    let mut args = vec!["queue:work".to_string()];

    if let Some(connection) = options
        .connection
        .as_deref()
        .or(env.default_connection.as_deref())
    {
        args.push(connection.to_string());
    }

    args.push(format!("--queue={}", options.queues.join(",")));

    let flags = [
        ("tries", options.tries),
        ("max-time", options.max_time),
        ("sleep", options.sleep),
        ("timeout", options.timeout),
        ("memory", options.memory),
        ("backoff", options.backoff),
        ("max-jobs", options.max_jobs),
        ("rest", options.rest),
    ];
    for (flag, value) in flags {
        if let Some(value) = value {
            args.push(format!("--{flag}={value}"));
        }
    }

    if options.force {
        args.push("--force".to_string());
    }

    args.join(" ")
}

/// The single-directive set of a `[group:x]` stanza.
pub fn group_directives(members: &[String]) -> DirectiveSet {
    let mut set = DirectiveSet::new();
    set.set("programs", members.join(","));
    set
}

/// Resolves the directive set of each worker and group of a config.
#[derive(Debug, Clone)]
pub struct DirectiveMerger<'a> {
    defaults: &'a DirectiveSet,
    env: CommandEnv,
    logs_dir: PathBuf,
}

impl<'a> DirectiveMerger<'a> {
    pub fn new(config: &'a ConfigFile, base_path: &Path) -> Self {
        let env = CommandEnv::new(config.php_binary.clone(), base_path)
            .with_default_connection(config.queue_connection.clone());

        Self {
            defaults: &config.defaults,
            env,
            logs_dir: config.logs_dir(base_path),
        }
    }

    /// Log file a `log = true` worker writes stdout to.
    pub fn log_file(&self, name: &str) -> PathBuf {
        self.logs_dir.join("supervisor").join(format!("{name}.log"))
    }

    /// Layer defaults → derived → overrides → `log` flag.
    pub fn worker(&self, name: &str, spec: &WorkerSpec) -> DirectiveSet {
        let mut set = self.defaults.clone();
        set.layer(&derive_directives(&spec.kind, &self.env));
        set.layer(&spec.overrides);

        if spec.log {
            set.set("stdout_logfile", self.log_file(name).display().to_string());
        }

        debug!(worker = %name, directives = set.len(), "resolved worker directives");
        set
    }

    pub fn group(&self, members: &[String]) -> DirectiveSet {
        group_directives(members)
    }
}
