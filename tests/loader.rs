mod common;
use crate::common::write_file;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use supervise::config::{
    apply_env_overrides, base_path_for, load_and_validate, load_from_path, parse_str, ConfigFile,
    ConfigFormat, Value, WorkerKind,
};
use supervise::errors::SuperviseError;

const TOML_CONFIG: &str = r#"
conf_path = "/etc/supervisor/conf.d"
output_path = "build/supervisor"

[defaults]
user = "forge"
numprocs = 1

[workers.reverb]
type = "reverb"

[workers.emails]
type = "queue"
queue = ["emails", "mail"]
tries = 3
numprocs = 2

[workers.horizon]
command = "run-horizon"

[groups]
all = ["reverb", "emails", "horizon"]
"#;

const JSON_CONFIG: &str = r#"{
  "workers": {
    "horizon": { "type": "horizon", "user": null, "log": true },
    "emails": { "type": "queue", "queue": ["emails"], "autostart": false }
  }
}"#;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn format_follows_extension() {
    assert_eq!(ConfigFormat::from_path(Path::new("supervise.toml")), ConfigFormat::Toml);
    assert_eq!(ConfigFormat::from_path(Path::new("supervise.json")), ConfigFormat::Json);
    assert_eq!(ConfigFormat::from_path(Path::new("conf/SUPERVISE.JSON")), ConfigFormat::Json);
    assert_eq!(ConfigFormat::from_path(Path::new("supervise")), ConfigFormat::Toml);
}

#[test]
fn toml_keeps_document_order() {
    let raw = parse_str(TOML_CONFIG, ConfigFormat::Toml).unwrap();
    let config = ConfigFile::try_from(raw).unwrap();

    let workers: Vec<&str> = config.workers.keys().map(String::as_str).collect();
    assert_eq!(workers, vec!["reverb", "emails", "horizon"]);
    assert_eq!(config.groups["all"], vec!["reverb", "emails", "horizon"]);
    assert_eq!(config.output_path, "build/supervisor");
    assert_eq!(config.php_binary, "php");
}

#[test]
fn toml_workers_become_typed_specs() {
    let raw = parse_str(TOML_CONFIG, ConfigFormat::Toml).unwrap();
    let config = ConfigFile::try_from(raw).unwrap();

    match &config.workers["emails"].kind {
        WorkerKind::Queue(options) => {
            assert_eq!(options.queues, vec!["emails", "mail"]);
            assert_eq!(options.tries, Some(3));
            assert_eq!(options.connection, None);
        }
        other => panic!("expected a queue worker, got {other:?}"),
    }
    assert_eq!(
        config.workers["horizon"].kind,
        WorkerKind::Command("run-horizon".to_string())
    );
    assert!(config.workers["emails"].overrides.contains_key("numprocs"));
    assert!(!config.workers["emails"].overrides.contains_key("tries"));
}

#[test]
fn json_allows_null_overrides() {
    let raw = parse_str(JSON_CONFIG, ConfigFormat::Json).unwrap();
    let config = ConfigFile::try_from(raw).unwrap();

    let horizon = &config.workers["horizon"];
    assert!(horizon.log);
    assert!(horizon.overrides.get("user").is_some_and(|v| v.is_null()));
    let workers: Vec<&str> = config.workers.keys().map(String::as_str).collect();
    assert_eq!(workers, vec!["horizon", "emails"]);
}

#[test]
fn malformed_documents_are_parse_errors() {
    assert!(matches!(
        parse_str("workers = [", ConfigFormat::Toml),
        Err(SuperviseError::TomlError(_))
    ));
    assert!(matches!(
        parse_str("{\"workers\": ", ConfigFormat::Json),
        Err(SuperviseError::JsonError(_))
    ));
}

#[test]
fn unknown_top_level_keys_are_ignored() {
    let raw = parse_str("install_command = \"x\"\n", ConfigFormat::Toml).unwrap();
    assert!(raw.workers.is_none());
}

#[test]
fn workers_are_kept_untyped_until_validation() {
    let raw = parse_str("[workers.a]\nnumprocs = \"lots\"\n", ConfigFormat::Toml).unwrap();

    let worker = raw.workers.as_ref().and_then(Value::as_map).unwrap();
    assert_eq!(worker["a"].as_map().unwrap()["numprocs"], Value::from("lots"));
    assert!(matches!(
        ConfigFile::try_from(raw),
        Err(SuperviseError::Validation(_))
    ));
}

#[test]
fn missing_file_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();

    let err = load_from_path(dir.path().join("absent.toml")).unwrap_err();

    assert!(matches!(err, SuperviseError::ConfigError(_)));
}

#[test]
fn loads_json_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "supervise.json", JSON_CONFIG);

    let raw = load_from_path(&path).unwrap();

    assert!(raw.workers.is_some());
}

#[test]
fn load_and_validate_returns_typed_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "supervise.toml", TOML_CONFIG);

    let config = load_and_validate(&path).unwrap();

    assert_eq!(config.workers.len(), 3);
    assert_eq!(config.groups.len(), 1);
}

#[test]
fn conf_path_env_overrides_the_file() {
    let mut raw = parse_str(TOML_CONFIG, ConfigFormat::Toml).unwrap();

    apply_env_overrides(&mut raw, env(&[("SUPERVISE_CONF_PATH", "/tmp/conf.d")]));

    assert_eq!(raw.conf_dir(), PathBuf::from("/tmp/conf.d"));
}

#[test]
fn empty_env_values_are_ignored() {
    let mut raw = parse_str(TOML_CONFIG, ConfigFormat::Toml).unwrap();

    apply_env_overrides(
        &mut raw,
        env(&[("SUPERVISE_CONF_PATH", ""), ("QUEUE_CONNECTION", "")]),
    );

    assert_eq!(raw.conf_dir(), PathBuf::from("/etc/supervisor/conf.d"));
    assert_eq!(raw.queue_connection, None);
}

#[test]
fn queue_connection_env_only_fills_a_gap() {
    let mut unset = parse_str(TOML_CONFIG, ConfigFormat::Toml).unwrap();
    apply_env_overrides(&mut unset, env(&[("QUEUE_CONNECTION", "redis")]));
    assert_eq!(unset.queue_connection.as_deref(), Some("redis"));

    let mut set = parse_str("queue_connection = \"sqs\"\n", ConfigFormat::Toml).unwrap();
    apply_env_overrides(&mut set, env(&[("QUEUE_CONNECTION", "redis")]));
    assert_eq!(set.queue_connection.as_deref(), Some("sqs"));
}

#[test]
fn raw_directories_apply_defaults() {
    let raw = parse_str("", ConfigFormat::Toml).unwrap();

    assert_eq!(raw.conf_dir(), PathBuf::from("/etc/supervisor/conf.d"));
    assert_eq!(
        raw.output_dir(Path::new("/srv/app")),
        PathBuf::from("/srv/app/.supervisor/conf.d")
    );
}

#[test]
fn base_path_is_the_config_directory() {
    let base = base_path_for(Path::new("/srv/app/deploy/supervise.toml")).unwrap();
    assert_eq!(base, PathBuf::from("/srv/app/deploy"));
}

#[test]
fn bare_config_name_uses_the_working_directory() {
    let base = base_path_for(Path::new("supervise.toml")).unwrap();
    assert_eq!(base, std::env::current_dir().unwrap());
}

#[test]
fn relative_config_directory_is_made_absolute() {
    let base = base_path_for(Path::new("deploy/supervise.toml")).unwrap();
    assert!(base.is_absolute());
    assert!(base.ends_with("deploy"));
}
