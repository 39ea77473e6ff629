// src/config/validate.rs

use indexmap::IndexMap;
use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile, Value, QUEUE_KEYS, ROUTING_KEYS};
use crate::errors::{SuperviseError, ValidationErrors};
use crate::types::WorkerType;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = SuperviseError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate(&raw)?;
        ConfigFile::from_validated(raw)
    }
}

/// Validate a raw configuration document.
///
/// Runs in two passes:
/// 1. names, structure and values of `workers`, `defaults` and `groups`;
/// 2. group references to worker names, and group names clashing with
///    worker names.
///
/// The second pass only runs once the first reports nothing, so a failing
/// config reports the errors of exactly one pass.
pub fn validate(raw: &RawConfigFile) -> std::result::Result<(), ValidationErrors> {
    validate_structure(raw).into_result()?;
    validate_group_references(raw).into_result()?;
    debug!("configuration passed validation");
    Ok(())
}

fn validate_structure(raw: &RawConfigFile) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    match raw.workers.as_ref().filter(|v| !v.is_null()) {
        None => errors.add("workers", "The workers field is required."),
        Some(Value::Map(workers)) if workers.is_empty() => {
            errors.add("workers", "The workers field must contain at least one worker.")
        }
        Some(Value::Map(workers)) => {
            for (name, worker) in workers {
                validate_worker(&mut errors, name, worker);
            }
        }
        Some(_) => errors.add(
            "workers",
            "The workers field must be a mapping of worker names to worker definitions.",
        ),
    }

    if let Some(defaults) = raw.defaults.as_ref().filter(|v| !v.is_null()) {
        match defaults {
            Value::Map(map) => check_scalars(&mut errors, "defaults", map.iter()),
            _ => errors.add(
                "defaults",
                "The defaults field must be a mapping of directive names to values.",
            ),
        }
    }

    if let Some(groups) = raw.groups.as_ref().filter(|v| !v.is_null()) {
        match groups {
            Value::Map(map) => {
                for (name, members) in map {
                    validate_group_shape(&mut errors, name, members);
                }
            }
            _ => errors.add(
                "groups",
                "The groups field must be a mapping of group names to worker lists.",
            ),
        }
    }

    errors
}

fn validate_worker(errors: &mut ValidationErrors, name: &str, worker: &Value) {
    let path = format!("workers.{name}");
    check_name(errors, &path, "worker", name);
    let Some(map) = worker.as_map() else {
        errors.add(&path, format!("The {path} field must be a mapping."));
        return;
    };

    let ty = present(map, "type");
    let command = present(map, "command");

    let worker_type = match (ty, command) {
        (Some(_), Some(_)) => {
            errors.add(
                &path,
                format!("Worker '{name}' cannot set both a type and a command."),
            );
            None
        }
        (Some(ty), None) => check_type(errors, &path, ty),
        (None, Some(command)) => {
            match command.as_str() {
                Some(s) if !s.trim().is_empty() => {}
                _ => errors.add(
                    format!("{path}.command"),
                    format!("The {path}.command field must be a non-empty string."),
                ),
            }
            None
        }
        (None, None) => {
            errors.add(
                format!("{path}.type"),
                format!("The {path}.type field is required."),
            );
            None
        }
    };

    if worker_type == Some(WorkerType::Queue) {
        check_queue_list(errors, &path, present(map, "queue"));
        check_string(errors, &path, map, "connection");
        check_integer(errors, &path, map, "tries", Some(1));
        check_integer(errors, &path, map, "max_time", Some(1));
        check_integer(errors, &path, map, "sleep", Some(0));
        for key in ["timeout", "memory", "backoff", "max_jobs", "rest"] {
            check_integer(errors, &path, map, key, Some(0));
        }
        check_bool(errors, &path, map, "force");
    } else if worker_type.is_some() || (ty.is_none() && command.is_some()) {
        for key in QUEUE_KEYS {
            if present(map, key).is_some() {
                errors.add(
                    format!("{path}.{key}"),
                    format!("The {path}.{key} field is only valid for queue workers."),
                );
            }
        }
    }

    check_integer(errors, &path, map, "numprocs", Some(1));
    check_integer(errors, &path, map, "stopwaitsecs", Some(0));
    check_integer(errors, &path, map, "startretries", Some(0));
    check_integer(errors, &path, map, "priority", None);
    check_bool(errors, &path, map, "log");

    let overrides = map.iter().filter(|(key, _)| {
        !ROUTING_KEYS.contains(&key.as_str()) && !QUEUE_KEYS.contains(&key.as_str())
    });
    check_scalars(errors, &path, overrides);
}

fn check_type(errors: &mut ValidationErrors, path: &str, ty: &Value) -> Option<WorkerType> {
    let field = format!("{path}.type");
    let Some(ty) = ty.as_str() else {
        errors.add(&field, format!("The {field} field must be a string."));
        return None;
    };
    match ty.parse::<WorkerType>() {
        Ok(worker_type) => Some(worker_type),
        Err(_) => {
            let allowed: Vec<&str> = WorkerType::ALL.iter().map(WorkerType::as_str).collect();
            errors.add(
                &field,
                format!(
                    "The selected {field} '{ty}' is invalid; expected one of: {}.",
                    allowed.join(", ")
                ),
            );
            None
        }
    }
}

fn check_queue_list(errors: &mut ValidationErrors, path: &str, queue: Option<&Value>) {
    let field = format!("{path}.queue");
    match queue {
        None => errors.add(&field, format!("The {field} field is required for queue workers.")),
        Some(Value::List(items)) if items.is_empty() => {
            errors.add(&field, format!("The {field} field must list at least one queue."))
        }
        Some(Value::List(items)) => {
            for (index, item) in items.iter().enumerate() {
                if item.as_str().is_none_or(|s| s.is_empty()) {
                    let item_field = format!("{field}.{index}");
                    errors.add(
                        &item_field,
                        format!("The {item_field} field must be a non-empty string."),
                    );
                }
            }
        }
        Some(_) => errors.add(&field, format!("The {field} field must be a list of queue names.")),
    }
}

fn check_integer(
    errors: &mut ValidationErrors,
    path: &str,
    map: &IndexMap<String, Value>,
    key: &str,
    min: Option<i64>,
) {
    let Some(value) = present(map, key) else {
        return;
    };
    let field = format!("{path}.{key}");
    match (value.as_integer(), min) {
        (None, _) => errors.add(&field, format!("The {field} field must be an integer.")),
        (Some(i), Some(min)) if i < min => {
            errors.add(&field, format!("The {field} field must be at least {min}."))
        }
        _ => {}
    }
}

fn check_string(errors: &mut ValidationErrors, path: &str, map: &IndexMap<String, Value>, key: &str) {
    if let Some(value) = present(map, key) {
        if value.as_str().is_none() {
            let field = format!("{path}.{key}");
            errors.add(&field, format!("The {field} field must be a string."));
        }
    }
}

fn check_bool(errors: &mut ValidationErrors, path: &str, map: &IndexMap<String, Value>, key: &str) {
    if let Some(value) = present(map, key) {
        if value.as_bool().is_none() {
            let field = format!("{path}.{key}");
            errors.add(&field, format!("The {field} field must be true or false."));
        }
    }
}

fn check_scalars<'a>(
    errors: &mut ValidationErrors,
    path: &str,
    entries: impl Iterator<Item = (&'a String, &'a Value)>,
) {
    for (key, value) in entries {
        if value.as_directive().is_none() {
            let field = format!("{path}.{key}");
            errors.add(
                &field,
                format!(
                    "The {field} field must be a string, integer, boolean or null (got {}).",
                    value.type_name()
                ),
            );
        }
    }
}

fn validate_group_shape(errors: &mut ValidationErrors, name: &str, members: &Value) {
    let field = format!("groups.{name}");
    check_name(errors, &field, "group", name);
    let valid = members
        .as_list()
        .is_some_and(|items| !items.is_empty() && items.iter().all(|i| i.as_str().is_some()));
    if !valid {
        errors.add(
            &field,
            format!("The {field} field must be a non-empty list of worker names."),
        );
    }
}

fn validate_group_references(raw: &RawConfigFile) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    let (Some(workers), Some(groups)) = (
        raw.workers.as_ref().and_then(Value::as_map),
        raw.groups.as_ref().and_then(Value::as_map),
    ) else {
        return errors;
    };

    for (group, members) in groups {
        if workers.contains_key(group) {
            errors.add(
                format!("groups.{group}"),
                format!("Group '{group}' has the same name as a worker."),
            );
        }
        for member in members.as_list().unwrap_or_default().iter().filter_map(Value::as_str) {
            if !workers.contains_key(member) {
                errors.add(
                    format!("groups.{group}"),
                    format!("Worker '{member}' referenced in group '{group}' does not exist."),
                );
            }
        }
    }

    errors
}

/// Worker and group names become file names and stanza headers: only
/// `[A-Za-z0-9_.-]`, not starting with `.` and without `..`.
fn check_name(errors: &mut ValidationErrors, field: &str, kind: &str, name: &str) {
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.');
    if name.is_empty() || name.starts_with('.') || name.contains("..") || !name.chars().all(allowed) {
        errors.add(
            field,
            format!(
                "The {kind} name '{}' is invalid; use only letters, digits, '_', '-' and '.', \
                 not starting with '.'.",
                name.escape_debug()
            ),
        );
    }
}

/// A key counts as set unless it is absent or explicitly null.
fn present<'a>(map: &'a IndexMap<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}
