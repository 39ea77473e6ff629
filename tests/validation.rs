mod common;
use crate::common::init_tracing;

use supervise::config::{parse_str, validate, ConfigFile, ConfigFormat, Value};
use supervise::errors::{SuperviseError, ValidationErrors};
use supervise_test_utils::builders::{RawConfigBuilder, WorkerBuilder};

fn errors_of(builder: RawConfigBuilder) -> ValidationErrors {
    init_tracing();
    match validate(&builder.raw()) {
        Err(errors) => errors,
        Ok(()) => panic!("expected validation to fail"),
    }
}

fn assert_valid(builder: RawConfigBuilder) {
    init_tracing();
    if let Err(errors) = validate(&builder.raw()) {
        panic!("expected config to be valid, got: {errors}");
    }
}

#[test]
fn passes_a_valid_horizon_config() {
    assert_valid(RawConfigBuilder::new().with_worker("horizon", WorkerBuilder::horizon()));
}

#[test]
fn passes_a_valid_queue_config() {
    assert_valid(
        RawConfigBuilder::new()
            .with_worker("emails", WorkerBuilder::queue(&["emails", "notifications"])),
    );
}

#[test]
fn passes_a_valid_reverb_config() {
    assert_valid(RawConfigBuilder::new().with_worker("reverb", WorkerBuilder::reverb()));
}

#[test]
fn passes_a_command_based_worker() {
    assert_valid(
        RawConfigBuilder::new().with_worker("horizon", WorkerBuilder::command("run-horizon")),
    );
}

#[test]
fn fails_when_workers_is_empty() {
    let raw = RawConfigBuilder::new().raw();
    let mut raw = raw;
    raw.workers = Some(Value::Map(Default::default()));

    let errors = validate(&raw).unwrap_err();
    assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["workers"]);
    assert_eq!(errors.get("workers").unwrap().len(), 1);
}

#[test]
fn fails_when_workers_key_is_missing() {
    let errors = errors_of(RawConfigBuilder::new());
    assert_eq!(
        errors.get("workers").unwrap(),
        &["The workers field is required.".to_string()]
    );
}

#[test]
fn fails_when_workers_is_not_a_mapping() {
    let mut raw = RawConfigBuilder::new().raw();
    raw.workers = Some(Value::List(vec![Value::from("horizon")]));

    let errors = validate(&raw).unwrap_err();
    assert!(errors.contains_field("workers"));
}

#[test]
fn fails_when_worker_type_is_invalid() {
    let errors = errors_of(
        RawConfigBuilder::new()
            .with_worker("bad", WorkerBuilder::empty().string("type", "invalid-type")),
    );
    let messages = errors.get("workers.bad.type").unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("invalid-type"));
    assert!(messages[0].contains("horizon, queue, reverb"));
}

#[test]
fn fails_when_worker_type_is_not_a_string() {
    let errors = errors_of(
        RawConfigBuilder::new().with_worker("bad", WorkerBuilder::empty().int("type", 3)),
    );
    assert!(errors.contains_field("workers.bad.type"));
}

#[test]
fn fails_when_worker_type_is_missing() {
    let errors = errors_of(RawConfigBuilder::new().with_worker("bad", WorkerBuilder::empty()));
    assert_eq!(
        errors.get("workers.bad.type").unwrap(),
        &["The workers.bad.type field is required.".to_string()]
    );
}

#[test]
fn fails_when_worker_sets_type_and_command() {
    let errors = errors_of(
        RawConfigBuilder::new()
            .with_worker("both", WorkerBuilder::horizon().string("command", "run")),
    );
    assert!(errors.contains_field("workers.both"));
}

#[test]
fn fails_when_command_is_blank() {
    let errors = errors_of(
        RawConfigBuilder::new().with_worker("blank", WorkerBuilder::command("   ")),
    );
    assert!(errors.contains_field("workers.blank.command"));
}

#[test]
fn fails_when_worker_is_not_a_mapping() {
    let errors = errors_of(
        RawConfigBuilder::new().with_raw_worker("scalar", Value::from("php artisan horizon")),
    );
    assert!(errors.contains_field("workers.scalar"));
}

#[test]
fn fails_when_queue_worker_is_missing_queue_key() {
    let errors = errors_of(
        RawConfigBuilder::new()
            .with_worker("emails", WorkerBuilder::empty().string("type", "queue")),
    );
    assert!(errors.contains_field("workers.emails.queue"));
}

#[test]
fn fails_when_queue_list_is_empty() {
    let errors = errors_of(RawConfigBuilder::new().with_worker("emails", WorkerBuilder::queue(&[])));
    assert!(errors.contains_field("workers.emails.queue"));
}

#[test]
fn fails_when_queue_entry_is_not_a_string() {
    let worker = WorkerBuilder::queue(&[])
        .set("queue", Value::List(vec![Value::from("emails"), Value::Integer(7)]));
    let errors = errors_of(RawConfigBuilder::new().with_worker("emails", worker));
    assert!(errors.contains_field("workers.emails.queue.1"));
    assert!(!errors.contains_field("workers.emails.queue.0"));
}

#[test]
fn fails_when_numprocs_is_zero() {
    let errors = errors_of(
        RawConfigBuilder::new().with_worker("horizon", WorkerBuilder::horizon().int("numprocs", 0)),
    );
    assert_eq!(
        errors.get("workers.horizon.numprocs").unwrap(),
        &["The workers.horizon.numprocs field must be at least 1.".to_string()]
    );
}

#[test]
fn fails_when_numprocs_is_negative() {
    let errors = errors_of(
        RawConfigBuilder::new().with_worker("horizon", WorkerBuilder::horizon().int("numprocs", -1)),
    );
    assert!(errors.contains_field("workers.horizon.numprocs"));
}

#[test]
fn fails_when_numprocs_is_not_an_integer() {
    let errors = errors_of(
        RawConfigBuilder::new()
            .with_worker("horizon", WorkerBuilder::horizon().string("numprocs", "two")),
    );
    assert_eq!(
        errors.get("workers.horizon.numprocs").unwrap(),
        &["The workers.horizon.numprocs field must be an integer.".to_string()]
    );
}

#[test]
fn fails_when_tries_is_zero() {
    let errors = errors_of(
        RawConfigBuilder::new()
            .with_worker("emails", WorkerBuilder::queue(&["default"]).int("tries", 0)),
    );
    assert!(errors.contains_field("workers.emails.tries"));
}

#[test]
fn fails_when_max_time_is_zero() {
    let errors = errors_of(
        RawConfigBuilder::new()
            .with_worker("emails", WorkerBuilder::queue(&["default"]).int("max_time", 0)),
    );
    assert!(errors.contains_field("workers.emails.max_time"));
}

#[test]
fn passes_when_sleep_is_zero() {
    assert_valid(
        RawConfigBuilder::new()
            .with_worker("emails", WorkerBuilder::queue(&["default"]).int("sleep", 0)),
    );
}

#[test]
fn fails_when_sleep_is_negative() {
    let errors = errors_of(
        RawConfigBuilder::new()
            .with_worker("emails", WorkerBuilder::queue(&["default"]).int("sleep", -1)),
    );
    assert!(errors.contains_field("workers.emails.sleep"));
}

#[test]
fn stopwaitsecs_and_startretries_accept_zero_but_not_negatives() {
    assert_valid(RawConfigBuilder::new().with_worker(
        "horizon",
        WorkerBuilder::horizon().int("stopwaitsecs", 0).int("startretries", 0),
    ));

    let errors = errors_of(RawConfigBuilder::new().with_worker(
        "horizon",
        WorkerBuilder::horizon().int("stopwaitsecs", -5).int("startretries", -1),
    ));
    assert!(errors.contains_field("workers.horizon.stopwaitsecs"));
    assert!(errors.contains_field("workers.horizon.startretries"));
}

#[test]
fn priority_accepts_any_integer() {
    assert_valid(
        RawConfigBuilder::new().with_worker("horizon", WorkerBuilder::horizon().int("priority", -10)),
    );

    let errors = errors_of(
        RawConfigBuilder::new()
            .with_worker("horizon", WorkerBuilder::horizon().string("priority", "high")),
    );
    assert!(errors.contains_field("workers.horizon.priority"));
}

#[test]
fn connection_must_be_a_string() {
    let errors = errors_of(
        RawConfigBuilder::new()
            .with_worker("emails", WorkerBuilder::queue(&["default"]).int("connection", 1)),
    );
    assert!(errors.contains_field("workers.emails.connection"));
}

#[test]
fn queue_options_are_rejected_on_other_worker_types() {
    let errors = errors_of(
        RawConfigBuilder::new()
            .with_worker("horizon", WorkerBuilder::horizon().int("tries", 3))
            .with_worker("script", WorkerBuilder::command("run").bool("force", true)),
    );
    assert!(errors.contains_field("workers.horizon.tries"));
    assert!(errors.contains_field("workers.script.force"));
}

#[test]
fn log_and_force_must_be_booleans() {
    let errors = errors_of(RawConfigBuilder::new().with_worker(
        "emails",
        WorkerBuilder::queue(&["default"])
            .string("force", "yes")
            .int("log", 1),
    ));
    assert!(errors.contains_field("workers.emails.force"));
    assert!(errors.contains_field("workers.emails.log"));
}

#[test]
fn overrides_must_be_scalars() {
    let errors = errors_of(RawConfigBuilder::new().with_worker(
        "horizon",
        WorkerBuilder::horizon().set("environment", Value::List(vec![Value::from("A=1")])),
    ));
    let messages = errors.get("workers.horizon.environment").unwrap();
    assert!(messages[0].contains("got list"));
}

#[test]
fn explicit_null_skips_value_checks() {
    assert_valid(RawConfigBuilder::new().with_worker(
        "emails",
        WorkerBuilder::queue(&["default"]).null("numprocs").null("tries"),
    ));
}

#[test]
fn defaults_must_be_scalars() {
    let errors = errors_of(
        RawConfigBuilder::new()
            .with_worker("horizon", WorkerBuilder::horizon())
            .with_default("user", Value::List(vec![])),
    );
    assert!(errors.contains_field("defaults.user"));
}

#[test]
fn fails_when_group_references_a_missing_worker() {
    let errors = errors_of(
        RawConfigBuilder::new()
            .with_worker("horizon", WorkerBuilder::horizon())
            .with_group("my-group", &["non-existent-worker"]),
    );
    assert_eq!(
        errors.get("groups.my-group").unwrap(),
        &["Worker 'non-existent-worker' referenced in group 'my-group' does not exist."
            .to_string()]
    );
}

#[test]
fn reports_one_message_per_dangling_reference() {
    let errors = errors_of(
        RawConfigBuilder::new()
            .with_worker("horizon", WorkerBuilder::horizon())
            .with_group("all", &["horizon", "ghost", "phantom"]),
    );
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get("groups.all").unwrap().len(), 2);
}

#[test]
fn passes_when_group_references_valid_workers() {
    assert_valid(
        RawConfigBuilder::new()
            .with_worker("horizon", WorkerBuilder::horizon())
            .with_worker("emails", WorkerBuilder::queue(&["emails"]))
            .with_group("all", &["horizon", "emails"]),
    );
}

#[test]
fn fails_when_group_is_empty() {
    let errors = errors_of(
        RawConfigBuilder::new()
            .with_worker("horizon", WorkerBuilder::horizon())
            .with_group("empty", &[]),
    );
    assert!(errors.contains_field("groups.empty"));
}

#[test]
fn group_references_are_only_checked_once_structure_is_clean() {
    let errors = errors_of(
        RawConfigBuilder::new()
            .with_worker("horizon", WorkerBuilder::horizon().int("numprocs", 0))
            .with_group("all", &["ghost"]),
    );
    assert!(errors.contains_field("workers.horizon.numprocs"));
    assert!(!errors.contains_field("groups.all"));
}

#[test]
fn collects_every_structural_error_in_one_report() {
    let errors = errors_of(
        RawConfigBuilder::new()
            .with_worker("a", WorkerBuilder::empty())
            .with_worker("b", WorkerBuilder::queue(&[]).int("numprocs", 0)),
    );
    let fields: Vec<&str> = errors.fields().collect();
    assert_eq!(
        fields,
        vec!["workers.a.type", "workers.b.queue", "workers.b.numprocs"]
    );
}

#[test]
fn try_from_surfaces_validation_errors() {
    let raw = parse_str(
        r#"
[workers.emails]
type = "queue"
queue = []
"#,
        ConfigFormat::Toml,
    )
    .unwrap();

    match ConfigFile::try_from(raw) {
        Err(SuperviseError::Validation(errors)) => {
            assert!(errors.contains_field("workers.emails.queue"));
            assert!(errors.messages().count() >= 1);
        }
        Err(e) => panic!("Expected Validation error, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn validation_error_display_lists_every_message() {
    let errors = errors_of(
        RawConfigBuilder::new()
            .with_worker("a", WorkerBuilder::empty())
            .with_worker("b", WorkerBuilder::empty()),
    );
    let text = errors.to_string();
    assert!(text.starts_with("Supervise configuration is invalid."));
    assert!(text.contains("workers.a.type"));
    assert!(text.contains("workers.b.type"));
}

#[test]
fn fails_when_group_shares_a_worker_name() {
    let errors = errors_of(
        RawConfigBuilder::new()
            .with_worker("horizon", WorkerBuilder::horizon())
            .with_group("horizon", &["horizon"]),
    );

    assert_eq!(
        errors.get("groups.horizon").unwrap(),
        &["Group 'horizon' has the same name as a worker.".to_string()]
    );
}

#[test]
fn worker_names_that_leave_the_output_directory_are_rejected() {
    for name in ["../../escape", "nested/worker", "..", ".hidden", ""] {
        let errors = errors_of(
            RawConfigBuilder::new().with_worker(name, WorkerBuilder::horizon()),
        );
        assert!(
            errors.contains_field(&format!("workers.{name}")),
            "{name:?} was accepted"
        );
    }
}

#[test]
fn worker_names_cannot_inject_stanza_lines() {
    let name = "evil]\ncommand=rm -rf /\n[x";
    let errors = errors_of(RawConfigBuilder::new().with_worker(name, WorkerBuilder::horizon()));

    let messages = errors.get(&format!("workers.{name}")).unwrap();
    assert_eq!(messages.len(), 1);
    assert!(!messages[0].contains('\n'));
}

#[test]
fn group_names_are_checked_like_worker_names() {
    let errors = errors_of(
        RawConfigBuilder::new()
            .with_worker("horizon", WorkerBuilder::horizon())
            .with_group("../all", &["horizon"])
            .with_group("web app", &["horizon"]),
    );

    assert!(errors.contains_field("groups.../all"));
    assert!(errors.contains_field("groups.web app"));
}

#[test]
fn passes_names_with_dots_dashes_and_underscores() {
    assert_valid(
        RawConfigBuilder::new()
            .with_worker("queue-emails_v2.high", WorkerBuilder::queue(&["emails"]))
            .with_group("app.jobs", &["queue-emails_v2.high"]),
    );
}
