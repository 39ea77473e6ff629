// src/directives/defaults.rs

use super::{DirectiveSet, DirectiveValue};

/// The built-in `[program:x]` defaults applied to every worker.
///
/// User `defaults` are layered on top of this table, so a config only
/// needs to list the directives it wants to change. `Null` entries are not
/// rendered but fix the position a directive takes when a worker sets it.
pub fn builtin_defaults() -> DirectiveSet {
    use DirectiveValue::{Bool, Integer, Null};

    let s = |v: &str| DirectiveValue::String(v.to_string());

    let entries: [(&str, DirectiveValue); 31] = [
        // process control
        ("process_name", s("%(program_name)s_%(process_num)02d")),
        ("numprocs", Integer(1)),
        ("numprocs_start", Integer(0)),
        ("priority", Integer(999)),
        ("autostart", Bool(true)),
        ("startsecs", Integer(1)),
        ("startretries", Integer(3)),
        ("autorestart", s("unexpected")),
        ("exitcodes", s("0")),
        // stopping
        ("stopsignal", s("TERM")),
        ("stopwaitsecs", Integer(3600)),
        ("stopasgroup", Bool(true)),
        ("killasgroup", Bool(true)),
        // user & environment
        ("user", s("root")),
        ("directory", Null),
        ("umask", Null),
        ("environment", Null),
        // logging
        ("redirect_stderr", Bool(true)),
        ("stdout_logfile", s("AUTO")),
        ("stdout_logfile_maxbytes", s("50MB")),
        ("stdout_logfile_backups", Integer(10)),
        ("stdout_capture_maxbytes", Integer(0)),
        ("stdout_events_enabled", Bool(false)),
        ("stdout_syslog", Bool(false)),
        ("stderr_logfile", s("AUTO")),
        ("stderr_logfile_maxbytes", s("50MB")),
        ("stderr_logfile_backups", Integer(10)),
        ("stderr_capture_maxbytes", Integer(0)),
        ("stderr_events_enabled", Bool(false)),
        ("stderr_syslog", Bool(false)),
        ("serverurl", Null),
    ];

    entries.into_iter().collect()
}
