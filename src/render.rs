// src/render.rs

//! Serialization of directive sets into supervisor stanzas.
//!
//! ```text
//! [program:emails]
//! process_name=%(program_name)s_%(process_num)02d
//! numprocs=3
//! ...
//! command=php /srv/app/artisan queue:work --queue=emails
//! ```
//!
//! Values are written verbatim (no quoting or escaping); `Null` directives
//! are skipped; the output always ends with a single newline.

use std::fmt;

use crate::directives::DirectiveSet;

/// Kind of stanza a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Program,
    Group,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Program => "program",
            Section::Group => "group",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stanza header line, without newline: `[program:<name>]`.
pub fn header(section: Section, name: &str) -> String {
    format!("[{section}:{name}]")
}

pub fn render(section: Section, name: &str, directives: &DirectiveSet) -> String {
    let mut out = header(section, name);
    out.push('\n');
    for (key, value) in directives.rendered() {
        out.push_str(key);
        out.push('=');
        out.push_str(&value.to_string());
        out.push('\n');
    }
    out
}
