// src/directives/mod.rs

//! Supervisor directives and the layered merge that produces them.
//!
//! - [`DirectiveSet`] is an ordered `name -> value` map with last-writer-wins
//!   semantics. A key keeps the position of its first insertion; later
//!   layers only replace the value.
//! - [`defaults`] holds the built-in `[program:x]` defaults.
//! - [`merge`] derives per-type commands and layers defaults, derived
//!   directives and worker overrides into one resolved set.

pub mod defaults;
pub mod merge;

use std::fmt;

use indexmap::IndexMap;

pub use defaults::builtin_defaults;
pub use merge::{derive_directives, group_directives, CommandEnv, DirectiveMerger};

/// A single directive value.
///
/// `Null` means "do not render this directive at all". It is how a layer
/// removes a value set by an earlier layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveValue {
    String(String),
    Integer(i64),
    Bool(bool),
    Null,
}

impl DirectiveValue {
    pub fn is_null(&self) -> bool {
        matches!(self, DirectiveValue::Null)
    }
}

impl fmt::Display for DirectiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectiveValue::String(s) => f.write_str(s),
            DirectiveValue::Integer(i) => write!(f, "{i}"),
            DirectiveValue::Bool(b) => write!(f, "{b}"),
            DirectiveValue::Null => Ok(()),
        }
    }
}

impl From<&str> for DirectiveValue {
    fn from(value: &str) -> Self {
        DirectiveValue::String(value.to_string())
    }
}

impl From<String> for DirectiveValue {
    fn from(value: String) -> Self {
        DirectiveValue::String(value)
    }
}

impl From<i64> for DirectiveValue {
    fn from(value: i64) -> Self {
        DirectiveValue::Integer(value)
    }
}

impl From<bool> for DirectiveValue {
    fn from(value: bool) -> Self {
        DirectiveValue::Bool(value)
    }
}

/// Ordered set of directives for one stanza.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveSet {
    entries: IndexMap<String, DirectiveValue>,
}

impl DirectiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing any earlier value in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<DirectiveValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&DirectiveValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Overwrite every key of `self` that `layer` sets.
    ///
    /// Flat, per-key overwrite. Keys new to `self` are appended in the order
    /// `layer` lists them.
    pub fn layer(&mut self, layer: &DirectiveSet) {
        for (key, value) in layer.iter() {
            self.entries.insert(key.to_string(), value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DirectiveValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries that end up in rendered output (everything but `Null`).
    pub fn rendered(&self) -> impl Iterator<Item = (&str, &DirectiveValue)> {
        self.iter().filter(|(_, v)| !v.is_null())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for DirectiveSet
where
    K: Into<String>,
    V: Into<DirectiveValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = DirectiveSet::new();
        for (key, value) in iter {
            set.set(key, value);
        }
        set
    }
}
