// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Worker kinds that get their command derived from the application.
///
/// - `Horizon`: the Horizon queue supervisor process.
/// - `Queue`: a plain `queue:work` worker, configured by the queue options.
/// - `Reverb`: the Reverb websocket broadcast server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerType {
    Horizon,
    Queue,
    Reverb,
}

impl WorkerType {
    pub const ALL: [WorkerType; 3] = [WorkerType::Horizon, WorkerType::Queue, WorkerType::Reverb];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerType::Horizon => "horizon",
            WorkerType::Queue => "queue",
            WorkerType::Reverb => "reverb",
        }
    }
}

impl fmt::Display for WorkerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkerType {
    type Err = String;

    // Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "horizon" => Ok(WorkerType::Horizon),
            "queue" => Ok(WorkerType::Queue),
            "reverb" => Ok(WorkerType::Reverb),
            other => Err(format!(
                "invalid worker type: {other} (expected \"horizon\", \"queue\" or \"reverb\")"
            )),
        }
    }
}
