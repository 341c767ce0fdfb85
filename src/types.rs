// src/types.rs

//! Small shared types: task names, records, statuses and task function kinds.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

/// A task's structured data: its control fields plus accumulated output.
pub type Record = serde_json::Map<String, Value>;

/// Control field holding a task's forward edges ("the tasks this one enables").
pub const UNLOCKS_KEY: &str = "required_steps";

/// Accepted alias for [`UNLOCKS_KEY`].
pub const UNLOCKS_ALIAS: &str = "unlocks";

/// Control field describing task complexity; never overwritten by a merge.
pub const COMPLEXITY_KEY: &str = "complexity";

/// Numeric field averaged on merge.
pub const CONFIDENCE_KEY: &str = "confidence";

/// Lifecycle of a task within one scheduling run.
///
/// Transitions are strictly `Pending -> Running -> Completed`. A failing task
/// stays `Running`; failures are reported through the scheduler's `Result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// Built-in task function selected from configuration.
///
/// - `Echo`: return the task's own record unchanged (useful for dry runs and
///   for exercising the merge path without a model backend).
/// - `Command`: run an external command with the rendered prompt on stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFnKind {
    Echo,
    Command,
}

impl Default for TaskFnKind {
    fn default() -> Self {
        TaskFnKind::Echo
    }
}

/// Read the unlock list declared by a record.
///
/// `required_steps` (or its alias `unlocks`) may be a list of names or a
/// single name; empty strings and non-string entries are ignored.
pub fn unlocks_of(record: &Record) -> Vec<TaskName> {
    let raw = record.get(UNLOCKS_KEY).or_else(|| record.get(UNLOCKS_ALIAS));

    match raw {
        Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect(),
        _ => Vec::new(),
    }
}
