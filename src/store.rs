// src/store.rs

//! The TaskRecord Store: task name -> that task's current record.
//!
//! This is both the *seed* handed in by query decomposition (one entry per
//! declared task, each carrying its `required_steps` unlock list) and the
//! *result* returned by the scheduler once every task has merged its output.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{QueryDagError, Result};
use crate::types::{Record, TaskName, unlocks_of};

/// Mapping from task name to that task's record.
///
/// Keys are kept sorted so that snapshots and plan output are stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskStore {
    tasks: BTreeMap<TaskName, Record>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a JSON object of `{ task_name: { ...record } }`.
    ///
    /// Every value must itself be an object; anything else is rejected
    /// rather than silently coerced.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(QueryDagError::InvalidTaskStore(format!(
                "expected a JSON object of tasks, got {}",
                json_kind(&value)
            )));
        };

        let mut tasks = BTreeMap::new();
        for (name, record) in map {
            match record {
                Value::Object(record) => {
                    tasks.insert(name, record);
                }
                other => {
                    return Err(QueryDagError::InvalidTaskStore(format!(
                        "task '{}' must be a JSON object, got {}",
                        name,
                        json_kind(&other)
                    )));
                }
            }
        }

        Ok(Self { tasks })
    }

    /// Parse a store from JSON text.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(s)?;
        Self::from_value(value)
    }

    /// Load a store from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    /// Insert (or replace) a task record.
    pub fn insert(&mut self, name: impl Into<TaskName>, record: Record) -> Option<Record> {
        self.tasks.insert(name.into(), record)
    }

    pub fn get(&self, name: &str) -> Option<&Record> {
        self.tasks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Declared task names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TaskName, &Record)> {
        self.tasks.iter()
    }

    /// The unlock list each declared task carries, in declaration order.
    pub fn unlock_lists(&self) -> impl Iterator<Item = (&str, Vec<TaskName>)> {
        self.tasks
            .iter()
            .map(|(name, record)| (name.as_str(), unlocks_of(record)))
    }

    /// Pretty JSON rendering (UTF-8, non-ASCII kept as-is).
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.tasks)?)
    }
}

impl From<BTreeMap<TaskName, Record>> for TaskStore {
    fn from(tasks: BTreeMap<TaskName, Record>) -> Self {
        Self { tasks }
    }
}

impl FromIterator<(TaskName, Record)> for TaskStore {
    fn from_iter<I: IntoIterator<Item = (TaskName, Record)>>(iter: I) -> Self {
        Self {
            tasks: iter.into_iter().collect(),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
