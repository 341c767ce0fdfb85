// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::dag::CycleReport;
use crate::types::TaskName;

#[derive(Error, Debug)]
pub enum QueryDagError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid task store: {0}")]
    InvalidTaskStore(String),

    #[error("Cycle detected in task graph:\n{0}")]
    Cycle(CycleReport),

    #[error("Task not found: {0}")]
    UnknownTask(TaskName),

    #[error("No task function registered for task '{0}'")]
    MissingTaskFunction(TaskName),

    #[error("Task '{task}' failed: {source:#}")]
    TaskFailed {
        task: TaskName,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<CycleReport> for QueryDagError {
    fn from(report: CycleReport) -> Self {
        QueryDagError::Cycle(report)
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, QueryDagError>;
