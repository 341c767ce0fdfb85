// src/exec/task_fn.rs

//! Pluggable task functions.
//!
//! The scheduler never decides what a task computes. For every task it
//! resolves a [`TaskFunction`] from [`TaskFunctions`] and hands it a
//! [`TaskContext`]: the user query, the task's own record (the self-template
//! to fill in) and the records of all completed predecessors.
//!
//! A task function returns a mapping that should contain an entry keyed by
//! the task's own name; that entry is the partial record merged back into the
//! task. Any other entries are ignored.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use crate::errors::{QueryDagError, Result};
use crate::types::{Record, TaskName};

/// Boxed future returned by [`TaskFunction::call`].
pub type TaskFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<Record>> + Send + 'a>>;

/// Everything a task function gets to see.
#[derive(Debug, Clone)]
pub struct TaskContext {
    /// The original user query.
    pub query: Arc<str>,
    /// Name of the task being executed.
    pub task: TaskName,
    /// The task's current record.
    pub template: Record,
    /// Final records of every predecessor, keyed by name.
    pub dependencies: BTreeMap<TaskName, Record>,
}

impl TaskContext {
    /// Predecessor records plus this task's own record, keyed by task name.
    pub fn combined(&self) -> Record {
        let mut out: Record = self
            .dependencies
            .iter()
            .map(|(name, record)| (name.clone(), Value::Object(record.clone())))
            .collect();
        out.insert(self.task.clone(), Value::Object(self.template.clone()));
        out
    }

    /// Wrap a partial record under this task's name, the shape task
    /// functions are expected to return.
    pub fn output(&self, partial: Record) -> Record {
        let mut out = Record::new();
        out.insert(self.task.clone(), Value::Object(partial));
        out
    }
}

/// Trait abstracting what a task computes.
///
/// Implementations may suspend (e.g. waiting on a model backend) and may
/// fail; failures propagate out of the scheduler run unchanged.
pub trait TaskFunction: Send + Sync {
    fn call(&self, ctx: TaskContext) -> TaskFuture<'_>;
}

/// Adapter turning an async closure into a [`TaskFunction`].
pub struct FnTask<F> {
    f: F,
}

impl<F, Fut> TaskFunction for FnTask<F>
where
    F: Fn(TaskContext) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Record>> + Send + 'static,
{
    fn call(&self, ctx: TaskContext) -> TaskFuture<'_> {
        Box::pin((self.f)(ctx))
    }
}

/// Wrap an async closure as a task function.
pub fn task_fn<F, Fut>(f: F) -> FnTask<F>
where
    F: Fn(TaskContext) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Record>> + Send + 'static,
{
    FnTask { f }
}

/// Task functions by task name, with an optional fallback.
#[derive(Clone, Default)]
pub struct TaskFunctions {
    default: Option<Arc<dyn TaskFunction>>,
    per_task: HashMap<TaskName, Arc<dyn TaskFunction>>,
}

impl fmt::Debug for TaskFunctions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.per_task.keys().map(|s| s.as_str()).collect();
        names.sort();
        f.debug_struct("TaskFunctions")
            .field("has_default", &self.default.is_some())
            .field("per_task", &names)
            .finish()
    }
}

impl TaskFunctions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `func` for every task without a specific registration.
    pub fn with_default(mut self, func: impl TaskFunction + 'static) -> Self {
        self.default = Some(Arc::new(func));
        self
    }

    pub fn with_task(mut self, task: impl Into<TaskName>, func: impl TaskFunction + 'static) -> Self {
        self.per_task.insert(task.into(), Arc::new(func));
        self
    }

    pub fn set_default(&mut self, func: Arc<dyn TaskFunction>) {
        self.default = Some(func);
    }

    pub fn insert(&mut self, task: impl Into<TaskName>, func: Arc<dyn TaskFunction>) {
        self.per_task.insert(task.into(), func);
    }

    /// The function registered for `task`, else the default.
    pub fn resolve(&self, task: &str) -> Result<Arc<dyn TaskFunction>> {
        self.per_task
            .get(task)
            .or(self.default.as_ref())
            .cloned()
            .ok_or_else(|| QueryDagError::MissingTaskFunction(task.to_string()))
    }
}
