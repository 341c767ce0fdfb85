// src/exec/executor.rs

//! Per-task executor.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::dag::DependencyGraph;
use crate::errors::{QueryDagError, Result};
use crate::exec::arena::TaskArena;
use crate::exec::task_fn::{TaskContext, TaskFunctions};
use crate::merge::merge_into;
use crate::types::Record;

/// Runs single tasks to completion against a shared [`TaskArena`].
///
/// Borrowing everything keeps the executor cheap to share between the
/// futures of one level: they are polled on the caller's task, not spawned.
#[derive(Debug, Clone, Copy)]
pub struct Executor<'a> {
    query: &'a Arc<str>,
    graph: &'a DependencyGraph,
    arena: &'a TaskArena,
    functions: &'a TaskFunctions,
}

impl<'a> Executor<'a> {
    pub fn new(
        query: &'a Arc<str>,
        graph: &'a DependencyGraph,
        arena: &'a TaskArena,
        functions: &'a TaskFunctions,
    ) -> Self {
        Self {
            query,
            graph,
            arena,
            functions,
        }
    }

    /// Execute `task`:
    /// 1. wait for every predecessor's completion signal;
    /// 2. build the context from their records and the task's own record;
    /// 3. call the task function;
    /// 4. merge the task's partial output into its record;
    /// 5. publish the record and fire the task's completion signal.
    ///
    /// If the task function fails the error is returned and the signal is
    /// never fired.
    pub async fn execute(&self, task: &str) -> Result<Record> {
        let slot = self.arena.slot(task)?;
        let func = self.functions.resolve(task)?;

        let mut dependencies = BTreeMap::new();
        for pred in self.graph.predecessors_of(task) {
            let pred_slot = self.arena.slot(pred)?;
            if !pred_slot.signal().is_fired() {
                debug!(task = %task, waiting_on = %pred, "executor: waiting for predecessor");
            }
            pred_slot.signal().wait().await;
            dependencies.insert(pred.clone(), pred_slot.record());
        }

        slot.mark_running();
        let template = slot.record();

        let ctx = TaskContext {
            query: Arc::clone(self.query),
            task: task.to_string(),
            template: template.clone(),
            dependencies,
        };

        debug!(
            task = %task,
            predecessors = ctx.dependencies.len(),
            "executor: invoking task function"
        );

        let output = func
            .call(ctx)
            .await
            .map_err(|source| QueryDagError::TaskFailed {
                task: task.to_string(),
                source,
            })?;

        let mut record = template;
        merge_into(&mut record, partial_for(task, output));

        slot.publish(record.clone());
        info!(task = %task, fields = record.len(), "task completed");

        Ok(record)
    }
}

/// Pull this task's partial record out of a task function's output.
fn partial_for(task: &str, mut output: Record) -> Record {
    match output.remove(task) {
        Some(Value::Object(partial)) => partial,
        Some(other) => {
            warn!(
                task = %task,
                got = %other,
                "task output for this task is not an object; nothing merged"
            );
            Record::new()
        }
        None => {
            warn!(
                task = %task,
                keys = ?output.keys().collect::<Vec<_>>(),
                "task output has no entry for this task; nothing merged"
            );
            Record::new()
        }
    }
}
