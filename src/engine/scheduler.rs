// src/engine/scheduler.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, info};

use crate::dag::DependencyGraph;
use crate::errors::Result;
use crate::exec::{Executor, TaskArena, TaskFunctions};
use crate::store::TaskStore;
use crate::types::{TaskName, TaskStatus};

/// Adaptive level-synchronous driver.
///
/// Walks the graph's concurrency levels in order:
/// - a level with one task runs it inline;
/// - a level with several tasks polls all of their executors concurrently
///   and waits for every one of them (fan-out / fan-in barrier).
///
/// Level `k + 1` never starts before every task of level `k` completed.
/// Concurrency is cooperative: the executors of a level are polled on the
/// caller's task, so a level only overlaps where a task function suspends.
///
/// `run` consumes the scheduler, so a scheduler is either running (its
/// future is alive) or done (the future resolved, with the final store or
/// the first task failure).
#[derive(Debug)]
pub struct Scheduler {
    query: Arc<str>,
    graph: DependencyGraph,
    arena: TaskArena,
    functions: TaskFunctions,
}

/// Final state of a scheduling run.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowRun {
    /// Every task's final record (declared and implicit tasks).
    pub records: TaskStore,
    /// Every task's final status.
    pub statuses: BTreeMap<TaskName, TaskStatus>,
}

impl WorkflowRun {
    pub fn status_of(&self, task: &str) -> Option<TaskStatus> {
        self.statuses.get(task).copied()
    }

    pub fn all_completed(&self) -> bool {
        self.statuses.values().all(|s| *s == TaskStatus::Completed)
    }
}

impl Scheduler {
    /// Build the dependency graph for `store` and prepare a run.
    ///
    /// Fails with [`QueryDagError::Cycle`](crate::errors::QueryDagError::Cycle)
    /// if the unlock lists are cyclic, and with
    /// [`QueryDagError::MissingTaskFunction`](crate::errors::QueryDagError::MissingTaskFunction)
    /// if some task has no function to run.
    pub fn from_store(
        query: impl Into<Arc<str>>,
        store: &TaskStore,
        functions: TaskFunctions,
    ) -> Result<Self> {
        let graph = DependencyGraph::build(store)?;
        Self::new(query, store, graph, functions)
    }

    /// Prepare a run over an already built graph.
    pub fn new(
        query: impl Into<Arc<str>>,
        store: &TaskStore,
        graph: DependencyGraph,
        functions: TaskFunctions,
    ) -> Result<Self> {
        for task in graph.tasks() {
            functions.resolve(task)?;
        }

        let arena = TaskArena::new(store, &graph);

        Ok(Self {
            query: query.into(),
            graph,
            arena,
            functions,
        })
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Run every level to completion and return the final records.
    ///
    /// The first task failure aborts the run: the remaining executors of its
    /// level are dropped and no later level starts.
    pub async fn run(self) -> Result<WorkflowRun> {
        let levels = self.graph.levels();
        info!(
            tasks = self.graph.len(),
            levels = levels.len(),
            "scheduler: starting run"
        );

        let executor = Executor::new(&self.query, &self.graph, &self.arena, &self.functions);

        for (idx, level) in levels.iter().enumerate() {
            match level.as_slice() {
                [task] => {
                    debug!(level = idx, task = %task, "scheduler: running single-task level inline");
                    executor.execute(task).await?;
                }
                tasks => {
                    debug!(level = idx, tasks = ?tasks, "scheduler: running level concurrently");
                    try_join_all(tasks.iter().map(|task| executor.execute(task))).await?;
                }
            }
            debug!(level = idx, "scheduler: level barrier reached");
        }

        info!("scheduler: all levels completed");

        Ok(WorkflowRun {
            records: self.arena.snapshot(),
            statuses: self.arena.statuses(),
        })
    }
}
