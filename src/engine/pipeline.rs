// src/engine/pipeline.rs

//! Fail-open query refinement.
//!
//! Wraps a whole scheduling run so that a broken decomposition never blocks
//! the surrounding retrieval pipeline:
//! - cyclic unlock lists: log the diagnostic, keep the seed store;
//! - a failing task (or a missing task function): log the cause, keep the
//!   seed store;
//! - success: return the merged store.
//!
//! In every case the before/after snapshots are written when a
//! [`SnapshotStore`] is configured. Snapshot write failures are logged and
//! never turn a refinement into an error.

use std::time::Duration;

use tracing::{error, info, warn};

use crate::dag::{CycleReport, DependencyGraph};
use crate::engine::scheduler::{Scheduler, WorkflowRun};
use crate::errors::{QueryDagError, Result};
use crate::exec::TaskFunctions;
use crate::exec::command::{extract_json_block, run_command};
use crate::snapshot::SnapshotStore;
use crate::store::TaskStore;

/// How a refinement ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RefineOutcome {
    /// Every task ran; `after` holds the merged records.
    Completed(WorkflowRun),
    /// The graph was cyclic; `after` is the unmodified seed.
    CycleFallback(CycleReport),
    /// A task failed (message attached); `after` is the unmodified seed.
    FailedFallback(String),
}

/// Result of [`QueryRefiner::refine`].
#[derive(Debug, Clone, PartialEq)]
pub struct Refinement {
    pub query: String,
    pub before: TaskStore,
    pub after: TaskStore,
    pub outcome: RefineOutcome,
}

impl Refinement {
    pub fn is_fallback(&self) -> bool {
        !matches!(self.outcome, RefineOutcome::Completed(_))
    }
}

/// Runs decomposed queries through the scheduler with fail-open semantics.
#[derive(Debug, Clone)]
pub struct QueryRefiner {
    functions: TaskFunctions,
    snapshots: Option<SnapshotStore>,
}

impl QueryRefiner {
    pub fn new(functions: TaskFunctions) -> Self {
        Self {
            functions,
            snapshots: None,
        }
    }

    pub fn with_snapshots(mut self, snapshots: SnapshotStore) -> Self {
        self.snapshots = Some(snapshots);
        self
    }

    /// Refine `query` given its decomposition `seed`.
    ///
    /// Never fails: any error inside the run degrades to the seed store.
    pub async fn refine(&self, query: &str, seed: TaskStore) -> Refinement {
        let (after, outcome) = match self.run(query, &seed).await {
            Ok(run) => {
                info!(tasks = run.records.len(), "refinement completed");
                (run.records.clone(), RefineOutcome::Completed(run))
            }
            Err(QueryDagError::Cycle(report)) => {
                warn!("task graph is cyclic; falling back to the original query\n{report}");
                (seed.clone(), RefineOutcome::CycleFallback(report))
            }
            Err(e) => {
                error!(error = %e, "refinement failed; falling back to the original query");
                (seed.clone(), RefineOutcome::FailedFallback(e.to_string()))
            }
        };

        if let Some(snapshots) = self.snapshots.as_ref() {
            if let Err(e) = snapshots.write_pair(&seed, &after) {
                warn!(error = %e, dir = %snapshots.dir().display(), "failed to write snapshots");
            }
        }

        Refinement {
            query: query.to_string(),
            before: seed,
            after,
            outcome,
        }
    }

    async fn run(&self, query: &str, seed: &TaskStore) -> Result<WorkflowRun> {
        let graph = DependencyGraph::build(seed)?;
        Scheduler::new(query, seed, graph, self.functions.clone())?
            .run()
            .await
    }
}

/// Produce the seed store for `query` by running an external decomposition
/// command: the query goes to stdin, a JSON object of tasks is expected back.
pub async fn decompose_with_command(
    cmd: &str,
    query: &str,
    timeout: Option<Duration>,
) -> Result<TaskStore> {
    let reply = run_command(cmd, query, timeout).await?;
    let value = extract_json_block(&reply).ok_or_else(|| {
        QueryDagError::InvalidTaskStore(format!(
            "decomposition command '{cmd}' did not print a JSON object"
        ))
    })?;
    let store = TaskStore::from_value(value)?;
    info!(tasks = store.len(), "query decomposed");
    Ok(store)
}
