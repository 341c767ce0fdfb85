// src/exec/arena.rs

//! Per-run task arena: one slot per graph node.
//!
//! The slot map is fixed once the run starts. Each slot is written only by
//! its own executor, once, when the task completes; readers only look at a
//! predecessor's record after that predecessor's signal has fired.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use tracing::trace;

use crate::dag::DependencyGraph;
use crate::errors::{QueryDagError, Result};
use crate::exec::signal::CompletionSignal;
use crate::store::TaskStore;
use crate::types::{Record, TaskName, TaskStatus};

/// A task's authoritative record, status and completion signal.
#[derive(Debug)]
pub struct TaskSlot {
    record: RwLock<Record>,
    status: RwLock<TaskStatus>,
    done: CompletionSignal,
}

impl TaskSlot {
    fn new(record: Record) -> Self {
        Self {
            record: RwLock::new(record),
            status: RwLock::new(TaskStatus::Pending),
            done: CompletionSignal::new(),
        }
    }

    /// Copy of the current record.
    pub fn record(&self) -> Record {
        self.record
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn status(&self) -> TaskStatus {
        *self.status.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn signal(&self) -> &CompletionSignal {
        &self.done
    }

    pub(crate) fn mark_running(&self) {
        let mut status = self.status.write().unwrap_or_else(PoisonError::into_inner);
        if *status == TaskStatus::Pending {
            *status = TaskStatus::Running;
        }
    }

    /// Store the final record, mark the task completed and fire its signal,
    /// in that order.
    pub(crate) fn publish(&self, record: Record) {
        *self.record.write().unwrap_or_else(PoisonError::into_inner) = record;
        *self.status.write().unwrap_or_else(PoisonError::into_inner) = TaskStatus::Completed;
        self.done.fire();
    }
}

/// Slots for every node of a [`DependencyGraph`].
#[derive(Debug)]
pub struct TaskArena {
    slots: BTreeMap<TaskName, TaskSlot>,
}

impl TaskArena {
    /// Seed one slot per graph node. Implicit nodes start with an empty
    /// record.
    pub fn new(store: &TaskStore, graph: &DependencyGraph) -> Self {
        let slots = graph
            .tasks()
            .map(|name| {
                let record = store.get(name).cloned().unwrap_or_default();
                trace!(task = %name, fields = record.len(), "arena: seeded slot");
                (name.to_string(), TaskSlot::new(record))
            })
            .collect();

        Self { slots }
    }

    pub fn slot(&self, name: &str) -> Result<&TaskSlot> {
        self.slots
            .get(name)
            .ok_or_else(|| QueryDagError::UnknownTask(name.to_string()))
    }

    /// Current records of every slot.
    pub fn snapshot(&self) -> TaskStore {
        self.slots
            .iter()
            .map(|(name, slot)| (name.clone(), slot.record()))
            .collect()
    }

    pub fn statuses(&self) -> BTreeMap<TaskName, TaskStatus> {
        self.slots
            .iter()
            .map(|(name, slot)| (name.clone(), slot.status()))
            .collect()
    }
}
