// src/engine/mod.rs

//! Orchestration engine.
//!
//! - [`scheduler`] drives one run: the graph's levels in order, with a
//!   barrier between levels.
//! - [`pipeline`] wraps a run with the fail-open policy and snapshotting,
//!   and can obtain the seed store from an external decomposition command.

pub mod pipeline;
pub mod scheduler;

pub use pipeline::{QueryRefiner, RefineOutcome, Refinement, decompose_with_command};
pub use scheduler::{Scheduler, WorkflowRun};
