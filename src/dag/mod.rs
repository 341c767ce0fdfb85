// src/dag/mod.rs

//! Dependency graph construction and analysis.
//!
//! - [`graph`] derives the forward/predecessor views, start/end tasks and the
//!   concurrency levels from the tasks' unlock lists.
//! - [`cycle`] holds the structured diagnostic produced when no leveling
//!   exists.
//! - [`plan`] renders a graph as a human-readable execution plan.

pub mod cycle;
pub mod graph;
pub mod plan;

pub use cycle::CycleReport;
pub use graph::DependencyGraph;
pub use plan::ExecutionPlan;
