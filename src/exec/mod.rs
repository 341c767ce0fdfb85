// src/exec/mod.rs

//! Task execution layer.
//!
//! - [`signal`] provides the broadcast, latched completion signal.
//! - [`arena`] holds one slot (record, status, signal) per task for a run.
//! - [`task_fn`] defines the pluggable [`TaskFunction`] trait and the
//!   per-task registry.
//! - [`executor`] runs one task: wait for predecessors, call, merge, signal.
//! - [`builtin`] contains the `echo` and `command` task functions.
//! - [`command`] runs external commands and extracts JSON from replies.
//! - [`template`] renders prompt templates for command-backed tasks.

pub mod arena;
pub mod builtin;
pub mod command;
pub mod executor;
pub mod signal;
pub mod task_fn;
pub mod template;

pub use arena::{TaskArena, TaskSlot};
pub use builtin::{CommandTaskFn, EchoTaskFn};
pub use executor::Executor;
pub use signal::CompletionSignal;
pub use task_fn::{FnTask, TaskContext, TaskFunction, TaskFunctions, TaskFuture, task_fn};
pub use template::PromptTemplate;
