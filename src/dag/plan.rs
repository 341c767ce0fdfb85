// src/dag/plan.rs

//! Human-readable execution plan, used by `--dry-run`.

use std::fmt;

use crate::dag::graph::DependencyGraph;

/// Display adapter printing levels, order, start/end tasks and edges.
///
/// ```text
/// execution plan (tasks within a stage may run concurrently):
///   stage 1: A (sequential)
///   stage 2: B, C (concurrent)
///   stage 3: D (sequential)
/// ```
pub struct ExecutionPlan<'a> {
    graph: &'a DependencyGraph,
}

impl<'a> ExecutionPlan<'a> {
    pub fn new(graph: &'a DependencyGraph) -> Self {
        Self { graph }
    }
}

impl fmt::Display for ExecutionPlan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let graph = self.graph;

        writeln!(f, "execution plan (tasks within a stage may run concurrently):")?;
        for (idx, level) in graph.levels().iter().enumerate() {
            let mode = if level.len() > 1 { "concurrent" } else { "sequential" };
            writeln!(f, "  stage {}: {} ({mode})", idx + 1, level.join(", "))?;
        }

        writeln!(f)?;
        writeln!(f, "order: {}", graph.order().collect::<Vec<_>>().join(" -> "))?;
        writeln!(f, "start tasks: {}", graph.start_tasks().join(", "))?;
        writeln!(f, "end tasks: {}", graph.end_tasks().join(", "))?;

        let implicit: Vec<&str> = graph.tasks().filter(|t| graph.is_implicit(t)).collect();
        if !implicit.is_empty() {
            writeln!(f, "implicit tasks (referenced only): {}", implicit.join(", "))?;
        }

        writeln!(f)?;
        writeln!(f, "unlocks (task -> tasks it enables):")?;
        for (task, unlocks) in graph.forward().iter() {
            if unlocks.is_empty() {
                continue;
            }
            writeln!(f, "  {task} -> {}", unlocks.join(", "))?;
        }

        Ok(())
    }
}
