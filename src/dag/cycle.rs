// src/dag/cycle.rs

//! Structured diagnostic for task sets that cannot be topologically placed.

use std::collections::BTreeMap;
use std::fmt;

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use serde::Serialize;

use crate::types::TaskName;

/// Every task that could not be placed in a level, with the predecessors
/// still blocking it, plus the strongly connected components that actually
/// form cycles.
///
/// Tasks that sit downstream of a cycle without being part of it show up in
/// `unresolved` but not in `cycles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Unresolved task -> outstanding (also unresolved) predecessors.
    pub unresolved: BTreeMap<TaskName, Vec<TaskName>>,
    /// Each entry is one cycle's members, sorted by name.
    pub cycles: Vec<Vec<TaskName>>,
}

impl CycleReport {
    /// Build a report from the unresolved tasks and their outstanding
    /// predecessors.
    pub(crate) fn new(unresolved: BTreeMap<TaskName, Vec<TaskName>>) -> Self {
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for name in unresolved.keys() {
            graph.add_node(name.as_str());
        }
        // Edge direction: predecessor -> task.
        for (task, preds) in unresolved.iter() {
            for pred in preds {
                graph.add_edge(pred.as_str(), task.as_str(), ());
            }
        }

        let mut cycles: Vec<Vec<TaskName>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
            .map(|scc| {
                let mut members: Vec<TaskName> = scc.into_iter().map(str::to_string).collect();
                members.sort();
                members
            })
            .collect();
        cycles.sort();

        Self { unresolved, cycles }
    }

    /// Whether `task` could not be placed.
    pub fn is_unresolved(&self, task: &str) -> bool {
        self.unresolved.contains_key(task)
    }

    /// Outstanding predecessors of an unresolved task.
    pub fn blocking(&self, task: &str) -> &[TaskName] {
        self.unresolved
            .get(task)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "cyclic or unresolvable dependencies:")?;
        for (task, preds) in self.unresolved.iter() {
            writeln!(f, "  - {task} still waits on: {}", preds.join(", "))?;
        }
        for cycle in self.cycles.iter() {
            writeln!(f, "  cycle among: {}", cycle.join(", "))?;
        }
        Ok(())
    }
}
