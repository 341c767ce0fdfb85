// src/dag/graph.rs

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use tracing::debug;

use crate::dag::cycle::CycleReport;
use crate::store::TaskStore;
use crate::types::TaskName;

/// Dependency graph derived from the tasks' `unlocks` declarations.
///
/// Two explicit views are kept:
/// - `forward`: task -> tasks it unlocks (as declared; only used for leveling)
/// - `predecessors`: task -> tasks it must wait on (the inverse, deduplicated)
///
/// Names that only appear inside someone's unlock list are implicit nodes:
/// they get an empty forward list and are scheduled like declared tasks.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    forward: BTreeMap<TaskName, Vec<TaskName>>,
    predecessors: BTreeMap<TaskName, Vec<TaskName>>,
    implicit: BTreeSet<TaskName>,
    start_tasks: Vec<TaskName>,
    end_tasks: Vec<TaskName>,
    levels: Vec<Vec<TaskName>>,
}

impl DependencyGraph {
    /// Build the graph from a seed [`TaskStore`].
    ///
    /// Returns a [`CycleReport`] instead of a graph if the forward edges
    /// contain a cycle; no levels are produced in that case.
    pub fn build(store: &TaskStore) -> Result<Self, CycleReport> {
        Self::from_unlocks(
            store
                .unlock_lists()
                .map(|(name, unlocks)| (name.to_string(), unlocks)),
        )
    }

    /// Build the graph from `(task, unlocks)` declarations.
    ///
    /// A task declared twice keeps its last declaration.
    pub fn from_unlocks<I>(decls: I) -> Result<Self, CycleReport>
    where
        I: IntoIterator<Item = (TaskName, Vec<TaskName>)>,
    {
        let declared: BTreeMap<TaskName, Vec<TaskName>> = decls.into_iter().collect();

        // All names, declared or referenced.
        let mut forward = declared.clone();
        let mut implicit = BTreeSet::new();
        for unlocks in declared.values() {
            for name in unlocks {
                if !declared.contains_key(name) {
                    implicit.insert(name.clone());
                    forward.entry(name.clone()).or_default();
                }
            }
        }

        let levels = kahn_levels(&forward).map_err(|emitted| {
            let report = unresolved_report(&declared, &forward, &emitted);
            debug!(unresolved = report.unresolved.len(), "graph: cycle detected");
            report
        })?;

        let predecessors = invert(&declared, &forward);

        let start_tasks = forward
            .keys()
            .filter(|name| predecessors.get(*name).is_none_or(|p| p.is_empty()))
            .cloned()
            .collect();

        let end_tasks = forward
            .iter()
            .filter(|(_, unlocks)| unlocks.is_empty())
            .map(|(name, _)| name.clone())
            .collect();

        debug!(
            tasks = forward.len(),
            implicit = implicit.len(),
            levels = levels.len(),
            "graph: built dependency graph"
        );

        Ok(Self {
            forward,
            predecessors,
            implicit,
            start_tasks,
            end_tasks,
            levels,
        })
    }

    /// All task names (declared and implicit), sorted.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.forward.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.forward.contains_key(name)
    }

    /// Whether `name` was only referenced from an unlock list.
    pub fn is_implicit(&self, name: &str) -> bool {
        self.implicit.contains(name)
    }

    /// Tasks `name` unlocks, as declared.
    pub fn unlocks_of(&self, name: &str) -> &[TaskName] {
        self.forward
            .get(name)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Tasks `name` must wait on.
    pub fn predecessors_of(&self, name: &str) -> &[TaskName] {
        self.predecessors
            .get(name)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Forward (unlock) adjacency for every node.
    pub fn forward(&self) -> &BTreeMap<TaskName, Vec<TaskName>> {
        &self.forward
    }

    /// Reverse (predecessor) adjacency for every node.
    pub fn predecessors(&self) -> &BTreeMap<TaskName, Vec<TaskName>> {
        &self.predecessors
    }

    /// Tasks with no predecessors.
    pub fn start_tasks(&self) -> &[TaskName] {
        &self.start_tasks
    }

    /// Tasks whose own unlock list is empty.
    pub fn end_tasks(&self) -> &[TaskName] {
        &self.end_tasks
    }

    /// Concurrency groups, in execution order.
    pub fn levels(&self) -> &[Vec<TaskName>] {
        &self.levels
    }

    /// Flattened topological order (levels concatenated).
    pub fn order(&self) -> impl Iterator<Item = &str> {
        self.levels.iter().flatten().map(|s| s.as_str())
    }

    /// Index of the level containing `name`.
    pub fn level_of(&self, name: &str) -> Option<usize> {
        self.levels
            .iter()
            .position(|level| level.iter().any(|t| t == name))
    }
}

/// Breadth-first Kahn's algorithm: each frontier becomes one level.
///
/// On a cycle, returns the set of names that *were* emitted.
fn kahn_levels(
    forward: &BTreeMap<TaskName, Vec<TaskName>>,
) -> Result<Vec<Vec<TaskName>>, HashSet<TaskName>> {
    let mut in_degree: HashMap<&str, usize> =
        forward.keys().map(|name| (name.as_str(), 0)).collect();
    for unlocks in forward.values() {
        for name in unlocks {
            *in_degree.entry(name.as_str()).or_default() += 1;
        }
    }

    let mut frontier: VecDeque<&str> = forward
        .keys()
        .map(|s| s.as_str())
        .filter(|name| in_degree.get(name).copied() == Some(0))
        .collect();

    let mut levels = Vec::new();
    let mut emitted: HashSet<TaskName> = HashSet::new();

    while !frontier.is_empty() {
        let mut level = Vec::with_capacity(frontier.len());
        let mut next = VecDeque::new();

        while let Some(name) = frontier.pop_front() {
            level.push(name.to_string());
            emitted.insert(name.to_string());

            for unlocked in forward.get(name).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(unlocked.as_str()) {
                    *degree -= 1;
                    if *degree == 0 {
                        next.push_back(unlocked.as_str());
                    }
                }
            }
        }

        levels.push(level);
        frontier = next;
    }

    if emitted.len() < forward.len() {
        Err(emitted)
    } else {
        Ok(levels)
    }
}

/// Invert declared unlock lists into deduplicated predecessor lists.
///
/// Computed independently from leveling so the executor's wait set never
/// depends on how levels were derived.
fn invert(
    declared: &BTreeMap<TaskName, Vec<TaskName>>,
    forward: &BTreeMap<TaskName, Vec<TaskName>>,
) -> BTreeMap<TaskName, Vec<TaskName>> {
    let mut predecessors: BTreeMap<TaskName, Vec<TaskName>> = forward
        .keys()
        .map(|name| (name.clone(), Vec::new()))
        .collect();

    for (task, unlocks) in declared.iter() {
        for unlocked in unlocks {
            let preds = predecessors.entry(unlocked.clone()).or_default();
            if !preds.contains(task) {
                preds.push(task.clone());
            }
        }
    }

    predecessors
}

fn unresolved_report(
    declared: &BTreeMap<TaskName, Vec<TaskName>>,
    forward: &BTreeMap<TaskName, Vec<TaskName>>,
    emitted: &HashSet<TaskName>,
) -> CycleReport {
    let predecessors = invert(declared, forward);

    let unresolved = forward
        .keys()
        .filter(|name| !emitted.contains(*name))
        .map(|name| {
            let blocking = predecessors
                .get(name)
                .into_iter()
                .flatten()
                .filter(|p| !emitted.contains(*p))
                .cloned()
                .collect();
            (name.clone(), blocking)
        })
        .collect();

    CycleReport::new(unresolved)
}
