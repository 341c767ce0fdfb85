mod common;

use std::collections::{BTreeMap, BTreeSet};

use common::{event_log, trail};
use proptest::prelude::*;
use querydag::dag::DependencyGraph;
use querydag::engine::Scheduler;
use querydag::exec::TaskFunctions;
use querydag::store::TaskStore;
use querydag::types::TaskStatus;
use querydag_test_utils::builders::TaskStoreBuilder;
use querydag_test_utils::fake_task_fn::TrailTaskFn;

// Strategy to generate an acyclic task store.
// Acyclicity is guaranteed by only letting task N unlock tasks N+1.. .
fn dag_store_strategy(max_tasks: usize) -> impl Strategy<Value = TaskStore> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_tasks),
            num_tasks,
        )
        .prop_map(move |raw| {
            let mut builder = TaskStoreBuilder::new();
            for (i, targets) in raw.into_iter().enumerate() {
                let later = num_tasks - i - 1;
                let unlocks: BTreeSet<String> = targets
                    .into_iter()
                    .filter(|_| later > 0)
                    .map(|t| format!("task_{:02}", i + 1 + t % later.max(1)))
                    .collect();
                let unlocks: Vec<&str> = unlocks.iter().map(|s| s.as_str()).collect();
                builder = builder.task(&format!("task_{i:02}"), &unlocks);
            }
            builder.build()
        })
    })
}

fn ancestors(graph: &DependencyGraph, task: &str) -> BTreeSet<String> {
    let mut seen = BTreeSet::new();
    let mut stack = vec![task.to_string()];
    while let Some(t) = stack.pop() {
        for pred in graph.predecessors_of(&t) {
            if seen.insert(pred.clone()) {
                stack.push(pred.clone());
            }
        }
    }
    seen
}

proptest! {
    #[test]
    fn levels_partition_tasks_and_respect_edges(store in dag_store_strategy(12)) {
        let graph = DependencyGraph::build(&store).expect("generated stores are acyclic");

        let placed: Vec<&str> = graph.order().collect();
        let unique: BTreeSet<&str> = placed.iter().copied().collect();
        prop_assert_eq!(placed.len(), graph.len());
        prop_assert_eq!(unique.len(), graph.len());

        for (task, unlocks) in graph.forward() {
            for next in unlocks {
                prop_assert!(graph.level_of(task) < graph.level_of(next),
                    "{} must be placed before {}", task, next);
            }
        }

        let first: BTreeSet<&String> = graph.levels()[0].iter().collect();
        let starts: BTreeSet<&String> = graph.start_tasks().iter().collect();
        prop_assert_eq!(first, starts);
    }

    #[test]
    fn predecessors_mirror_unlocks(store in dag_store_strategy(12)) {
        let graph = DependencyGraph::build(&store).unwrap();

        let mut edges_fwd = BTreeSet::new();
        for (task, unlocks) in graph.forward() {
            for next in unlocks {
                edges_fwd.insert((task.clone(), next.clone()));
            }
        }
        let mut edges_rev = BTreeSet::new();
        for (task, preds) in graph.predecessors() {
            for pred in preds {
                edges_rev.insert((pred.clone(), task.clone()));
            }
        }
        prop_assert_eq!(edges_fwd, edges_rev);
    }

    #[test]
    fn back_edge_is_always_reported(
        store in dag_store_strategy(10),
        a in any::<usize>(),
        b in any::<usize>(),
    ) {
        let names: Vec<String> = store.names().map(str::to_string).collect();
        prop_assume!(names.len() >= 2);
        let i = a % names.len();
        let j = b % names.len();
        prop_assume!(i != j);

        let mut decls: BTreeMap<String, Vec<String>> = store
            .unlock_lists()
            .map(|(name, unlocks)| (name.to_string(), unlocks))
            .collect();
        decls.get_mut(&names[i]).unwrap().push(names[j].clone());
        decls.get_mut(&names[j]).unwrap().push(names[i].clone());

        let report = DependencyGraph::from_unlocks(decls).unwrap_err();

        prop_assert!(report.is_unresolved(&names[i]));
        prop_assert!(report.is_unresolved(&names[j]));
        prop_assert!(report
            .cycles
            .iter()
            .any(|c| c.contains(&names[i]) && c.contains(&names[j])));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn every_task_sees_all_of_its_ancestors(store in dag_store_strategy(8)) {
        let graph = DependencyGraph::build(&store).unwrap();
        let functions = TaskFunctions::new().with_default(TrailTaskFn::new(event_log()));

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let run = rt
            .block_on(Scheduler::from_store("q", &store, functions).unwrap().run())
            .unwrap();

        for task in graph.tasks() {
            prop_assert_eq!(run.status_of(task), Some(TaskStatus::Completed));

            let mut expected: Vec<String> = ancestors(&graph, task).into_iter().collect();
            expected.push(task.to_string());
            expected.sort();
            prop_assert_eq!(trail(run.records.get(task).unwrap()), expected);
        }
    }
}
