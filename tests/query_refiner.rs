mod common;

use std::path::Path;
use std::sync::Arc;

use common::{event_log, trail};
use querydag::engine::{QueryRefiner, RefineOutcome};
use querydag::exec::TaskFunctions;
use querydag::fs::FileSystem;
use querydag::fs::mock::MockFileSystem;
use querydag::snapshot::SnapshotStore;
use querydag_test_utils::builders::{TaskStoreBuilder, diamond};
use querydag_test_utils::fake_task_fn::{FailingTaskFn, TrailTaskFn};
use querydag_test_utils::{init_tracing, with_timeout};

fn snapshots(fs: &MockFileSystem) -> SnapshotStore {
    SnapshotStore::with_fs("snaps", Arc::new(fs.clone()))
}

#[tokio::test]
async fn successful_refinement_returns_merged_store_and_snapshots_both_sides() {
    init_tracing();
    let fs = MockFileSystem::new();
    let store = snapshots(&fs);
    let refiner = QueryRefiner::new(
        TaskFunctions::new().with_default(TrailTaskFn::new(event_log())),
    )
    .with_snapshots(store.clone());

    let seed = diamond();
    let refinement = with_timeout(refiner.refine("how do schedulers level a dag", seed.clone())).await;

    assert!(!refinement.is_fallback());
    assert!(matches!(refinement.outcome, RefineOutcome::Completed(_)));
    assert_eq!(refinement.before, seed);
    assert_eq!(trail(refinement.after.get("D").unwrap()), vec!["A", "B", "C", "D"]);

    assert!(fs.exists(Path::new("snaps/query_before.json")));
    assert!(fs.exists(Path::new("snaps/query_after.json")));
    assert_eq!(store.read_before().unwrap(), seed);
    assert_eq!(store.read_after().unwrap(), refinement.after);
}

#[tokio::test]
async fn cyclic_seed_falls_back_to_the_original_store() {
    let fs = MockFileSystem::new();
    let store = snapshots(&fs);
    let refiner = QueryRefiner::new(
        TaskFunctions::new().with_default(TrailTaskFn::new(event_log())),
    )
    .with_snapshots(store.clone());

    let seed = TaskStoreBuilder::new()
        .task("A", &["B"])
        .task("B", &["A"])
        .build();
    let refinement = with_timeout(refiner.refine("q", seed.clone())).await;

    match &refinement.outcome {
        RefineOutcome::CycleFallback(report) => {
            assert!(report.is_unresolved("A"));
            assert!(report.is_unresolved("B"));
        }
        other => panic!("expected a cycle fallback, got {other:?}"),
    }
    assert_eq!(refinement.after, seed);
    assert_eq!(store.read_before().unwrap(), store.read_after().unwrap());
}

#[tokio::test]
async fn task_failure_falls_back_to_the_original_store() {
    let fs = MockFileSystem::new();
    let store = snapshots(&fs);
    let log = event_log();
    let refiner = QueryRefiner::new(
        TaskFunctions::new().with_default(FailingTaskFn::new(&["B"], log)),
    )
    .with_snapshots(store.clone());

    let seed = diamond();
    let refinement = with_timeout(refiner.refine("q", seed.clone())).await;

    match &refinement.outcome {
        RefineOutcome::FailedFallback(msg) => assert!(msg.contains("'B'")),
        other => panic!("expected a failure fallback, got {other:?}"),
    }
    assert!(refinement.is_fallback());
    assert_eq!(refinement.after, seed);
    assert_eq!(store.read_after().unwrap(), seed);
}

#[tokio::test]
async fn missing_task_function_falls_back() {
    let refiner = QueryRefiner::new(TaskFunctions::new());

    let seed = diamond();
    let refinement = with_timeout(refiner.refine("q", seed.clone())).await;

    assert!(matches!(refinement.outcome, RefineOutcome::FailedFallback(_)));
    assert_eq!(refinement.after, seed);
}

#[tokio::test]
async fn custom_snapshot_labels_are_used() {
    let fs = MockFileSystem::new();
    let store = snapshots(&fs).with_labels("seed", "refined");
    let refiner = QueryRefiner::new(
        TaskFunctions::new().with_default(TrailTaskFn::new(event_log())),
    )
    .with_snapshots(store);

    with_timeout(refiner.refine("q", diamond())).await;

    let paths = fs.paths();
    assert_eq!(paths.len(), 2);
    assert!(fs.exists(Path::new("snaps/seed.json")));
    assert!(fs.exists(Path::new("snaps/refined.json")));
}
