#![cfg(unix)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use querydag::engine::{Scheduler, decompose_with_command};
use querydag::errors::QueryDagError;
use querydag::exec::command::{extract_json_block, run_command};
use querydag::exec::{CommandTaskFn, EchoTaskFn, PromptTemplate, TaskContext, TaskFunctions};
use querydag::types::Record;
use querydag_test_utils::builders::TaskStoreBuilder;
use querydag_test_utils::with_timeout;
use serde_json::{Value, json};

fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn run_command_pipes_stdin_to_stdout() {
    let out = with_timeout(run_command("cat", "hello scheduler", None))
        .await
        .unwrap();
    assert_eq!(out.trim_end(), "hello scheduler");
}

#[tokio::test]
async fn run_command_fails_on_non_zero_exit() {
    let err = with_timeout(run_command("exit 3", "", None)).await.unwrap_err();
    assert!(err.to_string().contains("exited with status 3"));
}

#[tokio::test]
async fn run_command_honours_timeout() {
    let err = with_timeout(run_command("sleep 5", "", Some(Duration::from_millis(100))))
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("timed out"));
}

#[test]
fn json_block_is_found_inside_prose() {
    let reply = "Sure! Here it is:\n```json\n{\"A\": {\"keywords\": [\"dag\"]}}\n```\nAnything else?";
    assert_eq!(
        extract_json_block(reply),
        Some(json!({ "A": { "keywords": ["dag"] } }))
    );
    assert_eq!(extract_json_block("no json here"), None);
    assert_eq!(extract_json_block("} backwards {"), None);
    assert_eq!(extract_json_block("{ broken: json }"), None);
}

#[tokio::test]
async fn command_task_output_is_merged() {
    let store = TaskStoreBuilder::new()
        .task_with("A", &["B"], json!({ "keywords": ["rust"] }))
        .task("B", &[])
        .build();

    let cmd = r#"cat >/dev/null; echo 'reply: {"A": {"keywords": ["tokio"], "complexity": "high"}}'"#;
    let functions = TaskFunctions::new()
        .with_default(EchoTaskFn)
        .with_task("A", CommandTaskFn::new(cmd, PromptTemplate::default()));

    let run = with_timeout(Scheduler::from_store("q", &store, functions).unwrap().run())
        .await
        .unwrap();

    let a = run.records.get("A").unwrap();
    let mut keywords = a["keywords"].as_array().unwrap().clone();
    keywords.sort_by_key(|v| v.to_string());
    assert_eq!(keywords, vec![json!("rust"), json!("tokio")]);
    assert!(!a.contains_key("complexity"));
}

#[tokio::test]
async fn command_reply_without_json_merges_nothing() {
    let store = TaskStoreBuilder::new()
        .task_with("A", &[], json!({ "topic": "graphs" }))
        .build();
    let functions = TaskFunctions::new().with_default(CommandTaskFn::new(
        "cat >/dev/null; echo 'I cannot help with that'",
        PromptTemplate::default(),
    ));

    let run = with_timeout(Scheduler::from_store("q", &store, functions).unwrap().run())
        .await
        .unwrap();

    assert_eq!(run.records.get("A"), store.get("A"));
}

#[tokio::test]
async fn failing_command_fails_the_task() {
    let store = TaskStoreBuilder::new().task("A", &[]).build();
    let functions = TaskFunctions::new()
        .with_default(CommandTaskFn::new("exit 1", PromptTemplate::default()));

    let result = with_timeout(Scheduler::from_store("q", &store, functions).unwrap().run()).await;

    assert!(matches!(result, Err(QueryDagError::TaskFailed { .. })));
}

#[test]
fn template_render_fills_placeholders_and_context() {
    let template = PromptTemplate::from_record(record(json!({
        "Role": "planner",
        "Action": "Query: {query}. Fill {template}."
    })));

    let mut dependencies = BTreeMap::new();
    dependencies.insert("A".to_string(), record(json!({ "keywords": ["rust"] })));

    let ctx = TaskContext {
        query: Arc::from("rust schedulers"),
        task: "B".to_string(),
        template: record(json!({ "topic": "dags" })),
        dependencies,
    };

    let rendered: Value = serde_json::from_str(&template.render(&ctx).unwrap()).unwrap();

    assert_eq!(rendered["Role"], json!("planner"));
    assert_eq!(
        rendered["Action"],
        json!("Query: rust schedulers. Fill {\"B\":{\"topic\":\"\"}}.")
    );
    assert_eq!(rendered["Template"], json!({ "B": { "topic": "dags" } }));
    assert_eq!(rendered["Context"]["A"]["keywords"], json!(["rust"]));
    assert_eq!(rendered["Context"]["B"]["topic"], json!("dags"));
}

#[test]
fn template_without_dependencies_has_no_context() {
    let ctx = TaskContext {
        query: Arc::from("q"),
        task: "A".to_string(),
        template: Record::new(),
        dependencies: BTreeMap::new(),
    };

    let rendered: Value =
        serde_json::from_str(&PromptTemplate::default().render(&ctx).unwrap()).unwrap();

    assert!(rendered.get("Context").is_none());
    assert!(rendered["Action"].as_str().unwrap().contains("User query: q"));
}

#[tokio::test]
async fn decomposition_command_produces_the_seed_store() {
    let cmd = r#"cat >/dev/null; echo '{"A": {"required_steps": ["B"]}, "B": {"required_steps": []}}'"#;

    let store = with_timeout(decompose_with_command(cmd, "what is a dag", None))
        .await
        .unwrap();

    assert_eq!(store.names().collect::<Vec<_>>(), vec!["A", "B"]);
}

#[tokio::test]
async fn decomposition_without_json_is_rejected() {
    let result = with_timeout(decompose_with_command("echo nothing useful", "q", None)).await;

    assert!(matches!(result, Err(QueryDagError::InvalidTaskStore(_))));
}
