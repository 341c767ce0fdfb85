use std::io::Write;

use querydag::errors::QueryDagError;
use querydag::store::TaskStore;
use querydag::types::{Record, TaskStatus, unlocks_of};
use serde_json::json;
use tempfile::NamedTempFile;

fn record(value: serde_json::Value) -> Record {
    value.as_object().cloned().unwrap()
}

#[test]
fn unlocks_accept_list_string_and_alias() {
    assert_eq!(
        unlocks_of(&record(json!({ "required_steps": ["B", "", "C"] }))),
        vec!["B".to_string(), "C".to_string()]
    );
    assert_eq!(
        unlocks_of(&record(json!({ "required_steps": "B" }))),
        vec!["B".to_string()]
    );
    assert_eq!(
        unlocks_of(&record(json!({ "unlocks": ["D"] }))),
        vec!["D".to_string()]
    );
    assert!(unlocks_of(&record(json!({ "required_steps": "" }))).is_empty());
    assert!(unlocks_of(&record(json!({ "required_steps": 7 }))).is_empty());
    assert!(unlocks_of(&Record::new()).is_empty());
}

#[test]
fn canonical_key_wins_over_alias() {
    let r = record(json!({ "required_steps": ["B"], "unlocks": ["C"] }));
    assert_eq!(unlocks_of(&r), vec!["B".to_string()]);
}

#[test]
fn status_defaults_to_pending_and_displays_lowercase() {
    assert_eq!(TaskStatus::default(), TaskStatus::Pending);
    assert_eq!(TaskStatus::Completed.to_string(), "completed");
    assert_eq!(json!(TaskStatus::Running), json!("running"));
}

#[test]
fn store_rejects_non_object_documents() {
    match TaskStore::from_value(json!(["A", "B"])) {
        Err(QueryDagError::InvalidTaskStore(msg)) => assert!(msg.contains("array")),
        other => panic!("expected InvalidTaskStore, got {other:?}"),
    }

    match TaskStore::from_value(json!({ "A": "not a record" })) {
        Err(QueryDagError::InvalidTaskStore(msg)) => assert!(msg.contains("'A'")),
        other => panic!("expected InvalidTaskStore, got {other:?}"),
    }
}

#[test]
fn store_loads_from_file_and_keeps_unicode() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
  "keyword_extraction": {{ "required_steps": ["combined_query"], "keywords": ["größe"] }},
  "combined_query": {{ "required_steps": [] }}
}}"#
    )
    .unwrap();

    let store = TaskStore::load(file.path()).unwrap();

    assert_eq!(store.len(), 2);
    assert_eq!(
        store.names().collect::<Vec<_>>(),
        vec!["combined_query", "keyword_extraction"]
    );
    assert!(store.to_pretty_json().unwrap().contains("größe"));
}

#[test]
fn invalid_json_is_a_json_error() {
    assert!(matches!(
        TaskStore::from_json_str("{ not json"),
        Err(QueryDagError::JsonError(_))
    ));
}
