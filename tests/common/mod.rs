#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use querydag::types::Record;
use querydag_test_utils::fake_task_fn::EventLog;
use serde_json::Value;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// The `trail` field of a record as a sorted list of names.
pub fn trail(record: &Record) -> Vec<String> {
    let mut names: Vec<String> = record
        .get("trail")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
