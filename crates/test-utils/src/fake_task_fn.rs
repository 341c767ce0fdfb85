use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use querydag::exec::{TaskContext, TaskFunction, TaskFuture};
use querydag::types::Record;
use serde_json::{Value, json};

/// Ordered log of `start:<task>` / `end:<task>` events.
pub type EventLog = Arc<Mutex<Vec<String>>>;

/// A fake task function that:
/// - records `start:<task>` / `end:<task>` events
/// - yields (and optionally sleeps) in between, so concurrent tasks interleave
/// - returns its self-template plus a `trail` field: the union of its
///   predecessors' trails and its own name
pub struct TrailTaskFn {
    events: EventLog,
    delay: Option<Duration>,
}

impl TrailTaskFn {
    pub fn new(events: EventLog) -> Self {
        Self {
            events,
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl TaskFunction for TrailTaskFn {
    fn call(&self, ctx: TaskContext) -> TaskFuture<'_> {
        Box::pin(async move {
            push(&self.events, format!("start:{}", ctx.task));

            tokio::task::yield_now().await;
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            let mut trail: Vec<Value> = Vec::new();
            for record in ctx.dependencies.values() {
                if let Some(Value::Array(items)) = record.get("trail") {
                    for item in items {
                        if !trail.contains(item) {
                            trail.push(item.clone());
                        }
                    }
                }
            }
            trail.push(json!(ctx.task));

            let mut partial = ctx.template.clone();
            partial.insert("trail".to_string(), Value::Array(trail));

            push(&self.events, format!("end:{}", ctx.task));
            Ok(ctx.output(partial))
        })
    }
}

/// Fails for the listed tasks, echoes the self-template for all others.
pub struct FailingTaskFn {
    failing: HashSet<String>,
    events: EventLog,
}

impl FailingTaskFn {
    pub fn new(failing: &[&str], events: EventLog) -> Self {
        Self {
            failing: failing.iter().map(|s| s.to_string()).collect(),
            events,
        }
    }
}

impl TaskFunction for FailingTaskFn {
    fn call(&self, ctx: TaskContext) -> TaskFuture<'_> {
        Box::pin(async move {
            push(&self.events, format!("start:{}", ctx.task));
            if self.failing.contains(&ctx.task) {
                return Err(anyhow!("backend unavailable for {}", ctx.task));
            }
            push(&self.events, format!("end:{}", ctx.task));
            Ok(ctx.output(ctx.template.clone()))
        })
    }
}

/// Always returns the same output, whatever the task.
pub struct StaticTaskFn {
    output: Record,
}

impl StaticTaskFn {
    pub fn new(output: Value) -> Self {
        Self {
            output: output.as_object().cloned().unwrap_or_default(),
        }
    }
}

impl TaskFunction for StaticTaskFn {
    fn call(&self, _ctx: TaskContext) -> TaskFuture<'_> {
        let output = self.output.clone();
        Box::pin(async move { Ok(output) })
    }
}

fn push(events: &EventLog, event: String) {
    events.lock().unwrap().push(event);
}

/// Position of `event` in the log; panics if absent.
pub fn position(events: &[String], event: &str) -> usize {
    events
        .iter()
        .position(|e| e == event)
        .unwrap_or_else(|| panic!("event {event} not recorded in {events:?}"))
}
