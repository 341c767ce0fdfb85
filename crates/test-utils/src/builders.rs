#![allow(dead_code)]

use std::path::PathBuf;

use querydag::config::{CommandSection, ConfigFile, RawConfigFile, TaskOverride};
use querydag::errors::Result;
use querydag::store::TaskStore;
use querydag::types::{Record, TaskFnKind, UNLOCKS_KEY};
use serde_json::{Value, json};

/// Builder for `TaskStore` to simplify test setup.
pub struct TaskStoreBuilder {
    store: TaskStore,
}

impl TaskStoreBuilder {
    pub fn new() -> Self {
        Self {
            store: TaskStore::new(),
        }
    }

    /// Declare `name` with the given unlock list and no other fields.
    pub fn task(self, name: &str, unlocks: &[&str]) -> Self {
        self.task_with(name, unlocks, json!({}))
    }

    /// Declare `name` with the given unlock list plus the fields of `extra`
    /// (which must be a JSON object).
    pub fn task_with(mut self, name: &str, unlocks: &[&str], extra: Value) -> Self {
        let mut record: Record = extra.as_object().cloned().unwrap_or_default();
        record.insert(UNLOCKS_KEY.to_string(), json!(unlocks));
        self.store.insert(name, record);
        self
    }

    pub fn build(self) -> TaskStore {
        self.store
    }
}

impl Default for TaskStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The four-task diamond: A unlocks B and C, both unlock D.
pub fn diamond() -> TaskStore {
    TaskStoreBuilder::new()
        .task("A", &["B", "C"])
        .task("B", &["D"])
        .task("C", &["D"])
        .task("D", &[])
        .build()
}

/// Builder for `ConfigFile`.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn task_fn(mut self, kind: TaskFnKind) -> Self {
        self.config.workflow.task_fn = kind;
        self
    }

    pub fn command(mut self, cmd: &str) -> Self {
        self.config.workflow.command = Some(CommandSection {
            cmd: cmd.to_string(),
            timeout_secs: None,
        });
        self
    }

    pub fn template(mut self, path: &str) -> Self {
        self.config.workflow.template = Some(PathBuf::from(path));
        self
    }

    pub fn override_task(mut self, name: &str, kind: TaskFnKind) -> Self {
        self.config.task.insert(
            name.to_string(),
            TaskOverride {
                task_fn: Some(kind),
            },
        );
        self
    }

    pub fn decompose(mut self, cmd: &str) -> Self {
        self.config.decompose = Some(CommandSection {
            cmd: cmd.to_string(),
            timeout_secs: None,
        });
        self
    }

    pub fn snapshots(mut self, enabled: bool) -> Self {
        self.config.snapshots.enabled = enabled;
        self
    }

    pub fn snapshot_labels(mut self, before: &str, after: &str) -> Self {
        self.config.snapshots.before = before.to_string();
        self.config.snapshots.after = after.to_string();
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn try_build(self) -> Result<ConfigFile> {
        ConfigFile::try_from(self.config)
    }

    pub fn build(self) -> ConfigFile {
        self.try_build()
            .expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
