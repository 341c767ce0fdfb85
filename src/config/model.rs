// src/config/model.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::snapshot::{DEFAULT_AFTER_LABEL, DEFAULT_BEFORE_LABEL, SnapshotStore};
use crate::types::TaskFnKind;

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [workflow]
/// task_fn = "command"
/// template = "templates/workflow.json"
///
/// [workflow.command]
/// cmd = "ollama run deepseek-r1:7b"
/// timeout_secs = 120
///
/// [task.combined_query]
/// task_fn = "echo"
///
/// [decompose]
/// cmd = "./decompose.sh"
///
/// [snapshots]
/// dir = ".querydag"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub workflow: WorkflowSection,

    /// Per-task overrides from `[task.<name>]`.
    #[serde(default)]
    pub task: BTreeMap<String, TaskOverride>,

    #[serde(default)]
    pub decompose: Option<CommandSection>,

    #[serde(default)]
    pub snapshots: SnapshotSection,
}

/// Validated configuration. Only obtainable through
/// `ConfigFile::try_from(RawConfigFile)` (or [`ConfigFile::default`]).
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub workflow: WorkflowSection,
    pub task: BTreeMap<String, TaskOverride>,
    pub decompose: Option<CommandSection>,
    pub snapshots: SnapshotSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            workflow: raw.workflow,
            task: raw.task,
            decompose: raw.decompose,
            snapshots: raw.snapshots,
        }
    }
}

/// `[workflow]` section: which task function runs the sub-tasks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkflowSection {
    /// `"echo"` (default) or `"command"`.
    #[serde(default)]
    pub task_fn: TaskFnKind,

    /// Optional prompt template (JSON) for command-backed tasks, relative to
    /// the config file's directory.
    #[serde(default)]
    pub template: Option<PathBuf>,

    /// `[workflow.command]`, required when any task uses `"command"`.
    #[serde(default)]
    pub command: Option<CommandSection>,
}

/// An external command plus an optional time limit.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandSection {
    pub cmd: String,

    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl CommandSection {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskOverride {
    /// Task function for this task only; falls back to `[workflow].task_fn`.
    #[serde(default)]
    pub task_fn: Option<TaskFnKind>,
}

/// `[snapshots]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotSection {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Directory for snapshot documents, relative to the working directory.
    #[serde(default = "default_snapshot_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_before_label")]
    pub before: String,

    #[serde(default = "default_after_label")]
    pub after: String,
}

fn default_true() -> bool {
    true
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from(".querydag")
}

fn default_before_label() -> String {
    DEFAULT_BEFORE_LABEL.to_string()
}

fn default_after_label() -> String {
    DEFAULT_AFTER_LABEL.to_string()
}

impl Default for SnapshotSection {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            dir: default_snapshot_dir(),
            before: default_before_label(),
            after: default_after_label(),
        }
    }
}

impl SnapshotSection {
    /// Snapshot store described by this section, or `None` if disabled.
    pub fn store(&self) -> Option<SnapshotStore> {
        self.enabled.then(|| {
            SnapshotStore::new(self.dir.clone()).with_labels(self.before.clone(), self.after.clone())
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
