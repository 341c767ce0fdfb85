// src/snapshot.rs

//! Durable before/after snapshots of the TaskRecord Store.
//!
//! Each snapshot is a pretty-printed JSON document at `<dir>/<label>.json`,
//! so a caller can diff what every task contributed to a run.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::store::TaskStore;

/// Label of the pre-run snapshot unless configured otherwise.
pub const DEFAULT_BEFORE_LABEL: &str = "query_before";
/// Label of the post-run snapshot unless configured otherwise.
pub const DEFAULT_AFTER_LABEL: &str = "query_after";

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
    before_label: String,
    after_label: String,
    fs: Arc<dyn FileSystem>,
}

impl SnapshotStore {
    /// Snapshots under `dir` on the real filesystem, with default labels.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_fs(dir, Arc::new(RealFileSystem))
    }

    pub fn with_fs(dir: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            dir: dir.into(),
            before_label: DEFAULT_BEFORE_LABEL.to_string(),
            after_label: DEFAULT_AFTER_LABEL.to_string(),
            fs,
        }
    }

    pub fn with_labels(mut self, before: impl Into<String>, after: impl Into<String>) -> Self {
        self.before_label = before.into();
        self.after_label = after.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, label: &str) -> PathBuf {
        self.dir.join(format!("{label}.json"))
    }

    /// Write one labelled snapshot and return its path.
    pub fn write(&self, label: &str, store: &TaskStore) -> Result<PathBuf> {
        let path = self.path_for(label);
        let body = store.to_pretty_json()?;
        self.fs.write(&path, body.as_bytes())?;
        debug!(path = %path.display(), tasks = store.len(), "snapshot written");
        Ok(path)
    }

    /// Read a labelled snapshot back.
    pub fn read(&self, label: &str) -> Result<TaskStore> {
        let contents = self.fs.read_to_string(&self.path_for(label))?;
        TaskStore::from_json_str(&contents)
    }

    /// Write the pre-run and post-run snapshots.
    pub fn write_pair(&self, before: &TaskStore, after: &TaskStore) -> Result<(PathBuf, PathBuf)> {
        let b = self.write(&self.before_label, before)?;
        let a = self.write(&self.after_label, after)?;
        Ok((b, a))
    }

    pub fn read_before(&self) -> Result<TaskStore> {
        self.read(&self.before_label)
    }

    pub fn read_after(&self) -> Result<TaskStore> {
        self.read(&self.after_label)
    }
}
