// src/fs/mod.rs

//! Storage backend for snapshot documents.
//!
//! [`SnapshotStore`](crate::snapshot::SnapshotStore) only needs to read and
//! replace whole documents, so that is all this trait offers. Tests swap in
//! [`mock::MockFileSystem`].

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub mod mock;

pub trait FileSystem: Send + Sync + Debug {
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Replace the document at `path` with `contents`. Missing parent
    /// directories are created.
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;

    fn exists(&self, path: &Path) -> bool;
}

/// `std::fs` backed storage.
///
/// Writes go to a sibling `*.tmp` file that is then renamed over the target,
/// so a reader never sees a half-written snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("reading snapshot {}", path.display()))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating snapshot dir {}", dir.display()))?;
        }

        let staging = staging_path(path);
        fs::write(&staging, contents)
            .with_context(|| format!("writing {}", staging.display()))?;
        fs::rename(&staging, path).with_context(|| {
            format!("moving {} into place at {}", staging.display(), path.display())
        })
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
