// src/fs/mock.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Result, anyhow};

use super::FileSystem;

/// In-memory [`FileSystem`].
///
/// Clones share one document map, so a test can hand a clone to a
/// `SnapshotStore` and inspect what it wrote through the original.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    docs: Arc<Mutex<BTreeMap<PathBuf, Vec<u8>>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a document.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.docs().insert(path.as_ref().to_path_buf(), content.into());
    }

    /// Every stored path, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.docs().keys().cloned().collect()
    }

    fn docs(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Vec<u8>>> {
        self.docs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let bytes = self
            .docs()
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("no document at {}", path.display()))?;
        String::from_utf8(bytes).map_err(|e| anyhow!("{} is not UTF-8: {e}", path.display()))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.add_file(path, contents);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.docs().contains_key(path)
    }
}
