//! External content store
//!
//! File nodes hold a path into some external store and query it for
//! existence and size. The tree never reads or caches the bytes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Port to the store holding file content.
pub trait ContentStore: std::fmt::Debug {
    /// Canonical form of `path` if it references existing content.
    fn resolve(&self, path: &Path) -> Option<PathBuf>;

    /// Current size of the referenced content, `None` when it is gone.
    fn size(&self, path: &Path) -> Option<u64>;
}

/// The local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

impl ContentStore for LocalStore {
    fn resolve(&self, path: &Path) -> Option<PathBuf> {
        dunce::canonicalize(path)
            .ok()
            .filter(|canonical| canonical.is_file())
    }

    /// Regular files only; a directory has no content size.
    fn size(&self, path: &Path) -> Option<u64> {
        std::fs::metadata(path)
            .ok()
            .filter(|meta| meta.is_file())
            .map(|meta| meta.len())
    }
}

/// In-memory store mapping paths to sizes. Used by the comparison harness
/// so generated datasets never touch disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: HashMap<PathBuf, u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, size: u64) -> Self {
        self.insert(path, size);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, size: u64) {
        self.files.insert(path.into(), size);
    }

    pub fn remove(&mut self, path: &Path) -> bool {
        self.files.remove(path).is_some()
    }
}

impl ContentStore for MemoryStore {
    fn resolve(&self, path: &Path) -> Option<PathBuf> {
        self.files.contains_key(path).then(|| path.to_path_buf())
    }

    fn size(&self, path: &Path) -> Option<u64> {
        self.files.get(path).copied()
    }
}
