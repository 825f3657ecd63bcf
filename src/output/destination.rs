//! Captured-output destination
//!
//! Storage for the optional destination file and the policy deciding when
//! the batch writes captured lines there itself.

#![allow(dead_code)]

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Key/value persistence for the destination file
pub trait OutputStore {
    fn exists(&self, path: &Path) -> bool;

    fn remove(&self, path: &Path) -> Result<()>;

    fn write(&self, path: &Path, contents: &str) -> Result<()>;
}

/// Filesystem-backed store
#[derive(Clone, Copy, Debug, Default)]
pub struct FsStore;

impl OutputStore for FsStore {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn remove(&self, path: &Path) -> Result<()> {
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to delete {}", path.display()))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// In-memory store, shared between clones
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    files: Arc<Mutex<HashMap<PathBuf, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<String> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }
}

impl OutputStore for MemoryStore {
    fn exists(&self, path: &Path) -> bool {
        self.get(path).is_some()
    }

    fn remove(&self, path: &Path) -> Result<()> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path)
            .map(|_| ())
            .with_context(|| format!("No such file: {}", path.display()))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }
}

/// What happened to the captured lines after a batch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Persisted {
    /// Lines were written as a fallback
    Written,
    /// A reporter wrote the destination itself
    Skipped,
    /// The fallback write failed and was logged
    Failed,
}

/// Destination handling around a batch run
pub struct CapturePolicy;

impl CapturePolicy {
    /// Remove a stale destination before the batch starts
    pub fn prepare(store: &dyn OutputStore, dest: &Path) {
        if !store.exists(dest) {
            return;
        }
        match store.remove(dest) {
            Ok(()) => debug!("Removed previous output {}", dest.display()),
            Err(e) => warn!("Could not remove previous output: {:#}", e),
        }
    }

    /// Write captured lines unless something already produced the file
    pub fn persist(store: &dyn OutputStore, dest: &Path, lines: &[String]) -> Persisted {
        if store.exists(dest) {
            debug!(
                "Reporter wrote {} directly, discarding {} captured lines",
                dest.display(),
                lines.len()
            );
            return Persisted::Skipped;
        }

        match store.write(dest, &lines.join("\n")) {
            Ok(()) => {
                info!("Wrote captured output to {}", dest.display());
                Persisted::Written
            }
            Err(e) => {
                warn!("Could not write captured output: {:#}", e);
                Persisted::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_prepare_removes_existing() {
        let store = MemoryStore::new();
        let dest = Path::new("report.xml");
        store.write(dest, "stale").unwrap();

        CapturePolicy::prepare(&store, dest);
        assert!(!store.exists(dest));
    }

    #[test]
    fn test_prepare_without_existing_is_noop() {
        let store = MemoryStore::new();
        CapturePolicy::prepare(&store, Path::new("missing.xml"));
        assert!(!store.exists(Path::new("missing.xml")));
    }

    #[test]
    fn test_persist_writes_joined_lines() {
        let store = MemoryStore::new();
        let dest = Path::new("out.txt");

        let result = CapturePolicy::persist(&store, dest, &lines(&["a", "b", "c"]));
        assert_eq!(result, Persisted::Written);
        assert_eq!(store.get(dest).as_deref(), Some("a\nb\nc"));
    }

    #[test]
    fn test_persist_skips_when_reporter_wrote() {
        let store = MemoryStore::new();
        let dest = Path::new("out.xml");
        store.write(dest, "<testsuite/>").unwrap();

        let result = CapturePolicy::persist(&store, dest, &lines(&["ignored"]));
        assert_eq!(result, Persisted::Skipped);
        assert_eq!(store.get(dest).as_deref(), Some("<testsuite/>"));
    }

    #[test]
    fn test_fs_store_round_trip() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("nested").join("out.txt");
        let store = FsStore;

        assert!(!store.exists(&dest));
        store.write(&dest, "line").unwrap();
        assert!(store.exists(&dest));
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "line");

        store.remove(&dest).unwrap();
        assert!(!store.exists(&dest));
    }

    #[test]
    fn test_persist_failure_is_reported_not_raised() {
        let dir = tempdir().unwrap();
        // A directory at the destination makes the write fail
        let dest = dir.path().join("taken");
        std::fs::create_dir(&dest).unwrap();

        let result = CapturePolicy::persist(&FsStore, &dest, &lines(&["x"]));
        assert_eq!(result, Persisted::Failed);
    }
}
