//! Removing a partially generated project after an interrupt or a failed generation
//!
//! The registry is shared between the scaffold workflow and the signal handler.
//! Cleanup uses blocking `std::fs` so it can run on the handler thread.

use crate::error::{Error, Result};
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug)]
struct Armed {
    root: PathBuf,
    /// The root did not exist before generation started
    created_root: bool,
    /// Top-level entries present before generation started
    preexisting: HashSet<OsString>,
}

/// What a cleanup run removed and what it could not
#[derive(Debug, Default)]
pub struct CleanupOutcome {
    pub removed: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, io::Error)>,
}

#[derive(Debug, Clone, Default)]
pub struct CleanupRegistry {
    inner: Arc<Mutex<Option<Armed>>>,
}

impl CleanupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Armed>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record the state of `root` before anything is written to it
    pub fn arm(&self, root: &Path) -> Result<()> {
        let created_root = !root.exists();
        let preexisting = if created_root {
            HashSet::new()
        } else {
            fs::read_dir(root)
                .map_err(|e| Error::read(root, e))?
                .filter_map(|entry| entry.ok().map(|e| e.file_name()))
                .collect()
        };

        *self.lock() = Some(Armed {
            root: root.to_path_buf(),
            created_root,
            preexisting,
        });
        Ok(())
    }

    /// Generation finished; nothing to clean up any more
    pub fn disarm(&self) {
        self.lock().take();
    }

    pub fn is_armed(&self) -> bool {
        self.lock().is_some()
    }

    /// Undo generation. A root created by this run is removed entirely; for a
    /// root that already existed only the top-level entries added since
    /// [`arm`](Self::arm) are removed. Returns `None` when not armed.
    pub fn cleanup(&self) -> Option<CleanupOutcome> {
        let armed = self.lock().take()?;
        let mut outcome = CleanupOutcome::default();

        if armed.created_root {
            match fs::remove_dir_all(&armed.root) {
                Ok(()) => outcome.removed.push(armed.root),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => outcome.failures.push((armed.root, e)),
            }
            return Some(outcome);
        }

        let entries = match fs::read_dir(&armed.root) {
            Ok(entries) => entries,
            Err(e) => {
                outcome.failures.push((armed.root, e));
                return Some(outcome);
            }
        };

        for entry in entries.flatten() {
            if armed.preexisting.contains(&entry.file_name()) {
                continue;
            }
            let path = entry.path();
            let result = match entry.file_type() {
                Ok(t) if t.is_dir() => fs::remove_dir_all(&path),
                _ => fs::remove_file(&path),
            };
            match result {
                Ok(()) => outcome.removed.push(path),
                Err(e) => outcome.failures.push((path, e)),
            }
        }

        for (path, error) in &outcome.failures {
            tracing::warn!(path = %path.display(), %error, "cleanup failed");
        }
        Some(outcome)
    }
}
