//! Directory existence cache for the auto-fallback pattern.
//!
//! # Design Decisions
//! - Keyed by the fully composed (pre-fallback) directory path
//! - Entries are never invalidated; a path's existence is fixed for the
//!   lifetime of the owning resolver
//! - Read lock for the lookup only, no lock held while probing the
//!   filesystem, write lock for the insert only
//! - Two concurrent misses on the same key may both probe; the results are
//!   identical so the last write wins harmlessly

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use crate::observability::metrics;

/// Filesystem existence check used by [`ExistenceCache`].
pub trait DirProbe: Send + Sync + std::fmt::Debug {
    /// Returns true if `path` exists. Errors of any kind count as absent.
    fn exists(&self, path: &Path) -> bool;
}

/// Probes the real filesystem with a `stat`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl DirProbe for FsProbe {
    fn exists(&self, path: &Path) -> bool {
        std::fs::metadata(path).is_ok()
    }
}

/// A thread-safe memo of directory existence.
#[derive(Debug)]
pub struct ExistenceCache {
    entries: RwLock<HashMap<PathBuf, bool>>,
    probe: Box<dyn DirProbe>,
}

impl ExistenceCache {
    /// Create an empty cache backed by the real filesystem.
    pub fn new() -> Self {
        Self::with_probe(FsProbe)
    }

    /// Create an empty cache backed by a custom probe.
    pub fn with_probe(probe: impl DirProbe + 'static) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            probe: Box::new(probe),
        }
    }

    /// Returns whether `path` exists, probing the filesystem only on the
    /// first lookup of a key.
    pub fn exists(&self, path: &Path) -> bool {
        // Poisoning can only interrupt an insert of an idempotent bool.
        let cached = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .copied();

        if let Some(exists) = cached {
            tracing::trace!(path = %path.display(), exists, "Existence cache hit");
            metrics::record_cache_lookup(true);
            return exists;
        }

        let exists = self.probe.exists(path);
        metrics::record_cache_lookup(false);

        let len = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            entries.insert(path.to_path_buf(), exists);
            entries.len()
        };
        metrics::record_cache_size(len);

        tracing::debug!(path = %path.display(), exists, "Existence cache populated");
        exists
    }

    /// Cached result for `path`, without probing.
    pub fn get(&self, path: &Path) -> Option<bool> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .copied()
    }

    /// Number of memoized paths.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ExistenceCache {
    fn default() -> Self {
        Self::new()
    }
}
