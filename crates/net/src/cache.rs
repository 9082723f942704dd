//! Cache root configuration
//!
//! The cache root is an explicit value threaded through strategy resolution
//! and the orchestrator - there is no process-wide mutable cache path.
//! Storage layout and eviction inside the root belong to the cache layer;
//! this type only answers "where does this artifact's cached state live".

use capstan_types::ArtifactId;
use std::path::{Path, PathBuf};

/// Explicit cache-root provider for downloaded artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLayout {
    root: PathBuf,
}

impl CacheLayout {
    /// Cache layout rooted at an explicit directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The conventional per-user cache root (`<user cache dir>/capstan`),
    /// falling back to a path under the temp dir when the platform reports
    /// no cache directory.
    #[must_use]
    pub fn default_root() -> Self {
        let base = dirs::cache_dir().unwrap_or_else(std::env::temp_dir);
        Self::new(base.join("capstan"))
    }

    /// The cache root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding cached state for one artifact identity.
    ///
    /// Keyed by token and version so two versions of the same package never
    /// contend on a path.
    #[must_use]
    pub fn artifact_dir(&self, id: &ArtifactId) -> PathBuf {
        self.root.join(&id.token).join(&id.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_dir_is_keyed_by_identity() {
        let cache = CacheLayout::new("/var/cache/capstan");
        let a = cache.artifact_dir(&ArtifactId::new("wget", "1.24.5"));
        let b = cache.artifact_dir(&ArtifactId::new("wget", "1.25.0"));

        assert_eq!(a, PathBuf::from("/var/cache/capstan/wget/1.24.5"));
        assert_ne!(a, b);
    }

    #[test]
    fn default_root_ends_with_crate_dir() {
        let cache = CacheLayout::default_root();
        assert!(cache.root().ends_with("capstan"));
    }
}
