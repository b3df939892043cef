//! On-disk form of the module cache.
//!
//! The manifest is stored as `manifest.json` in the cache directory and
//! records the version that wrote it; manifests from other versions are
//! rejected.

use crate::cache::ModuleCache;
use crate::error::CacheError;
use crate::module::CachedModule;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Name of the manifest file within the cache directory.
const MANIFEST_FILE: &str = "manifest.json";

/// Version written into new manifests.
pub const CACHE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Serialized module cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheManifest {
    /// Version that produced this manifest.
    pub version: String,
    /// Cached modules by namespace, then raw request.
    pub namespaces: BTreeMap<String, BTreeMap<String, CachedModule>>,
}

impl CacheManifest {
    /// Captures the contents of `cache`.
    pub fn from_cache(cache: &ModuleCache) -> Self {
        Self {
            version: CACHE_VERSION.to_string(),
            namespaces: cache.namespaces().clone(),
        }
    }

    /// Turns the manifest back into a cache.
    pub fn into_cache(self) -> ModuleCache {
        ModuleCache::from_namespaces(self.namespaces)
    }

    /// Returns `true` if this manifest was written by a compatible version.
    pub fn is_compatible(&self, current_version: &str) -> bool {
        self.version == current_version
    }

    /// Reads and checks the manifest in `cache_dir`.
    pub fn load(cache_dir: &Path) -> Result<Self, CacheError> {
        let path = cache_dir.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&path).map_err(|e| CacheError::Io {
            path: path.clone(),
            source: e,
        })?;
        let manifest: Self = serde_json::from_str(&content).map_err(|e| CacheError::ManifestParse {
            reason: e.to_string(),
        })?;
        if !manifest.is_compatible(CACHE_VERSION) {
            return Err(CacheError::VersionMismatch {
                path,
                expected: CACHE_VERSION.to_string(),
                actual: manifest.version,
            });
        }
        Ok(manifest)
    }

    /// Saves the manifest to `cache_dir`, creating the directory if needed.
    pub fn save(&self, cache_dir: &Path) -> Result<(), CacheError> {
        std::fs::create_dir_all(cache_dir).map_err(|e| CacheError::Io {
            path: cache_dir.to_path_buf(),
            source: e,
        })?;
        let path = cache_dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;
        std::fs::write(&path, json).map_err(|e| CacheError::Io { path, source: e })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_manifest_has_current_version() {
        let m = CacheManifest::from_cache(&ModuleCache::new());
        assert_eq!(m.version, CACHE_VERSION);
        assert!(m.namespaces.is_empty());
    }

    #[test]
    fn load_nonexistent_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            CacheManifest::load(dir.path()),
            Err(CacheError::Io { .. })
        ));
    }

    #[test]
    fn load_corrupt_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), "not valid json {{{").unwrap();
        assert!(matches!(
            CacheManifest::load(dir.path()),
            Err(CacheError::ManifestParse { .. })
        ));
    }

    #[test]
    fn load_other_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = CacheManifest {
            version: "0.0.0-old".to_string(),
            namespaces: BTreeMap::new(),
        };
        manifest.save(dir.path()).unwrap();
        assert!(matches!(
            CacheManifest::load(dir.path()),
            Err(CacheError::VersionMismatch { .. })
        ));
        assert!(ModuleCache::load_or_default(dir.path()).is_empty());
    }

    #[test]
    fn save_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("deeply").join("nested").join("cache");
        CacheManifest::from_cache(&ModuleCache::new())
            .save(&nested)
            .unwrap();
        assert!(nested.join(MANIFEST_FILE).exists());
    }
}
