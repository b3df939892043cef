//! The module cache.

use crate::error::CacheError;
use crate::manifest::CacheManifest;
use crate::module::CachedModule;
use crate::snapshot::FileHashes;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Built modules keyed by compilation namespace, then raw request.
///
/// Namespaces keep the primary and worker compilations from sharing entries
/// even when they build the same request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleCache {
    namespaces: BTreeMap<String, BTreeMap<String, CachedModule>>,
}

impl ModuleCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `raw_request` if it is still valid.
    pub fn lookup(
        &self,
        namespace: &str,
        raw_request: &str,
        fs: &impl FileHashes,
    ) -> Option<&CachedModule> {
        let module = self.get(namespace, raw_request)?;
        let changes = module.changes(fs);
        if changes.is_empty() {
            tracing::debug!(namespace, request = raw_request, "module cache hit");
            Some(module)
        } else {
            tracing::debug!(
                namespace,
                request = raw_request,
                new = changes.new_files.len(),
                modified = changes.modified_files.len(),
                deleted = changes.deleted_files.len(),
                "module cache entry is stale"
            );
            None
        }
    }

    /// Returns the entry for `raw_request` regardless of validity.
    pub fn get(&self, namespace: &str, raw_request: &str) -> Option<&CachedModule> {
        self.namespaces.get(namespace)?.get(raw_request)
    }

    /// Stores a freshly built module, replacing any previous entry.
    pub fn insert(&mut self, namespace: &str, module: CachedModule) {
        self.namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(module.raw_request.clone(), module);
    }

    /// Adds file dependencies to an existing entry without snapshotting them.
    ///
    /// The next lookup treats them as new files and reports the entry stale.
    /// Returns `false` if there is no such entry.
    pub fn merge_dependencies(
        &mut self,
        namespace: &str,
        raw_request: &str,
        dependencies: impl IntoIterator<Item = PathBuf>,
    ) -> bool {
        let Some(module) = self
            .namespaces
            .get_mut(namespace)
            .and_then(|n| n.get_mut(raw_request))
        else {
            return false;
        };
        module.file_dependencies.extend(dependencies);
        true
    }

    /// Drops the entry for `raw_request`.
    pub fn remove(&mut self, namespace: &str, raw_request: &str) -> Option<CachedModule> {
        self.namespaces.get_mut(namespace)?.remove(raw_request)
    }

    /// Number of cached modules across namespaces.
    pub fn len(&self) -> usize {
        self.namespaces.values().map(BTreeMap::len).sum()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes the cache to `cache_dir` as a manifest.
    pub fn save(&self, cache_dir: &Path) -> Result<(), CacheError> {
        CacheManifest::from_cache(self).save(cache_dir)
    }

    /// Restores the cache from `cache_dir`.
    ///
    /// Fail-safe: a missing, corrupt or incompatible manifest yields an
    /// empty cache.
    pub fn load_or_default(cache_dir: &Path) -> Self {
        match CacheManifest::load(cache_dir) {
            Ok(manifest) => manifest.into_cache(),
            Err(e) => {
                tracing::debug!(error = %e, "starting with an empty module cache");
                Self::new()
            }
        }
    }

    pub(crate) fn from_namespaces(
        namespaces: BTreeMap<String, BTreeMap<String, CachedModule>>,
    ) -> Self {
        Self { namespaces }
    }

    pub(crate) fn namespaces(&self) -> &BTreeMap<String, BTreeMap<String, CachedModule>> {
        &self.namespaces
    }
}
