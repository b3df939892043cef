//! Cached module entries.

use crate::snapshot::{take_snapshot, ChangeSet, FileHashes};
use offload_common::ContentHash;
use offload_sourcemap::SourceMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// The emitted code of a module and its map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModuleArtifact {
    /// Generated code.
    pub code: String,
    /// Map from `code` back to the authored sources.
    pub map: Option<SourceMap>,
}

/// A built module as stored in the cache.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CachedModule {
    /// Resource path of the module.
    pub resource: PathBuf,
    /// The request the module was built from; the cache key.
    pub raw_request: String,
    /// Files the module depends on.
    pub file_dependencies: BTreeSet<PathBuf>,
    /// Requests of modules this module imports.
    pub dependencies: Vec<String>,
    /// Hashes of the file dependencies as of the last build.
    pub snapshot: BTreeMap<PathBuf, ContentHash>,
    /// Build output.
    pub artifact: ModuleArtifact,
}

impl CachedModule {
    /// Creates an entry, snapshotting `file_dependencies` from `fs`.
    pub fn new(
        resource: PathBuf,
        raw_request: String,
        file_dependencies: BTreeSet<PathBuf>,
        dependencies: Vec<String>,
        artifact: ModuleArtifact,
        fs: &impl FileHashes,
    ) -> Self {
        let snapshot = take_snapshot(&file_dependencies, fs);
        Self {
            resource,
            raw_request,
            file_dependencies,
            dependencies,
            snapshot,
            artifact,
        }
    }

    /// Compares the declared dependencies with the snapshot.
    pub fn changes(&self, fs: &impl FileHashes) -> ChangeSet {
        ChangeSet::detect(&self.file_dependencies, &self.snapshot, fs)
    }

    /// Whether the entry can be reused.
    pub fn is_valid(&self, fs: &impl FileHashes) -> bool {
        self.changes(fs).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::tests::FakeFs;

    fn artifact() -> ModuleArtifact {
        ModuleArtifact {
            code: "f();".to_string(),
            map: None,
        }
    }

    #[test]
    fn valid_until_dependency_changes() {
        let mut fs = FakeFs::default();
        fs.write("src/a.js", "f();");
        let module = CachedModule::new(
            PathBuf::from("src/a.js"),
            "src/a.js".to_string(),
            [PathBuf::from("src/a.js")].into(),
            Vec::new(),
            artifact(),
            &fs,
        );
        assert!(module.is_valid(&fs));
        fs.write("src/a.js", "g();");
        assert!(!module.is_valid(&fs));
    }

    #[test]
    fn dependency_added_after_snapshot_invalidates() {
        let mut fs = FakeFs::default();
        fs.write("w.js", "w");
        fs.write("m.js", "m");
        let mut module = CachedModule::new(
            PathBuf::from("w.js"),
            "w.js".to_string(),
            [PathBuf::from("w.js")].into(),
            Vec::new(),
            artifact(),
            &fs,
        );
        module.file_dependencies.insert(PathBuf::from("m.js"));
        assert_eq!(module.changes(&fs).new_files, vec![PathBuf::from("m.js")]);
    }
}
