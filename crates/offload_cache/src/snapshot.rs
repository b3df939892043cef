//! File hash snapshots and change detection.

use offload_common::ContentHash;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Source of current file hashes, implemented by the host's file system.
pub trait FileHashes {
    /// The current hash of `path`, or `None` if it does not exist.
    fn content_hash(&self, path: &Path) -> Option<ContentHash>;
}

/// Result of comparing a module's declared dependencies with its snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Dependencies the snapshot has no hash for.
    pub new_files: Vec<PathBuf>,
    /// Dependencies whose hash differs from the snapshot.
    pub modified_files: Vec<PathBuf>,
    /// Dependencies that no longer exist.
    pub deleted_files: Vec<PathBuf>,
    /// Dependencies whose hash matches the snapshot.
    pub unchanged_files: Vec<PathBuf>,
}

impl ChangeSet {
    /// Classifies every path of `dependencies`.
    pub fn detect(
        dependencies: &BTreeSet<PathBuf>,
        snapshot: &BTreeMap<PathBuf, ContentHash>,
        fs: &impl FileHashes,
    ) -> Self {
        let mut changes = Self::default();
        for path in dependencies {
            let current = fs.content_hash(path);
            match (snapshot.get(path), current) {
                (_, None) => changes.deleted_files.push(path.clone()),
                (None, Some(_)) => changes.new_files.push(path.clone()),
                (Some(old), Some(new)) if *old == new => changes.unchanged_files.push(path.clone()),
                (Some(_), Some(_)) => changes.modified_files.push(path.clone()),
            }
        }
        changes
    }

    /// Returns `true` if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.new_files.is_empty() && self.modified_files.is_empty() && self.deleted_files.is_empty()
    }

    /// Number of dependencies that are new, modified or deleted.
    pub fn dirty_count(&self) -> usize {
        self.new_files.len() + self.modified_files.len() + self.deleted_files.len()
    }
}

/// Hashes every existing path of `dependencies`. Missing files are left out,
/// so they count as new on the next comparison.
pub fn take_snapshot(
    dependencies: &BTreeSet<PathBuf>,
    fs: &impl FileHashes,
) -> BTreeMap<PathBuf, ContentHash> {
    dependencies
        .iter()
        .filter_map(|path| fs.content_hash(path).map(|hash| (path.clone(), hash)))
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    pub(crate) struct FakeFs(pub(crate) HashMap<PathBuf, String>);

    impl FakeFs {
        pub(crate) fn write(&mut self, path: &str, text: &str) {
            self.0.insert(PathBuf::from(path), text.to_string());
        }
    }

    impl FileHashes for FakeFs {
        fn content_hash(&self, path: &Path) -> Option<ContentHash> {
            self.0.get(path).map(|t| ContentHash::of_str(t))
        }
    }

    fn deps(paths: &[&str]) -> BTreeSet<PathBuf> {
        paths.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn unchanged_files_are_clean() {
        let mut fs = FakeFs::default();
        fs.write("a.js", "a");
        let d = deps(&["a.js"]);
        let snap = take_snapshot(&d, &fs);
        let changes = ChangeSet::detect(&d, &snap, &fs);
        assert!(changes.is_empty());
        assert_eq!(changes.unchanged_files, vec![PathBuf::from("a.js")]);
    }

    #[test]
    fn classifies_each_kind_of_change() {
        let mut fs = FakeFs::default();
        fs.write("a.js", "a");
        fs.write("b.js", "b");
        fs.write("c.js", "c");
        let snap = take_snapshot(&deps(&["a.js", "b.js", "c.js"]), &fs);

        fs.write("a.js", "a2");
        fs.0.remove(Path::new("b.js"));
        fs.write("d.js", "d");

        let changes = ChangeSet::detect(&deps(&["a.js", "b.js", "c.js", "d.js"]), &snap, &fs);
        assert_eq!(changes.modified_files, vec![PathBuf::from("a.js")]);
        assert_eq!(changes.deleted_files, vec![PathBuf::from("b.js")]);
        assert_eq!(changes.unchanged_files, vec![PathBuf::from("c.js")]);
        assert_eq!(changes.new_files, vec![PathBuf::from("d.js")]);
        assert_eq!(changes.dirty_count(), 3);
    }

    #[test]
    fn missing_files_are_not_snapshotted() {
        let fs = FakeFs::default();
        assert!(take_snapshot(&deps(&["gone.js"]), &fs).is_empty());
    }
}
