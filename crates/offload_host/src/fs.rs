//! In-memory file system the host reads modules from.

use offload_cache::FileHashes;
use offload_common::ContentHash;
use offload_sourcemap::SourceMap;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A file and the map that came with it.
#[derive(Clone, Debug, PartialEq)]
pub struct FsFile {
    /// File contents.
    pub text: String,
    /// Map from `text` back to its authored source, for generated files.
    pub map: Option<SourceMap>,
    /// Hash of `text`.
    pub hash: ContentHash,
}

/// Files keyed by project-relative path.
#[derive(Clone, Debug, Default)]
pub struct MemoryFs {
    files: BTreeMap<PathBuf, FsFile>,
}

impl MemoryFs {
    /// Creates an empty file system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a file, dropping any map it had.
    pub fn write(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.insert(path.into(), text.into(), None);
    }

    /// Writes a generated file together with its map.
    pub fn write_with_map(&mut self, path: impl Into<PathBuf>, text: impl Into<String>, map: SourceMap) {
        self.insert(path.into(), text.into(), Some(map));
    }

    fn insert(&mut self, path: PathBuf, text: String, map: Option<SourceMap>) {
        let hash = ContentHash::of_str(&text);
        self.files.insert(path, FsFile { text, map, hash });
    }

    /// Reads a file.
    pub fn read(&self, path: &Path) -> Option<&FsFile> {
        self.files.get(path)
    }

    /// Deletes a file.
    pub fn remove(&mut self, path: &Path) -> Option<FsFile> {
        self.files.remove(path)
    }

    /// Whether `path` exists.
    pub fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    /// All paths, sorted.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }
}

impl FileHashes for MemoryFs {
    fn content_hash(&self, path: &Path) -> Option<ContentHash> {
        self.files.get(path).map(|f| f.hash)
    }
}
