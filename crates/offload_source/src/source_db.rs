//! Central store of module texts parsed during a build session.

use crate::file_id::FileId;
use crate::resolved_span::ResolvedSpan;
use crate::source_file::SourceFile;
use crate::span::Span;
use std::path::{Path, PathBuf};

/// Owns every module text parsed in a build session.
///
/// The database is append-only: a module rebuilt after an edit gets a fresh
/// [`FileId`], so syntax nodes kept by the function registry from an earlier
/// generation still resolve against the text they were parsed from. Rebuilds
/// of unchanged text go through [`SourceDb::load_source`] and reuse the
/// existing entry, so the database grows with edits rather than rebuilds.
pub struct SourceDb {
    files: Vec<SourceFile>,
}

impl SourceDb {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Adds a module text and returns its [`FileId`].
    pub fn add_source(&mut self, name: impl Into<PathBuf>, content: String) -> FileId {
        let id = FileId::from_raw(self.files.len() as u32);
        self.files.push(SourceFile::new(id, name.into(), content));
        id
    }

    /// Returns the latest [`FileId`] for `name` if its text equals `content`,
    /// otherwise adds `content` as a new text.
    pub fn load_source(&mut self, name: impl Into<PathBuf>, content: String) -> FileId {
        let name = name.into();
        if let Some(id) = self.latest_for_path(&name) {
            if self.get_file(id).content == content {
                return id;
            }
        }
        self.add_source(name, content)
    }

    /// Returns the [`SourceFile`] for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this database.
    pub fn get_file(&self, id: FileId) -> &SourceFile {
        &self.files[id.as_raw() as usize]
    }

    /// Returns the [`SourceFile`] for `id`, or `None` for dummy or foreign IDs.
    pub fn get(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.as_raw() as usize)
    }

    /// Returns the most recently added text for `path`.
    pub fn latest_for_path(&self, path: &Path) -> Option<FileId> {
        self.files.iter().rev().find(|f| f.path == path).map(|f| f.id)
    }

    /// Number of texts held.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` when no text has been added.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Resolves a [`Span`] to 1-indexed line/column coordinates.
    pub fn resolve_span(&self, span: Span) -> ResolvedSpan {
        let file = self.get_file(span.file);
        let (start_line, start_col) = file.line_col(span.start);
        let (end_line, end_col) = file.line_col(span.end.saturating_sub(1).max(span.start));
        ResolvedSpan {
            file_path: file.path.clone(),
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Returns the text covered by a [`Span`].
    pub fn snippet(&self, span: Span) -> &str {
        self.get_file(span.file).snippet(span.start, span.end)
    }
}

impl Default for SourceDb {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_get() {
        let mut db = SourceDb::new();
        let id = db.add_source("a.js", "run();".to_string());
        assert_eq!(db.get_file(id).content, "run();");
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn get_rejects_dummy() {
        let mut db = SourceDb::new();
        db.add_source("a.js", String::new());
        assert!(db.get(FileId::DUMMY).is_none());
    }

    #[test]
    fn latest_for_path_prefers_newest_text() {
        let mut db = SourceDb::new();
        let first = db.add_source("m.js", "a();".to_string());
        db.add_source("other.js", "b();".to_string());
        let second = db.add_source("m.js", "c();".to_string());
        assert_ne!(first, second);
        assert_eq!(db.latest_for_path(Path::new("m.js")), Some(second));
        assert_eq!(db.latest_for_path(Path::new("missing.js")), None);
    }

    #[test]
    fn load_source_reuses_unchanged_text() {
        let mut db = SourceDb::new();
        let first = db.load_source("m.js", "a();".to_string());
        assert_eq!(db.load_source("m.js", "a();".to_string()), first);
        assert_eq!(db.len(), 1);

        let edited = db.load_source("m.js", "b();".to_string());
        assert_ne!(edited, first);
        assert_eq!(db.get_file(first).content, "a();");
        // Only the latest text of a path is reused.
        assert_ne!(db.load_source("m.js", "a();".to_string()), first);
        assert_eq!(db.len(), 3);
    }

    #[test]
    fn resolve_span() {
        let mut db = SourceDb::new();
        let id = db.add_source("f.js", "a;\nfoo(x);".to_string());
        let resolved = db.resolve_span(Span::new(id, 3, 6));
        assert_eq!(resolved.file_path, PathBuf::from("f.js"));
        assert_eq!((resolved.start_line, resolved.start_col), (2, 1));
        assert_eq!((resolved.end_line, resolved.end_col), (2, 3));
    }

    #[test]
    fn snippet() {
        let mut db = SourceDb::new();
        let id = db.add_source("f.js", "value * 2".to_string());
        assert_eq!(db.snippet(Span::new(id, 0, 5)), "value");
    }
}
