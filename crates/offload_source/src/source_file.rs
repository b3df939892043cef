//! A module text with a line-start index.

use crate::file_id::FileId;
use offload_common::ContentHash;
use std::path::PathBuf;

/// A module text loaded into the build session.
pub struct SourceFile {
    /// Identifier within the [`SourceDb`](crate::SourceDb).
    pub id: FileId,
    /// Resource path of the module this text was read for.
    pub path: PathBuf,
    /// The full text.
    pub content: String,
    /// Byte offsets of each line start; the first entry is always 0.
    line_starts: Vec<u32>,
    /// Hash of `content`.
    pub content_hash: ContentHash,
}

impl SourceFile {
    /// Creates a `SourceFile`, indexing line starts and hashing the content.
    pub fn new(id: FileId, path: PathBuf, content: String) -> Self {
        let line_starts = compute_line_starts(&content);
        let content_hash = ContentHash::of_str(&content);
        Self {
            id,
            path,
            content,
            line_starts,
            content_hash,
        }
    }

    fn line_index(&self, byte_offset: u32) -> usize {
        match self.line_starts.binary_search(&byte_offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        }
    }

    /// Converts a byte offset into 1-indexed (line, column) for diagnostics.
    pub fn line_col(&self, byte_offset: u32) -> (u32, u32) {
        let line_idx = self.line_index(byte_offset);
        let col = byte_offset - self.line_starts[line_idx] + 1;
        (line_idx as u32 + 1, col)
    }

    /// Converts a byte offset into a source-map position: 1-based line and
    /// 0-based column counted in UTF-16 code units.
    pub fn position(&self, byte_offset: u32) -> (u32, u32) {
        let offset = (byte_offset as usize).min(self.content.len());
        let line_idx = self.line_index(offset as u32);
        let line_start = self.line_starts[line_idx] as usize;
        let column = self
            .content
            .get(line_start..offset)
            .map(|prefix| prefix.encode_utf16().count())
            .unwrap_or(offset - line_start);
        (line_idx as u32 + 1, column as u32)
    }

    /// Number of lines in the text.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Returns the text between two byte offsets.
    pub fn snippet(&self, start: u32, end: u32) -> &str {
        &self.content[start as usize..end as usize]
    }
}

fn compute_line_starts(content: &str) -> Vec<u32> {
    let mut starts = vec![0u32];
    for (i, byte) in content.bytes().enumerate() {
        if byte == b'\n' {
            starts.push((i + 1) as u32);
        }
    }
    starts
}
