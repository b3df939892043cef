//! Byte ranges within module texts.

use crate::file_id::FileId;
use serde::{Deserialize, Serialize};

/// A byte range within a module text; `start` inclusive, `end` exclusive.
///
/// Syntax nodes produced by the parser carry real spans. Nodes synthesized by
/// a transform carry [`Span::DUMMY`] and produce no source-map mapping.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Span {
    /// The text this span belongs to.
    pub file: FileId,
    /// Byte offset of the start of the span (inclusive).
    pub start: u32,
    /// Byte offset of the end of the span (exclusive).
    pub end: u32,
}

impl Span {
    /// The span of synthesized code.
    pub const DUMMY: Span = Span {
        file: FileId::DUMMY,
        start: 0,
        end: 0,
    };

    /// Creates a new span.
    pub fn new(file: FileId, start: u32, end: u32) -> Self {
        Self { file, start, end }
    }

    /// Returns the smallest span covering both.
    ///
    /// A dummy operand yields the other span unchanged.
    ///
    /// # Panics
    ///
    /// Panics if both spans are real and belong to different files.
    pub fn merge(self, other: Span) -> Span {
        if self.is_dummy() {
            return other;
        }
        if other.is_dummy() {
            return self;
        }
        assert_eq!(
            self.file, other.file,
            "cannot merge spans from different files"
        );
        Span {
            file: self.file,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Length in bytes.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Returns `true` for a zero-length span.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` for the span of synthesized code.
    pub fn is_dummy(&self) -> bool {
        self.file == FileId::DUMMY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_covers_both() {
        let f = FileId::from_raw(0);
        let m = Span::new(f, 5, 15).merge(Span::new(f, 10, 25));
        assert_eq!((m.start, m.end), (5, 25));
    }

    #[test]
    fn merge_with_dummy_keeps_real_span() {
        let real = Span::new(FileId::from_raw(2), 4, 9);
        assert_eq!(real.merge(Span::DUMMY), real);
        assert_eq!(Span::DUMMY.merge(real), real);
    }

    #[test]
    fn len_and_empty() {
        let f = FileId::from_raw(0);
        assert_eq!(Span::new(f, 10, 20).len(), 10);
        assert!(Span::new(f, 5, 5).is_empty());
    }

    #[test]
    fn dummy_detection() {
        assert!(Span::DUMMY.is_dummy());
        assert!(!Span::new(FileId::from_raw(0), 0, 0).is_dummy());
    }

    #[test]
    fn serde_roundtrip() {
        let s = Span::new(FileId::from_raw(1), 10, 20);
        let json = serde_json::to_string(&s).unwrap();
        let back: Span = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }
}
