//! Opaque identifier for module texts loaded into a build session.

use serde::{Deserialize, Serialize};

/// Identifier of a text in the [`SourceDb`](crate::SourceDb).
///
/// Rebuilding a module after an edit adds a new text and therefore a new
/// `FileId`; spans held by earlier syntax trees stay valid.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct FileId(u32);

impl FileId {
    /// File ID for synthesized nodes that have no source location.
    pub const DUMMY: FileId = FileId(u32::MAX);

    /// Creates a `FileId` from a raw value.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}
