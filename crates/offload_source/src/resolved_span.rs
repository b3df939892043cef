//! Spans resolved to line/column coordinates for display.

use std::fmt;
use std::path::PathBuf;

/// A span resolved to 1-indexed line/column coordinates.
///
/// Produced by [`SourceDb::resolve_span`](crate::SourceDb::resolve_span).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSpan {
    /// Resource path of the module.
    pub file_path: PathBuf,
    /// Starting line (1-indexed).
    pub start_line: u32,
    /// Starting column (1-indexed).
    pub start_col: u32,
    /// Ending line (1-indexed).
    pub end_line: u32,
    /// Ending column (1-indexed).
    pub end_col: u32,
}

impl fmt::Display for ResolvedSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.file_path.display(),
            self.start_line,
            self.start_col
        )
    }
}
