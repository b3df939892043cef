//! Decoded mapping entries.

use serde::{Deserialize, Serialize};

/// A location in a text: 1-based line, 0-based column in UTF-16 units.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Position {
    /// 1-based line.
    pub line: u32,
    /// 0-based column.
    pub column: u32,
}

impl Position {
    /// Creates a position.
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Where a generated position came from.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct OriginalLocation {
    /// Source path as listed in `sources`.
    pub source: String,
    /// Position within that source.
    pub position: Position,
    /// Original identifier name, if the mapping carries one.
    pub name: Option<String>,
}

/// One decoded segment of `mappings`.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Mapping {
    /// Position in the generated text.
    pub generated: Position,
    /// The original location, or `None` for a generated-only segment.
    pub original: Option<OriginalLocation>,
}

impl Mapping {
    /// A mapping with an original location.
    pub fn new(generated: Position, source: impl Into<String>, original: Position) -> Self {
        Self {
            generated,
            original: Some(OriginalLocation {
                source: source.into(),
                position: original,
                name: None,
            }),
        }
    }

    /// Sets the original name. No effect on generated-only mappings.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        if let Some(original) = &mut self.original {
            original.name = Some(name.into());
        }
        self
    }

    /// The original source path, if any.
    pub fn source(&self) -> Option<&str> {
        self.original.as_ref().map(|o| o.source.as_str())
    }
}
