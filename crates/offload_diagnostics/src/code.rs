//! Diagnostic codes with category prefixes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which stage of the build a diagnostic comes from.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Lexing and parsing of module text, prefixed with `P`.
    Parse,
    /// Loaders and syntax passes, prefixed with `T`.
    Transform,
    /// Module resolution and request handling, prefixed with `B`.
    Build,
    /// Problems surfaced by the worker compilation, prefixed with `W`.
    Worker,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Parse => 'P',
            Category::Transform => 'T',
            Category::Build => 'B',
            Category::Worker => 'W',
        }
    }
}

/// A category prefix plus a number, displayed as e.g. `P102` or `W401`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_prefixes() {
        assert_eq!(Category::Parse.prefix(), 'P');
        assert_eq!(Category::Transform.prefix(), 'T');
        assert_eq!(Category::Build.prefix(), 'B');
        assert_eq!(Category::Worker.prefix(), 'W');
    }

    #[test]
    fn display_format() {
        assert_eq!(DiagnosticCode::new(Category::Parse, 102).to_string(), "P102");
        assert_eq!(DiagnosticCode::new(Category::Worker, 7).to_string(), "W007");
    }

    #[test]
    fn serde_roundtrip() {
        let code = DiagnosticCode::new(Category::Transform, 201);
        let json = serde_json::to_string(&code).unwrap();
        let back: DiagnosticCode = serde_json::from_str(&json).unwrap();
        assert_eq!(code, back);
    }
}
