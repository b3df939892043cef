//! Printer options.

use serde::{Deserialize, Serialize};

/// Quote character used for string literals.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    /// `'text'`
    #[default]
    Single,
    /// `"text"`
    Double,
}

impl QuoteStyle {
    /// The quote character.
    pub fn as_char(self) -> char {
        match self {
            QuoteStyle::Single => '\'',
            QuoteStyle::Double => '"',
        }
    }
}

/// Options controlling printed output.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    /// Quote style for string literals.
    pub quotes: QuoteStyle,
}
