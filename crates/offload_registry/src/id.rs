//! Stable identifiers for extracted functions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name used in identifiers of functions without one.
pub const ANONYMOUS: &str = "_anonymous";

/// Identifies an extracted function across the main thread and workers.
///
/// Derived from the originating module path, the function name and its
/// position, so the same function keeps its identifier across rebuilds
/// as long as it does not move.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunctionId(String);

impl FunctionId {
    /// Wraps an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Builds `static:<path>/<name>:<line>:<column>`, with a 1-based line and
    /// a 0-based column. A missing name becomes [`ANONYMOUS`].
    pub fn derive(path: &str, name: Option<&str>, line: u32, column: u32) -> Self {
        let name = name.unwrap_or(ANONYMOUS);
        Self(format!("static:{path}/{name}:{line}:{column}"))
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
