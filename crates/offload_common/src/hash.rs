//! Content hashing for module cache snapshots.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 128-bit XXH3 digest of a file's contents.
///
/// The module cache records one of these per file dependency when a module
/// is built; a differing digest on a later generation invalidates the module.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Hashes a byte slice.
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = xxhash_rust::xxh3::xxh3_128(data);
        Self(hash.to_le_bytes())
    }

    /// Hashes the UTF-8 bytes of a string.
    pub fn of_str(text: &str) -> Self {
        Self::from_bytes(text.as_bytes())
    }

    /// Returns the first eight hex digits, for log lines.
    pub fn short(&self) -> String {
        self.0[..4].iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({}..)", self.short())
    }
}
