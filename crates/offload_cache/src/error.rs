//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur while persisting or restoring the cache.
///
/// Restoring is fail-safe: a manifest that cannot be read yields an empty
/// cache rather than an error. These variants surface from explicit loads
/// and from saving.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing cache files.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The cache manifest could not be parsed as valid JSON.
    #[error("failed to parse cache manifest: {reason}")]
    ManifestParse {
        /// Description of the parse failure.
        reason: String,
    },

    /// The manifest was written by an incompatible version.
    #[error("version mismatch in {path}: expected {expected}, got {actual}")]
    VersionMismatch {
        /// The manifest path.
        path: PathBuf,
        /// The version this build writes.
        expected: String,
        /// The version found in the file.
        actual: String,
    },

    /// A serialization error occurred.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}
