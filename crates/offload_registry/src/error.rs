//! Registry errors.

use std::path::PathBuf;

/// Errors from publishing to the registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The consuming registry has been dropped.
    #[error("function registry is gone; cannot publish functions of '{}'", path.display())]
    Disconnected {
        /// The module whose event was lost.
        path: PathBuf,
    },
}
