//! Errors from reading and checking `offload.toml`.

use std::path::PathBuf;

/// Why an `offload.toml` was rejected.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read '{}': {source}", path.display())]
    Read {
        /// The configuration file.
        path: PathBuf,
        /// The I/O failure.
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the expected tables.
    #[error("invalid offload.toml: {0}")]
    Syntax(String),

    /// A worker path setting is empty.
    #[error("'{field}' must not be empty")]
    EmptyPath {
        /// Dotted name of the setting.
        field: &'static str,
    },

    /// A worker path contains a character reserved by the worker request
    /// syntax `loader?query!resource`.
    #[error("'{field}' = '{value}' contains '{reserved}', which is reserved in worker requests")]
    ReservedCharacter {
        /// Dotted name of the setting.
        field: &'static str,
        /// The configured value.
        value: String,
        /// The offending character.
        reserved: char,
    },

    /// An entry of `worker.transform.plugins` is blank.
    #[error("worker.transform.plugins[{index}] is blank")]
    BlankPassName {
        /// Position in the list.
        index: usize,
    },
}

impl ConfigError {
    /// Whether the error is a missing configuration file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Read { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
