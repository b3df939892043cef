//! Parsing and validation of `offload.toml` configuration files.
//!
//! The file configures the worker bundle: which bootstrap module to build,
//! what to call the emitted asset, and the transform options forwarded to the
//! worker registrator loader.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, load_config_or_default, CONFIG_FILE_NAME};
pub use types::*;
