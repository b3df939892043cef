//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::OffloadConfig;
use std::path::Path;

/// Name of the configuration file inside a project directory.
pub const CONFIG_FILE_NAME: &str = "offload.toml";

/// Loads and validates `offload.toml` from a project directory.
pub fn load_config(project_dir: &Path) -> Result<OffloadConfig, ConfigError> {
    let path = project_dir.join(CONFIG_FILE_NAME);
    let content =
        std::fs::read_to_string(&path).map_err(|source| ConfigError::Read { path, source })?;
    load_config_from_str(&content)
}

/// Like [`load_config`], but a missing file yields the default configuration.
pub fn load_config_or_default(project_dir: &Path) -> Result<OffloadConfig, ConfigError> {
    match load_config(project_dir) {
        Err(e) if e.is_not_found() => Ok(OffloadConfig::default()),
        other => other,
    }
}

/// Parses and validates an `offload.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<OffloadConfig, ConfigError> {
    let config: OffloadConfig =
        toml::from_str(content).map_err(|e| ConfigError::Syntax(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn check_path(field: &'static str, value: &str, reserved: &[char]) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyPath { field });
    }
    match value.chars().find(|c| reserved.contains(c)) {
        Some(reserved) => Err(ConfigError::ReservedCharacter {
            field,
            value: value.to_string(),
            reserved,
        }),
        None => Ok(()),
    }
}

fn validate_config(config: &OffloadConfig) -> Result<(), ConfigError> {
    let worker = &config.worker;
    // The entry is the resource part of the request; the output names an asset.
    check_path("worker.entry", &worker.entry, &['!'])?;
    check_path("worker.output", &worker.output, &['!', '?'])?;
    if let Some(index) = worker.transform.plugins.iter().position(|p| p.trim().is_empty()) {
        return Err(ConfigError::BlankPassName { index });
    }
    Ok(())
}
