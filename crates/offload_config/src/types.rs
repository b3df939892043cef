//! Configuration data types.

use offload_codegen::GeneratorOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default worker bootstrap module.
pub const DEFAULT_WORKER_ENTRY: &str = "offload/dist/worker-slave.js";

/// Default file name of the emitted worker bundle.
pub const DEFAULT_WORKER_OUTPUT: &str = "offload-worker.js";

/// Root of `offload.toml`.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct OffloadConfig {
    /// Worker bundle settings.
    #[serde(default)]
    pub worker: WorkerConfig,
}

/// The `[worker]` table.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Path of the worker bootstrap module.
    #[serde(default = "default_entry")]
    pub entry: String,
    /// File name of the emitted worker bundle.
    #[serde(default = "default_output")]
    pub output: String,
    /// Options for transforming the bootstrap module.
    #[serde(default)]
    pub transform: TransformOptions,
}

fn default_entry() -> String {
    DEFAULT_WORKER_ENTRY.to_string()
}

fn default_output() -> String {
    DEFAULT_WORKER_OUTPUT.to_string()
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            entry: default_entry(),
            output: default_output(),
            transform: TransformOptions::default(),
        }
    }
}

/// Options for the worker registrator loader.
///
/// Serialized as JSON into the query of the worker request, so field names
/// use camelCase there. The TOML file may use either spelling.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformOptions {
    /// Skip the project's own transform passes.
    #[serde(alias = "ignore_project_config")]
    pub ignore_project_config: bool,
    /// Transform passes to run, by name, in order.
    pub plugins: Vec<String>,
    /// Printer options.
    pub generator: GeneratorOptions,
    /// Free-form options passed through to the passes.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, serde_json::Value>,
}

impl TransformOptions {
    /// Encodes the options as compact JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Decodes options from JSON. An empty string yields the defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json)
    }
}
