//! Worker bundle settings as the coordinator uses them.

use offload_config::{TransformOptions, WorkerConfig};
use offload_rewrite::{EXTRACTION_PASS, REGISTRATOR_LOADER};

/// Name and cache namespace of the secondary compilation.
pub const WORKER_COMPILATION: &str = "offload-worker";

/// Normalized worker settings.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkerOptions {
    /// Path of the worker bootstrap module.
    pub entry: String,
    /// File name of the worker bundle.
    pub output: String,
    /// Options passed to the registrator loader.
    pub transform: TransformOptions,
}

impl WorkerOptions {
    /// Normalizes `config`: the project's own passes never run on the
    /// bootstrap module and the extraction pass always runs last unless
    /// listed explicitly.
    pub fn from_config(config: &WorkerConfig) -> Self {
        let mut transform = config.transform.clone();
        transform.ignore_project_config = true;
        if !transform.plugins.iter().any(|p| p == EXTRACTION_PASS) {
            transform.plugins.push(EXTRACTION_PASS.to_string());
        }
        Self {
            entry: config.entry.clone(),
            output: config.output.clone(),
            transform,
        }
    }

    /// `offload-worker-registrator?<options JSON>!<entry>`
    pub fn worker_request(&self) -> String {
        format!("{REGISTRATOR_LOADER}?{}!{}", self.transform.to_json(), self.entry)
    }
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self::from_config(&WorkerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use offload_config::load_config_from_str;

    #[test]
    fn defaults() {
        let options = WorkerOptions::default();
        assert_eq!(options.entry, "offload/dist/worker-slave.js");
        assert_eq!(options.output, "offload-worker.js");
        assert!(options.transform.ignore_project_config);
        assert_eq!(options.transform.plugins, vec![EXTRACTION_PASS]);
    }

    #[test]
    fn project_config_is_ignored_regardless() {
        let config = load_config_from_str(
            "[worker.transform]\nignore_project_config = false\nplugins = [\"strip-logging\"]\n",
        )
        .unwrap();
        let options = WorkerOptions::from_config(&config.worker);
        assert!(options.transform.ignore_project_config);
        assert_eq!(options.transform.plugins, vec!["strip-logging", EXTRACTION_PASS]);
    }

    #[test]
    fn request_format() {
        let options = WorkerOptions::default();
        assert_eq!(
            options.worker_request(),
            "offload-worker-registrator?{\"ignoreProjectConfig\":true,\
             \"plugins\":[\"offload:register-static-functions\"],\
             \"generator\":{\"quotes\":\"single\"}}!offload/dist/worker-slave.js"
        );
    }
}
