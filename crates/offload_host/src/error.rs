//! Host errors.

/// Error type plugins, loaders and passes return from their hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that abort a run.
///
/// Problems with individual modules are not errors at this level; they are
/// reported as diagnostics on the compilation and the run completes.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// A plugin hook failed.
    #[error("plugin '{plugin}' failed in {hook}: {source}")]
    Plugin {
        /// Name of the failing plugin.
        plugin: String,
        /// The hook that failed.
        hook: &'static str,
        /// What went wrong.
        source: BoxError,
    },

    /// Plugins kept requesting additional passes.
    #[error("stopped after {limit} passes; plugins still request another")]
    TooManyPasses {
        /// The configured pass limit.
        limit: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_plugin_error() {
        let err = HostError::Plugin {
            plugin: "offload".to_string(),
            hook: "after_compile",
            source: "worker module not found".into(),
        };
        assert_eq!(
            err.to_string(),
            "plugin 'offload' failed in after_compile: worker module not found"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn display_too_many_passes() {
        let err = HostError::TooManyPasses { limit: 5 };
        assert_eq!(
            err.to_string(),
            "stopped after 5 passes; plugins still request another"
        );
    }
}
