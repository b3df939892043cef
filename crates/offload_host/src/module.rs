//! Modules of a compilation.

use offload_cache::{CachedModule, ModuleArtifact};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Outcome of building a module.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ModuleStatus {
    /// Built, with an artifact.
    Built,
    /// Failed; diagnostics were reported on the compilation.
    Failed,
}

/// A compiled source unit.
#[derive(Clone, Debug, PartialEq)]
pub struct Module {
    /// Resource path; the module's identity.
    pub resource: PathBuf,
    /// The full request, loaders included.
    pub raw_request: String,
    /// Files whose change invalidates this module.
    pub file_dependencies: BTreeSet<PathBuf>,
    /// Requests of imported modules.
    pub dependencies: Vec<String>,
    /// Build outcome.
    pub status: ModuleStatus,
    /// Output, if built.
    pub artifact: Option<ModuleArtifact>,
    /// Whether the module was built in this generation rather than reused
    /// from the cache.
    pub rebuilt: bool,
}

impl Module {
    /// A module about to be built; depends on its own resource.
    pub fn new(resource: PathBuf, raw_request: impl Into<String>) -> Self {
        let file_dependencies = BTreeSet::from([resource.clone()]);
        Self {
            resource,
            raw_request: raw_request.into(),
            file_dependencies,
            dependencies: Vec::new(),
            status: ModuleStatus::Failed,
            artifact: None,
            rebuilt: true,
        }
    }

    /// A module reused from the cache.
    pub fn from_cached(cached: &CachedModule) -> Self {
        Self {
            resource: cached.resource.clone(),
            raw_request: cached.raw_request.clone(),
            file_dependencies: cached.file_dependencies.clone(),
            dependencies: cached.dependencies.clone(),
            status: ModuleStatus::Built,
            artifact: Some(cached.artifact.clone()),
            rebuilt: false,
        }
    }

    /// Whether the module built successfully.
    pub fn is_built(&self) -> bool {
        self.status == ModuleStatus::Built
    }
}
