//! Tracks which application modules contribute worker functions.

use offload_registry::CapabilityUsers;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// The set of modules the worker module depends on, and whether it grew
/// since the current secondary compilation was created.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DependencyTracker {
    dependents: BTreeSet<PathBuf>,
    new_dependency_added: bool,
}

impl DependencyTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of building the module at `path`.
    ///
    /// The flag stays set for the rest of the epoch once a module is added.
    pub fn on_module_built(&mut self, path: &Path, users: &impl CapabilityUsers) {
        if users.uses_capability(path) {
            if self.dependents.insert(path.to_path_buf()) {
                tracing::info!(module = %path.display(), "worker now depends on module");
                self.new_dependency_added = true;
            }
        } else if self.dependents.remove(path) {
            tracing::info!(module = %path.display(), "worker no longer depends on module");
        }
    }

    /// Starts a new epoch: clears the flag, keeps the set.
    pub fn reset_epoch(&mut self) {
        self.new_dependency_added = false;
    }

    /// Whether another generation is needed to pick up new dependents.
    pub fn needs_additional_pass(&self, is_first_generation: bool) -> bool {
        !is_first_generation && self.new_dependency_added
    }

    /// Modules currently contributing functions, sorted.
    pub fn dependents(&self) -> &BTreeSet<PathBuf> {
        &self.dependents
    }

    /// Whether a module was added in this epoch.
    pub fn new_dependency_added(&self) -> bool {
        self.new_dependency_added
    }
}
