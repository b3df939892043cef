//! Plugins: hooks into the build lifecycle.

use crate::compilation::{ChildHandle, Compilation};
use crate::compiler::Stats;
use crate::error::{BoxError, HostError};
use crate::loader::{Loader, LoaderTable, PassTable, SyntaxPass};
use crate::module::Module;
use std::rc::Rc;

/// A plugin's request for a child compilation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChildCompilationRequest {
    /// Name of the child compilation.
    pub name: String,
    /// The single entry request.
    pub entry_request: String,
    /// File name of the child's bundle.
    pub output_filename: String,
    /// Cache namespace for the child's modules.
    pub cache_namespace: String,
}

/// Registration surface handed to [`Plugin::apply`].
pub struct CompilerSetup<'a> {
    pub(crate) loaders: &'a mut LoaderTable,
    pub(crate) passes: &'a mut PassTable,
    pub(crate) project_passes: &'a mut Vec<String>,
}

impl CompilerSetup<'_> {
    /// Makes a loader available to requests under `name`.
    pub fn register_loader(&mut self, name: impl Into<String>, loader: Rc<dyn Loader>) {
        self.loaders.insert(name, loader);
    }

    /// Makes a pass available by its name.
    pub fn register_pass(&mut self, pass: Rc<dyn SyntaxPass>) {
        self.passes.insert(pass);
    }

    /// Runs the named pass on every module built without loaders.
    pub fn add_project_pass(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.project_passes.contains(&name) {
            self.project_passes.push(name);
        }
    }
}

/// Lifecycle hooks. Every hook has a no-op default.
///
/// Per generation the host calls, in order: `make` on the primary
/// compilation; `module_built` for every module built (child runs are
/// interleaved according to the schedule, each firing
/// `child_compilation_created`, `module_built`, `after_compile` and
/// `child_compilation_finished`); `after_compile` on the primary;
/// `need_additional_pass`; and `done`. `failed` replaces the rest once a
/// hook returns an error.
pub trait Plugin {
    /// Name used in error messages.
    fn name(&self) -> &str;

    /// Called once when the plugin is added.
    fn apply(&mut self, _setup: &mut CompilerSetup<'_>) -> Result<(), BoxError> {
        Ok(())
    }

    /// The primary compilation is starting. Return a request to spawn a child.
    fn make(
        &mut self,
        _compilation: &Compilation,
    ) -> Result<Option<ChildCompilationRequest>, BoxError> {
        Ok(None)
    }

    /// A requested child compilation exists and is about to build.
    fn child_compilation_created(&mut self, _child: &mut Compilation) -> Result<(), BoxError> {
        Ok(())
    }

    /// A module was built (successfully or not) rather than reused.
    fn module_built(
        &mut self,
        _compilation: &Compilation,
        _module: &Module,
    ) -> Result<(), BoxError> {
        Ok(())
    }

    /// All modules of `compilation` are built. Fires for children too.
    fn after_compile(&mut self, _compilation: &mut Compilation) -> Result<(), BoxError> {
        Ok(())
    }

    /// A child compilation finished and now belongs to `parent`.
    fn child_compilation_finished(
        &mut self,
        _parent: &mut Compilation,
        _child: ChildHandle,
    ) -> Result<(), BoxError> {
        Ok(())
    }

    /// Whether the host should immediately run another generation.
    fn need_additional_pass(&mut self) -> bool {
        false
    }

    /// The generation is over.
    fn done(&mut self, _stats: &Stats) {}

    /// The run was aborted.
    fn failed(&mut self, _error: &HostError) {}
}
