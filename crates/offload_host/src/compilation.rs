//! Compilations: one pass over a module graph.

use crate::module::Module;
use crate::plugin::ChildCompilationRequest;
use offload_diagnostics::DiagnosticSink;
use std::collections::BTreeMap;

/// Whether a compilation is the top-level pass or nested in one.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CompilationKind {
    /// The application bundle.
    Primary,
    /// A child compilation spawned by a plugin.
    Secondary,
}

/// Refers to a child of a compilation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ChildHandle(usize);

/// One pass over a module graph and everything it produced.
#[derive(Debug)]
pub struct Compilation {
    /// Compilation name.
    pub name: String,
    /// Primary or secondary.
    pub kind: CompilationKind,
    /// Cache namespace the modules are stored under.
    pub cache_namespace: String,
    /// File name of the bundle.
    pub output_filename: String,
    /// Problems found while building.
    pub errors: DiagnosticSink,
    /// Emitted files by name.
    pub assets: BTreeMap<String, String>,
    modules: Vec<Module>,
    children: Vec<Compilation>,
}

impl Compilation {
    /// The top-level compilation.
    pub fn new_primary(name: impl Into<String>, output_filename: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            cache_namespace: name.clone(),
            name,
            kind: CompilationKind::Primary,
            output_filename: output_filename.into(),
            errors: DiagnosticSink::new(),
            assets: BTreeMap::new(),
            modules: Vec::new(),
            children: Vec::new(),
        }
    }

    /// A child compilation as a plugin requested it.
    pub fn new_child(request: &ChildCompilationRequest) -> Self {
        Self {
            name: request.name.clone(),
            kind: CompilationKind::Secondary,
            cache_namespace: request.cache_namespace.clone(),
            output_filename: request.output_filename.clone(),
            errors: DiagnosticSink::new(),
            assets: BTreeMap::new(),
            modules: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Whether this compilation is nested in another.
    pub fn is_child(&self) -> bool {
        self.kind == CompilationKind::Secondary
    }

    /// Modules in build order.
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Mutable access to the module list.
    pub fn modules_mut(&mut self) -> &mut Vec<Module> {
        &mut self.modules
    }

    /// The module built from `raw_request`.
    pub fn module_by_request(&self, raw_request: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.raw_request == raw_request)
    }

    /// Mutable access to the module built from `raw_request`.
    pub fn module_by_request_mut(&mut self, raw_request: &str) -> Option<&mut Module> {
        self.modules.iter_mut().find(|m| m.raw_request == raw_request)
    }

    /// Adds a module, replacing one with the same request.
    pub fn add_module(&mut self, module: Module) {
        match self.module_by_request_mut(&module.raw_request) {
            Some(existing) => *existing = module,
            None => self.modules.push(module),
        }
    }

    /// Takes ownership of a finished child compilation.
    pub fn add_child(&mut self, child: Compilation) -> ChildHandle {
        self.children.push(child);
        ChildHandle(self.children.len() - 1)
    }

    /// A child compilation.
    pub fn child(&self, handle: ChildHandle) -> Option<&Compilation> {
        self.children.get(handle.0)
    }

    /// Mutable access to a child compilation.
    pub fn child_mut(&mut self, handle: ChildHandle) -> Option<&mut Compilation> {
        self.children.get_mut(handle.0)
    }

    /// All child compilations.
    pub fn children(&self) -> &[Compilation] {
        &self.children
    }
}
