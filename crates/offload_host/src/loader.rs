//! Loaders transform a resource's text; syntax passes transform its tree.

use crate::error::BoxError;
use offload_common::Interner;
use offload_diagnostics::DiagnosticSink;
use offload_js_parser::Program;
use offload_source::{FileId, SourceDb};
use offload_sourcemap::SourceMap;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Text flowing through a loader chain.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedSource {
    /// The code.
    pub code: String,
    /// Map from `code` back to the sources it came from.
    pub map: Option<SourceMap>,
}

/// What a loader can see and touch while it runs.
pub struct LoaderContext<'a> {
    /// Path of the resource being loaded.
    pub resource_path: &'a Path,
    /// The loader's query, without the leading `?`.
    pub query: &'a str,
    /// Shared source database; loaders that parse add their input here.
    pub source_db: &'a mut SourceDb,
    /// Shared interner.
    pub interner: &'a Interner,
    /// The compilation's diagnostics.
    pub diagnostics: &'a DiagnosticSink,
    /// Registered syntax passes.
    pub passes: &'a PassTable,
    /// Passes configured for every module of the project.
    pub project_passes: &'a [String],
    pub(crate) file_dependencies: &'a mut BTreeSet<PathBuf>,
}

impl LoaderContext<'_> {
    /// Declares that the module's output depends on `path`.
    pub fn add_dependency(&mut self, path: impl Into<PathBuf>) {
        self.file_dependencies.insert(path.into());
    }
}

/// Transforms a resource's text.
pub trait Loader {
    /// Runs the loader.
    fn load(&self, ctx: &mut LoaderContext<'_>, input: LoadedSource) -> Result<LoadedSource, BoxError>;
}

/// What a syntax pass can see while it runs.
pub struct PassContext<'a> {
    /// Path of the module.
    pub resource_path: &'a Path,
    /// The module's file in the source database.
    pub file: FileId,
    /// Shared source database.
    pub source_db: &'a SourceDb,
    /// Shared interner.
    pub interner: &'a Interner,
    /// The map that came with the module's text, if any.
    pub upstream_map: Option<&'a SourceMap>,
    /// Free-form options.
    pub options: &'a BTreeMap<String, serde_json::Value>,
}

/// A named transformation of a parsed module.
pub trait SyntaxPass {
    /// Name used in configuration.
    fn name(&self) -> &str;

    /// Transforms `program` in place.
    fn run(&self, program: &mut Program, ctx: &PassContext<'_>) -> Result<(), BoxError>;
}

/// Registered passes by name.
#[derive(Clone, Default)]
pub struct PassTable {
    passes: BTreeMap<String, Rc<dyn SyntaxPass>>,
}

impl PassTable {
    /// Registers `pass` under its own name, replacing any previous one.
    pub fn insert(&mut self, pass: Rc<dyn SyntaxPass>) {
        self.passes.insert(pass.name().to_string(), pass);
    }

    /// Looks up a pass.
    pub fn get(&self, name: &str) -> Option<&Rc<dyn SyntaxPass>> {
        self.passes.get(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.passes.keys().map(String::as_str)
    }
}

impl fmt::Debug for PassTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// Registered loaders by name.
#[derive(Clone, Default)]
pub struct LoaderTable {
    loaders: BTreeMap<String, Rc<dyn Loader>>,
}

impl LoaderTable {
    /// Registers `loader` under `name`.
    pub fn insert(&mut self, name: impl Into<String>, loader: Rc<dyn Loader>) {
        self.loaders.insert(name.into(), loader);
    }

    /// Looks up a loader.
    pub fn get(&self, name: &str) -> Option<&Rc<dyn Loader>> {
        self.loaders.get(name)
    }
}

impl fmt::Debug for LoaderTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.loaders.keys()).finish()
    }
}
