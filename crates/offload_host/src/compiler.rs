//! The compiler: runs generations and drives plugins through them.

use crate::build::BuildCore;
use crate::compilation::Compilation;
use crate::error::{BoxError, HostError};
use crate::fs::MemoryFs;
use crate::loader::{Loader, LoaderTable, PassTable, SyntaxPass};
use crate::plugin::{CompilerSetup, Plugin};
use offload_cache::ModuleCache;
use offload_common::Interner;
use offload_diagnostics::Diagnostic;
use offload_source::SourceDb;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

/// Name of the primary compilation and its cache namespace.
pub const PRIMARY_COMPILATION: &str = "main";

// ============================================================================
// Configuration
// ============================================================================

/// When a pending child compilation runs relative to the primary module builds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChildSchedule {
    /// Before the first primary module is built.
    BeforeEntries,
    /// Once this many primary modules have been built.
    AfterModules(usize),
    /// After every primary module has been built.
    #[default]
    AfterEntries,
}

impl ChildSchedule {
    /// Whether the child is due after `built` primary modules.
    ///
    /// [`ChildSchedule::AfterEntries`] is never due mid-build; it runs once the
    /// module queue is empty.
    pub fn is_due(self, built: usize) -> bool {
        match self {
            Self::BeforeEntries => true,
            Self::AfterModules(n) => built >= n,
            Self::AfterEntries => false,
        }
    }
}

/// Host settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostConfig {
    /// Entry requests of the primary compilation.
    pub entries: Vec<String>,
    /// File name of the primary bundle.
    pub output: String,
    /// When child compilations run.
    pub child_schedule: ChildSchedule,
    /// Upper bound on generations per [`Compiler::run`].
    pub max_passes: u32,
    /// Passes applied to every module built without loaders.
    pub project_passes: Vec<String>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            output: "main.js".to_string(),
            child_schedule: ChildSchedule::default(),
            max_passes: 5,
            project_passes: Vec::new(),
        }
    }
}

/// Summary of a generation.
#[derive(Clone, Debug, Default)]
pub struct Stats {
    /// Generation number, starting at 1 for the compiler's first.
    pub generation: u32,
    /// Generations run by the [`Compiler::run`] call that produced this.
    pub passes: u32,
    /// Errors of the primary compilation.
    pub errors: Vec<Diagnostic>,
    /// Names of the emitted assets, sorted.
    pub assets: Vec<String>,
    /// Requests built rather than reused, child compilations included.
    pub rebuilt: Vec<String>,
    /// Whether a plugin asked for another generation.
    pub needs_additional_pass: bool,
}

impl Stats {
    /// Whether the primary compilation reported errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

// ============================================================================
// Compiler
// ============================================================================

/// Runs generations over a [`MemoryFs`], reusing unchanged modules from its
/// [`ModuleCache`] between them.
pub struct Compiler {
    plugins: Vec<Box<dyn Plugin>>,
    core: BuildCore,
    generation: u32,
}

/// Calls `hook` on every plugin in order, stopping at the first failure.
fn call_hooks(
    plugins: &mut [Box<dyn Plugin>],
    hook: &'static str,
    mut f: impl FnMut(&mut dyn Plugin) -> Result<(), BoxError>,
) -> Result<(), HostError> {
    for plugin in plugins.iter_mut() {
        if let Err(source) = f(plugin.as_mut()) {
            return Err(HostError::Plugin {
                plugin: plugin.name().to_string(),
                hook,
                source,
            });
        }
    }
    Ok(())
}

fn collect_rebuilt(compilation: &Compilation, out: &mut Vec<String>) {
    out.extend(
        compilation
            .modules()
            .iter()
            .filter(|m| m.rebuilt)
            .map(|m| m.raw_request.clone()),
    );
    for child in compilation.children() {
        collect_rebuilt(child, out);
    }
}

impl Compiler {
    /// Creates a compiler with an empty cache.
    pub fn new(config: HostConfig, fs: MemoryFs) -> Self {
        Self::with_cache(config, fs, ModuleCache::new())
    }

    /// Creates a compiler that starts from `cache`.
    pub fn with_cache(config: HostConfig, fs: MemoryFs, cache: ModuleCache) -> Self {
        let project_passes = config.project_passes.clone();
        Self {
            plugins: Vec::new(),
            core: BuildCore {
                config,
                fs,
                cache,
                source_db: SourceDb::new(),
                interner: Interner::new(),
                loaders: LoaderTable::default(),
                passes: PassTable::default(),
                project_passes,
                output: BTreeMap::new(),
            },
            generation: 0,
        }
    }

    /// Makes a pass available to loaders and project configuration.
    pub fn register_pass(&mut self, pass: Rc<dyn SyntaxPass>) {
        self.core.passes.insert(pass);
    }

    /// Makes a loader available to requests under `name`.
    pub fn register_loader(&mut self, name: impl Into<String>, loader: Rc<dyn Loader>) {
        self.core.loaders.insert(name, loader);
    }

    /// Adds a plugin and lets it register loaders and passes.
    pub fn add_plugin(&mut self, mut plugin: Box<dyn Plugin>) -> Result<(), HostError> {
        let mut setup = CompilerSetup {
            loaders: &mut self.core.loaders,
            passes: &mut self.core.passes,
            project_passes: &mut self.core.project_passes,
        };
        plugin
            .apply(&mut setup)
            .map_err(|source| HostError::Plugin {
                plugin: plugin.name().to_string(),
                hook: "apply",
                source,
            })?;
        self.plugins.push(plugin);
        Ok(())
    }

    /// The file system modules are read from.
    pub fn fs(&self) -> &MemoryFs {
        &self.core.fs
    }

    /// Mutable access to the file system, for edits between generations.
    pub fn fs_mut(&mut self) -> &mut MemoryFs {
        &mut self.core.fs
    }

    /// The module cache.
    pub fn cache(&self) -> &ModuleCache {
        &self.core.cache
    }

    /// Everything emitted so far, by file name.
    pub fn output(&self) -> &BTreeMap<String, String> {
        &self.core.output
    }

    /// One emitted file.
    pub fn read_output(&self, name: &str) -> Option<&str> {
        self.core.output.get(name).map(String::as_str)
    }

    /// The interner shared by every parsed module.
    pub fn interner(&self) -> &Interner {
        &self.core.interner
    }

    /// Every source parsed so far.
    pub fn source_db(&self) -> &SourceDb {
        &self.core.source_db
    }

    /// Runs generations until no plugin requests another.
    ///
    /// On failure every plugin's `failed` hook is called before the error is
    /// returned.
    pub fn run(&mut self) -> Result<Stats, HostError> {
        let limit = self.core.config.max_passes.max(1);
        let mut passes = 0;
        loop {
            passes += 1;
            let stats = match self.run_generation(passes) {
                Ok(stats) => stats,
                Err(e) => return Err(self.fail(e)),
            };
            if !stats.needs_additional_pass {
                return Ok(stats);
            }
            if passes >= limit {
                return Err(self.fail(HostError::TooManyPasses { limit }));
            }
            tracing::info!(generation = self.generation + 1, "running an additional pass");
        }
    }

    fn fail(&mut self, error: HostError) -> HostError {
        tracing::debug!(error = %error, "run failed");
        for plugin in &mut self.plugins {
            plugin.failed(&error);
        }
        error
    }

    fn run_generation(&mut self, passes: u32) -> Result<Stats, HostError> {
        self.generation += 1;
        tracing::info!(generation = self.generation, "generation started");
        let mut primary = Compilation::new_primary(PRIMARY_COMPILATION, self.core.config.output.clone());

        let mut pending = Vec::new();
        for plugin in &mut self.plugins {
            let request = plugin.make(&primary).map_err(|source| HostError::Plugin {
                plugin: plugin.name().to_string(),
                hook: "make",
                source,
            })?;
            pending.extend(request);
        }
        let mut children = Vec::with_capacity(pending.len());
        for request in &pending {
            let mut child = Compilation::new_child(request);
            call_hooks(&mut self.plugins, "child_compilation_created", |p| {
                p.child_compilation_created(&mut child)
            })?;
            children.push((child, request.entry_request.clone()));
        }

        let entries = self.core.config.entries.clone();
        self.build_compilation(&mut primary, &entries, children)?;
        call_hooks(&mut self.plugins, "after_compile", |p| p.after_compile(&mut primary))?;

        self.core.seal(&primary);
        self.core.bundle(&mut primary);
        let assets = self.core.emit(&primary);

        let mut needs_additional_pass = false;
        for plugin in &mut self.plugins {
            needs_additional_pass |= plugin.need_additional_pass();
        }

        let mut rebuilt = Vec::new();
        collect_rebuilt(&primary, &mut rebuilt);
        let stats = Stats {
            generation: self.generation,
            passes,
            errors: primary.errors.diagnostics(),
            assets,
            rebuilt,
            needs_additional_pass,
        };
        for plugin in &mut self.plugins {
            plugin.done(&stats);
        }
        tracing::info!(
            generation = self.generation,
            errors = stats.errors.len(),
            rebuilt = stats.rebuilt.len(),
            "generation finished"
        );
        Ok(stats)
    }

    /// Builds the module graph of `compilation` from `entries`, running the
    /// pending children when the schedule says so.
    fn build_compilation(
        &mut self,
        compilation: &mut Compilation,
        entries: &[String],
        mut children: Vec<(Compilation, String)>,
    ) -> Result<(), HostError> {
        let schedule = self.core.config.child_schedule;
        let mut queue: VecDeque<String> = entries.iter().cloned().collect();
        let mut built = 0;

        while let Some(raw_request) = queue.pop_front() {
            if compilation.module_by_request(&raw_request).is_some() {
                continue;
            }
            if !children.is_empty() && schedule.is_due(built) {
                self.run_children(compilation, std::mem::take(&mut children))?;
            }
            let module = self.core.build_module(compilation, &raw_request);
            if module.rebuilt {
                let view: &Compilation = compilation;
                call_hooks(&mut self.plugins, "module_built", |p| p.module_built(view, &module))?;
            }
            queue.extend(module.dependencies.iter().cloned());
            compilation.add_module(module);
            built += 1;
        }
        if !children.is_empty() {
            self.run_children(compilation, children)?;
        }
        Ok(())
    }

    fn run_children(
        &mut self,
        parent: &mut Compilation,
        children: Vec<(Compilation, String)>,
    ) -> Result<(), HostError> {
        for (mut child, entry) in children {
            tracing::debug!(child = %child.name, entry = %entry, "running child compilation");
            self.build_compilation(&mut child, std::slice::from_ref(&entry), Vec::new())?;
            call_hooks(&mut self.plugins, "after_compile", |p| p.after_compile(&mut child))?;
            self.core.bundle(&mut child);
            for (name, content) in &child.assets {
                parent.assets.insert(name.clone(), content.clone());
            }
            let handle = parent.add_child(child);
            call_hooks(&mut self.plugins, "child_compilation_finished", |p| {
                p.child_compilation_finished(parent, handle)
            })?;
        }
        Ok(())
    }
}
