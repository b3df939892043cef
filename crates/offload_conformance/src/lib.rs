//! End-to-end helpers for the worker bundle pipeline.
//!
//! [`Project`] wires a host [`Compiler`] with the [`WorkerCoordinator`], a
//! shared [`FunctionRegistry`] and the [`DiscoveryPass`] as the project's
//! syntax pass, over an in-memory file system, so integration tests can edit
//! files and run generations.

#![warn(missing_docs)]

pub mod discovery;

pub use discovery::{DiscoveryPass, CAPABILITY_ROOT, DISCOVERY_PASS};

use offload_build::{WorkerCoordinator, WorkerOptions, WORKER_COMPILATION};
use offload_config::{OffloadConfig, DEFAULT_WORKER_ENTRY};
use offload_host::{ChildSchedule, Compiler, HostConfig, HostError, MemoryFs, Plugin, Stats};
use offload_registry::FunctionRegistry;
use offload_sourcemap::{SourceMap, SourceMapConsumer};
use std::path::Path;
use std::rc::Rc;

/// A worker bootstrap module with the insertion marker.
pub const WORKER_BOOTSTRAP: &str = "\
const slaveFunctionLookupTable = createFunctionLookupTable();
/* OFFLOAD_STATIC_FUNCTIONS_PLACEHOLDER */
self.onmessage = function (event) {
  handle(slaveFunctionLookupTable, event.data);
};
";

/// Installs a `tracing` subscriber writing to the test output. Safe to call
/// from every test.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// An application with the worker pipeline installed.
pub struct Project {
    /// The host.
    pub compiler: Compiler,
    /// The registry shared by the discovery pass and the worker loader.
    pub registry: Rc<FunctionRegistry>,
    /// The coordinator's worker settings.
    pub options: WorkerOptions,
}

/// Options for [`Project::build`].
pub struct ProjectSetup {
    /// Primary entry requests.
    pub entries: Vec<String>,
    /// When the worker compilation runs.
    pub schedule: ChildSchedule,
    /// Worker settings.
    pub config: OffloadConfig,
    /// Plugins added after the coordinator.
    pub plugins: Vec<Box<dyn Plugin>>,
}

impl ProjectSetup {
    /// Default settings with the given entries.
    pub fn new(entries: &[&str]) -> Self {
        Self {
            entries: entries.iter().map(|e| e.to_string()).collect(),
            schedule: ChildSchedule::default(),
            config: OffloadConfig::default(),
            plugins: Vec::new(),
        }
    }

    /// Runs the worker compilation at `schedule`.
    pub fn schedule(mut self, schedule: ChildSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Adds a plugin after the coordinator.
    pub fn plugin(mut self, plugin: Box<dyn Plugin>) -> Self {
        self.plugins.push(plugin);
        self
    }
}

impl Project {
    /// A project with `files` (plus the default worker bootstrap module)
    /// and default settings.
    pub fn new(files: &[(&str, &str)], entries: &[&str]) -> Result<Self, HostError> {
        Self::build(files, ProjectSetup::new(entries))
    }

    /// A project with explicit settings.
    pub fn build(files: &[(&str, &str)], setup: ProjectSetup) -> Result<Self, HostError> {
        let mut fs = MemoryFs::new();
        fs.write(DEFAULT_WORKER_ENTRY, WORKER_BOOTSTRAP);
        for (path, text) in files {
            fs.write(*path, *text);
        }

        let config = HostConfig {
            entries: setup.entries,
            child_schedule: setup.schedule,
            project_passes: vec![DISCOVERY_PASS.to_string()],
            ..HostConfig::default()
        };
        let mut compiler = Compiler::new(config, fs);
        let registry = Rc::new(FunctionRegistry::new());
        compiler.register_pass(Rc::new(DiscoveryPass::new(registry.sender())));

        let options = WorkerOptions::from_config(&setup.config.worker);
        let coordinator = WorkerCoordinator::new(options.clone(), Rc::clone(&registry));
        compiler.add_plugin(Box::new(coordinator))?;
        for plugin in setup.plugins {
            compiler.add_plugin(plugin)?;
        }
        Ok(Self {
            compiler,
            registry,
            options,
        })
    }

    /// Writes a file.
    pub fn write(&mut self, path: &str, text: &str) {
        self.compiler.fs_mut().write(path, text);
    }

    /// Runs generations until no additional pass is requested.
    pub fn run(&mut self) -> Result<Stats, HostError> {
        self.compiler.run()
    }

    /// Runs and panics unless the run succeeds without errors.
    pub fn run_clean(&mut self) -> Stats {
        match self.run() {
            Ok(stats) if !stats.has_errors() => stats,
            Ok(stats) => panic!("unexpected errors: {:?}", stats.errors),
            Err(e) => panic!("run failed: {e}"),
        }
    }

    /// The emitted worker bundle.
    pub fn worker_bundle(&self) -> Option<&str> {
        self.compiler.read_output(&self.options.output)
    }

    /// The emitted worker bundle's map.
    pub fn worker_map(&self) -> Option<SourceMap> {
        let json = self.compiler.read_output(&format!("{}.map", self.options.output))?;
        SourceMap::from_json(json).ok()
    }

    /// Identifiers registered in the worker bundle, in order.
    pub fn worker_function_ids(&self) -> Vec<String> {
        let Some(bundle) = self.worker_bundle() else {
            return Vec::new();
        };
        bundle
            .split("identifier: '")
            .skip(1)
            .filter_map(|rest| rest.split('\'').next())
            .map(str::to_string)
            .collect()
    }

    /// Whether the worker module, as last sealed into the cache, lists the
    /// module at `path` among its file dependencies.
    pub fn worker_depends_on(&self, path: &str) -> bool {
        self.compiler
            .cache()
            .get(WORKER_COMPILATION, &self.options.worker_request())
            .is_some_and(|worker| worker.file_dependencies.contains(Path::new(path)))
    }

    /// Whether the module at `path` currently registers worker functions.
    pub fn is_capability_user(&self, path: &str) -> bool {
        self.registry.is_known_user(Path::new(path))
    }
}

/// 1-based line and 0-based column of the first occurrence of `needle`.
pub fn find_position(text: &str, needle: &str) -> Option<(u32, u32)> {
    let offset = text.find(needle)?;
    let before = &text[..offset];
    let line = before.matches('\n').count() as u32 + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].encode_utf16().count() as u32;
    Some((line, column))
}

/// The original `(source, line, column)` of a generated position.
pub fn original_of(map: &SourceMap, line: u32, column: u32) -> Option<(String, u32, u32)> {
    let consumer = SourceMapConsumer::new(map).ok()?;
    let original = consumer.original_position_for(offload_sourcemap::Position::new(line, column))?;
    Some((
        original.source.clone(),
        original.position.line,
        original.position.column,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_position_counts_lines_and_columns() {
        assert_eq!(find_position("ab\ncd", "d"), Some((2, 1)));
        assert_eq!(find_position("ab", "a"), Some((1, 0)));
        assert_eq!(find_position("ab", "z"), None);
    }

    #[test]
    fn bootstrap_carries_the_marker() {
        assert!(WORKER_BOOTSTRAP.contains(offload_js_parser::STATIC_FUNCTIONS_MARKER));
    }
}
