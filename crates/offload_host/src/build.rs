//! Building, caching and bundling modules.

use crate::compilation::Compilation;
use crate::compiler::HostConfig;
use crate::fs::MemoryFs;
use crate::loader::{LoadedSource, LoaderContext, LoaderTable, PassContext, PassTable};
use crate::module::{Module, ModuleStatus};
use crate::request::Request;
use offload_cache::{CachedModule, ModuleArtifact, ModuleCache};
use offload_codegen::{generate, GeneratorOptions};
use offload_common::Interner;
use offload_diagnostics::code::{Category, DiagnosticCode};
use offload_diagnostics::Diagnostic;
use offload_js_parser::ast::StmtKind;
use offload_js_parser::{parse_file, Program};
use offload_source::{SourceDb, Span};
use offload_sourcemap::{merge_source_maps, SourceMap, SourceMapBuilder};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

const TRANSFORM_FAILED: u16 = 201;
const RESOURCE_NOT_FOUND: u16 = 301;
const UNKNOWN_LOADER: u16 = 302;

/// Everything the host needs to build modules, apart from the plugins.
pub(crate) struct BuildCore {
    pub(crate) config: HostConfig,
    pub(crate) fs: MemoryFs,
    pub(crate) cache: ModuleCache,
    pub(crate) source_db: SourceDb,
    pub(crate) interner: Interner,
    pub(crate) loaders: LoaderTable,
    pub(crate) passes: PassTable,
    pub(crate) project_passes: Vec<String>,
    pub(crate) output: BTreeMap<String, String>,
}

fn report(compilation: &Compilation, number: u16, category: Category, message: String, request: &str) {
    compilation.errors.emit(
        Diagnostic::error(DiagnosticCode::new(category, number), message, Span::DUMMY)
            .with_note(format!("while building '{request}'")),
    );
}

/// Source-map name of a resource path.
pub(crate) fn path_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Resolves a relative import against the importing module's directory.
fn resolve_import(importer: &Path, specifier: &str) -> PathBuf {
    let base = importer.parent().unwrap_or(Path::new(""));
    let mut resolved = PathBuf::new();
    for component in base.join(specifier).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }
    resolved
}

/// Requests of the relative imports of `program`. Bare specifiers are
/// external and not built.
fn relative_imports(program: &Program, resource: &Path) -> Vec<String> {
    program
        .body
        .iter()
        .filter_map(|stmt| match &stmt.kind {
            StmtKind::Import { source, .. }
                if source.starts_with("./") || source.starts_with("../") =>
            {
                Some(path_name(&resolve_import(resource, source)))
            }
            _ => None,
        })
        .collect()
}

impl BuildCore {
    /// Builds `raw_request`, or reuses it from the cache.
    ///
    /// Failures are reported on `compilation` and yield a failed module.
    pub(crate) fn build_module(&mut self, compilation: &Compilation, raw_request: &str) -> Module {
        if let Some(cached) = self
            .cache
            .lookup(&compilation.cache_namespace, raw_request, &self.fs)
        {
            return Module::from_cached(cached);
        }

        let request = Request::parse(raw_request);
        let mut module = Module::new(request.resource.clone(), raw_request);
        tracing::debug!(
            compilation = %compilation.name,
            request = raw_request,
            "building module"
        );

        let Some(file) = self.fs.read(&request.resource) else {
            report(
                compilation,
                RESOURCE_NOT_FOUND,
                Category::Build,
                format!("module not found: '{}'", request.resource.display()),
                raw_request,
            );
            return module;
        };
        let input = LoadedSource {
            code: file.text.clone(),
            map: file.map.clone(),
        };

        let output = if request.loaders.is_empty() {
            self.compile_plain(compilation, &mut module, input)
        } else {
            self.run_loaders(compilation, &request, &mut module, input)
        };
        if let Some(output) = output {
            module.status = ModuleStatus::Built;
            module.artifact = Some(ModuleArtifact {
                code: output.code,
                map: output.map,
            });
        }
        module
    }

    /// Parses the resource, runs the project passes and prints it.
    fn compile_plain(
        &mut self,
        compilation: &Compilation,
        module: &mut Module,
        input: LoadedSource,
    ) -> Option<LoadedSource> {
        let name = path_name(&module.resource);
        let file = self.source_db.load_source(module.resource.clone(), input.code);
        let errors_before = compilation.errors.error_count();
        let mut program = parse_file(file, &self.source_db, &self.interner, &compilation.errors);
        if compilation.errors.error_count() > errors_before {
            return None;
        }

        let options = BTreeMap::new();
        for pass_name in &self.project_passes {
            let Some(pass) = self.passes.get(pass_name) else {
                report(
                    compilation,
                    TRANSFORM_FAILED,
                    Category::Transform,
                    format!("unknown transform pass '{pass_name}'"),
                    &module.raw_request,
                );
                return None;
            };
            let ctx = PassContext {
                resource_path: &module.resource,
                file,
                source_db: &self.source_db,
                interner: &self.interner,
                upstream_map: input.map.as_ref(),
                options: &options,
            };
            if let Err(e) = pass.run(&mut program, &ctx) {
                report(
                    compilation,
                    TRANSFORM_FAILED,
                    Category::Transform,
                    format!("transform pass '{pass_name}' failed: {e}"),
                    &module.raw_request,
                );
                return None;
            }
        }

        module.dependencies = relative_imports(&program, &module.resource);
        let generated = generate(
            &program,
            &name,
            &self.source_db,
            &self.interner,
            &GeneratorOptions::default(),
        );
        match merge_source_maps(
            &name,
            input.map.as_ref(),
            Some(&generated.map),
            std::iter::empty::<(&str, &SourceMap)>(),
        ) {
            Ok(map) => Some(LoadedSource {
                code: generated.code,
                map,
            }),
            Err(e) => {
                report(
                    compilation,
                    TRANSFORM_FAILED,
                    Category::Transform,
                    format!("invalid source map for '{name}': {e}"),
                    &module.raw_request,
                );
                None
            }
        }
    }

    /// Runs the request's loaders, rightmost first.
    fn run_loaders(
        &mut self,
        compilation: &Compilation,
        request: &Request,
        module: &mut Module,
        input: LoadedSource,
    ) -> Option<LoadedSource> {
        let mut current = input;
        for loader_request in request.loaders.iter().rev() {
            let Some(loader) = self.loaders.get(&loader_request.name) else {
                report(
                    compilation,
                    UNKNOWN_LOADER,
                    Category::Build,
                    format!("unknown loader '{}'", loader_request.name),
                    &module.raw_request,
                );
                return None;
            };
            let mut ctx = LoaderContext {
                resource_path: &module.resource,
                query: &loader_request.query,
                source_db: &mut self.source_db,
                interner: &self.interner,
                diagnostics: &compilation.errors,
                passes: &self.passes,
                project_passes: &self.project_passes,
                file_dependencies: &mut module.file_dependencies,
            };
            current = match loader.load(&mut ctx, current) {
                Ok(output) => output,
                Err(e) => {
                    report(
                        compilation,
                        TRANSFORM_FAILED,
                        Category::Transform,
                        format!("loader '{}' failed: {e}", loader_request.name),
                        &module.raw_request,
                    );
                    return None;
                }
            };
        }
        Some(current)
    }

    /// Records the outcome of every module of `compilation` and its
    /// children in the cache.
    ///
    /// Rebuilt modules are stored with a fresh snapshot of all their file
    /// dependencies. Reused modules only gain the dependencies merged into
    /// them since, unsnapshotted, which forces a rebuild next generation.
    pub(crate) fn seal(&mut self, compilation: &Compilation) {
        let namespace = &compilation.cache_namespace;
        for module in compilation.modules() {
            match (module.status, module.rebuilt, &module.artifact) {
                (ModuleStatus::Built, true, Some(artifact)) => {
                    let cached = CachedModule::new(
                        module.resource.clone(),
                        module.raw_request.clone(),
                        module.file_dependencies.clone(),
                        module.dependencies.clone(),
                        artifact.clone(),
                        &self.fs,
                    );
                    self.cache.insert(namespace, cached);
                }
                (ModuleStatus::Built, false, _) => {
                    self.cache.merge_dependencies(
                        namespace,
                        &module.raw_request,
                        module.file_dependencies.iter().cloned(),
                    );
                }
                _ => {
                    self.cache.remove(namespace, &module.raw_request);
                }
            }
        }
        for child in compilation.children() {
            self.seal(child);
        }
    }

    /// Concatenates the built modules into the compilation's bundle and map.
    ///
    /// A compilation with errors produces no bundle.
    pub(crate) fn bundle(&self, compilation: &mut Compilation) {
        if compilation.errors.has_errors() {
            tracing::debug!(compilation = %compilation.name, "not bundling a compilation with errors");
            return;
        }
        let filename = compilation.output_filename.clone();
        let map_name = format!("{filename}.map");
        let mut code = String::new();
        let mut builder = SourceMapBuilder::new(Some(filename.clone()));
        let mut line_offset = 0u32;

        for artifact in compilation.modules().iter().filter_map(|m| m.artifact.as_ref()) {
            if !code.is_empty() {
                code.push('\n');
                line_offset += 1;
            }
            if let Some(map) = &artifact.map {
                if let Err(e) = builder.append_map(map, line_offset) {
                    tracing::warn!(bundle = %filename, error = %e, "dropping unreadable module map");
                }
            }
            code.push_str(&artifact.code);
            line_offset += artifact.code.matches('\n').count() as u32;
        }
        if code.is_empty() {
            return;
        }
        code.push_str(&format!("\n//# sourceMappingURL={map_name}"));
        compilation.assets.insert(filename, code);
        compilation.assets.insert(map_name, builder.build().to_json());
    }

    /// Writes the compilation's assets to the output.
    pub(crate) fn emit(&mut self, compilation: &Compilation) -> Vec<String> {
        for (name, content) in &compilation.assets {
            self.output.insert(name.clone(), content.clone());
        }
        compilation.assets.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_imports() {
        assert_eq!(
            resolve_import(Path::new("src/app/main.js"), "./util.js"),
            PathBuf::from("src/app/util.js")
        );
        assert_eq!(
            resolve_import(Path::new("src/app/main.js"), "../lib/x.js"),
            PathBuf::from("src/lib/x.js")
        );
        assert_eq!(resolve_import(Path::new("main.js"), "./a.js"), PathBuf::from("a.js"));
    }
}
