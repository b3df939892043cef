//! The host loader that turns the worker bootstrap module into the worker
//! registry module.

use crate::error::RewriteError;
use crate::rewriter::register_worker_functions;
use offload_codegen::generate;
use offload_config::TransformOptions;
use offload_host::{BoxError, LoadedSource, Loader, LoaderContext, PassContext};
use offload_js_parser::parse_file;
use offload_registry::{FunctionRegistry, RegistrySnapshot};
use offload_sourcemap::{merge_source_maps, SourceMap};
use std::rc::Rc;

/// Name the loader is registered under.
pub const REGISTRATOR_LOADER: &str = "offload-worker-registrator";

/// Pass name that triggers function relocation from the registry.
pub const EXTRACTION_PASS: &str = "offload:register-static-functions";

/// Rewrites the worker bootstrap module with the registered functions.
///
/// The loader query is a JSON [`TransformOptions`]. Passes run in order:
/// the project's passes unless `ignoreProjectConfig` is set, then `plugins`.
/// [`EXTRACTION_PASS`] drains the registry and relocates its functions; any
/// other name must be registered with the host. Every module that
/// contributed functions becomes a file dependency of the output.
pub struct WorkerRegistratorLoader {
    registry: Rc<FunctionRegistry>,
}

impl WorkerRegistratorLoader {
    /// A loader reading from `registry`.
    pub fn new(registry: Rc<FunctionRegistry>) -> Self {
        Self { registry }
    }

    fn transform(
        &self,
        ctx: &mut LoaderContext<'_>,
        input: LoadedSource,
    ) -> Result<LoadedSource, RewriteError> {
        let options = TransformOptions::from_json(ctx.query).map_err(|e| RewriteError::Options {
            reason: e.to_string(),
        })?;
        let path = ctx.resource_path;
        let name = path.to_string_lossy().replace('\\', "/");
        let upstream = input.map;

        let file = ctx.source_db.load_source(path, input.code);
        let errors_before = ctx.diagnostics.error_count();
        let mut program = parse_file(file, &*ctx.source_db, ctx.interner, ctx.diagnostics);
        let errors = ctx.diagnostics.error_count() - errors_before;
        if errors > 0 {
            return Err(RewriteError::Parse {
                path: path.to_path_buf(),
                errors,
            });
        }

        let project = if options.ignore_project_config {
            &[][..]
        } else {
            ctx.project_passes
        };
        let mut snapshot: Option<RegistrySnapshot> = None;
        for pass_name in project.iter().chain(&options.plugins) {
            if pass_name == EXTRACTION_PASS {
                let drained = self.registry.drain();
                register_worker_functions(&mut program, &drained, ctx.interner, path)?;
                snapshot = Some(drained);
                continue;
            }
            let pass = ctx
                .passes
                .get(pass_name)
                .ok_or_else(|| RewriteError::UnknownPass {
                    name: pass_name.clone(),
                })?;
            let pass_ctx = PassContext {
                resource_path: path,
                file,
                source_db: &*ctx.source_db,
                interner: ctx.interner,
                upstream_map: upstream.as_ref(),
                options: &options.options,
            };
            pass.run(&mut program, &pass_ctx)
                .map_err(|e| RewriteError::Pass {
                    name: pass_name.clone(),
                    reason: e.to_string(),
                })?;
        }

        let generated = generate(&program, &name, &*ctx.source_db, ctx.interner, &options.generator);
        let snapshot = snapshot.unwrap_or_default();
        let fragments: Vec<(String, &SourceMap)> = snapshot.fragments().collect();
        let map = merge_source_maps(
            &name,
            upstream.as_ref(),
            Some(&generated.map),
            fragments.iter().map(|(source, map)| (source.as_str(), *map)),
        )?;
        for module in &snapshot.modules {
            ctx.add_dependency(module.path.clone());
        }
        Ok(LoadedSource {
            code: generated.code,
            map,
        })
    }
}

impl Loader for WorkerRegistratorLoader {
    fn load(&self, ctx: &mut LoaderContext<'_>, input: LoadedSource) -> Result<LoadedSource, BoxError> {
        Ok(self.transform(ctx, input)?)
    }
}
