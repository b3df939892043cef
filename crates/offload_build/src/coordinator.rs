//! The host plugin that produces the worker bundle.

use crate::error::CoordinatorError;
use crate::options::{WorkerOptions, WORKER_COMPILATION};
use crate::state::{CoordinatorEvent, CoordinatorState};
use crate::tracker::DependencyTracker;
use offload_diagnostics::{Category, Diagnostic, DiagnosticCode};
use offload_host::{
    BoxError, ChildCompilationRequest, ChildHandle, Compilation, CompilerSetup, HostError, Module,
    Plugin, Stats,
};
use offload_registry::FunctionRegistry;
use offload_rewrite::{WorkerRegistratorLoader, REGISTRATOR_LOADER};
use std::rc::Rc;

const WORKER_FAILED: u16 = 401;

/// Runs the worker compilation and keeps the worker module's dependencies
/// in step with the modules that contribute functions.
pub struct WorkerCoordinator {
    options: WorkerOptions,
    worker_request: String,
    registry: Rc<FunctionRegistry>,
    tracker: DependencyTracker,
    state: CoordinatorState,
    secondary: Option<ChildHandle>,
    first_generation: bool,
}

impl WorkerCoordinator {
    /// A coordinator building `options.entry` with functions from `registry`.
    pub fn new(options: WorkerOptions, registry: Rc<FunctionRegistry>) -> Self {
        let worker_request = options.worker_request();
        Self {
            options,
            worker_request,
            registry,
            tracker: DependencyTracker::new(),
            state: CoordinatorState::Idle,
            secondary: None,
            first_generation: true,
        }
    }

    /// Current state.
    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// The dependency tracker.
    pub fn tracker(&self) -> &DependencyTracker {
        &self.tracker
    }

    /// The request of the worker module.
    pub fn worker_request(&self) -> &str {
        &self.worker_request
    }

    fn advance(&mut self, event: CoordinatorEvent) -> Result<(), CoordinatorError> {
        self.state = self.state.transition(event)?;
        Ok(())
    }

    fn finalize(&mut self, primary: &mut Compilation) -> Result<(), CoordinatorError> {
        self.advance(CoordinatorEvent::PrimaryCompiled)?;
        let not_found = || CoordinatorError::WorkerModuleNotFound {
            request: self.worker_request.clone(),
        };
        let handle = self.secondary.ok_or_else(not_found)?;
        let module = primary
            .child_mut(handle)
            .and_then(|child| child.module_by_request_mut(&self.worker_request))
            .ok_or_else(not_found)?;
        module
            .file_dependencies
            .extend(self.tracker.dependents().iter().cloned());
        tracing::debug!(
            dependents = self.tracker.dependents().len(),
            "worker module dependencies finalized"
        );
        Ok(())
    }
}

impl Plugin for WorkerCoordinator {
    fn name(&self) -> &str {
        "offload-worker"
    }

    fn apply(&mut self, setup: &mut CompilerSetup<'_>) -> Result<(), BoxError> {
        setup.register_loader(
            REGISTRATOR_LOADER,
            Rc::new(WorkerRegistratorLoader::new(Rc::clone(&self.registry))),
        );
        Ok(())
    }

    fn make(&mut self, compilation: &Compilation) -> Result<Option<ChildCompilationRequest>, BoxError> {
        if compilation.is_child() {
            return Ok(None);
        }
        self.advance(CoordinatorEvent::PrimaryStarted)?;
        self.advance(CoordinatorEvent::SecondaryRequested)?;
        self.secondary = None;
        Ok(Some(ChildCompilationRequest {
            name: WORKER_COMPILATION.to_string(),
            entry_request: self.worker_request.clone(),
            output_filename: self.options.output.clone(),
            cache_namespace: WORKER_COMPILATION.to_string(),
        }))
    }

    fn child_compilation_created(&mut self, child: &mut Compilation) -> Result<(), BoxError> {
        if child.name == WORKER_COMPILATION {
            self.tracker.reset_epoch();
        }
        Ok(())
    }

    fn module_built(&mut self, compilation: &Compilation, module: &Module) -> Result<(), BoxError> {
        if !compilation.is_child() {
            self.tracker.on_module_built(&module.resource, &*self.registry);
        }
        Ok(())
    }

    fn child_compilation_finished(
        &mut self,
        parent: &mut Compilation,
        child: ChildHandle,
    ) -> Result<(), BoxError> {
        let Some(secondary) = parent.child(child) else {
            return Ok(());
        };
        if secondary.name != WORKER_COMPILATION {
            return Ok(());
        }
        let forwarded: Vec<Diagnostic> = secondary
            .errors
            .diagnostics()
            .into_iter()
            .filter(|d| d.severity.is_error())
            .collect();
        self.advance(CoordinatorEvent::SecondaryFinished)?;
        self.secondary = Some(child);
        for error in forwarded {
            tracing::warn!(code = %error.code, message = %error.message, "worker compilation failed");
            parent.errors.emit(
                Diagnostic::error(
                    DiagnosticCode::new(Category::Worker, WORKER_FAILED),
                    format!("worker compilation: {}", error.message),
                    error.primary_span,
                )
                .with_note(format!("reported as {}", error.code)),
            );
        }
        Ok(())
    }

    fn after_compile(&mut self, compilation: &mut Compilation) -> Result<(), BoxError> {
        if compilation.is_child() {
            return Ok(());
        }
        Ok(self.finalize(compilation)?)
    }

    fn need_additional_pass(&mut self) -> bool {
        let needed = self.tracker.needs_additional_pass(self.first_generation);
        if needed {
            tracing::info!("new worker dependencies; requesting an additional pass");
        }
        needed
    }

    fn done(&mut self, _stats: &Stats) {
        if let Err(e) = self.advance(CoordinatorEvent::Done) {
            tracing::warn!(error = %e, "generation ended out of order");
            self.state = CoordinatorState::Idle;
        }
        self.first_generation = false;
    }

    fn failed(&mut self, _error: &HostError) {
        self.state = CoordinatorState::Idle;
        self.secondary = None;
    }
}
