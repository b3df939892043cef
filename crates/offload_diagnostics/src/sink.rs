//! Per-compilation diagnostic accumulator.

use crate::diagnostic::Diagnostic;
use std::cell::{Cell, RefCell};

/// Accumulates the diagnostics of one compilation.
///
/// The build runs on a single thread, so emission goes through a `RefCell`;
/// parsers and passes can report through a shared `&DiagnosticSink`.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: RefCell<Vec<Diagnostic>>,
    error_count: Cell<usize>,
}

impl DiagnosticSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic.
    pub fn emit(&self, diag: Diagnostic) {
        if diag.severity.is_error() {
            self.error_count.set(self.error_count.get() + 1);
        }
        self.diagnostics.borrow_mut().push(diag);
    }

    /// Records every diagnostic from `diags`, in order.
    pub fn extend(&self, diags: impl IntoIterator<Item = Diagnostic>) {
        for diag in diags {
            self.emit(diag);
        }
    }

    /// Returns `true` if any error has been emitted.
    pub fn has_errors(&self) -> bool {
        self.error_count.get() > 0
    }

    /// Number of errors emitted so far. Not reset by [`take_all`](Self::take_all).
    pub fn error_count(&self) -> usize {
        self.error_count.get()
    }

    /// Returns `true` if nothing is currently held.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.borrow().is_empty()
    }

    /// Removes and returns everything held.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.borrow_mut())
    }

    /// Returns a copy of everything held.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }
}
