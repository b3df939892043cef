//! Build diagnostics: codes, severities, the per-compilation sink and rendering.
//!
//! Every user-facing problem a build encounters (a parse error in a module, a
//! failed transform, an error forwarded from the worker compilation) becomes
//! a [`Diagnostic`] on the [`DiagnosticSink`] of the compilation it belongs to.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
