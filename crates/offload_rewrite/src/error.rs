//! Rewrite errors.

use offload_registry::FunctionId;
use offload_sourcemap::SourceMapError;
use std::path::PathBuf;

/// Errors from relocating functions into the bootstrap module.
///
/// A failed rewrite produces no output.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    /// Functions are registered but the module has no insertion marker.
    #[error("{count} registered function(s) but no insertion marker in '{}'", path.display())]
    MissingInsertionMarker {
        /// The bootstrap module.
        path: PathBuf,
        /// Number of functions that could not be placed.
        count: usize,
    },

    /// Two registered functions share an identifier.
    #[error("function identifier '{id}' is registered twice")]
    DuplicateFunctionId {
        /// The shared identifier.
        id: FunctionId,
    },

    /// A function declaration without a name cannot be referenced.
    #[error("registered declaration '{id}' has no name")]
    UnnamedDeclaration {
        /// Identifier of the entry.
        id: FunctionId,
    },

    /// An expression entry is not a function or arrow.
    #[error("registered expression '{id}' is not a function")]
    NotAFunction {
        /// Identifier of the entry.
        id: FunctionId,
    },

    /// The loader query is not valid transform options.
    #[error("invalid transform options: {reason}")]
    Options {
        /// The JSON error.
        reason: String,
    },

    /// The bootstrap module did not parse.
    #[error("'{}' has {errors} syntax error(s)", path.display())]
    Parse {
        /// The bootstrap module.
        path: PathBuf,
        /// Number of reported errors.
        errors: usize,
    },

    /// A configured pass is not registered with the host.
    #[error("unknown transform pass '{name}'")]
    UnknownPass {
        /// The configured name.
        name: String,
    },

    /// A configured pass failed.
    #[error("transform pass '{name}' failed: {reason}")]
    Pass {
        /// The pass name.
        name: String,
        /// What went wrong.
        reason: String,
    },

    /// A map could not be merged.
    #[error(transparent)]
    SourceMap(#[from] SourceMapError),
}
