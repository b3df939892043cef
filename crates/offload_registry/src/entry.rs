//! Registry entries.

use crate::id::FunctionId;
use offload_js_parser::ast::{Expr, Function};
use offload_sourcemap::SourceMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The syntax of an extracted function.
///
/// Spans point into the originating module's file in the shared source
/// database, which is how printed worker code maps back to it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ExtractedFunction {
    /// A named `function` declaration; relocated as a declaration.
    Declaration(Function),
    /// A function expression or arrow; referenced in place.
    Expression(Expr),
}

/// One extracted function.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionEntry {
    /// Stable identifier.
    pub id: FunctionId,
    /// The function's syntax.
    pub function: ExtractedFunction,
    /// Resource path of the module it was extracted from.
    pub origin: PathBuf,
}

/// All functions one module contributes, with the map fragment for them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegisteredModule {
    /// Resource path of the module.
    pub path: PathBuf,
    /// Functions in extraction order.
    pub functions: Vec<FunctionEntry>,
    /// Maps the module's parsed text back to its own original source, when
    /// the module was itself produced by an earlier transform.
    pub map: Option<SourceMap>,
}

impl RegisteredModule {
    /// A module entry without a map fragment.
    pub fn new(path: impl Into<PathBuf>, functions: Vec<FunctionEntry>) -> Self {
        Self {
            path: path.into(),
            functions,
            map: None,
        }
    }

    /// Attaches a map fragment.
    pub fn with_map(mut self, map: SourceMap) -> Self {
        self.map = Some(map);
        self
    }
}
