//! JavaScript printer with source-map generation.
//!
//! [`generate`] prints a [`Program`] in a stable, conventional layout (two
//! space indentation, one statement per line, multi-line object literals)
//! and produces a [`SourceMap`] that maps every printed node back to the
//! file its span came from. Nodes can come from several files, e.g. a
//! bootstrap module with functions inserted from application modules; each
//! file is listed as its own source with embedded content. Synthesized nodes
//! have no mapping.

#![warn(missing_docs)]

mod expr;
/// Printer options.
pub mod options;
mod printer;

pub use options::{GeneratorOptions, QuoteStyle};

use offload_common::Interner;
use offload_js_parser::Program;
use offload_source::SourceDb;
use offload_sourcemap::SourceMap;

/// Printed code and its source map.
#[derive(Clone, Debug, PartialEq)]
pub struct Generated {
    /// The code, without a trailing newline.
    pub code: String,
    /// Mappings from `code` back to the parsed sources.
    pub map: SourceMap,
}

/// Prints `program` as the file `file_name`.
///
/// Output depends only on the tree, so printing equal trees twice yields
/// identical code and maps.
pub fn generate(
    program: &Program,
    file_name: &str,
    source_db: &SourceDb,
    interner: &Interner,
    options: &GeneratorOptions,
) -> Generated {
    let mut printer = printer::Printer::new(file_name, source_db, interner, options);
    printer.print_program(program);
    printer.finish_mappings();
    Generated {
        code: printer.out,
        map: printer.builder.build(),
    }
}
