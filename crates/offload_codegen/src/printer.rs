//! Output buffer with position tracking and statement printing.
//!
//! The printer keeps the current generated line (1-based) and column (UTF-16
//! units) so every node start can be recorded as a source-map mapping back to
//! the file its span belongs to. Expression printing lives in `expr.rs`.

use crate::options::GeneratorOptions;
use offload_common::{Ident, Interner};
use offload_js_parser::ast::*;
use offload_source::{FileId, SourceDb, Span};
use offload_sourcemap::{Mapping, Position, SourceMapBuilder};
use std::collections::BTreeSet;

const INDENT: &str = "  ";

pub(crate) struct Printer<'a> {
    pub(crate) out: String,
    line: u32,
    column: u32,
    indent: usize,
    db: &'a SourceDb,
    pub(crate) interner: &'a Interner,
    pub(crate) options: &'a GeneratorOptions,
    mappings: Vec<Mapping>,
    embedded: BTreeSet<FileId>,
    pub(crate) builder: SourceMapBuilder,
}

impl<'a> Printer<'a> {
    pub(crate) fn new(
        file_name: &str,
        db: &'a SourceDb,
        interner: &'a Interner,
        options: &'a GeneratorOptions,
    ) -> Self {
        Self {
            out: String::new(),
            line: 1,
            column: 0,
            indent: 0,
            db,
            interner,
            options,
            mappings: Vec::new(),
            embedded: BTreeSet::new(),
            builder: SourceMapBuilder::new(Some(file_name.to_string())),
        }
    }

    // ========================================================================
    // Output primitives
    // ========================================================================

    pub(crate) fn write(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += c.len_utf16() as u32;
            }
        }
        self.out.push_str(text);
    }

    pub(crate) fn newline(&mut self) {
        self.write("\n");
        for _ in 0..self.indent {
            self.write(INDENT);
        }
    }

    pub(crate) fn indent(&mut self) {
        self.indent += 1;
    }

    pub(crate) fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    pub(crate) fn write_name(&mut self, name: Ident) {
        let interner = self.interner;
        self.write(interner.resolve(name));
    }

    /// Writes `value` as a quoted string literal.
    pub(crate) fn write_string(&mut self, value: &str) {
        let quote = self.options.quotes.as_char();
        let mut text = String::with_capacity(value.len() + 2);
        text.push(quote);
        for c in value.chars() {
            match c {
                '\\' => text.push_str("\\\\"),
                '\n' => text.push_str("\\n"),
                '\r' => text.push_str("\\r"),
                '\t' => text.push_str("\\t"),
                '\0' => text.push_str("\\0"),
                c if c == quote => {
                    text.push('\\');
                    text.push(c);
                }
                c => text.push(c),
            }
        }
        text.push(quote);
        self.write(&text);
    }

    // ========================================================================
    // Mappings
    // ========================================================================

    /// Records that the current output position corresponds to the start of
    /// `span`. Synthesized nodes carry no location and are skipped.
    pub(crate) fn mark(&mut self, span: Span, name: Option<Ident>) {
        if span.is_dummy() {
            return;
        }
        let db = self.db;
        let Some(file) = db.get(span.file) else {
            return;
        };
        let source = source_name(&file.path);
        let (line, column) = file.position(span.start);
        let generated = Position::new(self.line, self.column);

        if let Some(last) = self.mappings.last_mut() {
            if last.generated == generated {
                // Outer and inner nodes often start together; keep one
                // mapping, preferring the one that carries a name.
                if let (Some(name), Some(original)) = (name, last.original.as_mut()) {
                    if original.name.is_none() {
                        original.name = Some(self.interner.resolve(name).to_string());
                    }
                }
                return;
            }
        }

        let mut mapping = Mapping::new(generated, source.clone(), Position::new(line, column));
        if let Some(name) = name {
            mapping = mapping.with_name(self.interner.resolve(name));
        }
        self.mappings.push(mapping);

        if self.embedded.insert(span.file) {
            self.builder.set_source_content(source, file.content.clone());
        }
    }

    pub(crate) fn finish_mappings(&mut self) {
        for mapping in self.mappings.drain(..) {
            self.builder.add_mapping(mapping);
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    pub(crate) fn print_program(&mut self, program: &Program) {
        for (i, stmt) in program.body.iter().enumerate() {
            if i > 0 {
                self.newline();
            }
            self.print_stmt(stmt);
        }
    }

    pub(crate) fn print_stmt(&mut self, stmt: &Stmt) {
        self.mark(stmt.span, None);
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                if starts_ambiguously(expr) {
                    self.write("(");
                    self.print_expr(expr, 0);
                    self.write(")");
                } else {
                    self.print_expr(expr, 0);
                }
                self.write(";");
            }
            StmtKind::Function(function) => self.print_function(function),
            StmtKind::Var { kind, declarators } => {
                self.write(kind.as_str());
                self.write(" ");
                for (i, decl) in declarators.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.print_binding(&decl.name);
                    if let Some(init) = &decl.init {
                        self.write(" = ");
                        self.print_expr(init, 1);
                    }
                }
                self.write(";");
            }
            StmtKind::Return(argument) => {
                self.write("return");
                if let Some(argument) = argument {
                    self.write(" ");
                    self.print_expr(argument, 0);
                }
                self.write(";");
            }
            StmtKind::If {
                test,
                consequent,
                alternate,
            } => {
                self.write("if (");
                self.print_expr(test, 0);
                self.write(") ");
                self.print_stmt(consequent);
                if let Some(alternate) = alternate {
                    self.write(" else ");
                    self.print_stmt(alternate);
                }
            }
            StmtKind::Block(body) => self.print_block(body),
            StmtKind::Import { default, source } => {
                self.write("import ");
                if let Some(binding) = default {
                    self.print_binding(binding);
                    self.write(" from ");
                }
                self.write_string(source);
                self.write(";");
            }
            StmtKind::Empty | StmtKind::Error => self.write(";"),
        }
    }

    pub(crate) fn print_block(&mut self, body: &[Stmt]) {
        self.write("{");
        if body.is_empty() {
            self.write("}");
            return;
        }
        self.indent();
        for stmt in body {
            self.newline();
            self.print_stmt(stmt);
        }
        self.dedent();
        self.newline();
        self.write("}");
    }

    pub(crate) fn print_binding(&mut self, binding: &Binding) {
        self.mark(binding.span, Some(binding.name));
        self.write_name(binding.name);
    }

    pub(crate) fn print_function(&mut self, function: &Function) {
        self.mark(function.span, None);
        if function.is_arrow {
            if let [param] = function.params.as_slice() {
                self.print_binding(param);
            } else {
                self.print_params(&function.params);
            }
            self.write(" => ");
            match &function.body {
                FunctionBody::Block(body) => self.print_block(body),
                FunctionBody::Expr(expr) => {
                    if starts_ambiguously(expr) {
                        self.write("(");
                        self.print_expr(expr, 0);
                        self.write(")");
                    } else {
                        self.print_expr(expr, 1);
                    }
                }
            }
            return;
        }

        self.write("function ");
        if let Some(name) = &function.name {
            self.print_binding(name);
        }
        self.print_params(&function.params);
        self.write(" ");
        match &function.body {
            FunctionBody::Block(body) => self.print_block(body),
            FunctionBody::Expr(expr) => {
                self.write("{");
                self.indent();
                self.newline();
                self.write("return ");
                self.print_expr(expr, 0);
                self.write(";");
                self.dedent();
                self.newline();
                self.write("}");
            }
        }
    }

    fn print_params(&mut self, params: &[Binding]) {
        self.write("(");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.print_binding(param);
        }
        self.write(")");
    }
}

/// Whether an expression in statement position would begin with `function`
/// or `{` and so needs parentheses.
fn starts_ambiguously(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Function(function) => !function.is_arrow,
        ExprKind::Object(_) => true,
        ExprKind::Call { callee: first, .. }
        | ExprKind::Member { object: first, .. }
        | ExprKind::Index { object: first, .. } => {
            !is_function_expression(first) && starts_ambiguously(first)
        }
        ExprKind::Binary { left: first, .. }
        | ExprKind::Assign { target: first, .. }
        | ExprKind::Conditional { test: first, .. } => starts_ambiguously(first),
        ExprKind::Paren(inner) => starts_ambiguously(inner),
        _ => false,
    }
}

/// A non-arrow function expression, which gets its own parentheses when
/// called or accessed.
pub(crate) fn is_function_expression(expr: &Expr) -> bool {
    matches!(expr.as_function(), Some(function) if !function.is_arrow)
}

/// Source-map name for a file path, with forward slashes.
pub(crate) fn source_name(path: &std::path::Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
