//! Recursive descent parser for the JavaScript subset handled by the build.
//!
//! The subset covers what bundled application modules and worker bootstrap
//! files need: function declarations and expressions, arrow functions,
//! `var`/`let`/`const`, `if`/`return`, blocks, default imports, calls, member
//! access, object and array literals, and the common binary operators.
//!
//! The main entry point is [`parse_file`]. A comment containing
//! [`ast::STATIC_FUNCTIONS_MARKER`] tags the statement that follows it with
//! [`ast::InsertionMarker::StaticFunctions`], at any nesting depth.
//!
//! # Architecture
//!
//! - **Lexer** ([`lexer`]): source text to tokens, recording marker comments.
//! - **Parser** ([`parser`]): statements by recursive descent, expressions by
//!   Pratt parsing, error recovery at statement boundaries.
//! - **AST** ([`ast`]): node types with spans and serde support.
//! - **Visitors** ([`visit`]): shared and mutable tree walkers.

#![warn(missing_docs)]

pub mod ast;
mod expr;
pub mod lexer;
pub mod parser;
mod stmt;
pub mod token;
pub mod visit;

pub use ast::{InsertionMarker, Program, STATIC_FUNCTIONS_MARKER};
pub use token::{JsToken, Token};

use offload_common::Interner;
use offload_diagnostics::DiagnosticSink;
use offload_source::{FileId, SourceDb};

/// Parses a JavaScript module into an AST.
///
/// Errors are reported to `sink` with codes `P101` (lexical) and `P102`
/// (syntax) and leave `Error` nodes in the tree.
pub fn parse_file(
    file_id: FileId,
    source_db: &SourceDb,
    interner: &Interner,
    sink: &DiagnosticSink,
) -> Program {
    let file = source_db.get_file(file_id);
    let source = &file.content;
    let lexed = lexer::lex(source, file_id, sink);
    let mut parser = parser::JsParser::new(lexed, source, interner, sink);
    parser.parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;
    use crate::visit::{walk_function, walk_program, Visit};
    use offload_common::Ident;
    use offload_diagnostics::Diagnostic;
    use offload_source::Span;

    fn parse_source(source: &str) -> (Program, Interner, Vec<Diagnostic>) {
        let mut db = SourceDb::new();
        let file_id = db.add_source("src/test.js", source.to_string());
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let program = parse_file(file_id, &db, &interner, &sink);
        (program, interner, sink.take_all())
    }

    fn parse_ok(source: &str) -> (Program, Interner) {
        let (program, interner, errors) = parse_source(source);
        assert!(
            errors.is_empty(),
            "unexpected errors: {:?}",
            errors.iter().map(|e| &e.message).collect::<Vec<_>>()
        );
        (program, interner)
    }

    #[derive(Default)]
    struct Collect {
        bindings: Vec<Ident>,
        references: Vec<Ident>,
        functions: usize,
    }

    impl Visit for Collect {
        fn visit_function(&mut self, function: &Function) {
            self.functions += 1;
            walk_function(self, function);
        }
        fn visit_binding(&mut self, binding: &Binding) {
            self.bindings.push(binding.name);
        }
        fn visit_reference(&mut self, name: Ident, _span: Span) {
            self.references.push(name);
        }
    }

    #[test]
    fn function_declaration() {
        let (program, interner) = parse_ok("function add(a, b) { return a + b; }");
        assert_eq!(program.body.len(), 1);
        let StmtKind::Function(function) = &program.body[0].kind else {
            panic!("expected function, got {:?}", program.body[0].kind);
        };
        assert_eq!(function.name_text(&interner), Some("add"));
        assert_eq!(function.params.len(), 2);
        assert!(!function.is_arrow);
        let FunctionBody::Block(body) = &function.body else {
            panic!("expected block body");
        };
        assert!(matches!(
            &body[0].kind,
            StmtKind::Return(Some(Expr {
                kind: ExprKind::Binary {
                    op: BinaryOp::Add,
                    ..
                },
                ..
            }))
        ));
    }

    #[test]
    fn arrow_functions() {
        let (program, _) = parse_ok("const f = x => x * 2; const g = (a, b) => { return a; }; const h = () => 1;");
        assert_eq!(program.body.len(), 3);
        for stmt in &program.body {
            let StmtKind::Var { declarators, .. } = &stmt.kind else {
                panic!("expected var");
            };
            let init = declarators[0].init.as_ref().expect("initializer");
            let function = init.as_function().expect("arrow");
            assert!(function.is_arrow);
        }
    }

    #[test]
    fn parenthesized_expression_is_not_an_arrow() {
        let (program, _) = parse_ok("const x = (a + b) * c;");
        let StmtKind::Var { declarators, .. } = &program.body[0].kind else {
            panic!("expected var");
        };
        let init = declarators[0].init.as_ref().expect("initializer");
        assert!(matches!(
            init.kind,
            ExprKind::Binary {
                op: BinaryOp::Mul,
                ..
            }
        ));
    }

    #[test]
    fn precedence_of_binary_operators() {
        let (program, _) = parse_ok("a || b && c === d + e * f;");
        let StmtKind::Expr(expr) = &program.body[0].kind else {
            panic!("expected expression statement");
        };
        let ExprKind::Binary { op, right, .. } = &expr.kind else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinaryOp::Or);
        assert!(matches!(
            right.kind,
            ExprKind::Binary {
                op: BinaryOp::And,
                ..
            }
        ));
    }

    #[test]
    fn member_call_chain_roots_at_identifier() {
        let (program, interner) = parse_ok("parallel.from([1, 2, 3]).map(function (x) { return x; });");
        let StmtKind::Expr(expr) = &program.body[0].kind else {
            panic!("expected expression statement");
        };
        let root = expr.root_ident().expect("root");
        assert_eq!(interner.resolve(root), "parallel");
        let ExprKind::Call { args, .. } = &expr.kind else {
            panic!("expected call");
        };
        assert!(args[0].as_function().is_some());
    }

    #[test]
    fn object_literal_with_shorthand() {
        let (program, interner) = parse_ok("const o = { a: 1, 'b': 2, c };");
        let StmtKind::Var { declarators, .. } = &program.body[0].kind else {
            panic!("expected var");
        };
        let Some(Expr {
            kind: ExprKind::Object(properties),
            ..
        }) = &declarators[0].init
        else {
            panic!("expected object");
        };
        assert_eq!(properties.len(), 3);
        assert!(matches!(&properties[1].key, PropertyKey::Str(s, _) if s == "b"));
        assert!(properties[2].shorthand);
        assert!(
            matches!(&properties[2].value.kind, ExprKind::Ident(n) if interner.resolve(*n) == "c")
        );
    }

    #[test]
    fn default_import() {
        let (program, interner) = parse_ok("import parallel from 'parallel-es';");
        let StmtKind::Import { default, source } = &program.body[0].kind else {
            panic!("expected import");
        };
        assert_eq!(source, "parallel-es");
        assert_eq!(interner.resolve(default.expect("binding").name), "parallel");
    }

    #[test]
    fn automatic_semicolon_on_newline() {
        let (program, _) = parse_ok("let a = 1\nlet b = 2\nif (a) { b = a }");
        assert_eq!(program.body.len(), 3);
    }

    #[test]
    fn marker_tags_following_top_level_statement() {
        let (program, _) = parse_ok(
            "const a = 1;\n/* OFFLOAD_STATIC_FUNCTIONS_PLACEHOLDER */\nconst b = 2;\nconst c = 3;",
        );
        assert_eq!(program.body[0].marker, None);
        assert_eq!(program.body[1].marker, Some(InsertionMarker::StaticFunctions));
        assert_eq!(program.body[2].marker, None);
    }

    #[test]
    fn marker_inside_iife_tags_inner_statement() {
        let (program, _) = parse_ok(
            "(function () {\n  const x = 1;\n  // OFFLOAD_STATIC_FUNCTIONS_PLACEHOLDER\n  run(x);\n})();",
        );
        assert_eq!(program.body[0].marker, None);
        let StmtKind::Expr(Expr {
            kind: ExprKind::Call { callee, .. },
            ..
        }) = &program.body[0].kind
        else {
            panic!("expected call");
        };
        let function = callee.as_function().expect("iife");
        let FunctionBody::Block(body) = &function.body else {
            panic!("expected block");
        };
        assert_eq!(body[0].marker, None);
        assert_eq!(body[1].marker, Some(InsertionMarker::StaticFunctions));
    }

    #[test]
    fn unrelated_comments_do_not_tag() {
        let (program, _) = parse_ok("// just a comment\nfoo();");
        assert_eq!(program.body[0].marker, None);
    }

    #[test]
    fn visitor_sees_bindings_and_references() {
        let (program, interner) = parse_ok("function f(a) { const b = a; return g(b); }");
        let mut collect = Collect::default();
        walk_program(&mut collect, &program);
        let bindings: Vec<_> = collect.bindings.iter().map(|n| interner.resolve(*n)).collect();
        let references: Vec<_> = collect.references.iter().map(|n| interner.resolve(*n)).collect();
        assert_eq!(bindings, ["f", "a", "b"]);
        assert_eq!(references, ["a", "g", "b"]);
        assert_eq!(collect.functions, 1);
    }

    #[test]
    fn error_recovery_continues_after_bad_statement() {
        let (program, _, errors) = parse_source("const = 1;\nfoo();");
        assert!(!errors.is_empty());
        assert!(errors.iter().all(|e| e.code.to_string().starts_with('P')));
        assert!(program
            .body
            .iter()
            .any(|s| matches!(&s.kind, StmtKind::Expr(Expr { kind: ExprKind::Call { .. }, .. }))));
    }

    #[test]
    fn unterminated_string_reports_lexical_error() {
        let (_, _, errors) = parse_source("const s = 'abc");
        assert!(errors.iter().any(|e| e.code.to_string() == "P101"));
    }

    #[test]
    fn ast_serializes_to_json() {
        let (program, _) = parse_ok("f(1);");
        let json = serde_json::to_string(&program).expect("serialize");
        let back: Program = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, program);
    }
}
