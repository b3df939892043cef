//! Inserts registered functions at the bootstrap module's marker.

use crate::error::RewriteError;
use crate::uid::UidGenerator;
use offload_common::{Ident, Interner};
use offload_js_parser::ast::{
    Binding, Expr, ExprKind, Function, FunctionBody, Program, Stmt, StmtKind, VarKind,
};
use offload_js_parser::visit::{walk_expr_mut, walk_function_mut, walk_stmts_mut, VisitMut};
use offload_registry::{ExtractedFunction, FunctionEntry, FunctionId, RegistrySnapshot};
use std::collections::BTreeSet;
use std::path::Path;

/// Global of the worker runtime that relocated functions register with.
pub const LOOKUP_TABLE: &str = "slaveFunctionLookupTable";
/// Registration method of [`LOOKUP_TABLE`].
pub const REGISTER_METHOD: &str = "registerStaticFunction";
/// Property that tags an object as a function identifier.
pub const FUNCTION_ID_TAG: &str = "_______isFunctionId";

/// What a rewrite did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RewriteSummary {
    /// Identifiers registered, in insertion order.
    pub registered: Vec<FunctionId>,
    /// Declarations renamed on insertion: identifier, original name, new name.
    pub renamed: Vec<(FunctionId, String, String)>,
}

/// `{ identifier: '<id>', _______isFunctionId: true }`
pub fn function_id_object(id: &FunctionId, interner: &Interner) -> Expr {
    Expr::object(vec![
        (interner.get_or_intern("identifier"), Expr::string(id.as_str())),
        (
            interner.get_or_intern(FUNCTION_ID_TAG),
            Expr::synthetic(ExprKind::Bool(true)),
        ),
    ])
}

fn registration_call(id: &FunctionId, reference: Expr, interner: &Interner) -> Stmt {
    let table = Expr::synthetic(ExprKind::Ident(interner.get_or_intern(LOOKUP_TABLE)));
    let callee = Expr::member(table, interner.get_or_intern(REGISTER_METHOD));
    Stmt::expr(Expr::call(callee, vec![function_id_object(id, interner), reference]))
}

/// Renames free references to a function's own name inside its body.
///
/// Renaming stops at any scope that rebinds the name: a parameter, a named
/// function expression, a `var` hoisted to the function body, or a
/// declaration in the statement list itself.
struct SelfReferences {
    from: Ident,
    to: Ident,
}

/// Whether `stmts` declares `name` directly, by any declaration kind.
fn declares(stmts: &[Stmt], name: Ident) -> bool {
    stmts.iter().any(|stmt| match &stmt.kind {
        StmtKind::Var { declarators, .. } => declarators.iter().any(|d| d.name.name == name),
        StmtKind::Function(function) => function.name.is_some_and(|b| b.name == name),
        _ => false,
    })
}

/// Whether a `var` anywhere in `stmts`, outside nested functions, declares
/// `name`.
fn hoists_var(stmts: &[Stmt], name: Ident) -> bool {
    stmts.iter().any(|stmt| hoists_var_in(stmt, name))
}

fn hoists_var_in(stmt: &Stmt, name: Ident) -> bool {
    match &stmt.kind {
        StmtKind::Var {
            kind: VarKind::Var,
            declarators,
        } => declarators.iter().any(|d| d.name.name == name),
        StmtKind::Block(body) => hoists_var(body, name),
        StmtKind::If {
            consequent,
            alternate,
            ..
        } => {
            hoists_var_in(consequent, name)
                || alternate.as_deref().is_some_and(|alt| hoists_var_in(alt, name))
        }
        _ => false,
    }
}

impl SelfReferences {
    /// Whether `function`'s parameters or body rebind the name.
    fn rebound_in(&self, function: &Function) -> bool {
        function.params.iter().any(|p| p.name == self.from)
            || matches!(&function.body, FunctionBody::Block(body) if hoists_var(body, self.from))
    }
}

impl VisitMut for SelfReferences {
    fn visit_stmts_mut(&mut self, stmts: &mut Vec<Stmt>) {
        if !declares(stmts, self.from) {
            walk_stmts_mut(self, stmts);
        }
    }

    fn visit_expr_mut(&mut self, expr: &mut Expr) {
        if let ExprKind::Ident(name) = &mut expr.kind {
            if *name == self.from {
                *name = self.to;
            }
            return;
        }
        walk_expr_mut(self, expr);
    }

    fn visit_function_mut(&mut self, function: &mut Function) {
        let shadows =
            function.name.is_some_and(|b| b.name == self.from) || self.rebound_in(function);
        if !shadows {
            walk_function_mut(self, function);
        }
    }
}

/// Inserts a batch of statements before the first marked statement.
struct MarkerInsertion {
    pending: Option<Vec<Stmt>>,
}

impl VisitMut for MarkerInsertion {
    fn visit_stmts_mut(&mut self, stmts: &mut Vec<Stmt>) {
        let mut i = 0;
        while i < stmts.len() && self.pending.is_some() {
            if stmts[i].marker.is_some() {
                if let Some(inserted) = self.pending.take() {
                    stmts.splice(i..i, inserted);
                }
                return;
            }
            self.visit_stmt_mut(&mut stmts[i]);
            i += 1;
        }
    }

    fn visit_expr_mut(&mut self, expr: &mut Expr) {
        if self.pending.is_some() {
            walk_expr_mut(self, expr);
        }
    }
}

fn entry_statements(
    entry: &FunctionEntry,
    uid: &mut UidGenerator,
    interner: &Interner,
    summary: &mut RewriteSummary,
    out: &mut Vec<Stmt>,
) -> Result<(), RewriteError> {
    let reference = match &entry.function {
        ExtractedFunction::Declaration(function) => {
            let Some(original) = function.name else {
                return Err(RewriteError::UnnamedDeclaration {
                    id: entry.id.clone(),
                });
            };
            let original_text = interner.resolve(original.name).to_string();
            let fresh_text = uid.generate(&original_text);
            let fresh = interner.get_or_intern(&fresh_text);

            let mut declaration = function.clone();
            declaration.name = Some(Binding {
                name: fresh,
                span: original.span,
            });
            let mut renamer = SelfReferences {
                from: original.name,
                to: fresh,
            };
            if !renamer.rebound_in(function) {
                walk_function_mut(&mut renamer, &mut declaration);
            }
            let span = declaration.span;
            out.push(Stmt::new(StmtKind::Function(declaration), span));
            summary
                .renamed
                .push((entry.id.clone(), original_text, fresh_text));
            Expr::ident(fresh, original.span)
        }
        ExtractedFunction::Expression(expr) => {
            if expr.as_function().is_none() {
                return Err(RewriteError::NotAFunction {
                    id: entry.id.clone(),
                });
            }
            expr.clone()
        }
    };
    out.push(registration_call(&entry.id, reference, interner));
    summary.registered.push(entry.id.clone());
    Ok(())
}

/// Inserts every function of `snapshot` into `program` before its first
/// marked statement, in registration order.
///
/// Declarations are renamed to names unused in `program` and registered by
/// reference; function expressions are registered inline. An empty snapshot
/// leaves the program untouched, marker or not. On error `program` is not
/// modified.
pub fn register_worker_functions(
    program: &mut Program,
    snapshot: &RegistrySnapshot,
    interner: &Interner,
    path: &Path,
) -> Result<RewriteSummary, RewriteError> {
    let mut summary = RewriteSummary::default();
    if snapshot.is_empty() {
        return Ok(summary);
    }

    let mut seen = BTreeSet::new();
    for entry in snapshot.functions() {
        if !seen.insert(&entry.id) {
            return Err(RewriteError::DuplicateFunctionId {
                id: entry.id.clone(),
            });
        }
    }

    let mut uid = UidGenerator::for_program(program, interner);
    let mut inserted = Vec::with_capacity(snapshot.len() * 2);
    for entry in snapshot.functions() {
        entry_statements(entry, &mut uid, interner, &mut summary, &mut inserted)?;
    }

    let mut insertion = MarkerInsertion {
        pending: Some(inserted),
    };
    insertion.visit_stmts_mut(&mut program.body);
    if insertion.pending.is_some() {
        return Err(RewriteError::MissingInsertionMarker {
            path: path.to_path_buf(),
            count: snapshot.len(),
        });
    }
    tracing::debug!(
        module = %path.display(),
        functions = summary.registered.len(),
        "registered worker functions"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use offload_codegen::{generate, GeneratorOptions};
    use offload_diagnostics::DiagnosticSink;
    use offload_js_parser::parse_file;
    use offload_registry::RegisteredModule;
    use offload_source::SourceDb;
    use std::path::PathBuf;

    struct Fixture {
        db: SourceDb,
        interner: Interner,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                db: SourceDb::new(),
                interner: Interner::new(),
            }
        }

        fn parse(&mut self, path: &str, text: &str) -> Program {
            let sink = DiagnosticSink::new();
            let file = self.db.add_source(path, text.to_string());
            let program = parse_file(file, &self.db, &self.interner, &sink);
            assert!(!sink.has_errors(), "{:?}", sink.diagnostics());
            program
        }

        fn print(&self, program: &Program) -> String {
            generate(program, "worker.js", &self.db, &self.interner, &GeneratorOptions::default()).code
        }

        /// Registers every top-level function declaration and every
        /// argument of a top-level call found in `text`.
        fn module(&mut self, path: &str, text: &str) -> RegisteredModule {
            let program = self.parse(path, text);
            let mut functions = Vec::new();
            for (i, stmt) in program.body.into_iter().enumerate() {
                let function = match stmt.kind {
                    StmtKind::Function(f) => ExtractedFunction::Declaration(f),
                    StmtKind::Expr(Expr {
                        kind: ExprKind::Call { mut args, .. },
                        ..
                    }) if !args.is_empty() => ExtractedFunction::Expression(args.remove(0)),
                    _ => continue,
                };
                functions.push(FunctionEntry {
                    id: FunctionId::new(format!("static:{path}/{i}")),
                    function,
                    origin: PathBuf::from(path),
                });
            }
            RegisteredModule::new(path, functions)
        }
    }

    const BOOTSTRAP: &str =
        "const table = {};\n/* OFFLOAD_STATIC_FUNCTIONS_PLACEHOLDER */\nstart(table);\n";

    #[test]
    fn inserts_declaration_and_registration_before_marker() {
        let mut fx = Fixture::new();
        let module = fx.module("src/math.js", "function square(n) {\n  return n * n;\n}\n");
        let mut program = fx.parse("worker.js", BOOTSTRAP);
        let snapshot = RegistrySnapshot {
            modules: vec![module],
        };
        let summary =
            register_worker_functions(&mut program, &snapshot, &fx.interner, Path::new("worker.js"))
                .unwrap();
        assert_eq!(summary.registered.len(), 1);
        assert_eq!(summary.renamed[0].2, "_square");
        assert_eq!(
            fx.print(&program),
            "const table = {};\n\
             function _square(n) {\n  return n * n;\n}\n\
             slaveFunctionLookupTable.registerStaticFunction({\n  \
             identifier: 'static:src/math.js/0',\n  _______isFunctionId: true\n}, _square);\n\
             start(table);"
        );
    }

    #[test]
    fn expressions_are_registered_inline() {
        let mut fx = Fixture::new();
        let module = fx.module("src/f.js", "map(value => value * 2);\n");
        let mut program = fx.parse("worker.js", BOOTSTRAP);
        let snapshot = RegistrySnapshot {
            modules: vec![module],
        };
        register_worker_functions(&mut program, &snapshot, &fx.interner, Path::new("worker.js"))
            .unwrap();
        let code = fx.print(&program);
        assert!(code.contains("_______isFunctionId: true\n}, value => value * 2);"), "{code}");
    }

    #[test]
    fn inserts_into_iife_body() {
        let mut fx = Fixture::new();
        let module = fx.module("src/f.js", "function f() {}\n");
        let mut program = fx.parse(
            "worker.js",
            "(function () {\n  // OFFLOAD_STATIC_FUNCTIONS_PLACEHOLDER\n  run();\n})();\n",
        );
        let snapshot = RegistrySnapshot {
            modules: vec![module],
        };
        register_worker_functions(&mut program, &snapshot, &fx.interner, Path::new("worker.js"))
            .unwrap();
        let code = fx.print(&program);
        assert!(code.starts_with("(function () {\n  function _f() {}\n  slaveFunctionLookupTable"), "{code}");
    }

    #[test]
    fn only_the_first_marker_receives_functions() {
        let mut fx = Fixture::new();
        let module = fx.module("src/f.js", "function f() {}\n");
        let mut program = fx.parse(
            "worker.js",
            "// OFFLOAD_STATIC_FUNCTIONS_PLACEHOLDER\na();\n// OFFLOAD_STATIC_FUNCTIONS_PLACEHOLDER\nb();\n",
        );
        let snapshot = RegistrySnapshot {
            modules: vec![module],
        };
        register_worker_functions(&mut program, &snapshot, &fx.interner, Path::new("worker.js"))
            .unwrap();
        assert_eq!(program.body.len(), 4);
        assert!(matches!(program.body[0].kind, StmtKind::Function(_)));
    }

    #[test]
    fn renaming_avoids_program_names_and_follows_self_references() {
        let mut fx = Fixture::new();
        let module = fx.module(
            "src/f.js",
            "function fact(n) {\n  return n ? n * fact(n - 1) : 1;\n}\nfunction fact2() {}\n",
        );
        let mut program = fx.parse(
            "worker.js",
            "const _fact = 1;\n// OFFLOAD_STATIC_FUNCTIONS_PLACEHOLDER\nrun(_fact);\n",
        );
        let snapshot = RegistrySnapshot {
            modules: vec![module],
        };
        let summary =
            register_worker_functions(&mut program, &snapshot, &fx.interner, Path::new("worker.js"))
                .unwrap();
        let names: Vec<&str> = summary.renamed.iter().map(|r| r.2.as_str()).collect();
        assert_eq!(names, vec!["_fact2", "_fact3"]);
        assert!(fx.print(&program).contains("n * _fact2(n - 1)"));
    }

    fn relocate(fx: &mut Fixture, source: &str) -> String {
        let module = fx.module("src/f.js", source);
        let mut program = fx.parse("worker.js", BOOTSTRAP);
        let snapshot = RegistrySnapshot {
            modules: vec![module],
        };
        register_worker_functions(&mut program, &snapshot, &fx.interner, Path::new("worker.js"))
            .unwrap();
        fx.print(&program)
    }

    #[test]
    fn local_declarations_keep_their_references() {
        let mut fx = Fixture::new();
        let code = relocate(
            &mut fx,
            "function f(n) {\n  const f = n * 2;\n  return f;\n}\n",
        );
        assert!(code.contains("function _f(n) {"), "{code}");
        assert!(code.contains("return f;"), "{code}");
        assert!(!code.contains("return _f;"), "{code}");
    }

    #[test]
    fn nested_function_statement_shadows_the_name() {
        let mut fx = Fixture::new();
        let code = relocate(
            &mut fx,
            "function f() {\n  function f() {}\n  return f();\n}\n",
        );
        assert!(code.contains("return f();"), "{code}");
    }

    #[test]
    fn var_in_a_block_hoists_over_the_body() {
        let mut fx = Fixture::new();
        let code = relocate(
            &mut fx,
            "function g(n) {\n  if (n) {\n    var g = 1;\n  }\n  return g;\n}\n",
        );
        assert!(code.contains("return g;"), "{code}");
    }

    #[test]
    fn block_scoped_shadowing_stays_in_its_block() {
        let mut fx = Fixture::new();
        let code = relocate(
            &mut fx,
            "function g(n) {\n  if (n) {\n    let g = 1;\n    return g;\n  }\n  return g(n - 1);\n}\n",
        );
        assert!(code.contains("return g;"), "{code}");
        assert!(code.contains("return _g(n - 1);"), "{code}");
    }

    #[test]
    fn empty_snapshot_needs_no_marker() {
        let mut fx = Fixture::new();
        let mut program = fx.parse("worker.js", "run();\n");
        let before = program.clone();
        let summary = register_worker_functions(
            &mut program,
            &RegistrySnapshot::default(),
            &fx.interner,
            Path::new("worker.js"),
        )
        .unwrap();
        assert!(summary.registered.is_empty());
        assert_eq!(program, before);
    }

    #[test]
    fn missing_marker_fails_without_changes() {
        let mut fx = Fixture::new();
        let module = fx.module("src/f.js", "function f() {}\n");
        let mut program = fx.parse("worker.js", "run();\n");
        let before = program.clone();
        let snapshot = RegistrySnapshot {
            modules: vec![module],
        };
        let err =
            register_worker_functions(&mut program, &snapshot, &fx.interner, Path::new("worker.js"))
                .unwrap_err();
        assert!(matches!(err, RewriteError::MissingInsertionMarker { count: 1, .. }));
        assert_eq!(program, before);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut fx = Fixture::new();
        let module = fx.module("src/f.js", "function f() {}\n");
        let mut program = fx.parse("worker.js", BOOTSTRAP);
        let snapshot = RegistrySnapshot {
            modules: vec![module.clone(), module],
        };
        let err =
            register_worker_functions(&mut program, &snapshot, &fx.interner, Path::new("worker.js"))
                .unwrap_err();
        assert!(matches!(err, RewriteError::DuplicateFunctionId { .. }));
    }

    #[test]
    fn non_function_expressions_are_rejected() {
        let mut fx = Fixture::new();
        let module = fx.module("src/f.js", "map(42);\n");
        let mut program = fx.parse("worker.js", BOOTSTRAP);
        let snapshot = RegistrySnapshot {
            modules: vec![module],
        };
        let err =
            register_worker_functions(&mut program, &snapshot, &fx.interner, Path::new("worker.js"))
                .unwrap_err();
        assert!(matches!(err, RewriteError::NotAFunction { .. }));
    }
}
