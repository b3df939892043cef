//! A syntax pass that registers the functions passed to `parallel`.

use offload_common::Ident;
use offload_host::{BoxError, PassContext, SyntaxPass};
use offload_js_parser::ast::{Expr, ExprKind, Function, Program, StmtKind};
use offload_js_parser::visit::{walk_expr_mut, VisitMut};
use offload_registry::{
    ExtractedFunction, FunctionEntry, FunctionId, RegisteredModule, RegistrySender,
};
use offload_rewrite::function_id_object;
use offload_source::{SourceDb, Span};
use std::collections::HashMap;

/// Name the pass is registered under.
pub const DISCOVERY_PASS: &str = "parallel-discovery";

/// Identifier whose call chains hand functions to the worker.
pub const CAPABILITY_ROOT: &str = "parallel";

/// Finds functions passed to calls rooted at `parallel`, publishes them to
/// the registry and replaces them with function identifiers.
///
/// Function and arrow expressions are registered inline. Identifiers naming
/// a top-level function declaration register that declaration. A module
/// without any such call is removed from the registry.
pub struct DiscoveryPass {
    sender: RegistrySender,
}

impl DiscoveryPass {
    /// A pass publishing through `sender`.
    pub fn new(sender: RegistrySender) -> Self {
        Self { sender }
    }
}

struct Finder<'a> {
    root: Ident,
    path: String,
    declarations: HashMap<Ident, Function>,
    ctx: &'a PassContext<'a>,
    found: Vec<FunctionEntry>,
}

fn start_of(db: &SourceDb, span: Span) -> (u32, u32) {
    db.get(span.file)
        .map(|file| file.position(span.start))
        .unwrap_or((0, 0))
}

impl Finder<'_> {
    fn extract(&mut self, arg: &Expr) -> Option<(FunctionId, ExtractedFunction)> {
        if let Some(function) = arg.as_function() {
            let (line, column) = start_of(self.ctx.source_db, function.span);
            let name = function.name_text(self.ctx.interner);
            let id = FunctionId::derive(&self.path, name, line, column);
            return Some((id, ExtractedFunction::Expression(arg.clone())));
        }
        let ExprKind::Ident(name) = arg.kind else {
            return None;
        };
        let declaration = self.declarations.get(&name)?;
        let (line, column) = start_of(self.ctx.source_db, declaration.span);
        let id = FunctionId::derive(
            &self.path,
            declaration.name_text(self.ctx.interner),
            line,
            column,
        );
        Some((id, ExtractedFunction::Declaration(declaration.clone())))
    }
}

impl VisitMut for Finder<'_> {
    fn visit_expr_mut(&mut self, expr: &mut Expr) {
        if let ExprKind::Call { callee, args } = &mut expr.kind {
            if callee.root_ident() == Some(self.root) {
                for arg in args.iter_mut() {
                    if let Some((id, function)) = self.extract(arg) {
                        *arg = function_id_object(&id, self.ctx.interner);
                        self.found.push(FunctionEntry {
                            id,
                            function,
                            origin: self.ctx.resource_path.to_path_buf(),
                        });
                    }
                }
            }
        }
        walk_expr_mut(self, expr);
    }
}

impl SyntaxPass for DiscoveryPass {
    fn name(&self) -> &str {
        DISCOVERY_PASS
    }

    fn run(&self, program: &mut Program, ctx: &PassContext<'_>) -> Result<(), BoxError> {
        let path = ctx.resource_path;
        let Some(root) = ctx.interner.get(CAPABILITY_ROOT) else {
            self.sender.unregister_module(path)?;
            return Ok(());
        };
        let declarations = program
            .body
            .iter()
            .filter_map(|stmt| match &stmt.kind {
                StmtKind::Function(function) => function.name.map(|n| (n.name, function.clone())),
                _ => None,
            })
            .collect();
        let mut finder = Finder {
            root,
            path: path.to_string_lossy().replace('\\', "/"),
            declarations,
            ctx,
            found: Vec::new(),
        };
        finder.visit_stmts_mut(&mut program.body);

        let mut module = RegisteredModule::new(path, finder.found);
        if let Some(map) = ctx.upstream_map {
            module = module.with_map(map.clone());
        }
        self.sender.register_module(module)?;
        Ok(())
    }
}
