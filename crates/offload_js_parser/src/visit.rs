//! Depth-first traversal of syntax trees.
//!
//! [`Visit`] walks a tree by shared reference, [`VisitMut`] by mutable
//! reference. Override a method to act on a node and call the matching
//! `walk_*` function to keep descending. Traversal is pre-order in source
//! order.

use crate::ast::*;
use offload_common::Ident;
use offload_source::Span;

/// Read-only traversal.
pub trait Visit {
    /// Called for every statement.
    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    /// Called for every expression.
    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    /// Called for every function, declared or expressed.
    fn visit_function(&mut self, function: &Function) {
        walk_function(self, function);
    }

    /// Called for every declared name: variables, functions, parameters, imports.
    fn visit_binding(&mut self, _binding: &Binding) {}

    /// Called for every identifier reference.
    fn visit_reference(&mut self, _name: Ident, _span: Span) {}
}

/// Visits every top-level statement of `program`.
pub fn walk_program<V: Visit + ?Sized>(v: &mut V, program: &Program) {
    for stmt in &program.body {
        v.visit_stmt(stmt);
    }
}

/// Visits the children of `stmt`.
pub fn walk_stmt<V: Visit + ?Sized>(v: &mut V, stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::Expr(expr) => v.visit_expr(expr),
        StmtKind::Function(function) => v.visit_function(function),
        StmtKind::Var { declarators, .. } => {
            for decl in declarators {
                v.visit_binding(&decl.name);
                if let Some(init) = &decl.init {
                    v.visit_expr(init);
                }
            }
        }
        StmtKind::Return(argument) => {
            if let Some(argument) = argument {
                v.visit_expr(argument);
            }
        }
        StmtKind::If {
            test,
            consequent,
            alternate,
        } => {
            v.visit_expr(test);
            v.visit_stmt(consequent);
            if let Some(alternate) = alternate {
                v.visit_stmt(alternate);
            }
        }
        StmtKind::Block(body) => {
            for stmt in body {
                v.visit_stmt(stmt);
            }
        }
        StmtKind::Import { default, .. } => {
            if let Some(binding) = default {
                v.visit_binding(binding);
            }
        }
        StmtKind::Empty | StmtKind::Error => {}
    }
}

/// Visits the name, parameters and body of `function`.
pub fn walk_function<V: Visit + ?Sized>(v: &mut V, function: &Function) {
    if let Some(name) = &function.name {
        v.visit_binding(name);
    }
    for param in &function.params {
        v.visit_binding(param);
    }
    match &function.body {
        FunctionBody::Block(body) => {
            for stmt in body {
                v.visit_stmt(stmt);
            }
        }
        FunctionBody::Expr(expr) => v.visit_expr(expr),
    }
}

/// Visits the children of `expr`.
pub fn walk_expr<V: Visit + ?Sized>(v: &mut V, expr: &Expr) {
    match &expr.kind {
        ExprKind::Ident(name) => v.visit_reference(*name, expr.span),
        ExprKind::Array(elements) => {
            for element in elements {
                v.visit_expr(element);
            }
        }
        ExprKind::Object(properties) => {
            for property in properties {
                v.visit_expr(&property.value);
            }
        }
        ExprKind::Function(function) => v.visit_function(function),
        ExprKind::Call { callee, args } => {
            v.visit_expr(callee);
            for arg in args {
                v.visit_expr(arg);
            }
        }
        ExprKind::Member { object, .. } => v.visit_expr(object),
        ExprKind::Index { object, index } => {
            v.visit_expr(object);
            v.visit_expr(index);
        }
        ExprKind::Unary { operand, .. } => v.visit_expr(operand),
        ExprKind::Binary { left, right, .. } => {
            v.visit_expr(left);
            v.visit_expr(right);
        }
        ExprKind::Assign { target, value } => {
            v.visit_expr(target);
            v.visit_expr(value);
        }
        ExprKind::Conditional {
            test,
            consequent,
            alternate,
        } => {
            v.visit_expr(test);
            v.visit_expr(consequent);
            v.visit_expr(alternate);
        }
        ExprKind::Paren(inner) => v.visit_expr(inner),
        ExprKind::Number(_)
        | ExprKind::Str(_)
        | ExprKind::Bool(_)
        | ExprKind::Null
        | ExprKind::This
        | ExprKind::Error => {}
    }
}

/// Mutating traversal.
pub trait VisitMut {
    /// Called for every statement list: module body, blocks, function bodies.
    fn visit_stmts_mut(&mut self, stmts: &mut Vec<Stmt>) {
        walk_stmts_mut(self, stmts);
    }

    /// Called for every statement.
    fn visit_stmt_mut(&mut self, stmt: &mut Stmt) {
        walk_stmt_mut(self, stmt);
    }

    /// Called for every expression.
    fn visit_expr_mut(&mut self, expr: &mut Expr) {
        walk_expr_mut(self, expr);
    }

    /// Called for every function.
    fn visit_function_mut(&mut self, function: &mut Function) {
        walk_function_mut(self, function);
    }
}

/// Visits each statement of a list.
pub fn walk_stmts_mut<V: VisitMut + ?Sized>(v: &mut V, stmts: &mut Vec<Stmt>) {
    for stmt in stmts.iter_mut() {
        v.visit_stmt_mut(stmt);
    }
}

/// Visits the children of `stmt`.
pub fn walk_stmt_mut<V: VisitMut + ?Sized>(v: &mut V, stmt: &mut Stmt) {
    match &mut stmt.kind {
        StmtKind::Expr(expr) => v.visit_expr_mut(expr),
        StmtKind::Function(function) => v.visit_function_mut(function),
        StmtKind::Var { declarators, .. } => {
            for decl in declarators {
                if let Some(init) = &mut decl.init {
                    v.visit_expr_mut(init);
                }
            }
        }
        StmtKind::Return(argument) => {
            if let Some(argument) = argument {
                v.visit_expr_mut(argument);
            }
        }
        StmtKind::If {
            test,
            consequent,
            alternate,
        } => {
            v.visit_expr_mut(test);
            v.visit_stmt_mut(consequent);
            if let Some(alternate) = alternate {
                v.visit_stmt_mut(alternate);
            }
        }
        StmtKind::Block(body) => v.visit_stmts_mut(body),
        StmtKind::Import { .. } | StmtKind::Empty | StmtKind::Error => {}
    }
}

/// Visits the body of `function`.
pub fn walk_function_mut<V: VisitMut + ?Sized>(v: &mut V, function: &mut Function) {
    match &mut function.body {
        FunctionBody::Block(body) => v.visit_stmts_mut(body),
        FunctionBody::Expr(expr) => v.visit_expr_mut(expr),
    }
}

/// Visits the children of `expr`.
pub fn walk_expr_mut<V: VisitMut + ?Sized>(v: &mut V, expr: &mut Expr) {
    match &mut expr.kind {
        ExprKind::Array(elements) => {
            for element in elements {
                v.visit_expr_mut(element);
            }
        }
        ExprKind::Object(properties) => {
            for property in properties {
                v.visit_expr_mut(&mut property.value);
            }
        }
        ExprKind::Function(function) => v.visit_function_mut(function),
        ExprKind::Call { callee, args } => {
            v.visit_expr_mut(callee);
            for arg in args {
                v.visit_expr_mut(arg);
            }
        }
        ExprKind::Member { object, .. } => v.visit_expr_mut(object),
        ExprKind::Index { object, index } => {
            v.visit_expr_mut(object);
            v.visit_expr_mut(index);
        }
        ExprKind::Unary { operand, .. } => v.visit_expr_mut(operand),
        ExprKind::Binary { left, right, .. } => {
            v.visit_expr_mut(left);
            v.visit_expr_mut(right);
        }
        ExprKind::Assign { target, value } => {
            v.visit_expr_mut(target);
            v.visit_expr_mut(value);
        }
        ExprKind::Conditional {
            test,
            consequent,
            alternate,
        } => {
            v.visit_expr_mut(test);
            v.visit_expr_mut(consequent);
            v.visit_expr_mut(alternate);
        }
        ExprKind::Paren(inner) => v.visit_expr_mut(inner),
        ExprKind::Ident(_)
        | ExprKind::Number(_)
        | ExprKind::Str(_)
        | ExprKind::Bool(_)
        | ExprKind::Null
        | ExprKind::This
        | ExprKind::Error => {}
    }
}
