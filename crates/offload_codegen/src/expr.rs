//! Expression printing.
//!
//! Parentheses are derived from precedence, not copied from the input:
//!
//! | Level | Expressions |
//! |-------|-------------|
//! | 1     | assignment, arrow functions |
//! | 2     | `? :` |
//! | 3..=8 | binary operators, see [`BinaryOp::precedence`] |
//! | 9     | prefix operators |
//! | 10    | calls, member access, indexing |
//! | 11    | identifiers, literals, function expressions |

use crate::printer::{is_function_expression, Printer};
use offload_js_parser::ast::*;

const PREFIX: u8 = 9;
const POSTFIX: u8 = 10;
const PRIMARY: u8 = 11;

fn level(expr: &Expr) -> u8 {
    match &expr.kind {
        ExprKind::Assign { .. } => 1,
        ExprKind::Function(function) if function.is_arrow => 1,
        ExprKind::Conditional { .. } => 2,
        ExprKind::Binary { op, .. } => op.precedence(),
        ExprKind::Unary { .. } => PREFIX,
        ExprKind::Call { .. } | ExprKind::Member { .. } | ExprKind::Index { .. } => POSTFIX,
        ExprKind::Paren(inner) => level(inner),
        _ => PRIMARY,
    }
}

/// Formats a number the way it would be written by hand.
pub(crate) fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

impl Printer<'_> {
    /// Prints `expr`, parenthesized if it binds looser than `min_level`.
    pub(crate) fn print_expr(&mut self, expr: &Expr, min_level: u8) {
        if let ExprKind::Paren(inner) = &expr.kind {
            self.print_expr(inner, min_level);
            return;
        }
        if level(expr) < min_level {
            self.write("(");
            self.print_expr(expr, 0);
            self.write(")");
            return;
        }

        let name = match &expr.kind {
            ExprKind::Ident(name) => Some(*name),
            _ => None,
        };
        self.mark(expr.span, name);

        match &expr.kind {
            ExprKind::Ident(name) => self.write_name(*name),
            ExprKind::Number(value) => self.write(&format_number(*value)),
            ExprKind::Str(value) => self.write_string(value),
            ExprKind::Bool(value) => self.write(if *value { "true" } else { "false" }),
            ExprKind::Null => self.write("null"),
            ExprKind::This => self.write("this"),
            ExprKind::Array(elements) => {
                self.write("[");
                self.print_list(elements);
                self.write("]");
            }
            ExprKind::Object(properties) => self.print_object(properties),
            ExprKind::Function(function) => self.print_function(function),
            ExprKind::Call { callee, args } => {
                self.print_callee(callee);
                self.write("(");
                self.print_list(args);
                self.write(")");
            }
            ExprKind::Member { object, property } => {
                self.print_callee(object);
                self.write(".");
                self.print_binding(property);
            }
            ExprKind::Index { object, index } => {
                self.print_callee(object);
                self.write("[");
                self.print_expr(index, 0);
                self.write("]");
            }
            ExprKind::Unary { op, operand } => {
                self.write(op.as_str());
                let needs_space = match op {
                    UnaryOp::Typeof => true,
                    UnaryOp::Neg | UnaryOp::Plus => matches!(
                        operand.kind,
                        ExprKind::Unary {
                            op: UnaryOp::Neg | UnaryOp::Plus,
                            ..
                        }
                    ),
                    UnaryOp::Not => false,
                };
                if needs_space {
                    self.write(" ");
                }
                self.print_expr(operand, PREFIX);
            }
            ExprKind::Binary { op, left, right } => {
                let precedence = op.precedence();
                self.print_expr(left, precedence);
                self.write(" ");
                self.write(op.as_str());
                self.write(" ");
                self.print_expr(right, precedence + 1);
            }
            ExprKind::Assign { target, value } => {
                self.print_expr(target, 2);
                self.write(" = ");
                self.print_expr(value, 1);
            }
            ExprKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.print_expr(test, 3);
                self.write(" ? ");
                self.print_expr(consequent, 1);
                self.write(" : ");
                self.print_expr(alternate, 1);
            }
            ExprKind::Paren(_) => {}
            ExprKind::Error => self.write("undefined"),
        }
    }

    fn print_callee(&mut self, callee: &Expr) {
        if is_function_expression(callee) {
            self.write("(");
            self.print_expr(callee, 0);
            self.write(")");
        } else {
            self.print_expr(callee, POSTFIX);
        }
    }

    fn print_list(&mut self, items: &[Expr]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.print_expr(item, 1);
        }
    }

    fn print_object(&mut self, properties: &[Property]) {
        if properties.is_empty() {
            self.write("{}");
            return;
        }
        self.write("{");
        self.indent();
        for (i, property) in properties.iter().enumerate() {
            self.newline();
            match &property.key {
                PropertyKey::Ident(binding) => self.print_binding(binding),
                PropertyKey::Str(value, span) => {
                    self.mark(*span, None);
                    self.write_string(value);
                }
            }
            if !property.shorthand {
                self.write(": ");
                self.print_expr(&property.value, 1);
            }
            if i + 1 < properties.len() {
                self.write(",");
            }
        }
        self.dedent();
        self.newline();
        self.write("}");
    }
}
