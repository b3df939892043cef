//! Pratt expression parser.
//!
//! | BP (L,R) | Operators |
//! |----------|-----------|
//! | (1,2)    | `||` |
//! | (3,4)    | `&&` |
//! | (5,6)    | `==` `!=` `===` `!==` |
//! | (7,8)    | `<` `<=` `>` `>=` |
//! | (9,10)   | `+` `-` |
//! | (11,12)  | `*` `/` `%` |
//!
//! Assignment, arrow functions and `? :` sit below the binary operators and
//! are right-associative. Prefix operators bind tighter than any binary one,
//! postfix member access and calls tighter still.

use crate::ast::*;
use crate::parser::JsParser;
use crate::token::JsToken;
use offload_source::Span;

fn infix_binding_power(op: BinaryOp) -> (u8, u8) {
    match op {
        BinaryOp::Or => (1, 2),
        BinaryOp::And => (3, 4),
        BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::StrictEq | BinaryOp::StrictNotEq => (5, 6),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => (7, 8),
        BinaryOp::Add | BinaryOp::Sub => (9, 10),
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => (11, 12),
    }
}

impl JsParser<'_> {
    /// Parses an assignment-level expression.
    pub fn parse_expr(&mut self) -> Expr {
        if let Some(arrow) = self.try_parse_arrow() {
            return arrow;
        }
        let lhs = self.parse_conditional();
        if self.at(JsToken::Equals) {
            self.advance();
            let value = self.parse_expr();
            let span = lhs.span.merge(value.span);
            return Expr::new(
                ExprKind::Assign {
                    target: Box::new(lhs),
                    value: Box::new(value),
                },
                span,
            );
        }
        lhs
    }

    fn parse_conditional(&mut self) -> Expr {
        let test = self.parse_binary(0);
        if !self.eat(JsToken::Question) {
            return test;
        }
        let consequent = self.parse_expr();
        self.expect(JsToken::Colon);
        let alternate = self.parse_expr();
        let span = test.span.merge(alternate.span);
        Expr::new(
            ExprKind::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
            span,
        )
    }

    fn current_as_binary_op(&self) -> Option<BinaryOp> {
        let op = match self.current() {
            JsToken::OrOr => BinaryOp::Or,
            JsToken::AndAnd => BinaryOp::And,
            JsToken::EqEq => BinaryOp::Eq,
            JsToken::NotEq => BinaryOp::NotEq,
            JsToken::EqEqEq => BinaryOp::StrictEq,
            JsToken::NotEqEq => BinaryOp::StrictNotEq,
            JsToken::Less => BinaryOp::Lt,
            JsToken::LessEq => BinaryOp::LtEq,
            JsToken::Greater => BinaryOp::Gt,
            JsToken::GreaterEq => BinaryOp::GtEq,
            JsToken::Plus => BinaryOp::Add,
            JsToken::Minus => BinaryOp::Sub,
            JsToken::Star => BinaryOp::Mul,
            JsToken::Slash => BinaryOp::Div,
            JsToken::Percent => BinaryOp::Mod,
            _ => return None,
        };
        Some(op)
    }

    fn parse_binary(&mut self, min_bp: u8) -> Expr {
        let mut lhs = self.parse_unary();
        while let Some(op) = self.current_as_binary_op() {
            let (l_bp, r_bp) = infix_binding_power(op);
            if l_bp < min_bp {
                break;
            }
            self.advance();
            let rhs = self.parse_binary(r_bp);
            let span = lhs.span.merge(rhs.span);
            lhs = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                },
                span,
            );
        }
        lhs
    }

    fn parse_unary(&mut self) -> Expr {
        let op = match self.current() {
            JsToken::Bang => UnaryOp::Not,
            JsToken::Minus => UnaryOp::Neg,
            JsToken::Plus => UnaryOp::Plus,
            JsToken::Typeof => UnaryOp::Typeof,
            _ => return self.parse_postfix(),
        };
        let start = self.current_span();
        self.advance();
        let operand = self.parse_unary();
        let span = start.merge(operand.span);
        Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        )
    }

    fn parse_postfix(&mut self) -> Expr {
        let mut expr = self.parse_primary();
        loop {
            match self.current() {
                JsToken::Dot => {
                    self.advance();
                    let span = self.current_span();
                    let property = if self.at_identifier_name() {
                        let name = self.interner.get_or_intern(self.current_text());
                        self.advance();
                        Binding { name, span }
                    } else {
                        self.expected("property name");
                        return Expr::new(ExprKind::Error, expr.span.merge(span));
                    };
                    let span = expr.span.merge(property.span);
                    expr = Expr::new(
                        ExprKind::Member {
                            object: Box::new(expr),
                            property,
                        },
                        span,
                    );
                }
                JsToken::LeftParen => {
                    let args = self.parse_arguments();
                    let span = expr.span.merge(self.prev_span());
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    );
                }
                JsToken::LeftBracket => {
                    self.advance();
                    let index = self.parse_expr();
                    self.expect(JsToken::RightBracket);
                    let span = expr.span.merge(self.prev_span());
                    expr = Expr::new(
                        ExprKind::Index {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    );
                }
                _ => break,
            }
        }
        expr
    }

    fn parse_arguments(&mut self) -> Vec<Expr> {
        self.expect(JsToken::LeftParen);
        let args = self.parse_list(JsToken::RightParen);
        self.expect(JsToken::RightParen);
        args
    }

    /// Parses comma-separated expressions up to (not including) `close`.
    /// A trailing comma is accepted.
    fn parse_list(&mut self, close: JsToken) -> Vec<Expr> {
        let mut items = Vec::new();
        while !self.at(close) && !self.at_eof() {
            let before = self.pos;
            items.push(self.parse_expr());
            if !self.eat(JsToken::Comma) || self.pos == before {
                break;
            }
        }
        items
    }

    fn parse_primary(&mut self) -> Expr {
        let span = self.current_span();
        match self.current() {
            JsToken::Identifier => {
                let name = self.interner.get_or_intern(self.current_text());
                self.advance();
                Expr::ident(name, span)
            }
            JsToken::Number => {
                let kind = match self.current_text().parse::<f64>() {
                    Ok(value) => ExprKind::Number(value),
                    Err(_) => {
                        self.error("invalid number literal");
                        ExprKind::Error
                    }
                };
                self.advance();
                Expr::new(kind, span)
            }
            JsToken::String => {
                let value = self.string_value();
                self.advance();
                Expr::new(ExprKind::Str(value), span)
            }
            JsToken::True | JsToken::False => {
                let value = self.at(JsToken::True);
                self.advance();
                Expr::new(ExprKind::Bool(value), span)
            }
            JsToken::Null => {
                self.advance();
                Expr::new(ExprKind::Null, span)
            }
            JsToken::This => {
                self.advance();
                Expr::new(ExprKind::This, span)
            }
            JsToken::LeftParen => {
                self.advance();
                let inner = self.parse_expr();
                self.expect(JsToken::RightParen);
                Expr::new(ExprKind::Paren(Box::new(inner)), span.merge(self.prev_span()))
            }
            JsToken::LeftBracket => {
                self.advance();
                let elements = self.parse_list(JsToken::RightBracket);
                self.expect(JsToken::RightBracket);
                Expr::new(ExprKind::Array(elements), span.merge(self.prev_span()))
            }
            JsToken::LeftBrace => self.parse_object(),
            JsToken::Function => {
                self.advance();
                let name = self.at(JsToken::Identifier).then(|| self.expect_binding());
                let function = self.parse_function_rest(span, name);
                let span = function.span;
                Expr::new(ExprKind::Function(Box::new(function)), span)
            }
            _ => {
                self.expected("expression");
                Expr::new(ExprKind::Error, span)
            }
        }
    }

    fn parse_object(&mut self) -> Expr {
        let start = self.current_span();
        self.advance(); // {
        let mut properties = Vec::new();
        while !self.at(JsToken::RightBrace) && !self.at_eof() {
            let key_span = self.current_span();
            let key = if self.at(JsToken::String) {
                let value = self.string_value();
                self.advance();
                PropertyKey::Str(value, key_span)
            } else if self.at_identifier_name() {
                let name = self.interner.get_or_intern(self.current_text());
                self.advance();
                PropertyKey::Ident(Binding {
                    name,
                    span: key_span,
                })
            } else {
                self.expected("property name");
                break;
            };

            let property = if self.eat(JsToken::Colon) {
                let value = self.parse_expr();
                Property {
                    span: key_span.merge(value.span),
                    key,
                    value,
                    shorthand: false,
                }
            } else if let PropertyKey::Ident(binding) = key {
                Property {
                    key,
                    value: Expr::ident(binding.name, binding.span),
                    shorthand: true,
                    span: key_span,
                }
            } else {
                self.expected("':'");
                break;
            };
            properties.push(property);

            if !self.eat(JsToken::Comma) {
                break;
            }
        }
        self.expect(JsToken::RightBrace);
        Expr::new(ExprKind::Object(properties), start.merge(self.prev_span()))
    }

    // ========================================================================
    // Arrow functions
    // ========================================================================

    fn try_parse_arrow(&mut self) -> Option<Expr> {
        let start = self.current_span();
        if self.at(JsToken::Identifier) && self.peek_is(JsToken::Arrow) {
            let param = self.expect_binding();
            self.advance(); // =>
            return Some(self.finish_arrow(start, vec![param]));
        }
        if self.at(JsToken::LeftParen) && self.arrow_params_ahead() {
            self.advance(); // (
            let mut params = Vec::new();
            while !self.at(JsToken::RightParen) && !self.at_eof() {
                params.push(self.expect_binding());
                if !self.eat(JsToken::Comma) {
                    break;
                }
            }
            self.expect(JsToken::RightParen);
            self.expect(JsToken::Arrow);
            return Some(self.finish_arrow(start, params));
        }
        None
    }

    /// Whether the `(` at the current position opens an arrow parameter list.
    fn arrow_params_ahead(&self) -> bool {
        let mut idx = 1;
        if self.peek_kind(idx) == JsToken::RightParen {
            return self.peek_kind(idx + 1) == JsToken::Arrow;
        }
        loop {
            if self.peek_kind(idx) != JsToken::Identifier {
                return false;
            }
            idx += 1;
            match self.peek_kind(idx) {
                JsToken::Comma => idx += 1,
                JsToken::RightParen => return self.peek_kind(idx + 1) == JsToken::Arrow,
                _ => return false,
            }
        }
    }

    fn finish_arrow(&mut self, start: Span, params: Vec<Binding>) -> Expr {
        let body = if self.at(JsToken::LeftBrace) {
            FunctionBody::Block(self.parse_block())
        } else {
            FunctionBody::Expr(Box::new(self.parse_expr()))
        };
        let span = start.merge(self.prev_span());
        let function = Function {
            name: None,
            params,
            body,
            is_arrow: true,
            span,
        };
        Expr::new(ExprKind::Function(Box::new(function)), span)
    }
}
