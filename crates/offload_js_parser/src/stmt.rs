//! Statement parsing.

use crate::ast::*;
use crate::parser::JsParser;
use crate::token::JsToken;

impl JsParser<'_> {
    /// Parses one statement, attaching a pending insertion marker if one
    /// ended before it.
    pub(crate) fn parse_statement(&mut self) -> Stmt {
        let start = self.current_span();
        let marker = self.take_marker(start.start);
        let kind = match self.current() {
            JsToken::Function => self.parse_function_declaration(),
            JsToken::Var | JsToken::Let | JsToken::Const => self.parse_var_statement(),
            JsToken::Return => self.parse_return(),
            JsToken::If => self.parse_if(),
            JsToken::LeftBrace => StmtKind::Block(self.parse_block()),
            JsToken::Import => self.parse_import(),
            JsToken::Semicolon => {
                self.advance();
                StmtKind::Empty
            }
            _ => {
                let expr = self.parse_expr();
                if matches!(expr.kind, ExprKind::Error) {
                    self.recover_to_statement_end();
                    StmtKind::Error
                } else {
                    self.consume_semicolon();
                    StmtKind::Expr(expr)
                }
            }
        };
        Stmt {
            kind,
            marker,
            span: start.merge(self.prev_span()),
        }
    }

    /// Parses `{ statements }` and returns the statements.
    pub(crate) fn parse_block(&mut self) -> Vec<Stmt> {
        self.expect(JsToken::LeftBrace);
        let mut body = Vec::new();
        while !self.at(JsToken::RightBrace) && !self.at_eof() {
            let before = self.pos;
            body.push(self.parse_statement());
            if self.pos == before {
                self.advance();
            }
        }
        self.expect(JsToken::RightBrace);
        body
    }

    /// Accepts an explicit `;`, or an automatic one before `}`, end of file
    /// or a line break.
    fn consume_semicolon(&mut self) {
        if self.eat(JsToken::Semicolon) {
            return;
        }
        if self.at(JsToken::RightBrace) || self.at_eof() || self.newline_before_current() {
            return;
        }
        self.expected("';'");
    }

    fn parse_function_declaration(&mut self) -> StmtKind {
        let start = self.current_span();
        self.advance(); // function
        let name = if self.at(JsToken::Identifier) {
            Some(self.expect_binding())
        } else {
            self.error("function declarations need a name");
            None
        };
        StmtKind::Function(self.parse_function_rest(start, name))
    }

    /// Parses `(params) { body }` after `function [name]`.
    pub(crate) fn parse_function_rest(
        &mut self,
        start: offload_source::Span,
        name: Option<Binding>,
    ) -> Function {
        self.expect(JsToken::LeftParen);
        let mut params = Vec::new();
        while !self.at(JsToken::RightParen) && !self.at_eof() {
            params.push(self.expect_binding());
            if !self.eat(JsToken::Comma) {
                break;
            }
        }
        self.expect(JsToken::RightParen);
        let body = self.parse_block();
        Function {
            name,
            params,
            body: FunctionBody::Block(body),
            is_arrow: false,
            span: start.merge(self.prev_span()),
        }
    }

    fn parse_var_statement(&mut self) -> StmtKind {
        let kind = match self.current() {
            JsToken::Let => VarKind::Let,
            JsToken::Const => VarKind::Const,
            _ => VarKind::Var,
        };
        self.advance();
        let mut declarators = Vec::new();
        loop {
            let name = self.expect_binding();
            let init = self.eat(JsToken::Equals).then(|| self.parse_expr());
            let span = name.span.merge(self.prev_span());
            declarators.push(VarDeclarator { name, init, span });
            if !self.eat(JsToken::Comma) {
                break;
            }
        }
        self.consume_semicolon();
        StmtKind::Var { kind, declarators }
    }

    fn parse_return(&mut self) -> StmtKind {
        self.advance(); // return
        let argument = if self.at(JsToken::Semicolon)
            || self.at(JsToken::RightBrace)
            || self.at_eof()
            || self.newline_before_current()
        {
            None
        } else {
            Some(self.parse_expr())
        };
        self.consume_semicolon();
        StmtKind::Return(argument)
    }

    fn parse_if(&mut self) -> StmtKind {
        self.advance(); // if
        self.expect(JsToken::LeftParen);
        let test = self.parse_expr();
        self.expect(JsToken::RightParen);
        let consequent = Box::new(self.parse_statement());
        let alternate = self
            .eat(JsToken::Else)
            .then(|| Box::new(self.parse_statement()));
        StmtKind::If {
            test,
            consequent,
            alternate,
        }
    }

    fn parse_import(&mut self) -> StmtKind {
        self.advance(); // import
        let default = if self.at(JsToken::Identifier) {
            let binding = self.expect_binding();
            if self.at(JsToken::Identifier) && self.current_text() == "from" {
                self.advance();
            } else {
                self.expected("'from'");
            }
            Some(binding)
        } else {
            None
        };
        let source = if self.at(JsToken::String) {
            let value = self.string_value();
            self.advance();
            value
        } else {
            self.expected("module specifier");
            String::new()
        };
        self.consume_semicolon();
        StmtKind::Import { default, source }
    }
}
