//! Core parser infrastructure.
//!
//! [`JsParser`] provides the primitive operations (advance, expect, eat),
//! error reporting and recovery. Statements live in `stmt.rs`, expressions
//! in `expr.rs`.

use crate::ast::*;
use crate::lexer::Lexed;
use crate::token::{JsToken, Token};
use offload_common::Interner;
use offload_diagnostics::code::{Category, DiagnosticCode};
use offload_diagnostics::{Diagnostic, DiagnosticSink};
use offload_source::Span;

/// A recursive descent parser over a lexed token stream.
pub struct JsParser<'src> {
    pub(crate) tokens: Vec<Token>,
    pub(crate) pos: usize,
    pub(crate) source: &'src str,
    pub(crate) interner: &'src Interner,
    pub(crate) sink: &'src DiagnosticSink,
    markers: Vec<u32>,
    next_marker: usize,
}

impl<'src> JsParser<'src> {
    /// Creates a parser. `lexed` must come from lexing `source`.
    pub fn new(
        lexed: Lexed,
        source: &'src str,
        interner: &'src Interner,
        sink: &'src DiagnosticSink,
    ) -> Self {
        Self {
            tokens: lexed.tokens,
            pos: 0,
            source,
            interner,
            sink,
            markers: lexed.markers,
            next_marker: 0,
        }
    }

    // ========================================================================
    // Primitive operations
    // ========================================================================

    pub(crate) fn current(&self) -> JsToken {
        self.tokens[self.pos].kind
    }

    pub(crate) fn current_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    pub(crate) fn current_text(&self) -> &'src str {
        let span = self.current_span();
        &self.source[span.start as usize..span.end as usize]
    }

    pub(crate) fn newline_before_current(&self) -> bool {
        self.tokens[self.pos].newline_before
    }

    pub(crate) fn at(&self, kind: JsToken) -> bool {
        self.current() == kind
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.current() == JsToken::Eof
    }

    pub(crate) fn prev_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            self.current_span()
        }
    }

    pub(crate) fn advance(&mut self) {
        if !self.at_eof() {
            self.pos += 1;
        }
    }

    pub(crate) fn eat(&mut self, kind: JsToken) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: JsToken) {
        if !self.eat(kind) {
            self.expected(&kind.to_string());
        }
    }

    /// Kind of the token `offset` positions ahead of the current one.
    pub(crate) fn peek_kind(&self, offset: usize) -> JsToken {
        self.tokens
            .get(self.pos + offset)
            .map_or(JsToken::Eof, |t| t.kind)
    }

    pub(crate) fn peek_is(&self, kind: JsToken) -> bool {
        self.peek_kind(1) == kind
    }

    /// Identifiers and reserved words are both valid after `.` and as object keys.
    pub(crate) fn at_identifier_name(&self) -> bool {
        self.at(JsToken::Identifier) || self.current().is_keyword()
    }

    pub(crate) fn expect_binding(&mut self) -> Binding {
        let span = self.current_span();
        if self.at(JsToken::Identifier) {
            let name = self.interner.get_or_intern(self.current_text());
            self.advance();
            Binding { name, span }
        } else {
            self.expected("identifier");
            Binding {
                name: self.interner.get_or_intern("<missing>"),
                span,
            }
        }
    }

    /// Decodes the current string token.
    pub(crate) fn string_value(&self) -> String {
        let text = self.current_text();
        let inner = text.get(1..text.len().saturating_sub(1)).unwrap_or("");
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('0') => out.push('\0'),
                Some(other) => out.push(other),
                None => {}
            }
        }
        out
    }

    // ========================================================================
    // Insertion markers
    // ========================================================================

    /// Consumes every marker comment ending at or before `stmt_start`.
    pub(crate) fn take_marker(&mut self, stmt_start: u32) -> Option<InsertionMarker> {
        let mut found = false;
        while let Some(&end) = self.markers.get(self.next_marker) {
            if end > stmt_start {
                break;
            }
            self.next_marker += 1;
            found = true;
        }
        found.then_some(InsertionMarker::StaticFunctions)
    }

    // ========================================================================
    // Error handling and recovery
    // ========================================================================

    pub(crate) fn error(&self, msg: &str) {
        self.sink.emit(Diagnostic::error(
            DiagnosticCode::new(Category::Parse, 102),
            msg,
            self.current_span(),
        ));
    }

    pub(crate) fn expected(&self, what: &str) {
        self.sink.emit(
            Diagnostic::error(
                DiagnosticCode::new(Category::Parse, 102),
                format!("expected {what}, found {}", self.current()),
                self.current_span(),
            )
            .with_label("here"),
        );
    }

    /// Skips to the end of the current statement: past a `;`, or up to a `}`.
    pub(crate) fn recover_to_statement_end(&mut self) {
        while !self.at_eof() && !self.at(JsToken::Semicolon) && !self.at(JsToken::RightBrace) {
            self.advance();
        }
        self.eat(JsToken::Semicolon);
    }

    // ========================================================================
    // Top level
    // ========================================================================

    /// Parses a whole module.
    pub fn parse_program(&mut self) -> Program {
        let start = self.current_span();
        let mut body = Vec::new();
        while !self.at_eof() {
            let before = self.pos;
            body.push(self.parse_statement());
            if self.pos == before {
                self.advance();
            }
        }
        Program {
            body,
            span: start.merge(self.current_span()),
        }
    }
}
