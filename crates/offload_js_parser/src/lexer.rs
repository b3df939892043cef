//! Lexical analyzer for the supported JavaScript subset.
//!
//! Converts source text into [`Token`]s. Whitespace and comments are skipped,
//! but a comment containing [`STATIC_FUNCTIONS_MARKER`] is remembered by its
//! end offset so the parser can tag the statement that follows it. Errors are
//! reported to the [`DiagnosticSink`] and produce [`JsToken::Error`] tokens.

use crate::ast::STATIC_FUNCTIONS_MARKER;
use crate::token::{lookup_keyword, JsToken, Token};
use offload_diagnostics::code::{Category, DiagnosticCode};
use offload_diagnostics::{Diagnostic, DiagnosticSink};
use offload_source::{FileId, Span};

/// Output of the lexer.
#[derive(Debug, Clone)]
pub struct Lexed {
    /// Tokens, always ending with [`JsToken::Eof`].
    pub tokens: Vec<Token>,
    /// End offsets of marker comments, ascending.
    pub markers: Vec<u32>,
}

/// Lexes `source`.
pub fn lex(source: &str, file: FileId, sink: &DiagnosticSink) -> Lexed {
    let mut lexer = Lexer {
        source: source.as_bytes(),
        pos: 0,
        file,
        sink,
        markers: Vec::new(),
        saw_newline: false,
    };
    let tokens = lexer.lex_all();
    Lexed {
        tokens,
        markers: lexer.markers,
    }
}

struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    file: FileId,
    sink: &'a DiagnosticSink,
    markers: Vec<u32>,
    saw_newline: bool,
}

impl Lexer<'_> {
    fn lex_all(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            self.saw_newline = false;
            self.skip_whitespace_and_comments();
            if self.pos >= self.source.len() {
                tokens.push(Token {
                    kind: JsToken::Eof,
                    span: Span::new(self.file, self.pos as u32, self.pos as u32),
                    newline_before: self.saw_newline,
                });
                break;
            }
            let newline_before = self.saw_newline;
            let (kind, span) = self.next_token();
            tokens.push(Token {
                kind,
                span,
                newline_before,
            });
        }
        tokens
    }

    fn peek(&self) -> u8 {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> u8 {
        self.source.get(self.pos + offset).copied().unwrap_or(0)
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(self.file, start as u32, self.pos as u32)
    }

    fn error(&self, msg: &str, span: Span) {
        self.sink.emit(Diagnostic::error(
            DiagnosticCode::new(Category::Parse, 101),
            msg,
            span,
        ));
    }

    fn note_comment(&mut self, start: usize) {
        let text = &self.source[start..self.pos];
        if text.contains(&b'\n') {
            self.saw_newline = true;
        }
        let marker = STATIC_FUNCTIONS_MARKER.as_bytes();
        if text.windows(marker.len()).any(|w| w == marker) {
            self.markers.push(self.pos as u32);
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.pos < self.source.len() && self.source[self.pos].is_ascii_whitespace() {
                if self.source[self.pos] == b'\n' {
                    self.saw_newline = true;
                }
                self.pos += 1;
            }
            if self.pos >= self.source.len() {
                return;
            }
            if self.peek() == b'/' && self.peek_at(1) == b'/' {
                let start = self.pos;
                while self.pos < self.source.len() && self.source[self.pos] != b'\n' {
                    self.pos += 1;
                }
                self.note_comment(start);
                continue;
            }
            if self.peek() == b'/' && self.peek_at(1) == b'*' {
                let start = self.pos;
                self.pos += 2;
                loop {
                    if self.pos >= self.source.len() {
                        self.error("unterminated block comment", self.span_from(start));
                        break;
                    }
                    if self.source[self.pos] == b'*' && self.peek_at(1) == b'/' {
                        self.pos += 2;
                        break;
                    }
                    self.pos += 1;
                }
                self.note_comment(start);
                continue;
            }
            break;
        }
    }

    fn next_token(&mut self) -> (JsToken, Span) {
        let start = self.pos;
        let b = self.peek();

        if b.is_ascii_alphabetic() || b == b'_' || b == b'$' {
            return self.lex_word(start);
        }
        if b.is_ascii_digit() || (b == b'.' && self.peek_at(1).is_ascii_digit()) {
            return self.lex_number(start);
        }
        if b == b'\'' || b == b'"' {
            return self.lex_string(start, b);
        }

        let (kind, len) = match (b, self.peek_at(1), self.peek_at(2)) {
            (b'=', b'=', b'=') => (JsToken::EqEqEq, 3),
            (b'!', b'=', b'=') => (JsToken::NotEqEq, 3),
            (b'=', b'=', _) => (JsToken::EqEq, 2),
            (b'=', b'>', _) => (JsToken::Arrow, 2),
            (b'!', b'=', _) => (JsToken::NotEq, 2),
            (b'<', b'=', _) => (JsToken::LessEq, 2),
            (b'>', b'=', _) => (JsToken::GreaterEq, 2),
            (b'&', b'&', _) => (JsToken::AndAnd, 2),
            (b'|', b'|', _) => (JsToken::OrOr, 2),
            (b'(', _, _) => (JsToken::LeftParen, 1),
            (b')', _, _) => (JsToken::RightParen, 1),
            (b'{', _, _) => (JsToken::LeftBrace, 1),
            (b'}', _, _) => (JsToken::RightBrace, 1),
            (b'[', _, _) => (JsToken::LeftBracket, 1),
            (b']', _, _) => (JsToken::RightBracket, 1),
            (b';', _, _) => (JsToken::Semicolon, 1),
            (b',', _, _) => (JsToken::Comma, 1),
            (b'.', _, _) => (JsToken::Dot, 1),
            (b':', _, _) => (JsToken::Colon, 1),
            (b'?', _, _) => (JsToken::Question, 1),
            (b'=', _, _) => (JsToken::Equals, 1),
            (b'+', _, _) => (JsToken::Plus, 1),
            (b'-', _, _) => (JsToken::Minus, 1),
            (b'*', _, _) => (JsToken::Star, 1),
            (b'/', _, _) => (JsToken::Slash, 1),
            (b'%', _, _) => (JsToken::Percent, 1),
            (b'!', _, _) => (JsToken::Bang, 1),
            (b'<', _, _) => (JsToken::Less, 1),
            (b'>', _, _) => (JsToken::Greater, 1),
            _ => {
                self.pos += 1;
                // Skip the rest of a multi-byte character.
                while self.pos < self.source.len() && (self.source[self.pos] & 0xC0) == 0x80 {
                    self.pos += 1;
                }
                let span = self.span_from(start);
                self.error("unexpected character", span);
                return (JsToken::Error, span);
            }
        };
        self.pos += len;
        (kind, self.span_from(start))
    }

    fn lex_word(&mut self, start: usize) -> (JsToken, Span) {
        while self.pos < self.source.len() {
            let c = self.source[self.pos];
            if c.is_ascii_alphanumeric() || c == b'_' || c == b'$' {
                self.pos += 1;
            } else {
                break;
            }
        }
        // The word is ASCII by construction.
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap_or_default();
        let kind = lookup_keyword(text).unwrap_or(JsToken::Identifier);
        (kind, self.span_from(start))
    }

    fn lex_number(&mut self, start: usize) -> (JsToken, Span) {
        while self.peek().is_ascii_digit() {
            self.pos += 1;
        }
        if self.peek() == b'.' && self.peek_at(1).is_ascii_digit() {
            self.pos += 1;
            while self.peek().is_ascii_digit() {
                self.pos += 1;
            }
        } else if self.peek() == b'.' && start < self.pos {
            // `1.` is a complete number.
            self.pos += 1;
        }
        if matches!(self.peek(), b'e' | b'E') {
            let sign = usize::from(matches!(self.peek_at(1), b'+' | b'-'));
            if self.peek_at(1 + sign).is_ascii_digit() {
                self.pos += 1 + sign;
                while self.peek().is_ascii_digit() {
                    self.pos += 1;
                }
            }
        }
        (JsToken::Number, self.span_from(start))
    }

    fn lex_string(&mut self, start: usize, quote: u8) -> (JsToken, Span) {
        self.pos += 1;
        loop {
            match self.source.get(self.pos) {
                None | Some(b'\n') => {
                    self.pos = self.pos.min(self.source.len());
                    let span = self.span_from(start);
                    self.error("unterminated string literal", span);
                    return (JsToken::Error, span);
                }
                Some(b'\\') => self.pos += 2,
                Some(&c) if c == quote => {
                    self.pos += 1;
                    return (JsToken::String, self.span_from(start));
                }
                Some(_) => self.pos += 1,
            }
        }
    }
}
