//! Token types for the JavaScript lexer.
//!
//! Literal values are not stored in the token; the parser reads them back
//! from the source text through the token's span.

use offload_source::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A token kind.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum JsToken {
    // === Keywords ===
    /// `const`
    Const,
    /// `else`
    Else,
    /// `false`
    False,
    /// `function`
    Function,
    /// `if`
    If,
    /// `import`
    Import,
    /// `let`
    Let,
    /// `null`
    Null,
    /// `return`
    Return,
    /// `this`
    This,
    /// `true`
    True,
    /// `typeof`
    Typeof,
    /// `var`
    Var,

    // === Literals and names ===
    /// An identifier such as `value` or `$el`.
    Identifier,
    /// A decimal number literal.
    Number,
    /// A single- or double-quoted string literal.
    String,

    // === Punctuation ===
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `:`
    Colon,
    /// `?`
    Question,
    /// `=`
    Equals,
    /// `=>`
    Arrow,

    // === Operators ===
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `!`
    Bang,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `===`
    EqEqEq,
    /// `!==`
    NotEqEq,
    /// `<`
    Less,
    /// `<=`
    LessEq,
    /// `>`
    Greater,
    /// `>=`
    GreaterEq,
    /// `&&`
    AndAnd,
    /// `||`
    OrOr,

    // === Special ===
    /// A lexical error; the diagnostic was already emitted.
    Error,
    /// End of input.
    Eof,
}

impl JsToken {
    /// Returns `true` for reserved words.
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            JsToken::Const
                | JsToken::Else
                | JsToken::False
                | JsToken::Function
                | JsToken::If
                | JsToken::Import
                | JsToken::Let
                | JsToken::Null
                | JsToken::Return
                | JsToken::This
                | JsToken::True
                | JsToken::Typeof
                | JsToken::Var
        )
    }
}

impl fmt::Display for JsToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            JsToken::Const => "'const'",
            JsToken::Else => "'else'",
            JsToken::False => "'false'",
            JsToken::Function => "'function'",
            JsToken::If => "'if'",
            JsToken::Import => "'import'",
            JsToken::Let => "'let'",
            JsToken::Null => "'null'",
            JsToken::Return => "'return'",
            JsToken::This => "'this'",
            JsToken::True => "'true'",
            JsToken::Typeof => "'typeof'",
            JsToken::Var => "'var'",
            JsToken::Identifier => "identifier",
            JsToken::Number => "number",
            JsToken::String => "string",
            JsToken::LeftParen => "'('",
            JsToken::RightParen => "')'",
            JsToken::LeftBrace => "'{'",
            JsToken::RightBrace => "'}'",
            JsToken::LeftBracket => "'['",
            JsToken::RightBracket => "']'",
            JsToken::Semicolon => "';'",
            JsToken::Comma => "','",
            JsToken::Dot => "'.'",
            JsToken::Colon => "':'",
            JsToken::Question => "'?'",
            JsToken::Equals => "'='",
            JsToken::Arrow => "'=>'",
            JsToken::Plus => "'+'",
            JsToken::Minus => "'-'",
            JsToken::Star => "'*'",
            JsToken::Slash => "'/'",
            JsToken::Percent => "'%'",
            JsToken::Bang => "'!'",
            JsToken::EqEq => "'=='",
            JsToken::NotEq => "'!='",
            JsToken::EqEqEq => "'==='",
            JsToken::NotEqEq => "'!=='",
            JsToken::Less => "'<'",
            JsToken::LessEq => "'<='",
            JsToken::Greater => "'>'",
            JsToken::GreaterEq => "'>='",
            JsToken::AndAnd => "'&&'",
            JsToken::OrOr => "'||'",
            JsToken::Error => "invalid token",
            JsToken::Eof => "end of file",
        };
        f.write_str(text)
    }
}

/// Looks up a reserved word.
pub fn lookup_keyword(text: &str) -> Option<JsToken> {
    let kind = match text {
        "const" => JsToken::Const,
        "else" => JsToken::Else,
        "false" => JsToken::False,
        "function" => JsToken::Function,
        "if" => JsToken::If,
        "import" => JsToken::Import,
        "let" => JsToken::Let,
        "null" => JsToken::Null,
        "return" => JsToken::Return,
        "this" => JsToken::This,
        "true" => JsToken::True,
        "typeof" => JsToken::Typeof,
        "var" => JsToken::Var,
        _ => return None,
    };
    Some(kind)
}

/// A token with its location.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Token {
    /// The token kind.
    pub kind: JsToken,
    /// Where the token appears.
    pub span: Span,
    /// Whether a line break separates this token from the previous one.
    pub newline_before: bool,
}
