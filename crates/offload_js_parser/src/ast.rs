//! Syntax tree for the supported JavaScript subset.
//!
//! Every node carries a [`Span`]. Nodes synthesized by transforms use
//! [`Span::DUMMY`], which the printer treats as "no source location".

use offload_common::{Ident, Interner};
use offload_source::Span;
use serde::{Deserialize, Serialize};

/// Text that, inside any comment, marks the following statement as the place
/// where relocated worker functions are registered.
pub const STATIC_FUNCTIONS_MARKER: &str = "OFFLOAD_STATIC_FUNCTIONS_PLACEHOLDER";

// ============================================================================
// Program and statements
// ============================================================================

/// A parsed module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Top-level statements.
    pub body: Vec<Stmt>,
    /// Span of the whole module.
    pub span: Span,
}

/// A typed tag replacing the marker comment.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum InsertionMarker {
    /// Register relocated static functions before this statement.
    StaticFunctions,
}

/// A statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    /// What kind of statement this is.
    pub kind: StmtKind,
    /// Set when a marker comment directly precedes this statement.
    pub marker: Option<InsertionMarker>,
    /// Source location.
    pub span: Span,
}

/// Statement variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    /// `expr;`
    Expr(Expr),
    /// `function name(params) { body }`
    Function(Function),
    /// `const a = 1, b;`
    Var {
        /// `var`, `let` or `const`.
        kind: VarKind,
        /// The declared bindings.
        declarators: Vec<VarDeclarator>,
    },
    /// `return expr;`
    Return(Option<Expr>),
    /// `if (test) consequent else alternate`
    If {
        /// The condition.
        test: Expr,
        /// Taken when the condition holds.
        consequent: Box<Stmt>,
        /// Taken otherwise.
        alternate: Option<Box<Stmt>>,
    },
    /// `{ ... }`
    Block(Vec<Stmt>),
    /// `import name from 'source';` or `import 'source';`
    Import {
        /// The default import binding.
        default: Option<Binding>,
        /// The module specifier.
        source: String,
    },
    /// `;`
    Empty,
    /// A statement that failed to parse.
    Error,
}

/// Declaration keyword of a variable statement.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum VarKind {
    /// `var`
    Var,
    /// `let`
    Let,
    /// `const`
    Const,
}

impl VarKind {
    /// The keyword text.
    pub fn as_str(self) -> &'static str {
        match self {
            VarKind::Var => "var",
            VarKind::Let => "let",
            VarKind::Const => "const",
        }
    }
}

/// One `name = init` of a variable statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDeclarator {
    /// The declared name.
    pub name: Binding,
    /// The initializer.
    pub init: Option<Expr>,
    /// Source location.
    pub span: Span,
}

/// A name introduced by a declaration or parameter list.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Binding {
    /// The name.
    pub name: Ident,
    /// Where the name appears.
    pub span: Span,
}

/// A function declaration, function expression or arrow function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    /// The function's own name; always set for declarations.
    pub name: Option<Binding>,
    /// Parameter names.
    pub params: Vec<Binding>,
    /// The body.
    pub body: FunctionBody,
    /// Whether this is an arrow function.
    pub is_arrow: bool,
    /// Source location.
    pub span: Span,
}

/// A block body, or the expression body of an arrow function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FunctionBody {
    /// `{ ... }`
    Block(Vec<Stmt>),
    /// `=> expr`
    Expr(Box<Expr>),
}

// ============================================================================
// Expressions
// ============================================================================

/// An expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    /// What kind of expression this is.
    pub kind: ExprKind,
    /// Source location.
    pub span: Span,
}

/// Expression variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    /// A reference to a name.
    Ident(Ident),
    /// A number literal.
    Number(f64),
    /// A string literal, unescaped.
    Str(String),
    /// `true` or `false`.
    Bool(bool),
    /// `null`
    Null,
    /// `this`
    This,
    /// `[a, b]`
    Array(Vec<Expr>),
    /// `{ key: value }`
    Object(Vec<Property>),
    /// A function expression or arrow function.
    Function(Box<Function>),
    /// `callee(args)`
    Call {
        /// The called expression.
        callee: Box<Expr>,
        /// The arguments.
        args: Vec<Expr>,
    },
    /// `object.property`
    Member {
        /// The object.
        object: Box<Expr>,
        /// The property name.
        property: Binding,
    },
    /// `object[index]`
    Index {
        /// The object.
        object: Box<Expr>,
        /// The computed key.
        index: Box<Expr>,
    },
    /// `!x`, `-x`, `+x`, `typeof x`
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        operand: Box<Expr>,
    },
    /// `a op b`
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// `target = value`
    Assign {
        /// The assigned place.
        target: Box<Expr>,
        /// The assigned value.
        value: Box<Expr>,
    },
    /// `test ? consequent : alternate`
    Conditional {
        /// The condition.
        test: Box<Expr>,
        /// Value when the condition holds.
        consequent: Box<Expr>,
        /// Value otherwise.
        alternate: Box<Expr>,
    },
    /// `(expr)`, kept so printing preserves the author's grouping.
    Paren(Box<Expr>),
    /// An expression that failed to parse.
    Error,
}

/// One `key: value` entry of an object literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// The key.
    pub key: PropertyKey,
    /// The value.
    pub value: Expr,
    /// Written as `{ key }`.
    pub shorthand: bool,
    /// Source location.
    pub span: Span,
}

/// An object literal key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyKey {
    /// `key: value`
    Ident(Binding),
    /// `'key': value`
    Str(String, Span),
}

/// Prefix operators.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `!`
    Not,
    /// `-`
    Neg,
    /// `+`
    Plus,
    /// `typeof`
    Typeof,
}

impl UnaryOp {
    /// The operator text.
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Typeof => "typeof",
        }
    }
}

/// Infix operators.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `===`
    StrictEq,
    /// `!==`
    StrictNotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `&&`
    And,
    /// `||`
    Or,
}

impl BinaryOp {
    /// The operator text.
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNotEq => "!==",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    /// Precedence level; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 3,
            BinaryOp::And => 4,
            BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::StrictEq | BinaryOp::StrictNotEq => 5,
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => 6,
            BinaryOp::Add | BinaryOp::Sub => 7,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 8,
        }
    }
}

// ============================================================================
// Constructors for synthesized code
// ============================================================================

impl Stmt {
    /// Creates an untagged statement.
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self {
            kind,
            marker: None,
            span,
        }
    }

    /// Wraps an expression as a statement spanning it.
    pub fn expr(expr: Expr) -> Self {
        let span = expr.span;
        Self::new(StmtKind::Expr(expr), span)
    }
}

impl Expr {
    /// Creates an expression.
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// An expression without a source location.
    pub fn synthetic(kind: ExprKind) -> Self {
        Self::new(kind, Span::DUMMY)
    }

    /// A reference to `name`.
    pub fn ident(name: Ident, span: Span) -> Self {
        Self::new(ExprKind::Ident(name), span)
    }

    /// A synthesized string literal.
    pub fn string(value: impl Into<String>) -> Self {
        Self::synthetic(ExprKind::Str(value.into()))
    }

    /// A synthesized `object.property`.
    pub fn member(object: Expr, property: Ident) -> Self {
        Self::synthetic(ExprKind::Member {
            object: Box::new(object),
            property: Binding {
                name: property,
                span: Span::DUMMY,
            },
        })
    }

    /// A synthesized call.
    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Self::synthetic(ExprKind::Call {
            callee: Box::new(callee),
            args,
        })
    }

    /// A synthesized object literal with identifier keys.
    pub fn object(entries: Vec<(Ident, Expr)>) -> Self {
        let properties = entries
            .into_iter()
            .map(|(key, value)| Property {
                key: PropertyKey::Ident(Binding {
                    name: key,
                    span: Span::DUMMY,
                }),
                value,
                shorthand: false,
                span: Span::DUMMY,
            })
            .collect();
        Self::synthetic(ExprKind::Object(properties))
    }

    /// Returns the function node if this is a function expression or arrow.
    pub fn as_function(&self) -> Option<&Function> {
        match &self.kind {
            ExprKind::Function(function) => Some(function),
            ExprKind::Paren(inner) => inner.as_function(),
            _ => None,
        }
    }

    /// The leftmost identifier of a member/call chain, e.g. `parallel` in
    /// `parallel.from(xs).map(f)`.
    pub fn root_ident(&self) -> Option<Ident> {
        match &self.kind {
            ExprKind::Ident(name) => Some(*name),
            ExprKind::Member { object, .. } | ExprKind::Index { object, .. } => object.root_ident(),
            ExprKind::Call { callee, .. } => callee.root_ident(),
            ExprKind::Paren(inner) => inner.root_ident(),
            _ => None,
        }
    }
}

impl Function {
    /// The function's name as text, if it has one.
    pub fn name_text<'a>(&self, interner: &'a Interner) -> Option<&'a str> {
        self.name.map(|b| interner.resolve(b.name))
    }
}
