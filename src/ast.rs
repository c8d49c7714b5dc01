//! Abstract syntax tree for the Lox language.
//!
//! The node set is closed and known at compile time, so the tree is modelled
//! as two sum types — [`Expr`] and [`Stmt`] — handled with exhaustive
//! `match`es in the resolver and interpreter instead of a visitor hierarchy.
//!
//! Nodes are immutable once built.  Variable references and assignments carry
//! an [`ExprId`] because the resolver's scope-depth map is keyed by *node
//! identity*, not structure: two syntactically identical references at
//! different source locations must resolve independently.

use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::token::Token;

/// Identity of a `Variable` / `Assign` node, used as the key of the
/// resolver's scope-depth map.
///
/// Ids are drawn from a process-wide counter rather than a per-parse one: a
/// REPL interpreter keeps its depth map (and closures holding resolved AST)
/// alive across input lines, so ids from separate parses must never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(usize);

impl ExprId {
    /// Allocate a fresh, never-before-seen id.
    pub fn fresh() -> Self {
        static NEXT: AtomicUsize = AtomicUsize::new(0);

        ExprId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A **literal constant** that appears directly in the source code.
///
/// These variants are the *terminal leaves* of the expression tree and do
/// **not** retain the originating [`Token`]: the parser converts the value at
/// parse time so literals carry no diagnostic baggage.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Numeric literal — stored as IEEE-754 `f64`.
    /// Integral lexemes such as `"3"` are still parsed as `3.0`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    /// The boolean constant `true`.
    True,

    /// The boolean constant `false`.
    False,

    /// The `nil` literal (Lox's `null`).
    Nil,
}

/// **AST node** representing every kind of *expression* in Lox.
#[derive(Debug, Clone)]
pub enum Expr {
    /// A literal constant: number, string, `true`, `false`, or `nil`.
    Literal(LiteralValue),

    /// Prefix unary operator expression, e.g. `!isReady` or `-42`.
    Unary {
        /// The operator token (`!` or `-`).
        operator: Token,
        /// Operand to which the operator is applied.
        right: Box<Expr>,
    },

    /// Infix binary operator expression, e.g. `a + b`, `x <= y`.
    Binary {
        left: Box<Expr>,
        /// Operator token such as `+`, `*`, `==`, …
        operator: Token,
        right: Box<Expr>,
    },

    /// Short-circuiting logical operators `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: Token, // `AND` or `OR`
        right: Box<Expr>,
    },

    /// Parenthesised sub-expression: `"(" expression ")"`.
    Grouping(Box<Expr>),

    /// Variable access — resolves to the identifier's current value.
    Variable {
        /// Node identity for the resolver's depth map.
        id: ExprId,
        name: Token,
    },

    /// Assignment expression: `identifier "=" expression`.
    Assign {
        /// Node identity for the resolver's depth map.
        id: ExprId,
        name: Token,
        value: Box<Expr>,
    },

    /// Function-call expression, e.g. `clock()` or `add(1, 2)`.
    Call {
        /// Expression that evaluates to a callable.
        callee: Box<Expr>,
        /// The closing `)` token — retained for error reporting.
        paren: Token,
        /// Argument list (may be empty).
        arguments: Vec<Expr>,
    },
}

/// A function declaration: name, parameter tokens, body statements.
///
/// Shared (`Rc`) between the `Stmt::Function` node that declared it and every
/// closure value created from it, so defining a function in a loop never
/// copies the body.
#[derive(Debug)]
pub struct FunctionDecl {
    pub name: Token,

    /// Parameter name tokens (arity ≤ 255).
    pub params: Vec<Token>,

    /// Body executed when the function is called.
    pub body: Vec<Stmt>,
}

/// **AST node** for *statements* (complete executable constructs).
/// A program is a sequence of these nodes returned by `Parser::parse`.
#[derive(Debug, Clone)]
pub enum Stmt {
    /// Stand-alone expression terminated by a semicolon.
    Expression(Expr),

    /// `print` statement used for output.
    Print(Expr),

    /// Variable declaration: `"var" IDENT ("=" initializer)? ";"`.
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    /// Braced scope containing zero or more declarations/statements.
    /// Also produced by the parse-time desugaring of `for` loops.
    Block(Vec<Stmt>),

    /// `if` / `else` conditional.
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// `while` loop.  `for` loops desugar into this at parse time.
    While { condition: Expr, body: Box<Stmt> },

    /// Function declaration — becomes a first-class callable value.
    Function(Rc<FunctionDecl>),

    /// `return` statement inside a function body.
    Return {
        /// The `return` keyword token (for diagnostics).
        keyword: Token,

        /// Optional expression to return.  Absent ⇒ `nil` is returned.
        value: Option<Expr>,
    },

    /// Class declaration.  Only declaration and name binding are supported;
    /// methods are parsed and resolved but there is no instantiation.
    Class {
        name: Token,
        methods: Vec<Rc<FunctionDecl>>,
    },
}
