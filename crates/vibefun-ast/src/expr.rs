//! Expression nodes.

use serde::{Deserialize, Serialize};
use vibefun_common::Span;

use crate::pattern::Pattern;
use crate::ty::TypeExpr;

/// A literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Unit,
}

/// Binary operators as written in source. `&` is string concatenation;
/// `/` stays a single `Div` until the type checker splits it by operand
/// type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Concat,
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    /// `r := v`, ref-cell assignment.
    RefAssign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOp {
    Neg,
    Not,
    /// `!r`, ref-cell dereference.
    Deref,
}

/// A lambda parameter with an optional type annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<TypeExpr>,
    pub span: Span,
}

/// One arm of a `match` expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchArm {
    pub pattern: Pattern,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<Expr>,
    pub body: Expr,
    pub span: Span,
}

/// A record-literal field. `value: None` is the shorthand `{ x, y }`,
/// expanded by the desugarer to `{ x: x, y: y }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordField {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Expr>,
    pub span: Span,
}

/// A statement inside a block `{ s; …; e }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// `let [mut] pat = expr`.
    Let {
        pattern: Pattern,
        value: Expr,
        #[serde(default)]
        mutable: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        annotation: Option<TypeExpr>,
        span: Span,
    },
    /// A bare expression evaluated for effect.
    Expr(Expr),
}

/// Any surface expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Lit {
        value: Literal,
        span: Span,
    },
    Var {
        name: String,
        span: Span,
    },
    /// `f(a, b, …)` -- multi-argument application, curried by the desugarer.
    App {
        func: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },
    /// `(x, y) => e` -- multi-parameter lambda, curried by the desugarer.
    Lambda {
        params: Vec<Param>,
        body: Box<Expr>,
        span: Span,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },
    Unary {
        op: UnOp,
        expr: Box<Expr>,
        span: Span,
    },
    If {
        cond: Box<Expr>,
        then: Box<Expr>,
        els: Box<Expr>,
        span: Span,
    },
    Match {
        scrutinee: Box<Expr>,
        arms: Vec<MatchArm>,
        span: Span,
    },
    /// `{ f: v, … }` or `{ …base, f: v, … }` (spread doubles as record
    /// update).
    Record {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        spread: Option<Box<Expr>>,
        fields: Vec<RecordField>,
        span: Span,
    },
    FieldAccess {
        expr: Box<Expr>,
        field: String,
        span: Span,
    },
    Tuple {
        items: Vec<Expr>,
        span: Span,
    },
    /// `[a, b, …tail]`.
    List {
        items: Vec<Expr>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tail: Option<Box<Expr>>,
        span: Span,
    },
    /// `{ s; …; e }`.
    Block {
        stmts: Vec<Stmt>,
        result: Box<Expr>,
        span: Span,
    },
    /// `x |> f`.
    Pipe {
        value: Box<Expr>,
        func: Box<Expr>,
        span: Span,
    },
    /// `f >> g` (forward) or `f << g` (backward).
    Compose {
        first: Box<Expr>,
        second: Box<Expr>,
        backward: bool,
        span: Span,
    },
    /// `(e : T)`.
    Annot {
        expr: Box<Expr>,
        ty: TypeExpr,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Lit { span, .. }
            | Expr::Var { span, .. }
            | Expr::App { span, .. }
            | Expr::Lambda { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Unary { span, .. }
            | Expr::If { span, .. }
            | Expr::Match { span, .. }
            | Expr::Record { span, .. }
            | Expr::FieldAccess { span, .. }
            | Expr::Tuple { span, .. }
            | Expr::List { span, .. }
            | Expr::Block { span, .. }
            | Expr::Pipe { span, .. }
            | Expr::Compose { span, .. }
            | Expr::Annot { span, .. } => *span,
        }
    }
}
