//! The Core IR: the normal form consumed by the type checker and the code
//! generator.
//!
//! Relative to the surface AST, Core is smaller and more regular:
//!
//! - every lambda takes exactly one parameter; applications are unary;
//! - blocks are nested `Let` expressions;
//! - pipes and composition are gone (lowered to applications/lambdas);
//! - string concatenation is the dedicated [`CoreBinOp::Concat`];
//! - `/` is [`CoreBinOp::Divide`] until the type checker specializes it to
//!   `IntDivide` or `FloatDivide` -- a plain `Divide` reaching the code
//!   generator is an internal error;
//! - mutable bindings are plain bindings whose value builds a ref cell.
//!
//! Match arms and patterns pass through from the surface unchanged; the
//! pattern analyzer and code generator consume them directly.
//!
//! Every expression node carries a [`NodeId`] assigned by the desugarer.
//! Post-typing annotations (types, variable resolutions) key on NodeIds,
//! which stay unique even where desugaring duplicates source spans.

use serde::Serialize;
use vibefun_ast::expr::Literal;
use vibefun_ast::{ImportDecl, Pattern, ReExportDecl, TypeDecl, TypeExpr};
use vibefun_common::{ModulePath, Span};

/// Unique id of a Core expression node within one compilation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub u32);

/// Unary operators surviving into Core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CoreUnOp {
    Neg,
    Not,
    /// `!r` -- read a ref cell.
    Deref,
}

/// Binary operators surviving into Core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CoreBinOp {
    Add,
    Sub,
    Mul,
    /// Unspecialized division; eliminated by the type checker.
    Divide,
    IntDivide,
    FloatDivide,
    /// String concatenation (`&` in the surface).
    Concat,
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    /// `r := v`, returns Unit.
    RefAssign,
}

/// One arm of a Core `match`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreMatchArm {
    pub pattern: Pattern,
    pub guard: Option<CoreExpr>,
    pub body: CoreExpr,
    pub span: Span,
}

/// A Core expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CoreExpr {
    Lit {
        value: Literal,
        id: NodeId,
        span: Span,
    },
    Var {
        name: String,
        id: NodeId,
        span: Span,
    },
    Lambda {
        param: String,
        /// Surface annotation on the parameter, if any.
        annotation: Option<TypeExpr>,
        body: Box<CoreExpr>,
        id: NodeId,
        span: Span,
    },
    Apply {
        func: Box<CoreExpr>,
        arg: Box<CoreExpr>,
        id: NodeId,
        span: Span,
    },
    /// Block-level binding: `let p = v in body`.
    Let {
        pattern: Pattern,
        value: Box<CoreExpr>,
        body: Box<CoreExpr>,
        id: NodeId,
        span: Span,
    },
    If {
        cond: Box<CoreExpr>,
        then: Box<CoreExpr>,
        els: Box<CoreExpr>,
        id: NodeId,
        span: Span,
    },
    Match {
        scrutinee: Box<CoreExpr>,
        arms: Vec<CoreMatchArm>,
        id: NodeId,
        span: Span,
    },
    Record {
        spread: Option<Box<CoreExpr>>,
        fields: Vec<(String, CoreExpr)>,
        id: NodeId,
        span: Span,
    },
    FieldAccess {
        expr: Box<CoreExpr>,
        field: String,
        id: NodeId,
        span: Span,
    },
    Tuple {
        items: Vec<CoreExpr>,
        id: NodeId,
        span: Span,
    },
    List {
        items: Vec<CoreExpr>,
        tail: Option<Box<CoreExpr>>,
        id: NodeId,
        span: Span,
    },
    Unary {
        op: CoreUnOp,
        expr: Box<CoreExpr>,
        id: NodeId,
        span: Span,
    },
    Binary {
        op: CoreBinOp,
        lhs: Box<CoreExpr>,
        rhs: Box<CoreExpr>,
        id: NodeId,
        span: Span,
    },
    /// `(e : T)` -- the annotation is checked, then transparent.
    Annot {
        expr: Box<CoreExpr>,
        ty: TypeExpr,
        id: NodeId,
        span: Span,
    },
}

impl CoreExpr {
    pub fn id(&self) -> NodeId {
        match self {
            CoreExpr::Lit { id, .. }
            | CoreExpr::Var { id, .. }
            | CoreExpr::Lambda { id, .. }
            | CoreExpr::Apply { id, .. }
            | CoreExpr::Let { id, .. }
            | CoreExpr::If { id, .. }
            | CoreExpr::Match { id, .. }
            | CoreExpr::Record { id, .. }
            | CoreExpr::FieldAccess { id, .. }
            | CoreExpr::Tuple { id, .. }
            | CoreExpr::List { id, .. }
            | CoreExpr::Unary { id, .. }
            | CoreExpr::Binary { id, .. }
            | CoreExpr::Annot { id, .. } => *id,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            CoreExpr::Lit { span, .. }
            | CoreExpr::Var { span, .. }
            | CoreExpr::Lambda { span, .. }
            | CoreExpr::Apply { span, .. }
            | CoreExpr::Let { span, .. }
            | CoreExpr::If { span, .. }
            | CoreExpr::Match { span, .. }
            | CoreExpr::Record { span, .. }
            | CoreExpr::FieldAccess { span, .. }
            | CoreExpr::Tuple { span, .. }
            | CoreExpr::List { span, .. }
            | CoreExpr::Unary { span, .. }
            | CoreExpr::Binary { span, .. }
            | CoreExpr::Annot { span, .. } => *span,
        }
    }

    /// Whether this expression is a syntactic value for the purposes of
    /// let-generalization: a literal, variable, lambda, constructor
    /// application whose arguments are all values, record of values,
    /// tuple of values, or list of values. Everything that can compute
    /// (applications, refs, arithmetic, control flow) is not a value.
    ///
    /// Constructor applications cannot be distinguished from ordinary
    /// applications here; the type checker passes a predicate that knows
    /// the constructor registry.
    pub fn is_syntactic_value(&self, is_constructor: &dyn Fn(&str) -> bool) -> bool {
        match self {
            CoreExpr::Lit { .. } | CoreExpr::Var { .. } | CoreExpr::Lambda { .. } => true,
            CoreExpr::Tuple { items, .. } => {
                items.iter().all(|e| e.is_syntactic_value(is_constructor))
            }
            CoreExpr::Record { spread, fields, .. } => {
                spread.is_none()
                    && fields.iter().all(|(_, e)| e.is_syntactic_value(is_constructor))
            }
            CoreExpr::List { items, tail, .. } => {
                tail.is_none() && items.iter().all(|e| e.is_syntactic_value(is_constructor))
            }
            CoreExpr::Apply { .. } => match self.application_head() {
                Some((CoreExpr::Var { name, .. }, args)) if is_constructor(name) => {
                    args.iter().all(|a| a.is_syntactic_value(is_constructor))
                }
                _ => false,
            },
            CoreExpr::Annot { expr, .. } => expr.is_syntactic_value(is_constructor),
            _ => false,
        }
    }

    /// Unroll a curried application spine: `((f a) b) c` gives
    /// `(f, [a, b, c])`. Returns `None` for non-applications.
    pub fn application_head(&self) -> Option<(&CoreExpr, Vec<&CoreExpr>)> {
        let mut args = Vec::new();
        let mut current = self;
        while let CoreExpr::Apply { func, arg, .. } = current {
            args.push(arg.as_ref());
            current = func;
        }
        if args.is_empty() {
            return None;
        }
        args.reverse();
        Some((current, args))
    }
}

/// A top-level Core declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CoreDecl {
    Let {
        pattern: Pattern,
        value: CoreExpr,
        recursive: bool,
        exported: bool,
        annotation: Option<TypeExpr>,
        span: Span,
    },
    LetRecGroup {
        bindings: Vec<CoreRecBinding>,
        span: Span,
    },
    /// Type declarations pass through; the checker registers constructors,
    /// codegen emits constructor consts for variants.
    Type(TypeDecl),
    External {
        name: String,
        ty: TypeExpr,
        js_name: String,
        from: Option<String>,
        exported: bool,
        span: Span,
    },
    ExternalType {
        name: String,
        span: Span,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreRecBinding {
    pub name: String,
    pub value: CoreExpr,
    pub annotation: Option<TypeExpr>,
    pub exported: bool,
    pub span: Span,
}

/// A desugared module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreModule {
    pub path: ModulePath,
    pub imports: Vec<ImportDecl>,
    pub re_exports: Vec<ReExportDecl>,
    pub decls: Vec<CoreDecl>,
    pub span: Span,
}
