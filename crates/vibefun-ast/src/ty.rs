//! Surface type expressions.

use serde::{Deserialize, Serialize};
use vibefun_common::Span;

/// A type as written in source: annotations, external signatures, and the
/// right-hand sides of `type` declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeExpr {
    /// `Int`, `String`, `Point` -- a type constant or nullary named type.
    Const {
        name: String,
        span: Span,
    },
    /// A lowercase type variable, e.g. `t` in `(t) -> t`.
    Var {
        name: String,
        span: Span,
    },
    /// `Name<T, …>`.
    App {
        name: String,
        args: Vec<TypeExpr>,
        span: Span,
    },
    /// `(T, …) -> U` -- multi-parameter arrow, curried by the desugarer.
    Fun {
        params: Vec<TypeExpr>,
        ret: Box<TypeExpr>,
        span: Span,
    },
    /// `{ x: Int, y: Int }`.
    Record {
        fields: Vec<(String, TypeExpr)>,
        span: Span,
    },
    /// `(T, U)`.
    Tuple {
        items: Vec<TypeExpr>,
        span: Span,
    },
}

impl TypeExpr {
    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Const { span, .. }
            | TypeExpr::Var { span, .. }
            | TypeExpr::App { span, .. }
            | TypeExpr::Fun { span, .. }
            | TypeExpr::Record { span, .. }
            | TypeExpr::Tuple { span, .. } => *span,
        }
    }
}
