//! Pattern nodes.
//!
//! Covers: literal, variable, wildcard, constructor, tuple, record, list
//! (with optional rest), or-patterns, guard patterns, and type-annotated
//! patterns.

use serde::{Deserialize, Serialize};
use vibefun_common::Span;

use crate::expr::{Expr, Literal};
use crate::ty::TypeExpr;

/// A record-pattern field. `pattern: None` is the shorthand `{ x }`,
/// binding the field to a variable of the same name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldPattern {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Box<Pattern>>,
    pub span: Span,
}

/// Any pattern node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Pattern {
    Lit {
        value: Literal,
        span: Span,
    },
    Var {
        name: String,
        span: Span,
    },
    Wildcard {
        span: Span,
    },
    /// `Some(p)`, `None`.
    Ctor {
        name: String,
        args: Vec<Pattern>,
        span: Span,
    },
    Tuple {
        items: Vec<Pattern>,
        span: Span,
    },
    Record {
        fields: Vec<FieldPattern>,
        span: Span,
    },
    /// `[p, q, ...rest]`.
    List {
        items: Vec<Pattern>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rest: Option<Box<Pattern>>,
        span: Span,
    },
    /// `p | q` -- alternatives must bind the same variables.
    Or {
        alternatives: Vec<Pattern>,
        span: Span,
    },
    /// `p when cond`.
    Guard {
        pattern: Box<Pattern>,
        cond: Box<Expr>,
        span: Span,
    },
    /// `(p : T)`.
    Annot {
        pattern: Box<Pattern>,
        ty: TypeExpr,
        span: Span,
    },
}

impl Pattern {
    pub fn span(&self) -> Span {
        match self {
            Pattern::Lit { span, .. }
            | Pattern::Var { span, .. }
            | Pattern::Wildcard { span }
            | Pattern::Ctor { span, .. }
            | Pattern::Tuple { span, .. }
            | Pattern::Record { span, .. }
            | Pattern::List { span, .. }
            | Pattern::Or { span, .. }
            | Pattern::Guard { span, .. }
            | Pattern::Annot { span, .. } => *span,
        }
    }

    /// Collect the variable names this pattern binds, in left-to-right
    /// order. Guard conditions do not bind; or-patterns contribute their
    /// first alternative (the checker verifies all alternatives agree).
    pub fn bound_names(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_bound(&mut out);
        out
    }

    fn collect_bound(&self, out: &mut Vec<String>) {
        match self {
            Pattern::Lit { .. } | Pattern::Wildcard { .. } => {}
            Pattern::Var { name, .. } => out.push(name.clone()),
            Pattern::Ctor { args, .. } => {
                for p in args {
                    p.collect_bound(out);
                }
            }
            Pattern::Tuple { items, .. } => {
                for p in items {
                    p.collect_bound(out);
                }
            }
            Pattern::Record { fields, .. } => {
                for f in fields {
                    match &f.pattern {
                        Some(p) => p.collect_bound(out),
                        None => out.push(f.name.clone()),
                    }
                }
            }
            Pattern::List { items, rest, .. } => {
                for p in items {
                    p.collect_bound(out);
                }
                if let Some(r) = rest {
                    r.collect_bound(out);
                }
            }
            Pattern::Or { alternatives, .. } => {
                if let Some(first) = alternatives.first() {
                    first.collect_bound(out);
                }
            }
            Pattern::Guard { pattern, .. } => pattern.collect_bound(out),
            Pattern::Annot { pattern, .. } => pattern.collect_bound(out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Pattern {
        Pattern::Var {
            name: name.into(),
            span: Span::new(0, 0),
        }
    }

    #[test]
    fn bound_names_nested() {
        let pat = Pattern::Ctor {
            name: "Pair".into(),
            args: vec![
                var("a"),
                Pattern::Tuple {
                    items: vec![var("b"), Pattern::Wildcard { span: Span::new(0, 0) }],
                    span: Span::new(0, 0),
                },
            ],
            span: Span::new(0, 0),
        };
        assert_eq!(pat.bound_names(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn bound_names_record_shorthand() {
        let pat = Pattern::Record {
            fields: vec![
                FieldPattern {
                    name: "x".into(),
                    pattern: None,
                    span: Span::new(0, 0),
                },
                FieldPattern {
                    name: "y".into(),
                    pattern: Some(Box::new(var("z"))),
                    span: Span::new(0, 0),
                },
            ],
            span: Span::new(0, 0),
        };
        assert_eq!(pat.bound_names(), vec!["x".to_string(), "z".to_string()]);
    }
}
