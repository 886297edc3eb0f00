//! Surface AST to Core IR lowering.
//!
//! Each rewrite is applied bottom-up and is disjoint on its input shape:
//!
//! - multi-parameter lambdas, applications, and function-type arrows curry;
//! - `x |> f` becomes `f(x)`; `f >> g` and `f << g` become lambdas over a
//!   fresh parameter;
//! - blocks become nested `Let` expressions (bare statement expressions
//!   bind a wildcard);
//! - record shorthand `{ x, y }` expands to `{ x: x, y: y }`;
//! - `&` lowers to `Concat`; `/` stays an unspecialized `Divide` for the
//!   type checker to split;
//! - a `mut` binding drops its flag -- the ref cell is built by the value
//!   expression itself (`ref(v)`);
//! - a top-level `when` guard on an arm pattern is hoisted into the arm's
//!   guard (conjoined with an existing guard).
//!
//! The desugarer assigns every Core expression a fresh [`NodeId`] and never
//! reports diagnostics: it is total on well-formed ASTs.

use vibefun_ast::expr::{BinOp, Expr, Literal, Stmt, UnOp};
use vibefun_ast::{Decl, MatchArm, Module, Pattern, TypeDecl, TypeDef, TypeExpr, VariantCase};
use vibefun_common::ModulePath;

use crate::ir::{
    CoreBinOp, CoreDecl, CoreExpr, CoreMatchArm, CoreModule, CoreRecBinding, CoreUnOp, NodeId,
};

/// Lower one parsed module to Core IR.
pub fn desugar_module(path: &ModulePath, module: &Module) -> CoreModule {
    Desugarer::new().module(path, module)
}

/// The lowering context: a NodeId counter plus a fresh-name counter for
/// synthesized lambda parameters.
pub struct Desugarer {
    next_id: u32,
    next_param: u32,
}

impl Desugarer {
    pub fn new() -> Self {
        Desugarer {
            next_id: 0,
            next_param: 0,
        }
    }

    fn fresh_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// A parameter name that cannot occur in user code (`_p0`, `_p1`, …;
    /// the surface grammar reserves the `_p<digits>` namespace).
    fn fresh_param(&mut self) -> String {
        let name = format!("_p{}", self.next_param);
        self.next_param += 1;
        name
    }

    fn module(mut self, path: &ModulePath, module: &Module) -> CoreModule {
        let mut decls = Vec::new();
        let mut re_exports = Vec::new();
        for decl in &module.decls {
            match decl {
                Decl::ReExport(re) => re_exports.push(re.clone()),
                other => decls.push(self.decl(other)),
            }
        }
        CoreModule {
            path: path.clone(),
            imports: module.imports.clone(),
            re_exports,
            decls,
            span: module.span,
        }
    }

    fn decl(&mut self, decl: &Decl) -> CoreDecl {
        match decl {
            Decl::Let(d) => CoreDecl::Let {
                pattern: d.pattern.clone(),
                value: self.expr(&d.value),
                recursive: d.recursive,
                exported: d.exported,
                annotation: d.annotation.as_ref().map(|t| self.type_expr(t)),
                span: d.span,
            },
            Decl::LetRecGroup(g) => CoreDecl::LetRecGroup {
                bindings: g
                    .bindings
                    .iter()
                    .map(|b| CoreRecBinding {
                        name: b.name.clone(),
                        value: self.expr(&b.value),
                        annotation: b.annotation.as_ref().map(|t| self.type_expr(t)),
                        exported: b.exported,
                        span: b.span,
                    })
                    .collect(),
                span: g.span,
            },
            Decl::Type(t) => {
                // Arrow types inside the definition curry like any other.
                let def = match &t.def {
                    TypeDef::Alias(target) => TypeDef::Alias(self.type_expr(target)),
                    TypeDef::Record(fields) => TypeDef::Record(
                        fields
                            .iter()
                            .map(|(n, ty)| (n.clone(), self.type_expr(ty)))
                            .collect(),
                    ),
                    TypeDef::Variant(cases) => TypeDef::Variant(
                        cases
                            .iter()
                            .map(|c| VariantCase {
                                name: c.name.clone(),
                                args: c.args.iter().map(|a| self.type_expr(a)).collect(),
                                span: c.span,
                            })
                            .collect(),
                    ),
                };
                CoreDecl::Type(TypeDecl {
                    name: t.name.clone(),
                    params: t.params.clone(),
                    def,
                    span: t.span,
                })
            }
            Decl::External(e) => CoreDecl::External {
                name: e.name.clone(),
                ty: self.type_expr(&e.ty),
                js_name: e.js_name.clone(),
                from: e.from.clone(),
                exported: e.exported,
                span: e.span,
            },
            Decl::ExternalType(t) => CoreDecl::ExternalType {
                name: t.name.clone(),
                span: t.span,
            },
            Decl::ReExport(_) => unreachable!("re-exports are split off in module()"),
        }
    }

    pub fn expr(&mut self, expr: &Expr) -> CoreExpr {
        match expr {
            Expr::Lit { value, span } => CoreExpr::Lit {
                value: value.clone(),
                id: self.fresh_id(),
                span: *span,
            },
            Expr::Var { name, span } => CoreExpr::Var {
                name: name.clone(),
                id: self.fresh_id(),
                span: *span,
            },
            Expr::Lambda { params, body, span } => {
                let body = self.expr(body);
                if params.is_empty() {
                    // `() => e` takes Unit.
                    let param = self.fresh_param();
                    return CoreExpr::Lambda {
                        param,
                        annotation: None,
                        body: Box::new(body),
                        id: self.fresh_id(),
                        span: *span,
                    };
                }
                // Curry right-to-left, keeping parameter annotations.
                let mut result = body;
                for p in params.iter().rev() {
                    result = CoreExpr::Lambda {
                        param: p.name.clone(),
                        annotation: p.annotation.as_ref().map(|t| self.type_expr(t)),
                        body: Box::new(result),
                        id: self.fresh_id(),
                        span: *span,
                    };
                }
                result
            }
            Expr::App { func, args, span } => {
                let mut result = self.expr(func);
                if args.is_empty() {
                    // `f()` applies Unit.
                    let unit = CoreExpr::Lit {
                        value: Literal::Unit,
                        id: self.fresh_id(),
                        span: *span,
                    };
                    return CoreExpr::Apply {
                        func: Box::new(result),
                        arg: Box::new(unit),
                        id: self.fresh_id(),
                        span: *span,
                    };
                }
                for arg in args {
                    let arg = self.expr(arg);
                    result = CoreExpr::Apply {
                        func: Box::new(result),
                        arg: Box::new(arg),
                        id: self.fresh_id(),
                        span: *span,
                    };
                }
                result
            }
            Expr::Binary { op, lhs, rhs, span } => {
                let lhs = self.expr(lhs);
                let rhs = self.expr(rhs);
                CoreExpr::Binary {
                    op: lower_binop(*op),
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                    id: self.fresh_id(),
                    span: *span,
                }
            }
            Expr::Unary { op, expr, span } => {
                let expr = self.expr(expr);
                CoreExpr::Unary {
                    op: match op {
                        UnOp::Neg => CoreUnOp::Neg,
                        UnOp::Not => CoreUnOp::Not,
                        UnOp::Deref => CoreUnOp::Deref,
                    },
                    expr: Box::new(expr),
                    id: self.fresh_id(),
                    span: *span,
                }
            }
            Expr::If {
                cond,
                then,
                els,
                span,
            } => {
                let cond = self.expr(cond);
                let then = self.expr(then);
                let els = self.expr(els);
                CoreExpr::If {
                    cond: Box::new(cond),
                    then: Box::new(then),
                    els: Box::new(els),
                    id: self.fresh_id(),
                    span: *span,
                }
            }
            Expr::Match {
                scrutinee,
                arms,
                span,
            } => {
                let scrutinee = self.expr(scrutinee);
                let arms = arms.iter().map(|a| self.arm(a)).collect();
                CoreExpr::Match {
                    scrutinee: Box::new(scrutinee),
                    arms,
                    id: self.fresh_id(),
                    span: *span,
                }
            }
            Expr::Record {
                spread,
                fields,
                span,
            } => {
                let spread = spread.as_ref().map(|e| Box::new(self.expr(e)));
                let fields = fields
                    .iter()
                    .map(|f| {
                        let value = match &f.value {
                            Some(v) => self.expr(v),
                            // Shorthand `{ x }` is `{ x: x }`.
                            None => CoreExpr::Var {
                                name: f.name.clone(),
                                id: self.fresh_id(),
                                span: f.span,
                            },
                        };
                        (f.name.clone(), value)
                    })
                    .collect();
                CoreExpr::Record {
                    spread,
                    fields,
                    id: self.fresh_id(),
                    span: *span,
                }
            }
            Expr::FieldAccess { expr, field, span } => {
                let expr = self.expr(expr);
                CoreExpr::FieldAccess {
                    expr: Box::new(expr),
                    field: field.clone(),
                    id: self.fresh_id(),
                    span: *span,
                }
            }
            Expr::Tuple { items, span } => CoreExpr::Tuple {
                items: items.iter().map(|e| self.expr(e)).collect(),
                id: self.fresh_id(),
                span: *span,
            },
            Expr::List { items, tail, span } => CoreExpr::List {
                items: items.iter().map(|e| self.expr(e)).collect(),
                tail: tail.as_ref().map(|e| Box::new(self.expr(e))),
                id: self.fresh_id(),
                span: *span,
            },
            Expr::Block { stmts, result, .. } => self.block(stmts, result),
            Expr::Pipe { value, func, span } => {
                // `x |> f` is `f(x)`.
                let value = self.expr(value);
                let func = self.expr(func);
                CoreExpr::Apply {
                    func: Box::new(func),
                    arg: Box::new(value),
                    id: self.fresh_id(),
                    span: *span,
                }
            }
            Expr::Compose {
                first,
                second,
                backward,
                span,
            } => {
                // `f >> g` is `(x) => g(f(x))`; `f << g` is `(x) => f(g(x))`.
                let first = self.expr(first);
                let second = self.expr(second);
                let (outer, inner) = if *backward {
                    (first, second)
                } else {
                    (second, first)
                };
                let param = self.fresh_param();
                let var = CoreExpr::Var {
                    name: param.clone(),
                    id: self.fresh_id(),
                    span: *span,
                };
                let inner_app = CoreExpr::Apply {
                    func: Box::new(inner),
                    arg: Box::new(var),
                    id: self.fresh_id(),
                    span: *span,
                };
                let outer_app = CoreExpr::Apply {
                    func: Box::new(outer),
                    arg: Box::new(inner_app),
                    id: self.fresh_id(),
                    span: *span,
                };
                CoreExpr::Lambda {
                    param,
                    annotation: None,
                    body: Box::new(outer_app),
                    id: self.fresh_id(),
                    span: *span,
                }
            }
            Expr::Annot { expr, ty, span } => {
                let expr = self.expr(expr);
                CoreExpr::Annot {
                    expr: Box::new(expr),
                    ty: self.type_expr(ty),
                    id: self.fresh_id(),
                    span: *span,
                }
            }
        }
    }

    /// Lower a block `{ s; …; e }` to nested lets, right to left.
    fn block(&mut self, stmts: &[Stmt], result: &Expr) -> CoreExpr {
        let mut body = self.expr(result);
        for stmt in stmts.iter().rev() {
            body = match stmt {
                Stmt::Let {
                    pattern,
                    value,
                    annotation,
                    span: stmt_span,
                    ..
                } => {
                    let mut value = self.expr(value);
                    if let Some(ty) = annotation {
                        let ty = self.type_expr(ty);
                        value = CoreExpr::Annot {
                            ty,
                            span: value.span(),
                            id: self.fresh_id(),
                            expr: Box::new(value),
                        };
                    }
                    CoreExpr::Let {
                        pattern: pattern.clone(),
                        value: Box::new(value),
                        body: Box::new(body),
                        id: self.fresh_id(),
                        span: *stmt_span,
                    }
                }
                Stmt::Expr(e) => {
                    let value = self.expr(e);
                    CoreExpr::Let {
                        pattern: Pattern::Wildcard { span: e.span() },
                        value: Box::new(value),
                        body: Box::new(body),
                        id: self.fresh_id(),
                        span: e.span(),
                    }
                }
            };
        }
        body
    }

    fn arm(&mut self, arm: &MatchArm) -> CoreMatchArm {
        // Hoist a top-level `when` guard out of the pattern, conjoining it
        // with the arm's own guard.
        let (pattern, hoisted) = split_guard(&arm.pattern);
        let mut guard = arm.guard.as_ref().map(|g| self.expr(g));
        if let Some(cond) = hoisted {
            let cond = self.expr(cond);
            guard = Some(match guard {
                None => cond,
                Some(existing) => CoreExpr::Binary {
                    op: CoreBinOp::And,
                    span: existing.span().merge(cond.span()),
                    id: self.fresh_id(),
                    lhs: Box::new(cond),
                    rhs: Box::new(existing),
                },
            });
        }
        CoreMatchArm {
            pattern,
            guard,
            body: self.expr(&arm.body),
            span: arm.span,
        }
    }

    /// Curry multi-parameter function types: `(T, U) -> V` becomes
    /// `(T) -> (U) -> V`. A nullary arrow takes Unit.
    pub fn type_expr(&mut self, ty: &TypeExpr) -> TypeExpr {
        match ty {
            TypeExpr::Const { .. } | TypeExpr::Var { .. } => ty.clone(),
            TypeExpr::App { name, args, span } => TypeExpr::App {
                name: name.clone(),
                args: args.iter().map(|t| self.type_expr(t)).collect(),
                span: *span,
            },
            TypeExpr::Fun { params, ret, span } => {
                let mut result = self.type_expr(ret);
                if params.is_empty() {
                    return TypeExpr::Fun {
                        params: vec![TypeExpr::Const {
                            name: "Unit".to_string(),
                            span: *span,
                        }],
                        ret: Box::new(result),
                        span: *span,
                    };
                }
                for p in params.iter().rev() {
                    result = TypeExpr::Fun {
                        params: vec![self.type_expr(p)],
                        ret: Box::new(result),
                        span: *span,
                    };
                }
                result
            }
            TypeExpr::Record { fields, span } => TypeExpr::Record {
                fields: fields
                    .iter()
                    .map(|(n, t)| (n.clone(), self.type_expr(t)))
                    .collect(),
                span: *span,
            },
            TypeExpr::Tuple { items, span } => TypeExpr::Tuple {
                items: items.iter().map(|t| self.type_expr(t)).collect(),
                span: *span,
            },
        }
    }
}

impl Default for Desugarer {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a top-level guard (possibly under an annotation) off a pattern.
fn split_guard(pattern: &Pattern) -> (Pattern, Option<&Expr>) {
    match pattern {
        Pattern::Guard { pattern, cond, .. } => ((**pattern).clone(), Some(cond.as_ref())),
        Pattern::Annot {
            pattern: inner,
            ty,
            span,
        } => {
            let (stripped, guard) = split_guard(inner);
            (
                Pattern::Annot {
                    pattern: Box::new(stripped),
                    ty: ty.clone(),
                    span: *span,
                },
                guard,
            )
        }
        other => (other.clone(), None),
    }
}

fn lower_binop(op: BinOp) -> CoreBinOp {
    match op {
        BinOp::Add => CoreBinOp::Add,
        BinOp::Sub => CoreBinOp::Sub,
        BinOp::Mul => CoreBinOp::Mul,
        BinOp::Div => CoreBinOp::Divide,
        BinOp::Concat => CoreBinOp::Concat,
        BinOp::Eq => CoreBinOp::Eq,
        BinOp::Neq => CoreBinOp::Neq,
        BinOp::Lt => CoreBinOp::Lt,
        BinOp::Le => CoreBinOp::Le,
        BinOp::Gt => CoreBinOp::Gt,
        BinOp::Ge => CoreBinOp::Ge,
        BinOp::And => CoreBinOp::And,
        BinOp::Or => CoreBinOp::Or,
        BinOp::RefAssign => CoreBinOp::RefAssign,
    }
}
