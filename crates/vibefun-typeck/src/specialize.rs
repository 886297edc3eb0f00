//! Division specialization.
//!
//! After inference, every `Divide` node is rewritten to `IntDivide` or
//! `FloatDivide` based on the resolved operand type. A plain `Divide`
//! reaching the code generator is an internal error, so this pass is the
//! last writer of binary operators.

use rustc_hash::FxHashMap;
use vibefun_core::{CoreBinOp, CoreDecl, CoreExpr, CoreModule, NodeId};

use crate::ty::Ty;

/// Rewrite all divisions in a module according to the inferred types.
pub fn specialize_divides(module: &CoreModule, types: &FxHashMap<NodeId, Ty>) -> CoreModule {
    let mut module = module.clone();
    for decl in &mut module.decls {
        match decl {
            CoreDecl::Let { value, .. } => specialize_expr(value, types),
            CoreDecl::LetRecGroup { bindings, .. } => {
                for b in bindings {
                    specialize_expr(&mut b.value, types);
                }
            }
            _ => {}
        }
    }
    module
}

fn specialize_expr(expr: &mut CoreExpr, types: &FxHashMap<NodeId, Ty>) {
    match expr {
        CoreExpr::Binary { op, lhs, rhs, .. } => {
            specialize_expr(lhs, types);
            specialize_expr(rhs, types);
            if *op == CoreBinOp::Divide {
                // An unconstrained operand defaulted to Int during
                // inference, so anything non-Float divides integrally.
                let is_float = matches!(types.get(&lhs.id()), Some(Ty::Const(crate::ty::TyConst::Float)));
                *op = if is_float {
                    CoreBinOp::FloatDivide
                } else {
                    CoreBinOp::IntDivide
                };
            }
        }
        CoreExpr::Lit { .. } | CoreExpr::Var { .. } => {}
        CoreExpr::Lambda { body, .. } => specialize_expr(body, types),
        CoreExpr::Apply { func, arg, .. } => {
            specialize_expr(func, types);
            specialize_expr(arg, types);
        }
        CoreExpr::Let { value, body, .. } => {
            specialize_expr(value, types);
            specialize_expr(body, types);
        }
        CoreExpr::If { cond, then, els, .. } => {
            specialize_expr(cond, types);
            specialize_expr(then, types);
            specialize_expr(els, types);
        }
        CoreExpr::Match {
            scrutinee, arms, ..
        } => {
            specialize_expr(scrutinee, types);
            for arm in arms {
                if let Some(guard) = &mut arm.guard {
                    specialize_expr(guard, types);
                }
                specialize_expr(&mut arm.body, types);
            }
        }
        CoreExpr::Record { spread, fields, .. } => {
            if let Some(base) = spread {
                specialize_expr(base, types);
            }
            for (_, value) in fields {
                specialize_expr(value, types);
            }
        }
        CoreExpr::FieldAccess { expr, .. } => specialize_expr(expr, types),
        CoreExpr::Tuple { items, .. } => {
            for item in items {
                specialize_expr(item, types);
            }
        }
        CoreExpr::List { items, tail, .. } => {
            for item in items {
                specialize_expr(item, types);
            }
            if let Some(tail) = tail {
                specialize_expr(tail, types);
            }
        }
        CoreExpr::Unary { expr, .. } => specialize_expr(expr, types),
        CoreExpr::Annot { expr, .. } => specialize_expr(expr, types),
    }
}
