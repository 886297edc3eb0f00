//! Tests for the surface-to-Core lowering rules.
//!
//! Each test builds a small surface expression by hand, runs the
//! desugarer, and asserts on the Core shape.

use vibefun_ast::expr::{BinOp, Expr, Literal, Param, RecordField, Stmt};
use vibefun_ast::{Pattern, TypeExpr};
use vibefun_common::Span;
use vibefun_core::ir::{CoreBinOp, CoreExpr};
use vibefun_core::Desugarer;

// ── Helpers ────────────────────────────────────────────────────────────

fn sp() -> Span {
    Span::new(0, 0)
}

fn var(name: &str) -> Expr {
    Expr::Var {
        name: name.into(),
        span: sp(),
    }
}

fn int(n: i64) -> Expr {
    Expr::Lit {
        value: Literal::Int(n),
        span: sp(),
    }
}

fn param(name: &str) -> Param {
    Param {
        name: name.into(),
        annotation: None,
        span: sp(),
    }
}

fn desugar(expr: &Expr) -> CoreExpr {
    Desugarer::new().expr(expr)
}

// ── Currying ───────────────────────────────────────────────────────────

#[test]
fn multi_param_lambda_curries() {
    // (x, y) => x  becomes  (x) => (y) => x
    let lam = Expr::Lambda {
        params: vec![param("x"), param("y")],
        body: Box::new(var("x")),
        span: sp(),
    };
    let core = desugar(&lam);
    let CoreExpr::Lambda { param: p1, body, .. } = core else {
        panic!("expected outer lambda");
    };
    assert_eq!(p1, "x");
    let CoreExpr::Lambda { param: p2, body, .. } = *body else {
        panic!("expected inner lambda");
    };
    assert_eq!(p2, "y");
    assert!(matches!(*body, CoreExpr::Var { ref name, .. } if name == "x"));
}

#[test]
fn multi_arg_application_curries() {
    // f(a, b) becomes (f(a))(b)
    let app = Expr::App {
        func: Box::new(var("f")),
        args: vec![var("a"), var("b")],
        span: sp(),
    };
    let core = desugar(&app);
    let CoreExpr::Apply { func, arg, .. } = core else {
        panic!("expected outer apply");
    };
    assert!(matches!(*arg, CoreExpr::Var { ref name, .. } if name == "b"));
    let CoreExpr::Apply { func, arg, .. } = *func else {
        panic!("expected inner apply");
    };
    assert!(matches!(*func, CoreExpr::Var { ref name, .. } if name == "f"));
    assert!(matches!(*arg, CoreExpr::Var { ref name, .. } if name == "a"));
}

#[test]
fn nullary_application_applies_unit() {
    let app = Expr::App {
        func: Box::new(var("f")),
        args: vec![],
        span: sp(),
    };
    let CoreExpr::Apply { arg, .. } = desugar(&app) else {
        panic!("expected apply");
    };
    assert!(matches!(*arg, CoreExpr::Lit { value: Literal::Unit, .. }));
}

#[test]
fn function_type_arrows_curry() {
    // (Int, String) -> Bool becomes (Int) -> (String) -> Bool
    let ty = TypeExpr::Fun {
        params: vec![
            TypeExpr::Const { name: "Int".into(), span: sp() },
            TypeExpr::Const { name: "String".into(), span: sp() },
        ],
        ret: Box::new(TypeExpr::Const { name: "Bool".into(), span: sp() }),
        span: sp(),
    };
    let curried = Desugarer::new().type_expr(&ty);
    let TypeExpr::Fun { params, ret, .. } = curried else {
        panic!("expected arrow");
    };
    assert_eq!(params.len(), 1);
    let TypeExpr::Fun { params: inner, .. } = *ret else {
        panic!("expected nested arrow");
    };
    assert_eq!(inner.len(), 1);
    assert!(matches!(&inner[0], TypeExpr::Const { name, .. } if name == "String"));
}

// ── Operator sugar ─────────────────────────────────────────────────────

#[test]
fn pipe_becomes_application() {
    // x |> f becomes f(x)
    let pipe = Expr::Pipe {
        value: Box::new(var("x")),
        func: Box::new(var("f")),
        span: sp(),
    };
    let CoreExpr::Apply { func, arg, .. } = desugar(&pipe) else {
        panic!("expected apply");
    };
    assert!(matches!(*func, CoreExpr::Var { ref name, .. } if name == "f"));
    assert!(matches!(*arg, CoreExpr::Var { ref name, .. } if name == "x"));
}

#[test]
fn forward_composition_builds_a_fresh_lambda() {
    // f >> g becomes (_p0) => g(f(_p0))
    let comp = Expr::Compose {
        first: Box::new(var("f")),
        second: Box::new(var("g")),
        backward: false,
        span: sp(),
    };
    let CoreExpr::Lambda { param, body, .. } = desugar(&comp) else {
        panic!("expected lambda");
    };
    assert_eq!(param, "_p0");
    let CoreExpr::Apply { func: outer, arg: inner, .. } = *body else {
        panic!("expected outer apply");
    };
    assert!(matches!(*outer, CoreExpr::Var { ref name, .. } if name == "g"));
    let CoreExpr::Apply { func, arg, .. } = *inner else {
        panic!("expected inner apply");
    };
    assert!(matches!(*func, CoreExpr::Var { ref name, .. } if name == "f"));
    assert!(matches!(*arg, CoreExpr::Var { ref name, .. } if name == "_p0"));
}

#[test]
fn backward_composition_swaps_order() {
    // f << g becomes (_p0) => f(g(_p0))
    let comp = Expr::Compose {
        first: Box::new(var("f")),
        second: Box::new(var("g")),
        backward: true,
        span: sp(),
    };
    let CoreExpr::Lambda { body, .. } = desugar(&comp) else {
        panic!("expected lambda");
    };
    let CoreExpr::Apply { func: outer, .. } = *body else {
        panic!("expected apply");
    };
    assert!(matches!(*outer, CoreExpr::Var { ref name, .. } if name == "f"));
}

#[test]
fn concat_and_divide_lower_to_dedicated_ops() {
    let concat = Expr::Binary {
        op: BinOp::Concat,
        lhs: Box::new(var("a")),
        rhs: Box::new(var("b")),
        span: sp(),
    };
    assert!(matches!(
        desugar(&concat),
        CoreExpr::Binary { op: CoreBinOp::Concat, .. }
    ));

    let div = Expr::Binary {
        op: BinOp::Div,
        lhs: Box::new(int(7)),
        rhs: Box::new(int(2)),
        span: sp(),
    };
    // Division stays unspecialized until the type checker splits it.
    assert!(matches!(
        desugar(&div),
        CoreExpr::Binary { op: CoreBinOp::Divide, .. }
    ));
}

// ── Blocks and records ─────────────────────────────────────────────────

#[test]
fn block_lowers_to_nested_lets() {
    // { let a = 1; f(a); a } becomes let a = 1 in let _ = f(a) in a
    let block = Expr::Block {
        stmts: vec![
            Stmt::Let {
                pattern: Pattern::Var { name: "a".into(), span: sp() },
                value: int(1),
                mutable: false,
                annotation: None,
                span: sp(),
            },
            Stmt::Expr(Expr::App {
                func: Box::new(var("f")),
                args: vec![var("a")],
                span: sp(),
            }),
        ],
        result: Box::new(var("a")),
        span: sp(),
    };
    let CoreExpr::Let { pattern, body, .. } = desugar(&block) else {
        panic!("expected outer let");
    };
    assert!(matches!(pattern, Pattern::Var { ref name, .. } if name == "a"));
    let CoreExpr::Let { pattern, body, .. } = *body else {
        panic!("expected inner let for the statement expression");
    };
    assert!(matches!(pattern, Pattern::Wildcard { .. }));
    assert!(matches!(*body, CoreExpr::Var { ref name, .. } if name == "a"));
}

#[test]
fn record_shorthand_expands() {
    // { x, y: 1 } becomes { x: x, y: 1 }
    let record = Expr::Record {
        spread: None,
        fields: vec![
            RecordField { name: "x".into(), value: None, span: sp() },
            RecordField { name: "y".into(), value: Some(int(1)), span: sp() },
        ],
        span: sp(),
    };
    let CoreExpr::Record { fields, .. } = desugar(&record) else {
        panic!("expected record");
    };
    assert!(matches!(&fields[0].1, CoreExpr::Var { name, .. } if name == "x"));
    assert!(matches!(&fields[1].1, CoreExpr::Lit { value: Literal::Int(1), .. }));
}

// ── Node ids ───────────────────────────────────────────────────────────

#[test]
fn node_ids_are_unique() {
    let mut d = Desugarer::new();
    let a = d.expr(&var("a"));
    let b = d.expr(&int(1));
    assert_ne!(a.id(), b.id());
}
