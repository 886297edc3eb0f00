//! Integration tests for type inference over desugared modules.
//!
//! Each test builds a small surface module by hand (the parser is an
//! external collaborator), desugars it, runs the checker, and asserts on
//! inferred export types and error shapes. Covers: currying, let-
//! polymorphism, the value restriction, width subtyping, refs, nominal
//! variants, match typing, and exhaustiveness wiring.

use vibefun_ast::expr::{BinOp, Expr, Literal, Param};
use vibefun_ast::{
    Decl, LetDecl, MatchArm, Module, Pattern, TypeDecl, TypeDef, TypeExpr, VariantCase,
};
use vibefun_common::{ModulePath, SourceMap, Span};
use vibefun_core::desugar_module;
use vibefun_typeck::{check_module, ImportContext, TypeError, TypeckResult};

// ── Builders ───────────────────────────────────────────────────────────

fn sp() -> Span {
    Span::new(0, 0)
}

fn var(name: &str) -> Expr {
    Expr::Var { name: name.into(), span: sp() }
}

fn int(n: i64) -> Expr {
    Expr::Lit { value: Literal::Int(n), span: sp() }
}

fn string(s: &str) -> Expr {
    Expr::Lit { value: Literal::String(s.into()), span: sp() }
}

fn app(func: Expr, args: Vec<Expr>) -> Expr {
    Expr::App { func: Box::new(func), args, span: sp() }
}

fn lambda(params: &[&str], body: Expr) -> Expr {
    Expr::Lambda {
        params: params
            .iter()
            .map(|p| Param { name: p.to_string(), annotation: None, span: sp() })
            .collect(),
        body: Box::new(body),
        span: sp(),
    }
}

fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), span: sp() }
}

fn let_decl(name: &str, value: Expr) -> Decl {
    Decl::Let(LetDecl {
        pattern: Pattern::Var { name: name.into(), span: sp() },
        value,
        mutable: false,
        recursive: false,
        exported: true,
        annotation: None,
        span: sp(),
    })
}

fn option_type() -> Decl {
    Decl::Type(TypeDecl {
        name: "Option".into(),
        params: vec!["T".into()],
        def: TypeDef::Variant(vec![
            VariantCase {
                name: "Some".into(),
                args: vec![TypeExpr::Var { name: "T".into(), span: sp() }],
                span: sp(),
            },
            VariantCase { name: "None".into(), args: vec![], span: sp() },
        ]),
        span: sp(),
    })
}

fn check(decls: Vec<Decl>) -> TypeckResult {
    let module = Module { imports: vec![], decls, span: sp() };
    let path = ModulePath::from("/proj/main.vf");
    let core = desugar_module(&path, &module);
    let mut sources = SourceMap::new();
    sources.add(path, String::new());
    check_module(&core, None, &ImportContext::default(), &sources)
}

fn assert_no_errors(result: &TypeckResult) {
    assert!(!result.has_errors(), "expected no errors, got: {:?}", result.errors);
}

fn export_type(result: &TypeckResult, name: &str) -> String {
    result.exports.values[name].scheme.ty.to_string()
}

// ── Currying (S1) ──────────────────────────────────────────────────────

#[test]
fn curried_arithmetic() {
    // let add = (x, y) => x + y
    // export let r = add(1)(2)
    let result = check(vec![
        let_decl("add", lambda(&["x", "y"], binary(BinOp::Add, var("x"), var("y")))),
        let_decl("r", app(app(var("add"), vec![int(1)]), vec![int(2)])),
    ]);
    assert_no_errors(&result);
    assert_eq!(export_type(&result, "add"), "(Int) -> (Int) -> Int");
    assert_eq!(export_type(&result, "r"), "Int");
}

#[test]
fn multi_arg_call_equals_curried_call() {
    // add(1, 2) and add(1)(2) infer the same type.
    let result = check(vec![
        let_decl("add", lambda(&["x", "y"], binary(BinOp::Add, var("x"), var("y")))),
        let_decl("a", app(var("add"), vec![int(1), int(2)])),
        let_decl("b", app(app(var("add"), vec![int(1)]), vec![int(2)])),
    ]);
    assert_no_errors(&result);
    assert_eq!(export_type(&result, "a"), "Int");
    assert_eq!(export_type(&result, "b"), "Int");
}

// ── Let-polymorphism and the value restriction (S5) ────────────────────

#[test]
fn lambda_generalizes() {
    let result = check(vec![
        let_decl("id", lambda(&["x"], var("x"))),
        let_decl("a", app(var("id"), vec![int(1)])),
        let_decl("b", app(var("id"), vec![string("hi")])),
    ]);
    assert_no_errors(&result);
    assert_eq!(export_type(&result, "a"), "Int");
    assert_eq!(export_type(&result, "b"), "String");
}

#[test]
fn non_value_binding_is_monomorphic() {
    // let id = (x) => x
    // let idid = id(id)      -- application: not a syntactic value
    // let a = idid(1)        -- binds the shared variable to Int
    // let s = idid("hi")     -- must be a type error
    let result = check(vec![
        let_decl("id", lambda(&["x"], var("x"))),
        let_decl("idid", app(var("id"), vec![var("id")])),
        let_decl("a", app(var("idid"), vec![int(1)])),
        let_decl("s", app(var("idid"), vec![string("hi")])),
    ]);
    assert!(
        result
            .errors
            .iter()
            .any(|e| matches!(e, TypeError::Mismatch { .. })),
        "expected a mismatch from the second use, got: {:?}",
        result.errors
    );
}

#[test]
fn list_of_values_still_generalizes() {
    // A list literal of values is a value, so it generalizes.
    let result = check(vec![
        let_decl("id", lambda(&["x"], var("x"))),
        let_decl(
            "ids",
            Expr::List { items: vec![var("id")], tail: None, span: sp() },
        ),
    ]);
    assert_no_errors(&result);
    assert!(export_type(&result, "ids").starts_with("List<"));
}

#[test]
fn constructor_application_of_values_generalizes() {
    // Some((x) => x) is a value; Some(f(x)) would not be.
    let result = check(vec![
        option_type(),
        let_decl("s", app(var("Some"), vec![lambda(&["x"], var("x"))])),
        let_decl("a", Expr::Match {
            scrutinee: Box::new(var("s")),
            arms: vec![
                MatchArm {
                    pattern: Pattern::Ctor {
                        name: "Some".into(),
                        args: vec![Pattern::Var { name: "f".into(), span: sp() }],
                        span: sp(),
                    },
                    guard: None,
                    body: app(var("f"), vec![int(1)]),
                    span: sp(),
                },
                MatchArm {
                    pattern: Pattern::Wildcard { span: sp() },
                    guard: None,
                    body: int(0),
                    span: sp(),
                },
            ],
            span: sp(),
        }),
    ]);
    assert_no_errors(&result);
    assert_eq!(export_type(&result, "a"), "Int");
}

// ── Width subtyping (S6) ───────────────────────────────────────────────

#[test]
fn open_record_parameter_accepts_extra_fields() {
    // let getX = (p: { x: Int }) => p.x
    // export let v = getX({ x: 3, y: 4, z: 5 })
    let get_x = Expr::Lambda {
        params: vec![Param {
            name: "p".into(),
            annotation: Some(TypeExpr::Record {
                fields: vec![("x".into(), TypeExpr::Const { name: "Int".into(), span: sp() })],
                span: sp(),
            }),
            span: sp(),
        }],
        body: Box::new(Expr::FieldAccess {
            expr: Box::new(var("p")),
            field: "x".into(),
            span: sp(),
        }),
        span: sp(),
    };
    let record = Expr::Record {
        spread: None,
        fields: vec![
            vibefun_ast::expr::RecordField { name: "x".into(), value: Some(int(3)), span: sp() },
            vibefun_ast::expr::RecordField { name: "y".into(), value: Some(int(4)), span: sp() },
            vibefun_ast::expr::RecordField { name: "z".into(), value: Some(int(5)), span: sp() },
        ],
        span: sp(),
    };
    let result = check(vec![
        let_decl("getX", get_x),
        let_decl("v", app(var("getX"), vec![record])),
    ]);
    assert_no_errors(&result);
    assert_eq!(export_type(&result, "v"), "Int");
}

#[test]
fn field_access_infers_an_open_record() {
    // (r) => r.name : the parameter is an open record with at least `name`.
    let result = check(vec![let_decl(
        "getName",
        lambda(
            &["r"],
            Expr::FieldAccess { expr: Box::new(var("r")), field: "name".into(), span: sp() },
        ),
    )]);
    assert_no_errors(&result);
    let ty = export_type(&result, "getName");
    assert!(ty.contains("name:"), "expected an open record, got {ty}");
    assert!(ty.contains(".."), "expected an open row, got {ty}");
}

#[test]
fn closed_record_rejects_extra_fields_on_equation() {
    // Annotating with a closed record type and passing extra fields fails.
    let result = check(vec![Decl::Let(LetDecl {
        pattern: Pattern::Var { name: "p".into(), span: sp() },
        value: Expr::Record {
            spread: None,
            fields: vec![
                vibefun_ast::expr::RecordField { name: "x".into(), value: Some(int(1)), span: sp() },
                vibefun_ast::expr::RecordField { name: "y".into(), value: Some(int(2)), span: sp() },
            ],
            span: sp(),
        },
        mutable: false,
        recursive: false,
        exported: false,
        annotation: Some(TypeExpr::Record {
            fields: vec![("x".into(), TypeExpr::Const { name: "Int".into(), span: sp() })],
            span: sp(),
        }),
        span: sp(),
    })]);
    assert!(
        result
            .errors
            .iter()
            .any(|e| matches!(e, TypeError::RecordFieldExtra { .. })),
        "got: {:?}",
        result.errors
    );
}

// ── Variants and match (S2, S7) ────────────────────────────────────────

#[test]
fn option_get_or_infers() {
    // let getOr = (o, d) => match o { Some(x) => x | None => d }
    let get_or = lambda(
        &["o", "d"],
        Expr::Match {
            scrutinee: Box::new(var("o")),
            arms: vec![
                MatchArm {
                    pattern: Pattern::Ctor {
                        name: "Some".into(),
                        args: vec![Pattern::Var { name: "x".into(), span: sp() }],
                        span: sp(),
                    },
                    guard: None,
                    body: var("x"),
                    span: sp(),
                },
                MatchArm {
                    pattern: Pattern::Ctor { name: "None".into(), args: vec![], span: sp() },
                    guard: None,
                    body: var("d"),
                    span: sp(),
                },
            ],
            span: sp(),
        },
    );
    let result = check(vec![
        option_type(),
        let_decl("getOr", get_or),
        let_decl(
            "a",
            app(var("getOr"), vec![app(var("Some"), vec![int(42)]), int(0)]),
        ),
    ]);
    assert_no_errors(&result);
    assert_eq!(export_type(&result, "a"), "Int");
    assert_eq!(
        export_type(&result, "getOr"),
        "(Option<?0>) -> (?0) -> ?0"
    );
}

#[test]
fn non_exhaustive_match_reports_missing_constructor() {
    // type Color = Red | Green | Blue
    // let name = (c) => match c { Red => "r" | Green => "g" }
    let color = Decl::Type(TypeDecl {
        name: "Color".into(),
        params: vec![],
        def: TypeDef::Variant(vec![
            VariantCase { name: "Red".into(), args: vec![], span: sp() },
            VariantCase { name: "Green".into(), args: vec![], span: sp() },
            VariantCase { name: "Blue".into(), args: vec![], span: sp() },
        ]),
        span: sp(),
    });
    let name_fn = lambda(
        &["c"],
        Expr::Match {
            scrutinee: Box::new(var("c")),
            arms: vec![
                MatchArm {
                    pattern: Pattern::Ctor { name: "Red".into(), args: vec![], span: sp() },
                    guard: None,
                    body: string("r"),
                    span: sp(),
                },
                MatchArm {
                    pattern: Pattern::Ctor { name: "Green".into(), args: vec![], span: sp() },
                    guard: None,
                    body: string("g"),
                    span: sp(),
                },
            ],
            span: sp(),
        },
    );
    let result = check(vec![color, let_decl("name", name_fn)]);
    let witness = result.errors.iter().find_map(|e| match e {
        TypeError::NonExhaustiveMatch { witness, .. } => Some(witness.clone()),
        _ => None,
    });
    assert_eq!(witness.as_deref(), Some("Blue"));
    // The diagnostic hint carries the witness too.
    let diag = result
        .diagnostics
        .iter()
        .find(|d| d.code == "VF1013")
        .expect("diagnostic present");
    assert!(diag.hint.as_ref().unwrap().contains("Blue"));
}

#[test]
fn two_variant_types_with_same_constructors_do_not_mix() {
    // Nominal typing: A = One | Two and B = One | Two are distinct; the
    // second declaration shadows the constructor names, so matching a
    // value of type A against B's `One` is a mismatch.
    let mk = |name: &str| {
        Decl::Type(TypeDecl {
            name: name.into(),
            params: vec![],
            def: TypeDef::Variant(vec![
                VariantCase { name: format!("{name}One"), args: vec![], span: sp() },
                VariantCase { name: format!("{name}Two"), args: vec![], span: sp() },
            ]),
            span: sp(),
        })
    };
    let result = check(vec![
        mk("A"),
        mk("B"),
        let_decl("x", var("AOne")),
        let_decl("y", Expr::Annot {
            expr: Box::new(var("x")),
            ty: TypeExpr::Const { name: "B".into(), span: sp() },
            span: sp(),
        }),
    ]);
    assert!(result.has_errors(), "A and B must not unify");
}

// ── Refs (§4.3.5) ──────────────────────────────────────────────────────

#[test]
fn ref_cells_type_and_stay_monomorphic() {
    // let mut r = ref(1); r := 2 is fine; r := "s" is not.
    let result = check(vec![
        let_decl("r", app(var("ref"), vec![int(1)])),
        let_decl("ok", binary(BinOp::RefAssign, var("r"), int(2))),
        let_decl("bad", binary(BinOp::RefAssign, var("r"), string("s"))),
    ]);
    assert!(
        result
            .errors
            .iter()
            .any(|e| matches!(e, TypeError::Mismatch { .. })),
        "assigning a String into Ref<Int> must fail, got: {:?}",
        result.errors
    );
}

#[test]
fn deref_returns_the_inner_type() {
    let result = check(vec![
        let_decl("r", app(var("ref"), vec![int(1)])),
        let_decl(
            "v",
            Expr::Unary {
                op: vibefun_ast::expr::UnOp::Deref,
                expr: Box::new(var("r")),
                span: sp(),
            },
        ),
    ]);
    assert_no_errors(&result);
    assert_eq!(export_type(&result, "v"), "Int");
}

// ── Division specialization (§3.3) ─────────────────────────────────────

#[test]
fn divide_specializes_by_operand_type() {
    use vibefun_core::{CoreBinOp, CoreDecl, CoreExpr};
    let result = check(vec![
        let_decl("i", binary(BinOp::Div, int(7), int(2))),
        let_decl(
            "f",
            binary(
                BinOp::Div,
                Expr::Lit { value: Literal::Float(7.0), span: sp() },
                Expr::Lit { value: Literal::Float(2.0), span: sp() },
            ),
        ),
    ]);
    assert_no_errors(&result);
    let ops: Vec<CoreBinOp> = result
        .module
        .decls
        .iter()
        .filter_map(|d| match d {
            CoreDecl::Let { value: CoreExpr::Binary { op, .. }, .. } => Some(*op),
            _ => None,
        })
        .collect();
    assert_eq!(ops, vec![CoreBinOp::IntDivide, CoreBinOp::FloatDivide]);
}

// ── Error taxonomy ─────────────────────────────────────────────────────

#[test]
fn unbound_variable_and_constructor() {
    let result = check(vec![
        let_decl("a", var("missing")),
        let_decl("b", var("Missing")),
    ]);
    assert!(result.errors.iter().any(|e| matches!(e, TypeError::UnboundVariable { .. })));
    assert!(result.errors.iter().any(|e| matches!(e, TypeError::UnboundConstructor { .. })));
}

#[test]
fn occurs_check_fires_on_self_application() {
    let result = check(vec![let_decl(
        "f",
        lambda(&["x"], app(var("x"), vec![var("x")])),
    )]);
    assert!(result.errors.iter().any(|e| matches!(e, TypeError::Occurs { .. })));
}

#[test]
fn if_branches_must_agree() {
    let result = check(vec![let_decl(
        "x",
        Expr::If {
            cond: Box::new(Expr::Lit { value: Literal::Bool(true), span: sp() }),
            then: Box::new(int(1)),
            els: Box::new(string("no")),
            span: sp(),
        },
    )]);
    assert!(result.errors.iter().any(|e| matches!(e, TypeError::Mismatch { .. })));
}

#[test]
fn errors_accumulate_without_aborting() {
    // Three independent problems in one module: all reported.
    let result = check(vec![
        let_decl("a", var("missing1")),
        let_decl("b", var("missing2")),
        let_decl("c", binary(BinOp::Add, int(1), string("x"))),
    ]);
    assert!(result.errors.len() >= 3, "got: {:?}", result.errors);
}

// ── Recursion ──────────────────────────────────────────────────────────

#[test]
fn mutually_recursive_group_types() {
    use vibefun_ast::{LetRecGroup, RecBinding};
    // let rec isEven = (n) => if n == 0 then true else isOdd(n - 1)
    //     and isOdd  = (n) => if n == 0 then false else isEven(n - 1)
    let body = |base: bool, other: &str| {
        lambda(
            &["n"],
            Expr::If {
                cond: Box::new(binary(BinOp::Eq, var("n"), int(0))),
                then: Box::new(Expr::Lit { value: Literal::Bool(base), span: sp() }),
                els: Box::new(app(var(other), vec![binary(BinOp::Sub, var("n"), int(1))])),
                span: sp(),
            },
        )
    };
    let result = check(vec![Decl::LetRecGroup(LetRecGroup {
        bindings: vec![
            RecBinding {
                name: "isEven".into(),
                value: body(true, "isOdd"),
                annotation: None,
                exported: true,
                span: sp(),
            },
            RecBinding {
                name: "isOdd".into(),
                value: body(false, "isEven"),
                annotation: None,
                exported: true,
                span: sp(),
            },
        ],
        span: sp(),
    })]);
    assert_no_errors(&result);
    assert_eq!(export_type(&result, "isEven"), "(Int) -> Bool");
    assert_eq!(export_type(&result, "isOdd"), "(Int) -> Bool");
}
