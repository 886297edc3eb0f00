//! Exhaustiveness and reachability checking for `match` expressions.
//!
//! Implements the usefulness predicate from Maranget's "Warnings for
//! Pattern Matching" (Algorithm U) over an abstract pattern matrix. The
//! matrix is repeatedly specialized by the head constructor of the first
//! column:
//!
//! - variant constructors come from the type registry;
//! - tuples and records have a single shape constructor;
//! - lists decompose as `[]` vs `head :: tail`;
//! - literals are constructors with an infinite domain, so literal-only
//!   matches need a wildcard to be exhaustive;
//! - or-patterns expand into extra rows;
//! - guarded arms never contribute coverage (a guard can always fail),
//!   but are themselves checked for reachability.
//!
//! Runs after type checking so constructor sets and column types are
//! known. Produces `NonExhaustiveMatch` errors carrying a minimal witness
//! and `UnreachablePattern` warnings.

use vibefun_ast::expr::Literal;
use vibefun_ast::Pattern;
use vibefun_common::Span;
use vibefun_core::CoreMatchArm;

use crate::error::TypeError;
use crate::registry::TypeRegistry;
use crate::ty::{Ty, TyConst};

/// Abstract pattern: wildcards, constructors, or-alternatives. Variables
/// are wildcards; literal values are 0-ary constructors identified by
/// their display text.
#[derive(Clone, Debug, PartialEq)]
enum Pat {
    Wildcard,
    Ctor { name: String, args: Vec<Pat> },
    Or(Vec<Pat>),
}

/// A constructor signature: identity plus arity.
#[derive(Clone, Debug, PartialEq)]
struct CtorSig {
    name: String,
    arity: usize,
}

/// The constructor space of a column type.
enum CtorSpace {
    /// A complete, finite enumeration (variants, Bool, Unit, tuples,
    /// records, lists).
    Finite(Vec<CtorSig>),
    /// Int, Float, String: infinitely many literals.
    Infinite,
    /// Functions, refs, type variables, error types: only wildcards cover.
    Opaque,
}

/// Check one `match`: exhaustiveness over the unguarded arms, then
/// per-arm reachability.
pub fn check_match(
    scrutinee_ty: &Ty,
    arms: &[CoreMatchArm],
    registry: &TypeRegistry,
    span: Span,
    errors: &mut Vec<TypeError>,
) {
    // Exhaustiveness: only unguarded arms provide coverage.
    let mut coverage: Vec<Vec<Pat>> = Vec::new();
    for arm in arms {
        if arm.guard.is_none() {
            coverage.push(vec![translate(&arm.pattern, scrutinee_ty, registry)]);
        }
    }
    let tys = [scrutinee_ty.clone()];
    if let Some(witness) = useful(&coverage, &[Pat::Wildcard], &tys, registry) {
        errors.push(TypeError::NonExhaustiveMatch {
            scrutinee: scrutinee_ty.clone(),
            witness: render(&witness[0]),
            span,
        });
    }

    // Reachability: an arm shadowed by the preceding unguarded arms is
    // dead even if it has a guard.
    let mut seen: Vec<Vec<Pat>> = Vec::new();
    for (index, arm) in arms.iter().enumerate() {
        let row = translate(&arm.pattern, scrutinee_ty, registry);
        if useful(&seen, &[row.clone()], &tys, registry).is_none() {
            errors.push(TypeError::UnreachablePattern {
                arm_index: index,
                span: arm.span,
            });
        }
        if arm.guard.is_none() {
            seen.push(vec![row]);
        }
    }
}

// ── Pattern translation ────────────────────────────────────────────────

fn lit_name(lit: &Literal) -> String {
    match lit {
        Literal::Int(n) => n.to_string(),
        Literal::Float(f) => format!("{f:?}"),
        Literal::String(s) => format!("{s:?}"),
        Literal::Bool(b) => b.to_string(),
        Literal::Unit => "()".to_string(),
    }
}

/// Sorted field names of a record column, used as the record shape's
/// constructor identity.
fn record_shape(fields: &[String]) -> String {
    format!("{{{}}}", fields.join(","))
}

fn translate(pattern: &Pattern, ty: &Ty, registry: &TypeRegistry) -> Pat {
    match pattern {
        Pattern::Wildcard { .. } | Pattern::Var { .. } => Pat::Wildcard,
        Pattern::Lit { value, .. } => Pat::Ctor {
            name: lit_name(value),
            args: Vec::new(),
        },
        Pattern::Ctor { name, args, .. } => {
            let arg_tys = ctor_arg_types(ty, name, registry);
            let args = args
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    let sub_ty = arg_tys.get(i).cloned().unwrap_or(Ty::Error);
                    translate(p, &sub_ty, registry)
                })
                .collect();
            Pat::Ctor {
                name: name.clone(),
                args,
            }
        }
        Pattern::Tuple { items, .. } => {
            let elem_tys: Vec<Ty> = match ty {
                Ty::Tuple(tys) => tys.clone(),
                _ => vec![Ty::Error; items.len()],
            };
            Pat::Ctor {
                name: format!("(tuple/{})", items.len()),
                args: items
                    .iter()
                    .enumerate()
                    .map(|(i, p)| {
                        let t = elem_tys.get(i).cloned().unwrap_or(Ty::Error);
                        translate(p, &t, registry)
                    })
                    .collect(),
            }
        }
        Pattern::Record { fields, .. } => {
            // The shape is the full field set of the column type; fields
            // the pattern does not mention are wildcards.
            let (names, field_tys) = record_columns(ty, fields);
            let args = names
                .iter()
                .zip(field_tys.iter())
                .map(|(name, t)| {
                    match fields.iter().find(|f| &f.name == name) {
                        Some(f) => match &f.pattern {
                            Some(p) => translate(p, t, registry),
                            None => Pat::Wildcard,
                        },
                        None => Pat::Wildcard,
                    }
                })
                .collect();
            Pat::Ctor {
                name: record_shape(&names),
                args,
            }
        }
        Pattern::List { items, rest, .. } => {
            let elem_ty = list_elem_type(ty);
            let mut acc = match rest {
                Some(r) => translate(r, ty, registry),
                None => Pat::Ctor {
                    name: "[]".to_string(),
                    args: Vec::new(),
                },
            };
            for item in items.iter().rev() {
                acc = Pat::Ctor {
                    name: "(::)".to_string(),
                    args: vec![translate(item, &elem_ty, registry), acc],
                };
            }
            acc
        }
        Pattern::Or { alternatives, .. } => Pat::Or(
            alternatives
                .iter()
                .map(|p| translate(p, ty, registry))
                .collect(),
        ),
        Pattern::Guard { pattern, .. } => translate(pattern, ty, registry),
        Pattern::Annot { pattern, .. } => translate(pattern, ty, registry),
    }
}

/// The column's record field names (sorted) and their types. Falls back
/// to the pattern's own fields when the type is not a record.
fn record_columns(
    ty: &Ty,
    fields: &[vibefun_ast::pattern::FieldPattern],
) -> (Vec<String>, Vec<Ty>) {
    match ty {
        Ty::Record(rec) => (
            rec.fields.keys().cloned().collect(),
            rec.fields.values().cloned().collect(),
        ),
        _ => {
            let mut names: Vec<String> = fields.iter().map(|f| f.name.clone()).collect();
            names.sort();
            names.dedup();
            let tys = vec![Ty::Error; names.len()];
            (names, tys)
        }
    }
}

fn list_elem_type(ty: &Ty) -> Ty {
    match ty {
        Ty::Named { name, args } if name == "List" && args.len() == 1 => args[0].clone(),
        _ => Ty::Error,
    }
}

/// Field types of a variant constructor, instantiated for the scrutinee's
/// type arguments. Registry-free names convert to the error type (opaque).
fn ctor_arg_types(ty: &Ty, ctor: &str, registry: &TypeRegistry) -> Vec<Ty> {
    let Some((def, ctor_def)) = registry.constructor(ctor) else {
        return Vec::new();
    };
    let args = match ty {
        Ty::Named { args, .. } => args.clone(),
        _ => vec![Ty::Error; def.params.len()],
    };
    let param_map: rustc_hash::FxHashMap<&str, &Ty> = def
        .params
        .iter()
        .map(String::as_str)
        .zip(args.iter())
        .collect();
    ctor_def
        .fields
        .iter()
        .map(|f| analysis_type(f, &param_map, registry))
        .collect()
}

/// A pure (table-free) conversion of a constructor field type, good enough
/// to compute sub-column constructor spaces. Anything unknown is opaque.
fn analysis_type(
    ty: &vibefun_ast::TypeExpr,
    params: &rustc_hash::FxHashMap<&str, &Ty>,
    registry: &TypeRegistry,
) -> Ty {
    use vibefun_ast::TypeExpr;
    match ty {
        TypeExpr::Const { name, .. } => {
            if let Some(mapped) = params.get(name.as_str()) {
                return (*mapped).clone();
            }
            if let Some(c) = TyConst::from_name(name) {
                return Ty::Const(c);
            }
            if registry.variants.contains_key(name) {
                return Ty::Named {
                    name: name.clone(),
                    args: Vec::new(),
                };
            }
            Ty::Error
        }
        TypeExpr::Var { name, .. } => params
            .get(name.as_str())
            .map(|t| (*t).clone())
            .unwrap_or(Ty::Error),
        TypeExpr::App { name, args, .. } => {
            let args: Vec<Ty> = args
                .iter()
                .map(|a| analysis_type(a, params, registry))
                .collect();
            if name == "List" || registry.variants.contains_key(name) {
                Ty::Named {
                    name: name.clone(),
                    args,
                }
            } else {
                Ty::Error
            }
        }
        TypeExpr::Tuple { items, .. } => Ty::Tuple(
            items
                .iter()
                .map(|t| analysis_type(t, params, registry))
                .collect(),
        ),
        TypeExpr::Record { fields, .. } => {
            Ty::Record(crate::ty::RecordTy::closed(
                fields
                    .iter()
                    .map(|(n, t)| (n.clone(), analysis_type(t, params, registry)))
                    .collect(),
            ))
        }
        TypeExpr::Fun { .. } => Ty::Error,
    }
}

// ── Constructor spaces ─────────────────────────────────────────────────

fn ctor_space(ty: &Ty, registry: &TypeRegistry) -> CtorSpace {
    match ty {
        Ty::Const(TyConst::Bool) => CtorSpace::Finite(vec![
            CtorSig { name: "true".into(), arity: 0 },
            CtorSig { name: "false".into(), arity: 0 },
        ]),
        Ty::Const(TyConst::Unit) => CtorSpace::Finite(vec![CtorSig {
            name: "()".into(),
            arity: 0,
        }]),
        Ty::Const(_) => CtorSpace::Infinite,
        Ty::Tuple(items) => CtorSpace::Finite(vec![CtorSig {
            name: format!("(tuple/{})", items.len()),
            arity: items.len(),
        }]),
        Ty::Record(rec) => {
            let names: Vec<String> = rec.fields.keys().cloned().collect();
            CtorSpace::Finite(vec![CtorSig {
                name: record_shape(&names),
                arity: names.len(),
            }])
        }
        Ty::Named { name, .. } if name == "List" => CtorSpace::Finite(vec![
            CtorSig { name: "[]".into(), arity: 0 },
            CtorSig { name: "(::)".into(), arity: 2 },
        ]),
        Ty::Named { name, .. } => match registry.variants.get(name) {
            Some(def) => CtorSpace::Finite(
                def.constructors
                    .iter()
                    .map(|c| CtorSig {
                        name: c.name.clone(),
                        arity: c.arity(),
                    })
                    .collect(),
            ),
            None => CtorSpace::Opaque,
        },
        _ => CtorSpace::Opaque,
    }
}

/// Sub-column types produced by specializing on a constructor.
fn sub_types(ty: &Ty, sig: &CtorSig, registry: &TypeRegistry) -> Vec<Ty> {
    match ty {
        Ty::Tuple(items) => items.clone(),
        Ty::Record(rec) => rec.fields.values().cloned().collect(),
        Ty::Named { name, .. } if name == "List" => {
            if sig.name == "(::)" {
                vec![list_elem_type(ty), ty.clone()]
            } else {
                Vec::new()
            }
        }
        Ty::Named { .. } => ctor_arg_types(ty, &sig.name, registry),
        _ => vec![Ty::Error; sig.arity],
    }
}

// ── The usefulness predicate ───────────────────────────────────────────

/// Expand or-patterns in the first column into separate rows.
fn expand_rows(matrix: &[Vec<Pat>]) -> Vec<Vec<Pat>> {
    let mut out = Vec::with_capacity(matrix.len());
    for row in matrix {
        match row.first() {
            Some(Pat::Or(alts)) => {
                for alt in alts {
                    let mut new_row = row.clone();
                    new_row[0] = alt.clone();
                    out.extend(expand_rows(&[new_row]));
                }
            }
            _ => out.push(row.clone()),
        }
    }
    out
}

/// Specialize the matrix by a head constructor: rows starting with that
/// constructor contribute their arguments; wildcard rows contribute
/// wildcards; other constructors drop out.
fn specialize(matrix: &[Vec<Pat>], sig: &CtorSig) -> Vec<Vec<Pat>> {
    let mut out = Vec::new();
    for row in expand_rows(matrix) {
        match &row[0] {
            Pat::Ctor { name, args } if name == &sig.name => {
                let mut new_row = args.clone();
                new_row.extend(row[1..].iter().cloned());
                out.push(new_row);
            }
            Pat::Ctor { .. } => {}
            Pat::Wildcard => {
                let mut new_row = vec![Pat::Wildcard; sig.arity];
                new_row.extend(row[1..].iter().cloned());
                out.push(new_row);
            }
            Pat::Or(_) => unreachable!("or-patterns expanded above"),
        }
    }
    out
}

/// The default matrix: wildcard rows lose their first column; constructor
/// rows drop out.
fn default_matrix(matrix: &[Vec<Pat>]) -> Vec<Vec<Pat>> {
    expand_rows(matrix)
        .into_iter()
        .filter_map(|row| match &row[0] {
            Pat::Wildcard => Some(row[1..].to_vec()),
            _ => None,
        })
        .collect()
}

/// Head constructors present in the first column.
fn head_ctors(matrix: &[Vec<Pat>]) -> Vec<CtorSig> {
    let mut out: Vec<CtorSig> = Vec::new();
    for row in expand_rows(matrix) {
        if let Pat::Ctor { name, args } = &row[0] {
            if !out.iter().any(|s| &s.name == name) {
                out.push(CtorSig {
                    name: name.clone(),
                    arity: args.len(),
                });
            }
        }
    }
    out
}

/// Algorithm U with witness construction: is there a value matched by `q`
/// but by no row of `matrix`? Returns a witness instantiation of `q`'s
/// columns if so.
fn useful(
    matrix: &[Vec<Pat>],
    q: &[Pat],
    tys: &[Ty],
    registry: &TypeRegistry,
) -> Option<Vec<Pat>> {
    if q.is_empty() {
        return if matrix.is_empty() {
            Some(Vec::new())
        } else {
            None
        };
    }

    match &q[0] {
        Pat::Or(alts) => {
            for alt in alts {
                let mut sub_q = vec![alt.clone()];
                sub_q.extend(q[1..].iter().cloned());
                if let Some(w) = useful(matrix, &sub_q, tys, registry) {
                    return Some(w);
                }
            }
            None
        }
        Pat::Ctor { name, args } => {
            let sig = CtorSig {
                name: name.clone(),
                arity: args.len(),
            };
            let spec = specialize(matrix, &sig);
            let mut sub_tys = sub_types(&tys[0], &sig, registry);
            if sub_tys.len() != sig.arity {
                sub_tys = vec![Ty::Error; sig.arity];
            }
            sub_tys.extend(tys[1..].iter().cloned());
            let mut sub_q = args.clone();
            sub_q.extend(q[1..].iter().cloned());
            let w = useful(&spec, &sub_q, &sub_tys, registry)?;
            Some(rebuild(&sig, w))
        }
        Pat::Wildcard => {
            let space = ctor_space(&tys[0], registry);
            let heads = head_ctors(matrix);
            if let CtorSpace::Finite(sigs) = &space {
                let complete = sigs.iter().all(|s| heads.iter().any(|h| h.name == s.name));
                if complete {
                    for sig in sigs {
                        let spec = specialize(matrix, sig);
                        let mut sub_tys = sub_types(&tys[0], sig, registry);
                        if sub_tys.len() != sig.arity {
                            sub_tys = vec![Ty::Error; sig.arity];
                        }
                        sub_tys.extend(tys[1..].iter().cloned());
                        let mut sub_q = vec![Pat::Wildcard; sig.arity];
                        sub_q.extend(q[1..].iter().cloned());
                        if let Some(w) = useful(&spec, &sub_q, &sub_tys, registry) {
                            return Some(rebuild(sig, w));
                        }
                    }
                    return None;
                }
            }
            // Incomplete signature (or infinite/opaque): recurse on the
            // default matrix and synthesize a head witness.
            let rest = useful(&default_matrix(matrix), &q[1..], &tys[1..], registry)?;
            let head = match &space {
                CtorSpace::Finite(sigs) => {
                    match sigs.iter().find(|s| !heads.iter().any(|h| h.name == s.name)) {
                        Some(missing) => Pat::Ctor {
                            name: missing.name.clone(),
                            args: vec![Pat::Wildcard; missing.arity],
                        },
                        None => Pat::Wildcard,
                    }
                }
                _ => Pat::Wildcard,
            };
            let mut witness = vec![head];
            witness.extend(rest);
            Some(witness)
        }
    }
}

/// Fold the first `sig.arity` witness columns back into a constructor
/// pattern.
fn rebuild(sig: &CtorSig, mut witness: Vec<Pat>) -> Vec<Pat> {
    let rest = witness.split_off(sig.arity);
    let mut out = vec![Pat::Ctor {
        name: sig.name.clone(),
        args: witness,
    }];
    out.extend(rest);
    out
}

// ── Witness rendering ──────────────────────────────────────────────────

/// Render a witness pattern in surface syntax for diagnostics.
fn render(pat: &Pat) -> String {
    match pat {
        Pat::Wildcard => "_".to_string(),
        Pat::Or(alts) => alts
            .iter()
            .map(render)
            .collect::<Vec<_>>()
            .join(" | "),
        Pat::Ctor { name, args } => {
            if name == "[]" {
                return "[]".to_string();
            }
            if name == "(::)" {
                return format!("{} :: {}", render(&args[0]), render(&args[1]));
            }
            if name.starts_with("(tuple/") {
                let inner: Vec<String> = args.iter().map(render).collect();
                return format!("({})", inner.join(", "));
            }
            if let Some(field_list) = name.strip_prefix('{').and_then(|n| n.strip_suffix('}')) {
                if field_list.is_empty() {
                    return "{}".to_string();
                }
                let fields: Vec<String> = field_list
                    .split(',')
                    .zip(args.iter())
                    .map(|(f, p)| format!("{}: {}", f, render(p)))
                    .collect();
                return format!("{{ {} }}", fields.join(", "));
            }
            if args.is_empty() {
                name.clone()
            } else {
                let inner: Vec<String> = args.iter().map(render).collect();
                format!("{}({})", name, inner.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibefun_ast::{TypeDecl, TypeDef, TypeExpr, VariantCase};

    fn sp() -> Span {
        Span::new(0, 0)
    }

    fn color_registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register_decl(&TypeDecl {
            name: "Color".into(),
            params: vec![],
            def: TypeDef::Variant(vec![
                VariantCase { name: "Red".into(), args: vec![], span: sp() },
                VariantCase { name: "Green".into(), args: vec![], span: sp() },
                VariantCase { name: "Blue".into(), args: vec![], span: sp() },
            ]),
            span: sp(),
        });
        registry
    }

    fn option_registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register_decl(&TypeDecl {
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
        });
        registry
    }

    fn ctor_pat(name: &str, args: Vec<Pattern>) -> Pattern {
        Pattern::Ctor {
            name: name.into(),
            args,
            span: sp(),
        }
    }

    fn wild() -> Pattern {
        Pattern::Wildcard { span: sp() }
    }

    fn arm(pattern: Pattern) -> CoreMatchArm {
        CoreMatchArm {
            pattern,
            guard: None,
            body: vibefun_core::CoreExpr::Lit {
                value: Literal::Unit,
                id: vibefun_core::NodeId(0),
                span: sp(),
            },
            span: sp(),
        }
    }

    fn guarded(pattern: Pattern) -> CoreMatchArm {
        let mut a = arm(pattern);
        a.guard = Some(vibefun_core::CoreExpr::Lit {
            value: Literal::Bool(true),
            id: vibefun_core::NodeId(1),
            span: sp(),
        });
        a
    }

    fn check(ty: &Ty, arms: &[CoreMatchArm], registry: &TypeRegistry) -> Vec<TypeError> {
        let mut errors = Vec::new();
        check_match(ty, arms, registry, sp(), &mut errors);
        errors
    }

    #[test]
    fn missing_variant_is_reported_with_witness() {
        let registry = color_registry();
        let ty = Ty::Named { name: "Color".into(), args: vec![] };
        let errors = check(
            &ty,
            &[arm(ctor_pat("Red", vec![])), arm(ctor_pat("Green", vec![]))],
            &registry,
        );
        let TypeError::NonExhaustiveMatch { witness, .. } = &errors[0] else {
            panic!("expected non-exhaustive error, got {errors:?}");
        };
        assert_eq!(witness, "Blue");
    }

    #[test]
    fn full_variant_coverage_is_exhaustive() {
        let registry = color_registry();
        let ty = Ty::Named { name: "Color".into(), args: vec![] };
        let errors = check(
            &ty,
            &[
                arm(ctor_pat("Red", vec![])),
                arm(ctor_pat("Green", vec![])),
                arm(ctor_pat("Blue", vec![])),
            ],
            &registry,
        );
        assert!(errors.is_empty(), "got: {errors:?}");
    }

    #[test]
    fn wildcard_covers_everything() {
        let registry = color_registry();
        let ty = Ty::Named { name: "Color".into(), args: vec![] };
        let errors = check(&ty, &[arm(wild())], &registry);
        assert!(errors.is_empty());
    }

    #[test]
    fn nested_constructor_witness() {
        // match o { Some(1) => …, None => … } misses Some(_).
        let registry = option_registry();
        let ty = Ty::Named { name: "Option".into(), args: vec![Ty::int()] };
        let errors = check(
            &ty,
            &[
                arm(ctor_pat(
                    "Some",
                    vec![Pattern::Lit { value: Literal::Int(1), span: sp() }],
                )),
                arm(ctor_pat("None", vec![])),
            ],
            &registry,
        );
        let TypeError::NonExhaustiveMatch { witness, .. } = &errors[0] else {
            panic!("expected non-exhaustive error");
        };
        assert_eq!(witness, "Some(_)");
    }

    #[test]
    fn bool_needs_both_arms() {
        let registry = TypeRegistry::new();
        let errors = check(
            &Ty::bool(),
            &[arm(Pattern::Lit { value: Literal::Bool(true), span: sp() })],
            &registry,
        );
        assert!(matches!(errors[0], TypeError::NonExhaustiveMatch { .. }));

        let errors = check(
            &Ty::bool(),
            &[
                arm(Pattern::Lit { value: Literal::Bool(true), span: sp() }),
                arm(Pattern::Lit { value: Literal::Bool(false), span: sp() }),
            ],
            &registry,
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn int_literals_are_never_exhaustive() {
        let registry = TypeRegistry::new();
        let errors = check(
            &Ty::int(),
            &[
                arm(Pattern::Lit { value: Literal::Int(0), span: sp() }),
                arm(Pattern::Lit { value: Literal::Int(1), span: sp() }),
            ],
            &registry,
        );
        assert!(matches!(errors[0], TypeError::NonExhaustiveMatch { .. }));
    }

    #[test]
    fn list_patterns_decompose() {
        let registry = TypeRegistry::new();
        let ty = Ty::list(Ty::int());
        // [] and h :: t together are exhaustive.
        let errors = check(
            &ty,
            &[
                arm(Pattern::List { items: vec![], rest: None, span: sp() }),
                arm(Pattern::List {
                    items: vec![wild()],
                    rest: Some(Box::new(wild())),
                    span: sp(),
                }),
            ],
            &registry,
        );
        assert!(errors.is_empty(), "got: {errors:?}");

        // [] alone is not.
        let errors = check(
            &ty,
            &[arm(Pattern::List { items: vec![], rest: None, span: sp() })],
            &registry,
        );
        let TypeError::NonExhaustiveMatch { witness, .. } = &errors[0] else {
            panic!("expected non-exhaustive error");
        };
        assert!(witness.contains("::"), "witness: {witness}");
    }

    #[test]
    fn or_patterns_expand() {
        let registry = color_registry();
        let ty = Ty::Named { name: "Color".into(), args: vec![] };
        let errors = check(
            &ty,
            &[
                arm(Pattern::Or {
                    alternatives: vec![
                        ctor_pat("Red", vec![]),
                        ctor_pat("Green", vec![]),
                        ctor_pat("Blue", vec![]),
                    ],
                    span: sp(),
                }),
            ],
            &registry,
        );
        assert!(errors.is_empty(), "got: {errors:?}");
    }

    #[test]
    fn unreachable_arm_is_warned() {
        let registry = color_registry();
        let ty = Ty::Named { name: "Color".into(), args: vec![] };
        let errors = check(
            &ty,
            &[
                arm(wild()),
                arm(ctor_pat("Red", vec![])),
            ],
            &registry,
        );
        assert!(errors
            .iter()
            .any(|e| matches!(e, TypeError::UnreachablePattern { arm_index: 1, .. })));
    }

    #[test]
    fn guarded_arm_does_not_count_for_exhaustiveness() {
        let registry = color_registry();
        let ty = Ty::Named { name: "Color".into(), args: vec![] };
        let errors = check(
            &ty,
            &[
                guarded(wild()),
                arm(ctor_pat("Red", vec![])),
            ],
            &registry,
        );
        // The guarded wildcard covers nothing for exhaustiveness, so
        // Green/Blue are missing; but the guarded arm itself is reachable.
        assert!(errors
            .iter()
            .any(|e| matches!(e, TypeError::NonExhaustiveMatch { .. })));
        assert!(!errors
            .iter()
            .any(|e| matches!(e, TypeError::UnreachablePattern { arm_index: 0, .. })));
    }

    #[test]
    fn unguarded_arm_after_guarded_same_pattern_is_reachable() {
        let registry = color_registry();
        let ty = Ty::Named { name: "Color".into(), args: vec![] };
        let errors = check(
            &ty,
            &[guarded(wild()), arm(wild())],
            &registry,
        );
        assert!(errors.is_empty(), "got: {errors:?}");
    }

    #[test]
    fn tuple_components_specialize() {
        let registry = TypeRegistry::new();
        let ty = Ty::Tuple(vec![Ty::bool(), Ty::bool()]);
        let errors = check(
            &ty,
            &[
                arm(Pattern::Tuple {
                    items: vec![
                        Pattern::Lit { value: Literal::Bool(true), span: sp() },
                        wild(),
                    ],
                    span: sp(),
                }),
                arm(Pattern::Tuple {
                    items: vec![
                        Pattern::Lit { value: Literal::Bool(false), span: sp() },
                        Pattern::Lit { value: Literal::Bool(true), span: sp() },
                    ],
                    span: sp(),
                }),
            ],
            &registry,
        );
        let TypeError::NonExhaustiveMatch { witness, .. } = &errors[0] else {
            panic!("expected non-exhaustive error");
        };
        assert_eq!(witness, "(false, false)");
    }
}
