//! Match compilation.
//!
//! A `match` compiles to a `$match` temporary, one guarded block per arm
//! (condition, `const` bindings for captured names, `return` of the arm
//! body), and a trailing exhaustion throw that is omitted when the last
//! arm matches unconditionally. Or-patterns expand into one block per
//! alternative so that each alternative binds through its own paths.

use vibefun_ast::expr::Literal;
use vibefun_ast::Pattern;
use vibefun_core::{CoreExpr, CoreMatchArm};

use crate::ident::escape;
use crate::literal::{emit_float, emit_string};
use crate::{prec, Emitter};

impl Emitter<'_> {
    /// Emit a match as function-body statements.
    pub(crate) fn emit_match_statements(
        &mut self,
        scrutinee: &CoreExpr,
        arms: &[CoreMatchArm],
        indent: usize,
    ) -> String {
        let pad = "  ".repeat(indent);
        let scrut = self.emit_expr(scrutinee, prec::ASSIGN);
        // Single evaluation of the scrutinee.
        let mut out = format!("{pad}const $match = {scrut};\n");

        let mut closed = false;
        'arms: for arm in arms {
            for alternative in expand_or(&arm.pattern) {
                let mut conds = Vec::new();
                let mut binds = Vec::new();
                compile_pattern(&alternative, "$match", &mut conds, &mut binds);

                if conds.is_empty() && arm.guard.is_none() {
                    // Unconditional arm: bindings and body emit directly;
                    // the exhaustion throw becomes redundant. A bare block
                    // keeps the bindings (and any nested `$match`) scoped.
                    if binds.is_empty() && is_plain(&arm.body) {
                        let body = self.emit_statement_body(&arm.body, indent);
                        out.push_str(&body);
                    } else {
                        out.push_str(&format!("{pad}{{\n"));
                        let inner = "  ".repeat(indent + 1);
                        for (name, path) in &binds {
                            out.push_str(&format!("{inner}const {name} = {path};\n"));
                        }
                        out.push_str(&self.emit_statement_body(&arm.body, indent + 1));
                        out.push_str(&format!("{pad}}}\n"));
                    }
                    closed = true;
                    break 'arms;
                }

                // Conditional arm (pattern condition, guard, or both).
                let inner = "  ".repeat(indent + 1);
                if conds.is_empty() {
                    // Guard-only arm: a bare block scopes the bindings.
                    out.push_str(&format!("{pad}{{\n"));
                } else {
                    out.push_str(&format!("{pad}if ({}) {{\n", conds.join(" && ")));
                }
                for (name, path) in &binds {
                    out.push_str(&format!("{inner}const {name} = {path};\n"));
                }
                match &arm.guard {
                    Some(guard) => {
                        let guard = self.emit_expr(guard, prec::OR);
                        out.push_str(&format!("{inner}if ({guard}) {{\n"));
                        out.push_str(&self.emit_statement_body(&arm.body, indent + 2));
                        out.push_str(&format!("{inner}}}\n"));
                    }
                    None => {
                        out.push_str(&self.emit_statement_body(&arm.body, indent + 1));
                    }
                }
                out.push_str(&format!("{pad}}}\n"));
            }
        }

        if !closed {
            out.push_str(&format!("{pad}throw new Error(\"Match exhausted\");\n"));
        }
        out
    }
}

/// Whether the arm body is a plain expression (neither a let-chain nor a
/// nested match), so it can emit as a bare `return`.
fn is_plain(expr: &CoreExpr) -> bool {
    !matches!(expr, CoreExpr::Let { .. } | CoreExpr::Match { .. })
}

/// Compile a pattern into JS conditions and `const` bindings over the
/// scrutinee path.
fn compile_pattern(
    pattern: &Pattern,
    path: &str,
    conds: &mut Vec<String>,
    binds: &mut Vec<(String, String)>,
) {
    match pattern {
        Pattern::Wildcard { .. } => {}
        Pattern::Var { name, .. } => binds.push((escape(name), path.to_string())),
        Pattern::Lit { value, .. } => conds.push(literal_condition(value, path)),
        Pattern::Ctor { name, args, .. } => {
            conds.push(format!("{path}.$tag === \"{name}\""));
            for (i, arg) in args.iter().enumerate() {
                compile_pattern(arg, &format!("{path}.${i}"), conds, binds);
            }
        }
        Pattern::Tuple { items, .. } => {
            conds.push(format!(
                "Array.isArray({path}) && {path}.length === {}",
                items.len()
            ));
            for (i, item) in items.iter().enumerate() {
                compile_pattern(item, &format!("{path}[{i}]"), conds, binds);
            }
        }
        Pattern::Record { fields, .. } => {
            conds.push(format!(
                "typeof {path} === \"object\" && {path} !== null"
            ));
            for field in fields {
                let field_path = format!("{path}.{}", field.name);
                match &field.pattern {
                    Some(sub) => compile_pattern(sub, &field_path, conds, binds),
                    // Shorthand `{ x }` binds the field.
                    None => binds.push((escape(&field.name), field_path)),
                }
            }
        }
        Pattern::List { items, rest, .. } => {
            let length_check = if rest.is_some() {
                format!("{path}.length >= {}", items.len())
            } else {
                format!("{path}.length === {}", items.len())
            };
            conds.push(format!("Array.isArray({path}) && {length_check}"));
            for (i, item) in items.iter().enumerate() {
                compile_pattern(item, &format!("{path}[{i}]"), conds, binds);
            }
            if let Some(rest) = rest {
                let rest_path = format!("{path}.slice({})", items.len());
                match rest.as_ref() {
                    Pattern::Var { name, .. } => binds.push((escape(name), rest_path)),
                    Pattern::Wildcard { .. } => {}
                    other => compile_pattern(other, &rest_path, conds, binds),
                }
            }
        }
        Pattern::Or { .. } => {
            unreachable!("or-patterns are expanded before compilation")
        }
        Pattern::Guard { .. } => {
            panic!("internal error: guard pattern survived desugaring")
        }
        Pattern::Annot { pattern, .. } => compile_pattern(pattern, path, conds, binds),
    }
}

/// The equality condition for a literal pattern, with the `NaN` and
/// infinity special cases.
fn literal_condition(lit: &Literal, path: &str) -> String {
    match lit {
        Literal::Int(n) => {
            if *n < 0 {
                format!("{path} === ({n})")
            } else {
                format!("{path} === {n}")
            }
        }
        Literal::Float(f) => {
            if f.is_nan() {
                format!("Number.isNaN({path})")
            } else if f.is_infinite() {
                if *f > 0.0 {
                    format!("{path} === Infinity")
                } else {
                    format!("{path} === -Infinity")
                }
            } else {
                format!("{path} === {}", emit_float(*f))
            }
        }
        Literal::String(s) => format!("{path} === {}", emit_string(s)),
        Literal::Bool(b) => format!("{path} === {b}"),
        Literal::Unit => format!("{path} === undefined"),
    }
}

/// Expand nested or-patterns into the cartesian product of their
/// alternatives: `Some(1 | 2)` gives `[Some(1), Some(2)]`.
pub(crate) fn expand_or(pattern: &Pattern) -> Vec<Pattern> {
    match pattern {
        Pattern::Or { alternatives, .. } => {
            alternatives.iter().flat_map(expand_or).collect()
        }
        Pattern::Ctor { name, args, span } => product(args)
            .into_iter()
            .map(|args| Pattern::Ctor {
                name: name.clone(),
                args,
                span: *span,
            })
            .collect(),
        Pattern::Tuple { items, span } => product(items)
            .into_iter()
            .map(|items| Pattern::Tuple { items, span: *span })
            .collect(),
        Pattern::List { items, rest, span } => {
            let rests: Vec<Option<Box<Pattern>>> = match rest {
                Some(r) => expand_or(r).into_iter().map(|p| Some(Box::new(p))).collect(),
                None => vec![None],
            };
            product(items)
                .into_iter()
                .flat_map(|items| {
                    rests.iter().map(move |rest| Pattern::List {
                        items: items.clone(),
                        rest: rest.clone(),
                        span: *span,
                    })
                })
                .collect()
        }
        Pattern::Record { fields, span } => {
            let per_field: Vec<Vec<vibefun_ast::pattern::FieldPattern>> = fields
                .iter()
                .map(|f| match &f.pattern {
                    Some(sub) => expand_or(sub)
                        .into_iter()
                        .map(|p| vibefun_ast::pattern::FieldPattern {
                            name: f.name.clone(),
                            pattern: Some(Box::new(p)),
                            span: f.span,
                        })
                        .collect(),
                    None => vec![f.clone()],
                })
                .collect();
            cartesian(&per_field)
                .into_iter()
                .map(|fields| Pattern::Record { fields, span: *span })
                .collect()
        }
        Pattern::Annot { pattern, ty, span } => expand_or(pattern)
            .into_iter()
            .map(|p| Pattern::Annot {
                pattern: Box::new(p),
                ty: ty.clone(),
                span: *span,
            })
            .collect(),
        other => vec![other.clone()],
    }
}

fn product(patterns: &[Pattern]) -> Vec<Vec<Pattern>> {
    let expanded: Vec<Vec<Pattern>> = patterns.iter().map(expand_or).collect();
    cartesian(&expanded)
}

fn cartesian<T: Clone>(parts: &[Vec<T>]) -> Vec<Vec<T>> {
    let mut out: Vec<Vec<T>> = vec![Vec::new()];
    for part in parts {
        let mut next = Vec::with_capacity(out.len() * part.len());
        for prefix in &out {
            for item in part {
                let mut row = prefix.clone();
                row.push(item.clone());
                next.push(row);
            }
        }
        out = next;
    }
    out
}
