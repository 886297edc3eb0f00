//! Declaration emission.
//!
//! - `let` with a variable pattern: `const x = v;` (a saturated `ref`
//!   call inlines its cell literal);
//! - destructuring lets use JS destructuring (tuples to arrays, records
//!   to objects, wildcards to fresh `_unusedN` names);
//! - `let rec` singles: `let name; name = v;`;
//! - `let rec … and …` groups: two-phase (`let n1, n2;` then assignments
//!   in source order) so bindings may forward-reference;
//! - variant type declarations: one const per constructor (frozen literal
//!   for 0-ary, curried arrows otherwise);
//! - externals: a `const vfName = jsName;` aliasing binding when the
//!   names differ (the import contribution is handled with the imports).

use vibefun_ast::{Pattern, TypeDef};
use vibefun_core::{CoreDecl, CoreExpr};

use crate::ident::escape;
use crate::{prec, Emitter};

impl Emitter<'_> {
    pub(crate) fn emit_decls(&mut self) -> String {
        let module = self.module;
        let mut out = String::new();
        for decl in &module.decls {
            match decl {
                CoreDecl::Let {
                    pattern,
                    value,
                    recursive,
                    exported,
                    ..
                } => {
                    if *exported {
                        for name in pattern.bound_names() {
                            self.exports.insert(escape(&name));
                        }
                    }
                    if *recursive {
                        if let Pattern::Var { name, .. } = pattern {
                            // Pre-declared so the value may refer to it.
                            let name = escape(name);
                            let value = self.emit_expr(value, prec::ASSIGN);
                            out.push_str(&format!("let {name};\n{name} = {value};\n"));
                            continue;
                        }
                    }
                    out.push_str(&self.emit_let_statement(pattern, value, ""));
                }

                CoreDecl::LetRecGroup { bindings, .. } => {
                    let names: Vec<String> =
                        bindings.iter().map(|b| escape(&b.name)).collect();
                    for binding in bindings {
                        if binding.exported {
                            self.exports.insert(escape(&binding.name));
                        }
                    }
                    out.push_str(&format!("let {};\n", names.join(", ")));
                    for (binding, name) in bindings.iter().zip(&names) {
                        let value = self.emit_expr(&binding.value, prec::ASSIGN);
                        out.push_str(&format!("{name} = {value};\n"));
                    }
                }

                CoreDecl::Type(t) => {
                    if let TypeDef::Variant(cases) = &t.def {
                        for case in cases {
                            out.push_str(&emit_constructor(&case.name, case.args.len()));
                            // Constructors are importable values, so they
                            // always appear in the export list.
                            self.exports.insert(escape(&case.name));
                        }
                    }
                }

                CoreDecl::External {
                    name,
                    js_name,
                    exported,
                    ..
                } => {
                    let local = escape(name);
                    // When the local name already is the JS name, the
                    // import (or global) covers it.
                    if local != *js_name {
                        out.push_str(&format!("const {local} = {js_name};\n"));
                    }
                    if *exported {
                        self.exports.insert(local);
                    }
                }

                CoreDecl::ExternalType { .. } => {}
            }
        }
        out
    }

    /// One `const <pattern> = <value>;` statement, used for both
    /// top-level and block-level lets. `pad` is the indentation prefix.
    pub(crate) fn emit_let_statement(
        &mut self,
        pattern: &Pattern,
        value: &CoreExpr,
        pad: &str,
    ) -> String {
        let value_text = match self.as_ref_cell(value) {
            Some(arg) => {
                // `let mut x = ref(v)` inlines the cell literal and still
                // marks the helper for any other ref use.
                self.needs_ref = true;
                let arg = self.emit_expr(arg, prec::ASSIGN);
                format!("{{ $value: {arg} }}")
            }
            None => self.emit_expr(value, prec::ASSIGN),
        };
        let target = self.destructure(pattern);
        format!("{pad}const {target} = {value_text};\n")
    }

    /// A JS destructuring target for an irrefutable pattern.
    ///
    /// # Panics
    ///
    /// Panics on refutable patterns (literals, constructors, or-patterns):
    /// the surface grammar only allows irrefutable patterns in lets.
    fn destructure(&mut self, pattern: &Pattern) -> String {
        match pattern {
            Pattern::Var { name, .. } => escape(name),
            Pattern::Wildcard { .. } => self.fresh_unused(),
            Pattern::Tuple { items, .. } => {
                let parts: Vec<String> =
                    items.iter().map(|p| self.destructure(p)).collect();
                format!("[{}]", parts.join(", "))
            }
            Pattern::List { items, rest, .. } => {
                let mut parts: Vec<String> =
                    items.iter().map(|p| self.destructure(p)).collect();
                if let Some(rest) = rest {
                    parts.push(format!("...{}", self.destructure(rest)));
                }
                format!("[{}]", parts.join(", "))
            }
            Pattern::Record { fields, .. } => {
                let parts: Vec<String> = fields
                    .iter()
                    .map(|f| {
                        let target = match &f.pattern {
                            Some(sub) => self.destructure(sub),
                            None => escape(&f.name),
                        };
                        if target == f.name {
                            target
                        } else {
                            format!("{}: {}", f.name, target)
                        }
                    })
                    .collect();
                format!("{{ {} }}", parts.join(", "))
            }
            Pattern::Annot { pattern, .. } => self.destructure(pattern),
            Pattern::Lit { .. }
            | Pattern::Ctor { .. }
            | Pattern::Or { .. }
            | Pattern::Guard { .. } => {
                panic!("internal error: refutable pattern in a let binding")
            }
        }
    }
}

/// The constructor const for one variant case: a frozen literal for 0-ary
/// constructors, a curried arrow chain otherwise.
fn emit_constructor(name: &str, arity: usize) -> String {
    let escaped = escape(name);
    if arity == 0 {
        return format!(
            "const {escaped} = Object.freeze({{ $tag: \"{name}\" }});\n"
        );
    }
    let params: Vec<String> = (0..arity).map(|i| format!("(${i}) => ")).collect();
    let fields: Vec<String> = (0..arity).map(|i| format!("${i}")).collect();
    format!(
        "const {escaped} = {}({{ $tag: \"{name}\", {} }});\n",
        params.join(""),
        fields.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nullary_constructor_is_frozen() {
        assert_eq!(
            emit_constructor("None", 0),
            "const None = Object.freeze({ $tag: \"None\" });\n"
        );
    }

    #[test]
    fn unary_constructor_is_an_arrow() {
        assert_eq!(
            emit_constructor("Some", 1),
            "const Some = ($0) => ({ $tag: \"Some\", $0 });\n"
        );
    }

    #[test]
    fn binary_constructor_curries() {
        assert_eq!(
            emit_constructor("Pair", 2),
            "const Pair = ($0) => ($1) => ({ $tag: \"Pair\", $0, $1 });\n"
        );
    }
}
