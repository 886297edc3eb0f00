//! ES2020 code generation for the Vibefun compiler.
//!
//! Emits one readable ES module per compilation unit from the typed Core
//! IR. Output structure, in order: a header comment, value imports
//! (type-only items dropped), re-exports, conditional runtime helpers,
//! declarations, and a single trailing `export { … }` with the exported
//! names in lexicographic order.
//!
//! The mapping from Core nodes to ES constructs is fixed so tests can
//! assert code shape; see the per-module emitters:
//!
//! - [`expr`]: expression emission with precedence tracking
//! - [`pattern`]: match lowering to condition/binding blocks
//! - [`decl`]: declarations, constructors, two-phase `let rec`
//! - [`imports`]: import collection, `.js` suffixing, deduplication
//! - [`ident`] / [`literal`]: escaping and literal formatting

pub mod decl;
pub mod expr;
pub mod ident;
pub mod imports;
pub mod literal;
pub mod pattern;

use std::collections::BTreeSet;

use vibefun_core::{CoreExpr, CoreModule, NodeId};
use vibefun_typeck::{BindingKind, Ty, TypeckResult};

/// JS operator precedence levels used by the emitter. A subexpression is
/// parenthesized exactly when its emission precedence is lower than its
/// context's.
pub(crate) mod prec {
    pub const ASSIGN: u8 = 2;
    pub const OR: u8 = 4;
    pub const AND: u8 = 5;
    pub const EQUALITY: u8 = 9;
    pub const RELATIONAL: u8 = 10;
    pub const ADDITIVE: u8 = 12;
    pub const MULTIPLICATIVE: u8 = 13;
    pub const UNARY: u8 = 15;
    pub const CALL: u8 = 17;
    pub const MEMBER: u8 = 18;
    pub const ATOM: u8 = 20;
}

/// Parenthesize `text` when the node's precedence is below the context's.
pub(crate) fn maybe_paren(text: String, node: u8, ctx: u8) -> String {
    if node < ctx {
        format!("({text})")
    } else {
        text
    }
}

/// Emit a complete ES module for one compilation unit.
pub fn emit_module(module: &CoreModule, typeck: &TypeckResult) -> String {
    let mut emitter = Emitter::new(module, typeck);
    // Declarations first: they decide which helpers are needed and which
    // names are exported.
    let decls = emitter.emit_decls();
    let imports = emitter.emit_imports();
    let helpers = emitter.emit_helpers();

    let mut out = String::new();
    out.push_str(&format!(
        "// Generated by the Vibefun compiler from {}\n",
        module.path.file_name()
    ));
    if !imports.is_empty() {
        out.push_str(&imports);
    }
    if !helpers.is_empty() {
        out.push('\n');
        out.push_str(&helpers);
    }
    if !decls.is_empty() {
        out.push('\n');
        out.push_str(&decls);
    }
    out.push('\n');
    out.push_str(&emitter.export_statement());
    out.push('\n');
    out
}

/// The per-module emission context shared by the expression, pattern, and
/// declaration emitters.
pub struct Emitter<'a> {
    pub(crate) module: &'a CoreModule,
    pub(crate) typeck: &'a TypeckResult,
    pub(crate) needs_ref: bool,
    pub(crate) needs_eq: bool,
    pub(crate) needs_idiv: bool,
    pub(crate) next_unused: u32,
    pub(crate) exports: BTreeSet<String>,
}

impl<'a> Emitter<'a> {
    pub fn new(module: &'a CoreModule, typeck: &'a TypeckResult) -> Self {
        Emitter {
            module,
            typeck,
            needs_ref: false,
            needs_eq: false,
            needs_idiv: false,
            next_unused: 0,
            exports: BTreeSet::new(),
        }
    }

    pub(crate) fn resolution(&self, id: NodeId) -> Option<&BindingKind> {
        self.typeck.resolutions.get(&id)
    }

    pub(crate) fn ty_of(&self, id: NodeId) -> Option<&Ty> {
        self.typeck.types.get(&id)
    }

    /// A fresh `_unusedN` name for wildcard destructurings.
    pub(crate) fn fresh_unused(&mut self) -> String {
        let name = format!("_unused{}", self.next_unused);
        self.next_unused += 1;
        name
    }

    /// Whether an expression is a saturated application of the built-in
    /// `ref` constructor, returning the argument.
    pub(crate) fn as_ref_cell<'e>(&self, expr: &'e CoreExpr) -> Option<&'e CoreExpr> {
        let (head, args) = expr.application_head()?;
        let CoreExpr::Var { id, .. } = head else {
            return None;
        };
        if matches!(self.resolution(*id), Some(BindingKind::Builtin)) && args.len() == 1 {
            Some(args[0])
        } else {
            None
        }
    }

    /// The conditional runtime helpers, emitted once per module.
    pub(crate) fn emit_helpers(&self) -> String {
        let mut out = String::new();
        if self.needs_ref {
            out.push_str("const ref = ($value) => ({ $value });\n");
        }
        if self.needs_idiv {
            out.push_str(
                "const $idiv = (a, b) => {\n  if (b === 0) throw new Error(\"Division by zero\");\n  return Math.trunc(a / b);\n};\n",
            );
        }
        if self.needs_eq {
            out.push_str(concat!(
                "const $eq = (a, b) => {\n",
                "  if (a === b) return true;\n",
                "  if (typeof a !== \"object\" || typeof b !== \"object\" || a === null || b === null) return false;\n",
                "  if (\"$value\" in a || \"$value\" in b) return a === b;\n",
                "  if (Array.isArray(a) || Array.isArray(b)) {\n",
                "    if (!Array.isArray(a) || !Array.isArray(b) || a.length !== b.length) return false;\n",
                "    return a.every((x, i) => $eq(x, b[i]));\n",
                "  }\n",
                "  if (a.$tag !== b.$tag) return false;\n",
                "  const ka = Object.keys(a);\n",
                "  if (ka.length !== Object.keys(b).length) return false;\n",
                "  return ka.every((k) => k in b && $eq(a[k], b[k]));\n",
                "};\n",
            ));
        }
        out
    }

    /// The trailing export statement; `export {};` keeps an export-less
    /// file a valid ES module.
    pub(crate) fn export_statement(&self) -> String {
        if self.exports.is_empty() {
            "export {};".to_string()
        } else {
            let names: Vec<&str> = self.exports.iter().map(String::as_str).collect();
            format!("export {{ {} }};", names.join(", "))
        }
    }
}
