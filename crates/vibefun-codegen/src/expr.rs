//! Expression emission.
//!
//! Every function takes the context precedence and parenthesizes its
//! output exactly when the produced construct binds looser. Statement-
//! shaped expressions (matches, let-chains) become arrow-function bodies
//! when they sit directly under a lambda, and IIFEs anywhere else.

use vibefun_core::{CoreBinOp, CoreExpr, CoreUnOp};
use vibefun_typeck::{BindingKind, Ty};

use crate::ident::escape;
use crate::literal::emit_literal;
use crate::{maybe_paren, prec, Emitter};

impl Emitter<'_> {
    pub(crate) fn emit_expr(&mut self, expr: &CoreExpr, ctx: u8) -> String {
        match expr {
            CoreExpr::Lit { value, .. } => emit_literal(value),

            CoreExpr::Var { name, id, .. } => match self.resolution(*id) {
                Some(BindingKind::External { js_name, .. }) => {
                    // External names emit verbatim, dots included.
                    js_name.clone()
                }
                Some(BindingKind::Builtin) => {
                    self.needs_ref = true;
                    "ref".to_string()
                }
                _ => escape(name),
            },

            CoreExpr::Lambda { param, body, .. } => {
                let text = self.emit_lambda(param, body);
                maybe_paren(text, prec::ASSIGN, ctx)
            }

            CoreExpr::Apply { .. } => self.emit_apply(expr, ctx),

            CoreExpr::Let { .. } | CoreExpr::Match { .. } => {
                // Statement-shaped in expression position: wrap in an
                // immediately-invoked arrow.
                let body = self.emit_statement_body(expr, 1);
                maybe_paren(format!("(() => {{\n{body}}})()"), prec::CALL, ctx)
            }

            CoreExpr::If {
                cond, then, els, ..
            } => {
                // Always parenthesized, so the inner parts are free.
                let cond = self.emit_expr(cond, prec::OR);
                let then = self.emit_expr(then, prec::ASSIGN);
                let els = self.emit_expr(els, prec::ASSIGN);
                format!("({cond} ? {then} : {els})")
            }

            CoreExpr::Record { spread, fields, .. } => {
                let mut parts = Vec::new();
                if let Some(base) = spread {
                    let base = self.emit_expr(base, prec::ASSIGN);
                    parts.push(format!("...{base}"));
                }
                for (name, value) in fields {
                    parts.push(self.emit_field(name, value));
                }
                if parts.is_empty() {
                    "{}".to_string()
                } else {
                    format!("{{ {} }}", parts.join(", "))
                }
            }

            CoreExpr::FieldAccess { expr, field, .. } => {
                let base = self.emit_expr(expr, prec::MEMBER);
                maybe_paren(format!("{base}.{field}"), prec::MEMBER, ctx)
            }

            CoreExpr::Tuple { items, .. } => {
                let items: Vec<String> = items
                    .iter()
                    .map(|e| self.emit_expr(e, prec::ASSIGN))
                    .collect();
                format!("[{}]", items.join(", "))
            }

            CoreExpr::List { items, tail, .. } => {
                let mut parts: Vec<String> = items
                    .iter()
                    .map(|e| self.emit_expr(e, prec::ASSIGN))
                    .collect();
                if let Some(tail) = tail {
                    let tail = self.emit_expr(tail, prec::ASSIGN);
                    parts.push(format!("...{tail}"));
                }
                format!("[{}]", parts.join(", "))
            }

            CoreExpr::Unary { op, expr, .. } => match op {
                CoreUnOp::Neg => {
                    let inner = self.emit_expr(expr, prec::UNARY);
                    maybe_paren(format!("-{inner}"), prec::UNARY, ctx)
                }
                CoreUnOp::Not => {
                    let inner = self.emit_expr(expr, prec::UNARY);
                    maybe_paren(format!("!{inner}"), prec::UNARY, ctx)
                }
                CoreUnOp::Deref => {
                    let inner = self.emit_expr(expr, prec::MEMBER);
                    maybe_paren(format!("{inner}.$value"), prec::MEMBER, ctx)
                }
            },

            CoreExpr::Binary {
                op, lhs, rhs, ..
            } => self.emit_binary(*op, lhs, rhs, ctx),

            // Annotations are checked, then transparent.
            CoreExpr::Annot { expr, .. } => self.emit_expr(expr, ctx),
        }
    }

    fn emit_lambda(&mut self, param: &str, body: &CoreExpr) -> String {
        let param = escape(param);
        match body {
            // A match or let-chain directly under a lambda becomes the
            // arrow's block body.
            CoreExpr::Match { .. } | CoreExpr::Let { .. } => {
                let stmts = self.emit_statement_body(body, 1);
                format!("({param}) => {{\n{stmts}}}")
            }
            _ => {
                let text = self.emit_expr(body, prec::ASSIGN);
                // An object literal as a concise arrow body needs parens.
                if text.starts_with('{') {
                    format!("({param}) => ({text})")
                } else {
                    format!("({param}) => {text}")
                }
            }
        }
    }

    fn emit_apply(&mut self, expr: &CoreExpr, ctx: u8) -> String {
        let (head, args) = expr
            .application_head()
            .expect("emit_apply is only called on applications");

        if let CoreExpr::Var { name, id, .. } = head {
            match self.resolution(*id).cloned() {
                Some(BindingKind::Constructor { arity, .. }) if arity > 0 && args.len() >= arity => {
                    // Saturated constructor applications inline the variant
                    // object; any further applications chain onto the
                    // parenthesized literal.
                    let literal = self.emit_variant_literal(name, &args[..arity]);
                    if args.len() == arity {
                        return literal;
                    }
                    let mut out = format!("({literal})");
                    for arg in &args[arity..] {
                        let arg = self.emit_expr(arg, prec::ASSIGN);
                        out = format!("{out}({arg})");
                    }
                    return maybe_paren(out, prec::CALL, ctx);
                }
                Some(BindingKind::Builtin) if args.len() == 1 => {
                    self.needs_ref = true;
                    let arg = self.emit_expr(args[0], prec::ASSIGN);
                    return maybe_paren(format!("ref({arg})"), prec::CALL, ctx);
                }
                _ => {}
            }
        }

        let mut out = self.emit_expr(head, prec::CALL);
        for arg in args {
            let arg = self.emit_expr(arg, prec::ASSIGN);
            out = format!("{out}({arg})");
        }
        maybe_paren(out, prec::CALL, ctx)
    }

    /// A saturated constructor application as a variant object literal:
    /// `{ $tag: "C", $0: a, $1: b }`.
    fn emit_variant_literal(&mut self, name: &str, args: &[&CoreExpr]) -> String {
        let mut parts = vec![format!("$tag: \"{name}\"")];
        for (i, arg) in args.iter().enumerate() {
            let value = self.emit_expr(arg, prec::ASSIGN);
            parts.push(format!("${i}: {value}"));
        }
        format!("{{ {} }}", parts.join(", "))
    }

    fn emit_field(&mut self, name: &str, value: &CoreExpr) -> String {
        // Field-name shorthand when the value is a same-named plain
        // variable (and escaping leaves both untouched).
        if let CoreExpr::Var { name: var_name, id, .. } = value {
            let plain = !matches!(
                self.resolution(*id),
                Some(BindingKind::External { .. }) | Some(BindingKind::Builtin)
            );
            if plain && var_name == name && escape(name) == name {
                return name.to_string();
            }
        }
        let value = self.emit_expr(value, prec::ASSIGN);
        format!("{name}: {value}")
    }

    fn emit_binary(&mut self, op: CoreBinOp, lhs: &CoreExpr, rhs: &CoreExpr, ctx: u8) -> String {
        match op {
            CoreBinOp::Divide => {
                panic!("internal error: unspecialized Divide reached the code generator")
            }
            CoreBinOp::IntDivide => {
                // A non-zero integer-literal divisor cannot throw, so the
                // plain truncation form is safe; anything else guards
                // against division by zero at runtime.
                let safe = matches!(
                    rhs,
                    CoreExpr::Lit {
                        value: vibefun_ast::expr::Literal::Int(n),
                        ..
                    } if *n != 0
                );
                if safe {
                    let l = self.emit_expr(lhs, prec::MULTIPLICATIVE);
                    let r = self.emit_expr(rhs, prec::MULTIPLICATIVE + 1);
                    maybe_paren(format!("Math.trunc({l} / {r})"), prec::CALL, ctx)
                } else {
                    self.needs_idiv = true;
                    let l = self.emit_expr(lhs, prec::ASSIGN);
                    let r = self.emit_expr(rhs, prec::ASSIGN);
                    maybe_paren(format!("$idiv({l}, {r})"), prec::CALL, ctx)
                }
            }
            CoreBinOp::RefAssign => {
                let cell = self.emit_expr(lhs, prec::MEMBER);
                let value = self.emit_expr(rhs, prec::ASSIGN);
                // Assignment evaluates to the written value; Vibefun's
                // `:=` returns Unit, hence the sequence.
                format!("({cell}.$value = {value}, undefined)")
            }
            CoreBinOp::Eq | CoreBinOp::Neq => self.emit_equality(op, lhs, rhs, ctx),
            _ => {
                let (text, level) = binop_js(op);
                let l = self.emit_expr(lhs, level);
                let r = self.emit_expr(rhs, level + 1);
                maybe_paren(format!("{l} {text} {r}"), level, ctx)
            }
        }
    }

    /// Primitives compare with `===`/`!==`; composite values go through
    /// the structural `$eq` helper.
    fn emit_equality(&mut self, op: CoreBinOp, lhs: &CoreExpr, rhs: &CoreExpr, ctx: u8) -> String {
        let primitive = matches!(self.ty_of(lhs.id()), Some(Ty::Const(_)));
        if primitive {
            let text = if op == CoreBinOp::Eq { "===" } else { "!==" };
            let l = self.emit_expr(lhs, prec::EQUALITY);
            let r = self.emit_expr(rhs, prec::EQUALITY + 1);
            maybe_paren(format!("{l} {text} {r}"), prec::EQUALITY, ctx)
        } else {
            self.needs_eq = true;
            let l = self.emit_expr(lhs, prec::ASSIGN);
            let r = self.emit_expr(rhs, prec::ASSIGN);
            if op == CoreBinOp::Eq {
                maybe_paren(format!("$eq({l}, {r})"), prec::CALL, ctx)
            } else {
                maybe_paren(format!("!$eq({l}, {r})"), prec::UNARY, ctx)
            }
        }
    }

    /// Emit a statement-shaped expression (let-chains ending in a value,
    /// or a match) as function-body statements ending in `return`.
    pub(crate) fn emit_statement_body(&mut self, expr: &CoreExpr, indent: usize) -> String {
        let pad = "  ".repeat(indent);
        match expr {
            CoreExpr::Let {
                pattern,
                value,
                body,
                ..
            } => {
                let line = self.emit_let_statement(pattern, value, &pad);
                let rest = self.emit_statement_body(body, indent);
                format!("{line}{rest}")
            }
            CoreExpr::Match {
                scrutinee, arms, ..
            } => self.emit_match_statements(scrutinee, arms, indent),
            _ => {
                let value = self.emit_expr(expr, prec::ASSIGN);
                format!("{pad}return {value};\n")
            }
        }
    }
}

fn binop_js(op: CoreBinOp) -> (&'static str, u8) {
    match op {
        CoreBinOp::Add | CoreBinOp::Concat => ("+", prec::ADDITIVE),
        CoreBinOp::Sub => ("-", prec::ADDITIVE),
        CoreBinOp::Mul => ("*", prec::MULTIPLICATIVE),
        CoreBinOp::FloatDivide => ("/", prec::MULTIPLICATIVE),
        CoreBinOp::Lt => ("<", prec::RELATIONAL),
        CoreBinOp::Le => ("<=", prec::RELATIONAL),
        CoreBinOp::Gt => (">", prec::RELATIONAL),
        CoreBinOp::Ge => (">=", prec::RELATIONAL),
        CoreBinOp::And => ("&&", prec::AND),
        CoreBinOp::Or => ("||", prec::OR),
        CoreBinOp::Divide
        | CoreBinOp::IntDivide
        | CoreBinOp::Eq
        | CoreBinOp::Neq
        | CoreBinOp::RefAssign => unreachable!("handled by emit_binary"),
    }
}
