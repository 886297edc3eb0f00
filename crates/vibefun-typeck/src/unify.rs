//! Unification engine for Hindley-Milner type inference.
//!
//! Implements the core unification algorithm using `ena`'s union-find
//! table. Supports the occurs check, level-based generalization with level
//! lowering on bind, structural records with row variables (width
//! subtyping), and scheme instantiation.
//!
//! Row variables live in the same table as ordinary type variables: an
//! open record's row is a `TyVar`, and unifying records binds it to a
//! record of the remaining fields.

use std::collections::BTreeMap;

use ena::unify::InPlaceUnificationTable;
use rustc_hash::FxHashMap;
use vibefun_common::Span;

use crate::error::TypeError;
use crate::ty::{RecordTy, Scheme, Ty, TyVar};

/// The inference context: owns the unification table, level state, and the
/// error list.
pub struct InferCtx {
    table: InPlaceUnificationTable<TyVar>,
    /// Current let-nesting level for generalization.
    current_level: u32,
    /// Creation level of each variable, indexed by `TyVar.0`. The entry of
    /// a class's root is authoritative.
    var_levels: Vec<u32>,
    /// Errors and warnings accumulated during inference.
    pub errors: Vec<TypeError>,
}

impl InferCtx {
    pub fn new() -> Self {
        InferCtx {
            table: InPlaceUnificationTable::new(),
            current_level: 0,
            var_levels: Vec::new(),
            errors: Vec::new(),
        }
    }

    // ── Variables and levels ────────────────────────────────────────────

    /// Create a fresh type variable at the current level.
    pub fn fresh_var(&mut self) -> TyVar {
        let var = self.table.new_key(None);
        while self.var_levels.len() <= var.0 as usize {
            self.var_levels.push(0);
        }
        self.var_levels[var.0 as usize] = self.current_level;
        var
    }

    pub fn fresh_ty(&mut self) -> Ty {
        Ty::Var(self.fresh_var())
    }

    fn level_of(&mut self, var: TyVar) -> u32 {
        let root = self.table.find(var);
        self.var_levels.get(root.0 as usize).copied().unwrap_or(0)
    }

    fn set_level(&mut self, var: TyVar, level: u32) {
        let root = self.table.find(var);
        self.var_levels[root.0 as usize] = level;
    }

    /// Enter the right-hand side of a `let` (one level deeper).
    pub fn enter_level(&mut self) {
        self.current_level += 1;
    }

    pub fn leave_level(&mut self) {
        debug_assert!(self.current_level > 0, "cannot leave level 0");
        self.current_level -= 1;
    }

    // ── Resolution ──────────────────────────────────────────────────────

    /// Resolve a type through the union-find table, flattening record rows
    /// along the way so that an open record whose row got bound shows its
    /// full field set.
    pub fn resolve(&mut self, ty: Ty) -> Ty {
        match ty {
            Ty::Var(v) => match self.table.probe_value(v) {
                Some(inner) => self.resolve(inner),
                // Normalize to the root key: two unified-but-unbound vars
                // must resolve to the same representative or
                // generalization would treat them as distinct.
                None => Ty::Var(self.table.find(v)),
            },
            Ty::Fun(param, ret) => {
                let param = Box::new(self.resolve(*param));
                let ret = Box::new(self.resolve(*ret));
                Ty::Fun(param, ret)
            }
            Ty::Tuple(items) => {
                Ty::Tuple(items.into_iter().map(|t| self.resolve(t)).collect())
            }
            Ty::Record(rec) => Ty::Record(self.resolve_record(rec)),
            Ty::Named { name, args } => Ty::Named {
                name,
                args: args.into_iter().map(|t| self.resolve(t)).collect(),
            },
            Ty::Ref(inner) => Ty::Ref(Box::new(self.resolve(*inner))),
            other => other,
        }
    }

    /// Resolve a record type, merging in the fields of any bound row.
    fn resolve_record(&mut self, rec: RecordTy) -> RecordTy {
        let mut fields: BTreeMap<String, Ty> = rec
            .fields
            .into_iter()
            .map(|(name, ty)| {
                let ty = self.resolve(ty);
                (name, ty)
            })
            .collect();
        let mut row = rec.row;
        while let Some(v) = row {
            match self.table.probe_value(v) {
                Some(Ty::Record(rest)) => {
                    let rest = self.resolve_record(rest);
                    for (name, ty) in rest.fields {
                        fields.entry(name).or_insert(ty);
                    }
                    row = rest.row;
                }
                // A row bound to the error type closes the record so
                // downstream checks stay quiet.
                Some(_) => {
                    row = None;
                }
                None => {
                    row = Some(self.table.find(v));
                    break;
                }
            }
        }
        RecordTy { fields, row }
    }

    // ── Occurs check ────────────────────────────────────────────────────

    /// Whether `var` occurs anywhere within `ty` (following bindings).
    pub fn occurs_in(&mut self, var: TyVar, ty: &Ty) -> bool {
        let root = self.table.find(var);
        self.occurs_root(root, ty)
    }

    fn occurs_root(&mut self, root: TyVar, ty: &Ty) -> bool {
        match ty {
            Ty::Var(v) => {
                if self.table.find(*v) == root {
                    return true;
                }
                match self.table.probe_value(*v) {
                    Some(inner) => self.occurs_root(root, &inner),
                    None => false,
                }
            }
            Ty::Const(_) | Ty::Error => false,
            Ty::Fun(param, ret) => {
                self.occurs_root(root, param) || self.occurs_root(root, ret)
            }
            Ty::Tuple(items) => items.iter().any(|t| self.occurs_root(root, t)),
            Ty::Record(rec) => {
                if let Some(row) = rec.row {
                    if self.table.find(row) == root {
                        return true;
                    }
                    if let Some(inner) = self.table.probe_value(row) {
                        if self.occurs_root(root, &inner) {
                            return true;
                        }
                    }
                }
                rec.fields.values().any(|t| self.occurs_root(root, t))
            }
            Ty::Named { args, .. } => args.iter().any(|t| self.occurs_root(root, t)),
            Ty::Ref(inner) => self.occurs_root(root, inner),
        }
    }

    // ── Binding ─────────────────────────────────────────────────────────

    /// Bind an unbound variable to a type: occurs check, then lower the
    /// level of every unbound variable in the type to the binder's level
    /// (sound generalization), then write the binding.
    fn bind(&mut self, var: TyVar, ty: Ty, span: Span) -> Result<(), TypeError> {
        if self.occurs_in(var, &ty) {
            let resolved = self.resolve(ty);
            let err = TypeError::Occurs { ty: resolved, span };
            self.errors.push(err.clone());
            return Err(err);
        }
        let level = self.level_of(var);
        self.lower_levels(&ty, level);
        self.table
            .unify_var_value(var, Some(ty))
            .expect("binding an unbound var after occurs check cannot fail");
        Ok(())
    }

    /// Lower every unbound variable in `ty` to at most `level`.
    fn lower_levels(&mut self, ty: &Ty, level: u32) {
        match ty {
            Ty::Var(v) => match self.table.probe_value(*v) {
                Some(inner) => self.lower_levels(&inner, level),
                None => {
                    let current = self.level_of(*v);
                    if current > level {
                        self.set_level(*v, level);
                    }
                }
            },
            Ty::Const(_) | Ty::Error => {}
            Ty::Fun(param, ret) => {
                self.lower_levels(param, level);
                self.lower_levels(ret, level);
            }
            Ty::Tuple(items) => {
                for t in items {
                    self.lower_levels(t, level);
                }
            }
            Ty::Record(rec) => {
                for t in rec.fields.values() {
                    self.lower_levels(t, level);
                }
                if let Some(row) = rec.row {
                    self.lower_levels(&Ty::Var(row), level);
                }
            }
            Ty::Named { args, .. } => {
                for t in args {
                    self.lower_levels(t, level);
                }
            }
            Ty::Ref(inner) => self.lower_levels(inner, level),
        }
    }

    /// Clamp every unbound variable in `ty` to the current level.
    ///
    /// Called when a monomorphic (value-restricted) binding escapes its
    /// `let`: its variables now belong to the outer scope and must not be
    /// generalized by an enclosing binding later.
    pub fn demote_to_current_level(&mut self, ty: &Ty) {
        let level = self.current_level;
        self.lower_levels(ty, level);
    }

    // ── Unification ─────────────────────────────────────────────────────

    /// Unify two types, recording an error (and returning it) on failure.
    ///
    /// By convention the first argument is the expected type and the
    /// second the found one; mismatch diagnostics label them that way.
    pub fn unify(&mut self, a: Ty, b: Ty, span: Span) -> Result<(), TypeError> {
        let a = self.resolve(a);
        let b = self.resolve(b);

        match (a, b) {
            (Ty::Var(v1), Ty::Var(v2)) if v1 == v2 => Ok(()),

            (Ty::Var(v1), Ty::Var(v2)) => {
                // Union two unbound classes; the merged class keeps the
                // lower of the two levels.
                let level = self.level_of(v1).min(self.level_of(v2));
                self.table
                    .unify_var_var(v1, v2)
                    .expect("unifying two unbound vars cannot fail");
                self.set_level(v1, level);
                Ok(())
            }

            (Ty::Var(v), ty) | (ty, Ty::Var(v)) => self.bind(v, ty, span),

            (Ty::Error, _) | (_, Ty::Error) => Ok(()),

            (Ty::Const(c1), Ty::Const(c2)) if c1 == c2 => Ok(()),

            (Ty::Fun(p1, r1), Ty::Fun(p2, r2)) => {
                self.unify(*p1, *p2, span)?;
                self.unify(*r1, *r2, span)
            }

            (Ty::Tuple(e1), Ty::Tuple(e2)) if e1.len() == e2.len() => {
                for (a, b) in e1.into_iter().zip(e2) {
                    self.unify(a, b, span)?;
                }
                Ok(())
            }

            (Ty::Named { name: n1, args: a1 }, Ty::Named { name: n2, args: a2 })
                if n1 == n2 && a1.len() == a2.len() =>
            {
                // Nominal: same name, same arity; parameters are invariant.
                for (a, b) in a1.into_iter().zip(a2) {
                    self.unify(a, b, span)?;
                }
                Ok(())
            }

            (Ty::Ref(i1), Ty::Ref(i2)) => self.unify(*i1, *i2, span),

            (Ty::Record(r1), Ty::Record(r2)) => self.unify_records(r1, r2, span),

            (a, b) => {
                let err = TypeError::Mismatch {
                    expected: a,
                    found: b,
                    span,
                };
                self.errors.push(err.clone());
                Err(err)
            }
        }
    }

    /// Record unification with width subtyping through row variables.
    ///
    /// - closed vs closed: field sets must match exactly;
    /// - open vs closed: the closed side must have at least the open
    ///   side's fields; the row binds to the extras;
    /// - open vs open: common fields unify; each row binds to the other
    ///   side's extras plus a shared fresh row.
    fn unify_records(
        &mut self,
        r1: RecordTy,
        r2: RecordTy,
        span: Span,
    ) -> Result<(), TypeError> {
        // Unify the common fields first.
        for (name, t1) in &r1.fields {
            if let Some(t2) = r2.fields.get(name) {
                self.unify(t1.clone(), t2.clone(), span)?;
            }
        }

        let only_1: BTreeMap<String, Ty> = r1
            .fields
            .iter()
            .filter(|(n, _)| !r2.fields.contains_key(*n))
            .map(|(n, t)| (n.clone(), t.clone()))
            .collect();
        let only_2: BTreeMap<String, Ty> = r2
            .fields
            .iter()
            .filter(|(n, _)| !r1.fields.contains_key(*n))
            .map(|(n, t)| (n.clone(), t.clone()))
            .collect();

        // The left record is the expected type, the right one the found
        // type, matching `unify`'s convention.
        match (r1.row, r2.row) {
            (None, None) => {
                if let Some(field) = only_1.keys().next() {
                    let err = TypeError::RecordFieldMissing {
                        field: field.clone(),
                        record: Ty::Record(r2.clone()),
                        span,
                    };
                    self.errors.push(err.clone());
                    return Err(err);
                }
                if let Some(field) = only_2.keys().next() {
                    let err = TypeError::RecordFieldExtra {
                        field: field.clone(),
                        record: Ty::Record(r2.clone()),
                        span,
                    };
                    self.errors.push(err.clone());
                    return Err(err);
                }
                Ok(())
            }
            (Some(row1), None) => {
                // The open side may not require fields the closed side lacks.
                if let Some(field) = only_1.keys().next() {
                    let err = TypeError::RecordFieldMissing {
                        field: field.clone(),
                        record: Ty::Record(r2.clone()),
                        span,
                    };
                    self.errors.push(err.clone());
                    return Err(err);
                }
                self.bind(row1, Ty::Record(RecordTy::closed(only_2)), span)
            }
            (None, Some(row2)) => {
                if let Some(field) = only_2.keys().next() {
                    let err = TypeError::RecordFieldMissing {
                        field: field.clone(),
                        record: Ty::Record(r1.clone()),
                        span,
                    };
                    self.errors.push(err.clone());
                    return Err(err);
                }
                self.bind(row2, Ty::Record(RecordTy::closed(only_1)), span)
            }
            (Some(row1), Some(row2)) => {
                if self.table.find(row1) == self.table.find(row2) {
                    // Same row on both sides: the field sets must already
                    // agree or the record would need to contain itself.
                    if only_1.is_empty() && only_2.is_empty() {
                        return Ok(());
                    }
                    let err = TypeError::Mismatch {
                        expected: Ty::Record(r1),
                        found: Ty::Record(r2),
                        span,
                    };
                    self.errors.push(err.clone());
                    return Err(err);
                }
                let shared = self.fresh_var();
                self.bind(row1, Ty::Record(RecordTy::open(only_2, shared)), span)?;
                self.bind(row2, Ty::Record(RecordTy::open(only_1, shared)), span)
            }
        }
    }

    // ── Generalization ──────────────────────────────────────────────────

    /// Generalize a type into a scheme, quantifying every unbound variable
    /// whose level is strictly greater than the current level.
    pub fn generalize(&mut self, ty: Ty) -> Scheme {
        let resolved = self.resolve(ty);
        let mut vars = Vec::new();
        self.collect_generalizable(&resolved, &mut vars);
        let mut seen = rustc_hash::FxHashSet::default();
        vars.retain(|v| seen.insert(*v));
        Scheme { vars, ty: resolved }
    }

    fn collect_generalizable(&mut self, ty: &Ty, out: &mut Vec<TyVar>) {
        match ty {
            Ty::Var(v) => {
                // `resolve` already normalized to unbound roots.
                let level = self.level_of(*v);
                if level > self.current_level {
                    out.push(self.table.find(*v));
                }
            }
            Ty::Const(_) | Ty::Error => {}
            Ty::Fun(param, ret) => {
                self.collect_generalizable(param, out);
                self.collect_generalizable(ret, out);
            }
            Ty::Tuple(items) => {
                for t in items {
                    self.collect_generalizable(t, out);
                }
            }
            Ty::Record(rec) => {
                for t in rec.fields.values() {
                    self.collect_generalizable(t, out);
                }
                if let Some(row) = rec.row {
                    let level = self.level_of(row);
                    if level > self.current_level {
                        out.push(self.table.find(row));
                    }
                }
            }
            Ty::Named { args, .. } => {
                for t in args {
                    self.collect_generalizable(t, out);
                }
            }
            Ty::Ref(inner) => self.collect_generalizable(inner, out),
        }
    }

    // ── Instantiation ───────────────────────────────────────────────────

    /// Instantiate a scheme, replacing each quantified variable with a
    /// fresh one at the current level.
    pub fn instantiate(&mut self, scheme: &Scheme) -> Ty {
        if scheme.vars.is_empty() {
            return scheme.ty.clone();
        }
        let resolved = self.resolve(scheme.ty.clone());
        let mut subst: FxHashMap<TyVar, TyVar> = FxHashMap::default();
        for v in &scheme.vars {
            let root = self.table.find(*v);
            let fresh = self.fresh_var();
            subst.insert(root, fresh);
        }
        self.substitute(&resolved, &subst)
    }

    // ── Cross-module schemes ────────────────────────────────────────────

    /// Detach a scheme from this context's unification table so it can be
    /// exported to other modules: quantified variables are renumbered
    /// 0, 1, 2, …, and any residual unbound variable (a monomorphic cell
    /// private to this module) becomes the error type -- importers may not
    /// constrain another module's inference state.
    pub fn canonicalize(&mut self, scheme: &Scheme) -> Scheme {
        let resolved = self.resolve(scheme.ty.clone());
        let mut map: FxHashMap<TyVar, TyVar> = FxHashMap::default();
        for (i, v) in scheme.vars.iter().enumerate() {
            map.insert(self.table.find(*v), TyVar(i as u32));
        }
        let ty = self.erase(&resolved, &map);
        Scheme {
            vars: (0..scheme.vars.len() as u32).map(TyVar).collect(),
            ty,
        }
    }

    fn erase(&mut self, ty: &Ty, map: &FxHashMap<TyVar, TyVar>) -> Ty {
        match ty {
            Ty::Var(v) => {
                let root = self.table.find(*v);
                match map.get(&root) {
                    Some(canon) => Ty::Var(*canon),
                    None => Ty::Error,
                }
            }
            Ty::Const(_) | Ty::Error => ty.clone(),
            Ty::Fun(param, ret) => {
                let param = self.erase(param, map);
                let ret = self.erase(ret, map);
                Ty::fun(param, ret)
            }
            Ty::Tuple(items) => {
                Ty::Tuple(items.iter().map(|t| self.erase(t, map)).collect())
            }
            Ty::Record(rec) => {
                let fields = rec
                    .fields
                    .iter()
                    .map(|(n, t)| (n.clone(), self.erase(t, map)))
                    .collect();
                // A residual unquantified row closes the exported record.
                let row = rec
                    .row
                    .and_then(|v| map.get(&self.table.find(v)).copied());
                Ty::Record(RecordTy { fields, row })
            }
            Ty::Named { name, args } => Ty::Named {
                name: name.clone(),
                args: args.iter().map(|t| self.erase(t, map)).collect(),
            },
            Ty::Ref(inner) => Ty::Ref(Box::new(self.erase(inner, map))),
        }
    }

    /// Instantiate a canonical (table-free) scheme with fresh variables.
    /// Every variable in a canonical type is quantified, so this is a pure
    /// substitution.
    pub fn instantiate_canonical(&mut self, scheme: &Scheme) -> Ty {
        let mut subst: FxHashMap<TyVar, TyVar> = FxHashMap::default();
        for v in &scheme.vars {
            let fresh = self.fresh_var();
            subst.insert(*v, fresh);
        }
        pure_substitute(&scheme.ty, &subst)
    }

    fn substitute(&mut self, ty: &Ty, subst: &FxHashMap<TyVar, TyVar>) -> Ty {
        match ty {
            Ty::Var(v) => {
                let root = self.table.find(*v);
                match subst.get(&root) {
                    Some(fresh) => Ty::Var(*fresh),
                    None => Ty::Var(root),
                }
            }
            Ty::Const(_) | Ty::Error => ty.clone(),
            Ty::Fun(param, ret) => {
                let param = self.substitute(param, subst);
                let ret = self.substitute(ret, subst);
                Ty::fun(param, ret)
            }
            Ty::Tuple(items) => Ty::Tuple(
                items.iter().map(|t| self.substitute(t, subst)).collect(),
            ),
            Ty::Record(rec) => {
                let fields = rec
                    .fields
                    .iter()
                    .map(|(n, t)| (n.clone(), self.substitute(t, subst)))
                    .collect();
                let row = rec.row.map(|v| {
                    let root = self.table.find(v);
                    subst.get(&root).copied().unwrap_or(root)
                });
                Ty::Record(RecordTy { fields, row })
            }
            Ty::Named { name, args } => Ty::Named {
                name: name.clone(),
                args: args.iter().map(|t| self.substitute(t, subst)).collect(),
            },
            Ty::Ref(inner) => Ty::Ref(Box::new(self.substitute(inner, subst))),
        }
    }
}

impl Default for InferCtx {
    fn default() -> Self {
        Self::new()
    }
}

/// Substitute canonical variables without touching any unification table.
fn pure_substitute(ty: &Ty, subst: &FxHashMap<TyVar, TyVar>) -> Ty {
    match ty {
        Ty::Var(v) => match subst.get(v) {
            Some(fresh) => Ty::Var(*fresh),
            // A canonical type has no other variables; anything else is a
            // stale scheme, recovered as the error type.
            None => Ty::Error,
        },
        Ty::Const(_) | Ty::Error => ty.clone(),
        Ty::Fun(param, ret) => Ty::fun(
            pure_substitute(param, subst),
            pure_substitute(ret, subst),
        ),
        Ty::Tuple(items) => {
            Ty::Tuple(items.iter().map(|t| pure_substitute(t, subst)).collect())
        }
        Ty::Record(rec) => Ty::Record(RecordTy {
            fields: rec
                .fields
                .iter()
                .map(|(n, t)| (n.clone(), pure_substitute(t, subst)))
                .collect(),
            row: rec.row.and_then(|v| subst.get(&v).copied()),
        }),
        Ty::Named { name, args } => Ty::Named {
            name: name.clone(),
            args: args.iter().map(|t| pure_substitute(t, subst)).collect(),
        },
        Ty::Ref(inner) => Ty::Ref(Box::new(pure_substitute(inner, subst))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sp() -> Span {
        Span::new(0, 0)
    }

    #[test]
    fn unify_var_with_const() {
        let mut ctx = InferCtx::new();
        let v = ctx.fresh_ty();
        ctx.unify(v.clone(), Ty::int(), sp()).unwrap();
        assert_eq!(ctx.resolve(v), Ty::int());
    }

    #[test]
    fn unify_functions() {
        let mut ctx = InferCtx::new();
        let a = ctx.fresh_ty();
        let b = ctx.fresh_ty();
        ctx.unify(
            Ty::fun(a.clone(), b.clone()),
            Ty::fun(Ty::int(), Ty::string()),
            sp(),
        )
        .unwrap();
        assert_eq!(ctx.resolve(a), Ty::int());
        assert_eq!(ctx.resolve(b), Ty::string());
    }

    #[test]
    fn occurs_check_fires() {
        let mut ctx = InferCtx::new();
        let v = ctx.fresh_ty();
        let result = ctx.unify(v.clone(), Ty::fun(v.clone(), Ty::int()), sp());
        assert!(matches!(result, Err(TypeError::Occurs { .. })));
    }

    #[test]
    fn mismatch_is_recorded() {
        let mut ctx = InferCtx::new();
        let result = ctx.unify(Ty::int(), Ty::string(), sp());
        assert!(result.is_err());
        assert_eq!(ctx.errors.len(), 1);
    }

    #[test]
    fn error_type_unifies_with_anything() {
        let mut ctx = InferCtx::new();
        ctx.unify(Ty::Error, Ty::int(), sp()).unwrap();
        ctx.unify(Ty::fun(Ty::int(), Ty::bool()), Ty::Error, sp()).unwrap();
        assert!(ctx.errors.is_empty());
    }

    #[test]
    fn distinct_named_types_do_not_unify() {
        let mut ctx = InferCtx::new();
        let a = Ty::Named { name: "Color".into(), args: vec![] };
        let b = Ty::Named { name: "Shade".into(), args: vec![] };
        assert!(ctx.unify(a, b, sp()).is_err());
    }

    #[test]
    fn generalize_respects_levels() {
        let mut ctx = InferCtx::new();
        // A variable created at level 1 generalizes at level 0 ...
        ctx.enter_level();
        let inner = ctx.fresh_ty();
        ctx.leave_level();
        let scheme = ctx.generalize(Ty::fun(inner.clone(), inner));
        assert_eq!(scheme.vars.len(), 1);

        // ... but a variable at the current level does not.
        let outer = ctx.fresh_ty();
        let scheme = ctx.generalize(outer);
        assert!(scheme.vars.is_empty());
    }

    #[test]
    fn binding_lowers_levels() {
        let mut ctx = InferCtx::new();
        let outer = ctx.fresh_var();
        ctx.enter_level();
        let inner = ctx.fresh_var();
        // Binding the outer variable to a type mentioning the inner one
        // must drag the inner variable down to the outer level, so it no
        // longer generalizes when we leave.
        ctx.unify(
            Ty::Var(outer),
            Ty::fun(Ty::Var(inner), Ty::int()),
            sp(),
        )
        .unwrap();
        ctx.leave_level();
        let scheme = ctx.generalize(Ty::Var(inner));
        assert!(scheme.vars.is_empty(), "inner var escaped its level");
    }

    #[test]
    fn instantiate_makes_fresh_copies() {
        let mut ctx = InferCtx::new();
        ctx.enter_level();
        let v = ctx.fresh_ty();
        ctx.leave_level();
        let scheme = ctx.generalize(Ty::fun(v.clone(), v));

        let t1 = ctx.instantiate(&scheme);
        let t2 = ctx.instantiate(&scheme);
        // Instantiations unify independently.
        let (Ty::Fun(p1, _), Ty::Fun(p2, _)) = (t1, t2) else {
            panic!("expected function types");
        };
        ctx.unify(*p1, Ty::int(), sp()).unwrap();
        ctx.unify(*p2, Ty::string(), sp()).unwrap();
        assert!(ctx.errors.is_empty());
    }

    // ── Records ─────────────────────────────────────────────────────────

    fn record(fields: &[(&str, Ty)]) -> RecordTy {
        RecordTy::closed(
            fields
                .iter()
                .map(|(n, t)| (n.to_string(), t.clone()))
                .collect(),
        )
    }

    #[test]
    fn closed_records_need_exact_fields() {
        // Expected {x, y}, found {x}: y is missing.
        let mut ctx = InferCtx::new();
        let expected = Ty::Record(record(&[("x", Ty::int()), ("y", Ty::int())]));
        let found = Ty::Record(record(&[("x", Ty::int())]));
        let result = ctx.unify(expected, found, sp());
        assert!(matches!(result, Err(TypeError::RecordFieldMissing { .. })));

        // Expected {x}, found {x, y}: y is extra.
        let mut ctx = InferCtx::new();
        let expected = Ty::Record(record(&[("x", Ty::int())]));
        let found = Ty::Record(record(&[("x", Ty::int()), ("y", Ty::int())]));
        let result = ctx.unify(expected, found, sp());
        assert!(matches!(result, Err(TypeError::RecordFieldExtra { .. })));
    }

    #[test]
    fn open_record_accepts_extra_fields() {
        let mut ctx = InferCtx::new();
        let row = ctx.fresh_var();
        let open = Ty::Record(RecordTy::open(
            [("x".to_string(), Ty::int())].into_iter().collect(),
            row,
        ));
        let closed = Ty::Record(record(&[("x", Ty::int()), ("y", Ty::bool())]));
        ctx.unify(open.clone(), closed, sp()).unwrap();
        // After binding the row, the open record resolves to the full set.
        let Ty::Record(resolved) = ctx.resolve(open) else {
            panic!("expected record");
        };
        assert_eq!(resolved.fields.len(), 2);
        assert!(resolved.row.is_none());
    }

    #[test]
    fn open_record_missing_field_is_an_error() {
        let mut ctx = InferCtx::new();
        let row = ctx.fresh_var();
        let open = Ty::Record(RecordTy::open(
            [("z".to_string(), Ty::int())].into_iter().collect(),
            row,
        ));
        let closed = Ty::Record(record(&[("x", Ty::int())]));
        let result = ctx.unify(open, closed, sp());
        assert!(matches!(result, Err(TypeError::RecordFieldMissing { .. })));
    }

    #[test]
    fn two_open_records_share_a_row() {
        let mut ctx = InferCtx::new();
        let row1 = ctx.fresh_var();
        let row2 = ctx.fresh_var();
        let a = Ty::Record(RecordTy::open(
            [("x".to_string(), Ty::int())].into_iter().collect(),
            row1,
        ));
        let b = Ty::Record(RecordTy::open(
            [("y".to_string(), Ty::bool())].into_iter().collect(),
            row2,
        ));
        ctx.unify(a.clone(), b, sp()).unwrap();
        let Ty::Record(resolved) = ctx.resolve(a) else {
            panic!("expected record");
        };
        assert_eq!(resolved.fields.len(), 2, "both field sets merge");
        assert!(resolved.row.is_some(), "still open through the shared row");
    }
}
