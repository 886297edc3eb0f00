//! Type inference over the Core IR.
//!
//! A single bottom-up pass: every expression node gets a type recorded by
//! `NodeId`, every variable reference gets a resolution (local, top-level,
//! import, external, constructor), and let-bindings generalize under the
//! syntactic value restriction. Errors never abort -- the offending node
//! gets the error type (which unifies with anything) and inference
//! continues, so one compile reports as many independent problems as
//! possible.

use rustc_hash::FxHashMap;
use vibefun_ast::expr::Literal;
use vibefun_ast::Pattern;
use vibefun_common::{ModulePath, Span};
use vibefun_core::{
    CoreBinOp, CoreDecl, CoreExpr, CoreModule, CoreRecBinding, CoreUnOp, NodeId,
};

use crate::env::{Binding, BindingKind, TypeEnv};
use crate::error::TypeError;
use crate::exhaustiveness;
use crate::registry::{convert_type, AliasDef, TypeRegistry};
use crate::ty::{RecordTy, Scheme, Ty, TyConst, TyVar};
use crate::unify::InferCtx;
use crate::{ExportedType, ExportedValue, ImportContext, ModuleExports};

/// Everything inference produces for one module, before diagnostics
/// conversion.
pub struct InferOutcome {
    pub types: FxHashMap<NodeId, Ty>,
    pub resolutions: FxHashMap<NodeId, BindingKind>,
    pub registry: TypeRegistry,
    pub exports: ModuleExports,
    pub errors: Vec<TypeError>,
}

/// Run inference over a desugared module.
pub fn infer_module(
    module: &CoreModule,
    import_targets: Option<&FxHashMap<String, ModulePath>>,
    imports: &ImportContext,
) -> InferOutcome {
    let mut inferencer = Inferencer::new();
    inferencer.seed_builtins();
    inferencer.seed_imports(module, import_targets, imports);
    inferencer.register_types(module);
    for decl in &module.decls {
        inferencer.check_decl(decl);
    }
    inferencer.analyze_matches(module);
    let exports = inferencer.collect_exports(module);
    inferencer.finish(exports)
}

struct Inferencer {
    ctx: InferCtx,
    env: TypeEnv,
    registry: TypeRegistry,
    types: FxHashMap<NodeId, Ty>,
    resolutions: FxHashMap<NodeId, BindingKind>,
}

impl Inferencer {
    fn new() -> Self {
        Inferencer {
            ctx: InferCtx::new(),
            env: TypeEnv::new(),
            registry: TypeRegistry::new(),
            types: FxHashMap::default(),
            resolutions: FxHashMap::default(),
        }
    }

    /// The built-in environment: the `ref` cell constructor. Deref and
    /// assignment are operators, typed directly in `infer_expr`.
    fn seed_builtins(&mut self) {
        let scheme = Scheme {
            vars: vec![TyVar(0)],
            ty: Ty::fun(Ty::Var(TyVar(0)), Ty::reference(Ty::Var(TyVar(0)))),
        };
        self.env
            .insert("ref".to_string(), scheme, BindingKind::Builtin);
    }

    /// Seed the environment and registry from already-checked dependency
    /// modules.
    fn seed_imports(
        &mut self,
        module: &CoreModule,
        targets: Option<&FxHashMap<String, ModulePath>>,
        imports: &ImportContext,
    ) {
        for import in &module.imports {
            let Some(path) = targets.and_then(|t| t.get(&import.source)) else {
                continue;
            };
            let Some(exports) = imports.exports.get(path) else {
                continue;
            };
            for item in &import.items {
                let local = item.local_name().to_string();
                if item.is_type {
                    match exports.types.get(&item.name) {
                        Some(ExportedType::Variant(def)) => {
                            let def = def.clone();
                            if local != def.name {
                                // An aliased variant import keeps the
                                // nominal identity and adds a local alias.
                                self.registry.aliases.insert(
                                    local,
                                    AliasDef {
                                        params: def.params.clone(),
                                        target: vibefun_ast::TypeExpr::App {
                                            name: def.name.clone(),
                                            args: def
                                                .params
                                                .iter()
                                                .map(|p| vibefun_ast::TypeExpr::Var {
                                                    name: p.clone(),
                                                    span: item.span,
                                                })
                                                .collect(),
                                            span: item.span,
                                        },
                                    },
                                );
                            }
                            self.registry.register_variant(def);
                        }
                        Some(ExportedType::Alias { params, target }) => {
                            self.registry.aliases.insert(
                                local,
                                AliasDef {
                                    params: params.clone(),
                                    target: target.clone(),
                                },
                            );
                        }
                        Some(ExportedType::Opaque) => {
                            self.registry.register_opaque(item.name.clone());
                            if local != item.name {
                                self.registry.register_opaque(local);
                            }
                        }
                        None => {}
                    }
                } else if let Some(value) = exports.values.get(&item.name) {
                    let kind = match &value.kind {
                        BindingKind::Constructor { type_name, arity } => {
                            BindingKind::Constructor {
                                type_name: type_name.clone(),
                                arity: *arity,
                            }
                        }
                        _ => BindingKind::Import,
                    };
                    self.env.insert(local, value.scheme.clone(), kind);
                }
            }
        }
    }

    /// Register all local type declarations up front so declarations can
    /// reference types declared later in the module.
    fn register_types(&mut self, module: &CoreModule) {
        for decl in &module.decls {
            match decl {
                CoreDecl::Type(t) => self.registry.register_decl(t),
                CoreDecl::ExternalType { name, .. } => {
                    self.registry.register_opaque(name.clone())
                }
                _ => {}
            }
        }
    }

    // ── Declarations ────────────────────────────────────────────────────

    fn check_decl(&mut self, decl: &CoreDecl) {
        match decl {
            CoreDecl::Let {
                pattern,
                value,
                recursive,
                annotation,
                span,
                ..
            } => {
                self.ctx.enter_level();
                // `let rec f = …`: the body may refer to `f` through a
                // fresh monomorphic variable. A recursive destructuring
                // binding is not representable and checks non-recursively.
                let rec_name = match (*recursive, pattern) {
                    (true, Pattern::Var { name, .. }) => Some(name.clone()),
                    _ => None,
                };
                let value_ty = match rec_name {
                    Some(name) => {
                        let var = self.ctx.fresh_ty();
                        self.env.insert(
                            name,
                            Scheme::mono(var.clone()),
                            BindingKind::TopLevel,
                        );
                        let body_ty = self.infer_expr(value);
                        let _ = self.ctx.unify(var.clone(), body_ty, value.span());
                        var
                    }
                    None => self.infer_expr(value),
                };
                let poly_annotation = self.check_annotation(annotation, &value_ty, value.span());
                self.ctx.leave_level();

                let is_val = self.is_value(value);
                if poly_annotation && !is_val {
                    let name = pattern.bound_names().into_iter().next().unwrap_or_default();
                    self.ctx
                        .errors
                        .push(TypeError::ValueRestriction { name, span: *span });
                }
                self.bind_pattern(pattern, value_ty, is_val, BindingKind::TopLevel);
            }
            CoreDecl::LetRecGroup { bindings, .. } => self.check_rec_group(bindings),
            CoreDecl::Type(_) | CoreDecl::ExternalType { .. } => {}
            CoreDecl::External {
                name,
                ty,
                js_name,
                from,
                ..
            } => {
                self.ctx.enter_level();
                let mut vars = FxHashMap::default();
                let converted = convert_type(&mut self.ctx, &self.registry, &mut vars, ty, false);
                self.ctx.leave_level();
                let scheme = self.ctx.generalize(converted);
                self.env.insert(
                    name.clone(),
                    scheme,
                    BindingKind::External {
                        js_name: js_name.clone(),
                        from: from.clone(),
                    },
                );
            }
        }
    }

    fn check_rec_group(&mut self, bindings: &[CoreRecBinding]) {
        self.ctx.enter_level();
        let vars: Vec<Ty> = bindings
            .iter()
            .map(|b| {
                let var = self.ctx.fresh_ty();
                self.env.insert(
                    b.name.clone(),
                    Scheme::mono(var.clone()),
                    BindingKind::TopLevel,
                );
                var
            })
            .collect();
        for (binding, var) in bindings.iter().zip(&vars) {
            let body_ty = self.infer_expr(&binding.value);
            let _ = self
                .ctx
                .unify(var.clone(), body_ty, binding.value.span());
            self.check_annotation(&binding.annotation, var, binding.value.span());
        }
        self.ctx.leave_level();
        // Generalize each binding individually under the value restriction.
        for (binding, var) in bindings.iter().zip(&vars) {
            let scheme = if self.is_value(&binding.value) {
                self.ctx.generalize(var.clone())
            } else {
                self.ctx.demote_to_current_level(var);
                Scheme::mono(var.clone())
            };
            self.env
                .insert(binding.name.clone(), scheme, BindingKind::TopLevel);
        }
    }

    /// Check an optional annotation against the inferred type. Returns
    /// whether the annotation mentions type variables (is polymorphic).
    fn check_annotation(
        &mut self,
        annotation: &Option<vibefun_ast::TypeExpr>,
        value_ty: &Ty,
        span: Span,
    ) -> bool {
        let Some(ann) = annotation else {
            return false;
        };
        let mut vars = FxHashMap::default();
        let ann_ty = convert_type(&mut self.ctx, &self.registry, &mut vars, ann, false);
        let _ = self.ctx.unify(ann_ty, value_ty.clone(), span);
        !vars.is_empty()
    }

    /// Bind the names of a let pattern, generalizing when the right-hand
    /// side was a syntactic value.
    fn bind_pattern(&mut self, pattern: &Pattern, value_ty: Ty, is_val: bool, kind: BindingKind) {
        match pattern {
            Pattern::Var { name, .. } => {
                let scheme = if is_val {
                    self.ctx.generalize(value_ty)
                } else {
                    self.ctx.demote_to_current_level(&value_ty);
                    Scheme::mono(value_ty)
                };
                self.env.insert(name.clone(), scheme, kind);
            }
            Pattern::Wildcard { .. } => {}
            other => {
                let mut binds = Vec::new();
                let pat_ty = self.infer_pattern(other, &mut binds);
                self.unify_pattern(value_ty, pat_ty, other.span());
                for (name, ty) in binds {
                    let scheme = if is_val {
                        self.ctx.generalize(ty)
                    } else {
                        self.ctx.demote_to_current_level(&ty);
                        Scheme::mono(ty)
                    };
                    self.env.insert(name, scheme, kind.clone());
                }
            }
        }
    }

    // ── Expressions ─────────────────────────────────────────────────────

    fn infer_expr(&mut self, expr: &CoreExpr) -> Ty {
        let ty = self.infer_expr_inner(expr);
        self.types.insert(expr.id(), ty.clone());
        ty
    }

    fn infer_expr_inner(&mut self, expr: &CoreExpr) -> Ty {
        match expr {
            CoreExpr::Lit { value, .. } => literal_type(value),

            CoreExpr::Var { name, id, span } => self.lookup_var(name, *id, *span),

            CoreExpr::Lambda {
                param,
                annotation,
                body,
                ..
            } => {
                let param_ty = match annotation {
                    Some(ann) => {
                        let mut vars = FxHashMap::default();
                        // A record annotation on a parameter means "at
                        // least these fields" (width subtyping).
                        convert_type(&mut self.ctx, &self.registry, &mut vars, ann, true)
                    }
                    None => self.ctx.fresh_ty(),
                };
                self.env.push_scope();
                self.env.insert(
                    param.clone(),
                    Scheme::mono(param_ty.clone()),
                    BindingKind::Local,
                );
                let body_ty = self.infer_expr(body);
                self.env.pop_scope();
                Ty::fun(param_ty, body_ty)
            }

            CoreExpr::Apply { func, arg, span, .. } => {
                let func_ty = self.infer_expr(func);
                let arg_ty = self.infer_expr(arg);
                let result = self.ctx.fresh_ty();
                let resolved = self.ctx.resolve(func_ty);
                match resolved {
                    Ty::Fun(..) | Ty::Var(_) | Ty::Error => {
                        let _ = self.ctx.unify(
                            resolved,
                            Ty::fun(arg_ty, result.clone()),
                            *span,
                        );
                        result
                    }
                    other => {
                        self.ctx.errors.push(TypeError::NotAFunction {
                            ty: other,
                            span: func.span(),
                        });
                        Ty::Error
                    }
                }
            }

            CoreExpr::Let {
                pattern,
                value,
                body,
                ..
            } => {
                self.ctx.enter_level();
                let value_ty = self.infer_expr(value);
                self.ctx.leave_level();
                let is_val = self.is_value(value);
                self.env.push_scope();
                self.bind_pattern(pattern, value_ty, is_val, BindingKind::Local);
                let body_ty = self.infer_expr(body);
                self.env.pop_scope();
                body_ty
            }

            CoreExpr::If {
                cond, then, els, ..
            } => {
                let cond_ty = self.infer_expr(cond);
                let _ = self.ctx.unify(Ty::bool(), cond_ty, cond.span());
                let then_ty = self.infer_expr(then);
                let els_ty = self.infer_expr(els);
                let _ = self.ctx.unify(then_ty.clone(), els_ty, els.span());
                then_ty
            }

            CoreExpr::Match {
                scrutinee, arms, ..
            } => {
                let scrut_ty = self.infer_expr(scrutinee);
                let result = self.ctx.fresh_ty();
                for arm in arms {
                    self.env.push_scope();
                    let mut binds = Vec::new();
                    let pat_ty = self.infer_pattern(&arm.pattern, &mut binds);
                    self.unify_pattern(scrut_ty.clone(), pat_ty, arm.pattern.span());
                    for (name, ty) in binds {
                        self.env
                            .insert(name, Scheme::mono(ty), BindingKind::Local);
                    }
                    if let Some(guard) = &arm.guard {
                        let guard_ty = self.infer_expr(guard);
                        self.expect_bool(guard_ty, guard.span());
                    }
                    let body_ty = self.infer_expr(&arm.body);
                    let _ = self.ctx.unify(result.clone(), body_ty, arm.body.span());
                    self.env.pop_scope();
                }
                result
            }

            CoreExpr::Record {
                spread,
                fields,
                span,
                ..
            } => {
                let mut field_tys: Vec<(String, Ty)> = Vec::new();
                for (name, value) in fields {
                    field_tys.push((name.clone(), self.infer_expr(value)));
                }
                match spread {
                    None => {
                        let map = field_tys.into_iter().collect();
                        Ty::Record(RecordTy::closed(map))
                    }
                    Some(base) => {
                        // Spread requires a known closed record; the result
                        // is that record with the explicit fields updated
                        // or extended.
                        let base_ty = self.infer_expr(base);
                        let resolved = self.ctx.resolve(base_ty);
                        match resolved {
                            Ty::Record(rec) if rec.row.is_none() => {
                                let mut merged = rec.fields;
                                for (name, ty) in field_tys {
                                    merged.insert(name, ty);
                                }
                                Ty::Record(RecordTy::closed(merged))
                            }
                            Ty::Error => Ty::Error,
                            other => {
                                let expected =
                                    Ty::Record(RecordTy::closed(field_tys.into_iter().collect()));
                                self.ctx.errors.push(TypeError::Mismatch {
                                    expected,
                                    found: other,
                                    span: *span,
                                });
                                Ty::Error
                            }
                        }
                    }
                }
            }

            CoreExpr::FieldAccess { expr, field, span, .. } => {
                let expr_ty = self.infer_expr(expr);
                let field_ty = self.ctx.fresh_ty();
                let row = self.ctx.fresh_var();
                // "a record with at least this field, whatever else".
                let want = Ty::Record(RecordTy::open(
                    [(field.clone(), field_ty.clone())].into_iter().collect(),
                    row,
                ));
                let _ = self.ctx.unify(want, expr_ty, *span);
                field_ty
            }

            CoreExpr::Tuple { items, .. } => {
                Ty::Tuple(items.iter().map(|e| self.infer_expr(e)).collect())
            }

            CoreExpr::List { items, tail, .. } => {
                let elem = self.ctx.fresh_ty();
                for item in items {
                    let item_ty = self.infer_expr(item);
                    let _ = self.ctx.unify(elem.clone(), item_ty, item.span());
                }
                if let Some(tail) = tail {
                    let tail_ty = self.infer_expr(tail);
                    let _ = self
                        .ctx
                        .unify(Ty::list(elem.clone()), tail_ty, tail.span());
                }
                Ty::list(elem)
            }

            CoreExpr::Unary { op, expr, span, .. } => {
                let operand = self.infer_expr(expr);
                match op {
                    CoreUnOp::Neg => {
                        let resolved = self.ctx.resolve(operand);
                        if resolved == Ty::float() {
                            Ty::float()
                        } else {
                            let _ = self.ctx.unify(Ty::int(), resolved, *span);
                            Ty::int()
                        }
                    }
                    CoreUnOp::Not => {
                        let _ = self.ctx.unify(Ty::bool(), operand, *span);
                        Ty::bool()
                    }
                    CoreUnOp::Deref => {
                        let inner = self.ctx.fresh_ty();
                        let _ = self
                            .ctx
                            .unify(Ty::reference(inner.clone()), operand, *span);
                        inner
                    }
                }
            }

            CoreExpr::Binary {
                op,
                lhs,
                rhs,
                span,
                ..
            } => {
                let lhs_ty = self.infer_expr(lhs);
                let rhs_ty = self.infer_expr(rhs);
                match op {
                    CoreBinOp::Add
                    | CoreBinOp::Sub
                    | CoreBinOp::Mul
                    | CoreBinOp::Divide
                    | CoreBinOp::IntDivide
                    | CoreBinOp::FloatDivide => self.numeric(lhs_ty, rhs_ty, *span),
                    CoreBinOp::Concat => {
                        let _ = self.ctx.unify(Ty::string(), lhs_ty, lhs.span());
                        let _ = self.ctx.unify(Ty::string(), rhs_ty, rhs.span());
                        Ty::string()
                    }
                    CoreBinOp::Eq | CoreBinOp::Neq => {
                        let _ = self.ctx.unify(lhs_ty, rhs_ty, *span);
                        Ty::bool()
                    }
                    CoreBinOp::Lt | CoreBinOp::Le | CoreBinOp::Gt | CoreBinOp::Ge => {
                        let _ = self.ctx.unify(lhs_ty, rhs_ty, *span);
                        Ty::bool()
                    }
                    CoreBinOp::And | CoreBinOp::Or => {
                        let _ = self.ctx.unify(Ty::bool(), lhs_ty, lhs.span());
                        let _ = self.ctx.unify(Ty::bool(), rhs_ty, rhs.span());
                        Ty::bool()
                    }
                    CoreBinOp::RefAssign => {
                        let inner = self.ctx.fresh_ty();
                        let _ = self
                            .ctx
                            .unify(Ty::reference(inner.clone()), lhs_ty, lhs.span());
                        let _ = self.ctx.unify(inner, rhs_ty, rhs.span());
                        Ty::unit()
                    }
                }
            }

            CoreExpr::Annot { expr, ty, span, .. } => {
                let expr_ty = self.infer_expr(expr);
                let mut vars = FxHashMap::default();
                let ann_ty = convert_type(&mut self.ctx, &self.registry, &mut vars, ty, false);
                let _ = self.ctx.unify(ann_ty.clone(), expr_ty, *span);
                ann_ty
            }
        }
    }

    /// Numeric operators default to Int; a Float on either side makes the
    /// whole operation Float.
    fn numeric(&mut self, lhs: Ty, rhs: Ty, span: Span) -> Ty {
        let l = self.ctx.resolve(lhs);
        let r = self.ctx.resolve(rhs);
        let target = if l == Ty::float() || r == Ty::float() {
            Ty::float()
        } else {
            Ty::int()
        };
        let _ = self.ctx.unify(target.clone(), l, span);
        let _ = self.ctx.unify(target.clone(), r, span);
        target
    }

    fn lookup_var(&mut self, name: &str, id: NodeId, span: Span) -> Ty {
        if let Some(binding) = self.env.lookup(name).cloned() {
            self.resolutions.insert(id, binding.kind.clone());
            return self.instantiate_binding(&binding);
        }
        if self.registry.is_constructor(name) {
            let (def, ctor) = self.registry.constructor(name).expect("just checked");
            let kind = BindingKind::Constructor {
                type_name: def.name.clone(),
                arity: ctor.arity(),
            };
            self.resolutions.insert(id, kind);
            return self
                .registry
                .constructor_value_type(&mut self.ctx, name)
                .expect("constructor exists");
        }
        let starts_upper = name.chars().next().is_some_and(|c| c.is_uppercase());
        self.ctx.errors.push(if starts_upper {
            TypeError::UnboundConstructor {
                name: name.to_string(),
                span,
            }
        } else {
            TypeError::UnboundVariable {
                name: name.to_string(),
                span,
            }
        });
        Ty::Error
    }

    /// Local and top-level schemes live in this module's unification
    /// table; imported, built-in, and constructor schemes are canonical
    /// (table-free) and instantiate by pure substitution.
    fn instantiate_binding(&mut self, binding: &Binding) -> Ty {
        match binding.kind {
            BindingKind::Import | BindingKind::Builtin | BindingKind::Constructor { .. } => {
                self.ctx.instantiate_canonical(&binding.scheme)
            }
            BindingKind::Local | BindingKind::TopLevel | BindingKind::External { .. } => {
                self.ctx.instantiate(&binding.scheme)
            }
        }
    }

    fn is_value(&self, expr: &CoreExpr) -> bool {
        let registry = &self.registry;
        expr.is_syntactic_value(&|name| registry.is_constructor(name))
    }

    // ── Patterns ────────────────────────────────────────────────────────

    /// Infer a pattern's type, collecting the variables it binds. Bindings
    /// are monomorphic; the caller inserts them into the environment.
    fn infer_pattern(&mut self, pattern: &Pattern, binds: &mut Vec<(String, Ty)>) -> Ty {
        match pattern {
            Pattern::Lit { value, .. } => literal_type(value),
            Pattern::Var { name, .. } => {
                let var = self.ctx.fresh_ty();
                binds.push((name.clone(), var.clone()));
                var
            }
            Pattern::Wildcard { .. } => self.ctx.fresh_ty(),
            Pattern::Ctor { name, args, span } => {
                match self.registry.instantiate_constructor(&mut self.ctx, name) {
                    Some((fields, result)) => {
                        if fields.len() != args.len() {
                            self.ctx.errors.push(TypeError::ArityMismatch {
                                name: name.clone(),
                                expected: fields.len(),
                                found: args.len(),
                                span: *span,
                            });
                            for arg in args {
                                let _ = self.infer_pattern(arg, binds);
                            }
                            return result;
                        }
                        for (arg, field_ty) in args.iter().zip(fields) {
                            let arg_ty = self.infer_pattern(arg, binds);
                            self.unify_pattern(field_ty, arg_ty, arg.span());
                        }
                        result
                    }
                    None => {
                        self.ctx.errors.push(TypeError::UnboundConstructor {
                            name: name.clone(),
                            span: *span,
                        });
                        for arg in args {
                            let _ = self.infer_pattern(arg, binds);
                        }
                        Ty::Error
                    }
                }
            }
            Pattern::Tuple { items, .. } => Ty::Tuple(
                items
                    .iter()
                    .map(|p| self.infer_pattern(p, binds))
                    .collect(),
            ),
            Pattern::Record { fields, .. } => {
                let mut field_tys = std::collections::BTreeMap::new();
                for field in fields {
                    let ty = match &field.pattern {
                        Some(p) => self.infer_pattern(p, binds),
                        None => {
                            // Shorthand `{ x }` binds the field name.
                            let var = self.ctx.fresh_ty();
                            binds.push((field.name.clone(), var.clone()));
                            var
                        }
                    };
                    field_tys.insert(field.name.clone(), ty);
                }
                // A record pattern matches any record with at least the
                // listed fields.
                let row = self.ctx.fresh_var();
                Ty::Record(RecordTy::open(field_tys, row))
            }
            Pattern::List { items, rest, .. } => {
                let elem = self.ctx.fresh_ty();
                for item in items {
                    let item_ty = self.infer_pattern(item, binds);
                    self.unify_pattern(elem.clone(), item_ty, item.span());
                }
                if let Some(rest) = rest {
                    let rest_ty = self.infer_pattern(rest, binds);
                    self.unify_pattern(Ty::list(elem.clone()), rest_ty, rest.span());
                }
                Ty::list(elem)
            }
            Pattern::Or {
                alternatives,
                span,
            } => {
                let Some((first, rest)) = alternatives.split_first() else {
                    return self.ctx.fresh_ty();
                };
                // Bindings of the first alternative, kept apart from any
                // enclosing pattern's bindings for the set comparison.
                let mut first_binds = Vec::new();
                let first_ty = self.infer_pattern(first, &mut first_binds);
                let mut expected: Vec<(String, Ty)> = first_binds.clone();
                expected.sort_by(|a, b| a.0.cmp(&b.0));
                for alt in rest {
                    let mut alt_binds = Vec::new();
                    let alt_ty = self.infer_pattern(alt, &mut alt_binds);
                    self.unify_pattern(first_ty.clone(), alt_ty, alt.span());
                    alt_binds.sort_by(|a, b| a.0.cmp(&b.0));
                    let expected_names: Vec<&String> =
                        expected.iter().map(|(n, _)| n).collect();
                    let alt_names: Vec<&String> = alt_binds.iter().map(|(n, _)| n).collect();
                    if expected_names != alt_names {
                        self.ctx.errors.push(TypeError::OrPatternBindings {
                            expected: expected_names.into_iter().cloned().collect(),
                            found: alt_names.into_iter().cloned().collect(),
                            span: *span,
                        });
                        continue;
                    }
                    // Same names: the types of each binding must agree.
                    for ((_, expected_ty), (_, alt_ty)) in
                        expected.iter().zip(alt_binds.iter())
                    {
                        let _ = self.ctx.unify(
                            expected_ty.clone(),
                            alt_ty.clone(),
                            alt.span(),
                        );
                    }
                }
                binds.extend(first_binds);
                first_ty
            }
            Pattern::Guard { .. } => {
                panic!("internal error: guard pattern survived desugaring")
            }
            Pattern::Annot { pattern, ty, span } => {
                let pat_ty = self.infer_pattern(pattern, binds);
                let mut vars = FxHashMap::default();
                let ann_ty = convert_type(&mut self.ctx, &self.registry, &mut vars, ty, false);
                self.unify_pattern(ann_ty.clone(), pat_ty, *span);
                ann_ty
            }
        }
    }

    /// Unify in pattern position (expected type first, pattern type
    /// second), relabeling a plain mismatch as a pattern-type mismatch
    /// for the diagnostic code.
    fn unify_pattern(&mut self, expected: Ty, pattern_ty: Ty, span: Span) {
        if self.ctx.unify(expected, pattern_ty, span).is_err() {
            if let Some(TypeError::Mismatch {
                expected,
                found,
                span: err_span,
            }) = self.ctx.errors.last().cloned()
            {
                if err_span == span {
                    self.ctx.errors.pop();
                    self.ctx.errors.push(TypeError::PatternTypeMismatch {
                        expected,
                        found,
                        span,
                    });
                }
            }
        }
    }

    /// Constrain a guard to Bool, producing the guard-specific diagnostic.
    fn expect_bool(&mut self, guard_ty: Ty, span: Span) {
        let resolved = self.ctx.resolve(guard_ty);
        if self.ctx.unify(Ty::bool(), resolved.clone(), span).is_err() {
            self.ctx.errors.pop();
            self.ctx.errors.push(TypeError::GuardNotBool {
                found: resolved,
                span,
            });
        }
    }

    // ── Match analysis ──────────────────────────────────────────────────

    /// Run exhaustiveness/reachability over every match in the module.
    /// Runs after inference so scrutinee types are known.
    fn analyze_matches(&mut self, module: &CoreModule) {
        for decl in &module.decls {
            match decl {
                CoreDecl::Let { value, .. } => self.analyze_expr(value),
                CoreDecl::LetRecGroup { bindings, .. } => {
                    for b in bindings {
                        self.analyze_expr(&b.value);
                    }
                }
                _ => {}
            }
        }
    }

    fn analyze_expr(&mut self, expr: &CoreExpr) {
        match expr {
            CoreExpr::Match {
                scrutinee,
                arms,
                span,
                ..
            } => {
                self.analyze_expr(scrutinee);
                for arm in arms {
                    if let Some(guard) = &arm.guard {
                        self.analyze_expr(guard);
                    }
                    self.analyze_expr(&arm.body);
                }
                let scrut_ty = self
                    .types
                    .get(&scrutinee.id())
                    .cloned()
                    .unwrap_or(Ty::Error);
                let scrut_ty = self.ctx.resolve(scrut_ty);
                exhaustiveness::check_match(
                    &scrut_ty,
                    arms,
                    &self.registry,
                    *span,
                    &mut self.ctx.errors,
                );
            }
            CoreExpr::Lit { .. } | CoreExpr::Var { .. } => {}
            CoreExpr::Lambda { body, .. } => self.analyze_expr(body),
            CoreExpr::Apply { func, arg, .. } => {
                self.analyze_expr(func);
                self.analyze_expr(arg);
            }
            CoreExpr::Let { value, body, .. } => {
                self.analyze_expr(value);
                self.analyze_expr(body);
            }
            CoreExpr::If {
                cond, then, els, ..
            } => {
                self.analyze_expr(cond);
                self.analyze_expr(then);
                self.analyze_expr(els);
            }
            CoreExpr::Record { spread, fields, .. } => {
                if let Some(base) = spread {
                    self.analyze_expr(base);
                }
                for (_, value) in fields {
                    self.analyze_expr(value);
                }
            }
            CoreExpr::FieldAccess { expr, .. } => self.analyze_expr(expr),
            CoreExpr::Tuple { items, .. } => {
                for item in items {
                    self.analyze_expr(item);
                }
            }
            CoreExpr::List { items, tail, .. } => {
                for item in items {
                    self.analyze_expr(item);
                }
                if let Some(tail) = tail {
                    self.analyze_expr(tail);
                }
            }
            CoreExpr::Unary { expr, .. } => self.analyze_expr(expr),
            CoreExpr::Binary { lhs, rhs, .. } => {
                self.analyze_expr(lhs);
                self.analyze_expr(rhs);
            }
            CoreExpr::Annot { expr, .. } => self.analyze_expr(expr),
        }
    }

    // ── Exports ─────────────────────────────────────────────────────────

    /// Collect this module's exports with canonical (table-free) schemes.
    fn collect_exports(&mut self, module: &CoreModule) -> ModuleExports {
        let mut exports = ModuleExports::default();
        for decl in &module.decls {
            match decl {
                CoreDecl::Let {
                    pattern, exported, ..
                } if *exported => {
                    for name in pattern.bound_names() {
                        self.export_value(&mut exports, &name);
                    }
                }
                CoreDecl::LetRecGroup { bindings, .. } => {
                    for b in bindings.iter().filter(|b| b.exported) {
                        self.export_value(&mut exports, &b.name);
                    }
                }
                CoreDecl::External { name, exported, .. } if *exported => {
                    self.export_value(&mut exports, name);
                }
                CoreDecl::Type(t) => {
                    match &t.def {
                        vibefun_ast::TypeDef::Variant(_) => {
                            if let Some(def) = self.registry.variants.get(&t.name).cloned() {
                                // Constructors are exported as values.
                                for ctor in &def.constructors {
                                    self.ctx.enter_level();
                                    let ty = self
                                        .registry
                                        .constructor_value_type(&mut self.ctx, &ctor.name)
                                        .expect("registered constructor");
                                    self.ctx.leave_level();
                                    let scheme = self.ctx.generalize(ty);
                                    let canonical = self.ctx.canonicalize(&scheme);
                                    exports.values.insert(
                                        ctor.name.clone(),
                                        ExportedValue {
                                            scheme: canonical,
                                            kind: BindingKind::Constructor {
                                                type_name: def.name.clone(),
                                                arity: ctor.arity(),
                                            },
                                        },
                                    );
                                }
                                exports
                                    .types
                                    .insert(t.name.clone(), ExportedType::Variant(def));
                            }
                        }
                        _ => {
                            if let Some(alias) = self.registry.aliases.get(&t.name) {
                                exports.types.insert(
                                    t.name.clone(),
                                    ExportedType::Alias {
                                        params: alias.params.clone(),
                                        target: alias.target.clone(),
                                    },
                                );
                            }
                        }
                    }
                }
                CoreDecl::ExternalType { name, .. } => {
                    exports.types.insert(name.clone(), ExportedType::Opaque);
                }
                _ => {}
            }
        }
        exports
    }

    fn export_value(&mut self, exports: &mut ModuleExports, name: &str) {
        if let Some(binding) = self.env.lookup(name).cloned() {
            let canonical = match binding.kind {
                BindingKind::Import | BindingKind::Builtin | BindingKind::Constructor { .. } => {
                    binding.scheme.clone()
                }
                _ => self.ctx.canonicalize(&binding.scheme),
            };
            exports.values.insert(
                name.to_string(),
                ExportedValue {
                    scheme: canonical,
                    kind: BindingKind::Import,
                },
            );
        }
    }

    // ── Finish ──────────────────────────────────────────────────────────

    /// Fully substitute every recorded type and package the outcome.
    fn finish(mut self, exports: ModuleExports) -> InferOutcome {
        let ids: Vec<NodeId> = self.types.keys().copied().collect();
        for id in ids {
            let ty = self.types.remove(&id).expect("key just listed");
            let resolved = self.ctx.resolve(ty);
            self.types.insert(id, resolved);
        }
        InferOutcome {
            types: self.types,
            resolutions: self.resolutions,
            registry: self.registry,
            exports,
            errors: self.ctx.errors,
        }
    }
}

fn literal_type(lit: &Literal) -> Ty {
    match lit {
        Literal::Int(_) => Ty::int(),
        Literal::Float(_) => Ty::float(),
        Literal::String(_) => Ty::string(),
        Literal::Bool(_) => Ty::bool(),
        Literal::Unit => Ty::Const(TyConst::Unit),
    }
}
