//! Registry of user-declared types.
//!
//! Holds variant definitions (with their constructors), type aliases
//! (including record-typed aliases), and opaque external types, for both
//! local declarations and imported types. Constructor field types are
//! stored as surface `TypeExpr`s and converted to `Ty` at each use with a
//! fresh instantiation of the type parameters, which keeps the registry
//! free of any unification-table state and lets it cross module
//! boundaries.

use rustc_hash::{FxHashMap, FxHashSet};
use vibefun_ast::{TypeDecl, TypeDef, TypeExpr};
use vibefun_common::Span;

use crate::error::TypeError;
use crate::ty::{RecordTy, Ty, TyConst};
use crate::unify::InferCtx;

/// A declared variant type.
#[derive(Debug, Clone)]
pub struct VariantDef {
    pub name: String,
    pub params: Vec<String>,
    pub constructors: Vec<ConstructorDef>,
}

#[derive(Debug, Clone)]
pub struct ConstructorDef {
    pub name: String,
    pub fields: Vec<TypeExpr>,
}

impl ConstructorDef {
    pub fn arity(&self) -> usize {
        self.fields.len()
    }
}

/// A type alias (plain or record-bodied).
#[derive(Debug, Clone)]
pub struct AliasDef {
    pub params: Vec<String>,
    pub target: TypeExpr,
}

/// All type names known to one compilation of a module.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    pub variants: FxHashMap<String, VariantDef>,
    pub aliases: FxHashMap<String, AliasDef>,
    /// Opaque external types: nominal, no structure.
    pub opaque: FxHashSet<String>,
    /// Constructor name -> owning variant type name.
    ctor_owner: FxHashMap<String, String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a local `type` declaration.
    pub fn register_decl(&mut self, decl: &TypeDecl) {
        match &decl.def {
            TypeDef::Variant(cases) => {
                let def = VariantDef {
                    name: decl.name.clone(),
                    params: decl.params.clone(),
                    constructors: cases
                        .iter()
                        .map(|c| ConstructorDef {
                            name: c.name.clone(),
                            fields: c.args.clone(),
                        })
                        .collect(),
                };
                self.register_variant(def);
            }
            TypeDef::Alias(target) => {
                self.aliases.insert(
                    decl.name.clone(),
                    AliasDef {
                        params: decl.params.clone(),
                        target: target.clone(),
                    },
                );
            }
            TypeDef::Record(fields) => {
                // A record-bodied type declaration is an alias to the
                // structural record type.
                self.aliases.insert(
                    decl.name.clone(),
                    AliasDef {
                        params: decl.params.clone(),
                        target: TypeExpr::Record {
                            fields: fields.clone(),
                            span: decl.span,
                        },
                    },
                );
            }
        }
    }

    /// Register a variant definition (local or imported).
    pub fn register_variant(&mut self, def: VariantDef) {
        for ctor in &def.constructors {
            self.ctor_owner
                .insert(ctor.name.clone(), def.name.clone());
        }
        self.variants.insert(def.name.clone(), def);
    }

    pub fn register_opaque(&mut self, name: String) {
        self.opaque.insert(name);
    }

    pub fn is_constructor(&self, name: &str) -> bool {
        self.ctor_owner.contains_key(name)
    }

    /// Look up a constructor and its owning variant.
    pub fn constructor(&self, name: &str) -> Option<(&VariantDef, &ConstructorDef)> {
        let owner = self.ctor_owner.get(name)?;
        let def = self.variants.get(owner)?;
        let ctor = def.constructors.iter().find(|c| c.name == name)?;
        Some((def, ctor))
    }

    /// Instantiate a constructor: fresh type arguments for the variant's
    /// parameters, converted field types, and the resulting variant type.
    pub fn instantiate_constructor(
        &self,
        ctx: &mut InferCtx,
        name: &str,
    ) -> Option<(Vec<Ty>, Ty)> {
        let (def, ctor) = self.constructor(name)?;
        let mut vars: FxHashMap<String, Ty> = FxHashMap::default();
        let args: Vec<Ty> = def
            .params
            .iter()
            .map(|p| {
                let v = ctx.fresh_ty();
                vars.insert(p.clone(), v.clone());
                v
            })
            .collect();
        let fields = ctor
            .fields
            .iter()
            .map(|f| convert_type(ctx, self, &mut vars, f, false))
            .collect();
        let result = Ty::Named {
            name: def.name.clone(),
            args,
        };
        Some((fields, result))
    }

    /// The curried function type of a constructor used as a value:
    /// `T₁ -> … -> Tₙ -> N<…>` (or just `N<…>` for 0-ary).
    pub fn constructor_value_type(&self, ctx: &mut InferCtx, name: &str) -> Option<Ty> {
        let (fields, result) = self.instantiate_constructor(ctx, name)?;
        Some(
            fields
                .into_iter()
                .rev()
                .fold(result, |acc, f| Ty::fun(f, acc)),
        )
    }
}

/// Maximum alias-expansion depth; beyond this the alias is almost
/// certainly self-referential and conversion bails out with an error type.
const MAX_ALIAS_DEPTH: u32 = 32;

/// Convert a surface type expression to an internal type.
///
/// `vars` maps type-variable names (and variant parameters) to their
/// types; unknown names get a fresh variable, giving each annotation its
/// own implicit quantification scope. `open_top` makes a top-level record
/// type open (used for lambda parameter annotations, where a record
/// annotation means "at least these fields").
///
/// Unknown type names push [`TypeError::UnboundType`] and convert to the
/// error type, so conversion is total.
pub fn convert_type(
    ctx: &mut InferCtx,
    registry: &TypeRegistry,
    vars: &mut FxHashMap<String, Ty>,
    ty: &TypeExpr,
    open_top: bool,
) -> Ty {
    convert_with_depth(ctx, registry, vars, ty, open_top, 0)
}

fn convert_with_depth(
    ctx: &mut InferCtx,
    registry: &TypeRegistry,
    vars: &mut FxHashMap<String, Ty>,
    ty: &TypeExpr,
    open_top: bool,
    depth: u32,
) -> Ty {
    if depth > MAX_ALIAS_DEPTH {
        return Ty::Error;
    }
    match ty {
        TypeExpr::Const { name, span } => {
            convert_named(ctx, registry, vars, name, &[], *span, depth)
        }
        TypeExpr::Var { name, .. } => vars
            .entry(name.clone())
            .or_insert_with(|| ctx.fresh_ty())
            .clone(),
        TypeExpr::App { name, args, span } => {
            convert_named(ctx, registry, vars, name, args, *span, depth)
        }
        TypeExpr::Fun { params, ret, .. } => {
            // Arrows are unary after desugaring; tolerate stray n-ary ones.
            let ret = convert_with_depth(ctx, registry, vars, ret, false, depth);
            params.iter().rev().fold(ret, |acc, p| {
                let p = convert_with_depth(ctx, registry, vars, p, false, depth);
                Ty::fun(p, acc)
            })
        }
        TypeExpr::Record { fields, .. } => {
            let fields = fields
                .iter()
                .map(|(n, t)| {
                    (
                        n.clone(),
                        convert_with_depth(ctx, registry, vars, t, false, depth),
                    )
                })
                .collect();
            if open_top {
                let row = ctx.fresh_var();
                Ty::Record(RecordTy::open(fields, row))
            } else {
                Ty::Record(RecordTy::closed(fields))
            }
        }
        TypeExpr::Tuple { items, .. } => Ty::Tuple(
            items
                .iter()
                .map(|t| convert_with_depth(ctx, registry, vars, t, false, depth))
                .collect(),
        ),
    }
}

fn convert_named(
    ctx: &mut InferCtx,
    registry: &TypeRegistry,
    vars: &mut FxHashMap<String, Ty>,
    name: &str,
    args: &[TypeExpr],
    span: Span,
    depth: u32,
) -> Ty {
    // A bare name that matches a variant parameter in scope is that
    // parameter, not a type constant.
    if args.is_empty() {
        if let Some(mapped) = vars.get(name) {
            return mapped.clone();
        }
    }
    if let Some(c) = TyConst::from_name(name) {
        return Ty::Const(c);
    }
    let converted_args: Vec<Ty> = args
        .iter()
        .map(|t| convert_with_depth(ctx, registry, vars, t, false, depth))
        .collect();
    if name == "Ref" && converted_args.len() == 1 {
        return Ty::Ref(Box::new(converted_args.into_iter().next().unwrap()));
    }
    if name == "List" {
        return Ty::Named {
            name: "List".to_string(),
            args: converted_args,
        };
    }
    if registry.variants.contains_key(name) || registry.opaque.contains(name) {
        return Ty::Named {
            name: name.to_string(),
            args: converted_args,
        };
    }
    if let Some(alias) = registry.aliases.get(name) {
        // Substitute the alias parameters, then convert the target.
        let mut alias_vars: FxHashMap<String, Ty> = FxHashMap::default();
        for (param, arg) in alias.params.iter().zip(converted_args) {
            alias_vars.insert(param.clone(), arg);
        }
        return convert_with_depth(ctx, registry, &mut alias_vars, &alias.target, false, depth + 1);
    }
    ctx.errors.push(TypeError::UnboundType {
        name: name.to_string(),
        span,
    });
    Ty::Error
}
