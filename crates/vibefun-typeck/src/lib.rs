//! Vibefun type checker: Hindley-Milner inference with extensions.
//!
//! Infers a type for every Core IR expression, generalizes let-bindings
//! under the syntactic value restriction, implements width subtyping for
//! records through row variables, registers nominal variants with curried
//! constructors, and checks pattern matches for exhaustiveness and
//! reachability.
//!
//! # Architecture
//!
//! - [`ty`]: type representation (Ty, TyVar, RecordTy, Scheme)
//! - [`unify`]: unification with occurs check, levels, and rows
//! - [`env`]: scope-stack type environment with binding kinds
//! - [`registry`]: variant/alias/opaque type registry and surface-type
//!   conversion
//! - [`infer`]: the inference walker
//! - [`exhaustiveness`]: Maranget-style match analysis
//! - [`specialize`]: post-typing `Divide` specialization
//! - [`error`] / [`diagnostics`]: error values and their `VF1xxx` codes

pub mod diagnostics;
pub mod env;
pub mod error;
pub mod exhaustiveness;
pub mod infer;
pub mod registry;
pub mod specialize;
pub mod ty;
pub mod unify;

use rustc_hash::FxHashMap;
use vibefun_common::{Diagnostic, ModulePath, SourceMap};
use vibefun_core::{CoreModule, NodeId};

pub use env::BindingKind;
pub use error::TypeError;
pub use registry::{TypeRegistry, VariantDef};
pub use ty::{Scheme, Ty};

/// The typed symbols one module exposes to its importers. Schemes are
/// canonical (detached from any unification table).
#[derive(Debug, Default, Clone)]
pub struct ModuleExports {
    pub values: FxHashMap<String, ExportedValue>,
    pub types: FxHashMap<String, ExportedType>,
}

#[derive(Debug, Clone)]
pub struct ExportedValue {
    pub scheme: Scheme,
    pub kind: BindingKind,
}

#[derive(Debug, Clone)]
pub enum ExportedType {
    Variant(VariantDef),
    Alias {
        params: Vec<String>,
        target: vibefun_ast::TypeExpr,
    },
    Opaque,
}

/// Exports of every already-checked dependency module, keyed by canonical
/// path. Built by the driver in compile order.
#[derive(Debug, Default)]
pub struct ImportContext {
    pub exports: FxHashMap<ModulePath, ModuleExports>,
}

/// The result of type checking one module.
pub struct TypeckResult {
    /// The Core module with every `Divide` specialized.
    pub module: CoreModule,
    /// Fully substituted type of every expression node.
    pub types: FxHashMap<NodeId, Ty>,
    /// Resolution of every variable reference node.
    pub resolutions: FxHashMap<NodeId, BindingKind>,
    /// Variant/alias registry (local and imported types).
    pub registry: TypeRegistry,
    /// This module's exports for downstream modules.
    pub exports: ModuleExports,
    /// Raw errors and warnings, in discovery order.
    pub errors: Vec<TypeError>,
    /// The same problems as diagnostic values with stable codes.
    pub diagnostics: Vec<Diagnostic>,
}

impl TypeckResult {
    /// Whether checking produced any hard error (warnings excluded).
    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(|e| !e.is_warning())
    }
}

/// Type-check a desugared module.
///
/// `import_targets` maps this module's import strings to canonical paths;
/// `imports` carries the exports of already-checked dependencies.
pub fn check_module(
    module: &CoreModule,
    import_targets: Option<&FxHashMap<String, ModulePath>>,
    imports: &ImportContext,
    sources: &SourceMap,
) -> TypeckResult {
    let outcome = infer::infer_module(module, import_targets, imports);
    let specialized = specialize::specialize_divides(module, &outcome.types);
    let diagnostics = outcome
        .errors
        .iter()
        .map(|e| diagnostics::to_diagnostic(e, &module.path, sources))
        .collect();
    TypeckResult {
        module: specialized,
        types: outcome.types,
        resolutions: outcome.resolutions,
        registry: outcome.registry,
        exports: outcome.exports,
        errors: outcome.errors,
        diagnostics,
    }
}
