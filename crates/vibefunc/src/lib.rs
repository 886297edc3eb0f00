//! The Vibefun compiler driver.
//!
//! Wires the pipeline together: module resolution, desugaring, type
//! checking (in dependency order, threading exports), match analysis, and
//! ES2020 emission. The pipeline is a pure function of its input
//! ([`compile`]); file I/O and diagnostic rendering live at the edges
//! ([`render`], the CLI in `main.rs`).
//!
//! The surface parser is an external collaborator: a compilation unit
//! arrives as data ([`CompilerInput`], deserializable from JSON) holding
//! parsed module ASTs, per-module import resolution, the entry point, and
//! any loader-precomputed warnings.

pub mod render;

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use vibefun_ast::Module;
use vibefun_common::{Diagnostic, ModulePath, Severity, SourceMap};
use vibefun_core::desugar_module;
use vibefun_resolver::{resolve, ResolverInput};
use vibefun_typeck::{check_module, ImportContext, ModuleExports};

/// One parsed module plus its source text (used for line/column
/// resolution and source excerpts in rendered diagnostics).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleEntry {
    pub ast: Module,
    #[serde(default)]
    pub source: String,
}

/// Everything the external loader hands the compiler core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerInput {
    /// Canonical path -> parsed module.
    pub modules: BTreeMap<ModulePath, ModuleEntry>,
    /// Canonical path -> (import path as written -> canonical target).
    #[serde(default)]
    pub import_resolution: BTreeMap<ModulePath, BTreeMap<String, ModulePath>>,
    pub entry: ModulePath,
    /// Warnings precomputed by the loader (case sensitivity and the
    /// like), surfaced verbatim.
    #[serde(default)]
    pub warnings: Vec<Diagnostic>,
}

/// The outcome of one compilation.
#[derive(Debug)]
pub struct CompileResult {
    /// Emitted JS per module, in compilation order. Empty when any
    /// diagnostic is an error.
    pub outputs: Vec<(ModulePath, String)>,
    pub diagnostics: Vec<Diagnostic>,
    /// The deterministic compilation order (useful to tooling even when
    /// compilation fails).
    pub order: Vec<ModulePath>,
    pub success: bool,
}

/// Run the full pipeline over an in-memory compilation unit.
pub fn compile(input: &CompilerInput) -> CompileResult {
    // Source map for locations and rendering.
    let mut sources = SourceMap::new();
    for (path, entry) in &input.modules {
        sources.add(path.clone(), entry.source.clone());
    }

    // Resolver input views.
    let modules: FxHashMap<ModulePath, Module> = input
        .modules
        .iter()
        .map(|(path, entry)| (path.clone(), entry.ast.clone()))
        .collect();
    let import_targets: FxHashMap<ModulePath, FxHashMap<String, ModulePath>> = input
        .import_resolution
        .iter()
        .map(|(path, targets)| {
            (
                path.clone(),
                targets
                    .iter()
                    .map(|(s, t)| (s.clone(), t.clone()))
                    .collect(),
            )
        })
        .collect();

    let resolution = resolve(&ResolverInput {
        modules: &modules,
        import_targets: &import_targets,
        entry: &input.entry,
        warnings: &input.warnings,
        sources: &sources,
    });

    let mut diagnostics = resolution.diagnostics.clone();

    // Desugar and type-check in dependency order, threading exports.
    let mut import_ctx = ImportContext::default();
    let mut checked = Vec::new();
    for path in &resolution.order {
        let Some(module) = modules.get(path) else {
            continue;
        };
        let targets = import_targets.get(path);
        let core = desugar_module(path, module);
        let result = check_module(&core, targets, &import_ctx, &sources);
        diagnostics.extend(result.diagnostics.iter().cloned());

        let mut exports = result.exports.clone();
        relay_re_exports(&result.module, targets, &import_ctx, &mut exports);
        import_ctx.exports.insert(path.clone(), exports);
        checked.push((path.clone(), result));
    }

    let success = !diagnostics
        .iter()
        .any(|d| d.severity == Severity::Error);

    // Errors suppress all output; warnings never do.
    let outputs = if success {
        checked
            .iter()
            .map(|(path, result)| {
                (
                    path.clone(),
                    vibefun_codegen::emit_module(&result.module, result),
                )
            })
            .collect()
    } else {
        Vec::new()
    };

    CompileResult {
        outputs,
        diagnostics,
        order: resolution.order,
        success,
    }
}

/// Fold re-exported names from source modules into this module's export
/// set (star re-exports take everything; named re-exports take the listed
/// value items, honoring aliases).
fn relay_re_exports(
    module: &vibefun_core::CoreModule,
    targets: Option<&FxHashMap<String, ModulePath>>,
    import_ctx: &ImportContext,
    exports: &mut ModuleExports,
) {
    for re in &module.re_exports {
        let Some(target) = targets.and_then(|t| t.get(&re.source)) else {
            continue;
        };
        let Some(source_exports) = import_ctx.exports.get(target) else {
            continue;
        };
        match &re.items {
            None => {
                for (name, value) in &source_exports.values {
                    exports.values.entry(name.clone()).or_insert_with(|| value.clone());
                }
            }
            Some(items) => {
                for item in items {
                    if item.is_type {
                        if let Some(ty) = source_exports.types.get(&item.name) {
                            exports
                                .types
                                .insert(item.local_name().to_string(), ty.clone());
                        }
                        continue;
                    }
                    if let Some(value) = source_exports.values.get(&item.name) {
                        exports
                            .values
                            .insert(item.local_name().to_string(), value.clone());
                    }
                }
            }
        }
    }
}
