//! Import name extraction and conflict detection.
//!
//! Each module's import declarations bind a set of local names (alias if
//! present, else the original name). Conflicts:
//!
//! - the same local name imported from two different source modules is
//!   `ImportConflictDuplicate` (VF5002);
//! - a local declaration binding a name that is also imported is
//!   `ImportConflictShadowing` (VF5003);
//! - a type-only and a value import of the same name from the same source
//!   merge silently, value wins;
//! - two star re-exports whose exported sets overlap are
//!   `ImportConflictDuplicate` at the re-exporting module.

use rustc_hash::FxHashMap;
use vibefun_ast::{Decl, Module, TypeDef};
use vibefun_common::{codes, Diagnostic, ModulePath, SourceMap, Span};

/// One imported local name with its provenance.
#[derive(Debug, Clone)]
pub struct ImportedName {
    /// Canonical path of the source module (or the raw source string when
    /// the loader did not resolve it).
    pub source: String,
    pub span: Span,
    pub is_type: bool,
}

/// Extract the local import-name table for a module, reporting duplicate
/// conflicts along the way.
pub fn imported_names(
    path: &ModulePath,
    module: &Module,
    targets: Option<&FxHashMap<String, ModulePath>>,
    sources: &SourceMap,
    diagnostics: &mut Vec<Diagnostic>,
) -> FxHashMap<String, ImportedName> {
    let mut names: FxHashMap<String, ImportedName> = FxHashMap::default();
    for import in &module.imports {
        let resolved = targets
            .and_then(|t| t.get(&import.source))
            .map(|p| p.as_str().to_string())
            .unwrap_or_else(|| import.source.clone());
        for item in &import.items {
            let local = item.local_name().to_string();
            match names.get_mut(&local) {
                None => {
                    names.insert(
                        local,
                        ImportedName {
                            source: resolved.clone(),
                            span: item.span,
                            is_type: item.is_type,
                        },
                    );
                }
                Some(existing) if existing.source == resolved => {
                    // Same name, same source: type + value merge, value wins.
                    existing.is_type = existing.is_type && item.is_type;
                }
                Some(existing) => {
                    diagnostics.push(
                        Diagnostic::error(
                            codes::IMPORT_CONFLICT_DUPLICATE,
                            sources.location(path, item.span),
                            format!(
                                "`{}` is imported from both `{}` and `{}`",
                                local, existing.source, resolved
                            ),
                        )
                        .with_hint("rename one of the imports with `as`")
                        .with_secondary(sources.location(path, existing.span)),
                    );
                }
            }
        }
    }
    names
}

/// Report local declarations that shadow an imported name.
pub fn check_shadowing(
    path: &ModulePath,
    module: &Module,
    imported: &FxHashMap<String, ImportedName>,
    sources: &SourceMap,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut report = |name: &str, span: Span, want_type: bool| {
        if let Some(existing) = imported.get(name) {
            if existing.is_type == want_type {
                diagnostics.push(
                    Diagnostic::error(
                        codes::IMPORT_CONFLICT_SHADOWING,
                        sources.location(path, span),
                        format!("`{name}` is declared here but also imported from `{}`", existing.source),
                    )
                    .with_secondary(sources.location(path, existing.span)),
                );
            }
        }
    };

    for decl in &module.decls {
        match decl {
            Decl::Let(d) => {
                for name in d.pattern.bound_names() {
                    report(&name, d.span, false);
                }
            }
            Decl::LetRecGroup(g) => {
                for b in &g.bindings {
                    report(&b.name, b.span, false);
                }
            }
            Decl::External(e) => report(&e.name, e.span, false),
            Decl::Type(t) => {
                report(&t.name, t.span, true);
                // Variant constructors bind value names.
                if let TypeDef::Variant(cases) = &t.def {
                    for c in cases {
                        report(&c.name, c.span, false);
                    }
                }
            }
            Decl::ExternalType(t) => report(&t.name, t.span, true),
            Decl::ReExport(_) => {}
        }
    }
}

/// The value names a module exports, sorted. Used to detect overlapping
/// star re-exports.
pub fn exported_value_names(module: &Module) -> Vec<String> {
    let mut out = Vec::new();
    for decl in &module.decls {
        match decl {
            Decl::Let(d) if d.exported => out.extend(d.pattern.bound_names()),
            Decl::LetRecGroup(g) => {
                out.extend(g.bindings.iter().filter(|b| b.exported).map(|b| b.name.clone()));
            }
            Decl::External(e) if e.exported => out.push(e.name.clone()),
            _ => {}
        }
    }
    out.sort();
    out.dedup();
    out
}

/// Report overlapping star re-exports (`export * from …` twice with
/// intersecting exported sets).
pub fn check_star_re_exports(
    path: &ModulePath,
    module: &Module,
    targets: Option<&FxHashMap<String, ModulePath>>,
    modules: &FxHashMap<ModulePath, Module>,
    sources: &SourceMap,
    diagnostics: &mut Vec<Diagnostic>,
) {
    // (resolved target, span, exported names)
    let mut stars: Vec<(String, Span, Vec<String>)> = Vec::new();
    for decl in &module.decls {
        let Decl::ReExport(re) = decl else { continue };
        if re.items.is_some() {
            continue;
        }
        let resolved = targets.and_then(|t| t.get(&re.source));
        let names = resolved
            .and_then(|p| modules.get(p))
            .map(exported_value_names)
            .unwrap_or_default();
        let source = resolved
            .map(|p| p.as_str().to_string())
            .unwrap_or_else(|| re.source.clone());

        for (prev_source, prev_span, prev_names) in &stars {
            if prev_source == &source {
                continue;
            }
            if let Some(name) = names.iter().find(|n| prev_names.binary_search(*n).is_ok()) {
                diagnostics.push(
                    Diagnostic::error(
                        codes::IMPORT_CONFLICT_DUPLICATE,
                        sources.location(path, re.span),
                        format!(
                            "`{name}` is re-exported from both `{prev_source}` and `{source}`"
                        ),
                    )
                    .with_hint("re-export the conflicting names explicitly")
                    .with_secondary(sources.location(path, *prev_span)),
                );
                break;
            }
        }
        stars.push((source, re.span, names));
    }
}
