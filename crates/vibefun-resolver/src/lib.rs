//! Module resolution for the Vibefun compiler.
//!
//! Given the loader's output (parsed modules keyed by canonical path, plus
//! per-module import resolution), the resolver builds the typed dependency
//! graph, detects self-imports, import conflicts, and cycles, and produces
//! the deterministic compilation order.
//!
//! The resolver is total: structurally valid input never panics. All
//! problems come out as [`Diagnostic`] values -- errors for self-imports
//! and import conflicts, warnings for value cycles; type-only cycles are
//! reported to tooling through [`Resolution::cycles`] but produce no
//! diagnostic.

pub mod conflicts;
pub mod graph;
pub mod order;
pub mod scc;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use vibefun_ast::Module;
use vibefun_common::{codes, Diagnostic, ModulePath, SourceMap};

pub use graph::{Edge, ModuleGraph};
pub use order::TopoOrder;

/// What the external loader hands the resolver (§6.1 of the language
/// contract): parsed modules, resolved import targets, the entry point,
/// and any warnings the loader pre-computed (case-sensitivity and the
/// like), surfaced verbatim at the front of the diagnostic stream.
pub struct ResolverInput<'a> {
    pub modules: &'a FxHashMap<ModulePath, Module>,
    /// module path -> (import path as written -> canonical target path).
    pub import_targets: &'a FxHashMap<ModulePath, FxHashMap<String, ModulePath>>,
    pub entry: &'a ModulePath,
    pub warnings: &'a [Diagnostic],
    pub sources: &'a SourceMap,
}

/// A dependency cycle, with the deterministic representative path
/// (first element repeated at the end).
#[derive(Debug, Clone, Serialize)]
pub struct CycleInfo {
    pub path: Vec<ModulePath>,
    /// True iff every edge along the representative path is type-only.
    pub is_type_only: bool,
}

/// Everything the resolver produces.
#[derive(Debug)]
pub struct Resolution {
    pub graph: ModuleGraph,
    /// Compilation order, leaves first; cyclic remainder appended
    /// alphabetically.
    pub order: Vec<ModulePath>,
    pub had_cycles: bool,
    /// All cycles, including silent type-only ones, for tooling.
    pub cycles: Vec<CycleInfo>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Resolve a set of modules: build the graph, detect conflicts and cycles,
/// and compute the compile order.
pub fn resolve(input: &ResolverInput) -> Resolution {
    let mut diagnostics: Vec<Diagnostic> = input.warnings.to_vec();

    // Deterministic module iteration order.
    let mut paths: Vec<&ModulePath> = input.modules.keys().collect();
    paths.sort();

    // Per-module conflict detection.
    for path in &paths {
        let module = &input.modules[*path];
        let targets = input.import_targets.get(*path);
        let imported =
            conflicts::imported_names(path, module, targets, input.sources, &mut diagnostics);
        conflicts::check_shadowing(path, module, &imported, input.sources, &mut diagnostics);
        conflicts::check_star_re_exports(
            path,
            module,
            targets,
            input.modules,
            input.sources,
            &mut diagnostics,
        );
    }

    // Graph construction. Nodes seed in sorted order so every downstream
    // iteration is deterministic.
    let mut graph = ModuleGraph::new();
    for path in &paths {
        graph.add_node((*path).clone());
    }
    for path in &paths {
        let module = &input.modules[*path];
        let targets = input.import_targets.get(*path);
        for import in &module.imports {
            if let Some(target) = targets.and_then(|t| t.get(&import.source)) {
                graph.add_edge(path, target.clone(), import.is_type_only(), false, import.span);
            }
        }
        for decl in &module.decls {
            if let vibefun_ast::Decl::ReExport(re) = decl {
                if let Some(target) = targets.and_then(|t| t.get(&re.source)) {
                    graph.add_edge(path, target.clone(), re.is_type_only(), true, re.span);
                }
            }
        }
    }

    // Self-imports and cycles via Tarjan.
    let mut cycles = Vec::new();
    for component in scc::strongly_connected_components(&graph) {
        if component.len() == 1 {
            let node = &component[0];
            if let Some(edge) = graph.edge(node, node) {
                diagnostics.push(Diagnostic::error(
                    codes::SELF_IMPORT,
                    input.sources.location(node, edge.import_span),
                    format!("module `{}` imports itself", node.file_name()),
                ));
            }
            continue;
        }
        let path = representative_path(&graph, &component);
        let is_type_only = path_is_type_only(&graph, &path);
        if !is_type_only {
            let display: Vec<&str> = path.iter().map(|m| m.file_name()).collect();
            let first_edge = graph
                .edge(&path[0], &path[1])
                .expect("representative path follows existing edges");
            diagnostics.push(Diagnostic::warning(
                codes::CIRCULAR_DEPENDENCY,
                input.sources.location(&path[0], first_edge.import_span),
                format!("circular dependency: {}", display.join(" \u{2192} ")),
            ));
        }
        cycles.push(CycleInfo { path, is_type_only });
    }

    let TopoOrder { order, had_cycles } = order::topological_order(&graph);

    Resolution {
        graph,
        order,
        had_cycles,
        cycles,
        diagnostics,
    }
}

/// The deterministic representative path of a multi-node SCC: a DFS from
/// the alphabetically smallest member, following forward edges within the
/// component (alphabetically by target) until it returns to the start.
fn representative_path(graph: &ModuleGraph, component: &[ModulePath]) -> Vec<ModulePath> {
    let members: FxHashSet<&ModulePath> = component.iter().collect();
    let start = component.iter().min().expect("component is non-empty");

    let mut path = vec![start.clone()];
    let mut visited: FxHashSet<&ModulePath> = FxHashSet::default();
    visited.insert(start);

    if dfs_to_start(graph, &members, start, start, &mut visited, &mut path) {
        path.push(start.clone());
        return path;
    }
    // Unreachable for a genuine SCC; fall back to the membership list so
    // the function stays total.
    let mut fallback = component.to_vec();
    fallback.sort();
    fallback.push(fallback[0].clone());
    fallback
}

fn dfs_to_start<'g>(
    graph: &'g ModuleGraph,
    members: &FxHashSet<&ModulePath>,
    start: &ModulePath,
    current: &'g ModulePath,
    visited: &mut FxHashSet<&'g ModulePath>,
    path: &mut Vec<ModulePath>,
) -> bool {
    let mut targets: Vec<&ModulePath> = graph
        .edges_from(current)
        .iter()
        .map(|e| &e.to)
        .filter(|t| members.contains(t))
        .collect();
    targets.sort();

    for target in targets {
        if target == start {
            // A closing edge counts only after visiting at least one other
            // member; a self-edge on the start node is not the cycle.
            if path.len() > 1 {
                return true;
            }
            continue;
        }
        if visited.contains(target) {
            continue;
        }
        visited.insert(target);
        path.push(target.clone());
        if dfs_to_start(graph, members, start, target, visited, path) {
            return true;
        }
        path.pop();
    }
    false
}

fn path_is_type_only(graph: &ModuleGraph, path: &[ModulePath]) -> bool {
    path.windows(2).all(|pair| {
        graph
            .edge(&pair[0], &pair[1])
            .map(|e| e.is_type_only)
            .unwrap_or(false)
    })
}
