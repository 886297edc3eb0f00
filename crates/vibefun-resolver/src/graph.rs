//! The module dependency graph.
//!
//! Nodes are canonical module paths; edges carry whether the connection is
//! type-only, whether it came from a re-export, and the span of the import
//! statement that created it. Multiple imports between the same pair of
//! modules merge into a single edge: value wins over type, and the first
//! import's span is retained.

use rustc_hash::FxHashMap;
use serde::Serialize;
use vibefun_common::{ModulePath, Span};

/// A directed edge in the module graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub to: ModulePath,
    /// True iff every import item contributing to this edge is type-only.
    pub is_type_only: bool,
    /// True iff every contributing declaration is a re-export.
    pub is_re_export: bool,
    /// Span of the first import statement that created this edge, in the
    /// source of the `from` module.
    pub import_span: Span,
}

/// A directed graph of modules keyed by canonical path.
///
/// Nodes are stored in insertion order; out-edges per node likewise. The
/// graph is built once by the resolver and read-only afterwards.
#[derive(Debug, Default)]
pub struct ModuleGraph {
    nodes: Vec<ModulePath>,
    edges: FxHashMap<ModulePath, Vec<Edge>>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node if not already present.
    pub fn add_node(&mut self, path: ModulePath) {
        if !self.edges.contains_key(&path) {
            self.edges.insert(path.clone(), Vec::new());
            self.nodes.push(path);
        }
    }

    /// Add or merge an edge.
    ///
    /// If an edge `from -> to` already exists, the flags merge (value wins
    /// over type; a plain import demotes the re-export flag) and the first
    /// span is kept.
    pub fn add_edge(
        &mut self,
        from: &ModulePath,
        to: ModulePath,
        is_type_only: bool,
        is_re_export: bool,
        import_span: Span,
    ) {
        self.add_node(from.clone());
        self.add_node(to.clone());
        let out = self.edges.get_mut(from).expect("node just added");
        if let Some(existing) = out.iter_mut().find(|e| e.to == to) {
            existing.is_type_only = existing.is_type_only && is_type_only;
            existing.is_re_export = existing.is_re_export && is_re_export;
            return;
        }
        out.push(Edge {
            to,
            is_type_only,
            is_re_export,
            import_span,
        });
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[ModulePath] {
        &self.nodes
    }

    /// Out-edges of a node, in insertion order. Empty for unknown nodes.
    pub fn edges_from(&self, path: &ModulePath) -> &[Edge] {
        self.edges.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Look up the edge `from -> to`, if any.
    pub fn edge(&self, from: &ModulePath, to: &ModulePath) -> Option<&Edge> {
        self.edges_from(from).iter().find(|e| &e.to == to)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
