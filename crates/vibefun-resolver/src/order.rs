//! Topological ordering of the module graph.
//!
//! Kahn's algorithm on the reverse graph, so modules with no imports come
//! out first and the entry point last. Ties break alphabetically to make
//! the order deterministic. When cycles exist, the still-unordered modules
//! are appended in alphabetical order after the acyclic prefix.

use std::collections::BinaryHeap;
use std::cmp::Reverse;

use rustc_hash::FxHashMap;
use vibefun_common::ModulePath;

use crate::graph::ModuleGraph;

/// The compile order plus whether cycles forced an alphabetical remainder.
#[derive(Debug)]
pub struct TopoOrder {
    pub order: Vec<ModulePath>,
    pub had_cycles: bool,
}

/// Order modules leaves-first. Self-edges are ignored (they are reported
/// as errors elsewhere and must not wedge the queue).
pub fn topological_order(graph: &ModuleGraph) -> TopoOrder {
    // in_degree[m] = number of modules m imports (ignoring self-edges).
    let mut in_degree: FxHashMap<&ModulePath, usize> = FxHashMap::default();
    // dependents[t] = modules that import t.
    let mut dependents: FxHashMap<&ModulePath, Vec<&ModulePath>> = FxHashMap::default();

    for node in graph.nodes() {
        in_degree.entry(node).or_insert(0);
        for edge in graph.edges_from(node) {
            if &edge.to == node {
                continue;
            }
            *in_degree.entry(node).or_insert(0) += 1;
            dependents.entry(&edge.to).or_default().push(node);
        }
    }

    // Min-heap on path text for alphabetical tie-breaking.
    let mut ready: BinaryHeap<Reverse<&ModulePath>> = in_degree
        .iter()
        .filter(|(_, &deg)| deg == 0)
        .map(|(&path, _)| Reverse(path))
        .collect();

    let mut order: Vec<ModulePath> = Vec::with_capacity(graph.node_count());
    while let Some(Reverse(path)) = ready.pop() {
        order.push(path.clone());
        if let Some(deps) = dependents.get(path) {
            for &dependent in deps {
                let deg = in_degree.get_mut(dependent).expect("all nodes seeded");
                *deg -= 1;
                if *deg == 0 {
                    ready.push(Reverse(dependent));
                }
            }
        }
    }

    let had_cycles = order.len() != graph.node_count();
    if had_cycles {
        let mut rest: Vec<ModulePath> = in_degree
            .iter()
            .filter(|(_, &deg)| deg > 0)
            .map(|(&path, _)| path.clone())
            .collect();
        rest.sort();
        order.extend(rest);
    }

    TopoOrder { order, had_cycles }
}
