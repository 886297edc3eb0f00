//! Tarjan's strongly connected components over the module graph.
//!
//! Single pass, O(V+E). The resolver classifies each SCC afterwards: a
//! 1-node component with a self-edge is a self-import, a multi-node
//! component is a cycle.

use rustc_hash::FxHashMap;
use vibefun_common::ModulePath;

use crate::graph::ModuleGraph;

/// All strongly connected components, each a list of module paths.
/// Components come out in a deterministic order (driven by node insertion
/// order); nodes within a component keep Tarjan's stack order.
pub fn strongly_connected_components(graph: &ModuleGraph) -> Vec<Vec<ModulePath>> {
    let mut state = TarjanState {
        graph,
        index: 0,
        indices: FxHashMap::default(),
        lowlinks: FxHashMap::default(),
        on_stack: FxHashMap::default(),
        stack: Vec::new(),
        components: Vec::new(),
    };
    for node in graph.nodes() {
        if !state.indices.contains_key(node) {
            state.visit(node);
        }
    }
    state.components
}

struct TarjanState<'g> {
    graph: &'g ModuleGraph,
    index: u32,
    indices: FxHashMap<ModulePath, u32>,
    lowlinks: FxHashMap<ModulePath, u32>,
    on_stack: FxHashMap<ModulePath, bool>,
    stack: Vec<ModulePath>,
    components: Vec<Vec<ModulePath>>,
}

impl TarjanState<'_> {
    fn visit(&mut self, node: &ModulePath) {
        self.indices.insert(node.clone(), self.index);
        self.lowlinks.insert(node.clone(), self.index);
        self.index += 1;
        self.stack.push(node.clone());
        self.on_stack.insert(node.clone(), true);

        for edge in self.graph.edges_from(node) {
            let target = &edge.to;
            if !self.indices.contains_key(target) {
                self.visit(target);
                let target_low = self.lowlinks[target];
                let low = self.lowlinks.get_mut(node).expect("visited");
                *low = (*low).min(target_low);
            } else if self.on_stack.get(target).copied().unwrap_or(false) {
                let target_index = self.indices[target];
                let low = self.lowlinks.get_mut(node).expect("visited");
                *low = (*low).min(target_index);
            }
        }

        if self.lowlinks[node] == self.indices[node] {
            let mut component = Vec::new();
            loop {
                let popped = self.stack.pop().expect("stack underflow in Tarjan");
                self.on_stack.insert(popped.clone(), false);
                let done = &popped == node;
                component.push(popped);
                if done {
                    break;
                }
            }
            self.components.push(component);
        }
    }
}
