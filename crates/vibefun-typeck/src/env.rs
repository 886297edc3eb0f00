//! Type environment with a scope stack.
//!
//! Maps variable names to their type schemes plus the kind of binding
//! (local, top-level, imported, external, constructor). Entering a scope
//! pushes a frame; leaving pops it; lookups search innermost-out.

use rustc_hash::FxHashMap;

use crate::ty::Scheme;

/// How a name came into scope. Carried through to codegen so variable
/// references can be resolved to their declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingKind {
    /// Lambda parameter or block-level let.
    Local,
    /// Module top-level let or let-rec binding.
    TopLevel,
    /// Imported from another module.
    Import,
    /// An `external` declaration; codegen emits the JS name verbatim.
    External {
        js_name: String,
        from: Option<String>,
    },
    /// A variant constructor with its arity and owning type.
    Constructor { type_name: String, arity: usize },
    /// The built-in `ref` cell constructor.
    Builtin,
}

#[derive(Debug, Clone)]
pub struct Binding {
    pub scheme: Scheme,
    pub kind: BindingKind,
}

/// A stack of scopes mapping names to bindings. Index 0 is the module
/// (global) scope.
pub struct TypeEnv {
    scopes: Vec<FxHashMap<String, Binding>>,
}

impl TypeEnv {
    pub fn new() -> Self {
        TypeEnv {
            scopes: vec![FxHashMap::default()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// # Panics
    ///
    /// Panics if called when only the global scope remains.
    pub fn pop_scope(&mut self) {
        assert!(self.scopes.len() > 1, "cannot pop the global scope");
        self.scopes.pop();
    }

    /// Insert a binding into the current (topmost) scope.
    pub fn insert(&mut self, name: String, scheme: Scheme, kind: BindingKind) {
        self.scopes
            .last_mut()
            .expect("scope stack is never empty")
            .insert(name, Binding { scheme, kind });
    }

    /// Look up a name, innermost scope first.
    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }
}

impl Default for TypeEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::Ty;

    #[test]
    fn shadowing_and_scope_cleanup() {
        let mut env = TypeEnv::new();
        env.insert("x".into(), Scheme::mono(Ty::int()), BindingKind::TopLevel);

        env.push_scope();
        env.insert("x".into(), Scheme::mono(Ty::string()), BindingKind::Local);
        assert_eq!(env.lookup("x").unwrap().scheme.ty, Ty::string());
        assert_eq!(env.lookup("x").unwrap().kind, BindingKind::Local);

        env.pop_scope();
        assert_eq!(env.lookup("x").unwrap().scheme.ty, Ty::int());
        assert!(env.lookup("y").is_none());
    }

    #[test]
    #[should_panic(expected = "cannot pop the global scope")]
    fn popping_global_scope_panics() {
        let mut env = TypeEnv::new();
        env.pop_scope();
    }
}
