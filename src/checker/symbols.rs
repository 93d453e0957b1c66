//! Block-scoped symbol table.
//!
//! A stack of scopes, innermost last. Lookup walks the stack from the top;
//! there is no shadow-rejection across scopes — an inner `add_symbol` simply
//! shadows an outer one for the remainder of that scope's lifetime.

use std::collections::HashMap;

use tyla_ast::Binding;

#[derive(Debug, Default)]
pub struct SymbolTable {
    scopes: Vec<HashMap<String, Binding>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self { scopes: vec![HashMap::new()] }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
        debug_assert!(!self.scopes.is_empty(), "popped the root scope");
    }

    pub fn add_symbol(&mut self, name: impl Into<String>, binding: Binding) {
        self.scopes
            .last_mut()
            .expect("symbol table always has a root scope")
            .insert(name.into(), binding);
    }

    pub fn find_symbol(&self, name: &str) -> Option<&Binding> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Number of scopes currently on the stack. The root scope alone is
    /// depth 1; a `Decl` checked at that depth binds as a global.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Push a fresh scope, run `f`, and pop on every exit path — including
    /// an error return from `f`.
    pub fn with_block<T, E>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E> {
        self.push_scope();
        let result = f(self);
        self.pop_scope();
        result
    }
}
