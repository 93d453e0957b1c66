//! The checker: component C4-C9 of the semantic analysis pass.

pub mod check_expr;
pub mod check_stmt;
pub mod diagnostics;
pub mod driver;
pub mod symbols;
pub mod type_resolve;

use std::collections::HashMap;

use tyla_ast::{Binding, Program, Span};
use tyla_builtins::Catalog;
use tyla_types::Type;

pub use diagnostics::Diagnostic;

/// One-shot checker state for a single `check_program` invocation. Never
/// reused across programs — the symbol table and return-types stack are
/// instance state, not process-wide globals.
pub struct Checker {
    pub symbols: symbols::SymbolTable,
    pub catalog: Catalog,
    return_stack: Vec<Vec<Type>>,
    module_fields: HashMap<String, Span>,
    main_module: Option<String>,
    file: String,
}

impl Checker {
    pub fn new(file: impl Into<String>) -> Self {
        let mut symbols = symbols::SymbolTable::new();
        let catalog = Catalog::standard();
        install_primitives(&mut symbols);
        install_builtins(&mut symbols, &catalog);
        Self {
            symbols,
            catalog,
            return_stack: Vec::new(),
            module_fields: HashMap::new(),
            main_module: None,
            file: file.into(),
        }
    }

    pub fn scope_error(&self, span: Span, message: impl Into<String>) -> Diagnostic {
        Diagnostic::scope_error(&self.file, span, message)
    }

    pub fn type_error(&self, span: Span, message: impl Into<String>) -> Diagnostic {
        Diagnostic::type_error(&self.file, span, message)
    }

    pub fn push_return_types(&mut self, types: Vec<Type>) {
        self.return_stack.push(types);
    }

    pub fn pop_return_types(&mut self) {
        self.return_stack.pop();
    }

    pub fn current_return_types(&self) -> &[Type] {
        self.return_stack
            .last()
            .expect("return-types stack is non-empty while checking a function or the program body")
    }

    /// Registers `decl_name` as the program's main module. Returns an error
    /// if a main module has already been registered.
    pub fn register_main_module(&mut self, decl_name: &str, span: Span) -> Result<(), Diagnostic> {
        if self.main_module.is_some() {
            return Err(self.scope_error(span, "only one main module declaration is allowed per program"));
        }
        self.main_module = Some(decl_name.to_string());
        Ok(())
    }

    pub fn main_module_name(&self) -> Option<&str> {
        self.main_module.as_deref()
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// Rejects a second registration of the same `modname.field` combined
    /// name, per the module's declared field map (distinct from ordinary
    /// scope shadowing, which the symbol table allows).
    pub fn register_module_field(&mut self, combined_name: &str, span: Span) -> Result<(), Diagnostic> {
        if let Some(_prior) = self.module_fields.get(combined_name) {
            return Err(self.type_error(span, format!("duplicate module field '{}'", combined_name)));
        }
        self.module_fields.insert(combined_name.to_string(), span);
        Ok(())
    }

    /// Pushes a fresh symbol-table scope, runs `f` with access to the whole
    /// checker (not just the symbol table, unlike `SymbolTable::with_block`),
    /// and pops the scope on every exit path including an error from `f`.
    pub fn with_block<T>(&mut self, f: impl FnOnce(&mut Checker) -> Result<T, Diagnostic>) -> Result<T, Diagnostic> {
        self.symbols.push_scope();
        let result = f(self);
        self.symbols.pop_scope();
        result
    }
}

fn install_primitives(symbols: &mut symbols::SymbolTable) {
    symbols.add_symbol("any", Binding::Type(Type::Any));
    symbols.add_symbol("boolean", Binding::Type(Type::Boolean));
    symbols.add_symbol("float", Binding::Type(Type::Float));
    symbols.add_symbol("integer", Binding::Type(Type::Integer));
}

fn install_builtins(symbols: &mut symbols::SymbolTable, catalog: &Catalog) {
    for name in catalog.functions.keys() {
        if !name.contains('.') {
            symbols.add_symbol(name.clone(), Binding::Builtin(name.clone()));
        }
    }
    for name in &catalog.modules {
        symbols.add_symbol(name.clone(), Binding::Module { name: name.clone(), is_main: false });
    }
}

/// Entry point: checks `program` as a single compilation unit. `file` names
/// the unit for diagnostic rendering.
pub fn check_program(program: Program, file: &str) -> Result<Program, Diagnostic> {
    let mut checker = Checker::new(file);
    driver::check_program(&mut checker, program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_and_builtins_are_preinstalled() {
        let checker = Checker::new("test.tl");
        assert_eq!(checker.symbols.find_symbol("integer"), Some(&Binding::Type(Type::Integer)));
        assert!(matches!(checker.symbols.find_symbol("io"), Some(Binding::Module { is_main: false, .. })));
        assert!(matches!(checker.symbols.find_symbol("print"), Some(Binding::Builtin(_))));
        assert_eq!(checker.symbols.find_symbol("io.write"), None);
    }

    #[test]
    fn only_one_main_module_allowed() {
        let mut checker = Checker::new("test.tl");
        checker.register_main_module("m", Span::new(1, 1)).unwrap();
        let err = checker.register_main_module("n", Span::new(2, 1)).unwrap_err();
        assert_eq!(err.category(), "scope error");
    }

    #[test]
    fn with_block_pops_its_scope_even_on_error() {
        let mut checker = Checker::new("test.tl");
        let result: Result<(), Diagnostic> = checker.with_block(|inner| {
            inner.symbols.add_symbol("local_only", Binding::Type(Type::Integer));
            Err(inner.scope_error(Span::new(1, 1), "boom"))
        });
        assert!(result.is_err());
        assert_eq!(checker.symbols.find_symbol("local_only"), None);
    }
}
