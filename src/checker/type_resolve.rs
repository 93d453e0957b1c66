//! Type resolver (C6): turns a syntactic `TypeNode` into a semantic `Type`.

use std::collections::HashSet;

use tyla_ast::{Binding, TypeNode, TypeNodeKind};
use tyla_types::{FunctionType, Type};

use super::diagnostics::Diagnostic;
use super::symbols::SymbolTable;

pub fn resolve_type(symbols: &SymbolTable, file: &str, node: &TypeNode) -> Result<Type, Diagnostic> {
    match &node.kind {
        TypeNodeKind::Nil => Ok(Type::Nil),
        TypeNodeKind::Module => Ok(Type::Module),
        TypeNodeKind::Name(name) => resolve_name(symbols, file, node, name),
        TypeNodeKind::Array(elem) => Ok(Type::Array(Box::new(resolve_type(symbols, file, elem)?))),
        TypeNodeKind::Table(fields) => resolve_table(symbols, file, node, fields),
        TypeNodeKind::Function(args, rets) => {
            let args = args
                .iter()
                .map(|a| resolve_type(symbols, file, a))
                .collect::<Result<Vec<_>, _>>()?;
            let rets = rets
                .iter()
                .map(|r| resolve_type(symbols, file, r))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Type::Function(FunctionType { args, rets }))
        }
    }
}

fn resolve_name(symbols: &SymbolTable, file: &str, node: &TypeNode, name: &str) -> Result<Type, Diagnostic> {
    match symbols.find_symbol(name) {
        Some(Binding::Type(t)) => Ok(t.clone()),
        // `string` is installed as a non-main module binding (so `string.X`
        // resolves as a qualified builtin call) but is special-cased here
        // so it also works as a type annotation.
        Some(Binding::Module { name: modname, is_main: false }) if modname == "string" => Ok(Type::String),
        Some(_) => Err(Diagnostic::scope_error(file, node.span, format!("'{}' is not a type", name))),
        None => Err(Diagnostic::scope_error(file, node.span, format!("unknown type '{}'", name))),
    }
}

fn resolve_table(
    symbols: &SymbolTable,
    file: &str,
    node: &TypeNode,
    fields: &[(String, TypeNode)],
) -> Result<Type, Diagnostic> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(fields.len());
    for (name, field_type) in fields {
        if !seen.insert(name.as_str()) {
            return Err(Diagnostic::type_error(
                file,
                node.span,
                format!("duplicate field '{}' in table type", name),
            ));
        }
        resolved.push((name.clone(), resolve_type(symbols, file, field_type)?));
    }
    Ok(Type::Table(resolved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tyla_ast::Span;

    fn name_node(name: &str) -> TypeNode {
        TypeNode { kind: TypeNodeKind::Name(name.to_string()), span: Span::new(1, 1) }
    }

    #[test]
    fn resolves_primitive_type_names() {
        let mut symbols = SymbolTable::new();
        symbols.add_symbol("integer", Binding::Type(Type::Integer));
        assert_eq!(resolve_type(&symbols, "f", &name_node("integer")).unwrap(), Type::Integer);
    }

    #[test]
    fn string_module_doubles_as_a_type_name() {
        let mut symbols = SymbolTable::new();
        symbols.add_symbol("string", Binding::Module { name: "string".to_string(), is_main: false });
        assert_eq!(resolve_type(&symbols, "f", &name_node("string")).unwrap(), Type::String);
    }

    #[test]
    fn unknown_type_name_is_a_scope_error() {
        let symbols = SymbolTable::new();
        let err = resolve_type(&symbols, "f", &name_node("Widget")).unwrap_err();
        assert_eq!(err.category(), "scope error");
    }

    #[test]
    fn duplicate_table_field_is_a_type_error() {
        let symbols = SymbolTable::new();
        let node = TypeNode {
            kind: TypeNodeKind::Table(vec![
                ("x".to_string(), name_node("integer")),
                ("x".to_string(), name_node("integer")),
            ]),
            span: Span::new(1, 1),
        };
        let mut symbols2 = symbols;
        symbols2.add_symbol("integer", Binding::Type(Type::Integer));
        let err = resolve_type(&symbols2, "f", &node).unwrap_err();
        assert_eq!(err.category(), "type error");
    }
}
