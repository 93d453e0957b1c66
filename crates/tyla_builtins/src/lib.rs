//! The built-in function and module catalog.
//!
//! This is treated as an opaque, read-only vocabulary by the checker: a
//! catalog of builtin function names (qualified as `module.field` where
//! they live inside a builtin module) mapped to their function types, and
//! the set of builtin module names. Nothing here resolves syntax; it is
//! pure data, installed into the root scope once per `check_program` call.

use std::collections::HashMap;
use std::collections::HashSet;

use tyla_types::{FunctionType, Type};

/// A read-only catalog of builtin functions and builtin module names.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub functions: HashMap<String, FunctionType>,
    pub modules: HashSet<String>,
}

impl Catalog {
    /// The standard catalog: the `io`, `string`, `table`, and `math`
    /// builtin modules, plus a handful of free functions.
    pub fn standard() -> Self {
        let mut functions = HashMap::new();
        let mut modules = HashSet::new();

        for name in ["io", "string", "table", "math", "os"] {
            modules.insert(name.to_string());
        }

        let mut add = |name: &str, args: Vec<Type>, rets: Vec<Type>| {
            functions.insert(name.to_string(), FunctionType { args, rets });
        };

        // Free functions.
        add("print", vec![Type::Any], vec![]);
        add("type", vec![Type::Any], vec![Type::String]);
        add("tostring", vec![Type::Any], vec![Type::String]);
        add("tonumber", vec![Type::Any], vec![Type::Float]);
        add("error", vec![Type::String], vec![]);
        add("assert", vec![Type::Any, Type::String], vec![Type::Any]);
        add(
            "pairs",
            vec![Type::Any],
            vec![
                Type::Function(FunctionType {
                    args: vec![Type::Any, Type::Any],
                    rets: vec![Type::Any, Type::Any],
                }),
                Type::Any,
                Type::Any,
            ],
        );
        add(
            "ipairs",
            vec![Type::Any],
            vec![
                Type::Function(FunctionType {
                    args: vec![Type::Any, Type::Any],
                    rets: vec![Type::Any, Type::Any],
                }),
                Type::Any,
                Type::Any,
            ],
        );

        // io.*
        add("io.write", vec![Type::String], vec![]);
        add("io.read", vec![Type::String], vec![Type::String]);

        // string.*
        add("string.format", vec![Type::String], vec![Type::String]);
        add("string.sub", vec![Type::String, Type::Integer, Type::Integer], vec![Type::String]);
        add("string.len", vec![Type::String], vec![Type::Integer]);
        add("string.upper", vec![Type::String], vec![Type::String]);
        add("string.lower", vec![Type::String], vec![Type::String]);
        add("string.find", vec![Type::String, Type::String], vec![Type::Integer, Type::Integer]);

        // table.*
        add("table.insert", vec![Type::Any, Type::Any], vec![]);
        add("table.remove", vec![Type::Any, Type::Integer], vec![Type::Any]);
        add("table.concat", vec![Type::Any, Type::String], vec![Type::String]);

        // math.*
        add("math.floor", vec![Type::Float], vec![Type::Integer]);
        add("math.ceil", vec![Type::Float], vec![Type::Integer]);
        add("math.abs", vec![Type::Float], vec![Type::Float]);
        add("math.max", vec![Type::Float, Type::Float], vec![Type::Float]);
        add("math.min", vec![Type::Float, Type::Float], vec![Type::Float]);

        // os.*
        add("os.time", vec![], vec![Type::Integer]);
        add("os.exit", vec![Type::Integer], vec![]);

        Catalog { functions, modules }
    }

    pub fn function(&self, name: &str) -> Option<&FunctionType> {
        self.functions.get(name)
    }

    pub fn is_module(&self, name: &str) -> bool {
        self.modules.contains(name)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_write_is_qualified_by_module_name() {
        let catalog = Catalog::standard();
        assert!(catalog.function("io.write").is_some());
        assert!(catalog.is_module("io"));
    }

    #[test]
    fn unqualified_builtin_module_members_are_absent() {
        let catalog = Catalog::standard();
        assert!(catalog.function("write").is_none());
    }
}
