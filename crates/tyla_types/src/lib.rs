//! Semantic type algebra for the tyla checker.
//!
//! This crate defines the closed set of semantic types produced by the
//! checker and the small handful of predicates the checker needs over them.
//! It knows nothing about syntax, scopes, or diagnostics — those live in the
//! `tyla` crate, which is the only consumer of this one besides `tyla_ast`
//! and `tyla_builtins`.

use std::fmt;

/// A resolved, fully-checked semantic type.
///
/// This is the closed variant set from the type algebra: every type a
/// checked program can mention is one of these. There is no "unknown"
/// variant — a program that can't be typed is a diagnostic, not a type.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Type {
    Nil,
    Boolean,
    Integer,
    Float,
    String,
    Any,
    Void,
    Array(Box<Type>),
    Table(Vec<(String, Type)>),
    Record(RecordType),
    Function(FunctionType),
    Module,
}

/// A record type: a name plus an *ordered* field list (order matters for
/// display and for the default-initializer error, which reports missing
/// fields in declaration order).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RecordType {
    pub name: String,
    pub fields: Vec<(String, Type)>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FunctionType {
    pub args: Vec<Type>,
    pub rets: Vec<Type>,
}

impl Type {
    /// Structural equality, not `Any`-aware. Record/Table field order is
    /// significant for `Table` (positional initializers rely on it) but
    /// `Record` equality is effectively by name since two records can only
    /// be equal if they were resolved from the same declaration.
    pub fn equals(&self, other: &Type) -> bool {
        self == other
    }

    /// Weaker than `equals`: true when either side is `Any`, or the two
    /// types are equal. This is the relation `verify` uses to decide
    /// whether an implicit cast can bridge `found` to `expected`.
    pub fn consistent(&self, other: &Type) -> bool {
        matches!(self, Type::Any) || matches!(other, Type::Any) || self.equals(other)
    }

    /// `Table`, `Record`, and `Module` values can be indexed by field name.
    pub fn is_indexable(&self) -> bool {
        matches!(self, Type::Table(_) | Type::Record(_) | Type::Module)
    }

    /// Field name -> field type, for indexable types. `Module` carries no
    /// field list of its own (unlike `Table`/`Record`); qualified-name
    /// flattening resolves `module.field` through the symbol table and
    /// built-in catalog instead, so this returns an empty map for it.
    pub fn indices(&self) -> Vec<(String, Type)> {
        match self {
            Type::Table(fields) => fields.clone(),
            Type::Record(r) => r.fields.clone(),
            Type::Module => Vec::new(),
            _ => Vec::new(),
        }
    }

    pub fn field_type(&self, name: &str) -> Option<Type> {
        self.indices().into_iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Integer | Type::Float)
    }

    /// `Boolean` or `Any`: the set of types acceptable in a condition
    /// context (`if`, `while`, `not`, `and`/`or` operands).
    pub fn is_condition_typed(&self) -> bool {
        matches!(self, Type::Boolean | Type::Any)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Nil => write!(f, "nil"),
            Type::Boolean => write!(f, "boolean"),
            Type::Integer => write!(f, "integer"),
            Type::Float => write!(f, "float"),
            Type::String => write!(f, "string"),
            Type::Any => write!(f, "any"),
            Type::Void => write!(f, "void"),
            Type::Array(elem) => write!(f, "{{{}}}", elem),
            Type::Table(fields) => {
                write!(f, "{{")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, ty)?;
                }
                write!(f, "}}")
            }
            Type::Record(r) => write!(f, "{}", r.name),
            Type::Function(func) => {
                write!(f, "(")?;
                for (i, arg) in func.args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ") -> (")?;
                for (i, ret) in func.rets.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", ret)?;
                }
                write!(f, ")")
            }
            Type::Module => write!(f, "module"),
        }
    }
}
