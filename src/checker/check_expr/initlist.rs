//! Initializer lists (`{...}`), checked against an expected type. The
//! expected type decides how fields are validated: positional against
//! `Array`, named-and-declared against `Table`/`Record`, and named-only
//! (no declared field list exists to check against) against `Module`.

use std::collections::HashSet;

use tyla_ast::{Exp, ExpKind, Field, Span};
use tyla_types::Type;

use super::super::diagnostics::Diagnostic;
use super::super::Checker;
use super::{synthesize, verify};

pub fn verify_initlist(
    checker: &mut Checker,
    fields: Vec<Field>,
    expected: &Type,
    span: Span,
) -> Result<Exp, Diagnostic> {
    match expected {
        Type::Array(elem) => verify_array(checker, fields, elem, span),
        // `Module` carries no declared field list (`Type::indices` returns
        // empty for it) so there is nothing to validate field names
        // against; every field must be named, and each value is simply
        // synthesized in its own right.
        Type::Module => verify_module(checker, fields, span),
        t if t.is_indexable() => verify_indexable(checker, fields, t, span),
        other => Err(checker.type_error(span, format!("'{}' cannot be built from an initializer list", other))),
    }
}

fn verify_array(checker: &mut Checker, fields: Vec<Field>, elem: &Type, span: Span) -> Result<Exp, Diagnostic> {
    let mut checked = Vec::with_capacity(fields.len());
    for field in fields {
        match field {
            Field::List(exp) => checked.push(Field::List(verify(checker, exp, elem, "array element")?)),
            Field::Rec(name, _) => {
                return Err(checker.type_error(span, format!("named field '{}' is not valid in an array", name)));
            }
        }
    }
    Ok(Exp { kind: ExpKind::Initlist(checked), span, ty: Some(Type::Array(Box::new(elem.clone()))), types: None })
}

fn verify_module(checker: &mut Checker, fields: Vec<Field>, span: Span) -> Result<Exp, Diagnostic> {
    let mut checked = Vec::with_capacity(fields.len());
    for field in fields {
        match field {
            Field::Rec(name, exp) => {
                let exp = synthesize(checker, exp)?;
                checked.push(Field::Rec(name, exp));
            }
            Field::List(_) => {
                return Err(checker.type_error(span, "a module initializer requires named fields"));
            }
        }
    }
    Ok(Exp { kind: ExpKind::Initlist(checked), span, ty: Some(Type::Module), types: None })
}

fn verify_indexable(checker: &mut Checker, fields: Vec<Field>, expected: &Type, span: Span) -> Result<Exp, Diagnostic> {
    let declared = expected.indices();
    let mut seen = HashSet::new();
    let mut checked = Vec::with_capacity(fields.len());
    for field in fields {
        match field {
            Field::Rec(name, exp) => {
                if !seen.insert(name.clone()) {
                    return Err(checker.type_error(span, format!("duplicate field '{}' in initializer", name)));
                }
                let field_ty = declared
                    .iter()
                    .find(|(n, _)| *n == name)
                    .map(|(_, t)| t.clone())
                    .ok_or_else(|| {
                        checker.type_error(span, format!("'{}' has no field '{}'", expected, name))
                    })?;
                let exp = verify(checker, exp, &field_ty, "table field")?;
                checked.push(Field::Rec(name, exp));
            }
            Field::List(exp) => {
                return Err(checker.type_error(
                    exp.span,
                    format!("'{}' requires named fields in its initializer", expected),
                ));
            }
        }
    }
    for (name, _) in &declared {
        if !seen.contains(name) {
            return Err(checker.type_error(span, format!("missing required field '{}'", name)));
        }
    }
    Ok(Exp { kind: ExpKind::Initlist(checked), span, ty: Some(expected.clone()), types: None })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(kind: ExpKind) -> Exp {
        Exp::new(kind, Span::new(1, 1))
    }

    #[test]
    fn array_initializer_verifies_each_element() {
        let mut checker = Checker::new("t");
        let fields = vec![Field::List(e(ExpKind::Integer(1))), Field::List(e(ExpKind::Integer(2)))];
        let exp = verify_initlist(&mut checker, fields, &Type::Array(Box::new(Type::Integer)), Span::new(1, 1))
            .unwrap();
        assert_eq!(exp.ty, Some(Type::Array(Box::new(Type::Integer))));
    }

    #[test]
    fn module_initializer_accepts_named_fields_without_a_declared_list() {
        let mut checker = Checker::new("t");
        let fields = vec![Field::Rec("count".to_string(), e(ExpKind::Integer(1)))];
        let exp = verify_initlist(&mut checker, fields, &Type::Module, Span::new(1, 1)).unwrap();
        assert_eq!(exp.ty, Some(Type::Module));
    }

    #[test]
    fn module_initializer_rejects_positional_fields() {
        let mut checker = Checker::new("t");
        let fields = vec![Field::List(e(ExpKind::Integer(1)))];
        let err = verify_initlist(&mut checker, fields, &Type::Module, Span::new(1, 1)).unwrap_err();
        assert_eq!(err.category(), "type error");
    }

    #[test]
    fn table_initializer_rejects_missing_required_field() {
        let mut checker = Checker::new("t");
        let expected = Type::Table(vec![("x".to_string(), Type::Integer), ("y".to_string(), Type::Integer)]);
        let fields = vec![Field::Rec("x".to_string(), e(ExpKind::Integer(1)))];
        let err = verify_initlist(&mut checker, fields, &expected, Span::new(1, 1)).unwrap_err();
        assert_eq!(err.category(), "type error");
        assert!(err.to_string().contains("missing required field 'y'"));
    }

    #[test]
    fn table_initializer_rejects_duplicate_field() {
        let mut checker = Checker::new("t");
        let expected = Type::Table(vec![("x".to_string(), Type::Integer)]);
        let fields = vec![
            Field::Rec("x".to_string(), e(ExpKind::Integer(1))),
            Field::Rec("x".to_string(), e(ExpKind::Integer(2))),
        ];
        let err = verify_initlist(&mut checker, fields, &expected, Span::new(1, 1)).unwrap_err();
        assert_eq!(err.category(), "type error");
    }
}
