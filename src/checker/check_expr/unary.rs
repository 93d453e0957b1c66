//! Unary operators (§4.4 Unary bullet): `#` length, `-` negation, `~`
//! bitwise not, `not` logical not.

use tyla_ast::{Exp, ExpKind, Span, UnOp};
use tyla_types::Type;

use super::super::diagnostics::Diagnostic;
use super::super::Checker;
use super::synthesize;

pub fn synthesize_unop(checker: &mut Checker, op: UnOp, inner: Exp, span: Span) -> Result<Exp, Diagnostic> {
    let inner = synthesize(checker, inner)?;
    let inner_ty = inner.ty.clone().expect("synthesize always sets _type");
    let ty = match op {
        UnOp::Len => match &inner_ty {
            Type::String | Type::Array(_) | Type::Table(_) => Type::Integer,
            other => {
                return Err(checker.type_error(span, format!("'#' is not defined for type '{}'", other)));
            }
        },
        UnOp::Neg => match &inner_ty {
            Type::Integer | Type::Float => inner_ty.clone(),
            other => {
                return Err(checker.type_error(span, format!("'-' is not defined for type '{}'", other)));
            }
        },
        UnOp::BNot => match &inner_ty {
            Type::Integer => inner_ty.clone(),
            other => {
                return Err(checker.type_error(span, format!("'~' is not defined for type '{}'", other)));
            }
        },
        UnOp::Not => {
            if !inner_ty.is_condition_typed() {
                return Err(checker.type_error(
                    span,
                    format!("'not' requires a boolean operand, found '{}'", inner_ty),
                ));
            }
            Type::Boolean
        }
    };
    Ok(Exp { kind: ExpKind::Unop(op, Box::new(inner)), span, ty: Some(ty), types: None })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(kind: ExpKind) -> Exp {
        Exp::new(kind, Span::new(1, 1))
    }

    #[test]
    fn length_of_string_is_integer() {
        let mut checker = Checker::new("t");
        let exp = synthesize_unop(&mut checker, UnOp::Len, e(ExpKind::String("hi".to_string())), Span::new(1, 1))
            .unwrap();
        assert_eq!(exp.ty, Some(Type::Integer));
    }

    #[test]
    fn length_of_integer_is_a_type_error() {
        let mut checker = Checker::new("t");
        let err = synthesize_unop(&mut checker, UnOp::Len, e(ExpKind::Integer(1)), Span::new(1, 1)).unwrap_err();
        assert_eq!(err.category(), "type error");
    }

    #[test]
    fn negation_preserves_numeric_type() {
        let mut checker = Checker::new("t");
        let exp = synthesize_unop(&mut checker, UnOp::Neg, e(ExpKind::Float(1.5)), Span::new(1, 1)).unwrap();
        assert_eq!(exp.ty, Some(Type::Float));
    }

    #[test]
    fn not_requires_a_boolean_operand() {
        let mut checker = Checker::new("t");
        let err = synthesize_unop(&mut checker, UnOp::Not, e(ExpKind::Integer(1)), Span::new(1, 1)).unwrap_err();
        assert_eq!(err.category(), "type error");
    }

    #[test]
    fn bitwise_not_of_string_is_a_type_error() {
        let mut checker = Checker::new("t");
        let err =
            synthesize_unop(&mut checker, UnOp::BNot, e(ExpKind::String("x".to_string())), Span::new(1, 1))
                .unwrap_err();
        assert_eq!(err.category(), "type error");
    }
}
