//! Binary operators (§4.4 Binary bullet): equality, order, arithmetic,
//! division/power, concatenation, logical, and bitwise operator classes.

use tyla_ast::{BinOp, Exp, ExpKind, Span};
use tyla_types::Type;

use super::super::diagnostics::Diagnostic;
use super::super::Checker;
use super::synthesize;

pub fn synthesize_binop(
    checker: &mut Checker,
    op: BinOp,
    lhs: Exp,
    rhs: Exp,
    span: Span,
) -> Result<Exp, Diagnostic> {
    let lhs = synthesize(checker, lhs)?;
    let rhs = synthesize(checker, rhs)?;
    match op {
        BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => {
            check_comparison(checker, op, lhs, rhs, span)
        }
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Mod | BinOp::IDiv => {
            check_mixed_arithmetic(checker, op, lhs, rhs, span)
        }
        BinOp::Div | BinOp::Pow => check_float_arithmetic(checker, op, lhs, rhs, span),
        BinOp::Concat => check_concat(checker, op, lhs, rhs, span),
        BinOp::And | BinOp::Or => check_logical(checker, op, lhs, rhs, span),
        BinOp::BOr | BinOp::BAnd | BinOp::BXor | BinOp::Shl | BinOp::Shr => {
            check_bitwise(checker, op, lhs, rhs, span)
        }
    }
}

fn is_mixed_numeric(lhs: &Type, rhs: &Type) -> bool {
    matches!(
        (lhs, rhs),
        (Type::Integer, Type::Float) | (Type::Float, Type::Integer)
    )
}

fn check_comparison(checker: &mut Checker, op: BinOp, lhs: Exp, rhs: Exp, span: Span) -> Result<Exp, Diagnostic> {
    let lhs_ty = lhs.ty.clone().expect("synthesize always sets _type");
    let rhs_ty = rhs.ty.clone().expect("synthesize always sets _type");
    if is_mixed_numeric(&lhs_ty, &rhs_ty) {
        return Err(checker.type_error(span, "comparisons between float and integers are not yet implemented"));
    }
    match op {
        BinOp::Eq | BinOp::Ne => {
            if !lhs_ty.equals(&rhs_ty) {
                return Err(checker.type_error(
                    span,
                    format!("cannot compare '{}' and '{}' for equality", lhs_ty, rhs_ty),
                ));
            }
        }
        _ => {
            if !(lhs_ty.equals(&rhs_ty) && (lhs_ty.is_numeric() || lhs_ty == Type::String)) {
                return Err(checker.type_error(
                    span,
                    format!("'{}' is not orderable against '{}'", lhs_ty, rhs_ty),
                ));
            }
        }
    }
    finish_binop(op, lhs, rhs, span, rhs_ty.clone())
}

fn check_mixed_arithmetic(
    checker: &mut Checker,
    op: BinOp,
    lhs: Exp,
    rhs: Exp,
    span: Span,
) -> Result<Exp, Diagnostic> {
    let lhs_ty = lhs.ty.clone().expect("synthesize always sets _type");
    let rhs_ty = rhs.ty.clone().expect("synthesize always sets _type");
    if !lhs_ty.is_numeric() || !rhs_ty.is_numeric() {
        return Err(checker.type_error(
            span,
            format!("arithmetic requires numeric operands, found '{}' and '{}'", lhs_ty, rhs_ty),
        ));
    }
    let result_ty = if lhs_ty == Type::Float || rhs_ty == Type::Float { Type::Float } else { Type::Integer };
    let lhs = to_float_if_integer(lhs, &result_ty);
    let rhs = to_float_if_integer(rhs, &result_ty);
    finish_binop(op, lhs, rhs, span, result_ty)
}

fn check_float_arithmetic(
    checker: &mut Checker,
    op: BinOp,
    lhs: Exp,
    rhs: Exp,
    span: Span,
) -> Result<Exp, Diagnostic> {
    let lhs_ty = lhs.ty.clone().expect("synthesize always sets _type");
    let rhs_ty = rhs.ty.clone().expect("synthesize always sets _type");
    if !lhs_ty.is_numeric() || !rhs_ty.is_numeric() {
        return Err(checker.type_error(
            span,
            format!("arithmetic requires numeric operands, found '{}' and '{}'", lhs_ty, rhs_ty),
        ));
    }
    let lhs = to_float_if_integer(lhs, &Type::Float);
    let rhs = to_float_if_integer(rhs, &Type::Float);
    finish_binop(op, lhs, rhs, span, Type::Float)
}

fn check_concat(checker: &mut Checker, op: BinOp, lhs: Exp, rhs: Exp, span: Span) -> Result<Exp, Diagnostic> {
    let lhs_ty = lhs.ty.clone().expect("synthesize always sets _type");
    let rhs_ty = rhs.ty.clone().expect("synthesize always sets _type");
    if lhs_ty != Type::String || rhs_ty != Type::String {
        return Err(checker.type_error(
            span,
            format!("'..' requires string operands, found '{}' and '{}'", lhs_ty, rhs_ty),
        ));
    }
    finish_binop(op, lhs, rhs, span, Type::String)
}

fn check_logical(checker: &mut Checker, op: BinOp, lhs: Exp, rhs: Exp, span: Span) -> Result<Exp, Diagnostic> {
    let lhs_ty = lhs.ty.clone().expect("synthesize always sets _type");
    let rhs_ty = rhs.ty.clone().expect("synthesize always sets _type");
    if !lhs_ty.is_condition_typed() || !rhs_ty.is_condition_typed() {
        return Err(checker.type_error(
            span,
            format!("'and'/'or' require boolean operands, found '{}' and '{}'", lhs_ty, rhs_ty),
        ));
    }
    finish_binop(op, lhs, rhs, span, Type::Boolean)
}

fn check_bitwise(checker: &mut Checker, op: BinOp, lhs: Exp, rhs: Exp, span: Span) -> Result<Exp, Diagnostic> {
    let lhs_ty = lhs.ty.clone().expect("synthesize always sets _type");
    let rhs_ty = rhs.ty.clone().expect("synthesize always sets _type");
    if lhs_ty != Type::Integer || rhs_ty != Type::Integer {
        return Err(checker.type_error(
            span,
            format!("bitwise operators require integer operands, found '{}' and '{}'", lhs_ty, rhs_ty),
        ));
    }
    finish_binop(op, lhs, rhs, span, Type::Integer)
}

/// Wraps an `Integer`-typed operand in `ToFloat` when the result type is
/// `Float`; leaves a `Float` or non-numeric operand untouched.
fn to_float_if_integer(exp: Exp, result_ty: &Type) -> Exp {
    if *result_ty == Type::Float && exp.ty == Some(Type::Integer) {
        let span = exp.span;
        Exp { kind: ExpKind::ToFloat(Box::new(exp)), span, ty: Some(Type::Float), types: None }
    } else {
        exp
    }
}

fn finish_binop(op: BinOp, lhs: Exp, rhs: Exp, span: Span, ty: Type) -> Result<Exp, Diagnostic> {
    Ok(Exp { kind: ExpKind::Binop(op, Box::new(lhs), Box::new(rhs)), span, ty: Some(ty), types: None })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(kind: ExpKind) -> Exp {
        Exp::new(kind, Span::new(1, 1))
    }

    #[test]
    fn integer_plus_integer_stays_integer() {
        let mut checker = Checker::new("t");
        let exp =
            synthesize_binop(&mut checker, BinOp::Add, e(ExpKind::Integer(1)), e(ExpKind::Integer(2)), Span::new(1, 1))
                .unwrap();
        assert_eq!(exp.ty, Some(Type::Integer));
    }

    #[test]
    fn integer_plus_float_coerces_to_float() {
        let mut checker = Checker::new("t");
        let exp =
            synthesize_binop(&mut checker, BinOp::Add, e(ExpKind::Integer(1)), e(ExpKind::Float(2.0)), Span::new(1, 1))
                .unwrap();
        assert_eq!(exp.ty, Some(Type::Float));
        match &exp.kind {
            ExpKind::Binop(_, lhs, _) => assert!(matches!(lhs.kind, ExpKind::ToFloat(_))),
            _ => panic!("expected Binop"),
        }
    }

    #[test]
    fn division_always_yields_float() {
        let mut checker = Checker::new("t");
        let exp =
            synthesize_binop(&mut checker, BinOp::Div, e(ExpKind::Integer(4)), e(ExpKind::Integer(2)), Span::new(1, 1))
                .unwrap();
        assert_eq!(exp.ty, Some(Type::Float));
    }

    #[test]
    fn mixed_equality_is_rejected_with_exact_message() {
        let mut checker = Checker::new("t");
        let err =
            synthesize_binop(&mut checker, BinOp::Eq, e(ExpKind::Integer(1)), e(ExpKind::Float(1.0)), Span::new(1, 1))
                .unwrap_err();
        assert_eq!(
            err.to_string(),
            "t:1:1: type error: comparisons between float and integers are not yet implemented"
        );
    }

    #[test]
    fn concat_requires_both_strings() {
        let mut checker = Checker::new("t");
        let err = synthesize_binop(
            &mut checker,
            BinOp::Concat,
            e(ExpKind::String("a".to_string())),
            e(ExpKind::Integer(1)),
            Span::new(1, 1),
        )
        .unwrap_err();
        assert_eq!(err.category(), "type error");
    }

    #[test]
    fn and_requires_boolean_operands() {
        let mut checker = Checker::new("t");
        let err = synthesize_binop(&mut checker, BinOp::And, e(ExpKind::Bool(true)), e(ExpKind::Integer(1)), Span::new(1, 1))
            .unwrap_err();
        assert_eq!(err.category(), "type error");
    }

    #[test]
    fn and_result_type_is_the_right_hand_operand_type() {
        let mut checker = Checker::new("t");
        let mut any_exp = e(ExpKind::Integer(1));
        any_exp.ty = Some(Type::Any);
        let exp = synthesize_binop(&mut checker, BinOp::And, e(ExpKind::Bool(true)), any_exp, Span::new(1, 1)).unwrap();
        assert_eq!(exp.ty, Some(Type::Any));
    }

    #[test]
    fn equality_between_any_and_a_concrete_type_is_rejected() {
        let mut checker = Checker::new("t");
        let mut any_exp = e(ExpKind::Integer(1));
        any_exp.ty = Some(Type::Any);
        let err = synthesize_binop(&mut checker, BinOp::Eq, any_exp, e(ExpKind::Integer(1)), Span::new(1, 1))
            .unwrap_err();
        assert_eq!(err.category(), "type error");
    }

    #[test]
    fn bitwise_or_requires_integers() {
        let mut checker = Checker::new("t");
        let exp = synthesize_binop(&mut checker, BinOp::BOr, e(ExpKind::Integer(1)), e(ExpKind::Integer(2)), Span::new(1, 1))
            .unwrap();
        assert_eq!(exp.ty, Some(Type::Integer));
    }
}
