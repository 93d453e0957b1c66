//! Expression checker (C7): the dual-mode `synthesize`/`verify` entry points.

mod binary;
mod call;
mod cast;
mod initlist;
mod lambda;
mod unary;
mod var;

pub use var::resolve_var;

use std::rc::Rc;

use tyla_ast::{Exp, ExpKind};
use tyla_types::Type;

use super::diagnostics::Diagnostic;
use super::Checker;

/// Infers a type for `exp` with no external context. Idempotent: an
/// already-typed node (notably a call shared by the multi-return
/// expansion) is returned unchanged.
pub fn synthesize(checker: &mut Checker, exp: Exp) -> Result<Exp, Diagnostic> {
    if exp.ty.is_some() {
        return Ok(exp);
    }
    let span = exp.span;
    match exp.kind {
        ExpKind::Nil => Ok(typed(ExpKind::Nil, span, Type::Nil)),
        ExpKind::Bool(b) => Ok(typed(ExpKind::Bool(b), span, Type::Boolean)),
        ExpKind::Integer(i) => Ok(typed(ExpKind::Integer(i), span, Type::Integer)),
        ExpKind::Float(f) => Ok(typed(ExpKind::Float(f), span, Type::Float)),
        ExpKind::String(s) => Ok(typed(ExpKind::String(s), span, Type::String)),
        ExpKind::Initlist(_) => {
            Err(checker.type_error(span, "initializer list needs a known type; add a type annotation"))
        }
        ExpKind::Lambda(_) => {
            Err(checker.type_error(span, "function literal needs a known type; add a type annotation"))
        }
        ExpKind::Var(v) => var::synthesize_var(checker, *v, span),
        ExpKind::Unop(op, inner) => unary::synthesize_unop(checker, op, *inner, span),
        ExpKind::Binop(op, lhs, rhs) => binary::synthesize_binop(checker, op, *lhs, *rhs, span),
        ExpKind::CallFunc(callee, args) => call::synthesize_call_func(checker, *callee, args, span),
        ExpKind::CallMethod(..) => Err(checker.type_error(span, "method calls are not implemented")),
        ExpKind::Cast(inner, target) => cast::synthesize_cast(checker, *inner, target, span),
        ExpKind::Paren(inner) => {
            let inner = synthesize(checker, *inner)?;
            let ty = inner.ty.clone().expect("synthesize always sets _type");
            Ok(typed(ExpKind::Paren(Box::new(inner)), span, ty))
        }
        ExpKind::ExtraRet(call, i) => {
            let ty = call
                .types
                .as_ref()
                .and_then(|types| types.get(i - 1))
                .cloned()
                .ok_or_else(|| checker.type_error(span, "extra-return index out of range of its call's return types"))?;
            Ok(typed(ExpKind::ExtraRet(call, i), span, ty))
        }
        ExpKind::ToFloat(inner) => {
            let inner = synthesize(checker, *inner)?;
            assert_eq!(
                inner.ty,
                Some(Type::Integer),
                "ToFloat only ever wraps an integer-typed operand"
            );
            Ok(typed(ExpKind::ToFloat(Box::new(inner)), span, Type::Float))
        }
    }
}

/// Types `exp` against `expected`. `context` names the surrounding
/// construct (e.g. `"function argument"`) for the mismatch message. The
/// caller must use the returned node in place of the input: both modes may
/// substitute it (inserting a `Cast`, or descending into an `Initlist`).
pub fn verify(checker: &mut Checker, exp: Exp, expected: &Type, context: &str) -> Result<Exp, Diagnostic> {
    let span = exp.span;
    match exp.kind {
        ExpKind::Initlist(fields) => initlist::verify_initlist(checker, fields, expected, span),
        ExpKind::Lambda(lambda) => lambda::verify_lambda(checker, lambda, expected, span),
        ExpKind::Paren(inner) => {
            let inner = verify(checker, *inner, expected, context)?;
            let ty = inner.ty.clone().expect("verify always sets _type");
            Ok(typed(ExpKind::Paren(Box::new(inner)), span, ty))
        }
        kind => {
            let found_exp = synthesize(checker, Exp { kind, span, ty: None, types: None })?;
            let found = found_exp.ty.clone().expect("synthesize always sets _type");
            if found.equals(expected) {
                Ok(found_exp)
            } else if found.consistent(expected) {
                Ok(typed(ExpKind::Cast(Box::new(found_exp), None), span, expected.clone()))
            } else {
                Err(checker.type_error(
                    span,
                    format!("expected '{}' but found '{}' in {}", expected, found, context),
                ))
            }
        }
    }
}

fn typed(kind: ExpKind, span: tyla_ast::Span, ty: Type) -> Exp {
    Exp { kind, span, ty: Some(ty), types: None }
}

/// Multi-return expansion (§4.5 rule 3): if `exps` ends in a call, type the
/// call first and append one `ExtraRet(call, i)` per additional return
/// value. Used for declaration RHS, assignment RHS, call arguments, return
/// operands, and `for-in` operands alike.
pub fn expand_returns(checker: &mut Checker, mut exps: Vec<Exp>) -> Result<Vec<Exp>, Diagnostic> {
    let Some(last) = exps.pop() else {
        return Ok(exps);
    };
    if !matches!(last.kind, ExpKind::CallFunc(..) | ExpKind::CallMethod(..)) {
        exps.push(last);
        return Ok(exps);
    }
    let call = synthesize(checker, last)?;
    let types = call.types.clone().unwrap_or_default();
    // The call is cloned once into an `Rc` so every `ExtraRet` can share a
    // non-owning handle to it instead of duplicating the call subtree.
    let call_rc = Rc::new(call.clone());
    exps.push(call);
    for i in 2..=types.len() {
        exps.push(typed(ExpKind::ExtraRet(Rc::clone(&call_rc), i), call_rc.span, types[i - 1].clone()));
    }
    Ok(exps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tyla_ast::{BinOp, Span, UnOp, Var, VarKind};

    fn e(kind: ExpKind) -> Exp {
        Exp::new(kind, Span::new(1, 1))
    }

    #[test]
    fn literals_synthesize_their_obvious_type() {
        let mut checker = Checker::new("t");
        let exp = synthesize(&mut checker, e(ExpKind::Integer(3))).unwrap();
        assert_eq!(exp.ty, Some(Type::Integer));
    }

    #[test]
    fn synthesize_is_idempotent_on_already_typed_nodes() {
        let mut checker = Checker::new("t");
        let mut exp = e(ExpKind::Integer(3));
        exp.ty = Some(Type::Float);
        let result = synthesize(&mut checker, exp).unwrap();
        assert_eq!(result.ty, Some(Type::Float));
    }

    #[test]
    fn initlist_in_synthesize_context_is_an_error() {
        let mut checker = Checker::new("t");
        let err = synthesize(&mut checker, e(ExpKind::Initlist(vec![]))).unwrap_err();
        assert_eq!(err.category(), "type error");
    }

    #[test]
    fn verify_inserts_cast_for_consistent_not_equal_types() {
        let mut checker = Checker::new("t");
        let exp = e(ExpKind::Var(Box::new(Var::new(VarKind::Name("x".to_string()), Span::new(1, 1)))));
        let decl = tyla_ast::Decl { ty: Some(Type::Any), ..tyla_ast::Decl::new("x", None, Span::new(1, 1)) };
        checker.symbols.add_symbol("x", tyla_ast::Binding::Local(std::rc::Rc::new(decl)));
        let result = verify(&mut checker, exp, &Type::Integer, "test").unwrap();
        match result.kind {
            ExpKind::Cast(_, None) => {}
            other => panic!("expected an inserted cast, found {:?}", other),
        }
        assert_eq!(result.ty, Some(Type::Integer));
    }

    #[test]
    fn mismatched_verify_is_a_type_error() {
        let mut checker = Checker::new("t");
        let err = verify(&mut checker, e(ExpKind::Integer(1)), &Type::String, "assignment").unwrap_err();
        assert_eq!(err.category(), "type error");
    }

    #[test]
    fn not_requires_condition_typed_operand() {
        let mut checker = Checker::new("t");
        let err = synthesize(&mut checker, e(ExpKind::Unop(UnOp::Not, Box::new(e(ExpKind::Integer(1))))))
            .unwrap_err();
        assert_eq!(err.category(), "type error");
    }

    #[test]
    fn mixed_equality_is_rejected() {
        let mut checker = Checker::new("t");
        let err = synthesize(
            &mut checker,
            e(ExpKind::Binop(BinOp::Eq, Box::new(e(ExpKind::Integer(1))), Box::new(e(ExpKind::Float(1.0))))),
        )
        .unwrap_err();
        assert!(err.to_string().contains("not yet implemented"));
    }
}
