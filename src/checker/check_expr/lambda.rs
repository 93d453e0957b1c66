//! Function literals, checked against an expected `Function` type: binds
//! each parameter's declared type from the expected signature, then checks
//! the body in a fresh scope with the expected return types in effect.

use std::rc::Rc;

use tyla_ast::{Binding, Exp, ExpKind, Lambda, Span};
use tyla_types::Type;

use super::super::check_stmt::check_block;
use super::super::diagnostics::Diagnostic;
use super::super::Checker;

pub fn verify_lambda(checker: &mut Checker, lambda: Lambda, expected: &Type, span: Span) -> Result<Exp, Diagnostic> {
    let ft = match expected {
        Type::Function(ft) => ft.clone(),
        other => return Err(checker.type_error(span, format!("expected '{}' but found a function literal", other))),
    };
    if lambda.params.len() != ft.args.len() {
        return Err(checker.type_error(
            span,
            format!("expected {} parameter(s), found {}", ft.args.len(), lambda.params.len()),
        ));
    }

    let rets = ft.rets.clone();
    let params = lambda.params;
    let body = lambda.body;
    let lambda_span = lambda.span;

    let (params, body) = checker.with_block(|checker| {
        let mut checked_params = Vec::with_capacity(params.len());
        for (param, arg_ty) in params.into_iter().zip(ft.args.iter()) {
            let decl = Rc::new(tyla_ast::Decl { ty: Some(arg_ty.clone()), ..param });
            checker.symbols.add_symbol(decl.name.clone(), Binding::Local(Rc::clone(&decl)));
            checked_params.push((*decl).clone());
        }
        checker.push_return_types(rets.clone());
        let body = check_block(checker, body);
        checker.pop_return_types();
        Ok((checked_params, body?))
    })?;

    Ok(Exp {
        kind: ExpKind::Lambda(Lambda { params, body, span: lambda_span }),
        span,
        ty: Some(Type::Function(ft)),
        types: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tyla_ast::Decl;
    use tyla_types::FunctionType;

    #[test]
    fn lambda_verified_against_non_function_is_a_type_error() {
        let mut checker = Checker::new("t");
        let lambda = Lambda { params: vec![], body: vec![], span: Span::new(1, 1) };
        let err = verify_lambda(&mut checker, lambda, &Type::Integer, Span::new(1, 1)).unwrap_err();
        assert_eq!(err.category(), "type error");
    }

    #[test]
    fn lambda_arity_mismatch_is_a_type_error() {
        let mut checker = Checker::new("t");
        let lambda = Lambda { params: vec![], body: vec![], span: Span::new(1, 1) };
        let ft = Type::Function(FunctionType { args: vec![Type::Integer], rets: vec![] });
        let err = verify_lambda(&mut checker, lambda, &ft, Span::new(1, 1)).unwrap_err();
        assert_eq!(err.category(), "type error");
    }

    #[test]
    fn lambda_params_are_typed_from_the_expected_signature() {
        let mut checker = Checker::new("t");
        let lambda = Lambda {
            params: vec![Decl::new("x", None, Span::new(1, 1))],
            body: vec![],
            span: Span::new(1, 1),
        };
        let ft = Type::Function(FunctionType { args: vec![Type::Integer], rets: vec![] });
        let exp = verify_lambda(&mut checker, lambda, &ft, Span::new(1, 1)).unwrap();
        match exp.kind {
            ExpKind::Lambda(l) => assert_eq!(l.params[0].ty, Some(Type::Integer)),
            other => panic!("expected Lambda, found {:?}", other),
        }
        assert_eq!(checker.symbols.find_symbol("x"), None);
    }
}
