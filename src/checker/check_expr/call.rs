//! Function calls: synthesizes the callee, expands multi-return arguments,
//! and verifies each argument against the callee's declared parameter types.

use tyla_ast::{Exp, ExpKind, Span};
use tyla_types::Type;

use super::super::diagnostics::Diagnostic;
use super::super::Checker;
use super::{expand_returns, synthesize, verify};

pub fn synthesize_call_func(
    checker: &mut Checker,
    callee: Exp,
    args: Vec<Exp>,
    span: Span,
) -> Result<Exp, Diagnostic> {
    let callee = synthesize(checker, callee)?;
    let callee_ty = callee.ty.clone().expect("synthesize always sets _type");
    let ft = match &callee_ty {
        Type::Function(ft) => ft.clone(),
        other => return Err(checker.type_error(span, format!("'{}' is not callable", other))),
    };

    let args = expand_returns(checker, args)?;
    if args.len() != ft.args.len() {
        return Err(checker.type_error(
            span,
            format!("expected {} argument(s), found {}", ft.args.len(), args.len()),
        ));
    }
    let mut checked_args = Vec::with_capacity(args.len());
    for (arg, expected) in args.into_iter().zip(ft.args.iter()) {
        checked_args.push(verify(checker, arg, expected, "function argument")?);
    }

    let ty = ft.rets.first().cloned().unwrap_or(Type::Void);
    Ok(Exp {
        kind: ExpKind::CallFunc(Box::new(callee), checked_args),
        span,
        ty: Some(ty),
        types: Some(ft.rets),
    })
}
