//! Explicit casts (`exp as Type`): resolves the target type, verifies the
//! inner expression against it, and collapses a redundant inner cast.

use tyla_ast::{Exp, ExpKind, Span, TypeNode};

use super::super::diagnostics::Diagnostic;
use super::super::type_resolve::resolve_type;
use super::super::Checker;
use super::verify;

pub fn synthesize_cast(
    checker: &mut Checker,
    inner: Exp,
    target: Option<TypeNode>,
    span: Span,
) -> Result<Exp, Diagnostic> {
    let target_node = target.clone().unwrap_or_else(|| {
        unreachable!("a source-level Cast always carries a target TypeNode before checking")
    });
    let target_ty = resolve_type(&checker.symbols, checker.file(), &target_node)?;
    let inner = verify(checker, inner, &target_ty, "cast")?;
    let inner = peel_redundant_cast(inner, &target_ty);
    Ok(Exp { kind: ExpKind::Cast(Box::new(inner), target), span, ty: Some(target_ty), types: None })
}

/// If `inner` is itself an untargeted `Cast(_, None)` inserted by `verify`
/// whose type already equals `target_ty`, strip it: the outer cast already
/// states the same coercion.
fn peel_redundant_cast(inner: Exp, target_ty: &tyla_types::Type) -> Exp {
    if let ExpKind::Cast(ref boxed, None) = inner.kind {
        if inner.ty.as_ref() == Some(target_ty) {
            return (**boxed).clone();
        }
    }
    inner
}
