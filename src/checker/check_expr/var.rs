//! Variable resolution (§4.6) and the `Var.Dot` qualified-name flattening
//! that §4.5 requires to survive for downstream passes.

use tyla_ast::{Binding, Exp, ExpKind, Span, Var, VarKind};
use tyla_types::Type;

use super::super::diagnostics::Diagnostic;
use super::super::Checker;
use super::synthesize;

pub fn synthesize_var(checker: &mut Checker, var: Var, span: Span) -> Result<Exp, Diagnostic> {
    let var = resolve_var(checker, var)?;
    let ty = var.ty.clone().expect("resolve_var always sets _type");
    Ok(Exp { kind: ExpKind::Var(Box::new(var)), span, ty: Some(ty), types: None })
}

pub fn resolve_var(checker: &mut Checker, var: Var) -> Result<Var, Diagnostic> {
    let span = var.span;
    match var.kind {
        VarKind::Name(name) => resolve_name(checker, name, span),
        VarKind::Dot(lhs, field) => resolve_dot(checker, *lhs, field, span),
        VarKind::Bracket(t, k) => resolve_bracket(checker, *t, *k, span),
    }
}

fn resolve_name(checker: &mut Checker, name: String, span: Span) -> Result<Var, Diagnostic> {
    match checker.symbols.find_symbol(&name).cloned() {
        Some(binding) => {
            let ty = type_of_binding(checker, &binding, span, &name)?;
            Ok(finish_name(name, span, ty, binding))
        }
        None => Err(checker.scope_error(span, format!("variable '{}' is not declared", name))),
    }
}

fn resolve_dot(checker: &mut Checker, lhs: Exp, field: String, span: Span) -> Result<Var, Diagnostic> {
    if let ExpKind::Var(inner) = &lhs.kind {
        if let VarKind::Name(base_name) = &inner.kind {
            if let Some(Binding::Module { name: modname, is_main }) = checker.symbols.find_symbol(base_name).cloned()
            {
                let combined = format!("{}.{}", modname, field);
                return if is_main {
                    resolve_main_module_field(checker, &combined, &modname, &field, span)
                } else {
                    resolve_builtin_module_field(checker, &combined, span)
                };
            }
        }
    }
    resolve_field_access(checker, lhs, field, span)
}

fn resolve_main_module_field(
    checker: &mut Checker,
    combined: &str,
    modname: &str,
    field: &str,
    span: Span,
) -> Result<Var, Diagnostic> {
    match checker.symbols.find_symbol(combined).cloned() {
        Some(binding) => {
            let ty = type_of_binding(checker, &binding, span, combined)?;
            Ok(finish_name(combined.to_string(), span, ty, binding))
        }
        None => Err(checker.scope_error(span, format!("module '{}' has no field '{}'", modname, field))),
    }
}

fn resolve_builtin_module_field(checker: &mut Checker, combined: &str, span: Span) -> Result<Var, Diagnostic> {
    match checker.catalog.function(combined) {
        Some(ft) => {
            let ty = Type::Function(ft.clone());
            Ok(finish_name(combined.to_string(), span, ty, Binding::Builtin(combined.to_string())))
        }
        None => Err(checker.type_error(span, format!("unknown function '{}'", combined))),
    }
}

fn resolve_field_access(checker: &mut Checker, lhs: Exp, field: String, span: Span) -> Result<Var, Diagnostic> {
    let lhs = synthesize(checker, lhs)?;
    let lhs_ty = lhs.ty.clone().expect("synthesize always sets _type");
    if !lhs_ty.is_indexable() {
        return Err(checker.type_error(span, format!("type '{}' is not indexable", lhs_ty)));
    }
    match lhs_ty.field_type(&field) {
        Some(field_ty) => {
            Ok(Var { kind: VarKind::Dot(Box::new(lhs), field), span, ty: Some(field_ty), binding: None })
        }
        None => Err(checker.type_error(span, format!("type '{}' has no field '{}'", lhs_ty, field))),
    }
}

fn resolve_bracket(checker: &mut Checker, t: Exp, k: Exp, span: Span) -> Result<Var, Diagnostic> {
    let t = synthesize(checker, t)?;
    let t_ty = t.ty.clone().expect("synthesize always sets _type");
    let elem = match &t_ty {
        Type::Array(elem) => (**elem).clone(),
        other => return Err(checker.type_error(span, format!("type '{}' is not an array", other))),
    };
    let k = super::verify(checker, k, &Type::Integer, "array index")?;
    Ok(Var { kind: VarKind::Bracket(Box::new(t), Box::new(k)), span, ty: Some(elem), binding: None })
}

fn type_of_binding(checker: &Checker, binding: &Binding, span: Span, name: &str) -> Result<Type, Diagnostic> {
    match binding {
        Binding::Type(_) => Err(checker.type_error(span, format!("'{}' is not a value", name))),
        Binding::Local(decl) | Binding::Global(decl) | Binding::Function(decl) => {
            Ok(decl.ty.clone().expect("a bound declaration is always already checked"))
        }
        Binding::Builtin(bname) => {
            let ft = checker
                .catalog
                .function(bname)
                .expect("a BuiltinBind always resolves in the catalog it was built from");
            Ok(Type::Function(ft.clone()))
        }
        Binding::Module { is_main: true, .. } => Ok(Type::Module),
        Binding::Module { name: modname, is_main: false } => Err(checker.type_error(
            span,
            format!("cannot reference module '{}' without dot notation", modname),
        )),
    }
}

fn finish_name(name: String, span: Span, ty: Type, binding: Binding) -> Var {
    Var { kind: VarKind::Name(name), span, ty: Some(ty), binding: Some(binding) }
}
