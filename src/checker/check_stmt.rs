//! Statement checker (C8): walks statements, manages scope entry/exit,
//! dispatches to the expression checker, enforces return-arity.

use std::rc::Rc;

use tyla_ast::{Binding, Decl, Exp, ExpKind, FuncName, Span, Stat, StatKind, Var, VarKind};
use tyla_types::Type;

use super::check_expr::{expand_returns, resolve_var, synthesize, verify};
use super::diagnostics::Diagnostic;
use super::type_resolve::resolve_type;
use super::Checker;

/// Checks a list of statements in the *current* scope (no scope is pushed
/// or popped here — callers that need a fresh scope wrap this in
/// `Checker::with_block`).
pub fn check_block(checker: &mut Checker, stats: Vec<Stat>) -> Result<Vec<Stat>, Diagnostic> {
    stats.into_iter().map(|s| check_statement(checker, s)).collect()
}

pub fn check_statement(checker: &mut Checker, stat: Stat) -> Result<Stat, Diagnostic> {
    let span = stat.span;
    match stat.kind {
        StatKind::Decl(decls, exps) => check_decl(checker, decls, exps, span),
        StatKind::Block(stats) => {
            let stats = checker.with_block(|checker| check_block(checker, stats))?;
            Ok(Stat::new(StatKind::Block(stats), span))
        }
        StatKind::While(cond, block) => {
            let cond = synthesize(checker, cond)?;
            require_condition_typed(checker, &cond)?;
            let block = checker.with_block(|checker| check_block(checker, block))?;
            Ok(Stat::new(StatKind::While(cond, block), span))
        }
        StatKind::Repeat(block, cond) => {
            let (block, cond) = checker.with_block(|checker| {
                let block = check_block(checker, block)?;
                let cond = synthesize(checker, cond)?;
                require_condition_typed(checker, &cond)?;
                Ok((block, cond))
            })?;
            Ok(Stat::new(StatKind::Repeat(block, cond), span))
        }
        StatKind::ForNum { decl, start, limit, step, block } => {
            check_for_num(checker, decl, start, limit, step, block, span)
        }
        StatKind::ForIn(decls, exps, block) => check_for_in(checker, decls, exps, block, span),
        StatKind::Assign(vars, exps) => check_assign(checker, vars, exps, span),
        StatKind::Call(exp) => {
            let exp = synthesize(checker, exp)?;
            Ok(Stat::new(StatKind::Call(exp), span))
        }
        StatKind::Return(exps) => check_return(checker, exps, span),
        StatKind::If(cond, then_block, else_block) => {
            let cond = synthesize(checker, cond)?;
            require_condition_typed(checker, &cond)?;
            let then_block = checker.with_block(|checker| check_block(checker, then_block))?;
            let else_block = match else_block {
                Some(stats) => Some(checker.with_block(|checker| check_block(checker, stats))?),
                None => None,
            };
            Ok(Stat::new(StatKind::If(cond, then_block, else_block), span))
        }
        StatKind::Break => Ok(Stat::new(StatKind::Break, span)),
        StatKind::Func(name, decl, lambda) => check_func(checker, name, decl, lambda, span),
    }
}

fn require_condition_typed(checker: &Checker, exp: &Exp) -> Result<(), Diagnostic> {
    let ty = exp.ty.clone().expect("synthesize always sets _type");
    if ty.is_condition_typed() {
        Ok(())
    } else {
        Err(checker.type_error(exp.span, format!("expected a boolean condition, found '{}'", ty)))
    }
}

/// `decl.type` present: resolve it, then verify `exp` (if any) against it.
/// `decl.type` absent: require `exp`, synthesize it, copy its type onto the
/// declaration.
pub fn check_initializer_exp(
    checker: &mut Checker,
    mut decl: Decl,
    exp: Option<Exp>,
) -> Result<(Decl, Option<Exp>), Diagnostic> {
    if let Some(node) = decl.type_node.clone() {
        let ty = resolve_type(&checker.symbols, checker.file(), &node)?;
        decl.ty = Some(ty.clone());
        match exp {
            Some(exp) => {
                let exp = verify(checker, exp, &ty, "initializer")?;
                Ok((decl, Some(exp)))
            }
            None => Ok((decl, None)),
        }
    } else {
        let exp = exp.ok_or_else(|| {
            checker.type_error(decl.span, format!("'{}' needs a type annotation", decl.name))
        })?;
        let exp = synthesize(checker, exp)?;
        decl.ty = exp.ty.clone();
        Ok((decl, Some(exp)))
    }
}

fn check_decl(checker: &mut Checker, decls: Vec<Decl>, exps: Vec<Exp>, span: Span) -> Result<Stat, Diagnostic> {
    let exps = expand_returns(checker, exps)?;
    let mut exps_iter = exps.into_iter();
    let mut checked_decls = Vec::with_capacity(decls.len());
    let mut checked_exps = Vec::new();
    for decl in decls {
        let exp = exps_iter.next();
        let (decl, exp) = check_initializer_exp(checker, decl, exp)?;
        if decl.modname.is_some() {
            checker.register_module_field(&decl.name, decl.span)?;
        }
        if decl.ty == Some(Type::Module) {
            checker.register_main_module(&decl.name, decl.span)?;
            checker
                .symbols
                .add_symbol(decl.name.clone(), Binding::Module { name: decl.name.clone(), is_main: true });
        } else {
            let rc = Rc::new(decl.clone());
            if decl.modname.is_some() || checker.symbols.depth() == 1 {
                checker.symbols.add_symbol(decl.name.clone(), Binding::Global(rc));
            } else {
                checker.symbols.add_symbol(decl.name.clone(), Binding::Local(rc));
            }
        }
        checked_decls.push(decl);
        if let Some(exp) = exp {
            checked_exps.push(exp);
        }
    }
    Ok(Stat::new(StatKind::Decl(checked_decls, checked_exps), span))
}

fn default_step(loop_ty: &Type, span: Span) -> Exp {
    match loop_ty {
        Type::Integer => Exp { kind: ExpKind::Integer(1), span, ty: Some(Type::Integer), types: None },
        Type::Float => Exp { kind: ExpKind::Float(1.0), span, ty: Some(Type::Float), types: None },
        other => unreachable!("for-loop control type was already verified numeric, found {:?}", other),
    }
}

#[allow(clippy::too_many_arguments)]
fn check_for_num(
    checker: &mut Checker,
    decl: Decl,
    start: Exp,
    limit: Exp,
    step: Option<Exp>,
    block: Vec<Stat>,
    span: Span,
) -> Result<Stat, Diagnostic> {
    let (decl, start) = check_initializer_exp(checker, decl, Some(start))?;
    let start = start.expect("a ForNum start expression is always supplied");
    let loop_ty = decl.ty.clone().expect("check_initializer_exp always sets decl.ty");
    if !loop_ty.is_numeric() {
        return Err(checker.type_error(
            decl.span,
            format!("for-loop control variable must be integer or float, found '{}'", loop_ty),
        ));
    }
    let limit = verify(checker, limit, &loop_ty, "for-loop limit")?;
    let step = match step {
        Some(step) => verify(checker, step, &loop_ty, "for-loop step")?,
        None => default_step(&loop_ty, limit.span),
    };

    let decl_for_scope = decl.clone();
    let block = checker.with_block(|checker| {
        let rc = Rc::new(decl_for_scope.clone());
        checker.symbols.add_symbol(decl_for_scope.name.clone(), Binding::Local(rc));
        check_block(checker, block)
    })?;

    Ok(Stat::new(StatKind::ForNum { decl, start, limit, step: Some(step), block }, span))
}

fn check_for_in(
    checker: &mut Checker,
    decls: Vec<Decl>,
    exps: Vec<Exp>,
    block: Vec<Stat>,
    span: Span,
) -> Result<Stat, Diagnostic> {
    let exps = expand_returns(checker, exps)?;
    if exps.len() < 3 {
        return Err(checker.type_error(span, "for-in requires an iterator, a state, and a control expression"));
    }
    let mut exps_iter = exps.into_iter();
    let iterator = synthesize(checker, exps_iter.next().unwrap())?;
    let state = synthesize(checker, exps_iter.next().unwrap())?;
    let control = synthesize(checker, exps_iter.next().unwrap())?;
    let rest: Vec<Exp> = exps_iter.collect();

    let iter_ty = iterator.ty.clone().expect("synthesize always sets _type");
    let ft = match &iter_ty {
        Type::Function(ft) => ft.clone(),
        other => return Err(checker.type_error(iterator.span, format!("for-in iterator must be a function, found '{}'", other))),
    };
    if ft.args != vec![Type::Any, Type::Any] {
        return Err(checker.type_error(iterator.span, "for-in iterator must accept (any, any)"));
    }
    if ft.rets.len() != decls.len() {
        return Err(checker.type_error(
            iterator.span,
            format!("iterator returns {} value(s), expected {}", ft.rets.len(), decls.len()),
        ));
    }

    let state_ty = state.ty.clone().expect("synthesize always sets _type");
    if state_ty != Type::Any {
        return Err(checker.type_error(state.span, format!("expected any but found '{}' in loop state value", state_ty)));
    }
    let control_ty = control.ty.clone().expect("synthesize always sets _type");
    if control_ty != Type::Any {
        // Preserved quirk: this diagnostic points at `state`'s location, not `control`'s.
        return Err(checker.type_error(
            state.span,
            format!("expected any but found '{}' in loop control value", control_ty),
        ));
    }

    let (decls, block) = checker.with_block(|checker| {
        let mut checked_decls = Vec::with_capacity(decls.len());
        for (mut decl, ret_ty) in decls.into_iter().zip(ft.rets.iter()) {
            let bound_ty = if let Some(node) = decl.type_node.clone() {
                let declared = resolve_type(&checker.symbols, checker.file(), &node)?;
                if !declared.consistent(ret_ty) {
                    return Err(checker.type_error(
                        decl.span,
                        format!("loop variable type '{}' is not consistent with iterator return '{}'", declared, ret_ty),
                    ));
                }
                declared
            } else {
                ret_ty.clone()
            };
            decl.ty = Some(bound_ty);
            let rc = Rc::new(decl.clone());
            checker.symbols.add_symbol(decl.name.clone(), Binding::Local(rc));
            checked_decls.push(decl);
        }
        let block = check_block(checker, block)?;
        Ok((checked_decls, block))
    })?;

    let mut full_exps = vec![iterator, state, control];
    full_exps.extend(rest);
    Ok(Stat::new(StatKind::ForIn(decls, full_exps, block), span))
}

/// A qualified-name owner resolved to a `ModuleBind`, flattened and split
/// into its module name and field name.
fn dotted_module_field(checker: &Checker, lhs: &Exp, field: &str) -> Option<(String, String, bool)> {
    let ExpKind::Var(inner) = &lhs.kind else { return None };
    let VarKind::Name(base) = &inner.kind else { return None };
    match checker.symbols.find_symbol(base) {
        Some(Binding::Module { name, is_main }) => Some((name.clone(), field.to_string(), *is_main)),
        _ => None,
    }
}

fn check_assign(checker: &mut Checker, mut vars: Vec<Var>, exps: Vec<Exp>, span: Span) -> Result<Stat, Diagnostic> {
    if vars.len() == 1 {
        if let VarKind::Dot(lhs, field) = &vars[0].kind {
            if let Some((modname, field, true)) = dotted_module_field(checker, lhs, field) {
                let combined = format!("{}.{}", modname, field);
                let decl_span = vars[0].span;
                let mut decl = Decl::new(combined, None, decl_span);
                decl.modname = Some(modname);
                return check_statement(checker, Stat::new(StatKind::Decl(vec![decl], exps), span));
            }
        }
    }

    let exps = expand_returns(checker, exps)?;
    if vars.len() != exps.len() {
        return Err(checker.type_error(
            span,
            format!("expected {} value(s) on the right-hand side, found {}", vars.len(), exps.len()),
        ));
    }

    let mut checked_vars = Vec::with_capacity(vars.len());
    let mut checked_exps = Vec::with_capacity(exps.len());
    for (var, exp) in vars.drain(..).zip(exps) {
        let var = resolve_var(checker, var)?;
        if matches!(var.binding, Some(Binding::Function(_)) | Some(Binding::Builtin(_))) {
            return Err(checker.type_error(var.span, "cannot assign to a function"));
        }
        let var_ty = var.ty.clone().expect("resolve_var always sets _type");
        let exp = verify(checker, exp, &var_ty, "assignment")?;
        checked_vars.push(var);
        checked_exps.push(exp);
    }
    Ok(Stat::new(StatKind::Assign(checked_vars, checked_exps), span))
}

fn check_return(checker: &mut Checker, exps: Vec<Exp>, span: Span) -> Result<Stat, Diagnostic> {
    let expected = checker.current_return_types().to_vec();
    let exps = expand_returns(checker, exps)?;
    if exps.len() != expected.len() {
        return Err(checker.type_error(
            span,
            format!("expected {} return value(s), found {}", expected.len(), exps.len()),
        ));
    }
    let mut checked = Vec::with_capacity(exps.len());
    for (exp, ty) in exps.into_iter().zip(expected.iter()) {
        checked.push(verify(checker, exp, ty, "return value")?);
    }
    Ok(Stat::new(StatKind::Return(checked), span))
}

fn check_func(
    checker: &mut Checker,
    name: FuncName,
    mut decl: Decl,
    lambda: tyla_ast::Lambda,
    span: Span,
) -> Result<Stat, Diagnostic> {
    let ft_node = decl
        .type_node
        .clone()
        .unwrap_or_else(|| unreachable!("a Func statement always carries a function type annotation"));
    let resolved = resolve_type(&checker.symbols, checker.file(), &ft_node)?;
    decl.ty = Some(resolved.clone());

    let mut var = name.var;
    if let VarKind::Dot(lhs, field) = &var.kind {
        if let Some((modname, field, is_main)) = dotted_module_field(checker, lhs, field) {
            let combined = format!("{}.{}", modname, field);
            decl.name = combined.clone();
            if is_main {
                decl.modname = Some(modname);
            }
            var = Var { kind: VarKind::Name(combined), span: var.span, ty: None, binding: None };
        }
    }

    if decl.modname.is_some() {
        checker.register_module_field(&decl.name, decl.span)?;
    }

    let decl_rc = Rc::new(decl.clone());
    checker.symbols.add_symbol(decl.name.clone(), Binding::Function(Rc::clone(&decl_rc)));
    var.ty = Some(resolved.clone());
    var.binding = Some(Binding::Function(Rc::clone(&decl_rc)));

    let lambda_exp = Exp::new(ExpKind::Lambda(lambda), span);
    let checked = verify(checker, lambda_exp, &resolved, "function body")?;
    let lambda = match checked.kind {
        ExpKind::Lambda(l) => l,
        other => unreachable!("verify on an ExpKind::Lambda always returns one, found {:?}", other),
    };

    Ok(Stat::new(StatKind::Func(FuncName { var }, decl, lambda), span))
}
