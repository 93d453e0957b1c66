//! Program driver (C9): partitions top-level items into letrec groups,
//! resolves type-level items, checks statements in order, and enforces the
//! end-of-program module-return shape.

use std::collections::HashSet;

use tyla_ast::{Binding, FieldDecl, Program, Span, Stat, StatKind, TopLevel, TopLevelKind, TypeNode, TypeNodeKind};
use tyla_types::{RecordType, Type};

use super::check_stmt::check_statement;
use super::diagnostics::Diagnostic;
use super::type_resolve::resolve_type;
use super::Checker;

#[derive(PartialEq, Eq, Clone, Copy)]
enum KindClass {
    Var,
    Func,
    Type,
    Stat,
}

fn kind_class(tl: &TopLevel) -> KindClass {
    match &tl.kind {
        TopLevelKind::Var(..) => KindClass::Var,
        TopLevelKind::Func(..) => KindClass::Func,
        TopLevelKind::Typealias(..) | TopLevelKind::Record(..) => KindClass::Type,
        TopLevelKind::Stat(..) => KindClass::Stat,
    }
}

/// A maximal run of consecutive top-level items sharing one kind class.
fn letrec_groups(tls: Vec<TopLevel>) -> Vec<Vec<TopLevel>> {
    let mut groups: Vec<Vec<TopLevel>> = Vec::new();
    for tl in tls {
        let class = kind_class(&tl);
        match groups.last_mut() {
            Some(group) if kind_class(&group[0]) == class => group.push(tl),
            _ => groups.push(vec![tl]),
        }
    }
    groups
}

pub fn check_program(checker: &mut Checker, program: Program) -> Result<Program, Diagnostic> {
    let mut tls = program.tls;
    let Some(last) = tls.pop() else {
        return Err(checker.type_error(Span::new(1, 1), "program must end with a return of the main module"));
    };
    let last_span = last.span;
    let last_stat = match last.kind {
        TopLevelKind::Stat(stat) if matches!(stat.kind, StatKind::Return(_)) => stat,
        _ => return Err(checker.type_error(last_span, "program must end with a return of the main module")),
    };

    // Reject a stray `Return` among the earlier items before checking any of
    // them: checking one would otherwise need a return-types stack frame
    // that isn't pushed until the final item below.
    for tl in &tls {
        if let TopLevelKind::Stat(stat) = &tl.kind {
            if matches!(stat.kind, StatKind::Return(_)) {
                return Err(checker.type_error(tl.span, "only the final statement may be a return"));
            }
        }
    }

    let groups = letrec_groups(tls);
    let mut checked: Vec<TopLevel> = Vec::new();
    for group in groups {
        match kind_class(&group[0]) {
            KindClass::Type => {
                for tl in group {
                    checked.push(check_type_item(checker, tl)?);
                }
            }
            KindClass::Stat => {
                for tl in group {
                    checked.push(check_stat_item(checker, tl)?);
                }
            }
            KindClass::Var | KindClass::Func => {
                for tl in group {
                    checked.push(check_stat_item(checker, wrap_as_stat(tl)?)?);
                }
            }
        }
    }

    checker.push_return_types(vec![Type::Module]);
    let checked_return = check_statement(checker, last_stat)?;
    checker.pop_return_types();
    if let StatKind::Return(exps) = &checked_return.kind {
        let ty = exps.first().and_then(|e| e.ty.clone());
        if ty != Some(Type::Module) {
            return Err(checker.type_error(last_span, "the program's final return must produce a module"));
        }
    }

    Ok(Program { tls: checked })
}

/// `Var`/`Func` top-level items are checked through the same statement
/// machinery as their `Stat` counterparts: wrap them into the equivalent
/// `Stat::Decl`/`Stat::Func` shape before dispatching.
fn wrap_as_stat(tl: TopLevel) -> Result<TopLevel, Diagnostic> {
    let span = tl.span;
    let stat = match tl.kind {
        TopLevelKind::Var(decl, exp) => Stat::new(StatKind::Decl(vec![decl], vec![exp]), span),
        TopLevelKind::Func(name, decl, lambda) => Stat::new(StatKind::Func(name, decl, lambda), span),
        other => unreachable!("wrap_as_stat only ever receives Var/Func items, found {:?}", other),
    };
    Ok(TopLevel::new(TopLevelKind::Stat(stat), span))
}

fn check_stat_item(checker: &mut Checker, tl: TopLevel) -> Result<TopLevel, Diagnostic> {
    let span = tl.span;
    match tl.kind {
        TopLevelKind::Stat(stat) => {
            let stat = check_statement(checker, stat)?;
            Ok(TopLevel::new(TopLevelKind::Stat(stat), span))
        }
        other => unreachable!("check_stat_item only ever receives a Stat item, found {:?}", other),
    }
}

fn check_type_item(checker: &mut Checker, tl: TopLevel) -> Result<TopLevel, Diagnostic> {
    let span = tl.span;
    match tl.kind {
        TopLevelKind::Typealias(name, node) => {
            let ty = resolve_type(&checker.symbols, checker.file(), &node)?;
            checker.symbols.add_symbol(name.clone(), Binding::Type(ty));
            Ok(TopLevel::new(TopLevelKind::Typealias(name, node), span))
        }
        TopLevelKind::Record(name, fields) => check_record(checker, name, fields, span),
        other => unreachable!("check_type_item only ever receives a Type-class item, found {:?}", other),
    }
}

/// Resolves each field's type *before* the record's own name is bound, so a
/// field referring to the record itself (or to another record in the same
/// letrec group that hasn't resolved yet) surfaces as an "unknown type"
/// scope error rather than silently permitting recursion (see `DESIGN.md`).
fn check_record(
    checker: &mut Checker,
    name: String,
    fields: Vec<FieldDecl>,
    span: Span,
) -> Result<TopLevel, Diagnostic> {
    let mut seen = HashSet::new();
    let mut resolved_fields = Vec::with_capacity(fields.len());
    for field in &fields {
        if !seen.insert(field.name.clone()) {
            return Err(checker.type_error(field.span, format!("duplicate field '{}' in record '{}'", field.name, name)));
        }
        let ty = resolve_type(&checker.symbols, checker.file(), &field.type_node)?;
        resolved_fields.push((field.name.clone(), ty));
    }
    let record_ty = Type::Record(RecordType { name: name.clone(), fields: resolved_fields });
    checker.symbols.add_symbol(name.clone(), Binding::Type(record_ty.clone()));
    Ok(TopLevel { kind: TopLevelKind::Record(name, fields), span, ty: Some(record_ty) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tyla_ast::{Decl, Exp, ExpKind, Span, TopLevel, TopLevelKind};

    fn module_return_program() -> Program {
        let decl = Decl::new("m", Some(TypeNode { kind: TypeNodeKind::Module, span: Span::new(1, 1) }), Span::new(1, 1));
        let var_item = TopLevel::new(TopLevelKind::Var(decl, Exp::new(ExpKind::Initlist(vec![]), Span::new(1, 1))), Span::new(1, 1));
        let ret_stat = Stat::new(
            StatKind::Return(vec![Exp::new(
                ExpKind::Var(Box::new(tyla_ast::Var::new(tyla_ast::VarKind::Name("m".to_string()), Span::new(2, 1)))),
                Span::new(2, 1),
            )]),
            Span::new(2, 1),
        );
        let ret_item = TopLevel::new(TopLevelKind::Stat(ret_stat), Span::new(2, 1));
        Program { tls: vec![var_item, ret_item] }
    }

    #[test]
    fn smoke_program_succeeds_and_drops_the_trailing_return() {
        let mut checker = Checker::new("t.tl");
        let result = check_program(&mut checker, module_return_program()).unwrap();
        assert_eq!(result.tls.len(), 1);
        match &result.tls[0].kind {
            TopLevelKind::Stat(stat) => match &stat.kind {
                StatKind::Decl(decls, _) => assert_eq!(decls[0].ty, Some(Type::Module)),
                other => panic!("expected Decl, found {:?}", other),
            },
            other => panic!("expected Stat, found {:?}", other),
        }
    }

    #[test]
    fn non_final_return_is_rejected() {
        let mut checker = Checker::new("t.tl");
        let mut program = module_return_program();
        let extra = program.tls[1].clone();
        program.tls.push(extra);
        let err = check_program(&mut checker, program).unwrap_err();
        assert_eq!(err.category(), "type error");
    }

    #[test]
    fn self_referential_record_is_an_unknown_type_scope_error() {
        let mut checker = Checker::new("t.tl");
        let field = tyla_ast::FieldDecl {
            name: "next".to_string(),
            type_node: TypeNode { kind: TypeNodeKind::Name("Node".to_string()), span: Span::new(1, 1) },
            span: Span::new(1, 1),
        };
        let record_item = TopLevel::new(TopLevelKind::Record("Node".to_string(), vec![field]), Span::new(1, 1));
        let mut program = module_return_program();
        program.tls.insert(0, record_item);
        let err = check_program(&mut checker, program).unwrap_err();
        assert_eq!(err.category(), "scope error");
    }

    #[test]
    fn letrec_groups_split_on_kind_class_boundaries() {
        let a = TopLevel::new(TopLevelKind::Typealias("a".to_string(), TypeNode { kind: TypeNodeKind::Name("integer".to_string()), span: Span::new(1, 1) }), Span::new(1, 1));
        let b = TopLevel::new(TopLevelKind::Typealias("b".to_string(), TypeNode { kind: TypeNodeKind::Name("integer".to_string()), span: Span::new(1, 1) }), Span::new(1, 1));
        let stat = TopLevel::new(TopLevelKind::Stat(Stat::new(StatKind::Break, Span::new(1, 1))), Span::new(1, 1));
        let groups = letrec_groups(vec![a, b, stat]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1].len(), 1);
    }
}
