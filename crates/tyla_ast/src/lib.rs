//! AST node definitions for the tyla checker.
//!
//! These types model a parsed-but-unchecked program on the way in, and the
//! same tree, decorated in place, on the way out. Every node carries the
//! annotation fields the checker fills in (`ty`, `types`, `binding`,
//! `modname`) as plain `Option` fields rather than a side table, since
//! checking here consumes and re-emits nodes by value.

use std::rc::Rc;

use tyla_types::Type;

/// Source location: line and column are 1-based. The containing file name
/// is not carried per-span — a `Program` belongs to a single compilation
/// unit, and the file name is supplied once, alongside the program, to
/// whichever routine needs to render a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Program {
    pub tls: Vec<TopLevel>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TopLevel {
    pub kind: TopLevelKind,
    pub span: Span,
    /// Set only on `Record` items; `_type` per the base annotation list.
    pub ty: Option<Type>,
}

impl TopLevel {
    pub fn new(kind: TopLevelKind, span: Span) -> Self {
        Self { kind, span, ty: None }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum TopLevelKind {
    Var(Decl, Exp),
    Func(FuncName, Decl, Lambda),
    Typealias(String, TypeNode),
    Record(String, Vec<FieldDecl>),
    Stat(Stat),
}

/// The name half of a (possibly module-qualified) function declaration,
/// e.g. `function io.write(...)`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FuncName {
    pub var: Var,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Decl {
    pub name: String,
    pub type_node: Option<TypeNode>,
    pub span: Span,
    pub ty: Option<Type>,
    /// Set when this declaration is introduced as a field of the main module.
    pub modname: Option<String>,
}

impl Decl {
    pub fn new(name: impl Into<String>, type_node: Option<TypeNode>, span: Span) -> Self {
        Self {
            name: name.into(),
            type_node,
            span,
            ty: None,
            modname: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FieldDecl {
    pub name: String,
    pub type_node: TypeNode,
    pub span: Span,
}

/// A syntactic type annotation, as written by the user, prior to resolution.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TypeNode {
    pub kind: TypeNodeKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum TypeNodeKind {
    Nil,
    Module,
    Name(String),
    Array(Box<TypeNode>),
    Table(Vec<(String, TypeNode)>),
    Function(Vec<TypeNode>, Vec<TypeNode>),
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Stat {
    pub kind: StatKind,
    pub span: Span,
}

impl Stat {
    pub fn new(kind: StatKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum StatKind {
    Decl(Vec<Decl>, Vec<Exp>),
    Block(Vec<Stat>),
    While(Exp, Vec<Stat>),
    Repeat(Vec<Stat>, Exp),
    ForNum {
        decl: Decl,
        start: Exp,
        limit: Exp,
        step: Option<Exp>,
        block: Vec<Stat>,
    },
    ForIn(Vec<Decl>, Vec<Exp>, Vec<Stat>),
    Assign(Vec<Var>, Vec<Exp>),
    Call(Exp),
    Return(Vec<Exp>),
    If(Exp, Vec<Stat>, Option<Vec<Stat>>),
    Break,
    Func(FuncName, Decl, Lambda),
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Lambda {
    pub params: Vec<Decl>,
    pub body: Vec<Stat>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Var {
    pub kind: VarKind,
    pub span: Span,
    pub ty: Option<Type>,
    pub binding: Option<Binding>,
}

impl Var {
    pub fn new(kind: VarKind, span: Span) -> Self {
        Self { kind, span, ty: None, binding: None }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum VarKind {
    Name(String),
    Dot(Box<Exp>, String),
    Bracket(Box<Exp>, Box<Exp>),
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Exp {
    pub kind: ExpKind,
    pub span: Span,
    pub ty: Option<Type>,
    /// Full return-tuple; only ever set on `CallFunc`/`CallMethod`.
    pub types: Option<Vec<Type>>,
}

impl Exp {
    pub fn new(kind: ExpKind, span: Span) -> Self {
        Self { kind, span, ty: None, types: None }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ExpKind {
    Nil,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Var(Box<Var>),
    Unop(UnOp, Box<Exp>),
    Binop(BinOp, Box<Exp>, Box<Exp>),
    Initlist(Vec<Field>),
    Lambda(Lambda),
    CallFunc(Box<Exp>, Vec<Exp>),
    CallMethod(Box<Exp>, String, Vec<Exp>),
    Cast(Box<Exp>, Option<TypeNode>),
    Paren(Box<Exp>),
    /// Synthesized during multi-return expansion; `usize` is the 1-based
    /// return index into the originating call's `types`.
    ExtraRet(Rc<Exp>, usize),
    ToFloat(Box<Exp>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum UnOp {
    Len,
    Neg,
    BNot,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BinOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Add,
    Sub,
    Mul,
    Mod,
    IDiv,
    Div,
    Pow,
    Concat,
    And,
    Or,
    BOr,
    BAnd,
    BXor,
    Shl,
    Shr,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Field {
    Rec(String, Exp),
    List(Exp),
}

/// A resolved binding, as stored in the symbol table and attached to every
/// resolved `Var::Name` node. `Local`/`Global`/`Function` hold a shared,
/// already-decorated declaration rather than duplicating it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Binding {
    Type(Type),
    Local(Rc<Decl>),
    Global(Rc<Decl>),
    Function(Rc<Decl>),
    Builtin(String),
    Module { name: String, is_main: bool },
}

impl Binding {
    pub fn describe(&self) -> &'static str {
        match self {
            Binding::Type(_) => "type",
            Binding::Local(_) => "local variable",
            Binding::Global(_) => "global variable",
            Binding::Function(_) => "function",
            Binding::Builtin(_) => "builtin",
            Binding::Module { .. } => "module",
        }
    }
}
