//! Abstract Syntax Tree.
//!
//! Declaration sites (`VarDec`, `FieldDec`, the `for` loop variable) carry an
//! `escape` flag in a [`Cell`]. The tree is shared immutably between passes;
//! escape analysis flips the flag through a `&Cell<bool>` without needing
//! mutable access to the whole tree.

use std::cell::Cell;
use std::fmt;

use smol_str::SmolStr;

use crate::lexer::BinOp;
use tiger_diagnostics::span::Spanned;

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ident(pub SmolStr);

impl Ident {
    pub fn new(str: impl AsRef<str>) -> Self {
        Self(SmolStr::new(str))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.as_str().fmt(f)
    }
}

/// The root of the AST. A Tiger program is a single expression.
#[derive(Debug, PartialEq, Eq)]
pub struct Program {
    pub expr: Spanned<Expr>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Expr {
    Var(Spanned<Var>),

    Nil,
    Int(i64),
    Str(String),

    Call(Spanned<CallExpr>),
    Op(Spanned<OpExpr>),
    Neg(Spanned<NegExpr>),

    Record(Spanned<RecordExpr>),
    Array(Spanned<ArrayExpr>),
    Seq(Spanned<SeqExpr>),

    Assign(Spanned<AssignExpr>),

    If(Spanned<IfExpr>),
    While(Spanned<WhileExpr>),
    For(Spanned<ForExpr>),
    Break,

    Let(Spanned<LetExpr>),
}

/// An lvalue: a simple variable, a record field access, or an array
/// subscript.
#[derive(Debug, PartialEq, Eq)]
pub enum Var {
    Simple(Spanned<Ident>),
    Field(Spanned<FieldVar>),
    Subscript(Spanned<SubscriptVar>),
}

#[derive(Debug, PartialEq, Eq)]
pub struct FieldVar {
    pub var: Box<Spanned<Var>>,
    pub field: Spanned<Ident>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct SubscriptVar {
    pub var: Box<Spanned<Var>>,
    pub index: Box<Spanned<Expr>>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct CallExpr {
    pub func: Spanned<Ident>,
    pub args: Vec<Spanned<Expr>>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct OpExpr {
    pub lhs: Box<Spanned<Expr>>,
    pub op: Spanned<BinOp>,
    pub rhs: Box<Spanned<Expr>>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct NegExpr {
    pub expr: Box<Spanned<Expr>>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RecordExpr {
    pub ty: Spanned<Ident>,
    pub fields: Vec<Spanned<FieldInit>>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct FieldInit {
    pub ident: Spanned<Ident>,
    pub expr: Spanned<Expr>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ArrayExpr {
    pub ty: Spanned<Ident>,
    pub size: Box<Spanned<Expr>>,
    pub init: Box<Spanned<Expr>>,
}

/// A parenthesized sequence of expressions: `(e1; e2; ...)`. A sequence with
/// a single element is represented as just the expression itself.
#[derive(Debug, PartialEq, Eq)]
pub struct SeqExpr {
    pub exprs: Vec<Spanned<Expr>>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct AssignExpr {
    pub var: Spanned<Var>,
    pub expr: Box<Spanned<Expr>>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct IfExpr {
    pub cond: Box<Spanned<Expr>>,
    pub then: Box<Spanned<Expr>>,
    pub else_: Option<Box<Spanned<Expr>>>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct WhileExpr {
    pub cond: Box<Spanned<Expr>>,
    pub body: Box<Spanned<Expr>>,
}

/// `for var := lo to hi do body`. The loop variable is an implicit
/// declaration scoped to the body, so it has its own escape flag.
#[derive(Debug, PartialEq, Eq)]
pub struct ForExpr {
    pub var: Spanned<Ident>,
    pub escape: Cell<bool>,
    pub lo: Box<Spanned<Expr>>,
    pub hi: Box<Spanned<Expr>>,
    pub body: Box<Spanned<Expr>>,
}

/// `let decs in exprs end`.
#[derive(Debug, PartialEq, Eq)]
pub struct LetExpr {
    pub decs: Vec<Spanned<Dec>>,
    pub body: Vec<Spanned<Expr>>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Dec {
    Var(Spanned<VarDec>),
    /// Adjacent function declarations form a single mutually recursive group.
    Fun(Vec<Spanned<FunDec>>),
    /// Adjacent type declarations form a single mutually recursive group.
    Type(Vec<Spanned<TypeDec>>),
}

#[derive(Debug, PartialEq, Eq)]
pub struct VarDec {
    pub ident: Spanned<Ident>,
    pub ty: Option<Spanned<Ident>>,
    pub init: Box<Spanned<Expr>>,
    pub escape: Cell<bool>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct FunDec {
    pub ident: Spanned<Ident>,
    pub params: Vec<Spanned<FieldDec>>,
    pub result: Option<Spanned<Ident>>,
    pub body: Box<Spanned<Expr>>,
}

/// A `name: type` field. Used both for function formals and for the fields
/// of a record type.
#[derive(Debug, PartialEq, Eq)]
pub struct FieldDec {
    pub ident: Spanned<Ident>,
    pub ty: Spanned<Ident>,
    pub escape: Cell<bool>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct TypeDec {
    pub ident: Spanned<Ident>,
    pub ty: Spanned<Ty>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Ty {
    Name(Spanned<Ident>),
    Record(Vec<Spanned<FieldDec>>),
    Array(Spanned<Ident>),
}
