use tiger_diagnostics::span::{FileIdMap, Spanned};
use tiger_diagnostics::Diagnostics;

use crate::ast::*;
use crate::lexer::BinOp;
use crate::parser::{ParseError, Parser};

#[track_caller]
fn parse(input: &str) -> Program {
    let mut map = FileIdMap::new();
    let diagnostics = Diagnostics::default();
    let id = map.create_virtual_file("<test>", input.to_string());

    let mut parser = Parser::new(id, input, diagnostics.clone());
    let program = parser.parse_program().expect("program should parse");
    assert!(diagnostics.eprint(&map));
    program
}

#[track_caller]
fn parse_err(input: &str) -> ParseError {
    let mut map = FileIdMap::new();
    let diagnostics = Diagnostics::default();
    let id = map.create_virtual_file("<test>", input.to_string());

    let mut parser = Parser::new(id, input, diagnostics);
    parser
        .parse_program()
        .err()
        .expect("program should not parse")
}

fn as_let(program: &Program) -> &LetExpr {
    match &*program.expr {
        Expr::Let(let_expr) => let_expr,
        other => panic!("expected a let expression, got {other:?}"),
    }
}

#[test]
fn parse_let_with_var_dec() {
    let program = parse("let var x := 0 in x end");
    let let_expr = as_let(&program);
    assert_eq!(let_expr.decs.len(), 1);
    let Dec::Var(var_dec) = &*let_expr.decs[0] else {
        panic!("expected a var dec");
    };
    assert_eq!(*var_dec.ident.as_ref(), Ident::new("x"));
    assert!(var_dec.ty.is_none());
    assert!(!var_dec.escape.get());
    assert!(matches!(**var_dec.init, Expr::Int(0)));

    assert_eq!(let_expr.body.len(), 1);
    let Expr::Var(Spanned(Var::Simple(ident), _)) = &*let_expr.body[0] else {
        panic!("expected a simple variable");
    };
    assert_eq!(*ident.as_ref(), Ident::new("x"));
}

#[test]
fn parse_adjacent_functions_form_one_group() {
    let program = parse(
        "let
            function f(x: int): int = g(x)
            function g(y: int): int = f(y)
            var a := 0
            function h() = ()
         in f(a)
         end",
    );
    let let_expr = as_let(&program);
    assert_eq!(let_expr.decs.len(), 3);
    let Dec::Fun(group) = &*let_expr.decs[0] else {
        panic!("expected a function group");
    };
    assert_eq!(group.len(), 2);
    assert_eq!(*group[0].ident.as_ref(), Ident::new("f"));
    assert_eq!(group[0].params.len(), 1);
    assert_eq!(*group[0].params[0].ident.as_ref(), Ident::new("x"));
    assert_eq!(*group[1].ident.as_ref(), Ident::new("g"));
    assert!(matches!(&*let_expr.decs[1], Dec::Var(_)));
    let Dec::Fun(group) = &*let_expr.decs[2] else {
        panic!("expected a function group");
    };
    assert_eq!(group.len(), 1);
    assert!(group[0].params.is_empty());
    assert!(group[0].result.is_none());
}

#[test]
fn parse_operator_precedence() {
    let program = parse("1 + 2 * 3");
    let Expr::Op(op) = &*program.expr else {
        panic!("expected a binary op");
    };
    assert_eq!(*op.op, BinOp::Plus);
    assert!(matches!(**op.lhs, Expr::Int(1)));
    let Expr::Op(rhs) = &**op.rhs else {
        panic!("expected a binary op on the rhs");
    };
    assert_eq!(*rhs.op, BinOp::Mul);
}

#[test]
fn parse_comparison_binds_looser_than_arithmetic() {
    let program = parse("x + 1 <> 2");
    let Expr::Op(op) = &*program.expr else {
        panic!("expected a binary op");
    };
    assert_eq!(*op.op, BinOp::Neq);
}

#[test]
fn parse_assignment_to_lvalue() {
    let program = parse("a.b[0] := c");
    let Expr::Assign(assign) = &*program.expr else {
        panic!("expected an assignment");
    };
    let Var::Subscript(subscript) = &*assign.var else {
        panic!("expected a subscript lvalue");
    };
    let Var::Field(field) = &**subscript.var else {
        panic!("expected a field lvalue");
    };
    assert_eq!(*field.field.as_ref(), Ident::new("b"));
    assert!(matches!(**assign.expr, Expr::Var(_)));
}

#[test]
fn parse_assignment_to_non_lvalue_is_an_error() {
    let err = parse_err("1 := 2");
    assert!(matches!(err, ParseError::InvalidAssignTarget { .. }));
}

#[test]
fn parse_array_creation_vs_subscript() {
    let program = parse("let type ints = array of int var a := ints[10] of 0 in a[5] end");
    let let_expr = as_let(&program);
    let Dec::Var(var_dec) = &*let_expr.decs[1] else {
        panic!("expected a var dec");
    };
    let Expr::Array(array) = &**var_dec.init else {
        panic!("expected an array creation");
    };
    assert_eq!(*array.ty.as_ref(), Ident::new("ints"));
    assert!(matches!(**array.size, Expr::Int(10)));

    let Expr::Var(Spanned(Var::Subscript(_), _)) = &*let_expr.body[0] else {
        panic!("expected a subscript");
    };
}

#[test]
fn parse_record_type_and_creation() {
    let program = parse(
        "let
            type point = {x: int, y: int}
            var origin := point {x = 0, y = 0}
         in origin.x
         end",
    );
    let let_expr = as_let(&program);
    let Dec::Type(type_decs) = &*let_expr.decs[0] else {
        panic!("expected a type dec");
    };
    let Ty::Record(fields) = &*type_decs[0].ty else {
        panic!("expected a record type");
    };
    assert_eq!(fields.len(), 2);
    assert!(!fields[0].escape.get());

    let Dec::Var(var_dec) = &*let_expr.decs[1] else {
        panic!("expected a var dec");
    };
    let Expr::Record(record) = &**var_dec.init else {
        panic!("expected a record creation");
    };
    assert_eq!(record.fields.len(), 2);
}

#[test]
fn parse_control_flow() {
    let program = parse("(while x > 0 do x := x - 1; for i := 0 to 10 do f(i); if x then y else z)");
    let Expr::Seq(seq) = &*program.expr else {
        panic!("expected a sequence");
    };
    assert_eq!(seq.exprs.len(), 3);
    assert!(matches!(&*seq.exprs[0], Expr::While(_)));
    let Expr::For(for_expr) = &*seq.exprs[1] else {
        panic!("expected a for loop");
    };
    assert_eq!(*for_expr.var.as_ref(), Ident::new("i"));
    assert!(!for_expr.escape.get());
    let Expr::If(if_expr) = &*seq.exprs[2] else {
        panic!("expected an if");
    };
    assert!(if_expr.else_.is_some());
}

#[test]
fn parse_single_parenthesized_expr_is_not_a_sequence() {
    let program = parse("(1)");
    assert!(matches!(*program.expr, Expr::Int(1)));
}

#[test]
fn parse_skips_comments() {
    let program = parse("1 /* a comment ** with stars */ + 2");
    let Expr::Op(op) = &*program.expr else {
        panic!("expected a binary op");
    };
    assert_eq!(*op.op, BinOp::Plus);
}

#[test]
fn parse_unary_minus() {
    let program = parse("-x + 1");
    let Expr::Op(op) = &*program.expr else {
        panic!("expected a binary op");
    };
    assert!(matches!(**op.lhs, Expr::Neg(_)));
}

#[test]
fn parse_missing_in_is_an_error() {
    let err = parse_err("let var x := 0 x end");
    assert!(matches!(err, ParseError::ExpectedToken { .. }));
}

#[test]
fn parse_trailing_tokens_are_an_error() {
    let err = parse_err("1 2");
    assert!(matches!(err, ParseError::ExpectedToken { .. }));
}
