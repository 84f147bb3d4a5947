use expect_test::{expect, Expect};
use tiger_diagnostics::span::FileIdMap;
use tiger_diagnostics::Diagnostics;
use tiger_parser::ast::Program;
use tiger_parser::parser::Parser;

use crate::display::dump_escapes;
use crate::escape::resolve_escapes;

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

/// Parse, run escape analysis, and compare the escape report.
#[track_caller]
fn check(input: &str, expect: Expect) {
    let program = parse(input);
    resolve_escapes(&program);
    expect.assert_eq(&dump_escapes(&program));
}

#[test]
fn local_use_does_not_escape() {
    check(
        "let
            function outer2() =
                let
                    var z := 0
                in z := z + 1
                end
         in outer2()
         end",
        expect![[r#"
            var z: false
        "#]],
    );
}

#[test]
fn use_from_nested_function_escapes() {
    check(
        "let
            function outer(x: int) =
                let
                    var y := 0
                    function inner() = (x := x + 1; y := y + 1)
                in inner()
                end
         in outer(0)
         end",
        expect![[r#"
            param x: true
            var y: true
        "#]],
    );
}

#[test]
fn use_two_levels_down_escapes() {
    check(
        "let
            function a() =
                let
                    var v := 0
                    function b() =
                        let
                            function c() = v := v + 1
                        in c()
                        end
                in b()
                end
         in a()
         end",
        expect![[r#"
            var v: true
        "#]],
    );
}

#[test]
fn formal_used_only_locally_stays_local() {
    check(
        "let function id(x: int): int = x in id(1) end",
        expect![[r#"
            param x: false
        "#]],
    );
}

#[test]
fn formal_used_through_call_argument_escapes() {
    check(
        "let
            function f(x: int) =
                let
                    function g() = f(x)
                in g()
                end
         in f(0)
         end",
        expect![[r#"
            param x: true
        "#]],
    );
}

#[test]
fn shadowing_marks_only_the_inner_declaration() {
    check(
        "let
            function f(p: int) =
                let
                    var p := p + 1
                    function g() = p := p + 1
                in g()
                end
         in f(0)
         end",
        expect![[r#"
            param p: false
            var p: true
        "#]],
    );
}

#[test]
fn initializer_is_resolved_in_the_enclosing_scope() {
    // The nested function inside the initializer refers to the outer `x`,
    // not the binding being introduced.
    check(
        "let
            var x := 0
            function f() =
                let
                    var x := let function g(): int = x in g() end
                in x
                end
         in f()
         end",
        expect![[r#"
            var x: true
            var x: false
        "#]],
    );
}

#[test]
fn loop_variable_used_only_in_the_loop_stays_local() {
    check(
        "for i := 0 to 9 do i",
        expect![[r#"
            for i: false
        "#]],
    );
}

#[test]
fn loop_variable_used_from_nested_function_escapes() {
    check(
        "for i := 0 to 9 do let function g() = i + 1 in g() end",
        expect![[r#"
            for i: true
        "#]],
    );
}

#[test]
fn unresolved_name_is_a_no_op() {
    // Reporting undefined names is the binder's job, not this pass's.
    check(
        "let var a := b in a end",
        expect![[r#"
            var a: false
        "#]],
    );
}

#[test]
fn later_shallow_uses_do_not_clear_the_flag() {
    check(
        "let
            function f() =
                let
                    var y := 0
                    function g() = y := 1
                in (g(); y := 2; y)
                end
         in f()
         end",
        expect![[r#"
            var y: true
        "#]],
    );
}

#[test]
fn record_fields_are_never_marked() {
    check(
        "let
            type point = {x: int, y: int}
            var p := point {x = 0, y = 0}
            function getx(): int = p.x
         in getx()
         end",
        expect![[r#"
            field x: false
            field y: false
            var p: true
        "#]],
    );
}

#[test]
fn rerunning_the_pass_is_stable() {
    let program = parse(
        "let
            function outer(x: int) =
                let
                    var y := 0
                    function inner() = (x := x + 1; y := y + 1)
                in inner()
                end
         in outer(0)
         end",
    );
    resolve_escapes(&program);
    let first = dump_escapes(&program);
    resolve_escapes(&program);
    assert_eq!(first, dump_escapes(&program));
}
