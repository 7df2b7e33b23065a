use std::sync::Arc;

use futures::executor::block_on;
use pretty_assertions::assert_eq;
use quill_eval::exec::Script;
use quill_eval::{register_stdlib, silent_handler, Context, Obj, PerfConfig, Runtime, Scope};
use quill_ir::Source;

use crate::{parse, ParseError};

fn compile(text: &str) -> Result<Script, ParseError> {
    let source: Arc<Source> = Source::new("test.q", text);
    let tokens = quill_lexer::tokenize(&source).unwrap();
    parse(&source, tokens)
}

fn error(text: &str) -> String {
    compile(text).unwrap_err().message
}

fn run(text: &str) -> Obj {
    let script = compile(text).unwrap();
    let cx = Context::new(Runtime::new(PerfConfig::default(), silent_handler()).unwrap());
    let root = Scope::root();
    register_stdlib(&root, cx.builtins()).unwrap();
    block_on(script.run(&cx, &root.child())).unwrap()
}

#[test]
fn multiplicative_binds_tighter_than_additive() {
    assert_eq!(run("1 + 2 * 3"), Obj::Int(7));
    assert_eq!(run("(1 + 2) * 3"), Obj::Int(9));
    assert_eq!(run("2 * 7 % 4"), Obj::Int(2));
}

#[test]
fn binary_operators_are_left_associative() {
    assert_eq!(run("10 - 4 - 3"), Obj::Int(3));
    assert_eq!(run("64 / 4 / 2"), Obj::Int(8));
}

#[test]
fn comparison_binds_looser_than_range_and_arithmetic() {
    assert_eq!(run("1 + 1 == 2 && 3 > 2"), Obj::Bool(true));
    assert_eq!(run("(1..3).contains(3) || false"), Obj::Bool(true));
    assert_eq!(run("(1..<3).contains(3)"), Obj::Bool(false));
}

#[test]
fn sign_folds_into_numeric_literal() {
    assert_eq!(run("-5.abs()"), Obj::Int(5));
    assert_eq!(run("-0x10"), Obj::Int(-16));
    assert_eq!(run("-2.5"), Obj::Real(-2.5));
    assert_eq!(run("val x = 3\nval y = -x\ny"), Obj::Int(-3));
}

#[test]
fn infix_operator_on_next_line_continues_the_expression() {
    assert_eq!(run("val x = 3\n    - 1\nx"), Obj::Int(2));
}

#[test]
fn assignment_is_right_associative() {
    assert_eq!(run("var a = 0\nvar b = 0\na = b = 3\na + b"), Obj::Int(6));
}

#[test]
fn compound_assignment_and_increments() {
    assert_eq!(run("var x = 10\nx -= 3\nx *= 2\nx %= 5\nx"), Obj::Int(4));
    assert_eq!(run("var x = 1\nval y = x++\ny * 10 + x"), Obj::Int(12));
    assert_eq!(run("var x = 1\nval y = ++x\ny * 10 + x"), Obj::Int(22));
}

#[test]
fn only_places_are_assignable() {
    assert_eq!(error("1 = 2"), "not assignable");
    assert_eq!(error("var a = 1\na + 1 = 2"), "not assignable");
    assert_eq!(error("var a = 1\n++a = 2"), "not assignable");
}

#[test]
fn postfix_increment_result_cannot_be_mutated() {
    let message = "not assignable: result of a postfix increment";
    assert_eq!(error("var x = 1\nx++++"), message);
    assert_eq!(error("var x = 1\n(x++)++"), message);
    assert_eq!(error("var x = 1\n++x++"), message);
}

#[test]
fn defaults_must_not_be_followed_by_required_parameters() {
    assert_eq!(
        error("fun f(a = 1, b) { a }"),
        "missing default value after a defaulted parameter"
    );
    assert!(compile("fun f(a, b = 1, rest...) { a }").is_ok());
}

#[test]
fn variadic_parameter_must_be_last() {
    assert_eq!(
        error("fun f(rest..., a) { a }"),
        "variadic parameter must be last"
    );
}

#[test]
fn duplicate_parameters_are_rejected() {
    assert_eq!(error("fun f(a, a) { a }"), "duplicate parameter a");
}

#[test]
fn variadic_parameter_collects_the_rest() {
    assert_eq!(run("fun f(a, rest...) { rest.size }\nf(1, 2, 3)"), Obj::Int(2));
}

#[test]
fn labels_must_name_an_enclosing_loop() {
    assert_eq!(
        error("while (true) { break nowhere }"),
        "undefined label: nowhere"
    );
    assert_eq!(
        error("outer: while (true) { fun f() { break outer } }"),
        "undefined label: outer"
    );
}

#[test]
fn jumps_outside_loops_are_rejected() {
    assert_eq!(error("break"), "'break' outside of a loop");
    assert_eq!(
        error("while (true) { fun f() { continue } }"),
        "'continue' outside of a loop"
    );
}

#[test]
fn labelled_break_leaves_the_outer_loop() {
    let text = "
        var n = 0
        outer: while (true) {
            while (true) {
                n++
                break outer
            }
        }
        n
    ";
    assert_eq!(run(text), Obj::Int(1));
}

#[test]
fn labelled_continue_in_for_loop() {
    let text = "
        var sum = 0
        rows: for (i in 0..<3) {
            for (j in 0..<3) {
                if (j > i) continue rows
                sum += j
            }
        }
        sum
    ";
    assert_eq!(run(text), Obj::Int(4));
}

#[test]
fn labelled_loops_start_at_their_label() {
    let text = "var i = 0
  outer: while (i < 1) { i++ }
inner: do { i++ } while (i < 3)
  each: for (k in 0..1) {}
    while (false) {}";
    let script = compile(text).unwrap();
    let starts: Vec<(u32, u32)> = script.body().statements()[1..]
        .iter()
        .map(|node| (node.pos().line(), node.pos().column()))
        .collect();
    assert_eq!(starts, vec![(1, 2), (2, 0), (3, 2), (4, 4)]);
}

#[test]
fn do_while_runs_body_first() {
    assert_eq!(run("var n = 5\ndo { n++ } while (n < 3)\nn"), Obj::Int(6));
}

#[test]
fn open_paren_on_new_line_starts_a_statement() {
    assert_eq!(run("val a = 1\n(a + 1)"), Obj::Int(2));
    assert_eq!(run("val a = [1, 2]\n[3]").to_string(), "[3]");
}

#[test]
fn member_access_may_continue_on_next_line() {
    assert_eq!(run("val s = \"abc\"\ns\n    .upper()"), Obj::string("ABC"));
}

#[test]
fn if_is_an_expression() {
    assert_eq!(
        run("val s = if (2 > 1) \"big\" else \"small\"\ns"),
        Obj::string("big")
    );
    assert_eq!(run("if (false) 1"), Obj::Void);
    assert_eq!(run("if (false) 1; else 2"), Obj::Int(2));
}

#[test]
fn return_value_must_start_on_the_same_line() {
    assert_eq!(run("fun f() {\n return\n 5\n}\nf()"), Obj::Void);
    assert_eq!(run("fun f() { return 5 }\nf()"), Obj::Int(5));
}

#[test]
fn function_literals_close_over_their_scope() {
    let text = "
        fun make(x) { fn() { x } }
        make(5)()
    ";
    assert_eq!(run(text), Obj::Int(5));
    assert_eq!(run("fun(a) { a * 2 }(21)"), Obj::Int(42));
}

#[test]
fn class_declaration_with_constructor_and_methods() {
    let text = "
        class Point(val x, var y = 2) {
            var moves = 0
            fun sum() { x + y }
            fun move() { y++; moves++ }
        }
        val p = Point(1)
        p.move()
        p.sum() * 10 + p.moves
    ";
    assert_eq!(run(text), Obj::Int(41));
}

#[test]
fn class_bases_receive_arguments() {
    let text = "
        class Named(val name) { fun greet() { \"hi \" + name } }
        class Dog(n) : Named(n) { }
        Dog(\"rex\").greet()
    ";
    assert_eq!(run(text), Obj::string("hi rex"));
}

#[test]
fn class_body_rejects_statements() {
    assert_eq!(
        error("class C { while (true) { } }"),
        "expected a field, method or init block, found 'while'"
    );
}

#[test]
fn extension_methods_see_this() {
    assert_eq!(run("fun Int.twice() { this * 2 }\n4.twice()"), Obj::Int(8));
}

#[test]
fn try_needs_a_handler() {
    assert_eq!(
        error("try { 1 }"),
        "expected 'catch' or 'finally', found end of input"
    );
}

#[test]
fn typed_catch_selects_the_handler() {
    let text = "
        try {
            1 / 0
        } catch (e: IllegalStateException) {
            \"state\"
        } catch (e: ArithmeticException) {
            \"arith\"
        }
    ";
    assert_eq!(run(text), Obj::string("arith"));
}

#[test]
fn keywords_are_not_names() {
    assert_eq!(error("val = 3"), "expected a variable name, found '='");
    assert_eq!(error("val class = 3"), "expected a variable name, found 'class'");
    assert_eq!(error("1 + else"), "unexpected 'else'");
}

#[test]
fn errors_carry_the_offending_position() {
    let err = compile("val a = 1\nval b = )").unwrap_err();
    assert_eq!(err.message, "expected an expression, found ')'");
    assert_eq!((err.pos.line(), err.pos.column()), (1, 8));
}

#[test]
fn top_level_block_counts_declarations() {
    let script = compile("val a = 1; fun f() { a }; class C; f()").unwrap();
    assert_eq!(script.body().declared(), 3);
    assert_eq!(script.body().len(), 4);
}

#[test]
fn deeply_nested_parentheses_compile() {
    let depth = 10_000;
    let text = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    assert!(compile(&text).is_ok());
}

#[test]
fn empty_source_is_an_empty_script() {
    assert_eq!(run(""), Obj::Void);
    assert_eq!(run(";;"), Obj::Void);
}
