#![allow(clippy::unwrap_used, clippy::expect_used)]
//! End-to-end language scenarios.

use pretty_assertions::assert_eq;
use quill::{buffer_handler, Engine, Error, Obj, PerfConfig};

fn engine() -> Engine {
    Engine::builder()
        .perf_config(PerfConfig::default())
        .print_handler(buffer_handler())
        .build()
        .unwrap()
}

fn eval(text: &str) -> Obj {
    engine().eval_blocking(text, "main.q").unwrap()
}

fn script_error(text: &str) -> quill::ScriptError {
    match engine().eval_blocking(text, "main.q") {
        Err(Error::Script(error)) => error,
        other => panic!("expected a script error, got {other:?}"),
    }
}

#[test]
fn arithmetic_loop() {
    let text = "
        var i = 0
        var sum = 0
        while (i < 5) {
            sum += i
            i++
        }
        sum
    ";
    assert_eq!(eval(text), Obj::Int(10));
}

#[test]
fn labelled_break() {
    let text = "
        var n = 0
        outer: for (i in 0..10) {
            for (j in 0..10) {
                n++
                break outer
            }
        }
        n
    ";
    assert_eq!(eval(text), Obj::Int(1));
}

#[test]
fn missing_argument_reports_ordinal_and_position() {
    let error = script_error("fun f(a, b = 1) { a + b }\nf()");
    assert_eq!(error.class_name, "IllegalArgumentException");
    assert_eq!(error.message(), "missing required argument #1: a");
    assert_eq!(error.diagnostic.location(), "main.q:2:1");
}

#[test]
fn frozen_instance_rejects_mutation() {
    let error = script_error("class P(var x)\nval p = freeze(P(1))\np.x = 2");
    assert_eq!(error.class_name, "IllegalAssignmentException");
    assert_eq!(error.message(), "attempt to mutate frozen object");
}

#[test]
fn read_only_field_rejects_assignment() {
    let error = script_error("class P(val x)\nval p = P(1)\np.x = 2");
    assert_eq!(error.class_name, "IllegalAssignmentException");
}

#[test]
fn closure_captures_defining_scope() {
    assert_eq!(eval("fun make(x) { fn() { x } }\nmake(5)()"), Obj::Int(5));
}

#[test]
fn counter_closure_keeps_state() {
    let text = "
        fun counter() {
            var n = 0
            fn() { n++; n }
        }
        val c = counter()
        c(); c()
        c()
    ";
    assert_eq!(eval(text), Obj::Int(3));
}

#[test]
fn first_base_wins_member_resolution() {
    let text = "
        class B1 { fun who() { \"B1\" } }
        class B2 { fun who() { \"B2\" } }
        class D : B1, B2 { }
        D().who()
    ";
    assert_eq!(eval(text), Obj::string("B1"));
}

#[test]
fn overrides_dispatch_on_the_receiver_class() {
    let text = "
        class Shape { fun area() { 0 } fun describe() { \"area \" + area() } }
        class Square(s) : Shape { fun area() { s * s } }
        Square(3).describe()
    ";
    assert_eq!(eval(text), Obj::string("area 9"));
}

#[test]
fn numeric_promotion() {
    assert_eq!(eval("1 + 2.0"), Obj::Real(3.0));
    assert_eq!(eval("7 / 2"), Obj::Int(3));
    assert_eq!(eval("7.0 / 2"), Obj::Real(3.5));
    assert_eq!(eval("7 % 2.5"), Obj::Real(2.0));
    assert_eq!(eval("3 * 2 - 1.5"), Obj::Real(4.5));
}

#[test]
fn integer_overflow_is_arithmetic_error() {
    let error = script_error("9223372036854775807 + 1");
    assert_eq!(error.class_name, "ArithmeticException");
}

#[test]
fn division_by_zero_is_catchable() {
    let text = "
        try {
            1 / 0
        } catch (e: ArithmeticException) {
            e.message
        }
    ";
    assert_eq!(eval(text), Obj::string("division by zero"));
}

#[test]
fn finally_runs_on_the_way_out() {
    let text = "
        var log = []
        fun f() {
            try { return 1 } finally { log += \"cleanup\" }
        }
        f()
        log.size
    ";
    assert_eq!(eval(text), Obj::Int(1));
}

#[test]
fn string_concatenation_uses_to_string() {
    let text = "
        class P(val x) { fun toString() { \"P(\" + x + \")\" } }
        \"got \" + P(1) + \" and \" + 2.5 + \" \" + true
    ";
    assert_eq!(eval(text), Obj::string("got P(1) and 2.5 true"));
}

#[test]
fn lists_maps_and_ranges() {
    let text = "
        val xs = [3, 1, 2]
        xs[0] = 10
        xs += 4
        val m = Map()
        for (w in \"a b a\".split(\" \")) {
            m[w] = if (m.containsKey(w)) m[w] + 1 else 1
        }
        [xs.size, xs[0], m[\"a\"], m[\"zz\"], (1..<4).toList()]
    ";
    assert_eq!(eval(text).to_string(), "[4, 10, 2, null, [1, 2, 3]]");
}

#[test]
fn inclusive_range_reaches_int_max() {
    let text = "
        val top = 9223372036854775806..9223372036854775807
        var n = 0
        for (i in top) {
            n++
        }
        [n, top.contains(9223372036854775807), top.toList().size, (top.end..<top.end).toList()]
    ";
    assert_eq!(eval(text).to_string(), "[2, true, 2, []]");
}

#[test]
fn print_goes_to_the_handler() {
    let print = buffer_handler();
    let engine = Engine::builder()
        .perf_config(PerfConfig::default())
        .print_handler(print.clone())
        .build()
        .unwrap();
    engine
        .eval_blocking("println(\"a\", 1)\nprint(\"b\")", "main.q")
        .unwrap();
    assert_eq!(print.output(), "a 1\nb");
}

#[test]
fn thrown_errors_keep_their_class() {
    let error = script_error("throw IllegalStateException(\"bad state\")");
    assert_eq!(error.class_name, "IllegalStateException");
    assert_eq!(error.message(), "bad state");
}

#[test]
fn undefined_symbol_is_positioned() {
    let error = script_error("val a = 1\n  nope + a");
    assert_eq!(error.class_name, "SymbolNotDefinedException");
    assert_eq!(error.diagnostic.location(), "main.q:2:3");
    assert!(error.diagnostic.render().contains("  nope + a\n  |   ^"));
}

#[test]
fn compile_errors_render_with_a_caret() {
    let error = quill::compile("val x = 1\nval = 2", "bad.q").unwrap_err();
    let diagnostic = error.diagnostic();
    assert_eq!(diagnostic.location(), "bad.q:2:5");
    assert_eq!(diagnostic.message, "expected a variable name, found '='");
}

#[test]
fn lex_errors_are_compile_errors() {
    let error = quill::compile("val s = \"open", "bad.q").unwrap_err();
    assert!(matches!(error, quill::CompileError::Lex(_)));
    assert_eq!(error.to_string(), "unterminated string");
}

#[test]
fn host_natives_are_callable_from_scripts() {
    let engine = engine();
    let scope = engine.new_scope(None);
    scope
        .add_item(
            quill::Name::intern("triple"),
            false,
            Obj::native_fn("triple", quill::Arity::Exact(1), |call| match call.arg(0) {
                Obj::Int(n) => Ok(Obj::Int(n * 3)),
                _ => Ok(Obj::Null),
            }),
        )
        .unwrap();
    let script = engine.compile("triple(14)", "host.q").unwrap();
    let result = futures::executor::block_on(engine.execute(&script, Some(&scope))).unwrap();
    assert_eq!(result, Obj::Int(42));
}

#[test]
fn scripts_run_repeatedly_in_fresh_scopes() {
    let engine = engine();
    let script = engine.compile("val x = 2\nx * 21", "again.q").unwrap();
    for _ in 0..3 {
        let result = futures::executor::block_on(engine.execute(&script, None)).unwrap();
        assert_eq!(result, Obj::Int(42));
    }
}
