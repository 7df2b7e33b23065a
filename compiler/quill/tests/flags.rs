#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Every combination of performance flags must produce the same results
//! and the same output.

use pretty_assertions::assert_eq;
use quill::{buffer_handler, Engine, PerfConfig, PerfFlags};

const WORKLOAD: &str = r#"
class Shape(val name) {
    fun area() { 0 }
    fun describe() { name + ":" + area() }
}
class Square(side) : Shape("square") { fun area() { side * side } }
class Rect(w, h) : Shape("rect") { fun area() { w * h } }
class Circle(r) : Shape("circle") { fun area() { 3 * r * r } }
class Tri(b, h) : Shape("tri") { fun area() { b * h / 2 } }
class Hex(k) : Shape("hex") { fun area() { 6 * k } }

val shapes = [Square(2), Rect(2, 3), Circle(1), Tri(4, 2), Hex(1)]
var total = 0
for (round in 0..<12) {
    for (s in shapes) {
        total += s.area()
        if (round == 0) println(s.describe())
    }
}

fun Shape.double() { area() * 2 }
for (s in shapes) total += s.double()

val counts = Map()
for (w in "a b a c b a".split(" ")) {
    counts[w] = if (counts.containsKey(w)) counts[w] + 1 else 1
}
println(counts["a"], counts["b"], counts["c"])

val xs = [5, 3, 8]
for (i in 0..<xs.size) xs[i] = xs[i] * 2
xs += 1

fun fib(n) { if (n < 2) n else fib(n - 1) + fib(n - 2) }

fun counter() {
    var n = 0
    fn() { n++; n }
}
val next = counter()
next(); next()

var caught = ""
try {
    val frozen = freeze(Square(1))
    frozen.side = 3
} catch (e: IllegalAssignmentException) {
    caught = e.message
}

[total, fib(15), xs, next(), caught, "abc"[1]]
"#;

fn run(flags: PerfFlags) -> (String, String) {
    let print = buffer_handler();
    let engine = Engine::builder()
        .perf_config(PerfConfig::with_flags(flags))
        .print_handler(print.clone())
        .build()
        .unwrap();
    let value = engine.eval_blocking(WORKLOAD, "workload.q").unwrap();
    (value.to_string(), print.output())
}

#[test]
fn all_flag_subsets_agree() {
    let (expected, expected_output) = run(PerfFlags::all());
    assert_eq!(
        expected,
        "[322, 610, [10, 6, 16, 1], 3, attempt to mutate frozen object, b]"
    );
    assert!(expected_output.starts_with("square:4\nrect:6\n"));
    for bits in 0..32u8 {
        let flags = PerfFlags::from_bits_truncate(bits);
        let (value, output) = run(flags);
        assert_eq!(value, expected, "result differs with {flags:?}");
        assert_eq!(output, expected_output, "output differs with {flags:?}");
    }
}
