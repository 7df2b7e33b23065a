#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Call-frame recycling.

use pretty_assertions::assert_eq;
use quill::{silent_handler, Engine, Obj, PerfConfig, PerfFlags};

fn engine(flags: PerfFlags) -> Engine {
    Engine::builder()
        .perf_config(PerfConfig::with_flags(flags))
        .print_handler(silent_handler())
        .build()
        .unwrap()
}

const SQUARES: &str = "
    fun sq(x) { x * x }
    var s = 0
    for (i in 0..<100) s += sq(i)
    s
";

#[test]
fn repeated_calls_reuse_frames() {
    let engine = engine(PerfFlags::all());
    assert_eq!(engine.eval_blocking(SQUARES, "sq.q").unwrap(), Obj::Int(328_350));
    let stats = engine.pool_stats();
    assert!(stats.reused >= 99, "{stats:?}");
    assert!(stats.created < stats.reused);
}

#[test]
fn disabled_pool_never_reuses() {
    let engine = engine(PerfFlags::all() - PerfFlags::SCOPE_POOL);
    assert_eq!(engine.eval_blocking(SQUARES, "sq.q").unwrap(), Obj::Int(328_350));
    let stats = engine.pool_stats();
    assert_eq!(stats.reused, 0);
    assert_eq!(stats.released, 0);
    assert!(stats.created >= 100);
}

#[test]
fn captured_frames_are_not_recycled() {
    let text = "
        fun make(v) { fn() { v } }
        val fs = []
        for (i in 0..<10) fs += make(i)
        fun noise(a) { a + 100 }
        for (i in 0..<10) noise(i)
        var total = 0
        for (f in fs) total += f()
        total
    ";
    let engine = engine(PerfFlags::all());
    assert_eq!(engine.eval_blocking(text, "cap.q").unwrap(), Obj::Int(45));
    assert!(engine.pool_stats().rejected >= 10);
}
