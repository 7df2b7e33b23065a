#![allow(clippy::unwrap_used, clippy::expect_used)]
//! One engine and one compiled script shared by many tasks.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use quill::{silent_handler, Engine, Name, Obj, PerfConfig};

const DEFINITIONS: &str = "
    class Acc(var total) {
        fun add(x) { total += x }
    }
    fun tri(k) { if (k == 0) 0 else k + tri(k - 1) }
";

const WORK: &str = "
    val acc = Acc(0)
    for (i in 0..n) {
        acc.add(i)
        if (i % 7 == 0) yield()
    }
    [acc.total, tri(n)]
";

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn tasks_share_engine_and_script() {
    let engine = Arc::new(
        Engine::builder()
            .perf_config(PerfConfig::default())
            .print_handler(silent_handler())
            .build()
            .unwrap(),
    );
    let shared = engine.new_scope(None);
    let definitions = engine.compile(DEFINITIONS, "defs.q").unwrap();
    engine.execute(&definitions, Some(&shared)).await.unwrap();
    let script = Arc::new(engine.compile(WORK, "shared.q").unwrap());

    let mut handles = Vec::new();
    for n in 0..16_i64 {
        let engine = Arc::clone(&engine);
        let script = Arc::clone(&script);
        let shared = shared.clone();
        handles.push(tokio::spawn(async move {
            let scope = engine.new_scope(Some(&shared));
            scope.add_item(Name::intern("n"), false, Obj::Int(n * 10)).unwrap();
            let value = engine.execute(&script, Some(&scope)).await.unwrap();
            (n, value.to_string())
        }));
    }

    for handle in handles {
        let (n, value) = handle.await.unwrap();
        let expected = (0..=n * 10).sum::<i64>();
        assert_eq!(value, format!("[{expected}, {expected}]"));
    }
    // Every task sees the same `Acc`, so `acc.add` stays monomorphic no
    // matter how the workers interleave.
    let stats = engine.cache_stats();
    assert_eq!(stats.method.megamorphic, 0);
    assert!(stats.method.hits > 0, "{stats:?}");
}
