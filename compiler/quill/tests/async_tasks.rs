#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Cooperative coroutines on a tokio runtime.

use std::time::Duration;

use pretty_assertions::assert_eq;
use quill::{silent_handler, Engine, Error, Obj, PerfConfig};

fn engine() -> Engine {
    Engine::builder()
        .perf_config(PerfConfig::default())
        .print_handler(silent_handler())
        .build()
        .unwrap()
}

#[tokio::test]
async fn launched_task_result_is_awaited() {
    let text = "
        val d = launch(fn() {
            delay(5)
            42
        })
        d.await() + 1
    ";
    assert_eq!(engine().eval(text, "launch.q").await.unwrap(), Obj::Int(43));
}

#[tokio::test]
async fn finished_task_is_no_longer_active() {
    let text = "
        val d = launch(fn() { 1 })
        d.await()
        d.isActive
    ";
    assert_eq!(engine().eval(text, "active.q").await.unwrap(), Obj::Bool(false));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn yielding_tasks_share_variables() {
    let text = r#"
        var log = ""
        val d = launch(fn() {
            for (i in 0..<3) {
                log += "b"
                yield()
            }
        })
        for (i in 0..<3) {
            log += "a"
            yield()
        }
        d.await()
        log.size
    "#;
    assert_eq!(engine().eval(text, "yield.q").await.unwrap(), Obj::Int(6));
}

#[tokio::test]
async fn errors_propagate_through_await() {
    let text = r#"
        val d = launch(fn() { throw IllegalStateException("boom") })
        try {
            d.await()
        } catch (e: IllegalStateException) {
            "caught " + e.message
        }
    "#;
    assert_eq!(
        engine().eval(text, "raise.q").await.unwrap(),
        Obj::string("caught boom")
    );
}

#[tokio::test]
async fn spinning_script_can_be_timed_out() {
    let engine = engine();
    let spin = engine.eval("while (true) { yield() }", "spin.q");
    let outcome = tokio::time::timeout(Duration::from_millis(50), spin).await;
    assert!(outcome.is_err());
}

#[tokio::test]
async fn cancelled_call_frame_is_not_pooled() {
    let engine = engine();
    let spin = engine.eval("fun spin() { while (true) { yield() } }\nspin()", "spin_fn.q");
    let outcome = tokio::time::timeout(Duration::from_millis(50), spin).await;
    assert!(outcome.is_err());

    let stats = engine.pool_stats();
    assert_eq!((stats.created, stats.reused, stats.released), (1, 0, 0));

    // A call that returns normally still goes back to the pool.
    let done = engine.eval("fun one() { 1 }\none()", "one.q").await.unwrap();
    assert_eq!(done, Obj::Int(1));
    let stats = engine.pool_stats();
    assert_eq!((stats.created, stats.released), (2, 1));
}

#[test]
fn launch_needs_a_tokio_runtime() {
    match engine().eval_blocking("launch(fn() { 1 })", "blocking.q") {
        Err(Error::Script(error)) => {
            assert_eq!(error.class_name, "IllegalStateException");
            assert_eq!(error.message(), "launch requires a running tokio runtime");
        }
        other => panic!("expected a script error, got {other:?}"),
    }
}
