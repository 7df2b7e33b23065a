//! Quill: an embeddable runtime for a small dynamically-typed scripting
//! language.
//!
//! ```text
//! source text ──tokenize──► tokens ──parse──► Script (node tree)
//!                                                │
//!                         Engine::execute ◄──────┘
//! ```
//!
//! An [`Engine`] owns the builtin classes, the performance configuration
//! and a root scope with the standard library. Scripts compile once and can
//! run any number of times, concurrently, each run with its own context.
//!
//! ```text
//! let engine = Engine::new()?;
//! let value = engine.eval_blocking("1 + 2", "main.q")?;
//! ```

mod engine;
mod error;

use std::sync::{Arc, Once};

pub use engine::{Engine, EngineBuilder};
pub use error::{CompileError, Error, ScriptError};

pub use quill_diagnostic::{ColorMode, Diagnostic, TerminalEmitter};
pub use quill_eval::exec::Script;
pub use quill_eval::value::{Arity, NativeCall};
pub use quill_eval::{
    buffer_handler, silent_handler, stdout_handler, CacheKind, CacheStatsSnapshot, ConfigError,
    KindStats, Obj, PerfConfig, PerfFlags, PoolStatsSnapshot, Scope, SharedPrintHandler,
    PERF_ENV_VAR,
};
pub use quill_ir::{Name, Pos, Source};

/// Compile `text` into a runnable script. `name` labels positions in
/// diagnostics.
#[tracing::instrument(level = "debug", skip(text))]
pub fn compile(text: &str, name: &str) -> Result<Script, CompileError> {
    let source: Arc<Source> = Source::new(name, text);
    let tokens = quill_lexer::tokenize(&source)?;
    Ok(quill_parse::parse(&source, tokens)?)
}

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset; safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
