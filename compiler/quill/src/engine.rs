//! The embedding entry point.

use std::sync::Arc;

use quill_eval::exec::Script;
use quill_eval::{
    register_stdlib, stdout_handler, Builtins, CacheStatsSnapshot, Context, Obj, PerfConfig,
    PoolStatsSnapshot, Runtime, Scope, SharedPrintHandler,
};

use crate::error::{CompileError, Error, ScriptError};

/// Configures an [`Engine`].
#[derive(Default)]
pub struct EngineBuilder {
    config: Option<PerfConfig>,
    print: Option<SharedPrintHandler>,
}

impl EngineBuilder {
    /// Use `config` instead of reading `QUILL_PERF`.
    #[must_use]
    pub fn perf_config(mut self, config: PerfConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Where `print`/`println` write. Defaults to stdout.
    #[must_use]
    pub fn print_handler(mut self, print: SharedPrintHandler) -> Self {
        self.print = Some(print);
        self
    }

    pub fn build(self) -> Result<Engine, Error> {
        let config = match self.config {
            Some(config) => config,
            None => PerfConfig::from_env()?,
        };
        let print = self.print.unwrap_or_else(stdout_handler);
        let runtime = Runtime::new(config, print)?;
        let root = Scope::root();
        register_stdlib(&root, runtime.builtins())?;
        tracing::debug!(flags = ?config.flags, max_call_depth = config.max_call_depth, "engine ready");
        Ok(Engine { runtime, root })
    }
}

/// Builtin classes, configuration and a root scope holding the standard
/// library. Cheap to share behind an `Arc`; every execution gets its own
/// [`Context`].
pub struct Engine {
    runtime: Arc<Runtime>,
    root: Scope,
}

impl Engine {
    /// An engine configured from the environment, printing to stdout.
    pub fn new() -> Result<Self, Error> {
        EngineBuilder::default().build()
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn config(&self) -> &PerfConfig {
        self.runtime.config()
    }

    pub fn builtins(&self) -> &Builtins {
        self.runtime.builtins()
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        self.runtime.print()
    }

    /// The scope holding the standard library. Host natives added here are
    /// visible to every script.
    pub fn root_scope(&self) -> &Scope {
        &self.root
    }

    /// A fresh scope under `parent`, or under the root scope.
    pub fn new_scope(&self, parent: Option<&Scope>) -> Scope {
        parent.unwrap_or(&self.root).child()
    }

    pub fn compile(&self, text: &str, name: &str) -> Result<Script, CompileError> {
        crate::compile(text, name)
    }

    /// Run `script` in `scope`, or in a fresh child of the root scope.
    #[tracing::instrument(level = "debug", skip_all, fields(source = script.source().name()))]
    pub async fn execute(&self, script: &Script, scope: Option<&Scope>) -> Result<Obj, ScriptError> {
        let cx = Context::new(Arc::clone(&self.runtime));
        let scope = match scope {
            Some(scope) => scope.clone(),
            None => self.new_scope(None),
        };
        script
            .run(&cx, &scope)
            .await
            .map_err(ScriptError::from_thrown)
    }

    /// Compile and run `text` in a fresh scope.
    pub async fn eval(&self, text: &str, name: &str) -> Result<Obj, Error> {
        let script = self.compile(text, name)?;
        Ok(self.execute(&script, None).await?)
    }

    /// [`eval`](Self::eval) on the current thread. Scripts that `launch`
    /// need a tokio runtime and must use `eval` from inside one.
    pub fn eval_blocking(&self, text: &str, name: &str) -> Result<Obj, Error> {
        futures::executor::block_on(self.eval(text, name))
    }

    pub fn cache_stats(&self) -> CacheStatsSnapshot {
        self.runtime.cache_stats().snapshot()
    }

    pub fn pool_stats(&self) -> PoolStatsSnapshot {
        self.runtime.pool_stats().snapshot()
    }
}
