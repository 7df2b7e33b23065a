//! Execution context.
//!
//! [`Runtime`] is shared by everything one engine runs: perf configuration,
//! builtin classes, counters and the print sink. [`Context`] is one
//! evaluation's private state on top of it: the frame pool and the call
//! depth. A launched coroutine runs on a [`Context::fork`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use quill_ir::Pos;

use crate::builtins::Builtins;
use crate::cache::{CacheKind, CacheStats, Site};
use crate::config::PerfConfig;
use crate::errors::{stack_overflow, RuntimeError};
use crate::exec::{Thrown, Unwind};
use crate::pool::{PoolStats, ScopePool};
use crate::print_handler::SharedPrintHandler;

/// State shared by all evaluations of one engine.
pub struct Runtime {
    config: PerfConfig,
    builtins: Builtins,
    cache_stats: CacheStats,
    pool_stats: Arc<PoolStats>,
    print: SharedPrintHandler,
}

impl Runtime {
    pub fn new(config: PerfConfig, print: SharedPrintHandler) -> Result<Arc<Self>, RuntimeError> {
        Ok(Arc::new(Runtime {
            config,
            builtins: Builtins::new()?,
            cache_stats: CacheStats::new(),
            pool_stats: Arc::new(PoolStats::default()),
            print,
        }))
    }

    pub fn config(&self) -> &PerfConfig {
        &self.config
    }

    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    pub fn cache_stats(&self) -> &CacheStats {
        &self.cache_stats
    }

    pub fn pool_stats(&self) -> &PoolStats {
        &self.pool_stats
    }

    pub fn print(&self) -> &SharedPrintHandler {
        &self.print
    }
}

/// One evaluation's context.
pub struct Context {
    runtime: Arc<Runtime>,
    pool: ScopePool,
    depth: AtomicUsize,
}

impl Context {
    pub fn new(runtime: Arc<Runtime>) -> Self {
        let pool = ScopePool::new(runtime.config.scope_pool(), Arc::clone(&runtime.pool_stats));
        Context {
            runtime,
            pool,
            depth: AtomicUsize::new(0),
        }
    }

    /// Fresh context on the same runtime: own pool, depth zero.
    pub fn fork(&self) -> Context {
        Context::new(Arc::clone(&self.runtime))
    }

    #[inline]
    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.runtime
    }

    #[inline]
    pub fn config(&self) -> &PerfConfig {
        &self.runtime.config
    }

    #[inline]
    pub fn builtins(&self) -> &Builtins {
        &self.runtime.builtins
    }

    #[inline]
    pub fn pool(&self) -> &ScopePool {
        &self.pool
    }

    pub fn print(&self) -> &SharedPrintHandler {
        &self.runtime.print
    }

    /// Cache parameters for a site of `kind` under the current config.
    pub(crate) fn site(&self, kind: CacheKind) -> Site<'_> {
        let config = &self.runtime.config;
        let enabled = match kind {
            CacheKind::FieldGet | CacheKind::FieldSet => config.field_cache(),
            CacheKind::Method => config.method_cache(),
            CacheKind::Index => config.index_cache(),
        };
        Site {
            kind,
            stats: &self.runtime.cache_stats,
            enabled,
            adaptive: config.adaptive_growth(),
        }
    }

    /// Turn `error` into a thrown error object positioned at `pos`.
    pub fn raise(&self, error: RuntimeError, pos: &Pos) -> Unwind {
        Unwind::Raise(Box::new(Thrown {
            value: self.builtins().error(error.kind, error.message),
            pos: pos.clone(),
        }))
    }

    /// Count one call level; the guard gives it back on drop.
    pub(crate) fn enter_call(&self, pos: &Pos) -> Result<CallGuard<'_>, Unwind> {
        let limit = self.runtime.config.max_call_depth;
        let depth = self.depth.fetch_add(1, Ordering::Relaxed);
        let guard = CallGuard { depth: &self.depth };
        if depth >= limit {
            return Err(self.raise(stack_overflow(limit), pos));
        }
        Ok(guard)
    }

    pub fn call_depth(&self) -> usize {
        self.depth.load(Ordering::Relaxed)
    }
}

/// Decrements the call depth when a call finishes or is cancelled.
pub(crate) struct CallGuard<'a> {
    depth: &'a AtomicUsize,
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        self.depth.fetch_sub(1, Ordering::Relaxed);
    }
}
