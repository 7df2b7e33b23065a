//! Quill Eval - object model and async executor for Quill scripts.
//!
//! The compiler (`quill_parse`) lowers source to a tree of [`exec::Node`]s;
//! this crate defines those nodes and everything they run against.
//!
//! # Architecture
//!
//! - [`Obj`]: the tagged runtime value; containers and instances are shared
//! - [`ObjClass`]: classes with multiple bases, resolved depth-first, and a
//!   `layout_version` bumped whenever a member is added
//! - [`InlineCache`]: per-site polymorphic caches keyed by class and version
//! - [`Scope`]: lexical scopes with an optional `this`; call frames are
//!   recycled through a [`ScopePool`] unless a closure captured them
//! - [`Context`] / [`Runtime`]: per-evaluation and per-engine state
//! - [`PerfConfig`]: switches for each optimization layer; results never
//!   depend on them
//!
//! Execution is `async`: a script only yields where a host primitive does
//! (`yield`, `delay`, awaiting a launched coroutine).

pub mod builtins;
pub mod cache;
pub mod class;
pub mod config;
pub mod context;
pub mod errors;
pub mod exec;
pub mod operators;
pub mod pool;
mod print_handler;
pub mod scope;
mod stack;
pub mod value;

pub use builtins::{register_stdlib, Builtins};
pub use cache::{CacheKind, CacheStatsSnapshot, InlineCache, KindStats};
pub use class::{ClassBuilder, ClassId, Instance, ObjClass};
pub use config::{ConfigError, PerfConfig, PerfFlags, PERF_ENV_VAR};
pub use context::{Context, Runtime};
pub use errors::{ErrorKind, RuntimeError};
pub use exec::{ExecResult, Script, Thrown, Unwind};
pub use pool::{PoolStatsSnapshot, ScopePool};
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, PrintHandler, SharedPrintHandler,
};
pub use scope::Scope;
pub use stack::ensure_sufficient_stack;
pub use value::Obj;
