//! Diagnostics for the Quill runtime.
//!
//! Every compile-time and runtime error that reaches a host is flattened into
//! a [`Diagnostic`]: source name, 1-based line and column, a message, and the
//! offending source line so it can be rendered with a caret.
//!
//! # Rendering
//!
//! ```text
//! error: missing required argument #1: a
//!   --> main.q:1:20
//!   |
//! 1 | fn f(a, b=1){a+b}; f()
//!   |                    ^
//! ```
//!
//! [`TerminalEmitter`] writes the same layout with optional ANSI colors.

mod diagnostic;
mod emitter;

pub use diagnostic::{Diagnostic, Severity};
pub use emitter::{ColorMode, TerminalEmitter};
