//! Lexer for Quill.
//!
//! Turns a [`Source`] into a flat token vector ending in [`TokenKind::Eof`].
//! Whitespace, newlines and comments are skipped. There is no recovery:
//! the first malformed token aborts the pass with a positioned [`LexError`].
//!
//! Keywords are lexed as identifiers; the compiler recognizes them.

mod cursor;
mod lexer;

pub use lexer::{tokenize, LexError, LexErrorKind};

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
