//! Quill IR - shared front-end types.
//!
//! This crate holds the small set of types every other Quill crate agrees on:
//! - [`Source`]: a named script split into trimmed lines
//! - [`Pos`]: an immutable `(source, line, column)` cursor
//! - [`Token`] / [`TokenKind`]: lexer output
//! - [`Name`]: interned identifiers backed by one process-wide [`StringInterner`]
//!
//! # Design Philosophy
//!
//! - **Intern identifiers**: every identifier becomes a `Name(u32)` so scope
//!   lookups and member tables compare integers, not strings.
//! - **Cheap positions**: a `Pos` clones an `Arc<Source>` plus two integers;
//!   every token and every executable node carries one.

mod interner;
mod name;
mod pos;
mod source;
mod token;

pub use interner::{global_interner, InternError, StringInterner};
pub use name::Name;
pub use pos::Pos;
pub use source::Source;
pub use token::{Token, TokenKind};
