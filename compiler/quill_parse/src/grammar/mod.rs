//! Grammar productions.
//!
//! Each module extends `Parser` with methods for one part of the syntax:
//!
//! - [`stmt`]: statement dispatch, blocks, loops, jumps, `try`
//! - [`item`]: functions, parameters, classes
//! - [`expr`]: expressions, from assignment down to terms

mod expr;
mod item;
mod stmt;
