//! Compile errors.

use std::fmt;

use quill_ir::{Pos, Token, TokenKind};

/// A structural error in the source. Compilation stops at the first one.
#[derive(Clone, Debug, PartialEq)]
pub struct ParseError {
    pub pos: Pos,
    pub message: String,
}

impl ParseError {
    pub fn new(pos: &Pos, message: impl Into<String>) -> Self {
        ParseError {
            pos: pos.clone(),
            message: message.into(),
        }
    }

    /// "expected X, found Y" at `found`.
    pub fn expected(what: &str, found: &Token) -> Self {
        ParseError::new(&found.pos, format!("expected {what}, found {}", describe(found)))
    }

    /// A token that cannot start or continue the construct being parsed.
    pub fn unexpected(found: &Token) -> Self {
        ParseError::new(&found.pos, format!("unexpected {}", describe(found)))
    }
}

fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::Eof => "end of input".to_string(),
        TokenKind::Id => format!("'{}'", token.lexeme),
        TokenKind::Str => format!("string \"{}\"", token.lexeme),
        kind if kind.is_number() => format!("number {}", token.lexeme),
        kind => format!("'{}'", kind.display_name()),
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ParseError {}
