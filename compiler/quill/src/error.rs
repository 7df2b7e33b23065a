//! Host-facing errors.

use quill_diagnostic::Diagnostic;
use quill_eval::{ConfigError, Obj, RuntimeError, Thrown};
use quill_ir::Pos;
use quill_lexer::LexError;
use quill_parse::ParseError;
use thiserror::Error;

/// Source that could not be compiled. Always positioned.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl CompileError {
    pub fn pos(&self) -> &Pos {
        match self {
            CompileError::Lex(error) => &error.pos,
            CompileError::Parse(error) => &error.pos,
        }
    }

    pub fn diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.pos(), self.to_string())
    }
}

/// An error raised by a script and not caught by it.
#[derive(Debug, Error)]
#[error("{diagnostic}")]
pub struct ScriptError {
    pub diagnostic: Diagnostic,
    /// Class of the raised value, e.g. `ArithmeticException`.
    pub class_name: String,
    /// The raised error object.
    pub value: Obj,
}

impl ScriptError {
    pub(crate) fn from_thrown(thrown: Thrown) -> Self {
        ScriptError {
            diagnostic: Diagnostic::error(&thrown.pos, thrown.value.to_string()),
            class_name: thrown.value.type_name().to_owned(),
            value: thrown.value,
        }
    }

    /// The error message without its class name.
    pub fn message(&self) -> &str {
        match &self.value {
            Obj::Error(error) => &error.message,
            _ => &self.diagnostic.message,
        }
    }
}

/// Anything that can go wrong between source text and a result.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error("invalid performance configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("engine setup failed: {0}")]
    Setup(#[from] RuntimeError),
}

impl Error {
    /// The positioned diagnostic, for compile and script errors.
    pub fn diagnostic(&self) -> Option<Diagnostic> {
        match self {
            Error::Compile(error) => Some(error.diagnostic()),
            Error::Script(error) => Some(error.diagnostic.clone()),
            Error::Config(_) | Error::Setup(_) => None,
        }
    }
}
