//! Compiler for Quill.
//!
//! Lowers a token stream straight to the executable node tree of
//! [`quill_eval::exec`]; there is no intermediate AST. Statements are
//! dispatched through a keyword table and expressions are parsed by
//! precedence climbing.
//!
//! Compilation is all-or-nothing: the first structural error aborts with a
//! positioned [`ParseError`].

mod cursor;
mod error;
mod grammar;

pub use cursor::Cursor;
pub use error::ParseError;

use std::sync::Arc;

use quill_eval::exec::{Block, Script};
use quill_ir::{Name, Pos, Source, Token, TokenKind};

/// Words with a fixed meaning; they never name a variable.
const KEYWORDS: &[&str] = &[
    "val", "var", "if", "else", "while", "do", "for", "fn", "fun", "class", "break", "continue",
    "return", "throw", "try", "catch", "finally", "true", "false", "null", "void", "this",
];

pub(crate) fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// Compile `tokens` (lexed from `source`) into a script.
pub fn parse(source: &Arc<Source>, tokens: Vec<Token>) -> Result<Script, ParseError> {
    tracing::debug!(source = source.name(), tokens = tokens.len(), "compiling");
    let mut parser = Parser::new(source, tokens);
    let script = parser.parse_script()?;
    tracing::debug!(
        source = source.name(),
        statements = script.body().len(),
        "compiled"
    );
    Ok(script)
}

/// Parser state.
pub(crate) struct Parser {
    cursor: Cursor,
    source: Arc<Source>,
    /// Loop labels visible at the cursor, innermost last.
    labels: Vec<Name>,
    /// Loops enclosing the cursor within the current function.
    loop_depth: usize,
}

impl Parser {
    fn new(source: &Arc<Source>, tokens: Vec<Token>) -> Self {
        Parser {
            cursor: Cursor::new(source, tokens),
            source: Arc::clone(source),
            labels: Vec::new(),
            loop_depth: 0,
        }
    }

    fn parse_script(&mut self) -> Result<Script, ParseError> {
        let pos = self.current_pos().clone();
        let (statements, declared) = self.statements_until(TokenKind::Eof)?;
        Ok(Script::new(
            Arc::clone(&self.source),
            Block::unscoped(pos, statements, declared),
        ))
    }

    // Cursor delegation

    #[inline]
    fn current(&self) -> &Token {
        self.cursor.current()
    }

    #[inline]
    fn current_kind(&self) -> TokenKind {
        self.cursor.current_kind()
    }

    #[inline]
    fn current_pos(&self) -> &Pos {
        self.cursor.current_pos()
    }

    #[inline]
    fn is_at_end(&self) -> bool {
        self.cursor.is_at_end()
    }

    #[inline]
    fn check(&self, kind: TokenKind) -> bool {
        self.cursor.check(kind)
    }

    #[inline]
    fn check_word(&self, word: &str) -> bool {
        self.cursor.check_word(word)
    }

    #[inline]
    fn advance(&mut self) -> Token {
        self.cursor.advance()
    }

    #[inline]
    fn eat(&mut self, kind: TokenKind) -> bool {
        self.cursor.eat(kind)
    }

    #[inline]
    fn eat_word(&mut self, word: &str) -> bool {
        self.cursor.eat_word(word)
    }

    /// Consume a token of kind `kind` or fail with "expected {what}".
    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::expected(what, self.current()))
        }
    }

    /// Consume a non-keyword identifier.
    fn ident(&mut self, what: &str) -> Result<(Name, Pos), ParseError> {
        let token = self.current();
        if token.kind != TokenKind::Id || is_keyword(&token.lexeme) {
            return Err(ParseError::expected(what, token));
        }
        let token = self.advance();
        Ok((Name::intern(&token.lexeme), token.pos))
    }

    /// Run `f` as a function body: enclosing loops and labels are out of
    /// reach inside it.
    fn in_function<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let labels = std::mem::take(&mut self.labels);
        let depth = std::mem::replace(&mut self.loop_depth, 0);
        let result = f(self);
        self.labels = labels;
        self.loop_depth = depth;
        result
    }

    /// Run `f` as a loop body, with `label` (if any) in scope.
    fn in_loop<T>(
        &mut self,
        label: Option<Name>,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let labels = self.labels.len();
        self.labels.extend(label);
        self.loop_depth += 1;
        let result = f(self);
        self.loop_depth -= 1;
        self.labels.truncate(labels);
        result
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests;
