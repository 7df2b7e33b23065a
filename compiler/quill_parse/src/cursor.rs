//! Token cursor for navigating the token stream.
//!
//! Provides token access, bounded lookahead and look-behind, and
//! consumption.

use std::sync::Arc;

use quill_ir::{Pos, Source, Token, TokenKind};

/// Cursor over a lexed token vector.
///
/// Invariant: the last token is always `Eof` and the position never moves
/// past it.
pub struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl Cursor {
    /// Create a cursor at the start of `tokens`, appending `Eof` if the
    /// stream lacks one.
    pub fn new(source: &Arc<Source>, mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let pos = tokens
                .last()
                .map_or_else(|| Pos::start(source), |t| t.pos.clone());
            tokens.push(Token::new(TokenKind::Eof, "", pos));
        }
        Cursor { tokens, pos: 0 }
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Number of tokens consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    #[inline]
    pub fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    #[inline]
    pub fn current_pos(&self) -> &Pos {
        &self.current().pos
    }

    /// The token `n` places ahead; `Eof` past the end.
    pub fn peek(&self, n: usize) -> &Token {
        let index = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    /// The token `n` places behind the current one (`1` is the previous
    /// token).
    pub fn behind(&self, n: usize) -> Option<&Token> {
        self.pos.checked_sub(n).map(|index| &self.tokens[index])
    }

    pub fn previous(&self) -> Option<&Token> {
        self.behind(1)
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.current_kind() == TokenKind::Eof
    }

    #[inline]
    pub fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Whether the current token is the identifier `word`.
    #[inline]
    pub fn check_word(&self, word: &str) -> bool {
        self.current().is_word(word)
    }

    /// Whether the current token starts on the line the previous token
    /// started on. Always true at the start of the stream.
    pub fn on_same_line(&self) -> bool {
        match self.previous() {
            Some(prev) => prev.pos.line() == self.current().pos.line(),
            None => true,
        }
    }

    /// Consume the current token and return it. At `Eof` the cursor stays
    /// put.
    pub fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it has kind `kind`.
    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume the current token if it is the identifier `word`.
    pub fn eat_word(&mut self, word: &str) -> bool {
        if self.check_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }
}
