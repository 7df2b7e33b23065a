//! Lexer output.
//!
//! Keywords are not a separate kind: the lexer emits them as
//! [`TokenKind::Id`] and the compiler's statement dispatch table decides
//! which identifiers introduce a keyword form.

use std::fmt;

use crate::Pos;

/// Token classification.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Words and literals
    Id,
    Int,
    Hex,
    Real,
    Str,

    // Delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Colon,
    Dot,
    DotDot,
    DotDotLt,
    Arrow,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PlusPlus,
    MinusMinus,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    Eq,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    AndAnd,
    OrOr,
    Bang,

    /// End of the token stream.
    Eof,
}

impl TokenKind {
    /// Fixed spelling for punctuation kinds, used in "expected" messages.
    pub fn display_name(self) -> &'static str {
        match self {
            TokenKind::Id => "identifier",
            TokenKind::Int | TokenKind::Hex => "integer literal",
            TokenKind::Real => "real literal",
            TokenKind::Str => "string literal",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::Dot => ".",
            TokenKind::DotDot => "..",
            TokenKind::DotDotLt => "..<",
            TokenKind::Arrow => "->",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            TokenKind::PlusEq => "+=",
            TokenKind::MinusEq => "-=",
            TokenKind::StarEq => "*=",
            TokenKind::SlashEq => "/=",
            TokenKind::PercentEq => "%=",
            TokenKind::Eq => "=",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::Bang => "!",
            TokenKind::Eof => "end of input",
        }
    }

    /// Whether this kind is a numeric literal.
    #[inline]
    pub fn is_number(self) -> bool {
        matches!(self, TokenKind::Int | TokenKind::Hex | TokenKind::Real)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A lexed token: kind, source text and the position of its first character.
///
/// For string literals `lexeme` holds the unescaped contents without quotes.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub pos: Pos,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, pos: Pos) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            pos,
        }
    }

    /// Whether this is the identifier `word` (used for keyword dispatch).
    #[inline]
    pub fn is_word(&self, word: &str) -> bool {
        self.kind == TokenKind::Id && self.lexeme == word
    }
}
