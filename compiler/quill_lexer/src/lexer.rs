use std::fmt;
use std::sync::Arc;

use quill_ir::{Pos, Source, Token, TokenKind};

use crate::cursor::Cursor;

/// What went wrong while lexing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LexErrorKind {
    UnterminatedString,
    UnterminatedComment,
    InvalidHex(String),
    IntegerOverflow(String),
    MalformedExponent(String),
    UnexpectedChar(char),
}

/// A lex failure at a position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexError {
    pub pos: Pos,
    pub kind: LexErrorKind,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LexErrorKind::UnterminatedString => f.write_str("unterminated string"),
            LexErrorKind::UnterminatedComment => f.write_str("unterminated comment"),
            LexErrorKind::InvalidHex(text) => write!(f, "invalid hex literal: {text}"),
            LexErrorKind::IntegerOverflow(text) => write!(f, "integer literal too large: {text}"),
            LexErrorKind::MalformedExponent(text) => write!(f, "malformed exponent: {text}"),
            LexErrorKind::UnexpectedChar(c) => write!(f, "unexpected character '{c}'"),
        }
    }
}

impl std::error::Error for LexError {}

/// Identifiers start with an ASCII letter, `_` or a Cyrillic letter.
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || ('\u{0400}'..='\u{04FF}').contains(&c)
}

fn is_ident_continue(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

/// Lex `source` into tokens.
pub fn tokenize(source: &Arc<Source>) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer {
        cursor: Cursor::new(source),
        tokens: Vec::new(),
    };
    lexer.run()?;
    tracing::trace!(source = source.name(), tokens = lexer.tokens.len(), "lexed");
    Ok(lexer.tokens)
}

struct Lexer {
    cursor: Cursor,
    tokens: Vec<Token>,
}

impl Lexer {
    fn run(&mut self) -> Result<(), LexError> {
        loop {
            self.skip_trivia()?;
            let start = self.cursor.pos();
            let Some(c) = self.cursor.current() else {
                self.tokens.push(Token::new(TokenKind::Eof, "", start));
                return Ok(());
            };
            if is_ident_start(c) {
                self.identifier(start);
            } else if c.is_ascii_digit() {
                self.number(start)?;
            } else if c == '"' {
                self.string(start)?;
            } else {
                self.punctuation(c, start)?;
            }
        }
    }

    fn skip_trivia(&mut self) -> Result<(), LexError> {
        while let Some(c) = self.cursor.current() {
            if c.is_whitespace() {
                self.cursor.advance();
            } else if c == '/' {
                let start = self.cursor.pos();
                self.cursor.advance();
                match self.cursor.current() {
                    Some('/') => self.cursor.skip_line(),
                    Some('*') => {
                        self.cursor.advance();
                        self.block_comment(start)?;
                    }
                    _ => {
                        self.cursor.retreat();
                        return Ok(());
                    }
                }
            } else {
                return Ok(());
            }
        }
        Ok(())
    }

    fn block_comment(&mut self, start: Pos) -> Result<(), LexError> {
        loop {
            match self.cursor.current() {
                None => {
                    return Err(LexError {
                        pos: start,
                        kind: LexErrorKind::UnterminatedComment,
                    })
                }
                Some('*') => {
                    self.cursor.advance();
                    if self.cursor.eat('/') {
                        return Ok(());
                    }
                }
                Some(_) => self.cursor.advance(),
            }
        }
    }

    fn identifier(&mut self, start: Pos) {
        let mut text = String::new();
        while let Some(c) = self.cursor.current().filter(|c| is_ident_continue(*c)) {
            text.push(c);
            self.cursor.advance();
        }
        self.tokens.push(Token::new(TokenKind::Id, text, start));
    }

    fn digits(&mut self, text: &mut String, accept: impl Fn(char) -> bool) -> usize {
        let mut count = 0;
        while let Some(c) = self.cursor.current().filter(|c| accept(*c)) {
            text.push(c);
            self.cursor.advance();
            count += 1;
        }
        count
    }

    fn number(&mut self, start: Pos) -> Result<(), LexError> {
        let mut text = String::new();

        if self.cursor.current() == Some('0') {
            self.cursor.advance();
            if let Some(x @ ('x' | 'X')) = self.cursor.current() {
                self.cursor.advance();
                text.push('0');
                text.push(x);
                return self.hex(start, text);
            }
            text.push('0');
        }
        self.digits(&mut text, |c| c.is_ascii_digit());

        let mut is_real = false;
        if self.cursor.current() == Some('.') {
            self.cursor.advance();
            if self.cursor.current().is_some_and(|c| c.is_ascii_digit()) {
                text.push('.');
                self.digits(&mut text, |c| c.is_ascii_digit());
                is_real = true;
            } else {
                // `1..5`, `1.toString()`: the dot belongs to the next token.
                self.cursor.retreat();
            }
        }

        if let Some(e @ ('e' | 'E')) = self.cursor.current() {
            self.cursor.advance();
            text.push(e);
            if let Some(sign @ ('+' | '-')) = self.cursor.current() {
                self.cursor.advance();
                text.push(sign);
            }
            if self.digits(&mut text, |c| c.is_ascii_digit()) == 0 {
                return Err(LexError {
                    pos: start,
                    kind: LexErrorKind::MalformedExponent(text),
                });
            }
            is_real = true;
        }

        if is_real {
            self.tokens.push(Token::new(TokenKind::Real, text, start));
        } else {
            if text.parse::<i64>().is_err() {
                return Err(LexError {
                    pos: start,
                    kind: LexErrorKind::IntegerOverflow(text),
                });
            }
            self.tokens.push(Token::new(TokenKind::Int, text, start));
        }
        Ok(())
    }

    fn hex(&mut self, start: Pos, mut text: String) -> Result<(), LexError> {
        let count = self.digits(&mut text, |c| c.is_ascii_hexdigit());
        let trailing = self.cursor.current().filter(|c| is_ident_continue(*c));
        if count == 0 || trailing.is_some() {
            if let Some(c) = trailing {
                text.push(c);
            }
            return Err(LexError {
                pos: start,
                kind: LexErrorKind::InvalidHex(text),
            });
        }
        if i64::from_str_radix(&text[2..], 16).is_err() {
            return Err(LexError {
                pos: start,
                kind: LexErrorKind::IntegerOverflow(text),
            });
        }
        self.tokens.push(Token::new(TokenKind::Hex, text, start));
        Ok(())
    }

    fn string(&mut self, start: Pos) -> Result<(), LexError> {
        let unterminated = || LexError {
            pos: start.clone(),
            kind: LexErrorKind::UnterminatedString,
        };
        self.cursor.advance();
        let mut text = String::new();
        loop {
            if self.cursor.at_line_end() {
                return Err(unterminated());
            }
            let Some(c) = self.cursor.current() else {
                return Err(unterminated());
            };
            self.cursor.advance();
            match c {
                '"' => break,
                '\\' => {
                    if self.cursor.at_line_end() {
                        return Err(unterminated());
                    }
                    let Some(escaped) = self.cursor.current() else {
                        return Err(unterminated());
                    };
                    self.cursor.advance();
                    match escaped {
                        'n' => text.push('\n'),
                        'r' => text.push('\r'),
                        't' => text.push('\t'),
                        '"' => text.push('"'),
                        '\\' => text.push('\\'),
                        other => {
                            text.push('\\');
                            text.push(other);
                        }
                    }
                }
                other => text.push(other),
            }
        }
        self.tokens.push(Token::new(TokenKind::Str, text, start));
        Ok(())
    }

    fn punctuation(&mut self, c: char, start: Pos) -> Result<(), LexError> {
        self.cursor.advance();
        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            ':' => TokenKind::Colon,
            '.' => {
                if self.cursor.eat('.') {
                    if self.cursor.eat('<') {
                        TokenKind::DotDotLt
                    } else {
                        TokenKind::DotDot
                    }
                } else {
                    TokenKind::Dot
                }
            }
            '+' => self.pick(&[('+', TokenKind::PlusPlus), ('=', TokenKind::PlusEq)], TokenKind::Plus),
            '-' => self.pick(
                &[
                    ('-', TokenKind::MinusMinus),
                    ('=', TokenKind::MinusEq),
                    ('>', TokenKind::Arrow),
                ],
                TokenKind::Minus,
            ),
            '*' => self.pick(&[('=', TokenKind::StarEq)], TokenKind::Star),
            '/' => self.pick(&[('=', TokenKind::SlashEq)], TokenKind::Slash),
            '%' => self.pick(&[('=', TokenKind::PercentEq)], TokenKind::Percent),
            '=' => self.pick(&[('=', TokenKind::EqEq)], TokenKind::Eq),
            '!' => self.pick(&[('=', TokenKind::NotEq)], TokenKind::Bang),
            '<' => self.pick(&[('=', TokenKind::LtEq)], TokenKind::Lt),
            '>' => self.pick(&[('=', TokenKind::GtEq)], TokenKind::Gt),
            '&' if self.cursor.eat('&') => TokenKind::AndAnd,
            '|' if self.cursor.eat('|') => TokenKind::OrOr,
            other => {
                return Err(LexError {
                    pos: start,
                    kind: LexErrorKind::UnexpectedChar(other),
                })
            }
        };
        self.tokens.push(Token::new(kind, kind.display_name(), start));
        Ok(())
    }

    /// Maximal munch over one follow-up character.
    fn pick(&mut self, followers: &[(char, TokenKind)], single: TokenKind) -> TokenKind {
        for &(next, kind) in followers {
            if self.cursor.eat(next) {
                return kind;
            }
        }
        single
    }
}
