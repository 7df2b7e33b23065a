//! Terms: literals, names, `this`, parentheses, lists, function literals
//! and `if` expressions.

use quill_eval::exec::{Accessor, Const, FnLiteral, If, ListLiteral, NodeBox, This};
use quill_eval::Obj;
use quill_ir::{Name, Token, TokenKind};

use super::Expr;
use crate::{is_keyword, ParseError, Parser};

impl Parser {
    pub(super) fn primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Int | TokenKind::Hex | TokenKind::Real => {
                self.advance();
                let value = Self::number(&token, false)?;
                Ok(Expr::value(Const {
                    pos: token.pos,
                    value,
                }))
            }
            TokenKind::Str => {
                self.advance();
                Ok(Expr::value(Const {
                    pos: token.pos,
                    value: Obj::string(token.lexeme),
                }))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.expression()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::LBracket => {
                self.advance();
                let items = self.comma_list(TokenKind::RBracket, "']'")?;
                Ok(Expr::value(ListLiteral {
                    pos: token.pos,
                    items,
                }))
            }
            TokenKind::Id => self.word(token),
            _ => Err(ParseError::expected("an expression", &token)),
        }
    }

    fn word(&mut self, token: Token) -> Result<Expr, ParseError> {
        let constant = match token.lexeme.as_str() {
            "true" => Obj::Bool(true),
            "false" => Obj::Bool(false),
            "null" => Obj::Null,
            "void" => Obj::Void,
            "this" => {
                self.advance();
                return Ok(Expr::value(This { pos: token.pos }));
            }
            "if" => return self.if_expr().map(Expr::Value),
            "fun" | "fn" => return self.function_literal(),
            word if is_keyword(word) => return Err(ParseError::unexpected(&token)),
            _ => {
                self.advance();
                let name = Name::intern(&token.lexeme);
                return Ok(Expr::Place(Accessor::var(token.pos, name)));
            }
        };
        self.advance();
        Ok(Expr::value(Const {
            pos: token.pos,
            value: constant,
        }))
    }

    /// `fun (params) { body }`
    fn function_literal(&mut self) -> Result<Expr, ParseError> {
        let pos = self.advance().pos;
        if !self.check(TokenKind::LParen) {
            return Err(ParseError::expected("'(' after 'fun'", self.current()));
        }
        let def = self.function(Name::ANONYMOUS, pos.clone())?;
        Ok(Expr::value(FnLiteral { pos, def }))
    }

    /// `if (cond) then [else otherwise]`; usable as a statement or a value.
    pub(crate) fn if_expr(&mut self) -> Result<NodeBox, ParseError> {
        let pos = self.advance().pos;
        let cond = self.condition()?;
        let then: NodeBox = Box::new(self.body()?);
        if self.check(TokenKind::Semicolon) && self.cursor.peek(1).is_word("else") {
            self.advance();
        }
        let otherwise: Option<NodeBox> = if self.eat_word("else") {
            Some(Box::new(self.body()?))
        } else {
            None
        };
        Ok(Box::new(If {
            pos,
            cond,
            then,
            otherwise,
        }))
    }

    /// Value of a numeric literal token, negated when a `-` was folded in.
    pub(super) fn number(token: &Token, negate: bool) -> Result<Obj, ParseError> {
        let invalid = || ParseError::new(&token.pos, format!("invalid number {}", token.lexeme));
        let value = match token.kind {
            TokenKind::Hex => {
                let digits = token.lexeme.get(2..).ok_or_else(invalid)?;
                Obj::Int(i64::from_str_radix(digits, 16).map_err(|_| invalid())?)
            }
            TokenKind::Real => Obj::Real(token.lexeme.parse().map_err(|_| invalid())?),
            _ => Obj::Int(token.lexeme.parse().map_err(|_| invalid())?),
        };
        Ok(match (negate, value) {
            (true, Obj::Int(n)) => Obj::Int(-n),
            (true, Obj::Real(x)) => Obj::Real(-x),
            (_, value) => value,
        })
    }
}
