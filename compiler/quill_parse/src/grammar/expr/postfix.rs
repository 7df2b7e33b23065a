//! Postfix operators: call, member access, method call, index and
//! postfix `++`/`--`.
//!
//! `(`, `[` and `++`/`--` only continue an expression on the line it is
//! on; on a new line they start the next statement. `.` may lead a
//! continuation line.

use quill_eval::exec::{AccessKind, Accessor, Call, Increment, MethodCall, NodeBox};
use quill_ir::TokenKind;

use super::Expr;
use crate::{ParseError, Parser};

impl Parser {
    pub(super) fn postfix_expr(&mut self) -> Result<Expr, ParseError> {
        let term = self.primary()?;
        self.postfix(term)
    }

    /// Apply postfix operators to `expr` for as long as they follow.
    pub(super) fn postfix(&mut self, mut expr: Expr) -> Result<Expr, ParseError> {
        loop {
            let same_line = self.cursor.on_same_line();
            expr = match self.current_kind() {
                TokenKind::LParen if same_line => {
                    let args = self.arguments()?;
                    Self::call(expr, args)
                }
                TokenKind::Dot => {
                    self.advance();
                    let (name, _) = self.ident("a member name")?;
                    let pos = expr.pos().clone();
                    Expr::Place(Accessor::field(pos, expr.into_node(), name))
                }
                TokenKind::LBracket if same_line => {
                    self.advance();
                    let index = self.expression()?.into_node();
                    self.expect(TokenKind::RBracket, "']'")?;
                    let pos = expr.pos().clone();
                    Expr::Place(Accessor::index(pos, expr.into_node(), index))
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus if same_line => {
                    let token = self.advance();
                    let delta = if token.kind == TokenKind::PlusPlus { 1 } else { -1 };
                    let pos = expr.pos().clone();
                    let target = expr.into_place(&token.pos)?;
                    Expr::PostIncrement(Box::new(Increment {
                        pos,
                        target,
                        delta,
                        prefix: false,
                    }))
                }
                _ => return Ok(expr),
            };
        }
    }

    /// `a.b(args)` dispatches through `a`'s class; anything else calls
    /// the value of the callee expression.
    fn call(callee: Expr, args: Vec<NodeBox>) -> Expr {
        match callee {
            Expr::Place(Accessor {
                pos,
                kind: AccessKind::Field { receiver, name, .. },
            }) => Expr::value(MethodCall::new(pos, receiver, name, args)),
            callee => {
                let pos = callee.pos().clone();
                Expr::value(Call {
                    pos,
                    callee: callee.into_node(),
                    args,
                })
            }
        }
    }

    /// `(a, b, c)` call arguments.
    pub(crate) fn arguments(&mut self) -> Result<Vec<NodeBox>, ParseError> {
        self.expect(TokenKind::LParen, "'('")?;
        self.comma_list(TokenKind::RParen, "')'")
    }

    /// Comma-separated expressions up to and including `close`. A
    /// trailing comma is allowed.
    pub(super) fn comma_list(
        &mut self,
        close: TokenKind,
        what: &str,
    ) -> Result<Vec<NodeBox>, ParseError> {
        let mut items = Vec::new();
        while !self.check(close) {
            items.push(self.expression()?.into_node());
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(close, what)?;
        Ok(items)
    }
}
