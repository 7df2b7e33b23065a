//! Prefix operators.

use quill_eval::exec::{Const, Increment, Unary};
use quill_eval::operators::UnaryOp;
use quill_eval::ensure_sufficient_stack;
use quill_ir::TokenKind;

use super::Expr;
use crate::{ParseError, Parser};

impl Parser {
    pub(super) fn prefix(&mut self) -> Result<Expr, ParseError> {
        ensure_sufficient_stack(|| self.prefix_inner())
    }

    fn prefix_inner(&mut self) -> Result<Expr, ParseError> {
        let op = match self.current_kind() {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::PlusPlus | TokenKind::MinusMinus => return self.pre_increment(),
            _ => return self.postfix_expr(),
        };
        let pos = self.advance().pos;
        if op != UnaryOp::Not && self.current_kind().is_number() {
            // `-1` is a literal, so `-1.abs()` calls `abs` on `-1`.
            let literal = self.advance();
            let value = Self::number(&literal, op == UnaryOp::Neg)?;
            return self.postfix(Expr::value(Const { pos, value }));
        }
        let operand = self.prefix()?.into_node();
        Ok(Expr::value(Unary { pos, op, operand }))
    }

    /// `++x` / `--x`
    fn pre_increment(&mut self) -> Result<Expr, ParseError> {
        let token = self.advance();
        let delta = if token.kind == TokenKind::PlusPlus { 1 } else { -1 };
        let operand_pos = self.current_pos().clone();
        let target = self.prefix()?.into_place(&operand_pos)?;
        Ok(Expr::value(Increment {
            pos: token.pos,
            target,
            delta,
            prefix: true,
        }))
    }
}
