//! Operator matching helpers.

use quill_eval::exec::LogicalOp;
use quill_eval::operators::BinaryOp;
use quill_ir::TokenKind;

use crate::Parser;

/// Binding strength of infix operators, weakest first.
pub(super) mod prec {
    pub const OR: u8 = 1;
    pub const AND: u8 = 2;
    pub const EQUALITY: u8 = 3;
    pub const RELATIONAL: u8 = 4;
    pub const RANGE: u8 = 5;
    pub const ADDITIVE: u8 = 6;
    pub const MULTIPLICATIVE: u8 = 7;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) enum Infix {
    Binary(BinaryOp),
    Logical(LogicalOp),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) enum AssignOp {
    Plain,
    Compound(BinaryOp),
}

impl Parser {
    /// The infix operator at the cursor with its precedence.
    pub(super) fn match_infix_op(&self) -> Option<(u8, Infix)> {
        let matched = match self.current_kind() {
            TokenKind::OrOr => (prec::OR, Infix::Logical(LogicalOp::Or)),
            TokenKind::AndAnd => (prec::AND, Infix::Logical(LogicalOp::And)),
            kind => {
                let op = Self::match_binary_op(kind)?;
                (binary_precedence(op), Infix::Binary(op))
            }
        };
        Some(matched)
    }

    fn match_binary_op(kind: TokenKind) -> Option<BinaryOp> {
        match kind {
            TokenKind::EqEq => Some(BinaryOp::Eq),
            TokenKind::NotEq => Some(BinaryOp::NotEq),
            TokenKind::Lt => Some(BinaryOp::Lt),
            TokenKind::LtEq => Some(BinaryOp::LtEq),
            TokenKind::Gt => Some(BinaryOp::Gt),
            TokenKind::GtEq => Some(BinaryOp::GtEq),
            TokenKind::DotDot => Some(BinaryOp::Range),
            TokenKind::DotDotLt => Some(BinaryOp::RangeExclusive),
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Minus => Some(BinaryOp::Sub),
            TokenKind::Star => Some(BinaryOp::Mul),
            TokenKind::Slash => Some(BinaryOp::Div),
            TokenKind::Percent => Some(BinaryOp::Rem),
            _ => None,
        }
    }

    /// `=` or a compound assignment operator.
    pub(super) fn match_assign_op(&self) -> Option<AssignOp> {
        match self.current_kind() {
            TokenKind::Eq => Some(AssignOp::Plain),
            TokenKind::PlusEq => Some(AssignOp::Compound(BinaryOp::Add)),
            TokenKind::MinusEq => Some(AssignOp::Compound(BinaryOp::Sub)),
            TokenKind::StarEq => Some(AssignOp::Compound(BinaryOp::Mul)),
            TokenKind::SlashEq => Some(AssignOp::Compound(BinaryOp::Div)),
            TokenKind::PercentEq => Some(AssignOp::Compound(BinaryOp::Rem)),
            _ => None,
        }
    }
}

fn binary_precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Eq | BinaryOp::NotEq => prec::EQUALITY,
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => prec::RELATIONAL,
        BinaryOp::Range | BinaryOp::RangeExclusive => prec::RANGE,
        BinaryOp::Add | BinaryOp::Sub => prec::ADDITIVE,
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => prec::MULTIPLICATIVE,
    }
}
