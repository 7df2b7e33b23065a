//! Expression parsing.
//!
//! - `mod.rs`: [`Expr`], assignment and the precedence-climbing loop
//! - `operators.rs`: operator matching helpers and precedences
//! - `prefix.rs`: prefix operators and literal sign folding
//! - `postfix.rs`: call, member, method call, index, postfix `++`/`--`
//! - `primary.rs`: literals, names, `this`, lists, function literals, `if`

mod operators;
mod postfix;
mod prefix;
mod primary;

use quill_eval::exec::{Accessor, Assign, Binary, CompoundAssign, Logical, Node, NodeBox};
use quill_eval::ensure_sufficient_stack;
use quill_ir::Pos;

use crate::{ParseError, Parser};
use operators::{AssignOp, Infix};

/// A parsed expression before it is committed to a node. Only places can
/// be assigned or incremented.
pub(crate) enum Expr {
    /// A variable, field or index.
    Place(Accessor),
    /// The result of `x++`/`x--`: a value that still reads like a place
    /// but must not be mutated again.
    PostIncrement(NodeBox),
    Value(NodeBox),
}

impl Expr {
    fn value(node: impl Node + 'static) -> Self {
        Expr::Value(Box::new(node))
    }

    fn pos(&self) -> &Pos {
        match self {
            Expr::Place(accessor) => &accessor.pos,
            Expr::PostIncrement(node) | Expr::Value(node) => node.pos(),
        }
    }

    pub(crate) fn into_node(self) -> NodeBox {
        match self {
            Expr::Place(accessor) => Box::new(accessor),
            Expr::PostIncrement(node) | Expr::Value(node) => node,
        }
    }

    /// The accessor to assign through; `pos` locates the error.
    fn into_place(self, pos: &Pos) -> Result<Accessor, ParseError> {
        match self {
            Expr::Place(accessor) => Ok(accessor),
            Expr::PostIncrement(_) => Err(ParseError::new(
                pos,
                "not assignable: result of a postfix increment",
            )),
            Expr::Value(_) => Err(ParseError::new(pos, "not assignable")),
        }
    }
}

impl Parser {
    /// Parse an expression, including assignment.
    ///
    /// Uses `ensure_sufficient_stack` so deeply nested source cannot
    /// overflow the stack.
    pub(crate) fn expression(&mut self) -> Result<Expr, ParseError> {
        ensure_sufficient_stack(|| self.expression_inner())
    }

    /// Assignment is right-associative and binds weakest.
    fn expression_inner(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_pos().clone();
        let target = self.binary(operators::prec::OR)?;
        let Some(op) = self.match_assign_op() else {
            return Ok(target);
        };
        self.advance();
        let target = target.into_place(&start)?;
        let value = self.expression()?.into_node();
        Ok(match op {
            AssignOp::Plain => Expr::value(Assign {
                pos: start,
                target,
                value,
            }),
            AssignOp::Compound(op) => Expr::value(CompoundAssign {
                pos: start,
                op,
                target,
                value,
            }),
        })
    }

    /// Precedence climbing over the infix operators binding at least as
    /// tightly as `min_prec`. All of them are left-associative.
    fn binary(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let start = self.current_pos().clone();
        let mut left = self.prefix()?;
        while let Some((prec, op)) = self.match_infix_op() {
            if prec < min_prec {
                break;
            }
            self.advance();
            let right = self.binary(prec + 1)?.into_node();
            let lhs = left.into_node();
            left = match op {
                Infix::Binary(op) => Expr::value(Binary {
                    pos: start.clone(),
                    op,
                    left: lhs,
                    right,
                }),
                Infix::Logical(op) => Expr::value(Logical {
                    pos: start.clone(),
                    op,
                    left: lhs,
                    right,
                }),
            };
        }
        Ok(left)
    }
}
