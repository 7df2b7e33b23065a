//! Operators and assignment.
//!
//! Instances overload operators through conventionally named members
//! (`plus`, `compareTo`, `equals`, `unaryMinus`, ...); everything else goes
//! to the native tables in `operators`.

use futures::future::BoxFuture;
use quill_ir::{Name, Pos};

use crate::context::Context;
use crate::errors::wrong_arg_type;
use crate::operators::{
    evaluate_binary, evaluate_unary, increment, plus_assign, BinaryOp, UnaryOp,
};
use crate::scope::Scope;
use crate::value::Obj;

use super::access::Accessor;
use super::call::{call_member, stringify};
use super::{truthy, ExecResult, Node, NodeBox, RaiseAt};

/// Apply `op`, dispatching to an operator member when `left` defines one.
pub(crate) async fn apply_binary(
    cx: &Context,
    op: BinaryOp,
    left: Obj,
    right: Obj,
    pos: &Pos,
) -> ExecResult {
    if let Obj::Instance(instance) = &left {
        let member = instance.class().resolve_member(Name::intern(op.method_name()));
        if let Some(member) = member {
            let result = call_member(cx, member.value(), left.clone(), vec![right], pos).await?;
            return operator_result(cx, op, result, pos);
        }
    }
    if let (BinaryOp::Add, Obj::Str(text)) = (op, &left) {
        if matches!(right, Obj::Instance(_)) {
            let rendered = stringify(cx, &right, pos).await?;
            return Ok(Obj::string(format!("{text}{rendered}")));
        }
    }
    evaluate_binary(&left, &right, op).at(cx, pos)
}

fn operator_result(cx: &Context, op: BinaryOp, result: Obj, pos: &Pos) -> ExecResult {
    match op {
        BinaryOp::Eq => Ok(Obj::Bool(truthy(cx, &result, pos)?)),
        BinaryOp::NotEq => Ok(Obj::Bool(!truthy(cx, &result, pos)?)),
        op if op.is_comparison() => match result {
            Obj::Int(n) => Ok(Obj::Bool(op.holds(n.cmp(&0)))),
            other => Err(cx.raise(
                wrong_arg_type("compareTo", "an Int result", other.type_name()),
                pos,
            )),
        },
        _ => Ok(result),
    }
}

async fn apply_unary(cx: &Context, op: UnaryOp, operand: Obj, pos: &Pos) -> ExecResult {
    if let Obj::Instance(instance) = &operand {
        if let Some(member) = instance.class().resolve_member(Name::intern(op.method_name())) {
            return call_member(cx, member.value(), operand.clone(), Vec::new(), pos).await;
        }
    }
    evaluate_unary(&operand, op).at(cx, pos)
}

#[derive(Debug)]
pub struct Binary {
    pub pos: Pos,
    pub op: BinaryOp,
    pub left: NodeBox,
    pub right: NodeBox,
}

impl Node for Binary {
    fn pos(&self) -> &Pos {
        &self.pos
    }

    fn execute<'a>(&'a self, cx: &'a Context, scope: &'a Scope) -> BoxFuture<'a, ExecResult> {
        Box::pin(async move {
            let left = self.left.execute(cx, scope).await?;
            let right = self.right.execute(cx, scope).await?;
            apply_binary(cx, self.op, left, right, &self.pos).await
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

/// `&&` / `||`: short-circuiting, both operands must be `Bool`.
#[derive(Debug)]
pub struct Logical {
    pub pos: Pos,
    pub op: LogicalOp,
    pub left: NodeBox,
    pub right: NodeBox,
}

impl Node for Logical {
    fn pos(&self) -> &Pos {
        &self.pos
    }

    fn execute<'a>(&'a self, cx: &'a Context, scope: &'a Scope) -> BoxFuture<'a, ExecResult> {
        Box::pin(async move {
            let left = self.left.execute(cx, scope).await?;
            let left = truthy(cx, &left, self.left.pos())?;
            match (self.op, left) {
                (LogicalOp::And, false) => return Ok(Obj::Bool(false)),
                (LogicalOp::Or, true) => return Ok(Obj::Bool(true)),
                _ => {}
            }
            let right = self.right.execute(cx, scope).await?;
            Ok(Obj::Bool(truthy(cx, &right, self.right.pos())?))
        })
    }
}

#[derive(Debug)]
pub struct Unary {
    pub pos: Pos,
    pub op: UnaryOp,
    pub operand: NodeBox,
}

impl Node for Unary {
    fn pos(&self) -> &Pos {
        &self.pos
    }

    fn execute<'a>(&'a self, cx: &'a Context, scope: &'a Scope) -> BoxFuture<'a, ExecResult> {
        Box::pin(async move {
            let operand = self.operand.execute(cx, scope).await?;
            apply_unary(cx, self.op, operand, &self.pos).await
        })
    }
}

/// `target = value`; evaluates to the assigned value.
#[derive(Debug)]
pub struct Assign {
    pub pos: Pos,
    pub target: Accessor,
    pub value: NodeBox,
}

impl Node for Assign {
    fn pos(&self) -> &Pos {
        &self.pos
    }

    fn execute<'a>(&'a self, cx: &'a Context, scope: &'a Scope) -> BoxFuture<'a, ExecResult> {
        Box::pin(async move {
            let place = self.target.locate(cx, scope).await?;
            let value = self.value.execute(cx, scope).await?;
            self.target.write(cx, scope, place, value.clone()).await?;
            Ok(value)
        })
    }
}

/// `target op= value`. The receiver is evaluated once; `list += x`
/// appends in place without writing the target back.
#[derive(Debug)]
pub struct CompoundAssign {
    pub pos: Pos,
    pub op: BinaryOp,
    pub target: Accessor,
    pub value: NodeBox,
}

impl Node for CompoundAssign {
    fn pos(&self) -> &Pos {
        &self.pos
    }

    fn execute<'a>(&'a self, cx: &'a Context, scope: &'a Scope) -> BoxFuture<'a, ExecResult> {
        Box::pin(async move {
            let place = self.target.locate(cx, scope).await?;
            let current = self.target.read(cx, scope, &place).await?;
            let value = self.value.execute(cx, scope).await?;
            if self.op == BinaryOp::Add {
                if let Some(appended) = plus_assign(&current, &value) {
                    appended.at(cx, &self.pos)?;
                    return Ok(current);
                }
            }
            let updated = apply_binary(cx, self.op, current, value, &self.pos).await?;
            self.target.write(cx, scope, place, updated.clone()).await?;
            Ok(updated)
        })
    }
}

/// `++x`, `x--` and friends.
#[derive(Debug)]
pub struct Increment {
    pub pos: Pos,
    pub target: Accessor,
    pub delta: i64,
    pub prefix: bool,
}

impl Node for Increment {
    fn pos(&self) -> &Pos {
        &self.pos
    }

    fn execute<'a>(&'a self, cx: &'a Context, scope: &'a Scope) -> BoxFuture<'a, ExecResult> {
        Box::pin(async move {
            let place = self.target.locate(cx, scope).await?;
            let old = self.target.read(cx, scope, &place).await?;
            let new = match &old {
                Obj::Instance(_) => {
                    apply_binary(cx, BinaryOp::Add, old.clone(), Obj::Int(self.delta), &self.pos)
                        .await?
                }
                other => increment(other, self.delta).at(cx, &self.pos)?,
            };
            self.target.write(cx, scope, place, new.clone()).await?;
            Ok(if self.prefix { new } else { old })
        })
    }
}
