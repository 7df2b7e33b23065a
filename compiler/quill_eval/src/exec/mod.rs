//! The executable node tree.
//!
//! The compiler produces a tree of [`Node`] trait objects. Executing a node
//! returns a boxed future, so a script suspends only where a host primitive
//! (`yield`, `delay`, `await`) does and otherwise runs to completion inside
//! one poll. Non-local control flow travels as [`Unwind`] in the error
//! channel.
//!
//! Nodes are immutable after compilation except for the inline caches owned
//! by access sites, and are shared by every evaluation of a [`Script`].

mod access;
mod call;
mod control;
mod decl;
mod literal;
mod ops;

pub use access::{AccessKind, Accessor, Place};
pub use call::{call_value, stringify, Call, MethodCall};
pub use control::{Break, Catch, Continue, DoWhile, ForIn, If, Return, Throw, Try, While};
pub use decl::{ClassDecl, ExtensionDecl, FnDecl, VarDecl};
pub use literal::{Const, FnLiteral, ListLiteral, This};
pub use ops::{Assign, Binary, CompoundAssign, Increment, Logical, LogicalOp, Unary};

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use quill_ir::{Name, Pos, Source};

use crate::context::Context;
use crate::errors::{condition_not_bool, RuntimeError};
use crate::pool::shape_for;
use crate::scope::Scope;
use crate::value::Obj;

/// Result of executing a node.
pub type ExecResult = Result<Obj, Unwind>;

/// A raised error value with the position it was raised at.
#[derive(Clone, Debug)]
pub struct Thrown {
    pub value: Obj,
    pub pos: Pos,
}

/// Non-local exits.
#[derive(Debug)]
pub enum Unwind {
    Raise(Box<Thrown>),
    Break(Option<Name>),
    Continue(Option<Name>),
    Return(Obj),
}

/// An executable statement or expression.
pub trait Node: Send + Sync + fmt::Debug {
    /// Position of the construct's first token.
    fn pos(&self) -> &Pos;

    fn execute<'a>(&'a self, cx: &'a Context, scope: &'a Scope) -> BoxFuture<'a, ExecResult>;
}

pub type NodeBox = Box<dyn Node>;

/// Attach a position to a context-free failure.
pub(crate) trait RaiseAt<T> {
    fn at(self, cx: &Context, pos: &Pos) -> Result<T, Unwind>;
}

impl<T> RaiseAt<T> for Result<T, RuntimeError> {
    #[inline]
    fn at(self, cx: &Context, pos: &Pos) -> Result<T, Unwind> {
        self.map_err(|error| cx.raise(error, pos))
    }
}

/// Conditions must be `Bool`.
pub(crate) fn truthy(cx: &Context, value: &Obj, pos: &Pos) -> Result<bool, Unwind> {
    match value {
        Obj::Bool(b) => Ok(*b),
        other => Err(cx.raise(condition_not_bool(other.type_name()), pos)),
    }
}

/// A statement sequence. Its value is the last statement's value.
#[derive(Debug)]
pub struct Block {
    pos: Pos,
    statements: Vec<NodeBox>,
    /// Bindings declared directly in this block.
    declared: usize,
    scoped: bool,
}

impl Block {
    /// A block that gets its own scope when it declares anything.
    pub fn new(pos: Pos, statements: Vec<NodeBox>, declared: usize) -> Self {
        Block {
            pos,
            statements,
            declared,
            scoped: declared > 0,
        }
    }

    /// A block that runs directly in the scope it is given (function
    /// bodies, script top level).
    pub fn unscoped(pos: Pos, statements: Vec<NodeBox>, declared: usize) -> Self {
        Block {
            pos,
            statements,
            declared,
            scoped: false,
        }
    }

    pub fn declared(&self) -> usize {
        self.declared
    }

    pub fn statements(&self) -> &[NodeBox] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl Node for Block {
    fn pos(&self) -> &Pos {
        &self.pos
    }

    fn execute<'a>(&'a self, cx: &'a Context, scope: &'a Scope) -> BoxFuture<'a, ExecResult> {
        Box::pin(async move {
            let inner;
            let scope = if self.scoped {
                inner = scope.child();
                &inner
            } else {
                scope
            };
            let mut last = Obj::Void;
            for statement in &self.statements {
                last = statement.execute(cx, scope).await?;
            }
            Ok(last)
        })
    }
}

/// One declared parameter.
#[derive(Debug)]
pub struct Param {
    pub name: Name,
    pub pos: Pos,
    pub default: Option<NodeBox>,
    /// `name...` collects the remaining arguments into a list.
    pub variadic: bool,
}

/// A compiled function: shared by every closure made from it.
#[derive(Debug)]
pub struct FnDef {
    pub name: Name,
    pub pos: Pos,
    pub params: Vec<Param>,
    pub body: Block,
    /// Pool bucket for this function's frames.
    pub shape: usize,
}

impl FnDef {
    pub fn new(name: Name, pos: Pos, params: Vec<Param>, body: Block) -> Self {
        let shape = shape_for(params.len() + body.declared());
        FnDef {
            name,
            pos,
            params,
            body,
            shape,
        }
    }

    /// Parameters that do not collect the rest.
    pub fn positional(&self) -> usize {
        self.params.iter().filter(|p| !p.variadic).count()
    }
}

/// A constructor parameter; each becomes an instance field.
#[derive(Debug)]
pub struct CtorParam {
    pub param: Param,
    pub mutable: bool,
}

/// `: Base(args)` in a class header.
#[derive(Debug)]
pub struct BaseSpec {
    pub name: Name,
    pub pos: Pos,
    pub args: Vec<NodeBox>,
}

/// A `val`/`var` in a class body.
#[derive(Debug)]
pub struct FieldDef {
    pub name: Name,
    pub pos: Pos,
    pub mutable: bool,
    pub init: Option<NodeBox>,
}

#[derive(Debug)]
pub enum ClassItem {
    Field(FieldDef),
    Method(Arc<FnDef>),
    Init(Block),
}

/// A compiled `class` declaration.
#[derive(Debug)]
pub struct ClassDef {
    pub name: Name,
    pub pos: Pos,
    pub params: Vec<CtorParam>,
    pub bases: Vec<BaseSpec>,
    pub items: Vec<ClassItem>,
    pub shape: usize,
}

impl ClassDef {
    pub fn new(
        name: Name,
        pos: Pos,
        params: Vec<CtorParam>,
        bases: Vec<BaseSpec>,
        items: Vec<ClassItem>,
    ) -> Self {
        let shape = shape_for(params.len());
        ClassDef {
            name,
            pos,
            params,
            bases,
            items,
            shape,
        }
    }
}

/// A compiled script.
#[derive(Debug)]
pub struct Script {
    source: Arc<Source>,
    body: Block,
}

impl Script {
    pub fn new(source: Arc<Source>, body: Block) -> Self {
        Script { source, body }
    }

    pub fn source(&self) -> &Arc<Source> {
        &self.source
    }

    pub fn body(&self) -> &Block {
        &self.body
    }

    /// Run the top level in `scope`. A top-level `return` ends the script
    /// with its value.
    pub async fn run(&self, cx: &Context, scope: &Scope) -> Result<Obj, Thrown> {
        match self.body.execute(cx, scope).await {
            Ok(value) | Err(Unwind::Return(value)) => Ok(value),
            Err(Unwind::Raise(thrown)) => Err(*thrown),
            Err(Unwind::Break(_) | Unwind::Continue(_)) => Ok(Obj::Void),
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
