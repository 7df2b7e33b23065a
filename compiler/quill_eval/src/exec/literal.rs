use std::sync::Arc;

use futures::future::BoxFuture;
use quill_ir::{Name, Pos};

use crate::context::Context;
use crate::errors::symbol_not_defined;
use crate::scope::Scope;
use crate::value::{Callable, Closure, Obj};

use super::{ExecResult, FnDef, Node, NodeBox, RaiseAt};

/// A constant folded at compile time.
#[derive(Debug)]
pub struct Const {
    pub pos: Pos,
    pub value: Obj,
}

impl Node for Const {
    fn pos(&self) -> &Pos {
        &self.pos
    }

    fn execute<'a>(&'a self, _cx: &'a Context, _scope: &'a Scope) -> BoxFuture<'a, ExecResult> {
        let value = self.value.clone();
        Box::pin(async move { Ok(value) })
    }
}

/// `[a, b, c]`: a fresh list on every evaluation.
#[derive(Debug)]
pub struct ListLiteral {
    pub pos: Pos,
    pub items: Vec<NodeBox>,
}

impl Node for ListLiteral {
    fn pos(&self) -> &Pos {
        &self.pos
    }

    fn execute<'a>(&'a self, cx: &'a Context, scope: &'a Scope) -> BoxFuture<'a, ExecResult> {
        Box::pin(async move {
            let mut items = Vec::with_capacity(self.items.len());
            for item in &self.items {
                items.push(item.execute(cx, scope).await?);
            }
            Ok(Obj::list(items))
        })
    }
}

/// An anonymous `fun (..) { .. }` expression.
#[derive(Debug)]
pub struct FnLiteral {
    pub pos: Pos,
    pub def: Arc<FnDef>,
}

impl Node for FnLiteral {
    fn pos(&self) -> &Pos {
        &self.pos
    }

    fn execute<'a>(&'a self, _cx: &'a Context, scope: &'a Scope) -> BoxFuture<'a, ExecResult> {
        let closure = make_closure(&self.def, scope);
        Box::pin(async move { Ok(closure) })
    }
}

/// Close `def` over `scope`. The scope chain can no longer be recycled.
pub(crate) fn make_closure(def: &Arc<FnDef>, scope: &Scope) -> Obj {
    scope.mark_escaped();
    Obj::Callable(Callable::Closure(Arc::new(Closure {
        def: Arc::clone(def),
        captured: scope.clone(),
    })))
}

/// `this`
#[derive(Debug)]
pub struct This {
    pub pos: Pos,
}

impl Node for This {
    fn pos(&self) -> &Pos {
        &self.pos
    }

    fn execute<'a>(&'a self, cx: &'a Context, scope: &'a Scope) -> BoxFuture<'a, ExecResult> {
        let this = scope
            .this()
            .map(|this| this.value.clone())
            .ok_or_else(|| symbol_not_defined(Name::THIS))
            .at(cx, &self.pos);
        Box::pin(async move { this })
    }
}
