//! Branches, loops, jumps and exception handling.

use futures::future::BoxFuture;
use quill_ir::{Name, Pos};

use crate::context::Context;
use crate::errors::{not_a_class, not_iterable, not_throwable, symbol_not_defined};
use crate::scope::Scope;
use crate::value::Obj;

use super::{truthy, Block, ExecResult, Node, NodeBox, RaiseAt, Thrown, Unwind};

/// Whether a jump with `target` belongs to a loop labelled `label`.
fn targets(target: Option<Name>, label: Option<Name>) -> bool {
    target.is_none() || target == label
}

/// What a loop does with one body result.
enum Flow {
    Next,
    Exit,
}

fn loop_flow(result: ExecResult, label: Option<Name>) -> Result<Flow, Unwind> {
    match result {
        Ok(_) => Ok(Flow::Next),
        Err(Unwind::Break(target)) if targets(target, label) => Ok(Flow::Exit),
        Err(Unwind::Continue(target)) if targets(target, label) => Ok(Flow::Next),
        Err(unwind) => Err(unwind),
    }
}

/// `if (cond) a else b`, usable as an expression.
#[derive(Debug)]
pub struct If {
    pub pos: Pos,
    pub cond: NodeBox,
    pub then: NodeBox,
    pub otherwise: Option<NodeBox>,
}

impl Node for If {
    fn pos(&self) -> &Pos {
        &self.pos
    }

    fn execute<'a>(&'a self, cx: &'a Context, scope: &'a Scope) -> BoxFuture<'a, ExecResult> {
        Box::pin(async move {
            let cond = self.cond.execute(cx, scope).await?;
            if truthy(cx, &cond, self.cond.pos())? {
                self.then.execute(cx, scope).await
            } else if let Some(otherwise) = &self.otherwise {
                otherwise.execute(cx, scope).await
            } else {
                Ok(Obj::Void)
            }
        })
    }
}

#[derive(Debug)]
pub struct While {
    pub pos: Pos,
    pub label: Option<Name>,
    pub cond: NodeBox,
    pub body: Block,
}

impl Node for While {
    fn pos(&self) -> &Pos {
        &self.pos
    }

    fn execute<'a>(&'a self, cx: &'a Context, scope: &'a Scope) -> BoxFuture<'a, ExecResult> {
        Box::pin(async move {
            loop {
                let cond = self.cond.execute(cx, scope).await?;
                if !truthy(cx, &cond, self.cond.pos())? {
                    break;
                }
                let result = self.body.execute(cx, scope).await;
                if let Flow::Exit = loop_flow(result, self.label)? {
                    break;
                }
            }
            Ok(Obj::Void)
        })
    }
}

#[derive(Debug)]
pub struct DoWhile {
    pub pos: Pos,
    pub label: Option<Name>,
    pub body: Block,
    pub cond: NodeBox,
}

impl Node for DoWhile {
    fn pos(&self) -> &Pos {
        &self.pos
    }

    fn execute<'a>(&'a self, cx: &'a Context, scope: &'a Scope) -> BoxFuture<'a, ExecResult> {
        Box::pin(async move {
            loop {
                let result = self.body.execute(cx, scope).await;
                if let Flow::Exit = loop_flow(result, self.label)? {
                    break;
                }
                let cond = self.cond.execute(cx, scope).await?;
                if !truthy(cx, &cond, self.cond.pos())? {
                    break;
                }
            }
            Ok(Obj::Void)
        })
    }
}

/// `for (x in iterable) body`
///
/// Lists and maps are iterated over a snapshot taken when the loop starts;
/// ranges are walked without materializing them.
#[derive(Debug)]
pub struct ForIn {
    pub pos: Pos,
    pub label: Option<Name>,
    pub var: Name,
    pub iterable: NodeBox,
    pub body: Block,
}

impl ForIn {
    async fn run_body(&self, cx: &Context, scope: &Scope, item: Obj) -> Result<Flow, Unwind> {
        let iteration = scope.child();
        iteration.add_item(self.var, false, item).at(cx, &self.pos)?;
        let result = self.body.execute(cx, &iteration).await;
        loop_flow(result, self.label)
    }
}

impl Node for ForIn {
    fn pos(&self) -> &Pos {
        &self.pos
    }

    fn execute<'a>(&'a self, cx: &'a Context, scope: &'a Scope) -> BoxFuture<'a, ExecResult> {
        Box::pin(async move {
            let iterable = self.iterable.execute(cx, scope).await?;
            let items = match &iterable {
                Obj::Range(range) => {
                    for i in range.values() {
                        if let Flow::Exit = self.run_body(cx, scope, Obj::Int(i)).await? {
                            break;
                        }
                    }
                    return Ok(Obj::Void);
                }
                Obj::List(list) => list.snapshot(),
                Obj::Map(map) => map.keys(),
                Obj::Str(s) => s.chars().map(|c| Obj::string(c.to_string())).collect(),
                other => {
                    return Err(cx.raise(not_iterable(other.type_name()), self.iterable.pos()));
                }
            };
            for item in items {
                if let Flow::Exit = self.run_body(cx, scope, item).await? {
                    break;
                }
            }
            Ok(Obj::Void)
        })
    }
}

#[derive(Debug)]
pub struct Break {
    pub pos: Pos,
    pub label: Option<Name>,
}

impl Node for Break {
    fn pos(&self) -> &Pos {
        &self.pos
    }

    fn execute<'a>(&'a self, _cx: &'a Context, _scope: &'a Scope) -> BoxFuture<'a, ExecResult> {
        let label = self.label;
        Box::pin(async move { Err(Unwind::Break(label)) })
    }
}

#[derive(Debug)]
pub struct Continue {
    pub pos: Pos,
    pub label: Option<Name>,
}

impl Node for Continue {
    fn pos(&self) -> &Pos {
        &self.pos
    }

    fn execute<'a>(&'a self, _cx: &'a Context, _scope: &'a Scope) -> BoxFuture<'a, ExecResult> {
        let label = self.label;
        Box::pin(async move { Err(Unwind::Continue(label)) })
    }
}

#[derive(Debug)]
pub struct Return {
    pub pos: Pos,
    pub value: Option<NodeBox>,
}

impl Node for Return {
    fn pos(&self) -> &Pos {
        &self.pos
    }

    fn execute<'a>(&'a self, cx: &'a Context, scope: &'a Scope) -> BoxFuture<'a, ExecResult> {
        Box::pin(async move {
            let value = match &self.value {
                Some(value) => value.execute(cx, scope).await?,
                None => Obj::Void,
            };
            Err(Unwind::Return(value))
        })
    }
}

/// `throw expr`: only error objects can be thrown.
#[derive(Debug)]
pub struct Throw {
    pub pos: Pos,
    pub value: NodeBox,
}

impl Node for Throw {
    fn pos(&self) -> &Pos {
        &self.pos
    }

    fn execute<'a>(&'a self, cx: &'a Context, scope: &'a Scope) -> BoxFuture<'a, ExecResult> {
        Box::pin(async move {
            let value = self.value.execute(cx, scope).await?;
            if !matches!(value, Obj::Error(_)) {
                return Err(cx.raise(not_throwable(value.type_name()), &self.pos));
            }
            Err(Unwind::Raise(Box::new(Thrown {
                value,
                pos: self.pos.clone(),
            })))
        })
    }
}

/// `catch (name: Class) { .. }`; without a class it catches everything.
#[derive(Debug)]
pub struct Catch {
    pub pos: Pos,
    pub name: Name,
    pub class: Option<(Name, Pos)>,
    pub body: Block,
}

impl Catch {
    fn matches(&self, cx: &Context, scope: &Scope, thrown: &Thrown) -> Result<bool, Unwind> {
        let Some((class_name, class_pos)) = &self.class else {
            return Ok(true);
        };
        match scope.get(*class_name) {
            Some(Obj::Class(class)) => {
                Ok(cx.builtins().class_of(&thrown.value).is_subclass_of(&class))
            }
            Some(other) => Err(cx.raise(not_a_class(other.type_name()), class_pos)),
            None => Err(cx.raise(symbol_not_defined(*class_name), class_pos)),
        }
    }
}

/// `try { .. } catch .. finally { .. }`
///
/// The first matching clause handles a raise. `finally` runs on every exit,
/// and an exit of its own replaces the pending one.
#[derive(Debug)]
pub struct Try {
    pub pos: Pos,
    pub body: Block,
    pub catches: Vec<Catch>,
    pub finally: Option<Block>,
}

impl Node for Try {
    fn pos(&self) -> &Pos {
        &self.pos
    }

    fn execute<'a>(&'a self, cx: &'a Context, scope: &'a Scope) -> BoxFuture<'a, ExecResult> {
        Box::pin(async move {
            let mut result = self.body.execute(cx, scope).await;
            if let Err(Unwind::Raise(thrown)) = &result {
                let thrown = Thrown::clone(thrown);
                for clause in &self.catches {
                    match clause.matches(cx, scope, &thrown) {
                        Ok(false) => continue,
                        Ok(true) => {
                            let handler = scope.child();
                            let bound = handler.add_item(clause.name, false, thrown.value.clone());
                            result = match bound {
                                Ok(()) => clause.body.execute(cx, &handler).await,
                                Err(error) => Err(cx.raise(error, &clause.pos)),
                            };
                        }
                        Err(unwind) => result = Err(unwind),
                    }
                    break;
                }
            }
            if let Some(finally) = &self.finally {
                finally.execute(cx, scope).await?;
            }
            result
        })
    }
}
