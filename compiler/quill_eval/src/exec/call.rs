//! Calls: closures, natives, bound methods and construction.

use std::sync::Arc;

use futures::future::BoxFuture;
use quill_ir::{Name, Pos};
use rustc_hash::FxHashSet;

use crate::cache::{CacheKind, InlineCache, ShapeKey};
use crate::class::{ClassId, Instance, Member, ObjClass, Resolved};
use crate::context::Context;
use crate::errors::{
    missing_argument, no_such_member, not_callable, null_receiver, too_many_arguments,
    wrong_arg_count,
};
use crate::scope::{Scope, ThisRef};
use crate::stack::StackSafe;
use crate::value::{Callable, Closure, NativeBody, NativeCall, NativeFn, Obj};

use super::{ClassDef, ClassItem, ExecResult, Node, NodeBox, Param, RaiseAt, Unwind};

/// Invoke any callable value (or class) with positional arguments.
pub fn call_value<'a>(
    cx: &'a Context,
    callee: &'a Obj,
    args: Vec<Obj>,
    pos: &'a Pos,
) -> BoxFuture<'a, ExecResult> {
    Box::pin(async move {
        match callee {
            Obj::Callable(callable) => call_callable(cx, callable, None, args, pos).await,
            Obj::Class(class) => construct(cx, class, args, pos).await,
            other => Err(cx.raise(not_callable(other.type_name()), pos)),
        }
    })
}

fn call_callable<'a>(
    cx: &'a Context,
    callable: &'a Callable,
    this: Option<Obj>,
    args: Vec<Obj>,
    pos: &'a Pos,
) -> BoxFuture<'a, ExecResult> {
    Box::pin(async move {
        match callable {
            Callable::Closure(closure) => {
                let this = this.map(|value| ThisRef {
                    class: Arc::clone(cx.builtins().class_of(&value)),
                    value,
                });
                call_closure(cx, closure, this, args, pos).await
            }
            Callable::Native(native) => call_native(cx, native, this, args, pos).await,
            Callable::Bound(bound) => {
                call_callable(cx, &bound.method, Some(bound.receiver.clone()), args, pos).await
            }
        }
    })
}

/// Call a member value with `receiver` as `this`.
pub(crate) async fn call_member(
    cx: &Context,
    method: Obj,
    receiver: Obj,
    args: Vec<Obj>,
    pos: &Pos,
) -> ExecResult {
    match &method {
        Obj::Callable(callable) => call_callable(cx, callable, Some(receiver), args, pos).await,
        other => call_value(cx, other, args, pos).await,
    }
}

/// The value of reading `member` through `receiver`: properties run their
/// getter, functions come back bound.
pub(crate) async fn read_member(
    cx: &Context,
    member: &Member,
    receiver: Obj,
    pos: &Pos,
) -> ExecResult {
    let value = member.value();
    if member.is_property() {
        return call_member(cx, value, receiver, Vec::new(), pos).await;
    }
    Ok(match value {
        Obj::Callable(callable) => Obj::Callable(callable.bind(receiver)),
        value => value,
    })
}

async fn call_native(
    cx: &Context,
    native: &NativeFn,
    this: Option<Obj>,
    args: Vec<Obj>,
    pos: &Pos,
) -> ExecResult {
    if !native.arity.accepts(args.len()) {
        let expected = native.arity.to_string();
        return Err(cx.raise(
            wrong_arg_count(native.name.as_str(), &expected, args.len()),
            pos,
        ));
    }
    let call = NativeCall {
        cx,
        pos,
        this,
        args,
    };
    match &native.body {
        NativeBody::Sync(body) => body(&call),
        NativeBody::Async(body) => body(call).await,
    }
}

/// Run a script function in a fresh (or recycled) frame.
pub(crate) fn call_closure<'a>(
    cx: &'a Context,
    closure: &'a Closure,
    this: Option<ThisRef>,
    args: Vec<Obj>,
    pos: &'a Pos,
) -> BoxFuture<'a, ExecResult> {
    Box::pin(StackSafe::new(Box::pin(async move {
        let _guard = cx.enter_call(pos)?;
        let def = &closure.def;
        let frame = cx.pool().acquire(def.shape, &closure.captured, this, args);
        let result = match bind_params(cx, def.name, &def.params, &frame, pos).await {
            Ok(()) => def.body.execute(cx, &frame).await,
            Err(unwind) => Err(unwind),
        };
        cx.pool().release(frame);
        match result {
            Ok(value) | Err(Unwind::Return(value)) => Ok(value),
            Err(unwind) => Err(unwind),
        }
    })))
}

/// Bind the frame's arguments to `params`. Missing arguments take their
/// default, evaluated in the frame so it can see earlier parameters.
async fn bind_params(
    cx: &Context,
    callee: Name,
    params: &[Param],
    frame: &Scope,
    pos: &Pos,
) -> Result<(), Unwind> {
    let args = frame.arguments();
    let positional = params.iter().filter(|p| !p.variadic).count();
    if args.len() > positional && !params.iter().any(|p| p.variadic) {
        return Err(cx.raise(too_many_arguments(callee, positional, args.len()), pos));
    }
    for (i, param) in params.iter().enumerate() {
        let value = if param.variadic {
            Obj::list(args.get(i..).map(<[Obj]>::to_vec).unwrap_or_default())
        } else if let Some(arg) = args.get(i) {
            arg.clone()
        } else if let Some(default) = &param.default {
            default.execute(cx, frame).await?
        } else {
            return Err(cx.raise(missing_argument(i + 1, param.name), pos));
        };
        frame.add_item(param.name, false, value).at(cx, &param.pos)?;
    }
    Ok(())
}

async fn construct(cx: &Context, class: &Arc<ObjClass>, args: Vec<Obj>, pos: &Pos) -> ExecResult {
    if let Some(ctor) = class.native_ctor() {
        let call = NativeCall {
            cx,
            pos,
            this: None,
            args,
        };
        return ctor(&call, class);
    }
    if class.script().is_none() {
        return Err(cx.raise(not_callable(&format!("class {}", class.name())), pos));
    }
    let instance = Arc::new(Instance::new(Arc::clone(class)));
    let mut initialized = FxHashSet::default();
    initialize(cx, class, &instance, args, &mut initialized, pos).await?;
    tracing::trace!(class = %class.name(), "instance constructed");
    Ok(Obj::Instance(instance))
}

/// Run `class`'s constructor on `instance`: parameters, then base
/// initializers in declaration order, then field initializers and `init`
/// blocks in source order. A base shared by several paths runs once.
fn initialize<'a>(
    cx: &'a Context,
    class: &'a Arc<ObjClass>,
    instance: &'a Arc<Instance>,
    args: Vec<Obj>,
    done: &'a mut FxHashSet<ClassId>,
    pos: &'a Pos,
) -> BoxFuture<'a, Result<(), Unwind>> {
    Box::pin(StackSafe::new(Box::pin(async move {
        if !done.insert(class.id()) {
            return Ok(());
        }
        let Some(script) = class.script() else {
            return Ok(());
        };
        let _guard = cx.enter_call(pos)?;
        let this = ThisRef {
            value: Obj::Instance(Arc::clone(instance)),
            class: Arc::clone(instance.class()),
        };
        let frame = cx.pool().acquire(script.def.shape, &script.scope, Some(this), args);
        let result = run_initializers(cx, class, &script.def, instance, &frame, done, pos).await;
        cx.pool().release(frame);
        result
    })))
}

async fn run_initializers(
    cx: &Context,
    class: &ObjClass,
    def: &ClassDef,
    instance: &Arc<Instance>,
    frame: &Scope,
    done: &mut FxHashSet<ClassId>,
    pos: &Pos,
) -> Result<(), Unwind> {
    let layout = instance.class().layout();
    let args = frame.arguments();
    if args.len() > def.params.len() {
        return Err(cx.raise(too_many_arguments(def.name, def.params.len(), args.len()), pos));
    }
    for (i, param) in def.params.iter().map(|p| &p.param).enumerate() {
        let value = if let Some(arg) = args.get(i) {
            arg.clone()
        } else if let Some(default) = &param.default {
            default.execute(cx, frame).await?
        } else {
            return Err(cx.raise(missing_argument(i + 1, param.name), pos));
        };
        frame.add_item(param.name, false, value.clone()).at(cx, &param.pos)?;
        if let Some(slot) = layout.slot(param.name) {
            instance.init_field(slot, value);
        }
    }
    // From here on names resolve to the fields.
    frame.clear_bindings();

    for (spec, base) in def.bases.iter().zip(class.bases()) {
        let base_args = eval_args(cx, frame, &spec.args).await?;
        initialize(cx, base, instance, base_args, done, &spec.pos).await?;
    }

    for item in &def.items {
        match item {
            ClassItem::Field(field) => {
                let value = match &field.init {
                    Some(init) => init.execute(cx, frame).await?,
                    None => Obj::Null,
                };
                if let Some(slot) = layout.slot(field.name) {
                    instance.init_field(slot, value);
                }
            }
            ClassItem::Init(block) => {
                block.execute(cx, frame).await?;
            }
            ClassItem::Method(_) => {}
        }
    }
    Ok(())
}

pub(crate) async fn eval_args(
    cx: &Context,
    scope: &Scope,
    nodes: &[NodeBox],
) -> Result<Vec<Obj>, Unwind> {
    let mut args = Vec::with_capacity(nodes.len());
    for node in nodes {
        args.push(node.execute(cx, scope).await?);
    }
    Ok(args)
}

/// Render a value for output, honoring a script `toString` method.
pub fn stringify<'a>(
    cx: &'a Context,
    value: &'a Obj,
    pos: &'a Pos,
) -> BoxFuture<'a, Result<String, Unwind>> {
    Box::pin(async move {
        if let Obj::Instance(instance) = value {
            if let Some(member) = instance.class().resolve_member(Name::TO_STRING) {
                if !member.is_property() {
                    let text = call_member(cx, member.value(), value.clone(), Vec::new(), pos).await?;
                    return Ok(match text {
                        Obj::Str(s) => s.to_string(),
                        other => other.to_string(),
                    });
                }
            }
        }
        Ok(value.to_string())
    })
}

/// `callee(args)`
#[derive(Debug)]
pub struct Call {
    pub pos: Pos,
    pub callee: NodeBox,
    pub args: Vec<NodeBox>,
}

impl Node for Call {
    fn pos(&self) -> &Pos {
        &self.pos
    }

    fn execute<'a>(&'a self, cx: &'a Context, scope: &'a Scope) -> BoxFuture<'a, ExecResult> {
        Box::pin(async move {
            let callee = self.callee.execute(cx, scope).await?;
            let args = eval_args(cx, scope, &self.args).await?;
            call_value(cx, &callee, args, &self.pos).await
        })
    }
}

/// `receiver.name(args)`, resolved through the receiver's class with an
/// inline cache.
#[derive(Debug)]
pub struct MethodCall {
    pub pos: Pos,
    pub receiver: NodeBox,
    pub name: Name,
    pub args: Vec<NodeBox>,
    cache: InlineCache<Resolved>,
}

impl MethodCall {
    pub fn new(pos: Pos, receiver: NodeBox, name: Name, args: Vec<NodeBox>) -> Self {
        MethodCall {
            pos,
            receiver,
            name,
            args,
            cache: InlineCache::new(),
        }
    }

    pub fn cache(&self) -> &InlineCache<Resolved> {
        &self.cache
    }
}

impl Node for MethodCall {
    fn pos(&self) -> &Pos {
        &self.pos
    }

    fn execute<'a>(&'a self, cx: &'a Context, scope: &'a Scope) -> BoxFuture<'a, ExecResult> {
        Box::pin(async move {
            let receiver = self.receiver.execute(cx, scope).await?;
            if receiver.is_null() {
                return Err(cx.raise(null_receiver(self.name), &self.pos));
            }
            let class = Arc::clone(cx.builtins().class_of(&receiver));
            let version = class.layout_version();
            let resolved = self
                .cache
                .get_or_resolve(
                    cx.site(CacheKind::Method),
                    ShapeKey::of(class.id()),
                    version,
                    || {
                        class
                            .resolve(self.name)
                            .ok_or_else(|| no_such_member(self.name, class.name()))
                    },
                )
                .at(cx, &self.pos)?;
            let args = eval_args(cx, scope, &self.args).await?;
            match resolved {
                Resolved::Slot { index, .. } => {
                    let Obj::Instance(instance) = &receiver else {
                        return Err(cx.raise(no_such_member(self.name, class.name()), &self.pos));
                    };
                    let field = instance.field(index);
                    call_value(cx, &field, args, &self.pos).await
                }
                Resolved::Member(member) if member.is_property() => {
                    let value = read_member(cx, &member, receiver, &self.pos).await?;
                    call_value(cx, &value, args, &self.pos).await
                }
                Resolved::Member(member) => {
                    call_member(cx, member.value(), receiver, args, &self.pos).await
                }
            }
        })
    }
}
