//! Global functions and constants.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use quill_ir::Name;
use tokio::runtime::Handle;

use crate::errors::{condition_not_bool, not_a_class, wrong_arg_type, ErrorKind, RuntimeError};
use crate::exec::{call_value, stringify, ExecResult, Unwind};
use crate::operators::compare;
use crate::scope::Scope;
use crate::value::{Arity, Deferred, NativeCall, NativeFn, Obj};

use super::{members, Builtins};

/// Bind the standard library and every builtin class name in `scope`.
pub fn register_stdlib(scope: &Scope, builtins: &Builtins) -> Result<(), RuntimeError> {
    for class in builtins.named_classes() {
        scope.add_item(class.name(), false, Obj::Class(Arc::clone(class)))?;
    }

    let natives = [
        NativeFn::suspending("print", Arity::AtLeast(0), print),
        NativeFn::suspending("println", Arity::AtLeast(0), println),
        NativeFn::sync("assert", Arity::Between(1, 2), assert),
        NativeFn::sync("assertEquals", Arity::Exact(2), assert_equals),
        NativeFn::sync("freeze", Arity::Exact(1), |call| {
            call.arg(0).freeze();
            Ok(call.arg(0).clone())
        }),
        NativeFn::sync("isFrozen", Arity::Exact(1), |call| {
            Ok(Obj::Bool(call.arg(0).is_frozen()))
        }),
        NativeFn::sync("typeOf", Arity::Exact(1), |call| {
            let class = call.cx.builtins().class_of(call.arg(0));
            Ok(Obj::string(class.name().as_str()))
        }),
        NativeFn::sync("classOf", Arity::Exact(1), |call| {
            let class = call.cx.builtins().class_of(call.arg(0));
            Ok(Obj::Class(Arc::clone(class)))
        }),
        NativeFn::sync("addMember", Arity::Between(3, 4), add_member),
        NativeFn::sync("abs", Arity::Exact(1), |call| {
            members::abs(call.arg(0)).map_err(|e| call.fail(e))
        }),
        NativeFn::sync("sqrt", Arity::Exact(1), |call| {
            Ok(Obj::Real(call.real_arg(0, "sqrt")?.sqrt()))
        }),
        NativeFn::sync("min", Arity::Exact(2), |call| pick(call, std::cmp::Ordering::Greater)),
        NativeFn::sync("max", Arity::Exact(2), |call| pick(call, std::cmp::Ordering::Less)),
        NativeFn::suspending("yield", Arity::Exact(0), yield_now),
        NativeFn::suspending("delay", Arity::Exact(1), delay),
        NativeFn::sync("launch", Arity::Exact(1), launch),
    ];
    for native in natives {
        scope.add_item(native.name(), false, Obj::Callable(native))?;
    }

    scope.add_item(Name::intern("PI"), false, Obj::Real(std::f64::consts::PI))?;
    scope.add_item(Name::intern("E"), false, Obj::Real(std::f64::consts::E))?;
    tracing::debug!(bindings = scope.len(), "standard library registered");
    Ok(())
}

async fn render_args(call: &NativeCall<'_>) -> Result<String, Unwind> {
    let mut parts = Vec::with_capacity(call.args.len());
    for arg in &call.args {
        parts.push(stringify(call.cx, arg, call.pos).await?);
    }
    Ok(parts.join(" "))
}

fn print(call: NativeCall<'_>) -> BoxFuture<'_, ExecResult> {
    Box::pin(async move {
        let text = render_args(&call).await?;
        call.cx.print().print(&text);
        Ok(Obj::Void)
    })
}

fn println(call: NativeCall<'_>) -> BoxFuture<'_, ExecResult> {
    Box::pin(async move {
        let text = render_args(&call).await?;
        call.cx.print().println(&text);
        Ok(Obj::Void)
    })
}

fn assert(call: &NativeCall<'_>) -> ExecResult {
    let Obj::Bool(holds) = call.arg(0) else {
        return Err(call.fail(condition_not_bool(call.arg(0).type_name())));
    };
    if *holds {
        return Ok(Obj::Void);
    }
    let message = match call.args.get(1) {
        Some(message) => message.to_string(),
        None => "assertion failed".to_owned(),
    };
    Err(call.fail(RuntimeError::new(ErrorKind::AssertionFailed, message)))
}

fn assert_equals(call: &NativeCall<'_>) -> ExecResult {
    let (expected, actual) = (call.arg(0), call.arg(1));
    if expected.equals(actual) {
        return Ok(Obj::Void);
    }
    Err(call.fail(RuntimeError::new(
        ErrorKind::AssertionFailed,
        format!("expected: {expected} but was: {actual}"),
    )))
}

fn add_member(call: &NativeCall<'_>) -> ExecResult {
    let Obj::Class(class) = call.arg(0) else {
        return Err(call.fail(not_a_class(call.arg(0).type_name())));
    };
    let name = Name::intern(call.str_arg(1, "addMember")?);
    let mutable = match call.args.get(3) {
        None => false,
        Some(Obj::Bool(b)) => *b,
        Some(other) => {
            return Err(call.fail(wrong_arg_type("addMember", "Bool", other.type_name())));
        }
    };
    class
        .add_member(name, call.arg(2).clone(), mutable)
        .map_err(|e| call.fail(e))?;
    Ok(Obj::Void)
}

/// Keep the first argument unless it compares as `replace_when` to the
/// second.
fn pick(call: &NativeCall<'_>, replace_when: std::cmp::Ordering) -> ExecResult {
    let (a, b) = (call.arg(0), call.arg(1));
    let ordering = compare(a, b).map_err(|e| call.fail(e))?;
    Ok(if ordering == replace_when { b.clone() } else { a.clone() })
}

fn yield_now(_call: NativeCall<'_>) -> BoxFuture<'_, ExecResult> {
    Box::pin(async move {
        tokio::task::yield_now().await;
        Ok(Obj::Void)
    })
}

fn delay(call: NativeCall<'_>) -> BoxFuture<'_, ExecResult> {
    Box::pin(async move {
        let ms = call.int_arg(0, "delay")?;
        let ms = u64::try_from(ms).map_err(|_| {
            call.fail(RuntimeError::new(
                ErrorKind::IllegalArgument,
                format!("delay must not be negative, got {ms}"),
            ))
        })?;
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok(Obj::Void)
    })
}

/// Run a function as a coroutine on its own context.
fn launch(call: &NativeCall<'_>) -> ExecResult {
    let callee = call.arg(0).clone();
    if !matches!(callee, Obj::Callable(_)) {
        return Err(call.fail(wrong_arg_type("launch", "a function", callee.type_name())));
    }
    let handle = Handle::try_current().map_err(|_| {
        call.fail(RuntimeError::new(
            ErrorKind::IllegalState,
            "launch requires a running tokio runtime",
        ))
    })?;
    let cx = call.cx.fork();
    let pos = call.pos.clone();
    let deferred = Deferred::spawn(&handle, async move {
        match call_value(&cx, &callee, Vec::new(), &pos).await {
            Ok(value) | Err(Unwind::Return(value)) => Ok(value),
            Err(Unwind::Raise(thrown)) => Err(*thrown),
            Err(Unwind::Break(_) | Unwind::Continue(_)) => Ok(Obj::Void),
        }
    });
    Ok(Obj::Deferred(Arc::new(deferred)))
}
