//! Native members of the builtin classes.

use std::sync::Arc;

use futures::future::BoxFuture;
use quill_ir::Name;

use crate::class::{ClassBuilder, ObjClass};
use crate::errors::{index_out_of_bounds, wrong_arg_type, ErrorKind, RuntimeError};
use crate::exec::{ExecResult, Unwind};
use crate::value::{Arity, NativeCall, NativeFn, Obj, ObjError, ObjList, ObjMap, ObjRange};

fn count(n: usize) -> Obj {
    Obj::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

fn wrong_receiver(call: &NativeCall<'_>, expected: &str) -> Unwind {
    call.fail(wrong_arg_type("member", expected, call.this().type_name()))
}

fn this_str<'c>(call: &'c NativeCall<'_>) -> Result<&'c str, Unwind> {
    call.this().as_str().ok_or_else(|| wrong_receiver(call, "String"))
}

fn this_list<'c>(call: &'c NativeCall<'_>) -> Result<&'c Arc<ObjList>, Unwind> {
    match call.this() {
        Obj::List(list) => Ok(list),
        _ => Err(wrong_receiver(call, "List")),
    }
}

fn this_map<'c>(call: &'c NativeCall<'_>) -> Result<&'c Arc<ObjMap>, Unwind> {
    match call.this() {
        Obj::Map(map) => Ok(map),
        _ => Err(wrong_receiver(call, "Map")),
    }
}

fn this_range(call: &NativeCall<'_>) -> Result<ObjRange, Unwind> {
    match call.this() {
        Obj::Range(range) => Ok(*range),
        _ => Err(wrong_receiver(call, "Range")),
    }
}

fn this_error<'c>(call: &'c NativeCall<'_>) -> Result<&'c Arc<ObjError>, Unwind> {
    match call.this() {
        Obj::Error(error) => Ok(error),
        _ => Err(wrong_receiver(call, "Exception")),
    }
}

fn to_string_method() -> crate::value::Callable {
    NativeFn::sync("toString", Arity::Exact(0), |call| {
        Ok(Obj::string(call.this().to_string()))
    })
}

/// A class with nothing but `toString()`.
pub(super) fn plain_class(name: &str) -> Result<Arc<ObjClass>, RuntimeError> {
    ClassBuilder::new(Name::intern(name))
        .builtin()
        .method(to_string_method())
        .build()
}

pub(super) fn number_class(name: &str) -> Result<Arc<ObjClass>, RuntimeError> {
    ClassBuilder::new(Name::intern(name))
        .builtin()
        .method(to_string_method())
        .method(NativeFn::sync("toInt", Arity::Exact(0), |call| match call.this() {
            Obj::Int(n) => Ok(Obj::Int(*n)),
            Obj::Real(r) => real_to_int(*r).map_err(|e| call.fail(e)),
            _ => Err(wrong_receiver(call, "a number")),
        }))
        .method(NativeFn::sync("toReal", Arity::Exact(0), |call| {
            call.this()
                .as_real()
                .map(Obj::Real)
                .ok_or_else(|| wrong_receiver(call, "a number"))
        }))
        .method(NativeFn::sync("abs", Arity::Exact(0), |call| {
            abs(call.this()).map_err(|e| call.fail(e))
        }))
        .build()
}

pub(super) fn real_to_int(r: f64) -> Result<Obj, RuntimeError> {
    #[expect(
        clippy::cast_precision_loss,
        reason = "bounds check only; exact at the edges is not required"
    )]
    let in_range = r.is_finite() && r >= i64::MIN as f64 && r < i64::MAX as f64;
    if !in_range {
        return Err(RuntimeError::new(
            ErrorKind::Arithmetic,
            format!("{r} cannot be converted to Int"),
        ));
    }
    #[expect(
        clippy::cast_possible_truncation,
        reason = "toInt truncates toward zero; range checked above"
    )]
    let truncated = r.trunc() as i64;
    Ok(Obj::Int(truncated))
}

pub(super) fn abs(value: &Obj) -> Result<Obj, RuntimeError> {
    match value {
        Obj::Int(n) => n.checked_abs().map(Obj::Int).ok_or_else(|| {
            RuntimeError::new(ErrorKind::Arithmetic, "integer overflow in abs")
        }),
        Obj::Real(r) => Ok(Obj::Real(r.abs())),
        other => Err(wrong_arg_type("abs", "a number", other.type_name())),
    }
}

pub(super) fn string_class() -> Result<Arc<ObjClass>, RuntimeError> {
    ClassBuilder::new(Name::intern("String"))
        .builtin()
        .property(NativeFn::sync("size", Arity::Exact(0), |call| {
            Ok(count(this_str(call)?.chars().count()))
        }))
        .method(NativeFn::sync("isEmpty", Arity::Exact(0), |call| {
            Ok(Obj::Bool(this_str(call)?.is_empty()))
        }))
        .method(NativeFn::sync("upper", Arity::Exact(0), |call| {
            Ok(Obj::string(this_str(call)?.to_uppercase()))
        }))
        .method(NativeFn::sync("lower", Arity::Exact(0), |call| {
            Ok(Obj::string(this_str(call)?.to_lowercase()))
        }))
        .method(NativeFn::sync("trim", Arity::Exact(0), |call| {
            Ok(Obj::string(this_str(call)?.trim()))
        }))
        .method(NativeFn::sync("contains", Arity::Exact(1), |call| {
            let needle = call.str_arg(0, "contains")?;
            Ok(Obj::Bool(this_str(call)?.contains(needle)))
        }))
        .method(NativeFn::sync("startsWith", Arity::Exact(1), |call| {
            let prefix = call.str_arg(0, "startsWith")?;
            Ok(Obj::Bool(this_str(call)?.starts_with(prefix)))
        }))
        .method(NativeFn::sync("endsWith", Arity::Exact(1), |call| {
            let suffix = call.str_arg(0, "endsWith")?;
            Ok(Obj::Bool(this_str(call)?.ends_with(suffix)))
        }))
        .method(to_string_method())
        .method(NativeFn::sync("toInt", Arity::Exact(0), |call| {
            let text = this_str(call)?;
            text.trim().parse::<i64>().map(Obj::Int).map_err(|_| {
                call.fail(RuntimeError::new(
                    ErrorKind::IllegalArgument,
                    format!("invalid integer: {text}"),
                ))
            })
        }))
        .method(NativeFn::sync("split", Arity::Exact(1), |call| {
            let text = this_str(call)?;
            let sep = call.str_arg(0, "split")?;
            let parts: Vec<Obj> = if sep.is_empty() {
                text.chars().map(|c| Obj::string(c.to_string())).collect()
            } else {
                text.split(sep).map(Obj::from).collect()
            };
            Ok(Obj::list(parts))
        }))
        .build()
}

pub(super) fn list_class() -> Result<Arc<ObjClass>, RuntimeError> {
    ClassBuilder::new(Name::intern("List"))
        .builtin()
        .native_ctor(|call, _| Ok(Obj::list(call.args.clone())))
        .property(NativeFn::sync("size", Arity::Exact(0), |call| {
            Ok(count(this_list(call)?.len()))
        }))
        .method(NativeFn::sync("isEmpty", Arity::Exact(0), |call| {
            Ok(Obj::Bool(this_list(call)?.is_empty()))
        }))
        .method(NativeFn::sync("add", Arity::AtLeast(1), |call| {
            this_list(call)?
                .extend(call.args.clone())
                .map_err(|e| call.fail(e))?;
            Ok(Obj::Void)
        }))
        .method(NativeFn::sync("removeLast", Arity::Exact(0), |call| {
            let list = this_list(call)?;
            list.pop()
                .map_err(|e| call.fail(e))?
                .ok_or_else(|| call.fail(index_out_of_bounds(-1, 0)))
        }))
        .method(NativeFn::sync("contains", Arity::Exact(1), |call| {
            Ok(Obj::Bool(this_list(call)?.position(call.arg(0)).is_some()))
        }))
        .method(NativeFn::sync("indexOf", Arity::Exact(1), |call| {
            Ok(this_list(call)?
                .position(call.arg(0))
                .map_or(Obj::Int(-1), count))
        }))
        .property(NativeFn::sync("first", Arity::Exact(0), |call| {
            this_list(call)?
                .first()
                .ok_or_else(|| call.fail(index_out_of_bounds(0, 0)))
        }))
        .property(NativeFn::sync("last", Arity::Exact(0), |call| {
            this_list(call)?
                .last()
                .ok_or_else(|| call.fail(index_out_of_bounds(-1, 0)))
        }))
        .method(to_string_method())
        .method(NativeFn::sync("joinToString", Arity::Between(0, 1), |call| {
            let sep = match call.args.first() {
                Some(_) => call.str_arg(0, "joinToString")?,
                None => ", ",
            };
            let joined = this_list(call)?
                .snapshot()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(sep);
            Ok(Obj::string(joined))
        }))
        .build()
}

pub(super) fn map_class() -> Result<Arc<ObjClass>, RuntimeError> {
    ClassBuilder::new(Name::intern("Map"))
        .builtin()
        .native_ctor(|_, _| Ok(Obj::empty_map()))
        .property(NativeFn::sync("size", Arity::Exact(0), |call| {
            Ok(count(this_map(call)?.len()))
        }))
        .method(NativeFn::sync("isEmpty", Arity::Exact(0), |call| {
            Ok(Obj::Bool(this_map(call)?.is_empty()))
        }))
        .method(NativeFn::sync("keys", Arity::Exact(0), |call| {
            Ok(Obj::list(this_map(call)?.keys()))
        }))
        .method(NativeFn::sync("values", Arity::Exact(0), |call| {
            Ok(Obj::list(this_map(call)?.values()))
        }))
        .method(NativeFn::sync("containsKey", Arity::Exact(1), |call| {
            Ok(Obj::Bool(this_map(call)?.contains_key(call.arg(0))))
        }))
        .method(NativeFn::sync("remove", Arity::Exact(1), |call| {
            let removed = this_map(call)?
                .remove(call.arg(0))
                .map_err(|e| call.fail(e))?;
            Ok(removed.unwrap_or(Obj::Null))
        }))
        .method(NativeFn::sync("getOrNull", Arity::Exact(1), |call| {
            Ok(this_map(call)?.get(call.arg(0)).unwrap_or(Obj::Null))
        }))
        .method(to_string_method())
        .build()
}

pub(super) fn range_class() -> Result<Arc<ObjClass>, RuntimeError> {
    ClassBuilder::new(Name::intern("Range"))
        .builtin()
        .property(NativeFn::sync("start", Arity::Exact(0), |call| {
            Ok(Obj::Int(this_range(call)?.start))
        }))
        .property(NativeFn::sync("end", Arity::Exact(0), |call| {
            Ok(Obj::Int(this_range(call)?.end))
        }))
        .property(NativeFn::sync("isEndInclusive", Arity::Exact(0), |call| {
            Ok(Obj::Bool(this_range(call)?.inclusive))
        }))
        .method(NativeFn::sync("contains", Arity::Exact(1), |call| {
            let value = call.int_arg(0, "contains")?;
            Ok(Obj::Bool(this_range(call)?.contains(value)))
        }))
        .method(NativeFn::sync("toList", Arity::Exact(0), |call| {
            let range = this_range(call)?;
            Ok(Obj::list(range.values().map(Obj::Int).collect()))
        }))
        .method(to_string_method())
        .build()
}

fn await_deferred(call: NativeCall<'_>) -> BoxFuture<'_, ExecResult> {
    Box::pin(async move {
        let Obj::Deferred(deferred) = call.this().clone() else {
            return Err(wrong_receiver(&call, "Deferred"));
        };
        match deferred.wait().await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(thrown)) => Err(Unwind::Raise(Box::new(thrown))),
            Err(error) => Err(call.fail(error)),
        }
    })
}

pub(super) fn deferred_class() -> Result<Arc<ObjClass>, RuntimeError> {
    ClassBuilder::new(Name::intern("Deferred"))
        .builtin()
        .method(NativeFn::suspending("await", Arity::Exact(0), await_deferred))
        .property(NativeFn::sync("isActive", Arity::Exact(0), |call| match call.this() {
            Obj::Deferred(deferred) => Ok(Obj::Bool(deferred.is_active())),
            _ => Err(wrong_receiver(call, "Deferred")),
        }))
        .method(to_string_method())
        .build()
}

/// `Exception` itself (no base) or one of its builtin subclasses.
pub(super) fn exception_class(
    name: Name,
    base: Option<&Arc<ObjClass>>,
) -> Result<Arc<ObjClass>, RuntimeError> {
    let builder = ClassBuilder::new(name).builtin().native_ctor(|call, class| {
        let message = match call.args.first() {
            None | Some(Obj::Void | Obj::Null) => String::new(),
            Some(value) => value.to_string(),
        };
        Ok(Obj::Error(Arc::new(ObjError::new(Arc::clone(class), message))))
    });
    match base {
        Some(base) => builder.base(Arc::clone(base)).build(),
        None => builder
            .property(NativeFn::sync("message", Arity::Exact(0), |call| {
                Ok(Obj::string(this_error(call)?.message.as_str()))
            }))
            .method(to_string_method())
            .build(),
    }
}
