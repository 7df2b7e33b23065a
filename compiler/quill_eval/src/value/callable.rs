use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use quill_ir::{Name, Pos};

use crate::context::Context;
use crate::errors::{wrong_arg_type, RuntimeError};
use crate::exec::{ExecResult, FnDef, Unwind};
use crate::scope::Scope;

use super::Obj;

static VOID: Obj = Obj::Void;

/// Synchronous host function.
pub type SyncNative = dyn Fn(&NativeCall<'_>) -> ExecResult + Send + Sync;

/// Host function that may suspend (`yield`, `delay`, `await`, `launch`).
pub type AsyncNative = for<'a> fn(NativeCall<'a>) -> BoxFuture<'a, ExecResult>;

/// Arguments and context handed to a native function.
pub struct NativeCall<'a> {
    pub cx: &'a Context,
    pub pos: &'a Pos,
    /// Receiver for member calls.
    pub this: Option<Obj>,
    pub args: Vec<Obj>,
}

impl NativeCall<'_> {
    /// Argument `index`, or `void` when absent.
    pub fn arg(&self, index: usize) -> &Obj {
        self.args.get(index).unwrap_or(&VOID)
    }

    /// The receiver, or `void` for free functions.
    pub fn this(&self) -> &Obj {
        self.this.as_ref().unwrap_or(&VOID)
    }

    /// Raise `error` at the call site.
    pub fn fail(&self, error: RuntimeError) -> Unwind {
        self.cx.raise(error, self.pos)
    }

    pub fn int_arg(&self, index: usize, callee: &str) -> Result<i64, Unwind> {
        self.arg(index)
            .as_int()
            .ok_or_else(|| self.fail(wrong_arg_type(callee, "Int", self.arg(index).type_name())))
    }

    pub fn real_arg(&self, index: usize, callee: &str) -> Result<f64, Unwind> {
        self.arg(index)
            .as_real()
            .ok_or_else(|| self.fail(wrong_arg_type(callee, "a number", self.arg(index).type_name())))
    }

    pub fn str_arg(&self, index: usize, callee: &str) -> Result<&str, Unwind> {
        self.arg(index)
            .as_str()
            .ok_or_else(|| self.fail(wrong_arg_type(callee, "String", self.arg(index).type_name())))
    }
}

/// How many arguments a native accepts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Between(usize, usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::Between(lo, hi) => (lo..=hi).contains(&count),
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{n}"),
            Arity::Between(lo, hi) => write!(f, "{lo} to {hi}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

pub enum NativeBody {
    Sync(Arc<SyncNative>),
    Async(AsyncNative),
}

/// A host-implemented function.
pub struct NativeFn {
    pub name: Name,
    pub arity: Arity,
    pub body: NativeBody,
}

impl NativeFn {
    pub fn sync<F>(name: &str, arity: Arity, body: F) -> Callable
    where
        F: Fn(&NativeCall<'_>) -> ExecResult + Send + Sync + 'static,
    {
        Callable::Native(Arc::new(NativeFn {
            name: Name::intern(name),
            arity,
            body: NativeBody::Sync(Arc::new(body)),
        }))
    }

    pub fn suspending(name: &str, arity: Arity, body: AsyncNative) -> Callable {
        Callable::Native(Arc::new(NativeFn {
            name: Name::intern(name),
            arity,
            body: NativeBody::Async(body),
        }))
    }
}

/// A script function value: its definition plus the scope it closed over.
pub struct Closure {
    pub def: Arc<FnDef>,
    pub captured: Scope,
}

/// A callable paired with the receiver it was read from (`obj.method`).
pub struct BoundMethod {
    pub receiver: Obj,
    pub method: Callable,
}

/// Anything a call expression can invoke besides a class.
#[derive(Clone)]
pub enum Callable {
    Closure(Arc<Closure>),
    Native(Arc<NativeFn>),
    Bound(Arc<BoundMethod>),
}

impl Callable {
    pub fn name(&self) -> Name {
        match self {
            Callable::Closure(closure) => closure.def.name,
            Callable::Native(native) => native.name,
            Callable::Bound(bound) => bound.method.name(),
        }
    }

    pub fn bind(&self, receiver: Obj) -> Callable {
        Callable::Bound(Arc::new(BoundMethod {
            receiver,
            method: self.clone(),
        }))
    }

    pub(crate) fn identity(&self) -> usize {
        match self {
            Callable::Closure(closure) => Arc::as_ptr(closure) as usize,
            Callable::Native(native) => Arc::as_ptr(native) as usize,
            Callable::Bound(bound) => Arc::as_ptr(bound) as usize,
        }
    }

    pub(crate) fn same(&self, other: &Callable) -> bool {
        match (self, other) {
            (Callable::Bound(a), Callable::Bound(b)) => {
                a.receiver.equals(&b.receiver) && a.method.same(&b.method)
            }
            _ => self.identity() == other.identity(),
        }
    }
}

impl Obj {
    /// Wrap a host closure as a script-callable value.
    pub fn native_fn<F>(name: &str, arity: Arity, body: F) -> Obj
    where
        F: Fn(&NativeCall<'_>) -> ExecResult + Send + Sync + 'static,
    {
        Obj::Callable(NativeFn::sync(name, arity, body))
    }
}
