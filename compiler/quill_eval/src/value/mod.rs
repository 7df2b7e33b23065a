//! Runtime values.
//!
//! [`Obj`] is the tagged value every node produces. Shared containers
//! (lists, maps, instances, classes) are `Arc`-backed so cloning an `Obj`
//! never copies contents; scalars are stored inline.
//!
//! Dynamic dispatch never switches on the `Obj` variant directly outside
//! this module and `operators`: member access goes through the value's
//! class (see `Builtins::class_of`), operators through its operator table.

mod callable;
mod deferred;
mod error;
mod list;
mod map;

pub use callable::{
    Arity, AsyncNative, BoundMethod, Callable, Closure, NativeBody, NativeCall, NativeFn,
    SyncNative,
};
pub use deferred::Deferred;
pub use error::ObjError;
pub use list::ObjList;
pub use map::{MapKey, ObjMap};

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

use crate::class::{Instance, ObjClass};

/// An integer range, `start..end` or `start..<end`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjRange {
    pub start: i64,
    pub end: i64,
    pub inclusive: bool,
}

impl ObjRange {
    /// Largest value in the range, `None` when it is empty.
    pub fn last(&self) -> Option<i64> {
        let last = if self.inclusive {
            self.end
        } else {
            self.end.checked_sub(1)?
        };
        (self.start <= last).then_some(last)
    }

    /// The values in order. Never overflows, even when the range ends at
    /// `i64::MAX`.
    pub fn values(&self) -> RangeInclusive<i64> {
        match self.last() {
            Some(last) => self.start..=last,
            None => 1..=0,
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        self.last().is_some_and(|last| self.start <= value && value <= last)
    }

    pub fn len(&self) -> usize {
        self.last()
            .and_then(|last| usize::try_from(last.abs_diff(self.start)).ok())
            .map_or(0, |span| span.saturating_add(1))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The runtime value.
#[derive(Clone)]
pub enum Obj {
    Void,
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    Str(Arc<str>),
    List(Arc<ObjList>),
    Map(Arc<ObjMap>),
    Range(ObjRange),
    Error(Arc<ObjError>),
    Class(Arc<ObjClass>),
    Instance(Arc<Instance>),
    Callable(Callable),
    Deferred(Arc<Deferred>),
}

impl Obj {
    #[inline]
    pub fn string(text: impl Into<Arc<str>>) -> Obj {
        Obj::Str(text.into())
    }

    pub fn list(items: Vec<Obj>) -> Obj {
        Obj::List(Arc::new(ObjList::new(items)))
    }

    pub fn empty_map() -> Obj {
        Obj::Map(Arc::new(ObjMap::new()))
    }

    /// Name of the value's class, for messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Obj::Void => "Void",
            Obj::Null => "Null",
            Obj::Bool(_) => "Bool",
            Obj::Int(_) => "Int",
            Obj::Real(_) => "Real",
            Obj::Str(_) => "String",
            Obj::List(_) => "List",
            Obj::Map(_) => "Map",
            Obj::Range(_) => "Range",
            Obj::Error(error) => error.class.name().as_str(),
            Obj::Class(_) => "Class",
            Obj::Instance(instance) => instance.class().name().as_str(),
            Obj::Callable(_) => "Callable",
            Obj::Deferred(_) => "Deferred",
        }
    }

    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Obj::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric view: ints widen to reals.
    #[inline]
    pub fn as_real(&self) -> Option<f64> {
        match self {
            #[expect(
                clippy::cast_precision_loss,
                reason = "mixed arithmetic promotes Int to Real"
            )]
            Obj::Int(n) => Some(*n as f64),
            Obj::Real(r) => Some(*r),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Obj::Str(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Obj::Null)
    }

    /// Whether this value can be mutated in place and is frozen.
    pub fn is_frozen(&self) -> bool {
        match self {
            Obj::Instance(instance) => instance.is_frozen(),
            Obj::List(list) => list.is_frozen(),
            Obj::Map(map) => map.is_frozen(),
            _ => false,
        }
    }

    /// Freeze a mutable value; immutable values are unaffected.
    pub fn freeze(&self) {
        match self {
            Obj::Instance(instance) => instance.freeze(),
            Obj::List(list) => list.freeze(),
            Obj::Map(map) => map.freeze(),
            _ => {}
        }
    }

    /// Language equality (`==`): structural for data, identity for objects.
    pub fn equals(&self, other: &Obj) -> bool {
        match (self, other) {
            (Obj::Void, Obj::Void) | (Obj::Null, Obj::Null) => true,
            (Obj::Bool(a), Obj::Bool(b)) => a == b,
            (Obj::Int(a), Obj::Int(b)) => a == b,
            (Obj::Int(_) | Obj::Real(_), Obj::Int(_) | Obj::Real(_)) => {
                self.as_real() == other.as_real()
            }
            (Obj::Str(a), Obj::Str(b)) => a == b,
            (Obj::List(a), Obj::List(b)) => Arc::ptr_eq(a, b) || a.structurally_equals(b),
            (Obj::Map(a), Obj::Map(b)) => Arc::ptr_eq(a, b) || a.structurally_equals(b),
            (Obj::Range(a), Obj::Range(b)) => a == b,
            (Obj::Error(a), Obj::Error(b)) => Arc::ptr_eq(a, b),
            (Obj::Class(a), Obj::Class(b)) => Arc::ptr_eq(a, b),
            (Obj::Instance(a), Obj::Instance(b)) => Arc::ptr_eq(a, b),
            (Obj::Callable(a), Obj::Callable(b)) => a.same(b),
            (Obj::Deferred(a), Obj::Deferred(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl PartialEq for Obj {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl From<bool> for Obj {
    fn from(value: bool) -> Self {
        Obj::Bool(value)
    }
}

impl From<i64> for Obj {
    fn from(value: i64) -> Self {
        Obj::Int(value)
    }
}

impl From<f64> for Obj {
    fn from(value: f64) -> Self {
        Obj::Real(value)
    }
}

impl From<&str> for Obj {
    fn from(value: &str) -> Self {
        Obj::string(value)
    }
}

impl From<String> for Obj {
    fn from(value: String) -> Self {
        Obj::string(value)
    }
}

/// Plain rendering without calling script `toString` methods.
impl fmt::Display for Obj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Obj::Void => f.write_str("void"),
            Obj::Null => f.write_str("null"),
            Obj::Bool(b) => write!(f, "{b}"),
            Obj::Int(n) => write!(f, "{n}"),
            Obj::Real(r) => write!(f, "{r:?}"),
            Obj::Str(s) => f.write_str(s),
            Obj::List(list) => {
                f.write_str("[")?;
                for (i, item) in list.snapshot().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Obj::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.entries().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}={value}")?;
                }
                f.write_str("}")
            }
            Obj::Range(r) => {
                let op = if r.inclusive { ".." } else { "..<" };
                write!(f, "{}{op}{}", r.start, r.end)
            }
            Obj::Error(error) => write!(f, "{error}"),
            Obj::Class(class) => write!(f, "class {}", class.name()),
            Obj::Instance(instance) => write!(f, "{instance}"),
            Obj::Callable(callable) => write!(f, "fn {}", callable.name()),
            Obj::Deferred(_) => f.write_str("Deferred"),
        }
    }
}

impl fmt::Debug for Obj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Obj::Str(s) => write!(f, "{s:?}"),
            _ => write!(f, "{}({self})", self.type_name()),
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
