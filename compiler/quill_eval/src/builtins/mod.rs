//! Builtin classes.
//!
//! Every value kind has an ordinary [`ObjClass`] with native members, so
//! `"abc".size` and `point.x` go through the same resolution and inline
//! cache path. Each engine builds its own set; scripts may extend them
//! (`fun String.shout() { ... }`) without affecting other engines.

mod members;
mod stdlib;

pub use stdlib::register_stdlib;

use std::sync::Arc;

use quill_ir::Name;

use crate::class::ObjClass;
use crate::errors::{ErrorKind, RuntimeError};
use crate::value::{Obj, ObjError};

/// The builtin classes of one engine.
pub struct Builtins {
    pub void: Arc<ObjClass>,
    pub null: Arc<ObjClass>,
    pub bool: Arc<ObjClass>,
    pub int: Arc<ObjClass>,
    pub real: Arc<ObjClass>,
    pub string: Arc<ObjClass>,
    pub list: Arc<ObjClass>,
    pub map: Arc<ObjClass>,
    pub range: Arc<ObjClass>,
    pub class: Arc<ObjClass>,
    pub callable: Arc<ObjClass>,
    pub deferred: Arc<ObjClass>,
    /// Exception classes, indexed by [`ErrorKind::index`].
    errors: Vec<Arc<ObjClass>>,
}

impl Builtins {
    pub fn new() -> Result<Self, RuntimeError> {
        let exception = members::exception_class(Name::intern("Exception"), None)?;
        let mut errors = Vec::with_capacity(ErrorKind::ALL.len());
        for kind in ErrorKind::ALL {
            let class = if kind == ErrorKind::Exception {
                Arc::clone(&exception)
            } else {
                members::exception_class(Name::intern(kind.class_name()), Some(&exception))?
            };
            errors.push(class);
        }
        Ok(Builtins {
            void: members::plain_class("Void")?,
            null: members::plain_class("Null")?,
            bool: members::plain_class("Bool")?,
            int: members::number_class("Int")?,
            real: members::number_class("Real")?,
            string: members::string_class()?,
            list: members::list_class()?,
            map: members::map_class()?,
            range: members::range_class()?,
            class: members::plain_class("Class")?,
            callable: members::plain_class("Callable")?,
            deferred: members::deferred_class()?,
            errors,
        })
    }

    /// The class dynamic dispatch uses for `value`.
    pub fn class_of<'a>(&'a self, value: &'a Obj) -> &'a Arc<ObjClass> {
        match value {
            Obj::Void => &self.void,
            Obj::Null => &self.null,
            Obj::Bool(_) => &self.bool,
            Obj::Int(_) => &self.int,
            Obj::Real(_) => &self.real,
            Obj::Str(_) => &self.string,
            Obj::List(_) => &self.list,
            Obj::Map(_) => &self.map,
            Obj::Range(_) => &self.range,
            Obj::Error(error) => &error.class,
            Obj::Class(_) => &self.class,
            Obj::Instance(instance) => instance.class(),
            Obj::Callable(_) => &self.callable,
            Obj::Deferred(_) => &self.deferred,
        }
    }

    pub fn error_class(&self, kind: ErrorKind) -> &Arc<ObjClass> {
        &self.errors[kind.index()]
    }

    /// A fresh error object of `kind`'s class.
    pub fn error(&self, kind: ErrorKind, message: impl Into<String>) -> Obj {
        Obj::Error(Arc::new(ObjError::new(
            Arc::clone(self.error_class(kind)),
            message,
        )))
    }

    /// Classes scripts can name, with the names they are bound under.
    pub fn named_classes(&self) -> Vec<&Arc<ObjClass>> {
        let mut classes = vec![
            &self.void,
            &self.null,
            &self.bool,
            &self.int,
            &self.real,
            &self.string,
            &self.list,
            &self.map,
            &self.range,
            &self.class,
            &self.callable,
            &self.deferred,
        ];
        classes.extend(self.errors.iter());
        classes
    }

    /// Whether `class` is one of the builtin exception classes or derives
    /// from `Exception`.
    pub fn is_exception_class(&self, class: &ObjClass) -> bool {
        class.is_subclass_of(self.error_class(ErrorKind::Exception))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests;
