use std::fmt;
use std::sync::Arc;

use crate::class::ObjClass;

/// A runtime error value.
///
/// Its class is one of the engine's exception classes; `catch (e: Type)`
/// matches on that class's base chain.
pub struct ObjError {
    pub class: Arc<ObjClass>,
    pub message: String,
}

impl ObjError {
    pub fn new(class: Arc<ObjClass>, message: impl Into<String>) -> Self {
        ObjError {
            class,
            message: message.into(),
        }
    }
}

impl fmt::Display for ObjError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.class.name())
        } else {
            write!(f, "{}: {}", self.class.name(), self.message)
        }
    }
}

impl fmt::Debug for ObjError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjError({self})")
    }
}
