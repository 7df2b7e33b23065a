use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::errors::{frozen_mutation, read_only_member, RuntimeError};
use crate::value::Obj;

use super::ObjClass;

/// An object created from a script class.
pub struct Instance {
    class: Arc<ObjClass>,
    fields: RwLock<Vec<Obj>>,
    frozen: AtomicBool,
}

impl Instance {
    /// Fresh instance with every field `void`.
    pub fn new(class: Arc<ObjClass>) -> Self {
        let fields = vec![Obj::Void; class.layout().len()];
        Instance {
            class,
            fields: RwLock::new(fields),
            frozen: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn class(&self) -> &Arc<ObjClass> {
        &self.class
    }

    pub fn field(&self, index: usize) -> Obj {
        self.fields.read().get(index).cloned().unwrap_or(Obj::Void)
    }

    /// Write during construction: ignores mutability, not the frozen flag
    /// (an instance cannot be frozen before its constructor returns).
    pub(crate) fn init_field(&self, index: usize, value: Obj) {
        if let Some(slot) = self.fields.write().get_mut(index) {
            *slot = value;
        }
    }

    /// Script write: the frozen flag is checked before mutability.
    pub fn set_field(&self, index: usize, value: Obj, mutable: bool) -> Result<(), RuntimeError> {
        if self.is_frozen() {
            return Err(frozen_mutation());
        }
        if !mutable {
            let name = self.class.layout().fields()[index].name;
            return Err(read_only_member(name));
        }
        if let Some(slot) = self.fields.write().get_mut(index) {
            *slot = value;
        }
        Ok(())
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::Release);
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class.name())
            .field("frozen", &self.is_frozen())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.class.name())?;
        let fields = self.fields.read();
        for (i, (slot, value)) in self.class.layout().fields().iter().zip(fields.iter()).enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={value}", slot.name)?;
        }
        f.write_str(")")
    }
}
