use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use crate::errors::{frozen_mutation, index_out_of_bounds, RuntimeError};

use super::Obj;

/// A shared, growable list.
pub struct ObjList {
    items: RwLock<Vec<Obj>>,
    frozen: AtomicBool,
}

impl ObjList {
    pub fn new(items: Vec<Obj>) -> Self {
        ObjList {
            items: RwLock::new(items),
            frozen: AtomicBool::new(false),
        }
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Copy of the current items (iteration must not hold the lock).
    pub fn snapshot(&self) -> Vec<Obj> {
        self.items.read().clone()
    }

    pub fn get(&self, index: i64) -> Result<Obj, RuntimeError> {
        let items = self.items.read();
        usize::try_from(index)
            .ok()
            .and_then(|i| items.get(i).cloned())
            .ok_or_else(|| index_out_of_bounds(index, items.len()))
    }

    pub fn set(&self, index: i64, value: Obj) -> Result<(), RuntimeError> {
        self.check_mutable()?;
        let mut items = self.items.write();
        let len = items.len();
        let slot = usize::try_from(index)
            .ok()
            .and_then(|i| items.get_mut(i))
            .ok_or_else(|| index_out_of_bounds(index, len))?;
        *slot = value;
        Ok(())
    }

    pub fn push(&self, value: Obj) -> Result<(), RuntimeError> {
        self.check_mutable()?;
        self.items.write().push(value);
        Ok(())
    }

    pub fn extend(&self, values: Vec<Obj>) -> Result<(), RuntimeError> {
        self.check_mutable()?;
        self.items.write().extend(values);
        Ok(())
    }

    pub fn pop(&self) -> Result<Option<Obj>, RuntimeError> {
        self.check_mutable()?;
        Ok(self.items.write().pop())
    }

    pub fn position(&self, needle: &Obj) -> Option<usize> {
        self.items.read().iter().position(|item| item.equals(needle))
    }

    pub fn first(&self) -> Option<Obj> {
        self.items.read().first().cloned()
    }

    pub fn last(&self) -> Option<Obj> {
        self.items.read().last().cloned()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::Release);
    }

    fn check_mutable(&self) -> Result<(), RuntimeError> {
        if self.is_frozen() {
            Err(frozen_mutation())
        } else {
            Ok(())
        }
    }

    pub(crate) fn structurally_equals(&self, other: &ObjList) -> bool {
        let (a, b) = (self.snapshot(), other.snapshot());
        a.len() == b.len() && a.iter().zip(&b).all(|(x, y)| x.equals(y))
    }
}
