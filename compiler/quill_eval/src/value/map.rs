use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::errors::{frozen_mutation, RuntimeError};

use super::Obj;

/// Hashable identity of a map key.
///
/// Scalars and strings hash by value; containers, instances and callables
/// hash by identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MapKey {
    Void,
    Null,
    Bool(bool),
    Int(i64),
    Real(u64),
    Str(Arc<str>),
    Range(i64, i64, bool),
    Identity(usize),
}

impl MapKey {
    pub fn of(value: &Obj) -> MapKey {
        match value {
            Obj::Void => MapKey::Void,
            Obj::Null => MapKey::Null,
            Obj::Bool(b) => MapKey::Bool(*b),
            Obj::Int(n) => MapKey::Int(*n),
            Obj::Real(r) => MapKey::Real(r.to_bits()),
            Obj::Str(s) => MapKey::Str(Arc::clone(s)),
            Obj::Range(r) => MapKey::Range(r.start, r.end, r.inclusive),
            Obj::List(list) => MapKey::Identity(Arc::as_ptr(list) as usize),
            Obj::Map(map) => MapKey::Identity(Arc::as_ptr(map) as usize),
            Obj::Error(error) => MapKey::Identity(Arc::as_ptr(error) as usize),
            Obj::Class(class) => MapKey::Identity(Arc::as_ptr(class) as usize),
            Obj::Instance(instance) => MapKey::Identity(Arc::as_ptr(instance) as usize),
            Obj::Callable(callable) => MapKey::Identity(callable.identity()),
            Obj::Deferred(deferred) => MapKey::Identity(Arc::as_ptr(deferred) as usize),
        }
    }
}

#[derive(Default)]
struct Entries {
    keys: Vec<Obj>,
    values: Vec<Obj>,
    index: FxHashMap<MapKey, usize>,
}

/// A shared, insertion-ordered map.
pub struct ObjMap {
    entries: RwLock<Entries>,
    frozen: AtomicBool,
}

impl ObjMap {
    pub fn new() -> Self {
        ObjMap {
            entries: RwLock::new(Entries::default()),
            frozen: AtomicBool::new(false),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &Obj) -> Option<Obj> {
        let entries = self.entries.read();
        entries
            .index
            .get(&MapKey::of(key))
            .map(|&i| entries.values[i].clone())
    }

    pub fn contains_key(&self, key: &Obj) -> bool {
        self.entries.read().index.contains_key(&MapKey::of(key))
    }

    pub fn insert(&self, key: Obj, value: Obj) -> Result<(), RuntimeError> {
        self.check_mutable()?;
        let mut entries = self.entries.write();
        let hashed = MapKey::of(&key);
        if let Some(&i) = entries.index.get(&hashed) {
            entries.values[i] = value;
        } else {
            let i = entries.keys.len();
            entries.keys.push(key);
            entries.values.push(value);
            entries.index.insert(hashed, i);
        }
        Ok(())
    }

    /// Remove `key`, keeping insertion order of the rest.
    pub fn remove(&self, key: &Obj) -> Result<Option<Obj>, RuntimeError> {
        self.check_mutable()?;
        let mut entries = self.entries.write();
        let Some(i) = entries.index.remove(&MapKey::of(key)) else {
            return Ok(None);
        };
        entries.keys.remove(i);
        let value = entries.values.remove(i);
        for slot in entries.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Ok(Some(value))
    }

    pub fn keys(&self) -> Vec<Obj> {
        self.entries.read().keys.clone()
    }

    pub fn values(&self) -> Vec<Obj> {
        self.entries.read().values.clone()
    }

    /// Copy of all pairs in insertion order.
    pub fn entries(&self) -> Vec<(Obj, Obj)> {
        let entries = self.entries.read();
        entries
            .keys
            .iter()
            .cloned()
            .zip(entries.values.iter().cloned())
            .collect()
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

    pub(crate) fn structurally_equals(&self, other: &ObjMap) -> bool {
        let mine = self.entries();
        mine.len() == other.len()
            && mine
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|theirs| theirs.equals(v)))
    }
}

impl Default for ObjMap {
    fn default() -> Self {
        Self::new()
    }
}
