//! Lexical scopes.
//!
//! A [`Scope`] is a shared handle to one frame of bindings plus a link to
//! its parent. Blocks, call frames and the engine root are all scopes; a
//! call frame may also carry `this`, whose fields and members are consulted
//! after the frame's own bindings and before its parent.
//!
//! Closures hold their defining scope. Capturing marks the scope and every
//! ancestor as escaped, which keeps the frame out of the scope pool even if
//! the closure is dropped before the frame returns.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use quill_ir::Name;
use rustc_hash::FxHashMap;

use crate::class::{Instance, Member, ObjClass, Resolved};
use crate::errors::{already_defined, RuntimeError};
use crate::value::Obj;

/// The receiver of a method frame.
#[derive(Clone, Debug)]
pub struct ThisRef {
    pub value: Obj,
    /// Class members are resolved against: the instance's class, or the
    /// builtin class of a primitive receiver.
    pub class: Arc<ObjClass>,
}

impl ThisRef {
    fn instance(&self) -> Option<&Arc<Instance>> {
        match &self.value {
            Obj::Instance(instance) => Some(instance),
            _ => None,
        }
    }
}

/// Error returned by [`Scope::assign`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignError {
    /// Binding or member exists but is read-only.
    Immutable,
    /// Name not found in any scope.
    Undefined,
    /// Target is a field of a frozen instance.
    Frozen,
}

/// Where a name was found.
#[derive(Clone, Debug)]
pub enum Lookup {
    /// A binding in some scope.
    Local(Obj),
    /// A field of the enclosing `this`.
    Field {
        instance: Arc<Instance>,
        index: usize,
        mutable: bool,
    },
    /// A class member of the enclosing `this`.
    Member { this: Obj, member: Arc<Member> },
}

struct Binding {
    value: Obj,
    mutable: bool,
}

#[derive(Default)]
struct Bindings {
    slots: Vec<Binding>,
    index: FxHashMap<Name, usize>,
}

impl Bindings {
    fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
    }
}

pub(crate) struct ScopeData {
    parent: Option<Scope>,
    this: Option<ThisRef>,
    arguments: Vec<Obj>,
    bindings: RwLock<Bindings>,
    escaped: AtomicBool,
    shape: usize,
}

/// A shared scope handle.
#[derive(Clone)]
pub struct Scope(Arc<ScopeData>);

impl Scope {
    /// A scope with no parent.
    pub fn root() -> Self {
        Self::frame(None, None, Vec::new(), 0)
    }

    /// A nested block scope.
    pub fn child(&self) -> Self {
        Self::frame(Some(self.clone()), None, Vec::new(), 0)
    }

    pub(crate) fn frame(
        parent: Option<Scope>,
        this: Option<ThisRef>,
        arguments: Vec<Obj>,
        shape: usize,
    ) -> Self {
        Scope(Arc::new(ScopeData {
            parent,
            this,
            arguments,
            bindings: RwLock::new(Bindings {
                slots: Vec::with_capacity(shape),
                index: FxHashMap::default(),
            }),
            escaped: AtomicBool::new(false),
            shape,
        }))
    }

    pub fn parent(&self) -> Option<&Scope> {
        self.0.parent.as_ref()
    }

    /// `this` of the nearest method frame.
    pub fn this(&self) -> Option<&ThisRef> {
        let mut scope = self;
        loop {
            if let Some(this) = &scope.0.this {
                return Some(this);
            }
            scope = scope.parent()?;
        }
    }

    /// Raw arguments of this call frame.
    pub fn arguments(&self) -> &[Obj] {
        &self.0.arguments
    }

    /// Pool bucket this frame was sized for.
    pub fn shape(&self) -> usize {
        self.0.shape
    }

    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Number of bindings declared directly in this scope.
    pub fn len(&self) -> usize {
        self.0.bindings.read().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `name` is bound directly in this scope.
    pub fn contains_local(&self, name: Name) -> bool {
        self.0.bindings.read().index.contains_key(&name)
    }

    /// Define `name` in this scope. Redefinition in the same scope fails;
    /// shadowing an outer binding does not.
    pub fn add_item(&self, name: Name, mutable: bool, value: Obj) -> Result<(), RuntimeError> {
        let mut bindings = self.0.bindings.write();
        if bindings.index.contains_key(&name) {
            return Err(already_defined(name));
        }
        let slot = bindings.slots.len();
        bindings.slots.push(Binding { value, mutable });
        bindings.index.insert(name, slot);
        Ok(())
    }

    fn get_local(&self, name: Name) -> Option<Obj> {
        let bindings = self.0.bindings.read();
        bindings
            .index
            .get(&name)
            .map(|&slot| bindings.slots[slot].value.clone())
    }

    /// Resolve `name`: own bindings, then `this`, then the parent.
    pub fn lookup(&self, name: Name) -> Option<Lookup> {
        let mut scope = self;
        loop {
            if let Some(value) = scope.get_local(name) {
                return Some(Lookup::Local(value));
            }
            if let Some(this) = &scope.0.this {
                if let Some(found) = lookup_this(this, name) {
                    return Some(found);
                }
            }
            scope = scope.parent()?;
        }
    }

    /// Plain value of `name`. Member functions come back bound to `this`;
    /// properties come back as their getter, unevaluated.
    pub fn get(&self, name: Name) -> Option<Obj> {
        self.lookup(name).map(|found| match found {
            Lookup::Local(value) => value,
            Lookup::Field {
                instance, index, ..
            } => instance.field(index),
            Lookup::Member { this, member } => match member.value() {
                Obj::Callable(callable) => Obj::Callable(callable.bind(this)),
                value => value,
            },
        })
    }

    /// Assign to the nearest binding of `name`.
    pub fn assign(&self, name: Name, value: Obj) -> Result<(), AssignError> {
        let mut scope = self;
        loop {
            {
                let mut bindings = scope.0.bindings.write();
                if let Some(&slot) = bindings.index.get(&name) {
                    let binding = &mut bindings.slots[slot];
                    if !binding.mutable {
                        return Err(AssignError::Immutable);
                    }
                    binding.value = value;
                    return Ok(());
                }
            }
            if let Some(this) = &scope.0.this {
                match this.class.resolve(name) {
                    Some(Resolved::Slot { index, mutable }) => {
                        if let Some(instance) = this.instance() {
                            if instance.is_frozen() {
                                return Err(AssignError::Frozen);
                            }
                            return instance
                                .set_field(index, value, mutable)
                                .map_err(|_| AssignError::Immutable);
                        }
                    }
                    Some(Resolved::Member(member)) => {
                        return member.set(value).map_err(|_| AssignError::Immutable);
                    }
                    None => {}
                }
            }
            scope = scope.parent().ok_or(AssignError::Undefined)?;
        }
    }

    /// Drop the scope's own bindings; parent and `this` stay.
    pub(crate) fn clear_bindings(&self) {
        self.0.bindings.write().clear();
    }

    /// Mark this scope and its ancestors as captured.
    pub fn mark_escaped(&self) {
        let mut scope = self;
        loop {
            if scope.0.escaped.swap(true, Ordering::AcqRel) {
                return;
            }
            match scope.parent() {
                Some(parent) => scope = parent,
                None => return,
            }
        }
    }

    pub fn is_escaped(&self) -> bool {
        self.0.escaped.load(Ordering::Acquire)
    }

    /// Exclusive access when this is the only handle to the frame.
    pub(crate) fn data_mut(&mut self) -> Option<&mut ScopeData> {
        Arc::get_mut(&mut self.0)
    }
}

fn lookup_this(this: &ThisRef, name: Name) -> Option<Lookup> {
    match this.class.resolve(name)? {
        Resolved::Slot { index, mutable } => this.instance().map(|instance| Lookup::Field {
            instance: Arc::clone(instance),
            index,
            mutable,
        }),
        Resolved::Member(member) => Some(Lookup::Member {
            this: this.value.clone(),
            member,
        }),
    }
}

impl ScopeData {
    /// Drop everything the frame refers to.
    pub(crate) fn clear(&mut self) {
        self.parent = None;
        self.this = None;
        self.arguments.clear();
        self.bindings.get_mut().clear();
        *self.escaped.get_mut() = false;
    }

    /// Reattach a cleared frame for a new call.
    pub(crate) fn reinit(&mut self, parent: Scope, this: Option<ThisRef>, arguments: Vec<Obj>) {
        self.parent = Some(parent);
        self.this = this;
        self.arguments = arguments;
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bindings = self.0.bindings.read();
        let mut names: Vec<&str> = bindings.index.keys().map(|n| n.as_str()).collect();
        names.sort_unstable();
        f.debug_struct("Scope")
            .field("bindings", &names)
            .field("has_this", &self.0.this.is_some())
            .field("escaped", &self.is_escaped())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests;
