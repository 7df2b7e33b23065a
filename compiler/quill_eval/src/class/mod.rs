//! Classes, members and instances.
//!
//! A class owns a member table behind one mutex and a `layout_version`
//! counter. Member resolution is depth-first over `[own members] ++ bases`,
//! first match wins, so diamond-shaped base graphs need no merging.
//!
//! Instances store their fields in a fixed slot layout computed once when
//! the class is built: every base's fields (depth-first, first occurrence
//! wins) followed by the class's own constructor parameters and body fields.
//! Since the layout never changes, field slots are stable cache targets.
//!
//! Adding a member after creation bumps `layout_version` on the class and on
//! every class derived from it. Inline caches compare the version they
//! recorded against the live one, so one increment invalidates every cached
//! site for that class at once.

mod instance;

pub use instance::Instance;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use quill_ir::Name;
use rustc_hash::FxHashMap;

use crate::errors::{already_defined, member_already_defined, read_only_member, RuntimeError};
use crate::exec::{ClassDef, ExecResult};
use crate::scope::Scope;
use crate::value::{Callable, NativeCall, Obj};

static NEXT_CLASS_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique class identity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClassId(u64);

impl ClassId {
    fn fresh() -> Self {
        ClassId(NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// How reading a member produces a value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MemberKind {
    /// The stored value itself (callables bind to the receiver).
    Value,
    /// A native getter invoked with the receiver on every read.
    Property,
}

/// A shared member cell.
///
/// Caches hold `Arc<Member>` directly, so writes to a mutable member are
/// seen by every site without touching `layout_version`.
pub struct Member {
    name: Name,
    value: RwLock<Obj>,
    mutable: bool,
    kind: MemberKind,
}

impl Member {
    pub fn new(name: Name, value: Obj, mutable: bool, kind: MemberKind) -> Self {
        Member {
            name,
            value: RwLock::new(value),
            mutable,
            kind,
        }
    }

    #[inline]
    pub fn name(&self) -> Name {
        self.name
    }

    #[inline]
    pub fn value(&self) -> Obj {
        self.value.read().clone()
    }

    #[inline]
    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    #[inline]
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    /// Whether reading this member runs its getter.
    #[inline]
    pub fn is_property(&self) -> bool {
        self.kind == MemberKind::Property
    }

    pub fn set(&self, value: Obj) -> Result<(), RuntimeError> {
        if !self.mutable {
            return Err(read_only_member(self.name));
        }
        *self.value.write() = value;
        Ok(())
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("mutable", &self.mutable)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Where a name resolves on an instance of a class.
#[derive(Clone, Debug)]
pub enum Resolved {
    /// Instance field slot.
    Slot { index: usize, mutable: bool },
    /// Class member cell (own or inherited).
    Member(Arc<Member>),
}

/// One instance field in the class layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FieldSlot {
    pub name: Name,
    pub mutable: bool,
}

/// Fixed field layout of a class's instances.
#[derive(Default, Debug)]
pub struct InstanceLayout {
    fields: Vec<FieldSlot>,
    index: FxHashMap<Name, usize>,
}

impl InstanceLayout {
    fn push(&mut self, field: FieldSlot) -> bool {
        if self.index.contains_key(&field.name) {
            return false;
        }
        self.index.insert(field.name, self.fields.len());
        self.fields.push(field);
        true
    }

    #[inline]
    pub fn slot(&self, name: Name) -> Option<usize> {
        self.index.get(&name).copied()
    }

    pub fn fields(&self) -> &[FieldSlot] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Builtin constructor: receives the class actually being instantiated.
pub type NativeCtor = fn(&NativeCall<'_>, &Arc<ObjClass>) -> ExecResult;

/// Constructor data for classes declared in script.
pub struct ScriptClass {
    pub def: Arc<ClassDef>,
    /// Scope the `class` statement executed in; methods and initializers
    /// close over it.
    pub scope: Scope,
}

/// A class descriptor.
pub struct ObjClass {
    id: ClassId,
    name: Name,
    bases: Vec<Arc<ObjClass>>,
    members: Mutex<FxHashMap<Name, Arc<Member>>>,
    layout_version: AtomicU64,
    derived: Mutex<Vec<Weak<ObjClass>>>,
    layout: InstanceLayout,
    script: Option<ScriptClass>,
    native_ctor: Option<NativeCtor>,
    builtin: bool,
}

impl ObjClass {
    #[inline]
    pub fn id(&self) -> ClassId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> Name {
        self.name
    }

    pub fn bases(&self) -> &[Arc<ObjClass>] {
        &self.bases
    }

    /// Current layout version (sequentially consistent read).
    #[inline]
    pub fn layout_version(&self) -> u64 {
        self.layout_version.load(Ordering::SeqCst)
    }

    pub fn layout(&self) -> &InstanceLayout {
        &self.layout
    }

    pub fn script(&self) -> Option<&ScriptClass> {
        self.script.as_ref()
    }

    pub fn native_ctor(&self) -> Option<NativeCtor> {
        self.native_ctor
    }

    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    /// Own member, ignoring bases.
    pub fn own_member(&self, name: Name) -> Option<Arc<Member>> {
        self.members.lock().get(&name).cloned()
    }

    /// Depth-first, first-match member resolution.
    pub fn resolve_member(&self, name: Name) -> Option<Arc<Member>> {
        if let Some(member) = self.own_member(name) {
            return Some(member);
        }
        self.bases.iter().find_map(|base| base.resolve_member(name))
    }

    /// Full resolution for an instance receiver: fields, then members.
    pub fn resolve(&self, name: Name) -> Option<Resolved> {
        if let Some(index) = self.layout.slot(name) {
            return Some(Resolved::Slot {
                index,
                mutable: self.layout.fields[index].mutable,
            });
        }
        self.resolve_member(name).map(Resolved::Member)
    }

    /// Whether `self` is `other` or derives from it.
    pub fn is_subclass_of(&self, other: &ObjClass) -> bool {
        self.id == other.id || self.bases.iter().any(|base| base.is_subclass_of(other))
    }

    /// Add a member to a live class.
    ///
    /// Names already defined here, inherited, or used by an instance field
    /// are rejected. On success the layout version of this class and of all
    /// derived classes is bumped.
    pub fn add_member(
        &self,
        name: Name,
        value: Obj,
        mutable: bool,
    ) -> Result<Arc<Member>, RuntimeError> {
        let member = {
            let mut members = self.members.lock();
            let taken = members.contains_key(&name)
                || self.layout.slot(name).is_some()
                || self.bases.iter().any(|base| base.resolve_member(name).is_some());
            if taken {
                return Err(member_already_defined(name, self.name));
            }
            let member = Arc::new(Member::new(name, value, mutable, MemberKind::Value));
            members.insert(name, Arc::clone(&member));
            self.layout_version.fetch_add(1, Ordering::SeqCst);
            member
        };
        tracing::debug!(
            class = %self.name,
            member = %name,
            version = self.layout_version(),
            "member added"
        );
        self.invalidate_derived();
        Ok(member)
    }

    fn invalidate_derived(&self) {
        let derived: Vec<Arc<ObjClass>> = {
            let mut links = self.derived.lock();
            links.retain(|weak| weak.strong_count() > 0);
            links.iter().filter_map(Weak::upgrade).collect()
        };
        for class in derived {
            class.layout_version.fetch_add(1, Ordering::SeqCst);
            class.invalidate_derived();
        }
    }

    /// Snapshot of own member names, sorted, for diagnostics and tests.
    pub fn member_names(&self) -> Vec<Name> {
        let mut names: Vec<Name> = self.members.lock().keys().copied().collect();
        names.sort_by_key(|name| name.as_str());
        names
    }
}

impl fmt::Debug for ObjClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjClass")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("version", &self.layout_version())
            .finish_non_exhaustive()
    }
}

/// Builds a class before it is shared.
///
/// Members and fields given here are part of the class at version 0; only
/// [`ObjClass::add_member`] changes a class afterwards.
pub struct ClassBuilder {
    name: Name,
    bases: Vec<Arc<ObjClass>>,
    members: Vec<Member>,
    fields: Vec<FieldSlot>,
    script: Option<ScriptClass>,
    native_ctor: Option<NativeCtor>,
    builtin: bool,
}

impl ClassBuilder {
    pub fn new(name: Name) -> Self {
        ClassBuilder {
            name,
            bases: Vec::new(),
            members: Vec::new(),
            fields: Vec::new(),
            script: None,
            native_ctor: None,
            builtin: false,
        }
    }

    #[must_use]
    pub fn base(mut self, base: Arc<ObjClass>) -> Self {
        self.bases.push(base);
        self
    }

    #[must_use]
    pub fn field(mut self, name: Name, mutable: bool) -> Self {
        self.fields.push(FieldSlot { name, mutable });
        self
    }

    #[must_use]
    pub fn member(mut self, name: Name, value: Obj, mutable: bool) -> Self {
        self.members
            .push(Member::new(name, value, mutable, MemberKind::Value));
        self
    }

    #[must_use]
    pub fn method(self, method: Callable) -> Self {
        let name = method.name();
        self.member(name, Obj::Callable(method), false)
    }

    #[must_use]
    pub fn property(mut self, getter: Callable) -> Self {
        let name = getter.name();
        self.members.push(Member::new(
            name,
            Obj::Callable(getter),
            false,
            MemberKind::Property,
        ));
        self
    }

    #[must_use]
    pub fn script(mut self, script: ScriptClass) -> Self {
        self.script = Some(script);
        self
    }

    #[must_use]
    pub fn native_ctor(mut self, ctor: NativeCtor) -> Self {
        self.native_ctor = Some(ctor);
        self
    }

    #[must_use]
    pub fn builtin(mut self) -> Self {
        self.builtin = true;
        self
    }

    pub fn build(self) -> Result<Arc<ObjClass>, RuntimeError> {
        let mut layout = InstanceLayout::default();
        for base in &self.bases {
            for field in base.layout.fields() {
                layout.push(*field);
            }
        }
        let mut own_fields: Vec<Name> = Vec::with_capacity(self.fields.len());
        for field in self.fields {
            if own_fields.contains(&field.name) {
                return Err(already_defined(field.name));
            }
            own_fields.push(field.name);
            layout.push(field);
        }

        let mut members = FxHashMap::default();
        for member in self.members {
            let name = member.name;
            if members.contains_key(&name) || own_fields.contains(&name) {
                return Err(already_defined(name));
            }
            members.insert(name, Arc::new(member));
        }

        let class = Arc::new(ObjClass {
            id: ClassId::fresh(),
            name: self.name,
            bases: self.bases,
            members: Mutex::new(members),
            layout_version: AtomicU64::new(0),
            derived: Mutex::new(Vec::new()),
            layout,
            script: self.script,
            native_ctor: self.native_ctor,
            builtin: self.builtin,
        });
        for base in &class.bases {
            base.derived.lock().push(Arc::downgrade(&class));
        }
        tracing::debug!(
            class = %class.name,
            bases = class.bases.len(),
            fields = class.layout.len(),
            "class created"
        );
        Ok(class)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests;
