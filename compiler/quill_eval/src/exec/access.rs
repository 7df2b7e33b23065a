//! Readable and assignable places: variables, fields and index slots.
//!
//! An [`Accessor`] evaluates its receiver once into a [`Place`], which can
//! then be read, written, or both (compound assignment, `++`). Field and
//! index sites own their inline caches.

use std::sync::Arc;

use futures::future::BoxFuture;
use quill_ir::{Name, Pos};

use crate::cache::{CacheKind, IndexOp, InlineCache, ShapeKey};
use crate::class::{ObjClass, Resolved};
use crate::context::Context;
use crate::errors::{
    cannot_index, frozen_mutation, index_out_of_bounds, no_such_member, not_implemented,
    null_receiver, read_only, symbol_not_defined, RuntimeError,
};
use crate::scope::{AssignError, Lookup, Scope};
use crate::value::Obj;

use super::call::{call_member, read_member};
use super::{ExecResult, Node, NodeBox, RaiseAt, Unwind};

#[derive(Debug)]
pub enum AccessKind {
    Var(Name),
    Field {
        receiver: NodeBox,
        name: Name,
        get_cache: InlineCache<Resolved>,
        set_cache: InlineCache<Resolved>,
    },
    Index {
        receiver: NodeBox,
        index: NodeBox,
        cache: InlineCache<IndexOp>,
    },
}

/// A location with its receiver already evaluated.
#[derive(Clone, Debug)]
pub enum Place {
    Var(Name),
    Field { receiver: Obj, name: Name },
    Index { receiver: Obj, index: Obj },
}

#[derive(Debug)]
pub struct Accessor {
    pub pos: Pos,
    pub kind: AccessKind,
}

impl Accessor {
    pub fn var(pos: Pos, name: Name) -> Self {
        Accessor {
            pos,
            kind: AccessKind::Var(name),
        }
    }

    pub fn field(pos: Pos, receiver: NodeBox, name: Name) -> Self {
        Accessor {
            pos,
            kind: AccessKind::Field {
                receiver,
                name,
                get_cache: InlineCache::new(),
                set_cache: InlineCache::new(),
            },
        }
    }

    pub fn index(pos: Pos, receiver: NodeBox, index: NodeBox) -> Self {
        Accessor {
            pos,
            kind: AccessKind::Index {
                receiver,
                index,
                cache: InlineCache::new(),
            },
        }
    }

    /// Evaluate the receiver (and index) of this access.
    pub(crate) async fn locate(&self, cx: &Context, scope: &Scope) -> Result<Place, Unwind> {
        Ok(match &self.kind {
            AccessKind::Var(name) => Place::Var(*name),
            AccessKind::Field { receiver, name, .. } => Place::Field {
                receiver: receiver.execute(cx, scope).await?,
                name: *name,
            },
            AccessKind::Index {
                receiver, index, ..
            } => Place::Index {
                receiver: receiver.execute(cx, scope).await?,
                index: index.execute(cx, scope).await?,
            },
        })
    }

    pub(crate) async fn read(&self, cx: &Context, scope: &Scope, place: &Place) -> ExecResult {
        match place {
            Place::Var(name) => self.read_var(cx, scope, *name).await,
            Place::Field { receiver, name } => self.read_field(cx, receiver, *name).await,
            Place::Index { receiver, index } => self.read_index(cx, receiver, index).await,
        }
    }

    pub(crate) async fn write(
        &self,
        cx: &Context,
        scope: &Scope,
        place: Place,
        value: Obj,
    ) -> Result<(), Unwind> {
        match place {
            Place::Var(name) => scope.assign(name, value).map_err(|error| {
                let error = match error {
                    AssignError::Immutable => read_only(name),
                    AssignError::Undefined => symbol_not_defined(name),
                    AssignError::Frozen => frozen_mutation(),
                };
                cx.raise(error, &self.pos)
            }),
            Place::Field { receiver, name } => self.write_field(cx, &receiver, name, value),
            Place::Index { receiver, index } => {
                self.write_index(cx, receiver, index, value).await
            }
        }
    }

    async fn read_var(&self, cx: &Context, scope: &Scope, name: Name) -> ExecResult {
        match scope.lookup(name) {
            Some(Lookup::Local(value)) => Ok(value),
            Some(Lookup::Field {
                instance, index, ..
            }) => Ok(instance.field(index)),
            Some(Lookup::Member { this, member }) => {
                read_member(cx, &member, this, &self.pos).await
            }
            None => Err(cx.raise(symbol_not_defined(name), &self.pos)),
        }
    }

    fn resolve_field(
        &self,
        cx: &Context,
        kind: CacheKind,
        class: &ObjClass,
        name: Name,
    ) -> Result<Resolved, Unwind> {
        let cache = match &self.kind {
            AccessKind::Field {
                get_cache,
                set_cache,
                ..
            } => match kind {
                CacheKind::FieldSet => set_cache,
                _ => get_cache,
            },
            _ => {
                return class
                    .resolve(name)
                    .ok_or_else(|| no_such_member(name, class.name()))
                    .at(cx, &self.pos);
            }
        };
        let version = class.layout_version();
        cache
            .get_or_resolve(cx.site(kind), ShapeKey::of(class.id()), version, || {
                class
                    .resolve(name)
                    .ok_or_else(|| no_such_member(name, class.name()))
            })
            .at(cx, &self.pos)
    }

    async fn read_field(&self, cx: &Context, receiver: &Obj, name: Name) -> ExecResult {
        if receiver.is_null() {
            return Err(cx.raise(null_receiver(name), &self.pos));
        }
        let class = Arc::clone(cx.builtins().class_of(receiver));
        match self.resolve_field(cx, CacheKind::FieldGet, &class, name)? {
            Resolved::Slot { index, .. } => match receiver {
                Obj::Instance(instance) => Ok(instance.field(index)),
                _ => Err(cx.raise(no_such_member(name, class.name()), &self.pos)),
            },
            Resolved::Member(member) => read_member(cx, &member, receiver.clone(), &self.pos).await,
        }
    }

    fn write_field(
        &self,
        cx: &Context,
        receiver: &Obj,
        name: Name,
        value: Obj,
    ) -> Result<(), Unwind> {
        if receiver.is_null() {
            return Err(cx.raise(null_receiver(name), &self.pos));
        }
        let class = Arc::clone(cx.builtins().class_of(receiver));
        match self.resolve_field(cx, CacheKind::FieldSet, &class, name)? {
            Resolved::Slot { index, mutable } => match receiver {
                Obj::Instance(instance) => instance.set_field(index, value, mutable).at(cx, &self.pos),
                _ => Err(cx.raise(no_such_member(name, class.name()), &self.pos)),
            },
            Resolved::Member(member) => {
                if receiver.is_frozen() {
                    return Err(cx.raise(frozen_mutation(), &self.pos));
                }
                member.set(value).at(cx, &self.pos)
            }
        }
    }

    fn resolve_index(&self, cx: &Context, receiver: &Obj, index: &Obj) -> Result<IndexOp, Unwind> {
        let class = cx.builtins().class_of(receiver);
        let key = ShapeKey::tagged(class.id(), index_tag(index));
        let version = class.layout_version();
        let resolve = || select_index_op(class, receiver, index);
        match &self.kind {
            AccessKind::Index { cache, .. } => cache
                .get_or_resolve(cx.site(CacheKind::Index), key, version, resolve)
                .at(cx, &self.pos),
            _ => resolve().at(cx, &self.pos),
        }
    }

    async fn read_index(&self, cx: &Context, receiver: &Obj, index: &Obj) -> ExecResult {
        let op = self.resolve_index(cx, receiver, index)?;
        match (op, receiver, index) {
            (IndexOp::ListInt, Obj::List(list), Obj::Int(i)) => list.get(*i).at(cx, &self.pos),
            (IndexOp::MapKey, Obj::Map(map), key) => Ok(map.get(key).unwrap_or(Obj::Null)),
            (IndexOp::StrInt, Obj::Str(s), Obj::Int(i)) => {
                let ch = usize::try_from(*i).ok().and_then(|i| s.chars().nth(i));
                match ch {
                    Some(ch) => Ok(Obj::string(ch.to_string())),
                    None => Err(cx.raise(index_out_of_bounds(*i, s.chars().count()), &self.pos)),
                }
            }
            (IndexOp::Method { get: Some(get), .. }, receiver, index) => {
                call_member(cx, get.value(), receiver.clone(), vec![index.clone()], &self.pos).await
            }
            (_, receiver, _) => Err(cx.raise(not_implemented("get", receiver.type_name()), &self.pos)),
        }
    }

    async fn write_index(
        &self,
        cx: &Context,
        receiver: Obj,
        index: Obj,
        value: Obj,
    ) -> Result<(), Unwind> {
        let op = self.resolve_index(cx, &receiver, &index)?;
        match (op, &receiver, &index) {
            (IndexOp::ListInt, Obj::List(list), Obj::Int(i)) => list.set(*i, value).at(cx, &self.pos),
            (IndexOp::MapKey, Obj::Map(map), _) => map.insert(index.clone(), value).at(cx, &self.pos),
            (IndexOp::Method { set: Some(set), .. }, _, _) => {
                if receiver.is_frozen() {
                    return Err(cx.raise(frozen_mutation(), &self.pos));
                }
                call_member(cx, set.value(), receiver.clone(), vec![index.clone(), value], &self.pos).await?;
                Ok(())
            }
            (_, receiver, _) => Err(cx.raise(not_implemented("set", receiver.type_name()), &self.pos)),
        }
    }
}

/// Index kinds that select different native operations.
fn index_tag(index: &Obj) -> u8 {
    match index {
        Obj::Int(_) => 1,
        Obj::Str(_) => 2,
        _ => 0,
    }
}

fn select_index_op(class: &ObjClass, receiver: &Obj, index: &Obj) -> Result<IndexOp, RuntimeError> {
    match (receiver, index) {
        (Obj::List(_), Obj::Int(_)) => Ok(IndexOp::ListInt),
        (Obj::Map(_), _) => Ok(IndexOp::MapKey),
        (Obj::Str(_), Obj::Int(_)) => Ok(IndexOp::StrInt),
        _ => {
            let get = class.resolve_member(Name::GET);
            let set = class.resolve_member(Name::SET);
            if get.is_none() && set.is_none() {
                return Err(cannot_index(receiver.type_name(), index.type_name()));
            }
            Ok(IndexOp::Method { get, set })
        }
    }
}

impl Node for Accessor {
    fn pos(&self) -> &Pos {
        &self.pos
    }

    fn execute<'a>(&'a self, cx: &'a Context, scope: &'a Scope) -> BoxFuture<'a, ExecResult> {
        Box::pin(async move {
            let place = self.locate(cx, scope).await?;
            self.read(cx, scope, &place).await
        })
    }
}
