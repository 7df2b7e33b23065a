//! Declarations: `val`/`var`, functions, classes and extension methods.

use std::sync::Arc;

use futures::future::BoxFuture;
use quill_ir::{Name, Pos};

use crate::class::{ClassBuilder, ObjClass, ScriptClass};
use crate::context::Context;
use crate::errors::{not_a_class, symbol_not_defined, ErrorKind, RuntimeError};
use crate::scope::Scope;
use crate::value::Obj;

use super::literal::make_closure;
use super::{ClassDef, ClassItem, ExecResult, FnDef, Node, NodeBox, RaiseAt, Unwind};

/// `val name = init` / `var name = init`
#[derive(Debug)]
pub struct VarDecl {
    pub pos: Pos,
    pub name: Name,
    pub mutable: bool,
    pub init: Option<NodeBox>,
}

impl Node for VarDecl {
    fn pos(&self) -> &Pos {
        &self.pos
    }

    fn execute<'a>(&'a self, cx: &'a Context, scope: &'a Scope) -> BoxFuture<'a, ExecResult> {
        Box::pin(async move {
            let value = match &self.init {
                Some(init) => init.execute(cx, scope).await?,
                None => Obj::Null,
            };
            scope
                .add_item(self.name, self.mutable, value)
                .at(cx, &self.pos)?;
            Ok(Obj::Void)
        })
    }
}

/// `fun name(..) { .. }`
#[derive(Debug)]
pub struct FnDecl {
    pub pos: Pos,
    pub def: Arc<FnDef>,
}

impl Node for FnDecl {
    fn pos(&self) -> &Pos {
        &self.pos
    }

    fn execute<'a>(&'a self, cx: &'a Context, scope: &'a Scope) -> BoxFuture<'a, ExecResult> {
        let closure = make_closure(&self.def, scope);
        let bound = scope.add_item(self.def.name, false, closure).at(cx, &self.pos);
        Box::pin(async move { bound.map(|()| Obj::Void) })
    }
}

/// `fun Class.name(..) { .. }`: adds a member to an existing class.
#[derive(Debug)]
pub struct ExtensionDecl {
    pub pos: Pos,
    pub class: Name,
    pub class_pos: Pos,
    pub def: Arc<FnDef>,
}

impl Node for ExtensionDecl {
    fn pos(&self) -> &Pos {
        &self.pos
    }

    fn execute<'a>(&'a self, cx: &'a Context, scope: &'a Scope) -> BoxFuture<'a, ExecResult> {
        Box::pin(async move {
            let class = named_class(cx, scope, self.class, &self.class_pos)?;
            let method = make_closure(&self.def, scope);
            class
                .add_member(self.def.name, method, false)
                .at(cx, &self.pos)?;
            Ok(Obj::Void)
        })
    }
}

fn named_class(cx: &Context, scope: &Scope, name: Name, pos: &Pos) -> Result<Arc<ObjClass>, Unwind> {
    match scope.get(name) {
        Some(Obj::Class(class)) => Ok(class),
        Some(other) => Err(cx.raise(not_a_class(other.type_name()), pos)),
        None => Err(cx.raise(symbol_not_defined(name), pos)),
    }
}

/// `class Name(val a, var b = 1) : Base(a) { .. }`
#[derive(Debug)]
pub struct ClassDecl {
    pub pos: Pos,
    pub def: Arc<ClassDef>,
}

impl ClassDecl {
    fn build(&self, cx: &Context, scope: &Scope) -> Result<Arc<ObjClass>, Unwind> {
        let def = &self.def;
        let mut builder = ClassBuilder::new(def.name);
        for base in &def.bases {
            let class = named_class(cx, scope, base.name, &base.pos)?;
            if class.is_builtin() {
                return Err(cx.raise(
                    RuntimeError::new(
                        ErrorKind::IllegalArgument,
                        format!("cannot extend builtin class {}", class.name()),
                    ),
                    &base.pos,
                ));
            }
            builder = builder.base(class);
        }
        for param in &def.params {
            builder = builder.field(param.param.name, param.mutable);
        }
        for item in &def.items {
            match item {
                ClassItem::Field(field) => builder = builder.field(field.name, field.mutable),
                ClassItem::Method(method) => {
                    builder = builder.member(method.name, make_closure(method, scope), false);
                }
                ClassItem::Init(_) => {}
            }
        }
        // Initializers run against the declaring scope.
        scope.mark_escaped();
        builder
            .script(ScriptClass {
                def: Arc::clone(def),
                scope: scope.clone(),
            })
            .build()
            .at(cx, &self.pos)
    }
}

impl Node for ClassDecl {
    fn pos(&self) -> &Pos {
        &self.pos
    }

    fn execute<'a>(&'a self, cx: &'a Context, scope: &'a Scope) -> BoxFuture<'a, ExecResult> {
        let declared = self.build(cx, scope).and_then(|class| {
            tracing::debug!(class = %class.name(), fields = class.layout().len(), "class declared");
            scope
                .add_item(self.def.name, false, Obj::Class(class))
                .at(cx, &self.pos)
        });
        Box::pin(async move { declared.map(|()| Obj::Void) })
    }
}
