use pretty_assertions::assert_eq;
use quill_ir::Name;

use super::*;
use crate::class::ClassBuilder;

fn name(s: &str) -> Name {
    Name::intern(s)
}

#[test]
fn lookup_walks_parents_and_inner_shadows_outer() {
    let root = Scope::root();
    root.add_item(name("a"), false, Obj::Int(1)).unwrap();
    root.add_item(name("b"), false, Obj::Int(2)).unwrap();
    let inner = root.child();
    inner.add_item(name("a"), false, Obj::Int(10)).unwrap();

    assert_eq!(inner.get(name("a")), Some(Obj::Int(10)));
    assert_eq!(inner.get(name("b")), Some(Obj::Int(2)));
    assert_eq!(root.get(name("a")), Some(Obj::Int(1)));
    assert_eq!(inner.get(name("zzz")), None);
}

#[test]
fn redefinition_in_same_scope_fails() {
    let root = Scope::root();
    root.add_item(name("x"), true, Obj::Null).unwrap();
    let err = root.add_item(name("x"), true, Obj::Null).unwrap_err();
    assert_eq!(err.message, "symbol already defined: x");
}

#[test]
fn assign_respects_mutability_of_nearest_binding() {
    let root = Scope::root();
    root.add_item(name("v"), true, Obj::Int(0)).unwrap();
    root.add_item(name("c"), false, Obj::Int(0)).unwrap();
    let inner = root.child();

    inner.assign(name("v"), Obj::Int(5)).unwrap();
    assert_eq!(root.get(name("v")), Some(Obj::Int(5)));
    assert_eq!(inner.assign(name("c"), Obj::Int(5)), Err(AssignError::Immutable));
    assert_eq!(inner.assign(name("nope"), Obj::Int(5)), Err(AssignError::Undefined));
}

#[test]
fn method_frames_see_fields_before_parent() {
    let class = ClassBuilder::new(name("Box"))
        .field(name("value"), true)
        .member(name("label"), Obj::from("box"), false)
        .build()
        .unwrap();
    let instance = Arc::new(Instance::new(Arc::clone(&class)));
    instance.init_field(0, Obj::Int(3));

    let globals = Scope::root();
    globals.add_item(name("value"), false, Obj::Int(99)).unwrap();
    let this = ThisRef {
        value: Obj::Instance(Arc::clone(&instance)),
        class,
    };
    let frame = Scope::frame(Some(globals.clone()), Some(this), Vec::new(), 0);
    let block = frame.child();

    assert_eq!(block.get(name("value")), Some(Obj::Int(3)));
    assert_eq!(block.get(name("label")), Some(Obj::from("box")));
    assert!(block.this().is_some());

    block.assign(name("value"), Obj::Int(4)).unwrap();
    assert_eq!(instance.field(0), Obj::Int(4));
    assert_eq!(block.assign(name("label"), Obj::Null), Err(AssignError::Immutable));

    instance.freeze();
    assert_eq!(block.assign(name("value"), Obj::Int(5)), Err(AssignError::Frozen));
}

#[test]
fn escape_marks_every_ancestor() {
    let root = Scope::root();
    let frame = root.child();
    let block = frame.child();
    assert!(!frame.is_escaped());
    block.mark_escaped();
    assert!(block.is_escaped());
    assert!(frame.is_escaped());
    assert!(root.is_escaped());
}

#[test]
fn data_mut_requires_unique_handle() {
    let mut frame = Scope::root();
    assert!(frame.data_mut().is_some());
    let alias = frame.clone();
    assert!(frame.data_mut().is_none());
    drop(alias);
    assert!(frame.data_mut().is_some());
}

#[test]
fn field_lookup_is_debug_printable() {
    let class = ClassBuilder::new(name("Cell"))
        .field(name("content"), true)
        .build()
        .unwrap();
    let instance = Arc::new(Instance::new(Arc::clone(&class)));
    let this = ThisRef {
        value: Obj::Instance(instance),
        class,
    };
    let frame = Scope::frame(None, Some(this), Vec::new(), 0);

    let found = frame.lookup(name("content")).unwrap();
    assert!(matches!(found, Lookup::Field { index: 0, mutable: true, .. }));
    let printed = format!("{found:?}");
    assert!(printed.starts_with("Field { instance: Instance { class: Name(\"Cell\")"), "{printed}");
}
