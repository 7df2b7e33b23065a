use pretty_assertions::assert_eq;
use quill_ir::Name;

use super::*;
use crate::errors::ErrorKind;

fn name(s: &str) -> Name {
    Name::intern(s)
}

fn class(n: &str, bases: &[&Arc<ObjClass>]) -> Arc<ObjClass> {
    bases
        .iter()
        .fold(ClassBuilder::new(name(n)), |b, base| b.base(Arc::clone(base)))
        .build()
        .unwrap()
}

#[test]
fn resolution_is_depth_first_first_match_wins() {
    let root = ClassBuilder::new(name("Root"))
        .member(name("who"), Obj::from("Root"), false)
        .build()
        .unwrap();
    let b1 = ClassBuilder::new(name("B1"))
        .base(Arc::clone(&root))
        .member(name("f"), Obj::from("B1"), false)
        .build()
        .unwrap();
    let b2 = ClassBuilder::new(name("B2"))
        .member(name("f"), Obj::from("B2"), false)
        .member(name("who"), Obj::from("B2"), false)
        .build()
        .unwrap();
    let c = class("C", &[&b1, &b2]);

    assert_eq!(c.resolve_member(name("f")).unwrap().value(), Obj::from("B1"));
    // Depth-first: B1's base Root is searched before B2.
    assert_eq!(c.resolve_member(name("who")).unwrap().value(), Obj::from("Root"));
    assert!(c.resolve_member(name("missing")).is_none());
}

#[test]
fn diamond_shares_base_fields_once() {
    let base = ClassBuilder::new(name("Base"))
        .field(name("x"), true)
        .build()
        .unwrap();
    let left = ClassBuilder::new(name("Left"))
        .base(Arc::clone(&base))
        .field(name("l"), true)
        .build()
        .unwrap();
    let right = ClassBuilder::new(name("Right"))
        .base(Arc::clone(&base))
        .field(name("r"), false)
        .build()
        .unwrap();
    let bottom = class("Bottom", &[&left, &right]);
    let names: Vec<&str> = bottom
        .layout()
        .fields()
        .iter()
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(names, vec!["x", "l", "r"]);
    assert!(matches!(
        bottom.resolve(name("r")),
        Some(Resolved::Slot { index: 2, mutable: false })
    ));
}

#[test]
fn add_member_bumps_version_of_class_and_descendants() {
    let base = class("VBase", &[]);
    let mid = class("VMid", &[&base]);
    let leaf = class("VLeaf", &[&mid]);
    let unrelated = class("VOther", &[]);

    base.add_member(name("m"), Obj::Int(1), false).unwrap();

    assert_eq!(base.layout_version(), 1);
    assert_eq!(mid.layout_version(), 1);
    assert_eq!(leaf.layout_version(), 1);
    assert_eq!(unrelated.layout_version(), 0);
    assert_eq!(leaf.resolve_member(name("m")).unwrap().value(), Obj::Int(1));
}

#[test]
fn add_member_rejects_defined_or_inherited_names() {
    let base = ClassBuilder::new(name("RBase"))
        .member(name("inherited"), Obj::Null, false)
        .build()
        .unwrap();
    let derived = ClassBuilder::new(name("RDerived"))
        .base(Arc::clone(&base))
        .field(name("slot"), true)
        .build()
        .unwrap();
    derived.add_member(name("own"), Obj::Null, false).unwrap();

    for taken in ["own", "inherited", "slot"] {
        let err = derived.add_member(name(taken), Obj::Null, false).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IllegalState, "{taken}");
    }
    assert_eq!(derived.layout_version(), 1);
}

#[test]
fn builder_rejects_duplicate_members() {
    let err = ClassBuilder::new(name("Dup"))
        .field(name("a"), true)
        .member(name("a"), Obj::Null, false)
        .build()
        .unwrap_err();
    assert_eq!(err.message, "symbol already defined: a");
}

#[test]
fn mutable_member_changes_keep_version() {
    let c = ClassBuilder::new(name("Counter"))
        .member(name("count"), Obj::Int(0), true)
        .member(name("limit"), Obj::Int(9), false)
        .build()
        .unwrap();
    let count = c.resolve_member(name("count")).unwrap();
    count.set(Obj::Int(5)).unwrap();
    assert_eq!(c.own_member(name("count")).unwrap().value(), Obj::Int(5));
    assert_eq!(c.layout_version(), 0);

    let limit = c.resolve_member(name("limit")).unwrap();
    assert_eq!(limit.set(Obj::Int(1)).unwrap_err().kind, ErrorKind::IllegalAssignment);
}

#[test]
fn subclass_check_follows_all_bases() {
    let a = class("SA", &[]);
    let b = class("SB", &[]);
    let c = class("SC", &[&a, &b]);
    assert!(c.is_subclass_of(&a));
    assert!(c.is_subclass_of(&b));
    assert!(c.is_subclass_of(&c));
    assert!(!a.is_subclass_of(&c));
}

#[test]
fn instance_fields_frozen_before_read_only() {
    let c = ClassBuilder::new(name("Point"))
        .field(name("x"), true)
        .field(name("y"), false)
        .build()
        .unwrap();
    let p = Instance::new(Arc::clone(&c));
    p.init_field(1, Obj::Int(2));
    p.set_field(0, Obj::Int(1), true).unwrap();
    assert_eq!(p.to_string(), "Point(x=1, y=2)");

    let err = p.set_field(1, Obj::Int(3), false).unwrap_err();
    assert_eq!(err.message, "can't assign to read-only member y");

    p.freeze();
    let err = p.set_field(1, Obj::Int(3), false).unwrap_err();
    assert_eq!(err.message, "attempt to mutate frozen object");
    let err = p.set_field(0, Obj::Int(3), true).unwrap_err();
    assert_eq!(err.kind, ErrorKind::IllegalAssignment);
    assert_eq!(p.field(0), Obj::Int(1));
}

#[test]
fn instance_debug_names_its_class() {
    let c = ClassBuilder::new(name("Pair")).field(name("a"), true).build().unwrap();
    let p = Instance::new(c);
    assert_eq!(format!("{p:?}"), "Instance { class: Name(\"Pair\"), frozen: false, .. }");
    p.freeze();
    assert!(format!("{p:?}").contains("frozen: true"));
}
