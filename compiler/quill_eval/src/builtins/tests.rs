use pretty_assertions::assert_eq;
use quill_ir::{Name, Pos, Source};

use super::*;
use crate::config::PerfConfig;
use crate::context::{Context, Runtime};
use crate::exec::{ExecResult, Unwind};
use crate::print_handler::silent_handler;
use crate::value::{Callable, NativeBody, NativeCall};

fn context() -> Context {
    Context::new(Runtime::new(PerfConfig::default(), silent_handler()).unwrap())
}

fn call_member(cx: &Context, receiver: Obj, member: &str, args: Vec<Obj>) -> ExecResult {
    let class = Arc::clone(cx.builtins().class_of(&receiver));
    let member = class.resolve_member(Name::intern(member)).unwrap();
    let Obj::Callable(Callable::Native(native)) = member.value() else {
        panic!("{member:?} is not native");
    };
    let NativeBody::Sync(body) = &native.body else {
        panic!("{member:?} suspends");
    };
    let pos = Pos::start(&Source::new("test.q", ""));
    body(&NativeCall {
        cx,
        pos: &pos,
        this: Some(receiver),
        args,
    })
}

fn raised_message(result: ExecResult) -> String {
    match result {
        Err(Unwind::Raise(thrown)) => thrown.value.to_string(),
        other => panic!("expected a raise, got {:?}", other.map_err(|_| ())),
    }
}

#[test]
fn every_value_kind_has_a_class() {
    let builtins = Builtins::new().unwrap();
    let cases = [
        (Obj::Void, "Void"),
        (Obj::Null, "Null"),
        (Obj::Bool(true), "Bool"),
        (Obj::Int(1), "Int"),
        (Obj::Real(1.0), "Real"),
        (Obj::from("s"), "String"),
        (Obj::list(Vec::new()), "List"),
        (Obj::empty_map(), "Map"),
    ];
    for (value, name) in cases {
        assert_eq!(builtins.class_of(&value).name().as_str(), name);
    }
}

#[test]
fn exception_classes_derive_from_exception() {
    let builtins = Builtins::new().unwrap();
    for kind in ErrorKind::ALL {
        let class = builtins.error_class(kind);
        assert_eq!(class.name().as_str(), kind.class_name());
        assert!(builtins.is_exception_class(class));
    }
    assert!(!builtins.is_exception_class(&builtins.string));
    let error = builtins.error(ErrorKind::Arithmetic, "division by zero");
    assert_eq!(error.to_string(), "ArithmeticException: division by zero");
}

#[test]
fn engines_do_not_share_builtin_classes() {
    let a = Builtins::new().unwrap();
    let b = Builtins::new().unwrap();
    a.string
        .add_member(Name::intern("shout"), Obj::Null, false)
        .unwrap();
    assert!(b.string.resolve_member(Name::intern("shout")).is_none());
    assert_eq!(b.string.layout_version(), 0);
}

#[test]
fn string_members() {
    let cx = context();
    let s = || Obj::from("  Hello  ");
    assert_eq!(call_member(&cx, s(), "size", vec![]).unwrap(), Obj::Int(9));
    assert_eq!(call_member(&cx, s(), "trim", vec![]).unwrap(), Obj::from("Hello"));
    assert_eq!(
        call_member(&cx, Obj::from("a,b"), "split", vec![Obj::from(",")]).unwrap(),
        Obj::list(vec![Obj::from("a"), Obj::from("b")])
    );
    assert_eq!(call_member(&cx, Obj::from("42"), "toInt", vec![]).unwrap(), Obj::Int(42));
    assert_eq!(
        raised_message(call_member(&cx, Obj::from("x"), "toInt", vec![])),
        "IllegalArgumentException: invalid integer: x"
    );
}

#[test]
fn list_members() {
    let cx = context();
    let list = Obj::list(vec![Obj::Int(1), Obj::Int(2)]);
    call_member(&cx, list.clone(), "add", vec![Obj::Int(3), Obj::Int(4)]).unwrap();
    assert_eq!(call_member(&cx, list.clone(), "size", vec![]).unwrap(), Obj::Int(4));
    assert_eq!(call_member(&cx, list.clone(), "indexOf", vec![Obj::Int(3)]).unwrap(), Obj::Int(2));
    assert_eq!(call_member(&cx, list.clone(), "removeLast", vec![]).unwrap(), Obj::Int(4));
    assert_eq!(
        call_member(&cx, list.clone(), "joinToString", vec![Obj::from("-")]).unwrap(),
        Obj::from("1-2-3")
    );
    list.freeze();
    assert_eq!(
        raised_message(call_member(&cx, list, "add", vec![Obj::Int(5)])),
        "IllegalAssignmentException: attempt to mutate frozen object"
    );
}

#[test]
fn map_and_range_members() {
    let cx = context();
    let map = Obj::empty_map();
    if let Obj::Map(m) = &map {
        m.insert(Obj::from("k"), Obj::Int(1)).unwrap();
    }
    assert_eq!(call_member(&cx, map.clone(), "getOrNull", vec![Obj::from("k")]).unwrap(), Obj::Int(1));
    assert_eq!(call_member(&cx, map.clone(), "getOrNull", vec![Obj::from("z")]).unwrap(), Obj::Null);
    assert_eq!(call_member(&cx, map.clone(), "remove", vec![Obj::from("k")]).unwrap(), Obj::Int(1));
    assert_eq!(call_member(&cx, map, "size", vec![]).unwrap(), Obj::Int(0));

    let range = Obj::Range(crate::value::ObjRange {
        start: 1,
        end: 3,
        inclusive: false,
    });
    assert_eq!(
        call_member(&cx, range.clone(), "toList", vec![]).unwrap(),
        Obj::list(vec![Obj::Int(1), Obj::Int(2)])
    );
    assert_eq!(call_member(&cx, range, "contains", vec![Obj::Int(3)]).unwrap(), Obj::Bool(false));
}

#[test]
fn number_conversions() {
    let cx = context();
    assert_eq!(call_member(&cx, Obj::Real(-2.7), "toInt", vec![]).unwrap(), Obj::Int(-2));
    assert_eq!(call_member(&cx, Obj::Int(-3), "abs", vec![]).unwrap(), Obj::Int(3));
    assert_eq!(call_member(&cx, Obj::Int(2), "toReal", vec![]).unwrap(), Obj::Real(2.0));
    assert!(call_member(&cx, Obj::Real(f64::NAN), "toInt", vec![]).is_err());
}

#[test]
fn exception_message_property() {
    let cx = context();
    let error = cx.builtins().error(ErrorKind::IllegalState, "boom");
    assert_eq!(call_member(&cx, error.clone(), "message", vec![]).unwrap(), Obj::from("boom"));
    assert_eq!(
        call_member(&cx, error, "toString", vec![]).unwrap(),
        Obj::from("IllegalStateException: boom")
    );
}
