use super::*;
use pretty_assertions::assert_eq;

#[test]
fn interning_is_idempotent() {
    let interner = StringInterner::new();
    let total = interner.intern("total");
    let item = interner.intern("item");
    assert_eq!(interner.intern("total"), total);
    assert_ne!(total, item);
    assert_eq!(interner.lookup(total), "total");
    assert_eq!(interner.lookup(item), "item");
}

#[test]
fn predefined_names_come_first() {
    let interner = StringInterner::new();
    assert!(interner.is_empty());
    assert_eq!(interner.intern(""), Name::EMPTY);
    assert_eq!(interner.intern("toString"), Name::TO_STRING);
    assert_eq!(interner.lookup(Name::ANONYMOUS), "<anonymous>");
    assert_eq!(interner.len(), PREDEFINED.len());
}

#[test]
fn get_does_not_insert() {
    let interner = StringInterner::new();
    assert_eq!(interner.get("missing"), None);
    assert_eq!(interner.len(), PREDEFINED.len());
    let name = interner.intern("missing");
    assert_eq!(interner.get("missing"), Some(name));
    assert!(!interner.is_empty());
}

#[test]
fn concurrent_interning_agrees() {
    let interner = StringInterner::new();
    let names: Vec<Name> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| interner.intern("shared_identifier")))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or(Name::EMPTY))
            .collect()
    });
    assert!(names.windows(2).all(|w| w[0] == w[1]));
    assert_ne!(names[0], Name::EMPTY);
    assert_eq!(interner.len(), PREDEFINED.len() + 1);
}
