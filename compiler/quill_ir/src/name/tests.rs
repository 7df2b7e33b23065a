use super::*;
use pretty_assertions::assert_eq;

#[test]
fn intern_resolves_back() {
    let name = Name::intern("counter");
    assert_eq!(name.as_str(), "counter");
    assert_eq!(name, Name::from("counter"));
    assert_eq!(name.to_string(), "counter");
}

#[test]
fn predefined_constants_match_their_text() {
    for (i, text) in PREDEFINED.iter().enumerate() {
        assert_eq!(Name::intern(text).index(), i);
    }
    assert_eq!(Name::THIS.as_str(), "this");
    assert_eq!(Name::SET.as_str(), "set");
}

#[test]
fn empty_is_default() {
    assert_eq!(Name::default(), Name::EMPTY);
    assert_eq!(Name::EMPTY.as_str(), "");
    assert_eq!(format!("{:?}", Name::GET), "Name(\"get\")");
}
