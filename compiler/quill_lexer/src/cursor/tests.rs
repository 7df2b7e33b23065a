use super::*;
use pretty_assertions::assert_eq;

fn drain(text: &str) -> String {
    let source = Source::new("t.q", text);
    let mut cursor = Cursor::new(&source);
    let mut out = String::new();
    while let Some(c) = cursor.current() {
        out.push(c);
        cursor.advance();
    }
    out
}

#[test]
fn test_newlines_are_virtual() {
    assert_eq!(drain("ab\ncd"), "ab\ncd");
    assert_eq!(drain("ab  \r\ncd\n"), "ab\ncd\n");
}

#[test]
fn test_retreat_crosses_lines() {
    let source = Source::new("t.q", "ab\ncd");
    let mut cursor = Cursor::new(&source);
    for _ in 0..3 {
        cursor.advance();
    }
    assert_eq!(cursor.current(), Some('c'));
    cursor.retreat();
    assert_eq!(cursor.current(), Some('\n'));
    cursor.retreat();
    assert_eq!(cursor.current(), Some('b'));
}

#[test]
fn test_skip_line() {
    let source = Source::new("t.q", "// note\nx");
    let mut cursor = Cursor::new(&source);
    cursor.skip_line();
    assert_eq!(cursor.current(), Some('x'));
    assert_eq!((cursor.pos().line(), cursor.pos().column()), (1, 0));
}
