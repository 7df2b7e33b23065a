use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_lines_are_trimmed() {
    let source = Source::new("t.q", "val x = 1   \r\nx\t\n");
    assert_eq!(source.line_count(), 3);
    assert_eq!(source.line_text(0), "val x = 1");
    assert_eq!(source.line_text(1), "x");
    assert_eq!(source.line_text(2), "");
}

#[test]
fn test_out_of_range_line_is_empty() {
    let source = Source::new("t.q", "a");
    assert!(source.line_chars(7).is_empty());
}

#[test]
fn test_columns_count_chars() {
    let source = Source::new("t.q", "имя = 1");
    assert_eq!(source.line_chars(0).len(), 7);
    assert_eq!(source.name(), "t.q");
}
