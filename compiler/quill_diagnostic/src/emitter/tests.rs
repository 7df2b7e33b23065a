use super::*;
use quill_ir::{Pos, Source};

fn sample_diagnostic() -> Diagnostic {
    let source = Source::new("demo.q", "x.y = 1");
    Diagnostic::error(&Pos::new(&source, 0, 2), "attempt to mutate frozen object")
}

fn emit_to_string(mode: ColorMode, is_tty: bool) -> String {
    let mut emitter = TerminalEmitter::with_color_mode(Vec::new(), mode, is_tty);
    emitter.emit(&sample_diagnostic());
    String::from_utf8_lossy(&emitter.into_inner()).into_owned()
}

#[test]
fn plain_layout_matches_render() {
    let text = emit_to_string(ColorMode::Never, true);
    assert!(text.starts_with("error: attempt to mutate frozen object\n"));
    assert!(text.contains("--> demo.q:1:3"));
    assert!(text.contains("1 | x.y = 1"));
    assert!(text.ends_with("  |   ^\n"));
    assert!(!text.contains('\x1b'));
}

#[test]
fn colored_output_styles_severity_and_caret() {
    let text = emit_to_string(ColorMode::Always, false);
    assert!(text.contains("\x1b[1;31merror\x1b[0m"));
    assert!(text.contains("\x1b[1;31m^\x1b[0m"));
}

#[test]
fn auto_color_follows_tty() {
    assert!(ColorMode::Auto.should_use_colors(true));
    assert!(!ColorMode::Auto.should_use_colors(false));
    assert!(ColorMode::Always.should_use_colors(false));
    assert!(!ColorMode::Never.should_use_colors(true));
    assert_eq!(ColorMode::default(), ColorMode::Auto);
}

#[test]
fn emit_all_writes_each_diagnostic() {
    let mut emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Never, false);
    emitter.emit_all(&[sample_diagnostic(), sample_diagnostic()]);
    let text = String::from_utf8_lossy(&emitter.into_inner()).into_owned();
    assert_eq!(text.matches("error:").count(), 2);
}
