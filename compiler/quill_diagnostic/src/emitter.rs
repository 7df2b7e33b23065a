//! Terminal output for diagnostics, optionally colored with ANSI escapes.

use std::io::{self, Write};

use crate::{Diagnostic, Severity};

/// Whether to color output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Color only when writing to a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Roles a rendered segment can play; each maps to one ANSI style.
#[derive(Clone, Copy)]
enum Style {
    Plain,
    Error,
    Warning,
    Message,
    Gutter,
}

impl Style {
    fn escape(self) -> Option<&'static str> {
        match self {
            Style::Plain => None,
            Style::Error => Some("\x1b[1;31m"),
            Style::Warning => Some("\x1b[1;33m"),
            Style::Message => Some("\x1b[1m"),
            Style::Gutter => Some("\x1b[1;34m"),
        }
    }
}

const RESET: &str = "\x1b[0m";

/// Writes diagnostics in the layout shown in the crate docs.
///
/// Write errors are ignored: diagnostics are best-effort output.
pub struct TerminalEmitter<W: Write> {
    writer: W,
    colors: bool,
}

impl TerminalEmitter<io::Stderr> {
    pub fn stderr(mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter::with_color_mode(io::stderr(), mode, is_tty)
    }
}

impl<W: Write> TerminalEmitter<W> {
    pub fn with_color_mode(writer: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colors: mode.should_use_colors(is_tty),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn line(&mut self, segments: &[(&str, Style)]) {
        let mut out = String::new();
        for &(text, style) in segments {
            match style.escape().filter(|_| self.colors) {
                Some(escape) => {
                    out.push_str(escape);
                    out.push_str(text);
                    out.push_str(RESET);
                }
                None => out.push_str(text),
            }
        }
        let _ = writeln!(self.writer, "{}", out.trim_end());
    }

    pub fn emit(&mut self, diagnostic: &Diagnostic) {
        let severity = diagnostic.severity.to_string();
        let severity_style = match diagnostic.severity {
            Severity::Error => Style::Error,
            Severity::Warning => Style::Warning,
        };
        let number = diagnostic.line.to_string();
        let gutter = " ".repeat(number.len());
        let bar = format!("{gutter} |");
        let numbered = format!("{number} |");
        let location = diagnostic.location();
        let excerpt = diagnostic.excerpt_with_caret();
        let (source_line, caret) = excerpt.split_once('\n').unwrap_or((excerpt.as_str(), "^"));
        let (pad, mark) = caret.split_at(caret.len().saturating_sub(1));

        self.line(&[
            (severity.as_str(), severity_style),
            (": ", Style::Plain),
            (diagnostic.message.as_str(), Style::Message),
        ]);
        self.line(&[
            (gutter.as_str(), Style::Plain),
            (" ", Style::Plain),
            ("-->", Style::Gutter),
            (" ", Style::Plain),
            (location.as_str(), Style::Plain),
        ]);
        self.line(&[(bar.as_str(), Style::Gutter)]);
        self.line(&[(numbered.as_str(), Style::Gutter), (" ", Style::Plain), (source_line, Style::Plain)]);
        self.line(&[
            (bar.as_str(), Style::Gutter),
            (" ", Style::Plain),
            (pad, Style::Plain),
            (mark, severity_style),
        ]);
    }

    pub fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        for diagnostic in diagnostics {
            self.emit(diagnostic);
        }
        let _ = self.writer.flush();
    }
}

#[cfg(test)]
mod tests;
