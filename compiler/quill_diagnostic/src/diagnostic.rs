use std::fmt;

use quill_ir::Pos;

use crate::{ColorMode, TerminalEmitter};

/// Diagnostic severity.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// A positioned message with its one-line source excerpt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub source_name: String,
    /// 1-based.
    pub line: u32,
    /// 1-based.
    pub column: u32,
    pub message: String,
    /// The full text of the line `line` points into.
    pub excerpt: String,
}

impl Diagnostic {
    /// An error at `pos`.
    pub fn error(pos: &Pos, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            source_name: pos.source_name().to_owned(),
            line: pos.line() + 1,
            column: pos.column() + 1,
            message: message.into(),
            excerpt: pos.line_text(),
        }
    }

    /// The `name:line:column` locator.
    pub fn location(&self) -> String {
        format!("{}:{}:{}", self.source_name, self.line, self.column)
    }

    /// Two lines: the excerpt and a caret under the reported column.
    ///
    /// Tabs before the caret are preserved so the caret lines up in a
    /// terminal that expands them.
    pub fn excerpt_with_caret(&self) -> String {
        let pad: String = self
            .excerpt
            .chars()
            .take(self.column.saturating_sub(1) as usize)
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();
        format!("{}\n{pad}^", self.excerpt)
    }

    /// Plain-text rendering (no colors).
    pub fn render(&self) -> String {
        let mut emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Never, false);
        emitter.emit(self);
        String::from_utf8_lossy(&emitter.into_inner()).into_owned()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.location(), self.severity, self.message)
    }
}
