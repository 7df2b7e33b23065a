//! Source positions.

use std::fmt;
use std::sync::Arc;

use crate::Source;

/// An immutable position in a [`Source`].
///
/// Lines and columns are 0-based internally and rendered 1-based. Every
/// token and every executable node carries the position of the first
/// character of its construct; the executor also uses it as the identity
/// of inline-cache sites when reporting.
#[derive(Clone)]
pub struct Pos {
    source: Arc<Source>,
    line: u32,
    column: u32,
}

impl Pos {
    /// Position of the first character of `source`.
    pub fn start(source: &Arc<Source>) -> Self {
        Pos {
            source: Arc::clone(source),
            line: 0,
            column: 0,
        }
    }

    /// Position at an explicit 0-based line and column.
    pub fn new(source: &Arc<Source>, line: u32, column: u32) -> Self {
        Pos {
            source: Arc::clone(source),
            line,
            column,
        }
    }

    #[inline]
    pub fn source(&self) -> &Arc<Source> {
        &self.source
    }

    #[inline]
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// 0-based line.
    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// 0-based column.
    #[inline]
    pub fn column(&self) -> u32 {
        self.column
    }

    /// The text of the line this position points into.
    pub fn line_text(&self) -> String {
        self.source.line_text(self.line as usize)
    }

    /// Step one character backward, crossing to the end of the previous
    /// line when at column 0.
    ///
    /// # Panics
    ///
    /// Stepping back from `(0, 0)` is a caller bug and panics.
    pub fn back(&self) -> Pos {
        if self.column > 0 {
            return Pos {
                source: Arc::clone(&self.source),
                line: self.line,
                column: self.column - 1,
            };
        }
        assert!(self.line > 0, "Pos::back stepped before start of {}", self.source.name());
        let line = self.line - 1;
        let len = self.source.line_chars(line as usize).len();
        Pos {
            source: Arc::clone(&self.source),
            line,
            column: u32::try_from(len).unwrap_or(u32::MAX),
        }
    }
}

impl PartialEq for Pos {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.source, &other.source)
            && self.line == other.line
            && self.column == other.column
    }
}

impl Eq for Pos {}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.source.name(),
            self.line + 1,
            self.column + 1
        )
    }
}

impl fmt::Debug for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({self})")
    }
}
