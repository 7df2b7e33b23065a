//! Line/column cursor over a [`Source`].
//!
//! The cursor presents the source as one character stream: the end of every
//! line but the last reads as a virtual `'\n'`, and the end of the last line
//! reads as `None`.

use std::sync::Arc;

use quill_ir::{Pos, Source};

pub(crate) struct Cursor {
    source: Arc<Source>,
    line: usize,
    column: usize,
}

impl Cursor {
    pub(crate) fn new(source: &Arc<Source>) -> Self {
        Cursor {
            source: Arc::clone(source),
            line: 0,
            column: 0,
        }
    }

    /// Character under the cursor.
    pub(crate) fn current(&self) -> Option<char> {
        let last = self.source.line_count().saturating_sub(1);
        if self.line > last {
            return None;
        }
        let chars = self.source.line_chars(self.line);
        match chars.get(self.column) {
            Some(&c) => Some(c),
            None if self.line < last => Some('\n'),
            None => None,
        }
    }

    /// Whether the cursor sits on the last character of its line (or past it).
    pub(crate) fn at_line_end(&self) -> bool {
        self.column >= self.source.line_chars(self.line).len()
    }

    pub(crate) fn advance(&mut self) {
        if self.column < self.source.line_chars(self.line).len() {
            self.column += 1;
        } else if self.line < self.source.line_count() {
            self.line += 1;
            self.column = 0;
        }
    }

    /// Advance if the current character is `expected`.
    pub(crate) fn eat(&mut self, expected: char) -> bool {
        if self.current() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Skip the rest of the current line, landing on the next line's start.
    pub(crate) fn skip_line(&mut self) {
        self.column = self.source.line_chars(self.line).len();
        self.advance();
    }

    /// Step one character back (see [`Pos::back`]).
    pub(crate) fn retreat(&mut self) {
        let back = self.pos().back();
        self.line = back.line() as usize;
        self.column = back.column() as usize;
    }

    pub(crate) fn pos(&self) -> Pos {
        Pos::new(
            &self.source,
            u32::try_from(self.line).unwrap_or(u32::MAX),
            u32::try_from(self.column).unwrap_or(u32::MAX),
        )
    }
}

#[cfg(test)]
mod tests;
