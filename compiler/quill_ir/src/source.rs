//! Named script text.

use std::fmt;
use std::sync::Arc;

/// A named piece of script text, stored as lines.
///
/// Text is split on `\n`, a trailing `\r` is dropped, and trailing
/// whitespace is trimmed from every line. Lines are stored as `char`
/// vectors so that columns count characters, not bytes.
pub struct Source {
    name: String,
    lines: Vec<Vec<char>>,
}

impl Source {
    /// Build a shared source from raw text.
    pub fn new(name: impl Into<String>, text: &str) -> Arc<Source> {
        let lines = text
            .split('\n')
            .map(|line| line.trim_end().chars().collect())
            .collect();
        Arc::new(Source {
            name: name.into(),
            lines,
        })
    }

    /// The name the host gave this source (usually a file name).
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of lines, including a trailing empty line.
    #[inline]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Characters of line `index`, or an empty slice past the end.
    #[inline]
    pub fn line_chars(&self, index: usize) -> &[char] {
        self.lines.get(index).map_or(&[], Vec::as_slice)
    }

    /// Line `index` as an owned string (for diagnostics).
    pub fn line_text(&self, index: usize) -> String {
        self.line_chars(index).iter().collect()
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("name", &self.name)
            .field("lines", &self.lines.len())
            .finish()
    }
}

#[cfg(test)]
mod tests;
