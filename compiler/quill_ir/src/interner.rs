//! Process-wide identifier table.
//!
//! The table only grows. Compiling a script interns each identifier once;
//! evaluation interns only when a script names a member at run time
//! (`addMember`) or an operator looks up its conventional method, and those
//! names are almost always present already, so the read path dominates.

use std::sync::OnceLock;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::name::PREDEFINED;
use crate::Name;

/// Error when interning a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternError {
    /// More distinct identifiers than a `Name` can index.
    Exhausted { count: usize },
}

impl std::fmt::Display for InternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InternError::Exhausted { count } => {
                write!(f, "identifier table is full ({count} names)")
            }
        }
    }
}

impl std::error::Error for InternError {}

#[derive(Default)]
struct Table {
    ids: FxHashMap<&'static str, Name>,
    texts: Vec<&'static str>,
}

impl Table {
    fn insert(&mut self, text: &str) -> Result<Name, InternError> {
        let count = self.texts.len();
        let id = u32::try_from(count).map_err(|_| InternError::Exhausted { count })?;
        let text: &'static str = Box::leak(text.to_owned().into_boxed_str());
        let name = Name::from_raw(id);
        self.texts.push(text);
        self.ids.insert(text, name);
        Ok(name)
    }
}

/// Identifier table behind [`Name`].
///
/// Texts are leaked on first sight, which is what lets [`Name::as_str`]
/// return `&'static str`. The predefined names occupy the first slots in
/// the order of their `Name` constants.
pub struct StringInterner {
    table: RwLock<Table>,
}

impl StringInterner {
    pub fn new() -> Self {
        let mut table = Table::default();
        for text in PREDEFINED {
            // A fresh table has room for the predefined names.
            let _ = table.insert(text);
        }
        StringInterner {
            table: RwLock::new(table),
        }
    }

    pub fn try_intern(&self, text: &str) -> Result<Name, InternError> {
        if let Some(&name) = self.table.read().ids.get(text) {
            return Ok(name);
        }
        let mut table = self.table.write();
        match table.ids.get(text) {
            Some(&name) => Ok(name),
            None => table.insert(text),
        }
    }

    /// # Panics
    /// Panics once more than `u32::MAX` distinct identifiers exist.
    #[inline]
    pub fn intern(&self, text: &str) -> Name {
        self.try_intern(text).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Text of `name`; names from another table resolve to `""`.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.table.read().texts.get(name.index()).copied().unwrap_or("")
    }

    /// Whether `text` has been interned, without adding it.
    pub fn get(&self, text: &str) -> Option<Name> {
        self.table.read().ids.get(text).copied()
    }

    pub fn len(&self) -> usize {
        self.table.read().texts.len()
    }

    /// Whether nothing beyond the predefined names was interned.
    pub fn is_empty(&self) -> bool {
        self.len() <= PREDEFINED.len()
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// The table every [`Name`] resolves against.
pub fn global_interner() -> &'static StringInterner {
    static INTERNER: OnceLock<StringInterner> = OnceLock::new();
    INTERNER.get_or_init(StringInterner::new)
}

#[cfg(test)]
mod tests;
