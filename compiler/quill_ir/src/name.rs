//! Interned identifiers.

use std::fmt;

use crate::global_interner;

/// An identifier as an index into the [`global_interner`].
///
/// Scope bindings, member tables and inline-cache keys compare `Name`s, so
/// equality and hashing never touch the text.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Name(u32);

/// Texts of the predefined names, indexed by their constant.
pub(crate) const PREDEFINED: [&str; 6] = ["", "this", "toString", "get", "set", "<anonymous>"];

impl Name {
    pub const EMPTY: Name = Name(0);
    /// The receiver inside methods and initializers.
    pub const THIS: Name = Name(1);
    /// Consulted when an instance is printed or concatenated.
    pub const TO_STRING: Name = Name(2);
    /// `get`/`set`: index operators on user classes.
    pub const GET: Name = Name(3);
    pub const SET: Name = Name(4);
    /// Name of function literals.
    pub const ANONYMOUS: Name = Name(5);

    #[inline]
    pub(crate) const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    #[inline]
    pub fn intern(text: &str) -> Self {
        global_interner().intern(text)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn as_str(self) -> &'static str {
        global_interner().lookup(self)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", self.as_str())
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl From<&str> for Name {
    fn from(text: &str) -> Self {
        Name::intern(text)
    }
}

#[cfg(test)]
mod tests;
