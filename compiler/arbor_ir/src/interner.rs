//! String interner for identifiers and string literal values.
//!
//! The engine is single-threaded (one pipeline run owns a context), so the
//! interner is a plain map plus a vector; it lives inside the `NodeArena`
//! and dies with it.

use rustc_hash::FxHashMap;
use std::fmt;

/// Interned string identifier.
///
/// Only meaningful together with the interner that produced it.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    /// Get raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

/// Owning string interner.
pub struct StringInterner {
    map: FxHashMap<Box<str>, Name>,
    strings: Vec<Box<str>>,
}

impl StringInterner {
    /// Create an interner holding only the empty string.
    pub fn new() -> Self {
        let mut interner = StringInterner {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(256),
        };
        interner.intern("");
        interner
    }

    /// Intern a string, returning its existing name when already present.
    pub fn intern(&mut self, s: &str) -> Name {
        if let Some(&name) = self.map.get(s) {
            return name;
        }
        let raw = u32::try_from(self.strings.len()).unwrap_or(u32::MAX);
        let name = Name(raw);
        self.strings.push(s.into());
        self.map.insert(s.into(), name);
        name
    }

    /// Look up a name without interning.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.map.get(s).copied()
    }

    /// Resolve a name to its text. Unknown names resolve to `""`.
    pub fn lookup(&self, name: Name) -> &str {
        self.strings
            .get(name.0 as usize)
            .map_or("", |s| s.as_ref())
    }

    /// Number of interned strings, including the empty string.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Always false: the empty string is pre-interned.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StringInterner({} strings)", self.strings.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_dedup() {
        let mut interner = StringInterner::new();
        let a = interner.intern("testFunction");
        let b = interner.intern("testFunction");
        let c = interner.intern("other");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.lookup(a), "testFunction");
    }

    #[test]
    fn test_empty_is_preinterned() {
        let mut interner = StringInterner::new();
        assert_eq!(interner.intern(""), Name::EMPTY);
        assert_eq!(interner.get("missing"), None);
        assert_eq!(interner.len(), 1);
    }
}
