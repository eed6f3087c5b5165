//! Interned names for primitives and base types.
//!
//! Primitive names and base-type names are compared constantly (registry
//! lookups, structural type equality), so they are interned once and
//! compared as symbols afterwards.

use once_cell::sync::Lazy;
use std::fmt;
use std::sync::RwLock;
use string_interner::{DefaultBackend, DefaultSymbol, StringInterner};

static INTERNER: Lazy<RwLock<StringInterner<DefaultBackend>>> =
    Lazy::new(|| RwLock::new(StringInterner::default()));

/// A name interned in the process-wide interner.
///
/// Equality and hashing are symbol comparisons, never string comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InternedSymbol(DefaultSymbol);

impl InternedSymbol {
    /// Intern a name and return its symbol.
    pub fn new(s: &str) -> Self {
        let mut interner = INTERNER.write().unwrap();
        InternedSymbol(interner.get_or_intern(s))
    }

    /// Resolve the symbol back to an owned string.
    pub fn resolve(&self) -> String {
        self.with_str(str::to_string)
    }

    /// Run a function over the interned string slice without allocating.
    pub fn with_str<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&str) -> R,
    {
        let interner = INTERNER.read().unwrap();
        let s = interner
            .resolve(self.0)
            .expect("interned symbol should always resolve");
        f(s)
    }
}

impl fmt::Display for InternedSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_str(|s| write!(f, "{s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_interns_to_same_symbol() {
        assert_eq!(InternedSymbol::new("logo_UA"), InternedSymbol::new("logo_UA"));
    }

    #[test]
    fn different_names_intern_to_different_symbols() {
        assert_ne!(InternedSymbol::new("tangle"), InternedSymbol::new("tlength"));
    }

    #[test]
    fn resolve_returns_original_name() {
        assert_eq!(InternedSymbol::new("logo_FWRT").resolve(), "logo_FWRT");
    }
}
