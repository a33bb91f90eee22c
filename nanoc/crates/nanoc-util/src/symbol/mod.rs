//! Interned identifiers.
//!
//! A [`Symbol`] is a 4-byte handle to a string owned by an [`Interner`].
//! Comparing two symbols for equality is an integer comparison rather than
//! a byte-for-byte string comparison, which matters here because every
//! identifier in a source file is looked up repeatedly: once per use, in
//! scope resolution, in the function table, and again when the code
//! generator re-renders the name into frame-relative addressing.
//!
//! # Why this isn't a global table
//!
//! Nothing under `nanoc-*` interns a string from more than one thread, and
//! nothing needs a symbol to outlive the single [`Interner`] that produced
//! it — one compilation run creates one interner, uses it through lexing,
//! parsing, and semantic analysis, and drops it when the run ends. A
//! process-wide table (the usual shape for this type in a long-lived
//! compiler daemon or IDE backend) would only add an `Arc`/lock and a
//! leaked allocation for every string, with nothing to show for it.

mod interner;

pub use interner::Interner;

use std::fmt;

/// A compact, copyable handle to a string owned by some [`Interner`].
///
/// Two symbols are equal exactly when they were produced by interning
/// equal strings in the *same* interner; comparing symbols minted by two
/// different interners is meaningless (there's only ever one interner
/// alive per compilation, so this isn't a footgun in practice).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

impl Symbol {
    #[inline]
    pub(crate) fn from_u32(index: u32) -> Self {
        Symbol(index)
    }

    /// The raw index backing this symbol. Only meaningful paired with the
    /// interner that produced it.
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_same_string_yields_same_symbol() {
        let mut interner = Interner::new();
        let a = interner.intern("counter");
        let b = interner.intern("counter");
        assert_eq!(a, b);
    }

    #[test]
    fn intern_different_strings_yields_different_symbols() {
        let mut interner = Interner::new();
        let a = interner.intern("counter");
        let b = interner.intern("total");
        assert_ne!(a, b);
    }

    #[test]
    fn resolve_roundtrips() {
        let mut interner = Interner::new();
        let sym = interner.intern("my_var");
        assert_eq!(interner.resolve(sym), Some("my_var"));
    }

    #[test]
    fn known_keywords_are_stable_and_distinct() {
        let interner = Interner::new();
        let kws = [
            interner.kw_int(),
            interner.kw_if(),
            interner.kw_else(),
            interner.kw_return(),
            interner.kw_print(),
        ];
        for i in 0..kws.len() {
            for j in (i + 1)..kws.len() {
                assert_ne!(kws[i], kws[j]);
            }
        }
    }

    #[test]
    fn interning_a_keyword_text_returns_the_known_symbol() {
        let mut interner = Interner::new();
        assert_eq!(interner.intern("if"), interner.kw_if());
        assert_eq!(interner.intern("return"), interner.kw_return());
    }
}
