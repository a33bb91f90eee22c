//! A session-scoped string interner.
//!
//! No concurrency machinery — one [`Interner`] is only ever touched by the
//! single thread running one compilation, so a plain owned table is all
//! that's needed.

use rustc_hash::FxHashMap;

use super::Symbol;

/// Five names the parser needs to recognize as keywords rather than plain
/// identifiers. The lexer itself makes no such distinction — every one of
/// these matches the same identifier pattern as a user-chosen name — so
/// the distinction is drawn here, by interning them up front at fixed,
/// well-known indices.
const KNOWN_KEYWORDS: [&str; 5] = ["int", "if", "else", "return", "print"];

/// Owns the growable table of interned strings for one compilation.
pub struct Interner {
    strings: Vec<Box<str>>,
    lookup: FxHashMap<Box<str>, Symbol>,
}

impl Interner {
    /// Create an interner with the keywords (`int`, `if`, `else`,
    /// `return`) and the one built-in function name (`print`) pre-interned
    /// at indices `0..5`, so callers can compare against them without
    /// re-interning on every lookup.
    pub fn new() -> Self {
        let mut interner = Self {
            strings: Vec::with_capacity(KNOWN_KEYWORDS.len()),
            lookup: FxHashMap::default(),
        };
        for kw in KNOWN_KEYWORDS {
            interner.intern(kw);
        }
        interner
    }

    /// Intern a string, returning its existing symbol if already present
    /// or allocating a new one otherwise.
    pub fn intern(&mut self, string: &str) -> Symbol {
        if let Some(&sym) = self.lookup.get(string) {
            return sym;
        }
        let sym = Symbol::from_u32(self.strings.len() as u32);
        let boxed: Box<str> = string.into();
        self.strings.push(boxed.clone());
        self.lookup.insert(boxed, sym);
        sym
    }

    /// Resolve a symbol back to its string, if it was produced by this
    /// interner.
    pub fn resolve(&self, symbol: Symbol) -> Option<&str> {
        self.strings.get(symbol.as_u32() as usize).map(|s| &**s)
    }

    /// Number of distinct strings interned so far (including keywords).
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn kw_int(&self) -> Symbol {
        Symbol::from_u32(0)
    }

    pub fn kw_if(&self) -> Symbol {
        Symbol::from_u32(1)
    }

    pub fn kw_else(&self) -> Symbol {
        Symbol::from_u32(2)
    }

    pub fn kw_return(&self) -> Symbol {
        Symbol::from_u32(3)
    }

    /// The one built-in function, `print`. Not a keyword syntactically
    /// (it's called like any user-defined function — spec section 6) but
    /// pre-interned for the same reason the keywords are: the semantic
    /// analyzer and code generator both need to recognize it by symbol
    /// identity, not by re-comparing strings.
    pub fn kw_print(&self) -> Symbol {
        Symbol::from_u32(4)
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}
