//! nanoc-util - shared foundation types for the nanoc compiler.
//!
//! Every other `nanoc-*` crate depends on this one for two things: source
//! locations ([`span`]) and interned identifiers ([`symbol`]). There is no
//! shared error module here — each pipeline phase (`nanoc-lex`, `nanoc-par`,
//! `nanoc-sem`, `nanoc-gen`) defines its own `thiserror` enum directly, and
//! `nanoc-drv` aggregates them at the binary boundary.
//!
//! # Why no global state
//!
//! A compiler frontend commonly reaches for a process-wide interner so any
//! thread can intern without plumbing a handle around. This compiler never
//! needs that: compilation is single-threaded and processes exactly one
//! source file per invocation (see the driver crate), so every piece of
//! mutable state here — the [`symbol::Interner`], the function/variable
//! tables in `nanoc-sem`, the temp/label counters in `nanoc-ir` — is owned
//! by a session value that lives for one compilation and is then dropped.
//! There is no `static`, no `lazy_static`, no `OnceLock` anywhere in this
//! crate.

pub mod span;
pub mod symbol;

pub use span::Span;
pub use symbol::{Interner, Symbol};
