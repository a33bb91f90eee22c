//! Semantic analysis: scoped symbol resolution and arity checking over the
//! parser's AST.
//!
//! This crate does not build a separate HIR — the dialect has exactly one
//! type, so there is nothing for a type-inference pass to do beyond
//! resolving names and assigning frame slots, which [`analysis::analyze`]
//! does directly on the AST `nanoc-par` already built, writing slot
//! indices and each function's `nbr_locals` back into the tree's `Cell`
//! fields in place.

pub mod analysis;
pub mod error;
pub mod scope;

pub use analysis::analyze;
pub use error::SemError;
