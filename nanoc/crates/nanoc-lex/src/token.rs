//! The token alphabet this lexer produces.
//!
//! Every variant here corresponds to one alternative of the unified regex
//! pattern. There is no separate keyword token kind: `if`, `else`,
//! `return`, `int`, and `print` are lexed as plain [`TokenKind::Identifier`]s,
//! and it is up to the parser to compare their [`nanoc_util::Symbol`]
//! against the interner's known keywords (see `nanoc_util::symbol::Interner`)
//! — this lexer has no concept of keywords at all.

use nanoc_util::{Span, Symbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier(Symbol),
    /// The lexeme `-?[0-9]+`, already parsed to a value. Held as `i64` so
    /// downstream stages can do arithmetic range checks; out-of-range
    /// literals are rejected at parse time, not silently wrapped.
    IntLiteral(i64),

    Comma,
    Semicolon,
    LeftParen,
    RightParen,
    /// `{` — named `left_bracket` rather than `left_brace`; it is a curly
    /// brace, not a square bracket (the dialect has no arrays).
    LeftBracket,
    /// `}`
    RightBracket,
    Plus,
    Minus,
    Star,
    Slash,
    Equals,
    Not,
    LessThan,
    GreaterThan,

    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}
