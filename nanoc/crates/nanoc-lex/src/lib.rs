//! Lexical analysis: source text to a flat token stream.
//!
//! The entire lexer is [`lexer::tokenize`] plus the [`token::TokenKind`]
//! alphabet it produces. There is no `Lexer` struct holding cursor state
//! across calls — tokenizing a whole file is one function call, matching
//! the batch, single-pass nature of the rest of the pipeline (spec
//! section 5).

pub mod lexer;
pub mod token;

pub use lexer::{tokenize, LexError};
pub use token::{Token, TokenKind};
