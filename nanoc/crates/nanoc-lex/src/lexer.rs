//! Regex-driven tokenizer.
//!
//! The whole lexer is one scan over a single unified pattern built from the
//! alternation `identifier | integer | punctuator`. This dialect's whole
//! grammar fits one regex alternation, so rather than a hand-written,
//! character-at-a-time cursor walk, the `regex` crate drives the scan
//! directly.
//!
//! Matching is literal-minded about what the regex *doesn't* match: any
//! byte not covered by the pattern (whitespace, or anything else) is
//! simply not part of any match and is skipped, by iterating matches rather
//! than consuming the whole input.

use std::sync::OnceLock;

use nanoc_util::symbol::Interner;
use nanoc_util::Span;
use regex::Regex;
use thiserror::Error;

use crate::token::{Token, TokenKind};

/// The lexer's only failure mode: an integer lexeme too large for an
/// `i64`. The original program has no such limit (Python integers are
/// arbitrary precision); since every literal ultimately becomes a 64-bit
/// immediate operand in the generated assembly anyway, nanoc surfaces the
/// overflow as a fatal error here instead of wrapping it silently.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexError {
    #[error("integer literal `{lexeme}` does not fit in 64 bits")]
    IntegerOverflow { lexeme: String },
}

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"[A-Za-z][A-Za-z0-9_]*|-?[0-9]+|[,;(){}+\-*/=!<>]")
            .expect("token pattern is a fixed, valid regex")
    })
}

/// Tokenize `source`, interning every identifier lexeme through
/// `interner`, and terminate the returned vector with a single
/// [`TokenKind::Eof`] token — the token stream is always terminated by
/// exactly one `eof` token.
pub fn tokenize(source: &str, interner: &mut Interner) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut line: u32 = 1;
    let mut line_start: usize = 0;

    for m in token_pattern().find_iter(source) {
        advance_to(source, m.start(), &mut line, &mut line_start);

        let lexeme = m.as_str();
        let column = (m.start() - line_start + 1) as u32;
        let span = Span::new(m.start(), m.end(), line, column);

        let kind = classify(lexeme, interner)?;
        tokens.push(Token::new(kind, span));
    }

    advance_to(source, source.len(), &mut line, &mut line_start);
    let eof_column = (source.len() - line_start + 1) as u32;
    tokens.push(Token::new(TokenKind::Eof, Span::point(line, eof_column)));
    Ok(tokens)
}

fn classify(lexeme: &str, interner: &mut Interner) -> Result<TokenKind, LexError> {
    let first = lexeme.as_bytes()[0];
    if first.is_ascii_alphabetic() {
        return Ok(TokenKind::Identifier(interner.intern(lexeme)));
    }
    if first == b'-' || first.is_ascii_digit() {
        let value = lexeme
            .parse::<i64>()
            .map_err(|_| LexError::IntegerOverflow {
                lexeme: lexeme.to_string(),
            })?;
        return Ok(TokenKind::IntLiteral(value));
    }
    Ok(match lexeme {
        "," => TokenKind::Comma,
        ";" => TokenKind::Semicolon,
        "(" => TokenKind::LeftParen,
        ")" => TokenKind::RightParen,
        "{" => TokenKind::LeftBracket,
        "}" => TokenKind::RightBracket,
        "+" => TokenKind::Plus,
        "-" => TokenKind::Minus,
        "*" => TokenKind::Star,
        "/" => TokenKind::Slash,
        "=" => TokenKind::Equals,
        "!" => TokenKind::Not,
        "<" => TokenKind::LessThan,
        ">" => TokenKind::GreaterThan,
        other => unreachable!("token pattern produced an unrecognized lexeme: {other:?}"),
    })
}

/// Advance `line`/`line_start` so they describe the line containing byte
/// offset `upto`, walking forward from wherever they last left off.
/// Matches (and the final end-of-input position) are visited in
/// increasing offset order, so this never needs to look backward.
fn advance_to(source: &str, upto: usize, line: &mut u32, line_start: &mut usize) {
    while let Some(rel) = source[*line_start..upto].find('\n') {
        *line_start += rel + 1;
        *line += 1;
    }
}
