//! Base tokenization
//!
//! Cuts a single line into raw character-class tokens with the logos lexer.
//! Raw tokens know nothing about the grammar: a `#` is a `Hash` whether it
//! marks a variation or sits in the middle of a word. The line tokenizer
//! decides what each raw token means from where it appears.

use logos::Logos;
use std::ops::Range;

/// Raw tokens of one line.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawToken {
    #[regex(r"[ \t]+")]
    Whitespace,

    /// An escape marker and the character it escapes
    #[regex(r"\\.")]
    Escape,
    /// An escape marker at the very end of the line
    #[token("\\")]
    Backslash,

    #[token(";")]
    Semicolon,
    #[token("~")]
    Tilde,
    #[token("@")]
    At,
    #[token("%")]
    Percent,
    #[token("[")]
    OpenBracket,
    #[token("]")]
    CloseBracket,
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token("#")]
    Hash,
    #[token("?")]
    Question,
    #[token("/")]
    Slash,
    #[token("&")]
    Ampersand,
    #[token("$")]
    Dollar,
    #[token("=")]
    Equals,
    #[token("|")]
    Pipe,
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,

    /// Run of characters with no meaning to the grammar
    #[regex(r"[^ \t\\;~@%\[\]{}#?/&$=|():,]+")]
    Text,
}

impl RawToken {
    /// Sigils that open a named unit when directly followed by `[`.
    pub fn is_sigil(&self) -> bool {
        matches!(self, RawToken::Tilde | RawToken::At | RawToken::Percent)
    }
}

/// Tokenize one line, pairing each raw token with its byte range.
///
/// Every byte of the line is covered by exactly one token, so the ranges can
/// be sliced back out of the line to rebuild it.
pub fn tokenize(line: &str) -> Vec<(RawToken, Range<usize>)> {
    let mut lexer = RawToken::lexer(line);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        // Every character matches one of the patterns above; an error can only
        // come from input logos cannot split, which we keep as plain text.
        let token = result.unwrap_or(RawToken::Text);
        tokens.push((token, lexer.span()));
    }

    tokens
}
