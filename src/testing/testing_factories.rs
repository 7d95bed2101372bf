//! Test factories for labelled tokens and line contexts

use crate::lexing::{LabelledToken, TerminalType};
use crate::location::LineContext;

/// Make a single labelled token
pub fn mk_token(terminal: TerminalType, text: &str) -> LabelledToken {
    LabelledToken::new(terminal, text)
}

/// Make a vector of labelled tokens from a list of (terminal, text)
pub fn mk_tokens(specs: &[(TerminalType, &str)]) -> Vec<LabelledToken> {
    specs
        .iter()
        .map(|(terminal, text)| mk_token(*terminal, text))
        .collect()
}

/// A context for line 1 of a file named "test"
pub fn mk_ctx(line: &str) -> LineContext<'_> {
    LineContext::new("test", 1, line)
}

/// The terminals of a token stream, in order
pub fn terminals(tokens: &[LabelledToken]) -> Vec<TerminalType> {
    tokens.iter().map(|token| token.terminal).collect()
}
