//! Detokenizer
//!
//! Joins labelled tokens back into the text they were cut from. Tokens keep
//! their raw text, so this is the inverse of lexing a line.

use crate::lexing::{LabelledToken, LexedLine};

/// Trait for converting a token back to its source text
pub trait ToTemplateString {
    fn to_template_string(&self) -> String;
}

impl ToTemplateString for LabelledToken {
    fn to_template_string(&self) -> String {
        self.text.clone()
    }
}

/// Rebuild one line from its tokens.
pub fn detokenize(tokens: &[LabelledToken]) -> String {
    tokens.iter().map(|token| token.text.as_str()).collect()
}

/// Rebuild a document, one line per lexed line.
pub fn detokenize_lines(lines: &[LexedLine]) -> String {
    lines
        .iter()
        .map(|line| detokenize(&line.tokens))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexing::{lex_document, Lexer, TerminalType};
    use crate::testing::factories::mk_tokens;

    #[test]
    fn test_detokenize_tokens() {
        let tokens = mk_tokens(&[
            (TerminalType::Indentation, "  "),
            (TerminalType::Word, "hi"),
            (TerminalType::Whitespace, " "),
            (TerminalType::Comment, "; there"),
        ]);
        assert_eq!(detokenize(&tokens), "  hi ; there");
        assert_eq!(tokens[1].to_template_string(), "hi");
    }

    #[test]
    fn test_detokenize_lexed_line() {
        let mut lexer = Lexer::new("test");
        lexer.lex("@[city#short]").unwrap();
        let line = "  {New York/Paris?} [big &city]? = NY  ; comment";
        assert_eq!(detokenize(&lexer.lex(line).unwrap()), line);
    }

    #[test]
    fn test_detokenize_document() {
        let source = "| base.chatlex\n\n%[ask](3)\n    hello ~[you]\n~[you]\n    you";
        let lines = lex_document(source, "doc.chatlex").unwrap();
        assert_eq!(detokenize_lines(&lines), source);
    }
}
