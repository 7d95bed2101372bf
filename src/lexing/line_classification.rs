//! Line Classification
//!
//! Decides which top-level production a line belongs to, and strips
//! trailing comments.
//!
//! Classification follows this order:
//! 1. Empty lines (nothing left once whitespace is trimmed)
//! 2. Comment lines
//! 3. Alias, slot and intent declarations (sigil at column 0)
//! 4. File inclusions (`|` at column 0)
//! 5. Everything else is a content (rule) line
//!
//! Declarations are recognized on the raw line, so an indented `~[a]` is a
//! rule referencing an alias, not a declaration.

use crate::lexing::tokens::LineType;
use crate::symbols;

/// Classify a line.
///
/// `stripped` is the line after the caller's preprocessing. When comments
/// have already been stripped from it, comment-only lines come out as
/// [`LineType::Empty`]; when they have not, they come out as
/// [`LineType::Comment`].
pub fn classify_line(raw: &str, stripped: &str) -> LineType {
    let content = stripped.trim();
    if content.is_empty() {
        return LineType::Empty;
    }
    if content.starts_with(symbols::COMMENT) {
        return LineType::Comment;
    }

    match raw.chars().next() {
        Some(symbols::ALIAS) => LineType::AliasDeclaration,
        Some(symbols::SLOT) => LineType::SlotDeclaration,
        Some(symbols::INTENT) => LineType::IntentDeclaration,
        Some(symbols::INCLUDE_FILE) => LineType::FileInclusion,
        _ => LineType::Content,
    }
}

/// Byte index of the first comment marker that is not escaped.
pub fn find_comment_start(text: &str) -> Option<usize> {
    let mut escaped = false;
    for (index, c) in text.char_indices() {
        if escaped {
            escaped = false;
        } else if c == symbols::ESCAPE {
            escaped = true;
        } else if c == symbols::COMMENT {
            return Some(index);
        }
    }
    None
}

/// Remove a trailing comment (and the whitespace before it).
///
/// Escaped comment markers are kept verbatim, escape included.
pub fn strip_comments(text: &str) -> &str {
    match find_comment_start(text) {
        Some(index) => text[..index].trim_end(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(line: &str) -> LineType {
        classify_line(line, strip_comments(line))
    }

    #[test]
    fn test_empty_lines() {
        assert_eq!(classify(""), LineType::Empty);
        assert_eq!(classify("    "), LineType::Empty);
        assert_eq!(classify("\t ; only a comment"), LineType::Empty);
    }

    #[test]
    fn test_comment_line_when_not_stripped() {
        assert_eq!(classify_line("  ; note", "  ; note"), LineType::Comment);
    }

    #[test]
    fn test_declarations() {
        assert_eq!(classify("~[greet]"), LineType::AliasDeclaration);
        assert_eq!(classify("@[city] ; cities"), LineType::SlotDeclaration);
        assert_eq!(classify("%[ask_weather](3)"), LineType::IntentDeclaration);
        assert_eq!(classify("|other.chatlex"), LineType::FileInclusion);
    }

    #[test]
    fn test_indented_declaration_is_content() {
        assert_eq!(classify("  ~[greet]"), LineType::Content);
        assert_eq!(classify("  hello there"), LineType::Content);
    }

    #[test]
    fn test_strip_comments() {
        assert_eq!(strip_comments("hello ; world"), "hello");
        assert_eq!(strip_comments("hello"), "hello");
        assert_eq!(strip_comments("abc\\; def"), "abc\\; def");
        assert_eq!(strip_comments("a\\\\; b"), "a\\\\");
    }
}
