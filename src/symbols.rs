//! Symbol table
//!
//! The single-character markers that make up the terminal vocabulary of the
//! template format. Every other module reads its markers from here.

/// Starts a comment that runs to the end of the line.
pub const COMMENT: char = ';';
/// Makes the next character literal.
pub const ESCAPE: char = '\\';

pub const ALIAS: char = '~';
pub const SLOT: char = '@';
pub const INTENT: char = '%';
pub const UNIT_OPEN: char = '[';
pub const UNIT_CLOSE: char = ']';

pub const VARIATION: char = '#';
pub const RANDGEN: char = '?';
pub const PERCENTGEN: char = '/';
pub const CASEGEN: char = '&';
pub const ARGUMENT: char = '$';

/// Separates a slot rule from the value it should be reported with.
pub const ALT_SLOT_VALUE: char = '=';

pub const INCLUDE_FILE: char = '|';

pub const CHOICE_OPEN: char = '{';
pub const CHOICE_CLOSE: char = '}';
/// Only a separator between `{` and `}`; elsewhere it is a plain character
/// (or the percentgen marker inside a unit).
pub const CHOICE_SEP: char = '/';

pub const ANNOTATION_OPEN: char = '(';
pub const ANNOTATION_CLOSE: char = ')';
pub const KEY_VALUE_CONNECTOR: char = ':';
pub const ANNOTATION_SEP: char = ',';

/// Returns true for the characters that open a unit: the generic `[` and the
/// alias, slot and intent sigils.
pub fn is_unit_start(c: char) -> bool {
    matches!(c, UNIT_OPEN | ALIAS | SLOT | INTENT)
}

/// Returns true for the sigils that prefix a named unit.
pub fn is_sigil(c: char) -> bool {
    matches!(c, ALIAS | SLOT | INTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_start_symbols() {
        for c in ['[', '~', '@', '%'] {
            assert!(is_unit_start(c), "{c} should open a unit");
        }
        for c in [']', '#', '?', 'a', ' '] {
            assert!(!is_unit_start(c), "{c} should not open a unit");
        }
    }

    #[test]
    fn test_sigils_exclude_bracket() {
        assert!(is_sigil(ALIAS));
        assert!(is_sigil(SLOT));
        assert!(is_sigil(INTENT));
        assert!(!is_sigil(UNIT_OPEN));
    }
}
