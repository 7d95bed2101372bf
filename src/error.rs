//! Grammar errors
//!
//! Every failure of the front end is a [`GrammarError`]: a kind tag, a
//! human-readable message and the full location of the offending line. The
//! core never prints diagnostics; it only builds them and hands them back.

use std::fmt;

use serde::Serialize;

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GrammarErrorKind {
    /// A unit with a zero-length name (or content, for word groups).
    EmptyName,
    /// A `#` with nothing after it.
    EmptyVariation,
    /// A `/` percentage with nothing after it.
    EmptyPercentage,
    /// More than one unit where exactly one was expected.
    MultipleUnitsInSingleSlot,
    /// A word group carrying a `#variation`.
    WordGroupHasVariation,
    /// A rule indented differently from the first rule of its block.
    IndentationMismatch,
    /// More than one generation count on an intent declaration.
    MultipleGenerationCounts,
    /// Trailing input after a complete production, or no production at all.
    UnterminatedOrUnmatchedLine,
    /// A file inclusion without a path.
    EmptyFilePath,
    /// A generation count that does not fit a `u64`.
    InvalidGenerationCount,
    /// `=` outside a slot rule while the lexer runs in strict mode.
    MisplacedSlotValueMarker,
}

impl fmt::Display for GrammarErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GrammarErrorKind::EmptyName => "empty-name",
            GrammarErrorKind::EmptyVariation => "empty-variation",
            GrammarErrorKind::EmptyPercentage => "empty-percentage",
            GrammarErrorKind::MultipleUnitsInSingleSlot => "multiple-units",
            GrammarErrorKind::WordGroupHasVariation => "word-group-variation",
            GrammarErrorKind::IndentationMismatch => "indentation-mismatch",
            GrammarErrorKind::MultipleGenerationCounts => "multiple-generation-counts",
            GrammarErrorKind::UnterminatedOrUnmatchedLine => "unmatched-line",
            GrammarErrorKind::EmptyFilePath => "empty-file-path",
            GrammarErrorKind::InvalidGenerationCount => "invalid-generation-count",
            GrammarErrorKind::MisplacedSlotValueMarker => "misplaced-slot-value-marker",
        };
        write!(f, "{}", name)
    }
}

/// A syntax error with the location needed to render a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrammarError {
    pub kind: GrammarErrorKind,
    pub message: String,
    pub file: String,
    /// 1-based line number.
    pub line: usize,
    /// 0-based character column within the line.
    pub column: usize,
    pub line_text: String,
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}]",
            self.file, self.line, self.column, self.message, self.kind
        )
    }
}

impl std::error::Error for GrammarError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GrammarError {
            kind: GrammarErrorKind::EmptyVariation,
            message: "Variation must be named".to_string(),
            file: "intents.chatlex".to_string(),
            line: 12,
            column: 5,
            line_text: "  ~[a#]".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "intents.chatlex:12:5: Variation must be named [empty-variation]"
        );
    }
}
