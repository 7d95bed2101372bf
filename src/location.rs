//! Line context
//!
//! Every parsing function receives the location of the line it works on
//! explicitly instead of reading it from ambient state. A [`LineContext`]
//! names the file and line, keeps the full line text for diagnostics, and can
//! be shifted so that functions working on a slice of the line still report
//! columns relative to the whole line.

use crate::error::{GrammarError, GrammarErrorKind};

/// Where a piece of text comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineContext<'a> {
    /// Originating file name, as given by the caller.
    pub file: &'a str,
    /// 1-based line number.
    pub line_number: usize,
    /// The complete line, used as the offending text in errors.
    pub text: &'a str,
    offset: usize,
}

impl<'a> LineContext<'a> {
    pub fn new(file: &'a str, line_number: usize, text: &'a str) -> Self {
        LineContext {
            file,
            line_number,
            text,
            offset: 0,
        }
    }

    /// A context for a slice starting `columns` characters further into the
    /// line.
    pub fn shifted(&self, columns: usize) -> Self {
        LineContext {
            offset: self.offset + columns,
            ..*self
        }
    }

    /// Column offset applied to every error built from this context.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Build a grammar error at `column` (relative to this context's slice).
    pub fn error(
        &self,
        kind: GrammarErrorKind,
        column: usize,
        message: impl Into<String>,
    ) -> GrammarError {
        GrammarError {
            kind,
            message: message.into(),
            file: self.file.to_string(),
            line: self.line_number,
            column: self.offset + column,
            line_text: self.text.to_string(),
        }
    }
}

/// Convert a byte index into `text` to a 0-based character column.
pub fn char_column(text: &str, byte_index: usize) -> usize {
    text[..byte_index].chars().count()
}
