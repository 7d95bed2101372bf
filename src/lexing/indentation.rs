//! Indentation tracking
//!
//! All rules of a declaration must be indented exactly like its first rule.
//! The first rule after a declaration establishes the width (any width is
//! accepted); every sibling rule is checked against it until the caller
//! resets the tracker at the next declaration.

use crate::error::{GrammarError, GrammarErrorKind};
use crate::location::LineContext;

/// `line` without its indentation. Only spaces and tabs indent a rule.
pub fn strip_indentation(line: &str) -> &str {
    line.trim_start_matches(|c: char| c == ' ' || c == '\t')
}

/// Check the indentation of `raw` against an established width.
///
/// The line's indentation is the number of characters `stripped` lost
/// compared to `raw`. Returns the width that is established after this line.
pub fn check_indentation(
    established: Option<usize>,
    raw: &str,
    stripped: &str,
    ctx: &LineContext,
) -> Result<usize, GrammarError> {
    let current = raw.chars().count().saturating_sub(stripped.chars().count());
    match established {
        None => Ok(current),
        Some(expected) if expected == current => Ok(current),
        Some(expected) => Err(ctx.error(
            GrammarErrorKind::IndentationMismatch,
            expected,
            format!(
                "Incorrect indentation: expected {} characters, found {}",
                expected, current
            ),
        )),
    }
}

/// Indentation state of one declaration block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndentationTracker {
    established: Option<usize>,
}

impl IndentationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The width set by the block's first rule, if one was seen.
    pub fn established(&self) -> Option<usize> {
        self.established
    }

    /// Forget the established width; call at every new declaration.
    pub fn reset(&mut self) {
        self.established = None;
    }

    /// Check a rule line, establishing the width on the first call.
    pub fn check(
        &mut self,
        raw: &str,
        stripped: &str,
        ctx: &LineContext,
    ) -> Result<usize, GrammarError> {
        let width = check_indentation(self.established, raw, stripped, ctx)?;
        self.established = Some(width);
        Ok(width)
    }
}
