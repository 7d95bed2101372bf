//! Table format: one row per token, prefixed with its line number.
//!
//!     2  <intent-decl-start> "%["
//!     2  <unit-identifier> "ask"
//!
//! Empty lines produce no rows.

use super::registry::{FormatError, Formatter};
use crate::lexing::LexedLine;

pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn name(&self) -> &str {
        "table"
    }

    fn serialize(&self, lines: &[LexedLine]) -> Result<String, FormatError> {
        Ok(to_table_str(lines))
    }

    fn description(&self) -> &str {
        "One token per row, with its line number and terminal"
    }
}

pub fn to_table_str(lines: &[LexedLine]) -> String {
    let mut out = String::new();
    for line in lines {
        for token in &line.tokens {
            out.push_str(&format!("{}  {}\n", line.line_number, token));
        }
    }
    out
}
