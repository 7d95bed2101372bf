//! JSON format for lexed lines, via serde.

use super::registry::{FormatError, Formatter};
use crate::lexing::LexedLine;

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn serialize(&self, lines: &[LexedLine]) -> Result<String, FormatError> {
        serde_json::to_string_pretty(lines)
            .map_err(|err| FormatError::SerializationError(err.to_string()))
    }

    fn description(&self) -> &str {
        "Lexed lines as a JSON array"
    }
}
