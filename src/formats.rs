//! Output formats for lexed templates
//!
//! Token streams can be rendered for inspection (one row per token, or JSON)
//! and joined back into source text with the detokenizer.

pub mod detokenizer;
pub mod json;
pub mod registry;
pub mod table;

pub use detokenizer::{detokenize, detokenize_lines, ToTemplateString};
pub use json::JsonFormatter;
pub use registry::{FormatError, FormatRegistry, Formatter};
pub use table::TableFormatter;
