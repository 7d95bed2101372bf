//! Lexer
//!
//! This module holds the line-level front end of the template format.
//!
//! The pipeline for one line is:
//! 1. Raw tokenization with logos ./base_tokenization.rs
//! 2. Line classification (empty, comment, declaration, inclusion, rule)
//!    ./line_classification.rs
//! 3. The production for that line type, with the indentation of rules
//!    checked against their block ./tokenizer.rs, ./indentation.rs
//!
//! The string-level helpers are usable on their own and are what template
//! folding builds on:
//!     - content splitting of rule bodies ./content_splitter.rs
//!     - unit modifier parsing ./unit_modifiers.rs
//!     - generation counts on intent declarations ./generation_count.rs
//!
//! Lexing is strictly per line: the only state carried from one line to the
//! next is the open declaration block and its indentation, owned by a
//! [`Lexer`] value.

pub mod base_tokenization;
pub mod content_splitter;
pub mod generation_count;
pub mod indentation;
pub mod line_classification;
pub mod tokenizer;
pub mod tokens;
pub mod unit_modifiers;

pub use content_splitter::{render_items, split_contents, ContentItem, Split, UnitRef};
pub use generation_count::find_generation_count;
pub use indentation::{check_indentation, strip_indentation, IndentationTracker};
pub use line_classification::{classify_line, find_comment_start, strip_comments};
pub use tokenizer::{lex_document, lex_document_with_config, LexedLine, Lexer};
pub use tokens::{LabelledToken, LineType, TerminalType, UnitKind};
pub use unit_modifiers::{parse_unit, GenerationModifiers, ParsedUnit};
