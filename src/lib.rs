//! # chatlex
//!
//! Front end for a sentence template language used to generate training
//! examples for intent classifiers. Templates declare aliases (`~[...]`),
//! slots (`@[...]`) and intents (`%[...]`), each followed by indented rules
//! mixing plain words, word groups, unit references and choices:
//!
//!     %[ask_weather](20)
//!         {what is/tell me} the weather in @[city]
//!
//!     @[city]
//!         Paris
//!         New York = NYC
//!
//! The crate offers two views of a template:
//!
//! - [`lexing`]: a line-by-line tokenizer producing labelled tokens that
//!   cover every character of the line, plus the string-level helpers
//!   (comment stripping, content splitting, unit modifier parsing).
//! - [`template`]: folding of a whole file into declarations and rules.
//!
//! Both stop at the first [`GrammarError`], which locates the problem by
//! file, line and column.

pub mod config;
pub mod error;
pub mod formats;
pub mod lexing;
pub mod location;
pub mod symbols;
pub mod template;
pub mod testing;

pub use config::{ChatlexConfig, LexerConfig};
pub use error::{GrammarError, GrammarErrorKind};
pub use lexing::{lex_document, LabelledToken, LexedLine, Lexer, LineType, TerminalType, UnitKind};
pub use location::LineContext;
pub use template::{parse_template, ParsedTemplate};
