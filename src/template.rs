//! Template folding
//!
//! Reads a whole template into declarations and their rules, using the
//! string-level helpers of [`lexing`](crate::lexing) rather than the token
//! stream: comments are stripped, declaration headers go through
//! [`parse_unit`], rule bodies through [`split_contents`].
//!
//!     | other_file.chatlex
//!
//!     %[ask_weather](20)
//!         what is the weather in @[city]
//!
//!     @[city]
//!         Paris
//!         New York = NYC
//!
//! File inclusions are recorded, not followed.

use serde::{Deserialize, Serialize};

use crate::config::LexerConfig;
use crate::error::{GrammarError, GrammarErrorKind};
use crate::lexing::content_splitter::{split_contents, ContentItem};
use crate::lexing::generation_count::find_generation_count;
use crate::lexing::indentation::{strip_indentation, IndentationTracker};
use crate::lexing::line_classification::{classify_line, strip_comments};
use crate::lexing::tokens::{LineType, UnitKind};
use crate::lexing::unit_modifiers::parse_unit;
use crate::location::{char_column, LineContext};
use crate::symbols;

/// The header of a declaration block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationLine {
    pub kind: UnitKind,
    pub name: String,
    pub variation: Option<String>,
    pub casegen: bool,
    pub argument: Option<String>,
    /// Number of examples asked for; intents only.
    pub generation_count: Option<u64>,
}

impl DeclarationLine {
    /// Parse a declaration line (`~[name]`, `@[name#var]`, `%[name](3)`).
    pub fn parse(line: &str, ctx: &LineContext) -> Result<DeclarationLine, GrammarError> {
        let stripped = strip_comments(line);
        let kind = match classify_line(line, stripped).declared_kind() {
            Some(kind) => kind,
            None => {
                return Err(ctx.error(
                    GrammarErrorKind::UnterminatedOrUnmatchedLine,
                    0,
                    "Expected an alias, slot or intent declaration",
                ))
            }
        };

        let unit = parse_unit(stripped, ctx)?;
        if unit.modifiers.randgen.is_some() {
            let column = find_unescaped(stripped, symbols::RANDGEN)
                .map_or(0, |index| char_column(stripped, index));
            return Err(ctx.error(
                GrammarErrorKind::UnterminatedOrUnmatchedLine,
                column,
                "Declarations cannot have a random generation modifier",
            ));
        }

        let mut end =
            find_unescaped(stripped, symbols::UNIT_CLOSE).map_or(stripped.len(), |i| i + 1);
        if kind == UnitKind::Intent && stripped[end..].starts_with(symbols::ANNOTATION_OPEN) {
            end = skip_annotation(stripped, end, ctx)?;
        }
        let rest = trim_blanks(&stripped[end..]);
        if let Some(found) = rest.chars().next() {
            return Err(ctx.error(
                GrammarErrorKind::UnterminatedOrUnmatchedLine,
                char_column(stripped, stripped.len() - rest.len()),
                format!("Expected end of line, found '{}'", found),
            ));
        }

        let generation_count = if kind == UnitKind::Intent {
            find_generation_count(stripped, ctx)?
        } else {
            None
        };

        Ok(DeclarationLine {
            kind,
            name: unit.name,
            variation: unit.variation,
            casegen: unit.modifiers.casegen,
            argument: unit.argument,
            generation_count,
        })
    }
}

/// Byte index of the first unescaped `target` in `text`.
fn find_unescaped(text: &str, target: char) -> Option<usize> {
    let mut escaped = false;
    for (index, c) in text.char_indices() {
        if escaped {
            escaped = false;
        } else if c == symbols::ESCAPE {
            escaped = true;
        } else if c == target {
            return Some(index);
        }
    }
    None
}

fn trim_blanks(text: &str) -> &str {
    text.trim_start_matches(|c: char| c == ' ' || c == '\t')
}

/// Check the `(3)` or `(key: value, other)` annotation opening at byte
/// `open` and return the byte just past its `)`.
fn skip_annotation(text: &str, open: usize, ctx: &LineContext) -> Result<usize, GrammarError> {
    let inner_start = open + symbols::ANNOTATION_OPEN.len_utf8();
    let close = match find_unescaped(&text[inner_start..], symbols::ANNOTATION_CLOSE) {
        Some(offset) => inner_start + offset,
        None => {
            return Err(ctx.error(
                GrammarErrorKind::UnterminatedOrUnmatchedLine,
                char_column(text, text.len()),
                "Expected ')' to close the annotation",
            ))
        }
    };

    let mut entry_start = inner_start;
    for entry in text[inner_start..close].split(symbols::ANNOTATION_SEP) {
        let parts: Vec<&str> = entry.split(symbols::KEY_VALUE_CONNECTOR).collect();
        let well_formed = parts.len() <= 2
            && parts.iter().all(|part| {
                let part = trim_blanks(part).trim_end_matches(|c: char| c == ' ' || c == '\t');
                !part.is_empty()
                    && !part.contains(|c: char| {
                        c == ' ' || c == '\t' || c == symbols::ANNOTATION_OPEN
                    })
            });
        if !well_formed {
            return Err(ctx.error(
                GrammarErrorKind::UnterminatedOrUnmatchedLine,
                char_column(text, entry_start),
                "Expected an annotation entry (a value or 'key: value')",
            ));
        }
        entry_start += entry.len() + symbols::ANNOTATION_SEP.len_utf8();
    }

    let end = close + symbols::ANNOTATION_CLOSE.len_utf8();
    if text[end..].starts_with(symbols::ANNOTATION_OPEN) {
        return Err(ctx.error(
            GrammarErrorKind::MultipleGenerationCounts,
            char_column(text, end),
            "Expected only one annotation (and number of generation asked)",
        ));
    }
    Ok(end)
}

/// One rule of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// 1-based line the rule was read from.
    pub line_number: usize,
    pub alt_slot_value: Option<String>,
    pub items: Vec<ContentItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationBlock {
    pub declaration: DeclarationLine,
    pub rules: Vec<Rule>,
}

/// Everything read from one template file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTemplate {
    /// Paths of included files, in order of appearance.
    pub includes: Vec<String>,
    pub declarations: Vec<DeclarationBlock>,
}

impl ParsedTemplate {
    /// Find a declaration by kind and name (any variation).
    pub fn find(&self, kind: UnitKind, name: &str) -> Option<&DeclarationBlock> {
        self.declarations
            .iter()
            .find(|block| block.declaration.kind == kind && block.declaration.name == name)
    }
}

/// Read a template with the default lexer configuration.
pub fn parse_template(source: &str, file_name: &str) -> Result<ParsedTemplate, GrammarError> {
    parse_template_with_config(source, file_name, &LexerConfig::default())
}

pub fn parse_template_with_config(
    source: &str,
    file_name: &str,
    config: &LexerConfig,
) -> Result<ParsedTemplate, GrammarError> {
    let mut template = ParsedTemplate::default();
    let mut tracker = IndentationTracker::new();
    let mut in_block = false;

    for (index, line) in source.lines().enumerate() {
        let ctx = LineContext::new(file_name, index + 1, line);
        let stripped = strip_comments(line);

        match classify_line(line, stripped) {
            LineType::Empty | LineType::Comment => {}
            LineType::FileInclusion => {
                let path = stripped[symbols::INCLUDE_FILE.len_utf8()..].trim();
                if path.is_empty() {
                    return Err(ctx.error(
                        GrammarErrorKind::EmptyFilePath,
                        1,
                        "Invalid file path: a file path cannot be 0 characters long",
                    ));
                }
                tracing::debug!(file = file_name, path, "recorded file inclusion");
                template.includes.push(path.to_string());
                in_block = false;
            }
            LineType::AliasDeclaration
            | LineType::SlotDeclaration
            | LineType::IntentDeclaration => {
                let declaration = DeclarationLine::parse(line, &ctx)?;
                tracing::debug!(
                    file = file_name,
                    line = ctx.line_number,
                    kind = %declaration.kind,
                    name = %declaration.name,
                    "declaration"
                );
                template.declarations.push(DeclarationBlock {
                    declaration,
                    rules: Vec::new(),
                });
                tracker.reset();
                in_block = true;
            }
            LineType::Content => {
                let block = match template.declarations.last_mut() {
                    Some(block) if in_block => block,
                    _ => {
                        return Err(ctx.error(
                            GrammarErrorKind::UnterminatedOrUnmatchedLine,
                            0,
                            "Couldn't parse the line: rules must follow an alias, slot or intent declaration",
                        ))
                    }
                };

                let content = strip_indentation(line);
                if content.len() == line.len() && config.require_rule_indentation {
                    return Err(ctx.error(
                        GrammarErrorKind::UnterminatedOrUnmatchedLine,
                        0,
                        "Couldn't parse the line: rules must be indented",
                    ));
                }
                let width = tracker.check(line, content, &ctx)?;
                let body = strip_comments(content).trim_end();

                let accept_alt_slot_value = block.declaration.kind == UnitKind::Slot;
                let split = split_contents(body, accept_alt_slot_value, &ctx.shifted(width))?;
                block.rules.push(Rule {
                    line_number: ctx.line_number,
                    alt_slot_value: split.alt_slot_value,
                    items: split.items,
                });
            }
        }
    }

    Ok(template)
}
