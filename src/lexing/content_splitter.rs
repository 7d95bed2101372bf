//! Content splitting
//!
//! Splits the body of a rule into plain words and units (word groups, alias,
//! slot and intent references), remembering for every item whether
//! whitespace separated it from the previous one. The generator relies on
//! that flag to decide whether to insert a space between two generated
//! fragments, so `a[b]` and `a [b]` must stay distinguishable.
//!
//! The scan is a single left-to-right pass over the characters with three
//! pieces of state: whether the previous character was an escape, whether
//! whitespace was seen since the last item, and the buffer of the item being
//! read. Units are handed to [`parse_unit`] once the scan is over. A sigil
//! only opens a unit when `[` follows it; otherwise it is part of a word.
//!
//! A choice (`{a/b}`, with an optional `&` after the brace and `?` before
//! the closing one) is taken whole up to its matching `}`; each option is
//! then split on its own, so choices nest.
//!
//! When the caller accepts an alternative slot value, an unescaped `=`
//! outside any unit ends the rule; what follows is the value name. With the
//! flag off, `=` is an ordinary character.

use serde::{Deserialize, Serialize};

use crate::error::{GrammarError, GrammarErrorKind};
use crate::lexing::line_classification::strip_comments;
use crate::lexing::tokens::UnitKind;
use crate::lexing::unit_modifiers::{parse_unit, GenerationModifiers, ParsedUnit};
use crate::location::{char_column, LineContext};
use crate::symbols;

/// A reference to a named unit (alias, slot or intent).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRef {
    pub name: String,
    pub variation: Option<String>,
    pub argument: Option<String>,
    pub modifiers: GenerationModifiers,
    pub leading_space: bool,
}

/// One item of a split rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ContentItem {
    Word {
        word: String,
        leading_space: bool,
    },
    WordGroup {
        words: String,
        modifiers: GenerationModifiers,
        leading_space: bool,
    },
    Alias(UnitRef),
    Slot(UnitRef),
    Intent(UnitRef),
    /// One of several alternatives, each a sequence of items.
    Choice {
        options: Vec<Vec<ContentItem>>,
        casegen: bool,
        randgen: bool,
        leading_space: bool,
    },
}

impl ContentItem {
    pub fn kind(&self) -> UnitKind {
        match self {
            ContentItem::Word { .. } => UnitKind::Word,
            ContentItem::WordGroup { .. } => UnitKind::WordGroup,
            ContentItem::Alias(_) => UnitKind::Alias,
            ContentItem::Slot(_) => UnitKind::Slot,
            ContentItem::Intent(_) => UnitKind::Intent,
            ContentItem::Choice { .. } => UnitKind::Choice,
        }
    }

    /// Whether whitespace preceded this item in the source.
    pub fn leading_space(&self) -> bool {
        match self {
            ContentItem::Word { leading_space, .. }
            | ContentItem::WordGroup { leading_space, .. }
            | ContentItem::Choice { leading_space, .. } => *leading_space,
            ContentItem::Alias(unit) | ContentItem::Slot(unit) | ContentItem::Intent(unit) => {
                unit.leading_space
            }
        }
    }

    /// The generation modifiers of a unit item; `None` for plain words and
    /// choices.
    pub fn modifiers(&self) -> Option<&GenerationModifiers> {
        match self {
            ContentItem::Word { .. } | ContentItem::Choice { .. } => None,
            ContentItem::WordGroup { modifiers, .. } => Some(modifiers),
            ContentItem::Alias(unit) | ContentItem::Slot(unit) | ContentItem::Intent(unit) => {
                Some(&unit.modifiers)
            }
        }
    }

    /// The item written back in surface syntax, without its leading space.
    pub fn surface(&self) -> String {
        self.surface_in(false)
    }

    fn surface_in(&self, in_choice: bool) -> String {
        match self {
            ContentItem::Word { word, .. } => escape_word(word, in_choice),
            ContentItem::Choice {
                options,
                casegen,
                randgen,
                ..
            } => {
                let body = options
                    .iter()
                    .map(|option| render(option, true))
                    .collect::<Vec<_>>()
                    .join(&symbols::CHOICE_SEP.to_string());
                let mut out = String::from(symbols::CHOICE_OPEN);
                if *casegen {
                    out.push(symbols::CASEGEN);
                } else if body.starts_with(symbols::CASEGEN) {
                    out.push(symbols::ESCAPE);
                }
                out.push_str(&body);
                if *randgen {
                    out.push(symbols::RANDGEN);
                }
                out.push(symbols::CHOICE_CLOSE);
                out
            }
            ContentItem::WordGroup {
                words, modifiers, ..
            } => ParsedUnit {
                kind: UnitKind::WordGroup,
                name: words.clone(),
                variation: None,
                argument: None,
                modifiers: modifiers.clone(),
            }
            .to_surface(),
            ContentItem::Alias(unit) | ContentItem::Slot(unit) | ContentItem::Intent(unit) => {
                ParsedUnit {
                    kind: self.kind(),
                    name: unit.name.clone(),
                    variation: unit.variation.clone(),
                    argument: unit.argument.clone(),
                    modifiers: unit.modifiers.clone(),
                }
                .to_surface()
            }
        }
    }
}

const WORD_SPECIALS: &[char] = &[
    symbols::COMMENT,
    symbols::ESCAPE,
    symbols::UNIT_OPEN,
    symbols::UNIT_CLOSE,
    symbols::ALIAS,
    symbols::SLOT,
    symbols::INTENT,
    symbols::ALT_SLOT_VALUE,
    symbols::CHOICE_OPEN,
    symbols::CHOICE_CLOSE,
];

/// Characters that end or separate options inside a choice.
const CHOICE_WORD_SPECIALS: &[char] = &[symbols::CHOICE_SEP, symbols::RANDGEN];

fn escape_word(word: &str, in_choice: bool) -> String {
    let mut out = String::with_capacity(word.len());
    for c in word.chars() {
        if c.is_whitespace()
            || WORD_SPECIALS.contains(&c)
            || (in_choice && CHOICE_WORD_SPECIALS.contains(&c))
        {
            out.push(symbols::ESCAPE);
        }
        out.push(c);
    }
    out
}

/// Rebuild rule text from split items, one space where `leading_space` is set.
pub fn render_items(items: &[ContentItem]) -> String {
    render(items, false)
}

fn render(items: &[ContentItem], in_choice: bool) -> String {
    let mut out = String::new();
    for item in items {
        if item.leading_space() {
            out.push(' ');
        }
        out.push_str(&item.surface_in(in_choice));
    }
    out
}

/// The result of splitting a rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    /// The name after `=`, when alternative slot values were accepted and one
    /// was present.
    pub alt_slot_value: Option<String>,
    pub items: Vec<ContentItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PieceKind {
    Word,
    Unit,
    Choice,
}

/// A raw piece of text found by the scan, before unit parsing.
#[derive(Debug)]
struct RawPiece {
    text: String,
    kind: PieceKind,
    leading_space: bool,
    column: usize,
}

#[derive(Default)]
struct Buffer {
    text: String,
    is_unit: bool,
    leading_space: bool,
    column: usize,
}

impl Buffer {
    fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// A lone unit-opening character, which may still grow into `~[`.
    fn is_lone_opener(&self) -> bool {
        let mut chars = self.text.chars();
        self.is_unit
            && matches!((chars.next(), chars.next()), (Some(c), None) if symbols::is_unit_start(c))
    }
}

struct Splitter {
    pieces: Vec<RawPiece>,
    buffer: Buffer,
    space_seen: bool,
}

impl Splitter {
    /// Start a new buffer at `column` unless one is already open.
    fn open(&mut self, column: usize, is_unit: bool) {
        if self.buffer.is_empty() {
            self.buffer = Buffer {
                text: String::new(),
                is_unit,
                leading_space: self.space_seen && !self.pieces.is_empty(),
                column,
            };
            self.space_seen = false;
        }
    }

    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let buffer = std::mem::take(&mut self.buffer);
        self.pieces.push(RawPiece {
            text: buffer.text,
            kind: if buffer.is_unit {
                PieceKind::Unit
            } else {
                PieceKind::Word
            },
            leading_space: buffer.leading_space,
            column: buffer.column,
        });
    }

    /// Record a whole `{...}` choice starting at `column`.
    fn push_choice(&mut self, text: &str, column: usize) {
        self.flush();
        self.pieces.push(RawPiece {
            text: text.to_string(),
            kind: PieceKind::Choice,
            leading_space: self.space_seen && !self.pieces.is_empty(),
            column,
        });
        self.space_seen = false;
    }
}

/// Byte index of the `}` closing the choice opened at byte `open`, or of
/// where the search gave up.
///
/// Braces inside units do not count; a comment ends the search.
fn find_choice_close(text: &str, open: usize) -> Result<usize, usize> {
    let mut depth = 0usize;
    let mut in_unit = false;
    let mut escaped = false;
    for (index, c) in text[open..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            symbols::ESCAPE => escaped = true,
            symbols::COMMENT => return Err(open + index),
            symbols::UNIT_OPEN => in_unit = true,
            symbols::UNIT_CLOSE => in_unit = false,
            symbols::CHOICE_OPEN if !in_unit => depth += 1,
            symbols::CHOICE_CLOSE if !in_unit => {
                depth -= 1;
                if depth == 0 {
                    return Ok(open + index);
                }
            }
            _ => {}
        }
    }
    Err(text.len())
}

/// The options of a choice body as `(column, text)` pairs, split on the
/// top-level `/`.
fn choice_options(body: &str) -> Vec<(usize, &str)> {
    let mut options = Vec::new();
    let mut start = (0, 0);
    let mut depth = 0usize;
    let mut in_unit = false;
    let mut escaped = false;
    for (column, (index, c)) in body.char_indices().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            symbols::ESCAPE => escaped = true,
            symbols::UNIT_OPEN => in_unit = true,
            symbols::UNIT_CLOSE => in_unit = false,
            symbols::CHOICE_OPEN if !in_unit => depth += 1,
            symbols::CHOICE_CLOSE if !in_unit => depth = depth.saturating_sub(1),
            symbols::CHOICE_SEP if !in_unit && depth == 0 => {
                options.push((start.0, &body[start.1..index]));
                start = (column + 1, index + c.len_utf8());
            }
            _ => {}
        }
    }
    options.push((start.0, &body[start.1..]));
    options
}

/// Whether the last character of `text` is an unescaped `target`.
fn ends_with_unescaped(text: &str, target: char) -> bool {
    let mut escaped = false;
    let mut last = false;
    for c in text.chars() {
        last = !escaped && c == target;
        escaped = !escaped && c == symbols::ESCAPE;
    }
    last
}

/// Split `text` into words and units.
///
/// `ctx` locates `text` within its line; use [`LineContext::shifted`] when
/// `text` does not start at column 0.
pub fn split_contents(
    text: &str,
    accept_alt_slot_value: bool,
    ctx: &LineContext,
) -> Result<Split, GrammarError> {
    let mut splitter = Splitter {
        pieces: Vec::new(),
        buffer: Buffer::default(),
        space_seen: false,
    };
    let mut escaped = false;
    let mut alt_slot_value = None;
    let mut resume_at = 0;

    for (column, (byte_index, c)) in text.char_indices().enumerate() {
        if byte_index < resume_at {
            continue;
        }
        if escaped {
            splitter.open(column - 1, false);
            if splitter.buffer.is_unit {
                splitter.buffer.text.push(symbols::ESCAPE);
            }
            splitter.buffer.text.push(c);
            escaped = false;
            continue;
        }

        if c.is_whitespace() {
            if splitter.buffer.is_unit {
                splitter.buffer.text.push(c);
            } else {
                splitter.flush();
                splitter.space_seen = true;
            }
            continue;
        }

        match c {
            symbols::COMMENT => break,
            symbols::ESCAPE => escaped = true,
            symbols::UNIT_CLOSE => {
                splitter.open(column, false);
                splitter.buffer.text.push(c);
                splitter.flush();
            }
            c if symbols::is_unit_start(c)
                && (c == symbols::UNIT_OPEN
                    || text[byte_index + c.len_utf8()..].starts_with(symbols::UNIT_OPEN)) =>
            {
                if !splitter.buffer.is_lone_opener() {
                    splitter.flush();
                }
                splitter.open(column, true);
                splitter.buffer.text.push(c);
            }
            symbols::CHOICE_OPEN if !splitter.buffer.is_unit => {
                let close = find_choice_close(text, byte_index).map_err(|stop| {
                    ctx.error(
                        GrammarErrorKind::UnterminatedOrUnmatchedLine,
                        char_column(text, stop),
                        "Unterminated choice: expected '}'",
                    )
                })?;
                resume_at = close + symbols::CHOICE_CLOSE.len_utf8();
                splitter.push_choice(&text[byte_index..resume_at], column);
            }
            symbols::CHOICE_CLOSE if !splitter.buffer.is_unit => {
                return Err(ctx.error(
                    GrammarErrorKind::UnterminatedOrUnmatchedLine,
                    column,
                    "Unmatched '}'",
                ))
            }
            symbols::ALT_SLOT_VALUE if accept_alt_slot_value && !splitter.buffer.is_unit => {
                let rest = &text[byte_index + c.len_utf8()..];
                let name = strip_comments(rest).trim();
                if name.is_empty() {
                    return Err(ctx.error(
                        GrammarErrorKind::EmptyName,
                        column,
                        "Alternative slot value name cannot be empty",
                    ));
                }
                alt_slot_value = Some(name.to_string());
                break;
            }
            _ => {
                splitter.open(column, false);
                splitter.buffer.text.push(c);
            }
        }
    }
    if escaped {
        // A trailing escape marker escapes nothing; keep it as text.
        splitter.open(text.chars().count() - 1, false);
        splitter.buffer.text.push(symbols::ESCAPE);
    }
    splitter.flush();

    let items = splitter
        .pieces
        .into_iter()
        .map(|piece| build_item(piece, ctx))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Split {
        alt_slot_value,
        items,
    })
}

fn build_item(piece: RawPiece, ctx: &LineContext) -> Result<ContentItem, GrammarError> {
    match piece.kind {
        PieceKind::Word => {
            return Ok(ContentItem::Word {
                word: piece.text,
                leading_space: piece.leading_space,
            })
        }
        PieceKind::Choice => {
            return build_choice(&piece.text, piece.leading_space, &ctx.shifted(piece.column))
        }
        PieceKind::Unit => {}
    }

    let unit_ctx = ctx.shifted(piece.column);
    let parsed = parse_unit(&piece.text, &unit_ctx)?;
    let ParsedUnit {
        kind,
        name,
        variation,
        argument,
        modifiers,
    } = parsed;

    let unit = |name, variation, argument, modifiers| UnitRef {
        name,
        variation,
        argument,
        modifiers,
        leading_space: piece.leading_space,
    };
    match kind {
        UnitKind::WordGroup => {
            if variation.is_some() {
                return Err(unit_ctx.error(
                    GrammarErrorKind::WordGroupHasVariation,
                    0,
                    format!(
                        "Word groups cannot have a variation as found with word group '{}'",
                        name
                    ),
                ));
            }
            Ok(ContentItem::WordGroup {
                words: name,
                modifiers,
                leading_space: piece.leading_space,
            })
        }
        UnitKind::Alias => Ok(ContentItem::Alias(unit(name, variation, argument, modifiers))),
        UnitKind::Slot => Ok(ContentItem::Slot(unit(name, variation, argument, modifiers))),
        UnitKind::Intent => Ok(ContentItem::Intent(unit(name, variation, argument, modifiers))),
        UnitKind::Word | UnitKind::Choice => Ok(ContentItem::Word {
            word: name,
            leading_space: piece.leading_space,
        }),
    }
}

/// Build a choice from its whole text, braces included; `ctx` starts at `{`.
fn build_choice(
    text: &str,
    leading_space: bool,
    ctx: &LineContext,
) -> Result<ContentItem, GrammarError> {
    let open = symbols::CHOICE_OPEN.len_utf8();
    let mut body = &text[open..text.len() - symbols::CHOICE_CLOSE.len_utf8()];
    let mut column = 1;

    let casegen = body.starts_with(symbols::CASEGEN);
    if casegen {
        body = &body[symbols::CASEGEN.len_utf8()..];
        column += 1;
    }
    let randgen = ends_with_unescaped(body, symbols::RANDGEN);
    if randgen {
        body = &body[..body.len() - symbols::RANDGEN.len_utf8()];
    }

    let options = choice_options(body)
        .into_iter()
        .map(|(offset, option)| {
            split_contents(option, false, &ctx.shifted(column + offset)).map(|split| split.items)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ContentItem::Choice {
        options,
        casegen,
        randgen,
        leading_space,
    })
}
