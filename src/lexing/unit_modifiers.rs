//! Unit modifier parsing
//!
//! Parses one raw unit string such as `~[&name#variation$arg?randgen/50]` or
//! `[some words?]` into its parts:
//!
//!     [SIGIL] '[' ['&'] NAME ['#' VARIATION] ['$' ARGUMENT] ['?' [RANDGEN] ['/' PERCENT]] ']'
//!
//! The argument section only exists for named units; inside a word group `$`
//! is an ordinary character. Escaped characters are taken literally and the
//! escape marker is dropped.
//!
//! The parser is a plain character scanner so every error points at the exact
//! column that caused it.

use serde::{Deserialize, Serialize};

use crate::error::{GrammarError, GrammarErrorKind};
use crate::lexing::tokens::UnitKind;
use crate::location::LineContext;
use crate::symbols;

/// Generation modifiers shared by every kind of unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenerationModifiers {
    /// Generate case variations of the first letter.
    pub casegen: bool,
    /// `None` when the unit is always generated; `Some("")` for an anonymous
    /// random group; otherwise the name of the random group.
    pub randgen: Option<String>,
    /// Inclusion probability of the random group, as written.
    pub percentgen: Option<String>,
}

/// The parts of a unit string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedUnit {
    pub kind: UnitKind,
    /// The unit's name, or its words for a word group.
    pub name: String,
    pub variation: Option<String>,
    pub argument: Option<String>,
    pub modifiers: GenerationModifiers,
}

impl ParsedUnit {
    /// Write the unit back in surface syntax.
    pub fn to_surface(&self) -> String {
        let mut out = String::new();
        if let Some(sigil) = self.kind.sigil() {
            out.push(sigil);
        }
        out.push(symbols::UNIT_OPEN);
        if self.modifiers.casegen {
            out.push(symbols::CASEGEN);
        } else if self.name.starts_with(symbols::CASEGEN) {
            out.push(symbols::ESCAPE);
        }
        out.push_str(&escape_field(&self.name, NAME_SPECIALS));
        if let Some(variation) = &self.variation {
            out.push(symbols::VARIATION);
            out.push_str(&escape_field(variation, NAME_SPECIALS));
        }
        if let Some(argument) = &self.argument {
            out.push(symbols::ARGUMENT);
            out.push_str(&escape_field(argument, NAME_SPECIALS));
        }
        if let Some(randgen) = &self.modifiers.randgen {
            out.push(symbols::RANDGEN);
            out.push_str(&escape_field(randgen, RANDGEN_SPECIALS));
            if let Some(percentgen) = &self.modifiers.percentgen {
                out.push(symbols::PERCENTGEN);
                out.push_str(&escape_field(percentgen, RANDGEN_SPECIALS));
            }
        }
        out.push(symbols::UNIT_CLOSE);
        out
    }
}

const NAME_SPECIALS: &[char] = &[
    symbols::VARIATION,
    symbols::RANDGEN,
    symbols::ARGUMENT,
    symbols::UNIT_OPEN,
    symbols::UNIT_CLOSE,
    symbols::ESCAPE,
    symbols::COMMENT,
];

const RANDGEN_SPECIALS: &[char] = &[
    symbols::VARIATION,
    symbols::RANDGEN,
    symbols::PERCENTGEN,
    symbols::ARGUMENT,
    symbols::UNIT_OPEN,
    symbols::UNIT_CLOSE,
    symbols::ESCAPE,
    symbols::COMMENT,
];

/// Escape every character of `text` found in `specials`.
pub fn escape_field(text: &str, specials: &[char]) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if specials.contains(&c) {
            out.push(symbols::ESCAPE);
        }
        out.push(c);
    }
    out
}

/// Parse a unit string.
///
/// Only one unit may appear in `unit`; text after its closing bracket is
/// ignored unless it opens another unit, which is reported as
/// [`GrammarErrorKind::MultipleUnitsInSingleSlot`].
///
/// Word groups carrying a variation are accepted here; callers that build
/// word-group items reject them.
pub fn parse_unit(unit: &str, ctx: &LineContext) -> Result<ParsedUnit, GrammarError> {
    let chars: Vec<char> = unit.chars().collect();
    let mut scanner = Scanner { chars: &chars, pos: 0 };

    let kind = match scanner.peek().and_then(UnitKind::from_opening) {
        Some(kind) => kind,
        None => {
            return Err(ctx.error(
                GrammarErrorKind::UnterminatedOrUnmatchedLine,
                0,
                "Expected a unit starting with '[', '~[', '@[' or '%['",
            ))
        }
    };
    if let Some(sigil) = kind.sigil() {
        scanner.pos += 1;
        if scanner.peek() != Some(symbols::UNIT_OPEN) {
            return Err(ctx.error(
                GrammarErrorKind::UnterminatedOrUnmatchedLine,
                scanner.pos,
                format!("Expected '{}' after '{}'", symbols::UNIT_OPEN, sigil),
            ));
        }
    }
    scanner.pos += 1;

    let mut modifiers = GenerationModifiers::default();
    if scanner.peek() == Some(symbols::CASEGEN) {
        modifiers.casegen = true;
        scanner.pos += 1;
    }

    let name_stops: &[char] = if kind == UnitKind::WordGroup {
        &[
            symbols::VARIATION,
            symbols::RANDGEN,
            symbols::UNIT_OPEN,
            symbols::UNIT_CLOSE,
        ]
    } else {
        &[
            symbols::VARIATION,
            symbols::RANDGEN,
            symbols::ARGUMENT,
            symbols::UNIT_OPEN,
            symbols::UNIT_CLOSE,
        ]
    };
    let field_stops = &[
        symbols::VARIATION,
        symbols::RANDGEN,
        symbols::ARGUMENT,
        symbols::UNIT_OPEN,
        symbols::UNIT_CLOSE,
    ];
    let randgen_stops = &[
        symbols::VARIATION,
        symbols::RANDGEN,
        symbols::PERCENTGEN,
        symbols::ARGUMENT,
        symbols::UNIT_OPEN,
        symbols::UNIT_CLOSE,
    ];

    let name_column = scanner.pos;
    let name = scanner.read_field(name_stops);

    let mut variation = None;
    if scanner.peek() == Some(symbols::VARIATION) {
        let column = scanner.pos;
        scanner.pos += 1;
        variation = Some((column, scanner.read_field(field_stops)));
    }

    let mut argument = None;
    if kind != UnitKind::WordGroup && scanner.peek() == Some(symbols::ARGUMENT) {
        let column = scanner.pos;
        scanner.pos += 1;
        argument = Some((column, scanner.read_field(field_stops)));
    }

    let mut percentgen = None;
    if scanner.peek() == Some(symbols::RANDGEN) {
        scanner.pos += 1;
        modifiers.randgen = Some(scanner.read_field(randgen_stops));
        if scanner.peek() == Some(symbols::PERCENTGEN) {
            let column = scanner.pos;
            scanner.pos += 1;
            percentgen = Some((column, scanner.read_field(field_stops)));
        }
    }

    match scanner.peek() {
        Some(symbols::UNIT_CLOSE) => scanner.pos += 1,
        Some(c) => {
            return Err(ctx.error(
                GrammarErrorKind::UnterminatedOrUnmatchedLine,
                scanner.pos,
                format!("Unexpected '{}' inside {}", c, kind),
            ))
        }
        None => {
            return Err(ctx.error(
                GrammarErrorKind::UnterminatedOrUnmatchedLine,
                scanner.pos,
                format!("Unterminated {}: expected '{}'", kind, symbols::UNIT_CLOSE),
            ))
        }
    }

    if name.is_empty() {
        return Err(ctx.error(
            GrammarErrorKind::EmptyName,
            name_column,
            "Units must have a name (or a content for word groups)",
        ));
    }
    if let Some((column, text)) = &variation {
        if text.is_empty() {
            return Err(ctx.error(
                GrammarErrorKind::EmptyVariation,
                *column,
                "Variation must be named (e.g. [text#variation])",
            ));
        }
    }
    if let Some((column, text)) = &argument {
        if text.is_empty() {
            return Err(ctx.error(
                GrammarErrorKind::EmptyName,
                *column,
                "Argument must be named (e.g. ~[text$argument])",
            ));
        }
    }
    if let Some((column, text)) = &percentgen {
        if text.is_empty() {
            return Err(ctx.error(
                GrammarErrorKind::EmptyPercentage,
                *column,
                "Percentage for generation cannot be empty",
            ));
        }
    }

    if let Some(column) = scanner.find_unescaped(symbols::UNIT_OPEN) {
        return Err(ctx.error(
            GrammarErrorKind::MultipleUnitsInSingleSlot,
            column,
            "Expected only one unit here: only one declaration is allowed per line",
        ));
    }

    modifiers.percentgen = percentgen.map(|(_, text)| text);
    Ok(ParsedUnit {
        kind,
        name,
        variation: variation.map(|(_, text)| text),
        argument: argument.map(|(_, text)| text),
        modifiers,
    })
}

struct Scanner<'a> {
    chars: &'a [char],
    pos: usize,
}

impl Scanner<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Read up to (not including) the first unescaped stop character,
    /// resolving escapes.
    fn read_field(&mut self, stops: &[char]) -> String {
        let mut field = String::new();
        while let Some(c) = self.peek() {
            if c == symbols::ESCAPE {
                match self.chars.get(self.pos + 1) {
                    Some(&escaped) => {
                        field.push(escaped);
                        self.pos += 2;
                    }
                    None => {
                        field.push(c);
                        self.pos += 1;
                    }
                }
                continue;
            }
            if stops.contains(&c) {
                break;
            }
            field.push(c);
            self.pos += 1;
        }
        field
    }

    /// Column of the next unescaped `target` at or after the cursor.
    fn find_unescaped(&self, target: char) -> Option<usize> {
        let mut escaped = false;
        for (offset, &c) in self.chars[self.pos..].iter().enumerate() {
            if escaped {
                escaped = false;
            } else if c == symbols::ESCAPE {
                escaped = true;
            } else if c == target {
                return Some(self.pos + offset);
            }
        }
        None
    }
}
