//! Line tokenizer
//!
//! Turns each line of a template into labelled tokens. A line is first cut
//! into raw tokens by [`base_tokenization`](super::base_tokenization), then
//! classified, then handed to the production for its line type:
//!
//!     empty        := <whitespace>?
//!     comment      := <whitespace>? <comment>
//!     inclusion    := '|' <whitespace>? <file-path> trailer
//!     declaration  := decl-start unit-body decl-end annotation? trailer
//!     rule         := <indentation> rule-content slot-value? trailer
//!     trailer      := <whitespace>? <comment>? end-of-line
//!
//! Every character of an accepted line ends up in exactly one token, so the
//! tokens of a line can be joined back into the line
//! (see [`detokenize`](crate::formats::detokenize)).
//!
//! The lexer carries one piece of state between lines: the declaration block
//! currently open (its kind, and the indentation of its rules). Declarations
//! open a block, file inclusions close it.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::config::LexerConfig;
use crate::error::{GrammarError, GrammarErrorKind};
use crate::lexing::base_tokenization::{tokenize, RawToken};
use crate::lexing::indentation::IndentationTracker;
use crate::lexing::line_classification::classify_line;
use crate::lexing::tokens::{LabelledToken, LineType, TerminalType, UnitKind};
use crate::location::{char_column, LineContext};

/// The tokens of one line, with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexedLine {
    /// 1-based line number.
    pub line_number: usize,
    pub line_type: LineType,
    pub tokens: Vec<LabelledToken>,
}

/// Line-by-line tokenizer for one file.
#[derive(Debug, Clone)]
pub struct Lexer {
    file_name: String,
    config: LexerConfig,
    line_number: usize,
    block: Option<UnitKind>,
    indentation: IndentationTracker,
}

impl Lexer {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self::with_config(file_name, LexerConfig::default())
    }

    pub fn with_config(file_name: impl Into<String>, config: LexerConfig) -> Self {
        Lexer {
            file_name: file_name.into(),
            config,
            line_number: 0,
            block: None,
            indentation: IndentationTracker::new(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Number of the last line handed to the lexer (0 before the first).
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Kind of the declaration whose rules are being read.
    pub fn current_block(&self) -> Option<UnitKind> {
        self.block
    }

    /// Close the current declaration block.
    pub fn reset(&mut self) {
        self.block = None;
        self.indentation.reset();
    }

    /// Tokenize the next line.
    pub fn lex(&mut self, line: &str) -> Result<Vec<LabelledToken>, GrammarError> {
        self.lex_line(line).map(|lexed| lexed.tokens)
    }

    /// Tokenize the next line, keeping its number and type.
    pub fn lex_line(&mut self, line: &str) -> Result<LexedLine, GrammarError> {
        self.line_number += 1;
        let file_name = self.file_name.clone();
        let ctx = LineContext::new(&file_name, self.line_number, line);

        let line_type = classify_line(line, line);
        tracing::trace!(
            file = %file_name,
            line = self.line_number,
            %line_type,
            "classified line"
        );

        let result = self.lex_classified(line, line_type, ctx);
        match result {
            Ok(tokens) => Ok(LexedLine {
                line_number: self.line_number,
                line_type,
                tokens,
            }),
            Err(err) => {
                tracing::debug!(%err, "line rejected");
                Err(err)
            }
        }
    }

    fn lex_classified(
        &mut self,
        line: &str,
        line_type: LineType,
        ctx: LineContext,
    ) -> Result<Vec<LabelledToken>, GrammarError> {
        match line_type {
            LineType::Empty => Ok(lex_empty(line)),
            LineType::Comment => Ok(lex_comment_line(line)),
            LineType::FileInclusion => {
                let mut cursor = Cursor::new(line, ctx);
                lex_file_inclusion(&mut cursor)?;
                self.reset();
                Ok(cursor.out)
            }
            LineType::AliasDeclaration
            | LineType::SlotDeclaration
            | LineType::IntentDeclaration => {
                let kind = match line_type.declared_kind() {
                    Some(kind) => kind,
                    None => {
                        return Err(ctx.error(
                            GrammarErrorKind::UnterminatedOrUnmatchedLine,
                            0,
                            "Expected a declaration",
                        ))
                    }
                };
                let mut cursor = Cursor::new(line, ctx);
                lex_declaration(&mut cursor, kind)?;
                tracing::debug!(line = ctx.line_number, %kind, "opened declaration block");
                self.block = Some(kind);
                self.indentation.reset();
                Ok(cursor.out)
            }
            LineType::Content => self.lex_rule_line(line, ctx),
        }
    }

    fn lex_rule_line(
        &mut self,
        line: &str,
        ctx: LineContext,
    ) -> Result<Vec<LabelledToken>, GrammarError> {
        let block = match self.block {
            Some(kind) => kind,
            None => {
                return Err(ctx.error(
                    GrammarErrorKind::UnterminatedOrUnmatchedLine,
                    0,
                    "Couldn't parse the line: rules must follow an alias, slot or intent declaration",
                ))
            }
        };

        let mut cursor = Cursor::new(line, ctx);
        let mut tracker = self.indentation;
        if cursor.peek() == Some(RawToken::Whitespace) {
            cursor.emit_next(TerminalType::Indentation);
        } else if self.config.require_rule_indentation {
            return Err(ctx.error(
                GrammarErrorKind::UnterminatedOrUnmatchedLine,
                0,
                "Couldn't parse the line: it is neither an empty line, a comment, \
                 a file inclusion, a unit declaration nor an indented rule",
            ));
        }
        tracker.check(line, &line[cursor.byte_pos()..], &ctx)?;

        let mode = ContentMode {
            in_choice: false,
            slot_values: block == UnitKind::Slot,
            strict: self.config.strict_slot_value_marker,
        };
        lex_rule_content(&mut cursor, mode)?;
        if mode.slot_values && cursor.peek() == Some(RawToken::Equals) {
            lex_slot_value(&mut cursor)?;
        }
        lex_trailer(&mut cursor)?;

        self.indentation = tracker;
        Ok(cursor.out)
    }
}

/// Tokenize a whole source text with a fresh lexer.
///
/// Stops at the first grammar error.
pub fn lex_document(source: &str, file_name: &str) -> Result<Vec<LexedLine>, GrammarError> {
    lex_document_with_config(source, file_name, LexerConfig::default())
}

pub fn lex_document_with_config(
    source: &str,
    file_name: &str,
    config: LexerConfig,
) -> Result<Vec<LexedLine>, GrammarError> {
    let mut lexer = Lexer::with_config(file_name, config);
    source.lines().map(|line| lexer.lex_line(line)).collect()
}

/// Read position over the raw tokens of one line, collecting labelled tokens.
struct Cursor<'a> {
    line: &'a str,
    tokens: Vec<(RawToken, Range<usize>)>,
    pos: usize,
    ctx: LineContext<'a>,
    out: Vec<LabelledToken>,
}

impl<'a> Cursor<'a> {
    fn new(line: &'a str, ctx: LineContext<'a>) -> Self {
        Cursor {
            line,
            tokens: tokenize(line),
            pos: 0,
            ctx,
            out: Vec::new(),
        }
    }

    fn peek(&self) -> Option<RawToken> {
        self.peek_at(0)
    }

    fn peek_at(&self, ahead: usize) -> Option<RawToken> {
        self.tokens.get(self.pos + ahead).map(|(token, _)| *token)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Byte offset of the current token (line length at the end).
    fn byte_pos(&self) -> usize {
        self.byte_pos_of(self.pos)
    }

    fn byte_pos_of(&self, index: usize) -> usize {
        match self.tokens.get(index) {
            Some((_, span)) => span.start,
            None => self.line.len(),
        }
    }

    fn column(&self) -> usize {
        char_column(self.line, self.byte_pos())
    }

    /// Text covered by raw tokens `start..end`.
    fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.line[self.byte_pos_of(start)..self.byte_pos_of(end)]
    }

    fn emit(&mut self, terminal: TerminalType, start: usize, end: usize) {
        let text = self.slice(start, end);
        self.out.push(LabelledToken::new(terminal, text));
    }

    /// Emit the current raw token as `terminal` and move past it.
    fn emit_next(&mut self, terminal: TerminalType) {
        self.emit(terminal, self.pos, self.pos + 1);
        self.pos += 1;
    }

    /// Emit everything up to the end of the line as `terminal`.
    fn emit_rest(&mut self, terminal: TerminalType) {
        let end = self.tokens.len();
        self.emit(terminal, self.pos, end);
        self.pos = end;
    }

    fn error(&self, kind: GrammarErrorKind, message: impl Into<String>) -> GrammarError {
        self.ctx.error(kind, self.column(), message)
    }

    fn unexpected(&self, expected: &str) -> GrammarError {
        let found = match self.tokens.get(self.pos) {
            Some((_, span)) => format!("'{}'", &self.line[span.clone()]),
            None => "end of line".to_string(),
        };
        self.error(
            GrammarErrorKind::UnterminatedOrUnmatchedLine,
            format!("Expected {}, found {}", expected, found),
        )
    }

    /// Advance over tokens not in `stops`, returning the index where the run
    /// started.
    fn skip_until(&mut self, stops: &[RawToken]) -> usize {
        let start = self.pos;
        while let Some(token) = self.peek() {
            if stops.contains(&token) {
                break;
            }
            self.pos += 1;
        }
        start
    }
}

fn lex_empty(line: &str) -> Vec<LabelledToken> {
    if line.is_empty() {
        Vec::new()
    } else {
        vec![LabelledToken::new(TerminalType::Whitespace, line)]
    }
}

fn lex_comment_line(line: &str) -> Vec<LabelledToken> {
    let content = line.trim_start();
    let indent = &line[..line.len() - content.len()];
    let mut tokens = Vec::new();
    if !indent.is_empty() {
        tokens.push(LabelledToken::new(TerminalType::Whitespace, indent));
    }
    tokens.push(LabelledToken::new(TerminalType::Comment, content));
    tokens
}

/// `<whitespace>? <comment>? end-of-line`
fn lex_trailer(cursor: &mut Cursor) -> Result<(), GrammarError> {
    if cursor.peek() == Some(RawToken::Whitespace) {
        cursor.emit_next(TerminalType::Whitespace);
    }
    if cursor.peek() == Some(RawToken::Semicolon) {
        cursor.emit_rest(TerminalType::Comment);
    }
    if !cursor.at_end() {
        return Err(cursor.unexpected("end of line"));
    }
    Ok(())
}

fn lex_file_inclusion(cursor: &mut Cursor) -> Result<(), GrammarError> {
    cursor.emit_next(TerminalType::FileInclusionMarker);
    if cursor.peek() == Some(RawToken::Whitespace) {
        cursor.emit_next(TerminalType::Whitespace);
    }

    let start = cursor.skip_until(&[RawToken::Semicolon]);
    let mut end = cursor.pos;
    while end > start && cursor.tokens[end - 1].0 == RawToken::Whitespace {
        end -= 1;
    }
    cursor.pos = start;
    if end == start {
        return Err(cursor.error(
            GrammarErrorKind::EmptyFilePath,
            "Invalid file path: a file path cannot be 0 characters long",
        ));
    }
    cursor.emit(TerminalType::FilePath, start, end);
    cursor.pos = end;

    lex_trailer(cursor)
}

/// Where a unit appears; each place allows different sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnitSite {
    Declaration,
    Reference,
    WordGroup,
}

const NAME_STOPS: &[RawToken] = &[
    RawToken::Hash,
    RawToken::Question,
    RawToken::Dollar,
    RawToken::OpenBracket,
    RawToken::CloseBracket,
    RawToken::Semicolon,
];

const RANDGEN_STOPS: &[RawToken] = &[
    RawToken::Hash,
    RawToken::Question,
    RawToken::Slash,
    RawToken::Dollar,
    RawToken::OpenBracket,
    RawToken::CloseBracket,
    RawToken::Semicolon,
];

fn lex_declaration(cursor: &mut Cursor, kind: UnitKind) -> Result<(), GrammarError> {
    let (start_terminal, end_terminal) = match kind {
        UnitKind::Alias => (TerminalType::AliasDeclStart, TerminalType::AliasDeclEnd),
        UnitKind::Slot => (TerminalType::SlotDeclStart, TerminalType::SlotDeclEnd),
        _ => (TerminalType::IntentDeclStart, TerminalType::IntentDeclEnd),
    };

    let start = cursor.pos;
    cursor.pos += 1;
    if cursor.peek() != Some(RawToken::OpenBracket) {
        return Err(cursor.unexpected("'[' after the declaration sigil"));
    }
    cursor.pos += 1;
    cursor.emit(start_terminal, start, cursor.pos);

    lex_unit_body(cursor, UnitSite::Declaration, end_terminal)?;
    if kind == UnitKind::Intent {
        lex_annotation(cursor)?;
    }
    lex_trailer(cursor)
}

/// Everything between a unit's opening `[` and its closing `]`, inclusive of
/// the closing bracket.
fn lex_unit_body(
    cursor: &mut Cursor,
    site: UnitSite,
    end_terminal: TerminalType,
) -> Result<(), GrammarError> {
    if cursor.peek() == Some(RawToken::Ampersand) {
        cursor.emit_next(TerminalType::CasegenMarker);
    }

    if site == UnitSite::WordGroup {
        lex_group_words(cursor)?;
    } else {
        lex_field(
            cursor,
            TerminalType::UnitIdentifier,
            NAME_STOPS,
            GrammarErrorKind::EmptyName,
            "Units must have a name",
        )?;
    }

    if cursor.peek() == Some(RawToken::Hash) {
        if site == UnitSite::WordGroup {
            return Err(cursor.error(
                GrammarErrorKind::WordGroupHasVariation,
                "Word groups cannot have a variation",
            ));
        }
        cursor.emit_next(TerminalType::VariationMarker);
        lex_field(
            cursor,
            TerminalType::Variation,
            NAME_STOPS,
            GrammarErrorKind::EmptyVariation,
            "Variation must be named (e.g. ~[text#variation])",
        )?;
    }

    if site != UnitSite::WordGroup && cursor.peek() == Some(RawToken::Dollar) {
        cursor.emit_next(TerminalType::ArgMarker);
        let terminal = if site == UnitSite::Declaration {
            TerminalType::ArgName
        } else {
            TerminalType::ArgValue
        };
        lex_field(
            cursor,
            terminal,
            NAME_STOPS,
            GrammarErrorKind::EmptyName,
            "Argument must be named (e.g. ~[text$argument])",
        )?;
    }

    if cursor.peek() == Some(RawToken::Question) {
        if site == UnitSite::Declaration {
            return Err(cursor.error(
                GrammarErrorKind::UnterminatedOrUnmatchedLine,
                "Declarations cannot have a random generation modifier",
            ));
        }
        cursor.emit_next(TerminalType::RandgenMarker);
        let start = cursor.skip_until(RANDGEN_STOPS);
        if cursor.pos > start {
            cursor.emit(TerminalType::RandgenName, start, cursor.pos);
        }
        if cursor.peek() == Some(RawToken::Slash) {
            cursor.emit_next(TerminalType::PercentgenMarker);
            lex_field(
                cursor,
                TerminalType::Percentgen,
                NAME_STOPS,
                GrammarErrorKind::EmptyPercentage,
                "Percentage for generation cannot be empty",
            )?;
        }
    }

    if cursor.peek() != Some(RawToken::CloseBracket) {
        return Err(cursor.unexpected("']' to close the unit"));
    }
    cursor.emit_next(end_terminal);
    Ok(())
}

/// A non-empty run of tokens up to one of `stops`, emitted as one token.
fn lex_field(
    cursor: &mut Cursor,
    terminal: TerminalType,
    stops: &[RawToken],
    empty_kind: GrammarErrorKind,
    empty_message: &str,
) -> Result<(), GrammarError> {
    let start = cursor.skip_until(stops);
    if cursor.pos == start {
        return Err(cursor.error(empty_kind, empty_message));
    }
    cursor.emit(terminal, start, cursor.pos);
    Ok(())
}

/// Words and whitespace inside a word group.
fn lex_group_words(cursor: &mut Cursor) -> Result<(), GrammarError> {
    const GROUP_STOPS: &[RawToken] = &[
        RawToken::Hash,
        RawToken::Question,
        RawToken::OpenBracket,
        RawToken::CloseBracket,
        RawToken::Semicolon,
    ];

    let mut words = 0;
    while let Some(token) = cursor.peek() {
        if GROUP_STOPS.contains(&token) {
            break;
        }
        if token == RawToken::Whitespace {
            cursor.emit_next(TerminalType::Whitespace);
            continue;
        }
        let start = cursor.pos;
        while let Some(token) = cursor.peek() {
            if token == RawToken::Whitespace || GROUP_STOPS.contains(&token) {
                break;
            }
            cursor.pos += 1;
        }
        cursor.emit(TerminalType::Word, start, cursor.pos);
        words += 1;
    }

    if words == 0 {
        return Err(cursor.error(
            GrammarErrorKind::EmptyName,
            "Word groups must have a content",
        ));
    }
    Ok(())
}

/// `(3)` or `(key: value, other)` right after an intent declaration.
fn lex_annotation(cursor: &mut Cursor) -> Result<(), GrammarError> {
    const ENTRY_STOPS: &[RawToken] = &[
        RawToken::Whitespace,
        RawToken::Colon,
        RawToken::Comma,
        RawToken::OpenParen,
        RawToken::CloseParen,
        RawToken::Semicolon,
    ];

    if cursor.peek() != Some(RawToken::OpenParen) {
        return Ok(());
    }
    cursor.emit_next(TerminalType::AnnotationStart);

    loop {
        skip_whitespace(cursor);
        let start = cursor.skip_until(ENTRY_STOPS);
        if cursor.pos == start {
            return Err(cursor.unexpected("an annotation entry"));
        }
        let entry_end = cursor.pos;
        let has_key = match cursor.peek() {
            Some(RawToken::Colon) => true,
            Some(RawToken::Whitespace) => cursor.peek_at(1) == Some(RawToken::Colon),
            _ => false,
        };

        if has_key {
            cursor.emit(TerminalType::Key, start, entry_end);
            skip_whitespace(cursor);
            cursor.emit_next(TerminalType::KeyValueConnector);
            skip_whitespace(cursor);
            let value_start = cursor.skip_until(ENTRY_STOPS);
            if cursor.pos == value_start {
                return Err(cursor.unexpected("an annotation value"));
            }
            cursor.emit(TerminalType::Value, value_start, cursor.pos);
        } else {
            cursor.emit(TerminalType::Value, start, entry_end);
        }

        skip_whitespace(cursor);
        match cursor.peek() {
            Some(RawToken::Comma) => cursor.emit_next(TerminalType::Separator),
            Some(RawToken::CloseParen) => {
                cursor.emit_next(TerminalType::AnnotationEnd);
                break;
            }
            _ => return Err(cursor.unexpected("',' or ')' in the annotation")),
        }
    }

    if cursor.peek() == Some(RawToken::OpenParen) {
        return Err(cursor.error(
            GrammarErrorKind::MultipleGenerationCounts,
            "Expected only one annotation (and number of generation asked)",
        ));
    }
    Ok(())
}

fn skip_whitespace(cursor: &mut Cursor) {
    if cursor.peek() == Some(RawToken::Whitespace) {
        cursor.emit_next(TerminalType::Whitespace);
    }
}

#[derive(Debug, Clone, Copy)]
struct ContentMode {
    in_choice: bool,
    /// `=` ends the rule and introduces its slot value.
    slot_values: bool,
    /// `=` anywhere else is an error rather than a literal.
    strict: bool,
}

impl ContentMode {
    fn ends_at_equals(&self) -> bool {
        self.slot_values && !self.in_choice
    }
}

/// Words, whitespace, unit references, word groups and choices, up to the
/// end of the rule (or of the current choice option).
fn lex_rule_content(cursor: &mut Cursor, mode: ContentMode) -> Result<(), GrammarError> {
    while let Some(token) = cursor.peek() {
        match token {
            RawToken::Semicolon => return Ok(()),
            RawToken::Whitespace => {
                let next = cursor.peek_at(1);
                if !mode.in_choice && matches!(next, None | Some(RawToken::Semicolon)) {
                    return Ok(());
                }
                cursor.emit_next(TerminalType::Whitespace);
            }
            RawToken::OpenBracket => {
                cursor.emit_next(TerminalType::UnitRefStart);
                lex_unit_body(cursor, UnitSite::WordGroup, TerminalType::UnitRefEnd)?;
            }
            token if token.is_sigil() && cursor.peek_at(1) == Some(RawToken::OpenBracket) => {
                let start = cursor.pos;
                cursor.pos += 2;
                cursor.emit(TerminalType::UnitRefStart, start, cursor.pos);
                lex_unit_body(cursor, UnitSite::Reference, TerminalType::UnitRefEnd)?;
            }
            RawToken::OpenBrace => lex_choice(cursor, mode)?,
            RawToken::CloseBrace if mode.in_choice => return Ok(()),
            RawToken::Slash if mode.in_choice => return Ok(()),
            RawToken::Question
                if mode.in_choice && cursor.peek_at(1) == Some(RawToken::CloseBrace) =>
            {
                return Ok(())
            }
            RawToken::CloseBracket | RawToken::CloseBrace => {
                return Err(cursor.error(
                    GrammarErrorKind::UnterminatedOrUnmatchedLine,
                    format!("Unmatched '{}'", cursor.slice(cursor.pos, cursor.pos + 1)),
                ))
            }
            RawToken::Equals if mode.ends_at_equals() => return Ok(()),
            RawToken::Equals if mode.strict => {
                return Err(cursor.error(
                    GrammarErrorKind::MisplacedSlotValueMarker,
                    "Alternative slot values are only allowed in slot rules",
                ))
            }
            _ => lex_word(cursor, mode)?,
        }
    }
    Ok(())
}

/// Whether the raw token at `ahead` can continue a plain word.
fn is_word_piece(cursor: &Cursor, ahead: usize, mode: ContentMode) -> bool {
    let Some(token) = cursor.peek_at(ahead) else {
        return false;
    };
    match token {
        RawToken::Whitespace
        | RawToken::Semicolon
        | RawToken::OpenBracket
        | RawToken::CloseBracket
        | RawToken::OpenBrace
        | RawToken::CloseBrace => false,
        RawToken::Slash => !mode.in_choice,
        RawToken::Question => {
            !(mode.in_choice && cursor.peek_at(ahead + 1) == Some(RawToken::CloseBrace))
        }
        RawToken::Equals => !(mode.ends_at_equals() || mode.strict),
        token if token.is_sigil() => cursor.peek_at(ahead + 1) != Some(RawToken::OpenBracket),
        _ => true,
    }
}

fn lex_word(cursor: &mut Cursor, mode: ContentMode) -> Result<(), GrammarError> {
    let start = cursor.pos;
    while is_word_piece(cursor, 0, mode) {
        cursor.pos += 1;
    }
    if cursor.pos == start {
        return Err(cursor.unexpected("a word"));
    }
    cursor.emit(TerminalType::Word, start, cursor.pos);
    Ok(())
}

/// `{` ['&'] option ('/' option)* ['?'] `}`
fn lex_choice(cursor: &mut Cursor, mode: ContentMode) -> Result<(), GrammarError> {
    cursor.emit_next(TerminalType::ChoiceStart);
    if cursor.peek() == Some(RawToken::Ampersand) {
        cursor.emit_next(TerminalType::CasegenMarker);
    }

    let inner = ContentMode {
        in_choice: true,
        ..mode
    };
    loop {
        lex_rule_content(cursor, inner)?;
        match cursor.peek() {
            Some(RawToken::Slash) => cursor.emit_next(TerminalType::ChoiceSep),
            Some(RawToken::Question) => {
                cursor.emit_next(TerminalType::RandgenMarker);
                cursor.emit_next(TerminalType::ChoiceEnd);
                return Ok(());
            }
            Some(RawToken::CloseBrace) => {
                cursor.emit_next(TerminalType::ChoiceEnd);
                return Ok(());
            }
            _ => return Err(cursor.unexpected("'}' to close the choice")),
        }
    }
}

/// `= value` at the end of a slot rule.
fn lex_slot_value(cursor: &mut Cursor) -> Result<(), GrammarError> {
    cursor.emit_next(TerminalType::SlotValMarker);
    skip_whitespace(cursor);

    let start = cursor.skip_until(&[RawToken::Semicolon]);
    let mut end = cursor.pos;
    while end > start && cursor.tokens[end - 1].0 == RawToken::Whitespace {
        end -= 1;
    }
    cursor.pos = start;
    if end == start {
        return Err(cursor.error(
            GrammarErrorKind::EmptyName,
            "Alternative slot value name cannot be empty",
        ));
    }
    cursor.emit(TerminalType::SlotVal, start, end);
    cursor.pos = end;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::factories::mk_tokens;
    use crate::lexing::tokens::TerminalType::*;

    fn lex_after_declaration(
        declaration: &str,
        line: &str,
    ) -> Result<Vec<LabelledToken>, GrammarError> {
        let mut lexer = Lexer::new("test");
        lexer.lex(declaration).expect("declaration should lex");
        lexer.lex(line)
    }

    #[test]
    fn test_empty_and_blank_lines() {
        let mut lexer = Lexer::new("test");
        assert!(lexer.lex("").unwrap().is_empty());
        assert_eq!(lexer.lex("   ").unwrap(), mk_tokens(&[(Whitespace, "   ")]));
    }

    #[test]
    fn test_comment_line() {
        let mut lexer = Lexer::new("test");
        assert_eq!(
            lexer.lex("  ; a comment").unwrap(),
            mk_tokens(&[(Whitespace, "  "), (Comment, "; a comment")])
        );
    }

    #[test]
    fn test_file_inclusion() {
        let mut lexer = Lexer::new("test");
        assert_eq!(
            lexer.lex("| slots/cities.chatlex  ; cities").unwrap(),
            mk_tokens(&[
                (FileInclusionMarker, "|"),
                (Whitespace, " "),
                (FilePath, "slots/cities.chatlex"),
                (Whitespace, "  "),
                (Comment, "; cities"),
            ])
        );
    }

    #[test]
    fn test_file_inclusion_without_path() {
        let mut lexer = Lexer::new("test");
        let err = lexer.lex("|  ; nothing").unwrap_err();
        assert_eq!(err.kind, GrammarErrorKind::EmptyFilePath);
        assert_eq!(err.column, 3);
    }

    #[test]
    fn test_intent_declaration_with_count() {
        let mut lexer = Lexer::new("test");
        assert_eq!(
            lexer.lex("%[&ask_weather](20)").unwrap(),
            mk_tokens(&[
                (IntentDeclStart, "%["),
                (CasegenMarker, "&"),
                (UnitIdentifier, "ask_weather"),
                (IntentDeclEnd, "]"),
                (AnnotationStart, "("),
                (Value, "20"),
                (AnnotationEnd, ")"),
            ])
        );
        assert_eq!(lexer.current_block(), Some(UnitKind::Intent));
    }

    #[test]
    fn test_intent_declaration_with_annotation() {
        let mut lexer = Lexer::new("test");
        assert_eq!(
            lexer.lex("%[greet](train: 10, test : 2)").unwrap(),
            mk_tokens(&[
                (IntentDeclStart, "%["),
                (UnitIdentifier, "greet"),
                (IntentDeclEnd, "]"),
                (AnnotationStart, "("),
                (Key, "train"),
                (KeyValueConnector, ":"),
                (Whitespace, " "),
                (Value, "10"),
                (Separator, ","),
                (Whitespace, " "),
                (Key, "test"),
                (Whitespace, " "),
                (KeyValueConnector, ":"),
                (Whitespace, " "),
                (Value, "2"),
                (AnnotationEnd, ")"),
            ])
        );
    }

    #[test]
    fn test_second_annotation_is_rejected() {
        let mut lexer = Lexer::new("test");
        let err = lexer.lex("%[greet](3)(4)").unwrap_err();
        assert_eq!(err.kind, GrammarErrorKind::MultipleGenerationCounts);
        assert_eq!(err.column, 11);
    }

    #[test]
    fn test_alias_declaration_with_variation_and_argument() {
        let mut lexer = Lexer::new("test");
        assert_eq!(
            lexer.lex("~[greet#formal$who] ; hello").unwrap(),
            mk_tokens(&[
                (AliasDeclStart, "~["),
                (UnitIdentifier, "greet"),
                (VariationMarker, "#"),
                (Variation, "formal"),
                (ArgMarker, "$"),
                (ArgName, "who"),
                (AliasDeclEnd, "]"),
                (Whitespace, " "),
                (Comment, "; hello"),
            ])
        );
    }

    #[test]
    fn test_declaration_errors() {
        let mut lexer = Lexer::new("test");
        assert_eq!(
            lexer.lex("~[]").unwrap_err().kind,
            GrammarErrorKind::EmptyName
        );
        assert_eq!(
            lexer.lex("~[a#]").unwrap_err().kind,
            GrammarErrorKind::EmptyVariation
        );
        assert_eq!(
            lexer.lex("~greet").unwrap_err().kind,
            GrammarErrorKind::UnterminatedOrUnmatchedLine
        );
        assert_eq!(
            lexer.lex("@[city?]").unwrap_err().kind,
            GrammarErrorKind::UnterminatedOrUnmatchedLine
        );
        let err = lexer.lex("@[city] trailing").unwrap_err();
        assert_eq!(err.kind, GrammarErrorKind::UnterminatedOrUnmatchedLine);
        assert_eq!(err.column, 8);
        assert!(err.message.contains("end of line"));
    }

    #[test]
    fn test_alias_annotation_is_rejected() {
        let mut lexer = Lexer::new("test");
        let err = lexer.lex("~[greet](3)").unwrap_err();
        assert_eq!(err.kind, GrammarErrorKind::UnterminatedOrUnmatchedLine);
        assert_eq!(err.column, 8);
    }

    #[test]
    fn test_rule_with_references() {
        let tokens = lex_after_declaration("%[ask]", "  ~[&hi?g/50] @[city#short$x]").unwrap();
        assert_eq!(
            tokens,
            mk_tokens(&[
                (Indentation, "  "),
                (UnitRefStart, "~["),
                (CasegenMarker, "&"),
                (UnitIdentifier, "hi"),
                (RandgenMarker, "?"),
                (RandgenName, "g"),
                (PercentgenMarker, "/"),
                (Percentgen, "50"),
                (UnitRefEnd, "]"),
                (Whitespace, " "),
                (UnitRefStart, "@["),
                (UnitIdentifier, "city"),
                (VariationMarker, "#"),
                (Variation, "short"),
                (ArgMarker, "$"),
                (ArgValue, "x"),
                (UnitRefEnd, "]"),
            ])
        );
    }

    #[test]
    fn test_rule_with_word_group_and_choice() {
        let tokens =
            lex_after_declaration("~[greet]", "\thello [there you?] {&hi/hey ~[x]?}!").unwrap();
        assert_eq!(
            tokens,
            mk_tokens(&[
                (Indentation, "\t"),
                (Word, "hello"),
                (Whitespace, " "),
                (UnitRefStart, "["),
                (Word, "there"),
                (Whitespace, " "),
                (Word, "you"),
                (RandgenMarker, "?"),
                (UnitRefEnd, "]"),
                (Whitespace, " "),
                (ChoiceStart, "{"),
                (CasegenMarker, "&"),
                (Word, "hi"),
                (ChoiceSep, "/"),
                (Word, "hey"),
                (Whitespace, " "),
                (UnitRefStart, "~["),
                (UnitIdentifier, "x"),
                (UnitRefEnd, "]"),
                (RandgenMarker, "?"),
                (ChoiceEnd, "}"),
                (Word, "!"),
            ])
        );
    }

    #[test]
    fn test_word_group_with_variation() {
        let err = lex_after_declaration("~[a]", "  [b#c]").unwrap_err();
        assert_eq!(err.kind, GrammarErrorKind::WordGroupHasVariation);
        assert_eq!(err.column, 4);
    }

    #[test]
    fn test_literal_specials_in_words() {
        let tokens = lex_after_declaration("~[a]", "  50% off & 1/2 = half? #1").unwrap();
        let words: Vec<&str> = tokens
            .iter()
            .filter(|t| t.terminal == Word)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(words, vec!["50%", "off", "&", "1/2", "=", "half?", "#1"]);
    }

    #[test]
    fn test_escaped_comment_stays_in_word() {
        let tokens = lex_after_declaration("~[a]", "  abc\\; def").unwrap();
        assert_eq!(
            tokens,
            mk_tokens(&[
                (Indentation, "  "),
                (Word, "abc\\;"),
                (Whitespace, " "),
                (Word, "def"),
            ])
        );
    }

    #[test]
    fn test_slot_value() {
        let tokens = lex_after_declaration("@[city]", "    New York = NYC  ; big apple").unwrap();
        assert_eq!(
            tokens,
            mk_tokens(&[
                (Indentation, "    "),
                (Word, "New"),
                (Whitespace, " "),
                (Word, "York"),
                (Whitespace, " "),
                (SlotValMarker, "="),
                (Whitespace, " "),
                (SlotVal, "NYC"),
                (Whitespace, "  "),
                (Comment, "; big apple"),
            ])
        );
    }

    #[test]
    fn test_empty_slot_value() {
        let err = lex_after_declaration("@[city]", "  Paris =").unwrap_err();
        assert_eq!(err.kind, GrammarErrorKind::EmptyName);
        assert_eq!(err.column, 9);
    }

    #[test]
    fn test_strict_slot_value_marker() {
        let config = LexerConfig {
            strict_slot_value_marker: true,
            ..LexerConfig::default()
        };
        let mut lexer = Lexer::with_config("test", config);
        lexer.lex("~[a]").unwrap();
        let err = lexer.lex("  x = y").unwrap_err();
        assert_eq!(err.kind, GrammarErrorKind::MisplacedSlotValueMarker);
        assert_eq!(err.column, 4);
    }

    #[test]
    fn test_rule_outside_declaration() {
        let mut lexer = Lexer::new("test");
        let err = lexer.lex("  hello").unwrap_err();
        assert_eq!(err.kind, GrammarErrorKind::UnterminatedOrUnmatchedLine);
        assert_eq!(err.column, 0);
    }

    #[test]
    fn test_unindented_rule() {
        let err = lex_after_declaration("~[a]", "hello").unwrap_err();
        assert_eq!(err.kind, GrammarErrorKind::UnterminatedOrUnmatchedLine);

        let config = LexerConfig {
            require_rule_indentation: false,
            ..LexerConfig::default()
        };
        let mut lexer = Lexer::with_config("test", config);
        lexer.lex("~[a]").unwrap();
        assert_eq!(lexer.lex("hello").unwrap(), mk_tokens(&[(Word, "hello")]));
    }

    #[test]
    fn test_indentation_is_checked_per_block() {
        let mut lexer = Lexer::new("test");
        lexer.lex("~[a]").unwrap();
        lexer.lex("  one").unwrap();
        let err = lexer.lex("    two").unwrap_err();
        assert_eq!(err.kind, GrammarErrorKind::IndentationMismatch);
        assert_eq!(err.line, 3);
        assert_eq!(err.column, 2);

        lexer.lex("~[b]").unwrap();
        assert!(lexer.lex("    two").is_ok());
    }

    #[test]
    fn test_rejected_line_does_not_establish_indentation() {
        let mut lexer = Lexer::new("test");
        lexer.lex("~[a]").unwrap();
        assert!(lexer.lex("    ~[]").is_err());
        assert!(lexer.lex("  ok").is_ok());
    }

    #[test]
    fn test_inclusion_closes_block() {
        let mut lexer = Lexer::new("test");
        lexer.lex("~[a]").unwrap();
        lexer.lex("|other.chatlex").unwrap();
        assert_eq!(lexer.current_block(), None);
        assert!(lexer.lex("  hello").is_err());
    }

    #[test]
    fn test_unmatched_brackets() {
        let err = lex_after_declaration("~[a]", "  oops]").unwrap_err();
        assert_eq!(err.kind, GrammarErrorKind::UnterminatedOrUnmatchedLine);
        assert_eq!(err.column, 6);

        let err = lex_after_declaration("~[a]", "  [open").unwrap_err();
        assert_eq!(err.kind, GrammarErrorKind::UnterminatedOrUnmatchedLine);
        assert_eq!(err.column, 7);

        let err = lex_after_declaration("~[a]", "  {a/b").unwrap_err();
        assert_eq!(err.kind, GrammarErrorKind::UnterminatedOrUnmatchedLine);
    }

    #[test]
    fn test_empty_percentage_in_reference() {
        let err = lex_after_declaration("~[a]", "  ~[b?g/]").unwrap_err();
        assert_eq!(err.kind, GrammarErrorKind::EmptyPercentage);
        assert_eq!(err.column, 8);
    }

    #[test]
    fn test_percentage_may_contain_slash() {
        let tokens = lex_after_declaration("~[a]", "  ~[b?g/5/0]").unwrap();
        assert_eq!(
            tokens,
            mk_tokens(&[
                (Indentation, "  "),
                (UnitRefStart, "~["),
                (UnitIdentifier, "b"),
                (RandgenMarker, "?"),
                (RandgenName, "g"),
                (PercentgenMarker, "/"),
                (Percentgen, "5/0"),
                (UnitRefEnd, "]"),
            ])
        );
    }

    #[test]
    fn test_lex_document_numbers_lines() {
        let source = "; header\n%[ask](2)\n  what is ~[up]\n\n~[up]\n  up";
        let lines = lex_document(source, "doc.chatlex").unwrap();
        let summary: Vec<(usize, LineType)> =
            lines.iter().map(|l| (l.line_number, l.line_type)).collect();
        assert_eq!(
            summary,
            vec![
                (1, LineType::Comment),
                (2, LineType::IntentDeclaration),
                (3, LineType::Content),
                (4, LineType::Empty),
                (5, LineType::AliasDeclaration),
                (6, LineType::Content),
            ]
        );
    }

    #[test]
    fn test_lex_document_reports_first_error() {
        let source = "~[a]\n  fine\n   off by one\n  [";
        let err = lex_document(source, "doc.chatlex").unwrap_err();
        assert_eq!(err.kind, GrammarErrorKind::IndentationMismatch);
        assert_eq!(err.file, "doc.chatlex");
        assert_eq!(err.line, 3);
        assert_eq!(err.line_text, "   off by one");
    }
}
