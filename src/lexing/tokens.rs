//! Token and classification types
//!
//! - [`TerminalType`]: the lexical category of a labelled token
//! - [`LabelledToken`]: a terminal type paired with the raw text it covers
//! - [`LineType`]: the top-level production a line belongs to
//! - [`UnitKind`]: the kind of a parsed content item

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::symbols;

/// The lexical category of a token produced by the line tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminalType {
    // Special
    Indentation,
    Whitespace,
    Comment,

    // File inclusion
    FileInclusionMarker,
    FilePath,

    // Unit declarations
    AliasDeclStart,
    AliasDeclEnd,
    SlotDeclStart,
    SlotDeclEnd,
    IntentDeclStart,
    IntentDeclEnd,
    UnitIdentifier,
    VariationMarker,
    Variation,

    // Annotations
    AnnotationStart,
    AnnotationEnd,
    Key,
    KeyValueConnector,
    Value,
    Separator,

    // Rule contents
    Word,
    ChoiceStart,
    ChoiceEnd,
    ChoiceSep,
    UnitRefStart,
    UnitRefEnd,
    SlotValMarker,
    SlotVal,

    // Modifiers
    CasegenMarker,
    ArgMarker,
    ArgName,
    ArgValue,
    RandgenMarker,
    RandgenName,
    PercentgenMarker,
    Percentgen,
}

impl TerminalType {
    /// Format the terminal as grammar notation, e.g. `<unit-ref-start>`.
    pub fn to_grammar_string(&self) -> String {
        let name = match self {
            TerminalType::Indentation => "indentation",
            TerminalType::Whitespace => "whitespace",
            TerminalType::Comment => "comment",
            TerminalType::FileInclusionMarker => "file-inclusion-marker",
            TerminalType::FilePath => "file-path",
            TerminalType::AliasDeclStart => "alias-decl-start",
            TerminalType::AliasDeclEnd => "alias-decl-end",
            TerminalType::SlotDeclStart => "slot-decl-start",
            TerminalType::SlotDeclEnd => "slot-decl-end",
            TerminalType::IntentDeclStart => "intent-decl-start",
            TerminalType::IntentDeclEnd => "intent-decl-end",
            TerminalType::UnitIdentifier => "unit-identifier",
            TerminalType::VariationMarker => "variation-marker",
            TerminalType::Variation => "variation",
            TerminalType::AnnotationStart => "annotation-start",
            TerminalType::AnnotationEnd => "annotation-end",
            TerminalType::Key => "key",
            TerminalType::KeyValueConnector => "key-value-connector",
            TerminalType::Value => "value",
            TerminalType::Separator => "separator",
            TerminalType::Word => "word",
            TerminalType::ChoiceStart => "choice-start",
            TerminalType::ChoiceEnd => "choice-end",
            TerminalType::ChoiceSep => "choice-sep",
            TerminalType::UnitRefStart => "unit-ref-start",
            TerminalType::UnitRefEnd => "unit-ref-end",
            TerminalType::SlotValMarker => "slot-val-marker",
            TerminalType::SlotVal => "slot-val",
            TerminalType::CasegenMarker => "casegen-marker",
            TerminalType::ArgMarker => "arg-marker",
            TerminalType::ArgName => "arg-name",
            TerminalType::ArgValue => "arg-value",
            TerminalType::RandgenMarker => "randgen-marker",
            TerminalType::RandgenName => "randgen-name",
            TerminalType::PercentgenMarker => "percentgen-marker",
            TerminalType::Percentgen => "percentgen",
        };
        format!("<{}>", name)
    }
}

/// One token of a lexed line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelledToken {
    pub terminal: TerminalType,
    /// The raw text of the token, copied from the line (escapes included).
    pub text: String,
}

impl LabelledToken {
    pub fn new(terminal: TerminalType, text: impl Into<String>) -> Self {
        LabelledToken {
            terminal,
            text: text.into(),
        }
    }
}

impl fmt::Display for LabelledToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.terminal.to_grammar_string(), self.text)
    }
}

/// The classification of a top-level line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineType {
    /// Nothing but whitespace (and, once comments are stripped, comments)
    Empty,
    /// A line holding only a comment
    Comment,
    /// `~[name]` at column 0
    AliasDeclaration,
    /// `@[name]` at column 0
    SlotDeclaration,
    /// `%[name]` at column 0
    IntentDeclaration,
    /// `|path` at column 0
    FileInclusion,
    /// Anything else: a rule belonging to the current declaration
    Content,
}

impl LineType {
    /// The unit kind declared by a declaration line.
    pub fn declared_kind(&self) -> Option<UnitKind> {
        match self {
            LineType::AliasDeclaration => Some(UnitKind::Alias),
            LineType::SlotDeclaration => Some(UnitKind::Slot),
            LineType::IntentDeclaration => Some(UnitKind::Intent),
            LineType::Empty | LineType::Comment | LineType::FileInclusion | LineType::Content => {
                None
            }
        }
    }
}

impl fmt::Display for LineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LineType::Empty => "EMPTY",
            LineType::Comment => "COMMENT",
            LineType::AliasDeclaration => "ALIAS_DECLARATION",
            LineType::SlotDeclaration => "SLOT_DECLARATION",
            LineType::IntentDeclaration => "INTENT_DECLARATION",
            LineType::FileInclusion => "FILE_INCLUSION",
            LineType::Content => "CONTENT",
        };
        write!(f, "{}", name)
    }
}

/// The kind of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    Word,
    WordGroup,
    Alias,
    Slot,
    Intent,
    Choice,
}

impl UnitKind {
    /// The kind of unit opened by `c`, if `c` opens one.
    pub fn from_opening(c: char) -> Option<UnitKind> {
        match c {
            symbols::UNIT_OPEN => Some(UnitKind::WordGroup),
            symbols::ALIAS => Some(UnitKind::Alias),
            symbols::SLOT => Some(UnitKind::Slot),
            symbols::INTENT => Some(UnitKind::Intent),
            _ => None,
        }
    }

    /// The sigil written before `[` for named units.
    pub fn sigil(&self) -> Option<char> {
        match self {
            UnitKind::Alias => Some(symbols::ALIAS),
            UnitKind::Slot => Some(symbols::SLOT),
            UnitKind::Intent => Some(symbols::INTENT),
            UnitKind::Word | UnitKind::WordGroup | UnitKind::Choice => None,
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitKind::Word => "word",
            UnitKind::WordGroup => "word group",
            UnitKind::Alias => "alias",
            UnitKind::Slot => "slot",
            UnitKind::Intent => "intent",
            UnitKind::Choice => "choice",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_string() {
        assert_eq!(TerminalType::UnitRefStart.to_grammar_string(), "<unit-ref-start>");
        assert_eq!(TerminalType::Word.to_grammar_string(), "<word>");
    }

    #[test]
    fn test_token_display() {
        let token = LabelledToken::new(TerminalType::Word, "hello");
        assert_eq!(token.to_string(), "<word> \"hello\"");
    }

    #[test]
    fn test_unit_kind_from_opening() {
        assert_eq!(UnitKind::from_opening('['), Some(UnitKind::WordGroup));
        assert_eq!(UnitKind::from_opening('~'), Some(UnitKind::Alias));
        assert_eq!(UnitKind::from_opening('@'), Some(UnitKind::Slot));
        assert_eq!(UnitKind::from_opening('%'), Some(UnitKind::Intent));
        assert_eq!(UnitKind::from_opening('a'), None);
    }

    #[test]
    fn test_declared_kind() {
        assert_eq!(LineType::SlotDeclaration.declared_kind(), Some(UnitKind::Slot));
        assert_eq!(LineType::Content.declared_kind(), None);
        assert_eq!(LineType::IntentDeclaration.to_string(), "INTENT_DECLARATION");
    }
}
