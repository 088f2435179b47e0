//! Token classification handed to the read-only token panel.

use std::collections::BTreeMap;

use serde::Serialize;

/// Token class reported by the tokenizer service.
///
/// Variant order is the panel's display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum TokenCategory {
    Symbol,
    Identifier,
    ReservedWord,
    Variable,
    Literal,
    List,
    Comment,
}

const RESERVED_WORD_TYPES: &[&str] = &[
    "Break", "Case", "Do", "Else", "For", "If", "Return", "While", "Continue",
];

const TYPE_NAME_TYPES: &[&str] = &["Int", "Float", "Bool", "String", "Double", "Char", "Void"];

impl TokenCategory {
    pub const ALL: [Self; 7] = [
        Self::Symbol,
        Self::Identifier,
        Self::ReservedWord,
        Self::Variable,
        Self::Literal,
        Self::List,
        Self::Comment,
    ];

    /// Field name used by the categorized response object.
    #[must_use]
    pub fn field(self) -> &'static str {
        match self {
            Self::Symbol => "symbols",
            Self::Identifier => "identifiers",
            Self::ReservedWord => "reserved_words",
            Self::Variable => "variables",
            Self::Literal => "literals",
            Self::List => "lists",
            Self::Comment => "comments",
        }
    }

    /// Heading shown by the token panel.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Symbol => "Symbols",
            Self::Identifier => "Identifiers",
            Self::ReservedWord => "Reserved Keywords",
            Self::Variable => "Variables",
            Self::Literal => "Literals",
            Self::List => "Lists",
            Self::Comment => "Comments",
        }
    }

    #[must_use]
    pub fn from_field(field: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.field() == field)
    }

    /// Parse the `token_global` class of a flat token record.
    #[must_use]
    pub fn from_token_global(value: &str) -> Option<Self> {
        match value {
            "Symbol" => Some(Self::Symbol),
            "Identifier" => Some(Self::Identifier),
            "ReservedWord" => Some(Self::ReservedWord),
            "Variable" => Some(Self::Variable),
            "Literal" => Some(Self::Literal),
            "List" => Some(Self::List),
            "Comment" => Some(Self::Comment),
            _ => None,
        }
    }

    /// Infer the class from a `token_type` when `token_global` is absent.
    ///
    /// Returns `None` for the tokenizer's `Error` pseudo-token.
    #[must_use]
    pub fn from_token_type(value: &str) -> Option<Self> {
        match value {
            "" | "Error" => None,
            "Comment" => Some(Self::Comment),
            "Variable" => Some(Self::Variable),
            "List" => Some(Self::List),
            v if v.ends_with("Literal") => Some(Self::Literal),
            v if RESERVED_WORD_TYPES.contains(&v) => Some(Self::ReservedWord),
            v if TYPE_NAME_TYPES.contains(&v) => Some(Self::Identifier),
            _ => Some(Self::Symbol),
        }
    }
}

/// Grouped tokens from the last successful analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenSummary {
    entries: BTreeMap<TokenCategory, Vec<String>>,
}

impl TokenSummary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, category: TokenCategory, entry: impl Into<String>) {
        self.entries.entry(category).or_default().push(entry.into());
    }

    #[must_use]
    pub fn entries(&self, category: TokenCategory) -> &[String] {
        self.entries
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Non-empty categories in display order.
    pub fn categories(&self) -> impl Iterator<Item = (TokenCategory, &[String])> {
        self.entries
            .iter()
            .filter(|(_, items)| !items.is_empty())
            .map(|(category, items)| (*category, items.as_slice()))
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
