//! Natural-language capabilities used by the analysis stages.
//!
//! The analysis code only talks to the [`NlpProvider`] trait. One provider is
//! built in:
//!
//! | Provider | Module | Notes |
//! |----------|--------|-------|
//! | [`HeuristicNlp`] | [`heuristic`] | Unicode segmentation, lexical similarity, rule-based NER |
//!
//! A provider is bound to one [`Language`] and may be reused across runs; it
//! must not keep state between calls.

pub mod heuristic;
pub mod stopwords;

pub use heuristic::HeuristicNlp;
pub use stopwords::StopwordSet;

use crate::models::Language;

/// A single token of a text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The token as it appears in the text.
    pub text: String,
    /// Case-folded form of `text`.
    pub lower: String,
    /// Byte offset of the token in the text it was produced from.
    pub offset: usize,
    /// True when the token contains no alphanumeric character.
    pub is_punct: bool,
}

impl Token {
    pub fn new(text: &str, offset: usize) -> Self {
        Self {
            text: text.to_string(),
            lower: text.to_lowercase(),
            offset,
            is_punct: !text.chars().any(char::is_alphanumeric),
        }
    }

    /// Byte offset one past the end of the token.
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }
}

/// A sentence with its raw text and tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct Sentence {
    pub text: String,
    pub tokens: Vec<Token>,
}

/// A recognized named entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Surface text of the entity.
    pub text: String,
    /// Entity type label, e.g. `PERSON`, `ORG`, `GPE`.
    pub label: String,
}

impl Entity {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }
}

/// Capabilities the summary, relevance and entity stages need.
pub trait NlpProvider {
    /// The language this provider is bound to.
    fn language(&self) -> Language;

    /// Stop words of [`NlpProvider::language`].
    fn stopwords(&self) -> &StopwordSet;

    /// Split `text` into tokens in document order.
    fn tokenize(&self, text: &str) -> Vec<Token>;

    /// Split `text` into sentences in document order.
    fn segment_sentences(&self, text: &str) -> Vec<Sentence>;

    /// Similarity between two texts. The range is provider-defined.
    fn similarity(&self, a: &str, b: &str) -> f64;

    /// Named entities of `text` in document order.
    fn named_entities(&self, text: &str) -> Vec<Entity>;
}
