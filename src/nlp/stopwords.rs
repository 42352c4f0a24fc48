//! Per-language stop-word sets backed by the `stop-words` crate.

use crate::models::Language;
use std::collections::HashSet;
use stop_words::{LANGUAGE, get};

/// A set of case-folded stop words.
#[derive(Debug, Clone, Default)]
pub struct StopwordSet {
    words: HashSet<String>,
}

impl StopwordSet {
    /// Load the stop words for `language`.
    pub fn for_language(language: Language) -> Self {
        let lang = match language {
            Language::English => LANGUAGE::English,
            Language::German => LANGUAGE::German,
        };
        Self {
            words: get(lang).iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    /// Case-insensitive membership test.
    pub fn is_stopword(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }
}
