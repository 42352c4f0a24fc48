//! Frequency-weighted extractive summary of the headlines.
//!
//! # Algorithm
//!
//! 1. Join the headlines into one text and tokenize it
//! 2. Count every token that is neither a stop word nor punctuation
//! 3. Normalize the counts by the largest count
//! 4. Score each sentence by summing the normalized counts of its words
//! 5. Keep the best `floor(0.2 * sentences)` sentences, highest score first
//!
//! # Frequency keys
//!
//! Counting and lookup use different forms of a word by default: words are
//! counted under their original case but looked up case-folded, so a
//! capitalized word only adds to a sentence score when its case-folded form
//! was also counted. [`FrequencyKeying::CaseFolded`] counts case-folded words
//! instead, which lets every counted word contribute.

use super::headline_text;
use crate::error::SearchError;
use crate::models::Article;
use crate::nlp::NlpProvider;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Share of the sentences kept in the summary.
pub const SUMMARY_RATIO: f64 = 0.2;

/// How word-frequency keys are formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyKeying {
    /// Count under the original-case text, look up case-folded.
    #[default]
    OriginalCase,
    /// Count and look up case-folded.
    CaseFolded,
}

/// Normalized word frequencies of one headline text.
#[derive(Debug, Default)]
pub struct WordFrequencyTable {
    weights: HashMap<String, f64>,
}

impl WordFrequencyTable {
    /// Count the content words of `text` and normalize by the largest count.
    ///
    /// Fails with [`SearchError::NoScorableContent`] when no word survives
    /// filtering.
    pub fn build<N: NlpProvider>(nlp: &N, text: &str, keying: FrequencyKeying) -> Result<Self, SearchError> {
        let stopwords = nlp.stopwords();
        let mut counts: HashMap<String, usize> = HashMap::new();
        for token in nlp.tokenize(text) {
            if token.is_punct || stopwords.is_stopword(&token.lower) {
                continue;
            }
            let key = match keying {
                FrequencyKeying::OriginalCase => token.text,
                FrequencyKeying::CaseFolded => token.lower,
            };
            *counts.entry(key).or_insert(0) += 1;
        }

        let max = counts.values().copied().max().ok_or(SearchError::NoScorableContent)?;
        let weights = counts
            .into_iter()
            .map(|(word, count)| (word, count as f64 / max as f64))
            .collect();
        Ok(Self { weights })
    }

    /// Normalized frequency of `word`, if it was counted.
    pub fn weight(&self, word: &str) -> Option<f64> {
        self.weights.get(word).copied()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }
}

/// Number of sentences a summary of `sentence_count` sentences keeps.
pub fn summary_length(sentence_count: usize) -> usize {
    (sentence_count as f64 * SUMMARY_RATIO) as usize
}

/// Summarize the headlines of `articles`.
///
/// Returns an empty string when there are too few sentences to select any.
#[instrument(level = "info", skip_all, fields(count = articles.len(), ?keying))]
pub fn generate_summary<N: NlpProvider>(
    nlp: &N,
    articles: &[Article],
    keying: FrequencyKeying,
) -> Result<String, SearchError> {
    let text = headline_text(articles);
    let table = WordFrequencyTable::build(nlp, &text, keying)?;
    debug!(words = table.len(), "Built word frequency table");

    let sentences = nlp.segment_sentences(&text);

    // (sentence index, score) for sentences with at least one scorable word
    let mut scores: Vec<(usize, f64)> = sentences
        .iter()
        .enumerate()
        .filter_map(|(i, sentence)| {
            let weights: Vec<f64> = sentence
                .tokens
                .iter()
                .filter_map(|token| table.weight(&token.lower))
                .collect();
            (!weights.is_empty()).then(|| (i, weights.iter().sum()))
        })
        .collect();

    let k = summary_length(sentences.len());
    debug!(sentences = sentences.len(), scored = scores.len(), k, "Scored sentences");

    scores.sort_by(|a, b| b.1.total_cmp(&a.1));
    let summary = scores
        .iter()
        .take(k)
        .map(|&(i, _)| sentences[i].text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    Ok(summary)
}
