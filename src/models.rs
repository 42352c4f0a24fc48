//! Data models shared by the fetch backends, the analysis stages and the outputs.
//!
//! - [`Language`]: The language a search runs in
//! - [`Query`]: The canonical argument set handed to every fetch backend
//! - [`Article`]: A fetched headline with its relevancy score
//! - [`Digest`]: Serializable view of one completed search

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Languages a search can be run in.
///
/// The language selects the stop-word set and the NLP provider variant, and is
/// forwarded to the fetch backend so it can restrict results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    #[value(name = "en", alias = "english")]
    English,
    #[value(name = "de", alias = "german")]
    German,
}

impl Language {
    /// Two-letter ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::German => "de",
        }
    }

    /// Region used by backends that localize results by country.
    pub fn region(&self) -> &'static str {
        match self {
            Language::English => "US",
            Language::German => "DE",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Arguments of a single fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Free-text topic to search for.
    pub topic: String,
    /// Upper bound on the number of articles returned.
    pub max_num_articles: usize,
    /// Articles last updated before this instant are not wanted.
    pub updated_after: DateTime<Utc>,
    /// Language of the articles.
    pub language: Language,
}

/// A fetched news article.
///
/// Backends create articles with a `relevancy_score` of `0.0`; the relevance
/// stage sets it once per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// The headline.
    pub title: String,
    /// Link to the article.
    pub url: String,
    /// When the article was published or last modified.
    pub last_updated: DateTime<Utc>,
    /// Similarity between the search topic and the headline.
    pub relevancy_score: f64,
}

impl Article {
    pub fn new(title: impl Into<String>, url: impl Into<String>, last_updated: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            last_updated,
            relevancy_score: 0.0,
        }
    }
}

/// JSON view of one completed search.
#[derive(Debug, Serialize, Deserialize)]
pub struct Digest {
    pub topic: String,
    pub language: Language,
    pub generated_at: DateTime<Utc>,
    pub summary: String,
    pub named_entities: Vec<String>,
    /// Articles in relevance order, highest first.
    pub articles: Vec<Article>,
}
