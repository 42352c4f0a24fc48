//! The search pipeline: fetch, rank, summarize, extract, persist.
//!
//! # Architecture
//!
//! 1. **Validation**: Reject future cutoffs and oversized topics before any I/O
//! 2. **Fetching**: Ask the configured [`Fetcher`] for recent articles
//! 3. **Ranking**: Score headlines against the topic; the ranked copy is only
//!    used for persistence
//! 4. **Analysis**: Summary and named entities from the articles in fetch order
//! 5. **Output**: Optionally write the ranked articles to CSV

use crate::analysis::entities::return_named_entities;
use crate::analysis::relevance::rate_relevance;
use crate::analysis::summary::{FrequencyKeying, generate_summary};
use crate::backends::Fetcher;
use crate::error::{PersistError, SearchError};
use crate::models::{Article, Digest, Language, Query};
use crate::nlp::NlpProvider;
use crate::outputs::csv::save_articles;
use crate::outputs::json;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument, warn};

/// Longest accepted topic, in characters.
pub const MAX_TOPIC_CHARS: usize = 1000;

/// Reject queries that cannot be answered.
pub fn validate_query(topic: &str, updated_after: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), SearchError> {
    if updated_after > now {
        return Err(SearchError::InvalidQuery(format!(
            "cannot query future news articles (updated_after {updated_after} is after {now})"
        )));
    }
    let chars = topic.chars().count();
    if chars > MAX_TOPIC_CHARS {
        return Err(SearchError::InvalidQuery(format!(
            "topic is too long ({chars} characters, at most {MAX_TOPIC_CHARS})"
        )));
    }
    Ok(())
}

/// What happened to the CSV output of a run.
#[derive(Debug)]
pub enum Persistence {
    /// Saving was disabled or no output file was given.
    Skipped,
    Saved(PathBuf),
    /// The results are valid but could not be written.
    Failed(PersistError),
}

/// Result of one search.
#[derive(Debug)]
pub struct SearchOutcome {
    pub summary: String,
    /// Distinct entities, most frequent first.
    pub named_entities: Vec<String>,
    /// Scored articles, most relevant first.
    pub ranked_articles: Vec<Article>,
    pub persistence: Persistence,
}

impl SearchOutcome {
    pub fn to_digest(&self, topic: &str, language: Language) -> Digest {
        Digest {
            topic: topic.to_string(),
            language,
            generated_at: Utc::now(),
            summary: self.summary.clone(),
            named_entities: self.named_entities.clone(),
            articles: self.ranked_articles.clone(),
        }
    }
}

/// Searches recent news for a topic and summarizes the headlines.
///
/// The language of a run is the language of the NLP provider; it is also passed
/// to the fetcher.
#[derive(Debug)]
pub struct NewsSearch<F, N> {
    fetcher: F,
    nlp: N,
    save_on_fetch: bool,
    keying: FrequencyKeying,
}

impl<F, N> NewsSearch<F, N>
where
    F: Fetcher,
    N: NlpProvider,
{
    pub fn new(fetcher: F, nlp: N) -> Self {
        Self {
            fetcher,
            nlp,
            save_on_fetch: true,
            keying: FrequencyKeying::default(),
        }
    }

    /// Whether ranked articles are written when an output file is given.
    pub fn with_save_on_fetch(mut self, save_on_fetch: bool) -> Self {
        self.save_on_fetch = save_on_fetch;
        self
    }

    pub fn with_keying(mut self, keying: FrequencyKeying) -> Self {
        self.keying = keying;
        self
    }

    #[cfg(test)]
    pub(crate) fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetch recent articles for `topic` and return their summary and named entities.
    ///
    /// # Errors
    ///
    /// - [`SearchError::InvalidQuery`] before anything is fetched
    /// - [`SearchError::Fetch`] from the backend, unchanged
    /// - [`SearchError::NoScorableContent`] when the headlines have no content words
    ///
    /// A failed CSV write does not fail the search; it is reported in
    /// [`SearchOutcome::persistence`].
    #[instrument(level = "info", skip(self, outfile), fields(language = %self.nlp.language()))]
    pub async fn fetch_summary_and_named_entities(
        &self,
        topic: &str,
        max_num_articles: usize,
        updated_after: DateTime<Utc>,
        outfile: Option<&Path>,
    ) -> Result<SearchOutcome, SearchError> {
        validate_query(topic, updated_after, Utc::now())?;

        let query = Query {
            topic: topic.to_string(),
            max_num_articles,
            updated_after,
            language: self.nlp.language(),
        };
        let mut articles = self.fetcher.fetch(&query).await?;
        if articles.len() > max_num_articles {
            warn!(
                fetched = articles.len(),
                max = max_num_articles,
                "Backend returned too many articles; truncating"
            );
            articles.truncate(max_num_articles);
        }
        info!(count = articles.len(), "Fetched articles");

        let ranked_articles = rate_relevance(topic, &self.nlp, &mut articles);
        let summary = generate_summary(&self.nlp, &articles, self.keying)?;
        let named_entities = return_named_entities(&self.nlp, &articles);
        info!(
            summary_chars = summary.chars().count(),
            entities = named_entities.len(),
            "Analyzed headlines"
        );

        let persistence = match outfile {
            Some(path) if self.save_on_fetch => match save_articles(&ranked_articles, path).await {
                Ok(()) => Persistence::Saved(path.to_path_buf()),
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Failed to save articles");
                    Persistence::Failed(e)
                }
            },
            _ => Persistence::Skipped,
        };

        Ok(SearchOutcome {
            summary,
            named_entities,
            ranked_articles,
            persistence,
        })
    }

    /// Write the JSON digest of `outcome` into `json_output_dir`.
    pub async fn write_digest(
        &self,
        outcome: &SearchOutcome,
        topic: &str,
        json_output_dir: &Path,
    ) -> Result<PathBuf, SearchError> {
        let digest = outcome.to_digest(topic, self.nlp.language());
        Ok(json::write_digest(&digest, json_output_dir).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::articles_from_titles;
    use crate::backends::FetchError;
    use crate::backends::testing::{FlakyFetcher, StaticFetcher};
    use crate::nlp::HeuristicNlp;
    use crate::outputs::csv::load_articles;
    use crate::utils::temp_dir;
    use chrono::{Duration, Months, TimeZone};

    fn search(titles: &[&str]) -> NewsSearch<StaticFetcher, HeuristicNlp> {
        NewsSearch::new(
            StaticFetcher::new(articles_from_titles(titles)),
            HeuristicNlp::new(Language::English),
        )
    }

    fn month_ago() -> DateTime<Utc> {
        Utc::now() - Months::new(1)
    }

    #[test]
    fn test_topic_length_boundary() {
        let now = Utc.with_ymd_and_hms(2025, 5, 6, 12, 0, 0).unwrap();
        let then = now - Duration::days(30);

        assert!(validate_query(&"a".repeat(1000), then, now).is_ok());
        assert!(validate_query(&"ä".repeat(1000), then, now).is_ok());
        assert!(matches!(
            validate_query(&"a".repeat(1001), then, now),
            Err(SearchError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_updated_after_boundary() {
        let now = Utc.with_ymd_and_hms(2025, 5, 6, 12, 0, 0).unwrap();

        assert!(validate_query("apple", now, now).is_ok());
        assert!(matches!(
            validate_query("apple", now + Duration::seconds(1), now),
            Err(SearchError::InvalidQuery(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_query_fetches_nothing() {
        let search = search(&["Apple stock rises."]);
        let future = Utc::now() + Duration::hours(1);

        let err = search
            .fetch_summary_and_named_entities("apple", 5, future, None)
            .await
            .unwrap_err();

        assert!(matches!(err, SearchError::InvalidQuery(_)));
        assert_eq!(search.fetcher.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_analysis_uses_fetch_order_and_saves_ranked_order() {
        let out_dir = temp_dir("pipeline_saved");
        let outfile = out_dir.join("results").join("Apple_iPhone_launch_summary.csv");
        let search = search(&[
            "Tech news roundup",
            "Apple unveils new iPhone in California",
            "Apple stock rises after iPhone launch",
        ]);

        let outcome = search
            .fetch_summary_and_named_entities("Apple iPhone launch", 15, month_ago(), Some(&outfile))
            .await
            .unwrap();

        // two headline sentences are too few to select any
        assert_eq!(outcome.summary, "");
        // "Tech" is seen before "California" in fetch order
        assert_eq!(outcome.named_entities, vec!["Apple", "Tech", "California"]);

        let ranked: Vec<&str> = outcome.ranked_articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(
            ranked,
            vec![
                "Apple stock rises after iPhone launch",
                "Apple unveils new iPhone in California",
                "Tech news roundup",
            ]
        );

        match &outcome.persistence {
            Persistence::Saved(path) => assert_eq!(path, &outfile),
            other => panic!("unexpected persistence: {other:?}"),
        }
        assert_eq!(load_articles(&outfile).await.unwrap(), outcome.ranked_articles);
        let _ = std::fs::remove_dir_all(out_dir);
    }

    #[tokio::test]
    async fn test_summary_from_punctuated_headlines() {
        let search = search(&[
            "Volcano erupts.",
            "Markets rally.",
            "Lava volcano ash.",
            "Weather turns.",
            "Lava lava volcano ash.",
        ])
        .with_save_on_fetch(false);

        let outcome = search
            .fetch_summary_and_named_entities("volcano", 15, month_ago(), Some(Path::new("unused.csv")))
            .await
            .unwrap();

        assert_eq!(outcome.summary, "Lava lava volcano ash.");
        assert!(matches!(outcome.persistence, Persistence::Skipped));
        assert!(!Path::new("unused.csv").exists());
    }

    #[tokio::test]
    async fn test_persistence_failure_keeps_results() {
        let base = temp_dir("pipeline_blocked");
        std::fs::create_dir_all(&base).unwrap();
        let blocker = base.join("not_a_dir");
        std::fs::write(&blocker, "x").unwrap();
        let search = search(&[
            "Apple unveils new iPhone in California",
            "Apple stock rises after iPhone launch",
            "Tech news roundup",
        ]);

        let outcome = search
            .fetch_summary_and_named_entities(
                "Apple iPhone launch",
                15,
                month_ago(),
                Some(&blocker.join("out.csv")),
            )
            .await
            .unwrap();

        assert!(matches!(outcome.persistence, Persistence::Failed(_)));
        assert_eq!(outcome.named_entities[0], "Apple");
        assert_eq!(outcome.ranked_articles.len(), 3);
        let _ = std::fs::remove_dir_all(base);
    }

    #[tokio::test]
    async fn test_fetch_errors_propagate() {
        let search = NewsSearch::new(FlakyFetcher::new(1, 500), HeuristicNlp::new(Language::English));

        let err = search
            .fetch_summary_and_named_entities("apple", 5, month_ago(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, SearchError::Fetch(FetchError::Api { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_over_delivery_is_truncated() {
        let search = search(&["Apple one.", "Apple two.", "Apple three.", "Apple four."]);

        let outcome = search
            .fetch_summary_and_named_entities("apple", 2, month_ago(), None)
            .await
            .unwrap();

        assert_eq!(outcome.ranked_articles.len(), 2);
    }

    #[tokio::test]
    async fn test_no_scorable_content_aborts() {
        let search = search(&["The and of.", "It is."]);

        let err = search
            .fetch_summary_and_named_entities("apple", 5, month_ago(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, SearchError::NoScorableContent));
    }

    #[tokio::test]
    async fn test_digest_failure_is_a_persistence_error() {
        let base = temp_dir("pipeline_digest");
        std::fs::create_dir_all(&base).unwrap();
        let blocker = base.join("not_a_dir");
        std::fs::write(&blocker, "x").unwrap();
        let search = search(&["Apple rises."]);
        let outcome = SearchOutcome {
            summary: String::new(),
            named_entities: vec!["Apple".to_string()],
            ranked_articles: articles_from_titles(&["Apple rises."]),
            persistence: Persistence::Skipped,
        };

        let written = search.write_digest(&outcome, "apple", &base).await.unwrap();
        assert_eq!(written, base.join("apple.json"));

        let err = search
            .write_digest(&outcome, "apple", &blocker.join("json"))
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Persistence(_)));
        let _ = std::fs::remove_dir_all(base);
    }

    #[test]
    fn test_to_digest() {
        let outcome = SearchOutcome {
            summary: "Apple rises.".to_string(),
            named_entities: vec!["Apple".to_string()],
            ranked_articles: articles_from_titles(&["Apple rises."]),
            persistence: Persistence::Skipped,
        };
        let digest = outcome.to_digest("apple", Language::German);
        assert_eq!(digest.topic, "apple");
        assert_eq!(digest.language, Language::German);
        assert_eq!(digest.articles, outcome.ranked_articles);
    }
}
