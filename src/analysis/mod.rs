//! Headline analysis stages.
//!
//! Each stage consumes the same fetched article set independently:
//!
//! - [`relevance`]: Scores headlines against the topic and ranks them
//! - [`summary`]: Builds a frequency-weighted extractive summary
//! - [`entities`]: Counts and ranks the named entities of the headlines

pub mod entities;
pub mod relevance;
pub mod summary;

use crate::models::Article;

/// Join all headlines with single spaces, in the given order.
pub fn headline_text(articles: &[Article]) -> String {
    articles
        .iter()
        .map(|a| a.title.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
pub(crate) fn articles_from_titles(titles: &[&str]) -> Vec<Article> {
    use chrono::{TimeZone, Utc};

    titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            Article::new(
                *title,
                format!("https://example.com/{i}"),
                Utc.with_ymd_and_hms(2025, 5, 6, 12, i as u32, 0).unwrap(),
            )
        })
        .collect()
}
