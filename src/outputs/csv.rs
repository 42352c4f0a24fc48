//! CSV persistence of ranked articles.
//!
//! One row per article in the order given, under the header
//! `title,URL,publication_date,relevancy_score`. Timestamps are RFC 3339.

use crate::error::PersistError;
use crate::models::Article;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Column names, in order.
pub const HEADER: [&str; 4] = ["title", "URL", "publication_date", "relevancy_score"];

#[derive(Debug, Serialize, Deserialize)]
struct ArticleRecord {
    title: String,
    #[serde(rename = "URL")]
    url: String,
    publication_date: DateTime<Utc>,
    relevancy_score: f64,
}

impl From<&Article> for ArticleRecord {
    fn from(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            url: article.url.clone(),
            publication_date: article.last_updated,
            relevancy_score: article.relevancy_score,
        }
    }
}

impl From<ArticleRecord> for Article {
    fn from(record: ArticleRecord) -> Self {
        Self {
            title: record.title,
            url: record.url,
            last_updated: record.publication_date,
            relevancy_score: record.relevancy_score,
        }
    }
}

/// Write `articles` to `outfile`, creating parent directories as needed.
///
/// An existing file is replaced.
#[instrument(level = "info", skip_all, fields(outfile = %outfile.display(), count = articles.len()))]
pub async fn save_articles(articles: &[Article], outfile: &Path) -> Result<(), PersistError> {
    let mut writer = ::csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for article in articles {
        writer.serialize(ArticleRecord::from(article))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| PersistError::io(outfile, e.into_error()))?;

    if let Some(parent) = outfile.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| PersistError::io(parent, e))?;
    }

    fs::write(outfile, bytes)
        .await
        .map_err(|e| PersistError::io(outfile, e))?;
    info!("Wrote article CSV");
    Ok(())
}

/// Read back a file written by [`save_articles`].
#[cfg(test)]
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_articles(path: &Path) -> Result<Vec<Article>, PersistError> {
    let bytes = fs::read(path).await.map_err(|e| PersistError::io(path, e))?;
    let mut reader = ::csv::Reader::from_reader(bytes.as_slice());
    let articles = reader
        .deserialize::<ArticleRecord>()
        .map(|record| record.map(Article::from))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(articles)
}
