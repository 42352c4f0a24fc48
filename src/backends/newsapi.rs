//! NewsAPI backend.
//!
//! Queries the [NewsAPI](https://newsapi.org) `everything` endpoint sorted by
//! relevancy. The endpoint accepts a date window, so recency is enforced by
//! the service. Articles the service reports as `[Removed]` are skipped.

use super::{FetchError, Fetcher};
use crate::models::{Article, Query};
use crate::utils::{normalize_whitespace, truncate_for_log};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Largest page the service returns.
const MAX_PAGE_SIZE: usize = 100;

fn default_endpoint() -> String {
    "https://newsapi.org/v2/everything".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// NewsAPI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsApiConfig {
    /// API key; get one at <https://newsapi.org/docs/get-started>.
    pub api_key: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl NewsApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn validate(&self) -> Result<Url, FetchError> {
        if self.api_key.trim().is_empty() {
            return Err(FetchError::InvalidConfig(
                "NewsAPI needs an API key (--api-key or NEWSAPI_KEY)".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(FetchError::InvalidConfig("timeout_secs must be positive".to_string()));
        }
        Url::parse(&self.endpoint)
            .map_err(|e| FetchError::InvalidConfig(format!("bad endpoint {}: {e}", self.endpoint)))
    }
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    status: String,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    title: Option<String>,
    url: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

/// Client for the NewsAPI `everything` endpoint.
#[derive(Debug)]
pub struct NewsApiBackend {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl NewsApiBackend {
    pub fn new(config: NewsApiConfig) -> Result<Self, FetchError> {
        let endpoint = config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("awful_news_search/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key,
        })
    }

    fn request_url(&self, query: &Query, now: DateTime<Utc>) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", &query.topic)
            .append_pair("language", query.language.code())
            .append_pair("from", &query.updated_after.to_rfc3339_opts(SecondsFormat::Secs, true))
            .append_pair("to", &now.to_rfc3339_opts(SecondsFormat::Secs, true))
            .append_pair("sortBy", "relevancy")
            .append_pair("pageSize", &query.max_num_articles.clamp(1, MAX_PAGE_SIZE).to_string());
        url
    }
}

impl Fetcher for NewsApiBackend {
    #[instrument(level = "info", skip_all, fields(topic = %query.topic, language = %query.language))]
    async fn fetch(&self, query: &Query) -> Result<Vec<Article>, FetchError> {
        if query.max_num_articles == 0 {
            return Ok(Vec::new());
        }

        let url = self.request_url(query, Utc::now());
        debug!(endpoint = %self.endpoint, "Querying NewsAPI");

        let response = self
            .client
            .get(url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<NewsApiResponse>(&body)
                .ok()
                .and_then(|r| r.message)
                .unwrap_or_else(|| truncate_for_log(&body, 300));
            return Err(FetchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let articles = parse_response(&body, query.max_num_articles)?;
        info!(count = articles.len(), "Fetched NewsAPI articles");
        Ok(articles)
    }
}

/// Turn a response body into at most `max` complete articles.
fn parse_response(body: &str, max: usize) -> Result<Vec<Article>, FetchError> {
    let response: NewsApiResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::Parse(format!("Failed to parse NewsAPI response: {e}")))?;

    if response.status != "ok" {
        return Err(FetchError::Api {
            status: 200,
            message: response.message.unwrap_or(response.status),
        });
    }

    let articles = response
        .articles
        .into_iter()
        .filter_map(|raw| {
            let title = normalize_whitespace(raw.title.as_deref()?);
            let url = raw.url.filter(|u| !u.trim().is_empty())?;
            let published = raw.published_at?;
            if title.is_empty() || title == "[Removed]" {
                return None;
            }
            match DateTime::parse_from_rfc3339(&published) {
                Ok(when) => Some(Article::new(title, url, when.with_timezone(&Utc))),
                Err(e) => {
                    warn!(%url, %published, error = %e, "Skipping article with bad timestamp");
                    None
                }
            }
        })
        .take(max)
        .collect();

    Ok(articles)
}
