//! Google News RSS backend.
//!
//! Uses the public RSS search feed, which needs no key. The feed only supports
//! day-granular `after:` filters, so items older than `updated_after` are
//! removed after parsing.
//!
//! # Title Format
//!
//! Feed titles look like `Headline - Publisher`. When an item names its
//! publisher in `<source>`, that suffix is removed.

use super::{FetchError, Fetcher};
use crate::models::{Article, Query};
use crate::utils::normalize_whitespace;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

fn default_endpoint() -> String {
    "https://news.google.com/rss/search".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// Google News settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleNewsConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GoogleNewsConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GoogleNewsConfig {
    pub fn validate(&self) -> Result<Url, FetchError> {
        if self.timeout_secs == 0 {
            return Err(FetchError::InvalidConfig("timeout_secs must be positive".to_string()));
        }
        Url::parse(&self.endpoint)
            .map_err(|e| FetchError::InvalidConfig(format!("bad endpoint {}: {e}", self.endpoint)))
    }
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    source: Option<Source>,
}

#[derive(Debug, Deserialize)]
struct Source {
    #[serde(rename = "$text")]
    name: Option<String>,
}

/// Client for the Google News RSS search feed.
#[derive(Debug)]
pub struct GoogleNewsBackend {
    client: Client,
    endpoint: Url,
}

impl GoogleNewsBackend {
    pub fn new(config: GoogleNewsConfig) -> Result<Self, FetchError> {
        let endpoint = config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("Mozilla/5.0 (compatible; awful_news_search)")
            .build()?;
        Ok(Self { client, endpoint })
    }

    fn request_url(&self, query: &Query) -> Url {
        let language = query.language.code();
        let region = query.language.region();
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair(
                "q",
                &format!("{} after:{}", query.topic, query.updated_after.date_naive()),
            )
            .append_pair("hl", language)
            .append_pair("gl", region)
            .append_pair("ceid", &format!("{region}:{language}"));
        url
    }
}

impl Fetcher for GoogleNewsBackend {
    #[instrument(level = "info", skip_all, fields(topic = %query.topic, language = %query.language))]
    async fn fetch(&self, query: &Query) -> Result<Vec<Article>, FetchError> {
        if query.max_num_articles == 0 {
            return Ok(Vec::new());
        }

        let url = self.request_url(query);
        debug!(%url, "Fetching Google News RSS");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Api {
                status: status.as_u16(),
                message: format!("Google News returned status {status}"),
            });
        }
        let body = response.text().await?;

        let articles = parse_feed(&body, query.updated_after, query.max_num_articles)?;
        info!(count = articles.len(), "Fetched Google News articles");
        Ok(articles)
    }
}

/// Turn an RSS document into at most `max` articles updated after `updated_after`.
fn parse_feed(xml: &str, updated_after: DateTime<Utc>, max: usize) -> Result<Vec<Article>, FetchError> {
    let rss: Rss = quick_xml::de::from_str(xml)
        .map_err(|e| FetchError::Parse(format!("Failed to parse Google News RSS: {e}")))?;

    let articles = rss
        .channel
        .items
        .into_iter()
        .filter_map(|item| {
            let raw_title = item.title?;
            let link = item.link.filter(|l| !l.trim().is_empty())?;
            let pub_date = item.pub_date?;

            let when = match DateTime::parse_from_rfc2822(pub_date.trim()) {
                Ok(when) => when.with_timezone(&Utc),
                Err(e) => {
                    warn!(%link, %pub_date, error = %e, "Skipping item with bad pubDate");
                    return None;
                }
            };
            if when < updated_after {
                return None;
            }

            let mut title = normalize_whitespace(&raw_title);
            if let Some(source) = item.source.and_then(|s| s.name) {
                let suffix = format!(" - {}", source.trim());
                if let Some(stripped) = title.strip_suffix(&suffix) {
                    title = stripped.to_string();
                }
            }
            (!title.is_empty()).then(|| Article::new(title, link, when))
        })
        .take(max)
        .collect();

    Ok(articles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;
    use chrono::TimeZone;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <generator>NFE/5.0</generator>
    <title>"Apple" - Google News</title>
    <link>https://news.google.com/search?q=Apple</link>
    <language>en-US</language>
    <item>
      <title>Apple unveils new iPhone in California - Reuters</title>
      <link>https://news.google.com/rss/articles/one</link>
      <guid isPermaLink="false">one</guid>
      <pubDate>Tue, 06 May 2025 12:00:00 GMT</pubDate>
      <description>&lt;a href="https://example.com"&gt;Apple&lt;/a&gt;</description>
      <source url="https://www.reuters.com">Reuters</source>
    </item>
    <item>
      <title>Apple stock rises after iPhone launch</title>
      <link>https://news.google.com/rss/articles/two</link>
      <pubDate>Wed, 07 May 2025 09:15:00 GMT</pubDate>
    </item>
    <item>
      <title>Old Apple story - Wire</title>
      <link>https://news.google.com/rss/articles/old</link>
      <pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate>
      <source url="https://wire.example">Wire</source>
    </item>
    <item>
      <title>Item without a date</title>
      <link>https://news.google.com/rss/articles/nodate</link>
    </item>
    <item>
      <title>Tech news roundup - Daily Tech</title>
      <link>https://news.google.com/rss/articles/three</link>
      <pubDate>Wed, 07 May 2025 10:00:00 GMT</pubDate>
      <source url="https://daily.example">Other Outlet</source>
    </item>
  </channel>
</rss>"#;

    fn cutoff() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_feed() {
        let articles = parse_feed(FEED, cutoff(), 10).unwrap();
        let titles: Vec<&str> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Apple unveils new iPhone in California",
                "Apple stock rises after iPhone launch",
                "Tech news roundup - Daily Tech",
            ]
        );
        assert_eq!(articles[0].url, "https://news.google.com/rss/articles/one");
        assert_eq!(
            articles[1].last_updated,
            Utc.with_ymd_and_hms(2025, 5, 7, 9, 15, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_feed_respects_max() {
        assert_eq!(parse_feed(FEED, cutoff(), 1).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_feed_rejects_garbage() {
        assert!(matches!(
            parse_feed("<html><body>nope", cutoff(), 5),
            Err(FetchError::Parse(_))
        ));
    }

    #[test]
    fn test_request_url() {
        let backend = GoogleNewsBackend::new(GoogleNewsConfig::default()).unwrap();
        let query = Query {
            topic: "Olaf Scholz".to_string(),
            max_num_articles: 5,
            updated_after: cutoff(),
            language: Language::German,
        };
        let url = backend.request_url(&query);
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), "Olaf Scholz after:2025-05-01".to_string()),
                ("hl".to_string(), "de".to_string()),
                ("gl".to_string(), "DE".to_string()),
                ("ceid".to_string(), "DE:de".to_string()),
            ]
        );
    }
}
