//! Fetch backends for recent news articles.
//!
//! Every backend implements [`Fetcher`], which takes one canonical [`Query`]
//! and returns at most `query.max_num_articles` articles. Records missing a
//! title, URL or timestamp are dropped by the backend.
//!
//! # Supported Backends
//!
//! | Backend | Module | Method | Notes |
//! |---------|--------|--------|-------|
//! | NewsAPI | [`newsapi`] | `/v2/everything` JSON API | Requires an API key; sorted by relevancy |
//! | Google News | [`google_news`] | RSS search | No key; ordering is Google's |
//!
//! Backends are selected through [`BackendKind`] and built from an explicit
//! [`BackendConfig`]. [`RetryFetch`] wraps any backend with exponential
//! backoff for transient failures.

pub mod google_news;
pub mod newsapi;

use crate::models::{Article, Query};
use clap::ValueEnum;
use rand::{Rng, rng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

pub use google_news::{GoogleNewsBackend, GoogleNewsConfig};
pub use newsapi::{NewsApiBackend, NewsApiConfig};

/// Errors that can occur while fetching articles
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with an error
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the service
        message: String,
    },

    /// The response body could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid backend configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl FetchError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Request(e) => !e.is_builder(),
            FetchError::Api { status, .. } => *status == 429 || *status >= 500,
            FetchError::Parse(_) | FetchError::InvalidConfig(_) => false,
        }
    }
}

/// A source of recent news articles for a topic.
pub trait Fetcher {
    /// Fetch at most `query.max_num_articles` articles for `query.topic`.
    async fn fetch(&self, query: &Query) -> Result<Vec<Article>, FetchError>;
}

/// Backend names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    #[value(name = "newsapi")]
    NewsApi,
    #[value(name = "googlenews")]
    GoogleNews,
}

impl BackendKind {
    /// Configuration for this backend with default settings.
    pub fn default_config(&self) -> BackendConfig {
        match self {
            BackendKind::NewsApi => BackendConfig::NewsApi(NewsApiConfig::new("")),
            BackendKind::GoogleNews => BackendConfig::GoogleNews(GoogleNewsConfig::default()),
        }
    }
}

/// Settings of one backend variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    NewsApi(NewsApiConfig),
    GoogleNews(GoogleNewsConfig),
}

impl BackendConfig {
    pub fn kind(&self) -> BackendKind {
        match self {
            BackendConfig::NewsApi(_) => BackendKind::NewsApi,
            BackendConfig::GoogleNews(_) => BackendKind::GoogleNews,
        }
    }
}

/// The configured fetch backend.
#[derive(Debug)]
pub enum Backend {
    NewsApi(NewsApiBackend),
    GoogleNews(GoogleNewsBackend),
}

impl Backend {
    /// Validate `config` and build the backend it describes.
    pub fn from_config(config: &BackendConfig) -> Result<Self, FetchError> {
        let backend = match config {
            BackendConfig::NewsApi(c) => Backend::NewsApi(NewsApiBackend::new(c.clone())?),
            BackendConfig::GoogleNews(c) => Backend::GoogleNews(GoogleNewsBackend::new(c.clone())?),
        };
        info!(kind = ?config.kind(), "Configured fetch backend");
        Ok(backend)
    }
}

impl Fetcher for Backend {
    async fn fetch(&self, query: &Query) -> Result<Vec<Article>, FetchError> {
        match self {
            Backend::NewsApi(b) => b.fetch(query).await,
            Backend::GoogleNews(b) => b.fetch(query).await,
        }
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`Fetcher`].
///
/// Only errors for which [`FetchError::is_transient`] holds are retried.
///
/// # Backoff Strategy
///
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryFetch<T> {
    /// The wrapped backend.
    inner: T,
    /// Maximum number of retry attempts before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Maximum delay cap.
    max_delay: StdDuration,
}

impl<T> RetryFetch<T>
where
    T: Fetcher,
{
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> Fetcher for RetryFetch<T>
where
    T: Fetcher,
{
    #[instrument(level = "info", skip_all, fields(topic = %query.topic))]
    async fn fetch(&self, query: &Query) -> Result<Vec<Article>, FetchError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.fetch(query).await {
                Ok(articles) => return Ok(articles),
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if !e.is_transient() || attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            transient = e.is_transient(),
                            elapsed_ms_total = total_dt.as_millis(),
                            error = %e,
                            "fetch() giving up"
                        );
                        return Err(e);
                    }

                    // backoff calc
                    let shift = (attempt - 1).min(31) as u32;
                    let mut delay = self.base_delay.saturating_mul(1 << shift);
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis(),
                        ?delay,
                        error = %e,
                        "fetch() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
