//! Optional YAML configuration file.
//!
//! ```yaml
//! backend:
//!   kind: news_api
//!   api_key: YOUR_KEY
//!   timeout_secs: 10
//! retry:
//!   max_retries: 3
//!   base_delay_ms: 1000
//! ```
//!
//! Command-line flags take precedence: `--backend` picks the backend kind and
//! `--api-key` (or `NEWSAPI_KEY`) replaces the configured key.

use crate::backends::{BackendConfig, BackendKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument};

/// Errors that can occur while loading the configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

fn default_max_retries() -> usize {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

/// Backoff settings for the fetch backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

/// Contents of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend: Option<BackendConfig>,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.max_retries > 10 {
            return Err(ConfigError::Invalid(format!(
                "retry.max_retries must be at most 10, got {}",
                self.retry.max_retries
            )));
        }
        Ok(())
    }
}

/// Load and validate the configuration file at `path`.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: AppConfig = serde_yaml::from_str(&text)?;
    config.validate()?;
    info!(backend = ?config.backend.as_ref().map(BackendConfig::kind), "Loaded configuration");
    Ok(config)
}

/// Combine the command-line backend choice with the configuration file.
///
/// The file's settings are used when no kind is given on the command line or
/// the kinds agree; otherwise the chosen kind starts from defaults. Without
/// either, NewsAPI is used.
pub fn resolve_backend(
    kind: Option<BackendKind>,
    api_key: Option<String>,
    from_file: Option<BackendConfig>,
) -> BackendConfig {
    let mut config = match (kind, from_file) {
        (None, Some(file)) => file,
        (Some(kind), Some(file)) if file.kind() == kind => file,
        (Some(kind), _) => kind.default_config(),
        (None, None) => BackendKind::NewsApi.default_config(),
    };

    if let (BackendConfig::NewsApi(news_api), Some(key)) = (&mut config, api_key) {
        news_api.api_key = key;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{GoogleNewsConfig, NewsApiConfig};
    use crate::utils::temp_dir;

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
backend:
  kind: news_api
  api_key: from-file
  timeout_secs: 5
retry:
  max_retries: 2
  base_delay_ms: 250
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        let mut expected = NewsApiConfig::new("from-file");
        expected.timeout_secs = 5;
        assert_eq!(config.backend, Some(BackendConfig::NewsApi(expected)));
        assert_eq!(config.retry.base_delay(), Duration::from_millis(250));
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let config: AppConfig = serde_yaml::from_str("backend:\n  kind: google_news\n").unwrap();
        assert_eq!(config.retry, RetryConfig::default());
        assert_eq!(
            config.backend,
            Some(BackendConfig::GoogleNews(GoogleNewsConfig::default()))
        );
    }

    #[test]
    fn test_load_config_validates() {
        let dir = temp_dir("config");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.yaml");
        std::fs::write(&path, "retry:\n  max_retries: 50\n").unwrap();

        assert!(matches!(load_config(&path), Err(ConfigError::Invalid(_))));
        assert!(matches!(
            load_config(&dir.join("missing.yaml")),
            Err(ConfigError::Io { .. })
        ));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_resolve_backend_precedence() {
        let file = BackendConfig::NewsApi(NewsApiConfig::new("from-file"));

        let resolved = resolve_backend(None, None, Some(file.clone()));
        assert_eq!(resolved, file);

        let resolved = resolve_backend(Some(BackendKind::NewsApi), Some("from-flag".into()), Some(file.clone()));
        assert_eq!(resolved, BackendConfig::NewsApi(NewsApiConfig::new("from-flag")));

        let resolved = resolve_backend(Some(BackendKind::GoogleNews), Some("ignored".into()), Some(file));
        assert_eq!(resolved.kind(), BackendKind::GoogleNews);

        let resolved = resolve_backend(None, None, None);
        assert_eq!(resolved.kind(), BackendKind::NewsApi);
    }
}
