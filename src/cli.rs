//! Command-line interface definitions for Awful News Search.
//!
//! Every run needs a topic. The NewsAPI key can also come from the
//! `NEWSAPI_KEY` environment variable.

use crate::backends::BackendKind;
use crate::models::Language;
use chrono::{DateTime, Utc};
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the Awful News Search application.
///
/// # Examples
///
/// ```sh
/// # Last month of English NewsAPI headlines
/// awful_news_search "Apple iPhone launch" --api-key YOUR_KEY
///
/// # German headlines from Google News, no CSV
/// awful_news_search "Olaf Scholz" -l de -b googlenews --no-save
///
/// # Keep asking for new topics
/// awful_news_search "volcano" -i -j ./json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Topic to search for
    pub topic: String,

    /// Language of the articles
    #[arg(short, long, value_enum, default_value_t = Language::English)]
    pub language: Language,

    /// Fetch backend (default: from the config file, else newsapi)
    #[arg(short, long, value_enum)]
    pub backend: Option<BackendKind>,

    /// Maximum number of articles to fetch
    #[arg(short = 'n', long, default_value_t = 15)]
    pub max_num_articles: usize,

    /// Only consider articles updated after this RFC 3339 time (default: one month ago)
    #[arg(long)]
    pub updated_after: Option<DateTime<Utc>>,

    /// CSV file for the ranked articles (default: results/<topic>_summary.csv)
    #[arg(short, long)]
    pub outfile: Option<PathBuf>,

    /// Do not write the ranked articles to CSV
    #[arg(long)]
    pub no_save: bool,

    /// Optional path to config.yaml file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// NewsAPI key
    #[arg(long, env = "NEWSAPI_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Count word frequencies case-folded when summarizing
    #[arg(long)]
    pub case_folded_frequencies: bool,

    /// Output directory for a JSON digest of each run
    #[arg(short, long)]
    pub json_output_dir: Option<PathBuf>,

    /// Offer to run again with a new topic after each search
    #[arg(short, long)]
    pub interactive: bool,
}
