//! # Awful News Search
//!
//! Searches recent news for a topic, ranks the headlines by relevance, and
//! prints an extractive summary together with the named entities that occur
//! most often.
//!
//! ## Features
//!
//! - Fetches headlines from NewsAPI or the Google News RSS feed
//! - Retries transient backend failures with exponential backoff
//! - Scores headline relevance against the topic
//! - Builds a frequency-weighted extractive summary
//! - Extracts people, organizations and places
//! - Writes ranked articles to CSV and an optional JSON digest
//!
//! ## Usage
//!
//! ```sh
//! awful_news_search "Apple iPhone launch" --api-key YOUR_KEY
//! ```
//!
//! ## Architecture
//!
//! 1. **Configuration**: CLI flags merged over an optional YAML file
//! 2. **Fetching**: One backend behind a retrying wrapper
//! 3. **Analysis**: Relevance, summary and entities (see [`pipeline`])
//! 4. **Output**: Console, CSV, and an optional JSON digest

use chrono::{DateTime, Months, Utc};
use clap::Parser;
use std::error::Error;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod analysis;
mod backends;
mod cli;
mod config;
mod error;
mod models;
mod nlp;
mod outputs;
mod pipeline;
mod utils;

use analysis::summary::FrequencyKeying;
use backends::{Backend, Fetcher, RetryFetch};
use cli::Cli;
use config::{AppConfig, load_config, resolve_backend};
use nlp::{HeuristicNlp, NlpProvider};
use pipeline::{NewsSearch, Persistence};
use utils::{default_outfile, ensure_writable_dir};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_search starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(topic = %args.topic, language = %args.language, backend = ?args.backend, "Parsed CLI arguments");

    // ---- Load config & build backend ----
    let app_config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    let backend_config = resolve_backend(args.backend, args.api_key.clone(), app_config.backend);
    let backend = Backend::from_config(&backend_config)?;
    let fetcher = RetryFetch::new(
        backend,
        app_config.retry.max_retries,
        app_config.retry.base_delay(),
    );

    let keying = if args.case_folded_frequencies {
        FrequencyKeying::CaseFolded
    } else {
        FrequencyKeying::OriginalCase
    };
    let search = NewsSearch::new(fetcher, HeuristicNlp::new(args.language))
        .with_save_on_fetch(!args.no_save)
        .with_keying(keying);

    // Early check: ensure JSON output dir is writable
    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir.display(),
                error = %e,
                "JSON output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e.into());
        }
    }

    let updated_after = match args.updated_after {
        Some(when) => when,
        None => one_month_ago()?,
    };

    // ---- Search loop ----
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let runs = run_session(&search, &args, updated_after, &mut stdin).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        runs,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}

/// Run the search for the CLI topic, then for each further topic the user
/// gives in interactive mode. Returns the number of runs.
///
/// In interactive mode a failed run is reported and the session goes on.
async fn run_session<F, N, R>(
    search: &NewsSearch<F, N>,
    args: &Cli,
    updated_after: DateTime<Utc>,
    input: &mut Lines<R>,
) -> Result<usize, Box<dyn Error>>
where
    F: Fetcher,
    N: NlpProvider,
    R: AsyncBufRead + Unpin,
{
    let mut topic = args.topic.clone();
    let mut runs = 0usize;
    loop {
        let outfile = args.outfile.clone().unwrap_or_else(|| default_outfile(&topic));
        let result = run_once(search, &topic, args, updated_after, &outfile).await;
        runs += 1;

        if !args.interactive {
            result?;
            break;
        }
        if let Err(e) = result {
            error!(%topic, error = %e, "Search failed");
            eprintln!("Search for {topic:?} failed: {e}");
        }
        match next_topic(input).await? {
            Some(next) => topic = next,
            None => break,
        }
    }
    Ok(runs)
}

fn one_month_ago() -> Result<DateTime<Utc>, Box<dyn Error>> {
    Utc::now()
        .checked_sub_months(Months::new(1))
        .ok_or_else(|| "cannot compute the default cutoff of one month ago".into())
}

/// Run one search and report its results on stdout.
async fn run_once<F, N>(
    search: &NewsSearch<F, N>,
    topic: &str,
    args: &Cli,
    updated_after: DateTime<Utc>,
    outfile: &Path,
) -> Result<(), Box<dyn Error>>
where
    F: Fetcher,
    N: NlpProvider,
{
    let outcome = search
        .fetch_summary_and_named_entities(topic, args.max_num_articles, updated_after, Some(outfile))
        .await?;

    println!("Summary:");
    if outcome.summary.is_empty() {
        println!("  (too few sentences to summarize)");
    } else {
        println!("  {}", outcome.summary);
    }
    println!("Named entities:");
    for entity in &outcome.named_entities {
        println!("  - {entity}");
    }

    match &outcome.persistence {
        Persistence::Saved(path) => println!("Saved {} articles to {}", outcome.ranked_articles.len(), path.display()),
        Persistence::Failed(e) => eprintln!("Could not save articles: {e}"),
        Persistence::Skipped => debug!("CSV output skipped"),
    }

    // ---- JSON digest ----
    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = search.write_digest(&outcome, topic, dir).await {
            error!(error = %e, "Failed to write JSON digest");
        }
    }

    Ok(())
}

/// Ask whether to search again; `None` ends the session.
async fn next_topic<R>(input: &mut Lines<R>) -> Result<Option<String>, Box<dyn Error>>
where
    R: AsyncBufRead + Unpin,
{
    let mut stdout = tokio::io::stdout();

    stdout.write_all(b"Run again? [y/N] ").await?;
    stdout.flush().await?;
    let answer = input.next_line().await?.unwrap_or_default();
    if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
        return Ok(None);
    }

    stdout.write_all(b"Give me another topic: ").await?;
    stdout.flush().await?;
    match input.next_line().await? {
        Some(line) if !line.trim().is_empty() => Ok(Some(line.trim().to_string())),
        _ => {
            warn!("No topic given; stopping");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::articles_from_titles;
    use crate::backends::testing::StaticFetcher;
    use crate::models::Language;

    fn stopword_search() -> NewsSearch<StaticFetcher, HeuristicNlp> {
        NewsSearch::new(
            StaticFetcher::new(articles_from_titles(&["The and of.", "It is."])),
            HeuristicNlp::new(Language::English),
        )
        .with_save_on_fetch(false)
    }

    #[tokio::test]
    async fn test_interactive_session_survives_failed_runs() {
        let search = stopword_search();
        let args = Cli::parse_from(["awful_news_search", "apple", "-i", "--no-save"]);
        let mut input = BufReader::new(&b"y\nbanana\nn\n"[..]).lines();

        let runs = run_session(&search, &args, one_month_ago().unwrap(), &mut input)
            .await
            .unwrap();

        assert_eq!(runs, 2);
        assert_eq!(search.fetcher().calls.get(), 2);
    }

    #[tokio::test]
    async fn test_single_run_returns_its_error() {
        let search = stopword_search();
        let args = Cli::parse_from(["awful_news_search", "apple", "--no-save"]);
        let mut input = BufReader::new(&b""[..]).lines();

        let result = run_session(&search, &args, one_month_ago().unwrap(), &mut input).await;

        assert!(result.is_err());
        assert_eq!(search.fetcher().calls.get(), 1);
    }

    #[tokio::test]
    async fn test_next_topic_reads_answer_and_topic() {
        let mut input = BufReader::new(&b"yes\n  volcano  \n"[..]).lines();
        assert_eq!(next_topic(&mut input).await.unwrap(), Some("volcano".to_string()));

        let mut input = BufReader::new(&b"n\n"[..]).lines();
        assert_eq!(next_topic(&mut input).await.unwrap(), None);

        let mut input = BufReader::new(&b"y\n\n"[..]).lines();
        assert_eq!(next_topic(&mut input).await.unwrap(), None);
    }
}
