//! Error types for the search pipeline and its outputs.
//!
//! Fetch-layer failures live in [`crate::backends::FetchError`] and are carried
//! through [`SearchError::Fetch`] unchanged.

use crate::backends::FetchError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a search run.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The query was rejected before anything was fetched
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// No headline word survived stop-word and punctuation filtering
    #[error("No scorable content in the fetched headlines")]
    NoScorableContent,

    /// The fetch backend failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Writing an output file failed
    #[error(transparent)]
    Persistence(#[from] PersistError),
}

/// Errors raised while writing or reading back output files.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PersistError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PersistError::Io {
            path: path.into(),
            source,
        }
    }
}
