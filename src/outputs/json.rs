//! JSON digest output.
//!
//! Files are named after the topic slug:
//! ```text
//! json_output_dir/
//! └── apple-iphone-launch.json
//! ```

use crate::error::PersistError;
use crate::models::Digest;
use crate::utils::slugify_title;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `digest` to `{json_output_dir}/{slug}.json` and return the path.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir.display()))]
pub async fn write_digest(digest: &Digest, json_output_dir: &Path) -> Result<PathBuf, PersistError> {
    let json = serde_json::to_string_pretty(digest)?;

    if let Err(e) = fs::create_dir_all(json_output_dir).await {
        error!(error = %e, "Failed to create JSON dir");
        return Err(PersistError::io(json_output_dir, e));
    }

    let path = json_output_dir.join(format!("{}.json", slugify_title(&digest.topic)));
    info!(path = %path.display(), "Writing JSON");
    fs::write(&path, json)
        .await
        .map_err(|e| PersistError::io(&path, e))?;
    info!(path = %path.display(), "Wrote JSON digest");

    Ok(path)
}
