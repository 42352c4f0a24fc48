//! Output generation for search results.
//!
//! # Submodules
//!
//! - [`csv`]: Writes the relevance-sorted articles to a CSV file
//! - [`json`]: Writes a [`crate::models::Digest`] for API consumption
//!
//! # Output Structure
//!
//! ```text
//! results/
//! └── Apple_iPhone_launch_summary.csv   # title,URL,publication_date,relevancy_score
//!
//! json_output_dir/
//! └── apple-iphone-launch.json
//! ```

pub mod csv;
pub mod json;
