// src/error.rs

use thiserror::Error;

/// Errors that abort an extraction run.
///
/// Formatting anomalies inside the document never end up here; they degrade
/// into `None` values or skipped lines instead.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The source document could not be opened or parsed as a PDF.
    #[error("Failed to parse PDF: {0}")]
    Pdf(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No "SBE Summary" / "Summary of Contents" marker anywhere in the document.
    #[error("Could not locate the summary table (searched {pages} pages for {markers:?})")]
    SummaryNotFound {
        pages: usize,
        markers: &'static [&'static str],
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Config(#[from] toml::de::Error),
}
