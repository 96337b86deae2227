// src/error.rs
// =============================================================================
// Error types for the export pipeline.
//
// Every failure that should stop the run ends up as one of these variants.
// "The API said no" (any status but 200) is NOT an error: the paginator turns
// that into an empty or shortened result instead.
//
// Rust concepts:
// - thiserror: derives Display and std::error::Error for our enum
// - #[source]: keeps the underlying error around for `{:#}` / anyhow chains
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can abort an export run.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad base URL, page size out of range, unusable token, ...
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The request could not be sent or its body could not be read.
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The run was cancelled while a request was in flight.
    #[error("request to {url} was cancelled")]
    Cancelled { url: String },

    /// The response body was not the JSON we expected.
    #[error("failed to decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The CSV file could not be opened, truncated or written.
    #[error("failed to write {}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

// Shorthand used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
