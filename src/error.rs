//! Error types for email ingestion

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while ingesting a single email
///
/// Missing or unparseable header fields are never errors: they degrade to
/// the defaults in [`crate::HeaderField`]. Only the conditions below abort
/// the processing of one input.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The raw bytes could not be interpreted as an email container at all
    #[error("Failed to decode email container: {0}")]
    Decode(String),

    /// Failed to read an email container from disk
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The repository could not complete an operation
    #[error("Storage failure: {0}")]
    Storage(String),

    /// Failed to render a stored record as JSON
    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;
