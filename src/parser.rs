//! Extraction pipeline: raw bytes to [`ExtractedRecord`]

use crate::decoder::decode;
use crate::error::{IngestError, Result};
use crate::extractor::extract_body;
use crate::record::ExtractedRecord;
use std::path::Path;
use tracing::{debug, warn};

/// Decode one raw email and extract its record
///
/// Missing headers and bodies fall back to defaults; the only error is a
/// container the MIME parser rejects.
pub fn extract_record(raw: &[u8]) -> Result<ExtractedRecord> {
    let message = decode(raw)?;
    let body = extract_body(&message);
    let record = ExtractedRecord::from_parts(&message, body);

    debug!("Extracted email: {} from {}", record.subject, record.sender);

    Ok(record)
}

/// Read an `.eml` file from disk and extract its record
pub fn extract_file(path: impl AsRef<Path>) -> Result<ExtractedRecord> {
    let path = path.as_ref();
    let raw = std::fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    extract_record(&raw)
}

/// Extract every input independently
///
/// Results line up with the inputs; a failed input does not affect the
/// others.
pub fn extract_batch<I, B>(inputs: I) -> Vec<Result<ExtractedRecord>>
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    inputs
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            extract_record(raw.as_ref()).inspect_err(|e| {
                warn!("Skipping email #{index}: {e}");
            })
        })
        .collect()
}
