//! Ingestion service: extract records and hand them to a repository

use crate::error::{IngestError, Result};
use crate::parser::{extract_file, extract_record};
use crate::store::{EmailRepository, StoredEmail};
use std::path::Path;
use tracing::{debug, warn};

/// Outcome of a batch ingestion
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Records that were extracted and stored
    pub stored: Vec<StoredEmail>,

    /// Inputs that failed, by position in the batch
    pub failed: Vec<(usize, IngestError)>,
}

impl BatchReport {
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Total number of inputs seen
    #[must_use]
    pub const fn total(&self) -> usize {
        self.stored.len() + self.failed.len()
    }
}

/// Extracts emails and persists them through an [`EmailRepository`]
#[derive(Debug)]
pub struct Ingestor<R> {
    repository: R,
}

impl<R: EmailRepository> Ingestor<R> {
    #[must_use]
    pub const fn new(repository: R) -> Self {
        Self { repository }
    }

    #[must_use]
    pub const fn repository(&self) -> &R {
        &self.repository
    }

    /// Extract one raw email and store it
    pub fn ingest(&self, raw: &[u8]) -> Result<StoredEmail> {
        let record = extract_record(raw)?;
        let stored = self.repository.create(record)?;
        debug!("Stored email {} ({})", stored.id, stored.subject);
        Ok(stored)
    }

    /// Extract one `.eml` file and store it
    pub fn ingest_file(&self, path: impl AsRef<Path>) -> Result<StoredEmail> {
        let record = extract_file(path)?;
        self.repository.create(record)
    }

    /// Ingest every input; failures are recorded and the batch continues
    pub fn ingest_batch<I, B>(&self, inputs: I) -> BatchReport
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let mut report = BatchReport::default();

        for (index, raw) in inputs.into_iter().enumerate() {
            match self.ingest(raw.as_ref()) {
                Ok(stored) => report.stored.push(stored),
                Err(e) => {
                    warn!("Failed to ingest email #{index}: {e}");
                    report.failed.push((index, e));
                }
            }
        }

        debug!(
            "Batch finished: {} stored, {} failed",
            report.stored.len(),
            report.failed.len()
        );
        report
    }
}
