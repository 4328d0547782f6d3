//! Persistence seam for extracted records

use crate::error::{IngestError, Result};
use crate::record::ExtractedRecord;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Identity assigned by a repository
pub type EmailId = u64;

/// A record after it has been persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEmail {
    pub id: EmailId,
    pub subject: String,
    pub sender: String,
    pub recipient: String,
    pub received_at: Option<DateTime<FixedOffset>>,
    pub body: Option<String>,

    /// When the repository stored the record, unrelated to `received_at`
    pub created_at: DateTime<Utc>,
}

impl StoredEmail {
    #[must_use]
    pub fn new(id: EmailId, record: ExtractedRecord, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            subject: record.subject,
            sender: record.sender,
            recipient: record.recipient,
            received_at: record.received_at,
            body: record.body,
            created_at,
        }
    }

    /// Render as the JSON object a read API would return
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Storage backend for extracted records
///
/// Unknown ids are reported as `Ok(None)`, never as an error.
pub trait EmailRepository: Send + Sync {
    /// Persist a record and return it with its assigned identity
    fn create(&self, record: ExtractedRecord) -> Result<StoredEmail>;

    /// All stored records in insertion order
    fn list_all(&self) -> Result<Vec<StoredEmail>>;

    /// Look up one record
    fn get_by_id(&self, id: EmailId) -> Result<Option<StoredEmail>>;
}

/// In-process repository; ids start at 1 and increase by one per record
#[derive(Debug, Default)]
pub struct MemoryRepository {
    emails: RwLock<Vec<StoredEmail>>,
}

impl MemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned() -> IngestError {
    IngestError::Storage("repository lock poisoned".into())
}

impl EmailRepository for MemoryRepository {
    fn create(&self, record: ExtractedRecord) -> Result<StoredEmail> {
        let mut emails = self.emails.write().map_err(|_| lock_poisoned())?;
        let id = emails.last().map_or(1, |e| e.id + 1);
        let stored = StoredEmail::new(id, record, Utc::now());
        emails.push(stored.clone());
        Ok(stored)
    }

    fn list_all(&self) -> Result<Vec<StoredEmail>> {
        Ok(self.emails.read().map_err(|_| lock_poisoned())?.clone())
    }

    fn get_by_id(&self, id: EmailId) -> Result<Option<StoredEmail>> {
        let emails = self.emails.read().map_err(|_| lock_poisoned())?;
        // Ids are assigned in increasing order
        Ok(emails
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| emails[i].clone()))
    }
}
