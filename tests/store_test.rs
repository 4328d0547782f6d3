use chrono::{TimeZone, Utc};
use mail2audio::{
    EmailId, EmailRepository, ExtractedRecord, IngestError, Ingestor, MemoryRepository, Result,
    StoredEmail, parse_date,
};
use std::sync::Arc;
use std::thread;

fn sample_record(subject: &str) -> ExtractedRecord {
    ExtractedRecord {
        subject: subject.to_string(),
        sender: "newsletter@vestact.com".to_string(),
        recipient: "user@example.com".to_string(),
        received_at: parse_date(Some("Wed, 15 Jan 2025 10:30:00 +0000")),
        body: Some("Market insights and analysis...".to_string()),
    }
}

// --- MemoryRepository ---

#[test]
fn test_create_assigns_sequential_ids() {
    let repo = MemoryRepository::new();

    let first = repo.create(sample_record("Daily Market Update")).unwrap();
    let second = repo.create(sample_record("Clear vision")).unwrap();

    assert_eq!(first.id, 1);
    assert_eq!(second.id, 2);
    assert_eq!(first.subject, "Daily Market Update");
    assert_eq!(first.sender, "newsletter@vestact.com");
}

#[test]
fn test_created_at_is_independent_of_received_at() {
    let repo = MemoryRepository::new();
    let before = Utc::now();

    let stored = repo.create(sample_record("Dates")).unwrap();

    assert!(stored.created_at >= before);
    assert_eq!(
        stored.received_at.unwrap().with_timezone(&Utc),
        Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap()
    );
}

#[test]
fn test_list_all_in_insertion_order() {
    let repo = MemoryRepository::new();
    for subject in ["I like tacos", "Clear vision", "Green and gold"] {
        repo.create(sample_record(subject)).unwrap();
    }

    let subjects: Vec<String> = repo
        .list_all()
        .unwrap()
        .into_iter()
        .map(|e| e.subject)
        .collect();
    assert_eq!(subjects, ["I like tacos", "Clear vision", "Green and gold"]);
}

#[test]
fn test_get_by_id() {
    let repo = MemoryRepository::new();
    repo.create(sample_record("First")).unwrap();
    let created = repo.create(sample_record("Second")).unwrap();

    let found = repo.get_by_id(created.id).unwrap().unwrap();
    assert_eq!(found, created);
}

#[test]
fn test_get_by_unknown_id_is_none() {
    let repo = MemoryRepository::new();
    repo.create(sample_record("Only")).unwrap();

    assert!(repo.get_by_id(100).unwrap().is_none());
    assert!(repo.get_by_id(0).unwrap().is_none());
}

#[test]
fn test_concurrent_creates_get_unique_ids() {
    let repo = Arc::new(MemoryRepository::new());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let repo = Arc::clone(&repo);
            thread::spawn(move || repo.create(sample_record(&format!("Email {i}"))).unwrap().id)
        })
        .collect();

    let mut ids: Vec<EmailId> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=8).collect::<Vec<_>>());
}

#[test]
fn test_stored_email_json_shape() {
    let stored = StoredEmail::new(
        7,
        sample_record("Json"),
        Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
    );

    let json: serde_json::Value = serde_json::from_str(&stored.to_json().unwrap()).unwrap();

    assert_eq!(json["id"], 7);
    assert_eq!(json["subject"], "Json");
    assert_eq!(json["recipient"], "user@example.com");
    assert_eq!(json["received_at"], "2025-01-15T10:30:00+00:00");
    assert_eq!(json["created_at"], "2025-02-01T00:00:00Z");
}

#[test]
fn test_missing_body_serializes_as_null() {
    let mut record = sample_record("No body");
    record.body = None;
    let stored = StoredEmail::new(1, record, Utc::now());

    let json: serde_json::Value = serde_json::from_str(&stored.to_json().unwrap()).unwrap();
    assert!(json["body"].is_null());
}

// --- Ingestor ---

/// Rejects records whose subject is "reject"
#[derive(Default)]
struct RejectingRepository {
    inner: MemoryRepository,
}

impl EmailRepository for RejectingRepository {
    fn create(&self, record: ExtractedRecord) -> Result<StoredEmail> {
        if record.subject == "reject" {
            return Err(IngestError::Storage("rejected".into()));
        }
        self.inner.create(record)
    }

    fn list_all(&self) -> Result<Vec<StoredEmail>> {
        self.inner.list_all()
    }

    fn get_by_id(&self, id: EmailId) -> Result<Option<StoredEmail>> {
        self.inner.get_by_id(id)
    }
}

#[test]
fn test_ingest_stores_extracted_record() {
    let ingestor = Ingestor::new(MemoryRepository::new());
    let raw = b"From: support@vestact.com\r\n\
                To: user@example.com\r\n\
                Subject: I like tacos\r\n\
                Date: Sun, 6 Jul 2025 06:57:53 +0000\r\n\
                Content-Type: text/html\r\n\
                \r\n\
                <p>founder-led businesses</p>";

    let stored = ingestor.ingest(raw).unwrap();

    assert_eq!(stored.id, 1);
    assert_eq!(stored.body.as_deref(), Some("founder-led businesses"));
    assert_eq!(ingestor.repository().list_all().unwrap().len(), 1);
}

#[test]
fn test_batch_failure_does_not_stop_others() {
    let ingestor = Ingestor::new(RejectingRepository::default());
    let inputs: Vec<&[u8]> = vec![
        b"Subject: keep one\r\n\r\nBody",
        b"Subject: reject\r\n\r\nBody",
        b"Subject: keep two\r\n\r\nBody",
    ];

    let report = ingestor.ingest_batch(inputs);

    assert_eq!(report.total(), 3);
    assert!(!report.is_complete());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, 1);
    assert!(matches!(report.failed[0].1, IngestError::Storage(_)));

    let subjects: Vec<&str> = report.stored.iter().map(|e| e.subject.as_str()).collect();
    assert_eq!(subjects, ["keep one", "keep two"]);
}

#[test]
fn test_ingest_file() {
    let ingestor = Ingestor::new(MemoryRepository::new());
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("newsletter.eml");

    let stored = ingestor.ingest_file(path).unwrap();

    assert_eq!(stored.subject, "I like tacos");
    assert!(ingestor.repository().get_by_id(stored.id).unwrap().is_some());
}
