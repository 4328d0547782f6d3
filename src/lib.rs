// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
#![allow(clippy::significant_drop_tightening)]

//! Email ingestion
//!
//! Turns raw email containers (`.eml` files, fetched messages) into
//! structured records: subject, sender, recipient, send time, and a
//! plain-text rendering of the HTML body.
//!
//! # Pipeline
//!
//! - [`decode`] parses the container into headers and a part tree
//! - [`select_html`] picks the first `text/html` part
//! - [`to_text`] strips markup with a restricted tokenizer, dropping
//!   `script` and `style` content
//! - [`Ingestor`] hands the resulting [`ExtractedRecord`] to an
//!   [`EmailRepository`]
//!
//! Missing headers never fail an extraction; they fall back to the defaults
//! in [`HeaderField`].
//!
//! # Example
//!
//! ```rust
//! use mail2audio::extract_record;
//!
//! let raw = b"From: sender@example.com\r\n\
//!             Content-Type: text/html\r\n\
//!             \r\n\
//!             <p>Hello</p><script>track()</script>";
//! let record = extract_record(raw).unwrap();
//!
//! assert_eq!(record.subject, "No Subject");
//! assert_eq!(record.body.as_deref(), Some("Hello"));
//! ```

mod decoder;
mod error;
mod extractor;
mod html;
mod ingest;
mod parser;
mod record;
mod store;

pub use decoder::{ParsedMessage, Part, Walk, decode, parse_date};
pub use error::{IngestError, Result};
pub use extractor::{extract_body, select_html, to_text};
pub use html::{Token, Tokenizer, decode_char_refs};
pub use ingest::{BatchReport, Ingestor};
pub use parser::{extract_batch, extract_file, extract_record};
pub use record::{ExtractedRecord, HeaderField};
pub use store::{EmailId, EmailRepository, MemoryRepository, StoredEmail};
