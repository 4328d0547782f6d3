//! The structured record produced for every ingested email

use crate::decoder::ParsedMessage;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// Header metadata plus a plain-text body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    /// Subject line, `"No Subject"` when absent
    pub subject: String,

    /// Raw `From` value, `"Unknown"` when absent
    pub sender: String,

    /// Raw `To` value, `"Unknown"` when absent
    pub recipient: String,

    /// Send time claimed by the message's own `Date` header
    pub received_at: Option<DateTime<FixedOffset>>,

    /// Text extracted from the HTML body
    pub body: Option<String>,
}

/// Headers that always produce a value in [`ExtractedRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderField {
    Subject,
    From,
    To,
}

impl HeaderField {
    pub const ALL: [Self; 3] = [Self::Subject, Self::From, Self::To];

    /// Header name and the value substituted when it is missing or blank
    #[must_use]
    pub const fn policy(self) -> (&'static str, &'static str) {
        match self {
            Self::Subject => ("Subject", "No Subject"),
            Self::From => ("From", "Unknown"),
            Self::To => ("To", "Unknown"),
        }
    }

    #[must_use]
    pub const fn header_name(self) -> &'static str {
        self.policy().0
    }

    #[must_use]
    pub const fn default_value(self) -> &'static str {
        self.policy().1
    }

    /// The trimmed header value, or the default if that is empty
    #[must_use]
    pub fn resolve(self, message: &ParsedMessage) -> String {
        message
            .header(self.header_name())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| {
                trace!("{self} header missing or blank, using {:?}", self.default_value());
                self.default_value()
            })
            .to_string()
    }
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header_name())
    }
}

impl ExtractedRecord {
    /// Build a record from a decoded message and an already extracted body
    #[must_use]
    pub fn from_parts(message: &ParsedMessage, body: Option<String>) -> Self {
        Self {
            subject: HeaderField::Subject.resolve(message),
            sender: HeaderField::From.resolve(message),
            recipient: HeaderField::To.resolve(message),
            received_at: message.date(),
            body,
        }
    }

    /// Whether an HTML body was found
    #[must_use]
    pub const fn has_body(&self) -> bool {
        self.body.is_some()
    }
}
