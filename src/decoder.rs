//! Message decoder: raw container bytes into a header map and a part tree

use crate::error::{IngestError, Result};
use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;
use tracing::trace;

/// A decoded email: headers plus the tree of body parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    headers: HashMap<String, String>,
    root: Part,
}

impl ParsedMessage {
    /// Look up a header value by case-insensitive name
    ///
    /// When a header is repeated, the last occurrence wins.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// The top-level part of the message
    #[must_use]
    pub const fn root(&self) -> &Part {
        &self.root
    }

    #[must_use]
    pub const fn is_multipart(&self) -> bool {
        matches!(self.root, Part::Composite { .. })
    }

    /// The `Date` header normalized to a timestamp, if it parses
    #[must_use]
    pub fn date(&self) -> Option<DateTime<FixedOffset>> {
        parse_date(self.header("date"))
    }
}

/// One content unit of a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    /// A single body with its transfer encoding already removed
    Leaf {
        content_type: String,
        payload: Vec<u8>,
    },
    /// A multipart container, children in the order they appear, or an
    /// attached `message/rfc822` whose only child is the inner message body
    Composite {
        content_type: String,
        parts: Vec<Self>,
    },
}

impl Part {
    /// Lowercased MIME type, e.g. `text/html`
    #[must_use]
    pub fn content_type(&self) -> &str {
        match self {
            Self::Leaf { content_type, .. } | Self::Composite { content_type, .. } => content_type,
        }
    }

    /// Decoded payload of a leaf part; `None` for containers
    #[must_use]
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Self::Leaf { payload, .. } => Some(payload.as_slice()),
            Self::Composite { .. } => None,
        }
    }

    /// Depth-first, pre-order walk over this part and all of its descendants
    #[must_use]
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }
}

/// Iterator returned by [`Part::walk`]
#[derive(Debug)]
pub struct Walk<'a> {
    stack: Vec<&'a Part>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Part;

    fn next(&mut self) -> Option<Self::Item> {
        let part = self.stack.pop()?;
        if let Part::Composite { parts, .. } = part {
            // Reversed so the first child is popped next
            self.stack.extend(parts.iter().rev());
        }
        Some(part)
    }
}

/// Decode raw container bytes
///
/// Fails only when the MIME parser rejects the byte stream outright. Parts
/// whose payload cannot be decoded are kept with an empty payload. Attached
/// messages are parsed in turn so their bodies are part of the tree.
pub fn decode(raw: &[u8]) -> Result<ParsedMessage> {
    let parsed = mailparse::parse_mail(raw).map_err(|e| IngestError::Decode(e.to_string()))?;

    let headers = collect_headers(&parsed.headers);
    let root = build_part(&parsed);

    Ok(ParsedMessage { headers, root })
}

fn collect_headers(headers: &[mailparse::MailHeader]) -> HashMap<String, String> {
    // Later inserts overwrite earlier ones: last definition wins
    headers
        .iter()
        .map(|h| (h.get_key().to_ascii_lowercase(), h.get_value()))
        .collect()
}

fn build_part(mail: &mailparse::ParsedMail) -> Part {
    let content_type = mail.ctype.mimetype.to_ascii_lowercase();

    if !mail.subparts.is_empty() || content_type.starts_with("multipart/") {
        return Part::Composite {
            content_type,
            parts: mail.subparts.iter().map(build_part).collect(),
        };
    }

    let payload = mail.get_body_raw().unwrap_or_else(|e| {
        trace!("Undecodable {} payload treated as empty: {}", content_type, e);
        Vec::new()
    });

    if content_type == "message/rfc822" {
        match mailparse::parse_mail(&payload) {
            Ok(inner) => {
                return Part::Composite {
                    content_type,
                    parts: vec![build_part(&inner)],
                };
            }
            Err(e) => trace!("Attached message kept as a leaf: {}", e),
        }
    }

    Part::Leaf {
        content_type,
        payload,
    }
}

/// Parse an RFC 2822 `Date` header value
///
/// Weekday and seconds are optional; the zone may be a numeric offset or an
/// obsolete alphabetic zone. Missing, blank, or invalid values yield `None`.
#[must_use]
pub fn parse_date(value: Option<&str>) -> Option<DateTime<FixedOffset>> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(value).ok()
}
