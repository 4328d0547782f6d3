//! Body selection and HTML-to-text reduction

use crate::decoder::ParsedMessage;
use crate::html::{Token, Tokenizer};
use tracing::trace;

/// Elements whose text never reaches the output
const SKIPPED_TAGS: [&str; 2] = ["script", "style"];

const HTML_TYPE: &str = "text/html";

/// Return the first non-empty `text/html` part of a message, decoded as UTF-8
///
/// Parts are visited depth-first in the order they appear in the container,
/// so the first HTML part with a payload wins even if a later one is longer.
/// Empty HTML parts are skipped. Returns `None` when no HTML part carries a
/// payload. Invalid UTF-8 sequences are replaced rather than rejected.
#[must_use]
pub fn select_html(message: &ParsedMessage) -> Option<String> {
    let payload = message
        .root()
        .walk()
        .filter(|p| p.content_type() == HTML_TYPE)
        .find_map(|p| p.payload().filter(|payload| !payload.is_empty()))?;

    trace!("Selected HTML part ({} bytes)", payload.len());
    Some(String::from_utf8_lossy(payload).into_owned())
}

/// Reduce HTML markup to plain text
///
/// Every text run is trimmed and the non-empty ones are joined with a single
/// space, in document order. Text is dropped while the most recent tag event
/// was a `script` or `style` start tag. Only the latest tag is tracked, not
/// the full ancestor chain: any end tag clears it, and text after an
/// unclosed `<br>` is attributed to `br`.
#[must_use]
pub fn to_text(html: &str) -> String {
    let mut current_tag: Option<String> = None;
    let mut fragments: Vec<String> = Vec::new();

    for token in Tokenizer::new(html) {
        match token {
            Token::StartTag(name) => current_tag = Some(name),
            Token::EndTag(_) => current_tag = None,
            Token::Text(text) => {
                if current_tag
                    .as_deref()
                    .is_some_and(|tag| SKIPPED_TAGS.contains(&tag))
                {
                    continue;
                }
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    fragments.push(trimmed.to_string());
                }
            }
        }
    }

    fragments.join(" ")
}

/// Select the HTML body of a message and reduce it to text
#[must_use]
pub fn extract_body(message: &ParsedMessage) -> Option<String> {
    select_html(message).map(|html| to_text(&html))
}
