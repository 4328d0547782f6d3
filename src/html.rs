//! Restricted streaming markup tokenizer
//!
//! Produces a flat stream of start tags, end tags, and text runs. There is no
//! tree construction, no script execution, and no resource fetching: the
//! tokenizer only ever looks at the input string it was given.
//!
//! Comments, doctypes, processing instructions, and CDATA sections are
//! skipped without producing tokens. The bodies of `script` and `style`
//! elements are raw text and are returned as a single undecoded text token.

use std::borrow::Cow;

/// One tokenizer event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// `<name ...>`; the name is lowercased
    StartTag(String),
    /// `</name>`; also emitted right after a self-closing `<name/>`
    EndTag(String),
    /// Text between tags, character references decoded
    Text(Cow<'a, str>),
}

/// Elements whose content is not tokenized
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

/// Iterator over the tokens of a markup string
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    raw_text: Option<&'static str>,
    pending_end: Option<String>,
}

enum Markup<'a> {
    /// A tag token and the number of bytes it spans
    Tag(Token<'a>, usize),
    /// A construct that produces no token
    Skip(usize),
    /// Input ends before the construct is closed
    Incomplete,
    /// A `<` that opens nothing
    Literal,
}

impl<'a> Tokenizer<'a> {
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            raw_text: None,
            pending_end: None,
        }
    }

    fn rest(&self) -> &'a str {
        let input = self.input;
        &input[self.pos..]
    }

    /// Consume raw text up to the closing tag of `element`
    fn raw_text_run(&mut self, element: &str) -> &'a str {
        let rest = self.rest();
        let closing = format!("</{element}");
        let end = rest
            .to_ascii_lowercase()
            .find(&closing)
            .unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    /// Consume text up to the next `<`
    fn text_run(&mut self) -> &'a str {
        let rest = self.rest();
        let end = rest.find('<').unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(name) = self.pending_end.take() {
            return Some(Token::EndTag(name));
        }

        if let Some(element) = self.raw_text.take() {
            let text = self.raw_text_run(element);
            if !text.is_empty() {
                return Some(Token::Text(Cow::Borrowed(text)));
            }
        }

        loop {
            let rest = self.rest();
            if rest.is_empty() {
                return None;
            }

            if !rest.starts_with('<') {
                let text = self.text_run();
                return Some(Token::Text(decode_char_refs(text)));
            }

            match markup(rest) {
                Markup::Tag(token, len) => {
                    self.pos += len;
                    if let Token::StartTag(name) = &token {
                        if rest[..len].ends_with("/>") {
                            self.pending_end = Some(name.clone());
                        } else {
                            self.raw_text = RAW_TEXT_ELEMENTS
                                .iter()
                                .find(|e| **e == name.as_str())
                                .copied();
                        }
                    }
                    return Some(token);
                }
                Markup::Skip(len) => self.pos += len,
                Markup::Incomplete => {
                    self.pos = self.input.len();
                    return None;
                }
                Markup::Literal => {
                    self.pos += 1;
                    return Some(Token::Text(Cow::Borrowed("<")));
                }
            }
        }
    }
}

/// Classify the construct at the start of `s`, which begins with `<`
fn markup(s: &str) -> Markup<'_> {
    let bytes = s.as_bytes();
    match bytes.get(1) {
        Some(c) if c.is_ascii_alphabetic() => start_tag(s),
        Some(b'/') => end_tag(s),
        Some(b'!') => {
            if s.starts_with("<!--") {
                skip_until(s, 4, "-->")
            } else if s.starts_with("<![CDATA[") {
                skip_until(s, 9, "]]>")
            } else {
                skip_until(s, 2, ">")
            }
        }
        Some(b'?') => skip_until(s, 2, ">"),
        Some(_) => Markup::Literal,
        None => Markup::Incomplete,
    }
}

fn skip_until(s: &str, from: usize, terminator: &str) -> Markup<'static> {
    s[from..]
        .find(terminator)
        .map_or(Markup::Incomplete, |i| {
            Markup::Skip(from + i + terminator.len())
        })
}

fn tag_name(s: &str) -> String {
    s.split(|c: char| c.is_ascii_whitespace() || c == '/' || c == '>' || c == '\0')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

fn start_tag(s: &str) -> Markup<'_> {
    let name = tag_name(&s[1..]);

    // Find the closing '>' outside of quoted attribute values
    let mut quote: Option<u8> = None;
    for (i, &b) in s.as_bytes().iter().enumerate().skip(1 + name.len()) {
        match (quote, b) {
            (Some(q), _) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(b),
            (None, b'>') => return Markup::Tag(Token::StartTag(name), i + 1),
            (None, _) => {}
        }
    }
    Markup::Incomplete
}

fn end_tag(s: &str) -> Markup<'_> {
    let Some(close) = s.find('>') else {
        return Markup::Incomplete;
    };
    let len = close + 1;

    match s.as_bytes().get(2) {
        Some(c) if c.is_ascii_alphabetic() => {
            Markup::Tag(Token::EndTag(tag_name(&s[2..close])), len)
        }
        // `</>` and `</ junk>` are dropped
        _ => Markup::Skip(len),
    }
}

/// Decode character references (`&amp;`, `&eacute;`, `&#39;`, `&#x27;`, ...)
///
/// Uses the full HTML5 named reference table, including the legacy names
/// that may appear without a trailing semicolon (`&copy`, `&amp`). Text that
/// is not a known reference is left as written.
#[must_use]
pub fn decode_char_refs(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    htmlize::unescape(text)
}
