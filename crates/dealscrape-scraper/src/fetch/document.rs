//! XML-first markup parsing with an HTML fallback.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;
use serde::Serialize;
use thiserror::Error;

use super::xml::{XmlElement, XmlError};

/// Something that opens an element, e.g. `<p` or `<html`.
static TAG_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[A-Za-z]").expect("valid tag-open regex"));

/// Which parser produced a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContentType {
    Xml,
    Html,
    /// Nothing usable was parsed.
    Unparsed,
}

impl ContentType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Xml => "XML",
            ContentType::Html => "HTML",
            ContentType::Unparsed => "--",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed tree. Owned by whoever fetched it; dropping it frees the tree.
#[derive(Debug)]
pub enum Document {
    Xml(XmlElement),
    Html(Html),
}

impl Document {
    #[must_use]
    pub fn content_type(&self) -> ContentType {
        match self {
            Document::Xml(_) => ContentType::Xml,
            Document::Html(_) => ContentType::Html,
        }
    }

    /// Tag name of the root element.
    #[must_use]
    pub fn root_name(&self) -> &str {
        match self {
            Document::Xml(root) => root.name(),
            Document::Html(html) => html.root_element().value().name(),
        }
    }

    #[must_use]
    pub fn as_xml(&self) -> Option<&XmlElement> {
        match self {
            Document::Xml(root) => Some(root),
            Document::Html(_) => None,
        }
    }

    #[must_use]
    pub fn as_html(&self) -> Option<&Html> {
        match self {
            Document::Html(html) => Some(html),
            Document::Xml(_) => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarkupError {
    /// The XML reader failed for a reason other than well-formedness or
    /// encoding, so the HTML fallback was not attempted.
    #[error("XML parse failed: {0}")]
    Xml(String),

    #[error("no root element in document")]
    NoRootElement,
}

/// Parses `bytes` as XML, falling back to permissive HTML when (and only
/// when) the XML is not well-formed.
///
/// # Errors
///
/// Returns [`MarkupError::Xml`] for non-syntax XML failures and
/// [`MarkupError::NoRootElement`] when the HTML parse has nothing from the
/// input to root a tree on (blank or tag-free input).
pub fn parse_markup(bytes: &[u8]) -> Result<Document, MarkupError> {
    match XmlElement::parse(bytes) {
        Ok(root) => Ok(Document::Xml(root)),
        Err(XmlError::Syntax(reason)) => {
            tracing::trace!(%reason, "not well-formed XML; parsing as HTML");
            parse_html(bytes)
        }
        Err(XmlError::Other(reason)) => Err(MarkupError::Xml(reason)),
    }
}

fn parse_html(bytes: &[u8]) -> Result<Document, MarkupError> {
    let text = decode_html(bytes);
    // html5ever always synthesizes <html>; without any tag in the input that
    // root is a placeholder, not an element of the document.
    if !TAG_OPEN_RE.is_match(&text) {
        return Err(MarkupError::NoRootElement);
    }
    Ok(Document::Html(Html::parse_document(&text)))
}

/// UTF-8 when the bytes are valid UTF-8, Latin-1 otherwise.
fn decode_html(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.iter().copied().map(char::from).collect()),
    }
}

#[cfg(test)]
mod tests {
    use scraper::Selector;

    use super::*;

    #[test]
    fn well_formed_xml_is_xml() {
        let doc = parse_markup(b"<rss><channel/></rss>").unwrap();
        assert_eq!(doc.content_type(), ContentType::Xml);
        assert_eq!(doc.root_name(), "rss");
        assert!(doc.as_xml().is_some());
        assert!(doc.as_html().is_none());
    }

    #[test]
    fn xhtml_that_is_well_formed_stays_xml() {
        let doc = parse_markup(b"<html><body><p>ok</p></body></html>").unwrap();
        assert_eq!(doc.content_type(), ContentType::Xml);
    }

    #[test]
    fn loose_html_falls_back_to_html() {
        let bytes = b"<!DOCTYPE html><html><head><meta charset=utf-8><title>Deal</title></head>\
                      <body><p>Spa&nbsp;day<br>for two</body></html>";
        let doc = parse_markup(bytes).unwrap();
        assert_eq!(doc.content_type(), ContentType::Html);
        assert_eq!(doc.root_name(), "html");
        let html = doc.as_html().unwrap();
        let title = Selector::parse("title").unwrap();
        assert_eq!(
            html.select(&title).next().map(|t| t.text().collect::<String>()),
            Some("Deal".to_string())
        );
    }

    #[test]
    fn fragment_without_html_wrapper_gets_html_root() {
        let doc = parse_markup(b"<div>one<div>two</div>").unwrap();
        assert_eq!(doc.content_type(), ContentType::Html);
        assert_eq!(doc.root_name(), "html");
    }

    #[test]
    fn blank_input_has_no_root() {
        assert_eq!(parse_markup(b"").unwrap_err(), MarkupError::NoRootElement);
        assert_eq!(parse_markup(b"  \n ").unwrap_err(), MarkupError::NoRootElement);
    }

    #[test]
    fn plain_text_has_no_root() {
        assert_eq!(
            parse_markup(b"Service Unavailable").unwrap_err(),
            MarkupError::NoRootElement
        );
    }

    #[test]
    fn latin1_html_falls_back_to_html() {
        let doc = parse_markup(b"<html><body><p>Price \xa310</p><br></body></html>").unwrap();
        assert_eq!(doc.content_type(), ContentType::Html);
        let html = doc.as_html().unwrap();
        let p = Selector::parse("p").unwrap();
        let text: String = html.select(&p).next().unwrap().text().collect();
        assert_eq!(text, "Price \u{a3}10");
    }

    #[test]
    fn undecodable_well_formed_xml_falls_back_to_html() {
        let doc = parse_markup(b"<a>\xff\xfe</a>").unwrap();
        assert_eq!(doc.content_type(), ContentType::Html);
    }
}
