//! Owned element tree built from `quick-xml` events.
//!
//! The reader is a pull parser, so well-formedness beyond tag matching
//! (a single root, nothing left open at end of input, no stray content around
//! the root) is enforced here.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

/// Why a byte buffer is not an XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum XmlError {
    /// Not well-formed, or not valid UTF-8; the caller may retry the bytes
    /// as HTML.
    Syntax(String),
    /// A failure of the reader itself; terminal.
    Other(String),
}

impl XmlElement {
    /// Parses a complete document and returns its root element.
    pub(crate) fn parse(bytes: &[u8]) -> Result<Self, XmlError> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let mut reader = Reader::from_reader(bytes);
        let mut buf = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event_into(&mut buf).map_err(classify)? {
                Event::Start(start) => {
                    if stack.is_empty() && root.is_some() {
                        return Err(XmlError::Syntax("extra content after root element".into()));
                    }
                    stack.push(element_from(&start)?);
                }
                Event::Empty(start) => {
                    let element = element_from(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| XmlError::Syntax("end tag without start tag".into()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(classify)?.into_owned();
                    push_text(&mut stack, text)?;
                }
                Event::CData(data) => {
                    let text = String::from_utf8(data.into_inner().into_owned())
                        .map_err(|e| XmlError::Syntax(e.to_string()))?;
                    push_text(&mut stack, text)?;
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(XmlError::Syntax(format!(
                "unexpected end of input: <{}> is not closed",
                open.name
            )));
        }
        root.ok_or_else(|| XmlError::Syntax("document is empty".into()))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// Child elements, text nodes skipped.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        })
    }

    /// First child element called `name`.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|el| el.name == name)
    }

    /// Elements reached by a `/`-separated path of child names relative to
    /// this element, e.g. `"channel/item"` from an `<rss>` root.
    #[must_use]
    pub fn find_all(&self, path: &str) -> Vec<&XmlElement> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .fold(vec![self], |current, segment| {
                current
                    .into_iter()
                    .flat_map(|el| el.elements().filter(move |child| child.name == segment))
                    .collect()
            })
    }

    /// Concatenated text of this element and all descendants.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                XmlNode::Text(text) => out.push_str(text),
                XmlNode::Element(el) => el.collect_text(out),
            }
        }
    }
}

fn element_from(start: &BytesStart<'_>) -> Result<XmlElement, XmlError> {
    let name = utf8(start.name().as_ref())?;
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError::Syntax(e.to_string()))?;
        let key = utf8(attr.key.as_ref())?;
        let value = attr.unescape_value().map_err(classify)?.into_owned();
        attributes.push((key, value));
    }
    Ok(XmlElement {
        name,
        attributes,
        children: Vec::new(),
    })
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), XmlError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(XmlNode::Element(element));
        return Ok(());
    }
    if root.is_some() {
        return Err(XmlError::Syntax("extra content after root element".into()));
    }
    *root = Some(element);
    Ok(())
}

fn push_text(stack: &mut [XmlElement], text: String) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(XmlNode::Text(text));
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(XmlError::Syntax("text outside root element".into())),
    }
}

fn utf8(bytes: &[u8]) -> Result<String, XmlError> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| XmlError::Syntax(e.to_string()))
}

fn classify(err: quick_xml::Error) -> XmlError {
    match err {
        quick_xml::Error::Syntax(_)
        | quick_xml::Error::IllFormed(_)
        | quick_xml::Error::InvalidAttr(_)
        | quick_xml::Error::Escape(_)
        | quick_xml::Error::Encoding(_) => XmlError::Syntax(err.to_string()),
        other => XmlError::Other(other.to_string()),
    }
}
